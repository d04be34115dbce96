use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

///  ---------------- Connections Config ----------------
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseAdapterType {
    Postgres,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AdapterConnectionDetails {
    pub host: String,
    pub user: String,
    pub database: String,
    pub password: String,
    pub port: String,
    pub adapter_type: DatabaseAdapterType,
}

impl AdapterConnectionDetails {
    pub fn new(
        host: &str,
        user: &str,
        database: &str,
        password: &str,
        port: &str,
        adapter_type: DatabaseAdapterType,
    ) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
            database: database.to_string(),
            password: password.to_string(),
            port: port.to_string(),
            adapter_type,
        }
    }
}

/// Map of connection profiles (e.g. `dev`) to named connection definitions
/// (e.g. `warehouse`).
pub type ConnectionsConfig = HashMap<String, HashMap<String, AdapterConnectionDetails>>;

fn default_warehouse_connection() -> String {
    "warehouse".to_string()
}

/// The `connections:` block of `warehouse-project.yml`: which profile to use,
/// where the profile file lives, and the name of the cluster connection
/// inside the profile.
#[derive(Debug, Deserialize, Clone)]
pub struct Connections {
    pub profile: String,
    pub path: PathBuf,
    #[serde(default = "default_warehouse_connection")]
    pub warehouse: String,
}

/// Accept a port given either as a YAML string or as an integer.
pub(crate) fn deserialize_port_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct PortVisitor;

    impl<'de> serde::de::Visitor<'de> for PortVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer port value")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value < 0 {
                return Err(E::custom("port cannot be negative"));
            }
            Ok(value.to_string())
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_owned())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }
    }

    deserializer.deserialize_any(PortVisitor)
}
