use crate::config::components::connections::{
    deserialize_port_to_string, AdapterConnectionDetails, ConnectionsConfig, DatabaseAdapterType,
};
use crate::config::components::etl::StepSpec;
use crate::config::components::global::WarehouseConfig;
use crate::config::components::project::WarehouseProjectConfig;
use crate::config::error::ConfigError;
use serde::de::Error;
use serde::Deserialize;
use serde_yaml::{self, Error as YamlError, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load the full project configuration.
///
/// `project_config_path` points at the directory holding
/// `warehouse-project.yml`; when `None` the current directory is used. All
/// relative paths inside the file (connection profile, step SQL files)
/// resolve against that directory.
pub fn read_config(project_config_path: Option<PathBuf>) -> Result<WarehouseConfig, ConfigError> {
    let proj_config_file_path = if let Some(config_path) = project_config_path {
        config_path.join("warehouse-project.yml")
    } else {
        "warehouse-project.yml".into()
    };

    let project_file = fs::File::open(&proj_config_file_path)?;
    let mut proj_config: WarehouseProjectConfig = serde_yaml::from_reader(project_file)?;

    let config_root = proj_config_file_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let connections_path = resolve_path(&config_root, &proj_config.connection_profile.path);
    if !connections_path.exists() {
        return Err(ConfigError::missing_connection(&connections_path));
    }
    debug!("loading connection profiles from {}", connections_path.display());
    let conn_file = fs::File::open(connections_path)?;
    let raw_connections: HashMap<String, Value> = serde_yaml::from_reader(conn_file)?;
    let mut connections: ConnectionsConfig = HashMap::new();

    for (profile, value) in raw_connections.into_iter() {
        let profile_connections = parse_connection_profile(value)
            .map_err(|err| ConfigError::parse_error(format!("profile {}: {}", profile, err)))?;
        connections.insert(profile, profile_connections);
    }

    resolve_steps(&config_root, &mut proj_config.etl.schema);
    resolve_steps(&config_root, &mut proj_config.etl.load);
    resolve_steps(&config_root, &mut proj_config.etl.transform);

    let conn_profile = proj_config.connection_profile.profile.clone();
    let warehouse_db_connection = proj_config.connection_profile.warehouse.clone();

    Ok(WarehouseConfig::new(
        proj_config,
        connections,
        conn_profile,
        warehouse_db_connection,
    ))
}

fn resolve_steps(root: &Path, steps: &mut [StepSpec]) {
    for step in steps.iter_mut() {
        step.file = resolve_path(root, &step.file);
    }
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn parse_connection_profile(
    value: Value,
) -> Result<HashMap<String, AdapterConnectionDetails>, YamlError> {
    // First try to interpret as a single connection definition.
    if let Ok(single) = serde_yaml::from_value::<RawConnectionDetails>(value.clone()) {
        let mut map = HashMap::new();
        map.insert("warehouse".to_string(), single.into_adapter_details()?);
        return Ok(map);
    }

    // Otherwise expect a map of named connections.
    let nested: HashMap<String, RawConnectionDetails> = serde_yaml::from_value(value)?;
    let mut profile = HashMap::new();
    for (name, raw) in nested.into_iter() {
        profile.insert(name, raw.into_adapter_details()?);
    }
    Ok(profile)
}

#[derive(Debug, Deserialize)]
struct RawConnectionDetails {
    #[serde(default)]
    adapter: Option<DatabaseAdapterType>,
    #[serde(default)]
    adapter_type: Option<DatabaseAdapterType>,
    host: String,
    user: String,
    database: String,
    password: String,
    #[serde(deserialize_with = "deserialize_port_to_string")]
    port: String,
}

impl RawConnectionDetails {
    fn into_adapter_details(self) -> Result<AdapterConnectionDetails, YamlError> {
        let adapter_type = self
            .adapter_type
            .or(self.adapter)
            .ok_or_else(|| YamlError::custom("missing `adapter` or `adapter_type`"))?;

        Ok(AdapterConnectionDetails::new(
            self.host.as_str(),
            self.user.as_str(),
            self.database.as_str(),
            self.password.as_str(),
            self.port.as_str(),
            adapter_type,
        ))
    }
}
