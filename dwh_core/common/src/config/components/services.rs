use crate::config::components::connections::deserialize_port_to_string;
use serde::Deserialize;

/// Host/port pair for one of the provisioning services.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEndpoint {
    pub host: String,
    #[serde(deserialize_with = "deserialize_port_to_string")]
    pub port: String,
}

/// The three service endpoints provisioning talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEndpoints {
    pub identity: ServiceEndpoint,
    pub cluster: ServiceEndpoint,
    pub network: ServiceEndpoint,
}
