use crate::config::components::cluster::ClusterSpec;
use crate::config::components::connections::Connections;
use crate::config::components::etl::EtlConfig;
use crate::config::components::services::ServiceEndpoints;
use serde::Deserialize;

/// Raw shape of `warehouse-project.yml` before path resolution.
#[derive(Debug, Deserialize)]
pub struct WarehouseProjectConfig {
    pub name: String,
    pub version: String,
    #[serde(rename = "connections")]
    pub connection_profile: Connections,
    pub cluster: ClusterSpec,
    pub services: ServiceEndpoints,
    pub etl: EtlConfig,
}
