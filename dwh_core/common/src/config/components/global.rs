use crate::config::components::cluster::ClusterSpec;
use crate::config::components::connections::{AdapterConnectionDetails, ConnectionsConfig};
use crate::config::components::etl::EtlConfig;
use crate::config::components::project::WarehouseProjectConfig;
use crate::config::components::services::ServiceEndpoints;

// ---------------- global config ----------------
#[derive(Debug)]
pub struct WarehouseConfig {
    pub project: WarehouseProjectConfig,
    pub connections: ConnectionsConfig,
    pub connection_profile: String,
    pub warehouse_db_connection: String,
}

impl WarehouseConfig {
    pub fn new(
        project: WarehouseProjectConfig,
        connections: ConnectionsConfig,
        connection_profile: String,
        warehouse_db_connection: String,
    ) -> Self {
        Self {
            project,
            connections,
            connection_profile,
            warehouse_db_connection,
        }
    }

    /// Connection details for the cluster database session, from the active
    /// profile.
    pub fn get_adapter_connection_details(&self) -> Option<AdapterConnectionDetails> {
        self.connections
            .get(&self.connection_profile)
            .and_then(|sources| sources.get(&self.warehouse_db_connection))
            .cloned()
    }

    pub fn cluster(&self) -> &ClusterSpec {
        &self.project.cluster
    }

    pub fn services(&self) -> &ServiceEndpoints {
        &self.project.services
    }

    pub fn etl(&self) -> &EtlConfig {
        &self.project.etl
    }
}
