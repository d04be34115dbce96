use crate::provision::delete_cluster;
use common::config::components::global::WarehouseConfig;
use common::error::DwhError;
use shared_clients::cluster::ClusterServiceClient;

/// Tear the cluster down. No deletion poll and no snapshot; failures
/// propagate instead of being logged away.
pub async fn teardown(config: &WarehouseConfig) -> Result<(), DwhError> {
    let services = config.services();
    let cluster = ClusterServiceClient::new(&services.cluster.host, &services.cluster.port);

    delete_cluster(&cluster, &config.cluster().identifier)
        .await
        .map_err(DwhError::provision)
}
