use crate::provision::{
    ensure_role, open_ingress, submit_create, wait_until_available, IngressOutcome, PollOptions,
    RoleEnsured, WaitOutcome,
};
use common::config::components::global::WarehouseConfig;
use common::error::DwhError;
use shared_clients::cluster::{ClusterDescription, ClusterServiceClient};
use shared_clients::identity::IdentityClient;
use shared_clients::network::NetworkClient;
use shared_clients::{ClusterApi, IdentityApi, NetworkApi};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Provision the warehouse end to end: role, cluster, availability wait,
/// ingress. Each stage is a precondition for the next; there is no rollback.
pub async fn provision(config: &WarehouseConfig) -> Result<(), DwhError> {
    let services = config.services();
    let identity = IdentityClient::new(&services.identity.host, &services.identity.port);
    let cluster = ClusterServiceClient::new(&services.cluster.host, &services.cluster.port);
    let network = NetworkClient::new(&services.network.host, &services.network.port);

    run_provision(&identity, &cluster, &network, config, PollOptions::default()).await
}

/// The provisioning sequence over abstract service APIs.
pub async fn run_provision<I, C, N>(
    identity: &I,
    cluster: &C,
    network: &N,
    config: &WarehouseConfig,
    poll: PollOptions,
) -> Result<(), DwhError>
where
    I: IdentityApi + ?Sized,
    C: ClusterApi + ?Sized,
    N: NetworkApi + ?Sized,
{
    let spec = config.cluster();

    let ensured = ensure_role(identity, &spec.role)
        .await
        .map_err(DwhError::provision)?;
    match &ensured {
        RoleEnsured::Created { arn } => info!("created role '{}' ({})", spec.role.name, arn),
        RoleEnsured::AlreadyExists { arn } => {
            debug!("reusing role '{}' ({})", spec.role.name, arn)
        }
    }

    // Create outcomes are logged where they happen; every variant proceeds to
    // the availability poll.
    let _ = submit_create(cluster, spec, ensured.arn()).await;

    let token = CancellationToken::new();
    let outcome = wait_until_available(cluster, &spec.identifier, poll, &token)
        .await
        .map_err(DwhError::provision)?;
    let description = match outcome {
        WaitOutcome::Available(description) => description,
        WaitOutcome::TimedOut(description) => {
            warn!(
                "cluster '{}' is not yet available; connections may fail until it is",
                spec.identifier
            );
            description
        }
        WaitOutcome::Cancelled => {
            return Err(DwhError::provision_msg("provisioning wait was cancelled"))
        }
    };

    log_cluster_properties(&description);

    match open_ingress(network, &description, spec.port)
        .await
        .map_err(DwhError::provision)?
    {
        IngressOutcome::Opened => info!("cluster port {} is reachable", spec.port),
        IngressOutcome::AlreadyOpen => debug!("cluster port {} was already open", spec.port),
        IngressOutcome::Deferred(_) => {}
    }

    Ok(())
}

fn log_cluster_properties(description: &ClusterDescription) {
    info!(
        identifier = %description.identifier,
        status = %description.status,
        node_type = %description.node_type,
        node_count = description.node_count,
        admin_username = %description.admin_username,
        database = %description.database,
        network_id = %description.network_id,
        endpoint = description
            .endpoint
            .as_ref()
            .map(|endpoint| endpoint.address.as_str())
            .unwrap_or("-"),
        role_arn = description.role_arn.as_deref().unwrap_or("-"),
        "cluster properties"
    );
}
