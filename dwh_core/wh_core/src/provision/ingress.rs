use crate::provision::ProvisionError;
use shared_clients::cluster::ClusterDescription;
use shared_clients::network::IngressRule;
use shared_clients::{NetworkApi, ServiceClientError};
use tracing::{info, warn};

/// Source range for the inbound rule.
///
/// The rule is open to all sources, matching the behavior this tool replaces;
/// see DESIGN.md before loosening or tightening it.
pub const OPEN_CIDR: &str = "0.0.0.0/0";

/// What happened to the ingress request. `Deferred` means the service call
/// failed transiently; a re-run is expected to repair it.
#[derive(Debug)]
pub enum IngressOutcome {
    Opened,
    AlreadyOpen,
    Deferred(ServiceClientError),
}

/// Ensure an inbound TCP rule for `port` exists on the cluster's network
/// boundary.
///
/// The rule lands on the first group associated with the cluster's network. A
/// rule that already exists is success-equivalent. There is no cleanup path
/// for the rule once added.
pub async fn open_ingress<N>(
    api: &N,
    description: &ClusterDescription,
    port: u16,
) -> Result<IngressOutcome, ProvisionError>
where
    N: NetworkApi + ?Sized,
{
    let groups = api
        .list_security_groups(&description.network_id)
        .await
        .map_err(|err| {
            ProvisionError::service(
                format!(
                    "listing security groups for network '{}'",
                    description.network_id
                ),
                err,
            )
        })?;

    let group = groups.first().ok_or_else(|| {
        ProvisionError::invalid_state(format!(
            "network '{}' has no security groups",
            description.network_id
        ))
    })?;

    let rule = IngressRule::tcp(port, OPEN_CIDR);
    match api.authorize_ingress(&group.id, &rule).await {
        Ok(()) => {
            info!(
                "opened tcp port {} from {} on group '{}' ({})",
                port, OPEN_CIDR, group.name, group.id
            );
            Ok(IngressOutcome::Opened)
        }
        Err(err @ ServiceClientError::AlreadyExists { .. }) => {
            info!("ingress rule already present on group '{}': {}", group.id, err);
            Ok(IngressOutcome::AlreadyOpen)
        }
        Err(err) => {
            warn!(
                "failed to authorize ingress on group '{}', a re-run may repair this: {}",
                group.id, err
            );
            Ok(IngressOutcome::Deferred(err))
        }
    }
}
