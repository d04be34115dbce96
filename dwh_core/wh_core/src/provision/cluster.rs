use crate::provision::ProvisionError;
use common::config::components::cluster::ClusterSpec;
use shared_clients::cluster::{ClusterDescription, ClusterStatus, CreateClusterRequest};
use shared_clients::{ClusterApi, ServiceClientError};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Interval and wall-clock bound for the availability poll.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(600),
        }
    }
}

/// What happened to a creation request. Only `Submitted` carries a
/// description; the other two mean "describe and poll to find out".
#[derive(Debug)]
pub enum CreateOutcome {
    Submitted(ClusterDescription),
    AlreadyExists,
    Deferred(ServiceClientError),
}

/// Terminal state of the availability poll. `TimedOut` hands back the last
/// observed description; callers must check its status themselves when they
/// require guaranteed availability.
#[derive(Debug)]
pub enum WaitOutcome {
    Available(ClusterDescription),
    TimedOut(ClusterDescription),
    Cancelled,
}

impl WaitOutcome {
    pub fn description(&self) -> Option<&ClusterDescription> {
        match self {
            WaitOutcome::Available(desc) | WaitOutcome::TimedOut(desc) => Some(desc),
            WaitOutcome::Cancelled => None,
        }
    }
}

pub fn creation_request(spec: &ClusterSpec, role_arn: &str) -> CreateClusterRequest {
    CreateClusterRequest {
        identifier: spec.identifier.clone(),
        cluster_type: spec.cluster_type.clone(),
        node_type: spec.node_type.clone(),
        node_count: spec.node_count,
        database: spec.database.clone(),
        admin_username: spec.admin_username.clone(),
        admin_password: spec.admin_password.clone(),
        port: spec.port,
        role_arn: role_arn.to_string(),
    }
}

/// Submit the creation request.
///
/// Provisioning is expected to be re-run, so an already-existing cluster and
/// transient service failures are both non-fatal here: they are logged and
/// the caller proceeds to describe/poll the cluster regardless.
pub async fn submit_create<C>(api: &C, spec: &ClusterSpec, role_arn: &str) -> CreateOutcome
where
    C: ClusterApi + ?Sized,
{
    let request = creation_request(spec, role_arn);
    match api.create_cluster(&request).await {
        Ok(description) => {
            info!(
                "cluster '{}' creation submitted (status: {})",
                spec.identifier, description.status
            );
            CreateOutcome::Submitted(description)
        }
        Err(err @ ServiceClientError::AlreadyExists { .. }) => {
            info!("cluster '{}' already exists: {}", spec.identifier, err);
            CreateOutcome::AlreadyExists
        }
        Err(err) => {
            warn!(
                "cluster '{}' creation failed, will still attempt to describe: {}",
                spec.identifier, err
            );
            CreateOutcome::Deferred(err)
        }
    }
}

/// Poll the cluster description until it reports `available`, the timeout
/// elapses, or the token is cancelled.
///
/// The timeout is a bound, not a guarantee of availability; this returns
/// within `timeout + interval` of wall clock no matter what the service
/// reports. A describe failure mid-poll is logged and consumes one tick, but
/// the *first* describe failing means there is nothing to poll and is an
/// error.
pub async fn wait_until_available<C>(
    api: &C,
    identifier: &str,
    options: PollOptions,
    cancel: &CancellationToken,
) -> Result<WaitOutcome, ProvisionError>
where
    C: ClusterApi + ?Sized,
{
    let start = Instant::now();
    let mut last: Option<ClusterDescription> = None;

    loop {
        match api.describe_cluster(identifier).await {
            Ok(description) => {
                if description.status == ClusterStatus::Available {
                    info!("cluster '{}' is available", identifier);
                    return Ok(WaitOutcome::Available(description));
                }
                info!("cluster status: {}", description.status);
                if start.elapsed() >= options.timeout {
                    warn!(
                        "cluster '{}' not available within {:?}, returning last-observed state",
                        identifier, options.timeout
                    );
                    return Ok(WaitOutcome::TimedOut(description));
                }
                last = Some(description);
            }
            Err(err) => match &last {
                None => {
                    return Err(ProvisionError::service(
                        format!("describing cluster '{identifier}'"),
                        err,
                    ))
                }
                Some(description) => {
                    warn!(
                        "describe failed while waiting for cluster '{}': {}",
                        identifier, err
                    );
                    if start.elapsed() >= options.timeout {
                        warn!(
                            "cluster '{}' not available within {:?}, returning last-observed state",
                            identifier, options.timeout
                        );
                        return Ok(WaitOutcome::TimedOut(description.clone()));
                    }
                }
            },
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                warn!("wait for cluster '{}' was cancelled", identifier);
                return Ok(WaitOutcome::Cancelled);
            }
            _ = sleep(options.interval) => {}
        }
    }
}

/// Delete the cluster, always skipping the final snapshot.
///
/// Unlike creation this is fatal on failure: a destructive operation must not
/// silently no-op.
pub async fn delete_cluster<C>(api: &C, identifier: &str) -> Result<(), ProvisionError>
where
    C: ClusterApi + ?Sized,
{
    info!("deleting cluster '{}' (skipping final snapshot)", identifier);
    api.delete_cluster(identifier, true)
        .await
        .map_err(|err| ProvisionError::service(format!("deleting cluster '{identifier}'"), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct FakeCluster {
        statuses: Mutex<VecDeque<ClusterStatus>>,
        describe_calls: Mutex<usize>,
        create_result: Mutex<Option<ServiceClientError>>,
        delete_calls: Mutex<Vec<(String, bool)>>,
    }

    impl FakeCluster {
        fn with_statuses(statuses: &[ClusterStatus]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                describe_calls: Mutex::new(0),
                create_result: Mutex::new(None),
                delete_calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_create(err: ServiceClientError) -> Self {
            let fake = Self::with_statuses(&[ClusterStatus::Available]);
            *fake.create_result.lock().unwrap() = Some(err);
            fake
        }

        fn description(status: ClusterStatus) -> ClusterDescription {
            ClusterDescription {
                identifier: "dwh-cluster".to_string(),
                status,
                node_type: "dc2.large".to_string(),
                node_count: 4,
                admin_username: "dwhadmin".to_string(),
                database: "dwh".to_string(),
                network_id: "net-0a1b2c".to_string(),
                endpoint: None,
                role_arn: None,
            }
        }
    }

    #[async_trait]
    impl ClusterApi for FakeCluster {
        async fn create_cluster(
            &self,
            request: &CreateClusterRequest,
        ) -> Result<ClusterDescription, ServiceClientError> {
            if let Some(err) = self.create_result.lock().unwrap().take() {
                return Err(err);
            }
            let _ = request;
            Ok(Self::description(ClusterStatus::Creating))
        }

        async fn describe_cluster(
            &self,
            _identifier: &str,
        ) -> Result<ClusterDescription, ServiceClientError> {
            *self.describe_calls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            let status = match statuses.len() {
                0 => ClusterStatus::Creating,
                1 => *statuses.front().expect("non-empty"),
                _ => statuses.pop_front().expect("non-empty"),
            };
            Ok(Self::description(status))
        }

        async fn delete_cluster(
            &self,
            identifier: &str,
            skip_final_snapshot: bool,
        ) -> Result<(), ServiceClientError> {
            self.delete_calls
                .lock()
                .unwrap()
                .push((identifier.to_string(), skip_final_snapshot));
            Ok(())
        }
    }

    fn spec() -> ClusterSpec {
        ClusterSpec {
            identifier: "dwh-cluster".to_string(),
            cluster_type: "multi-node".to_string(),
            node_type: "dc2.large".to_string(),
            node_count: 4,
            database: "dwh".to_string(),
            admin_username: "dwhadmin".to_string(),
            admin_password: "secret".to_string(),
            port: 5439,
            role: common::config::components::cluster::RoleConfig {
                name: "storageRead".to_string(),
                trust_principal: "warehouse.internal".to_string(),
                policy_arns: Vec::new(),
            },
        }
    }

    fn options(timeout_secs: u64) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_once_available() {
        let api = FakeCluster::with_statuses(&[
            ClusterStatus::Creating,
            ClusterStatus::Creating,
            ClusterStatus::Available,
        ]);
        let token = CancellationToken::new();

        let start = Instant::now();
        let outcome = wait_until_available(&api, "dwh-cluster", options(600), &token)
            .await
            .expect("wait should succeed");

        assert!(matches!(outcome, WaitOutcome::Available(_)));
        assert_eq!(*api.describe_calls.lock().unwrap(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_is_bounded_when_never_available() {
        let api = FakeCluster::with_statuses(&[ClusterStatus::Creating]);
        let token = CancellationToken::new();

        let start = Instant::now();
        let outcome = wait_until_available(&api, "dwh-cluster", options(30), &token)
            .await
            .expect("wait should not error");

        match outcome {
            WaitOutcome::TimedOut(description) => {
                assert_eq!(description.status, ClusterStatus::Creating);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // describes at t=0, 10, 20 and 30; bounded by timeout + interval
        assert_eq!(*api.describe_calls.lock().unwrap(), 4);
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert!(start.elapsed() <= Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_stops_on_cancellation() {
        let api = FakeCluster::with_statuses(&[ClusterStatus::Creating]);
        let token = CancellationToken::new();
        let cancel_handle = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(15)).await;
            cancel_handle.cancel();
        });

        let outcome = wait_until_available(&api, "dwh-cluster", options(600), &token)
            .await
            .expect("wait should not error");

        assert!(matches!(outcome, WaitOutcome::Cancelled));
        assert_eq!(*api.describe_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn create_conflict_is_tolerated() {
        let api =
            FakeCluster::failing_create(ServiceClientError::already_exists("duplicate cluster"));
        let outcome = submit_create(&api, &spec(), "arn:dwh:identity::role/storageRead").await;
        assert!(matches!(outcome, CreateOutcome::AlreadyExists));
    }

    #[tokio::test]
    async fn create_transient_failure_is_deferred() {
        let api =
            FakeCluster::failing_create(ServiceClientError::failed_to_connect("service down"));
        let outcome = submit_create(&api, &spec(), "arn:dwh:identity::role/storageRead").await;
        assert!(matches!(
            outcome,
            CreateOutcome::Deferred(ServiceClientError::FailedToConnect { .. })
        ));
    }

    #[tokio::test]
    async fn delete_always_skips_final_snapshot() {
        let api = FakeCluster::with_statuses(&[ClusterStatus::Available]);
        delete_cluster(&api, "dwh-cluster")
            .await
            .expect("delete should succeed");

        assert_eq!(
            *api.delete_calls.lock().unwrap(),
            vec![("dwh-cluster".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn delete_failure_propagates() {
        struct BrokenDelete;

        #[async_trait]
        impl ClusterApi for BrokenDelete {
            async fn create_cluster(
                &self,
                _request: &CreateClusterRequest,
            ) -> Result<ClusterDescription, ServiceClientError> {
                unreachable!()
            }

            async fn describe_cluster(
                &self,
                _identifier: &str,
            ) -> Result<ClusterDescription, ServiceClientError> {
                unreachable!()
            }

            async fn delete_cluster(
                &self,
                _identifier: &str,
                _skip_final_snapshot: bool,
            ) -> Result<(), ServiceClientError> {
                Err(ServiceClientError::unexpected("deletion rejected"))
            }
        }

        let err = delete_cluster(&BrokenDelete, "dwh-cluster")
            .await
            .expect_err("delete should fail");
        assert!(matches!(err, ProvisionError::Service { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn describe_failure_mid_poll_consumes_a_tick() {
        struct FlakyDescribe {
            calls: Mutex<usize>,
        }

        #[async_trait]
        impl ClusterApi for FlakyDescribe {
            async fn create_cluster(
                &self,
                _request: &CreateClusterRequest,
            ) -> Result<ClusterDescription, ServiceClientError> {
                unreachable!()
            }

            async fn describe_cluster(
                &self,
                _identifier: &str,
            ) -> Result<ClusterDescription, ServiceClientError> {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                match *calls {
                    1 => Ok(FakeCluster::description(ClusterStatus::Creating)),
                    2 => Err(ServiceClientError::failed_to_connect("blip")),
                    _ => Ok(FakeCluster::description(ClusterStatus::Available)),
                }
            }

            async fn delete_cluster(
                &self,
                _identifier: &str,
                _skip_final_snapshot: bool,
            ) -> Result<(), ServiceClientError> {
                unreachable!()
            }
        }

        let api = FlakyDescribe {
            calls: Mutex::new(0),
        };
        let token = CancellationToken::new();
        let outcome = wait_until_available(&api, "dwh-cluster", options(600), &token)
            .await
            .expect("transient describe failure should not abort the wait");

        assert!(matches!(outcome, WaitOutcome::Available(_)));
        assert_eq!(*api.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn first_describe_failure_is_fatal() {
        struct DescribeDown;

        #[async_trait]
        impl ClusterApi for DescribeDown {
            async fn create_cluster(
                &self,
                _request: &CreateClusterRequest,
            ) -> Result<ClusterDescription, ServiceClientError> {
                unreachable!()
            }

            async fn describe_cluster(
                &self,
                _identifier: &str,
            ) -> Result<ClusterDescription, ServiceClientError> {
                Err(ServiceClientError::not_found("no such cluster"))
            }

            async fn delete_cluster(
                &self,
                _identifier: &str,
                _skip_final_snapshot: bool,
            ) -> Result<(), ServiceClientError> {
                unreachable!()
            }
        }

        let token = CancellationToken::new();
        let err = wait_until_available(&DescribeDown, "dwh-cluster", options(30), &token)
            .await
            .expect_err("nothing to poll should be an error");
        assert!(matches!(err, ProvisionError::Service { .. }));
    }
}
