use crate::provision::ProvisionError;
use common::config::components::cluster::RoleConfig;
use shared_clients::identity::CreateRoleRequest;
use shared_clients::{IdentityApi, ServiceClientError};
use tracing::{debug, info};

/// Result of an idempotent role ensure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleEnsured {
    Created { arn: String },
    AlreadyExists { arn: String },
}

impl RoleEnsured {
    pub fn arn(&self) -> &str {
        match self {
            RoleEnsured::Created { arn } | RoleEnsured::AlreadyExists { arn } => arn,
        }
    }
}

/// Look the role up by name and create it (plus policy attachments) only when
/// the identity service reports it missing.
///
/// An existing role is returned untouched: policy attachments are not
/// verified or repaired on re-runs.
pub async fn ensure_role<I>(api: &I, config: &RoleConfig) -> Result<RoleEnsured, ProvisionError>
where
    I: IdentityApi + ?Sized,
{
    match api.get_role(&config.name).await {
        Ok(role) => {
            debug!("role '{}' already exists ({})", config.name, role.arn);
            Ok(RoleEnsured::AlreadyExists { arn: role.arn })
        }
        Err(ServiceClientError::NotFound { .. }) => {
            info!("role '{}' does not exist, creating now", config.name);
            let request = CreateRoleRequest::for_service(&config.name, &config.trust_principal);
            let role = api.create_role(&request).await.map_err(|err| {
                ProvisionError::service(format!("creating role '{}'", config.name), err)
            })?;

            for policy_arn in &config.policy_arns {
                api.attach_policy(&config.name, policy_arn)
                    .await
                    .map_err(|err| {
                        ProvisionError::service(
                            format!("attaching policy '{}' to role '{}'", policy_arn, config.name),
                            err,
                        )
                    })?;
            }

            info!("role ARN: {}", role.arn);
            Ok(RoleEnsured::Created { arn: role.arn })
        }
        Err(err) => Err(ProvisionError::service(
            format!("looking up role '{}'", config.name),
            err,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_clients::identity::Role;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeIdentity {
        state: Mutex<IdentityState>,
    }

    #[derive(Default)]
    struct IdentityState {
        roles: HashMap<String, Role>,
        create_calls: usize,
        attach_calls: Vec<String>,
        lookup_calls: usize,
    }

    impl FakeIdentity {
        fn with_role(name: &str, arn: &str) -> Self {
            let fake = Self::default();
            fake.state.lock().unwrap().roles.insert(
                name.to_string(),
                Role {
                    name: name.to_string(),
                    arn: arn.to_string(),
                },
            );
            fake
        }
    }

    #[async_trait]
    impl IdentityApi for FakeIdentity {
        async fn get_role(&self, name: &str) -> Result<Role, ServiceClientError> {
            let mut state = self.state.lock().unwrap();
            state.lookup_calls += 1;
            state
                .roles
                .get(name)
                .cloned()
                .ok_or_else(|| ServiceClientError::not_found(format!("role '{name}'")))
        }

        async fn create_role(
            &self,
            request: &CreateRoleRequest,
        ) -> Result<Role, ServiceClientError> {
            let mut state = self.state.lock().unwrap();
            state.create_calls += 1;
            let role = Role {
                name: request.name.clone(),
                arn: format!("arn:dwh:identity::role/{}", request.name),
            };
            state.roles.insert(request.name.clone(), role.clone());
            Ok(role)
        }

        async fn attach_policy(
            &self,
            role_name: &str,
            policy_arn: &str,
        ) -> Result<(), ServiceClientError> {
            let mut state = self.state.lock().unwrap();
            state
                .attach_calls
                .push(format!("{role_name}:{policy_arn}"));
            Ok(())
        }
    }

    fn role_config() -> RoleConfig {
        RoleConfig {
            name: "redshiftAccess".to_string(),
            trust_principal: "warehouse.service".to_string(),
            policy_arns: vec!["ReadOnlyStorage".to_string()],
        }
    }

    #[tokio::test]
    async fn absent_role_is_created_and_policies_attached() {
        let api = FakeIdentity::default();
        let ensured = ensure_role(&api, &role_config())
            .await
            .expect("ensure should succeed");

        assert!(matches!(ensured, RoleEnsured::Created { .. }));
        assert_eq!(ensured.arn(), "arn:dwh:identity::role/redshiftAccess");
        let state = api.state.lock().unwrap();
        assert_eq!(state.create_calls, 1);
        assert_eq!(state.attach_calls, vec!["redshiftAccess:ReadOnlyStorage"]);
    }

    #[tokio::test]
    async fn second_ensure_performs_lookup_only() {
        let api = FakeIdentity::default();
        ensure_role(&api, &role_config()).await.expect("first call");
        let ensured = ensure_role(&api, &role_config())
            .await
            .expect("second call");

        assert!(matches!(ensured, RoleEnsured::AlreadyExists { .. }));
        let state = api.state.lock().unwrap();
        assert_eq!(state.create_calls, 1, "at most one creation ever issued");
        assert_eq!(state.attach_calls.len(), 1, "no re-attachment on re-run");
        assert_eq!(state.lookup_calls, 2);
    }

    #[tokio::test]
    async fn existing_role_returns_arn_without_create() {
        let api = FakeIdentity::with_role("redshiftAccess", "arn:dwh:identity::role/existing");
        let ensured = ensure_role(&api, &role_config())
            .await
            .expect("ensure should succeed");

        assert_eq!(ensured.arn(), "arn:dwh:identity::role/existing");
        assert_eq!(api.state.lock().unwrap().create_calls, 0);
    }

    #[tokio::test]
    async fn lookup_failure_other_than_not_found_propagates() {
        struct BrokenIdentity;

        #[async_trait]
        impl IdentityApi for BrokenIdentity {
            async fn get_role(&self, _name: &str) -> Result<Role, ServiceClientError> {
                Err(ServiceClientError::failed_to_connect("identity down"))
            }

            async fn create_role(
                &self,
                _request: &CreateRoleRequest,
            ) -> Result<Role, ServiceClientError> {
                unreachable!("create must not be attempted")
            }

            async fn attach_policy(
                &self,
                _role_name: &str,
                _policy_arn: &str,
            ) -> Result<(), ServiceClientError> {
                unreachable!("attach must not be attempted")
            }
        }

        let err = ensure_role(&BrokenIdentity, &role_config())
            .await
            .expect_err("connectivity failure should propagate");
        assert!(matches!(err, ProvisionError::Service { .. }));
    }
}
