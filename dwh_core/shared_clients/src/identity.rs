use crate::{error_from_response, IdentityApi, ServiceClientError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A role as reported by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: String,
    pub trust_policy: Value,
}

impl CreateRoleRequest {
    /// Build a creation request whose trust document is scoped to a single
    /// service principal.
    pub fn for_service(name: &str, trust_principal: &str) -> Self {
        Self {
            name: name.to_string(),
            description: "Allows warehouse clusters to read from object storage on your behalf."
                .to_string(),
            trust_policy: trust_policy_document(trust_principal),
        }
    }
}

/// The assume-role trust document granting `principal` use of the role.
pub fn trust_policy_document(principal: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": principal }
        }]
    })
}

#[derive(Serialize)]
struct AttachPolicyRequest<'a> {
    policy_arn: &'a str,
}

#[derive(Debug)]
pub struct IdentityClient {
    host: String,
}

impl IdentityClient {
    pub fn new(host: &str, port: &str) -> IdentityClient {
        Self {
            host: format!("http://{}:{}", host, port),
        }
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn get_role(&self, name: &str) -> Result<Role, ServiceClientError> {
        let url = format!("{}/roles/{}", &self.host, name);
        let client = Client::new();
        let resp = client.get(&url).send().await?;

        if resp.status().is_success() {
            let role: Role = resp.json().await?;
            Ok(role)
        } else {
            Err(error_from_response("role lookup", resp).await)
        }
    }

    async fn create_role(&self, request: &CreateRoleRequest) -> Result<Role, ServiceClientError> {
        let client = Client::new();
        let resp = client
            .post(format!("{}/roles", self.host))
            .json(request)
            .send()
            .await?;

        if resp.status().is_success() {
            let role: Role = resp.json().await?;
            Ok(role)
        } else {
            Err(error_from_response("role creation", resp).await)
        }
    }

    async fn attach_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), ServiceClientError> {
        let client = Client::new();
        let resp = client
            .post(format!("{}/roles/{}/policies", self.host, role_name))
            .json(&AttachPolicyRequest { policy_arn })
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response("policy attachment", resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> IdentityClient {
        let addr = server.address();
        IdentityClient::new(&addr.ip().to_string(), &addr.port().to_string())
    }

    #[tokio::test]
    async fn get_role_returns_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/roles/storageRead"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "storageRead",
                "arn": "arn:dwh:identity::role/storageRead"
            })))
            .mount(&server)
            .await;

        let role = client_for(&server)
            .get_role("storageRead")
            .await
            .expect("role should resolve");
        assert_eq!(role.name, "storageRead");
        assert_eq!(role.arn, "arn:dwh:identity::role/storageRead");
    }

    #[tokio::test]
    async fn missing_role_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/roles/absent"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "no such role"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_role("absent")
            .await
            .expect_err("lookup should fail");
        assert!(matches!(err, ServiceClientError::NotFound { .. }));
    }

    #[tokio::test]
    async fn create_role_posts_trust_document() {
        let server = MockServer::start().await;
        let request = CreateRoleRequest::for_service("storageRead", "warehouse.internal");

        Mock::given(method("POST"))
            .and(path("/roles"))
            .and(body_json(&request))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "name": "storageRead",
                "arn": "arn:dwh:identity::role/storageRead"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let role = client_for(&server)
            .create_role(&request)
            .await
            .expect("creation should succeed");
        assert_eq!(role.arn, "arn:dwh:identity::role/storageRead");
        assert_eq!(
            request.trust_policy["Statement"][0]["Principal"]["Service"],
            "warehouse.internal"
        );
    }

    #[tokio::test]
    async fn attach_policy_is_ok_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/roles/storageRead/policies"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .attach_policy("storageRead", "arn:dwh:policy/ReadOnlyStorage")
            .await
            .expect("attachment should succeed");
    }
}
