use crate::{error_from_response, NetworkApi, ServiceClientError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// A boundary group associated with a network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
}

/// An inbound rule on a boundary group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: String,
    pub port: u16,
    pub cidr: String,
}

impl IngressRule {
    pub fn tcp(port: u16, cidr: &str) -> Self {
        Self {
            protocol: "tcp".to_string(),
            port,
            cidr: cidr.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct NetworkClient {
    host: String,
}

impl NetworkClient {
    pub fn new(host: &str, port: &str) -> NetworkClient {
        Self {
            host: format!("http://{}:{}", host, port),
        }
    }
}

#[async_trait]
impl NetworkApi for NetworkClient {
    async fn list_security_groups(
        &self,
        network_id: &str,
    ) -> Result<Vec<SecurityGroup>, ServiceClientError> {
        let url = format!("{}/networks/{}/groups", &self.host, network_id);
        let client = Client::new();
        let resp = client.get(&url).send().await?;

        if resp.status().is_success() {
            let groups: Vec<SecurityGroup> = resp.json().await?;
            Ok(groups)
        } else {
            Err(error_from_response("security group listing", resp).await)
        }
    }

    async fn authorize_ingress(
        &self,
        group_id: &str,
        rule: &IngressRule,
    ) -> Result<(), ServiceClientError> {
        let client = Client::new();
        let resp = client
            .post(format!("{}/groups/{}/ingress", self.host, group_id))
            .json(rule)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response("ingress authorization", resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NetworkClient {
        let addr = server.address();
        NetworkClient::new(&addr.ip().to_string(), &addr.port().to_string())
    }

    #[tokio::test]
    async fn lists_groups_for_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/networks/net-0a1b2c/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "grp-1", "name": "default" },
                { "id": "grp-2", "name": "extra" }
            ])))
            .mount(&server)
            .await;

        let groups = client_for(&server)
            .list_security_groups("net-0a1b2c")
            .await
            .expect("listing should succeed");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "grp-1");
    }

    #[tokio::test]
    async fn authorize_sends_rule_body() {
        let server = MockServer::start().await;
        let rule = IngressRule::tcp(5439, "0.0.0.0/0");
        Mock::given(method("POST"))
            .and(path("/groups/grp-1/ingress"))
            .and(body_json(&rule))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .authorize_ingress("grp-1", &rule)
            .await
            .expect("authorization should succeed");
    }

    #[tokio::test]
    async fn duplicate_rule_maps_to_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/groups/grp-1/ingress"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({"message": "rule already present"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .authorize_ingress("grp-1", &IngressRule::tcp(5439, "0.0.0.0/0"))
            .await
            .expect_err("authorization should conflict");
        assert!(matches!(err, ServiceClientError::AlreadyExists { .. }));
    }
}
