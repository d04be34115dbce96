use crate::{error_from_response, ClusterApi, ServiceClientError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cluster lifecycle state as reported by the management service.
///
/// States other than the three we act on are folded into `Unknown`; polling
/// treats them like any other transient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Creating,
    Available,
    Deleting,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClusterStatus::Creating => "creating",
            ClusterStatus::Available => "available",
            ClusterStatus::Deleting => "deleting",
            ClusterStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

/// Description payload returned by create/describe.
///
/// `endpoint` and `role_arn` may be absent while the cluster is still
/// coming up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDescription {
    pub identifier: String,
    pub status: ClusterStatus,
    pub node_type: String,
    pub node_count: u32,
    pub admin_username: String,
    pub database: String,
    pub network_id: String,
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
    #[serde(default)]
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClusterRequest {
    pub identifier: String,
    pub cluster_type: String,
    pub node_type: String,
    pub node_count: u32,
    pub database: String,
    pub admin_username: String,
    pub admin_password: String,
    pub port: u16,
    pub role_arn: String,
}

#[derive(Debug)]
pub struct ClusterServiceClient {
    host: String,
}

impl ClusterServiceClient {
    pub fn new(host: &str, port: &str) -> ClusterServiceClient {
        Self {
            host: format!("http://{}:{}", host, port),
        }
    }
}

#[async_trait]
impl ClusterApi for ClusterServiceClient {
    async fn create_cluster(
        &self,
        request: &CreateClusterRequest,
    ) -> Result<ClusterDescription, ServiceClientError> {
        let client = Client::new();
        let resp = client
            .post(format!("{}/clusters", self.host))
            .json(request)
            .send()
            .await?;

        if resp.status().is_success() {
            let description: ClusterDescription = resp.json().await?;
            Ok(description)
        } else {
            Err(error_from_response("cluster creation", resp).await)
        }
    }

    async fn describe_cluster(
        &self,
        identifier: &str,
    ) -> Result<ClusterDescription, ServiceClientError> {
        let url = format!("{}/clusters/{}", &self.host, identifier);
        let client = Client::new();
        let resp = client.get(&url).send().await?;

        if resp.status().is_success() {
            let description: ClusterDescription = resp.json().await?;
            Ok(description)
        } else {
            Err(error_from_response("cluster description", resp).await)
        }
    }

    async fn delete_cluster(
        &self,
        identifier: &str,
        skip_final_snapshot: bool,
    ) -> Result<(), ServiceClientError> {
        let client = Client::new();
        let resp = client
            .delete(format!("{}/clusters/{}", self.host, identifier))
            .query(&[("skip_final_snapshot", skip_final_snapshot)])
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response("cluster deletion", resp).await)
        }
    }
}
