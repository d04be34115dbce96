use serde::Deserialize;

/// Hardware and identity parameters for the warehouse cluster.
///
/// Immutable once submitted for creation; the cluster-management service is
/// the source of truth afterwards, this struct is only the request.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSpec {
    pub identifier: String,
    pub cluster_type: String,
    pub node_type: String,
    pub node_count: u32,
    pub database: String,
    pub admin_username: String,
    pub admin_password: String,
    pub port: u16,
    pub role: RoleConfig,
}

/// The access-control role the cluster assumes for storage reads.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleConfig {
    pub name: String,
    pub trust_principal: String,
    #[serde(default)]
    pub policy_arns: Vec<String>,
}
