pub mod cluster;
pub mod identity;
pub mod network;
pub mod postgres;

use crate::cluster::{ClusterDescription, CreateClusterRequest};
use crate::identity::{CreateRoleRequest, Role};
use crate::network::{IngressRule, SecurityGroup};
use crate::postgres::PostgresSession;
use async_trait::async_trait;
use common::config::components::connections::{AdapterConnectionDetails, DatabaseAdapterType};
use common::error::diagnostics::DiagnosticMessage;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Error taxonomy shared by the three provisioning-service clients.
///
/// `NotFound` and `AlreadyExists` are part of the normal control flow for
/// idempotent re-runs; callers decide whether they are tolerable. Everything
/// else is either connectivity or an unexpected response.
#[derive(Debug, Error)]
pub enum ServiceClientError {
    #[error("resource not found: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("resource already exists: {context}")]
    AlreadyExists { context: DiagnosticMessage },
    #[error("connectivity error: {context}")]
    FailedToConnect { context: DiagnosticMessage },
    #[error("unexpected response: {context}")]
    Unexpected { context: DiagnosticMessage },
}

impl ServiceClientError {
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn failed_to_connect(message: impl Into<String>) -> Self {
        Self::FailedToConnect {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<reqwest::Error> for ServiceClientError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ServiceClientError::failed_to_connect(err.to_string())
        } else if let Some(status) = err.status() {
            match status {
                StatusCode::NOT_FOUND => ServiceClientError::not_found(err.to_string()),
                StatusCode::CONFLICT => ServiceClientError::already_exists(err.to_string()),
                _ => ServiceClientError::unexpected(format!(
                    "request failed with status {status}: {err}"
                )),
            }
        } else {
            ServiceClientError::unexpected(format!("request could not be sent: {err}"))
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ServiceErrorBody {
    pub(crate) message: String,
}

/// Turn a non-success response into the matching error kind, pulling the
/// service's `{"message": …}` body when it has one.
pub(crate) async fn error_from_response(
    operation: &str,
    resp: reqwest::Response,
) -> ServiceClientError {
    let status = resp.status();
    let fallback = format!("{operation} failed with status {status}");
    let message = resp
        .json::<ServiceErrorBody>()
        .await
        .map(|body| format!("{operation}: {}", body.message))
        .unwrap_or(fallback);

    match status {
        StatusCode::NOT_FOUND => ServiceClientError::not_found(message),
        StatusCode::CONFLICT => ServiceClientError::already_exists(message),
        _ => ServiceClientError::unexpected(message),
    }
}

/// Role lookup/create/attach surface of the identity service.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn get_role(&self, name: &str) -> Result<Role, ServiceClientError>;
    async fn create_role(&self, request: &CreateRoleRequest) -> Result<Role, ServiceClientError>;
    async fn attach_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), ServiceClientError>;
}

/// Create/describe/delete surface of the cluster-management service.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn create_cluster(
        &self,
        request: &CreateClusterRequest,
    ) -> Result<ClusterDescription, ServiceClientError>;
    async fn describe_cluster(
        &self,
        identifier: &str,
    ) -> Result<ClusterDescription, ServiceClientError>;
    async fn delete_cluster(
        &self,
        identifier: &str,
        skip_final_snapshot: bool,
    ) -> Result<(), ServiceClientError>;
}

/// Ingress surface of the network-boundary service.
#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn list_security_groups(
        &self,
        network_id: &str,
    ) -> Result<Vec<SecurityGroup>, ServiceClientError>;
    async fn authorize_ingress(
        &self,
        group_id: &str,
        rule: &IngressRule,
    ) -> Result<(), ServiceClientError>;
}

#[derive(Debug, Error)]
pub enum DatabaseAdapterError {
    #[error("invalid connection details: {context}")]
    InvalidConnectionError { context: DiagnosticMessage },
    #[error("SQL syntax error: {context}")]
    SyntaxError { context: DiagnosticMessage },
    #[error("unexpected database error: {context}")]
    UnexpectedError { context: DiagnosticMessage },
    #[error("I/O error: {context}")]
    IoError {
        context: DiagnosticMessage,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {context}")]
    ConfigError { context: DiagnosticMessage },
}

impl DatabaseAdapterError {
    #[track_caller]
    pub fn invalid_connection(message: impl Into<String>) -> Self {
        Self::InvalidConnectionError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<std::io::Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        let message = err.to_string();
        DatabaseAdapterError::IoError {
            context: DiagnosticMessage::new(message),
            source: err,
        }
    }
}

/// The database session used by the ETL pipeline.
///
/// `execute` runs a statement inside the session's open transaction and
/// `commit` makes the work durable; one commit per pipeline step.
#[async_trait]
pub trait AsyncDatabaseAdapter: Send + Sync {
    type Row: Send + 'static;
    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseAdapterError>;
    async fn commit(&mut self) -> Result<(), DatabaseAdapterError>;
    async fn query(&self, sql: &str) -> Result<Vec<Self::Row>, DatabaseAdapterError>;
}

#[async_trait]
impl<T> AsyncDatabaseAdapter for &mut T
where
    T: AsyncDatabaseAdapter + Send + Sync + ?Sized,
{
    type Row = T::Row;

    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseAdapterError> {
        (**self).execute(sql).await
    }

    async fn commit(&mut self) -> Result<(), DatabaseAdapterError> {
        (**self).commit().await
    }

    async fn query(&self, sql: &str) -> Result<Vec<Self::Row>, DatabaseAdapterError> {
        (**self).query(sql).await
    }
}

pub type AsyncDbSession =
    Box<dyn AsyncDatabaseAdapter<Row = tokio_postgres::Row> + Send + Sync + 'static>;

pub async fn create_db_session(
    conn_details: AdapterConnectionDetails,
) -> Result<AsyncDbSession, DatabaseAdapterError> {
    match conn_details.adapter_type {
        DatabaseAdapterType::Postgres => {
            let port = conn_details.port.parse::<u16>().map_err(|_| {
                DatabaseAdapterError::invalid_connection(format!(
                    "port '{}' is not a valid port number",
                    conn_details.port
                ))
            })?;
            Ok(Box::new(
                PostgresSession::new(
                    conn_details.host.as_str(),
                    port,
                    conn_details.database.as_str(),
                    conn_details.user.as_str(),
                    conn_details.password.as_str(),
                )
                .await?,
            ))
        }
    }
}
