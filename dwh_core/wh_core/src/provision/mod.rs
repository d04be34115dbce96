pub mod cluster;
pub mod ingress;
pub mod role;

pub use cluster::{
    delete_cluster, submit_create, wait_until_available, CreateOutcome, PollOptions, WaitOutcome,
};
pub use ingress::{open_ingress, IngressOutcome};
pub use role::{ensure_role, RoleEnsured};

use common::error::diagnostics::DiagnosticMessage;
use std::error::Error;
use thiserror::Error;

/// Fatal provisioning failure.
///
/// The tolerated outcomes (already-exists, duplicate rule, deferred create,
/// timeout) never surface here; they are expressed as outcome enums on the
/// individual operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("service request failed: {context}")]
    Service {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("invalid infrastructure state: {context}")]
    InvalidState { context: DiagnosticMessage },
}

impl ProvisionError {
    #[track_caller]
    pub fn service<E>(message: impl Into<String>, err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Service {
            context: DiagnosticMessage::new(format!("{}: {}", message.into(), err)),
            source: Some(Box::new(err)),
        }
    }

    #[track_caller]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}
