pub mod types;

pub use crate::types::{EtlStep, Stage};

use common::error::diagnostics::DiagnosticMessage;
use logging::timeit;
use shared_clients::{AsyncDatabaseAdapter, DatabaseAdapterError};
use std::error::Error;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("connection failed: {context}")]
    FailedToConnect {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("execution failed: {context}")]
    FailedToExecute {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("configuration error: {context}")]
    ConfigError {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("I/O error: {context}")]
    IoError {
        context: DiagnosticMessage,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected error: {context}")]
    UnexpectedError {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
}

impl EtlError {
    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn failed_to_execute(message: impl Into<String>) -> Self {
        Self::FailedToExecute {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn failed_to_connect(message: impl Into<String>) -> Self {
        Self::FailedToConnect {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedError {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }
}

impl From<DatabaseAdapterError> for EtlError {
    #[track_caller]
    fn from(value: DatabaseAdapterError) -> Self {
        match value {
            DatabaseAdapterError::InvalidConnectionError { context } => EtlError::FailedToConnect {
                context,
                source: None,
            },
            DatabaseAdapterError::SyntaxError { context } => EtlError::FailedToExecute {
                context,
                source: None,
            },
            DatabaseAdapterError::UnexpectedError { context } => EtlError::UnexpectedError {
                context,
                source: None,
            },
            DatabaseAdapterError::IoError { context, source } => {
                EtlError::IoError { context, source }
            }
            DatabaseAdapterError::ConfigError { context } => EtlError::ConfigError {
                context,
                source: None,
            },
        }
    }
}

/// Run a stage's steps strictly in order against the session.
///
/// Each step executes and then commits before the next one starts; the first
/// failure aborts the remainder of the stage with nothing committed for the
/// failing step. There is no retry and no cleanup of earlier commits.
pub async fn run_steps<S>(stage: Stage, steps: &[EtlStep], session: &mut S) -> Result<(), EtlError>
where
    S: AsyncDatabaseAdapter + ?Sized,
{
    timeit!(format!("Finished {} stage ({} steps)", stage, steps.len()), {
        for step in steps {
            info!("running {} step '{}'", stage, step.name);
            timeit!(format!("Committed {} step '{}'", stage, step.name), {
                session.execute(&step.statement).await?;
                session.commit().await?;
            });
        }
    });

    Ok(())
}

/// Drop-and-create the staging and star-schema tables.
pub async fn run_schema<S>(steps: &[EtlStep], session: &mut S) -> Result<(), EtlError>
where
    S: AsyncDatabaseAdapter + ?Sized,
{
    run_steps(Stage::Schema, steps, session).await
}

/// Copy raw records from object storage into the staging tables.
pub async fn run_load<S>(steps: &[EtlStep], session: &mut S) -> Result<(), EtlError>
where
    S: AsyncDatabaseAdapter + ?Sized,
{
    run_steps(Stage::Load, steps, session).await
}

/// Reshape staged records into the final star schema. Callers must not start
/// this stage until every load step has committed.
pub async fn run_transform<S>(steps: &[EtlStep], session: &mut S) -> Result<(), EtlError>
where
    S: AsyncDatabaseAdapter + ?Sized,
{
    run_steps(Stage::Transform, steps, session).await
}
