use crate::{AsyncDatabaseAdapter, DatabaseAdapterError};
use async_trait::async_trait;
use std::io::ErrorKind;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Error, NoTls};
use tracing::error;

impl From<Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: Error) -> Self {
        if let Some(e) = err.as_db_error() {
            let code = e.code();
            if code == &SqlState::CONNECTION_DOES_NOT_EXIST {
                DatabaseAdapterError::invalid_connection(e.to_string())
            } else if code == &SqlState::SYNTAX_ERROR {
                DatabaseAdapterError::syntax(e.to_string())
            } else if code == &SqlState::IO_ERROR {
                DatabaseAdapterError::IoError {
                    context: common::error::DiagnosticMessage::new(e.to_string()),
                    source: std::io::Error::new(ErrorKind::Other, e.to_string()),
                }
            } else {
                DatabaseAdapterError::unexpected(e.to_string())
            }
        } else {
            DatabaseAdapterError::unexpected(err.to_string())
        }
    }
}

/// Session against the cluster database.
///
/// Statements run inside an explicit transaction that is opened lazily on the
/// first `execute` and closed by `commit`, so each pipeline step maps to
/// exactly one commit.
pub struct PostgresSession {
    client: Client,
    in_transaction: bool,
    _driver: tokio::task::JoinHandle<()>, // keep the connection task alive
}

impl PostgresSession {
    /// Create and connect, spawning the connection driver in the background.
    pub async fn new(
        host: &str,
        port: u16,
        db: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, DatabaseAdapterError> {
        let conn_str = format!(
            "host={} port={} user={} password={} dbname={}",
            host, port, user, password, db
        );
        let (client, connection) = tokio_postgres::connect(&conn_str, NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("postgres driver task exited: {e}");
            }
        });

        Ok(Self {
            client,
            in_transaction: false,
            _driver: driver,
        })
    }
}

#[async_trait]
impl AsyncDatabaseAdapter for PostgresSession {
    type Row = tokio_postgres::Row;

    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseAdapterError> {
        if !self.in_transaction {
            self.client.batch_execute("BEGIN").await?;
            self.in_transaction = true;
        }
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DatabaseAdapterError> {
        if self.in_transaction {
            self.client.batch_execute("COMMIT").await?;
            self.in_transaction = false;
        }
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Vec<Self::Row>, DatabaseAdapterError> {
        let response = self.client.query(sql, &[]).await?;
        Ok(response)
    }
}
