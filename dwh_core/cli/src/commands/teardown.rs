use common::config::loader::read_config;
use common::error::DwhError;
use std::path::PathBuf;
use wh_core::functions;

/// Delete the warehouse cluster.
pub async fn handle_teardown(config_path: Option<PathBuf>) -> Result<(), DwhError> {
    let config = read_config(config_path).map_err(DwhError::init)?;
    functions::teardown(&config).await
}
