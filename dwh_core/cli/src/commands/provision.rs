use common::config::loader::read_config;
use common::error::DwhError;
use std::path::PathBuf;
use wh_core::functions;

/// Run the full provisioning sequence against the configured services.
pub async fn handle_provision(config_path: Option<PathBuf>) -> Result<(), DwhError> {
    let config = read_config(config_path).map_err(DwhError::init)?;
    functions::provision(&config).await
}
