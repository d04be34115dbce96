use common::config::loader::read_config;
use common::error::DwhError;
use std::path::PathBuf;
use wh_core::functions;

/// Run the load stage and then the transform stage.
pub async fn handle_etl(config_path: Option<PathBuf>) -> Result<(), DwhError> {
    let config = read_config(config_path).map_err(DwhError::init)?;
    functions::etl(&config).await
}
