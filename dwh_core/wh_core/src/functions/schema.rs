use crate::functions::{connect_session, rendered_steps};
use common::config::components::global::WarehouseConfig;
use common::error::DwhError;
use tracing::info;

/// Recreate the staging and star-schema tables on the live cluster.
///
/// Each schema step drops its table if present before creating it, so the
/// command is safe to re-run.
pub async fn schema(config: &WarehouseConfig) -> Result<(), DwhError> {
    let etl = config.etl();
    let steps = rendered_steps(&etl.schema, &etl.storage)?;
    if steps.is_empty() {
        info!("no schema steps configured, nothing to do");
        return Ok(());
    }

    let mut session = connect_session(config).await?;
    executor::run_schema(&steps, session.as_mut())
        .await
        .map_err(DwhError::run)
}
