use crate::functions::{connect_session, rendered_steps};
use common::config::components::global::WarehouseConfig;
use common::error::DwhError;
use executor::{EtlError, EtlStep};
use shared_clients::AsyncDatabaseAdapter;

/// Run the two-stage pipeline against the live cluster: copy raw records into
/// staging, then reshape them into the star schema.
pub async fn etl(config: &WarehouseConfig) -> Result<(), DwhError> {
    let etl = config.etl();
    let load = rendered_steps(&etl.load, &etl.storage)?;
    let transform = rendered_steps(&etl.transform, &etl.storage)?;

    let mut session = connect_session(config).await?;
    run_pipeline(&load, &transform, session.as_mut())
        .await
        .map_err(DwhError::run)
}

/// Load strictly before transform: a transform must never see a partially
/// loaded staging table, so the second stage starts only after every load
/// step has committed.
pub async fn run_pipeline<S>(
    load: &[EtlStep],
    transform: &[EtlStep],
    session: &mut S,
) -> Result<(), EtlError>
where
    S: AsyncDatabaseAdapter + ?Sized,
{
    executor::run_load(load, session).await?;
    executor::run_transform(transform, session).await
}
