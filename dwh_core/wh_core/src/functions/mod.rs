pub mod etl;
pub mod provision;
pub mod schema;
pub mod teardown;

pub use etl::etl;
pub use provision::provision;
pub use schema::schema;
pub use teardown::teardown;

use crate::render::render_statement;
use common::config::components::etl::{StepSpec, StorageConfig};
use common::config::components::global::WarehouseConfig;
use common::error::DwhError;
use common::utils::read_sql_file;
use executor::EtlStep;
use shared_clients::{create_db_session, AsyncDbSession};

/// Read and render a stage's step files into executable steps.
pub(crate) fn rendered_steps(
    specs: &[StepSpec],
    storage: &StorageConfig,
) -> Result<Vec<EtlStep>, DwhError> {
    let mut steps = Vec::with_capacity(specs.len());
    for spec in specs {
        let raw = read_sql_file(&spec.file).map_err(|err| {
            DwhError::init_msg(format!(
                "reading step '{}' from '{}': {}",
                spec.name,
                spec.file.display(),
                err
            ))
        })?;
        let statement = render_statement(&raw, storage).map_err(DwhError::init)?;
        steps.push(EtlStep::new(spec.name.clone(), statement));
    }
    Ok(steps)
}

/// Open the database session for the cluster connection of the active
/// profile.
pub(crate) async fn connect_session(config: &WarehouseConfig) -> Result<AsyncDbSession, DwhError> {
    let details = config.get_adapter_connection_details().ok_or_else(|| {
        DwhError::init_msg(format!(
            "connection '{}' is not defined in profile '{}'",
            config.warehouse_db_connection, config.connection_profile
        ))
    })?;
    create_db_session(details).await.map_err(DwhError::run)
}
