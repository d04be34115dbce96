pub mod etl;
pub mod provision;
pub mod schema;
pub mod teardown;

pub use etl::handle_etl;
pub use provision::handle_provision;
pub use schema::handle_schema;
pub use teardown::handle_teardown;
