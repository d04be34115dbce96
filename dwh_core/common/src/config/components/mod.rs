pub mod cluster;
pub mod connections;
pub mod etl;
pub mod global;
pub mod project;
pub mod services;
