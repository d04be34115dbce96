use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// One pipeline step: a label for logging plus the file holding its SQL.
///
/// Paths are resolved against the project root by the loader.
#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    pub name: String,
    pub file: PathBuf,
}

/// Template context for the load statements: the read-authorization role ARN
/// plus named object-storage locations (`{{ storage.<key> }}` in templates).
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub role_arn: String,
    #[serde(flatten)]
    pub locations: HashMap<String, String>,
}

/// The ordered stages of the pipeline.
///
/// `schema` files carry drop+create DDL, `load` files copy from object
/// storage into staging tables, `transform` files reshape staging data into
/// the final star schema. Order within each list is execution order.
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub schema: Vec<StepSpec>,
    #[serde(default)]
    pub load: Vec<StepSpec>,
    #[serde(default)]
    pub transform: Vec<StepSpec>,
}
