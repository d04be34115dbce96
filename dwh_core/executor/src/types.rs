use std::fmt;

/// One executable pipeline step: a label for logging plus the statement text,
/// already rendered. The statement is opaque to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlStep {
    pub name: String,
    pub statement: String,
}

impl EtlStep {
    pub fn new(name: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statement: statement.into(),
        }
    }
}

/// Which stage of the pipeline a batch of steps belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Schema,
    Load,
    Transform,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Schema => "schema",
            Stage::Load => "load",
            Stage::Transform => "transform",
        };
        f.write_str(s)
    }
}
