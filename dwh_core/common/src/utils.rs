use std::fs;
use std::io;
use std::path::Path;

/// Read a step's SQL from disk. Paths have already been resolved by the
/// config loader.
pub fn read_sql_file(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}
