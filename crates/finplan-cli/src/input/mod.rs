pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Engine input from `--input <file>` or piped stdin, `None` when neither is given.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Like [`load`], for commands that only accept structured input.
pub fn require<T: DeserializeOwned>(path: Option<&str>, what: &str) -> Result<T, Box<dyn std::error::Error>> {
    load(path)?.ok_or_else(|| format!("{what} requires --input <file> or JSON on stdin").into())
}
