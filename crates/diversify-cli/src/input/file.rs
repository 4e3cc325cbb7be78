use diversify_core::config::PortfolioConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level layout of the YAML configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    config: PortfolioConfig,
}

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read(&canonical)?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read the `config:` section of a YAML file and check it.
pub fn read_config(path: &str) -> Result<PortfolioConfig, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read(&canonical)?;
    let file: ConfigFile = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    file.config.validate()?;
    Ok(file.config)
}

/// Pretty-print `value` as JSON into `path`, replacing any existing file.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents + "\n").map_err(|e| format!("Failed to write '{}': {}", path, e))?;
    Ok(())
}

fn read(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?)
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
