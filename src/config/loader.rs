// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (dependency references, cycles, etc.). Use [`load_and_validate`]
/// for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Rejects unknown `after` references, duplicate ids and cycles before any
///   scheduling decision can be made.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config file name, looked up in the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Taskwave.toml";

/// Filesystem locations derived from the config file location.
///
/// Relative paths in `[config]` and in `done_when` checks are resolved
/// against `root`, the directory containing the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub state_file: PathBuf,
    pub marker_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(config_path: &Path, cfg: &ConfigFile) -> Self {
        let root = config_root_dir(config_path);
        Self {
            state_file: root.join(&cfg.config.state_file),
            marker_dir: root.join(&cfg.config.marker_dir),
            root,
        }
    }
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "configs/Taskwave.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Taskwave.toml" (parent = ""),
///   we fall back to the current directory ".".
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
