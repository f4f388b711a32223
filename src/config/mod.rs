// src/config/mod.rs

//! Configuration loading and validation for taskwave.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the task registry: unknown or duplicate ids, cycles, bad
//!   global settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, ProjectPaths};
pub use model::{
    ConfigFile, ConfigSection, ContainsCheck, DoneWhenConfig, MinBytesCheck, RawConfigFile,
    TaskConfig,
};
