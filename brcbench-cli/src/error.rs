//! Harness Errors

use brcbench_core::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the harness before any candidate is touched
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The resolved input file does not exist
    #[error("file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The candidate list is unusable
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The `--filter` pattern did not compile
    #[error("invalid filter pattern: {0}")]
    Filter(#[from] regex::Error),
}
