#![warn(missing_docs)]
//! brcbench Core - Candidate Registry
//!
//! This crate provides the static description of what gets benchmarked:
//! - `Candidate` descriptors (name, working directory, build and run commands)
//! - `CommandTemplate`, a run command with exactly one `{file}` slot
//! - `Registry`, the immutable ordered list of candidates
//!
//! Nothing here spawns processes; the CLI crate owns execution.

mod registry;
mod template;

pub use registry::{Candidate, Registry, RegistryError};
pub use template::{CommandTemplate, PLACEHOLDER, TemplateError};
