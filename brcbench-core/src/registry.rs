//! Implementation Registry
//!
//! The ordered, immutable set of candidates a run compares. Registration
//! order is report order.

use crate::template::{CommandTemplate, TemplateError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while assembling a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A candidate had a blank name
    #[error("candidate #{0} has an empty name")]
    EmptyName(usize),

    /// Two candidates shared a name
    #[error("duplicate candidate name: {0}")]
    DuplicateName(String),

    /// A build command had no tokens
    #[error("candidate {0}: build command is empty")]
    EmptyBuild(String),

    /// A run template failed validation
    #[error("candidate {name}: {source}")]
    Template {
        /// Candidate name
        name: String,
        /// Underlying template error
        #[source]
        source: TemplateError,
    },
}

/// One program under comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Display name, unique within a registry
    pub name: String,
    /// Working directory for build and run
    pub cwd: PathBuf,
    /// Build argv, absent when the candidate needs no build step
    #[serde(default)]
    pub build: Option<Vec<String>>,
    /// Run argv with its `{file}` slot
    pub run: CommandTemplate,
}

impl Candidate {
    /// Construct a candidate, validating the run template
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        cwd: impl Into<PathBuf>,
        build: Option<Vec<String>>,
        run: impl IntoIterator<Item = S>,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        let run = CommandTemplate::new(run).map_err(|source| RegistryError::Template {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            cwd: cwd.into(),
            build,
            run,
        })
    }

    /// Whether a build step runs before the timed attempts
    pub fn has_build(&self) -> bool {
        self.build.is_some()
    }
}

/// Immutable ordered list of candidates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    candidates: Vec<Candidate>,
}

impl Registry {
    /// Validate and freeze a candidate list
    pub fn new(candidates: Vec<Candidate>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.name.trim().is_empty() {
                return Err(RegistryError::EmptyName(index));
            }
            if !seen.insert(candidate.name.as_str()) {
                return Err(RegistryError::DuplicateName(candidate.name.clone()));
            }
            if matches!(&candidate.build, Some(argv) if argv.is_empty()) {
                return Err(RegistryError::EmptyBuild(candidate.name.clone()));
            }
        }
        Ok(Self { candidates })
    }

    /// The 1BRC Go implementations shipped alongside the harness
    pub fn builtin() -> Self {
        const NAMES: [&str; 8] = [
            "go-gpt5.1-with-hint",
            "go-gpt5.1",
            "go-qwen",
            "go-qwen-with-hint",
            "go-opus4.5",
            "go-opus4.5-with-hint",
            "go-gemini3",
            "go-gemini3-with-hint",
        ];

        let candidates = NAMES
            .iter()
            .map(|name| Candidate {
                name: name.to_string(),
                cwd: PathBuf::from(name),
                build: Some(
                    ["go", "build", "-o", "1brc-go", "main.go"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
                run: go_run_template(),
            })
            .collect();

        Self { candidates }
    }

    /// Resolve relative working directories against `root`
    pub fn rooted_at(self, root: &Path) -> Self {
        let candidates = self
            .candidates
            .into_iter()
            .map(|mut candidate| {
                if candidate.cwd.is_relative() {
                    candidate.cwd = root.join(&candidate.cwd);
                }
                candidate
            })
            .collect();
        Self { candidates }
    }

    /// Keep only candidates accepted by `keep`, preserving order
    pub fn retain(self, mut keep: impl FnMut(&Candidate) -> bool) -> Self {
        Self {
            candidates: self.candidates.into_iter().filter(|c| keep(c)).collect(),
        }
    }

    /// Candidates in registration order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Iterate in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

fn go_run_template() -> CommandTemplate {
    // Statically valid: one token, one placeholder.
    match CommandTemplate::new(["./1brc-go", crate::PLACEHOLDER]) {
        Ok(template) => template,
        Err(e) => unreachable!("built-in template rejected: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> Candidate {
        Candidate::new(name, name, None, ["./bin", "{file}"]).unwrap()
    }

    #[test]
    fn builtin_registry_is_valid() {
        let builtin = Registry::builtin();
        assert_eq!(builtin.len(), 8);
        let revalidated = Registry::new(builtin.candidates().to_vec()).unwrap();
        assert_eq!(revalidated, builtin);
        assert!(builtin.iter().all(Candidate::has_build));
    }

    #[test]
    fn preserves_registration_order() {
        let registry =
            Registry::new(vec![candidate("zeta"), candidate("alpha"), candidate("mid")]).unwrap();
        let names: Vec<_> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Registry::new(vec![candidate("a"), candidate("b"), candidate("a")]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("a".to_string()));
    }

    #[test]
    fn rejects_blank_names_and_empty_builds() {
        let mut blank = candidate("x");
        blank.name = "  ".to_string();
        assert_eq!(
            Registry::new(vec![candidate("ok"), blank]).unwrap_err(),
            RegistryError::EmptyName(1)
        );

        let mut no_build = candidate("y");
        no_build.build = Some(Vec::new());
        assert_eq!(
            Registry::new(vec![no_build]).unwrap_err(),
            RegistryError::EmptyBuild("y".to_string())
        );
    }

    #[test]
    fn invalid_template_names_the_candidate() {
        let err = Candidate::new("broken", ".", None, ["./bin"]).unwrap_err();
        assert!(err.to_string().starts_with("candidate broken:"));
    }

    #[test]
    fn rooted_at_only_touches_relative_dirs() {
        let mut absolute = candidate("abs");
        absolute.cwd = PathBuf::from("/opt/abs");
        let registry = Registry::new(vec![candidate("rel"), absolute])
            .unwrap()
            .rooted_at(Path::new("/work"));
        assert_eq!(registry.candidates()[0].cwd, PathBuf::from("/work/rel"));
        assert_eq!(registry.candidates()[1].cwd, PathBuf::from("/opt/abs"));
    }

    #[test]
    fn retain_keeps_order() {
        let registry = Registry::new(vec![candidate("go-a"), candidate("rust-b"), candidate("go-c")])
            .unwrap()
            .retain(|c| c.name.starts_with("go-"));
        let names: Vec<_> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["go-a", "go-c"]);
    }
}
