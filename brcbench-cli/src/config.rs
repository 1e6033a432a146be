//! Configuration loading from brcbench.toml
//!
//! The harness configuration can be specified in a `brcbench.toml` file in the
//! directory that holds the candidate implementations. The configuration is
//! automatically discovered by walking up from the current directory.
//! Candidate working directories are relative to the file's directory.

use brcbench_core::{Candidate, Registry, RegistryError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the discovered configuration file
pub const CONFIG_FILE: &str = "brcbench.toml";

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrcConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Candidate list; empty means the built-in registry
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Timed repetitions per candidate (clamped to at least 1)
    #[serde(default = "default_runs")]
    pub runs: i64,
    /// Per-command timeout (e.g., "90s", "5m"); absent or "0s" waits forever
    #[serde(default)]
    pub timeout: Option<String>,
    /// Number of candidates benchmarked concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            timeout: None,
            jobs: default_jobs(),
        }
    }
}

fn default_runs() -> i64 {
    1
}
fn default_jobs() -> usize {
    1
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

/// A configuration together with the directory it governs
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Directory candidate paths and the default input resolve against
    pub root: PathBuf,
    /// Parsed configuration
    pub config: BrcConfig,
    /// File the configuration came from, if any
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Resolve the configuration: explicit path, else discovery, else defaults
    /// rooted at the current directory.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => BrcConfig::discover_from(&cwd),
        };

        let Some(path) = path else {
            tracing::debug!(root = %cwd.display(), "no {} found, using built-in candidates", CONFIG_FILE);
            return Ok(Self {
                root: cwd,
                config: BrcConfig::default(),
                path: None,
            });
        };

        let config = BrcConfig::load(&path)?;
        let path = std::path::absolute(&path)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());
        tracing::debug!(config = %path.display(), "loaded configuration");

        Ok(Self {
            root,
            config,
            path: Some(path),
        })
    }

    /// Default input file: `data/medium.txt` under the root
    pub fn default_input(&self) -> PathBuf {
        self.root.join("data").join("medium.txt")
    }

    /// Build the candidate registry with working directories resolved
    pub fn registry(&self) -> Result<Registry, RegistryError> {
        let registry = if self.config.candidates.is_empty() {
            Registry::builtin()
        } else {
            Registry::new(self.config.candidates.clone())?
        };
        Ok(registry.rooted_at(&self.root))
    }
}

impl BrcConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Walk up from `start` looking for `brcbench.toml`
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.is_file() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Resolved timeout; `None` when unset or zero
    pub fn timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.runner
            .timeout
            .as_deref()
            .map(parse_timeout)
            .transpose()
            .map(Option::flatten)
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# brcbench configuration
# Candidate directories are relative to this file.

[runner]
# Timed repetitions per candidate; the first is a warmup when runs > 1
runs = 1
# Per-command timeout (uncomment to enable)
# timeout = "5m"
# Candidates benchmarked at once; values above 1 skew timings
jobs = 1

[output]
# Default output format: human, json, csv
format = "human"

# Omit every [[candidates]] entry to use the built-in Go implementations.
[[candidates]]
name = "go-qwen"
cwd = "go-qwen"
build = ["go", "build", "-o", "1brc-go", "main.go"]
run = ["./1brc-go", "{file}"]

[[candidates]]
name = "go-gemini3"
cwd = "go-gemini3"
build = ["go", "build", "-o", "1brc-go", "main.go"]
run = ["./1brc-go", "{file}"]
"#
        .to_string()
    }
}

/// Parse a timeout string; zero disables the timeout
pub fn parse_timeout(s: &str) -> anyhow::Result<Option<Duration>> {
    let nanos = parse_duration(s)?;
    Ok((nanos > 0).then(|| Duration::from_nanos(nanos)))
}

/// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Empty duration string"));
    }

    // Find where the number ends and unit begins
    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "s"));

    let value: f64 = num_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
    if value < 0.0 || !value.is_finite() {
        return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
    }

    let multiplier: u64 = match unit_part.to_lowercase().as_str() {
        "ns" => 1,
        "us" | "µs" => 1_000,
        "ms" => 1_000_000,
        "s" | "" => 1_000_000_000,
        "m" | "min" => 60_000_000_000,
        "h" => 3_600_000_000_000,
        _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
    };

    Ok((value * multiplier as f64) as u64)
}
