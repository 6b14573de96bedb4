//! Worker configuration: built-in defaults, JSON files and CLI descriptors.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{PatternKind, WorkerId, WorkerSpec};

/// File name looked up under the user's config directory.
pub const CONFIG_FILE: &str = "workers.json";

/// Join timeout used when neither the CLI nor the config file sets one.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid worker descriptor '{descriptor}': {reason}")]
    Descriptor { descriptor: String, reason: String },
}

/// Contents of a worker configuration file.
///
/// ```json
/// {
///   "workers": [
///     {"id": 1, "pattern": "counter", "pace_ms": 10},
///     {"id": 2, "pattern": "banner", "pace_ms": 500}
///   ],
///   "join_timeout_ms": 2000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Workers to start, in order.
    pub workers: Vec<WorkerSpec>,

    /// Timeout for the join that follows a cancel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_timeout_ms: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: WorkerSpec::defaults(),
            join_timeout_ms: None,
        }
    }
}

impl RunnerConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default config location: `<config dir>/weft/workers.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weft").join(CONFIG_FILE))
    }

    /// Resolve the configuration to run with.
    ///
    /// An explicit path must load. Otherwise the default location is used
    /// when the file exists, and the built-in demo set when it does not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Configuration whose workers come from CLI descriptors, numbered from 1.
    pub fn from_descriptors(descriptors: &[WorkerDescriptor]) -> Self {
        Self {
            workers: descriptors
                .iter()
                .zip(1..)
                .map(|(d, id): (&WorkerDescriptor, WorkerId)| d.to_spec(id))
                .collect(),
            join_timeout_ms: None,
        }
    }

    pub fn join_timeout(&self) -> Duration {
        self.join_timeout_ms
            .map_or(DEFAULT_JOIN_TIMEOUT, Duration::from_millis)
    }
}

/// A worker given on the command line as `<pattern>@<pace>`, for example
/// `counter@10ms` or `banner@1s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerDescriptor {
    pub pattern: PatternKind,
    pub pace: Duration,
}

impl WorkerDescriptor {
    pub const fn to_spec(self, id: WorkerId) -> WorkerSpec {
        WorkerSpec::new(id, self.pattern, self.pace)
    }
}

impl FromStr for WorkerDescriptor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::Descriptor {
            descriptor: s.to_string(),
            reason,
        };

        let (pattern, pace) = s
            .split_once('@')
            .ok_or_else(|| invalid("expected <pattern>@<pace>".to_string()))?;
        let pattern = pattern.parse::<PatternKind>().map_err(|e| invalid(e.to_string()))?;
        let pace = humantime::parse_duration(pace.trim()).map_err(|e| invalid(e.to_string()))?;

        Ok(Self { pattern, pace })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_descriptor_parse() {
        let d: WorkerDescriptor = "counter@10ms".parse().unwrap();
        assert_eq!(d.pattern, PatternKind::Counter);
        assert_eq!(d.pace, Duration::from_millis(10));

        let d: WorkerDescriptor = "Banner@1s".parse().unwrap();
        assert_eq!(d.pattern, PatternKind::Banner);
        assert_eq!(d.pace, Duration::from_secs(1));
    }

    #[test]
    fn test_descriptor_errors() {
        for bad in ["counter", "spinner@10ms", "alphabet@fast", "@10ms"] {
            assert!(
                matches!(bad.parse::<WorkerDescriptor>(), Err(ConfigError::Descriptor { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_descriptors_numbers_workers() {
        let descriptors: Vec<WorkerDescriptor> = ["alphabet@5ms", "banner@20ms"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let config = RunnerConfig::from_descriptors(&descriptors);
        assert_eq!(
            config.workers,
            vec![
                WorkerSpec::new(1, PatternKind::Alphabet, Duration::from_millis(5)),
                WorkerSpec::new(2, PatternKind::Banner, Duration::from_millis(20)),
            ]
        );
        assert_eq!(config.join_timeout(), DEFAULT_JOIN_TIMEOUT);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"workers": [{{"id": 4, "pattern": "alphabet", "pace_ms": 15}}], "join_timeout_ms": 250}}"#
        )
        .unwrap();

        let config = RunnerConfig::load(file.path()).unwrap();
        assert_eq!(
            config.workers,
            vec![WorkerSpec::new(4, PatternKind::Alphabet, Duration::from_millis(15))]
        );
        assert_eq!(config.join_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"workers": [{{"id": 1, "pattern": "spinner", "pace_ms": 1}}]}}"#).unwrap();
        assert!(matches!(
            RunnerConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            RunnerConfig::resolve(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_default_is_demo_set() {
        let config = RunnerConfig::default();
        assert_eq!(config.workers, WorkerSpec::defaults());
        assert!(config.join_timeout_ms.is_none());
    }
}
