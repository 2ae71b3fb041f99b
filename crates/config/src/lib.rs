//! Layered configuration for docscan.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A TOML file: the path given on the command line, otherwise
//!    `docscan/config.toml` in the platform configuration directory (skipped
//!    silently when absent).
//! 3. Environment variables prefixed `DOCSCAN_`, with `__` separating nested
//!    keys (`DOCSCAN_SERVER__PORT=9000`).

pub mod error;

use crate::error::{ErrorKind, Result};
use docscan_reader::error::ErrorKind as ReaderErrorKind;
use docscan_reader::{DEFAULT_ENCODING, DEFAULT_FALLBACK_ENCODINGS, ScanOptions};
use docscan_tasks::{CoordinatorConfig, DEFAULT_MAX_FILE_SIZE_MB, MAX_FILE_SIZE_MB_RANGE};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "DOCSCAN_";
const APPLICATION: &str = "docscan";
const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub scan: ScanConfig,
    pub tasks: TasksConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Per-file ceiling for submissions that do not name one, in MiB.
    pub default_max_file_size_mb: u32,
    /// Encoding tried first for `.txt` and `.md` files.
    pub default_encoding: String,
    /// Encodings tried, in order, when the default one fails.
    pub fallback_encodings: Vec<String>,
    /// Decode as UTF-8 with replacement characters when every encoding fails.
    pub lossy_fallback: bool,
    /// Descend into subdirectories.
    pub recursive: bool,
}
impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            default_encoding: DEFAULT_ENCODING.to_string(),
            fallback_encodings: DEFAULT_FALLBACK_ENCODINGS.iter().map(ToString::to_string).collect(),
            lossy_fallback: true,
            recursive: true,
        }
    }
}
impl ScanConfig {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_max_file_size_mb(u64::from(self.default_max_file_size_mb))
            .with_default_encoding(&self.default_encoding)
            .with_fallback_encodings(&self.fallback_encodings)
            .with_lossy_fallback(self.lossy_fallback)
            .with_recursive(self.recursive)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Keep at most this many task records; unlimited when unset.
    pub max_tasks: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: Option<String>,
}

impl Config {
    /// Load from every source and validate the result.
    ///
    /// # Errors
    ///
    /// Fails when `path` is given but missing, when a source cannot be parsed,
    /// or when a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path)?)
    }

    /// The merged sources, before extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::MissingFile(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path(),
        };
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Reading configuration file");
            figment = figment.merge(Toml::file(file));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            exn::bail!(invalid("server.host", "must not be empty"));
        }
        let max = self.scan.default_max_file_size_mb;
        if !MAX_FILE_SIZE_MB_RANGE.contains(&max) {
            exn::bail!(invalid(
                "scan.default_max_file_size_mb",
                format!(
                    "must be between {} and {}, got {max}",
                    MAX_FILE_SIZE_MB_RANGE.start(),
                    MAX_FILE_SIZE_MB_RANGE.end()
                )
            ));
        }
        if self.scan.default_encoding.trim().is_empty() {
            exn::bail!(invalid("scan.default_encoding", "must not be empty"));
        }
        if let Err(e) = self.scan.scan_options().validate() {
            let kind: &ReaderErrorKind = &e;
            let field = match kind {
                ReaderErrorKind::UnknownEncoding(label) if label.eq_ignore_ascii_case(self.scan.default_encoding.trim()) => {
                    "scan.default_encoding"
                },
                _ => "scan.fallback_encodings",
            };
            exn::bail!(invalid(field, kind.to_string()));
        }
        if self.tasks.max_tasks == Some(0) {
            exn::bail!(invalid("tasks.max_tasks", "must be at least 1 when set"));
        }
        Ok(())
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            default_max_file_size_mb: self.scan.default_max_file_size_mb,
            scan_options: self.scan.scan_options(),
            max_tasks: self.tasks.max_tasks,
        }
    }
}

/// `<platform config dir>/docscan/config.toml`, if the platform has one.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join(FILE_NAME))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ErrorKind {
    ErrorKind::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn from_toml(toml: &str) -> Result<Config> {
        Config::from_figment(Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml)))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.scan.default_max_file_size_mb, 50);
        assert_eq!(config.scan.fallback_encodings, vec!["utf-8", "windows-1252"]);
        assert!(config.scan.recursive);
        assert_eq!(config.tasks.max_tasks, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9000

            [scan]
            default_encoding = "windows-1252"
            recursive = false
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.scan.default_encoding, "windows-1252");
        assert!(!config.scan.recursive);
        assert_eq!(config.scan.default_max_file_size_mb, 50);
    }

    #[rstest]
    #[case("[scan]\ndefault_max_file_size_mb = 0", "scan.default_max_file_size_mb")]
    #[case("[scan]\ndefault_max_file_size_mb = 1001", "scan.default_max_file_size_mb")]
    #[case("[scan]\ndefault_encoding = \" \"", "scan.default_encoding")]
    #[case("[scan]\ndefault_encoding = \"latin-1\"", "scan.default_encoding")]
    #[case("[scan]\nfallback_encodings = [\"utf-8\", \"cp-1252\"]", "scan.fallback_encodings")]
    #[case("[server]\nhost = \"\"", "server.host")]
    #[case("[tasks]\nmax_tasks = 0", "tasks.max_tasks")]
    fn test_invalid_values(#[case] toml: &str, #[case] expected: &str) {
        let err = from_toml(toml).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid { field, .. } if *field == expected));
    }

    #[test]
    fn test_wrong_type_fails_to_load() {
        let err = from_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docscan.toml");
        std::fs::write(&path, "[tasks]\nmax_tasks = 25\n[log]\nfilter = \"docscan=debug\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tasks.max_tasks, Some(25));
        assert_eq!(config.log.filter.as_deref(), Some("docscan=debug"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingFile(p) if p == &path));
    }

    #[test]
    fn test_coordinator_config() {
        let config = from_toml("[scan]\ndefault_max_file_size_mb = 2\nlossy_fallback = false\n[tasks]\nmax_tasks = 3").unwrap();
        let coordinator = config.coordinator_config();
        assert_eq!(coordinator.default_max_file_size_mb, 2);
        assert_eq!(coordinator.scan_options.max_file_size_bytes, 2 * 1024 * 1024);
        assert!(!coordinator.scan_options.lossy_fallback);
        assert_eq!(coordinator.max_tasks, Some(3));
    }
}
