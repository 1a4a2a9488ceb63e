//! Run configuration: built-in defaults, the optional `.mdtidy.toml` file, and
//! the merge with command-line overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::parser::Extensions;

/// Name of the configuration file looked up in the scan root
pub const CONFIG_FILE_NAME: &str = ".mdtidy.toml";

/// Directories skipped unless the exclusion list is replaced
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["node_modules/", "vendor/", ".git/", "build/", "dist/", "out/"];

/// The versioned rule set and grammar every document is formatted against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    #[default]
    Gfm,
}

impl Standard {
    pub fn extensions(&self) -> Extensions {
        match self {
            Standard::Gfm => Extensions::gfm(),
        }
    }
}

/// Settings for one run. Built once and shared by reference with every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    pub root_dir: PathBuf,
    /// Directory prefixes, relative to `root_dir`
    pub exclude_patterns: Vec<String>,
    pub dry_run: bool,
    pub verbose: bool,
    pub standard: Standard,
    /// Worker count; `None` uses one per core
    pub jobs: Option<usize>,
}

impl FormatConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            dry_run: false,
            verbose: false,
            standard: Standard::Gfm,
            jobs: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Applies file settings on top of the defaults. Patterns supplied on
    /// the command line are applied afterwards by the caller and win.
    pub fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(exclude) = &file.global.exclude {
            self.exclude_patterns = exclude.clone();
        }
        self.exclude_patterns.extend(file.global.extend_exclude.iter().cloned());
        if file.global.jobs.is_some() {
            self.jobs = file.global.jobs;
        }
    }

    /// Whether a `/`-separated path relative to the root lies in an excluded
    /// directory. A pattern excludes every path it is a prefix of.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude_patterns.iter().any(|pattern| {
            let pattern = pattern.trim_end_matches('/');
            !pattern.is_empty() && rel_path.starts_with(pattern)
        })
    }

    /// Whether a document lies in an excluded directory. Only the directory
    /// part of `rel_path` is matched, so a document at the root never is.
    pub fn excludes_document(&self, rel_path: &str) -> bool {
        rel_path
            .rsplit_once('/')
            .is_some_and(|(parent, _)| self.is_excluded(parent))
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Contents of `.mdtidy.toml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub global: GlobalConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Replaces the default exclusion list
    pub exclude: Option<Vec<String>>,
    /// Appended to the effective exclusion list
    pub extend_exclude: Vec<String>,
    pub jobs: Option<usize>,
}

impl ConfigFile {
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Loads `path` when given, otherwise `.mdtidy.toml` in `root` if present.
    pub fn discover(root: &Path, path: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        if let Some(path) = path {
            return Self::load(path).map(Some);
        }
        let candidate = root.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            log::debug!("No {CONFIG_FILE_NAME} in {}", root.display());
            return Ok(None);
        }
        log::debug!("Loading config from {}", candidate.display());
        Self::load(&candidate).map(Some)
    }
}
