//! Configuration loading and management.
//!
//! Layers, lowest precedence first: built-in defaults, the user config file
//! (`<config_dir>/transcript-lens/config.toml`), an explicit `--config` file, and
//! `TRANSCRIPT_LENS_*` environment variables (nested keys separated by `__`, e.g.
//! `TRANSCRIPT_LENS_DETECTION__MIN_RELEVANCE=8`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Maximum session file size accepted by the parsers: 50MB
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Default number of search results returned
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

const ENV_PREFIX: &str = "TRANSCRIPT_LENS_";

/// Thresholds for code classification and language detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Paragraphs with fewer non-blank lines are never treated as code
    pub min_code_lines: usize,
    /// Number of code heuristics that must fire
    pub min_code_signals: usize,
    /// A language guess is trusted only when its relevance is strictly greater
    pub min_relevance: u32,
    /// Inputs longer than this are not run through the language detector
    pub max_detect_bytes: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_code_lines: 2,
            min_code_signals: 2,
            min_relevance: 5,
            max_detect_bytes: 256 * 1024,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Override for the assistant data directory (defaults to `~/.claude`)
    pub claude_dir: Option<PathBuf>,
    pub max_file_bytes: u64,
    pub search_limit: usize,
    pub detection: DetectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            claude_dir: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            search_limit: DEFAULT_SEARCH_LIMIT,
            detection: DetectionConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(clippy::result_large_err, reason = "figment::Error is only returned at startup")]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(clippy::result_large_err, reason = "figment::Error is only returned at startup")]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract()
    }
}

/// Returns the platform-specific config directory for transcript-lens.
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("transcript-lens"))
}
