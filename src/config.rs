//! Run settings.
//!
//! Settings come from three layers, highest priority first:
//! 1. command-line flags (and their environment variables), see [`Cli`]
//! 2. an optional YAML file passed with `--config`
//! 3. built-in defaults
//!
//! ```yaml
//! base_url: https://bitpost.app
//! users_file: users.txt
//! feed: bitfeed
//! since: 2021-01-01
//! max_pages: 5
//! selectors:
//!   author: .post-author
//!   title: .post-title
//!   content: .post-content
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::utils::{ensure_writable_dir, parent_dir};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://bitpost.app";

/// Which per-user listing the walker reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// `/u/{user}/rss`: article bodies are embedded in the feed.
    #[default]
    Rss,
    /// `/u/{user}/bitfeed`: a JSON listing of transaction ids, one page per article.
    Bitfeed,
}

/// CSS selectors used to take apart a transaction page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub author: String,
    pub title: String,
    pub content: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            author: ".post-author".to_string(),
            title: ".post-title".to_string(),
            content: ".post-content".to_string(),
        }
    }
}

/// Contents of the optional YAML config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub users_file: Option<PathBuf>,
    pub feed: Option<FeedKind>,
    pub since: Option<NaiveDate>,
    pub max_pages: Option<u32>,
    pub concurrency: Option<usize>,
    pub csv_path: Option<PathBuf>,
    pub chart_dir: Option<PathBuf>,
    pub stats_json: Option<PathBuf>,
    pub fail_fast: Option<bool>,
    pub selectors: Option<SelectorConfig>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config file");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to `null`.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub users_file: PathBuf,
    pub feed: FeedKind,
    /// Posts older than this end a bitfeed walk.
    pub cutoff: Option<DateTime<Utc>>,
    pub max_pages: u32,
    pub concurrency: usize,
    pub csv_path: PathBuf,
    pub from_csv: Option<PathBuf>,
    pub chart_dir: PathBuf,
    pub stats_json: Option<PathBuf>,
    pub fail_fast: bool,
    pub selectors: SelectorConfig,
}

impl Settings {
    /// Load the config file named by `cli` (if any) and merge it with the flags.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge flags over file values over defaults.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let raw_url = cli
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: raw_url.clone(),
            source,
        })?;

        let cutoff = cli
            .since
            .or(file.since)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc());

        let settings = Self {
            base_url,
            users_file: cli
                .users_file
                .or(file.users_file)
                .unwrap_or_else(|| PathBuf::from("users.txt")),
            feed: cli.feed.or(file.feed).unwrap_or_default(),
            cutoff,
            max_pages: cli.max_pages.or(file.max_pages).unwrap_or(1).max(1),
            concurrency: cli.concurrency.or(file.concurrency).unwrap_or(1).max(1),
            csv_path: cli
                .csv_path
                .or(file.csv_path)
                .unwrap_or_else(|| PathBuf::from("data.csv")),
            from_csv: cli.from_csv,
            chart_dir: cli
                .chart_dir
                .or(file.chart_dir)
                .unwrap_or_else(|| PathBuf::from("charts")),
            stats_json: cli.stats_json.or(file.stats_json),
            fail_fast: cli.fail_fast || file.fail_fast.unwrap_or(false),
            selectors: file.selectors.unwrap_or_default(),
        };
        debug!(?settings, "Resolved settings");
        Ok(settings)
    }

    /// Check every place this run will write to: the chart directory, the
    /// CSV destination (unless records are reloaded from a CSV) and the stats
    /// JSON destination. Missing directories are created. Called before the
    /// first request.
    pub async fn ensure_output_dirs(&self) -> Result<(), ConfigError> {
        ensure_writable_dir(&self.chart_dir).await?;
        if self.from_csv.is_none() {
            ensure_writable_dir(parent_dir(&self.csv_path)).await?;
        }
        if let Some(path) = &self.stats_json {
            ensure_writable_dir(parent_dir(path)).await?;
        }
        Ok(())
    }
}
