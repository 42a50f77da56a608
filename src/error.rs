//! Error types for each stage of a run.
//!
//! - [`ConfigError`]: settings, user list and output directory problems. All of
//!   these are raised before the first network request.
//! - [`FetchError`]: transport and decoding failures while talking to the
//!   platform.
//! - [`StructuralMismatch`]: an element that must appear exactly once (author,
//!   title) was missing or repeated.
//! - [`WalkError`]: what a single user's walk can fail with.
//! - [`ReportError`]: CSV, JSON and chart output failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("user \"{user}\" is listed more than once")]
    DuplicateUser { user: String },

    #[error("user list {path} contains no users")]
    EmptyUserList { path: PathBuf },

    #[error("invalid base URL \"{url}\": {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid CSS selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("output directory {path} is not writable: {source}")]
    UnwritableDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("could not decode JSON from {url}: {source} (body: {preview})")]
    Decode {
        url: String,
        preview: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not parse RSS from {url}: {source}")]
    Xml {
        url: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("could not build request URL for {segment}: {source}")]
    Url {
        segment: String,
        #[source]
        source: url::ParseError,
    },
}

/// An element that must occur exactly once was found `found` times.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected exactly one {element} in {context}, found {found}")]
pub struct StructuralMismatch {
    pub element: &'static str,
    pub found: usize,
    pub context: String,
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Structure(#[from] StructuralMismatch),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to draw chart {chart}: {reason}")]
    Chart { chart: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_mismatch_message() {
        let err = StructuralMismatch {
            element: "title",
            found: 2,
            context: "tx abc123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "expected exactly one title in tx abc123, found 2"
        );
    }

    #[test]
    fn test_walk_error_is_transparent() {
        let err: WalkError = StructuralMismatch {
            element: "author",
            found: 0,
            context: "tx 1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "expected exactly one author in tx 1, found 0");
    }
}
