//! Utility functions for logging, file naming and output directories.
//!
//! - String truncation for log previews of response bodies
//! - Slugification for chart file names
//! - Writability checks for output directories and file destinations

use crate::error::ConfigError;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) with
/// an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Convert a title to a file-name-friendly slug.
///
/// Lowercases the text, drops everything that is not alphanumeric, a space or
/// a hyphen, and turns spaces into hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Average words per user"), "average-words-per-user");
/// assert_eq!(slugify_title("Words vs. images!"), "words-vs-images");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Directory a file at `path` will be created in.
///
/// A bare file name resolves to the current directory.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then creates and immediately
/// deletes a scratch file. Run before scraping so a bad output path fails fast
/// instead of after every feed has been fetched.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| ConfigError::UnwritableDir {
            path: path.to_path_buf(),
            source,
        })?;

    let scratch_path = path.join("..__write_check__");
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(source) => Err(ConfigError::UnwritableDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}
