//! JSON output of per-author statistics.
//!
//! Written when `--stats-json` is given, so the numbers behind the charts can
//! be consumed by other tools. The file holds one object per author, in the
//! same order as the charts:
//!
//! ```text
//! [
//!   {
//!     "author": "alice",
//!     "articles": 2,
//!     "avg_words": 15,
//!     "total_words": 31,
//!     "avg_images": 1.5,
//!     "total_images": 3
//!   }
//! ]
//! ```

use crate::error::ReportError;
use crate::models::AuthorStats;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `stats` as pretty-printed JSON to `path`.
///
/// Missing parent directories are created.
///
/// # Arguments
///
/// * `path` - Destination file, overwritten if it exists
/// * `stats` - Per-author statistics to serialize
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_stats(path: &Path, stats: &[AuthorStats]) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(stats)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(source) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %source, "Failed to create JSON dir");
            return Err(ReportError::Io {
                path: parent.to_path_buf(),
                source,
            });
        }
    }

    fs::write(path, json).await.map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(authors = stats.len(), "Wrote stats JSON");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Vec<AuthorStats> {
        vec![AuthorStats {
            author: "alice".to_string(),
            articles: 2,
            avg_words: 15,
            total_words: 31,
            avg_images: 1.5,
            total_images: 3,
        }]
    }

    #[tokio::test]
    async fn test_write_stats_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("bitpost_stats_json_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("stats.json");

        write_stats(&path, &stats()).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["author"], "alice");
        assert_eq!(value[0]["avg_words"], 15);
        assert_eq!(value[0]["avg_images"], 1.5);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_stats_empty_list() {
        let path = std::env::temp_dir().join(format!("bitpost_stats_empty_{}.json", std::process::id()));
        write_stats(&path, &[]).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_write_stats_under_a_file_is_io_error() {
        let blocker = std::env::temp_dir().join(format!("bitpost_stats_json_blocker_{}", std::process::id()));
        std::fs::write(&blocker, "not a dir").unwrap();
        let path = blocker.join("stats.json");

        let err = write_stats(&path, &stats()).await.unwrap_err();
        assert!(matches!(err, ReportError::Io { path: ref p, .. } if p == &blocker));

        let _ = std::fs::remove_file(&blocker);
    }
}
