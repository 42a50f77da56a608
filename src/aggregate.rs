//! Per-author statistics.
//!
//! Authors are grouped in order of their first row in the table. Average word
//! counts are truncated to an integer, average image counts are not.

use crate::models::{AuthorStats, RecordTable};
use itertools::Itertools;
use tracing::{info, instrument};

/// Compute one [`AuthorStats`] per distinct author in `table`.
#[instrument(level = "info", skip_all, fields(records = table.len()))]
pub fn author_stats(table: &RecordTable) -> Vec<AuthorStats> {
    let stats: Vec<AuthorStats> = table
        .iter()
        .map(|r| r.author.as_str())
        .unique()
        .map(|author| {
            let rows = table.iter().filter(|r| r.author == author);
            let (articles, total_words, total_images) = rows.fold((0u64, 0u64, 0u64), |acc, r| {
                (acc.0 + 1, acc.1 + r.word_count, acc.2 + r.image_count)
            });
            // `author` comes from the table, so every group has at least one row.
            AuthorStats {
                author: author.to_string(),
                articles,
                avg_words: total_words / articles,
                total_words,
                avg_images: total_images as f64 / articles as f64,
                total_images,
            }
        })
        .collect();

    info!(authors = stats.len(), "Computed author statistics");
    stats
}

/// A per-author quantity that can be put on a chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Position of the author in the statistics list.
    AuthorIndex,
    AvgWords,
    TotalWords,
    AvgImages,
    TotalImages,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::AuthorIndex => "User",
            Metric::AvgWords => "Average number of words per article",
            Metric::TotalWords => "Total number of words in all articles",
            Metric::AvgImages => "Average number of images per article",
            Metric::TotalImages => "Total number of images in all articles",
        }
    }

    /// The value of this metric for every author, in `stats` order.
    pub fn values(self, stats: &[AuthorStats]) -> Vec<f64> {
        stats
            .iter()
            .enumerate()
            .map(|(i, s)| match self {
                Metric::AuthorIndex => i as f64,
                Metric::AvgWords => s.avg_words as f64,
                Metric::TotalWords => s.total_words as f64,
                Metric::AvgImages => s.avg_images,
                Metric::TotalImages => s.total_images as f64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleRecord;

    fn table(rows: &[(&str, u64, u64)]) -> RecordTable {
        rows.iter()
            .enumerate()
            .map(|(i, (author, nw, noi))| ArticleRecord {
                author: author.to_string(),
                title: format!("post {i}"),
                word_count: *nw,
                image_count: *noi,
            })
            .collect()
    }

    #[test]
    fn test_average_words_exact() {
        let stats = author_stats(&table(&[("alice", 10, 0), ("alice", 20, 0)]));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].avg_words, 15);
        assert_eq!(stats[0].total_words, 30);
    }

    #[test]
    fn test_average_words_truncates() {
        let stats = author_stats(&table(&[("alice", 10, 0), ("alice", 21, 0)]));
        assert_eq!(stats[0].avg_words, 15);
        assert_eq!(stats[0].total_words, 31);
    }

    #[test]
    fn test_average_images_is_not_truncated() {
        let stats = author_stats(&table(&[("alice", 0, 1), ("alice", 0, 2)]));
        assert_eq!(stats[0].avg_images, 1.5);
        assert_eq!(stats[0].total_images, 3);
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let stats = author_stats(&table(&[
            ("zed", 1, 0),
            ("amy", 2, 0),
            ("zed", 3, 1),
            ("bob", 4, 0),
        ]));
        let authors: Vec<_> = stats.iter().map(|s| s.author.as_str()).collect();
        assert_eq!(authors, vec!["zed", "amy", "bob"]);
        assert_eq!(stats[0].articles, 2);
        assert_eq!(stats[0].avg_words, 2);
        assert_eq!(stats[0].avg_images, 0.5);
    }

    #[test]
    fn test_empty_table_has_no_stats() {
        assert!(author_stats(&RecordTable::new()).is_empty());
    }

    #[test]
    fn test_metric_values_are_parallel_to_stats() {
        let stats = author_stats(&table(&[("a", 10, 1), ("b", 20, 4), ("b", 30, 0)]));
        assert_eq!(Metric::AuthorIndex.values(&stats), vec![0.0, 1.0]);
        assert_eq!(Metric::AvgWords.values(&stats), vec![10.0, 25.0]);
        assert_eq!(Metric::TotalImages.values(&stats), vec![1.0, 4.0]);
        assert_eq!(Metric::AvgImages.values(&stats), vec![1.0, 2.0]);
    }
}
