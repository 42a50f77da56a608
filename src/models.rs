//! Data models shared by the scraping, aggregation and reporting stages.
//!
//! - [`ArticleRecord`]: one scraped article with its word and image counts
//! - [`RecordTable`]: the ordered accumulator of records for a run
//! - [`UserList`]: the distinct author identifiers to walk
//! - [`AuthorStats`]: per-author summary derived from a [`RecordTable`]
//! - [`BitFeed`] / [`FeedEntry`]: the JSON listing served at `/u/{user}/bitfeed`
//!
//! Record fields serialize with the short column names `nw` (number of words)
//! and `noi` (number of images) used by the CSV dump.

use crate::error::ConfigError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One article as seen by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The author the article is attributed to.
    pub author: String,
    /// The article title. Acts as the dedup key within a user's walk.
    pub title: String,
    /// Number of word tokens in the text-bearing elements.
    #[serde(rename = "nw")]
    pub word_count: u64,
    /// Number of `<img>` elements inside the content container.
    #[serde(rename = "noi")]
    pub image_count: u64,
}

/// Ordered, append-only collection of [`ArticleRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    records: Vec<ArticleRecord>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ArticleRecord) {
        self.records.push(record);
    }

    /// Move every row of `other` to the end of this table, keeping order.
    pub fn append(&mut self, other: &mut RecordTable) {
        self.records.append(&mut other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArticleRecord> {
        self.records.iter()
    }
}

impl FromIterator<ArticleRecord> for RecordTable {
    fn from_iter<I: IntoIterator<Item = ArticleRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a ArticleRecord;
    type IntoIter = std::slice::Iter<'a, ArticleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The authors to scrape, in file order. Never contains duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserList {
    users: Vec<String>,
}

impl UserList {
    /// Build a user list, rejecting the first identifier that appears twice.
    pub fn new(users: Vec<String>) -> Result<Self, ConfigError> {
        if let Some(user) = users.iter().duplicates().next() {
            return Err(ConfigError::DuplicateUser { user: user.clone() });
        }
        Ok(Self { users })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.users
    }
}

/// Summary statistics for one author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorStats {
    pub author: String,
    /// Number of records the statistics were computed from (always >= 1).
    pub articles: u64,
    /// `total_words / articles`, truncated.
    pub avg_words: u64,
    pub total_words: u64,
    /// `total_images / articles`, not truncated.
    pub avg_images: f64,
    pub total_images: u64,
}

/// JSON listing of a user's posts, newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitFeed {
    #[serde(default)]
    pub tx: Vec<FeedEntry>,
}

/// One post in a [`BitFeed`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedEntry {
    /// Transaction id, used to fetch `/tx/{id}`.
    pub id: String,
    /// Publication time in seconds since the Unix epoch.
    pub timestamp: i64,
}
