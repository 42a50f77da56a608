//! Per-user feed walks.
//!
//! A walk reads one user's listing and appends one [`ArticleRecord`] per
//! article to a [`RecordTable`]:
//!
//! - **RSS**: every item with a description, in feed order. No dedup, no
//!   cutoff.
//! - **Bitfeed**: entries newest-first across up to `max_pages` pages. The walk
//!   stops at the first entry older than the cutoff, fetches `/tx/{id}` for the
//!   others, and drops an entry whose title was already seen in this walk.
//!
//! [`walk_users`] drives the whole user list. Each user's walk writes into its
//! own table, which is merged into the run's table only when the walk
//! succeeds. A failed walk is logged and reported, and the run moves on to the
//! next user unless `fail_fast` is set.
//!
//! [`ArticleRecord`]: crate::models::ArticleRecord

use crate::config::FeedKind;
use crate::error::{FetchError, StructuralMismatch, WalkError};
use crate::extract::rss;
use crate::extract::transaction::{self, TransactionSelectors};
use crate::fetcher::FeedSource;
use crate::models::{RecordTable, UserList};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::pin::pin;
use tracing::{debug, error, info, instrument, warn};

/// Counters for one successful walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub appended: usize,
    pub skipped_no_description: usize,
    pub skipped_duplicates: usize,
    pub stopped_at_cutoff: bool,
    pub pages: u32,
}

/// How a user's walk ended.
#[derive(Debug)]
pub enum UserOutcome {
    Completed(WalkSummary),
    FetchFailed(FetchError),
    Malformed(StructuralMismatch),
}

impl UserOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, UserOutcome::Completed(_))
    }
}

impl From<WalkError> for UserOutcome {
    fn from(error: WalkError) -> Self {
        match error {
            WalkError::Fetch(e) => UserOutcome::FetchFailed(e),
            WalkError::Structure(e) => UserOutcome::Malformed(e),
        }
    }
}

/// Outcome of one user's walk, tagged with the user.
#[derive(Debug)]
pub struct UserReport {
    pub user: String,
    pub outcome: UserOutcome,
}

/// Walks user feeds from one [`FeedSource`].
#[derive(Debug)]
pub struct FeedWalker<'a, S> {
    source: &'a S,
    selectors: &'a TransactionSelectors,
    cutoff: Option<DateTime<Utc>>,
    max_pages: u32,
}

impl<'a, S: FeedSource> FeedWalker<'a, S> {
    pub fn new(source: &'a S, selectors: &'a TransactionSelectors) -> Self {
        Self {
            source,
            selectors,
            cutoff: None,
            max_pages: 1,
        }
    }

    /// Stop bitfeed walks at the first post published before `cutoff`.
    pub fn with_cutoff(mut self, cutoff: Option<DateTime<Utc>>) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Request at most `max_pages` bitfeed pages per user (at least one).
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub async fn walk(
        &self,
        kind: FeedKind,
        user: &str,
        table: &mut RecordTable,
    ) -> Result<WalkSummary, WalkError> {
        match kind {
            FeedKind::Rss => self.walk_rss(user, table).await,
            FeedKind::Bitfeed => self.walk_bitfeed(user, table).await,
        }
    }

    /// Append every article in `user`'s RSS feed to `table`.
    #[instrument(level = "info", skip(self, table))]
    pub async fn walk_rss(&self, user: &str, table: &mut RecordTable) -> Result<WalkSummary, WalkError> {
        info!("Requesting RSS feed");
        let xml = self.source.user_rss(user).await?;
        let items = rss::parse_items(&xml).map_err(|source| FetchError::Xml {
            url: self.source.rss_url(user),
            source,
        })?;

        let mut summary = WalkSummary {
            pages: 1,
            ..WalkSummary::default()
        };
        for item in &items {
            match rss::extract_article(user, item)? {
                Some(record) => {
                    table.push(record);
                    summary.appended += 1;
                }
                None => {
                    debug!(titles = ?item.titles, "Skipping item without description");
                    summary.skipped_no_description += 1;
                }
            }
        }

        info!(
            appended = summary.appended,
            skipped = summary.skipped_no_description,
            "Finished RSS feed"
        );
        Ok(summary)
    }

    /// Append `user`'s bitfeed posts newer than the cutoff to `table`.
    #[instrument(level = "info", skip(self, table))]
    pub async fn walk_bitfeed(
        &self,
        user: &str,
        table: &mut RecordTable,
    ) -> Result<WalkSummary, WalkError> {
        info!(cutoff = ?self.cutoff, max_pages = self.max_pages, "Requesting bitfeed");
        let cutoff = self.cutoff.map(|c| c.timestamp());
        let mut seen: HashSet<String> = HashSet::new();
        let mut summary = WalkSummary::default();

        'pages: for page in 1..=self.max_pages {
            let feed = self.source.user_bitfeed(user, page).await?;
            summary.pages = page;
            if feed.tx.is_empty() {
                debug!(page, "Empty page; end of listing");
                break;
            }

            for entry in feed.tx {
                if cutoff.is_some_and(|c| entry.timestamp < c) {
                    debug!(tx_id = %entry.id, timestamp = entry.timestamp, "Reached cutoff");
                    summary.stopped_at_cutoff = true;
                    break 'pages;
                }

                let html = self.source.transaction_page(&entry.id).await?;
                let record = transaction::extract_article(&html, &entry.id, self.selectors)?;

                if !seen.insert(record.title.clone()) {
                    debug!(tx_id = %entry.id, title = %record.title, "Skipping duplicate title");
                    summary.skipped_duplicates += 1;
                    continue;
                }
                if record.author != user {
                    debug!(tx_id = %entry.id, author = %record.author, "Page author differs from user id");
                }
                table.push(record);
                summary.appended += 1;
            }
        }

        info!(
            appended = summary.appended,
            duplicates = summary.skipped_duplicates,
            pages = summary.pages,
            stopped_at_cutoff = summary.stopped_at_cutoff,
            "Finished bitfeed"
        );
        Ok(summary)
    }
}

/// Walk every user in `users` and collect their records in user-list order.
///
/// Up to `concurrency` walks are in flight at once; each walk is itself
/// sequential. With `fail_fast` the first failing user ends the run with its
/// error, otherwise the failure is recorded in that user's [`UserReport`].
#[instrument(level = "info", skip_all, fields(users = users.len(), ?kind, concurrency = concurrency))]
pub async fn walk_users<S: FeedSource>(
    walker: &FeedWalker<'_, S>,
    kind: FeedKind,
    users: &UserList,
    concurrency: usize,
    fail_fast: bool,
) -> Result<(RecordTable, Vec<UserReport>), WalkError> {
    let mut walks = pin!(
        stream::iter(users.iter())
            .map(|user| async move {
                let mut local = RecordTable::new();
                let result = walker.walk(kind, user, &mut local).await;
                (user, local, result)
            })
            .buffered(concurrency.max(1))
    );

    let mut table = RecordTable::new();
    let mut reports = Vec::with_capacity(users.len());

    while let Some((user, mut local, result)) = walks.next().await {
        match result {
            Ok(summary) => {
                table.append(&mut local);
                reports.push(UserReport {
                    user: user.clone(),
                    outcome: UserOutcome::Completed(summary),
                });
            }
            Err(e) if fail_fast => {
                error!(%user, error = %e, "Walk failed; aborting run");
                return Err(e);
            }
            Err(e) => {
                warn!(%user, error = %e, "Walk failed; continuing with next user");
                reports.push(UserReport {
                    user: user.clone(),
                    outcome: e.into(),
                });
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.outcome.is_completed()).count();
    info!(records = table.len(), failed, "Finished walking users");
    Ok((table, reports))
}
