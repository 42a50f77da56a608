//! # Bitpost Stats
//!
//! Scrapes the article feeds of a list of Bitpost users, counts the words and
//! images of every article, and reports per-author statistics as SVG charts,
//! a CSV table and optionally a JSON file.
//!
//! ## Usage
//!
//! ```sh
//! bitpost_stats -u users.txt -o ./charts
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Configuration**: Merge CLI flags, environment and the YAML config file,
//!    load the user list and check every output location before any request
//! 2. **Walking**: Fetch each user's RSS feed or paginated bitfeed and extract
//!    one record per article (user by user, in list order)
//! 3. **Aggregation**: Group records by author and compute averages and totals
//! 4. **Output**: Write the record table as CSV, render the charts and the
//!    optional JSON statistics
//!
//! With `--from-csv` step 2 is replaced by reading an earlier CSV.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod error;
mod extract;
mod fetcher;
mod models;
mod outputs;
mod users;
mod utils;
mod walker;

use aggregate::author_stats;
use cli::Cli;
use config::Settings;
use extract::transaction::TransactionSelectors;
use fetcher::HttpFeedSource;
use models::RecordTable;
use outputs::charts::{default_charts, render_all};
use outputs::colors::ColorAssignment;
use users::load_user_list;
use walker::{FeedWalker, UserOutcome, walk_users};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("bitpost_stats starting up");

    // Parse CLI and merge with the config file
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let settings = Settings::from_cli(args)?;

    // Early check: every output location must be writable before anything is fetched
    if let Err(e) = settings.ensure_output_dirs().await {
        error!(
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // ---- Collect records ----
    let (table, mut colors) = match &settings.from_csv {
        Some(path) => {
            info!(path = %path.display(), "Loading records from CSV instead of scraping");
            let table = outputs::csv::read_csv(path)?;
            (table, ColorAssignment::default())
        }
        None => scrape(&settings).await?,
    };

    if table.is_empty() {
        warn!("No records collected; charts will be empty");
    }

    // ---- Aggregate ----
    let stats = author_stats(&table);
    for s in &stats {
        info!(
            author = %s.author,
            articles = s.articles,
            avg_words = s.avg_words,
            total_words = s.total_words,
            avg_images = s.avg_images,
            total_images = s.total_images,
            "Author statistics"
        );
    }

    // ---- Charts ----
    colors.extend(stats.iter().map(|s| s.author.as_str()));
    let charts = render_all(&settings.chart_dir, &default_charts(), &stats, &colors)?;
    info!(count = charts.len(), dir = %settings.chart_dir.display(), "Charts written");

    // ---- JSON stats ----
    if let Some(path) = &settings.stats_json {
        outputs::json::write_stats(path, &stats).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        records = table.len(),
        authors = stats.len(),
        "Execution complete"
    );

    Ok(())
}

/// Walk every user's feed and persist the resulting table as CSV.
///
/// The user list and selectors are validated before the first request.
///
/// # Returns
///
/// The record table together with the colour assignment derived from the
/// user list order.
async fn scrape(settings: &Settings) -> Result<(RecordTable, ColorAssignment), Box<dyn Error>> {
    let users = load_user_list(&settings.users_file)?;
    let selectors = TransactionSelectors::compile(&settings.selectors)?;
    let source = HttpFeedSource::new(settings.base_url.clone());
    let walker = FeedWalker::new(&source, &selectors)
        .with_cutoff(settings.cutoff)
        .with_max_pages(settings.max_pages);

    info!(
        base_url = %source.base_url(),
        feed = ?settings.feed,
        users = users.len(),
        cutoff = ?settings.cutoff,
        "Walking user feeds"
    );
    let (table, reports) = walk_users(
        &walker,
        settings.feed,
        &users,
        settings.concurrency,
        settings.fail_fast,
    )
    .await?;

    let mut failed = 0usize;
    for report in &reports {
        match &report.outcome {
            UserOutcome::Completed(summary) => info!(
                user = %report.user,
                appended = summary.appended,
                skipped_no_description = summary.skipped_no_description,
                skipped_duplicates = summary.skipped_duplicates,
                stopped_at_cutoff = summary.stopped_at_cutoff,
                pages = summary.pages,
                "User completed"
            ),
            UserOutcome::FetchFailed(e) => {
                failed += 1;
                warn!(user = %report.user, error = %e, "User skipped: fetch failed");
            }
            UserOutcome::Malformed(e) => {
                failed += 1;
                warn!(user = %report.user, error = %e, "User skipped: unexpected markup");
            }
        }
    }
    if failed > 0 {
        warn!(failed, total = reports.len(), "Some users could not be scraped");
    }

    outputs::csv::write_csv(&settings.csv_path, &table)?;

    Ok((table, ColorAssignment::from_users(users.as_slice())))
}
