//! Command-line interface definitions for bitpost_stats.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option except `--config` can also come from the YAML config file; see
//! [`crate::config::Settings::resolve`] for the precedence rules.

use crate::config::FeedKind;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for bitpost_stats.
///
/// # Examples
///
/// ```sh
/// # Scrape every user's RSS feed and write charts to ./charts
/// bitpost_stats -u users.txt
///
/// # Walk the JSON feed back to the start of 2021, two users at a time
/// bitpost_stats -u users.txt --feed bitfeed --since 2021-01-01 --concurrency 2
///
/// # Redraw the charts from an earlier scrape
/// bitpost_stats --from-csv data.csv -o ./charts
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File listing the users to scrape (first line is a header)
    #[arg(short, long)]
    pub users_file: Option<PathBuf>,

    /// Base URL of the publishing platform
    #[arg(long, env = "BITPOST_BASE_URL")]
    pub base_url: Option<String>,

    /// Which per-user feed to walk
    #[arg(long, value_enum)]
    pub feed: Option<FeedKind>,

    /// Ignore posts published before this date (bitfeed only)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub since: Option<NaiveDate>,

    /// Maximum number of bitfeed pages to request per user
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Number of users walked at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Where to write the scraped records as CSV
    #[arg(long = "csv")]
    pub csv_path: Option<PathBuf>,

    /// Skip scraping and report on a previously written CSV file
    #[arg(long, value_name = "CSV")]
    pub from_csv: Option<PathBuf>,

    /// Output directory for the SVG charts
    #[arg(short = 'o', long)]
    pub chart_dir: Option<PathBuf>,

    /// Also write the per-author statistics as JSON
    #[arg(long)]
    pub stats_json: Option<PathBuf>,

    /// Abort the whole run on the first user that fails
    #[arg(long)]
    pub fail_fast: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "bitpost_stats",
            "--users-file",
            "users.txt",
            "--feed",
            "bitfeed",
            "--since",
            "2021-01-01",
        ]);

        assert_eq!(cli.users_file, Some(PathBuf::from("users.txt")));
        assert_eq!(cli.feed, Some(FeedKind::Bitfeed));
        assert_eq!(cli.since, NaiveDate::from_ymd_opt(2021, 1, 1));
        assert!(!cli.fail_fast);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "bitpost_stats",
            "-u",
            "/tmp/users.txt",
            "-o",
            "/tmp/charts",
            "-c",
            "/tmp/config.yaml",
        ]);

        assert_eq!(cli.users_file, Some(PathBuf::from("/tmp/users.txt")));
        assert_eq!(cli.chart_dir, Some(PathBuf::from("/tmp/charts")));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
    }

    #[test]
    fn test_cli_reload_and_fail_fast() {
        let cli = Cli::parse_from([
            "bitpost_stats",
            "--from-csv",
            "data.csv",
            "--csv",
            "out.csv",
            "--fail-fast",
        ]);

        assert_eq!(cli.from_csv, Some(PathBuf::from("data.csv")));
        assert_eq!(cli.csv_path, Some(PathBuf::from("out.csv")));
        assert!(cli.fail_fast);
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let result = Cli::try_parse_from(["bitpost_stats", "--since", "yesterday"]);
        assert!(result.is_err());
    }
}
