//! Transaction page extraction.
//!
//! Each bitfeed entry points at `/tx/{id}`, a full HTML page holding the
//! post's author, title and body. The three parts are located with
//! configurable CSS selectors ([`SelectorConfig`]).
//!
//! Author and title must each match exactly once; anything else means the
//! page layout is not what the selectors expect and is reported as a
//! [`StructuralMismatch`]. A missing body is not an error: the record is kept
//! with zero words and zero images.
//!
//! Word counts follow [`DescendantParagraphText`].

use super::{ContentCounts, CountingPolicy, DescendantParagraphText};
use crate::config::SelectorConfig;
use crate::error::{ConfigError, StructuralMismatch};
use crate::models::ArticleRecord;
use itertools::Itertools;
use scraper::{Html, Selector};
use tracing::debug;

/// Compiled form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct TransactionSelectors {
    author: Selector,
    title: Selector,
    content: Selector,
}

impl TransactionSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            author: parse_selector(&config.author)?,
            title: parse_selector(&config.title)?,
            content: parse_selector(&config.content)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Build the record for the transaction page `html` of post `tx_id`.
pub fn extract_article(
    html: &str,
    tx_id: &str,
    selectors: &TransactionSelectors,
) -> Result<ArticleRecord, StructuralMismatch> {
    let document = Html::parse_document(html);
    let author = single_text(&document, &selectors.author, "author", tx_id)?;
    let title = single_text(&document, &selectors.title, "title", tx_id)?;

    let counts = match document.select(&selectors.content).next() {
        Some(container) => DescendantParagraphText.count(container),
        None => {
            debug!(tx_id, "No content container; recording zero counts");
            ContentCounts::default()
        }
    };
    debug!(
        tx_id,
        %author,
        %title,
        words = counts.words,
        images = counts.images,
        policy = DescendantParagraphText::NAME,
        "Extracted transaction article"
    );

    Ok(ArticleRecord {
        author,
        title,
        word_count: counts.words,
        image_count: counts.images,
    })
}

/// Whitespace-normalized text of the only element matching `selector`.
fn single_text(
    document: &Html,
    selector: &Selector,
    element: &'static str,
    tx_id: &str,
) -> Result<String, StructuralMismatch> {
    let matches: Vec<_> = document.select(selector).collect();
    match matches.as_slice() {
        [only] => Ok(only.text().collect::<String>().split_whitespace().join(" ")),
        other => Err(StructuralMismatch {
            element,
            found: other.len(),
            context: format!("tx {tx_id}"),
        }),
    }
}
