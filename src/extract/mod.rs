//! Article extraction: turning one article's markup into an [`ArticleRecord`].
//!
//! The platform serves article bodies in two shapes, and each gets its own
//! extractor and counting policy:
//!
//! | Module | Input | Policy |
//! |--------|-------|--------|
//! | [`rss`] | `<description>` payload of an RSS item | [`DirectParagraphText`] |
//! | [`transaction`] | full HTML page of one post | [`DescendantParagraphText`] |
//!
//! The two policies disagree on what counts as article text, so the totals of
//! an RSS walk and a bitfeed walk over the same posts differ.
//!
//! # Counting rules
//!
//! - A word is a maximal run of Unicode word characters (`\w+`).
//! - Images are all `<img>` elements inside the content container, at any
//!   depth.
//!
//! [`ArticleRecord`]: crate::models::ArticleRecord

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

pub mod rss;
pub mod transaction;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Word and image totals for one content container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentCounts {
    pub words: u64,
    pub images: u64,
}

/// Number of `\w+` tokens in `text`.
pub fn count_words(text: &str) -> u64 {
    WORD_RE.find_iter(text).count() as u64
}

/// Given a content-container node, return its word and image counts.
///
/// Implementors only decide which text inside a `<p>` is article text; image
/// counting is the same for every policy.
pub trait CountingPolicy {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Words contributed by one `<p>` element.
    fn paragraph_words(&self, paragraph: ElementRef<'_>) -> u64;

    fn count(&self, container: ElementRef<'_>) -> ContentCounts {
        let words = container
            .select(&PARAGRAPH)
            .map(|p| self.paragraph_words(p))
            .sum();
        let images = container.select(&IMAGE).count() as u64;
        ContentCounts { words, images }
    }
}

/// Only the text nodes that are direct children of a `<p>` count.
///
/// `<p>one <b>two</b> three</p>` has two words: `one` and `three`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectParagraphText;

impl CountingPolicy for DirectParagraphText {
    const NAME: &'static str = "direct-paragraph-text";

    fn paragraph_words(&self, paragraph: ElementRef<'_>) -> u64 {
        paragraph
            .children()
            .filter_map(|child| child.value().as_text())
            .map(|text| count_words(text))
            .sum()
    }
}

/// The full text of a `<p>`, including nested inline elements, counts.
///
/// `<p>one <b>two</b> three</p>` has three words.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescendantParagraphText;

impl CountingPolicy for DescendantParagraphText {
    const NAME: &'static str = "descendant-paragraph-text";

    fn paragraph_words(&self, paragraph: ElementRef<'_>) -> u64 {
        count_words(&paragraph.text().collect::<String>())
    }
}
