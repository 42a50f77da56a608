//! RSS feed extraction.
//!
//! `/u/{user}/rss` embeds each article body in the item's `<description>`,
//! either entity-escaped or wrapped in CDATA. Items without a description are
//! not articles (reposts, likes) and are skipped.
//!
//! Word counts follow [`DirectParagraphText`]: only text sitting directly
//! inside a `<p>` counts.

use super::{CountingPolicy, DirectParagraphText};
use crate::error::StructuralMismatch;
use crate::models::ArticleRecord;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use scraper::Html;
use tracing::debug;

/// The parts of an RSS `<item>` the extractor cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssItem {
    /// Every `<title>` child of the item, trimmed. Well-formed items have one.
    pub titles: Vec<String>,
    /// Decoded markup of the first `<description>` child, if any.
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Description,
}

/// Split an RSS document into its items, in document order.
pub fn parse_items(xml: &str) -> quick_xml::Result<Vec<RssItem>> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();

    let mut current: Option<RssItem> = None;
    // Element depth below the open <item>; 1 means a direct child.
    let mut depth = 0usize;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if current.is_some() {
                    depth += 1;
                    if depth == 1 {
                        // Qualified names: `<media:title>` or `<dc:description>` are
                        // extensions, not the item's own fields.
                        field = match e.name().as_ref() {
                            b"title" => Some(Field::Title),
                            b"description" => Some(Field::Description),
                            _ => None,
                        };
                        text.clear();
                    }
                } else if e.name().as_ref() == b"item" {
                    current = Some(RssItem::default());
                    depth = 0;
                }
            }
            Event::Empty(e) => {
                if let Some(item) = current.as_mut().filter(|_| depth == 0) {
                    match e.name().as_ref() {
                        b"title" => item.titles.push(String::new()),
                        b"description" => {
                            item.description.get_or_insert_with(String::new);
                        }
                        _ => {}
                    }
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                    continue;
                }
                if depth == 1 {
                    if let (Some(item), Some(done)) = (current.as_mut(), field.take()) {
                        let value = std::mem::take(&mut text);
                        match done {
                            Field::Title => item.titles.push(value.trim().to_string()),
                            Field::Description => {
                                item.description.get_or_insert(value);
                            }
                        }
                    }
                }
                depth -= 1;
            }
            Event::Text(e) if field.is_some() => text.push_str(&e.decode()?),
            Event::CData(e) if field.is_some() => text.push_str(&e.decode()?),
            Event::GeneralRef(e) if field.is_some() => push_reference(&mut text, &e)?,
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(count = items.len(), "Parsed RSS items");
    Ok(items)
}

/// Append the replacement text of `&name;` / `&#N;` to `text`.
///
/// Unknown named entities (e.g. `&nbsp;` that escaped double-encoding) are kept
/// verbatim so the HTML parser downstream can resolve them.
fn push_reference(text: &mut String, reference: &BytesRef<'_>) -> quick_xml::Result<()> {
    if let Some(ch) = reference.resolve_char_ref()? {
        text.push(ch);
        return Ok(());
    }
    let name = reference.decode()?;
    match resolve_predefined_entity(&name) {
        Some(value) => text.push_str(value),
        None => {
            text.push('&');
            text.push_str(&name);
            text.push(';');
        }
    }
    Ok(())
}

/// Build the record for one RSS item written by `user`.
///
/// Returns `Ok(None)` for items without a description and a
/// [`StructuralMismatch`] for items with zero or several titles.
pub fn extract_article(user: &str, item: &RssItem) -> Result<Option<ArticleRecord>, StructuralMismatch> {
    let Some(description) = item.description.as_deref() else {
        return Ok(None);
    };

    let title = match item.titles.as_slice() {
        [title] => title.clone(),
        other => {
            return Err(StructuralMismatch {
                element: "title",
                found: other.len(),
                context: format!("RSS item of {user}"),
            });
        }
    };

    let fragment = Html::parse_fragment(description);
    let counts = DirectParagraphText.count(fragment.root_element());
    debug!(
        user,
        %title,
        words = counts.words,
        images = counts.images,
        policy = DirectParagraphText::NAME,
        "Extracted RSS article"
    );

    Ok(Some(ArticleRecord {
        author: user.to_string(),
        title,
        word_count: counts.words,
        image_count: counts.images,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>alice on Bitpost</title>
    <link>https://bitpost.app/u/alice</link>
    <item>
      <title>Escaped &amp; counted</title>
      <description>&lt;p&gt;Hello there, world&lt;/p&gt;&lt;p&gt;Two &lt;em&gt;skipped&lt;/em&gt; more&lt;/p&gt;</description>
      <link>https://bitpost.app/tx/1</link>
    </item>
    <item>
      <title><![CDATA[Pictures]]></title>
      <description><![CDATA[intro outside <p>caption <img src="a.jpg"></p><div><span><img src="b.jpg"></span></div>]]></description>
    </item>
    <item>
      <title>Just a like</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_items_in_order() {
        let items = parse_items(FEED).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].titles, vec!["Escaped & counted"]);
        assert_eq!(
            items[0].description.as_deref(),
            Some("<p>Hello there, world</p><p>Two <em>skipped</em> more</p>")
        );
        assert_eq!(items[1].titles, vec!["Pictures"]);
        assert!(items[2].description.is_none());
    }

    #[test]
    fn test_channel_title_is_not_an_item_title() {
        let items = parse_items(FEED).unwrap();
        assert!(items.iter().all(|i| !i.titles.contains(&"alice on Bitpost".to_string())));
    }

    #[test]
    fn test_extract_counts_direct_paragraph_text_only() {
        let items = parse_items(FEED).unwrap();
        let record = extract_article("alice", &items[0]).unwrap().unwrap();
        // "Hello", "there", "world", "Two", "more"; the <em> word is not direct text.
        assert_eq!(record.word_count, 5);
        assert_eq!(record.image_count, 0);
        assert_eq!(record.author, "alice");
        assert_eq!(record.title, "Escaped & counted");
    }

    #[test]
    fn test_extract_counts_images_at_any_depth() {
        let items = parse_items(FEED).unwrap();
        let record = extract_article("alice", &items[1]).unwrap().unwrap();
        // "intro outside" is not inside a <p>.
        assert_eq!(record.word_count, 1);
        assert_eq!(record.image_count, 2);
    }

    #[test]
    fn test_item_without_description_is_skipped() {
        let items = parse_items(FEED).unwrap();
        assert_eq!(extract_article("alice", &items[2]).unwrap(), None);
    }

    #[test]
    fn test_item_with_two_titles_is_structural_mismatch() {
        let xml = "<rss><channel><item><title>a</title><title>b</title><description>x</description></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        let err = extract_article("bob", &items[0]).unwrap_err();
        assert_eq!(err.element, "title");
        assert_eq!(err.found, 2);
    }

    #[test]
    fn test_item_without_title_is_structural_mismatch() {
        let xml = "<rss><channel><item><description>&lt;p&gt;x&lt;/p&gt;</description></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        let err = extract_article("bob", &items[0]).unwrap_err();
        assert_eq!(err.found, 0);
    }

    #[test]
    fn test_character_references_are_resolved() {
        let xml = "<rss><channel><item><title>caf&#233; &#x2014; ok</title></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        assert_eq!(items[0].titles, vec!["café — ok"]);
    }

    #[test]
    fn test_unknown_entity_is_kept_for_html_parser() {
        let xml = "<rss><channel><item><title>t</title><description>&lt;p&gt;a&amp;nbsp;b&lt;/p&gt;</description></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        let record = extract_article("bob", &items[0]).unwrap().unwrap();
        assert_eq!(items[0].description.as_deref(), Some("<p>a&nbsp;b</p>"));
        assert_eq!(record.word_count, 2);
    }

    #[test]
    fn test_empty_description_element_counts_as_zero() {
        let xml = "<rss><channel><item><title>t</title><description/></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        let record = extract_article("bob", &items[0]).unwrap().unwrap();
        assert_eq!((record.word_count, record.image_count), (0, 0));
    }

    #[test]
    fn test_namespaced_title_is_not_an_item_title() {
        let xml = "<rss><channel><item><title>Real</title><itunes:title>Other</itunes:title><description>&lt;p&gt;one two&lt;/p&gt;</description></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        assert_eq!(items[0].titles, vec!["Real"]);
        let record = extract_article("bob", &items[0]).unwrap().unwrap();
        assert_eq!(record.title, "Real");
        assert_eq!(record.word_count, 2);
    }

    #[test]
    fn test_namespaced_description_does_not_shadow_body() {
        let xml = "<rss><channel><item><title>t</title><media:description>caption only</media:description><description>&lt;p&gt;one two three&lt;/p&gt;</description></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        assert_eq!(items[0].description.as_deref(), Some("<p>one two three</p>"));
        let record = extract_article("bob", &items[0]).unwrap().unwrap();
        assert_eq!(record.word_count, 3);
    }

    #[test]
    fn test_item_with_only_namespaced_description_is_skipped() {
        let xml = "<rss><channel><item><title>t</title><dc:description/></item></channel></rss>";
        let items = parse_items(xml).unwrap();
        assert_eq!(items[0].description, None);
        assert_eq!(extract_article("bob", &items[0]).unwrap(), None);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(parse_items("<rss><channel><item><title>t</channel></rss>").is_err());
    }
}
