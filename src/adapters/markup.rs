use crate::core::format::parse_points;
use crate::domain::model::CatalogEntry;
use crate::domain::ports::ProductCatalogSource;
use crate::utils::error::{ExchangeError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

const IGNORED_PATTERN: &str =
    r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>";
const TAG_PATTERN: &str = r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)(\s[^>]*)?>";
const ATTR_PATTERN: &str = r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub const CARD_CLASS: &str = "product-card";
pub const NAME_CLASS: &str = "product-name";
pub const POINTS_CLASS: &str = "points-value";
pub const CONFIRM_CLASS: &str = "exchange-button";

/// Reads products from rendered HTML.
///
/// Every element whose class list contains `product-card` is one item; it carries `data-id` and
/// `data-points`, and optionally a `product-name` element inside it. The current budget is the
/// text of the first `points-value` element. Comments, scripts and styles are not scanned.
#[derive(Debug, Clone)]
pub struct MarkupCatalog {
    html: String,
}

#[derive(Debug)]
struct Tag {
    name: String,
    closing: bool,
    /// Opens an element that has content and a matching end tag.
    opens_content: bool,
    start: usize,
    end: usize,
    attrs: HashMap<String, String>,
}

impl Tag {
    fn has_class(&self, class: &str) -> bool {
        !self.closing
            && self
                .attrs
                .get("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// Markup with ignored sections removed, and its tags in document order.
struct Document {
    text: String,
    tags: Vec<Tag>,
}

impl Document {
    fn parse(html: &str) -> Result<Self> {
        let ignored_re = compile(IGNORED_PATTERN)?;
        let tag_re = compile(TAG_PATTERN)?;
        let attr_re = compile(ATTR_PATTERN)?;

        let text = ignored_re.replace_all(html, "").into_owned();

        let tags = tag_re
            .captures_iter(&text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps[2].to_ascii_lowercase();
                let closing = !caps[1].is_empty();

                let mut attrs = HashMap::new();
                if let Some(raw) = caps.get(3) {
                    for attr in attr_re.captures_iter(raw.as_str()) {
                        let value = attr
                            .get(2)
                            .or_else(|| attr.get(3))
                            .map(|m| decode_entities(m.as_str()))
                            .unwrap_or_default();
                        attrs.insert(attr[1].to_ascii_lowercase(), value);
                    }
                }

                let self_closing = whole.as_str().ends_with("/>");
                let opens_content =
                    !closing && !self_closing && !VOID_ELEMENTS.contains(&name.as_str());

                Some(Tag {
                    name,
                    closing,
                    opens_content,
                    start: whole.start(),
                    end: whole.end(),
                    attrs,
                })
            })
            .collect();

        Ok(Self { text, tags })
    }

    /// Index of the tag closing the element opened at `open`, tracking nesting of the same
    /// element name. `None` when the element is never closed.
    fn closing_index(&self, open: usize) -> Option<usize> {
        let opener = &self.tags[open];
        if !opener.opens_content {
            return Some(open);
        }

        let mut depth = 0usize;
        for (i, tag) in self.tags.iter().enumerate().skip(open) {
            if tag.name != opener.name {
                continue;
            }
            if tag.closing {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            } else if tag.opens_content {
                depth += 1;
            }
        }
        None
    }

    /// Text directly following a tag, up to the next tag.
    fn text_after(&self, tag: &Tag) -> String {
        let rest = &self.text[tag.end..];
        let text = rest.split('<').next().unwrap_or_default();
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        decode_entities(&collapsed)
    }

    fn find_class(&self, class: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.has_class(class))
    }
}

impl MarkupCatalog {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let html = std::fs::read_to_string(&path)?;
        Ok(Self::from_html(html))
    }
}

impl ProductCatalogSource for MarkupCatalog {
    fn entries(&self) -> Result<Vec<CatalogEntry>> {
        let doc = Document::parse(&self.html)?;
        let cards: Vec<usize> = doc
            .tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| tag.has_class(CARD_CLASS))
            .map(|(i, _)| i)
            .collect();

        let mut entries = Vec::with_capacity(cards.len());
        for (n, &card_idx) in cards.iter().enumerate() {
            let card = &doc.tags[card_idx];

            // 未閉合的卡片最多延伸到下一張卡片
            let region_end = doc.closing_index(card_idx).unwrap_or_else(|| {
                cards.get(n + 1).copied().unwrap_or(doc.tags.len())
            });

            let name = doc.tags[card_idx + 1..region_end.max(card_idx + 1)]
                .iter()
                .find(|tag| tag.has_class(NAME_CLASS))
                .map(|tag| doc.text_after(tag))
                .filter(|name| !name.is_empty());

            let points = card.attrs.get("data-points").and_then(|raw| parse_cost(raw));
            if points.is_none() {
                tracing::debug!(
                    "Product card at byte {} has no usable data-points attribute",
                    card.start
                );
            }

            entries.push(CatalogEntry {
                id: card.attrs.get("data-id").cloned(),
                points,
                name,
            });
        }

        tracing::debug!("Found {} product cards in markup", entries.len());
        Ok(entries)
    }

    fn available_points(&self) -> Option<u64> {
        let doc = Document::parse(&self.html).ok()?;
        let display = doc.find_class(POINTS_CLASS)?;
        parse_points(&doc.text_after(display))
    }

    fn has_confirm_control(&self) -> Option<bool> {
        let doc = Document::parse(&self.html).ok()?;
        Some(doc.find_class(CONFIRM_CLASS).is_some())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ExchangeError::CatalogError {
        message: format!("invalid markup pattern: {}", e),
    })
}

/// Costs are plain non-negative integers; thousands separators are tolerated.
fn parse_cost(raw: &str) -> Option<u64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="points-display">Available: <span class="points-value">7,000</span></div>
        <div class="product-grid">
          <div class="product-card" data-id="mug" data-points="3000">
            <h3 class="product-name">Coffee   Mug</h3>
            <p class="product-points">3,000 pts</p>
          </div>
          <div data-points="5000" class="product-card featured" data-id='speaker'>
            <h3 class="product-name">Speaker &amp; Stand</h3>
          </div>
          <div class="product-card" data-id="broken"></div>
          <div class="product-card" data-id="negative" data-points="-5"></div>
          <div class="product-card" data-id="nameless" data-points="200"></div>
        </div>
        <button id="exchange-btn" class="exchange-button" disabled>Exchange</button>
    "#;

    #[test]
    fn test_reads_cards_in_document_order() {
        let catalog = MarkupCatalog::from_html(PAGE);
        let entries = catalog.entries().unwrap();

        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], CatalogEntry::new("mug", 3000, Some("Coffee Mug")));
        assert_eq!(
            entries[1],
            CatalogEntry::new("speaker", 5000, Some("Speaker & Stand"))
        );
        assert_eq!(entries[2].points, None);
        assert_eq!(entries[3].points, None);
        assert_eq!(entries[4], CatalogEntry::new("nameless", 200, None));
    }

    #[test]
    fn test_reads_available_points() {
        let catalog = MarkupCatalog::from_html(PAGE);
        assert_eq!(catalog.available_points(), Some(7000));

        let bare = MarkupCatalog::from_html("<div class=\"product-card\"></div>");
        assert_eq!(bare.available_points(), None);
    }

    #[test]
    fn test_commented_and_scripted_cards_are_ignored() {
        let catalog = MarkupCatalog::from_html(
            r#"
            <!-- <div class="product-card" data-id="ghost" data-points="1"> -->
            <div class="product-card" data-id="mug" data-points="3000">
              <!-- <h3 class="product-name">Old Name</h3> -->
              <h3 class="product-name">Coffee Mug</h3>
            </div>
            <script>
              const tpl = '<div class="product-card" data-id="tpl" data-points="5">';
            </script>
            <style>.product-card > .x { color: red; }</style>
            "#,
        );

        let entries = catalog.entries().unwrap();
        assert_eq!(entries, vec![CatalogEntry::new("mug", 3000, Some("Coffee Mug"))]);
    }

    #[test]
    fn test_name_is_bounded_by_the_card() {
        let catalog = MarkupCatalog::from_html(
            r#"
            <div class="product-card" data-id="mug" data-points="3000">
              <div class="card-body"><div class="meta"></div></div>
            </div>
            <aside><span class="product-name">Bluetooth Speaker</span></aside>
            <div class="product-card" data-id="tote" data-points="2000">
              <div class="card-body">
                <img src="tote.png">
                <br/>
                <h3 class="product-name">Tote Bag</h3>
              </div>
            </div>
            <div class="product-card" data-id="voucher" data-points="1500"></div>
            <footer><p class="product-name">Terms apply</p></footer>
            "#,
        );

        let entries = catalog.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], CatalogEntry::new("mug", 3000, None));
        assert_eq!(entries[1], CatalogEntry::new("tote", 2000, Some("Tote Bag")));
        assert_eq!(entries[2], CatalogEntry::new("voucher", 1500, None));
    }

    #[test]
    fn test_unclosed_card_stops_at_next_card() {
        let catalog = MarkupCatalog::from_html(
            r#"<div class="product-card" data-id="a" data-points="1">
               <div class="product-card" data-id="b" data-points="2"><h3 class="product-name">B</h3></div>"#,
        );
        let entries = catalog.entries().unwrap();
        assert_eq!(entries[0].name, None);
        assert_eq!(entries[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_detects_confirm_control() {
        assert_eq!(MarkupCatalog::from_html(PAGE).has_confirm_control(), Some(true));

        let commented = MarkupCatalog::from_html(
            r#"<div class="product-card" data-id="a" data-points="1"></div>
               <!-- <button class="exchange-button">Exchange</button> -->"#,
        );
        assert_eq!(commented.has_confirm_control(), Some(false));
    }

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost("3000"), Some(3000));
        assert_eq!(parse_cost(" 3,000 "), Some(3000));
        assert_eq!(parse_cost("-1"), None);
        assert_eq!(parse_cost("1.5"), None);
        assert_eq!(parse_cost(""), None);
    }
}
