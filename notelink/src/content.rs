//! Rich-text content helpers
//!
//! The editor serializes notes as HTML-like markup. Checklist items are
//! elements carrying a `data-checked` boolean attribute with plain-text
//! content, e.g. `<li data-type="taskItem" data-checked="true">Buy
//! milk</li>`. The completion-sync engine only depends on that shape;
//! everything else in the markup is passed through untouched.

use crate::error::{AppError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Extract the plain-text content of every checked checklist item.
///
/// Items are returned in document order, trimmed, with inline markup
/// (bold, links) flattened to its text. An item that is empty after
/// trimming is dropped. Finding nothing is not an error; malformed
/// markup is.
pub fn extract_completed_items(content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(content);
    // The editor emits HTML-ish markup; don't insist on matching tags
    reader.config_mut().check_end_names = false;

    let mut items = Vec::new();
    let mut current = String::new();
    // Nesting depth inside the checked item currently being captured
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth > 0 {
                    depth += 1;
                } else if is_checked(&e)? {
                    depth = 1;
                    current.clear();
                }
            }
            Ok(Event::Text(t)) if depth > 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| AppError::ContentParse(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(_)) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let item = current.trim().to_string();
                    if !item.is_empty() {
                        items.push(item);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(AppError::ContentParse(e.to_string())),
        }
    }

    Ok(items)
}

/// Escape plain text for insertion into markup content
pub fn escape_text(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

fn is_checked(element: &BytesStart) -> Result<bool> {
    let attr = element
        .try_get_attribute("data-checked")
        .map_err(|e| AppError::ContentParse(e.to_string()))?;

    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| AppError::ContentParse(e.to_string()))?;
            Ok(value == "true")
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_checked_items() {
        let content = r#"<ul data-type="taskList"><li data-type="taskItem" data-checked="true">Buy milk</li><li data-type="taskItem" data-checked="false">Buy eggs</li><li data-type="taskItem" data-checked="true">Call dentist</li></ul>"#;

        let items = extract_completed_items(content).unwrap();
        assert_eq!(items, vec!["Buy milk", "Call dentist"]);
    }

    #[test]
    fn test_unchecked_and_plain_content_ignored() {
        let content = r#"<p>Some intro</p><ul><li data-checked="false">Pending</li><li>No checkbox at all</li></ul>"#;

        let items = extract_completed_items(content).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_inline_markup_flattened() {
        let content =
            r#"<li data-checked="true">Read <strong>chapter 4</strong> of <em>the book</em></li>"#;

        let items = extract_completed_items(content).unwrap();
        assert_eq!(items, vec!["Read chapter 4 of the book"]);
    }

    #[test]
    fn test_entities_unescaped() {
        let content = r#"<li data-checked="true">Salt &amp; pepper</li>"#;

        let items = extract_completed_items(content).unwrap();
        assert_eq!(items, vec!["Salt & pepper"]);
    }

    #[test]
    fn test_empty_item_dropped() {
        let content = r#"<li data-checked="true">   </li><li data-checked="true">Real</li>"#;

        let items = extract_completed_items(content).unwrap();
        assert_eq!(items, vec!["Real"]);
    }

    #[test]
    fn test_empty_content() {
        assert!(extract_completed_items("").unwrap().is_empty());
    }

    #[test]
    fn test_escape_text_roundtrip_shape() {
        assert_eq!(escape_text("Salt & pepper"), "Salt &amp; pepper");
        assert_eq!(escape_text("a < b"), "a &lt; b");
        assert_eq!(escape_text("plain"), "plain");
    }
}
