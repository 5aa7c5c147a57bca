//! Recovery of a JSON object from an HTML-wrapped response body.
//!
//! Some firmware builds and reverse proxies answer `system/info` with a page
//! that embeds the JSON in a `<pre>` block or script rather than serving it
//! bare.

use scraper::{Html, Selector};
use serde_json::{Map, Value};

const CANDIDATE_TAGS: [&str; 3] = ["pre", "code", "script"];

/// Finds the JSON object in `body`.
///
/// Tries the whole body, then the text of the first `<pre>` element, the
/// first `<code>` element and the first `<script>` element in that order,
/// then the span from the first `{` to the last `}` of the raw body. Element
/// text has HTML entities decoded and child markup stripped.
pub fn extract_object(body: &str) -> Option<Map<String, Value>> {
    if let Some(object) = parse_object(body) {
        return Some(object);
    }

    let document = Html::parse_document(body);
    for tag in CANDIDATE_TAGS {
        let object = element_text(&document, tag)
            .as_deref()
            .and_then(brace_span)
            .and_then(parse_object);
        if object.is_some() {
            return object;
        }
    }

    brace_span(body).and_then(parse_object)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Text content of the first `tag` element in the document.
fn element_text(document: &Html, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect())
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_passes_through() {
        let object = extract_object(r#" {"hostname":"bitaxe"} "#).unwrap();
        assert_eq!(object["hostname"], "bitaxe");
    }

    #[test]
    fn pre_block_is_unwrapped() {
        let body = r#"<html><body><h1>Status</h1><PRE class="raw">{"temp": 55.5}</PRE></body></html>"#;
        let object = extract_object(body).unwrap();
        assert_eq!(object["temp"], 55.5);
    }

    #[test]
    fn script_assignment_is_unwrapped() {
        let body = r#"<html><script>window.__info = {"fanrpm": 4200};</script></html>"#;
        let object = extract_object(body).unwrap();
        assert_eq!(object["fanrpm"], 4200);
    }

    #[test]
    fn longer_tag_names_are_skipped() {
        let document = Html::parse_document(r#"<prefix>nothing</prefix><pre>{"ssid":"mine"}</pre>"#);
        assert_eq!(element_text(&document, "pre").as_deref(), Some(r#"{"ssid":"mine"}"#));
    }

    #[test]
    fn escaped_pre_block_is_decoded() {
        let body = "<html><body><pre>{&quot;hostname&quot;: &quot;bitaxe&quot;, &quot;fanrpm&quot;: 4105, \
                    &quot;stratumUser&quot;: &quot;a&amp;b &#60;w&#x3E;&#39;&quot;}</pre></body></html>";
        let object = extract_object(body).unwrap();
        assert_eq!(object["hostname"], "bitaxe");
        assert_eq!(object["fanrpm"], 4105);
        assert_eq!(object["stratumUser"], "a&b <w>'");
    }

    #[test]
    fn child_markup_is_stripped() {
        let body = r#"<pre><span class="k">{"vrTemp"</span>: <b>61</b>}</pre>"#;
        assert_eq!(extract_object(body).unwrap()["vrTemp"], 61);
    }

    #[test]
    fn only_first_element_of_each_tag_is_tried() {
        let body = r#"<pre>no json here</pre><pre>{"ssid":"second"}</pre><code>{"ssid":"code"}</code>"#;
        assert_eq!(extract_object(body).unwrap()["ssid"], "code");
    }

    #[test]
    fn falls_back_to_brace_span() {
        let body = r#"status follows {"vrTemp": 61} end"#;
        assert_eq!(extract_object(body).unwrap()["vrTemp"], 61);
    }

    #[test]
    fn no_object_found() {
        assert!(extract_object("<html>offline</html>").is_none());
        assert!(extract_object("42").is_none());
        assert!(extract_object("} {").is_none());
    }
}
