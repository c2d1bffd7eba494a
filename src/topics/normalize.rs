// Markup stripping for feed descriptions.
//
// Feed descriptions are HTML fragments of wildly varying quality. We don't
// parse them: every `<...>` span becomes a single space (so "a<br>b" stays
// two words), entities are decoded, and the result is trimmed. Anything
// malformed just passes through as text.

use std::sync::LazyLock;

use regex_lite::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Strip HTML tags and decode entities. `None` and `""` both give `""`.
pub fn strip_html(text: Option<&str>) -> String {
    let text = text.unwrap_or("");
    if text.is_empty() {
        return String::new();
    }
    let without_tags = TAG_RE.replace_all(text, " ");
    decode_entities(&without_tags).trim().to_string()
}

/// The text a post contributes to every analysis: title plus stripped body.
pub fn post_document(title: &str, description: Option<&str>) -> String {
    format!("{} {}", title, strip_html(description))
}

/// Decode character references the way an HTML5 parser does in text:
/// the full named set, numeric forms, and legacy names without a trailing
/// semicolon. Anything that isn't a reference is left as written.
pub fn decode_entities(text: &str) -> String {
    htmlize::unescape(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_replaces_tags_with_space() {
        assert_eq!(strip_html(Some("<b>bold</b> text")), "bold  text");
        assert_eq!(strip_html(Some("<p>hello</p><br/>world")), "hello  world");
        assert_eq!(strip_html(Some("no tags")), "no tags");
    }

    #[test]
    fn test_strip_html_missing_input() {
        assert_eq!(strip_html(None), "");
        assert_eq!(strip_html(Some("")), "");
    }

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(strip_html(Some("Fish &amp; chips")), "Fish & chips");
        assert_eq!(strip_html(Some("&lt;tag&gt;")), "<tag>");
        assert_eq!(strip_html(Some("caf&#233; &#x41;")), "café A");
    }

    #[test]
    fn test_full_entity_set_and_missing_semicolons() {
        assert_eq!(
            strip_html(Some("Caf&eacute; &hearts; it&#39s &amp co &rarr; na&iuml;ve")),
            "Café ♥ it's & co → naïve"
        );
    }

    #[test]
    fn test_unknown_or_broken_entities_pass_through() {
        assert_eq!(decode_entities("AT&T rocks"), "AT&T rocks");
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_unclosed_tag_degrades_gracefully() {
        assert_eq!(strip_html(Some("unclosed <b")), "unclosed <b");
        assert_eq!(strip_html(Some("3 < 5 and <i>x")), "3  x");
    }

    #[test]
    fn test_post_document() {
        assert_eq!(post_document("Title", Some("<p>Body</p>")), "Title Body");
        assert_eq!(post_document("Title", None), "Title ");
    }
}
