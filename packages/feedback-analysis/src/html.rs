//! HTML to plain text conversion.
//!
//! A deliberately small, regex-based extractor. Review and survey pages only
//! need their visible text, so there is no DOM here: non-content blocks are
//! dropped, block tags become line breaks, everything else is stripped.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Non-content blocks, removed with their bodies. An unclosed block runs to
    // the end of the document.
    static ref SCRIPT_REGEX: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?(?:</script\s*>|$)").unwrap();
    static ref STYLE_REGEX: Regex =
        Regex::new(r"(?is)<style\b[^>]*>.*?(?:</style\s*>|$)").unwrap();
    static ref NOSCRIPT_REGEX: Regex =
        Regex::new(r"(?is)<noscript\b[^>]*>.*?(?:</noscript\s*>|$)").unwrap();
    static ref COMMENT_REGEX: Regex = Regex::new(r"(?s)<!--.*?(?:-->|$)").unwrap();

    static ref BLOCK_TAG_REGEX: Regex = Regex::new(
        r"(?i)</?(?:br|hr|p|div|li|tr|h[1-6]|blockquote|section|article|table|thead|tbody|tfoot)\b[^>]*>"
    ).unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();

    static ref ENTITY_REGEX: Regex =
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,6});").unwrap();

    // Any whitespace except newline
    static ref HSPACE_REGEX: Regex = Regex::new(r"[^\S\n]+").unwrap();
}

/// Convert an HTML document to readable plain text.
///
/// Output lines are trimmed, whitespace runs inside a line are collapsed to
/// one space, and blank lines are dropped.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_REGEX.replace_all(html, "");
    let text = STYLE_REGEX.replace_all(&text, "");
    let text = NOSCRIPT_REGEX.replace_all(&text, "");
    let text = COMMENT_REGEX.replace_all(&text, "");
    let text = BLOCK_TAG_REGEX.replace_all(&text, "\n");
    let text = TAG_REGEX.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    text.lines()
        .map(|line| HSPACE_REGEX.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode character references in one pass.
///
/// `&amp;lt;` becomes `&lt;`, not `<`. Unknown names are left untouched.
fn decode_entities(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = match body {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => decode_numeric(body),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_numeric(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;
    let code = match digits.strip_prefix(|c| c == 'x' || c == 'X') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code).filter(|c| *c != '\0')
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drops_script_content() {
        assert_eq!(html_to_text("<p>Hello</p><script>evil()</script>"), "Hello");
    }

    #[test]
    fn test_drops_style_noscript_and_comments() {
        let html = r#"<style>p { color: red }</style>
            <noscript>Enable JS</noscript>
            <!-- tracking pixel -->
            <div>Visible</div>"#;
        assert_eq!(html_to_text(html), "Visible");
    }

    #[test]
    fn test_block_tags_become_lines() {
        let html = "<h1>Reviews</h1><ul><li>Great food</li><li>Slow   service</li></ul>Thanks<br/>Bye";
        assert_eq!(
            html_to_text(html),
            "Reviews\nGreat food\nSlow service\nThanks\nBye"
        );
    }

    #[test]
    fn test_inline_tags_do_not_split_lines() {
        assert_eq!(
            html_to_text("<p>The <b>pasta</b> was <a href=\"#\">amazing</a></p>"),
            "The pasta was amazing"
        );
    }

    #[test]
    fn test_decodes_entities_once() {
        assert_eq!(
            html_to_text("Fish &amp; chips &lt;3 &quot;yum&quot; it&#39;s &#x263A;"),
            "Fish & chips <3 \"yum\" it's \u{263A}"
        );
        assert_eq!(html_to_text("&amp;lt;"), "&lt;");
        assert_eq!(html_to_text("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn test_nbsp_collapses_with_spaces() {
        assert_eq!(html_to_text("<p>a&nbsp;&nbsp; b</p>"), "a b");
    }

    #[test]
    fn test_uppercase_tags() {
        assert_eq!(
            html_to_text("<SCRIPT type=\"x\">bad()</SCRIPT><P>Good</P>"),
            "Good"
        );
    }

    #[test]
    fn test_carriage_returns_normalized() {
        assert_eq!(html_to_text("one\r\ntwo\rthree"), "one\ntwo\nthree");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    proptest! {
        #[test]
        fn prop_script_body_never_survives(
            text in "[a-zA-Z ]{0,40}",
            junk in "[a-z(); ]{1,40}",
        ) {
            let html = format!("<p>{}</p><script>{}SECRET</script>", text, junk);
            let out = html_to_text(&html);
            prop_assert!(!out.contains("SECRET"));
            prop_assert!(!out.contains('<'));
        }

        #[test]
        fn prop_idempotent_on_plain_text(text in "[a-zA-Z0-9 \t\n.,!?]{0,200}") {
            let once = html_to_text(&text);
            prop_assert_eq!(html_to_text(&once), once.clone());
            prop_assert!(once.lines().all(|l| !l.is_empty() && l.trim() == l));
        }

        #[test]
        fn prop_truncate_is_prefix(text in ".{0,60}", max in 0usize..80) {
            let cut = truncate_chars(&text, max);
            prop_assert!(text.starts_with(cut));
            prop_assert!(cut.chars().count() <= max);
        }
    }
}
