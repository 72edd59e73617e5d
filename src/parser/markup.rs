use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|(nbsp|amp|quot|apos|lt|gt));").unwrap()
});
// An unterminated tag swallows the rest of the input.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").unwrap());

/// Replace the known named references and any numeric reference with the
/// character they stand for. Anything else is left as-is.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(printable)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(printable)
            } else {
                match &caps[3] {
                    "nbsp" => Some(' '),
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// NUL and other control characters stay encoded; whitespace controls decode.
fn printable(code: u32) -> Option<char> {
    char::from_u32(code).filter(|c| !c.is_control() || c.is_whitespace())
}

/// Replace every `<...>` span with a single space.
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, " ").into_owned()
}

/// Collapse whitespace runs to one space and trim.
pub fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Markup fragment to display text: tags out, entities decoded, whitespace collapsed.
pub fn clean_text(fragment: &str) -> String {
    collapse_ws(&decode_entities(&strip_tags(fragment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(
            decode_entities("Tom&nbsp;&amp;&nbsp;Jerry &quot;Q&quot; &#39;s&#39; &lt;b&gt;"),
            "Tom & Jerry \"Q\" 's' <b>"
        );
        assert_eq!(decode_entities("Caf&#233; &#x4E2D;"), "Café 中");
    }

    #[test]
    fn unknown_entities_left_verbatim() {
        assert_eq!(decode_entities("a &bogus; b &#xZZ; &"), "a &bogus; b &#xZZ; &");
        // out of range code point
        assert_eq!(decode_entities("&#1114112;"), "&#1114112;");
    }

    #[test]
    fn control_references_left_verbatim() {
        assert_eq!(decode_entities("Acme&#0;Univ"), "Acme&#0;Univ");
        assert_eq!(decode_entities("a&#x1B;b&#127;c"), "a&#x1B;b&#127;c");
        assert_eq!(decode_entities("a&#9;b&#10;c"), "a\tb\nc");
    }

    #[test]
    fn decoding_plain_text_is_noop() {
        for s in ["", "plain", "  spaced  out ", "Université Laval", "<td>x</td>"] {
            assert_eq!(decode_entities(s), s);
        }
    }

    #[test]
    fn decodes_only_once() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn strips_tags_to_spaces() {
        assert_eq!(strip_tags("<b>Acme</b>School"), " Acme School");
        assert_eq!(strip_tags(""), "");
        assert_eq!(strip_tags("Acme <span class=\"x\""), "Acme  ");
    }

    #[test]
    fn clean_text_collapses_nbsp() {
        assert_eq!(clean_text("  <a>Acme&nbsp;&nbsp;\n School</a> "), "Acme School");
        assert_eq!(clean_text("<br/>"), "");
    }
}
