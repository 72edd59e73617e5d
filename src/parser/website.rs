use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::markup;

static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:https?://|www\.)[^\s"'<>]+"#).unwrap());

/// Turn a link target into an absolute URL.
///
/// `http(s)://` targets pass through, `/`-relative ones are resolved against
/// `origin`, anything else gets an `https://` prefix. Blank input gives `""`.
pub fn normalize(target: &str, origin: &str) -> String {
    let target = target.trim();
    if target.is_empty() {
        return String::new();
    }
    let lower = target.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return target.to_string();
    }
    if target.starts_with('/') {
        return Url::parse(origin)
            .and_then(|base| base.join(target))
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", origin.trim_end_matches('/'), target));
    }
    format!("https://{}", target)
}

/// First `http(s)://` or `www.` run in raw markup, entity-decoded and normalized.
pub fn scan(raw: &str, origin: &str) -> Option<String> {
    BARE_URL_RE
        .find(raw)
        .map(|m| normalize(&markup::decode_entities(m.as_str()), origin))
        .filter(|u| !u.is_empty())
}
