use once_cell::sync::Lazy;
use regex::Regex;

pub const UNKNOWN_NAME: &str = "unknown";

static CHANNEL_PATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/channels/(\d+)").unwrap());
static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").unwrap());
static UNSAFE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// Turns an arbitrary label into a file or folder name.
///
/// Each run of characters outside `[A-Za-z0-9_]` collapses to one underscore.
/// Input with no allowed character at all (blank, `":)"`) maps to `"unknown"`.
/// Applying it twice changes nothing.
pub fn make_safe_name(name: &str) -> String {
    let name = name.trim();
    if !name.chars().any(|c| c.is_ascii_alphanumeric() || c == '_') {
        return UNKNOWN_NAME.to_string();
    }
    UNSAFE_NAME_REGEX.replace_all(name, "_").into_owned()
}

/// First `/channels/<digits>` path in `text`, digits only.
pub fn find_channel_id(text: &str) -> Option<&str> {
    CHANNEL_PATH_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn strip_html_tags(text: &str) -> String {
    HTML_TAG_REGEX.replace_all(text, "").into_owned()
}

pub fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}
