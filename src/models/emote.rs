use std::collections::HashMap;

/// One emote found on a channel page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmoteRecord {
    /// CDN path up to and including the format segment, without size or theme.
    pub base_url: String,
    pub format_type: String,
    /// Best-effort chat code; falls back to the emote identifier.
    pub emote_code: String,
}

impl EmoteRecord {
    /// `<base_url>/<theme>/<size>`
    pub fn asset_url(&self, theme: &str, size: &str) -> String {
        format!("{}/{}/{}", self.base_url, theme, size)
    }
}

/// Emote identifier to record. Unordered; built once per scrape.
pub type EmoteMap = HashMap<String, EmoteRecord>;
