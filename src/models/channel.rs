use crate::utils::text_processing::is_numeric;
use std::fmt;

/// Canonical numeric channel ID on the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Accepts only a non-empty string of ASCII digits.
    pub fn parse(text: &str) -> Option<Self> {
        is_numeric(text).then(|| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
