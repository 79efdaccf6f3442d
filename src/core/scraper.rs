use crate::{
    app::config::Config,
    error::{Error, Result},
    models::{
        channel::ChannelId,
        emote::{EmoteMap, EmoteRecord},
    },
    utils::text_processing::strip_html_tags,
};
use once_cell::sync::Lazy;
use reqwest::{Client as ReqwestClient, StatusCode};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Marks an `<img>` as a genuine emote rather than site chrome.
pub const CDN_PATH_MARKER: &str = "static-cdn.jtvnw.net/emoticons/v2/";

static CARD_HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("div.card-header").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// What a channel page yields.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPage {
    /// Empty when the page has no recognisable header.
    pub display_name: String,
    pub emotes: EmoteMap,
}

#[derive(Clone)]
pub struct PageScraper {
    client: ReqwestClient,
    config: Config,
    base_url: Url,
}

impl PageScraper {
    pub fn new(client: ReqwestClient, config: &Config) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.parsed_base_url()?,
            config: config.clone(),
        })
    }

    pub fn channel_url(&self, channel_id: &ChannelId) -> String {
        self.config.endpoint(&format!("/channels/{}", channel_id))
    }

    pub async fn scrape_channel_page(&self, channel_id: &ChannelId) -> Result<ChannelPage> {
        let url = self.channel_url(channel_id);
        tracing::info!("Fetching channel page {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::HttpStatus { url, status });
        }

        // Decodes with the declared charset; invalid bytes become U+FFFD.
        let html = response.text().await?;

        Ok(parse_channel_page(&html, &self.base_url))
    }
}

/// Extracts the display name and the emote map from channel page markup.
pub fn parse_channel_page(html: &str, base_url: &Url) -> ChannelPage {
    let document = Html::parse_document(html);
    ChannelPage {
        display_name: channel_display_name(&document),
        emotes: collect_emote_metadata(&document, base_url),
    }
}

fn channel_display_name(document: &Html) -> String {
    let Some(header) = document.select(&CARD_HEADER).next() else {
        return String::new();
    };

    for selector in [&*ANCHOR, &*HEADING] {
        if let Some(element) = header.select(selector).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return text;
            }
        }
    }

    String::new()
}

fn collect_emote_metadata(document: &Html, base_url: &Url) -> EmoteMap {
    let mut emotes = EmoteMap::new();

    for image in document.select(&IMAGE) {
        let Some(source) = image.value().attr("src").filter(|s| !s.is_empty()) else {
            continue;
        };
        if !source.contains(CDN_PATH_MARKER) {
            continue;
        }

        let Some(full_source) = absolute_source(source, base_url) else {
            tracing::debug!("Cannot resolve image source {:?}", source);
            continue;
        };
        let Some(cdn_path) = CdnPath::parse(&full_source) else {
            tracing::debug!("Unexpected emote URL shape {:?}", full_source);
            continue;
        };

        if emotes.contains_key(&cdn_path.emote_identifier) {
            tracing::debug!("Duplicate emote {} ignored", cdn_path.emote_identifier);
            continue;
        }

        let emote_code = emote_code_for(image, &cdn_path.emote_identifier);
        emotes.insert(
            cdn_path.emote_identifier,
            EmoteRecord {
                base_url: cdn_path.base_url,
                format_type: cdn_path.format_type,
                emote_code,
            },
        );
    }

    emotes
}

fn absolute_source(source: &str, base_url: &Url) -> Option<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Some(source.to_string());
    }
    base_url.join(source).ok().map(String::from)
}

/// The positional pieces of `.../emoticons/v2/<id>/<format>/...`.
#[derive(Debug, PartialEq, Eq)]
struct CdnPath {
    emote_identifier: String,
    format_type: String,
    base_url: String,
}

impl CdnPath {
    /// Splits on `/` and reads the segments after the first `emoticons`.
    /// At least three must follow it.
    fn parse(url: &str) -> Option<Self> {
        let parts: Vec<&str> = url.split('/').collect();
        let index = parts.iter().position(|part| *part == "emoticons")?;
        if index + 3 >= parts.len() {
            return None;
        }
        Some(Self {
            emote_identifier: parts[index + 2].to_string(),
            format_type: parts[index + 3].to_string(),
            base_url: parts[..=index + 3].join("/"),
        })
    }
}

/// `data-regex`, then the tooltip without markup, then the parent's text,
/// then the identifier itself.
fn emote_code_for(image: ElementRef<'_>, emote_identifier: &str) -> String {
    let element = image.value();

    if let Some(code) = element.attr("data-regex") {
        if !code.trim().is_empty() {
            return code.to_string();
        }
    }

    if let Some(tooltip) = element.attr("data-tooltip") {
        let code = strip_html_tags(tooltip).trim().to_string();
        if !code.is_empty() {
            return code;
        }
    }

    if let Some(parent) = image.parent().and_then(ElementRef::wrap) {
        let text = element_text(parent);
        if !text.is_empty() {
            return text;
        }
    }

    emote_identifier.to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
