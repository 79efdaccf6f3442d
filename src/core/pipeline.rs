use crate::{
    app::config::Config,
    core::{
        downloader::EmoteDownloader, http::build_client, resolver::ChannelResolver,
        scraper::PageScraper,
    },
    error::{Error, Result},
    events::download_event::{DownloadEvent, EventSink, report},
    models::channel::ChannelId,
    utils::text_processing::{UNKNOWN_NAME, make_safe_name},
};
use std::path::PathBuf;

/// Resolve, scrape and download, wired to one shared HTTP client.
pub struct EmotePipeline {
    resolver: ChannelResolver,
    scraper: PageScraper,
    downloader: EmoteDownloader,
    output_dir: PathBuf,
}

impl EmotePipeline {
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_client(config)?;
        Ok(Self {
            resolver: ChannelResolver::new(client.clone(), config),
            scraper: PageScraper::new(client.clone(), config)?,
            downloader: EmoteDownloader::new(client, config),
            output_dir: config.output_dir.clone(),
        })
    }

    pub async fn resolve(&self, identifier: &str) -> Result<ChannelId> {
        self.resolver.resolve(identifier).await
    }

    /// Downloads every emote on the channel page into its own folder and
    /// returns that folder. Only the page fetch and the channel folder
    /// creation can fail; asset problems go to `sink`.
    pub async fn download_channel_emotes(
        &self,
        channel_id: &ChannelId,
        sink: &mut dyn EventSink,
    ) -> Result<PathBuf> {
        report(sink, DownloadEvent::Info("Collecting emote metadata...".to_string()));
        let page = self.scraper.scrape_channel_page(channel_id).await?;

        let output_root = self
            .output_dir
            .join(channel_folder_name(&page.display_name, channel_id));
        tokio::fs::create_dir_all(&output_root)
            .await
            .map_err(|e| Error::io(&output_root, e))?;

        report(sink, DownloadEvent::Info(format!("Channel ID: {}", channel_id)));
        if !page.display_name.is_empty() {
            report(
                sink,
                DownloadEvent::Info(format!("Channel Name: {}", page.display_name)),
            );
        }
        report(
            sink,
            DownloadEvent::Info(format!("Output Folder: {}", output_root.display())),
        );
        report(
            sink,
            DownloadEvent::Info(format!("Found {} emotes", page.emotes.len())),
        );

        if !page.emotes.is_empty() {
            self.downloader
                .download_all(&page.emotes, &output_root, sink)
                .await;
        }

        Ok(output_root)
    }
}

/// The sanitized display name, or the sanitized ID when the name gives nothing usable.
pub fn channel_folder_name(display_name: &str, channel_id: &ChannelId) -> String {
    let safe_name = make_safe_name(display_name);
    if safe_name == UNKNOWN_NAME {
        make_safe_name(channel_id.as_str())
    } else {
        safe_name
    }
}
