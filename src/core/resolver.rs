use crate::{
    app::config::Config,
    error::{Error, Result},
    models::channel::ChannelId,
    utils::text_processing::find_channel_id,
};
use reqwest::{Client as ReqwestClient, header::CONTENT_TYPE};

/// Turns a channel name or numeric ID into a canonical [`ChannelId`].
#[derive(Clone)]
pub struct ChannelResolver {
    client: ReqwestClient,
    search_url: String,
    search_source: String,
}

impl ChannelResolver {
    pub fn new(client: ReqwestClient, config: &Config) -> Self {
        Self {
            client,
            search_url: config.endpoint("/search/channel"),
            search_source: config.search_source.clone(),
        }
    }

    /// Numeric identifiers are returned as-is without touching the network.
    /// Names go through the catalog's channel search; the ID is taken from the
    /// redirect target first, then from the response body.
    pub async fn resolve(&self, identifier: &str) -> Result<ChannelId> {
        if identifier.is_empty() {
            return Err(Error::InvalidInput);
        }
        if let Some(channel_id) = ChannelId::parse(identifier) {
            tracing::debug!("{} is already a channel ID", identifier);
            return Ok(channel_id);
        }

        tracing::info!("Searching catalog for channel {:?}", identifier);
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("query", identifier)
            .append_pair("source", &self.search_source)
            .finish();

        let response = self
            .client
            .post(&self.search_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;

        if let Some(channel_id) = find_channel_id(response.url().as_str()).and_then(ChannelId::parse)
        {
            tracing::info!("Resolved {:?} to {} from redirect", identifier, channel_id);
            return Ok(channel_id);
        }

        let body = response.text().await?;
        if let Some(channel_id) = find_channel_id(&body).and_then(ChannelId::parse) {
            tracing::info!("Resolved {:?} to {} from page body", identifier, channel_id);
            return Ok(channel_id);
        }

        tracing::warn!("No channel ID found for {:?}", identifier);
        Err(Error::ResolutionFailed(identifier.to_string()))
    }
}
