use crate::{app::config::Config, error::Result};
use reqwest::Client as ReqwestClient;

/// The one client every stage shares: configured user agent, per-request timeout.
pub fn build_client(config: &Config) -> Result<ReqwestClient> {
    let client = ReqwestClient::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}
