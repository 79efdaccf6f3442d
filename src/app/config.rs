use crate::error::Error;
use eyre::{Context, eyre};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::io::AsyncWriteExt;
use url::Url;

pub const BASE_CONFIG_PATH: &str = "config/app_config.toml";
const ENV_PREFIX: &str = "TWE_DLP_";

/// Settings shared by the resolver, scraper and downloader.
///
/// Every field has a default, so a partial TOML file (or none at all) is fine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub emote_sizes: Vec<String>,
    pub theme: String,
    pub search_source: String,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://twitchemotes.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) twe-dlp/1.0".to_string(),
            request_timeout_secs: 30,
            emote_sizes: vec!["1.0".to_string(), "2.0".to_string(), "3.0".to_string()],
            theme: "light".to_string(),
            search_source: "twe-dlp".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The catalog root, parsed. Relative image sources are resolved against it.
    pub fn parsed_base_url(&self) -> Result<Url, Error> {
        Url::parse(&self.base_url).map_err(|source| Error::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    /// Builds `<base_url><path>` the same way for every endpoint, ignoring a
    /// trailing slash on the configured base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn get_config_path() -> Result<PathBuf, eyre::Report> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| eyre!("Could not find a config directory"))?
        .join(env!("CARGO_PKG_NAME"));

    Ok(config_dir.join("app_config.toml"))
}

/// Loads the configuration, layering the base file, the user file and
/// `TWE_DLP_*` environment variables over the defaults.
///
/// With no explicit path the user file lives in the platform config
/// directory and is created from the merged result on first run.
pub async fn load(path_override: Option<&Path>) -> Result<Config, eyre::Report> {
    let user_config_path = match path_override {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };
    tracing::info!("Loading base config from {:?}", BASE_CONFIG_PATH);
    tracing::info!("Loading user config from {:?}", user_config_path);

    let config = load_from(BASE_CONFIG_PATH, &user_config_path)?;

    if path_override.is_none() && !user_config_path.exists() {
        if let Err(e) = save(&config, &user_config_path).await {
            tracing::warn!("Failed to save initial config: {}", e);
        }
    }

    Ok(config)
}

pub fn load_from(
    base_config_path: impl AsRef<Path>,
    user_config_path: impl AsRef<Path>,
) -> Result<Config, eyre::Report> {
    Figment::new()
        .merge(Toml::file(base_config_path.as_ref()))
        .merge(Toml::file(user_config_path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .context("Could not load config")
}

pub async fn save(config: &Config, path: &Path) -> Result<(), eyre::Report> {
    tracing::info!("Saving config to {:?}", path);

    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .context("Failed to create config file")?;

    file.write_all(text.as_bytes())
        .await
        .context("Failed to write config to file")?;
    file.flush().await.context("Failed to flush config file")?;

    Ok(())
}
