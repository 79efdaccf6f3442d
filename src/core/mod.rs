pub mod downloader;
pub mod http;
pub mod pipeline;
pub mod resolver;
pub mod scraper;
