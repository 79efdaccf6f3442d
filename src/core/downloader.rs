use crate::{
    app::config::Config,
    error::{Error, Result},
    events::download_event::{DownloadEvent, EventSink, report},
    models::emote::{EmoteMap, EmoteRecord},
    utils::{media_type::file_extension_for, text_processing::make_safe_name},
};
use reqwest::{Client as ReqwestClient, Response, StatusCode, header::CONTENT_TYPE};
use std::path::Path;
use tokio::{fs::File, io::AsyncWriteExt};

/// Fetches every configured size of every emote, one request at a time.
#[derive(Clone)]
pub struct EmoteDownloader {
    client: ReqwestClient,
    sizes: Vec<String>,
    theme: String,
}

impl EmoteDownloader {
    pub fn new(client: ReqwestClient, config: &Config) -> Self {
        Self {
            client,
            sizes: config.emote_sizes.clone(),
            theme: config.theme.clone(),
        }
    }

    /// Per-emote and per-size failures are reported to `sink` and never stop
    /// the remaining downloads.
    pub async fn download_all(
        &self,
        emotes: &EmoteMap,
        output_root: &Path,
        sink: &mut dyn EventSink,
    ) {
        for (emote_identifier, record) in emotes {
            report(
                sink,
                DownloadEvent::Info(format!(
                    "Downloading sizes for emote: {} ({})",
                    record.emote_code, emote_identifier
                )),
            );
            tracing::debug!(
                "Emote {} has format {}, base {}",
                emote_identifier,
                record.format_type,
                record.base_url
            );
            self.download_emote(record, output_root, sink).await;
        }
    }

    pub async fn download_emote(
        &self,
        record: &EmoteRecord,
        output_root: &Path,
        sink: &mut dyn EventSink,
    ) {
        let safe_code = make_safe_name(&record.emote_code);
        let emote_folder = output_root.join(&safe_code);
        if let Err(e) = tokio::fs::create_dir_all(&emote_folder).await {
            report(
                sink,
                DownloadEvent::Failed(format!(
                    "cannot create folder {}: {}",
                    emote_folder.display(),
                    e
                )),
            );
            return;
        }

        for size in &self.sizes {
            let event = self
                .download_size(record, &safe_code, &emote_folder, size)
                .await;
            report(sink, event);
        }
    }

    async fn download_size(
        &self,
        record: &EmoteRecord,
        safe_code: &str,
        emote_folder: &Path,
        size: &str,
    ) -> DownloadEvent {
        let image_url = record.asset_url(&self.theme, size);

        let request = match self.client.get(&image_url).build() {
            Ok(request) => request,
            Err(e) => return DownloadEvent::Skipped(format!("{} ({})", image_url, e)),
        };
        let mut response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => return DownloadEvent::Skipped(format!("{} ({})", image_url, e)),
        };
        if response.status() != StatusCode::OK {
            return DownloadEvent::Skipped(format!(
                "{} (status {})",
                image_url,
                response.status()
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let file_name = format!("{}_{}.{}", safe_code, size, file_extension_for(content_type));
        let output_path = emote_folder.join(&file_name);

        let mut file = match File::create(&output_path).await {
            Ok(file) => file,
            Err(e) => {
                return DownloadEvent::Skipped(format!(
                    "{} (cannot create file: {})",
                    output_path.display(),
                    e
                ));
            }
        };

        match copy_body(&mut response, &mut file, &output_path).await {
            Ok(written) => {
                tracing::debug!("Wrote {} bytes to {}", written, output_path.display());
                DownloadEvent::Saved(file_name)
            }
            Err(e) => DownloadEvent::Skipped(format!(
                "{} (copy error: {})",
                output_path.display(),
                e
            )),
        }
    }
}

/// Streams the response body into `file` chunk by chunk.
async fn copy_body(response: &mut Response, file: &mut File, path: &Path) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(path, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| Error::io(path, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_client;
    use tempfile::tempdir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    fn downloader() -> EmoteDownloader {
        let config = Config::default();
        EmoteDownloader::new(build_client(&config).unwrap(), &config)
    }

    fn record(server: &MockServer, id: &str, code: &str) -> EmoteRecord {
        EmoteRecord {
            base_url: format!("{}/emoticons/v2/{}/static", server.uri(), id),
            format_type: "static".to_string(),
            emote_code: code.to_string(),
        }
    }

    async fn serve(server: &MockServer, id: &str, size: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/emoticons/v2/{}/static/light/{}", id, size)))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn image(content_type: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", content_type)
            .set_body_bytes(PNG_BYTES)
    }

    #[tokio::test]
    async fn writes_every_size_with_detected_extension() {
        let server = MockServer::start().await;
        for size in ["1.0", "2.0", "3.0"] {
            Mock::given(method("GET"))
                .and(path(format!("/emoticons/v2/25/static/light/{}", size)))
                .and(header("user-agent", Config::default().user_agent.as_str()))
                .respond_with(image("image/png"))
                .expect(1)
                .mount(&server)
                .await;
        }
        let dir = tempdir().unwrap();
        let mut events: Vec<DownloadEvent> = Vec::new();

        downloader()
            .download_emote(&record(&server, "25", "Kappa"), dir.path(), &mut events)
            .await;

        for size in ["1.0", "2.0", "3.0"] {
            let file = dir.path().join("Kappa").join(format!("Kappa_{}.png", size));
            assert_eq!(std::fs::read(&file).unwrap(), PNG_BYTES);
        }
        assert_eq!(
            events,
            vec![
                DownloadEvent::Saved("Kappa_1.0.png".into()),
                DownloadEvent::Saved("Kappa_2.0.png".into()),
                DownloadEvent::Saved("Kappa_3.0.png".into()),
            ]
        );
    }

    #[tokio::test]
    async fn uncreatable_file_skips_only_that_size() {
        let server = MockServer::start().await;
        for size in ["1.0", "2.0", "3.0"] {
            serve(&server, "25", size, image("image/png")).await;
        }
        let dir = tempdir().unwrap();
        // A directory already occupies the first file's path.
        std::fs::create_dir_all(dir.path().join("Kappa").join("Kappa_1.0.png")).unwrap();
        let mut events: Vec<DownloadEvent> = Vec::new();

        downloader()
            .download_emote(&record(&server, "25", "Kappa"), dir.path(), &mut events)
            .await;

        assert_eq!(events.len(), 3);
        match &events[0] {
            DownloadEvent::Skipped(line) => {
                assert!(line.contains("Kappa_1.0.png"));
                assert!(line.contains("(cannot create file: "));
            }
            other => panic!("expected a skip, got {:?}", other),
        }
        assert_eq!(events[1], DownloadEvent::Saved("Kappa_2.0.png".into()));
        assert_eq!(events[2], DownloadEvent::Saved("Kappa_3.0.png".into()));
        assert!(dir.path().join("Kappa").join("Kappa_3.0.png").is_file());
    }

    #[tokio::test]
    async fn failing_size_does_not_stop_the_rest() {
        let server = MockServer::start().await;
        serve(&server, "1", "1.0", image("image/gif")).await;
        serve(&server, "1", "2.0", ResponseTemplate::new(404)).await;
        serve(&server, "1", "3.0", image("image/gif")).await;
        for size in ["1.0", "2.0", "3.0"] {
            serve(&server, "2", size, image("image/jpeg")).await;
        }

        let mut emotes = EmoteMap::new();
        emotes.insert("1".to_string(), record(&server, "1", "PepeLaugh"));
        emotes.insert("2".to_string(), record(&server, "2", "monkaS"));
        let dir = tempdir().unwrap();
        let mut events: Vec<DownloadEvent> = Vec::new();

        downloader().download_all(&emotes, dir.path(), &mut events).await;

        let pepe = dir.path().join("PepeLaugh");
        assert!(pepe.join("PepeLaugh_1.0.gif").is_file());
        assert!(!pepe.join("PepeLaugh_2.0.gif").exists());
        assert!(pepe.join("PepeLaugh_3.0.gif").is_file());
        for size in ["1.0", "2.0", "3.0"] {
            assert!(dir.path().join("monkaS").join(format!("monkaS_{}.jpg", size)).is_file());
        }

        let skipped: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                DownloadEvent::Skipped(line) => Some(line.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].contains("/emoticons/v2/1/static/light/2.0"));
        assert!(skipped[0].contains("status 404 Not Found"));
        let saved = events
            .iter()
            .filter(|event| matches!(event, DownloadEvent::Saved(_)))
            .count();
        assert_eq!(saved, 5);
    }

    #[tokio::test]
    async fn unknown_content_type_gets_generic_extension() {
        let server = MockServer::start().await;
        for size in ["1.0", "2.0", "3.0"] {
            serve(&server, "9", size, image("application/octet-stream")).await;
        }
        let dir = tempdir().unwrap();
        let mut events: Vec<DownloadEvent> = Vec::new();

        downloader()
            .download_emote(&record(&server, "9", "  <3 love  "), dir.path(), &mut events)
            .await;

        assert!(dir.path().join("_3_love").join("_3_love_1.0.img").is_file());
        assert!(dir.path().join("_3_love").join("_3_love_3.0.img").is_file());
    }

    #[tokio::test]
    async fn folder_failure_skips_only_that_emote() {
        let server = MockServer::start().await;
        for size in ["1.0", "2.0", "3.0"] {
            serve(&server, "5", size, image("image/png")).await;
        }
        let dir = tempdir().unwrap();
        // A plain file where the emote folder should go.
        std::fs::write(dir.path().join("Blocked"), b"not a folder").unwrap();

        let mut emotes = EmoteMap::new();
        emotes.insert("4".to_string(), record(&server, "4", "Blocked"));
        emotes.insert("5".to_string(), record(&server, "5", "Open"));
        let mut events: Vec<DownloadEvent> = Vec::new();

        downloader().download_all(&emotes, dir.path(), &mut events).await;

        assert!(events.iter().any(|event| matches!(
            event,
            DownloadEvent::Failed(line) if line.starts_with("cannot create folder")
        )));
        assert!(dir.path().join("Open").join("Open_2.0.png").is_file());
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unreachable_host_is_skipped() {
        let dir = tempdir().unwrap();
        let record = EmoteRecord {
            base_url: "http://127.0.0.1:1/emoticons/v2/1/static".to_string(),
            format_type: "static".to_string(),
            emote_code: "Gone".to_string(),
        };
        let mut events: Vec<DownloadEvent> = Vec::new();

        downloader()
            .download_emote(&record, dir.path(), &mut events)
            .await;

        assert_eq!(events.len(), 3);
        assert!(
            events
                .iter()
                .all(|event| matches!(event, DownloadEvent::Skipped(_)))
        );
    }
}
