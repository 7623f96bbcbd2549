//! Media attachments fetched from URLs.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// Mimetype used when neither the server nor the URL tells us better.
pub const FALLBACK_MIMETYPE: &str = "application/octet-stream";

/// Binary content attached to an outbound message.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    /// MIME type, e.g. `image/png`.
    pub mimetype: String,
    /// Raw bytes.
    pub data: Vec<u8>,
    /// Original file name, if known.
    pub filename: Option<String>,
}

impl MediaAttachment {
    /// Creates an attachment.
    pub fn new(mimetype: impl Into<String>, data: Vec<u8>, filename: Option<String>) -> Self {
        Self {
            mimetype: mimetype.into(),
            data,
            filename,
        }
    }

    /// Size in bytes.
    pub fn filesize(&self) -> usize {
        self.data.len()
    }

    /// Standard base64 encoding of the content.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

impl fmt::Debug for MediaAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAttachment")
            .field("mimetype", &self.mimetype)
            .field("filesize", &self.data.len())
            .field("filename", &self.filename)
            .finish()
    }
}

/// Downloads media referenced by URL.
///
/// Any mimetype is accepted. Each request is bounded by the configured
/// timeout.
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    http: reqwest::Client,
    timeout: Duration,
}

impl Default for MediaFetcher {
    fn default() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }
}

impl MediaFetcher {
    /// Creates a fetcher with the default 30 second timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Fetches `raw_url` into an attachment.
    pub async fn fetch(&self, raw_url: &str) -> Result<MediaAttachment> {
        let url = parse_media_url(raw_url)?;
        debug!(url = %url, "Fetching media");

        let response = self
            .http
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::MediaFetch(format!(
                "{} returned {}",
                url, status
            )));
        }

        let header_mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(essence)
            .filter(|mime| mime != FALLBACK_MIMETYPE);

        let data = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e))?
            .to_vec();

        let mimetype = header_mime
            .or_else(|| mime_from_extension(url.path()))
            .unwrap_or_else(|| FALLBACK_MIMETYPE.to_string());

        let attachment = MediaAttachment::new(mimetype, data, filename_from_url(&url));
        debug!(
            mimetype = %attachment.mimetype,
            filesize = attachment.filesize(),
            "Media fetched"
        );
        Ok(attachment)
    }

    fn map_request_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout {
                operation: "media fetch",
                seconds: self.timeout.as_secs(),
            }
        } else {
            ClientError::MediaFetch(e.to_string())
        }
    }
}

fn parse_media_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ClientError::InvalidMediaUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidMediaUrl(format!(
            "unsupported scheme: {}",
            other
        ))),
    }
}

/// `image/png; charset=binary` -> `image/png`
fn essence(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    if essence.is_empty() {
        None
    } else {
        Some(essence.to_ascii_lowercase())
    }
}

fn filename_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

fn mime_from_extension(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;

    async fn spawn_media_server() -> String {
        let app = Router::new()
            .route(
                "/qr.png",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "image/png")],
                        vec![0x89u8, b'P', b'N', b'G'],
                    )
                }),
            )
            .route(
                "/raw/code.jpg",
                get(|| async { axum::body::Body::from(vec![0xFFu8, 0xD8]) }),
            )
            .route("/blob.jpg", get(|| async { vec![0xFFu8, 0xD8] }))
            .route("/blob", get(|| async { vec![0u8; 3] }))
            .route(
                "/missing.png",
                get(|| async { StatusCode::NOT_FOUND.into_response() }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_uses_content_type() {
        let base = spawn_media_server().await;
        let media = MediaFetcher::new()
            .fetch(&format!("{}/qr.png", base))
            .await
            .unwrap();

        assert_eq!(media.mimetype, "image/png");
        assert_eq!(media.data, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(media.filename.as_deref(), Some("qr.png"));
        assert_eq!(media.filesize(), 4);
    }

    #[tokio::test]
    async fn test_fetch_guesses_from_extension() {
        let base = spawn_media_server().await;
        let media = MediaFetcher::new()
            .fetch(&format!("{}/raw/code.jpg", base))
            .await
            .unwrap();

        assert_eq!(media.mimetype, "image/jpeg");
        assert_eq!(media.filename.as_deref(), Some("code.jpg"));
    }

    #[tokio::test]
    async fn test_fetch_generic_content_type() {
        let base = spawn_media_server().await;
        let fetcher = MediaFetcher::new();

        // Vec<u8> bodies are served as application/octet-stream
        let media = fetcher.fetch(&format!("{}/blob.jpg", base)).await.unwrap();
        assert_eq!(media.mimetype, "image/jpeg");

        let media = fetcher.fetch(&format!("{}/blob", base)).await.unwrap();
        assert_eq!(media.mimetype, FALLBACK_MIMETYPE);
        assert_eq!(media.filename.as_deref(), Some("blob"));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let base = spawn_media_server().await;
        let result = MediaFetcher::new()
            .fetch(&format!("{}/missing.png", base))
            .await;
        assert!(matches!(result, Err(ClientError::MediaFetch(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_urls() {
        let fetcher = MediaFetcher::new();
        assert!(matches!(
            fetcher.fetch("not a url").await,
            Err(ClientError::InvalidMediaUrl(_))
        ));
        assert!(matches!(
            fetcher.fetch("file:///etc/passwd").await,
            Err(ClientError::InvalidMediaUrl(_))
        ));
    }

    #[test]
    fn test_essence() {
        assert_eq!(essence("image/PNG; charset=binary"), Some("image/png".into()));
        assert_eq!(essence(" ;x"), None);
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("/a/b.JPEG").as_deref(), Some("image/jpeg"));
        assert_eq!(mime_from_extension("/a/b.pdf").as_deref(), Some("application/pdf"));
        assert_eq!(mime_from_extension("/media/clip.webm").as_deref(), Some("video/webm"));
        assert_eq!(mime_from_extension("/a/b.notarealext"), None);
        assert_eq!(mime_from_extension("/a/b"), None);
    }

    #[test]
    fn test_attachment_debug_and_base64() {
        let media = MediaAttachment::new("image/png", b"hi".to_vec(), Some("a.png".into()));
        assert_eq!(media.to_base64(), "aGk=");
        let debug = format!("{:?}", media);
        assert!(debug.contains("filesize: 2"));
        assert!(!debug.contains("data"));
    }
}
