// ABOUTME: Transfer client for the banana-slides server endpoints
// ABOUTME: Issues generate and download requests and normalizes their failures

use crate::config::{ClientConfig, DEFAULT_ARCHIVE_NAME};
use crate::errors::{Result, SlideshowError};
use crate::sink::Archive;
use crate::slide::{Slide, SlideDeck};
use crate::surface::{NO_DOWNLOAD_DATA_TEXT, PROMPT_TEXT};
use log::{debug, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    topic: &'a str,
}

#[derive(Serialize)]
struct DownloadRequest<'a> {
    slides: &'a [Slide],
}

/// Talks to the `/generate` and `/download` endpoints
pub struct TransferClient {
    http: Client,
    base_url: Url,
}

impl TransferClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SlideshowError::transport)?;

        // Keep the base path when joining endpoint names onto it
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        Ok(self.base_url.join(name)?)
    }

    /// Request a deck for `topic`. The topic is trimmed; a blank topic is
    /// rejected without contacting the server. An empty deck is a valid
    /// result, not an error. When an error body is not JSON, the message is
    /// the canonical reason phrase for the status code (`Internal Server
    /// Error` for 500), not the phrase the server put on its status line.
    pub fn generate(&self, topic: &str) -> Result<SlideDeck> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SlideshowError::ValidationError(PROMPT_TEXT.to_string()));
        }

        let url = self.endpoint("generate")?;
        info!("Requesting slides for topic {:?} from {}", topic, url);

        let response = self
            .http
            .post(url)
            .json(&GenerateRequest { topic })
            .send()
            .map_err(SlideshowError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = generate_error_message(status, response);
            warn!("Generate failed with {}: {}", status, message);
            return Err(SlideshowError::ApplicationError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().map_err(SlideshowError::transport)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            info!("Server returned an empty body");
            return Ok(SlideDeck::default());
        }

        // `null` is treated the same as an empty array
        let deck: Option<SlideDeck> = serde_json::from_slice(&body)
            .map_err(|e| SlideshowError::DecodeError(e.to_string()))?;
        let deck = deck.unwrap_or_default();

        info!("Received {} slides", deck.len());
        Ok(deck)
    }

    /// Request the packaged archive for `deck`. A deck with no slides is
    /// rejected without contacting the server.
    pub fn download(&self, deck: &SlideDeck) -> Result<Archive> {
        if deck.is_empty() {
            return Err(SlideshowError::ValidationError(
                NO_DOWNLOAD_DATA_TEXT.to_string(),
            ));
        }

        let url = self.endpoint("download")?;
        info!("Requesting archive of {} slides from {}", deck.len(), url);

        let response = self
            .http
            .post(url)
            .json(&DownloadRequest {
                slides: deck.as_slice(),
            })
            .send()
            .map_err(SlideshowError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = download_error_message(status, response);
            warn!("Download failed with {}: {}", status, message);
            return Err(SlideshowError::ApplicationError {
                status: status.as_u16(),
                message,
            });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string());

        let bytes = response.bytes().map_err(SlideshowError::transport)?;
        debug!("Archive {} is {} bytes", filename, bytes.len());

        Ok(Archive::new(filename, bytes.to_vec()))
    }
}

/// Pull the `error` field out of a JSON error body
fn json_error_field(body: &[u8]) -> std::result::Result<Option<String>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    Ok(value
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|e| !e.is_empty())
        .map(str::to_string))
}

/// Message for a failed generate: the body's `error` field, else
/// `Server error: <code>`. A body that is not JSON reports the standard
/// reason phrase for the status code; the blocking client does not expose
/// the phrase the server actually sent.
fn generate_error_message(status: StatusCode, response: Response) -> String {
    let fallback = format!("Server error: {}", status.as_u16());
    let body = response.bytes().map(|b| b.to_vec()).unwrap_or_default();

    match json_error_field(&body) {
        Ok(message) => message.unwrap_or(fallback),
        Err(_) => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or(fallback),
    }
}

fn download_error_message(status: StatusCode, response: Response) -> String {
    let fallback = format!("Download failed: {}", status.as_u16());
    let body = response.bytes().map(|b| b.to_vec()).unwrap_or_default();

    match json_error_field(&body) {
        Ok(message) => message.unwrap_or(fallback),
        Err(_) => {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            if text.is_empty() {
                fallback
            } else {
                text
            }
        }
    }
}

/// Extract the file name from a `Content-Disposition` header value.
/// Names that would leave or stand for the download directory are ignored.
fn attachment_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| {
            !name.is_empty()
                && !name.chars().all(|c| c == '.')
                && !name.contains('/')
                && !name.contains('\\')
        })
}
