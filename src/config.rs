// ABOUTME: Configuration module for the banana-slides client
// ABOUTME: Provides configuration settings and environment variable handling

use crate::errors::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SLIDE_DELAY_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_IMAGE_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_ARCHIVE_NAME: &str = "monkey_banana_slideshow.zip";

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub slide_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub image_timeout_ms: u64,
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            slide_delay_ms: DEFAULT_SLIDE_DELAY_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            image_timeout_ms: DEFAULT_IMAGE_TIMEOUT_MS,
            download_dir: PathBuf::from("."),
        }
    }
}

/// Settings for the transfer client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

/// Settings for slide playback
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    pub slide_delay: Duration,
    pub image_timeout: Duration,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            slide_delay: Duration::from_millis(DEFAULT_SLIDE_DELAY_MS),
            image_timeout: Duration::from_millis(DEFAULT_IMAGE_TIMEOUT_MS),
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let server_url =
            env::var("SLIDESHOW_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let slide_delay_ms = env_millis("SLIDE_DELAY_MS", DEFAULT_SLIDE_DELAY_MS);
        let request_timeout_ms = env_millis("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS);
        let image_timeout_ms = env_millis("IMAGE_TIMEOUT_MS", DEFAULT_IMAGE_TIMEOUT_MS);
        let download_dir = env::var("DOWNLOAD_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            server_url,
            slide_delay_ms,
            request_timeout_ms,
            image_timeout_ms,
            download_dir,
        }
    }

    /// Get a client configuration, validating the server URL
    pub fn get_client_config(&self) -> Result<ClientConfig> {
        Ok(ClientConfig {
            base_url: Url::parse(&self.server_url)?,
            timeout: Duration::from_millis(self.request_timeout_ms),
        })
    }

    /// Get a presenter configuration from this config
    pub fn get_presenter_config(&self) -> PresenterConfig {
        PresenterConfig {
            slide_delay: Duration::from_millis(self.slide_delay_ms),
            image_timeout: Duration::from_millis(self.image_timeout_ms),
        }
    }
}

fn env_millis(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}
