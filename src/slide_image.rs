// ABOUTME: Image resolution for slides in the banana-slides client
// ABOUTME: Loads data URIs and remote images, substituting a fallback on failure

use crate::errors::{Result, SlideshowError};
use crate::slide::Slide;
use base64::Engine;
use log::{debug, warn};
use reqwest::blocking::Client;
use std::time::Duration;

/// Shown in place of an image that could not be loaded
pub const FALLBACK_IMAGE_URL: &str =
    "https://via.placeholder.com/600x400.png?text=Image+Load+Error";

/// Alt text paired with the fallback image
pub const FALLBACK_IMAGE_ALT: &str = "Image failed to load or is a placeholder.";

/// An image that loaded successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
}

/// What the surface should show for a slide's image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub src: String,
    pub alt: String,
    pub dimensions: Option<(u32, u32)>,
    pub fallback: bool,
    /// Still being loaded; replaced once the image resolves
    pub pending: bool,
}

impl ImageView {
    /// Placeholder shown with the caption while the slide's image loads
    pub fn pending(slide: &Slide) -> Self {
        Self {
            src: slide.image_url().to_string(),
            alt: slide.image_label().to_string(),
            dimensions: None,
            fallback: false,
            pending: true,
        }
    }

    fn fallback() -> Self {
        Self {
            src: FALLBACK_IMAGE_URL.to_string(),
            alt: FALLBACK_IMAGE_ALT.to_string(),
            dimensions: None,
            fallback: true,
            pending: false,
        }
    }
}

/// Source of image bytes for slide rendering
pub trait ImageLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<LoadedImage>;
}

/// Loads `data:` URIs inline and `http(s)` URLs over the network
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SlideshowError::transport)?;
        Ok(Self { client })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().map_err(SlideshowError::transport)?;
        if !response.status().is_success() {
            return Err(SlideshowError::ImageError(format!(
                "HTTP error {} for {}",
                response.status(),
                url
            )));
        }
        let bytes = response.bytes().map_err(SlideshowError::transport)?;
        Ok(bytes.to_vec())
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, url: &str) -> Result<LoadedImage> {
        let bytes = if url.starts_with("data:") {
            decode_data_uri(url)?
        } else if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch(url)?
        } else {
            return Err(SlideshowError::ImageError(format!(
                "Unsupported image reference: {}",
                url
            )));
        };

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| SlideshowError::ImageError(format!("Failed to decode image: {}", e)))?;
        Ok(LoadedImage {
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}

/// Decode the payload of a base64 `data:` URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| SlideshowError::ImageError("Malformed data URI".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(SlideshowError::ImageError(
            "Only base64 data URIs are supported".to_string(),
        ));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| SlideshowError::ImageError(format!("Invalid base64 image data: {}", e)))
}

/// Work out the image view for a slide. Never fails: a broken image
/// becomes the fallback image, and the caption is unaffected.
pub fn resolve(loader: &dyn ImageLoader, slide: &Slide) -> ImageView {
    match loader.load(slide.image_url()) {
        Ok(loaded) => {
            debug!("Loaded image {}x{}", loaded.width, loaded.height);
            ImageView {
                src: slide.image_url().to_string(),
                alt: slide.image_label().to_string(),
                dimensions: Some((loaded.width, loaded.height)),
                fallback: false,
                pending: false,
            }
        }
        Err(e) => {
            warn!("Using fallback image: {}", e);
            ImageView::fallback()
        }
    }
}
