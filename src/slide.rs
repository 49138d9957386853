// ABOUTME: Slide and deck types exchanged with the slideshow server
// ABOUTME: Slides are read-only once received; a deck is built from one response

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Label used for an image when the slide carries no prompt
pub const DEFAULT_IMAGE_LABEL: &str = "Slide image";

/// One unit of presentation content: a caption and an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    sentence: String,
    #[serde(default)]
    image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_prompt: Option<String>,
}

impl Slide {
    pub fn new(
        sentence: impl Into<String>,
        image_url: impl Into<String>,
        image_prompt: Option<String>,
    ) -> Self {
        Self {
            sentence: sentence.into(),
            image_url: image_url.into(),
            image_prompt,
        }
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn image_prompt(&self) -> Option<&str> {
        self.image_prompt.as_deref()
    }

    /// Text describing the image, falling back to a generic label
    pub fn image_label(&self) -> &str {
        match self.image_prompt.as_deref() {
            Some(prompt) if !prompt.is_empty() => prompt,
            _ => DEFAULT_IMAGE_LABEL,
        }
    }
}

/// Ordered slides from a single generate response. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slide> {
        self.slides.iter()
    }

    pub fn as_slice(&self) -> &[Slide] {
        &self.slides
    }
}

impl From<Vec<Slide>> for SlideDeck {
    fn from(slides: Vec<Slide>) -> Self {
        Self::new(slides)
    }
}

impl Index<usize> for SlideDeck {
    type Output = Slide;

    fn index(&self, index: usize) -> &Slide {
        &self.slides[index]
    }
}

impl<'a> IntoIterator for &'a SlideDeck {
    type Item = &'a Slide;
    type IntoIter = std::slice::Iter<'a, Slide>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}
