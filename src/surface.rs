// ABOUTME: Display surfaces for the banana-slides client
// ABOUTME: Defines the views a presentation renders and where they are drawn

use crate::slide_image::ImageView;
use log::info;
use parking_lot::Mutex;
use std::io::Write;

pub const PROMPT_TEXT: &str = "Please enter a topic.";
pub const LOADING_TEXT: &str = "Loading presentation...";
pub const NO_CONTENT_TEXT: &str = "No content received, or content is empty.";
pub const COMPLETE_HEADING: &str = "Presentation Preview Complete!";
pub const COMPLETE_TEXT: &str = "You can now download the presentation content.";
pub const NO_DOWNLOAD_DATA_TEXT: &str = "No slide data available to download.";

/// A single slide as it appears on the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideView {
    pub index: usize,
    pub total: usize,
    pub image: ImageView,
    pub caption: String,
}

/// Everything that can occupy the display surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Prompt,
    Loading,
    Error(String),
    NoContent,
    Slide(SlideView),
    Complete,
}

impl View {
    /// Plain-text rendering of the view
    pub fn text(&self) -> String {
        match self {
            View::Prompt => PROMPT_TEXT.to_string(),
            View::Loading => LOADING_TEXT.to_string(),
            View::Error(message) => format!("Error: {}", message),
            View::NoContent => NO_CONTENT_TEXT.to_string(),
            View::Slide(slide) => {
                let image_line = match slide.image.dimensions {
                    None if slide.image.pending => {
                        format!("[image loading: {}]", slide.image.alt)
                    }
                    Some((w, h)) => format!("[image {}x{}: {}]", w, h, slide.image.alt),
                    None => format!("[image: {}]", slide.image.alt),
                };
                format!(
                    "Slide {}/{}\n{}\n{}",
                    slide.index + 1,
                    slide.total,
                    image_line,
                    slide.caption
                )
            }
            View::Complete => format!("{}\n{}", COMPLETE_HEADING, COMPLETE_TEXT),
        }
    }
}

/// The single region the controller draws into. Each `show` replaces
/// whatever was displayed before.
pub trait DisplaySurface: Send + Sync {
    fn show(&self, view: View);

    /// Out-of-band notice that does not replace the current view
    fn alert(&self, message: &str);
}

/// Writes views to standard output
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySurface for TerminalSurface {
    fn show(&self, view: View) {
        let mut out = std::io::stdout().lock();
        // Separator stands in for clearing the region
        let _ = writeln!(out, "\n----------------------------------------");
        let _ = writeln!(out, "{}", view.text());
        let _ = out.flush();
    }

    fn alert(&self, message: &str) {
        info!("Alert: {}", message);
        eprintln!("! {}", message);
    }
}

/// Keeps every view and alert in order
#[derive(Debug, Default)]
pub struct MemorySurface {
    views: Mutex<Vec<View>>,
    alerts: Mutex<Vec<String>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<View> {
        self.views.lock().clone()
    }

    pub fn current(&self) -> Option<View> {
        self.views.lock().last().cloned()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl DisplaySurface for MemorySurface {
    fn show(&self, view: View) {
        self.views.lock().push(view);
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}
