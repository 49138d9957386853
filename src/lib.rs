// ABOUTME: Library module for the banana-slides client.
// ABOUTME: Contains slide playback, the server transfer client and archive handling.

// Reexport modules
pub mod archive;
pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod presenter;
pub mod server;
pub mod session;
pub mod sink;
pub mod slide;
pub mod slide_image;
pub mod surface;
pub mod trigger;
pub mod utils;

// Reexport common types and functions
pub use client::TransferClient;
pub use config::{ClientConfig, Config, PresenterConfig};
pub use controller::SlideshowController;
pub use errors::{Result, SlideshowError};
pub use presenter::{Presenter, SharedSession};
pub use server::{ServerConfig, StubServer};
pub use session::{PresentationSession, PresentationState, Transition};
pub use sink::{Archive, ArchiveSink, DirectorySink};
pub use slide::{Slide, SlideDeck};
pub use slide_image::{HttpImageLoader, ImageLoader};
pub use surface::{DisplaySurface, MemorySurface, TerminalSurface, View};
pub use trigger::Trigger;
