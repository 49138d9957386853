// ABOUTME: Slideshow controller for the banana-slides client
// ABOUTME: Connects user triggers, the transfer client and slide playback

use crate::client::TransferClient;
use crate::config::Config;
use crate::errors::{Result, SlideshowError};
use crate::presenter::{Presenter, SharedSession};
use crate::session::PresentationSession;
use crate::sink::{ArchiveSink, DirectorySink};
use crate::slide_image::HttpImageLoader;
use crate::surface::{DisplaySurface, View, NO_DOWNLOAD_DATA_TEXT, PROMPT_TEXT};
use crate::trigger::Trigger;
use log::{info, warn};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const GENERATE_LABEL: &str = "Generate Slideshow";
pub const DOWNLOAD_LABEL: &str = "Download Slides";
pub const PREPARING_LABEL: &str = "Preparing download...";
pub const DOWNLOAD_COMPLETE_LABEL: &str = "Download Complete!";
pub const DOWNLOAD_FAILED_LABEL: &str = "Download Failed!";

/// How long a download outcome stays on the download trigger
const LABEL_FLASH: Duration = Duration::from_millis(3000);

/// Owns the current presentation session and the controls around it.
///
/// A new successful generate replaces the session wholesale; download
/// always reads whatever session is current when it is called.
pub struct SlideshowController {
    client: TransferClient,
    presenter: Presenter,
    surface: Arc<dyn DisplaySurface>,
    sink: Box<dyn ArchiveSink>,
    generate_trigger: Arc<Trigger>,
    download_trigger: Arc<Trigger>,
    session: Mutex<Option<SharedSession>>,
}

impl SlideshowController {
    pub fn new(
        client: TransferClient,
        presenter: Presenter,
        surface: Arc<dyn DisplaySurface>,
        sink: Box<dyn ArchiveSink>,
    ) -> Self {
        Self {
            client,
            presenter,
            surface,
            sink,
            generate_trigger: Trigger::new("generate", GENERATE_LABEL, true),
            // Hidden until a presentation completes
            download_trigger: Trigger::new("download", DOWNLOAD_LABEL, false),
            session: Mutex::new(None),
        }
    }

    /// Build a controller with the network client, image loader and
    /// directory sink described by `config`
    pub fn from_config(config: &Config, surface: Arc<dyn DisplaySurface>) -> Result<Self> {
        let client = TransferClient::new(&config.get_client_config()?)?;
        let presenter_config = config.get_presenter_config();
        let images = HttpImageLoader::new(presenter_config.image_timeout)?;
        let presenter = Presenter::new(Arc::clone(&surface), Arc::new(images), &presenter_config);
        let sink = DirectorySink::new(&config.download_dir);

        Ok(Self::new(client, presenter, surface, Box::new(sink)))
    }

    pub fn generate_trigger(&self) -> &Arc<Trigger> {
        &self.generate_trigger
    }

    pub fn download_trigger(&self) -> &Arc<Trigger> {
        &self.download_trigger
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Stop the current presentation. The generate trigger is usable again
    /// once this returns.
    pub fn cancel(&self) {
        self.presenter.cancel();
    }

    pub fn current_session(&self) -> Option<SharedSession> {
        self.session.lock().clone()
    }

    /// Request a deck for `topic` and start presenting it.
    ///
    /// Returns the new session, or `None` when the server sent no slides.
    /// The generate trigger stays disabled until the presentation
    /// completes or is cancelled; every failure re-enables it immediately.
    pub fn generate(&self, topic: &str) -> Result<Option<SharedSession>> {
        let topic = topic.trim();
        if topic.is_empty() {
            self.surface.show(View::Prompt);
            return Err(SlideshowError::ValidationError(PROMPT_TEXT.to_string()));
        }

        let guard = self.generate_trigger.disable().ok_or(SlideshowError::Busy)?;

        self.surface.show(View::Loading);
        self.download_trigger.hide();
        self.presenter.cancel();
        *self.session.lock() = None;

        let deck = match self.client.generate(topic) {
            Ok(deck) => deck,
            Err(e) => {
                warn!("Generate failed: {}", e);
                self.surface.show(View::Error(e.to_string()));
                return Err(e);
            }
        };

        if deck.is_empty() {
            info!("No slides received for {:?}", topic);
            self.surface.show(View::NoContent);
            return Ok(None);
        }

        let session: SharedSession = Arc::new(Mutex::new(PresentationSession::new(deck)));
        *self.session.lock() = Some(Arc::clone(&session));

        // The hook owns the guard: generate comes back when the hook runs
        // on completion, or when a cancelled playback drops it unrun
        let download_trigger = Arc::clone(&self.download_trigger);
        let on_complete = Box::new(move || {
            download_trigger.show();
            drop(guard);
        });

        if let Err(e) = self.presenter.present(Arc::clone(&session), on_complete) {
            warn!("Failed to start presentation: {}", e);
            self.surface.show(View::Error(e.to_string()));
            return Err(e);
        }

        Ok(Some(session))
    }

    /// Block until the current presentation finishes
    pub fn wait_for_presentation(&self) {
        self.presenter.wait();
    }

    /// Download the archive for the current session's slides and offer it
    /// through the sink. Returns where the archive was saved.
    pub fn download(&self) -> Result<PathBuf> {
        let deck = self
            .session
            .lock()
            .as_ref()
            .map(|session| Arc::clone(session.lock().deck()));

        let Some(deck) = deck.filter(|deck| !deck.is_empty()) else {
            self.surface.alert(NO_DOWNLOAD_DATA_TEXT);
            return Err(SlideshowError::ValidationError(
                NO_DOWNLOAD_DATA_TEXT.to_string(),
            ));
        };

        let _guard = self.download_trigger.disable().ok_or(SlideshowError::Busy)?;
        self.download_trigger.set_label(PREPARING_LABEL);

        // The archive bytes are dropped as soon as the sink has them
        let result = self
            .client
            .download(&deck)
            .and_then(|archive| self.sink.offer(&archive));

        match result {
            Ok(path) => {
                info!("Download saved to {:?}", path);
                self.download_trigger
                    .flash_label(DOWNLOAD_COMPLETE_LABEL, LABEL_FLASH);
                Ok(path)
            }
            Err(e) => {
                warn!("Download failed: {}", e);
                self.surface
                    .alert(&format!("Error during download: {}", e));
                self.download_trigger
                    .flash_label(DOWNLOAD_FAILED_LABEL, LABEL_FLASH);
                Err(e)
            }
        }
    }
}
