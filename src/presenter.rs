// ABOUTME: Timed slide playback for the banana-slides client
// ABOUTME: Renders one slide at a time and advances on a cancellable timer

use crate::config::PresenterConfig;
use crate::errors::Result;
use crate::session::{PresentationSession, Transition};
use crate::slide_image::{self, ImageLoader, ImageView};
use crate::surface::{DisplaySurface, SlideView, View};
use log::{debug, info};
use parking_lot::{Condvar, Mutex};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A session shared between the presenter and whoever owns it
pub type SharedSession = Arc<Mutex<PresentationSession>>;

/// Runs once when a session reaches its terminal state. A cancelled
/// session drops it without running it, so anything it owns is released.
pub type CompletionHook = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Finished {
    done: Mutex<bool>,
    signal: Condvar,
}

impl Finished {
    fn mark(&self) {
        *self.done.lock() = true;
        self.signal.notify_all();
    }

    fn is_done(&self) -> bool {
        *self.done.lock()
    }

    fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.signal.wait(&mut done);
        }
    }
}

// Marks playback finished however the thread exits
struct FinishOnDrop(Arc<Finished>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.mark();
    }
}

struct Playback {
    session_id: Uuid,
    cancel: Sender<()>,
    handle: JoinHandle<()>,
    finished: Arc<Finished>,
}

/// Drives presentation sessions against a display surface. At most one
/// session plays at a time; presenting a new one stops the previous one.
pub struct Presenter {
    surface: Arc<dyn DisplaySurface>,
    images: Arc<dyn ImageLoader>,
    slide_delay: Duration,
    playback: Mutex<Option<Playback>>,
}

impl Presenter {
    pub fn new(
        surface: Arc<dyn DisplaySurface>,
        images: Arc<dyn ImageLoader>,
        config: &PresenterConfig,
    ) -> Self {
        Self {
            surface,
            images,
            slide_delay: config.slide_delay,
            playback: Mutex::new(None),
        }
    }

    pub fn slide_delay(&self) -> Duration {
        self.slide_delay
    }

    /// Start playing `session` from its first slide. Any playback already
    /// running is cancelled and joined before this one starts.
    pub fn present(&self, session: SharedSession, on_complete: CompletionHook) -> Result<()> {
        let mut playback = self.playback.lock();
        if let Some(previous) = playback.take() {
            stop(previous);
        }

        let session_id = session.lock().id();
        let (cancel, cancelled) = mpsc::channel();
        let finished = Arc::new(Finished::default());

        let worker = PlaybackWorker {
            session,
            surface: Arc::clone(&self.surface),
            images: Arc::clone(&self.images),
            slide_delay: self.slide_delay,
            cancelled,
            finished: FinishOnDrop(Arc::clone(&finished)),
        };

        info!("Presenting session {}", session_id);
        let handle = thread::Builder::new()
            .name(format!("slides-{}", session_id))
            .spawn(move || worker.run(on_complete))?;

        *playback = Some(Playback {
            session_id,
            cancel,
            handle,
            finished,
        });
        Ok(())
    }

    /// Stop the current playback, if any. No further views are rendered
    /// for it once this returns.
    pub fn cancel(&self) {
        let previous = self.playback.lock().take();
        if let Some(previous) = previous {
            stop(previous);
        }
    }

    /// Block until the current playback reaches its terminal state or is
    /// cancelled.
    pub fn wait(&self) {
        let finished = self
            .playback
            .lock()
            .as_ref()
            .map(|playback| Arc::clone(&playback.finished));
        if let Some(finished) = finished {
            finished.wait();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .lock()
            .as_ref()
            .is_some_and(|playback| !playback.finished.is_done())
    }

    /// Id of the session most recently handed to `present`
    pub fn current_session(&self) -> Option<Uuid> {
        self.playback.lock().as_ref().map(|playback| playback.session_id)
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn stop(playback: Playback) {
    debug!("Cancelling session {}", playback.session_id);
    // A closed channel also reads as cancellation
    let _ = playback.cancel.send(());

    // Playback can be stopped from its own completion hook
    if playback.handle.thread().id() != thread::current().id() {
        let _ = playback.handle.join();
    }
}

struct PlaybackWorker {
    session: SharedSession,
    surface: Arc<dyn DisplaySurface>,
    images: Arc<dyn ImageLoader>,
    slide_delay: Duration,
    cancelled: Receiver<()>,
    // Dropped last, once the worker is done with everything else
    finished: FinishOnDrop,
}

impl PlaybackWorker {
    fn run(self, on_complete: CompletionHook) {
        match self.play() {
            Some(terminal) => {
                self.surface.show(terminal);
                on_complete();
            }
            // Releases whatever the hook was holding
            None => drop(on_complete),
        }
    }

    /// Walk the session to its terminal view, or `None` if cancelled first
    fn play(&self) -> Option<View> {
        let mut transition = self.session.lock().start();

        loop {
            match transition {
                Transition::Show(index) => {
                    // The deadline is fixed before rendering so a slow image
                    // never pushes the next slide back
                    let deadline = Instant::now() + self.slide_delay;
                    if self.is_cancelled() || !self.render_slide(index) {
                        return None;
                    }

                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.cancelled.recv_timeout(remaining) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            debug!("Playback cancelled at slide {}", index + 1);
                            return None;
                        }
                    }
                    transition = self.session.lock().advance();
                }
                Transition::Completed => {
                    if self.is_cancelled() {
                        return None;
                    }
                    info!("Presentation complete");
                    return Some(View::Complete);
                }
                Transition::Empty => {
                    if self.is_cancelled() {
                        return None;
                    }
                    info!("Presentation has no slides");
                    return Some(View::NoContent);
                }
                Transition::Halted => return None,
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        !matches!(self.cancelled.try_recv(), Err(TryRecvError::Empty))
    }

    /// Show the caption straight away, then swap in the image once it
    /// resolves. Returns `false` if cancelled while the image loaded.
    fn render_slide(&self, index: usize) -> bool {
        let (slide, total) = {
            let session = self.session.lock();
            match session.deck().get(index) {
                Some(slide) => (slide.clone(), session.deck().len()),
                None => return true,
            }
        };

        debug!("Rendering slide {}/{}", index + 1, total);
        let caption = slide.sentence().to_string();
        self.surface.show(View::Slide(SlideView {
            index,
            total,
            image: ImageView::pending(&slide),
            caption: caption.clone(),
        }));

        let image = slide_image::resolve(self.images.as_ref(), &slide);
        if self.is_cancelled() {
            return false;
        }
        self.surface.show(View::Slide(SlideView {
            index,
            total,
            image,
            caption,
        }));
        true
    }
}
