mod common;

use banana_slides::controller::{DOWNLOAD_COMPLETE_LABEL, DOWNLOAD_FAILED_LABEL, DOWNLOAD_LABEL};
use banana_slides::slide_image::{LoadedImage, FALLBACK_IMAGE_URL};
use banana_slides::surface::NO_DOWNLOAD_DATA_TEXT;
use banana_slides::{
    ClientConfig, DirectorySink, ImageLoader, MemorySurface, Presenter, PresenterConfig,
    SlideshowController, SlideshowError, TransferClient, View,
};
use common::{deck_json, Reply, ScriptedServer};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct BrokenImages;

impl ImageLoader for BrokenImages {
    fn load(&self, url: &str) -> banana_slides::Result<LoadedImage> {
        Err(SlideshowError::ImageError(format!("cannot load {}", url)))
    }
}

fn controller(
    server: &ScriptedServer,
    surface: &Arc<MemorySurface>,
    download_dir: &Path,
) -> SlideshowController {
    let client = TransferClient::new(&ClientConfig {
        base_url: server.url(),
        timeout: Duration::from_secs(5),
    })
    .expect("Failed to build client");
    let presenter = Presenter::new(
        surface.clone(),
        Arc::new(BrokenImages),
        &PresenterConfig {
            slide_delay: Duration::from_millis(20),
            image_timeout: Duration::from_millis(10),
        },
    );
    SlideshowController::new(
        client,
        presenter,
        surface.clone(),
        Box::new(DirectorySink::new(download_dir)),
    )
}

// Captions of slides once their image resolved
fn captions(views: &[View]) -> Vec<String> {
    views
        .iter()
        .filter_map(|view| match view {
            View::Slide(slide) if !slide.image.pending => Some(slide.caption.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_generate_presents_every_slide_then_completes() {
    let server = ScriptedServer::start(|_| Reply::json(200, deck_json(3, "Monkey")));
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    assert!(!controller.download_trigger().is_visible());
    let session = controller
        .generate("packets")
        .expect("generate should succeed")
        .expect("deck should not be empty");
    assert!(!controller.generate_trigger().is_enabled());

    controller.wait_for_presentation();

    let views = surface.views();
    assert_eq!(views.first(), Some(&View::Loading));
    assert_eq!(captions(&views), vec!["Monkey 1", "Monkey 2", "Monkey 3"]);
    assert_eq!(views.last(), Some(&View::Complete));
    assert_eq!(views.iter().filter(|v| **v == View::Complete).count(), 1);

    // Images never load here, yet every caption rendered with the fallback image
    for view in &views {
        if let View::Slide(slide) = view {
            if slide.image.pending {
                continue;
            }
            assert!(slide.image.fallback);
            assert_eq!(slide.image.src, FALLBACK_IMAGE_URL);
        }
    }

    assert!(session.lock().is_complete());
    assert!(controller.generate_trigger().is_enabled());
    assert!(controller.download_trigger().is_visible());
}

#[test]
fn test_blank_topic_shows_prompt_without_request() {
    let server = ScriptedServer::start(|_| Reply::json(200, deck_json(1, "x")));
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    let err = controller.generate("   ").unwrap_err();
    assert!(matches!(err, SlideshowError::ValidationError(_)));
    assert_eq!(surface.views(), vec![View::Prompt]);
    assert!(server.requests().is_empty());
    assert!(controller.generate_trigger().is_enabled());
}

#[test]
fn test_empty_deck_shows_no_content() {
    let server = ScriptedServer::start(|_| Reply::json(200, json!([])));
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    let session = controller.generate("nothing").expect("empty deck is not an error");
    assert!(session.is_none());
    assert_eq!(surface.views(), vec![View::Loading, View::NoContent]);
    assert!(controller.generate_trigger().is_enabled());
    assert!(!controller.download_trigger().is_visible());
    assert!(controller.current_session().is_none());
}

#[test]
fn test_generate_failure_shows_error_and_reenables() {
    let server = ScriptedServer::start(|_| Reply::json(500, json!({"error": "quota exceeded"})));
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    assert!(controller.generate("bananas").is_err());
    assert_eq!(
        surface.current(),
        Some(View::Error("quota exceeded".to_string()))
    );
    assert_eq!(surface.current().map(|v| v.text()), Some("Error: quota exceeded".to_string()));
    assert!(controller.generate_trigger().is_enabled());
}

#[test]
fn test_generate_while_presenting_is_busy() {
    let server = ScriptedServer::start(|_| Reply::json(200, deck_json(50, "Long")));
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    controller.generate("first").expect("first generate");
    let err = controller.generate("second").unwrap_err();
    assert!(matches!(err, SlideshowError::Busy));
    assert_eq!(server.requests_to("/generate").len(), 1);

    controller.presenter().cancel();
}

#[test]
fn test_cancelled_presentation_reenables_generate() {
    let server = ScriptedServer::start(|request| {
        let topic = request.json()["topic"].as_str().unwrap_or_default().to_string();
        if topic == "first" {
            Reply::json(200, deck_json(50, "Long"))
        } else {
            Reply::json(200, deck_json(1, "Short"))
        }
    });
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    controller.generate("first").expect("first generate");
    assert!(!controller.generate_trigger().is_enabled());

    controller.presenter().cancel();
    assert!(controller.generate_trigger().is_enabled());
    assert!(!controller.download_trigger().is_visible());

    let second = controller
        .generate("second")
        .expect("generate after cancel should not be busy")
        .expect("slides");
    controller.wait_for_presentation();
    assert!(second.lock().is_complete());
    assert!(controller.generate_trigger().is_enabled());

    controller.generate("third").expect("third generate");
    controller.cancel();
    assert!(controller.generate_trigger().is_enabled());
}

#[test]
fn test_regenerate_replaces_previous_session() {
    let server = ScriptedServer::start(|request| {
        let topic = request.json()["topic"].as_str().unwrap_or_default().to_string();
        if topic == "first" {
            Reply::json(200, deck_json(2, "Old"))
        } else {
            Reply::json(200, deck_json(1, "New"))
        }
    });
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    let first = controller.generate("first").expect("first").expect("slides");
    controller.wait_for_presentation();
    let seen_before = surface.views().len();

    let second = controller.generate("second").expect("second").expect("slides");
    controller.wait_for_presentation();

    assert_ne!(first.lock().id(), second.lock().id());
    let current = controller.current_session().expect("current session");
    assert_eq!(current.lock().id(), second.lock().id());
    assert_eq!(current.lock().deck().len(), 1);

    let later = &surface.views()[seen_before..];
    assert_eq!(captions(later), vec!["New 1"]);
    assert_eq!(later.last(), Some(&View::Complete));
}

#[test]
fn test_download_without_slides_alerts_and_sends_nothing() {
    let server = ScriptedServer::start(|_| Reply::zip(b"PK".to_vec(), "x.zip"));
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    let err = controller.download().unwrap_err();
    assert!(matches!(err, SlideshowError::ValidationError(_)));
    assert_eq!(surface.alerts(), vec![NO_DOWNLOAD_DATA_TEXT.to_string()]);
    assert!(server.requests().is_empty());
}

#[test]
fn test_download_saves_archive_once() {
    let server = ScriptedServer::start(|request| match request.url.as_str() {
        "/generate" => Reply::json(200, deck_json(2, "Zip")),
        _ => Reply::zip(b"PK\x05\x06archive".to_vec(), "monkey_banana_slideshow.zip"),
    });
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    controller.generate("zips").expect("generate");
    controller.wait_for_presentation();

    let path = controller.download().expect("download should succeed");
    assert_eq!(path, temp_dir.path().join("monkey_banana_slideshow.zip"));
    assert_eq!(std::fs::read(&path).expect("saved archive"), b"PK\x05\x06archive");

    let downloads = server.requests_to("/download");
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].json()["slides"], deck_json(2, "Zip"));

    assert!(controller.download_trigger().is_enabled());
    assert_eq!(controller.download_trigger().label(), DOWNLOAD_COMPLETE_LABEL);
    assert!(surface.alerts().is_empty());
}

#[test]
fn test_download_failure_surfaces_message_and_reenables() {
    let server = ScriptedServer::start(|request| match request.url.as_str() {
        "/generate" => Reply::json(200, deck_json(1, "Full")),
        _ => Reply::json(500, json!({"error": "disk full"})),
    });
    let surface = Arc::new(MemorySurface::new());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let controller = controller(&server, &surface, temp_dir.path());

    controller.generate("disks").expect("generate");
    controller.wait_for_presentation();

    let err = controller.download().unwrap_err();
    assert_eq!(err.to_string(), "disk full");
    assert_eq!(surface.alerts(), vec!["Error during download: disk full".to_string()]);
    assert!(controller.download_trigger().is_enabled());
    assert_eq!(controller.download_trigger().label(), DOWNLOAD_FAILED_LABEL);

    // Nothing is offered under the archive name after a failure
    assert_eq!(std::fs::read_dir(temp_dir.path()).expect("read dir").count(), 0);

    std::thread::sleep(Duration::from_millis(3300));
    assert_eq!(controller.download_trigger().label(), DOWNLOAD_LABEL);
}
