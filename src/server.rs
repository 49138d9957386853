// ABOUTME: Local development server for the banana-slides client
// ABOUTME: Serves a fixed deck on /generate and packages zips on /download

use crate::archive;
use crate::config::DEFAULT_ARCHIVE_NAME;
use crate::errors::{Result, SlideshowError};
use crate::slide::{Slide, SlideDeck};
use crate::utils;
use log::{debug, error, info, warn};
use serde_json::{json, Value};
use std::fs;
use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Configuration for the development server
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1`
    pub host: String,

    /// Port to bind; 0 picks a free port
    pub port: u16,

    /// Deck returned for every generate request
    pub deck: SlideDeck,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            deck: SlideDeck::default(),
        }
    }
}

/// Load a deck fixture from a JSON file holding an array of slides
pub fn load_deck(path: &Path) -> Result<SlideDeck> {
    utils::validate_file_exists(path)?;
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        SlideshowError::ConfigError(format!("Invalid deck file {:?}: {}", path, e))
    })
}

/// A running development server
pub struct StubServer {
    server: Arc<Server>,
    addr: SocketAddr,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Bind and start answering requests on a background thread
    pub fn start(config: ServerConfig) -> Result<Self> {
        let server = Server::http(format!("{}:{}", config.host, config.port))
            .map_err(|e| SlideshowError::ServerError(format!("Failed to start HTTP server: {}", e)))?;
        let addr = server.server_addr().to_ip().ok_or_else(|| {
            SlideshowError::ServerError("Server is not listening on an IP address".to_string())
        })?;

        let server = Arc::new(server);
        let server_thread = Arc::clone(&server);
        let deck = config.deck;

        let handle = thread::spawn(move || {
            info!("HTTP server listening on http://{}", addr);
            for request in server_thread.incoming_requests() {
                handle_request(request, &deck);
            }
            debug!("HTTP server on {} stopped", addr);
        });

        Ok(Self {
            server,
            addr,
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL clients should use
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve until the process is interrupted
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("HTTP server thread panicked");
            }
        }
    }

    /// Stop accepting requests and wait for the server thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A response before it is handed to the HTTP layer
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    attachment: Option<&'static str>,
}

impl Reply {
    fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
            attachment: None,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }).to_string().into_bytes())
    }

    fn into_response(self) -> HttpResponse {
        let mut response = Response::from_data(self.body).with_status_code(StatusCode(self.status));
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            response = response.with_header(header);
        }
        if let Some(filename) = self.attachment {
            let disposition = format!("attachment; filename=\"{}\"", filename);
            if let Ok(header) = Header::from_bytes(&b"Content-Disposition"[..], disposition.as_bytes()) {
                response = response.with_header(header);
            }
        }
        response
    }
}

fn handle_request(mut request: Request, deck: &SlideDeck) {
    let method = request.method().clone();
    let url = request.url().to_string();
    debug!("{} {}", method, url);

    let mut body = Vec::new();
    let reply = match request.as_reader().read_to_end(&mut body) {
        Ok(_) => route(&method, &url, &body, deck),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            Reply::error(400, "Unreadable request body.")
        }
    };

    if let Err(e) = request.respond(reply.into_response()) {
        error!("Failed to send response: {}", e);
    }
}

fn route(method: &Method, url: &str, body: &[u8], deck: &SlideDeck) -> Reply {
    match (method, url) {
        (Method::Post, "/generate") => generate(body, deck),
        (Method::Post, "/download") => download(body),
        _ => Reply::error(404, "Not found."),
    }
}

fn generate(body: &[u8], deck: &SlideDeck) -> Reply {
    let topic = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("topic").and_then(Value::as_str).map(str::to_string))
        .filter(|topic| !topic.is_empty());

    let Some(topic) = topic else {
        return Reply::error(400, "No topic provided");
    };

    info!("Serving {} fixture slides for topic {:?}", deck.len(), topic);
    match serde_json::to_vec(deck) {
        Ok(bytes) => Reply::json(200, bytes),
        Err(e) => Reply::error(500, &format!("Failed to encode slides: {}", e)),
    }
}

fn download(body: &[u8]) -> Reply {
    let request: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let Some(slides) = request.get("slides") else {
        return Reply::error(400, "Missing 'slides' data in request.");
    };

    let slides: Vec<Slide> = match serde_json::from_value(slides.clone()) {
        Ok(slides) => slides,
        Err(_) => return Reply::error(400, "Invalid or empty 'slides' data."),
    };
    if slides.is_empty() {
        return Reply::error(400, "Invalid or empty 'slides' data.");
    }

    match archive::package(&slides) {
        Ok(bytes) => {
            info!("Sending {} byte archive", bytes.len());
            Reply {
                status: 200,
                content_type: "application/zip",
                body: bytes,
                attachment: Some(DEFAULT_ARCHIVE_NAME),
            }
        }
        Err(e) => {
            error!("Failed to package slides: {}", e);
            Reply::error(500, &e.to_string())
        }
    }
}
