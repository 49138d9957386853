// ABOUTME: Shared helpers for banana-slides integration tests
// ABOUTME: Provides a scripted HTTP server that records every request

#![allow(dead_code)]

use parking_lot::Mutex;
use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server, StatusCode};
use url::Url;

/// A request as seen by the scripted server
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// What the scripted server answers with
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub disposition: Option<String>,
}

impl Reply {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
            disposition: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
            disposition: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::text(status, "")
    }

    pub fn zip(bytes: Vec<u8>, filename: &str) -> Self {
        Self {
            status: 200,
            content_type: "application/zip",
            body: bytes,
            disposition: Some(format!("attachment; filename=\"{}\"", filename)),
        }
    }
}

type Responder = dyn Fn(&Recorded) -> Reply + Send + Sync;

/// Answers every request with whatever the responder returns
pub struct ScriptedServer {
    server: Arc<Server>,
    url: Url,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: Option<JoinHandle<()>>,
}

impl ScriptedServer {
    pub fn start(responder: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("Failed to bind test server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("test server should listen on IP");
        let url = Url::parse(&format!("http://{}", addr)).expect("valid test url");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let server_thread = Arc::clone(&server);
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for mut request in server_thread.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let entry = Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body,
                };
                recorded.lock().push(entry.clone());

                let reply = responder(&entry);
                let mut response = Response::from_data(reply.body)
                    .with_status_code(StatusCode(reply.status))
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
                            .expect("valid header"),
                    );
                if let Some(disposition) = reply.disposition {
                    response = response.with_header(
                        Header::from_bytes(&b"Content-Disposition"[..], disposition.as_bytes())
                            .expect("valid header"),
                    );
                }
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            url,
            requests,
            handle: Some(handle),
        }
    }

    pub fn url(&self) -> Url {
        self.url.clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|request| request.url == path)
            .collect()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// JSON for a deck of `n` slides with unloadable images
pub fn deck_json(n: usize, prefix: &str) -> serde_json::Value {
    serde_json::Value::Array(
        (0..n)
            .map(|i| {
                serde_json::json!({
                    "sentence": format!("{} {}", prefix, i + 1),
                    "imageUrl": format!("placeholder_{}.png", i + 1),
                    "imagePrompt": format!("Miko and banana {}", i + 1),
                })
            })
            .collect(),
    )
}
