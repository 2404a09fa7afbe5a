//! In-memory transport for testing without network access.
//!
//! [`MockTransport`] behaves like a tiny document server: PUT and POST store
//! the request body under the path, GET returns it (or 404), DELETE removes
//! it (or 404). Scripted responses registered with [`MockTransport::respond`]
//! take precedence over that behaviour.
//!
//! Every request is recorded, and the transport tracks how many mutating
//! requests were in flight at once, so tests can check that writes are
//! serialized.

use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Response(HttpResponse),
    Disconnect,
}

#[derive(Debug, Default)]
struct Inner {
    scripted: Mutex<HashMap<(Method, String), Scripted>>,
    documents: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Mutex<Duration>,
    in_flight_writes: AtomicUsize,
    max_in_flight_writes: AtomicUsize,
}

/// Scripted transport; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

/// Path component of an absolute URL.
fn path_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.find('/').map_or("/", |i| &rest[i..])
}

impl MockTransport {
    /// Create a new empty mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that answers the organization lookup with `id`.
    #[must_use]
    pub fn with_organization(id: &str) -> Self {
        let mock = Self::new();
        let body = serde_json::json!({ "id": id, "name": format!("{id} org") });
        mock.respond(Method::Get, crate::client::ORGANIZATION_PATH, 200, body.to_string());
        mock
    }

    /// Always answer `method path` with `status` and `body`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        let response = HttpResponse::new(status, body.into());
        self.inner
            .scripted
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Scripted::Response(response));
    }

    /// Fail `method path` at the connection level.
    pub fn disconnect(&self, method: Method, path: &str) {
        self.inner
            .scripted
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Scripted::Disconnect);
    }

    /// Seed the document stored at `path`.
    pub fn put_document(&self, path: &str, document: &serde_json::Value) {
        self.inner
            .documents
            .lock()
            .unwrap()
            .insert(path.to_string(), document.to_string().into_bytes());
    }

    /// Document currently stored at `path`, if any.
    pub fn document(&self, path: &str) -> Option<serde_json::Value> {
        let documents = self.inner.documents.lock().unwrap();
        documents
            .get(path)
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    /// Delay every exchange, to widen race windows in concurrency tests.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock().unwrap() = latency;
    }

    /// All requests received, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// Mutating requests received, in arrival order.
    pub fn writes(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.is_mutating())
            .collect()
    }

    /// Highest number of mutating requests observed in flight at once.
    pub fn max_concurrent_writes(&self) -> usize {
        self.inner.max_in_flight_writes.load(Ordering::SeqCst)
    }

    fn serve_document(&self, method: Method, path: &str, body: Option<&[u8]>) -> HttpResponse {
        let mut documents = self.inner.documents.lock().unwrap();
        match method {
            Method::Get => match documents.get(path) {
                Some(doc) => HttpResponse::new(200, doc.clone()),
                None => HttpResponse::new(404, "not found"),
            },
            Method::Put | Method::Post => {
                let doc = body.map_or_else(|| b"{}".to_vec(), <[u8]>::to_vec);
                documents.insert(path.to_string(), doc.clone());
                HttpResponse::new(200, doc)
            }
            Method::Delete => match documents.remove(path) {
                Some(_) => HttpResponse::new(200, ""),
                None => HttpResponse::new(404, "not found"),
            },
        }
    }

    fn respond_to(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let path = path_of(&request.url);

        let latency = *self.inner.latency.lock().unwrap();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }

        let scripted = self
            .inner
            .scripted
            .lock()
            .unwrap()
            .get(&(request.method, path.to_string()))
            .cloned();

        match scripted {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Disconnect) => Err(Error::Http {
                url: request.url.clone(),
                message: "connection reset by peer".into(),
            }),
            None => Ok(self.serve_document(request.method, path, request.body.as_deref())),
        }
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.inner.requests.lock().unwrap().push(request.clone());

        if !request.method.is_mutating() {
            return self.respond_to(request);
        }

        let now = self.inner.in_flight_writes.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .max_in_flight_writes
            .fetch_max(now, Ordering::SeqCst);
        let result = self.respond_to(request);
        self.inner.in_flight_writes.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
