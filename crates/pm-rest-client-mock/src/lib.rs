//! Scripted transport double
//!
//! [`RecordingTransport`] records every request the client hands it and
//! answers from a queue of scripted results, so tests can assert on the
//! exact wire shape without a server.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use pm_client_api::{Credentials, Transport, TransportError, TransportResult};
use pm_rest_api_contract::{ApiDocument, HttpMethod, PreparedRequest};
use serde_json::json;

#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<TransportResult<ApiDocument>>>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that answers the given documents in order.
    pub fn with_responses<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = ApiDocument>,
    {
        let transport = Self::new();
        for document in documents {
            transport.push_response(document);
        }
        transport
    }

    pub fn push_response(&self, document: ApiDocument) {
        lock(&self.responses).push_back(Ok(document));
    }

    pub fn push_failure(&self, error: TransportError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<PreparedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<PreparedRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Scripted results not yet consumed.
    pub fn pending_responses(&self) -> usize {
        lock(&self.responses).len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &PreparedRequest, _credentials: &Credentials) -> TransportResult<ApiDocument> {
        tracing::trace!(method = %request.method, url = %request.url, "recording request");
        lock(&self.requests).push(request.clone());
        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Request(format!(
                "no scripted response for {} {}",
                request.method,
                request.url.path()
            )))
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A `{"results": [...], "totalCount": n}` page as the service returns it.
pub fn page_of<I>(items: I) -> ApiDocument
where
    I: IntoIterator<Item = ApiDocument>,
{
    let results: Vec<ApiDocument> = items.into_iter().collect();
    let total = results.len();
    json!({ "results": results, "totalCount": total, "links": [] })
}

/// An error document with the service's `errorCode`/`detail` fields.
pub fn error_document(status: u16, code: &str, detail: &str) -> ApiDocument {
    json!({
        "error": status,
        "errorCode": code,
        "detail": detail,
        "reason": "Error"
    })
}

/// Short description of a recorded request, e.g. `GET /api/public/v1.0/groups`.
pub fn describe(request: &PreparedRequest) -> String {
    format!("{} {}", request.method, request.url.path())
}

pub fn is_read(request: &PreparedRequest) -> bool {
    request.method == HttpMethod::Get
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_rest_api_contract::{api_base_url, RequestDescriptor};

    fn prepared(segments: &[&str]) -> PreparedRequest {
        let base = api_base_url("http://ops.example.com").unwrap();
        RequestDescriptor::get(segments.iter().copied()).prepare(&base).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("ops@example.com", "key").unwrap()
    }

    #[test]
    fn test_replays_in_order_and_records() {
        let transport = RecordingTransport::with_responses([json!({"id": 1}), json!({"id": 2})]);

        let first = transport.send(&prepared(&["groups"]), &credentials()).unwrap();
        let second = transport.send(&prepared(&["users"]), &credentials()).unwrap();

        assert_eq!(first, json!({"id": 1}));
        assert_eq!(second, json!({"id": 2}));
        assert_eq!(transport.request_count(), 2);
        assert_eq!(
            describe(&transport.requests()[1]),
            "GET /api/public/v1.0/users"
        );
        assert!(is_read(&transport.requests()[0]));
    }

    #[test]
    fn test_scripted_failure_and_exhaustion() {
        let transport = RecordingTransport::new();
        transport.push_failure(TransportError::Timeout("slow".into()));

        let err = transport.send(&prepared(&["groups"]), &credentials()).unwrap_err();
        assert_eq!(err, TransportError::Timeout("slow".into()));

        let err = transport.send(&prepared(&["groups"]), &credentials()).unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
        assert_eq!(transport.pending_responses(), 0);
    }

    #[test]
    fn test_page_of_counts_items() {
        let page = page_of([json!({"id": "a"}), json!({"id": "b"})]);
        assert_eq!(page["totalCount"], 2);
        assert_eq!(page["results"].as_array().map(Vec::len), Some(2));
    }
}
