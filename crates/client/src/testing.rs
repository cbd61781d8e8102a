//! Recording transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::envelope::{Payload, unwrap_envelope};
use crate::error::Error;
use crate::transport::Transport;

/// A call observed by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Get(String),
    Post(String, Value),
    Put {
        url: String,
        content_type: String,
        len: usize,
    },
}

impl Call {
    /// Short label such as `POST /miniapp/media/create` or `PUT`.
    pub(crate) fn label(&self) -> String {
        match self {
            Self::Get(path) => format!("GET {path}"),
            Self::Post(path, _) => format!("POST {path}"),
            Self::Put { .. } => "PUT".to_owned(),
        }
    }
}

/// Transport that records every call and replays scripted envelopes.
///
/// Responses are queued per path and consumed in order. A path with no
/// queued response fails with a connection error.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<HashMap<String, VecDeque<Result<Payload, Error>>>>,
    put_failures: Mutex<VecDeque<Error>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a successful payload for `path`.
    pub(crate) fn respond(self, path: &str, data: Value) -> Self {
        self.envelope(path, serde_json::json!({"success": true, "data": data}))
    }

    /// Queue a raw envelope for `path`; it is decoded like a real response.
    pub(crate) fn envelope(self, path: &str, envelope: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_owned())
            .or_default()
            .push_back(unwrap_envelope(envelope));
        self
    }

    /// Make the next PUT fail with `err`.
    pub(crate) fn fail_put(self, err: Error) -> Self {
        self.put_failures.lock().unwrap().push_back(err);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        self.calls().iter().map(Call::label).collect()
    }

    /// Body of the most recent POST to `path`.
    pub(crate) fn last_body(&self, path: &str) -> Option<Value> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::Post(p, body) if p == path => Some(body),
            _ => None,
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next(&self, path: &str) -> Result<Payload, Error> {
        self.responses
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(Error::Connection(format!("no scripted response for {path}"))))
    }

    fn put(&self, url: &str, content: &[u8], content_type: &str) -> Result<(), Error> {
        self.record(Call::Put {
            url: url.to_owned(),
            content_type: content_type.to_owned(),
            len: content.len(),
        });
        match self.put_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, path: &str) -> Result<Payload, Error> {
        self.record(Call::Get(path.to_owned()));
        self.next(path)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Payload, Error> {
        self.record(Call::Post(path.to_owned(), body.clone()));
        self.next(path)
    }

    async fn put_raw(&self, url: &str, content: Bytes, content_type: &str) -> Result<(), Error> {
        self.put(url, &content, content_type)
    }
}

#[cfg(feature = "blocking")]
impl crate::blocking::BlockingTransport for RecordingTransport {
    fn get(&self, path: &str) -> Result<Payload, Error> {
        self.record(Call::Get(path.to_owned()));
        self.next(path)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Payload, Error> {
        self.record(Call::Post(path.to_owned(), body.clone()));
        self.next(path)
    }

    fn put_raw(&self, url: &str, content: Bytes, content_type: &str) -> Result<(), Error> {
        self.put(url, &content, content_type)
    }
}

/// A minimal media asset payload.
pub(crate) fn image_media(media_id: &str, url: &str) -> Value {
    serde_json::json!({
        "mediaId": media_id,
        "kind": "image",
        "payload": {"imageUrl": url}
    })
}
