//! Async HTTP transport.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::envelope::{Payload, decode_body};
use crate::error::Error;

/// The I/O boundary of the async client.
///
/// Resources only talk to the service through this trait, which keeps them
/// independent of the HTTP stack and lets tests substitute a recording
/// implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Authenticated GET; returns the unwrapped envelope payload.
    async fn get(&self, path: &str) -> Result<Payload, Error>;

    /// Authenticated POST with a JSON body; returns the unwrapped payload.
    async fn post(&self, path: &str, body: &Value) -> Result<Payload, Error>;

    /// Unauthenticated PUT of raw bytes to an absolute (presigned) URL.
    ///
    /// Success is any 2xx status; there is no envelope.
    async fn put_raw(&self, url: &str, content: Bytes, content_type: &str) -> Result<(), Error>;

    /// Release pooled connections. Must be safe to call more than once.
    fn close(&self) {}
}

#[derive(Clone)]
struct Clients {
    api: Client,
    upload: Client,
}

/// [`Transport`] backed by `reqwest`.
///
/// Holds one pooled client for API calls and a second, header-free client
/// for presigned uploads. After [`close`](Transport::close) both are dropped
/// and every call fails with [`Error::Closed`].
pub struct HttpTransport {
    base_url: String,
    api_key: String,
    upload_timeout: Duration,
    clients: RwLock<Option<Clients>>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let api = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        Self::with_client(config, api)
    }

    /// Build a transport around a caller-supplied `reqwest` client for API
    /// calls. Uploads still use a dedicated client without default headers.
    pub fn with_client(config: &ClientConfig, api: Client) -> Result<Self, Error> {
        let base_url = config.resolve_base_url()?;
        let upload = Client::builder()
            .timeout(config.upload_timeout)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            upload_timeout: config.upload_timeout,
            clients: RwLock::new(Some(Clients { api, upload })),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_closed(&self) -> bool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn clients(&self) -> Result<Clients, Error> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::Closed)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Add the API key authorization header.
    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(AUTHORIZATION, format!("ApiKey {}", self.api_key))
    }

    async fn send(req: reqwest::RequestBuilder) -> Result<Payload, Error> {
        let response = req
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        decode_body(&body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Payload, Error> {
        let clients = self.clients()?;
        debug!(method = "GET", path, "sending request");
        Self::send(self.add_auth(clients.api.get(self.url(path)))).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Payload, Error> {
        let clients = self.clients()?;
        debug!(method = "POST", path, "sending request");
        Self::send(self.add_auth(clients.api.post(self.url(path))).json(body)).await
    }

    async fn put_raw(&self, url: &str, content: Bytes, content_type: &str) -> Result<(), Error> {
        let clients = self.clients()?;
        debug!(bytes = content.len(), content_type, "uploading to presigned URL");

        let response = clients
            .upload
            .put(url)
            .timeout(self.upload_timeout)
            .header(CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(|e| Error::Connection(format!("upload failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "storage rejected upload");
            Err(Error::Http {
                status: status.as_u16(),
                message: format!("upload failed: {body}"),
            })
        }
    }

    fn close(&self) {
        let released = self
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!(base_url = %self.base_url, "transport closed");
        }
    }
}
