use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use super::BlockingTransport;
use crate::config::ClientConfig;
use crate::envelope::{Payload, decode_body};
use crate::error::Error;

#[derive(Clone)]
struct Clients {
    api: Client,
    upload: Client,
}

/// [`BlockingTransport`] backed by `reqwest::blocking`.
pub struct BlockingHttpTransport {
    base_url: String,
    api_key: String,
    upload_timeout: Duration,
    clients: RwLock<Option<Clients>>,
}

impl std::fmt::Debug for BlockingHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingHttpTransport")
            .field("base_url", &self.base_url)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl BlockingHttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let api = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        Self::with_client(config, api)
    }

    /// Use a caller-supplied client for API calls.
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

    fn add_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(AUTHORIZATION, format!("ApiKey {}", self.api_key))
    }

    fn send(req: RequestBuilder) -> Result<Payload, Error> {
        let response = req.send().map_err(|e| Error::Connection(e.to_string()))?;
        let body = response
            .bytes()
            .map_err(|e| Error::Connection(e.to_string()))?;
        decode_body(&body)
    }
}

impl BlockingTransport for BlockingHttpTransport {
    fn get(&self, path: &str) -> Result<Payload, Error> {
        let clients = self.clients()?;
        debug!(method = "GET", path, "sending request");
        Self::send(self.add_auth(clients.api.get(self.url(path))))
    }

    fn post(&self, path: &str, body: &Value) -> Result<Payload, Error> {
        let clients = self.clients()?;
        debug!(method = "POST", path, "sending request");
        Self::send(self.add_auth(clients.api.post(self.url(path))).json(body))
    }

    fn put_raw(&self, url: &str, content: Bytes, content_type: &str) -> Result<(), Error> {
        let clients = self.clients()?;
        debug!(bytes = content.len(), content_type, "uploading to presigned URL");

        let response = clients
            .upload
            .put(url)
            .timeout(self.upload_timeout)
            .header(CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .map_err(|e| Error::Connection(format!("upload failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
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
