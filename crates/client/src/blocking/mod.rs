//! Blocking mirror of the async client.
//!
//! Same operations, data types and errors as the crate root; every call
//! blocks the current thread until the HTTP exchange completes, and
//! listings are plain [`Iterator`]s.
//!
//! Do not use this module from inside an async runtime.
//!
//! ```no_run
//! use miniapp_client::blocking::MiniAppClient;
//!
//! fn main() -> Result<(), miniapp_client::Error> {
//!     let client = MiniAppClient::new("ma_xxx", Some("https://api.example"))?;
//!     for item in client.media().iter_album("char-uuid", 50) {
//!         let item = item?;
//!         println!("{}", item.created_at);
//!     }
//!     client.close();
//!     Ok(())
//! }
//! ```

mod assets;
mod character;
mod media;
mod transport;

pub use assets::AssetsResource;
pub use character::CharacterResource;
pub use media::MediaResource;
pub use transport::BlockingHttpTransport;

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::envelope::Payload;
use crate::error::Error;

/// The I/O boundary of the blocking client.
///
/// Same contract as [`Transport`](crate::Transport).
pub trait BlockingTransport: Send + Sync {
    /// Authenticated GET; returns the unwrapped envelope payload.
    fn get(&self, path: &str) -> Result<Payload, Error>;

    /// Authenticated POST with a JSON body; returns the unwrapped payload.
    fn post(&self, path: &str, body: &Value) -> Result<Payload, Error>;

    /// Unauthenticated PUT of raw bytes to an absolute (presigned) URL.
    fn put_raw(&self, url: &str, content: Bytes, content_type: &str) -> Result<(), Error>;

    /// Release pooled connections. Must be safe to call more than once.
    fn close(&self) {}
}

/// Blocking MiniApp client.
///
/// Cheap to clone; clones share one connection pool. Resources are
/// borrowed views created on demand.
#[derive(Clone)]
pub struct MiniAppClient {
    transport: Arc<dyn BlockingTransport>,
}

impl std::fmt::Debug for MiniAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniAppClient").finish_non_exhaustive()
    }
}

impl MiniAppClient {
    /// Create a client with default timeouts.
    ///
    /// `base_url` falls back to `PIKA_BASE_URL` when `None`.
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Result<Self, Error> {
        let mut config = ClientConfig::new(api_key);
        config.base_url = base_url.map(str::to_owned);
        Self::from_config(&config)
    }

    /// Create a client from `PIKA_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_config(&ClientConfig::from_env())
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self::with_transport(BlockingHttpTransport::new(config)?))
    }

    /// Create a builder for advanced configuration.
    pub fn builder(api_key: impl Into<String>) -> crate::MiniAppClientBuilder {
        crate::MiniAppClientBuilder::new(api_key)
    }

    /// Wrap a custom transport.
    pub fn with_transport(transport: impl BlockingTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn character(&self) -> CharacterResource<'_> {
        CharacterResource::new(self.transport.as_ref())
    }

    pub fn media(&self) -> MediaResource<'_> {
        MediaResource::new(self.transport.as_ref())
    }

    pub fn assets(&self) -> AssetsResource<'_> {
        AssetsResource::new(self.transport.as_ref())
    }

    /// Release pooled connections. Idempotent; later calls fail with
    /// [`Error::Closed`].
    pub fn close(&self) {
        self.transport.close();
    }
}
