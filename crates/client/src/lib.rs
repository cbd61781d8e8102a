//! MiniApp HTTP Client
//!
//! A native Rust client for the Pika MiniApp character blueprint API.
//!
//! # Quick Start
//!
//! ```no_run
//! use miniapp_client::MiniAppClient;
//! use miniapp_core::{BlueprintPatch, BlueprintSection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), miniapp_client::Error> {
//!     // Reads PIKA_BASE_URL when no base URL is given
//!     let client = MiniAppClient::new("ma_xxx", None)?;
//!
//!     let character = client.character().get_blueprint("char-uuid").await?;
//!     println!("{}", character.profile.profile_name);
//!
//!     let patch = BlueprintPatch::new()
//!         .set(BlueprintSection::Goal, serde_json::json!({"primary": "explore"}));
//!     client
//!         .character()
//!         .upsert_blueprint_state("char-uuid", patch)
//!         .await?;
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - Character blueprint reads and partial updates
//! - Media registration, albums, and the presigned upload pipeline
//! - Creation asset listings and type tags
//! - Cursor pagination as a [`futures::Stream`] (async) or [`Iterator`]
//!   (blocking)
//! - A blocking mirror in [`blocking`] (default `blocking` feature)
//!
//! # Errors
//!
//! Failures to talk to the service ([`Error::Connection`], [`Error::Http`],
//! [`Error::Deserialization`]) are kept apart from well-formed error
//! responses, which arrive as [`Error::Api`] carrying an [`ApiError`]:
//!
//! ```no_run
//! # async fn example(client: miniapp_client::MiniAppClient) {
//! use miniapp_client::ApiError;
//!
//! match client.character().get_blueprint("char-uuid").await {
//!     Ok(item) => println!("found {}", item.id),
//!     Err(e) if e.is_not_found() => println!("no such character"),
//!     Err(e) => match e.api_error() {
//!         Some(ApiError::Auth { .. }) => println!("check the API key"),
//!         _ => println!("request failed: {e}"),
//!     },
//! }
//! # }
//! ```
//!
//! # Configuration
//!
//! ```no_run
//! use miniapp_client::MiniAppClient;
//! use std::time::Duration;
//!
//! let client = MiniAppClient::builder("ma_xxx")
//!     .base_url("https://api.example")
//!     .timeout(Duration::from_secs(10))
//!     .upload_timeout(Duration::from_secs(120))
//!     .build()
//!     .unwrap();
//! ```

mod assets;
mod character;
mod config;
mod envelope;
mod error;
mod media;
mod pager;
mod transport;
mod upload;
mod wire;

#[cfg(feature = "blocking")]
pub mod blocking;

#[cfg(test)]
mod testing;

pub use assets::AssetsResource;
pub use character::CharacterResource;
pub use config::{
    ClientConfig, DEFAULT_TIMEOUT, DEFAULT_UPLOAD_TIMEOUT, ENV_API_KEY, ENV_BASE_URL,
    ENV_TIMEOUT_SECS, ENV_UPLOAD_TIMEOUT_SECS,
};
pub use envelope::{Payload, decode_body, unwrap_envelope};
pub use error::{ApiError, Error, status_from_code};
pub use media::MediaResource;
pub use pager::{PageIter, Paginated, Pager};
pub use transport::{HttpTransport, Transport};
pub use upload::{DEFAULT_UPLOAD_FILENAME, FALLBACK_CONTENT_TYPE, UploadOptions};
pub use wire::{AssetQuery, CreateMedia, DEFAULT_ITER_PAGE_SIZE, DEFAULT_PAGE_LIMIT};

// Re-export the data model so callers don't need a direct `miniapp_core` dependency.
pub use miniapp_core::{
    AlbumEntry, AlbumItem, AlbumPage, BlueprintPatch, BlueprintSection, BlueprintState,
    CharacterItem, CharacterProfile, CreationAsset, CreationAssetPage, IdentityCard, MediaAsset,
    MediaKind, MediaPayload, Page, PageCursor, PresignedUpload, UploadResult,
};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

/// Builder for configuring a [`MiniAppClient`].
#[derive(Debug)]
pub struct MiniAppClientBuilder {
    config: ClientConfig,
    client: Option<Client>,
}

impl MiniAppClientBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(api_key),
            client: None,
        }
    }

    /// Set the API base URL. Without it, `PIKA_BASE_URL` is used.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the timeout for API calls.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the timeout for the PUT to presigned storage URLs.
    #[must_use]
    pub fn upload_timeout(mut self, timeout: Duration) -> Self {
        self.config.upload_timeout = timeout;
        self
    }

    /// Use a custom reqwest Client for API calls.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings.
    /// The client's own timeout applies instead of [`timeout`](Self::timeout).
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the async client.
    pub fn build(self) -> Result<MiniAppClient, Error> {
        let transport = match self.client {
            Some(client) => HttpTransport::with_client(&self.config, client)?,
            None => HttpTransport::new(&self.config)?,
        };
        Ok(MiniAppClient::with_transport(transport))
    }

    /// Build the blocking client.
    ///
    /// Fails with [`Error::Configuration`] if a custom client was set with
    /// [`client`](Self::client); that client is async-only.
    #[cfg(feature = "blocking")]
    pub fn build_blocking(self) -> Result<blocking::MiniAppClient, Error> {
        if self.client.is_some() {
            return Err(Error::Configuration(
                "a custom reqwest::Client cannot back the blocking client".into(),
            ));
        }
        blocking::MiniAppClient::from_config(&self.config)
    }
}

/// Async MiniApp client.
///
/// Cheap to clone; clones share one connection pool. Resources are
/// borrowed views over the client and are created on demand.
///
/// Dropping the last clone releases the pool; [`close`](Self::close)
/// releases it early for every clone.
#[derive(Clone)]
pub struct MiniAppClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for MiniAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniAppClient").finish_non_exhaustive()
    }
}

impl MiniAppClient {
    /// Create a client with default timeouts.
    ///
    /// `base_url` falls back to `PIKA_BASE_URL` when `None`; construction
    /// fails with [`Error::Configuration`] if neither is set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use miniapp_client::MiniAppClient;
    ///
    /// let client = MiniAppClient::new("ma_xxx", Some("https://api.example")).unwrap();
    /// ```
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
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }

    /// Create a builder for advanced configuration.
    pub fn builder(api_key: impl Into<String>) -> MiniAppClientBuilder {
        MiniAppClientBuilder::new(api_key)
    }

    /// Wrap a custom transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Character blueprint operations.
    pub fn character(&self) -> CharacterResource<'_> {
        CharacterResource::new(self.transport.as_ref())
    }

    /// Media, album and upload operations.
    pub fn media(&self) -> MediaResource<'_> {
        MediaResource::new(self.transport.as_ref())
    }

    /// Creation asset operations.
    pub fn assets(&self) -> AssetsResource<'_> {
        AssetsResource::new(self.transport.as_ref())
    }

    /// Release pooled connections.
    ///
    /// Idempotent. Later calls through this client or any clone fail with
    /// [`Error::Closed`].
    pub fn close(&self) {
        self.transport.close();
    }
}
