//! Upload pipeline: presign, store, register, and optionally attach.
//!
//! Steps run strictly in order and nothing is rolled back. A failed PUT
//! abandons the presigned URL; a failed register leaves the stored bytes
//! orphaned at the permanent URL; a failed attach leaves a registered but
//! unattached asset, which can be attached later with
//! [`MediaResource::add_to_album`] using the returned media id.

use std::path::Path;

use bytes::Bytes;
use miniapp_core::{MediaAsset, MediaKind, UploadResult};
use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::media::MediaResource;
use crate::wire::CreateMedia;

/// Filename used by `upload_bytes` when the caller supplies none.
pub const DEFAULT_UPLOAD_FILENAME: &str = "upload.png";

/// Content type sent when none is given and the extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Length of the random hex prefix added to storage filenames.
const UNIQUE_PREFIX_LEN: usize = 12;

/// Options shared by every upload entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Kind the asset is registered as. Defaults to image.
    pub kind: MediaKind,
    /// Explicit MIME type; guessed from the filename when unset.
    pub content_type: Option<String>,
    /// Free-text tracking tag stored with the asset.
    pub source: Option<String>,
    /// Album flag used when the upload is also attached. Defaults to true.
    pub captured: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            kind: MediaKind::Image,
            content_type: None,
            source: None,
            captured: true,
        }
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn captured(mut self, captured: bool) -> Self {
        self.captured = captured;
        self
    }
}

/// Explicit content type, else a guess from the extension, else
/// [`FALLBACK_CONTENT_TYPE`].
pub(crate) fn resolve_content_type(explicit: Option<&str>, filename: &str) -> String {
    explicit
        .map(str::to_owned)
        .or_else(|| mime_guess::from_path(filename).first_raw().map(str::to_owned))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned())
}

/// Prefix `filename` with a random hex token so concurrent uploads of the
/// same name land on different storage objects.
pub(crate) fn unique_filename(filename: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}_{filename}", &token[..UNIQUE_PREFIX_LEN])
}

/// Final path component of an upload source.
pub(crate) fn source_filename(path: &Path) -> Result<String, Error> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::Io(format!("{} has no usable file name", path.display())))
}

/// What to send for one upload: the storage filename and content type.
#[derive(Debug, Clone)]
pub(crate) struct UploadPlan {
    pub(crate) storage_name: String,
    pub(crate) content_type: String,
}

impl UploadPlan {
    pub(crate) fn new(filename: &str, options: &UploadOptions) -> Self {
        Self {
            storage_name: unique_filename(filename),
            content_type: resolve_content_type(options.content_type.as_deref(), filename),
        }
    }

    /// Registration request for the stored bytes.
    pub(crate) fn create_request(file_url: &str, options: &UploadOptions) -> CreateMedia {
        let request = CreateMedia::new(file_url, options.kind);
        match &options.source {
            Some(source) => request.source(source.clone()),
            None => request,
        }
    }
}

pub(crate) fn upload_result(
    media: MediaAsset,
    file_url: String,
    album_id: Option<String>,
) -> UploadResult {
    UploadResult {
        media_id: media.media_id.clone(),
        url: file_url,
        media,
        album_id,
    }
}

impl MediaResource<'_> {
    /// Upload a local file and register it as a media asset.
    ///
    /// The asset is not attached to any album.
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let path = path.as_ref();
        let filename = source_filename(path)?;
        let content = tokio::fs::read(path).await?;
        self.upload_bytes(content, Some(&filename), options).await
    }

    /// Upload an in-memory buffer and register it as a media asset.
    ///
    /// `filename` defaults to [`DEFAULT_UPLOAD_FILENAME`] and drives content
    /// type guessing.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), miniapp_client::Error> {
    /// use miniapp_client::{MiniAppClient, UploadOptions};
    ///
    /// let client = MiniAppClient::builder("ma_xxx").base_url("https://api.example").build()?;
    /// let png = std::fs::read("avatar.png")?;
    /// let result = client
    ///     .media()
    ///     .upload_bytes(png, Some("avatar.png"), &UploadOptions::new().source("my-tool"))
    ///     .await?;
    /// println!("{} -> {}", result.media_id, result.url);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_bytes(
        &self,
        content: impl Into<Bytes>,
        filename: Option<&str>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let (media, file_url) = self
            .store_and_register(content.into(), filename, options)
            .await?;
        Ok(upload_result(media, file_url, None))
    }

    /// Upload a local file, register it, and attach it to a character's album.
    pub async fn upload_to_album(
        &self,
        character_id: &str,
        path: impl AsRef<Path>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let path = path.as_ref();
        let filename = source_filename(path)?;
        let content = tokio::fs::read(path).await?;
        self.upload_bytes_to_album(character_id, content, Some(&filename), options)
            .await
    }

    /// Upload an in-memory buffer, register it, and attach it to a
    /// character's album.
    pub async fn upload_bytes_to_album(
        &self,
        character_id: &str,
        content: impl Into<Bytes>,
        filename: Option<&str>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let (media, file_url) = self
            .store_and_register(content.into(), filename, options)
            .await?;
        let entry = self
            .add_to_album(character_id, &media.media_id, options.captured)
            .await?;
        Ok(upload_result(media, file_url, Some(entry.album_id)))
    }

    async fn store_and_register(
        &self,
        content: Bytes,
        filename: Option<&str>,
        options: &UploadOptions,
    ) -> Result<(MediaAsset, String), Error> {
        let filename = filename.unwrap_or(DEFAULT_UPLOAD_FILENAME);
        let plan = UploadPlan::new(filename, options);

        let presigned = self.presign_upload(options.kind, &plan.storage_name).await?;
        self.transport
            .put_raw(&presigned.presigned_url, content, &plan.content_type)
            .await?;
        debug!(file_url = %presigned.file_url, "bytes stored, registering media");

        let media = self
            .create(&UploadPlan::create_request(&presigned.file_url, options))
            .await?;
        Ok((media, presigned.file_url))
    }
}
