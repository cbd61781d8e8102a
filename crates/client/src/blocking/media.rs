use std::path::Path;

use bytes::Bytes;
use miniapp_core::{
    AlbumEntry, AlbumItem, AlbumPage, MediaAsset, MediaKind, PresignedUpload, UploadResult,
};
use tracing::debug;

use super::BlockingTransport;
use crate::error::Error;
use crate::pager::PageIter;
use crate::upload::{DEFAULT_UPLOAD_FILENAME, UploadOptions, UploadPlan, source_filename, upload_result};
use crate::wire::{self, CreateMedia};

/// Blocking media, album and upload resource.
#[derive(Clone, Copy)]
pub struct MediaResource<'a> {
    transport: &'a dyn BlockingTransport,
}

impl<'a> MediaResource<'a> {
    pub fn new(transport: &'a dyn BlockingTransport) -> Self {
        Self { transport }
    }

    /// See [`crate::MediaResource::create`].
    pub fn create(&self, request: &CreateMedia) -> Result<MediaAsset, Error> {
        let body = wire::create_media_body(request)?;
        let payload = self.transport.post(wire::MEDIA_CREATE, &body)?;
        wire::parse_media(payload)
    }

    /// See [`crate::MediaResource::add_to_album`].
    pub fn add_to_album(
        &self,
        character_id: &str,
        media_id: &str,
        captured: bool,
    ) -> Result<AlbumEntry, Error> {
        let body = wire::album_add_body(character_id, media_id, captured)?;
        let payload = self.transport.post(wire::MEDIA_ALBUM_ADD, &body)?;
        wire::parse_album_entry(payload)
    }

    pub fn list_album(
        &self,
        character_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<AlbumPage, Error> {
        let body = wire::album_list_body(character_id, limit, cursor)?;
        let payload = self.transport.post(wire::MEDIA_ALBUM_LIST, &body)?;
        wire::parse_album_page(payload)
    }

    /// Iterate every album item, newest first, `page_size` per request.
    pub fn iter_album(&self, character_id: &str, page_size: u32) -> PageIter<'a, AlbumItem> {
        let resource = *self;
        let character_id = character_id.to_owned();
        PageIter::new(move |cursor| resource.list_album(&character_id, page_size, cursor))
    }

    pub fn get_all_album_items(&self, character_id: &str) -> Result<Vec<AlbumItem>, Error> {
        self.iter_album(character_id, wire::DEFAULT_ITER_PAGE_SIZE)
            .collect()
    }

    /// See [`crate::MediaResource::upload`].
    pub fn upload(
        &self,
        path: impl AsRef<Path>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let path = path.as_ref();
        let filename = source_filename(path)?;
        let content = std::fs::read(path)?;
        self.upload_bytes(content, Some(&filename), options)
    }

    /// See [`crate::MediaResource::upload_bytes`].
    pub fn upload_bytes(
        &self,
        content: impl Into<Bytes>,
        filename: Option<&str>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let (media, file_url) = self.store_and_register(content.into(), filename, options)?;
        Ok(upload_result(media, file_url, None))
    }

    /// See [`crate::MediaResource::upload_to_album`].
    pub fn upload_to_album(
        &self,
        character_id: &str,
        path: impl AsRef<Path>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let path = path.as_ref();
        let filename = source_filename(path)?;
        let content = std::fs::read(path)?;
        self.upload_bytes_to_album(character_id, content, Some(&filename), options)
    }

    /// See [`crate::MediaResource::upload_bytes_to_album`].
    pub fn upload_bytes_to_album(
        &self,
        character_id: &str,
        content: impl Into<Bytes>,
        filename: Option<&str>,
        options: &UploadOptions,
    ) -> Result<UploadResult, Error> {
        let (media, file_url) = self.store_and_register(content.into(), filename, options)?;
        let entry = self.add_to_album(character_id, &media.media_id, options.captured)?;
        Ok(upload_result(media, file_url, Some(entry.album_id)))
    }

    fn store_and_register(
        &self,
        content: Bytes,
        filename: Option<&str>,
        options: &UploadOptions,
    ) -> Result<(MediaAsset, String), Error> {
        let filename = filename.unwrap_or(DEFAULT_UPLOAD_FILENAME);
        let plan = UploadPlan::new(filename, options);

        let presigned = self.presign_upload(options.kind, &plan.storage_name)?;
        self.transport
            .put_raw(&presigned.presigned_url, content, &plan.content_type)?;
        debug!(file_url = %presigned.file_url, "bytes stored, registering media");

        let media = self.create(&UploadPlan::create_request(&presigned.file_url, options))?;
        Ok((media, presigned.file_url))
    }

    fn presign_upload(&self, kind: MediaKind, filename: &str) -> Result<PresignedUpload, Error> {
        debug!(%kind, filename, "requesting presigned upload");
        let body = wire::presign_body(kind, filename)?;
        let payload = self.transport.post(wire::FILES_PRESIGN_UPLOAD, &body)?;
        wire::parse_presigned(payload)
    }
}
