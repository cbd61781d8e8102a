//! Request bodies, endpoint paths, and payload parsers.
//!
//! Shared by the async and blocking resources so that both modes put the
//! same bytes on the wire and read responses the same way.

use miniapp_core::{
    AlbumEntry, AlbumItem, AlbumPage, CharacterItem, CreationAsset, CreationAssetPage,
    MediaAsset, MediaKind, Page, PageCursor, PresignedUpload,
};
use serde::Serialize;
use serde_json::Value;

use crate::envelope::{Payload, from_payload, take_field, take_optional};
use crate::error::Error;

pub(crate) const CHARACTER_BLUEPRINT: &str = "/miniapp/character/blueprint";
pub(crate) const CHARACTER_BLUEPRINT_STATE: &str = "/miniapp/character/blueprint/state";
pub(crate) const MEDIA_CREATE: &str = "/miniapp/media/create";
pub(crate) const MEDIA_ALBUM_ADD: &str = "/miniapp/media/album/add";
pub(crate) const MEDIA_ALBUM_LIST: &str = "/miniapp/media/album/list";
pub(crate) const ASSETS_LIST: &str = "/miniapp/assets/list";
pub(crate) const ASSETS_TYPES: &str = "/miniapp/assets/types";
pub(crate) const FILES_PRESIGN_UPLOAD: &str = "/miniapp/files/presign/upload";

/// Default number of items requested by a single list call.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Default page size used when iterating a whole listing.
pub const DEFAULT_ITER_PAGE_SIZE: u32 = 50;

/// Request to register an already-hosted URL as a media asset.
///
/// Per-kind metadata is optional: dimensions apply to images and video,
/// duration to video and audio, the thumbnail to video only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedia {
    /// HTTP/HTTPS URL of the media to import.
    pub url: String,
    pub kind: MediaKind,
    /// Free-text tracking tag (e.g. the name of the calling tool).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl CreateMedia {
    pub fn new(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            kind,
            source: None,
            width: None,
            height: None,
            duration_ms: None,
            thumbnail_url: None,
        }
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    #[must_use]
    pub fn thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }
}

/// Parameters for listing creation assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetQuery {
    /// Items per page (1-100).
    pub limit: u32,
    /// Cursor from a previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Only return assets with this type tag.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

impl Default for AssetQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            cursor: None,
            asset_type: None,
        }
    }
}

impl AssetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn asset_type(mut self, asset_type: impl Into<String>) -> Self {
        self.asset_type = Some(asset_type.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CharacterRef<'a> {
    character_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlbumAdd<'a> {
    character_id: &'a str,
    media_id: &'a str,
    captured: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlbumList<'a> {
    character_id: &'a str,
    seek: Seek<'a>,
}

#[derive(Serialize)]
struct Seek<'a> {
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Presign<'a> {
    file_type: MediaKind,
    filename: &'a str,
}

fn to_body<T: Serialize>(body: &T) -> Result<Value, Error> {
    serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))
}

pub(crate) fn blueprint_body(character_id: &str) -> Result<Value, Error> {
    to_body(&CharacterRef { character_id })
}

pub(crate) fn create_media_body(request: &CreateMedia) -> Result<Value, Error> {
    to_body(request)
}

pub(crate) fn album_add_body(
    character_id: &str,
    media_id: &str,
    captured: bool,
) -> Result<Value, Error> {
    to_body(&AlbumAdd {
        character_id,
        media_id,
        captured,
    })
}

pub(crate) fn album_list_body(
    character_id: &str,
    limit: u32,
    cursor: Option<&str>,
) -> Result<Value, Error> {
    to_body(&AlbumList {
        character_id,
        seek: Seek { limit, cursor },
    })
}

pub(crate) fn assets_list_body(query: &AssetQuery) -> Result<Value, Error> {
    to_body(query)
}

pub(crate) fn presign_body(kind: MediaKind, filename: &str) -> Result<Value, Error> {
    to_body(&Presign {
        file_type: kind,
        filename,
    })
}

pub(crate) fn parse_character(mut payload: Payload) -> Result<CharacterItem, Error> {
    take_field(&mut payload, "character")
}

pub(crate) fn parse_media(mut payload: Payload) -> Result<MediaAsset, Error> {
    take_field(&mut payload, "media")
}

pub(crate) fn parse_album_entry(payload: Payload) -> Result<AlbumEntry, Error> {
    from_payload(payload)
}

pub(crate) fn parse_presigned(payload: Payload) -> Result<PresignedUpload, Error> {
    from_payload(payload)
}

pub(crate) fn parse_album_page(mut payload: Payload) -> Result<AlbumPage, Error> {
    let items: Vec<AlbumItem> = take_optional(&mut payload, "items")?.unwrap_or_default();
    let next: Option<PageCursor> = take_optional(&mut payload, "next")?;
    Ok(Page::from_parts(items, next, None))
}

pub(crate) fn parse_asset_page(mut payload: Payload) -> Result<CreationAssetPage, Error> {
    let items: Vec<CreationAsset> = take_optional(&mut payload, "items")?.unwrap_or_default();
    let next: Option<PageCursor> = take_optional(&mut payload, "next")?;
    let total: u64 = take_optional(&mut payload, "total")?.unwrap_or(0);
    Ok(Page::from_parts(items, next, Some(total)))
}

pub(crate) fn parse_types(mut payload: Payload) -> Result<Vec<String>, Error> {
    Ok(take_optional(&mut payload, "types")?.unwrap_or_default())
}
