//! Data model for the Pika MiniApp character blueprint API.
//!
//! Every type here is a plain value received from or sent to the service.
//! Wire field names are camelCase; the Rust side uses snake_case throughout.

pub mod asset;
pub mod character;
pub mod error;
pub mod media;
pub mod page;

pub use asset::CreationAsset;
pub use character::{
    BlueprintPatch, BlueprintSection, BlueprintState, CharacterItem, CharacterProfile,
    IdentityCard,
};
pub use error::ModelError;
pub use media::{
    AlbumEntry, AlbumItem, AudioPayload, ImagePayload, MediaAsset, MediaKind, MediaPayload,
    PresignedUpload, UploadResult, VideoPayload,
};
pub use page::{AlbumPage, CreationAssetPage, Page, PageCursor};

use chrono::{DateTime, Utc};

/// Convert a service timestamp (epoch milliseconds) into a UTC datetime.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn timestamp_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
