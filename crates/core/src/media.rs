use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// The kind of a media asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(ModelError::UnknownMediaKind(other.to_owned())),
        }
    }
}

/// Payload of an image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Payload of a video asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPayload {
    pub video_url: String,
    /// Thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Payload of an audio asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Kind-specific media payload. The active variant always matches the
/// asset's [`MediaKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    Image(ImagePayload),
    Video(VideoPayload),
    Audio(AudioPayload),
}

impl MediaPayload {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Video(_) => MediaKind::Video,
            Self::Audio(_) => MediaKind::Audio,
        }
    }

    /// The primary URL of the payload.
    pub fn url(&self) -> &str {
        match self {
            Self::Image(p) => &p.image_url,
            Self::Video(p) => &p.video_url,
            Self::Audio(p) => &p.audio_url,
        }
    }

    /// Decode a raw payload object according to `kind`.
    fn decode(kind: MediaKind, raw: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            MediaKind::Image => Self::Image(serde_json::from_value(raw)?),
            MediaKind::Video => Self::Video(serde_json::from_value(raw)?),
            MediaKind::Audio => Self::Audio(serde_json::from_value(raw)?),
        })
    }

    fn encode(&self) -> Value {
        let encoded = match self {
            Self::Image(p) => serde_json::to_value(p),
            Self::Video(p) => serde_json::to_value(p),
            Self::Audio(p) => serde_json::to_value(p),
        };
        // Plain structs of strings and integers always serialize.
        encoded.unwrap_or(Value::Null)
    }
}

/// A media asset (image, video, or audio).
///
/// On the wire the asset carries a `kind` discriminant next to an untagged
/// `payload`; decoding reads `kind` first and then parses the matching
/// payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMediaAsset", into = "RawMediaAsset")]
pub struct MediaAsset {
    pub media_id: String,
    pub payload: MediaPayload,
    /// Generation prompt.
    pub prompt: Option<String>,
    pub prompt_mentions: Option<Vec<String>>,
    /// Epoch milliseconds.
    pub created_at: Option<i64>,
}

impl MediaAsset {
    pub fn kind(&self) -> MediaKind {
        self.payload.kind()
    }

    pub fn url(&self) -> &str {
        self.payload.url()
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(crate::timestamp_to_utc)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMediaAsset {
    media_id: String,
    kind: MediaKind,
    payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt_mentions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
}

impl TryFrom<RawMediaAsset> for MediaAsset {
    type Error = serde_json::Error;

    fn try_from(raw: RawMediaAsset) -> Result<Self, Self::Error> {
        Ok(Self {
            media_id: raw.media_id,
            payload: MediaPayload::decode(raw.kind, raw.payload)?,
            prompt: raw.prompt,
            prompt_mentions: raw.prompt_mentions,
            created_at: raw.created_at,
        })
    }
}

impl From<MediaAsset> for RawMediaAsset {
    fn from(asset: MediaAsset) -> Self {
        Self {
            media_id: asset.media_id,
            kind: asset.payload.kind(),
            payload: asset.payload.encode(),
            prompt: asset.prompt,
            prompt_mentions: asset.prompt_mentions,
            created_at: asset.created_at,
        }
    }
}

/// An entry in a character's album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumItem {
    /// `None` when the underlying media was deleted or is inaccessible.
    #[serde(default)]
    pub media: Option<MediaAsset>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl AlbumItem {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        crate::timestamp_to_utc(self.created_at)
    }
}

/// Result of adding media to an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumEntry {
    pub album_id: String,
}

/// A short-lived write URL and the permanent URL it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub presigned_url: String,
    pub file_url: String,
}

/// Result of an upload.
///
/// `album_id` is set only when the upload was also attached to an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub media_id: String,
    /// Permanent URL of the stored bytes.
    pub url: String,
    pub media: MediaAsset,
    #[serde(default)]
    pub album_id: Option<String>,
}
