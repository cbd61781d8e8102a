use serde::{Deserialize, Serialize};

use crate::media::MediaAsset;

/// A creation asset (outfit, item, location, style, ...).
///
/// `asset_type` is a free-form tag; the set of tags in use can be queried
/// from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationAsset {
    pub id: String,
    pub media: MediaAsset,
    /// Object-storage key of the asset file.
    pub object_name: String,
    /// Display name.
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Handle of the owner, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
