use serde::{Deserialize, Deserializer, Serialize};

use crate::asset::CreationAsset;
use crate::media::AlbumItem;

/// Continuation info returned alongside a page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub has_more: bool,
}

/// A `hasMore` of `null` reads as the last page.
fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// One page of a cursor-paginated listing, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Opaque token for the next page. Present only when more data exists.
    pub cursor: Option<String>,
    pub has_more: bool,
    /// Item count of this page as reported by listings that send it; equals
    /// `items.len()`, not a count across pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// A page of album items.
pub type AlbumPage = Page<AlbumItem>;

/// A page of creation assets.
pub type CreationAssetPage = Page<CreationAsset>;

impl<T> Page<T> {
    /// Assemble a page from its items and the `next` block of a response.
    pub fn from_parts(items: Vec<T>, next: Option<PageCursor>, total: Option<u64>) -> Self {
        let next = next.unwrap_or_default();
        Self {
            items,
            cursor: next.cursor,
            has_more: next.has_more,
            total,
        }
    }

    /// Cursor to request the following page, or `None` if this is the last.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_more {
            self.cursor.as_deref()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
