//! Media assets and character albums.
//!
//! The upload pipeline lives in [`crate::upload`] and extends
//! [`MediaResource`] with the `upload*` methods.

use miniapp_core::{AlbumEntry, AlbumItem, AlbumPage, MediaAsset, MediaKind, PresignedUpload};
use tracing::debug;

use crate::error::Error;
use crate::pager::Paginated;
use crate::transport::Transport;
use crate::wire::{self, CreateMedia};

/// Media and album resource.
///
/// Obtained from [`MiniAppClient::media`](crate::MiniAppClient::media).
#[derive(Clone, Copy)]
pub struct MediaResource<'a> {
    pub(crate) transport: &'a dyn Transport,
}

impl<'a> MediaResource<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Register an already-hosted URL as a media asset.
    ///
    /// No bytes are moved; the service imports from `request.url`.
    pub async fn create(&self, request: &CreateMedia) -> Result<MediaAsset, Error> {
        let body = wire::create_media_body(request)?;
        let payload = self.transport.post(wire::MEDIA_CREATE, &body).await?;
        wire::parse_media(payload)
    }

    /// Attach a media asset to a character's album.
    ///
    /// Idempotent: re-adding media already in this album (including a
    /// soft-deleted entry) restores the existing entry. Fails with
    /// [`ApiError::Conflict`](crate::ApiError::Conflict) when the media
    /// belongs to another album.
    pub async fn add_to_album(
        &self,
        character_id: &str,
        media_id: &str,
        captured: bool,
    ) -> Result<AlbumEntry, Error> {
        let body = wire::album_add_body(character_id, media_id, captured)?;
        let payload = self.transport.post(wire::MEDIA_ALBUM_ADD, &body).await?;
        wire::parse_album_entry(payload)
    }

    /// Fetch one page of a character's album, newest first.
    pub async fn list_album(
        &self,
        character_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<AlbumPage, Error> {
        let body = wire::album_list_body(character_id, limit, cursor)?;
        let payload = self.transport.post(wire::MEDIA_ALBUM_LIST, &body).await?;
        wire::parse_album_page(payload)
    }

    /// Stream every album item, fetching `page_size` items per request.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), miniapp_client::Error> {
    /// use futures::TryStreamExt;
    /// use miniapp_client::MiniAppClient;
    ///
    /// let client = MiniAppClient::builder("ma_xxx").base_url("https://api.example").build()?;
    /// let media = client.media();
    /// let mut items = media.iter_album("char-uuid", 50);
    /// while let Some(item) = items.try_next().await? {
    ///     if let Some(asset) = item.media {
    ///         println!("{}", asset.url());
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter_album(&self, character_id: &str, page_size: u32) -> Paginated<'a, AlbumItem> {
        let resource = *self;
        let character_id = character_id.to_owned();
        Paginated::new(move |cursor: Option<String>| {
            let character_id = character_id.clone();
            async move {
                resource
                    .list_album(&character_id, page_size, cursor.as_deref())
                    .await
            }
        })
    }

    /// Collect a whole album into memory.
    ///
    /// Intended for small albums; there is no cap on the number of pages.
    pub async fn get_all_album_items(&self, character_id: &str) -> Result<Vec<AlbumItem>, Error> {
        self.iter_album(character_id, wire::DEFAULT_ITER_PAGE_SIZE)
            .collect_all()
            .await
    }

    pub(crate) async fn presign_upload(
        &self,
        kind: MediaKind,
        filename: &str,
    ) -> Result<PresignedUpload, Error> {
        debug!(%kind, filename, "requesting presigned upload");
        let body = wire::presign_body(kind, filename)?;
        let payload = self
            .transport
            .post(wire::FILES_PRESIGN_UPLOAD, &body)
            .await?;
        wire::parse_presigned(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTransport, image_media};
    use futures::TryStreamExt;
    use serde_json::{Value, json};

    fn album_page(ids: &[&str], next: Option<&str>) -> Value {
        let items: Vec<Value> = ids
            .iter()
            .map(|id| json!({"media": image_media(id, &format!("https://cdn/{id}.png")), "createdAt": 1}))
            .collect();
        let next = next.map(|c| json!({"cursor": c, "hasMore": true}));
        json!({"items": items, "next": next})
    }

    fn media_ids(items: &[AlbumItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| item.media.as_ref().unwrap().media_id.clone())
            .collect()
    }

    #[tokio::test]
    async fn create_registers_url() {
        let transport = RecordingTransport::new().respond(
            wire::MEDIA_CREATE,
            json!({"media": image_media("m-1", "https://cdn/a.png")}),
        );
        let asset = MediaResource::new(&transport)
            .create(&CreateMedia::new("https://cdn/a.png", MediaKind::Image).source("tests"))
            .await
            .unwrap();

        assert_eq!(asset.media_id, "m-1");
        assert_eq!(asset.url(), "https://cdn/a.png");
        assert_eq!(
            transport.last_body(wire::MEDIA_CREATE),
            Some(json!({"url": "https://cdn/a.png", "kind": "image", "source": "tests"}))
        );
    }

    #[tokio::test]
    async fn add_to_album_returns_entry() {
        let transport = RecordingTransport::new()
            .respond(wire::MEDIA_ALBUM_ADD, json!({"albumId": "alb-1"}));
        let entry = MediaResource::new(&transport)
            .add_to_album("char-1", "m-1", false)
            .await
            .unwrap();

        assert_eq!(entry.album_id, "alb-1");
        assert_eq!(
            transport.last_body(wire::MEDIA_ALBUM_ADD).unwrap()["captured"],
            json!(false)
        );
    }

    #[tokio::test]
    async fn add_to_album_conflict() {
        let transport = RecordingTransport::new().envelope(
            wire::MEDIA_ALBUM_ADD,
            json!({"success": false, "error": {"code": "A000409", "message": "owned elsewhere"}}),
        );
        let err = MediaResource::new(&transport)
            .add_to_album("char-1", "m-1", true)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn iter_album_follows_cursors() {
        let transport = RecordingTransport::new()
            .respond(wire::MEDIA_ALBUM_LIST, album_page(&["a", "b"], Some("c1")))
            .respond(wire::MEDIA_ALBUM_LIST, album_page(&["c", "d"], Some("c2")))
            .respond(wire::MEDIA_ALBUM_LIST, album_page(&["e"], None));
        let media = MediaResource::new(&transport);

        let items: Vec<AlbumItem> = media.iter_album("char-1", 2).try_collect().await.unwrap();
        assert_eq!(media_ids(&items), vec!["a", "b", "c", "d", "e"]);

        let seeks: Vec<Value> = transport
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                crate::testing::Call::Post(_, body) => Some(body["seek"].clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            seeks,
            vec![
                json!({"limit": 2}),
                json!({"limit": 2, "cursor": "c1"}),
                json!({"limit": 2, "cursor": "c2"}),
            ]
        );
    }

    #[tokio::test]
    async fn get_all_album_items_uses_default_page_size() {
        let transport = RecordingTransport::new()
            .respond(wire::MEDIA_ALBUM_LIST, album_page(&["a"], None));
        let items = MediaResource::new(&transport)
            .get_all_album_items("char-1")
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(
            transport.last_body(wire::MEDIA_ALBUM_LIST).unwrap()["seek"]["limit"],
            json!(wire::DEFAULT_ITER_PAGE_SIZE)
        );
    }

    #[tokio::test]
    async fn list_album_keeps_deleted_media_as_none() {
        let transport = RecordingTransport::new().respond(
            wire::MEDIA_ALBUM_LIST,
            json!({"items": [{"media": null, "createdAt": 5}], "next": null}),
        );
        let page = MediaResource::new(&transport)
            .list_album("char-1", wire::DEFAULT_PAGE_LIMIT, None)
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert!(page.items[0].media.is_none());
        assert!(!page.has_more);
    }
}
