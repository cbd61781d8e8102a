//! Creation assets.

use miniapp_core::{CreationAsset, CreationAssetPage};

use crate::error::Error;
use crate::pager::Paginated;
use crate::transport::Transport;
use crate::wire::{self, AssetQuery};

/// Creation asset resource.
///
/// Obtained from [`MiniAppClient::assets`](crate::MiniAppClient::assets).
#[derive(Clone, Copy)]
pub struct AssetsResource<'a> {
    transport: &'a dyn Transport,
}

impl<'a> AssetsResource<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Fetch one page of creation assets, newest first.
    ///
    /// The page's `total` is the number of items in this page.
    pub async fn list(&self, query: &AssetQuery) -> Result<CreationAssetPage, Error> {
        let body = wire::assets_list_body(query)?;
        let payload = self.transport.post(wire::ASSETS_LIST, &body).await?;
        wire::parse_asset_page(payload)
    }

    /// Stream every creation asset, optionally filtered by type.
    pub fn iter(&self, page_size: u32, asset_type: Option<&str>) -> Paginated<'a, CreationAsset> {
        let resource = *self;
        let asset_type = asset_type.map(str::to_owned);
        Paginated::new(move |cursor: Option<String>| {
            let query = AssetQuery {
                limit: page_size,
                cursor,
                asset_type: asset_type.clone(),
            };
            async move { resource.list(&query).await }
        })
    }

    /// Collect every creation asset into memory.
    pub async fn get_all(&self, asset_type: Option<&str>) -> Result<Vec<CreationAsset>, Error> {
        self.iter(wire::DEFAULT_ITER_PAGE_SIZE, asset_type)
            .collect_all()
            .await
    }

    /// Distinct asset type tags currently in use, in no particular order.
    pub async fn types(&self) -> Result<Vec<String>, Error> {
        let payload = self.transport.get(wire::ASSETS_TYPES).await?;
        wire::parse_types(payload)
    }
}
