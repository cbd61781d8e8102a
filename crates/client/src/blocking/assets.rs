use miniapp_core::{CreationAsset, CreationAssetPage};

use super::BlockingTransport;
use crate::error::Error;
use crate::pager::PageIter;
use crate::wire::{self, AssetQuery};

/// Blocking creation asset resource.
#[derive(Clone, Copy)]
pub struct AssetsResource<'a> {
    transport: &'a dyn BlockingTransport,
}

impl<'a> AssetsResource<'a> {
    pub fn new(transport: &'a dyn BlockingTransport) -> Self {
        Self { transport }
    }

    pub fn list(&self, query: &AssetQuery) -> Result<CreationAssetPage, Error> {
        let body = wire::assets_list_body(query)?;
        let payload = self.transport.post(wire::ASSETS_LIST, &body)?;
        wire::parse_asset_page(payload)
    }

    pub fn iter(&self, page_size: u32, asset_type: Option<&str>) -> PageIter<'a, CreationAsset> {
        let resource = *self;
        let asset_type = asset_type.map(str::to_owned);
        PageIter::new(move |cursor: Option<&str>| {
            resource.list(&AssetQuery {
                limit: page_size,
                cursor: cursor.map(str::to_owned),
                asset_type: asset_type.clone(),
            })
        })
    }

    pub fn get_all(&self, asset_type: Option<&str>) -> Result<Vec<CreationAsset>, Error> {
        self.iter(wire::DEFAULT_ITER_PAGE_SIZE, asset_type).collect()
    }

    pub fn types(&self) -> Result<Vec<String>, Error> {
        let payload = self.transport.get(wire::ASSETS_TYPES)?;
        wire::parse_types(payload)
    }
}
