//! Cursor pagination shared by album and asset listings.
//!
//! [`Pager`] is the mode-independent state machine. [`Paginated`] drives it
//! as an async [`Stream`]; [`PageIter`] drives it as a blocking
//! [`Iterator`]. Both yield items in page order, hold at most one page at a
//! time, and stop for good after the last page or the first error.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, Stream, TryStreamExt};
use miniapp_core::Page;
use tracing::{debug, warn};

use crate::error::Error;

/// Pagination state: either more pages may follow (with the cursor to
/// request them, `None` only before the first page) or the listing is
/// exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pager {
    cursor: Option<String>,
    exhausted: bool,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor for the next fetch.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Record a fetched page and hand back its items.
    ///
    /// A page that claims more data but carries no cursor ends the
    /// traversal; re-requesting without a cursor would restart at page one.
    pub fn advance<T>(&mut self, page: Page<T>) -> Vec<T> {
        match (page.has_more, page.cursor) {
            (true, Some(cursor)) => {
                debug!(items = page.items.len(), %cursor, "page fetched, more available");
                self.cursor = Some(cursor);
            }
            (true, None) => {
                warn!("page reported more results without a cursor; stopping");
                self.finish();
            }
            (false, _) => {
                debug!(items = page.items.len(), "last page fetched");
                self.finish();
            }
        }
        page.items
    }

    /// Move to the terminal state.
    pub fn finish(&mut self) {
        self.cursor = None;
        self.exhausted = true;
    }
}

/// An async stream of items from a paginated listing.
///
/// Created by the `iter_*` methods of the async resources. Single-consumer:
/// it is driven through `&mut self` and cannot be restarted; call the
/// `iter_*` method again for a fresh traversal from the first page.
pub struct Paginated<'a, T> {
    inner: Pin<Box<dyn Stream<Item = Result<T, Error>> + Send + 'a>>,
}

impl<'a, T: Send + 'a> Paginated<'a, T> {
    /// Build a stream that calls `fetch` with each successive cursor.
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> Fut + Send + 'a,
        Fut: Future<Output = Result<Page<T>, Error>> + Send + 'a,
    {
        let pages = stream::try_unfold((Pager::new(), fetch), |(mut pager, mut fetch)| async move {
            if pager.is_exhausted() {
                return Ok::<_, Error>(None);
            }
            let page = fetch(pager.cursor().map(str::to_owned)).await?;
            let items = pager.advance(page);
            Ok(Some((
                stream::iter(items.into_iter().map(Ok::<T, Error>)),
                (pager, fetch),
            )))
        });

        Self {
            inner: Box::pin(pages.try_flatten()),
        }
    }

    /// Drain the stream into a vector, failing on the first error.
    pub async fn collect_all(self) -> Result<Vec<T>, Error> {
        self.try_collect().await
    }
}

impl<T> Stream for Paginated<'_, T> {
    type Item = Result<T, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

type FetchPage<'a, T> = Box<dyn FnMut(Option<&str>) -> Result<Page<T>, Error> + 'a>;

/// A blocking iterator over a paginated listing.
///
/// Created by the `iter_*` methods of the blocking resources. Same contract
/// as [`Paginated`].
pub struct PageIter<'a, T> {
    pager: Pager,
    current: std::vec::IntoIter<T>,
    fetch: FetchPage<'a, T>,
}

impl<'a, T> PageIter<'a, T> {
    /// Build an iterator that calls `fetch` with each successive cursor.
    pub fn new<F>(fetch: F) -> Self
    where
        F: FnMut(Option<&str>) -> Result<Page<T>, Error> + 'a,
    {
        Self {
            pager: Pager::new(),
            current: Vec::new().into_iter(),
            fetch: Box::new(fetch),
        }
    }
}

impl<T> Iterator for PageIter<'_, T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(Ok(item));
            }
            if self.pager.is_exhausted() {
                return None;
            }
            match (self.fetch)(self.pager.cursor()) {
                Ok(page) => self.current = self.pager.advance(page).into_iter(),
                Err(e) => {
                    self.pager.finish();
                    return Some(Err(e));
                }
            }
        }
    }
}
