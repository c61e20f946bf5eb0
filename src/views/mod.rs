//! Text renderers for each page of the admin.
//!
//! Renderers are pure: they take already loaded data and return the text to
//! print. Loading goes through [`load_page`] so list pages share the query
//! cache and, in long-lived sessions, warm the following page.

pub mod dashboard;
pub mod home;
pub mod items;
pub mod sensors;
pub mod table;
pub mod upload;
pub mod users;

use std::future::Future;

use crate::{
    client::ApiError,
    models::{ItemsPublic, SensorDataListPublic, UsersPublic},
    query::{Pager, QueryCache, QueryKey},
};

/// A list response holding one page of rows.
pub trait Paged {
    fn rows(&self) -> usize;
}

impl Paged for SensorDataListPublic {
    fn rows(&self) -> usize {
        self.data.len()
    }
}

impl Paged for ItemsPublic {
    fn rows(&self) -> usize {
        self.data.len()
    }
}

impl Paged for UsersPublic {
    fn rows(&self) -> usize {
        self.data.len()
    }
}

/// Read one page through the cache.
///
/// With `prefetch_next` set and a full page, the next page is fetched in the
/// background. Only callers that keep `cache` around should ask for it; a
/// one-shot command exits before the result could be read.
pub async fn load_page<T, F, Fut>(
    cache: &QueryCache,
    key: fn(Pager) -> QueryKey,
    pager: Pager,
    prefetch_next: bool,
    fetch: F,
) -> Result<T, ApiError>
where
    T: Paged + Clone + Send + Sync + 'static,
    F: Fn(Pager) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    let page = cache.fetch_query(&key(pager), || fetch(pager)).await?;

    if prefetch_next && pager.has_next_page(page.rows(), false) {
        let cache = cache.clone();
        let next = pager.next();
        tokio::spawn(async move {
            cache.prefetch_query(&key(next), move || fetch(next)).await;
        });
    }

    Ok(page)
}
