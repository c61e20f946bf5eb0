use std::time::Duration;

use thiserror::Error;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tracing::{debug, info};

use super::filter::DashboardFilter;
use crate::{
    client::{ApiClient, ApiError},
    forms::FieldErrors,
    models::{BarChartDashboard, LineChartDashboard, OptionList},
    query::{keys, Pager, QueryCache},
};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("invalid filter: {0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One rendered state of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filter: DashboardFilter,
    pub data: BarChartDashboard,
    /// `data` belongs to an earlier filter and is shown while the current
    /// one loads.
    pub is_placeholder: bool,
    pub pager: Pager,
}

impl DashboardView {
    pub fn has_next_page(&self) -> bool {
        self.pager
            .has_next_page(self.data.data.len(), self.is_placeholder)
    }

    pub fn has_previous_page(&self) -> bool {
        self.pager.has_previous_page()
    }
}

/// Owns the dashboard filter and keeps the bar-chart cache warm.
///
/// Filter edits are published on a watch channel. A background task waits
/// until edits stop for the debounce period, then prefetches the result for
/// the latest filter and, when that page is full, the page after it.
/// [`load`](Self::load) also warms the following page of a full result.
/// Background work is aborted when the controller is dropped.
pub struct DashboardController {
    client: ApiClient,
    cache: QueryCache,
    page_size: u64,
    state: watch::Sender<DashboardFilter>,
    last_shown: Mutex<Option<BarChartDashboard>>,
    prefetcher: JoinHandle<()>,
    next_page_prefetch: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardController {
    pub fn new(client: ApiClient, cache: QueryCache, page_size: u64, debounce: Duration) -> Self {
        let (state, rx) = watch::channel(DashboardFilter::default());
        let prefetcher = tokio::spawn(
            Prefetcher {
                client: client.clone(),
                cache: cache.clone(),
                page_size,
                debounce,
                rx,
            }
            .run(),
        );

        Self {
            client,
            cache,
            page_size,
            state,
            last_shown: Mutex::new(None),
            prefetcher,
            next_page_prefetch: Mutex::new(None),
        }
    }

    pub fn filter(&self) -> DashboardFilter {
        self.state.borrow().clone()
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Replace the whole filter.
    pub fn set_filter(&self, filter: DashboardFilter) {
        self.state.send_replace(filter);
    }

    /// Edit the filter in place. Any change other than the page itself
    /// returns to the first page.
    pub fn update(&self, edit: impl FnOnce(&mut DashboardFilter)) {
        self.state.send_modify(|filter| {
            let page = filter.page;
            let before = DashboardFilter {
                page: 0,
                ..filter.clone()
            };
            edit(filter);
            let after = DashboardFilter {
                page: 0,
                ..filter.clone()
            };
            if before != after && filter.page == page {
                filter.page = 0;
            }
        });
    }

    pub fn next_page(&self) {
        self.state
            .send_modify(|filter| filter.page = filter.page.saturating_add(1));
    }

    pub fn previous_page(&self) {
        self.state
            .send_modify(|filter| filter.page = filter.page.saturating_sub(1));
    }

    /// Fetch, or serve from cache, the chart for the current filter.
    pub async fn load(&self) -> Result<DashboardView, DashboardError> {
        let filter = self.filter();
        filter.validate().map_err(DashboardError::Invalid)?;

        let key = filter.query_key(self.page_size);
        let fetch = filter.to_fetch(self.page_size);
        let client = self.client.clone();
        let data = self
            .cache
            .fetch_query(&key, || async move {
                client.sensor_data().read_dashboard_bar_chart(&fetch).await
            })
            .await?;

        *self.last_shown.lock().await = Some(data.clone());
        let view = self.view(filter, data, false);
        if view.has_next_page() {
            self.warm_next_page(&view.filter).await;
        }
        Ok(view)
    }

    /// Prefetch the page after `filter` in the background, replacing any
    /// earlier next-page prefetch still in flight.
    async fn warm_next_page(&self, filter: &DashboardFilter) {
        let next = filter.next_page();
        let (client, cache, page_size) = (self.client.clone(), self.cache.clone(), self.page_size);
        let handle = tokio::spawn(async move {
            prefetch(&client, &cache, page_size, &next).await;
        });
        if let Some(previous) = self.next_page_prefetch.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// What can be shown right now without a request: the cached result for
    /// the current filter, else the last loaded result as a placeholder.
    pub async fn snapshot(&self) -> Option<DashboardView> {
        let filter = self.filter();
        let key = filter.query_key(self.page_size);
        if let Some(data) = self.cache.get_query_data::<BarChartDashboard>(&key).await {
            return Some(self.view(filter, data, false));
        }
        let last = self.last_shown.lock().await.clone()?;
        Some(self.view(filter, last, true))
    }

    pub async fn equipment_options(&self) -> Result<OptionList, ApiError> {
        let client = self.client.clone();
        self.cache
            .fetch_query(&keys::equipment_options(), || async move {
                client.sensor_data().read_equipment_options().await
            })
            .await
    }

    /// Hourly averages of the last day, read through the cache.
    pub async fn hourly_averages(&self) -> Result<LineChartDashboard, ApiError> {
        let client = self.client.clone();
        self.cache
            .fetch_query(&keys::line_chart(), || async move {
                client.sensor_data().read_dashboard_line_chart().await
            })
            .await
    }

    fn view(&self, filter: DashboardFilter, data: BarChartDashboard, is_placeholder: bool) -> DashboardView {
        let pager = filter.pager(self.page_size);
        DashboardView {
            filter,
            data,
            is_placeholder,
            pager,
        }
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.prefetcher.abort();
        if let Some(handle) = self.next_page_prefetch.get_mut().take() {
            handle.abort();
        }
    }
}

/// Warm the cache for `filter` and return whether its page came back full.
async fn prefetch(
    client: &ApiClient,
    cache: &QueryCache,
    page_size: u64,
    filter: &DashboardFilter,
) -> bool {
    let key = filter.query_key(page_size);
    let fetch = filter.to_fetch(page_size);
    let client = client.clone();
    debug!(key = %key, "Prefetching dashboard");
    cache
        .prefetch_query(&key, || async move {
            client.sensor_data().read_dashboard_bar_chart(&fetch).await
        })
        .await;

    cache
        .get_query_data::<BarChartDashboard>(&key)
        .await
        .is_some_and(|data| filter.pager(page_size).has_next_page(data.data.len(), false))
}

struct Prefetcher {
    client: ApiClient,
    cache: QueryCache,
    page_size: u64,
    debounce: Duration,
    rx: watch::Receiver<DashboardFilter>,
}

impl Prefetcher {
    async fn run(mut self) {
        info!(debounce_ms = self.debounce.as_millis() as u64, "Dashboard prefetcher started");

        while self.rx.changed().await.is_ok() {
            // Restart the quiet period on every further edit.
            loop {
                match time::timeout(self.debounce, self.rx.changed()).await {
                    Ok(Ok(())) => continue,
                    Ok(Err(_)) => return,
                    Err(_) => break,
                }
            }

            let filter = self.rx.borrow_and_update().clone();
            if let Err(errors) = filter.validate() {
                debug!(%errors, "Skipping prefetch for invalid filter");
                continue;
            }

            if prefetch(&self.client, &self.cache, self.page_size, &filter).await {
                prefetch(&self.client, &self.cache, self.page_size, &filter.next_page()).await;
            }
        }

        debug!("Dashboard prefetcher stopped");
    }
}
