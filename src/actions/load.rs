//! Full reload of the collection for the current query.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{items_from_page, spawn_meta_refresh, GetOne};
use crate::collection::{Collection, CollectionStatus};
use crate::connector::{noop_reporter, ErrorReporter, FetchPageConnector, Page};
use crate::error::ActionError;
use crate::item::ItemId;

/// Replaces the whole collection with the backend's view of the current
/// query window.
///
/// Existing items are discarded (and `count` zeroed) before the connector is
/// awaited, so a failed reload leaves an empty collection rather than stale
/// rows.
#[derive(Clone)]
pub struct Load {
    connector: Arc<dyn FetchPageConnector>,
    on_error: ErrorReporter,
    meta_first: Option<GetOne>,
}

impl Load {
    pub fn new(connector: impl FetchPageConnector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            on_error: noop_reporter(),
            meta_first: None,
        }
    }

    /// Installs a reporter invoked once per failed run.
    pub fn on_error(mut self, reporter: impl Fn(&ActionError) + Send + Sync + 'static) -> Self {
        self.on_error = Arc::new(reporter);
        self
    }

    /// Follows the bulk load with a per-item detail refresh through
    /// `get_one`. Loaded items start `Loading` instead of `Ready`; refreshes
    /// are issued in list order, fire-and-forget.
    pub fn meta_first(mut self, get_one: GetOne) -> Self {
        self.meta_first = Some(get_one);
        self
    }

    /// Runs the action against `collection`, returning the raw page.
    pub async fn run(&self, collection: &Collection) -> Result<Page, ActionError> {
        let (params, query) = {
            let mut state = collection.lock();
            state.status = CollectionStatus::Loading;
            state.items.clear();
            state.count = 0;
            (state.params.clone(), state.window())
        };
        debug!(skip = query.skip, limit = query.limit, "load dispatched");

        match self.connector.fetch_page(&params, &query).await {
            Ok(page) => {
                let ids = {
                    let mut state = collection.lock();
                    state.items = items_from_page(&page.items, self.meta_first.is_some());
                    state.count = page.count;
                    state.status = CollectionStatus::Ready;
                    if self.meta_first.is_some() {
                        state.items.iter().map(|item| item.id.clone()).collect()
                    } else {
                        Vec::<ItemId>::new()
                    }
                };
                info!(loaded = page.items.len(), count = page.count, "loaded");
                if let Some(get_one) = &self.meta_first {
                    spawn_meta_refresh(get_one, collection, ids);
                }
                Ok(page)
            }
            Err(e) => {
                let error = ActionError::from(e);
                let mut state = collection.lock();
                state.status = CollectionStatus::Errored;
                state.errors.push(error.clone());
                drop(state);
                warn!(error = %error, "load failed");
                (self.on_error)(&error);
                Err(error)
            }
        }
    }
}
