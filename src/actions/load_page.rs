//! Page-oriented replace: fetch a 1-based page of the collection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{items_from_page, spawn_meta_refresh, GetOne};
use crate::collection::{Collection, CollectionStatus};
use crate::connector::{noop_reporter, ErrorReporter, FetchPageConnector, Page, PageQuery};
use crate::error::ActionError;
use crate::item::ItemId;

/// Replaces the collection with one page of records.
///
/// Pages are 1-based; any requested page `<= 1` is clamped to 1. The window
/// is computed from `items_per_page` for the query alone — the state's
/// offset `skip`/`limit` fields are left for the infinite-scroll actions.
/// After a successful run `num_of_pages` equals `ceil(count /
/// items_per_page)`.
#[derive(Clone)]
pub struct LoadPage {
    connector: Arc<dyn FetchPageConnector>,
    on_error: ErrorReporter,
    meta_first: Option<GetOne>,
}

impl LoadPage {
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

    /// Follows the page load with a per-item detail refresh through
    /// `get_one`.
    pub fn meta_first(mut self, get_one: GetOne) -> Self {
        self.meta_first = Some(get_one);
        self
    }

    /// Runs the action against `collection` for the given 1-based page.
    pub async fn run(&self, collection: &Collection, page_num: u64) -> Result<Page, ActionError> {
        let page_number = page_num.max(1);
        let (params, query) = {
            let mut state = collection.lock();
            state.status = CollectionStatus::Loading;
            state.items.clear();
            let query = PageQuery {
                filter: state.filter.clone(),
                select: state.select.clone(),
                sort: state.sort.clone(),
                skip: state.items_per_page * (page_number - 1),
                limit: state.items_per_page,
            };
            (state.params.clone(), query)
        };
        debug!(page = page_number, skip = query.skip, limit = query.limit, "load_page dispatched");

        match self.connector.fetch_page(&params, &query).await {
            Ok(page) => {
                let ids = {
                    let mut state = collection.lock();
                    state.items = items_from_page(&page.items, self.meta_first.is_some());
                    state.count = page.count;
                    state.status = CollectionStatus::Ready;
                    state.page_num = page_number;
                    state.num_of_pages = if state.items_per_page == 0 {
                        0
                    } else {
                        page.count.div_ceil(state.items_per_page)
                    };
                    if self.meta_first.is_some() {
                        state.items.iter().map(|item| item.id.clone()).collect()
                    } else {
                        Vec::<ItemId>::new()
                    }
                };
                info!(page = page_number, count = page.count, "page loaded");
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
                warn!(page = page_number, error = %error, "load_page failed");
                (self.on_error)(&error);
                Err(error)
            }
        }
    }
}
