//! Infinite-scroll append: fetch the window after the current items.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{items_from_page, spawn_meta_refresh, GetOne};
use crate::collection::{Collection, CollectionStatus};
use crate::connector::{noop_reporter, ErrorReporter, FetchPageConnector, Page};
use crate::error::ActionError;
use crate::item::ItemId;

/// Appends the next window of records to the collection.
///
/// When the backend total is already covered (`count <= items.len()`) the run
/// resolves to `Ok(None)` without touching state or the connector. Otherwise
/// `skip` continues exactly where the current list ends. A failed run leaves
/// the mutated `skip` in place; the next successful load supersedes it.
#[derive(Clone)]
pub struct LoadMore {
    connector: Arc<dyn FetchPageConnector>,
    on_error: ErrorReporter,
    meta_first: Option<GetOne>,
}

impl LoadMore {
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

    /// Follows the append with a per-item detail refresh through `get_one`,
    /// scoped to the newly appended items only.
    pub fn meta_first(mut self, get_one: GetOne) -> Self {
        self.meta_first = Some(get_one);
        self
    }

    /// Runs the action against `collection`; `Ok(None)` means there was
    /// nothing more to load.
    pub async fn run(&self, collection: &Collection) -> Result<Option<Page>, ActionError> {
        let (params, query) = {
            let mut state = collection.lock();
            if state.count <= state.items.len() as u64 {
                debug!(count = state.count, "load_more skipped, nothing more to load");
                return Ok(None);
            }
            state.status = CollectionStatus::LoadingMore;
            state.skip = state.items.len() as u64;
            (state.params.clone(), state.window())
        };
        debug!(skip = query.skip, limit = query.limit, "load_more dispatched");

        match self.connector.fetch_page(&params, &query).await {
            Ok(page) => {
                let ids = {
                    let mut state = collection.lock();
                    let mut appended = items_from_page(&page.items, self.meta_first.is_some());
                    let ids = if self.meta_first.is_some() {
                        appended.iter().map(|item| item.id.clone()).collect()
                    } else {
                        Vec::<ItemId>::new()
                    };
                    state.items.append(&mut appended);
                    state.count = page.count;
                    state.status = CollectionStatus::Ready;
                    ids
                };
                info!(appended = page.items.len(), count = page.count, "loaded more");
                if let Some(get_one) = &self.meta_first {
                    spawn_meta_refresh(get_one, collection, ids);
                }
                Ok(Some(page))
            }
            Err(e) => {
                let error = ActionError::from(e);
                let mut state = collection.lock();
                state.status = CollectionStatus::Errored;
                state.errors.push(error.clone());
                drop(state);
                warn!(error = %error, "load_more failed");
                (self.on_error)(&error);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_util::wait_until;
    use super::*;
    use crate::connector::record;
    use crate::item::{Item, ItemStatus};
    use crate::mock::{MockCall, MockConnector};

    fn seeded(count: u64) -> Collection {
        let collection = Collection::new();
        collection.update(|state| {
            state.items = vec![
                Item::from_record(&record(json!({ "_id": 1, "name": "first" })), ItemStatus::Ready),
                Item::from_record(&record(json!({ "_id": 2, "name": "second" })), ItemStatus::Ready),
            ];
            state.count = count;
        });
        collection
    }

    #[tokio::test]
    async fn fully_loaded_collection_is_a_no_op() {
        let connector = MockConnector::new();
        let collection = seeded(2);

        let result = LoadMore::new(connector.clone()).run(&collection).await.unwrap();

        assert_eq!(result, None);
        assert!(connector.calls().is_empty());
        collection.read(|state| {
            assert_eq!(state.status, CollectionStatus::Idle);
            assert_eq!(state.skip, 0);
        });
    }

    #[tokio::test]
    async fn success_appends_after_the_current_window() {
        let connector = MockConnector::new();
        connector.expect_fetch_page().return_ok(Page {
            items: vec![
                record(json!({ "_id": 3, "name": "third" })),
                record(json!({ "_id": 4, "name": "fourth" })),
            ],
            count: 5,
        });
        let collection = seeded(5);

        let page = LoadMore::new(connector.clone())
            .run(&collection)
            .await
            .unwrap()
            .expect("more to load");

        assert_eq!(page.count, 5);
        let query = match connector.last_call().unwrap() {
            MockCall::FetchPage { query, .. } => query,
            other => panic!("unexpected call {other:?}"),
        };
        assert_eq!(query.skip, 2);
        collection.read(|state| {
            assert_eq!(state.items.len(), 4);
            assert_eq!(state.items[0].id, ItemId::from(1));
            assert_eq!(state.items[2].id, ItemId::from(3));
            assert_eq!(state.skip, 2);
            assert_eq!(state.count, 5);
            assert_eq!(state.status, CollectionStatus::Ready);
        });
    }

    #[tokio::test]
    async fn failure_keeps_the_mutated_skip() {
        let connector = MockConnector::new();
        connector.expect_fetch_page().return_err("mocked error");
        let collection = seeded(5);

        let error = LoadMore::new(connector.clone()).run(&collection).await.unwrap_err();

        collection.read(|state| {
            assert_eq!(state.items.len(), 2);
            assert_eq!(state.skip, 2);
            assert_eq!(state.status, CollectionStatus::Errored);
            assert_eq!(state.errors, vec![error.clone()]);
        });
    }

    #[tokio::test]
    async fn meta_first_is_scoped_to_the_appended_items() {
        let pages = MockConnector::new();
        pages.expect_fetch_page().return_ok(Page {
            items: vec![record(json!({ "_id": 3, "name": "third" }))],
            count: 3,
        });
        let details = MockConnector::new();
        details
            .expect_fetch_one()
            .return_ok(record(json!({ "_id": 3, "name": "third", "description": "full" })));
        let collection = seeded(3);

        LoadMore::new(pages.clone())
            .meta_first(GetOne::new(details.clone()))
            .run(&collection)
            .await
            .unwrap();

        collection.read(|state| {
            // Existing items keep their status; only the appended one refreshes.
            assert_eq!(state.items[0].status, ItemStatus::Ready);
            assert_eq!(state.items[2].status, ItemStatus::Loading);
        });

        wait_until(&collection, |state| {
            state.items[2].status == ItemStatus::Ready
        })
        .await;
        collection.read(|state| {
            assert_eq!(state.items[2].data["description"], "full");
        });
        assert_eq!(details.calls().len(), 1);
        details.verify();
    }
}
