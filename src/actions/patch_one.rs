//! Partial update of a single item.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::collection::{Collection, CollectionStatus};
use crate::connector::{noop_reporter, ErrorReporter, PatchConnector, Record};
use crate::error::ActionError;
use crate::item::{ItemId, ItemStatus};

/// Applies a partial update to one item through the injected connector.
///
/// Pessimistic by default: the item is marked `Patching` until the connector
/// resolves, then the response fields are shallow-merged over its data. With
/// [`optimistic`](Self::optimistic) enabled, the request body is merged
/// immediately (no status change); a failure restores the exact pre-merge
/// data snapshot.
///
/// An id absent from the collection fails with a not-found error before any
/// connector call, recorded at collection scope since no item context exists.
#[derive(Clone)]
pub struct PatchOne {
    connector: Arc<dyn PatchConnector>,
    on_error: ErrorReporter,
    optimistic: bool,
}

impl PatchOne {
    pub fn new(connector: impl PatchConnector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            on_error: noop_reporter(),
            optimistic: false,
        }
    }

    /// Installs a reporter invoked once per failed run, after rollback.
    pub fn on_error(mut self, reporter: impl Fn(&ActionError) + Send + Sync + 'static) -> Self {
        self.on_error = Arc::new(reporter);
        self
    }

    /// Merges the update into local data before the connector confirms.
    pub fn optimistic(mut self) -> Self {
        self.optimistic = true;
        self
    }

    /// Runs the action against `collection` for the given id and partial
    /// body, returning the connector's response.
    #[instrument(skip(self, collection, body))]
    pub async fn run(
        &self,
        collection: &Collection,
        id: &ItemId,
        body: Record,
    ) -> Result<Record, ActionError> {
        debug!(optimistic = self.optimistic, "patch_one dispatched");
        let (params, previous) = {
            let mut state = collection.lock();
            match state.position(id) {
                Some(pos) => {
                    let previous = if self.optimistic {
                        let snapshot = state.items[pos].data.clone();
                        state.items[pos].merge_data(&body);
                        Some(snapshot)
                    } else {
                        state.items[pos].status = ItemStatus::Patching;
                        None
                    };
                    (state.params.clone(), previous)
                }
                None => {
                    let error = ActionError::NotFound(id.clone());
                    state.status = CollectionStatus::Errored;
                    state.errors.push(error.clone());
                    drop(state);
                    warn!(error = %error, "patch_one failed");
                    (self.on_error)(&error);
                    return Err(error);
                }
            }
        };

        match self.connector.patch(&params, id, &body).await {
            Ok(record) => {
                if !self.optimistic {
                    let mut state = collection.lock();
                    if let Some(item) = state.item_mut(id) {
                        item.merge_data(&record);
                        item.status = ItemStatus::Ready;
                    }
                }
                info!("patched");
                Ok(record)
            }
            Err(e) => {
                let error = ActionError::from(e);
                let mut state = collection.lock();
                if let Some(item) = state.item_mut(id) {
                    item.status = ItemStatus::Errored;
                    item.errors.push(error.clone());
                    if let Some(previous) = previous {
                        item.data = previous;
                    }
                }
                drop(state);
                warn!(error = %error, "patch_one failed");
                (self.on_error)(&error);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::connector::record;
    use crate::error::ConnectorError;
    use crate::item::Item;
    use crate::mock::{MockCall, MockConnector};

    fn seeded() -> Collection {
        let collection = Collection::new();
        collection.update(|state| {
            state.params = record(json!({ "param1": "testparam" }));
            state.items = vec![
                Item::from_record(&record(json!({ "_id": 1, "name": "first" })), ItemStatus::Ready),
                Item::from_record(&record(json!({ "_id": 2, "name": "second" })), ItemStatus::Ready),
            ];
            state.count = 2;
        });
        collection
    }

    #[tokio::test]
    async fn unknown_id_fails_before_any_connector_call() {
        let connector = MockConnector::new();
        let collection = seeded();
        let action = PatchOne::new(connector.clone());

        let error = action
            .run(&collection, &ItemId::from(9), record(json!({ "name": "x" })))
            .await
            .unwrap_err();

        assert_eq!(error, ActionError::NotFound(ItemId::from(9)));
        assert!(connector.calls().is_empty());
        collection.read(|state| {
            assert_eq!(state.status, CollectionStatus::Errored);
            assert_eq!(state.errors, vec![error.clone()]);
        });
    }

    #[tokio::test]
    async fn pessimistic_success_merges_the_response() {
        let connector = MockConnector::gated();
        connector
            .expect_patch()
            .return_ok(record(json!({ "description": "from server" })));
        let collection = seeded();
        let action = PatchOne::new(connector.clone());

        let handle = {
            let collection = collection.clone();
            let action = action.clone();
            tokio::spawn(async move {
                action
                    .run(&collection, &ItemId::from(2), record(json!({ "description": "draft" })))
                    .await
            })
        };
        connector.entered().await;

        collection.read(|state| {
            assert_eq!(state.items[1].status, ItemStatus::Patching);
            assert_eq!(state.items[1].data, record(json!({ "_id": 2, "name": "second" })));
        });

        connector.release();
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result, record(json!({ "description": "from server" })));
        assert_eq!(
            connector.last_call(),
            Some(MockCall::Patch {
                params: record(json!({ "param1": "testparam" })),
                id: ItemId::from(2),
                body: record(json!({ "description": "draft" })),
            })
        );
        collection.read(|state| {
            assert_eq!(state.items[1].status, ItemStatus::Ready);
            assert_eq!(
                state.items[1].data,
                record(json!({ "_id": 2, "name": "second", "description": "from server" }))
            );
        });
    }

    #[tokio::test]
    async fn optimistic_success_needs_no_further_mutation() {
        let connector = MockConnector::gated();
        connector
            .expect_patch()
            .return_ok(record(json!({ "name": "renamed" })));
        let collection = seeded();
        let action = PatchOne::new(connector.clone()).optimistic();

        let handle = {
            let collection = collection.clone();
            let action = action.clone();
            tokio::spawn(async move {
                action
                    .run(&collection, &ItemId::from(2), record(json!({ "name": "renamed" })))
                    .await
            })
        };
        connector.entered().await;

        collection.read(|state| {
            // Merged immediately, status untouched.
            assert_eq!(state.items[1].data["name"], "renamed");
            assert_eq!(state.items[1].status, ItemStatus::Ready);
        });

        connector.release();
        handle.await.unwrap().unwrap();
        collection.read(|state| {
            assert_eq!(state.items[1].data, record(json!({ "_id": 2, "name": "renamed" })));
            assert_eq!(state.items[1].status, ItemStatus::Ready);
        });
    }

    #[tokio::test]
    async fn optimistic_failure_restores_the_exact_snapshot() {
        let connector = MockConnector::new();
        connector.expect_patch().return_err("mocked error");
        let collection = seeded();
        let before = collection.read(|state| state.items[1].data.clone());
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = reported.clone();
        let action = PatchOne::new(connector.clone())
            .optimistic()
            .on_error(move |e| sink.lock().unwrap().push(e.clone()));

        let error = action
            .run(&collection, &ItemId::from(2), record(json!({ "name": "renamed" })))
            .await
            .unwrap_err();

        assert_eq!(error, ActionError::Connector(ConnectorError::from("mocked error")));
        collection.read(|state| {
            assert_eq!(state.items[1].data, before);
            assert_eq!(state.items[1].status, ItemStatus::Errored);
            assert_eq!(state.items[1].errors, vec![error.clone()]);
            // The collection itself is untouched.
            assert_eq!(state.status, CollectionStatus::Idle);
            assert!(state.errors.is_empty());
        });
        assert_eq!(reported.lock().unwrap().as_slice(), &[error]);
    }

    #[tokio::test]
    async fn pessimistic_failure_keeps_last_good_data() {
        let connector = MockConnector::new();
        connector.expect_patch().return_err("mocked error");
        let collection = seeded();
        let action = PatchOne::new(connector.clone());

        let error = action
            .run(&collection, &ItemId::from(2), record(json!({ "name": "renamed" })))
            .await
            .unwrap_err();

        collection.read(|state| {
            assert_eq!(state.items[1].data, record(json!({ "_id": 2, "name": "second" })));
            assert_eq!(state.items[1].status, ItemStatus::Errored);
            assert_eq!(state.items[1].errors, vec![error.clone()]);
        });
    }
}
