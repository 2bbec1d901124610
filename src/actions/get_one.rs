//! Refresh a single item in place from the backend.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::collection::{Collection, CollectionStatus};
use crate::connector::{noop_reporter, ErrorReporter, FetchOneConnector, Record};
use crate::error::ActionError;
use crate::item::{ItemId, ItemStatus};

/// Fetches one record by id and replaces the matching item's data wholesale.
///
/// The id must already be present in the collection: an absent id fails with
/// a not-found error before any connector call, recorded at collection scope
/// (no item context exists for it). Connector failures, by contrast, land in
/// the item's own error log.
///
/// `GetOne` is `Clone` so the load family can spawn it for meta-first detail
/// refreshes.
#[derive(Clone)]
pub struct GetOne {
    connector: Arc<dyn FetchOneConnector>,
    on_error: ErrorReporter,
}

impl GetOne {
    pub fn new(connector: impl FetchOneConnector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            on_error: noop_reporter(),
        }
    }

    /// Installs a reporter invoked once per failed run.
    pub fn on_error(mut self, reporter: impl Fn(&ActionError) + Send + Sync + 'static) -> Self {
        self.on_error = Arc::new(reporter);
        self
    }

    /// Runs the action against `collection` for the given id.
    #[instrument(skip(self, collection))]
    pub async fn run(&self, collection: &Collection, id: &ItemId) -> Result<Record, ActionError> {
        debug!("get_one dispatched");
        let params = {
            let mut state = collection.lock();
            match state.position(id) {
                Some(pos) => {
                    state.items[pos].status = ItemStatus::Loading;
                    state.params.clone()
                }
                None => {
                    let error = ActionError::NotFound(id.clone());
                    state.status = CollectionStatus::Errored;
                    state.errors.push(error.clone());
                    drop(state);
                    warn!(error = %error, "get_one failed");
                    (self.on_error)(&error);
                    return Err(error);
                }
            }
        };

        match self.connector.fetch_one(&params, id).await {
            Ok(record) => {
                let mut state = collection.lock();
                if let Some(item) = state.item_mut(id) {
                    item.data = record.clone();
                    item.status = ItemStatus::Ready;
                }
                drop(state);
                info!("item refreshed");
                Ok(record)
            }
            Err(e) => {
                let error = ActionError::from(e);
                let mut state = collection.lock();
                if let Some(item) = state.item_mut(id) {
                    item.status = ItemStatus::Errored;
                    item.errors.push(error.clone());
                }
                drop(state);
                warn!(error = %error, "get_one failed");
                (self.on_error)(&error);
                Err(error)
            }
        }
    }
}
