//! Create a record and prepend it to the collection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collection::{Collection, CollectionStatus};
use crate::connector::{noop_reporter, CreateConnector, ErrorReporter, Record};
use crate::error::ActionError;
use crate::item::{Item, ItemId, ItemStatus};

/// Creates one record through the injected connector and prepends the result
/// to the collection.
///
/// Pessimistic by default: nothing is visible until the connector resolves.
/// With [`optimistic`](Self::optimistic) enabled, a placeholder carrying the
/// unknown-id sentinel appears (and `count` grows) before the call, then is
/// confirmed in place on success or removed on failure.
///
/// At most one placeholder may be in flight per collection; overlapping
/// optimistic creates are the caller's to avoid.
#[derive(Clone)]
pub struct CreateOne {
    connector: Arc<dyn CreateConnector>,
    on_error: ErrorReporter,
    optimistic: bool,
}

impl CreateOne {
    pub fn new(connector: impl CreateConnector + 'static) -> Self {
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

    /// Applies the new item speculatively before the connector confirms.
    pub fn optimistic(mut self) -> Self {
        self.optimistic = true;
        self
    }

    /// Runs the action against `collection` with the given request body.
    ///
    /// Returns the created record as the connector reported it. On failure
    /// the error lands in the collection error log, the collection status
    /// flips to `Errored`, the reporter fires, and the same error is
    /// returned.
    pub async fn run(&self, collection: &Collection, body: Record) -> Result<Record, ActionError> {
        debug!(optimistic = self.optimistic, "create_one dispatched");
        let params = {
            let mut state = collection.lock();
            if self.optimistic {
                state.items.insert(
                    0,
                    Item {
                        id: ItemId::unknown(),
                        status: ItemStatus::Creating,
                        data: body.clone(),
                        errors: Vec::new(),
                    },
                );
                state.count += 1;
            }
            state.params.clone()
        };

        match self.connector.create(&params, &body).await {
            Ok(record) => {
                let id = ItemId::of(&record);
                let mut state = collection.lock();
                if self.optimistic {
                    // Confirm the placeholder in place, keyed on the sentinel.
                    if let Some(placeholder) =
                        state.items.iter_mut().find(|item| item.id.is_unknown())
                    {
                        placeholder.id = id.clone();
                        placeholder.data = record.clone();
                        placeholder.status = ItemStatus::Ready;
                    }
                } else {
                    state.items.insert(0, Item::from_record(&record, ItemStatus::Ready));
                    state.count += 1;
                }
                drop(state);
                info!(%id, "created");
                Ok(record)
            }
            Err(e) => {
                let error = ActionError::from(e);
                let mut state = collection.lock();
                if self.optimistic {
                    if let Some(pos) = state.items.iter().position(|item| item.id.is_unknown()) {
                        state.items.remove(pos);
                        state.count = state.count.saturating_sub(1);
                    }
                }
                state.status = CollectionStatus::Errored;
                state.errors.push(error.clone());
                drop(state);
                warn!(error = %error, "create_one failed");
                (self.on_error)(&error);
                Err(error)
            }
        }
    }
}
