//! # Connector Seams
//!
//! The asynchronous capabilities every action depends on. Connectors are
//! black boxes supplied by the caller per action instance: their transport,
//! retries, and auth are none of the cache's business. Each trait covers one
//! operation kind; a single backend type is free to implement all four.
//!
//! Connectors fail with a [`ConnectorError`], an opaque message the cache
//! stores and forwards without interpretation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ActionError, ConnectorError};
use crate::item::ItemId;

/// Arbitrary payload mapping: item data, request bodies, query parameters.
pub type Record = Map<String, Value>;

/// Result type returned by connector calls.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Builds a [`Record`] from a `serde_json::json!` object literal.
///
/// # Panics
/// Panics when the value is not a JSON object.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Window parameters for an offset-based page fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageQuery {
    pub filter: Record,
    pub select: Record,
    pub sort: Record,
    pub skip: u64,
    pub limit: u64,
}

/// One page of backend records plus the authoritative total for the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<Record>,
    /// Total matching records on the backend, not the size of this page.
    pub count: u64,
}

/// Capability to create one record.
#[async_trait]
pub trait CreateConnector: Send + Sync {
    async fn create(&self, params: &Record, body: &Record) -> ConnectorResult<Record>;
}

/// Capability to fetch one record by id.
#[async_trait]
pub trait FetchOneConnector: Send + Sync {
    async fn fetch_one(&self, params: &Record, id: &ItemId) -> ConnectorResult<Record>;
}

/// Capability to fetch a window of records for the current query.
#[async_trait]
pub trait FetchPageConnector: Send + Sync {
    async fn fetch_page(&self, params: &Record, query: &PageQuery) -> ConnectorResult<Page>;
}

/// Capability to apply a partial update to one record.
#[async_trait]
pub trait PatchConnector: Send + Sync {
    async fn patch(&self, params: &Record, id: &ItemId, body: &Record) -> ConnectorResult<Record>;
}

/// Callback invoked exactly once per failed operation, synchronously, after
/// state rollback/marking and before the error is returned to the caller.
pub type ErrorReporter = Arc<dyn Fn(&ActionError) + Send + Sync>;

pub(crate) fn noop_reporter() -> ErrorReporter {
    Arc::new(|_| {})
}
