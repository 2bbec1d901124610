//! # List Store
//!
//! > **Generic CRUD actions for a client-side collection cache.**
//!
//! This crate coordinates six operations — create, single-item refresh, full
//! reload, infinite-scroll append, page load, and patch — over a shared
//! in-memory collection of backend records. The interesting part is not the
//! I/O (the injected connectors own that) but the **state-transition and
//! reconciliation protocol** every operation follows: how status flags move
//! between in-progress, ready, and errored; how optimistic writes are applied
//! speculatively and rolled back atomically on failure; how pagination
//! bookkeeping stays consistent with what the backend returned; and how
//! failures land in scoped error logs, an external reporter, and the caller's
//! `Result` all at once.
//!
//! ## 🏗️ Design
//!
//! ### Explicit dependency injection
//!
//! Every action is a small behavior struct built from its connector, an
//! optional error reporter, and configuration, then bound to a [`Collection`]
//! at invocation time. There is no ambient store and no global registry: the
//! same action can drive many collections, and a test can hand it a scripted
//! [`mock::MockConnector`] instead of a live backend.
//!
//! ### Optimistic vs. pessimistic writes
//!
//! [`CreateOne`] and [`PatchOne`] support both protocols. Pessimistic runs
//! touch state only after the backend confirms. Optimistic runs mutate state
//! synchronously before the connector call — a placeholder item with the
//! unknown-id sentinel, or a shallow-merged patch — and roll the mutation
//! back completely when the connector fails.
//!
//! ### Concurrency model
//!
//! The collection lives behind `Arc<Mutex<_>>`. Actions take the lock only
//! for their synchronous mutation phases and never across a connector await,
//! so each phase is atomic while independent operations interleave freely at
//! await points. Nothing serializes two identity-conflicting mutations; that
//! discipline stays with the caller, as documented on [`Collection`].
//!
//! ### Errors are never swallowed
//!
//! Every failure is stored at the narrowest applicable scope (item log when
//! an item context exists, collection log otherwise), flips that scope's
//! status to errored, fires the reporter, and comes back through the
//! returned `Result` unchanged. See [`error`] for the taxonomy.
//!
//! ## 🗺️ Module Tour
//!
//! - [`collection`] — [`CollectionState`] (items, count, status, query and
//!   paging fields) and the shared [`Collection`] handle.
//! - [`item`] — [`Item`], [`ItemId`] with its unknown-id sentinel, and the
//!   per-item status machine.
//! - [`connector`] — the four capability traits actions depend on, plus
//!   [`Record`]/[`Page`]/[`PageQuery`] and the [`ErrorReporter`] hook.
//! - [`actions`] — [`CreateOne`], [`GetOne`], [`Load`], [`LoadMore`],
//!   [`LoadPage`], [`PatchOne`].
//! - [`error`] — [`ActionError`] and [`ConnectorError`].
//! - [`mock`] — scripted connector for tests, with an optional gate for
//!   observing in-flight state.
//! - [`tracing`](crate::tracing) — subscriber bootstrap for hosts that want
//!   the built-in structured logging visible.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use list_store::mock::MockConnector;
//! use list_store::{record, Collection, CreateOne, Load, Page};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     // A scripted backend; any CreateConnector/FetchPageConnector works.
//!     let connector = MockConnector::new();
//!     connector.expect_fetch_page().return_ok(Page {
//!         items: vec![record(json!({ "_id": 1, "name": "first" }))],
//!         count: 1,
//!     });
//!     connector
//!         .expect_create()
//!         .return_ok(record(json!({ "_id": 2, "name": "second" })));
//!
//!     let collection = Collection::new();
//!     let load = Load::new(connector.clone());
//!     let create_one = CreateOne::new(connector.clone());
//!
//!     load.run(&collection).await.unwrap();
//!     let created = create_one
//!         .run(&collection, record(json!({ "name": "second" })))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(created["name"], "second");
//!     collection.read(|state| {
//!         // Creations prepend; count tracks the backend total.
//!         assert_eq!(state.items.len(), 2);
//!         assert_eq!(state.items[0].data["name"], "second");
//!         assert_eq!(state.count, 2);
//!     });
//! }
//! ```

pub mod actions;
pub mod collection;
pub mod connector;
pub mod error;
pub mod item;
pub mod mock;
pub mod tracing;

pub use actions::{CreateOne, GetOne, Load, LoadMore, LoadPage, PatchOne};
pub use collection::{Collection, CollectionState, CollectionStatus};
pub use connector::{
    record, ConnectorResult, CreateConnector, ErrorReporter, FetchOneConnector,
    FetchPageConnector, Page, PageQuery, PatchConnector, Record,
};
pub use error::{ActionError, ConnectorError};
pub use item::{Item, ItemId, ItemStatus};
