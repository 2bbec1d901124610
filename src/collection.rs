//! Collection state: the aggregate a set of actions operates on, and the
//! shared handle actions and callers go through.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::connector::{PageQuery, Record};
use crate::error::ActionError;
use crate::item::{Item, ItemId};

/// Lifecycle status of the collection as a whole.
///
/// `Errored` is not a sticky blocker: the next load-family action resets it
/// to `Loading` on dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionStatus {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Ready,
    Errored,
}

/// Aggregate state for one logical resource list.
///
/// Insertion order of `items` is meaningful: creations prepend, loads
/// replace, [`LoadMore`](crate::actions::LoadMore) appends. `count` is the
/// backend's authoritative total for the current query — under partial loads
/// it exceeds `items.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionState {
    pub items: Vec<Item>,
    pub count: u64,
    pub status: CollectionStatus,
    /// Ordered collection-scoped error log.
    pub errors: Vec<ActionError>,

    /// Identity and route parameters forwarded to every connector call.
    pub params: Record,
    pub filter: Record,
    pub select: Record,
    pub sort: Record,
    pub skip: u64,
    pub limit: u64,

    /// 1-based page most recently committed by a page load.
    pub page_num: u64,
    pub items_per_page: u64,
    /// `ceil(count / items_per_page)`, recomputed after every page load.
    pub num_of_pages: u64,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            status: CollectionStatus::Idle,
            errors: Vec::new(),
            params: Record::new(),
            filter: Record::new(),
            select: Record::new(),
            sort: Record::new(),
            skip: 0,
            limit: 10,
            page_num: 1,
            items_per_page: 10,
            num_of_pages: 0,
        }
    }
}

impl CollectionState {
    /// Offset-based (infinite-scroll) state with default window settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Page-oriented state with the given page size.
    pub fn paged(items_per_page: u64) -> Self {
        Self {
            items_per_page,
            ..Self::default()
        }
    }

    /// Looks up an item by id.
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Looks up an item by id, mutably.
    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    pub(crate) fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// The page window for the current offset query settings.
    pub(crate) fn window(&self) -> PageQuery {
        PageQuery {
            filter: self.filter.clone(),
            select: self.select.clone(),
            sort: self.sort.clone(),
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Shared handle to a [`CollectionState`].
///
/// Actions acquire the lock only for their synchronous mutation phases and
/// never hold it across a connector call, so each phase is atomic while
/// overlapping actions interleave at await points exactly as the scheduler
/// yields. Nothing serializes two identity-conflicting mutations (two patches
/// of the same item, a load racing a load_more); keeping such calls
/// sequential is the caller's responsibility.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    state: Arc<Mutex<CollectionState>>,
}

impl Collection {
    /// A fresh collection with default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a prepared state, e.g. one built with
    /// [`CollectionState::paged`].
    pub fn with_state(state: CollectionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Runs a closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&CollectionState) -> R) -> R {
        f(&self.lock())
    }

    /// Runs a closure against the state with mutable access.
    pub fn update<R>(&self, f: impl FnOnce(&mut CollectionState) -> R) -> R {
        f(&mut self.lock())
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> CollectionState {
        self.lock().clone()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().expect("collection state lock poisoned")
    }
}
