//! The six collection actions.
//!
//! Each action is a small behavior struct: it captures its connector, an
//! optional error reporter, and configuration at construction, and is bound
//! to a [`Collection`](crate::Collection) at invocation time via
//! [`run`](CreateOne::run). All of them follow the same protocol — mutate
//! state synchronously, await the connector, reconcile or roll back, report
//! and return failures unchanged.

mod create_one;
mod get_one;
mod load;
mod load_more;
mod load_page;
mod patch_one;

pub use create_one::CreateOne;
pub use get_one::GetOne;
pub use load::Load;
pub use load_more::LoadMore;
pub use load_page::LoadPage;
pub use patch_one::PatchOne;

use crate::collection::Collection;
use crate::item::{Item, ItemId, ItemStatus};
use crate::connector::Record;

/// Maps page records into items: `Loading` when a meta-first refresh will
/// follow, `Ready` otherwise.
fn items_from_page(records: &[Record], meta_first: bool) -> Vec<Item> {
    let status = if meta_first {
        ItemStatus::Loading
    } else {
        ItemStatus::Ready
    };
    records
        .iter()
        .map(|record| Item::from_record(record, status))
        .collect()
}

/// Spawns a fire-and-forget refresh per id, issued in list order. Completion
/// order is whatever the scheduler yields; results are dropped here because
/// `GetOne` already records failures in the item's own error log.
fn spawn_meta_refresh(get_one: &GetOne, collection: &Collection, ids: Vec<ItemId>) {
    for id in ids {
        let get_one = get_one.clone();
        let collection = collection.clone();
        tokio::spawn(async move {
            let _ = get_one.run(&collection, &id).await;
        });
    }
}
