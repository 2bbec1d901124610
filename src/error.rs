//! # Action Errors
//!
//! Two failure kinds exist in the cache: a locally raised not-found when an
//! operation targets an identifier absent from the collection, and an opaque
//! failure raised by an injected connector. Both travel the same road
//! downstream — stored in the narrowest applicable error log, handed to the
//! error reporter, and returned to the caller unchanged.

use serde::Serialize;

use crate::item::ItemId;

/// Failure raised by an injected connector.
///
/// The cache treats the payload as opaque: it stores it, forwards it to the
/// error reporter, and returns it to the caller exactly as raised. `Display`
/// is the message the connector produced, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{0}")]
pub struct ConnectorError(pub String);

impl From<String> for ConnectorError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ConnectorError {
    fn from(message: &str) -> Self {
        Self(message.to_owned())
    }
}

/// Errors surfaced by collection actions.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ActionError {
    /// The target identifier is absent from the collection. Raised before any
    /// connector call is made.
    #[error("item with id {0} was not found in the collection")]
    NotFound(ItemId),

    /// The injected connector failed; carried through verbatim.
    #[error("{0}")]
    Connector(#[from] ConnectorError),
}
