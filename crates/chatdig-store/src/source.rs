//! The record source seam.

use crate::error::StoreError;
use serde_json::Value;
use std::fmt;

/// The record stores read by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreName {
    Member,
    Chat,
    ChatMessage,
}

impl StoreName {
    pub const ALL: [StoreName; 3] = [StoreName::Member, StoreName::Chat, StoreName::ChatMessage];

    /// Name of the store as the chat client spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreName::Member => "Member",
            StoreName::Chat => "Chat",
            StoreName::ChatMessage => "ChatMessage",
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lazy, order-unspecified sequence of stored values.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Value, StoreError>> + 'a>;

/// A collection of logical databases, each holding the three record stores.
pub trait RecordSource {
    /// Names of every logical database in the source.
    fn databases(&self) -> Result<Vec<String>, StoreError>;

    /// Stream the values of one store. A store with no records yields an
    /// empty sequence.
    fn records(&self, db: &str, store: StoreName) -> Result<RecordIter<'_>, StoreError>;
}
