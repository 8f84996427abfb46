use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::value_model::BlockValue;

/// Stable identity of a list item.
///
/// Minted once when the item is created and carried verbatim through every
/// later edit, whatever position the item ends up in. Block logic never looks
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Mint a fresh random identity.
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }

    /// Parse an identity submitted by a client. Returns `None` when the token
    /// is not a valid identity.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(ItemId)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a list value: a stable id paired with the item's data.
///
/// `data` is raw, domain or display shaped depending on the pipeline stage
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub id: ItemId,
    #[serde(rename = "value")]
    pub data: BlockValue,
}

impl ListItem {
    pub fn new(id: ItemId, data: BlockValue) -> Self {
        ListItem { id, data }
    }

    /// A brand new item with a freshly minted id.
    pub fn fresh(data: BlockValue) -> Self {
        ListItem {
            id: ItemId::new(),
            data,
        }
    }

    /// Same identity, different data. Used by every stage that maps over items.
    pub fn with_data(&self, data: BlockValue) -> Self {
        ListItem { id: self.id, data }
    }
}
