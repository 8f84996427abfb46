//! Wire key naming. These strings are shared with the client editor and must
//! match it exactly.

/// Key of a record child: `prefix-name`.
pub fn child_key(prefix: &str, child: &str) -> String {
    format!("{}-{}", prefix, child)
}

/// Key of a list item's data: `prefix-N`.
pub fn item_key(prefix: &str, index: usize) -> String {
    format!("{}-{}", prefix, index)
}

/// Key of a list item's stable id: `prefix-id-N`.
pub fn item_id_key(prefix: &str, index: usize) -> String {
    format!("{}-id-{}", prefix, index)
}

/// Key of the item count the client declares for a list: `prefix-added`.
pub fn added_key(prefix: &str) -> String {
    format!("{}-added", prefix)
}
