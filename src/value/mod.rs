pub mod list_item;
pub mod value_model;
pub mod wire;

pub use list_item::{ItemId, ListItem};
pub use value_model::{BlockValue, Fields, RecordType, TypedValue};
pub use wire::WireData;
