use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as Json};

use crate::error::validation::ValidationError;
use crate::value::list_item::ListItem;

/// Child values of a record, in the record's declaration order.
pub type Fields = IndexMap<String, BlockValue>;

// ============================================================================
// Block values
// ============================================================================

/// A value flowing through the block pipeline.
///
/// The same enum carries raw (decoded from the wire), domain (converted and
/// cleaned) and display (re-encoded for editing) values; which one it is
/// depends on the stage that produced it.
#[derive(Debug, Clone, Default)]
pub enum BlockValue {
    /// Nothing was submitted. Distinct from an empty record or list.
    #[default]
    Empty,

    /// A leaf value produced by a scalar field or widget.
    Scalar(Json),

    /// A record's children keyed by child name.
    Record(Fields),

    /// A list's items, each with its own stable identity.
    List(Vec<ListItem>),

    /// A record narrowed to a host type by its block definition.
    Typed(TypedValue),
}

impl BlockValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, BlockValue::Empty)
    }

    pub fn text(s: impl Into<String>) -> Self {
        BlockValue::Scalar(Json::String(s.into()))
    }

    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, BlockValue)>,
    {
        BlockValue::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_scalar(&self) -> Option<&Json> {
        match self {
            BlockValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Json::as_str)
    }

    pub fn as_list(&self) -> Option<&[ListItem]> {
        match self {
            BlockValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Fields> {
        match self {
            BlockValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// The record view of this value: plain records as-is, typed records
    /// through their field projection.
    pub fn record_fields(&self) -> Option<Fields> {
        match self {
            BlockValue::Record(fields) => Some(fields.clone()),
            BlockValue::Typed(typed) => Some(typed.to_fields()),
            _ => None,
        }
    }

    /// Downcast a typed record to its host type.
    pub fn downcast_ref<T: RecordType>(&self) -> Option<&T> {
        match self {
            BlockValue::Typed(typed) => typed.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Short name of the variant, for shape errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BlockValue::Empty => "empty",
            BlockValue::Scalar(_) => "scalar",
            BlockValue::Record(_) => "record",
            BlockValue::List(_) => "list",
            BlockValue::Typed(_) => "typed record",
        }
    }

    /// JSON rendering of the value. Lists become `[{"id", "value"}]`.
    pub fn to_json(&self) -> Json {
        match self {
            BlockValue::Empty => Json::Null,
            BlockValue::Scalar(v) => v.clone(),
            BlockValue::Record(fields) => fields_to_json(fields),
            BlockValue::Typed(typed) => fields_to_json(&typed.to_fields()),
            BlockValue::List(items) => Json::Array(
                items
                    .iter()
                    .map(|item| {
                        let mut obj = JsonMap::new();
                        obj.insert("id".into(), Json::String(item.id.to_string()));
                        obj.insert("value".into(), item.data.to_json());
                        Json::Object(obj)
                    })
                    .collect(),
            ),
        }
    }
}

fn fields_to_json(fields: &Fields) -> Json {
    Json::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

impl PartialEq for BlockValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BlockValue::Empty, BlockValue::Empty) => true,
            (BlockValue::Scalar(a), BlockValue::Scalar(b)) => a == b,
            (BlockValue::Record(a), BlockValue::Record(b)) => a == b,
            (BlockValue::List(a), BlockValue::List(b)) => a == b,
            (BlockValue::Typed(a), BlockValue::Typed(b)) => {
                a.type_name() == b.type_name() && a.to_fields() == b.to_fields()
            }
            _ => false,
        }
    }
}

impl Serialize for BlockValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for BlockValue {
    fn from(s: &str) -> Self {
        BlockValue::text(s)
    }
}

impl From<String> for BlockValue {
    fn from(s: String) -> Self {
        BlockValue::text(s)
    }
}

impl From<i64> for BlockValue {
    fn from(n: i64) -> Self {
        BlockValue::Scalar(Json::from(n))
    }
}

impl From<bool> for BlockValue {
    fn from(b: bool) -> Self {
        BlockValue::Scalar(Json::Bool(b))
    }
}

impl From<Vec<ListItem>> for BlockValue {
    fn from(items: Vec<ListItem>) -> Self {
        BlockValue::List(items)
    }
}

// ============================================================================
// Typed records
// ============================================================================

/// A host type a record block can materialise into.
///
/// `from_fields` runs once the record's children have been converted (and
/// again after cleaning); `to_fields` projects the value back so children can
/// be cleaned, validated and re-encoded for display.
pub trait RecordType: Any + Send + Sync + fmt::Debug {
    fn from_fields(fields: &Fields) -> Result<Self, ValidationError>
    where
        Self: Sized;

    fn to_fields(&self) -> Fields;
}

trait ErasedRecord: Send + Sync + fmt::Debug {
    fn fields(&self) -> Fields;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: RecordType> ErasedRecord for T {
    fn fields(&self) -> Fields {
        self.to_fields()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Type-erased handle to a host record value.
#[derive(Debug, Clone)]
pub struct TypedValue(Arc<dyn ErasedRecord>);

impl TypedValue {
    pub fn new<T: RecordType>(value: T) -> Self {
        TypedValue(Arc::new(value))
    }

    pub fn downcast_ref<T: RecordType>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn to_fields(&self) -> Fields {
        self.0.fields()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}
