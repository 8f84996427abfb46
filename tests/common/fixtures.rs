use content_blocks::block::{FieldBlock, ListBlock, RecordBlock};
use content_blocks::error::{BlockError, BlockErrors, ErrorAggregate, ValidationError};
use content_blocks::field::{CharField, IntegerField};
use content_blocks::value::{BlockValue, Fields, RecordType, WireData};

// ============================================================================
// Wire data
// ============================================================================

pub fn wire(pairs: &[(&str, &str)]) -> WireData {
    pairs.iter().copied().collect()
}

// ============================================================================
// Block trees
// ============================================================================

/// `person { name (required), age (integer), email }`
pub fn person_block() -> RecordBlock {
    RecordBlock::new("person")
        .child("name", FieldBlock::new(CharField::text().with_required(true)))
        .child("age", FieldBlock::new(IntegerField::new()))
        .child("email", FieldBlock::new(CharField::email()))
}

/// List of required text items.
pub fn tags_block() -> ListBlock {
    ListBlock::new(FieldBlock::new(CharField::text().with_required(true))).named("tags")
}

/// `order { customer, items: [ line { sku (required), qty (>= 1) } ] }`
pub fn order_block() -> RecordBlock {
    let line = RecordBlock::new("line")
        .child("sku", FieldBlock::new(CharField::text().with_required(true)))
        .child(
            "qty",
            FieldBlock::new(IntegerField::new().with_required(true).with_min_value(1)),
        );
    RecordBlock::new("order")
        .child("customer", FieldBlock::new(CharField::text()))
        .child("items", ListBlock::new(line).with_min(1))
}

// ============================================================================
// Typed records
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl RecordType for Address {
    fn from_fields(fields: &Fields) -> Result<Self, ValidationError> {
        let text = |name: &str| {
            fields
                .get(name)
                .and_then(BlockValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| ValidationError::invalid(format!("Missing {}.", name)))
        };
        Ok(Address {
            street: text("street")?,
            city: text("city")?,
        })
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("street".into(), BlockValue::text(&self.street));
        fields.insert("city".into(), BlockValue::text(&self.city));
        fields
    }
}

pub fn address_block() -> RecordBlock {
    RecordBlock::new("address")
        .child("street", FieldBlock::new(CharField::text().with_required(true)))
        .child("city", FieldBlock::new(CharField::text()))
        .with_type::<Address>()
}

// ============================================================================
// Error helpers
// ============================================================================

/// The aggregate a record or list stage returned.
pub fn aggregate(errors: &BlockErrors) -> &ErrorAggregate {
    errors
        .aggregate()
        .unwrap_or_else(|| panic!("expected an aggregate, got {:?}", errors))
}

/// Display messages of a slice of errors.
pub fn messages(errors: &[BlockError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

pub fn extra_messages(errors: &BlockErrors) -> Vec<String> {
    messages(aggregate(errors).extra())
}

pub const ARTICLE_SCHEMA: &str = r#"
name: article
block:
  type: record
  children:
    - name: title
      type: text
      required: true
      max_length: 20
    - name: status
      type: choice
      choices:
        - value: draft
          label: Draft
        - value: live
    - name: published
      type: boolean
    - name: tags
      type: list
      min: 1
      max: 3
      child:
        type: text
        required: true
"#;
