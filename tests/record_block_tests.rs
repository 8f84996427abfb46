use content_blocks::block::{
    Block, FieldBlock, ListBlock, Media, PipelineStage, RecordBlock, run_pipeline,
    run_pipeline_staged, validator,
};
use content_blocks::error::ValidationError;
use content_blocks::field::{CharField, DateField};
use content_blocks::value::{BlockValue, WireData};
use pretty_assertions::assert_eq;

mod common;
use common::fixtures::{
    Address, address_block, aggregate, messages, order_block, person_block, wire,
};

// ============================================================================
// Decoding and per-key isolation
// ============================================================================

#[test]
fn decodes_children_in_declaration_order() {
    let block = person_block();
    let raw = block
        .decode_wire(
            &wire(&[
                ("person-email", "ann@example.com"),
                ("person-name", "Ann"),
                ("person-age", "42"),
            ]),
            "person",
        )
        .unwrap();
    let keys: Vec<&str> = raw.as_record().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["name", "age", "email"]);
}

#[test]
fn only_the_malformed_child_is_reported() {
    let block = person_block();
    let data = wire(&[
        ("person-name", "Ann"),
        ("person-age", "42"),
        ("person-email", "not-an-email"),
    ]);
    let errors = run_pipeline(&block, &data, "person").unwrap_err();
    let agg = aggregate(&errors);

    assert!(agg.get("email").is_some_and(|errs| !errs.is_empty()));
    assert!(agg.get("name").is_none());
    assert!(agg.get("age").is_none());
}

#[test]
fn failed_decode_keeps_the_children_it_could_read() {
    let data = wire(&[
        ("order-customer", "Ann"),
        ("order-items-added", "2"),
        ("order-items-0-sku", "A1"),
        ("order-items-0-qty", "3"),
    ]);
    let failure = order_block().decode_wire(&data, "order").unwrap_err();

    let fields = failure.value.as_record().unwrap();
    assert_eq!(fields["customer"], BlockValue::text("Ann"));
    let items = fields["items"].as_list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].data.as_record().unwrap()["sku"], BlockValue::text("A1"));

    let agg = aggregate(&failure.errors);
    assert!(agg.get("items").is_some());
    assert!(agg.get("customer").is_none());
}

#[test]
fn every_failing_child_is_reported_in_one_pass() {
    let block = person_block();
    let data = wire(&[("person-age", "old"), ("person-email", "x")]);

    // conversion stops the run before validation
    let failure = run_pipeline_staged(&block, &data, "person").unwrap_err();
    assert_eq!(failure.stage, PipelineStage::ToDomain);
    assert_eq!(
        aggregate(&failure.errors).keys().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["age"]
    );

    let data = wire(&[("person-age", "30"), ("person-email", "x")]);
    let errors = run_pipeline(&block, &data, "person").unwrap_err();
    let agg = aggregate(&errors);
    assert_eq!(messages(agg.get("name").unwrap()), vec!["This field is required."]);
    assert_eq!(
        messages(agg.get("email").unwrap()),
        vec!["Enter a valid email address."]
    );
}

#[test]
fn accepted_record_is_cleaned() {
    let block = person_block();
    let data = wire(&[
        ("person-name", " Ann "),
        ("person-age", "42"),
        ("person-email", "ann@EXAMPLE.com"),
    ]);
    let value = run_pipeline(&block, &data, "person").unwrap();
    assert_eq!(
        value,
        BlockValue::record([
            ("name", BlockValue::text("Ann")),
            ("age", BlockValue::from(42)),
            ("email", BlockValue::text("ann@example.com")),
        ])
    );
}

// ============================================================================
// Nil versus empty
// ============================================================================

#[test]
fn empty_raw_value_converts_to_empty() {
    let block = person_block();
    assert_eq!(block.to_domain(BlockValue::Empty).unwrap(), BlockValue::Empty);
    assert_eq!(block.clean(BlockValue::Empty).unwrap(), BlockValue::Empty);
    assert!(block.validate(&BlockValue::Empty).is_ok());
}

#[test]
fn default_is_a_concrete_record() {
    let default = person_block().default_value();
    let fields = default.as_record().expect("default must be a record");
    assert_eq!(fields.len(), 3);
    assert!(!default.is_empty());
}

#[test]
fn omitted_only_when_every_child_is_omitted() {
    let block = person_block();
    assert!(block.value_omitted(&WireData::new(), "person"));
    assert!(!block.value_omitted(&wire(&[("person-age", "1")]), "person"));
}

#[test]
fn non_record_value_is_a_shape_error() {
    let errors = person_block().to_domain(BlockValue::text("nope")).unwrap_err();
    assert_eq!(
        errors.to_string(),
        "Block 'person' expected a record value, got scalar."
    );
}

// ============================================================================
// Record validators
// ============================================================================

fn signup_block() -> RecordBlock {
    RecordBlock::new("signup")
        .child("password", FieldBlock::new(CharField::password().with_required(true)))
        .child("confirm", FieldBlock::new(CharField::password().with_required(true)))
        .with_validator(validator(|value| {
            let fields = value.record_fields().unwrap_or_default();
            if fields.get("password") == fields.get("confirm") {
                Ok(())
            } else {
                Err(ValidationError::invalid("Passwords do not match.").for_field("confirm"))
            }
        }))
}

#[test]
fn record_validator_errors_are_keyed_by_field() {
    let data = wire(&[("signup-password", "abc"), ("signup-confirm", "abd")]);
    let errors = run_pipeline(&signup_block(), &data, "signup").unwrap_err();
    let agg = aggregate(&errors);
    assert_eq!(messages(agg.get("confirm").unwrap()), vec!["Passwords do not match."]);
    assert!(agg.extra().is_empty());
}

#[test]
fn record_validator_short_circuits_children() {
    // confirm is blank, but its required check never runs
    let block = signup_block().with_validator(validator(|_| {
        Err(ValidationError::invalid("Signups are closed."))
    }));
    let errors = run_pipeline(&block, &wire(&[("signup-password", "a")]), "signup").unwrap_err();
    let agg = aggregate(&errors);
    assert_eq!(messages(agg.get("confirm").unwrap()), vec!["Passwords do not match."]);
    assert_eq!(messages(agg.extra()), vec!["Signups are closed."]);
}

#[test]
fn blocks_with_validators_are_debug_printable() {
    let printed = format!("{:?}", signup_block());
    assert!(printed.starts_with("RecordBlock { name: \"signup\""));
    assert!(printed.contains("validators: 1"));
    assert!(printed.ends_with(".. }"));

    let list = ListBlock::new(FieldBlock::new(CharField::text()))
        .named("tags")
        .with_max(3)
        .with_validator(validator(|_| Ok(())));
    let printed = format!("{:?}", list);
    assert!(printed.contains("max: Some(3)"));
    assert!(printed.contains("validators: 1"));
}

// ============================================================================
// Typed records
// ============================================================================

#[test]
fn typed_record_materialises_host_type() {
    let data = wire(&[("address-street", " 1 Main St "), ("address-city", "Springfield")]);
    let value = run_pipeline(&address_block(), &data, "address").unwrap();
    assert_eq!(
        value.downcast_ref::<Address>(),
        Some(&Address {
            street: "1 Main St".into(),
            city: "Springfield".into(),
        })
    );
}

#[test]
fn typed_record_displays_as_fields() {
    let typed = BlockValue::Typed(content_blocks::value::TypedValue::new(Address {
        street: "1 Main St".into(),
        city: "Springfield".into(),
    }));
    assert_eq!(
        address_block().to_display(&typed),
        BlockValue::record([
            ("street", BlockValue::text("1 Main St")),
            ("city", BlockValue::text("Springfield")),
        ])
    );
}

// ============================================================================
// Media
// ============================================================================

#[test]
fn media_is_merged_without_duplicates() {
    let block = RecordBlock::new("event")
        .child("start", FieldBlock::new(DateField::new()))
        .child("end", FieldBlock::new(DateField::new()))
        .with_media(Media::new().with_css("blocks/event.css"));
    let media = block.media();
    assert_eq!(media.css, vec!["blocks/event.css".to_string()]);
    assert_eq!(media.js, vec!["blocks/date-input.js".to_string()]);
}
