use content_blocks::block::{
    Block, FieldBlock, PipelineStage, encode_value, run_pipeline, run_pipeline_staged, validator,
};
use content_blocks::error::ValidationError;
use content_blocks::field::{
    BooleanField, CharField, ChoiceField, DateField, DecimalField, IntegerField,
};
use content_blocks::value::{BlockValue, WireData};
use pretty_assertions::assert_eq;

mod common;
use common::fixtures::wire;

fn messages(block: &dyn Block, data: &WireData) -> Vec<String> {
    match run_pipeline(block, data, block.name()) {
        Ok(value) => panic!("expected errors, got {:?}", value),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
}

// ============================================================================
// Text fields
// ============================================================================

#[test]
fn text_field_strips_whitespace() {
    let block = FieldBlock::new(CharField::text()).named("title");
    let value = run_pipeline(&block, &wire(&[("title", "  Hello  ")]), "title").unwrap();
    assert_eq!(value, BlockValue::text("Hello"));
}

#[test]
fn required_text_field_reports_missing_value() {
    let block = FieldBlock::new(CharField::text().with_required(true)).named("title");
    let failure = run_pipeline_staged(&block, &WireData::new(), "title").unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Validate);
    assert_eq!(
        failure.errors.as_slice()[0].as_field().map(|e| e.code.as_str()),
        Some("required")
    );
}

#[test]
fn block_validators_run_before_field_rules() {
    let block = FieldBlock::new(CharField::text().with_max_length(2))
        .named("word")
        .with_validator(validator(|value| {
            if value.as_str() == Some("bad") {
                Err(ValidationError::invalid("No bad words."))
            } else {
                Ok(())
            }
        }));

    assert_eq!(
        messages(&block, &wire(&[("word", "bad")])),
        vec![
            "No bad words.",
            "Ensure this value has at most 2 characters (it has 3).",
        ]
    );
}

#[test]
fn field_block_debug_counts_validators() {
    let block = FieldBlock::new(CharField::text())
        .named("word")
        .with_validator(validator(|_| Ok(())))
        .with_validator(validator(|_| Ok(())));
    let printed = format!("{:?}", block);
    assert!(printed.starts_with("FieldBlock { name: \"word\""));
    assert!(printed.contains("validators: 2"));
}

#[test]
fn email_field_lowercases_domain_and_checks_format() {
    let block = FieldBlock::new(CharField::email()).named("email");
    let value = run_pipeline(&block, &wire(&[("email", "Ann@Example.COM")]), "email").unwrap();
    assert_eq!(value, BlockValue::text("Ann@example.com"));

    assert_eq!(
        messages(&block, &wire(&[("email", "not-an-email")])),
        vec!["Enter a valid email address."]
    );
}

#[test]
fn password_field_is_never_rendered_back() {
    let block = FieldBlock::new(CharField::password()).named("secret");
    let bound = block.bind(
        &BlockValue::text("hunter2"),
        &content_blocks::presentation::BindScope::root("secret"),
    );
    assert_eq!(
        bound.context.get("render_value"),
        Some(serde_json::Value::Bool(false))
    );
}

// ============================================================================
// Numbers, dates, choices
// ============================================================================

#[test]
fn integer_field_converts_and_checks_bounds() {
    let block = FieldBlock::new(IntegerField::new().with_min_value(1).with_max_value(10))
        .named("qty");
    assert_eq!(
        run_pipeline(&block, &wire(&[("qty", " 7 ")]), "qty").unwrap(),
        BlockValue::from(7)
    );
    assert_eq!(
        messages(&block, &wire(&[("qty", "11")])),
        vec!["Ensure this value is less than or equal to 10."]
    );
}

#[test]
fn integer_conversion_failure_stops_at_to_domain() {
    let block = FieldBlock::new(IntegerField::new()).named("qty");
    let failure = run_pipeline_staged(&block, &wire(&[("qty", "abc")]), "qty").unwrap_err();
    assert_eq!(failure.stage, PipelineStage::ToDomain);
    assert_eq!(failure.errors.to_string(), "Enter a whole number.");
}

#[test]
fn integer_display_is_text() {
    let block = FieldBlock::new(IntegerField::new()).named("qty");
    assert_eq!(block.to_display(&BlockValue::from(42)), BlockValue::text("42"));
}

#[test]
fn decimal_field_accepts_fractions() {
    let block = FieldBlock::new(DecimalField::new().with_max_value(2.5)).named("ratio");
    let value = run_pipeline(&block, &wire(&[("ratio", "1.25")]), "ratio").unwrap();
    assert_eq!(value.as_scalar().and_then(serde_json::Value::as_f64), Some(1.25));
    assert_eq!(
        messages(&block, &wire(&[("ratio", "3")])),
        vec!["Ensure this value is less than or equal to 2.5."]
    );
}

#[test]
fn date_field_normalises_iso_dates() {
    let block = FieldBlock::new(DateField::new()).named("day");
    assert_eq!(
        run_pipeline(&block, &wire(&[("day", "2024-02-29")]), "day").unwrap(),
        BlockValue::text("2024-02-29")
    );
    assert_eq!(
        messages(&block, &wire(&[("day", "2023-02-29")])),
        vec!["Enter a valid date."]
    );
}

#[test]
fn choice_field_rejects_unknown_values() {
    let block =
        FieldBlock::new(ChoiceField::new([("draft", "Draft"), ("live", "Live")])).named("status");
    assert!(run_pipeline(&block, &wire(&[("status", "live")]), "status").is_ok());

    let failure = run_pipeline(&block, &wire(&[("status", "gone")]), "status").unwrap_err();
    assert_eq!(
        failure.as_slice()[0].as_field().map(|e| e.code.as_str()),
        Some("invalid_choice")
    );
}

// ============================================================================
// Checkboxes
// ============================================================================

#[test]
fn unchecked_checkbox_is_false_not_omitted() {
    let block = FieldBlock::new(BooleanField::new()).named("agree");
    let empty = WireData::new();
    assert!(!block.value_omitted(&empty, "agree"));
    assert_eq!(run_pipeline(&block, &empty, "agree").unwrap(), BlockValue::from(false));
    assert_eq!(
        run_pipeline(&block, &wire(&[("agree", "on")]), "agree").unwrap(),
        BlockValue::from(true)
    );
}

#[test]
fn required_checkbox_must_be_ticked() {
    let block = FieldBlock::new(BooleanField::new().with_required(true)).named("agree");
    assert_eq!(
        messages(&block, &WireData::new()),
        vec!["This field is required."]
    );
}

// ============================================================================
// Defaults and re-encoding
// ============================================================================

#[test]
fn default_value_comes_from_the_field() {
    assert_eq!(
        FieldBlock::new(IntegerField::new().with_default(3)).default_value(),
        BlockValue::from(3)
    );
    assert_eq!(
        FieldBlock::new(BooleanField::new()).default_value(),
        BlockValue::from(false)
    );
    assert_eq!(FieldBlock::new(CharField::text()).default_value(), BlockValue::Empty);
}

#[test]
fn encode_value_round_trips_through_decode() {
    let block = FieldBlock::new(IntegerField::new()).named("qty");
    let encoded = encode_value(&block, &BlockValue::from(5), "qty");
    assert_eq!(encoded, wire(&[("qty", "5")]));
    assert_eq!(run_pipeline(&block, &encoded, "qty").unwrap(), BlockValue::from(5));
}

#[test]
fn date_widget_declares_its_script() {
    let block = FieldBlock::new(DateField::new());
    assert_eq!(block.media().js, vec!["blocks/date-input.js".to_string()]);
}
