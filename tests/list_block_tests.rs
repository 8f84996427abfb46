use std::collections::HashSet;

use content_blocks::block::{
    Block, FieldBlock, ListBlock, RecordBlock, encode_value, run_pipeline,
};
use content_blocks::field::{BooleanField, CharField};
use content_blocks::value::{BlockValue, ItemId, ListItem, WireData};
use pretty_assertions::assert_eq;

mod common;
use common::fixtures::{aggregate, extra_messages, messages, tags_block, wire};

fn ids(value: &BlockValue) -> Vec<ItemId> {
    value.as_list().unwrap().iter().map(|item| item.id).collect()
}

fn texts(value: &BlockValue) -> Vec<String> {
    value
        .as_list()
        .unwrap()
        .iter()
        .map(|item| item.data.as_str().unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn item_ids_survive_a_display_round_trip() {
    let block = tags_block();
    let first = wire(&[("tags-added", "3"), ("tags-0", "a"), ("tags-1", "b"), ("tags-2", "c")]);
    let domain = block.to_domain(block.decode_wire(&first, "tags").unwrap()).unwrap();

    let resubmitted = encode_value(&block, &domain, "tags");
    let again = block
        .to_domain(block.decode_wire(&resubmitted, "tags").unwrap())
        .unwrap();

    assert_eq!(ids(&again), ids(&domain));
    assert_eq!(texts(&again), vec!["a", "b", "c"]);
}

#[test]
fn submitted_ids_are_kept_and_missing_ones_minted() {
    let known = ItemId::new();
    let known_token = known.to_string();
    let data = wire(&[
        ("tags-added", "2"),
        ("tags-id-0", known_token.as_str()),
        ("tags-0", "kept"),
        ("tags-1", "new"),
    ]);
    let value = run_pipeline(&tags_block(), &data, "tags").unwrap();
    let ids = ids(&value);
    assert_eq!(ids[0], known);
    assert_ne!(ids[1], known);
}

#[test]
fn reordered_items_keep_their_ids() {
    let block = tags_block();
    let (a, b) = (ItemId::new(), ItemId::new());
    let (a_token, b_token) = (a.to_string(), b.to_string());
    let data = wire(&[
        ("tags-added", "2"),
        ("tags-id-0", b_token.as_str()),
        ("tags-0", "second"),
        ("tags-id-1", a_token.as_str()),
        ("tags-1", "first"),
    ]);
    let value = run_pipeline(&block, &data, "tags").unwrap();
    assert_eq!(ids(&value), vec![b, a]);
}

#[test]
fn malformed_id_is_a_block_level_error() {
    let data = wire(&[("tags-added", "1"), ("tags-id-0", "not-a-uuid"), ("tags-0", "x")]);
    let errors = tags_block().decode_wire(&data, "tags").unwrap_err().errors;
    assert_eq!(
        extra_messages(&errors),
        vec!["Item 0 has an invalid id 'not-a-uuid'."]
    );
    assert_eq!(aggregate(&errors).keys().count(), 0);
}

#[test]
fn repeated_id_is_rejected() {
    let id = ItemId::new().to_string();
    let data = wire(&[
        ("tags-added", "2"),
        ("tags-id-0", id.as_str()),
        ("tags-0", "a"),
        ("tags-id-1", id.as_str()),
        ("tags-1", "b"),
    ]);
    let errors = tags_block().decode_wire(&data, "tags").unwrap_err().errors;
    assert_eq!(
        extra_messages(&errors),
        vec!["Item 1 repeats the id of an earlier item."]
    );
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn default_builds_min_items_with_distinct_ids() {
    let block = tags_block().with_min(3);
    let default = block.default_value();
    let items = default.as_list().unwrap();
    assert_eq!(items.len(), 3);
    let distinct: HashSet<ItemId> = items.iter().map(|item| item.id).collect();
    assert_eq!(distinct.len(), 3);
    assert!(items.iter().all(|item| item.data == BlockValue::Empty));
}

#[test]
fn default_without_min_is_empty() {
    assert_eq!(tags_block().default_value(), BlockValue::List(Vec::new()));
}

// ============================================================================
// Structural checks
// ============================================================================

#[test]
fn declared_count_larger_than_items_is_rejected() {
    let data = wire(&[("tags-added", "3"), ("tags-0", "a"), ("tags-1", "b")]);
    let errors = tags_block().decode_wire(&data, "tags").unwrap_err().errors;
    assert_eq!(extra_messages(&errors), vec!["Expected 3 items but received 2."]);
}

#[test]
fn too_many_valid_items_is_rejected() {
    let block = tags_block().with_min(1).with_max(2);
    let data = wire(&[("tags-added", "3"), ("tags-0", "a"), ("tags-1", "b"), ("tags-2", "c")]);
    let errors = block.decode_wire(&data, "tags").unwrap_err().errors;
    assert_eq!(extra_messages(&errors), vec!["The maximum number of items is 2."]);
    assert_eq!(aggregate(&errors).keys().count(), 0);
}

#[test]
fn too_few_items_is_rejected() {
    let block = tags_block().with_min(2);
    let data = wire(&[("tags-added", "1"), ("tags-0", "a")]);
    let errors = block.decode_wire(&data, "tags").unwrap_err().errors;
    assert_eq!(extra_messages(&errors), vec!["The minimum number of items is 2."]);
}

#[test]
fn gap_in_indices_surfaces_as_count_mismatch() {
    let data = wire(&[("tags-added", "3"), ("tags-0", "a"), ("tags-2", "c")]);
    let errors = tags_block().decode_wire(&data, "tags").unwrap_err().errors;
    assert_eq!(extra_messages(&errors), vec!["Expected 3 items but received 1."]);
}

#[test]
fn missing_count_with_items_is_rejected() {
    let errors = tags_block()
        .decode_wire(&wire(&[("tags-0", "a")]), "tags")
        .unwrap_err()
        .errors;
    assert_eq!(extra_messages(&errors), vec!["Missing item count."]);
}

#[test]
fn unparsable_count_is_rejected() {
    let errors = tags_block()
        .decode_wire(&wire(&[("tags-added", "many")]), "tags")
        .unwrap_err()
        .errors;
    assert_eq!(extra_messages(&errors), vec!["Invalid item count 'many'."]);
}

#[test]
fn nothing_submitted_is_an_empty_list() {
    let block = tags_block();
    assert!(block.value_omitted(&WireData::new(), "tags"));
    assert_eq!(
        run_pipeline(&block, &WireData::new(), "tags").unwrap(),
        BlockValue::List(Vec::new())
    );
}

#[test]
fn checkbox_items_are_bounded_by_the_declared_count() {
    // unchecked boxes submit nothing, so only the count says how many exist
    let block = ListBlock::new(FieldBlock::new(BooleanField::new())).named("flags");
    let data = wire(&[("flags-added", "2"), ("flags-1", "on")]);
    let value = run_pipeline(&block, &data, "flags").unwrap();
    let flags: Vec<BlockValue> = value
        .as_list()
        .unwrap()
        .iter()
        .map(|item| item.data.clone())
        .collect();
    assert_eq!(flags, vec![BlockValue::from(false), BlockValue::from(true)]);
}

#[test]
fn unsubmitted_checkbox_list_is_an_empty_list() {
    let block = ListBlock::new(FieldBlock::new(BooleanField::new())).named("flags");
    assert_eq!(
        run_pipeline(&block, &WireData::new(), "flags").unwrap(),
        BlockValue::List(Vec::new())
    );

    // a record made of checkboxes, nested in a page that left the list out
    let toggles = RecordBlock::new("toggles")
        .child("email", FieldBlock::new(BooleanField::new()))
        .child("sms", FieldBlock::new(BooleanField::new()));
    let page = RecordBlock::new("prefs")
        .child("name", FieldBlock::new(CharField::text()))
        .child("channels", ListBlock::new(toggles));
    let value = run_pipeline(&page, &wire(&[("prefs-name", "Ann")]), "prefs").unwrap();
    assert_eq!(
        value.as_record().unwrap()["channels"],
        BlockValue::List(Vec::new())
    );
}

#[test]
fn submitted_item_id_without_count_is_rejected() {
    let id = ItemId::new().to_string();
    let block = ListBlock::new(FieldBlock::new(BooleanField::new())).named("flags");
    let errors = block
        .decode_wire(&wire(&[("flags-id-0", id.as_str())]), "flags")
        .unwrap_err()
        .errors;
    assert_eq!(extra_messages(&errors), vec!["Missing item count."]);
}

#[test]
fn oversized_count_scans_one_past_max() {
    let block = ListBlock::new(FieldBlock::new(BooleanField::new()))
        .named("flags")
        .with_max(2);
    let failure = block
        .decode_wire(&wire(&[("flags-added", "3000000")]), "flags")
        .unwrap_err();
    assert_eq!(failure.value.as_list().map(<[_]>::len), Some(3));
    assert_eq!(
        extra_messages(&failure.errors),
        vec![
            "The maximum number of items is 2.",
            "Expected 3000000 items but received 3.",
        ]
    );
}

#[test]
fn oversized_count_without_max_is_bounded_by_submitted_keys() {
    let block = ListBlock::new(FieldBlock::new(BooleanField::new())).named("flags");
    let data = wire(&[("flags-added", "1000000000000000000"), ("flags-0", "on")]);
    let failure = block.decode_wire(&data, "flags").unwrap_err();
    assert_eq!(failure.value.as_list().map(<[_]>::len), Some(2));
    assert_eq!(
        extra_messages(&failure.errors),
        vec!["Expected 1000000000000000000 items but received 2."]
    );
}

#[test]
fn rejected_decode_keeps_the_items_it_read() {
    let known = ItemId::new();
    let known_token = known.to_string();
    let data = wire(&[
        ("tags-added", "3"),
        ("tags-id-0", known_token.as_str()),
        ("tags-0", "a"),
        ("tags-1", "b"),
    ]);
    let failure = tags_block().decode_wire(&data, "tags").unwrap_err();
    assert_eq!(texts(&failure.value), vec!["a", "b"]);
    assert_eq!(ids(&failure.value)[0], known);
}

// ============================================================================
// Conversion and validation
// ============================================================================

#[test]
fn item_validation_errors_are_keyed_by_index() {
    let data = wire(&[("tags-added", "3"), ("tags-0", "a"), ("tags-1", " "), ("tags-2", "c")]);
    let errors = run_pipeline(&tags_block(), &data, "tags").unwrap_err();
    let agg = aggregate(&errors);
    assert_eq!(messages(agg.get(1usize).unwrap()), vec!["This field is required."]);
    assert!(agg.get(0usize).is_none());
    assert!(agg.get(2usize).is_none());
}

#[test]
fn empty_domain_value_maps_to_empty_list() {
    let block = tags_block();
    assert_eq!(
        block.to_domain(BlockValue::Empty).unwrap(),
        BlockValue::List(Vec::new())
    );
    assert!(block.validate(&BlockValue::List(Vec::new())).is_ok());
}

#[test]
fn clean_preserves_ids() {
    let block = tags_block();
    let item = ListItem::fresh(BlockValue::text("  padded "));
    let cleaned = block.clean(BlockValue::List(vec![item.clone()])).unwrap();
    assert_eq!(
        cleaned,
        BlockValue::List(vec![ListItem::new(item.id, BlockValue::text("padded"))])
    );
}

#[test]
fn validate_does_not_recheck_cardinality() {
    let block = ListBlock::new(FieldBlock::new(CharField::text())).with_min(2);
    let one = BlockValue::List(vec![ListItem::fresh(BlockValue::text("a"))]);
    assert!(block.validate(&one).is_ok());
}
