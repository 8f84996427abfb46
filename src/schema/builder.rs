use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::block::{Block, BlockRef, FieldBlock, ListBlock, RecordBlock};
use crate::field::{
    BooleanField, CharField, ChoiceField, DateField, DecimalField, IntegerField, ScalarField,
};
use crate::schema::schema_model::{BlockSpec, CharSpec, FieldSpec, SchemaDocument};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("could not read schema '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed schema: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("record '{record}' declares child '{child}' more than once")]
    DuplicateChild { record: String, child: String },

    #[error("list '{list}' has min {min} greater than max {max}")]
    InvalidBounds { list: String, min: i64, max: i64 },

    #[error("choice field '{field}' has no choices")]
    EmptyChoices { field: String },
}

// ============================================================================
// Built schema
// ============================================================================

/// A schema turned into a shared block tree.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,

    /// Wire prefix of the root block
    pub prefix: String,

    pub block: BlockRef,

    /// SHA-1 of the schema source
    pub fingerprint: String,
}

/// Read and build a YAML schema file.
pub fn load_schema(path: &str) -> Result<Schema, SchemaError> {
    let source = std::fs::read_to_string(Path::new(path)).map_err(|source| SchemaError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_schema(&source)
}

/// Build a schema from YAML source.
pub fn parse_schema(source: &str) -> Result<Schema, SchemaError> {
    let document: SchemaDocument = serde_yaml::from_str(source)?;
    let block = build_block(&document.block, &document.name)?;
    tracing::debug!(schema = %document.name, "built schema");
    Ok(Schema {
        prefix: document.root_prefix().to_string(),
        name: document.name,
        block: Arc::from(block),
        fingerprint: schema_fingerprint(source),
    })
}

pub fn schema_fingerprint(source: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// Block construction
// ============================================================================

/// Build the block tree for `spec`, naming the root `name`.
pub fn build_block(spec: &BlockSpec, name: &str) -> Result<Box<dyn Block>, SchemaError> {
    let block: Box<dyn Block> = match spec {
        BlockSpec::Text(opts) => field_block(char_field(CharField::text(), opts), &opts.field, name),
        BlockSpec::Email(opts) => {
            field_block(char_field(CharField::email(), opts), &opts.field, name)
        }
        BlockSpec::Password(opts) => {
            field_block(char_field(CharField::password(), opts), &opts.field, name)
        }
        BlockSpec::Url(opts) => field_block(char_field(CharField::url(), opts), &opts.field, name),
        BlockSpec::Integer(opts) => {
            let mut field = IntegerField::new().with_required(opts.field.required);
            field.min_value = opts.min_value;
            field.max_value = opts.max_value;
            if let Some(default) = opts.default {
                field = field.with_default(default);
            }
            field_block(field, &opts.field, name)
        }
        BlockSpec::Decimal(opts) => {
            let mut field = DecimalField::new().with_required(opts.field.required);
            field.min_value = opts.min_value;
            field.max_value = opts.max_value;
            field_block(field, &opts.field, name)
        }
        BlockSpec::Boolean(opts) => {
            let mut field = BooleanField::new().with_required(opts.field.required);
            if let Some(default) = opts.default {
                field = field.with_default(default);
            }
            field_block(field, &opts.field, name)
        }
        BlockSpec::Date(opts) => {
            field_block(DateField::new().with_required(opts.field.required), &opts.field, name)
        }
        BlockSpec::Choice(opts) => {
            if opts.choices.is_empty() {
                return Err(SchemaError::EmptyChoices {
                    field: name.to_string(),
                });
            }
            let choices = opts.choices.iter().map(|choice| {
                let label = choice.label.clone().unwrap_or_else(|| choice.value.clone());
                (choice.value.clone(), label)
            });
            let field = ChoiceField::new(choices).with_required(opts.field.required);
            field_block(field, &opts.field, name)
        }
        BlockSpec::Record(opts) => {
            let mut seen = HashSet::new();
            let mut record = RecordBlock::new(name);
            for child in &opts.children {
                if !seen.insert(child.name.as_str()) {
                    return Err(SchemaError::DuplicateChild {
                        record: name.to_string(),
                        child: child.name.clone(),
                    });
                }
                record = record.child_boxed(&child.name, build_block(&child.block, &child.name)?);
            }
            Box::new(record)
        }
        BlockSpec::List(opts) => {
            if opts.min >= 0 && opts.max >= 0 && opts.min > opts.max {
                return Err(SchemaError::InvalidBounds {
                    list: name.to_string(),
                    min: opts.min,
                    max: opts.max,
                });
            }
            let child = build_block(&opts.child, crate::block::LIST_CHILD_NAME)?;
            Box::new(
                ListBlock::from_boxed(child)
                    .named(name)
                    .with_bounds(opts.min, opts.max),
            )
        }
    };
    Ok(block)
}

fn char_field(field: CharField, opts: &CharSpec) -> CharField {
    let mut field = field.with_required(opts.field.required);
    field.min_length = opts.min_length;
    field.max_length = opts.max_length;
    if let Some(default) = &opts.default {
        field = field.with_default(default.clone());
    }
    field
}

fn field_block<F: ScalarField + 'static>(
    mut field: F,
    opts: &FieldSpec,
    name: &str,
) -> Box<dyn Block> {
    let options = field.options_mut();
    options.label = opts.label.clone();
    options.help_text = opts.help_text.clone();
    Box::new(FieldBlock::new(field).named(name))
}
