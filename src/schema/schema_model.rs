use serde::{Deserialize, Serialize};

/// A declarative content schema, usually loaded from YAML.
///
/// ```yaml
/// name: article
/// prefix: article
/// block:
///   type: record
///   children:
///     - name: title
///       type: text
///       required: true
///       max_length: 80
///     - name: tags
///       type: list
///       min: 1
///       child:
///         type: text
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDocument {
    /// Human-readable schema name
    pub name: String,

    /// Wire prefix of the root block (defaults to the schema name)
    #[serde(default)]
    pub prefix: Option<String>,

    /// Root block definition
    pub block: BlockSpec,
}

impl SchemaDocument {
    pub fn root_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.name)
    }
}

/// One block definition, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSpec {
    Text(CharSpec),
    Email(CharSpec),
    Password(CharSpec),
    Url(CharSpec),
    Integer(IntegerSpec),
    Decimal(DecimalSpec),
    Boolean(BooleanSpec),
    Date(DateSpec),
    Choice(ChoiceSpec),
    Record(RecordSpec),
    List(ListSpec),
}

impl BlockSpec {
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockSpec::Text(_) => "text",
            BlockSpec::Email(_) => "email",
            BlockSpec::Password(_) => "password",
            BlockSpec::Url(_) => "url",
            BlockSpec::Integer(_) => "integer",
            BlockSpec::Decimal(_) => "decimal",
            BlockSpec::Boolean(_) => "boolean",
            BlockSpec::Date(_) => "date",
            BlockSpec::Choice(_) => "choice",
            BlockSpec::Record(_) => "record",
            BlockSpec::List(_) => "list",
        }
    }
}

/// Options every scalar field accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CharSpec {
    #[serde(flatten)]
    pub field: FieldSpec,

    #[serde(default)]
    pub min_length: Option<usize>,

    #[serde(default)]
    pub max_length: Option<usize>,

    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntegerSpec {
    #[serde(flatten)]
    pub field: FieldSpec,

    #[serde(default)]
    pub min_value: Option<i64>,

    #[serde(default)]
    pub max_value: Option<i64>,

    #[serde(default)]
    pub default: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DecimalSpec {
    #[serde(flatten)]
    pub field: FieldSpec,

    #[serde(default)]
    pub min_value: Option<f64>,

    #[serde(default)]
    pub max_value: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BooleanSpec {
    #[serde(flatten)]
    pub field: FieldSpec,

    #[serde(default)]
    pub default: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateSpec {
    #[serde(flatten)]
    pub field: FieldSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChoiceSpec {
    #[serde(flatten)]
    pub field: FieldSpec,

    /// Allowed values, in display order
    pub choices: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOption {
    pub value: String,

    /// Shown to the user; falls back to `value`
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordSpec {
    /// Children in declaration order
    #[serde(default)]
    pub children: Vec<ChildSpec>,
}

/// A record child: a name plus its block definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildSpec {
    pub name: String,

    #[serde(flatten)]
    pub block: BlockSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListSpec {
    pub child: Box<BlockSpec>,

    /// Minimum number of items; `-1` means no minimum
    #[serde(default = "unbounded")]
    pub min: i64,

    /// Maximum number of items; `-1` means no maximum
    #[serde(default = "unbounded")]
    pub max: i64,
}

fn unbounded() -> i64 {
    -1
}
