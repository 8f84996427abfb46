use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as Json};

use crate::error::validation::ValidationError;
use crate::value::BlockValue;

// ============================================================================
// Error keys
// ============================================================================

/// Address of a child inside an aggregate: a record child name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKey {
    Name(String),
    Index(usize),
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Name(name) => write!(f, "{}", name),
            ErrorKey::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for ErrorKey {
    fn from(name: &str) -> Self {
        ErrorKey::Name(name.to_string())
    }
}

impl From<String> for ErrorKey {
    fn from(name: String) -> Self {
        ErrorKey::Name(name)
    }
}

impl From<usize> for ErrorKey {
    fn from(index: usize) -> Self {
        ErrorKey::Index(index)
    }
}

// ============================================================================
// Error kinds
// ============================================================================

/// Every error the pipeline produces is one of these three kinds. Merging
/// matches on the kind instead of probing concrete error types.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockError {
    /// A typed per-field failure.
    Field(ValidationError),

    /// Addressable errors of a record or list.
    Aggregate(ErrorAggregate),

    /// Anything else, reported as-is.
    Generic(String),
}

impl BlockError {
    pub fn generic(message: impl Into<String>) -> Self {
        BlockError::Generic(message.into())
    }

    pub fn as_aggregate(&self) -> Option<&ErrorAggregate> {
        match self {
            BlockError::Aggregate(agg) => Some(agg),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&ValidationError> {
        match self {
            BlockError::Field(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::Field(err) => write!(f, "{}", err),
            BlockError::Aggregate(agg) => write!(f, "{}", agg),
            BlockError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BlockError {}

impl From<ValidationError> for BlockError {
    fn from(err: ValidationError) -> Self {
        BlockError::Field(err)
    }
}

impl From<ErrorAggregate> for BlockError {
    fn from(agg: ErrorAggregate) -> Self {
        BlockError::Aggregate(agg)
    }
}

// ============================================================================
// Error lists
// ============================================================================

/// The errors one block produced for one pipeline stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockErrors(Vec<BlockError>);

impl BlockErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: impl Into<BlockError>) {
        self.0.push(err.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlockError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BlockError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<BlockError> {
        self.0
    }

    /// The aggregate carried by this list, if the block reported one.
    pub fn aggregate(&self) -> Option<&ErrorAggregate> {
        self.0.iter().find_map(BlockError::as_aggregate)
    }

    /// `Ok(value)` when nothing was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, BlockErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Flatten into `(path, message)` pairs rooted at `prefix`.
    pub fn flatten(&self, prefix: &str) -> Vec<FlatError> {
        let mut out = Vec::new();
        flatten_into(prefix, &self.0, &mut out);
        out
    }

    /// JSON shape a client-side editor consumes:
    /// `{"messages": [...], "blockErrors": {...}}`, empty parts omitted.
    pub fn as_json_data(&self) -> Json {
        let mut merged = ErrorAggregate::new();
        let mut messages = Vec::new();
        for err in &self.0 {
            match err {
                BlockError::Aggregate(agg) => merged.merge(agg.clone()),
                other => messages.push(Json::String(other.to_string())),
            }
        }
        let mut obj = match merged.as_json_data() {
            Json::Object(obj) => obj,
            _ => JsonMap::new(),
        };
        if !messages.is_empty() {
            let existing = obj.remove("messages");
            if let Some(Json::Array(extra)) = existing {
                messages.extend(extra);
            }
            obj.insert("messages".into(), Json::Array(messages));
        }
        Json::Object(obj)
    }
}

impl fmt::Display for BlockErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            errs => write!(f, "{} errors", errs.len()),
        }
    }
}

impl std::error::Error for BlockErrors {}

// ============================================================================
// Decode failures
// ============================================================================

/// A submission that failed to decode. `value` is whatever could be read,
/// shaped like a successful decode, so a rejected page can be shown as it
/// was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeFailure {
    pub value: BlockValue,
    pub errors: BlockErrors,
}

impl DecodeFailure {
    pub fn new(value: BlockValue, errors: impl Into<BlockErrors>) -> Self {
        DecodeFailure {
            value,
            errors: errors.into(),
        }
    }

    /// A failure with nothing salvageable.
    pub fn empty(errors: impl Into<BlockErrors>) -> Self {
        Self::new(BlockValue::Empty, errors)
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors)
    }
}

impl std::error::Error for DecodeFailure {}

impl From<DecodeFailure> for BlockErrors {
    fn from(failure: DecodeFailure) -> Self {
        failure.errors
    }
}

impl From<BlockError> for BlockErrors {
    fn from(err: BlockError) -> Self {
        BlockErrors(vec![err])
    }
}

impl From<ValidationError> for BlockErrors {
    fn from(err: ValidationError) -> Self {
        BlockErrors(vec![BlockError::Field(err)])
    }
}

impl From<ErrorAggregate> for BlockErrors {
    fn from(agg: ErrorAggregate) -> Self {
        BlockErrors(vec![BlockError::Aggregate(agg)])
    }
}

impl From<Vec<BlockError>> for BlockErrors {
    fn from(errs: Vec<BlockError>) -> Self {
        BlockErrors(errs)
    }
}

impl From<Vec<ValidationError>> for BlockErrors {
    fn from(errs: Vec<ValidationError>) -> Self {
        errs.into_iter().map(BlockError::Field).collect()
    }
}

impl FromIterator<BlockError> for BlockErrors {
    fn from_iter<I: IntoIterator<Item = BlockError>>(iter: I) -> Self {
        BlockErrors(iter.into_iter().collect())
    }
}

impl IntoIterator for BlockErrors {
    type Item = BlockError;
    type IntoIter = std::vec::IntoIter<BlockError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BlockErrors {
    type Item = &'a BlockError;
    type IntoIter = std::slice::Iter<'a, BlockError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Error aggregate
// ============================================================================

/// Per-child errors keyed by child name or list index, plus the errors that
/// belong to the aggregate's own scope (`extra`).
///
/// A fresh aggregate is created by every stage invocation that can fail per
/// child and is discarded once folded into its parent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorAggregate {
    errors: IndexMap<ErrorKey, Vec<BlockError>>,
    extra: Vec<BlockError>,
}

impl ErrorAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register errors for one child.
    ///
    /// # Panics
    ///
    /// Panics when `errs` is empty. Registering a key without errors is a
    /// caller bug.
    pub fn add_error(&mut self, key: impl Into<ErrorKey>, errs: impl Into<BlockErrors>) {
        let key = key.into();
        let errs = errs.into();
        assert!(
            !errs.is_empty(),
            "add_error called with no errors for key '{}'",
            key
        );
        self.errors.entry(key).or_default().extend(errs);
    }

    /// Register an error for the aggregate's own scope.
    pub fn add_extra(&mut self, err: impl Into<BlockError>) {
        self.extra.push(err.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.extra.is_empty()
    }

    pub fn get(&self, key: impl Into<ErrorKey>) -> Option<&[BlockError]> {
        self.errors.get(&key.into()).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: impl Into<ErrorKey>) -> bool {
        self.errors.contains_key(&key.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &ErrorKey> {
        self.errors.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ErrorKey, &[BlockError])> {
        self.errors.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn extra(&self) -> &[BlockError] {
        &self.extra
    }

    /// Number of errors held directly (keyed and extra), not counting what
    /// nested aggregates contain.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum::<usize>() + self.extra.len()
    }

    /// Fold another aggregate in key-for-key and extend the extra list.
    pub fn merge(&mut self, other: ErrorAggregate) {
        for (key, errs) in other.errors {
            self.errors.entry(key).or_default().extend(errs);
        }
        self.extra.extend(other.extra);
    }

    /// Fold one error of any kind into this aggregate.
    pub fn absorb(&mut self, err: BlockError) {
        match err {
            BlockError::Aggregate(agg) => self.merge(agg),
            BlockError::Field(field_err) => match field_err.field.clone() {
                Some(name) => self
                    .errors
                    .entry(ErrorKey::Name(name))
                    .or_default()
                    .push(BlockError::Field(field_err)),
                None => self.extra.push(BlockError::Field(field_err)),
            },
            generic @ BlockError::Generic(_) => self.extra.push(generic),
        }
    }

    /// Build one aggregate out of a heterogeneous error list.
    pub fn from_errors<I: IntoIterator<Item = BlockError>>(errs: I) -> Self {
        let mut agg = ErrorAggregate::new();
        for err in errs {
            agg.absorb(err);
        }
        agg
    }

    /// `Ok(value)` if nothing was recorded, otherwise this aggregate as the
    /// stage's error.
    pub fn into_result<T>(self, value: T) -> Result<T, BlockErrors> {
        if self.has_errors() {
            Err(BlockErrors::from(self))
        } else {
            Ok(value)
        }
    }

    /// Like [`into_result`](Self::into_result), but a failed decode keeps
    /// the partial value it built.
    pub fn into_decoded(self, value: BlockValue) -> Result<BlockValue, DecodeFailure> {
        if self.has_errors() {
            Err(DecodeFailure::new(value, BlockErrors::from(self)))
        } else {
            Ok(value)
        }
    }

    pub fn flatten(&self, prefix: &str) -> Vec<FlatError> {
        let mut out = Vec::new();
        flatten_aggregate(prefix, self, &mut out);
        out
    }

    pub fn as_json_data(&self) -> Json {
        let mut obj = JsonMap::new();
        if !self.extra.is_empty() {
            obj.insert(
                "messages".into(),
                Json::Array(
                    self.extra
                        .iter()
                        .map(|e| Json::String(e.to_string()))
                        .collect(),
                ),
            );
        }
        if !self.errors.is_empty() {
            let block_errors = self
                .errors
                .iter()
                .map(|(key, errs)| {
                    (
                        key.to_string(),
                        BlockErrors::from(errs.clone()).as_json_data(),
                    )
                })
                .collect();
            obj.insert("blockErrors".into(), Json::Object(block_errors));
        }
        Json::Object(obj)
    }
}

impl fmt::Display for ErrorAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred when validating", self.error_count())
    }
}

impl std::error::Error for ErrorAggregate {}

// ============================================================================
// Flattening
// ============================================================================

/// One leaf error with its dotted address (`items.2.title`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatError {
    pub path: String,
    pub message: String,
}

fn join_path(prefix: &str, key: &ErrorKey) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_into(path: &str, errs: &[BlockError], out: &mut Vec<FlatError>) {
    for err in errs {
        match err {
            BlockError::Aggregate(agg) => flatten_aggregate(path, agg, out),
            other => out.push(FlatError {
                path: path.to_string(),
                message: other.to_string(),
            }),
        }
    }
}

fn flatten_aggregate(path: &str, agg: &ErrorAggregate, out: &mut Vec<FlatError>) {
    flatten_into(path, &agg.extra, out);
    for (key, errs) in &agg.errors {
        flatten_into(&join_path(path, key), errs, out);
    }
}
