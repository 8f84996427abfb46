use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::block::wire_key;
use crate::error::{BlockError, ErrorKey};
use crate::value::BlockValue;

/// Request-scoped data owned by the renderer. Presentation contexts fall back
/// to it for keys they do not hold themselves.
///
/// Scopes share it behind an `Arc`, so the renderer fills it in before
/// binding starts; blocks only read it.
pub trait AmbientContext: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Option<Json>;

    fn set(&mut self, key: &str, value: Json);
}

/// Plain key/value ambient context.
#[derive(Debug, Clone, Default)]
pub struct AmbientMap {
    values: BTreeMap<String, Json>,
}

impl AmbientMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Json>) {
        self.values.insert(key.into(), value.into());
    }
}

impl AmbientContext for AmbientMap {
    fn get(&self, key: &str) -> Option<Json> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Json) {
        self.values.insert(key.to_string(), value);
    }
}

// ============================================================================
// Presentation context
// ============================================================================

/// Everything a renderer needs for one block: where it lives on the wire,
/// its display id, its display value and the errors to show next to it.
///
/// Rebuilt on every render call and never stored.
#[derive(Debug, Clone)]
pub struct PresentationContext {
    /// Wire key the rendered inputs submit under.
    pub key: String,

    /// Display id (HTML `id`).
    pub id: String,

    /// Display-shaped current value.
    pub value: BlockValue,

    /// Errors belonging to this block.
    pub errors: Vec<BlockError>,

    /// Free-form attributes for the renderer.
    pub attrs: BTreeMap<String, Json>,

    ambient: Option<Arc<dyn AmbientContext>>,
}

impl PresentationContext {
    pub fn new(scope: &BindScope, value: BlockValue) -> Self {
        PresentationContext {
            key: scope.key.clone(),
            id: scope.id.clone(),
            value,
            errors: scope.errors.clone(),
            attrs: BTreeMap::new(),
            ambient: scope.ambient.clone(),
        }
    }

    /// Attribute lookup, falling back to the ambient context.
    pub fn get(&self, key: &str) -> Option<Json> {
        self.attrs
            .get(key)
            .cloned()
            .or_else(|| self.ambient.as_ref().and_then(|a| a.get(key)))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Json>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.set(key, value);
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Messages that belong to this block itself rather than to a child:
    /// plain errors plus the `extra` list of any aggregate.
    pub fn own_messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        for err in &self.errors {
            match err {
                BlockError::Aggregate(agg) => {
                    out.extend(agg.extra().iter().map(ToString::to_string));
                }
                other => out.push(other.to_string()),
            }
        }
        out
    }
}

// ============================================================================
// Bind scope
// ============================================================================

/// Addressing handed down the block tree while binding: wire key, display id,
/// the errors for this position and the ambient context.
#[derive(Debug, Clone)]
pub struct BindScope {
    pub key: String,
    pub id: String,
    pub errors: Vec<BlockError>,
    pub ambient: Option<Arc<dyn AmbientContext>>,
}

impl BindScope {
    /// Root scope for a top-level field. The display id is `id_<key>`.
    pub fn root(key: &str) -> Self {
        BindScope {
            key: key.to_string(),
            id: format!("id_{}", key),
            errors: Vec::new(),
            ambient: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<BlockError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_ambient(mut self, ambient: Arc<dyn AmbientContext>) -> Self {
        self.ambient = Some(ambient);
        self
    }

    /// Scope of a child addressed by name or index, carrying that child's
    /// slice of this scope's aggregated errors.
    pub fn child(&self, key: impl Into<ErrorKey>) -> Self {
        let key = key.into();
        let child_key = key.to_string();
        let errors = self
            .errors
            .iter()
            .filter_map(BlockError::as_aggregate)
            .filter_map(|agg| agg.get(key.clone()))
            .flat_map(|errs| errs.iter().cloned())
            .collect();
        BindScope {
            key: wire_key::child_key(&self.key, &child_key),
            id: wire_key::child_key(&self.id, &child_key),
            errors,
            ambient: self.ambient.clone(),
        }
    }
}
