use crate::presentation::context::PresentationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Field,
    Record,
    List,
    ListItem,
}

/// A block bound to a value for rendering: its context plus the bound
/// children, in render order.
#[derive(Debug, Clone)]
pub struct BoundBlock {
    pub block_name: String,
    pub kind: BoundKind,
    pub context: PresentationContext,
    pub children: Vec<BoundBlock>,
}

impl BoundBlock {
    pub fn leaf(block_name: &str, kind: BoundKind, context: PresentationContext) -> Self {
        BoundBlock {
            block_name: block_name.to_string(),
            kind,
            context,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<BoundBlock>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first search by wire key.
    pub fn find(&self, key: &str) -> Option<&BoundBlock> {
        if self.context.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}

/// Turns a bound block tree into presentation output. Implemented by
/// whatever owns the page templates.
pub trait Renderer {
    fn render(&self, bound: &BoundBlock) -> String;
}
