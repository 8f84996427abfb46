use serde::{Deserialize, Serialize};

/// Static assets a block needs on the page. Collected from the whole block
/// tree so the page can include each asset once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub css: Vec<String>,
    #[serde(default)]
    pub js: Vec<String>,
}

impl Media {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_css(mut self, path: impl Into<String>) -> Self {
        push_unique(&mut self.css, path.into());
        self
    }

    pub fn with_js(mut self, path: impl Into<String>) -> Self {
        push_unique(&mut self.js, path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }

    /// Append `other`'s assets, keeping first-seen order and dropping duplicates.
    pub fn merge(&mut self, other: &Media) {
        for css in &other.css {
            push_unique(&mut self.css, css.clone());
        }
        for js in &other.js {
            push_unique(&mut self.js, js.clone());
        }
    }
}

fn push_unique(list: &mut Vec<String>, path: String) {
    if !list.contains(&path) {
        list.push(path);
    }
}
