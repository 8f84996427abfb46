pub mod bound;
pub mod context;
pub mod html;

pub use bound::{BoundBlock, BoundKind, Renderer};
pub use context::{AmbientContext, AmbientMap, BindScope, PresentationContext};
pub use html::HtmlRenderer;
