//! Forma Render - Builds the renderable node tree
//!
//! - `Translator` - Chunked, cancellable intent -> render translation
//! - `RenderNode` - Frame / Instance / Text output tree
//! - `RenderSession` - Per-run font and variable caches

mod node;
mod session;
mod translator;

pub use node::{
    Align, AutoLayout, AxisSizing, DropShadow, FontRef, FrameNode, InstanceNode, LayoutDirection,
    RenderNode, SizingMode, TextRenderNode,
};
pub use session::{BuiltinFontLoader, FontLoader, RenderSession, SessionStats};
pub use translator::{RenderConfig, RenderIssue, RenderOutput, Translator};
