//! MCP tool implementations for PDF operations.

pub mod page;
pub mod render;
pub mod text;

// Re-export common types
pub use page::*;
pub use render::*;
pub use text::*;
