//! Error types for the designer crate.

use thiserror::Error;

/// Errors raised while interpreting names coming from outside the core,
/// such as tool names from a toolbar or handle ids from the renderer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The tool name is not one the editor knows.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The handle id is not one of the eight resize handles or `rotate`.
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),

    /// The element type name is not recognised.
    #[error("Unknown element type: {0}")]
    UnknownElementKind(String),
}

/// Result type for designer parsing operations
pub type Result<T> = std::result::Result<T, ToolError>;
