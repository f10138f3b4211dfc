use thiserror::Error;

/// Malformed path or link inside a translation tree.
///
/// These only arise from authoring data, so loaders report them as load
/// errors rather than letting them reach request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("empty tree path")]
    EmptyPath,

    #[error("empty segment in tree path '{path}'")]
    EmptySegment { path: String },

    #[error("tree path '{path}' walks above the root")]
    AboveRoot { path: String },

    #[error("the root node cannot be linked")]
    LinkRoot,

    #[error("linking '{path}' to '{target}' would create a cycle")]
    LinkCycle { path: String, target: String },
}
