use thiserror::Error;

/// Fatal pipeline conditions. Any of these aborts the run before output
/// is emitted; a half-rewritten module is unsafe to feed downstream.
#[derive(Debug, Error)]
pub enum TransformError {
    /// No statement calls the export function; there is nowhere to anchor
    /// the optimizer annotations.
    #[error("entry point not found: no call to `{0}`")]
    EntryPointNotFound(String),

    /// More than one export call; the annotation target is ambiguous.
    #[error("ambiguous entry point: {count} calls to `{name}`")]
    AmbiguousEntryPoint { name: String, count: usize },

    /// The export call's argument could not be traced to an application
    /// constructor call.
    #[error("cannot resolve the application constructor behind `{0}`")]
    UnresolvedConstructor(String),

    /// A patch-table replacement body is not parseable statement text.
    /// This is a configuration defect, not an input condition.
    #[error("replacement body for `{name}` is not valid JavaScript")]
    InvalidPatch { name: String },
}
