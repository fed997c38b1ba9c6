/// Source-map failures.
///
/// Diff-alignment itself is never fatal — an unmatched line pair
/// degrades to a `tracing::warn!` diagnostic, not an `Err` here. This
/// type only covers malformed inputs and the serialization boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceMapError {
    #[error("invalid source map input: {0}")]
    Validation(String),
    #[error("source map violates an invariant: {0}")]
    Invariant(String),
    #[error("failed to deserialize source map: {0}")]
    Runtime(String),
}
