/// Transformer precondition violations.
///
/// The transformer never produces these from a well-formed AST — they
/// exist for hosts that build an AST by hand (e.g. in tests or tooling)
/// and pass it through the same entry point as a parsed one.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("input block is not a valid AST: {0}")]
    InvalidAst(String),
}
