/// Code generation failures.
///
/// The renderer is a total function over a well-formed [`lucov_parser::ast::Block`]
/// — every variant renders unconditionally — so in practice this only
/// fires for the same hand-built-AST inputs `lucov_transform::TransformError`
/// guards against.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("cannot render AST: {0}")]
    InvalidAst(String),
}
