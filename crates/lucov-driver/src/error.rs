use std::path::PathBuf;

/// Driver-level failures, wrapping each upstream crate's own error type
/// as one enum per layer instead of a string tag.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O failure for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] lucov_parser::ParseError),

    #[error(transparent)]
    Transform(#[from] lucov_transform::TransformError),

    #[error(transparent)]
    Codegen(#[from] lucov_codegen::CodegenError),

    #[error(transparent)]
    SourceMap(#[from] lucov_sourcemap::SourceMapError),
}

impl DriverError {
    /// The coarse category string for callers (tests, diagnostics)
    /// that only need to branch on error class, not the full message.
    pub fn category(&self) -> &'static str {
        match self {
            DriverError::Validation(_) => "Validation",
            DriverError::Io { .. } => "IO",
            DriverError::Parse(_) => "Parse",
            DriverError::Transform(_) => "Transform",
            DriverError::Codegen(_) => "Codegen",
            DriverError::SourceMap(_) => "Runtime",
        }
    }
}
