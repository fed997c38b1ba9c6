use std::path::PathBuf;

use lucov_sourcemap::SourceMap;

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::registry::PathRegistry;
use crate::temp_root::TempRoot;

/// The result of one successful `instrument_file` call.
pub struct Instrumented {
    pub instrumented_path: PathBuf,
    pub source_map: SourceMap,
}

/// Owns the process-managed temporary root and path registry for one
/// instrumentation session, and runs the parse -> transform -> codegen
/// -> write -> map pipeline for each file handed to it.
pub struct Driver {
    config: DriverConfig,
    temp_root: TempRoot,
    registry: PathRegistry,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Result<Self, DriverError> {
        Ok(Self {
            config,
            temp_root: TempRoot::new()?,
            registry: PathRegistry::new(),
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    /// Shut down the managed temp root early, removing every
    /// instrumented file this driver ever wrote.
    pub fn shutdown(self) -> Result<(), DriverError> {
        self.temp_root.shutdown()
    }

    /// Run the full orchestration contract for one file: validate,
    /// read, parse, transform, generate, write, map, register. On any
    /// failure, no instrumented file is left behind and no path pair
    /// is registered.
    pub fn instrument_file(&self, path: &str) -> Result<Instrumented, DriverError> {
        if path.trim().is_empty() {
            return Err(DriverError::Validation(
                "input path must be a non-empty string".to_string(),
            ));
        }
        if !self.config.should_instrument(path)? {
            return Err(DriverError::Validation(format!(
                "{path} is excluded by the driver's include/exclude filters"
            )));
        }

        tracing::info!(path, "instrumenting file");

        let original_bytes = std::fs::read(path).map_err(|source| DriverError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        let original_text = String::from_utf8_lossy(&original_bytes).into_owned();

        let ast = lucov_parser::Parser::with_path(&original_text, Some(path)).parse()?;
        tracing::debug!(path, statements = ast.stats.len(), "parsed");

        let (ast, _hint) = lucov_transform::insert_tracking(ast)?;
        tracing::debug!(path, "inserted tracking calls");

        let instrumented_text = lucov_codegen::generate(&ast)?;
        tracing::debug!(path, "generated instrumented source");

        let instrumented_path = self.temp_root.resolve_instrumented_path(path);
        if let Some(parent) = instrumented_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DriverError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&instrumented_path, &instrumented_text).map_err(|source| {
            DriverError::Io {
                path: instrumented_path.clone(),
                source,
            }
        })?;

        let source_map = SourceMap::build(path, &original_text, &instrumented_text);

        self.registry.register(path, instrumented_path.clone());
        tracing::info!(
            path,
            instrumented = %instrumented_path.display(),
            "instrumentation complete"
        );

        Ok(Instrumented {
            instrumented_path,
            source_map,
        })
    }
}
