//! Source-to-source coverage instrumentation engine for Lua.
//!
//! `lucov` re-exports the public surface of its component crates so a
//! host only depends on this one: parse a file, insert tracking calls,
//! render it back to source, and get a [`SourceMap`] relating every
//! original line to its instrumented counterpart.
//!
//! ```no_run
//! use lucov::{Driver, DriverConfig};
//!
//! let driver = Driver::new(DriverConfig::default())?;
//! let result = lucov::instrument_file(&driver, "main.lua")?;
//! println!("wrote {}", result.instrumented_path.display());
//! # Ok::<(), lucov::DriverError>(())
//! ```

pub use lucov_codegen::CodegenError;
pub use lucov_driver::{
    instrument_file, Driver, DriverConfig, DriverError, Instrumented, PathRegistry, TempRoot,
};
pub use lucov_parser::{ParseError, ParseErrorKind, Parser};
pub use lucov_parser::ast;
pub use lucov_sourcemap::{Boundary, LineLookup, SourceMap, SourceMapError};
pub use lucov_transform::{insert_tracking, HintMap, TransformError};
