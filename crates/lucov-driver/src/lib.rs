//! Thin composition contract: reads a file, runs the
//! parser -> transformer -> code generator -> source map pipeline,
//! writes the instrumented output under a process-managed temporary
//! root, and registers the `(original, instrumented)` pair.

mod config;
mod driver;
mod error;
mod registry;
mod temp_root;

#[cfg(test)]
mod tests;

pub use config::DriverConfig;
pub use driver::{Driver, Instrumented};
pub use error::DriverError;
pub use registry::PathRegistry;
pub use temp_root::TempRoot;

/// Free-function form of [`Driver::instrument_file`].
pub fn instrument_file(driver: &Driver, path: &str) -> Result<Instrumented, DriverError> {
    driver.instrument_file(path)
}
