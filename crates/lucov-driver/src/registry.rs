use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only `(original_path, instrumented_path)` pairs so a host's
/// coverage runtime can attribute a hit under the instrumented path
/// back to the original one. Guarded by
/// a single mutex so concurrent `instrument_file` calls against one
/// `Driver` need no external locking; a fresh `Driver` owns its own
/// registry, so two drivers share nothing.
#[derive(Default)]
pub struct PathRegistry {
    pairs: Mutex<Vec<(String, PathBuf)>>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, original_path: impl Into<String>, instrumented_path: PathBuf) {
        self.pairs
            .lock()
            .expect("path registry mutex poisoned")
            .push((original_path.into(), instrumented_path));
    }

    pub fn lookup_by_instrumented(&self, instrumented_path: &Path) -> Option<String> {
        self.pairs
            .lock()
            .expect("path registry mutex poisoned")
            .iter()
            .find(|(_, i)| i == instrumented_path)
            .map(|(o, _)| o.clone())
    }

    pub fn len(&self) -> usize {
        self.pairs.lock().expect("path registry mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
