use std::collections::{BTreeMap, BTreeSet};

/// The transformer's best-effort, construction-time line correspondence.
/// It is *not* authoritative — the
/// code generator's actual layout can differ from what this pass
/// assumes, which is why `lucov-sourcemap` rebuilds the real mapping by
/// diffing the two emitted texts. This map exists so a caller that only
/// has the AST (no text yet) can get an approximate answer cheaply, and
/// so the transformer's own tests can assert its insertion logic
/// without invoking a code generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintMap {
    pub original_to_instrumented: BTreeMap<u32, u32>,
    pub instrumented_to_original: BTreeMap<u32, u32>,
    pub tracking_lookup: BTreeSet<u32>,
    pub current_line: u32,
}

impl HintMap {
    pub fn new() -> Self {
        Self::default()
    }
}
