//! Inserts a `TRACK_NS.track(line)` call before every executable Lua
//! statement, post-order, so tracking calls inside nested blocks never
//! shift the decision the parent block makes about its own statements.

mod error;
mod hint_map;
mod pass;

#[cfg(test)]
mod tests;

pub use error::TransformError;
pub use hint_map::HintMap;

use lucov_parser::ast::Block;

/// Insert tracking calls throughout `block`, returning the rewritten
/// tree and the construction-time hint map.
///
/// The hint map is best-effort: it assumes the code generator emits
/// exactly one physical line per `Stat` it was built from (two for an
/// executable one, for the tracking call plus the statement itself).
/// That assumption does not always hold once headers like `if ... then`
/// and `end` are rendered, so callers that need an authoritative
/// mapping should build a [`lucov_sourcemap::SourceMap`] against the
/// code generator's actual output instead of relying on this map.
pub fn insert_tracking(mut block: Block) -> Result<(Block, HintMap), TransformError> {
    let mut hint = HintMap::new();
    pass::transform_block(&mut block, &mut hint);
    Ok((block, hint))
}
