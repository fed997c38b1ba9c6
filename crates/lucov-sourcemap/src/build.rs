use std::collections::BTreeMap;

use crate::model::{Boundary, SourceMap};

const LOOKAHEAD_WINDOW: usize = 5;
const TRACKING_MARKER: &str = "TRACK_NS.track";

/// Split into physical lines the way a line count is conventionally
/// reported: `"a\n"` is one line, `"a\n\n"` is two (the blank line
/// counts), and `""` is zero.
fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Build the authoritative SourceMap by diff-aligning `original` and
/// `instrumented`. Never fails: unmatched lines degrade to a
/// `tracing::warn!` diagnostic, not an error.
pub fn build(path: &str, original: &str, instrumented: &str) -> SourceMap {
    let o_lines = split_lines(original);
    let i_lines = split_lines(instrumented);
    let original_line_count = o_lines.len() as u32;
    let instrumented_line_count = i_lines.len() as u32;

    let mut tracking_lookup = BTreeMap::new();
    for (idx, line) in i_lines.iter().enumerate() {
        if line.contains(TRACKING_MARKER) {
            let i = (idx + 1) as u32;
            tracking_lookup.insert(i, i);
        }
    }

    // Precomputed against the original text alone, independent of
    // whether the diff walk below finds a per-line match for its
    // interior — the code generator is free to re-flow a multi-line
    // statement onto one output line (e.g. a call whose arguments
    // spanned several lines), and the boundary still has to be
    // recognised in that case (see `resolve_boundary_start`).
    let boundary_spans = precompute_boundary_spans(&o_lines);

    let mut original_to_instrumented = BTreeMap::new();
    let mut instrumented_to_original = BTreeMap::new();

    let m = o_lines.len();
    let n = i_lines.len();
    let mut o = 1usize;
    let mut i = 1usize;

    while o <= m && i <= n {
        while i <= n && tracking_lookup.contains_key(&(i as u32)) {
            i += 1;
        }
        if i > n {
            break;
        }

        if let Some(&finish) = boundary_spans.get(&o) {
            if let Some(next_i) = resolve_boundary_start(
                o,
                finish,
                i,
                &o_lines,
                &i_lines,
                &tracking_lookup,
                &mut original_to_instrumented,
                &mut instrumented_to_original,
            ) {
                o = finish + 1;
                i = next_i;
                continue;
            }
        }

        if lines_equivalent(o_lines[o - 1], i_lines[i - 1]) {
            record_mapping(
                &mut original_to_instrumented,
                &mut instrumented_to_original,
                o,
                i,
            );
            o += 1;
            i += 1;
            continue;
        }

        match find_lookahead_match(o, i, &o_lines, &i_lines, &tracking_lookup) {
            Some((oo, ii)) => {
                record_mapping(
                    &mut original_to_instrumented,
                    &mut instrumented_to_original,
                    oo,
                    ii,
                );
                o = oo + 1;
                i = ii + 1;
            }
            None => {
                tracing::warn!(
                    path,
                    original_line = o,
                    instrumented_line = i,
                    "diff-align: no equivalent line found within the look-ahead window"
                );
                o += 1;
                i += 1;
            }
        }
    }

    derive_boundary_mappings(&boundary_spans, &mut original_to_instrumented);

    let statement_boundaries = boundary_spans
        .into_iter()
        .filter(|(start, _)| original_to_instrumented.contains_key(&(*start as u32)))
        .map(|(start, finish)| {
            (
                start as u32,
                Boundary {
                    start: start as u32,
                    finish: finish as u32,
                },
            )
        })
        .collect();

    SourceMap {
        path: path.to_string(),
        original_to_instrumented,
        instrumented_to_original,
        tracking_lookup,
        statement_boundaries,
        original_line_count,
        instrumented_line_count,
    }
}

/// Decide how a multi-line original statement (`start..=finish`) was
/// rendered and consume it accordingly.
///
/// If the instrumented text still carries one output line per original
/// line (the statement's closing line lands where a line-for-line
/// projection predicts), fall through to the caller's normal per-line
/// walk by returning `None` — the ordinary equivalence/look-ahead logic
/// will match each line on its own. Otherwise the code generator
/// collapsed the whole statement onto a single output line: consume
/// every original line in the span at once, map `start` to the current
/// instrumented cursor, and let the post-pass derive the interior.
fn resolve_boundary_start(
    start: usize,
    finish: usize,
    i: usize,
    o_lines: &[&str],
    i_lines: &[&str],
    tracking_lookup: &BTreeMap<u32, u32>,
    original_to_instrumented: &mut BTreeMap<u32, u32>,
    instrumented_to_original: &mut BTreeMap<u32, u32>,
) -> Option<usize> {
    let projected_i = i + (finish - start);
    let preserved = projected_i <= i_lines.len()
        && !tracking_lookup.contains_key(&(projected_i as u32))
        && lines_equivalent(o_lines[finish - 1], i_lines[projected_i - 1]);
    if preserved {
        return None;
    }

    record_mapping(original_to_instrumented, instrumented_to_original, start, i);
    Some(i + 1)
}

fn record_mapping(
    original_to_instrumented: &mut BTreeMap<u32, u32>,
    instrumented_to_original: &mut BTreeMap<u32, u32>,
    o: usize,
    i: usize,
) {
    original_to_instrumented.insert(o as u32, i as u32);
    instrumented_to_original.insert(i as u32, o as u32);
}

/// Every unmapped original line strictly inside a statement boundary
/// derives its instrumented line from the boundary's `start`.
fn derive_boundary_mappings(
    boundary_spans: &BTreeMap<usize, usize>,
    original_to_instrumented: &mut BTreeMap<u32, u32>,
) {
    for (&start, &finish) in boundary_spans {
        let Some(&start_instrumented) = original_to_instrumented.get(&(start as u32)) else {
            continue;
        };
        for o in (start + 1)..=finish {
            original_to_instrumented
                .entry(o as u32)
                .or_insert(start_instrumented);
        }
    }
}

fn find_lookahead_match(
    o: usize,
    i: usize,
    o_lines: &[&str],
    i_lines: &[&str],
    tracking_lookup: &BTreeMap<u32, u32>,
) -> Option<(usize, usize)> {
    for distance in 1..=LOOKAHEAD_WINDOW {
        for d_o in 0..=distance {
            let d_i = distance - d_o;
            let oo = o + d_o;
            let ii = i + d_i;
            if oo > o_lines.len() || ii > i_lines.len() {
                continue;
            }
            if tracking_lookup.contains_key(&(ii as u32)) {
                continue;
            }
            if lines_equivalent(o_lines[oo - 1], i_lines[ii - 1]) {
                return Some((oo, ii));
            }
        }
    }
    None
}

fn lines_equivalent(a: &str, b: &str) -> bool {
    a == b || whitespace_normalized(a) == whitespace_normalized(b) || core_content(a) == core_content(b)
}

fn whitespace_normalized(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_line_comment(s: &str) -> &str {
    match s.find("--") {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Remove a tracking-call substring like `TRACK_NS.track(12)` so a
/// tracked and untracked rendering of the same statement still compare
/// equal at the "core content" equivalence tier.
fn strip_tracking_call(s: &str) -> std::borrow::Cow<'_, str> {
    let Some(start) = s.find(TRACKING_MARKER) else {
        return std::borrow::Cow::Borrowed(s);
    };
    let Some(rel_close) = s[start..].find(')') else {
        return std::borrow::Cow::Borrowed(s);
    };
    let end = start + rel_close + 1;
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..start]);
    out.push_str(&s[end..]);
    std::borrow::Cow::Owned(out)
}

fn core_content(s: &str) -> String {
    let without_comment = strip_line_comment(s);
    let without_tracking = strip_tracking_call(without_comment);
    whitespace_normalized(&without_tracking)
}

const OPENERS: &[char] = &['(', '{', '['];
const CLOSERS: &[char] = &[')', '}', ']'];
const EOL_CONTINUATIONS: &[&str] = &[
    "..", "==", "~=", "<=", ">=", "and", "or", "+", "-", "*", "/", "%", "^", "=", "<", ">",
];

fn bracket_delta(trimmed: &str) -> i32 {
    let opens = trimmed.chars().filter(|c| OPENERS.contains(c)).count() as i32;
    let closes = trimmed.chars().filter(|c| CLOSERS.contains(c)).count() as i32;
    opens - closes
}

fn ends_with_continuation(trimmed: &str) -> bool {
    EOL_CONTINUATIONS.iter().any(|tok| trimmed.ends_with(tok))
}

/// Multi-line statement detection, driven by net bracket depth across
/// the original file's lines rather than a same-line end-delimiter
/// heuristic, so a statement like `print(\n  a,\n  b\n)` is still
/// recognised even though its interior lines end in a comma, not an
/// opener. Returns `start -> finish`.
fn precompute_boundary_spans(o_lines: &[&str]) -> BTreeMap<usize, usize> {
    let mut spans = BTreeMap::new();
    let mut open_start: Option<usize> = None;
    let mut open_depth: i32 = 0;

    for (idx, line) in o_lines.iter().enumerate() {
        let o = idx + 1;
        let trimmed = line.trim();
        let delta = bracket_delta(trimmed);

        match open_start {
            None => {
                open_depth += delta;
                if open_depth > 0 || ends_with_continuation(trimmed) {
                    open_start = Some(o);
                } else {
                    open_depth = 0;
                }
            }
            Some(start) => {
                open_depth += delta;
                let continuation = open_depth > 0 || ends_with_continuation(trimmed);
                if !continuation {
                    if o > start {
                        spans.insert(start, o);
                    }
                    open_start = None;
                    open_depth = 0;
                }
            }
        }
    }

    spans
}
