use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::SourceMapError;

/// A multi-line statement's original-file extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub start: u32,
    pub finish: u32,
}

/// The result of a bidirectional line lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLookup {
    Found(u32),
    /// Only returned by `get_original_line`: the queried instrumented
    /// line holds a synthesised tracking call, not a mapped statement.
    IsTrackingLine,
    NotFound,
}

/// The authoritative mapping between an original file's lines and its
/// instrumented counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMap {
    pub path: String,
    pub original_to_instrumented: BTreeMap<u32, u32>,
    pub instrumented_to_original: BTreeMap<u32, u32>,
    /// Instrumented line -> itself, iff that line holds a tracking call.
    pub tracking_lookup: BTreeMap<u32, u32>,
    /// Keyed by the statement's first original line.
    pub statement_boundaries: BTreeMap<u32, Boundary>,
    pub original_line_count: u32,
    pub instrumented_line_count: u32,
}

impl SourceMap {
    /// Original line -> instrumented line. Checks multi-line boundaries
    /// first, then the direct map, then falls back to the nearest
    /// mapped original line within distance 2.
    pub fn get_instrumented_line(&self, original_line: u32) -> LineLookup {
        for boundary in self.statement_boundaries.values() {
            if original_line >= boundary.start && original_line <= boundary.finish {
                if let Some(&i) = self.original_to_instrumented.get(&boundary.start) {
                    return LineLookup::Found(i);
                }
            }
        }
        if let Some(&i) = self.original_to_instrumented.get(&original_line) {
            return LineLookup::Found(i);
        }
        for distance in 1..=2u32 {
            if original_line > distance {
                if let Some(&i) = self
                    .original_to_instrumented
                    .get(&(original_line - distance))
                {
                    return LineLookup::Found(i);
                }
            }
            if let Some(&i) = self
                .original_to_instrumented
                .get(&(original_line + distance))
            {
                return LineLookup::Found(i);
            }
        }
        LineLookup::NotFound
    }

    /// Instrumented line -> original line. A tracking line is reported
    /// distinctly from an unmapped line.
    pub fn get_original_line(&self, instrumented_line: u32) -> LineLookup {
        if self.tracking_lookup.contains_key(&instrumented_line) {
            return LineLookup::IsTrackingLine;
        }
        match self.instrumented_to_original.get(&instrumented_line) {
            Some(&o) => LineLookup::Found(o),
            None => LineLookup::NotFound,
        }
    }

    /// Every original line covered by the interior (not the `start`) of
    /// a multi-line statement boundary. These lines legitimately break
    /// strict forward/reverse symmetry: several original lines derive
    /// the same instrumented line from their boundary's `start`, while
    /// the reverse map still points only at `start`.
    fn boundary_interior(&self) -> BTreeSet<u32> {
        self.statement_boundaries
            .values()
            .flat_map(|b| (b.start + 1)..=b.finish)
            .collect()
    }

    /// Check every structural invariant. Called after `build` and
    /// after `deserialize`.
    pub fn validate(&self) -> Result<(), SourceMapError> {
        for (&o, &i) in &self.original_to_instrumented {
            if o == 0 || o > self.original_line_count {
                return Err(SourceMapError::Invariant(format!(
                    "original_to_instrumented key {o} out of range [1, {}]",
                    self.original_line_count
                )));
            }
            if i == 0 || i > self.instrumented_line_count {
                return Err(SourceMapError::Invariant(format!(
                    "original_to_instrumented[{o}] = {i} out of range [1, {}]",
                    self.instrumented_line_count
                )));
            }
        }
        for (&i, &o) in &self.instrumented_to_original {
            if i == 0 || i > self.instrumented_line_count {
                return Err(SourceMapError::Invariant(format!(
                    "instrumented_to_original key {i} out of range [1, {}]",
                    self.instrumented_line_count
                )));
            }
            if o == 0 || o > self.original_line_count {
                return Err(SourceMapError::Invariant(format!(
                    "instrumented_to_original[{i}] = {o} out of range [1, {}]",
                    self.original_line_count
                )));
            }
        }

        let interior = self.boundary_interior();
        for (&o, &i) in &self.original_to_instrumented {
            if interior.contains(&o) {
                continue;
            }
            if let Some(&back) = self.instrumented_to_original.get(&i) {
                if back != o {
                    return Err(SourceMapError::Invariant(format!(
                        "asymmetric mapping: o->i has {o}->{i} but i->o has {i}->{back}"
                    )));
                }
            }
        }
        for (&i, &o) in &self.instrumented_to_original {
            if interior.contains(&o) {
                continue;
            }
            if let Some(&fwd) = self.original_to_instrumented.get(&o) {
                if fwd != i {
                    return Err(SourceMapError::Invariant(format!(
                        "asymmetric mapping: i->o has {i}->{o} but o->i has {o}->{fwd}"
                    )));
                }
            }
        }

        let forward_values: BTreeSet<u32> = self.original_to_instrumented.values().copied().collect();
        for &i in self.tracking_lookup.keys() {
            if forward_values.contains(&i) {
                return Err(SourceMapError::Invariant(format!(
                    "tracking line {i} also appears as an original_to_instrumented target"
                )));
            }
        }

        for (&start, boundary) in &self.statement_boundaries {
            if boundary.start != start {
                return Err(SourceMapError::Invariant(format!(
                    "statement_boundaries key {start} does not match its own start {}",
                    boundary.start
                )));
            }
            if start > boundary.finish || boundary.finish > self.original_line_count {
                return Err(SourceMapError::Invariant(format!(
                    "statement boundary {start}..{} is out of range",
                    boundary.finish
                )));
            }
            if !self.original_to_instrumented.contains_key(&start) {
                return Err(SourceMapError::Invariant(format!(
                    "statement boundary starting at {start} has no original_to_instrumented entry"
                )));
            }
        }

        Ok(())
    }

    /// Self-describing JSON payload.
    pub fn serialize(&self) -> String {
        serde_json::to_string_pretty(self).expect("SourceMap always serializes")
    }

    /// Parse a payload produced by [`SourceMap::serialize`] (or an
    /// older one, tolerating a boolean-valued `tracking_lookup`).
    pub fn deserialize(s: &str) -> Result<SourceMap, SourceMapError> {
        let raw: RawSourceMap =
            serde_json::from_str(s).map_err(|e| SourceMapError::Runtime(e.to_string()))?;
        Ok(raw.into())
    }
}

/// Legacy payloads stored `tracking_lookup` values as booleans instead
/// of the line number itself; `true` is coerced to the key.
#[derive(Deserialize)]
#[serde(untagged)]
enum TrackingValue {
    Line(u32),
    Flag(bool),
}

#[derive(Deserialize)]
struct RawSourceMap {
    path: String,
    original_to_instrumented: BTreeMap<u32, u32>,
    instrumented_to_original: BTreeMap<u32, u32>,
    #[serde(default)]
    tracking_lookup: BTreeMap<u32, TrackingValue>,
    #[serde(default)]
    statement_boundaries: BTreeMap<u32, Boundary>,
    original_line_count: u32,
    instrumented_line_count: u32,
}

impl From<RawSourceMap> for SourceMap {
    fn from(raw: RawSourceMap) -> Self {
        let mut original_to_instrumented = raw.original_to_instrumented;
        let mut instrumented_to_original = raw.instrumented_to_original;

        for (&o, &i) in &original_to_instrumented {
            instrumented_to_original.entry(i).or_insert(o);
        }
        for (&i, &o) in &instrumented_to_original {
            original_to_instrumented.entry(o).or_insert(i);
        }

        let mut tracking_lookup = BTreeMap::new();
        for (k, v) in raw.tracking_lookup {
            match v {
                TrackingValue::Line(n) => {
                    tracking_lookup.insert(k, n);
                }
                TrackingValue::Flag(true) => {
                    tracking_lookup.insert(k, k);
                }
                TrackingValue::Flag(false) => {}
            }
        }

        SourceMap {
            path: raw.path,
            original_to_instrumented,
            instrumented_to_original,
            tracking_lookup,
            statement_boundaries: raw.statement_boundaries,
            original_line_count: raw.original_line_count,
            instrumented_line_count: raw.instrumented_line_count,
        }
    }
}

impl<'de> Deserialize<'de> for SourceMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawSourceMap::deserialize(deserializer).map(SourceMap::from)
    }
}
