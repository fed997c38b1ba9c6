use pretty_assertions::assert_eq;

use crate::{LineLookup, SourceMap};

/// Drive the real parse -> transform -> codegen pipeline, the way
/// `lucov-driver` does, so fixture-based tests exercise the actual
/// codegen output rather than a hand-written stand-in for it.
fn instrument(original: &str) -> (String, SourceMap) {
    let ast = lucov_parser::Parser::new(original)
        .parse()
        .expect("fixture must parse");
    let (ast, _hint) = lucov_transform::insert_tracking(ast).expect("transform must succeed");
    let instrumented = lucov_codegen::generate(&ast).expect("codegen must succeed");
    let map = SourceMap::build("fixture.lua", original, &instrumented);
    (instrumented, map)
}

#[test]
fn s1_single_statement() {
    let original = "return 42\n";
    let instrumented = "TRACK_NS.track(1)\nreturn 42\n";
    let map = SourceMap::build("s1.lua", original, instrumented);
    map.validate().unwrap();

    assert_eq!(map.original_to_instrumented.get(&1), Some(&2));
    assert_eq!(map.instrumented_to_original.get(&2), Some(&1));
    assert!(map.tracking_lookup.contains_key(&1));
    assert_eq!(map.original_line_count, 1);
    assert_eq!(map.instrumented_line_count, 2);
}

#[test]
fn s3_multiline_call_gets_one_boundary() {
    // The code generator does not preserve the original line breaks
    // inside a call's argument list, so all four original lines
    // collapse onto the single output line following the tracking call.
    let original = "print(\n  \"hello\",\n  \"world\"\n)\n";
    let instrumented = "TRACK_NS.track(1)\nprint(\"hello\", \"world\")\n";
    let map = SourceMap::build("s3.lua", original, instrumented);
    map.validate().unwrap();

    let boundary = map
        .statement_boundaries
        .get(&1)
        .expect("multi-line call should register a boundary starting at line 1");
    assert_eq!(boundary.start, 1);
    assert_eq!(boundary.finish, 4);

    let target = map.original_to_instrumented.get(&1).copied().unwrap();
    for original_line in 2..=4 {
        assert_eq!(
            map.original_to_instrumented.get(&original_line),
            Some(&target),
            "every line of the call should derive the same instrumented line"
        );
    }
}

#[test]
fn s4_tracking_line_is_distinct_from_unmapped() {
    let original = "return 42\n";
    let instrumented = "TRACK_NS.track(1)\nreturn 42\n";
    let map = SourceMap::build("s4.lua", original, instrumented);

    assert_eq!(map.get_original_line(1), LineLookup::IsTrackingLine);
    assert_eq!(map.get_original_line(2), LineLookup::Found(1));
    assert_eq!(map.get_original_line(99), LineLookup::NotFound);
}

#[test]
fn s5_serialize_then_deserialize_round_trips() {
    let original = "local x = 1\nif x > 0 then\n  return x\nend\n";
    let instrumented = "TRACK_NS.track(1)\nlocal x = 1\nTRACK_NS.track(2)\nif x > 0 then\n  TRACK_NS.track(3)\n  return x\nend\n";
    let map = SourceMap::build("s5.lua", original, instrumented);
    map.validate().unwrap();

    let payload = map.serialize();
    let restored = SourceMap::deserialize(&payload).unwrap();
    restored.validate().unwrap();

    assert_eq!(restored, map);
    for original_line in 1..=map.original_line_count {
        assert_eq!(
            restored.get_instrumented_line(original_line),
            map.get_instrumented_line(original_line)
        );
    }
}

#[test]
fn empty_file_produces_an_empty_map() {
    let map = SourceMap::build("empty.lua", "", "");
    map.validate().unwrap();
    assert!(map.original_to_instrumented.is_empty());
    assert!(map.instrumented_to_original.is_empty());
    assert_eq!(map.original_line_count, 0);
    assert_eq!(map.instrumented_line_count, 0);
}

#[test]
fn comment_only_file_maps_lines_identically_with_no_tracking() {
    // Drives the real parse -> transform -> codegen pipeline: a
    // comment-only file has no executable statements, so codegen must
    // still re-emit the comments themselves (as the block's trailing
    // comments) rather than collapsing the output to "".
    let original = "-- just a comment\n-- another one\n";
    let (instrumented, map) = instrument(original);
    assert_eq!(instrumented, original);
    map.validate().unwrap();

    assert!(map.tracking_lookup.is_empty());
    assert_eq!(map.original_to_instrumented.get(&1), Some(&1));
    assert_eq!(map.original_to_instrumented.get(&2), Some(&2));
}

#[test]
fn legacy_boolean_tracking_lookup_is_coerced_to_its_key() {
    let payload = r#"{
        "path": "legacy.lua",
        "original_to_instrumented": {"1": 2},
        "instrumented_to_original": {"2": 1},
        "tracking_lookup": {"1": true, "5": false},
        "statement_boundaries": {},
        "original_line_count": 1,
        "instrumented_line_count": 2
    }"#;
    let map = SourceMap::deserialize(payload).unwrap();
    assert_eq!(map.tracking_lookup.get(&1), Some(&1));
    assert_eq!(map.tracking_lookup.get(&5), None);
}

#[test]
fn deserialize_rebuilds_missing_reverse_entries() {
    let payload = r#"{
        "path": "asymmetric.lua",
        "original_to_instrumented": {"1": 2, "2": 4},
        "instrumented_to_original": {},
        "original_line_count": 2,
        "instrumented_line_count": 4
    }"#;
    let map = SourceMap::deserialize(payload).unwrap();
    assert_eq!(map.instrumented_to_original.get(&2), Some(&1));
    assert_eq!(map.instrumented_to_original.get(&4), Some(&2));
    assert!(map.statement_boundaries.is_empty());
}

#[test]
fn get_instrumented_line_falls_back_to_a_nearby_mapped_line() {
    let original = "local a = 1\nlocal b = 2\nlocal c = 3\n";
    let instrumented =
        "TRACK_NS.track(1)\nlocal a = 1\nTRACK_NS.track(2)\nlocal b = 2\nTRACK_NS.track(3)\nlocal c = 3\n";
    let mut map = SourceMap::build("near.lua", original, instrumented);
    map.original_to_instrumented.remove(&2);
    map.instrumented_to_original.remove(&4);

    match map.get_instrumented_line(2) {
        LineLookup::Found(_) => {}
        other => panic!("expected a nearby fallback match, got {other:?}"),
    }
}

#[test]
fn validate_rejects_a_tracking_line_also_used_as_a_mapping_target() {
    let mut map = SourceMap::build("identity.lua", "return 1\n", "return 1\n");
    map.tracking_lookup.insert(1, 1);
    assert!(map.validate().is_err());
}
