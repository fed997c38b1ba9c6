use pretty_assertions::assert_eq;

use lucov_parser::ast::{Expr, IndexKey, Stat};
use lucov_parser::Parser;

use crate::insert_tracking;

fn parse(src: &str) -> lucov_parser::ast::Block {
    Parser::new(src).parse().expect("fixture must parse")
}

/// The tracking call this crate inserts always has the shape
/// `TRACK_NS.track(<line>)`. Pull the line argument back out so tests
/// can assert on it without repeating the AST shape everywhere.
fn tracked_line(stat: &Stat) -> Option<u32> {
    let Stat::Call {
        call: Expr::Call { callee, args, .. },
        ..
    } = stat
    else {
        return None;
    };
    let Expr::Index { base, key } = callee.as_ref() else {
        return None;
    };
    let Expr::Id(name) = base.as_ref() else {
        return None;
    };
    if name != "TRACK_NS" {
        return None;
    }
    if !matches!(key, IndexKey::Name(n) if n == "track") {
        return None;
    }
    match args.as_slice() {
        [Expr::Number { value, .. }] => Some(*value as u32),
        _ => None,
    }
}

#[test]
fn single_return_gets_one_tracking_call() {
    // S1: a single executable statement.
    let block = parse("return 42\n");
    let (block, hint) = insert_tracking(block).unwrap();

    assert_eq!(block.stats.len(), 2);
    assert_eq!(tracked_line(&block.stats[0]), Some(1));
    assert!(matches!(block.stats[1], Stat::Return { line: 1, .. }));

    assert_eq!(hint.original_to_instrumented.get(&1), Some(&2));
    assert_eq!(hint.instrumented_to_original.get(&2), Some(&1));
    assert!(hint.tracking_lookup.contains(&1));
}

#[test]
fn branch_gets_tracking_calls_in_every_body() {
    // S2: an `if` with both branches populated.
    let block = parse(
        "if x then\n  return 1\nelse\n  return 2\nend\n",
    );
    let (block, _hint) = insert_tracking(block).unwrap();

    assert_eq!(block.stats.len(), 2, "one tracking call + the if itself");
    let Stat::If {
        clauses,
        else_block,
        ..
    } = &block.stats[1]
    else {
        panic!("expected If statement");
    };
    let (_, then_body) = &clauses[0];
    assert_eq!(then_body.stats.len(), 2);
    assert!(tracked_line(&then_body.stats[0]).is_some());

    let else_body = else_block.as_ref().expect("else body present");
    assert_eq!(else_body.stats.len(), 2);
    assert!(tracked_line(&else_body.stats[0]).is_some());
}

#[test]
fn nested_function_body_is_instrumented_independently() {
    let block = parse("local function f()\n  local a = 1\nend\n");
    let (block, _hint) = insert_tracking(block).unwrap();

    assert_eq!(block.stats.len(), 2);
    let Stat::LocalRecDecl { body, .. } = &block.stats[1] else {
        panic!("expected LocalRecDecl");
    };
    assert_eq!(body.stats.len(), 2);
    assert!(tracked_line(&body.stats[0]).is_some());
    assert!(matches!(body.stats[1], Stat::LocalDecl { .. }));
}

#[test]
fn function_literal_nested_in_an_expression_is_also_instrumented() {
    // The function passed to `setmetatable` should get its own tracking
    // call even though it never appears as a top-level `Stat`.
    let block = parse("callback(function()\n  doit()\nend)\n");
    let (block, _hint) = insert_tracking(block).unwrap();

    assert_eq!(block.stats.len(), 2, "the outer call is itself tracked");
    let Stat::Call {
        call: Expr::Call { args, .. },
        ..
    } = &block.stats[1]
    else {
        panic!("expected outer Call");
    };
    let Expr::Function { body, .. } = &args[0] else {
        panic!("expected function literal argument");
    };
    assert_eq!(body.stats.len(), 2);
    assert!(tracked_line(&body.stats[0]).is_some());
}

#[test]
fn non_executable_statements_are_left_untouched() {
    // `do ... end` and `break` are parsed but outside Table 3.1's
    // tracked alphabet, so they never get a preceding tracking call.
    let block = parse("while true do\n  break\nend\n");
    let (block, _hint) = insert_tracking(block).unwrap();

    assert_eq!(block.stats.len(), 2, "only the while loop itself is tracked");
    let Stat::While { body, .. } = &block.stats[1] else {
        panic!("expected While statement");
    };
    assert_eq!(
        body.stats.len(),
        1,
        "break is not executable and gets no tracking call"
    );
    assert!(matches!(body.stats[0], Stat::Break { .. }));
}

#[test]
fn insertion_is_one_to_one_with_executable_statements() {
    // The number of tracking calls inserted into a flat block equals
    // the number of executable statements it started with.
    let block = parse(
        "local a = 1\nlocal b = 2\nprint(a)\na = a + b\nreturn a\n",
    );
    let original_count = block.stats.len();
    let (transformed, _hint) = insert_tracking(block).unwrap();

    let tracking_calls = transformed
        .stats
        .iter()
        .filter(|s| tracked_line(s).is_some())
        .count();
    assert_eq!(tracking_calls, original_count);
    assert_eq!(transformed.stats.len(), original_count * 2);
}

#[test]
fn empty_block_produces_no_tracking_calls() {
    let block = parse("");
    let (block, hint) = insert_tracking(block).unwrap();
    assert!(block.stats.is_empty());
    assert!(hint.tracking_lookup.is_empty());
}
