use indoc::indoc;

use crate::ast::{BinOp, Expr, Stat};
use crate::error::ParseErrorKind;
use crate::Parser;

fn parse(src: &str) -> crate::ast::Block {
    Parser::new(src).parse().unwrap_or_else(|e| panic!("parse failed: {e}"))
}

#[test]
fn empty_file_parses_to_empty_block() {
    let block = parse("");
    assert!(block.stats.is_empty());
}

#[test]
fn comment_only_file_has_no_statements_but_keeps_its_comments() {
    let block = parse("-- just a comment\n-- another one\n");
    assert!(block.stats.is_empty());
    assert_eq!(block.trailing_comments.len(), 2);
}

#[test]
fn trailing_comment_before_end_is_kept_on_the_block() {
    let block = parse(indoc! {"
        if x then
          return 1
          -- trailing
        end
    "});
    let Stat::If { clauses, .. } = &block.stats[0] else {
        panic!("expected If");
    };
    assert_eq!(clauses[0].1.trailing_comments.len(), 1);
}

#[test]
fn single_return_statement() {
    // S1: single statement end-to-end.
    let block = parse("return 42\n");
    assert_eq!(block.stats.len(), 1);
    match &block.stats[0] {
        Stat::Return { values, line, .. } => {
            assert_eq!(*line, 1);
            assert_eq!(values.len(), 1);
            assert!(matches!(values[0], Expr::Number { value, .. } if value == 42.0));
        }
        other => panic!("expected Return, got {other:?}"),
    }
}

#[test]
fn return_with_no_values_is_valid() {
    let block = parse("return\n");
    match &block.stats[0] {
        Stat::Return { values, .. } => assert!(values.is_empty()),
        other => panic!("expected Return, got {other:?}"),
    }
}

#[test]
fn branch_statement() {
    // S2: branch end-to-end.
    let block = parse(indoc! {"
        local x = 1
        if x > 0 then
          return x
        end
    "});
    assert_eq!(block.stats.len(), 2);
    assert!(matches!(block.stats[0], Stat::LocalDecl { line: 1, .. }));
    match &block.stats[1] {
        Stat::If { clauses, else_block, line, .. } => {
            assert_eq!(*line, 2);
            assert!(else_block.is_none());
            assert_eq!(clauses.len(), 1);
            assert!(matches!(clauses[0].0, Expr::BinOp { op: BinOp::Gt, .. }));
            assert_eq!(clauses[0].1.stats.len(), 1);
        }
        other => panic!("expected If, got {other:?}"),
    }
}

#[test]
fn multiline_call_is_one_statement_spanning_lines() {
    // S3: multi-line call end-to-end.
    let block = parse(indoc! {r#"
        print(
          "hello",
          "world"
        )
    "#});
    assert_eq!(block.stats.len(), 1);
    assert!(matches!(block.stats[0], Stat::Call { line: 1, .. }));
}

#[test]
fn method_invocation_is_tracked_distinctly_from_call() {
    let block = parse("obj:method(1, 2)\n");
    assert!(matches!(block.stats[0], Stat::MethodInvoke { .. }));
}

#[test]
fn numeric_for_and_generic_for() {
    let block = parse("for i = 1, 10 do end\nfor k, v in pairs(t) do end\n");
    assert!(matches!(block.stats[0], Stat::NumericFor { .. }));
    assert!(matches!(block.stats[1], Stat::GenericFor { .. }));
}

#[test]
fn while_and_repeat_until() {
    let block = parse("while true do end\nrepeat until false\n");
    assert!(matches!(block.stats[0], Stat::While { .. }));
    assert!(matches!(block.stats[1], Stat::RepeatUntil { .. }));
}

#[test]
fn local_function_is_local_rec_decl() {
    let block = parse("local function f(a, b) return a + b end\n");
    match &block.stats[0] {
        Stat::LocalRecDecl { name, params, .. } => {
            assert_eq!(name, "f");
            assert_eq!(params, &["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected LocalRecDecl, got {other:?}"),
    }
}

#[test]
fn named_function_statement_desugars_to_assign() {
    let block = parse("function f(a, b) return a + b end\n");
    match &block.stats[0] {
        Stat::Assign { targets, values, .. } => {
            assert!(matches!(&targets[0], Expr::Id(name) if name == "f"));
            assert!(matches!(&values[0], Expr::Function { params, .. } if params == &["a".to_string(), "b".to_string()]));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn dotted_function_statement_targets_an_index_chain() {
    let block = parse("function mod.sub.f() end\n");
    match &block.stats[0] {
        Stat::Assign { targets, .. } => {
            assert!(matches!(&targets[0], Expr::Index { .. }));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn method_function_statement_gets_an_implicit_self_param() {
    let block = parse("function obj:m(a) end\n");
    match &block.stats[0] {
        Stat::Assign { values, .. } => match &values[0] {
            Expr::Function { params, .. } => {
                assert_eq!(params, &["self".to_string(), "a".to_string()]);
            }
            other => panic!("expected Function, got {other:?}"),
        },
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn multiple_assignment_targets() {
    let block = parse("a, b = b, a\n");
    match &block.stats[0] {
        Stat::Assign { targets, values, .. } => {
            assert_eq!(targets.len(), 2);
            assert_eq!(values.len(), 2);
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn long_bracket_string_literal() {
    let block = parse("local s = [[hello\nworld]]\n");
    match &block.stats[0] {
        Stat::LocalDecl { exprs, .. } => {
            assert!(matches!(&exprs[0], Expr::Str { value, .. } if value == "hello\nworld"));
        }
        other => panic!("expected LocalDecl, got {other:?}"),
    }
}

#[test]
fn unterminated_string_is_a_parse_error() {
    let err = Parser::new("local x = \"open\n").parse().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Unterminated);
}

#[test]
fn dangling_open_paren_is_a_syntax_error() {
    // S6: malformed input is rejected.
    let err = Parser::new("local x = (\n").parse().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn comments_attach_to_the_following_statement() {
    let block = parse("-- doc comment\nreturn 1\n");
    assert_eq!(block.stats[0].comments().len(), 1);
}

#[test]
fn operator_precedence_matches_lua() {
    // `-x^2` parses as `-(x^2)`, and `a .. b .. c` is right-associative.
    let block = parse(indoc! {"
        local a = -x^2
        local b = p .. q .. r
    "});
    match &block.stats[0] {
        Stat::LocalDecl { exprs, .. } => {
            let Expr::UnOp { op: crate::ast::UnOp::Neg, expr } = &exprs[0] else {
                panic!("expected unary neg")
            };
            assert!(matches!(**expr, Expr::BinOp { op: BinOp::Pow, .. }));
        }
        other => panic!("expected LocalDecl, got {other:?}"),
    }
    match &block.stats[1] {
        Stat::LocalDecl { exprs, .. } => {
            let Expr::BinOp { op: BinOp::Concat, lhs, rhs } = &exprs[0] else {
                panic!("expected concat")
            };
            assert!(matches!(**lhs, Expr::Id(_)));
            assert!(matches!(**rhs, Expr::BinOp { op: BinOp::Concat, .. }));
        }
        other => panic!("expected LocalDecl, got {other:?}"),
    }
}
