use lucov_parser::ast::{Block, Expr, IndexKey, Stat, TableField};

use crate::hint_map::HintMap;

/// Build the synthetic `TRACK_NS.track(line)` call statement. Its own
/// `line` is inherited from the statement it will precede.
fn tracking_call(line: u32) -> Stat {
    Stat::Call {
        call: Expr::Call {
            callee: Box::new(Expr::track_callee()),
            args: vec![Expr::Number {
                value: line as f64,
                raw: line.to_string(),
            }],
            line: Some(line),
        },
        line,
        comments: Vec::new(),
    }
}

/// Walk `block` post-order, inserting one tracking call immediately
/// before each executable statement (Table 3.1), and recursing into
/// every nested block — loop/branch/function bodies, and function
/// literals nested inside expressions — so a tracking call precedes
/// every executable statement no matter how deeply it is nested.
pub(crate) fn transform_block(block: &mut Block, hint: &mut HintMap) {
    let original_stats = std::mem::take(&mut block.stats);
    let mut new_stats = Vec::with_capacity(original_stats.len() * 2);

    for mut stat in original_stats {
        transform_nested(&mut stat, hint);

        if stat.is_executable() {
            if let Some(line) = stat.line() {
                hint.current_line += 1;
                let t_line = hint.current_line;
                hint.tracking_lookup.insert(t_line);

                hint.current_line += 1;
                let s_line = hint.current_line;
                hint.original_to_instrumented.insert(line, s_line);
                hint.instrumented_to_original.insert(s_line, line);

                new_stats.push(tracking_call(line));
            }
        } else {
            hint.current_line += 1;
        }
        new_stats.push(stat);
    }

    block.stats = new_stats;
}

/// Recurse into the nested blocks and function literals a statement
/// owns, transforming each in turn. Does not touch `stat` itself — the
/// caller (`transform_block`) decides whether `stat` gets a tracking
/// call, since that decision belongs to the *parent* block.
fn transform_nested(stat: &mut Stat, hint: &mut HintMap) {
    match stat {
        Stat::LocalDecl { exprs, .. } => {
            for e in exprs {
                transform_expr(e, hint);
            }
        }
        Stat::LocalRecDecl { body, .. } => transform_block(body, hint),
        Stat::Assign { targets, values, .. } => {
            for e in targets.iter_mut().chain(values.iter_mut()) {
                transform_expr(e, hint);
            }
        }
        Stat::Return { values, .. } => {
            for e in values {
                transform_expr(e, hint);
            }
        }
        Stat::If {
            clauses,
            else_block,
            ..
        } => {
            for (cond, body) in clauses {
                transform_expr(cond, hint);
                transform_block(body, hint);
            }
            if let Some(else_block) = else_block {
                transform_block(else_block, hint);
            }
        }
        Stat::NumericFor {
            start,
            stop,
            step,
            body,
            ..
        } => {
            transform_expr(start, hint);
            transform_expr(stop, hint);
            if let Some(step) = step {
                transform_expr(step, hint);
            }
            transform_block(body, hint);
        }
        Stat::GenericFor { exprs, body, .. } => {
            for e in exprs {
                transform_expr(e, hint);
            }
            transform_block(body, hint);
        }
        Stat::RepeatUntil { body, cond, .. } => {
            transform_block(body, hint);
            transform_expr(cond, hint);
        }
        Stat::While { cond, body, .. } => {
            transform_expr(cond, hint);
            transform_block(body, hint);
        }
        Stat::Call { call, .. } | Stat::MethodInvoke { call, .. } => transform_expr(call, hint),
        Stat::Do { body, .. } => transform_block(body, hint),
        Stat::Break { .. } | Stat::Label { .. } | Stat::Goto { .. } => {}
    }
}

/// Recurse into an expression to find and transform any function
/// literal bodies it contains, wherever they are nested (call
/// arguments, table fields, operands, index keys...). Expressions
/// themselves are never executable statements (Table 3.1), so nothing
/// here ever synthesises a tracking call directly.
fn transform_expr(expr: &mut Expr, hint: &mut HintMap) {
    match expr {
        Expr::Function { body, .. } => transform_block(body, hint),
        Expr::Call { callee, args, .. } => {
            transform_expr(callee, hint);
            for a in args {
                transform_expr(a, hint);
            }
        }
        Expr::MethodCall { object, args, .. } => {
            transform_expr(object, hint);
            for a in args {
                transform_expr(a, hint);
            }
        }
        Expr::Index { base, key } => {
            transform_expr(base, hint);
            if let IndexKey::Expr(key_expr) = key {
                transform_expr(key_expr, hint);
            }
        }
        Expr::BinOp { lhs, rhs, .. } => {
            transform_expr(lhs, hint);
            transform_expr(rhs, hint);
        }
        Expr::UnOp { expr: inner, .. } => transform_expr(inner, hint),
        Expr::Paren(inner) => transform_expr(inner, hint),
        Expr::Table { fields } => {
            for field in fields {
                match field {
                    TableField::Positional(v) => transform_expr(v, hint),
                    TableField::Named(_, v) => transform_expr(v, hint),
                    TableField::Keyed(k, v) => {
                        transform_expr(k, hint);
                        transform_expr(v, hint);
                    }
                }
            }
        }
        Expr::Nil
        | Expr::True
        | Expr::False
        | Expr::Vararg
        | Expr::Number { .. }
        | Expr::Str { .. }
        | Expr::Id(_) => {}
    }
}
