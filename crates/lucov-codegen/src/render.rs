use std::fmt::Write as _;

use lucov_parser::ast::{
    BinOp, Block, Comment, CommentKind, Expr, IndexKey, QuoteStyle, Stat, TableField, UnOp,
};

use crate::error::CodegenError;

const INDENT_UNIT: &str = "  ";

/// Render `block` back to *L* source text.
///
/// The output is not guaranteed to match the original formatting, only
/// its executable semantics and statement order (modulo inserted
/// tracking calls).
pub fn generate(block: &Block) -> Result<String, CodegenError> {
    let mut out = String::new();
    write_block_body(&mut out, block, 0);
    Ok(out)
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT_UNIT);
    }
}

/// Write a block's statements, one per line, without the surrounding
/// `do ... end` / `then ... end` keywords the caller is responsible for.
fn write_block_body(out: &mut String, block: &Block, depth: usize) {
    for stat in &block.stats {
        write_comments(out, stat.comments(), depth);
        indent(out, depth);
        write_stat(out, stat, depth);
        out.push('\n');
    }
    write_comments(out, &block.trailing_comments, depth);
}

fn write_comments(out: &mut String, comments: &[Comment], depth: usize) {
    for comment in comments {
        indent(out, depth);
        match comment.kind {
            CommentKind::Line => {
                let _ = writeln!(out, "--{}", comment.text);
            }
            CommentKind::Block => {
                let _ = writeln!(out, "--[[{}]]", comment.text);
            }
        }
    }
}

fn write_stat(out: &mut String, stat: &Stat, depth: usize) {
    match stat {
        Stat::LocalDecl { names, exprs, .. } => {
            let _ = write!(out, "local {}", names.join(", "));
            if !exprs.is_empty() {
                out.push_str(" = ");
                write_expr_list(out, exprs);
            }
        }
        Stat::LocalRecDecl {
            name,
            params,
            is_vararg,
            body,
            ..
        } => {
            let _ = write!(out, "local function {}(", name);
            write_params(out, params, *is_vararg);
            out.push_str(")\n");
            write_block_body(out, body, depth + 1);
            indent(out, depth);
            out.push_str("end");
        }
        Stat::Assign { targets, values, .. } => {
            write_expr_list(out, targets);
            out.push_str(" = ");
            write_expr_list(out, values);
        }
        Stat::Return { values, .. } => {
            out.push_str("return");
            if !values.is_empty() {
                out.push(' ');
                write_expr_list(out, values);
            }
        }
        Stat::If {
            clauses,
            else_block,
            ..
        } => write_if(out, clauses, else_block.as_ref(), depth),
        Stat::NumericFor {
            var,
            start,
            stop,
            step,
            body,
            ..
        } => {
            let _ = write!(out, "for {} = ", var);
            write_expr(out, start);
            out.push_str(", ");
            write_expr(out, stop);
            if let Some(step) = step {
                out.push_str(", ");
                write_expr(out, step);
            }
            out.push_str(" do\n");
            write_block_body(out, body, depth + 1);
            indent(out, depth);
            out.push_str("end");
        }
        Stat::GenericFor {
            names, exprs, body, ..
        } => {
            let _ = write!(out, "for {} in ", names.join(", "));
            write_expr_list(out, exprs);
            out.push_str(" do\n");
            write_block_body(out, body, depth + 1);
            indent(out, depth);
            out.push_str("end");
        }
        Stat::RepeatUntil { body, cond, .. } => {
            out.push_str("repeat\n");
            write_block_body(out, body, depth + 1);
            indent(out, depth);
            out.push_str("until ");
            write_expr(out, cond);
        }
        Stat::While { cond, body, .. } => {
            out.push_str("while ");
            write_expr(out, cond);
            out.push_str(" do\n");
            write_block_body(out, body, depth + 1);
            indent(out, depth);
            out.push_str("end");
        }
        Stat::Call { call, .. } | Stat::MethodInvoke { call, .. } => write_expr(out, call),
        Stat::Do { body, .. } => {
            out.push_str("do\n");
            write_block_body(out, body, depth + 1);
            indent(out, depth);
            out.push_str("end");
        }
        Stat::Break { .. } => out.push_str("break"),
        Stat::Label { name, .. } => {
            let _ = write!(out, "::{}::", name);
        }
        Stat::Goto { name, .. } => {
            let _ = write!(out, "goto {}", name);
        }
    }
}

fn write_if(
    out: &mut String,
    clauses: &[(Expr, Block)],
    else_block: Option<&Block>,
    depth: usize,
) {
    for (i, (cond, body)) in clauses.iter().enumerate() {
        if i == 0 {
            out.push_str("if ");
        } else {
            indent(out, depth);
            out.push_str("elseif ");
        }
        write_expr(out, cond);
        out.push_str(" then\n");
        write_block_body(out, body, depth + 1);
    }
    if let Some(else_block) = else_block {
        indent(out, depth);
        out.push_str("else\n");
        write_block_body(out, else_block, depth + 1);
    }
    indent(out, depth);
    out.push_str("end");
}

fn write_params(out: &mut String, params: &[String], is_vararg: bool) {
    let mut first = true;
    for p in params {
        if !first {
            out.push_str(", ");
        }
        out.push_str(p);
        first = false;
    }
    if is_vararg {
        if !first {
            out.push_str(", ");
        }
        out.push_str("...");
    }
}

fn write_expr_list(out: &mut String, exprs: &[Expr]) {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, e);
    }
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Nil => out.push_str("nil"),
        Expr::True => out.push_str("true"),
        Expr::False => out.push_str("false"),
        Expr::Vararg => out.push_str("..."),
        Expr::Number { raw, .. } => out.push_str(raw),
        Expr::Str { value, quote } => write_string(out, value, *quote),
        Expr::Id(name) => out.push_str(name),
        Expr::Index { base, key } => write_index(out, base, key),
        Expr::Call { callee, args, .. } => {
            write_expr(out, callee);
            out.push('(');
            write_expr_list(out, args);
            out.push(')');
        }
        Expr::MethodCall {
            object,
            method,
            args,
            ..
        } => {
            write_expr(out, object);
            let _ = write!(out, ":{}(", method);
            write_expr_list(out, args);
            out.push(')');
        }
        Expr::Function {
            params,
            is_vararg,
            body,
            ..
        } => {
            out.push_str("function(");
            write_params(out, params, *is_vararg);
            out.push_str(")\n");
            write_block_body(out, body, 1);
            out.push_str("end");
        }
        Expr::Table { fields } => write_table(out, fields),
        Expr::BinOp { op, lhs, rhs } => {
            write_expr(out, lhs);
            let _ = write!(out, " {} ", binop_text(*op));
            write_expr(out, rhs);
        }
        Expr::UnOp { op, expr } => {
            out.push_str(unop_text(*op));
            write_expr(out, expr);
        }
        Expr::Paren(inner) => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
    }
}

fn write_index(out: &mut String, base: &Expr, key: &IndexKey) {
    write_expr(out, base);
    match key {
        IndexKey::Name(name) => {
            let _ = write!(out, ".{}", name);
        }
        IndexKey::Expr(key_expr) => {
            out.push('[');
            write_expr(out, key_expr);
            out.push(']');
        }
    }
}

fn write_table(out: &mut String, fields: &[TableField]) {
    out.push('{');
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match field {
            TableField::Positional(v) => write_expr(out, v),
            TableField::Named(name, v) => {
                let _ = write!(out, "{} = ", name);
                write_expr(out, v);
            }
            TableField::Keyed(k, v) => {
                out.push('[');
                write_expr(out, k);
                out.push_str("] = ");
                write_expr(out, v);
            }
        }
    }
    out.push('}');
}

fn write_string(out: &mut String, value: &str, quote: QuoteStyle) {
    match quote {
        QuoteStyle::Double => {
            out.push('"');
            escape_into(out, value, '"');
            out.push('"');
        }
        QuoteStyle::Single => {
            out.push('\'');
            escape_into(out, value, '\'');
            out.push('\'');
        }
        QuoteStyle::Long(level) => {
            let eqs = "=".repeat(level as usize);
            let _ = write!(out, "[{eqs}[{value}]{eqs}]");
        }
    }
}

fn escape_into(out: &mut String, value: &str, quote: char) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

fn binop_text(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "^",
        BinOp::Concat => "..",
        BinOp::Eq => "==",
        BinOp::Ne => "~=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

fn unop_text(op: UnOp) -> &'static str {
    match op {
        UnOp::Neg => "-",
        UnOp::Not => "not ",
        UnOp::Len => "#",
    }
}
