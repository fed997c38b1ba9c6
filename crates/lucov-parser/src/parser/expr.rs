use crate::ast::{BinOp, Block, Expr, IndexKey, TableField, UnOp};
use crate::error::ParseError;
use crate::lexer::TokenKind;

use super::Parser;

/// `(left-binding-power, right-binding-power)` for each binary
/// operator, Lua 5.1 precedence (lowest to highest): `or`, `and`,
/// comparisons, `..` (right-assoc), `+ -`, `* / %`, unary, `^`
/// (right-assoc, binds tighter than unary on its left operand).
fn binop_binding(kind: TokenKind) -> Option<(BinOp, u8, u8)> {
    Some(match kind {
        TokenKind::Or => (BinOp::Or, 1, 2),
        TokenKind::And => (BinOp::And, 3, 4),
        TokenKind::Lt => (BinOp::Lt, 5, 6),
        TokenKind::Gt => (BinOp::Gt, 5, 6),
        TokenKind::Le => (BinOp::Le, 5, 6),
        TokenKind::Ge => (BinOp::Ge, 5, 6),
        TokenKind::Ne => (BinOp::Ne, 5, 6),
        TokenKind::EqEq => (BinOp::Eq, 5, 6),
        TokenKind::DotDot => (BinOp::Concat, 8, 7), // right-assoc
        TokenKind::Plus => (BinOp::Add, 9, 10),
        TokenKind::Minus => (BinOp::Sub, 9, 10),
        TokenKind::Star => (BinOp::Mul, 11, 12),
        TokenKind::Slash => (BinOp::Div, 11, 12),
        TokenKind::Percent => (BinOp::Mod, 11, 12),
        TokenKind::Caret => (BinOp::Pow, 16, 15), // right-assoc, above unary
        _ => return None,
    })
}

const UNARY_BINDING: u8 = 13;

impl<'input> Parser<'input> {
    pub(crate) fn expr(&mut self) -> Result<Expr, ParseError> {
        self.expr_bp(0)
    }

    fn expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.unary_expr()?;
        loop {
            let Some((op, left_bp, right_bp)) = binop_binding(self.peek_kind()) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.expr_bp(right_bp)?;
            lhs = Expr::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Not => Some(UnOp::Not),
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Hash => Some(UnOp::Len),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.expr_bp(UNARY_BINDING)?;
            return Ok(Expr::UnOp {
                op,
                expr: Box::new(expr),
            });
        }
        self.suffixed_expr()
    }

    /// A primary expression followed by any number of `.field`,
    /// `[expr]`, `:method(args)` or `(args)` suffixes.
    pub(crate) fn suffixed_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary_expr()?;
        loop {
            let line = self.peek().line;
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_name()?;
                    expr = Expr::Index {
                        base: Box::new(expr),
                        key: IndexKey::Name(name),
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index {
                        base: Box::new(expr),
                        key: IndexKey::Expr(Box::new(key)),
                    };
                }
                TokenKind::Colon => {
                    self.advance();
                    let method = self.expect_name()?;
                    let args = self.call_args()?;
                    expr = Expr::MethodCall {
                        object: Box::new(expr),
                        method,
                        args,
                        line: Some(line),
                    };
                }
                TokenKind::LParen | TokenKind::Str | TokenKind::LBrace => {
                    let args = self.call_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        line: Some(line),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        match self.peek_kind() {
            TokenKind::LParen => {
                self.advance();
                let args = if self.check(TokenKind::RParen) {
                    Vec::new()
                } else {
                    self.expr_list()?
                };
                self.expect(TokenKind::RParen)?;
                Ok(args)
            }
            TokenKind::Str => {
                let tok = self.advance();
                Ok(vec![Expr::Str {
                    value: tok.text,
                    quote: tok.quote.unwrap_or(crate::ast::QuoteStyle::Double),
                }])
            }
            TokenKind::LBrace => Ok(vec![self.table_expr()?]),
            _ => {
                let tok = self.peek().clone();
                Err(self.syntax_error(&tok, "expected call arguments"))
            }
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Nil)
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::True)
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::False)
            }
            TokenKind::Ellipsis => {
                self.advance();
                Ok(Expr::Vararg)
            }
            TokenKind::Number => {
                self.advance();
                let value = parse_number(&tok.text);
                Ok(Expr::Number {
                    value,
                    raw: tok.text,
                })
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::Str {
                    value: tok.text,
                    quote: tok.quote.unwrap_or(crate::ast::QuoteStyle::Double),
                })
            }
            TokenKind::Name => {
                self.advance();
                Ok(Expr::Id(tok.text))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::LBrace => self.table_expr(),
            TokenKind::Function => {
                self.advance();
                let (params, is_vararg, body) = self.function_body()?;
                Ok(Expr::Function {
                    params,
                    is_vararg,
                    body,
                    line: Some(tok.line),
                })
            }
            _ => Err(self.syntax_error(
                &tok,
                format!("unexpected token {:?} `{}` in expression", tok.kind, tok.text),
            )),
        }
    }

    fn table_expr(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let field = if self.check(TokenKind::LBracket) {
                self.advance();
                let key = self.expr()?;
                self.expect(TokenKind::RBracket)?;
                self.expect(TokenKind::Eq)?;
                let value = self.expr()?;
                TableField::Keyed(key, value)
            } else if self.check(TokenKind::Name) && self.peek_ahead_is(TokenKind::Eq) {
                let name = self.expect_name()?;
                self.expect(TokenKind::Eq)?;
                let value = self.expr()?;
                TableField::Named(name, value)
            } else {
                TableField::Positional(self.expr()?)
            };
            fields.push(field);
            if !self.eat(TokenKind::Comma) && !self.eat(TokenKind::Semi) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Expr::Table { fields })
    }

    /// Parses `(params) body end`, having already consumed `function`.
    pub(crate) fn function_body(&mut self) -> Result<(Vec<String>, bool, Block), ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut is_vararg = false;
        if !self.check(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Ellipsis) {
                    is_vararg = true;
                    break;
                }
                params.push(self.expect_name()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.block(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;
        Ok((params, is_vararg, body))
    }
}

fn parse_number(raw: &str) -> f64 {
    if let Some(hex) = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).map(|v| v as f64).unwrap_or(0.0)
    } else {
        raw.parse().unwrap_or(0.0)
    }
}
