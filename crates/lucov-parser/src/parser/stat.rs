use crate::ast::{Block, Expr, IndexKey, Stat};
use crate::error::ParseError;
use crate::lexer::TokenKind;

use super::Parser;

impl<'input> Parser<'input> {
    /// Parse statements until one of `terminators` (or end-of-file) is
    /// reached. Does not consume the terminator.
    pub(crate) fn block(&mut self, terminators: &[TokenKind]) -> Result<Block, ParseError> {
        let line = if self.at_block_end(terminators) {
            None
        } else {
            Some(self.peek().line)
        };
        let mut stats = Vec::new();
        while !self.at_block_end(terminators) {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let was_return = self.check(TokenKind::Return);
            stats.push(self.stat()?);
            if was_return {
                // `return` must be the last statement in a block.
                self.eat(TokenKind::Semi);
                break;
            }
        }
        let mut block = Block::new(stats, line);
        // Whatever is left over at this position has no following
        // statement to attach to — the block's terminator (`end`,
        // `else`, `elseif`, `until`) or end-of-file comes right after.
        block.trailing_comments = self.take_leading_comments();
        Ok(block)
    }

    fn stat(&mut self) -> Result<Stat, ParseError> {
        let comments = self.take_leading_comments();
        let line = self.peek().line;
        match self.peek_kind() {
            TokenKind::Local => self.local_stat(line, comments),
            TokenKind::If => self.if_stat(line, comments),
            TokenKind::While => self.while_stat(line, comments),
            TokenKind::Repeat => self.repeat_stat(line, comments),
            TokenKind::For => self.for_stat(line, comments),
            TokenKind::Do => self.do_stat(line, comments),
            TokenKind::Return => self.return_stat(line, comments),
            TokenKind::Function => self.function_stat(line, comments),
            TokenKind::Break => {
                self.advance();
                Ok(Stat::Break { line, comments })
            }
            TokenKind::DoubleColon => {
                self.advance();
                let name = self.expect_name()?;
                self.expect(TokenKind::DoubleColon)?;
                Ok(Stat::Label {
                    name,
                    line,
                    comments,
                })
            }
            TokenKind::Goto => {
                self.advance();
                let name = self.expect_name()?;
                Ok(Stat::Goto {
                    name,
                    line,
                    comments,
                })
            }
            _ => self.expr_stat(line, comments),
        }
    }

    /// `function funcname funcbody` — sugar for an assignment to
    /// `funcname` of an anonymous function, per the Lua grammar
    /// (`function foo.bar.baz() ... end` == `foo.bar.baz = function() ... end`).
    /// A colon-suffixed name (`function obj:m() end`) additionally
    /// prepends an implicit `self` parameter. Desugaring to `Assign`
    /// keeps this statement in Table 3.1's tracked alphabet — `Function`
    /// itself is a non-executable constructor.
    fn function_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `function`
        let mut target = Expr::Id(self.expect_name()?);
        let mut is_method = false;
        loop {
            if self.eat(TokenKind::Dot) {
                let name = self.expect_name()?;
                target = Expr::Index {
                    base: Box::new(target),
                    key: IndexKey::Name(name),
                };
            } else if self.eat(TokenKind::Colon) {
                let name = self.expect_name()?;
                target = Expr::Index {
                    base: Box::new(target),
                    key: IndexKey::Name(name),
                };
                is_method = true;
                break;
            } else {
                break;
            }
        }
        let (mut params, is_vararg, body) = self.function_body()?;
        if is_method {
            params.insert(0, "self".to_string());
        }
        Ok(Stat::Assign {
            targets: vec![target],
            values: vec![Expr::Function {
                params,
                is_vararg,
                body,
                line: Some(line),
            }],
            line,
            comments,
        })
    }

    fn local_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `local`
        if self.eat(TokenKind::Function) {
            let name = self.expect_name()?;
            let (params, is_vararg, body) = self.function_body()?;
            return Ok(Stat::LocalRecDecl {
                name,
                params,
                is_vararg,
                body,
                line,
                comments,
            });
        }
        let mut names = vec![self.expect_name()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_name()?);
        }
        let exprs = if self.eat(TokenKind::Eq) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        Ok(Stat::LocalDecl {
            names,
            exprs,
            line,
            comments,
        })
    }

    fn if_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `if`
        let mut clauses = Vec::new();
        loop {
            let cond = self.expr()?;
            self.expect(TokenKind::Then)?;
            let body = self.block(&[TokenKind::Elseif, TokenKind::Else, TokenKind::End])?;
            clauses.push((cond, body));
            if self.eat(TokenKind::Elseif) {
                continue;
            }
            break;
        }
        let else_block = if self.eat(TokenKind::Else) {
            Some(self.block(&[TokenKind::End])?)
        } else {
            None
        };
        self.expect(TokenKind::End)?;
        Ok(Stat::If {
            clauses,
            else_block,
            line,
            comments,
        })
    }

    fn while_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `while`
        let cond = self.expr()?;
        self.expect(TokenKind::Do)?;
        let body = self.block(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;
        Ok(Stat::While {
            cond,
            body,
            line,
            comments,
        })
    }

    fn repeat_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `repeat`
        let body = self.block(&[TokenKind::Until])?;
        self.expect(TokenKind::Until)?;
        let cond = self.expr()?;
        Ok(Stat::RepeatUntil {
            body,
            cond,
            line,
            comments,
        })
    }

    fn for_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `for`
        let first = self.expect_name()?;
        if self.eat(TokenKind::Eq) {
            let start = self.expr()?;
            self.expect(TokenKind::Comma)?;
            let stop = self.expr()?;
            let step = if self.eat(TokenKind::Comma) {
                Some(self.expr()?)
            } else {
                None
            };
            self.expect(TokenKind::Do)?;
            let body = self.block(&[TokenKind::End])?;
            self.expect(TokenKind::End)?;
            Ok(Stat::NumericFor {
                var: first,
                start,
                stop,
                step,
                body,
                line,
                comments,
            })
        } else {
            let mut names = vec![first];
            while self.eat(TokenKind::Comma) {
                names.push(self.expect_name()?);
            }
            self.expect(TokenKind::In)?;
            let exprs = self.expr_list()?;
            self.expect(TokenKind::Do)?;
            let body = self.block(&[TokenKind::End])?;
            self.expect(TokenKind::End)?;
            Ok(Stat::GenericFor {
                names,
                exprs,
                body,
                line,
                comments,
            })
        }
    }

    fn do_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `do`
        let body = self.block(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;
        Ok(Stat::Do {
            body,
            line,
            comments,
        })
    }

    fn return_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        self.advance(); // `return`
        let values = if self.at_block_end(&[TokenKind::Elseif, TokenKind::Else, TokenKind::End, TokenKind::Until])
            || self.check(TokenKind::Semi)
        {
            Vec::new()
        } else {
            self.expr_list()?
        };
        Ok(Stat::Return {
            values,
            line,
            comments,
        })
    }

    /// Either a bare call/method-invocation statement, or the start of
    /// an assignment's target list.
    fn expr_stat(&mut self, line: u32, comments: Vec<crate::ast::Comment>) -> Result<Stat, ParseError> {
        let first = self.suffixed_expr()?;
        if matches!(self.peek_kind(), TokenKind::Eq | TokenKind::Comma) {
            let mut targets = vec![first];
            while self.eat(TokenKind::Comma) {
                targets.push(self.suffixed_expr()?);
            }
            self.expect(TokenKind::Eq)?;
            let values = self.expr_list()?;
            return Ok(Stat::Assign {
                targets,
                values,
                line,
                comments,
            });
        }
        match &first {
            Expr::Call { .. } => Ok(Stat::Call {
                call: first,
                line,
                comments,
            }),
            Expr::MethodCall { .. } => Ok(Stat::MethodInvoke {
                call: first,
                line,
                comments,
            }),
            _ => {
                let tok = self.peek().clone();
                Err(self.syntax_error(&tok, "expected statement (assignment or call)"))
            }
        }
    }

    pub(crate) fn expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }
}
