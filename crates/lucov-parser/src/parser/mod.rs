mod expr;
mod stat;

use std::collections::BTreeMap;

use crate::ast::{Block, Comment};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{self, Token, TokenKind};

/// Parses Lua source into a [`Block`]. Construct with
/// [`Parser::new`] and call [`Parser::parse`] once.
///
/// ```
/// use lucov_parser::Parser;
///
/// let ast = Parser::new("return 42\n").parse().unwrap();
/// assert_eq!(ast.stats.len(), 1);
/// ```
pub struct Parser<'input> {
    tokens: Vec<Token>,
    comments: BTreeMap<usize, Vec<Comment>>,
    pos: usize,
    path: Option<&'input str>,
    /// Lexical errors collected up front; `parse` surfaces the first one
    /// before ever touching the (possibly garbage) token stream past it.
    lex_errors: Vec<ParseError>,
}

impl<'input> Parser<'input> {
    pub fn new(source: &'input str) -> Self {
        Self::with_path(source, None)
    }

    /// Same as [`Parser::new`], but `path` is threaded into diagnostics
    /// for callers (e.g. the instrumentation driver) that report
    /// errors with the originating file name.
    pub fn with_path(source: &'input str, path: Option<&'input str>) -> Self {
        let lexer::LexOutput {
            tokens,
            comments,
            errors,
        } = lexer::tokenize(source);
        Self {
            tokens,
            comments,
            pos: 0,
            path,
            lex_errors: errors,
        }
    }

    pub fn parse(mut self) -> Result<Block, ParseError> {
        if let Some(err) = self.lex_errors.first() {
            return Err(err.clone());
        }
        let block = self.block(&[])?;
        self.expect(TokenKind::Eof)?;
        Ok(block)
    }

    // --- token stream helpers -------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn at_block_end(&self, terminators: &[TokenKind]) -> bool {
        let kind = self.peek_kind();
        kind == TokenKind::Eof || terminators.contains(&kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn peek_ahead_is(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.pos + 1)
            .map(|t| t.kind == kind)
            .unwrap_or(false)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek().clone();
            Err(self.syntax_error(
                &found,
                format!("expected {kind:?}, found {:?} `{}`", found.kind, found.text),
            ))
        }
    }

    fn expect_name(&mut self) -> Result<String, ParseError> {
        self.expect(TokenKind::Name).map(|t| t.text)
    }

    fn syntax_error(&self, tok: &Token, message: impl Into<String>) -> ParseError {
        ParseError::new(ParseErrorKind::Syntax, tok.line, tok.column, message)
    }

    /// Comments lexed immediately before the token currently at `pos`.
    fn take_leading_comments(&mut self) -> Vec<Comment> {
        self.comments.remove(&self.pos).unwrap_or_default()
    }

    #[allow(dead_code)]
    fn path(&self) -> Option<&str> {
        self.path
    }
}
