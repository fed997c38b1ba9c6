//! Byte-and-line-tracking cursor over the source text.
//!
//! `pos` is a byte offset (Lua source may contain UTF-8 inside strings
//! and comments, so we cannot assume ASCII like a fixed-width ISA
//! assembler can); `line`/`col` are derived alongside it for
//! diagnostics.

pub(crate) struct Cursor<'a> {
    source: &'a str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    pub(crate) fn peek2(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub(crate) fn byte_offset(&self) -> usize {
        self.pos
    }

    /// Advance past one character, updating line/column tracking.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Advance past `c` if it is the next character.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn current_pos(&self) -> (u32, u32) {
        (self.line, self.col)
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }
}
