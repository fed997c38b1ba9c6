mod cursor;
mod token;

use std::collections::BTreeMap;

use cursor::Cursor;
pub(crate) use token::{keyword, Token, TokenKind};

use crate::ast::{Comment, CommentKind, QuoteStyle};
use crate::error::{ParseError, ParseErrorKind};

/// Output of tokenising one file: the token stream, comments keyed by
/// the index of the token they immediately precede, and any lexical
/// errors encountered (collected, not fatal, so the parser can still
/// attempt recovery-free reporting of the first one — see `Parser`).
pub(crate) struct LexOutput {
    pub tokens: Vec<Token>,
    pub comments: BTreeMap<usize, Vec<Comment>>,
    pub errors: Vec<ParseError>,
}

pub(crate) fn tokenize(source: &str) -> LexOutput {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    let mut comments: BTreeMap<usize, Vec<Comment>> = BTreeMap::new();
    let mut errors = Vec::new();

    loop {
        skip_whitespace(&mut cursor);

        if let Some(comment) = try_lex_comment(&mut cursor, &mut errors) {
            comments
                .entry(tokens.len())
                .or_default()
                .push(comment);
            continue;
        }

        let (line, column) = cursor.current_pos();
        let start = cursor.byte_offset();
        let Some(c) = cursor.peek() else {
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
            break;
        };

        let token = match c {
            c if is_ident_start(c) => lex_ident(&mut cursor, line, column),
            c if c.is_ascii_digit() => lex_number(&mut cursor, line, column, &mut errors),
            '.' if cursor.peek2().is_some_and(|c| c.is_ascii_digit()) => {
                lex_number(&mut cursor, line, column, &mut errors)
            }
            '"' | '\'' => lex_short_string(&mut cursor, line, column, &mut errors),
            '[' if matches!(cursor.peek2(), Some('[') | Some('=')) => {
                match lex_long_bracket(&mut cursor, line, column, &mut errors) {
                    Some(text) => Token {
                        kind: TokenKind::Str,
                        text: text.0,
                        line,
                        column,
                        quote: Some(QuoteStyle::Long(text.1)),
                    },
                    None => {
                        cursor.advance();
                        Token::new(TokenKind::LBracket, "[", line, column)
                    }
                }
            }
            _ => lex_punct(&mut cursor, line, column, &mut errors, start),
        };
        tokens.push(token);
    }

    LexOutput {
        tokens,
        comments,
        errors,
    }
}

fn skip_whitespace(cursor: &mut Cursor) {
    while matches!(cursor.peek(), Some(c) if c.is_whitespace()) {
        cursor.advance();
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lex_ident(cursor: &mut Cursor, line: u32, column: u32) -> Token {
    let start = cursor.byte_offset();
    while matches!(cursor.peek(), Some(c) if is_ident_continue(c)) {
        cursor.advance();
    }
    let text = cursor.slice_from(start);
    let kind = keyword(text).unwrap_or(TokenKind::Name);
    Token::new(kind, text, line, column)
}

fn lex_number(
    cursor: &mut Cursor,
    line: u32,
    column: u32,
    errors: &mut Vec<ParseError>,
) -> Token {
    let start = cursor.byte_offset();
    let is_hex = cursor.peek() == Some('0') && matches!(cursor.peek2(), Some('x') | Some('X'));
    if is_hex {
        cursor.advance();
        cursor.advance();
        while matches!(cursor.peek(), Some(c) if c.is_ascii_hexdigit()) {
            cursor.advance();
        }
    } else {
        while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
            cursor.advance();
        }
        if cursor.peek() == Some('.') {
            cursor.advance();
            while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
                cursor.advance();
            }
        }
        if matches!(cursor.peek(), Some('e') | Some('E')) {
            cursor.advance();
            if matches!(cursor.peek(), Some('+') | Some('-')) {
                cursor.advance();
            }
            while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
                cursor.advance();
            }
        }
    }
    let text = cursor.slice_from(start).to_string();
    if is_hex {
        if i64::from_str_radix(text.trim_start_matches("0x").trim_start_matches("0X"), 16).is_err()
        {
            errors.push(ParseError::new(
                ParseErrorKind::Lexical,
                line,
                column,
                format!("malformed hexadecimal literal `{text}`"),
            ));
        }
    } else if text.parse::<f64>().is_err() {
        errors.push(ParseError::new(
            ParseErrorKind::Lexical,
            line,
            column,
            format!("malformed numeric literal `{text}`"),
        ));
    }
    Token::new(TokenKind::Number, text, line, column)
}

fn lex_short_string(
    cursor: &mut Cursor,
    line: u32,
    column: u32,
    errors: &mut Vec<ParseError>,
) -> Token {
    let quote = cursor.peek().unwrap();
    cursor.advance();
    let mut value = String::new();
    loop {
        match cursor.peek() {
            None | Some('\n') => {
                errors.push(ParseError::new(
                    ParseErrorKind::Unterminated,
                    line,
                    column,
                    "unterminated string literal",
                ));
                break;
            }
            Some(c) if c == quote => {
                cursor.advance();
                break;
            }
            Some('\\') => {
                cursor.advance();
                match cursor.peek() {
                    Some('n') => {
                        value.push('\n');
                        cursor.advance();
                    }
                    Some('t') => {
                        value.push('\t');
                        cursor.advance();
                    }
                    Some('r') => {
                        value.push('\r');
                        cursor.advance();
                    }
                    Some('a') => {
                        value.push('\u{7}');
                        cursor.advance();
                    }
                    Some('b') => {
                        value.push('\u{8}');
                        cursor.advance();
                    }
                    Some(c @ ('\\' | '"' | '\'')) => {
                        value.push(c);
                        cursor.advance();
                    }
                    Some('\n') => {
                        value.push('\n');
                        cursor.advance();
                    }
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                        cursor.advance();
                    }
                    None => {
                        errors.push(ParseError::new(
                            ParseErrorKind::Unterminated,
                            line,
                            column,
                            "unterminated escape sequence",
                        ));
                    }
                }
            }
            Some(c) => {
                value.push(c);
                cursor.advance();
            }
        }
    }
    let quote_style = if quote == '"' {
        QuoteStyle::Double
    } else {
        QuoteStyle::Single
    };
    Token {
        kind: TokenKind::Str,
        text: value,
        line,
        column,
        quote: Some(quote_style),
    }
}

/// Attempt to lex a long-bracket string `[[...]]` / `[=[...]=]`. Returns
/// `None` (consuming nothing but the opener) if this is not actually a
/// long bracket — i.e. `[` followed by some `=`s that never reach a
/// second `[`. Callers only attempt this when `peek2()` is `[` or `=`,
/// so in practice the `None` path is defensive, not load-bearing for
/// real Lua source (a plain index `t[x]` never has `=` right after the
/// bracket).
fn lex_long_bracket(
    cursor: &mut Cursor,
    line: u32,
    column: u32,
    errors: &mut Vec<ParseError>,
) -> Option<(String, u32)> {
    cursor.advance(); // '['
    let mut level = 0u32;
    while cursor.eat('=') {
        level += 1;
    }
    if !cursor.eat('[') {
        return None;
    }
    // Lua skips a leading newline immediately after the opening bracket.
    if cursor.peek() == Some('\n') {
        cursor.advance();
    }
    let start = cursor.byte_offset();
    loop {
        match cursor.peek() {
            None => {
                errors.push(ParseError::new(
                    ParseErrorKind::Unterminated,
                    line,
                    column,
                    format!("unterminated long bracket (level {level})"),
                ));
                return Some((cursor.slice_from(start).to_string(), level));
            }
            Some(']') => {
                cursor.advance();
                let mut close_level = 0u32;
                while cursor.eat('=') {
                    close_level += 1;
                }
                if close_level == level && cursor.eat(']') {
                    let text = cursor.slice_from(start);
                    let text = text[..text.len() - (close_level as usize + 2)].to_string();
                    return Some((text, level));
                }
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
}

fn try_lex_comment(cursor: &mut Cursor, errors: &mut Vec<ParseError>) -> Option<Comment> {
    if cursor.peek() != Some('-') || cursor.peek2() != Some('-') {
        return None;
    }
    cursor.advance();
    cursor.advance();
    if cursor.peek() == Some('[') && matches!(cursor.peek2(), Some('[') | Some('=')) {
        let (save_line, save_col) = cursor.current_pos();
        if let Some((text, _level)) = lex_long_bracket(cursor, save_line, save_col, errors) {
            return Some(Comment {
                kind: CommentKind::Block,
                text,
            });
        }
    }
    let start = cursor.byte_offset();
    while matches!(cursor.peek(), Some(c) if c != '\n') {
        cursor.advance();
    }
    let text = cursor.slice_from(start).to_string();
    Some(Comment {
        kind: CommentKind::Line,
        text,
    })
}

fn lex_punct(
    cursor: &mut Cursor,
    line: u32,
    column: u32,
    errors: &mut Vec<ParseError>,
    start: usize,
) -> Token {
    let c = cursor.advance().unwrap();
    macro_rules! tok {
        ($kind:expr) => {
            Token::new($kind, cursor.slice_from(start), line, column)
        };
    }
    match c {
        '+' => tok!(TokenKind::Plus),
        '-' => tok!(TokenKind::Minus),
        '*' => tok!(TokenKind::Star),
        '/' => tok!(TokenKind::Slash),
        '%' => tok!(TokenKind::Percent),
        '^' => tok!(TokenKind::Caret),
        '#' => tok!(TokenKind::Hash),
        '(' => tok!(TokenKind::LParen),
        ')' => tok!(TokenKind::RParen),
        '{' => tok!(TokenKind::LBrace),
        '}' => tok!(TokenKind::RBrace),
        '[' => tok!(TokenKind::LBracket),
        ']' => tok!(TokenKind::RBracket),
        ';' => tok!(TokenKind::Semi),
        ',' => tok!(TokenKind::Comma),
        '=' => {
            if cursor.eat('=') {
                tok!(TokenKind::EqEq)
            } else {
                tok!(TokenKind::Eq)
            }
        }
        '~' => {
            if cursor.eat('=') {
                tok!(TokenKind::Ne)
            } else {
                errors.push(ParseError::new(
                    ParseErrorKind::Lexical,
                    line,
                    column,
                    "unexpected character `~`",
                ));
                tok!(TokenKind::Ne)
            }
        }
        '<' => {
            if cursor.eat('=') {
                tok!(TokenKind::Le)
            } else {
                tok!(TokenKind::Lt)
            }
        }
        '>' => {
            if cursor.eat('=') {
                tok!(TokenKind::Ge)
            } else {
                tok!(TokenKind::Gt)
            }
        }
        ':' => {
            if cursor.eat(':') {
                tok!(TokenKind::DoubleColon)
            } else {
                tok!(TokenKind::Colon)
            }
        }
        '.' => {
            if cursor.eat('.') {
                if cursor.eat('.') {
                    tok!(TokenKind::Ellipsis)
                } else {
                    tok!(TokenKind::DotDot)
                }
            } else {
                tok!(TokenKind::Dot)
            }
        }
        other => {
            errors.push(ParseError::new(
                ParseErrorKind::Lexical,
                line,
                column,
                format!("unexpected character `{other}`"),
            ));
            Token::new(TokenKind::Error, cursor.slice_from(start), line, column)
        }
    }
}
