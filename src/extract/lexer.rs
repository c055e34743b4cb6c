//! Minimal PHP tokenizer.
//!
//! This is not a PHP parser. It produces just enough lexical structure for
//! call-site scanning: identifiers, string literals (with interpolation
//! detection), comments with their line spans, brackets and commas. Code
//! the scanner does not care about comes through as [`TokenKind::Other`]
//! without allocation.
//!
//! The tokenizer honors the lexical hazards that would otherwise produce
//! false call sites: text outside `<?php`/`<?=` tags is inline HTML and
//! skipped, `?>` drops back to HTML mode, heredoc/nowdoc bodies are skipped
//! to their terminating label, and escaped quotes never terminate a
//! literal early.

/// One lexical token. `line` is the 1-based line the token starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// An identifier (function name, constant name, keyword - the scanner
    /// decides which).
    Ident(&'a str),
    /// A quoted string literal, raw text including the quote characters.
    Str { raw: &'a str, kind: StrKind },
    /// A comment, raw text including the delimiters. `last_line` is the
    /// line the comment ends on (equal to the token line except for
    /// multi-line block comments).
    Comment { raw: &'a str, last_line: usize },
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    /// Anything else: operators, variables, numbers, backticks, heredocs,
    /// unterminated literals. Opaque to the scanner.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrKind {
    /// A constant literal whose value is statically known.
    Constant,
    /// A double-quoted literal containing interpolation; its value cannot
    /// be known statically.
    Interpolated,
}

pub(crate) struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    in_php: bool,
}

/// PHP identifier start: letter, underscore, or any byte >= 0x80.
fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic() || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            in_php: false,
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    /// Advance through inline HTML until an open tag flips us into PHP mode.
    fn skip_inline_html(&mut self) {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'<' && self.peek(1) == Some(b'?') {
                let rest = &self.bytes[self.pos + 2..];
                // open tags are case-insensitive: `<?PHP` also counts
                if rest.len() >= 3
                    && rest[..3].eq_ignore_ascii_case(b"php")
                    && rest.get(3).is_none_or(|&b| !is_ident_continue(b))
                {
                    self.pos += 5;
                    self.in_php = true;
                    return;
                }
                if rest.first() == Some(&b'=') {
                    self.pos += 3;
                    self.in_php = true;
                    return;
                }
                // bare `<?` is inline HTML with short_open_tag off
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' | 0x0B | 0x0C => self.pos += 1,
                _ => break,
            }
        }
    }

    /// `//` or `#` comment: runs to end of line or to a `?>` close tag.
    fn scan_line_comment(&mut self) -> TokenKind<'a> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\n' || (b == b'?' && self.peek(1) == Some(b'>')) {
                break;
            }
            self.pos += 1;
        }
        TokenKind::Comment {
            raw: &self.src[start..self.pos],
            last_line: self.line,
        }
    }

    fn scan_block_comment(&mut self) -> TokenKind<'a> {
        let start = self.pos;
        self.pos += 2;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'*' if self.peek(1) == Some(b'/') => {
                    self.pos += 2;
                    break;
                }
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        TokenKind::Comment {
            raw: &self.src[start..self.pos],
            last_line: self.line,
        }
    }

    /// Scan a quoted region. Backslash escapes the following character for
    /// the purpose of finding the closing quote, in every quote style.
    /// Unterminated literals consume to end of input and come back opaque.
    fn scan_quoted(&mut self, quote: u8) -> TokenKind<'a> {
        let start = self.pos;
        self.pos += 1;
        let mut interpolated = false;

        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\\' {
                if self.peek(1) == Some(b'\n') {
                    self.line += 1;
                }
                self.pos = (self.pos + 2).min(self.bytes.len());
                continue;
            }
            if b == quote {
                self.pos += 1;
                if quote == b'`' {
                    return TokenKind::Other;
                }
                let kind = if interpolated {
                    StrKind::Interpolated
                } else {
                    StrKind::Constant
                };
                return TokenKind::Str {
                    raw: &self.src[start..self.pos],
                    kind,
                };
            }
            if b == b'\n' {
                self.line += 1;
            }
            if quote != b'\'' {
                // `$ident`, `${...}` and `{$...}` all interpolate
                if b == b'$'
                    && self
                        .peek(1)
                        .is_some_and(|n| is_ident_start(n) || n == b'{')
                {
                    interpolated = true;
                }
                if b == b'{' && self.peek(1) == Some(b'$') {
                    interpolated = true;
                }
            }
            self.pos += 1;
        }
        TokenKind::Other
    }

    /// Heredoc/nowdoc: `<<<LABEL ... LABEL`. The body is opaque - PHP's
    /// tokenizer never yields it as a constant string, so neither do we.
    fn scan_heredoc(&mut self) -> TokenKind<'a> {
        self.pos += 3;
        while matches!(self.peek(0), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }

        let quote = match self.peek(0) {
            Some(q @ (b'\'' | b'"')) => {
                self.pos += 1;
                Some(q)
            }
            _ => None,
        };

        let label_start = self.pos;
        while self.peek(0).is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let label = &self.bytes[label_start..self.pos];
        if label.is_empty() {
            return TokenKind::Other;
        }
        if let Some(q) = quote {
            if self.peek(0) == Some(q) {
                self.pos += 1;
            }
        }
        self.skip_to_next_line();

        loop {
            if self.pos >= self.bytes.len() {
                return TokenKind::Other;
            }
            // terminating label may be indented (flexible heredoc syntax)
            let mut probe = self.pos;
            while matches!(self.bytes.get(probe), Some(b' ') | Some(b'\t')) {
                probe += 1;
            }
            if self.bytes[probe..].starts_with(label)
                && self
                    .bytes
                    .get(probe + label.len())
                    .is_none_or(|&b| !is_ident_continue(b))
            {
                self.pos = probe + label.len();
                return TokenKind::Other;
            }
            self.skip_to_next_line();
        }
    }

    fn skip_to_next_line(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        if self.pos < self.bytes.len() {
            self.line += 1;
            self.pos += 1;
        }
    }

    fn scan_ident(&mut self) -> TokenKind<'a> {
        let start = self.pos;
        while self.peek(0).is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        TokenKind::Ident(&self.src[start..self.pos])
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if self.pos >= self.bytes.len() {
                return None;
            }
            if !self.in_php {
                self.skip_inline_html();
                continue;
            }
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                return None;
            }

            let line = self.line;
            let b = self.bytes[self.pos];
            let kind = match b {
                b'?' if self.peek(1) == Some(b'>') => {
                    self.pos += 2;
                    self.in_php = false;
                    TokenKind::Other
                }
                b'/' if self.peek(1) == Some(b'/') => self.scan_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.scan_block_comment(),
                b'#' => self.scan_line_comment(),
                b'\'' | b'"' | b'`' => self.scan_quoted(b),
                b'<' if self.peek(1) == Some(b'<') && self.peek(2) == Some(b'<') => {
                    self.scan_heredoc()
                }
                b'$' => {
                    self.pos += 1;
                    while self.peek(0).is_some_and(is_ident_continue) {
                        self.pos += 1;
                    }
                    TokenKind::Other
                }
                b'(' => {
                    self.pos += 1;
                    TokenKind::OpenParen
                }
                b')' => {
                    self.pos += 1;
                    TokenKind::CloseParen
                }
                b'[' => {
                    self.pos += 1;
                    TokenKind::OpenBracket
                }
                b']' => {
                    self.pos += 1;
                    TokenKind::CloseBracket
                }
                b'{' => {
                    self.pos += 1;
                    TokenKind::OpenBrace
                }
                b'}' => {
                    self.pos += 1;
                    TokenKind::CloseBrace
                }
                b',' => {
                    self.pos += 1;
                    TokenKind::Comma
                }
                _ if is_ident_start(b) => self.scan_ident(),
                _ => {
                    self.pos += 1;
                    TokenKind::Other
                }
            };
            return Some(Token { kind, line });
        }
    }
}
