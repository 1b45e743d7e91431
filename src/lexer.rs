//! A small TypeScript lexer. It knows just enough of the language to find
//! top-level declarations and read literal initializers: strings, template
//! literals, regex literals and comments are consumed whole so that braces
//! inside them never disturb nesting depth.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifiers and keywords alike.
    Ident(String),
    /// Cooked value of a quoted string.
    Str(String),
    /// Template literal body. Cooked when there is no `${}`; raw otherwise.
    Template { value: String, interpolated: bool },
    Number(String),
    Regex,
    Punct(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        matches!(self.kind, TokenKind::Punct(q) if q == p)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(w) if w == word)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(w) => Some(w),
            _ => None,
        }
    }

    pub fn opens(&self) -> bool {
        self.is_punct("{") || self.is_punct("(") || self.is_punct("[")
    }

    pub fn closes(&self) -> bool {
        self.is_punct("}") || self.is_punct(")") || self.is_punct("]")
    }
}

const PUNCTS: &[&str] = &[
    "...", "=>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/", "%",
    "&", "|", "^", "!", "~", "?", ":", "=", ".", "@", "#",
];

// Keywords after which a `/` starts a regex rather than a division.
const REGEX_PRECEDERS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "instanceof", "new", "void", "delete",
    "throw", "yield", "await",
];

pub fn tokenize(src: &str) -> Vec<Token> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        if self.src.starts_with("#!") {
            self.pos = self.line_end(0);
        }
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            let start = self.pos;
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.pos = self.line_end(self.pos),
                b'/' if self.peek(1) == Some(b'*') => {
                    self.pos = match self.src[start + 2..].find("*/") {
                        Some(i) => start + 2 + i + 2,
                        None => self.bytes.len(),
                    };
                }
                b'/' if self.regex_allowed() => match self.scan_regex(start) {
                    Some(end) => {
                        self.pos = end;
                        self.push(TokenKind::Regex, start);
                    }
                    None => {
                        self.pos += 1;
                        self.push(TokenKind::Punct("/"), start);
                    }
                },
                b'\'' | b'"' => {
                    let end = self.scan_quoted(start, b);
                    let body_end = if end > start + 1 && self.bytes[end - 1] == b {
                        end - 1
                    } else {
                        end
                    };
                    self.pos = end;
                    self.push(TokenKind::Str(unescape(&self.src[start + 1..body_end])), start);
                }
                b'`' => {
                    let (end, interpolated) = self.scan_template(start);
                    let body_end = if end > start + 1 && self.bytes[end - 1] == b'`' {
                        end - 1
                    } else {
                        end
                    };
                    let body = &self.src[start + 1..body_end];
                    let value = if interpolated {
                        body.to_string()
                    } else {
                        unescape(body)
                    };
                    self.pos = end;
                    self.push(TokenKind::Template { value, interpolated }, start);
                }
                b'0'..=b'9' => self.number(start),
                b'.' if self.peek(1).map_or(false, |c| c.is_ascii_digit()) => self.number(start),
                _ if is_ident_start(b) => {
                    while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
                        self.pos += 1;
                    }
                    let word = self.src[start..self.pos].to_string();
                    self.push(TokenKind::Ident(word), start);
                }
                _ => {
                    let rest = &self.src[start..];
                    match PUNCTS.iter().find(|p| rest.starts_with(**p)) {
                        Some(&p) => {
                            self.pos += p.len();
                            self.push(TokenKind::Punct(p), start);
                        }
                        None => {
                            // Anything else (stray unicode, backslash) is skipped whole.
                            let width = rest.chars().next().map_or(1, char::len_utf8);
                            self.pos += width;
                        }
                    }
                }
            }
        }
        self.tokens
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: start..self.pos,
        });
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn line_end(&self, from: usize) -> usize {
        self.src[from..]
            .find('\n')
            .map_or(self.bytes.len(), |i| from + i)
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last().map(|t| &t.kind) {
            None => true,
            Some(TokenKind::Punct(p)) => !matches!(*p, ")" | "]" | "}"),
            Some(TokenKind::Ident(w)) => REGEX_PRECEDERS.contains(&w.as_str()),
            Some(_) => false,
        }
    }

    fn number(&mut self, start: usize) {
        self.pos = start;
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            let exponent_sign = (c == b'+' || c == b'-')
                && self.pos > start
                && matches!(self.bytes[self.pos - 1], b'e' | b'E')
                && !self.src[start..self.pos].starts_with("0x");
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        let raw = self.src[start..self.pos].to_string();
        self.push(TokenKind::Number(raw), start);
    }

    /// End offset (exclusive) of a quoted string starting at `start`.
    fn scan_quoted(&self, start: usize, quote: u8) -> usize {
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => return i,
                c if c == quote => return i + 1,
                _ => i += 1,
            }
        }
        self.bytes.len()
    }

    /// End offset of a template literal, and whether it interpolates.
    fn scan_template(&self, start: usize) -> (usize, bool) {
        let mut i = start + 1;
        let mut interpolated = false;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'`' => return (i + 1, interpolated),
                b'$' if self.bytes.get(i + 1) == Some(&b'{') => {
                    interpolated = true;
                    i = self.skip_expression(i + 2);
                }
                _ => i += 1,
            }
        }
        (self.bytes.len(), interpolated)
    }

    /// Skips a `${ ... }` body, returning the offset just past its `}`.
    fn skip_expression(&self, mut i: usize) -> usize {
        let mut depth = 1usize;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                q @ (b'\'' | b'"') => {
                    i = self.scan_quoted(i, q);
                    continue;
                }
                b'`' => {
                    i = self.scan_template(i).0;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
        self.bytes.len()
    }

    /// End offset of a regex literal, or None when the slash can't start one
    /// (a newline before the closing slash).
    fn scan_regex(&self, start: usize) -> Option<usize> {
        let mut i = start + 1;
        let mut in_class = false;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => return None,
                b'[' => {
                    in_class = true;
                    i += 1;
                }
                b']' => {
                    in_class = false;
                    i += 1;
                }
                b'/' if !in_class => {
                    i += 1;
                    while i < self.bytes.len() && self.bytes[i].is_ascii_alphabetic() {
                        i += 1;
                    }
                    return Some(i);
                }
                _ => i += 1,
            }
        }
        None
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Cooks JavaScript string escapes.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex);
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex);
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => out.push(char::REPLACEMENT_CHARACTER),
    }
}
