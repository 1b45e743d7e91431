//! Static evaluation of TypeScript literal initializers into JSON.
//!
//! Object and array literals, strings, numbers and keywords are converted
//! directly. `new SomethingError("msg")` becomes the `{"error": "msg"}`
//! sentinel. Anything else (references, calls, arrows) is kept as its raw
//! source text so that nothing in a module ever has to be executed.

use serde_json::{Map, Number, Value};

use crate::lexer::{Token, TokenKind};

/// Key of the sentinel object that stands in for a thrown error.
pub const ERROR_SENTINEL_KEY: &str = "error";

pub fn parse_value(src: &str, tokens: &[Token], start: usize) -> Value {
    let mut parser = LiteralParser {
        src,
        tokens,
        pos: start,
    };
    parser.value(false)
}

pub fn error_sentinel(message: impl Into<String>) -> Value {
    let mut map = Map::new();
    map.insert(ERROR_SENTINEL_KEY.to_string(), Value::String(message.into()));
    Value::Object(map)
}

struct LiteralParser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, p: &str) -> bool {
        self.peek().map_or(false, |t| t.is_punct(p))
    }

    fn value(&mut self, nested: bool) -> Value {
        let start = self.pos;
        let value = match self.primary() {
            Some(v) => v,
            None => return self.raw(start, nested),
        };
        self.skip_type_suffix(nested);
        if nested && !self.at_delimiter() {
            return self.raw(start, nested);
        }
        value
    }

    fn primary(&mut self) -> Option<Value> {
        let tok = self.peek()?;
        match &tok.kind {
            TokenKind::Punct("{") => Some(self.object()),
            TokenKind::Punct("[") => Some(self.array()),
            TokenKind::Punct("(") => {
                self.pos += 1;
                let inner = self.value(true);
                if !self.peek_is(")") {
                    return None;
                }
                self.pos += 1;
                Some(inner)
            }
            TokenKind::Str(s) => {
                self.pos += 1;
                Some(Value::String(s.clone()))
            }
            TokenKind::Template { value, .. } => {
                self.pos += 1;
                Some(Value::String(value.clone()))
            }
            TokenKind::Number(raw) => {
                self.pos += 1;
                Some(number(raw, false))
            }
            TokenKind::Punct(sign @ ("-" | "+")) => {
                let negative = *sign == "-";
                match &self.tokens.get(self.pos + 1)?.kind {
                    TokenKind::Number(raw) => {
                        self.pos += 2;
                        Some(number(raw, negative))
                    }
                    TokenKind::Ident(w) if w == "Infinity" => {
                        self.pos += 2;
                        Some(Value::Null)
                    }
                    _ => None,
                }
            }
            TokenKind::Ident(word) => match word.as_str() {
                "true" => {
                    self.pos += 1;
                    Some(Value::Bool(true))
                }
                "false" => {
                    self.pos += 1;
                    Some(Value::Bool(false))
                }
                // JSON.stringify renders all of these as null.
                "null" | "undefined" | "NaN" | "Infinity" => {
                    self.pos += 1;
                    Some(Value::Null)
                }
                "new" => self.constructed_error(),
                _ => None,
            },
            _ => None,
        }
    }

    fn object(&mut self) -> Value {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            let tok = match self.peek() {
                Some(t) => t,
                None => break,
            };
            if tok.is_punct("}") {
                self.pos += 1;
                break;
            }
            if tok.is_punct(",") {
                self.pos += 1;
                continue;
            }
            if tok.is_punct("...") {
                self.pos += 1;
                self.value(true);
                continue;
            }

            let key_start = self.pos;
            let key = match &tok.kind {
                TokenKind::Ident(w) => w.clone(),
                TokenKind::Str(s) => s.clone(),
                TokenKind::Template { value, .. } => value.clone(),
                TokenKind::Number(raw) => raw.clone(),
                TokenKind::Punct("[") => {
                    // Computed keys can't be resolved statically.
                    self.raw(key_start, true);
                    continue;
                }
                _ => {
                    self.pos += 1;
                    continue;
                }
            };
            self.pos += 1;

            match self.peek() {
                Some(t) if t.is_punct(":") => {
                    self.pos += 1;
                    let value = self.value(true);
                    map.insert(key, value);
                }
                Some(t) if t.is_punct(",") || t.is_punct("}") => {
                    // Shorthand property refers to a binding; keep its name.
                    map.insert(key.clone(), Value::String(key));
                }
                Some(t) if t.ident().is_some() => {
                    // `get x() {}`, `async x() {}`: key is the second word.
                    let method = t.ident().unwrap_or_default().to_string();
                    let body = self.raw(key_start, true);
                    map.insert(method, body);
                }
                _ => {
                    let body = self.raw(key_start, true);
                    map.insert(key, body);
                }
            }
        }
        Value::Object(map)
    }

    fn array(&mut self) -> Value {
        self.pos += 1;
        let mut items = Vec::new();
        let mut hole = true;
        loop {
            let tok = match self.peek() {
                Some(t) => t,
                None => break,
            };
            if tok.is_punct("]") {
                self.pos += 1;
                break;
            }
            if tok.is_punct(",") {
                if hole {
                    items.push(Value::Null);
                }
                hole = true;
                self.pos += 1;
                continue;
            }
            hole = false;
            if tok.is_punct("...") {
                let spread_start = self.pos;
                self.pos += 1;
                match self.value(true) {
                    Value::Array(inner) => items.extend(inner),
                    _ => items.push(self.text(spread_start, self.pos)),
                }
                continue;
            }
            // A stray `;` or mismatched closer means the literal was never
            // closed; keep what was parsed so far.
            let before = self.pos;
            let item = self.value(true);
            if self.pos == before {
                break;
            }
            items.push(item);
        }
        Value::Array(items)
    }

    fn constructed_error(&mut self) -> Option<Value> {
        let ctor = self.tokens.get(self.pos + 1)?.ident()?;
        let open = self.pos + 2;
        if !ctor.ends_with("Error") || !self.tokens.get(open)?.is_punct("(") {
            return None;
        }
        let message = match self.tokens.get(open + 1).map(|t| &t.kind) {
            Some(TokenKind::Str(s)) => s.clone(),
            Some(TokenKind::Template { value, .. }) => value.clone(),
            _ => String::new(),
        };
        let close = crate::parser::matching_close(self.tokens, open)?;
        self.pos = close + 1;
        Some(error_sentinel(message))
    }

    fn skip_type_suffix(&mut self, nested: bool) {
        while self
            .peek()
            .map_or(false, |t| t.is_ident("as") || t.is_ident("satisfies"))
        {
            self.pos += 1;
            self.pos = self.scan_end(self.pos, nested);
        }
    }

    fn at_delimiter(&self) -> bool {
        match self.peek() {
            None => true,
            Some(t) => t.is_punct(",") || t.is_punct(";") || t.closes(),
        }
    }

    /// Index of the first token past the expression starting at `start`.
    fn scan_end(&self, start: usize, nested: bool) -> usize {
        let mut depth = 0usize;
        let mut k = start;
        while k < self.tokens.len() {
            let t = &self.tokens[k];
            if t.opens() {
                depth += 1;
            } else if t.closes() {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            } else if depth == 0 {
                if t.is_punct(",") || t.is_punct(";") {
                    break;
                }
                if !nested && k > start && starts_statement(t) {
                    break;
                }
            }
            k += 1;
        }
        k
    }

    fn raw(&mut self, start: usize, nested: bool) -> Value {
        let end = self.scan_end(start, nested);
        self.pos = end;
        if end == start {
            return Value::Null;
        }
        self.text(start, end)
    }

    fn text(&self, start: usize, end: usize) -> Value {
        let from = self.tokens[start].span.start;
        let to = self.tokens[end - 1].span.end;
        Value::String(self.src[from..to].trim().to_string())
    }
}

fn starts_statement(t: &Token) -> bool {
    matches!(
        t.ident(),
        Some("export" | "import" | "function" | "class" | "const" | "let" | "var")
    )
}

fn number(raw: &str, negative: bool) -> Value {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.trim_end_matches('n');
    let sign = if negative { -1 } else { 1 };

    let radix = [("0x", 16), ("0X", 16), ("0b", 2), ("0B", 2), ("0o", 8), ("0O", 8)]
        .iter()
        .find_map(|(prefix, radix)| cleaned.strip_prefix(prefix).map(|digits| (digits, *radix)));
    if let Some((digits, radix)) = radix {
        return match i64::from_str_radix(digits, radix) {
            Ok(n) => Value::from(sign * n),
            Err(_) => Value::Null,
        };
    }

    if let Ok(n) = cleaned.parse::<i64>() {
        return Value::from(sign * n);
    }
    match cleaned.parse::<f64>() {
        Ok(f) => {
            let f = f * sign as f64;
            if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                Value::from(f as i64)
            } else {
                Number::from_f64(f).map_or(Value::Null, Value::Number)
            }
        }
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use serde_json::json;

    fn eval(src: &str) -> Value {
        let tokens = tokenize(src);
        parse_value(src, &tokens, 0)
    }

    #[test]
    fn object_literal_with_bare_keys_and_trailing_commas() {
        let v = eval("{ title: 'Two Sum', 'time-ish': \"O(n)\", concepts: ['hash', `map`,], n: -3, ok: true, }");
        assert_eq!(
            v,
            json!({"title": "Two Sum", "time-ish": "O(n)", "concepts": ["hash", "map"], "n": -3, "ok": true})
        );
    }

    #[test]
    fn preserves_key_order() {
        let v = eval("{ zeta: 1, alpha: 2, mid: 3 }");
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn error_constructors_become_sentinels() {
        let v = eval("[{ input: [], output: new RangeError('empty input'), description: 'fails' }]");
        assert_eq!(
            v,
            json!([{"input": [], "output": {"error": "empty input"}, "description": "fails"}])
        );
    }

    #[test]
    fn non_literal_expressions_keep_raw_text() {
        let v = eval("{ input: makeList(1, 2), fn: (a, b) => { return a + b; }, nested: new Map(), short }");
        assert_eq!(
            v,
            json!({
                "input": "makeList(1, 2)",
                "fn": "(a, b) => { return a + b; }",
                "nested": "new Map()",
                "short": "short"
            })
        );
    }

    #[test]
    fn json_stringify_number_semantics() {
        assert_eq!(eval("[1.0, 2.5, 0x10, 1_000, NaN, -Infinity, undefined, 1e3]"), json!([1, 2.5, 16, 1000, null, null, null, 1000]));
    }

    #[test]
    fn ignores_type_assertions() {
        assert_eq!(eval("['a', 'b'] as const;\nexport function f() {}"), json!(["a", "b"]));
        assert_eq!(eval("{ level: 'easy' as Level } satisfies Meta"), json!({"level": "easy"}));
    }

    #[test]
    fn array_holes_and_spreads() {
        assert_eq!(eval("[, 1, ...[2, 3], ...rest]"), json!([null, 1, 2, 3, "...rest"]));
    }

    #[test]
    fn unclosed_array_stops_at_statement_end() {
        assert_eq!(eval("[1, 2;\nexport function f() {}"), json!([1, 2]));
        assert_eq!(eval("[{ a: 1 }, 'x')"), json!([{"a": 1}, "x"]));
    }

    #[test]
    fn value_followed_by_operator_is_raw() {
        assert_eq!(eval("{ total: 1 + 2, list: [1].concat([2]) }"), json!({"total": "1 + 2", "list": "[1].concat([2])"}));
    }
}
