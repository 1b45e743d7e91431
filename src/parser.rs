use crate::lexer::{tokenize, Token};
use crate::literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// `export function f` or a `const` bound to an arrow/function expression.
    Function,
    Class,
    /// Any other `const`/`let`/`var` binding.
    Value,
    /// `type`, `interface`, `enum` and friends.
    Type,
    /// `export { .. }`, `export * from`, anonymous default exports.
    ReExport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDecl {
    pub name: String,
    pub kind: ExportKind,
    /// Byte offset of the `export` keyword.
    pub offset: usize,
    init: Option<usize>,
}

/// The top-level export surface of one TypeScript module, found statically.
pub struct ParsedModule<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    exports: Vec<ExportDecl>,
}

impl<'a> ParsedModule<'a> {
    pub fn parse(source: &'a str) -> Self {
        let tokens = tokenize(source);
        let mut module = Self {
            source,
            tokens,
            exports: Vec::new(),
        };

        let mut depth = 0usize;
        let mut starts = Vec::new();
        for (i, tok) in module.tokens.iter().enumerate() {
            if tok.opens() {
                depth += 1;
            } else if tok.closes() {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && tok.is_ident("export") && !is_member_access(&module.tokens, i) {
                starts.push(i);
            }
        }
        let exports: Vec<ExportDecl> = starts.into_iter().map(|i| module.parse_export(i)).collect();
        module.exports = exports;
        module
    }

    pub fn exports(&self) -> &[ExportDecl] {
        &self.exports
    }

    /// Exported function names in source order, without duplicates
    /// (overload signatures share a name).
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for decl in &self.exports {
            if decl.kind == ExportKind::Function && !names.iter().any(|n| n == &decl.name) {
                names.push(decl.name.clone());
            }
        }
        names
    }

    /// First declaration that introduces `name`. Exact match only, so
    /// `binarySearch` never resolves to `binarySearchRecursive`.
    pub fn find(&self, name: &str) -> Option<&ExportDecl> {
        self.exports.iter().find(|d| {
            d.name == name
                && matches!(d.kind, ExportKind::Function | ExportKind::Class | ExportKind::Value)
        })
    }

    /// Source text from the declaration's `export` keyword up to the next
    /// top-level `export` (or end of file). Empty when `name` isn't exported.
    pub fn extract(&self, name: &str) -> String {
        let decl = match self.find(name) {
            Some(d) => d,
            None => return String::new(),
        };
        let end = self
            .exports
            .iter()
            .map(|d| d.offset)
            .find(|&o| o > decl.offset)
            .unwrap_or(self.source.len());
        self.source[decl.offset..end].trim_end().to_string()
    }

    /// Statically evaluated initializer of an exported `const`.
    pub fn literal(&self, name: &str) -> Option<serde_json::Value> {
        let decl = self
            .exports
            .iter()
            .find(|d| d.name == name && d.kind == ExportKind::Value)?;
        let start = decl.init?;
        Some(literal::parse_value(self.source, &self.tokens, start))
    }

    fn tok(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    fn ident_at(&self, i: usize) -> Option<String> {
        self.tok(i).and_then(Token::ident).map(str::to_string)
    }

    fn parse_export(&self, i: usize) -> ExportDecl {
        let offset = self.tokens[i].span.start;
        let mut j = i + 1;
        let mut is_default = false;
        if self.tok(j).map_or(false, |t| t.is_ident("default")) {
            is_default = true;
            j += 1;
        }
        while self
            .tok(j)
            .map_or(false, |t| t.is_ident("async") || t.is_ident("abstract"))
        {
            j += 1;
        }

        let decl = |name: Option<String>, kind: ExportKind, init: Option<usize>| ExportDecl {
            name: name.unwrap_or_default(),
            kind,
            offset,
            init,
        };

        match self.tok(j).and_then(Token::ident) {
            Some("function") => {
                j += 1;
                if self.tok(j).map_or(false, |t| t.is_punct("*")) {
                    j += 1;
                }
                match self.ident_at(j) {
                    Some(name) => decl(Some(name), ExportKind::Function, None),
                    None => decl(None, ExportKind::ReExport, None),
                }
            }
            Some("class") => match self.ident_at(j + 1).filter(|n| n != "extends" && n != "implements") {
                Some(name) => decl(Some(name), ExportKind::Class, None),
                None => decl(None, ExportKind::ReExport, None),
            },
            Some("const" | "let" | "var") if !is_default => {
                let name = self.ident_at(j + 1);
                let init = name.as_ref().and_then(|_| self.find_initializer(j + 2));
                let kind = match init {
                    Some(k) if self.is_function_initializer(k) => ExportKind::Function,
                    _ => ExportKind::Value,
                };
                decl(name, kind, init)
            }
            Some("interface" | "type" | "enum" | "namespace" | "module" | "declare") => {
                decl(self.ident_at(j + 1), ExportKind::Type, None)
            }
            _ => decl(None, ExportKind::ReExport, None),
        }
    }

    /// Token index right after the `=` of a declarator, skipping any type
    /// annotation.
    fn find_initializer(&self, from: usize) -> Option<usize> {
        let mut depth = 0usize;
        for k in from..self.tokens.len() {
            let t = &self.tokens[k];
            if t.opens() {
                depth += 1;
            } else if t.closes() {
                depth = depth.saturating_sub(1);
            } else if depth == 0 {
                if t.is_punct("=") {
                    return Some(k + 1);
                }
                if t.is_punct(";") || ends_statement(t) {
                    return None;
                }
            }
        }
        None
    }

    fn is_function_initializer(&self, mut k: usize) -> bool {
        if self.tok(k).map_or(false, |t| t.is_ident("async")) {
            k += 1;
        }
        let tok = match self.tok(k) {
            Some(t) => t,
            None => return false,
        };
        if tok.is_ident("function") {
            return true;
        }
        if tok.ident().is_some() {
            return self.tok(k + 1).map_or(false, |t| t.is_punct("=>"));
        }
        if tok.is_punct("<") {
            k = match self.skip_type_params(k) {
                Some(next) => next,
                None => return false,
            };
        }
        if !self.tok(k).map_or(false, |t| t.is_punct("(")) {
            return false;
        }
        let close = match matching_close(&self.tokens, k) {
            Some(c) => c,
            None => return false,
        };
        match self.tok(close + 1) {
            Some(t) if t.is_punct("=>") => true,
            Some(t) if t.is_punct(":") => self.arrow_follows_return_type(close + 2),
            _ => false,
        }
    }

    fn arrow_follows_return_type(&self, from: usize) -> bool {
        let mut depth = 0usize;
        for t in &self.tokens[from.min(self.tokens.len())..] {
            if t.opens() {
                depth += 1;
            } else if t.closes() {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            } else if depth == 0 {
                if t.is_punct("=>") {
                    return true;
                }
                if t.is_punct(";") || t.is_punct("=") || ends_statement(t) {
                    return false;
                }
            }
        }
        false
    }

    /// Index just past the `>` closing a generic parameter list at `open`.
    fn skip_type_params(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for k in open..self.tokens.len() {
            let t = &self.tokens[k];
            if t.is_punct("<") {
                depth += 1;
            } else if t.is_punct(">") {
                depth -= 1;
                if depth == 0 {
                    return Some(k + 1);
                }
            } else if t.is_punct(";") || t.is_punct("{") {
                return None;
            }
        }
        None
    }
}

fn ends_statement(t: &Token) -> bool {
    matches!(
        t.ident(),
        Some("export" | "function" | "class" | "const" | "let" | "var")
    )
}

// `foo.export` or `{ export: 1 }` style property names are not declarations.
fn is_member_access(tokens: &[Token], i: usize) -> bool {
    let prev_dot = i > 0 && tokens[i - 1].is_punct(".");
    let next_colon = tokens.get(i + 1).map_or(false, |t| t.is_punct(":"));
    prev_dot || next_colon
}

pub(crate) fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (k, t) in tokens.iter().enumerate().skip(open) {
        if t.opens() {
            depth += 1;
        } else if t.closes() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(k);
            }
        }
    }
    None
}
