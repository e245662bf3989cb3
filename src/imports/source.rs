//! Reference-aware view of a Go source file.
//!
//! Only the package clause and the import declarations that follow it are
//! parsed; the body of the file is never inspected. Each import path literal
//! is recorded with its byte span, so a rewritten file is the original text
//! with just those literals replaced. Comments, formatting, build
//! constraints and cgo preambles survive byte for byte.

use crate::error::{IoContext, Result, VendorError};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Delimiter of a Go string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// `"interpreted"`
    Double,
    /// `` `raw` ``
    Back,
}

impl Quote {
    pub fn delimiter(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Back => '`',
        }
    }

    pub fn wrap(self, value: &str) -> String {
        let d = self.delimiter();
        format!("{d}{value}{d}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name (`_`, `.`, or an identifier), if any.
    pub name: Option<String>,
    /// Import path with the delimiters removed.
    pub path: String,
    pub quote: Quote,
    /// Byte span of the literal, delimiters included.
    pub span: Range<usize>,
    pub line: usize,
    pub column: usize,
    replacement: Option<String>,
}

impl ImportSpec {
    /// Path as it will be serialized.
    pub fn current_path(&self) -> &str {
        self.replacement.as_deref().unwrap_or(&self.path)
    }

    pub fn is_rewritten(&self) -> bool {
        self.replacement.is_some()
    }

    /// Replace the import path, keeping the literal's original delimiter.
    pub fn set_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.replacement = (path != self.path).then_some(path);
    }
}

#[derive(Debug, Clone)]
pub struct GoSource {
    path: PathBuf,
    text: String,
    package: String,
    imports: Vec<ImportSpec>,
}

impl GoSource {
    /// Parse the header of `text`. `path` is used for diagnostics only.
    pub fn parse(path: impl AsRef<Path>, text: String) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (package, imports) = {
            let mut scanner = Scanner {
                src: &text,
                pos: 0,
                path: &path,
            };
            scanner.header()?
        };
        Ok(Self {
            path,
            text,
            package,
            imports,
        })
    }

    /// Read and parse the file at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).at(path)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let prefix = std::str::from_utf8(valid).unwrap_or_default();
            let (line, column) = position(prefix, prefix.len());
            VendorError::SourceFileParse {
                path: path.to_path_buf(),
                line,
                column,
                message: "invalid UTF-8 encoding".to_string(),
            }
        })?;
        Self::parse(path, text)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }

    pub fn imports_mut(&mut self) -> &mut [ImportSpec] {
        &mut self.imports
    }

    pub fn is_modified(&self) -> bool {
        self.imports.iter().any(ImportSpec::is_rewritten)
    }

    /// Serialize back to Go source.
    pub fn render(&self) -> String {
        if !self.is_modified() {
            return self.text.clone();
        }

        let mut out = String::with_capacity(self.text.len() + 64 * self.imports.len());
        let mut last = 0;
        for spec in &self.imports {
            if let Some(new_path) = &spec.replacement {
                out.push_str(&self.text[last..spec.span.start]);
                out.push_str(&spec.quote.wrap(new_path));
                last = spec.span.end;
            }
        }
        out.push_str(&self.text[last..]);
        out
    }
}

/// First character that cannot appear in an import path literal, if any.
///
/// Paths free of these can be wrapped in either quote style as-is.
pub fn invalid_path_char(path: &str) -> Option<char> {
    path.chars()
        .find(|&c| c == '\\' || c == '"' || c == '`' || c.is_whitespace() || c.is_control())
}

/// 1-based line and column (in characters) of byte offset `at`.
fn position(src: &str, at: usize) -> (usize, usize) {
    let before = &src[..at];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    path: &'a Path,
}

impl<'a> Scanner<'a> {
    fn error(&self, at: usize, message: impl Into<String>) -> VendorError {
        let (line, column) = self.position(at);
        VendorError::SourceFileParse {
            path: self.path.to_path_buf(),
            line,
            column,
            message: message.into(),
        }
    }

    fn position(&self, at: usize) -> (usize, usize) {
        position(self.src, at)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Whitespace, comments and semicolons.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error(self.pos, "comment not terminated")),
                }
            } else if let Some(c) = self.peek()
                && (c.is_whitespace() || c == ';' || c == '\u{feff}')
            {
                self.pos += c.len_utf8();
            } else {
                return Ok(());
            }
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let first = rest.chars().next()?;
        if !(first == '_' || first.is_alphabetic()) {
            return None;
        }
        let len = rest
            .char_indices()
            .find(|&(_, c)| !(c == '_' || c.is_alphanumeric()))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        Some(&rest[..len])
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// A string literal, returning its delimiter, raw body and span.
    fn string_lit(&mut self) -> Result<Option<(Quote, &'a str, Range<usize>)>> {
        let start = self.pos;
        let quote = match self.peek() {
            Some('"') => Quote::Double,
            Some('`') => Quote::Back,
            _ => return Ok(None),
        };
        let body_start = start + 1;
        let body = &self.src[body_start..];

        let mut escaped = false;
        for (i, c) in body.char_indices() {
            match (quote, c) {
                (Quote::Double, '\n') => break,
                (Quote::Double, '\\') if !escaped => {
                    escaped = true;
                    continue;
                }
                (_, c) if c == quote.delimiter() && !escaped => {
                    let end = body_start + i + 1;
                    self.pos = end;
                    return Ok(Some((quote, &body[..i], start..end)));
                }
                _ => {}
            }
            escaped = false;
        }

        Err(self.error(start, "string literal not terminated"))
    }

    fn header(&mut self) -> Result<(String, Vec<ImportSpec>)> {
        self.skip_trivia()?;
        let at = self.pos;
        if self.ident() != Some("package") {
            return Err(self.error(at, "expected 'package' clause"));
        }
        self.skip_trivia()?;
        let at = self.pos;
        let package = match self.ident() {
            Some(name) => name.to_string(),
            None => return Err(self.error(at, "expected package name")),
        };

        let mut imports = Vec::new();
        loop {
            self.skip_trivia()?;
            let at = self.pos;
            if self.ident() != Some("import") {
                self.pos = at;
                break;
            }
            self.skip_trivia()?;
            if self.eat('(') {
                loop {
                    self.skip_trivia()?;
                    if self.eat(')') {
                        break;
                    }
                    if self.peek().is_none() {
                        return Err(self.error(at, "import block not terminated"));
                    }
                    imports.push(self.import_spec()?);
                }
            } else {
                imports.push(self.import_spec()?);
            }
        }

        Ok((package, imports))
    }

    fn import_spec(&mut self) -> Result<ImportSpec> {
        let name = if self.eat('.') {
            Some(".".to_string())
        } else {
            self.ident().map(str::to_string)
        };
        let after_name = self.pos;
        if name.is_some() {
            self.skip_trivia()?;
        }

        let at = self.pos;
        let Some((quote, body, span)) = self.string_lit()? else {
            return Err(self.error(after_name, "missing import path"));
        };
        if body.is_empty() {
            return Err(self.error(at, "empty import path"));
        }
        if let Some(bad) = invalid_path_char(body) {
            return Err(self.error(at, format!("invalid character {:?} in import path", bad)));
        }

        let (line, column) = self.position(at);
        Ok(ImportSpec {
            name,
            path: body.to_string(),
            quote,
            span,
            line,
            column,
            replacement: None,
        })
    }
}
