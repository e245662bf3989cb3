//! Lexer and parser for `go.mod` files.
//!
//! Produces an ordered list of statements. Whole-line comments directly above
//! a directive (no blank line in between) belong to that directive; a group
//! of comment lines followed by a blank line or the end of the file is a
//! standalone comment block.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Unquoted value.
    pub value: String,
    /// Text as written, including any quotes.
    pub raw: String,
}

impl Token {
    pub fn bare(value: impl Into<String>) -> Self {
        let value = value.into();
        let raw = auto_quote(&value);
        Self { value, raw }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub line: usize,
    pub verb: String,
    pub args: Vec<Token>,
    /// Whole-line comments immediately above the directive.
    pub before: Vec<String>,
    /// Trailing `//` comment on the same line.
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBlock {
    pub line: usize,
    pub verb: String,
    pub before: Vec<String>,
    pub entries: Vec<Vec<Token>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Comment(Vec<String>),
    Line(Directive),
    Block(DirectiveBlock),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModFile {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme {
    Word(Token),
    Open,
    Close,
    Comment(String),
    Newline,
}

fn lex(src: &str) -> Result<Vec<(usize, Lexeme)>, SyntaxError> {
    let mut out = Vec::new();
    let mut line = 1;
    let mut chars = src.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' | '\u{feff}' => {
                chars.next();
            }
            '\n' => {
                chars.next();
                out.push((line, Lexeme::Newline));
                line += 1;
            }
            '(' => {
                chars.next();
                out.push((line, Lexeme::Open));
            }
            ')' => {
                chars.next();
                out.push((line, Lexeme::Close));
            }
            '/' if src[start..].starts_with("//") => {
                let end = src[start..].find('\n').map_or(src.len(), |i| start + i);
                out.push((line, Lexeme::Comment(src[start..end].trim_end().to_string())));
                while chars.peek().is_some_and(|&(i, _)| i < end) {
                    chars.next();
                }
            }
            '"' | '`' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        '\n' => break,
                        '\\' if c == '"' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, esc @ ('"' | '\\'))) => value.push(esc),
                            Some((_, other)) => {
                                value.push('\\');
                                value.push(other);
                            }
                            None => break,
                        },
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        ch => value.push(ch),
                    }
                }
                if !closed {
                    return Err(SyntaxError::new(line, "unterminated quoted string"));
                }
                let end = chars.peek().map_or(src.len(), |&(i, _)| i);
                out.push((
                    line,
                    Lexeme::Word(Token {
                        value,
                        raw: src[start..end].to_string(),
                    }),
                ));
            }
            _ => {
                let rest = &src[start..];
                let len = rest
                    .char_indices()
                    .find(|&(i, ch)| {
                        ch.is_whitespace()
                            || matches!(ch, '(' | ')' | '"' | '`')
                            || rest[i..].starts_with("//")
                    })
                    .map_or(rest.len(), |(i, _)| i);
                let word = &rest[..len];
                out.push((
                    line,
                    Lexeme::Word(Token {
                        value: word.to_string(),
                        raw: word.to_string(),
                    }),
                ));
                while chars.peek().is_some_and(|&(i, _)| i < start + len) {
                    chars.next();
                }
            }
        }
    }

    Ok(out)
}

/// Parse the text of a go.mod file.
pub fn parse(src: &str) -> Result<ModFile, SyntaxError> {
    let lexemes = lex(src)?;
    let mut statements = Vec::new();
    // Comment lines not yet assigned to a directive or a block.
    let mut pending: Vec<String> = Vec::new();
    let mut i = 0;

    let flush = |pending: &mut Vec<String>, statements: &mut Vec<Statement>| {
        if !pending.is_empty() {
            statements.push(Statement::Comment(std::mem::take(pending)));
        }
    };

    while i < lexemes.len() {
        let (line, lexeme) = &lexemes[i];
        match lexeme {
            Lexeme::Newline => {
                // A blank line closes the current comment group.
                let blank = i == 0 || matches!(lexemes[i - 1].1, Lexeme::Newline);
                if blank {
                    flush(&mut pending, &mut statements);
                }
                i += 1;
            }
            Lexeme::Comment(text) => {
                pending.push(text.clone());
                i += 1;
                if matches!(lexemes.get(i), Some((_, Lexeme::Newline))) {
                    i += 1;
                }
                if matches!(lexemes.get(i), Some((_, Lexeme::Newline)) | None) {
                    flush(&mut pending, &mut statements);
                }
            }
            Lexeme::Open => return Err(SyntaxError::new(*line, "unexpected '('")),
            Lexeme::Close => return Err(SyntaxError::new(*line, "unexpected ')'")),
            Lexeme::Word(verb) => {
                let line = *line;
                let verb = verb.value.clone();
                let before = std::mem::take(&mut pending);
                i += 1;

                if matches!(lexemes.get(i), Some((_, Lexeme::Open))) {
                    let (block, next) = parse_block(&lexemes, i + 1, line, verb, before)?;
                    statements.push(Statement::Block(block));
                    i = next;
                    continue;
                }

                let mut args = Vec::new();
                let mut suffix = None;
                while let Some((l, lexeme)) = lexemes.get(i) {
                    match lexeme {
                        Lexeme::Word(tok) => args.push(tok.clone()),
                        Lexeme::Comment(text) => suffix = Some(text.clone()),
                        Lexeme::Newline => break,
                        Lexeme::Open => {
                            return Err(SyntaxError::new(*l, "unexpected '('"));
                        }
                        Lexeme::Close => {
                            return Err(SyntaxError::new(*l, "unexpected ')'"));
                        }
                    }
                    i += 1;
                }
                statements.push(Statement::Line(Directive {
                    line,
                    verb,
                    args,
                    before,
                    suffix,
                }));
            }
        }
    }
    flush(&mut pending, &mut statements);

    Ok(ModFile { statements })
}

fn parse_block(
    lexemes: &[(usize, Lexeme)],
    mut i: usize,
    line: usize,
    verb: String,
    before: Vec<String>,
) -> Result<(DirectiveBlock, usize), SyntaxError> {
    let mut entries = Vec::new();
    let mut current = Vec::new();

    while let Some((l, lexeme)) = lexemes.get(i) {
        i += 1;
        match lexeme {
            Lexeme::Word(tok) => current.push(tok.clone()),
            Lexeme::Comment(_) => {}
            Lexeme::Newline => {
                if !current.is_empty() {
                    entries.push(std::mem::take(&mut current));
                }
            }
            Lexeme::Open => return Err(SyntaxError::new(*l, "nested '(' in block")),
            Lexeme::Close => {
                if !current.is_empty() {
                    entries.push(current);
                }
                let block = DirectiveBlock {
                    line,
                    verb,
                    before,
                    entries,
                };
                return Ok((block, i));
            }
        }
    }

    Err(SyntaxError::new(
        line,
        format!("unterminated '{}' block", verb),
    ))
}

/// Quote a go.mod token only when it cannot be written bare.
pub fn auto_quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.contains("//")
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '`' | '(' | ')' | '\\' | ','));
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
