use super::parse::{self, Directive, ModFile, Statement, Token};
use crate::error::{Result, VendorError};
use crate::imports::invalid_path_char;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

static GO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9][0-9]*)\.(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))?([a-z]+[0-9]+)?$").unwrap()
});

/// Result of reducing a go.mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    /// Module path declared by the source go.mod, before any override.
    pub original_identity: String,
    /// Module path the relocated copy is published under.
    pub effective_identity: String,
    /// Only comment blocks, `module` and `go` remain.
    pub manifest: ModFile,
}

impl Reduction {
    pub fn format(&self) -> String {
        format(&self.manifest)
    }
}

/// Read the go.mod at `path` and strip it down to its identity and Go version.
pub fn reduce(path: &Path, override_identity: Option<&str>) -> Result<Reduction> {
    let src = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => VendorError::ManifestNotFound {
            path: path.to_path_buf(),
        },
        _ => VendorError::io(path, e),
    })?;
    reduce_str(path, &src, override_identity)
}

/// Same as [`reduce`] on already loaded text; `path` is only used in errors.
pub fn reduce_str(path: &Path, src: &str, override_identity: Option<&str>) -> Result<Reduction> {
    let parse_error = |line: usize, message: String| VendorError::ManifestParse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let file = parse::parse(src).map_err(|e| parse_error(e.line, e.message))?;

    let mut original_identity: Option<String> = None;
    let mut seen_go = false;
    let mut kept = Vec::new();

    for stmt in file.statements {
        match stmt {
            Statement::Comment(lines) => kept.push(Statement::Comment(lines)),
            Statement::Line(d) if d.verb == "module" => {
                if original_identity.is_some() {
                    return Err(parse_error(d.line, "repeated module statement".into()));
                }
                if d.args.len() != 1 {
                    return Err(parse_error(d.line, "usage: module module/path".into()));
                }
                original_identity = Some(d.args[0].value.clone());
                kept.push(Statement::Line(d));
            }
            Statement::Block(b) if b.verb == "module" => {
                if original_identity.is_some() {
                    return Err(parse_error(b.line, "repeated module statement".into()));
                }
                let [entry] = b.entries.as_slice() else {
                    return Err(parse_error(b.line, "usage: module module/path".into()));
                };
                let [path_tok] = entry.as_slice() else {
                    return Err(parse_error(b.line, "usage: module module/path".into()));
                };
                original_identity = Some(path_tok.value.clone());
                kept.push(Statement::Line(Directive {
                    line: b.line,
                    verb: b.verb,
                    args: vec![path_tok.clone()],
                    before: b.before,
                    suffix: None,
                }));
            }
            Statement::Line(d) if d.verb == "go" => {
                if seen_go {
                    return Err(parse_error(d.line, "repeated go statement".into()));
                }
                let [version] = d.args.as_slice() else {
                    return Err(parse_error(d.line, "usage: go 1.23".into()));
                };
                if !GO_VERSION_RE.is_match(&version.value) {
                    return Err(parse_error(
                        d.line,
                        format!(
                            "invalid go version '{}': must match format 1.23.0",
                            version.value
                        ),
                    ));
                }
                seen_go = true;
                kept.push(Statement::Line(d));
            }
            Statement::Block(b) if b.verb == "go" => {
                return Err(parse_error(b.line, "usage: go 1.23".into()));
            }
            // require, replace, exclude, retract, toolchain, godebug, tool...
            Statement::Line(_) | Statement::Block(_) => {}
        }
    }

    let original_identity = match original_identity {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(VendorError::MissingIdentity {
                path: path.to_path_buf(),
            });
        }
    };
    if original_identity.ends_with('/') {
        return Err(parse_error(
            module_line(&kept),
            format!("malformed module path '{}': trailing slash", original_identity),
        ));
    }

    if let Some(bad) = invalid_path_char(&original_identity) {
        return Err(parse_error(
            module_line(&kept),
            format!(
                "malformed module path '{}': invalid character {:?}",
                original_identity, bad
            ),
        ));
    }

    let effective_identity = override_identity
        .filter(|id| !id.is_empty())
        .unwrap_or(original_identity.as_str())
        .to_string();
    if let Some(bad) = invalid_path_char(&effective_identity) {
        return Err(VendorError::Config(format!(
            "module path '{}' contains invalid character {:?}",
            effective_identity, bad
        )));
    }

    for stmt in &mut kept {
        if let Statement::Line(d) = stmt
            && d.verb == "module"
            && d.args[0].value != effective_identity
        {
            d.args[0] = Token::bare(effective_identity.clone());
        }
    }

    Ok(Reduction {
        original_identity,
        effective_identity,
        manifest: ModFile { statements: kept },
    })
}

fn module_line(statements: &[Statement]) -> usize {
    statements
        .iter()
        .find_map(|s| match s {
            Statement::Line(d) if d.verb == "module" => Some(d.line),
            _ => None,
        })
        .unwrap_or(1)
}

/// Render statements in canonical go.mod layout: one blank line between
/// statements, single trailing newline.
pub fn format(file: &ModFile) -> String {
    let mut parts = Vec::with_capacity(file.statements.len());

    for stmt in &file.statements {
        let mut text = String::new();
        match stmt {
            Statement::Comment(lines) => text.push_str(&lines.join("\n")),
            Statement::Line(d) => {
                for comment in &d.before {
                    text.push_str(comment);
                    text.push('\n');
                }
                text.push_str(&d.verb);
                for arg in &d.args {
                    text.push(' ');
                    text.push_str(&arg.raw);
                }
                if let Some(suffix) = &d.suffix {
                    text.push(' ');
                    text.push_str(suffix);
                }
            }
            Statement::Block(b) => {
                for comment in &b.before {
                    text.push_str(comment);
                    text.push('\n');
                }
                text.push_str(&b.verb);
                text.push_str(" (\n");
                for entry in &b.entries {
                    let raw: Vec<&str> = entry.iter().map(|t| t.raw.as_str()).collect();
                    text.push('\t');
                    text.push_str(&raw.join(" "));
                    text.push('\n');
                }
                text.push(')');
            }
        }
        parts.push(text);
    }

    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"// Copyright header.

module example.com/mod

go 1.21

require (
	github.com/a/b v1.0.0
	github.com/c/d v1.2.3 // indirect
)

require golang.org/x/mod v0.14.0

// Local fork.

replace github.com/a/b => ../b

exclude github.com/e/f v0.1.0
"#;

    fn reduce_text(src: &str, override_identity: Option<&str>) -> Result<Reduction> {
        reduce_str(Path::new("go.mod"), src, override_identity)
    }

    #[test]
    fn test_reduce_drops_dependency_directives() {
        let r = reduce_text(FULL, None).unwrap();
        assert_eq!(r.original_identity, "example.com/mod");
        assert_eq!(r.effective_identity, "example.com/mod");
        assert_eq!(
            r.format(),
            "// Copyright header.\n\nmodule example.com/mod\n\ngo 1.21\n\n// Local fork.\n"
        );
        let out = r.format();
        for gone in ["require", "replace", "exclude", "github.com", "golang.org"] {
            assert!(!out.contains(gone), "{gone} leaked into {out}");
        }
    }

    #[test]
    fn test_reduce_with_override() {
        let r = reduce_text(FULL, Some("c/d")).unwrap();
        assert_eq!(r.original_identity, "example.com/mod");
        assert_eq!(r.effective_identity, "c/d");
        assert!(r.format().contains("\nmodule c/d\n"));
        assert!(!r.format().contains("example.com/mod"));
    }

    #[test]
    fn test_empty_override_keeps_identity() {
        let r = reduce_text("module a/b\n", Some("")).unwrap();
        assert_eq!(r.effective_identity, "a/b");
        assert_eq!(r.format(), "module a/b\n");
    }

    #[test]
    fn test_comment_order_preserved() {
        let src = "// one\n\nrequire x v1\n\n// two\n\nmodule m.com/x\n\n// three\n\ngo 1.22\n";
        let r = reduce_text(src, None).unwrap();
        assert_eq!(
            r.format(),
            "// one\n\n// two\n\nmodule m.com/x\n\n// three\n\ngo 1.22\n"
        );
    }

    #[test]
    fn test_attached_comments_follow_their_directive() {
        let src = "module m.com/x // keep me\n\n// about the require\nrequire x v1\n";
        let r = reduce_text(src, None).unwrap();
        assert_eq!(r.format(), "module m.com/x // keep me\n");
    }

    #[test]
    fn test_missing_identity() {
        let err = reduce_text("go 1.21\n", None).unwrap_err();
        assert!(matches!(err, VendorError::MissingIdentity { .. }));

        let err = reduce_text("module \"\"\n", None).unwrap_err();
        assert!(matches!(err, VendorError::MissingIdentity { .. }));
    }

    #[test]
    fn test_malformed_manifests() {
        for (src, line) in [
            ("module a\nmodule b\n", 2),
            ("module\n", 1),
            ("module a\ngo 1.21\ngo 1.22\n", 3),
            ("module a\n\ngo banana\n", 3),
            ("module a\nrequire (\n", 2),
            ("module a/\n", 1),
        ] {
            match reduce_text(src, None) {
                Err(VendorError::ManifestParse { line: got, .. }) => {
                    assert_eq!(got, line, "{src:?}")
                }
                other => panic!("expected parse error for {src:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_module_block_form() {
        let r = reduce_text("module (\n\texample.com/blk\n)\n\ngo 1.20\n", None).unwrap();
        assert_eq!(r.original_identity, "example.com/blk");
        assert_eq!(r.format(), "module example.com/blk\n\ngo 1.20\n");
    }

    #[test]
    fn test_manifest_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = reduce(&dir.path().join("go.mod"), None).unwrap_err();
        assert!(matches!(err, VendorError::ManifestNotFound { .. }));
    }

    #[test]
    fn test_unquotable_module_path_rejected() {
        let err = reduce_text("module \"ex.com/a b\"\n", None).unwrap_err();
        assert!(
            matches!(err, VendorError::ManifestParse { line: 1, .. }),
            "{err}"
        );

        let err = reduce_text("module ex.com/a\n", Some("ex.com/a\"b")).unwrap_err();
        assert!(matches!(err, VendorError::Config(_)), "{err}");
    }
}
