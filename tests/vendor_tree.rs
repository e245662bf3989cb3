//! End-to-end tests for the tree transform.
//!
//! Each test lays out a small Go module in a temporary directory, runs
//! `vendor::run` against a fresh destination and inspects the result.

use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zerodep::VendorConfig;
use zerodep::vendor::{self, Action};

const GO_MOD: &str = r#"// Module comment.

module example.com/mod

go 1.21

require (
	foo.com/bar v1.2.0
	golang.org/x/text v0.14.0 // indirect
)

replace foo.com/bar => ./vendor/foo.com/bar
"#;

const MAIN_GO: &str = r#"package main

import (
	"fmt"

	"example.com/mod/internal/util"
	"foo.com/bar"
	baz "foo.com/baz/v2"
)

func main() {
	// "example.com/mod/internal/util" in a comment is not an import.
	fmt.Println(util.Name(), bar.X, baz.Y, "foo.com/bar")
}
"#;

const UTIL_GO: &str = "package util\n\nfunc Name() string { return \"util\" }\n";

const VENDORED_BAR_GO: &str = r#"package bar

import (
	"strings"

	"foo.com/baz/v2"
)

var X = strings.ToUpper(baz.Y)
"#;

struct Fixture {
    src: TempDir,
    out: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let src = tempfile::tempdir().expect("tempdir");
        let out = tempfile::tempdir().expect("tempdir");
        let fx = Self { src, out };
        fx.write("go.mod", GO_MOD);
        fx.write("go.sum", "foo.com/bar v1.2.0 h1:abc=\n");
        fx.write("main.go", MAIN_GO);
        fx.write("internal/util/util.go", UTIL_GO);
        fx.write("README.md", "# mod\n");
        fx.write("vendor/modules.txt", "# foo.com/bar v1.2.0\nfoo.com/bar\n");
        fx.write("vendor/foo.com/bar/bar.go", VENDORED_BAR_GO);
        fx.write("vendor/foo.com/bar/go.mod", "module foo.com/bar\n");
        fx.write("vendor/foo.com/baz/v2/baz.go", "package baz\n\nvar Y = \"y\"\n");
        fx.write(".git/HEAD", "ref: refs/heads/main\n");
        fx.write(".git/objects/ab/cdef", "blob");
        fx.write(".idea/workspace.xml", "<xml/>");
        fx
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.src.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn dst(&self) -> PathBuf {
        self.out.path().join("relocated")
    }

    fn config(&self) -> VendorConfig {
        VendorConfig::new(self.src.path()).unwrap()
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.dst().join(rel))
            .unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }
}

fn files_under(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    out.sort();
    out
}

#[test]
fn vendor_with_new_identity() {
    let fx = Fixture::new();
    let config = fx.config().with_module("c/d").unwrap();

    let report = vendor::run(&config, &fx.dst(), &ProgressBar::hidden()).unwrap();
    assert_eq!(report.original_identity, "example.com/mod");
    assert_eq!(report.effective_identity, "c/d");

    assert_eq!(
        files_under(&fx.dst()),
        vec![
            "README.md",
            "go.mod",
            "internal/util/util.go",
            "main.go",
            "zero-dep-vendor/foo.com/bar/bar.go",
            "zero-dep-vendor/foo.com/baz/v2/baz.go",
            "zero-dep-vendor/modules.txt",
        ]
    );

    assert_eq!(fx.read("go.mod"), "// Module comment.\n\nmodule c/d\n\ngo 1.21\n");

    let main = fx.read("main.go");
    assert_eq!(
        main,
        MAIN_GO
            .replacen("\"example.com/mod/internal/util\"\n", "\"c/d/internal/util\"\n", 1)
            .replacen(
                "\t\"foo.com/bar\"\n",
                "\t\"c/d/zero-dep-vendor/foo.com/bar\"\n",
                1
            )
            .replacen(
                "baz \"foo.com/baz/v2\"",
                "baz \"c/d/zero-dep-vendor/foo.com/baz/v2\"",
                1
            )
    );
    // Lookalike strings outside the import block are untouched.
    assert!(main.contains("// \"example.com/mod/internal/util\" in a comment"));
    assert!(main.contains("baz.Y, \"foo.com/bar\")"));

    let bar = fx.read("zero-dep-vendor/foo.com/bar/bar.go");
    assert!(bar.contains("\t\"strings\"\n"));
    assert!(bar.contains("\t\"c/d/zero-dep-vendor/foo.com/baz/v2\"\n"));

    assert_eq!(report.sources(), 4);
    assert_eq!(report.rewritten_files(), 2);
    assert_eq!(report.rewritten_imports(), 4);
    assert_eq!(report.copied(), 2);
    assert_eq!(report.skipped(), 3);
}

#[test]
fn vendor_keeps_identity_when_not_overridden() {
    let fx = Fixture::new();

    let report = vendor::run(&fx.config(), &fx.dst(), &ProgressBar::hidden()).unwrap();
    assert_eq!(report.effective_identity, "example.com/mod");

    let main = fx.read("main.go");
    assert!(main.contains("\t\"example.com/mod/internal/util\"\n"));
    assert!(main.contains("\t\"example.com/mod/zero-dep-vendor/foo.com/bar\"\n"));

    let rewrites: Vec<_> = report
        .files
        .iter()
        .filter_map(|f| match &f.action {
            Action::Rewritten(changes) => Some(changes.clone()),
            _ => None,
        })
        .flatten()
        .collect();
    assert!(
        rewrites
            .iter()
            .all(|r| !r.from.starts_with("example.com/mod/")),
        "self references must not change: {rewrites:?}"
    );
}

#[test]
fn vendor_remap_matches_import_targets() {
    let fx = Fixture::new();
    let config = fx
        .config()
        .with_module("c/d")
        .unwrap()
        .with_vendor_dir("third_party")
        .unwrap();

    vendor::run(&config, &fx.dst(), &ProgressBar::hidden()).unwrap();

    // Every rewritten external import resolves to a directory that exists.
    let main = fx.read("main.go");
    for import in ["c/d/third_party/foo.com/bar", "c/d/third_party/foo.com/baz/v2"] {
        assert!(main.contains(import), "{import} missing from main.go");
        let dir = fx.dst().join(import.strip_prefix("c/d/").unwrap());
        assert!(dir.is_dir(), "{} should exist", dir.display());
    }
    assert!(!fx.dst().join("vendor").exists());
    assert!(!fx.dst().join("zero-dep-vendor").exists());
}

#[test]
fn excluded_directories_are_absent() {
    let fx = Fixture::new();
    fx.write("testdata/big/nested/deeper/file.bin", "data");
    fx.write("testdata/small.txt", "keep");
    let config = fx.config().with_excludes(["testdata/big"]);

    vendor::run(&config, &fx.dst(), &ProgressBar::hidden()).unwrap();

    let files = files_under(&fx.dst());
    assert!(files.iter().all(|f| !f.starts_with(".git/")));
    assert!(files.iter().all(|f| !f.starts_with(".idea/")));
    assert!(files.iter().all(|f| !f.starts_with("testdata/big")));
    assert!(files.contains(&"testdata/small.txt".to_string()));
    assert!(!fx.dst().join(".git").exists());
}

#[test]
fn lock_and_nested_manifests_are_dropped() {
    let fx = Fixture::new();
    fx.write("go.work", "go 1.21\n\nuse .\n");

    vendor::run(&fx.config(), &fx.dst(), &ProgressBar::hidden()).unwrap();

    assert!(!fx.dst().join("go.sum").exists());
    assert!(!fx.dst().join("go.work").exists());
    assert!(!fx.dst().join("zero-dep-vendor/foo.com/bar/go.mod").exists());
    assert!(fx.dst().join("go.mod").exists());
}

#[test]
fn other_files_are_copied_byte_for_byte() {
    let fx = Fixture::new();
    let blob: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let path = fx.src.path().join("assets/logo.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, &blob).unwrap();

    vendor::run(&fx.config(), &fx.dst(), &ProgressBar::hidden()).unwrap();

    assert_eq!(fs::read(fx.dst().join("assets/logo.png")).unwrap(), blob);
    assert_eq!(fx.read("README.md"), "# mod\n");
}

#[test]
fn output_is_deterministic() {
    let fx = Fixture::new();
    let config = fx.config().with_module("c/d").unwrap();

    let first = vendor::run(&config, &fx.dst(), &ProgressBar::hidden()).unwrap();
    let second_dst = fx.out.path().join("again");
    let second = vendor::run(&config, &second_dst, &ProgressBar::hidden()).unwrap();

    assert_eq!(first.files, second.files);
    for rel in files_under(&fx.dst()) {
        assert_eq!(
            fs::read(fx.dst().join(&rel)).unwrap(),
            fs::read(second_dst.join(&rel)).unwrap(),
            "{rel}"
        );
    }
}

#[test]
fn revendoring_the_output_is_stable() {
    let fx = Fixture::new();
    let config = fx.config().with_module("c.com/d").unwrap();
    vendor::run(&config, &fx.dst(), &ProgressBar::hidden()).unwrap();

    // Vendor the relocated copy again under the same identity.
    let again = fx.out.path().join("again");
    let config = VendorConfig::new(fx.dst()).unwrap();
    let report = vendor::run(&config, &again, &ProgressBar::hidden()).unwrap();

    assert_eq!(report.rewritten_imports(), 0);
    assert_eq!(
        fs::read_to_string(again.join("main.go")).unwrap(),
        fx.read("main.go")
    );
}
