//! go.mod handling.
//!
//! The relocated module no longer resolves anything through the Go module
//! proxy: every dependency lives under its vendor directory as plain source.
//! Its go.mod therefore only needs to say who it is and which Go it targets.
//!
//! - `parse` - statement-level go.mod parser that keeps comments
//! - `reduce` - strips everything but comments, `module` and `go`

pub mod parse;
mod reduce;

pub use parse::{ModFile, Statement};
pub use reduce::{Reduction, format, reduce, reduce_str};

/// File names of manifests and their lock/workspace companions.
pub const MANIFEST_FILES: [&str; 4] = ["go.mod", "go.sum", "go.work", "go.work.sum"];

/// Name of the manifest at a module root.
pub const MANIFEST: &str = "go.mod";
