//! # zerodep - Zero-Dependency Go Module Vendoring
//!
//! zerodep copies a Go module into another project as a self-contained
//! package tree. Every import is rewritten so the copy resolves under its new
//! module path, and the module's own `vendor/` tree moves along with it. The
//! resulting go.mod declares no dependencies at all.
//!
//! ## Quick Start
//!
//! ```bash
//! # Embed ./lib as example.com/app/third_party/lib
//! zerodep vendor --src ./lib --dst ./app/third_party/lib --mod example.com/app/third_party/lib
//!
//! # Preview the rewrites first
//! zerodep plan --src ./lib --mod example.com/app/third_party/lib
//! ```
//!
//! ## Module Organization
//!
//! - [`modfile`] - go.mod parsing and reduction
//! - [`imports`] - import classification and rewriting
//! - [`vendor`] - the tree walk that ties them together
//! - [`config`] - run configuration (`zerodep.toml`, CLI flags)

/// Run configuration.
pub mod config;

/// Error types.
pub mod error;

/// Import path classification, rewriting, and Go source handling.
pub mod imports;

/// go.mod parsing and reduction.
pub mod modfile;

/// Terminal UI utilities (tables).
pub mod ui;

/// Tree transform driver and dry-run planner.
pub mod vendor;

pub use config::VendorConfig;
pub use error::{Result, VendorError};
