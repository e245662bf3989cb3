//! Import path classification and rewriting.
//!
//! Every import of every `.go` file falls in one of three classes:
//!
//! - **standard library** (`fmt`, `net/http`, `C`): left alone
//! - **self-referential** (`<module>/sub/pkg`): re-rooted at the new module path
//! - **external** (`github.com/x/y`): nested under `<new module>/<vendor dir>/`
//!
//! ## Example
//!
//! ```rust
//! use zerodep::imports::{ReferenceClass, Rewriter};
//!
//! let rw = Rewriter::new("example.com/a", "c/d", "zero-dep-vendor");
//! assert_eq!(rw.resolve("example.com/a/x/y").1, "c/d/x/y");
//! assert_eq!(rw.resolve("foo.com/bar").1, "c/d/zero-dep-vendor/foo.com/bar");
//! assert_eq!(rw.classify("strings"), ReferenceClass::StandardLibrary);
//! ```

mod classify;
mod rewrite;
pub mod source;

pub use classify::{ReferenceClass, classify};
pub use rewrite::{Rewrite, Rewriter};
pub use source::{GoSource, ImportSpec, Quote, invalid_path_char};
