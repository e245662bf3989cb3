use serde::Serialize;
use std::fmt;

/// Where an import path points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceClass {
    /// No dot in the first path element: the standard library, `C`, or
    /// another toolchain-provided package. Never rewritten.
    StandardLibrary,
    /// A package inside the module being relocated.
    SelfReferential,
    /// Any other module.
    External,
}

impl fmt::Display for ReferenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceClass::StandardLibrary => "std",
            ReferenceClass::SelfReferential => "self",
            ReferenceClass::External => "external",
        };
        f.write_str(s)
    }
}

/// Classify an unquoted import path against the module's original path.
pub fn classify(reference: &str, original_identity: &str) -> ReferenceClass {
    let first = reference.split('/').next().unwrap_or(reference);
    if !first.contains('.') {
        return ReferenceClass::StandardLibrary;
    }

    if is_within(reference, original_identity) {
        ReferenceClass::SelfReferential
    } else {
        ReferenceClass::External
    }
}

/// `reference` is `module` itself or one of its subpackages. Matches on the
/// path element boundary, so `a.com/modx` is not within `a.com/mod`.
pub(crate) fn is_within(reference: &str, module: &str) -> bool {
    !module.is_empty()
        && reference
            .strip_prefix(module)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
