use super::classify::{ReferenceClass, classify, is_within};
use super::source::GoSource;
use std::borrow::Cow;

/// Maps import paths of the module being relocated to their new location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewriter {
    original_identity: String,
    effective_identity: String,
    vendor_dir: String,
    /// `effective_identity/vendor_dir`, the root every external path lands under.
    vendor_root: String,
}

/// One import whose path changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub line: usize,
    pub class: ReferenceClass,
    pub from: String,
    pub to: String,
}

impl Rewriter {
    pub fn new(
        original_identity: impl Into<String>,
        effective_identity: impl Into<String>,
        vendor_dir: impl Into<String>,
    ) -> Self {
        let effective_identity = effective_identity.into();
        let vendor_dir = vendor_dir.into();
        let vendor_root = format!("{}/{}", effective_identity, vendor_dir);
        Self {
            original_identity: original_identity.into(),
            effective_identity,
            vendor_dir,
            vendor_root,
        }
    }

    pub fn original_identity(&self) -> &str {
        &self.original_identity
    }

    pub fn effective_identity(&self) -> &str {
        &self.effective_identity
    }

    pub fn vendor_dir(&self) -> &str {
        &self.vendor_dir
    }

    pub fn classify(&self, reference: &str) -> ReferenceClass {
        classify(reference, &self.original_identity)
    }

    /// New path for an unquoted import path of the given class.
    pub fn rewrite<'r>(&self, reference: &'r str, class: ReferenceClass) -> Cow<'r, str> {
        match class {
            ReferenceClass::StandardLibrary => Cow::Borrowed(reference),
            ReferenceClass::SelfReferential => {
                match reference.strip_prefix(self.original_identity.as_str()) {
                    Some(suffix)
                        if self.original_identity != self.effective_identity
                            && (suffix.is_empty() || suffix.starts_with('/')) =>
                    {
                        Cow::Owned(format!("{}{}", self.effective_identity, suffix))
                    }
                    // Same identity, or a path that is not under the module.
                    _ => Cow::Borrowed(reference),
                }
            }
            // Already nested under the new vendor root: a second pass must not
            // wrap it again.
            ReferenceClass::External if is_within(reference, &self.vendor_root) => {
                Cow::Borrowed(reference)
            }
            ReferenceClass::External => Cow::Owned(format!("{}/{}", self.vendor_root, reference)),
        }
    }

    /// Classify and rewrite in one step.
    pub fn resolve<'r>(&self, reference: &'r str) -> (ReferenceClass, Cow<'r, str>) {
        let class = self.classify(reference);
        (class, self.rewrite(reference, class))
    }

    /// Rewrite every import of `source` in place, returning what changed.
    pub fn apply(&self, source: &mut GoSource) -> Vec<Rewrite> {
        let mut changes = Vec::new();
        for spec in source.imports_mut() {
            let (class, new_path) = self.resolve(&spec.path);
            if class == ReferenceClass::StandardLibrary || new_path == spec.path.as_str() {
                continue;
            }
            let new_path = new_path.into_owned();
            changes.push(Rewrite {
                line: spec.line,
                class,
                from: spec.path.clone(),
                to: new_path.clone(),
            });
            spec.set_path(new_path);
        }
        changes
    }
}
