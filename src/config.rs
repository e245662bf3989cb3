use crate::error::{IoContext, Result, VendorError};
use crate::imports::invalid_path_char;
use crate::vendor::paths::normalize_path;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name the relocated dependencies are nested under by default.
pub const DEFAULT_VENDOR_DIR: &str = "zero-dep-vendor";

/// Editor and VCS metadata directories never carried into the destination.
pub const DEFAULT_EXCLUDES: [&str; 3] = [".idea", ".vscode", ".git"];

/// Immutable settings for one run, shared by reference with every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorConfig {
    /// Absolute, normalized root of the module being relocated.
    pub source_root: PathBuf,
    /// New module path; `None` keeps the one declared in go.mod.
    pub module_override: Option<String>,
    /// Single path segment under which external packages are nested.
    pub vendor_dir: String,
    /// Directory paths, relative to `source_root` and `/`-separated, to skip.
    pub exclude: BTreeSet<String>,
}

impl VendorConfig {
    pub fn new(source_root: impl AsRef<Path>) -> Result<Self> {
        let source_root = source_root.as_ref();
        let absolute = std::path::absolute(source_root).at(source_root)?;

        Ok(Self {
            source_root: normalize_path(&absolute),
            module_override: None,
            vendor_dir: DEFAULT_VENDOR_DIR.to_string(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// An empty module path means "keep the original".
    pub fn with_module(mut self, module: impl Into<String>) -> Result<Self> {
        let module = module.into();
        let module = module.trim().trim_end_matches('/');
        if let Some(bad) = invalid_path_char(module) {
            return Err(VendorError::Config(format!(
                "module path '{}' contains invalid character {:?}",
                module, bad
            )));
        }
        self.module_override = (!module.is_empty()).then(|| module.to_string());
        Ok(self)
    }

    pub fn with_vendor_dir(mut self, dir: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        validate_vendor_dir(&dir)?;
        self.vendor_dir = dir;
        Ok(self)
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ex in excludes {
            let ex = ex.as_ref().replace('\\', "/");
            let ex = ex.trim_matches('/');
            if !ex.is_empty() {
                self.exclude.insert(ex.to_string());
            }
        }
        self
    }

    /// Apply the values a config file sets. Callers apply explicit CLI flags
    /// afterwards so they take precedence.
    pub fn with_file(mut self, file: &FileConfig) -> Result<Self> {
        if let Some(module) = &file.vendor.module {
            self = self.with_module(module.clone())?;
        }
        if let Some(dir) = &file.vendor.dir {
            self = self.with_vendor_dir(dir.clone())?;
        }
        Ok(self.with_excludes(&file.vendor.exclude))
    }

    pub fn is_excluded(&self, rel: &str) -> bool {
        self.exclude.contains(rel)
    }
}

fn validate_vendor_dir(dir: &str) -> Result<()> {
    if dir.is_empty() || dir == "." || dir == ".." || dir.contains(['/', '\\']) {
        return Err(VendorError::Config(format!(
            "vendor directory must be a single path segment, got '{}'",
            dir
        )));
    }
    Ok(())
}

/// Optional `zerodep.toml`.
///
/// ```toml
/// [vendor]
/// module = "example.com/app/internal/dep"
/// dir = "third_party"
/// exclude = ["testdata/large"]
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub vendor: VendorSection,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VendorSection {
    pub module: Option<String>,
    pub dir: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).at(path)?;
        Self::parse(&content)
            .map_err(|e| VendorError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
