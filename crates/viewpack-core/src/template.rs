//! Template units and logical view paths.
//!
//! A [`TemplateUnit`] is one discovered template file. Its [`LogicalPath`]
//! is the identifier a runtime host uses to look up the compiled view: the
//! path relative to the template root, `/`-separated, with the template
//! suffix stripped.

use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

/// Root-relative, suffix-stripped, `/`-separated view identifier.
///
/// ```
/// # use std::path::Path;
/// # use viewpack_core::template::LogicalPath;
/// let suffixes = ["tmpl".to_string()];
/// let path = LogicalPath::from_relative(Path::new("Home/Index.tmpl"), &suffixes).unwrap();
/// assert_eq!(path.as_str(), "Home/Index");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalPath(String);

impl LogicalPath {
    /// Build a logical path from a path relative to the template root.
    ///
    /// Returns `None` when the file name does not end with one of the
    /// recognized `suffixes` (given without the leading dot), when the path
    /// escapes the root, or when stripping the suffix leaves nothing.
    /// When several suffixes match, the longest one is stripped so that
    /// `view.tmpl` wins over `tmpl`.
    pub fn from_relative(relative: &Path, suffixes: &[String]) -> Option<Self> {
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?.to_string()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        let file_name = segments.pop()?;
        let stem = suffixes
            .iter()
            .filter_map(|suffix| {
                let suffix = suffix.trim_start_matches('.');
                if suffix.is_empty() {
                    return None;
                }
                file_name
                    .strip_suffix(suffix)
                    .and_then(|rest| rest.strip_suffix('.'))
                    .map(|stem| (suffix.len(), stem))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, stem)| stem)?;

        if stem.is_empty() {
            return None;
        }
        segments.push(stem.to_string());

        Some(Self(segments.join("/")))
    }

    /// Wrap an already-normalized logical path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The logical path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `/`-separated segments of this path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One discovered template file.
///
/// Immutable once created; consumed once by translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateUnit {
    logical_path: LogicalPath,
    physical_path: PathBuf,
}

impl TemplateUnit {
    /// Create a template unit from its logical and physical paths.
    pub fn new(logical_path: LogicalPath, physical_path: impl Into<PathBuf>) -> Self {
        Self {
            logical_path,
            physical_path: physical_path.into(),
        }
    }

    /// The logical view path.
    pub fn logical_path(&self) -> &LogicalPath {
        &self.logical_path
    }

    /// The file on disk this template was read from.
    pub fn physical_path(&self) -> &Path {
        &self.physical_path
    }
}
