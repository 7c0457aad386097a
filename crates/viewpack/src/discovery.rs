//! Template discovery.
//!
//! Walks the template root, keeps files with a recognized suffix and turns
//! each into a [`TemplateUnit`]. Units are sorted by logical path so that
//! discovery order, and therefore registry order, is the same on every
//! platform.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, trace};

use viewpack_core::template::{LogicalPath, TemplateUnit};

use crate::error::{ConfigError, ViewpackError};

/// Discover every template under `root`.
///
/// # Errors
///
/// - [`ConfigError::MissingTemplateRoot`] / [`ConfigError::TemplateRootNotDirectory`]
///   when `root` is unusable
/// - [`ConfigError::DuplicateLogicalPath`] when two files map to the same
///   logical path
/// - [`ConfigError::NonUnicodeTemplatePath`] when a template's path cannot
///   be expressed as a logical path
/// - [`ViewpackError::Io`] when a directory cannot be read
pub fn discover_templates(
    root: &Path,
    suffixes: &[String],
) -> Result<Vec<TemplateUnit>, ViewpackError> {
    if !root.exists() {
        return Err(ConfigError::MissingTemplateRoot(root.to_path_buf()).into());
    }
    if !root.is_dir() {
        return Err(ConfigError::TemplateRootNotDirectory(root.to_path_buf()).into());
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;

    let mut units = Vec::with_capacity(files.len());
    for path in files {
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        match LogicalPath::from_relative(relative, suffixes) {
            Some(logical_path) => units.push(TemplateUnit::new(logical_path, path)),
            None if relative.to_str().is_none() && has_template_suffix(&path, suffixes) => {
                return Err(ConfigError::NonUnicodeTemplatePath(path).into());
            }
            None => {
                trace!(path = path.display().to_string(); "Skipping non-template file");
            }
        }
    }

    units.sort_by(|a, b| {
        a.logical_path()
            .cmp(b.logical_path())
            .then_with(|| a.physical_path().cmp(b.physical_path()))
    });

    if let Some(pair) = units
        .windows(2)
        .find(|pair| pair[0].logical_path() == pair[1].logical_path())
    {
        return Err(ConfigError::DuplicateLogicalPath {
            logical_path: pair[0].logical_path().clone(),
            first: pair[0].physical_path().to_path_buf(),
            second: pair[1].physical_path().to_path_buf(),
        }
        .into());
    }

    debug!(root = root.display().to_string(), templates = units.len(); "Discovered templates");
    Ok(units)
}

/// Whether the file name ends with `.{suffix}` for a recognized suffix,
/// judged on a lossy decoding so that names that are not valid UTF-8 still
/// match.
fn has_template_suffix(path: &Path, suffixes: &[String]) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    let file_name = file_name.to_string_lossy();
    suffixes
        .iter()
        .map(|suffix| suffix.trim_start_matches('.'))
        .filter(|suffix| !suffix.is_empty())
        .any(|suffix| {
            file_name
                .strip_suffix(suffix)
                .is_some_and(|rest| rest.len() > 1 && rest.ends_with('.'))
        })
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
