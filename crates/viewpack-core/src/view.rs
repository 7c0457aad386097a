//! Compiled view results and the registry they are collected in.

use indexmap::{IndexMap, map::Entry};
use thiserror::Error;

use crate::template::LogicalPath;

/// Pairs a logical view path with the fully-qualified name of the type
/// its template compiled to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCompilationResult {
    logical_path: LogicalPath,
    type_name: String,
}

impl ViewCompilationResult {
    /// Create a new result.
    pub fn new(logical_path: LogicalPath, type_name: impl Into<String>) -> Self {
        Self {
            logical_path,
            type_name: type_name.into(),
        }
    }

    /// The logical view path.
    pub fn logical_path(&self) -> &LogicalPath {
        &self.logical_path
    }

    /// Fully-qualified name of the compiled view type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Returned when a logical path is registered twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("view `{logical_path}` is registered twice (types `{existing}` and `{duplicate}`)")]
pub struct DuplicateViewError {
    /// The logical path both entries claim.
    pub logical_path: LogicalPath,
    /// Type name of the entry that was registered first.
    pub existing: String,
    /// Type name of the rejected entry.
    pub duplicate: String,
}

/// Insertion-ordered collection of [`ViewCompilationResult`]s, unique by
/// logical path.
///
/// A second entry for the same logical path is rejected, never merged.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    entries: IndexMap<LogicalPath, ViewCompilationResult>,
}

impl ViewRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result, preserving insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateViewError`] if the logical path is already present.
    pub fn insert(&mut self, result: ViewCompilationResult) -> Result<(), DuplicateViewError> {
        match self.entries.entry(result.logical_path.clone()) {
            Entry::Occupied(existing) => Err(DuplicateViewError {
                logical_path: result.logical_path,
                existing: existing.get().type_name.clone(),
                duplicate: result.type_name,
            }),
            Entry::Vacant(slot) => {
                slot.insert(result);
                Ok(())
            }
        }
    }

    /// Look up the result for a logical path.
    pub fn get(&self, logical_path: &LogicalPath) -> Option<&ViewCompilationResult> {
        self.entries.get(logical_path)
    }

    /// Iterate results in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ViewCompilationResult> {
        self.entries.values()
    }

    /// Number of registered views.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no views are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<ViewCompilationResult>> for ViewRegistry {
    type Error = DuplicateViewError;

    fn try_from(results: Vec<ViewCompilationResult>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for result in results {
            registry.insert(result)?;
        }
        Ok(registry)
    }
}
