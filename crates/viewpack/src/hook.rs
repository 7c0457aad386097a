//! Configure-compilation hooks.
//!
//! Applications may adjust compilation options before their views are
//! compiled. Hooks are registered by name in a [`HookRegistry`]; the caller
//! either names one explicitly or lets the registry pick the only one
//! registered.
//!
//! # Resolution policy
//!
//! | explicit name | registered hooks | result                        |
//! |---------------|------------------|-------------------------------|
//! | given         | contains name    | that hook                     |
//! | given         | lacks name       | [`HookError::Unknown`]        |
//! | none          | zero             | no hook                       |
//! | none          | exactly one      | that hook                     |
//! | none          | more than one    | [`HookError::Ambiguous`]      |

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::compilation::CompilationOptions;

/// Adjusts compilation options for an application.
pub trait ConfigureCompilation {
    /// Return the options the application's views should be compiled with.
    fn configure(&self, options: CompilationOptions) -> CompilationOptions;
}

impl<F> ConfigureCompilation for F
where
    F: Fn(CompilationOptions) -> CompilationOptions,
{
    fn configure(&self, options: CompilationOptions) -> CompilationOptions {
        self(options)
    }
}

/// Errors raised while resolving a hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("configure-compilation hook `{0}` is not registered")]
    Unknown(String),

    #[error(
        "found {} configure-compilation hooks ({}); name one explicitly",
        .0.len(),
        .0.join(", ")
    )]
    Ambiguous(Vec<String>),

    #[error("failed to create configure-compilation hook `{name}`: {reason}")]
    Instantiation { name: String, reason: String },
}

type HookFactory = Box<dyn Fn() -> Result<Arc<dyn ConfigureCompilation>, String>>;

/// Name-keyed, ordered set of hook factories.
#[derive(Default)]
pub struct HookRegistry {
    factories: IndexMap<String, HookFactory>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready-made hook under `name`, replacing any previous one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        hook: impl ConfigureCompilation + 'static,
    ) -> &mut Self {
        let hook: Arc<dyn ConfigureCompilation> = Arc::new(hook);
        self.register_factory(name, move || Ok(Arc::clone(&hook)))
    }

    /// Register a factory that creates the hook on resolution.
    ///
    /// A factory returning `Err` surfaces as [`HookError::Instantiation`].
    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn ConfigureCompilation>, String> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Registered hook names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Resolve the hook to apply.
    ///
    /// # Errors
    ///
    /// See the module-level resolution policy.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
    ) -> Result<Option<Arc<dyn ConfigureCompilation>>, HookError> {
        let (name, factory) = match explicit.filter(|name| !name.is_empty()) {
            Some(name) => match self.factories.get_key_value(name) {
                Some(entry) => entry,
                None => return Err(HookError::Unknown(name.to_string())),
            },
            None => match self.factories.len() {
                0 => return Ok(None),
                1 => match self.factories.first() {
                    Some(entry) => entry,
                    None => return Ok(None),
                },
                _ => {
                    return Err(HookError::Ambiguous(
                        self.names().map(str::to_string).collect(),
                    ));
                }
            },
        };

        debug!(hook = name.as_str(); "Resolved configure-compilation hook");
        factory()
            .map(Some)
            .map_err(|reason| HookError::Instantiation {
                name: name.clone(),
                reason,
            })
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
