//! Registry code generation.
//!
//! The registry unit declares one type whose constructor hands a fixed-size
//! array of `(logical path, compiled type)` entries to a well-known base
//! container. A runtime host instantiates that type to find precompiled
//! views. Output is deterministic: the same ordered input always produces
//! byte-identical text.

use log::{debug, trace};

use viewpack_core::{
    identity::{ApplicationIdentity, SigningOptions},
    view::ViewRegistry,
};

use crate::{
    backend::SourceCompiler,
    compilation::Compilation,
    metadata::{self, Platform, SigningError},
};

/// Namespace of the generated registry type.
pub const REGISTRY_NAMESPACE: &str = "Viewpack.Generated";

/// Simple name of the generated registry type.
pub const REGISTRY_TYPE_NAME: &str = "__PrecompiledViewRegistry";

/// Base type the registry derives from.
pub const CONTAINER_BASE_TYPE: &str = "Viewpack.Runtime.ViewInfoContainer";

/// Type of each registry entry.
pub const VIEW_INFO_TYPE: &str = "Viewpack.Runtime.ViewInfo";

/// Escape `value` as the body of a double-quoted string literal.
///
/// Quotes and backslashes are escaped, common control characters use their
/// short escapes, and every other control character becomes `\uXXXX`.
///
/// ```
/// # use viewpack::registry::escape_string_literal;
/// assert_eq!(escape_string_literal(r#"a"b\c"#), r#"a\"b\\c"#);
/// ```
pub fn escape_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            // Line and paragraph separators end a line in the target syntax.
            '\u{2028}' | '\u{2029}' => escaped.push_str(&format!("\\u{:04X}", ch as u32)),
            ch if ch.is_control() => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    escaped.push_str(&format!("\\u{:04X}", unit));
                }
            }
            ch => escaped.push(ch),
        }
    }
    escaped
}

/// Render the source text of the registry unit.
pub fn registry_source(views: &ViewRegistry) -> String {
    let mut entries = String::new();
    for view in views.iter() {
        entries.push_str(&format!(
            "        new global::{VIEW_INFO_TYPE}(\"{}\", typeof(global::{})),\n",
            escape_string_literal(view.logical_path().as_str()),
            view.type_name(),
        ));
    }

    format!(
        "namespace {REGISTRY_NAMESPACE}\n\
         {{\n  \
           public class {REGISTRY_TYPE_NAME} : global::{CONTAINER_BASE_TYPE}\n  \
           {{\n    \
             public {REGISTRY_TYPE_NAME}() : base(new global::{VIEW_INFO_TYPE}[{count}]\n    \
             {{\n\
         {entries}    \
             }})\n    \
             {{\n    \
             }}\n  \
           }}\n\
         }}\n",
        count = views.len(),
    )
}

/// Appends the registry unit and the assembly metadata unit to a
/// compilation.
///
/// Each method consumes the compilation and returns its replacement.
pub struct ViewRegistryCodeGenerator<'a, C: SourceCompiler + ?Sized> {
    compiler: &'a C,
}

impl<'a, C: SourceCompiler + ?Sized> ViewRegistryCodeGenerator<'a, C> {
    /// Create a generator that builds source units with `compiler`.
    pub fn new(compiler: &'a C) -> Self {
        Self { compiler }
    }

    /// Append the registry unit listing every view in `views`.
    pub fn add_view_registry(&self, compilation: Compilation, views: &ViewRegistry) -> Compilation {
        let source = registry_source(views);
        debug!(views = views.len(); "Generated view registry");
        trace!(source = source.as_str(); "Registry unit");

        let unit = self.compiler.create_source_unit(&source, None);
        compilation.add_source_units([unit])
    }

    /// Append the assembly metadata unit and apply signing options.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] when a key file is configured but missing or
    /// not a valid key container.
    pub fn add_assembly_metadata(
        &self,
        compilation: Compilation,
        identity: &ApplicationIdentity,
        signing: &SigningOptions,
        platform: Platform,
    ) -> Result<Compilation, SigningError> {
        let compilation = match metadata::derive_signing_strategy(platform, signing) {
            Some(strategy) => {
                let options = strategy.apply(compilation.options().clone())?;
                compilation.with_options(options)
            }
            None => compilation,
        };

        let source = metadata::version_attribute_source(identity.version());
        let unit = self.compiler.create_source_unit(&source, None);
        Ok(compilation.add_source_units([unit]))
    }
}
