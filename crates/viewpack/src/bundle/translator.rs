//! Translation of `@`-templates into view classes.

use log::trace;

use viewpack_core::{
    error::{Diagnostic, ErrorCode},
    template::{LogicalPath, TemplateUnit},
};

use crate::{
    backend::{TemplateTranslator, TranslatedView},
    registry::escape_string_literal,
};

use super::lexer::{self, Segment};

/// Namespace of every generated view type.
pub const VIEW_NAMESPACE: &str = "Viewpack.Generated";

/// Base type of every generated view type.
pub const VIEW_BASE_TYPE: &str = "Viewpack.TemplatePage";

/// Derive the simple type name of a view from its logical path.
///
/// The mapping is injective so that distinct logical paths never declare
/// the same type. ASCII letters and digits are kept, `/` becomes `__`, `_`
/// becomes `_u_` and any other character becomes `_x{code point in hex}_`.
/// A leading digit gets a `_` prefix.
///
/// ```
/// # use viewpack::bundle::view_type_name;
/// # use viewpack_core::template::LogicalPath;
/// assert_eq!(view_type_name(&LogicalPath::new("Home/Index")), "Home__Index");
/// assert_eq!(view_type_name(&LogicalPath::new("Home_Index")), "Home_u_Index");
/// assert_eq!(view_type_name(&LogicalPath::new("1st/my-page")), "_1st__my_x2d_page");
/// ```
pub fn view_type_name(logical_path: &LogicalPath) -> String {
    let mut name = String::with_capacity(logical_path.as_str().len());
    for c in logical_path.as_str().chars() {
        match c {
            c if c.is_ascii_alphanumeric() => name.push(c),
            '/' => name.push_str("__"),
            '_' => name.push_str("_u_"),
            c => name.push_str(&format!("_x{:x}_", u32::from(c))),
        }
    }
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Translator for the `@`-template language.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtTemplateTranslator;

impl AtTemplateTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateTranslator for AtTemplateTranslator {
    fn translate(&self, template: &TemplateUnit, contents: &str) -> TranslatedView {
        let type_name = view_type_name(template.logical_path());
        let (segments, mut diagnostics) = lexer::tokenize(contents);

        if contents.trim().is_empty() {
            diagnostics.push(
                Diagnostic::info(format!(
                    "template `{}` is empty",
                    template.logical_path()
                ))
                .with_code(ErrorCode::V002),
            );
        }

        let mut body = String::new();
        for positioned in &segments {
            match positioned.segment {
                Segment::Literal(text) => write_literal(&mut body, text),
                Segment::Comment(_) => {}
                Segment::StrayTransition => {
                    diagnostics.push(
                        Diagnostic::warning("`@` does not start an expression")
                            .with_code(ErrorCode::V100)
                            .with_label(positioned.span, ErrorCode::V100.description())
                            .with_help("write `@@` for a literal `@`"),
                    );
                    write_literal(&mut body, "@");
                }
                Segment::Expression(expr) if expr.trim().is_empty() => {
                    diagnostics.push(
                        Diagnostic::error("empty `@()` expression")
                            .with_code(ErrorCode::V103)
                            .with_label(positioned.span, ErrorCode::V103.description()),
                    );
                }
                Segment::Expression(expr) => {
                    body.push_str(&format!("      Write({});\n", expr.trim()));
                }
            }
        }

        let source = format!(
            "namespace {VIEW_NAMESPACE}\n\
             {{\n  \
               public class {type_name} : global::{VIEW_BASE_TYPE}\n  \
               {{\n    \
                 public override void Execute()\n    \
                 {{\n\
             {body}    \
                 }}\n  \
               }}\n\
             }}\n"
        );
        trace!(view = template.logical_path().as_str(), segments = segments.len(); "Translated template");

        let diagnostics = diagnostics
            .into_iter()
            .map(|d| d.or_file(template.physical_path()))
            .collect();
        TranslatedView::new(source, format!("{VIEW_NAMESPACE}.{type_name}"), diagnostics)
    }
}

fn write_literal(body: &mut String, text: &str) {
    body.push_str(&format!(
        "      WriteLiteral(\"{}\");\n",
        escape_string_literal(text)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use viewpack_core::error::Severity;

    fn unit(path: &str) -> TemplateUnit {
        TemplateUnit::new(LogicalPath::new(path), format!("/app/Views/{path}.tmpl"))
    }

    #[test]
    fn test_translates_literals_and_expressions() {
        let view = AtTemplateTranslator::new().translate(&unit("Home/Index"), "<h1>@Model.Title</h1>");

        assert!(view.diagnostics().is_empty());
        assert_eq!(view.type_name(), "Viewpack.Generated.Home__Index");
        assert_eq!(
            view.source(),
            "namespace Viewpack.Generated\n\
             {\n  \
               public class Home__Index : global::Viewpack.TemplatePage\n  \
               {\n    \
                 public override void Execute()\n    \
                 {\n      \
                   WriteLiteral(\"<h1>\");\n      \
                   Write(Model.Title);\n      \
                   WriteLiteral(\"</h1>\");\n    \
                 }\n  \
               }\n\
             }\n"
        );
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let view = AtTemplateTranslator::new().translate(&unit("A"), "say \"hi\"\n");
        assert!(view.source().contains(r#"WriteLiteral("say \"hi\"\n");"#));
    }

    #[test]
    fn test_empty_template_reports_info() {
        let view = AtTemplateTranslator::new().translate(&unit("Shared/Empty"), "  \n");

        assert!(!view.has_errors());
        assert_eq!(view.diagnostics().len(), 1);
        assert_eq!(view.diagnostics()[0].severity(), Severity::Info);
        assert_eq!(view.diagnostics()[0].code(), Some(ErrorCode::V002));
    }

    #[test]
    fn test_stray_transition_is_a_warning() {
        let view = AtTemplateTranslator::new().translate(&unit("A"), "5 @ 6");

        assert!(!view.has_errors());
        assert_eq!(view.diagnostics()[0].code(), Some(ErrorCode::V100));
        assert!(view.source().contains("WriteLiteral(\"@\");"));
    }

    #[test]
    fn test_empty_expression_is_an_error() {
        let view = AtTemplateTranslator::new().translate(&unit("A"), "x @( ) y");

        assert!(view.has_errors());
        assert_eq!(view.diagnostics()[0].code(), Some(ErrorCode::V103));
    }

    #[test]
    fn test_diagnostics_carry_template_file() {
        let view = AtTemplateTranslator::new().translate(&unit("Home/Broken"), "@(oops");

        assert!(view.has_errors());
        assert_eq!(
            view.diagnostics()[0].file(),
            Some(std::path::Path::new("/app/Views/Home/Broken.tmpl"))
        );
        assert!(view.source().contains("class Home__Broken"));
    }

    #[test]
    fn test_view_type_name_escapes_punctuation() {
        assert_eq!(
            view_type_name(&LogicalPath::new("Shared/_Layout")),
            "Shared___u_Layout"
        );
        assert_eq!(
            view_type_name(&LogicalPath::new("a.b/c d")),
            "a_x2e_b__c_x20_d"
        );
        assert_eq!(view_type_name(&LogicalPath::new("Caf\u{e9}")), "Caf_xe9_");
    }

    #[test]
    fn test_view_type_name_keeps_similar_paths_apart() {
        let pairs = [
            ("Home/Index", "Home_Index"),
            ("a-b", "a_b"),
            ("a/_b", "a_/b"),
            ("_1", "1"),
        ];
        for (left, right) in pairs {
            assert_ne!(
                view_type_name(&LogicalPath::new(left)),
                view_type_name(&LogicalPath::new(right)),
                "{left} vs {right}"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_view_type_name_is_injective(
            left in "[a-zA-Z0-9_/. -]{0,8}",
            right in "[a-zA-Z0-9_/. -]{0,8}",
        ) {
            prop_assume!(left != right);
            prop_assert_ne!(
                view_type_name(&LogicalPath::new(left)),
                view_type_name(&LogicalPath::new(right))
            );
        }

        #[test]
        fn prop_view_type_name_is_an_identifier(path in "\\PC{0,12}") {
            let name = view_type_name(&LogicalPath::new(path));
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            prop_assert!(!name.starts_with(|c: char| c.is_ascii_digit()));
        }
    }
}
