//! A compiler backend that checks generated sources and packs them into a
//! bundle.
//!
//! The checks are structural: delimiters must balance outside string
//! literals, string literals must terminate, declared type names must be
//! unique, and every `typeof(...)` in a synthetic unit must name a declared
//! type.

use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use viewpack_core::error::{Diagnostic, ErrorCode};

use crate::{
    backend::{EmitOutcome, SourceCompiler},
    compilation::Compilation,
};

use super::container::BundleImage;

/// Reference [`SourceCompiler`] producing [`BundleImage`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleCompiler;

impl BundleCompiler {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Punct(char),
}

/// What a unit declares and references.
#[derive(Debug, Default)]
struct UnitOutline {
    declared: Vec<String>,
    type_refs: Vec<String>,
    attributes: Vec<String>,
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | ':')
}

/// Tokenize `text`, skipping string and character literals.
///
/// Returns an error diagnostic for the first structural problem.
fn scan(text: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut tokens = Vec::new();
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' | '\'' => {
                let mut escaped = false;
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == ch {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(Diagnostic::error(format!(
                        "unterminated string literal on line {}",
                        line_of(text, offset)
                    ))
                    .with_code(ErrorCode::V202));
                }
            }
            '(' | '[' | '{' => {
                open.push((ch, offset));
                tokens.push(Token::Punct(ch));
            }
            ')' | ']' | '}' => {
                match open.pop() {
                    Some((opener, _)) if closing_for(opener) == ch => {}
                    Some((opener, at)) => {
                        return Err(Diagnostic::error(format!(
                            "`{ch}` on line {} does not close `{opener}` from line {}",
                            line_of(text, offset),
                            line_of(text, at)
                        ))
                        .with_code(ErrorCode::V200));
                    }
                    None => {
                        return Err(Diagnostic::error(format!(
                            "unmatched `{ch}` on line {}",
                            line_of(text, offset)
                        ))
                        .with_code(ErrorCode::V200));
                    }
                }
                tokens.push(Token::Punct(ch));
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some((_, next)) = chars.next_if(|(_, next)| is_word_char(*next)) {
                    word.push(next);
                }
                tokens.push(Token::Word(word));
            }
            c if c.is_whitespace() => {}
            c => tokens.push(Token::Punct(c)),
        }
    }

    match open.pop() {
        Some((opener, at)) => Err(Diagnostic::error(format!(
            "`{opener}` on line {} is never closed",
            line_of(text, at)
        ))
        .with_code(ErrorCode::V200)),
        None => Ok(tokens),
    }
}

fn outline(text: &str, tokens: &[Token]) -> UnitOutline {
    let mut result = UnitOutline::default();
    let mut namespace: Option<&str> = None;

    for window in tokens.windows(2) {
        let (Token::Word(keyword), Token::Word(name)) = (&window[0], &window[1]) else {
            continue;
        };
        match keyword.as_str() {
            "namespace" => namespace = Some(name.as_str()),
            "class" => result.declared.push(match namespace {
                Some(ns) => format!("{ns}.{name}"),
                None => name.clone(),
            }),
            _ => {}
        }
    }

    for window in tokens.windows(4) {
        if let [
            Token::Word(keyword),
            Token::Punct('('),
            Token::Word(target),
            Token::Punct(')'),
        ] = window
        {
            if keyword == "typeof" {
                let target = target.strip_prefix("global::").unwrap_or(target);
                result.type_refs.push(target.to_string());
            }
        }
    }

    result.attributes = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("[assembly:"))
        .map(str::to_string)
        .collect();
    result
}

fn located(diagnostic: Diagnostic, origin: Option<&Path>) -> Diagnostic {
    match origin {
        Some(path) => diagnostic.with_file(path),
        None => diagnostic,
    }
}

impl SourceCompiler for BundleCompiler {
    fn emit(&self, compilation: &Compilation) -> EmitOutcome {
        let mut diagnostics = Vec::new();
        let mut declared: IndexMap<String, Option<&Path>> = IndexMap::new();
        let mut synthetic_refs = Vec::new();
        let mut attributes = Vec::new();

        for unit in compilation.units() {
            let tokens = match scan(unit.text()) {
                Ok(tokens) => tokens,
                Err(diagnostic) => {
                    diagnostics.push(located(diagnostic, unit.origin()));
                    continue;
                }
            };

            let outline = outline(unit.text(), &tokens);
            for type_name in outline.declared {
                if let Some(first) = declared.get(&type_name) {
                    let mut diagnostic = Diagnostic::error(format!(
                        "type `{type_name}` is declared more than once"
                    ))
                    .with_code(ErrorCode::V203);
                    if let Some(first) = first {
                        diagnostic = diagnostic
                            .with_help(format!("first declared by `{}`", first.display()));
                    }
                    diagnostics.push(located(diagnostic, unit.origin()));
                } else {
                    declared.insert(type_name, unit.origin());
                }
            }
            if unit.origin().is_none() {
                synthetic_refs.extend(outline.type_refs);
            }
            attributes.extend(outline.attributes);
        }

        for target in synthetic_refs {
            if !declared.contains_key(&target) {
                diagnostics.push(
                    Diagnostic::error(format!("type `{target}` is not declared by any unit"))
                        .with_code(ErrorCode::V201),
                );
            }
        }

        if diagnostics.iter().any(|d| d.severity().is_error()) {
            debug!(errors = diagnostics.len(); "Bundle compilation failed");
            return EmitOutcome::new(None, diagnostics);
        }

        let image = BundleImage::from_compilation(compilation, attributes).encode();
        debug!(
            units = compilation.units().len(),
            types = declared.len(),
            bytes = image.len();
            "Emitted bundle"
        );
        EmitOutcome::new(Some(image), diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::compilation::{CompilationOptions, SourceUnit};

    fn compile(units: Vec<SourceUnit>) -> EmitOutcome {
        let compiler = BundleCompiler::new();
        let compilation = compiler.compile("App.PrecompiledViews", units);
        compiler.emit(&compilation)
    }

    fn view(text: &str, origin: &str) -> SourceUnit {
        SourceUnit::new(text, Some(PathBuf::from(origin)))
    }

    #[test]
    fn test_emits_bundle_for_valid_units() {
        let outcome = compile(vec![
            view("namespace N { class A { void F() { Write(\"}\"); } } }", "A.tmpl"),
            SourceUnit::synthetic("namespace R { class Reg { object t = typeof(global::N.A); } }"),
            SourceUnit::synthetic("[assembly: global::V(\"1.2.3.4\")]\n"),
        ]);

        assert!(outcome.diagnostics().is_empty(), "{:?}", outcome.diagnostics());
        let image = BundleImage::decode(outcome.image().unwrap()).unwrap();
        assert_eq!(image.assembly_name, "App.PrecompiledViews");
        assert_eq!(image.attributes, ["[assembly: global::V(\"1.2.3.4\")]"]);
        assert_eq!(image.units.len(), 3);
        assert_eq!(image.optimization, CompilationOptions::default().optimization());
    }

    #[test]
    fn test_unbalanced_braces_are_errors() {
        let outcome = compile(vec![view("class A {\n  void F() {\n}", "A.tmpl")]);

        assert!(outcome.image().is_none());
        let diagnostic = &outcome.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::V200));
        assert_eq!(diagnostic.file(), Some(Path::new("A.tmpl")));
        assert!(diagnostic.message().contains("line 1"));
    }

    #[test]
    fn test_mismatched_delimiter_is_an_error() {
        let outcome = compile(vec![view("class A { F(]; }", "A.tmpl")]);
        assert_eq!(outcome.diagnostics()[0].code(), Some(ErrorCode::V200));
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let outcome = compile(vec![view("class A { F(\"oops); }", "A.tmpl")]);
        assert_eq!(outcome.diagnostics()[0].code(), Some(ErrorCode::V202));
    }

    #[test]
    fn test_unresolved_registry_reference_is_an_error() {
        let outcome = compile(vec![SourceUnit::synthetic(
            "class Reg { object t = typeof(global::Missing.View); }",
        )]);

        assert!(outcome.image().is_none());
        assert_eq!(outcome.diagnostics()[0].code(), Some(ErrorCode::V201));
        assert!(outcome.diagnostics()[0].message().contains("Missing.View"));
    }

    #[test]
    fn test_duplicate_type_is_an_error() {
        let outcome = compile(vec![
            view("namespace N { class A {} }", "Home/A.tmpl"),
            view("namespace N { class A {} }", "Home_A.tmpl"),
        ]);

        let diagnostic = &outcome.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::V203));
        assert_eq!(diagnostic.file(), Some(Path::new("Home_A.tmpl")));
        assert_eq!(diagnostic.help(), Some("first declared by `Home/A.tmpl`"));
    }

    #[test]
    fn test_errors_from_every_unit_are_reported() {
        let outcome = compile(vec![
            view("class A {", "A.tmpl"),
            view("class B { \"x }", "B.tmpl"),
        ]);
        assert_eq!(outcome.diagnostics().len(), 2);
    }
}
