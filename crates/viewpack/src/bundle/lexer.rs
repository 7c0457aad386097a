//! Lexical analyzer for `@`-templates.
//!
//! Splits template text into [`Segment`]s:
//!
//! - literal text, emitted verbatim
//! - `@@`, an escaped `@`
//! - `@* ... *@`, a comment that produces no output
//! - `@(expression)`, an explicit expression with balanced parentheses
//! - `@name` / `@name.member`, an implicit expression
//! - a lone `@` that starts none of the above
//!
//! An `@` directly after an alphanumeric character (as in `user@example.com`)
//! is literal text. The entry point is [`tokenize`], which recovers from
//! errors and collects diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, take_till, take_until, take_while},
};

use viewpack_core::{
    Span,
    error::{Diagnostic, ErrorCode},
};

/// A piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text emitted verbatim.
    Literal(&'a str),
    /// Expression whose value is written to the output.
    Expression(&'a str),
    /// Comment body; produces no output.
    Comment(&'a str),
    /// An `@` that does not start a construct; emitted literally.
    StrayTransition,
}

/// A segment with its byte span in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedSegment<'a> {
    pub segment: Segment<'a>,
    pub span: Span,
}

impl<'a> PositionedSegment<'a> {
    fn new(segment: Segment<'a>, span: Span) -> Self {
        Self { segment, span }
    }
}

/// Rich diagnostic information for template lexer errors.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<TemplateDiagnostic>>;

/// Parse literal text up to the next `@`.
fn literal_text<'a>(input: &mut Input<'a>) -> IResult<'a, Segment<'a>> {
    take_till(1.., '@').map(Segment::Literal).parse_next(input)
}

/// Parse `@@`.
fn escaped_transition<'a>(input: &mut Input<'a>) -> IResult<'a, Segment<'a>> {
    literal("@@")
        .value(Segment::Literal("@"))
        .parse_next(input)
}

/// Parse a comment `@* ... *@`.
///
/// Commits after `@*` so a missing terminator is reported, not retried.
fn comment<'a>(input: &mut Input<'a>) -> IResult<'a, Segment<'a>> {
    let start = input.current_token_start();

    preceded(
        "@*",
        cut_err(terminated(take_until(0.., "*@"), "*@")).context(TemplateDiagnostic {
            code: ErrorCode::V102,
            message: "unterminated template comment",
            help: Some("close the comment with `*@`"),
            start,
        }),
    )
    .map(Segment::Comment)
    .parse_next(input)
}

/// Scan an expression body up to, but not including, its closing `)`.
///
/// Nested parentheses must balance; parentheses inside string and character
/// literals are ignored.
fn balanced_expression<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = None;

    for (offset, ch) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' if depth == 0 => {
                end = Some(offset);
                break;
            }
            ')' => depth -= 1,
            _ => {}
        }
    }

    match end {
        Some(len) => Ok(input.next_slice(len)),
        None => {
            // Consume the rest so the error span reaches the end of input.
            let rest = input.eof_offset();
            input.next_slice(rest);
            Err(ErrMode::Backtrack(ContextError::new()))
        }
    }
}

/// Parse an explicit expression `@( ... )`.
fn explicit_expression<'a>(input: &mut Input<'a>) -> IResult<'a, Segment<'a>> {
    let start = input.current_token_start();

    preceded(
        "@(",
        cut_err(terminated(balanced_expression, ')')).context(TemplateDiagnostic {
            code: ErrorCode::V101,
            message: "unterminated `@(` expression",
            help: Some("add a closing `)`"),
            start,
        }),
    )
    .map(Segment::Expression)
    .parse_next(input)
}

/// Parse identifiers
fn identifier<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .verify(|s: &str| {
            s.chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        })
        .parse_next(input)
}

/// Parse an implicit expression `@name(.member)*`.
fn implicit_expression<'a>(input: &mut Input<'a>) -> IResult<'a, Segment<'a>> {
    let members = repeat(0.., preceded('.', identifier)).map(|()| ());

    preceded('@', (identifier, members).take())
        .map(Segment::Expression)
        .parse_next(input)
}

/// Parse a lone `@`.
fn stray_transition<'a>(input: &mut Input<'a>) -> IResult<'a, Segment<'a>> {
    '@'.value(Segment::StrayTransition).parse_next(input)
}

/// Parse a single segment with position tracking
fn positioned_segment<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedSegment<'a>> {
    let start_pos = input.current_token_start();

    let segment = alt((
        literal_text,
        escaped_transition,  // Must come before any other `@` form
        comment,             // Must come before stray `@`
        explicit_expression, // Must come before stray `@`
        implicit_expression, // Must come before stray `@`
        stray_transition,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedSegment::new(segment, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates segments and diagnostics.
struct Lexer<'a> {
    segments: Vec<PositionedSegment<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the input, collecting segments and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            if self.at_embedded_transition(&input) {
                let start = input.current_token_start();
                input.next_token();
                self.segments.push(PositionedSegment::new(
                    Segment::Literal("@"),
                    Span::new(start..start + 1),
                ));
                continue;
            }

            match positioned_segment(&mut input) {
                Ok(segment) => self.segments.push(segment),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.push(Self::convert_err_mode(e, error_pos));

                    // An unterminated construct swallows the rest of the
                    // template; keep it as literal text so the generated
                    // source still covers the whole file.
                    let rest = input.eof_offset();
                    if rest > 0 {
                        let text = input.next_slice(rest);
                        self.segments.push(PositionedSegment::new(
                            Segment::Literal(text),
                            Span::new(error_pos..error_pos + rest),
                        ));
                    }
                    break;
                }
            }
        }
    }

    /// Whether the input starts with an `@` that belongs to surrounding
    /// text, as in an e-mail address.
    fn at_embedded_transition(&self, input: &Input<'a>) -> bool {
        let follows_word = matches!(
            self.segments.last(),
            Some(PositionedSegment {
                segment: Segment::Literal(text),
                ..
            }) if text.ends_with(|c: char| c.is_alphanumeric())
        );
        follows_word
            && input.starts_with('@')
            && input
                .chars()
                .nth(1)
                .is_some_and(|c| c.is_alphanumeric())
    }

    fn finish(self) -> (Vec<PositionedSegment<'a>>, Vec<Diagnostic>) {
        (self.segments, self.diagnostics)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `TemplateDiagnostic` from the error context. Falls back to
    /// a generic unterminated-expression error if no context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<TemplateDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(TemplateDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("malformed template expression")
            .with_code(ErrorCode::V101)
            .with_label(span, ErrorCode::V101.description())
    }
}

/// Split a template into segments, collecting diagnostics.
///
/// Never fails: malformed constructs produce error diagnostics and the
/// remaining text is kept as a literal.
pub fn tokenize(input: &str) -> (Vec<PositionedSegment<'_>>, Vec<Diagnostic>) {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}
