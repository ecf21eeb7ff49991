//! Error types for parsing and typing.

use crate::span::{offset_to_line_col, Span};
use thiserror::Error;

/// Error during lexing or parsing.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Attach a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        let mut result = format!("error: {}\n", self.message);
        render_snippet(&mut result, source, self.span);
        if let Some(hint) = &self.hint {
            result.push_str(&format!("   = hint: {}\n", hint));
        }
        result
    }
}

/// Error while typing a parsed expression against the entity model.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    /// Error kind for programmatic handling.
    pub kind: CompileErrorKind,
}

/// Kinds of typing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// The root entity type is not known.
    UnknownEntity,
    /// A path ends in something that is not a property.
    UnknownProperty,
    /// A non-final path segment is not a navigation property.
    UnknownNavigation,
    /// A call to a function outside the known set.
    UnknownFunction,
    /// A call with the wrong number of arguments.
    ArityMismatch,
    /// A literal that cannot be represented.
    InvalidLiteral,
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Span, kind: CompileErrorKind) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    pub fn unknown_entity(entity: &str, span: Span) -> Self {
        Self::new(
            format!("unknown entity type '{}'", entity),
            span,
            CompileErrorKind::UnknownEntity,
        )
    }

    pub fn unknown_property(entity: &str, property: &str, span: Span) -> Self {
        Self::new(
            format!("unknown property '{}' on entity type '{}'", property, entity),
            span,
            CompileErrorKind::UnknownProperty,
        )
    }

    pub fn unknown_navigation(entity: &str, navigation: &str, span: Span) -> Self {
        Self::new(
            format!(
                "'{}' is not a navigation property of entity type '{}'",
                navigation, entity
            ),
            span,
            CompileErrorKind::UnknownNavigation,
        )
    }

    pub fn unknown_function(name: &str, span: Span) -> Self {
        Self::new(
            format!("unknown function '{}'", name),
            span,
            CompileErrorKind::UnknownFunction,
        )
    }

    pub fn arity_mismatch(name: &str, expected: (usize, usize), got: usize, span: Span) -> Self {
        let expected = match expected {
            (min, max) if min == max => min.to_string(),
            (min, usize::MAX) => format!("at least {}", min),
            (min, max) => format!("{} to {}", min, max),
        };
        Self::new(
            format!(
                "function '{}' takes {} argument(s), got {}",
                name, expected, got
            ),
            span,
            CompileErrorKind::ArityMismatch,
        )
    }

    pub fn invalid_literal(message: impl Into<String>, span: Span) -> Self {
        Self::new(message, span, CompileErrorKind::InvalidLiteral)
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        let mut result = format!("error[{:?}]: {}\n", self.kind, self.message);
        render_snippet(&mut result, source, self.span);
        result
    }
}

fn render_snippet(out: &mut String, source: &str, span: Span) {
    let (line, col) = offset_to_line_col(source, span.start);
    out.push_str(&format!("  --> line {}:{}\n", line, col));

    let Some(source_line) = source.lines().nth(line - 1) else {
        return;
    };
    out.push_str(&format!("   |\n{:3}| {}\n   |", line, source_line));
    out.push_str(&" ".repeat(col));
    out.push('^');

    let remaining = source_line.chars().count().saturating_sub(col);
    let underline = span.len().saturating_sub(1).min(remaining);
    out.push_str(&"~".repeat(underline));
    out.push('\n');
}

/// Combined error type for the public API.
#[derive(Debug, Clone, Error)]
pub enum LangError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}

impl LangError {
    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            LangError::Parse(e) => e.format_with_source(source),
            LangError::Compile(e) => e.format_with_source(source),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LangError::Parse(e) => e.span,
            LangError::Compile(e) => e.span,
        }
    }
}
