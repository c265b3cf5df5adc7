use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// Parse errors with source location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn error(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            message: message.into(),
            span,
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Evaluation failures, without location information.
#[derive(Debug)]
pub enum RenderError {
    /// A call resolved to neither a builder operation nor a context helper.
    NoCapability(String),
    /// A bare identifier named no ambient local.
    UndefinedLocal(String),
    MissingArgument { op: String, name: String },
    BadArgument { op: String, detail: String },
    /// A directive the evaluator doesn't recognize (compiler bug).
    BadDirective(String),
    MissingTitle,
    MalformedPartial(String),
    Custom(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NoCapability(name) => write!(f, "no such capability: {}", name),
            RenderError::UndefinedLocal(name) => write!(f, "undefined local: {}", name),
            RenderError::MissingArgument { op, name } => {
                write!(f, "{}: missing required argument '{}'", op, name)
            }
            RenderError::BadArgument { op, detail } => write!(f, "{}: {}", op, detail),
            RenderError::BadDirective(line) => write!(f, "unknown directive: {}", line),
            RenderError::MissingTitle => {
                write!(f, "modal has no title: call title before export")
            }
            RenderError::MalformedPartial(detail) => {
                write!(f, "partial did not return a block document: {}", detail)
            }
            RenderError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// A render error enriched with a span into the augmented source.
#[derive(Debug)]
pub struct DiagnosticError {
    pub error: RenderError,
    pub span: Option<Range<usize>>,
    pub source_id: usize,
}

impl DiagnosticError {
    pub fn new(error: RenderError, span: Range<usize>, source_id: usize) -> Self {
        DiagnosticError {
            error,
            span: Some(span),
            source_id,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let mut diagnostic = Diagnostic::error().with_message(self.error.to_string());
        if let Some(span) = &self.span {
            diagnostic =
                diagnostic.with_labels(vec![Label::primary(self.source_id, span.clone())]);
        }
        diagnostic
    }
}

impl From<RenderError> for DiagnosticError {
    fn from(error: RenderError) -> Self {
        DiagnosticError {
            error,
            span: None,
            source_id: 0,
        }
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for DiagnosticError {}

/// Failure of a full compile-and-evaluate render pass.
#[derive(Debug)]
pub enum RenderFailure {
    Parse(Vec<ParseError>),
    Eval(DiagnosticError),
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderFailure::Parse(errors) => {
                let messages: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
                write!(f, "parse errors: {}", messages.join(", "))
            }
            RenderFailure::Eval(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for RenderFailure {}
