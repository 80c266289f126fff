use crate::span::Span;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("Unclosed delimiter '{delimiter}' opened at {open_span}")]
    UnclosedDelimiter { delimiter: char, open_span: Span },
    #[error("Invalid number '{value}' at {span}")]
    InvalidNumber { value: String, span: Span },
    #[error("Invalid atom '{value}' at {span}")]
    InvalidAtom { value: String, span: Span },
    #[error("{}", format_custom(message, span))]
    Custom {
        message: String,
        span: Option<Span>,
    },
}

fn format_custom(message: &str, span: &Option<Span>) -> String {
    match span {
        Some(span) => format!("{} at {}", message, span),
        None => message.to_string(),
    }
}

impl ParseError {
    pub fn unexpected_token(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
        }
    }

    pub fn unclosed_delimiter(delimiter: char, open_span: Span) -> Self {
        ParseError::UnclosedDelimiter { delimiter, open_span }
    }

    pub fn invalid_number(value: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidNumber {
            value: value.into(),
            span,
        }
    }

    pub fn invalid_atom(value: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidAtom {
            value: value.into(),
            span,
        }
    }

    pub fn custom(message: impl Into<String>, span: Option<Span>) -> Self {
        ParseError::Custom {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
            ParseError::UnclosedDelimiter { open_span, .. } => Some(*open_span),
            ParseError::InvalidNumber { span, .. } => Some(*span),
            ParseError::InvalidAtom { span, .. } => Some(*span),
            ParseError::Custom { span, .. } => *span,
        }
    }
}
