use thiserror::Error;

/// Error taxonomy for the pattern algebra engine.
///
/// Kinds, not types: every failure a combinator can produce fits one of
/// these three variants, named after the combinator and input that caused
/// it so callers can report something actionable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid argument to {combinator}: {message}")]
    InvalidArgument {
        combinator: &'static str,
        message: String,
    },

    #[error("internal invariant violated in {combinator}: {message}")]
    InternalInvariant {
        combinator: &'static str,
        message: String,
    },
}

impl CoreError {
    pub fn invalid(combinator: &'static str, message: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            combinator,
            message: message.into(),
        }
    }

    pub fn invariant(combinator: &'static str, message: impl Into<String>) -> Self {
        CoreError::InternalInvariant {
            combinator,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message_names_combinator() {
        let err = CoreError::invalid("fast", "factor must be non-zero");
        assert_eq!(
            err.to_string(),
            "invalid argument to fast: factor must be non-zero"
        );
    }
}
