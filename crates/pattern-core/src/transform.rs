//! The scripting adapter seam.
//!
//! This crate implements the pattern algebra only; it deliberately does not
//! evaluate arbitrary scripts. A host embedding this engine registers
//! callables that implement `Transform` and hands them to the notation
//! evaluator (or calls them directly) to splice externally-computed
//! patterns into a tree built from this crate's combinators.

use crate::Pattern;
use std::fmt;

/// Opaque error type for a `Transform` implementation, wrapping whatever
/// the host's scripting layer produced.
#[derive(Debug)]
pub struct ScriptError(pub anyhow::Error);

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<anyhow::Error> for ScriptError {
    fn from(err: anyhow::Error) -> Self {
        ScriptError(err)
    }
}

/// A host-supplied transform over a [`Pattern`]. Implementors live outside
/// this crate; `compile`-from-source scripting stays out of scope here.
pub trait Transform: Send + Sync {
    fn apply(&self, pattern: &Pattern) -> Result<Pattern, ScriptError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pure, Value};

    struct DoubleSpeed;

    impl Transform for DoubleSpeed {
        fn apply(&self, pattern: &Pattern) -> Result<Pattern, ScriptError> {
            Ok(pattern.clone().fast(2.0))
        }
    }

    #[test]
    fn transform_can_be_applied_through_the_trait_object() {
        let transform: Box<dyn Transform> = Box::new(DoubleSpeed);
        let pattern = pure(Value::Number(1.0));
        let result = transform.apply(&pattern);
        assert!(result.is_ok());
    }
}
