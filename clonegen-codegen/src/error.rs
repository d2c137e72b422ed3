//! Error types for synthesis and emission.

use crate::closure::MethodFamily;
use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Type table error.
    #[error("schema error: {0}")]
    Schema(#[from] clonegen_schema::SchemaError),

    /// A reference names a type absent from the table.
    #[error("unresolved type '{type_name}' referenced from {context}")]
    UnresolvedType {
        /// Type name.
        type_name: String,
        /// Referencing context.
        context: String,
    },

    /// A type combination with no synthesis rule.
    #[error("unsupported shape for '{type_name}': {reason}")]
    UnsupportedShape {
        /// Type name.
        type_name: String,
        /// Why no rule applies.
        reason: String,
    },

    /// A type that contains itself by value.
    #[error("cyclic type definition: {path}")]
    CyclicType {
        /// Path of the cycle.
        path: String,
    },

    /// The closure exhausted its work budget without draining.
    #[error(
        "{family} closure did not terminate within {budget} steps along {chain}; pending: {}",
        .pending.join(", ")
    )]
    NonTerminatingClosure {
        /// Method family being drained.
        family: MethodFamily,
        /// Step budget.
        budget: usize,
        /// Referrer chain from a root to the name that exceeded the budget.
        chain: String,
        /// Names still pending.
        pending: Vec<String>,
    },

    /// Name that cannot be rendered as a Rust identifier or type.
    #[error("'{name}' cannot be rendered as Rust")]
    InvalidIdentifier {
        /// Offending name.
        name: String,
    },

    /// Literal that does not parse as a Rust expression.
    #[error("invalid zero literal '{expr}'")]
    InvalidExpression {
        /// Offending literal.
        expr: String,
    },

    /// Reference evaluation error.
    #[error("evaluation error: {message}")]
    Evaluation {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates an unsupported shape error.
    pub fn unsupported(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an evaluation error with the given message.
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Lifts a table error, turning missing names into `UnresolvedType`.
    pub(crate) fn from_schema(err: clonegen_schema::SchemaError) -> Self {
        match err {
            clonegen_schema::SchemaError::TypeNotFound { name, context } => Self::UnresolvedType {
                type_name: name,
                context,
            },
            clonegen_schema::SchemaError::CircularReference { path } => Self::CyclicType { path },
            other => Self::Schema(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_schema_not_found() {
        let err = CodegenError::from_schema(clonegen_schema::SchemaError::not_found(
            "Gradient",
            "field 'image'",
        ));
        assert!(matches!(err, CodegenError::UnresolvedType { .. }));
        assert!(err.to_string().contains("field 'image'"));
    }

    #[test]
    fn test_non_terminating_display() {
        let err = CodegenError::NonTerminatingClosure {
            family: MethodFamily::PrivateCopy,
            budget: 4,
            chain: "Root -> A -> Root".to_string(),
            pending: vec!["A".to_string(), "B".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("private copy"));
        assert!(msg.contains("Root -> A -> Root"));
        assert!(msg.contains("A, B"));
    }
}
