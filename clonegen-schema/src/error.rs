//! Error types for type table construction and validation.

use thiserror::Error;

/// Error type for type table operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Type not found in the table.
    #[error("type '{name}' not found (referenced from {context})")]
    TypeNotFound {
        /// Type name.
        name: String,
        /// Where the reference was made.
        context: String,
    },

    /// A name bound to two different definitions.
    #[error("duplicate type definition: '{name}'")]
    DuplicateDefinition {
        /// Name of the duplicate.
        name: String,
    },

    /// Circular type reference.
    #[error("circular type reference detected: {path}")]
    CircularReference {
        /// Path of the circular reference.
        path: String,
    },

    /// Name that cannot be used as a Rust identifier.
    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier {
        /// Offending name.
        name: String,
    },
}

impl SchemaError {
    /// Creates a type-not-found error.
    pub fn not_found(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::TypeNotFound {
            name: name.into(),
            context: context.into(),
        }
    }

    /// Creates a circular reference error from the visited path.
    pub fn circular<S: AsRef<str>>(path: &[S]) -> Self {
        let path = path
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(" -> ");
        Self::CircularReference { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = SchemaError::not_found("Gradient", "field 'image' of 'Background'");
        let msg = err.to_string();
        assert!(msg.contains("Gradient"));
        assert!(msg.contains("Background"));
    }

    #[test]
    fn test_circular_path() {
        let err = SchemaError::circular(&["A", "B", "A"]);
        assert_eq!(
            err.to_string(),
            "circular type reference detected: A -> B -> A"
        );
    }
}
