//! # Clonegen Schema
//!
//! Type table model consumed by the clonegen synthesis engine.
//!
//! This crate provides:
//! - Structural type definitions (builtins, aliases, sequences, records)
//! - A closed, insertion-ordered type table with alias resolution
//! - Table validation (closed world, identifiers, containment cycles)
//! - Identifier helpers shared with the emitter

pub mod error;
pub mod naming;
pub mod types;
pub mod validation;

pub use error::SchemaError;
pub use naming::{is_valid_identifier, to_snake_case};
pub use types::{BuiltinDef, BuiltinMarker, RecordDef, TypeDef, TypeName, TypeRef, TypeTable};
pub use validation::validate_table;
