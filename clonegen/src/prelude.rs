//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```
//! use clonegen::prelude::*;
//! ```

// Schema types
pub use clonegen_schema::{
    BuiltinDef, BuiltinMarker, RecordDef, SchemaError, TypeDef, TypeRef, TypeTable,
    validate_table,
};

// Synthesis and emission
pub use clonegen_codegen::{
    CodegenError, CopyBody, GeneratedCode, Generator, GeneratorConfig, MethodFamily, Synthesis,
    ZeroBody,
};

// Reference evaluation
pub use clonegen_codegen::{Evaluator, Value};
