//! # Clonegen
//!
//! Deep-copy and zero-predicate method synthesis for closed type tables.
//!
//! Given a table of structurally declared types and a set of root types,
//! clonegen classifies every reachable type as a value or reference type
//! and generates exactly the methods the roots need: a public deep copy
//! per root, a private copy helper per reference-typed constituent, and a
//! zero predicate per non-builtin type.
//!
//! ## Quick Start
//!
//! ```
//! use clonegen::prelude::*;
//!
//! let table = TypeTable::with_primitives()
//!     .with("Names", TypeDef::dynamic("String"))
//!     .and_then(|t| t.with("Doc", RecordDef::new().field("title", "String").field("names", "Names")))
//!     .expect("table");
//!
//! let code = Generator::new(&table).generate(&["Doc"]).expect("generate");
//! assert!(code.to_source().contains("fn copy"));
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Type table model, alias resolution and validation
//! - [`codegen`] - Classification, synthesis, closure and Rust emission

pub mod prelude;

/// Type table model and validation.
pub mod schema {
    pub use clonegen_schema::*;
}

/// Method synthesis and Rust emission.
pub mod codegen {
    pub use clonegen_codegen::*;
}

// Re-export commonly used items at the crate root
pub use clonegen_codegen::{CodegenError, GeneratedCode, Generator, GeneratorConfig, generate};
pub use clonegen_schema::{SchemaError, TypeTable};
