//! # Clonegen Codegen
//!
//! Synthesis of deep-copy and zero-predicate methods over a type table.
//!
//! This crate provides:
//! - Value/reference classification of table types
//! - Copy and zero-predicate body synthesis
//! - The worklist closure that discovers every helper a root needs
//! - Rust rendering of the synthesized methods
//! - A reference evaluator for checking body semantics

pub mod classify;
pub mod closure;
pub mod config;
pub mod copy;
pub mod error;
pub mod eval;
pub mod generator;
pub mod rust;
pub mod worklist;
pub mod zero;

pub use classify::Classifier;
pub use closure::{ClosureDriver, MethodBody, MethodFamily, Synthesis, SynthesizedMethod};
pub use config::GeneratorConfig;
pub use copy::{CopyBody, ElementCopy, FieldCopy, SequenceKind, synthesize_copy};
pub use error::CodegenError;
pub use eval::{Evaluator, Value};
pub use generator::Generator;
pub use rust::{CapabilityClone, EmittedMethod, GeneratedCode, RustEmitter};
pub use worklist::Worklist;
pub use zero::{FieldTest, ZeroBody, ZeroTest, synthesize_zero};

/// Generates the methods for `roots` with the default configuration.
///
/// # Arguments
/// * `table` - Closed type table
/// * `roots` - Types that receive a public copy
///
/// # Returns
/// Generated Rust code as a string.
///
/// # Errors
/// Returns `CodegenError` if synthesis or rendering fails.
pub fn generate<S: AsRef<str>>(
    table: &clonegen_schema::TypeTable,
    roots: &[S],
) -> Result<String, CodegenError> {
    let code = Generator::new(table).generate(roots)?;
    Ok(code.to_source())
}
