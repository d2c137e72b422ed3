//! Top-level generation entry point.

use crate::closure::{ClosureDriver, Synthesis};
use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::rust::{GeneratedCode, RustEmitter};
use clonegen_schema::TypeTable;

/// Generates copy and zero-predicate methods for a type table.
pub struct Generator<'a> {
    table: &'a TypeTable,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    /// Creates a generator with the default configuration.
    #[must_use]
    pub fn new(table: &'a TypeTable) -> Self {
        Self::with_config(table, GeneratorConfig::default())
    }

    /// Creates a generator with a custom configuration.
    #[must_use]
    pub fn with_config(table: &'a TypeTable, config: GeneratorConfig) -> Self {
        Self { table, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs the closure for `roots` without rendering.
    ///
    /// # Errors
    /// Returns `CodegenError` if the closure cannot be completed.
    pub fn synthesize<S: AsRef<str>>(&self, roots: &[S]) -> Result<Synthesis, CodegenError> {
        tracing::debug!(
            "Synthesizing {} roots over {} types",
            roots.len(),
            self.table.len()
        );
        ClosureDriver::new(self.table, &self.config).run(roots)
    }

    /// Runs the closure for `roots` and renders every method.
    ///
    /// # Errors
    /// Returns `CodegenError` if the closure cannot be completed or a
    /// method cannot be rendered.
    pub fn generate<S: AsRef<str>>(&self, roots: &[S]) -> Result<GeneratedCode, CodegenError> {
        let synthesis = self.synthesize(roots)?;
        let code = RustEmitter::new(&self.config).emit(&synthesis)?;
        tracing::info!(
            "Generated {} methods, {} capability requirements",
            code.methods.len(),
            code.capabilities.len()
        );
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::MethodFamily;
    use clonegen_schema::{RecordDef, TypeDef};

    fn table() -> TypeTable {
        TypeTable::with_primitives()
            .with("Image", TypeDef::capability())
            .and_then(|t| t.with("Names", TypeDef::dynamic("String")))
            .and_then(|t| t.with("Point", RecordDef::new().field("x", "f32").field("y", "f32")))
            .and_then(|t| {
                t.with(
                    "Layer",
                    RecordDef::new()
                        .field("origin", "Point")
                        .field("names", "Names")
                        .field("image", "Image"),
                )
            })
            .and_then(|t| t.with("Layers", TypeDef::dynamic("Layer")))
            .expect("table")
    }

    #[test]
    fn test_generate_parses_as_rust() {
        let table = table();
        let code = Generator::new(&table).generate(&["Layers"]).expect("generate");
        let source = code.to_source();
        syn::parse_file(&source).expect("valid Rust");

        assert_eq!(code.family(MethodFamily::PublicCopy).count(), 1);
        let private: Vec<_> = code
            .family(MethodFamily::PrivateCopy)
            .map(|m| m.type_name.as_str())
            .collect();
        assert_eq!(private, vec!["Layer", "Names"]);
        assert_eq!(code.capabilities.len(), 1);
        assert_eq!(code.capabilities[0].method, "clone_image");
    }

    #[test]
    fn test_synthesize_matches_generate() {
        let table = table();
        let generator = Generator::new(&table);
        let synthesis = generator.synthesize(&["Layers"]).expect("synthesize");
        let code = generator.generate(&["Layers"]).expect("generate");
        assert_eq!(synthesis.methods.len(), code.methods.len());
    }

    #[test]
    fn test_custom_config() {
        let table = table();
        let config = GeneratorConfig::default()
            .without_public_trait()
            .zero_method("is_blank");
        let generator = Generator::with_config(&table, config);
        assert_eq!(generator.config().zero_method, "is_blank");

        let source = generator.generate(&["Point"]).expect("generate").to_source();
        assert!(!source.contains("Property"));
        assert!(source.contains("is_blank"));
    }

    #[test]
    fn test_unknown_root() {
        let table = table();
        let err = Generator::new(&table).generate(&["Missing"]).expect_err("root");
        assert!(matches!(err, CodegenError::UnresolvedType { .. }));
    }
}
