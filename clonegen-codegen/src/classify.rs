//! Value/reference classification of type references.
//!
//! A value type can be duplicated by a plain structural copy. Anything that
//! owns a dynamic sequence or an abstract capability value is a reference
//! type and needs a synthesized deep copy.

use crate::error::CodegenError;
use clonegen_schema::{BuiltinMarker, RecordDef, SchemaError, TypeDef, TypeRef, TypeTable};
use std::collections::HashMap;

/// Memoizing classifier over one type table.
///
/// The cache lives for one synthesis run.
#[derive(Debug)]
pub struct Classifier<'a> {
    table: &'a TypeTable,
    cache: HashMap<String, bool>,
    in_progress: Vec<String>,
}

impl<'a> Classifier<'a> {
    /// Creates a classifier with an empty cache.
    #[must_use]
    pub fn new(table: &'a TypeTable) -> Self {
        Self {
            table,
            cache: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Returns the table being classified.
    #[must_use]
    pub fn table(&self) -> &'a TypeTable {
        self.table
    }

    /// Returns true if `type_ref` is a value type.
    ///
    /// # Errors
    /// Returns `CodegenError::UnresolvedType` if a reachable name is missing
    /// from the table and `CodegenError::CyclicType` if a type contains
    /// itself by value.
    pub fn is_value_type(&mut self, type_ref: &TypeRef, context: &str) -> Result<bool, CodegenError> {
        match type_ref {
            TypeRef::Named(name) => self.is_value_name(name, context),
            TypeRef::Inline(record) => self.is_value_record(record, context),
        }
    }

    /// Returns true if the named type is a value type.
    ///
    /// # Errors
    /// See [`Classifier::is_value_type`].
    pub fn is_value_name(&mut self, name: &str, context: &str) -> Result<bool, CodegenError> {
        if let Some(&cached) = self.cache.get(name) {
            return Ok(cached);
        }
        if self.in_progress.iter().any(|n| n == name) {
            let mut path = self.in_progress.clone();
            path.push(name.to_string());
            let start = path.iter().position(|n| n == name).unwrap_or(0);
            return Err(CodegenError::from_schema(SchemaError::circular(&path[start..])));
        }

        let table = self.table;
        let def = table
            .lookup(name, context)
            .map_err(CodegenError::from_schema)?;

        self.in_progress.push(name.to_string());
        let result = self.classify_def(name, def);
        self.in_progress.pop();

        let is_value = result?;
        tracing::trace!("Classified '{}' as {} type", name, kind_label(is_value));
        self.cache.insert(name.to_string(), is_value);
        Ok(is_value)
    }

    fn classify_def(&mut self, name: &str, def: &TypeDef) -> Result<bool, CodegenError> {
        match def {
            TypeDef::Builtin(builtin) => Ok(!matches!(
                builtin.marker,
                BuiltinMarker::Capability | BuiltinMarker::SequenceOfExternal
            )),
            TypeDef::Alias(target) => self.is_value_name(target, &format!("alias '{}'", name)),
            TypeDef::DynamicSequence(_) => Ok(false),
            TypeDef::FixedSequence { element, .. } => {
                self.is_value_type(element, &format!("element of '{}'", name))
            }
            TypeDef::Record(record) => self.is_value_record(record, name),
        }
    }

    fn is_value_record(&mut self, record: &RecordDef, owner: &str) -> Result<bool, CodegenError> {
        for (field, type_ref) in &record.fields {
            let context = format!("field '{}' of '{}'", field, owner);
            if !self.is_value_type(type_ref, &context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn kind_label(is_value: bool) -> &'static str {
    if is_value { "value" } else { "reference" }
}
