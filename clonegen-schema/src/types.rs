//! Type table definitions.
//!
//! This module contains the data structures describing a closed world of
//! structurally declared types: builtins, aliases, fixed and dynamic
//! sequences, and records.

use crate::error::SchemaError;
use indexmap::IndexMap;

/// Unique identifier naming a type entry.
pub type TypeName = String;

/// Pre-classified kind of a builtin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuiltinMarker {
    /// Plain value builtin (numbers, booleans, strings, colors...).
    #[default]
    Value,
    /// Owned sequence of a type defined outside the table.
    SequenceOfExternal,
    /// Set-like collection duplicated by its own clone.
    SetLike,
    /// Interface-like abstract type, always a reference type.
    Capability,
}

impl BuiltinMarker {
    /// Returns the marker name used in diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::SequenceOfExternal => "sequence-of-external",
            Self::SetLike => "set-like",
            Self::Capability => "capability",
        }
    }
}

/// Builtin type definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuiltinDef {
    /// Builtin kind.
    pub marker: BuiltinMarker,
    /// Literal expression of the zero value, when one exists.
    pub zero_literal: Option<String>,
}

impl BuiltinDef {
    /// Creates a plain value builtin without a zero literal.
    #[must_use]
    pub fn value() -> Self {
        Self::default()
    }

    /// Creates a plain value builtin with the given zero literal.
    #[must_use]
    pub fn with_zero(literal: impl Into<String>) -> Self {
        Self {
            marker: BuiltinMarker::Value,
            zero_literal: Some(literal.into()),
        }
    }

    /// Creates a builtin with the given marker.
    #[must_use]
    pub fn marked(marker: BuiltinMarker) -> Self {
        Self {
            marker,
            zero_literal: None,
        }
    }
}

/// Record (product type) definition.
///
/// Field order is the declaration order and drives emission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordDef {
    /// Fields keyed by name, in declaration order.
    pub fields: IndexMap<String, TypeRef>,
}

impl RecordDef {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, returning the record for chaining.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        self.fields.insert(name.into(), type_ref.into());
        self
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record declares no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Reference to a type from a field or an element position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Reference resolved through the table.
    Named(TypeName),
    /// Anonymous nested record.
    Inline(Box<RecordDef>),
}

impl TypeRef {
    /// Creates a named reference.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Creates an inline record reference.
    #[must_use]
    pub fn inline(record: RecordDef) -> Self {
        Self::Inline(Box::new(record))
    }

    /// Returns the referenced name, if named.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Inline(_) => None,
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<RecordDef> for TypeRef {
    fn from(record: RecordDef) -> Self {
        Self::inline(record)
    }
}

/// Type definition variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    /// Primitive or pre-classified external type.
    Builtin(BuiltinDef),
    /// Named alias resolving to another entry.
    Alias(TypeName),
    /// Array-like sequence of fixed arity.
    FixedSequence {
        /// Number of elements.
        length: usize,
        /// Element type.
        element: TypeRef,
    },
    /// Growable, heap-owned sequence.
    DynamicSequence(TypeRef),
    /// Product type.
    Record(RecordDef),
}

impl TypeDef {
    /// Creates an alias definition.
    #[must_use]
    pub fn alias(target: impl Into<String>) -> Self {
        Self::Alias(target.into())
    }

    /// Creates a fixed sequence definition.
    #[must_use]
    pub fn fixed(length: usize, element: impl Into<TypeRef>) -> Self {
        Self::FixedSequence {
            length,
            element: element.into(),
        }
    }

    /// Creates a dynamic sequence definition.
    #[must_use]
    pub fn dynamic(element: impl Into<TypeRef>) -> Self {
        Self::DynamicSequence(element.into())
    }

    /// Creates a capability builtin.
    #[must_use]
    pub fn capability() -> Self {
        Self::Builtin(BuiltinDef::marked(BuiltinMarker::Capability))
    }

    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Builtin(_) => "builtin",
            Self::Alias(_) => "alias",
            Self::FixedSequence { .. } => "fixed sequence",
            Self::DynamicSequence(_) => "dynamic sequence",
            Self::Record(_) => "record",
        }
    }

    /// Returns true if this is a builtin.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    /// Returns true if this is a capability builtin.
    #[must_use]
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::Builtin(b) if b.marker == BuiltinMarker::Capability)
    }

    /// Returns true if this is a record.
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }
}

impl From<RecordDef> for TypeDef {
    fn from(record: RecordDef) -> Self {
        Self::Record(record)
    }
}

impl From<BuiltinDef> for TypeDef {
    fn from(builtin: BuiltinDef) -> Self {
        Self::Builtin(builtin)
    }
}

/// Closed mapping from type name to definition.
///
/// Entries keep insertion order so that every walk over the table is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: IndexMap<TypeName, TypeDef>,
}

impl TypeTable {
    /// Creates a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table pre-populated with the Rust primitives and their
    /// zero literals.
    #[must_use]
    pub fn with_primitives() -> Self {
        let mut table = Self::new();
        for (name, zero) in [
            ("bool", "false"),
            ("u8", "0"),
            ("i32", "0"),
            ("i64", "0"),
            ("f32", "0.0"),
            ("f64", "0.0"),
            ("String", "\"\""),
        ] {
            table
                .entries
                .insert(name.to_string(), TypeDef::Builtin(BuiltinDef::with_zero(zero)));
        }
        table
    }

    /// Adds a definition to the table.
    ///
    /// Re-inserting an identical definition is accepted.
    ///
    /// # Errors
    /// Returns `SchemaError::DuplicateDefinition` if the name is already
    /// bound to a different definition.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        def: impl Into<TypeDef>,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        let def = def.into();
        match self.entries.get(&name) {
            Some(existing) if *existing != def => Err(SchemaError::DuplicateDefinition { name }),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(name, def);
                Ok(())
            }
        }
    }

    /// Adds a definition, returning the table for chaining.
    ///
    /// # Errors
    /// Returns `SchemaError::DuplicateDefinition` on a conflicting name.
    pub fn with(
        mut self,
        name: impl Into<String>,
        def: impl Into<TypeDef>,
    ) -> Result<Self, SchemaError> {
        self.insert(name, def)?;
        Ok(self)
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.entries.get(name)
    }

    /// Returns true if a type with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Looks up a type, failing with the referencing context when absent.
    ///
    /// # Errors
    /// Returns `SchemaError::TypeNotFound` if the name is not in the table.
    pub fn lookup(&self, name: &str, context: &str) -> Result<&TypeDef, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::not_found(name, context))
    }

    /// Follows alias chains down to the first non-alias definition.
    ///
    /// Returns the canonical name together with its definition.
    ///
    /// # Errors
    /// Returns `SchemaError::TypeNotFound` for a dangling alias and
    /// `SchemaError::CircularReference` for an alias loop.
    pub fn resolve_alias<'a>(
        &'a self,
        name: &'a str,
        context: &str,
    ) -> Result<(&'a str, &'a TypeDef), SchemaError> {
        let mut current = name;
        let mut path: Vec<&str> = Vec::new();
        loop {
            let def = self.lookup(current, context)?;
            match def {
                TypeDef::Alias(target) => {
                    if path.contains(&current) {
                        path.push(current);
                        return Err(SchemaError::circular(&path));
                    }
                    path.push(current);
                    current = target;
                }
                _ => return Ok((current, def)),
            }
        }
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDef)> {
        self.entries.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Iterates over type names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
