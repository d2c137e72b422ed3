//! Reference evaluator for synthesized bodies.
//!
//! Interprets copy and zero bodies over a dynamic [`Value`] model so their
//! semantics can be checked without compiling the rendered output. Plain
//! duplication of a [`Value`] shares dynamic sequences, exactly like a
//! structural copy of a slice header would.

use crate::classify::Classifier;
use crate::closure::Synthesis;
use crate::copy::{CopyBody, ElementCopy, SequenceKind};
use crate::error::CodegenError;
use crate::zero::{ZeroBody, ZeroTest};
use clonegen_schema::{BuiltinDef, BuiltinMarker, RecordDef, TypeDef, TypeRef, TypeTable};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Concrete value stored in a capability slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    /// Runtime type of the value.
    pub concrete: String,
    /// The value itself.
    pub value: Value,
}

/// Dynamic value of a table type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
    /// Builtin value without a structural model, compared by text.
    Opaque(String),
    /// Record fields in declaration order.
    Record(IndexMap<String, Value>),
    /// Fixed sequence, duplicated element by element.
    Array(Vec<Value>),
    /// Dynamic sequence, shared on plain duplication.
    Seq(Rc<RefCell<Vec<Value>>>),
    /// Capability slot.
    Capability(Option<Box<Tagged>>),
}

impl Value {
    /// Creates a dynamic sequence.
    #[must_use]
    pub fn seq(items: Vec<Value>) -> Self {
        Self::Seq(Rc::new(RefCell::new(items)))
    }

    /// Creates a record from field/value pairs.
    pub fn record<'f>(fields: impl IntoIterator<Item = (&'f str, Value)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// Creates a filled capability slot.
    #[must_use]
    pub fn capability(concrete: impl Into<String>, value: Value) -> Self {
        Self::Capability(Some(Box::new(Tagged {
            concrete: concrete.into(),
            value,
        })))
    }

    /// Creates a string value.
    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Returns a record field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Returns a mutable record field.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Self::Record(fields) => fields.get_mut(name),
            _ => None,
        }
    }

    /// Returns the shared storage of a dynamic sequence.
    #[must_use]
    pub fn as_seq(&self) -> Option<&Rc<RefCell<Vec<Value>>>> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the number of elements of a sequence.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Seq(items) => Some(items.borrow().len()),
            Self::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Returns true if both values are dynamic sequences sharing storage.
    #[must_use]
    pub fn shares_storage(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Seq(a), Self::Seq(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Duplicates the value with fresh storage for every dynamic sequence.
    #[must_use]
    pub fn detach(&self) -> Value {
        match self {
            Self::Record(fields) => Self::Record(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.detach()))
                    .collect(),
            ),
            Self::Array(items) => Self::Array(items.iter().map(Value::detach).collect()),
            Self::Seq(items) => Self::seq(items.borrow().iter().map(Value::detach).collect()),
            Self::Capability(Some(tagged)) => Self::capability(
                tagged.concrete.clone(),
                tagged.value.detach(),
            ),
            other => other.clone(),
        }
    }

    /// Builds the zero value of a type.
    ///
    /// # Errors
    /// Returns `CodegenError::UnresolvedType` for names missing from the table.
    pub fn zero_of(table: &TypeTable, type_ref: &TypeRef) -> Result<Value, CodegenError> {
        match type_ref {
            TypeRef::Named(name) => {
                let (_, def) = table
                    .resolve_alias(name, "zero value")
                    .map_err(CodegenError::from_schema)?;
                match def {
                    TypeDef::Builtin(builtin) => Ok(builtin_zero(builtin)),
                    TypeDef::FixedSequence { length, element } => {
                        let items = (0..*length)
                            .map(|_| Value::zero_of(table, element))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(Value::Array(items))
                    }
                    TypeDef::DynamicSequence(_) => Ok(Value::seq(Vec::new())),
                    TypeDef::Record(record) => record_zero(table, record),
                    TypeDef::Alias(_) => Err(CodegenError::evaluation(format!(
                        "alias '{}' did not resolve",
                        name
                    ))),
                }
            }
            TypeRef::Inline(record) => record_zero(table, record),
        }
    }
}

fn record_zero(table: &TypeTable, record: &RecordDef) -> Result<Value, CodegenError> {
    let mut fields = IndexMap::with_capacity(record.len());
    for (name, type_ref) in &record.fields {
        fields.insert(name.clone(), Value::zero_of(table, type_ref)?);
    }
    Ok(Value::Record(fields))
}

fn builtin_zero(builtin: &BuiltinDef) -> Value {
    match builtin.marker {
        BuiltinMarker::Capability => return Value::Capability(None),
        BuiltinMarker::SequenceOfExternal => return Value::seq(Vec::new()),
        BuiltinMarker::Value | BuiltinMarker::SetLike => {}
    }
    let Some(literal) = builtin.zero_literal.as_deref() else {
        return Value::Opaque(String::new());
    };
    if let Ok(b) = literal.parse::<bool>() {
        Value::Bool(b)
    } else if let Ok(i) = literal.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(f) = literal.parse::<f64>() {
        Value::Float(f)
    } else if let Some(s) = literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Value::Str(s.to_string())
    } else {
        Value::Opaque(literal.to_string())
    }
}

/// Applies synthesized bodies to dynamic values.
pub struct Evaluator<'a> {
    table: &'a TypeTable,
    synthesis: &'a Synthesis,
    classifier: Classifier<'a>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator over one synthesis of `table`.
    #[must_use]
    pub fn new(table: &'a TypeTable, synthesis: &'a Synthesis) -> Self {
        Self {
            table,
            synthesis,
            classifier: Classifier::new(table),
        }
    }

    /// Deep-copies `value` with the generated copy of `type_name`.
    ///
    /// # Errors
    /// Returns `CodegenError::Evaluation` if no copy was generated for the
    /// type or the value does not match its shape.
    pub fn copy(&mut self, type_name: &str, value: &Value) -> Result<Value, CodegenError> {
        let table = self.table;
        let (canonical, _) = table
            .resolve_alias(type_name, "evaluation")
            .map_err(CodegenError::from_schema)?;
        let synthesis = self.synthesis;
        let body = synthesis.copy_body(canonical).ok_or_else(|| {
            CodegenError::evaluation(format!("no copy generated for '{}'", canonical))
        })?;
        self.apply_copy(canonical, body, value)
    }

    /// Evaluates the generated zero predicate of `type_name`.
    ///
    /// # Errors
    /// Returns `CodegenError::Evaluation` if no predicate was generated for
    /// the type or the value does not match its shape.
    pub fn is_zero(&mut self, type_name: &str, value: &Value) -> Result<bool, CodegenError> {
        let table = self.table;
        let (canonical, def) = table
            .resolve_alias(type_name, "evaluation")
            .map_err(CodegenError::from_schema)?;
        let synthesis = self.synthesis;
        let body = synthesis.zero_body(canonical).ok_or_else(|| {
            CodegenError::evaluation(format!("no zero predicate generated for '{}'", canonical))
        })?;

        match body {
            ZeroBody::EqualsZeroValue => {
                Ok(*value == Value::zero_of(table, &TypeRef::named(canonical))?)
            }
            ZeroBody::AllFields(tests) => {
                let TypeDef::Record(record) = def else {
                    return Err(CodegenError::evaluation(format!(
                        "'{}' has field tests but is not a record",
                        canonical
                    )));
                };
                for test in tests {
                    let field_value = field_of(value, &test.name, canonical)?;
                    let type_ref = record.fields.get(&test.name).ok_or_else(|| {
                        CodegenError::evaluation(format!(
                            "'{}' declares no field '{}'",
                            canonical, test.name
                        ))
                    })?;
                    if !self.holds(&test.test, type_ref, field_value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ZeroBody::AllElements(test) => {
                let (TypeDef::FixedSequence { element, .. }, Value::Array(items)) = (def, value)
                else {
                    return Err(CodegenError::evaluation(format!(
                        "value does not match the shape of '{}'",
                        canonical
                    )));
                };
                for item in items {
                    if !self.holds(test, element, item)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Applies one zero test to a constituent of type `type_ref`.
    fn holds(
        &mut self,
        test: &ZeroTest,
        type_ref: &TypeRef,
        value: &Value,
    ) -> Result<bool, CodegenError> {
        Ok(match test {
            ZeroTest::Literal(_) | ZeroTest::ZeroValue(_) => {
                *value == Value::zero_of(self.table, type_ref)?
            }
            ZeroTest::Empty { .. } => value.len() == Some(0),
            ZeroTest::Unset => matches!(value, Value::Capability(None)),
            ZeroTest::Delegate(target) => self.is_zero(target, value)?,
        })
    }

    fn apply_copy(
        &mut self,
        type_name: &str,
        body: &CopyBody,
        value: &Value,
    ) -> Result<Value, CodegenError> {
        match (body, value) {
            (CopyBody::Trivial | CopyBody::Shallow, _) => Ok(value.clone()),
            (
                CopyBody::Sequence {
                    kind: SequenceKind::Dynamic,
                    element,
                },
                Value::Seq(items),
            ) => {
                let items = items.borrow();
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    out.push(self.copy_element(element, item)?);
                }
                Ok(Value::seq(out))
            }
            (
                CopyBody::Sequence {
                    kind: SequenceKind::Fixed(_),
                    element,
                },
                Value::Array(items),
            ) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.copy_element(element, item)?);
                }
                Ok(Value::Array(out))
            }
            (CopyBody::Record { .. }, Value::Record(fields)) => {
                let mut out = fields.clone();
                for field in body.overrides() {
                    let original = field_of(value, &field.name, type_name)?;
                    let copied = self.copy_element(&field.copy, original)?;
                    out.insert(field.name.clone(), copied);
                }
                Ok(Value::Record(out))
            }
            _ => Err(CodegenError::evaluation(format!(
                "value does not match the shape of '{}'",
                type_name
            ))),
        }
    }

    fn copy_element(&mut self, copy: &ElementCopy, value: &Value) -> Result<Value, CodegenError> {
        match copy {
            ElementCopy::Assign => Ok(value.clone()),
            ElementCopy::External(_) => Ok(value.detach()),
            ElementCopy::Helper(target) => self.copy(target, value),
            ElementCopy::Capability(capability) => match value {
                Value::Capability(None) => Ok(Value::Capability(None)),
                Value::Capability(Some(tagged)) => {
                    let copied = self.copy_concrete(&tagged.concrete, &tagged.value)?;
                    Ok(Value::capability(tagged.concrete.clone(), copied))
                }
                _ => Err(CodegenError::evaluation(format!(
                    "expected a '{}' capability slot",
                    capability
                ))),
            },
        }
    }

    /// Copies the concrete value behind a capability through its own type.
    fn copy_concrete(&mut self, concrete: &str, value: &Value) -> Result<Value, CodegenError> {
        if self.synthesis.copy_body(concrete).is_some() {
            return self.copy(concrete, value);
        }
        if self.classifier.is_value_name(concrete, "capability variant")? {
            return Ok(value.clone());
        }
        Err(CodegenError::evaluation(format!(
            "capability variant '{}' has no generated copy",
            concrete
        )))
    }
}

fn field_of<'v>(value: &'v Value, field: &str, owner: &str) -> Result<&'v Value, CodegenError> {
    value.field(field).ok_or_else(|| {
        CodegenError::evaluation(format!("'{}' value has no field '{}'", owner, field))
    })
}
