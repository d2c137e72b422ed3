//! Deep-copy body synthesis.
//!
//! Produces the structure of a copy method for one type and queues every
//! constituent that needs its own private copy helper.

use crate::classify::Classifier;
use crate::error::CodegenError;
use crate::worklist::Worklist;
use clonegen_schema::{BuiltinMarker, TypeDef, TypeRef};

/// How a single element or field is duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementCopy {
    /// Plain assignment; the constituent is a value type.
    Assign,
    /// Call the constituent type's own copy helper.
    Helper(String),
    /// Concrete-preserving clone through the named capability.
    Capability(String),
    /// External owned collection duplicated by its own clone.
    External(String),
}

impl ElementCopy {
    /// Returns the capability this copy dispatches through, if any.
    #[must_use]
    pub fn capability(&self) -> Option<&str> {
        match self {
            Self::Capability(name) => Some(name),
            _ => None,
        }
    }
}

/// Sequence flavour of a sequence copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Growable sequence.
    Dynamic,
    /// Sequence of fixed arity.
    Fixed(usize),
}

/// One field of a record copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCopy {
    /// Field name.
    pub name: String,
    /// How the field is duplicated.
    pub copy: ElementCopy,
}

/// Synthesized deep-copy body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyBody {
    /// Builtin; copied by its own mechanism, no body is generated.
    Trivial,
    /// Plain structural duplication.
    Shallow,
    /// New sequence of equal length, copied element by element.
    Sequence {
        /// Sequence flavour.
        kind: SequenceKind,
        /// Element copy.
        element: ElementCopy,
    },
    /// Shallow duplication with reference-typed fields overwritten.
    ///
    /// Every field is listed in declaration order; `Assign` fields are the
    /// ones covered by the shallow duplication.
    Record {
        /// Fields in declaration order.
        fields: Vec<FieldCopy>,
    },
}

impl CopyBody {
    /// Returns true if the body never allocates.
    #[must_use]
    pub fn is_shallow(&self) -> bool {
        matches!(self, Self::Shallow)
    }

    /// Returns the fields whose copy overrides the shallow duplication.
    pub fn overrides(&self) -> impl Iterator<Item = &FieldCopy> {
        let fields: &[FieldCopy] = match self {
            Self::Record { fields } => fields,
            _ => &[],
        };
        fields.iter().filter(|f| f.copy != ElementCopy::Assign)
    }

    /// Returns the capabilities whose clone operation this body calls.
    #[must_use]
    pub fn capabilities(&self) -> Vec<&str> {
        match self {
            Self::Sequence { element, .. } => element.capability().into_iter().collect(),
            Self::Record { fields } => fields.iter().filter_map(|f| f.copy.capability()).collect(),
            Self::Trivial | Self::Shallow => Vec::new(),
        }
    }
}

/// Synthesizes the copy body of `name`.
///
/// Constituents needing their own copy helper are pushed onto `pending`.
/// Aliases are transparent: the body is the one of the canonical target.
///
/// # Errors
/// Returns `CodegenError::UnsupportedShape` for capability types and for
/// anonymous reference-typed records, and propagates classification
/// errors.
pub fn synthesize_copy(
    classifier: &mut Classifier<'_>,
    name: &str,
    pending: &mut Worklist,
) -> Result<CopyBody, CodegenError> {
    let table = classifier.table();
    let (canonical, def) = table
        .resolve_alias(name, "copy request")
        .map_err(CodegenError::from_schema)?;

    if let TypeDef::Builtin(builtin) = def {
        if builtin.marker == BuiltinMarker::Capability {
            return Err(CodegenError::unsupported(
                canonical,
                "capability types are copied through their own clone operation",
            ));
        }
        return Ok(CopyBody::Trivial);
    }

    if classifier.is_value_name(canonical, "copy request")? {
        return Ok(CopyBody::Shallow);
    }

    match def {
        TypeDef::DynamicSequence(element) => Ok(CopyBody::Sequence {
            kind: SequenceKind::Dynamic,
            element: element_copy(classifier, element, canonical, "element", pending)?,
        }),
        TypeDef::FixedSequence { length, element } => Ok(CopyBody::Sequence {
            kind: SequenceKind::Fixed(*length),
            element: element_copy(classifier, element, canonical, "element", pending)?,
        }),
        TypeDef::Record(record) => {
            let mut fields = Vec::with_capacity(record.len());
            for (field, type_ref) in &record.fields {
                let copy = element_copy(classifier, type_ref, canonical, field, pending)?;
                fields.push(FieldCopy {
                    name: field.clone(),
                    copy,
                });
            }
            Ok(CopyBody::Record { fields })
        }
        TypeDef::Builtin(_) | TypeDef::Alias(_) => Err(CodegenError::unsupported(
            canonical,
            format!("no copy rule for {}", def.kind_name()),
        )),
    }
}

/// Decides how one constituent of `owner` is duplicated.
fn element_copy(
    classifier: &mut Classifier<'_>,
    type_ref: &TypeRef,
    owner: &str,
    slot: &str,
    pending: &mut Worklist,
) -> Result<ElementCopy, CodegenError> {
    let context = format!("{} '{}' of '{}'", slot_kind(slot), slot, owner);
    if classifier.is_value_type(type_ref, &context)? {
        return Ok(ElementCopy::Assign);
    }

    let target = match type_ref {
        TypeRef::Named(target) => target,
        TypeRef::Inline(_) => {
            return Err(CodegenError::unsupported(
                owner,
                format!("{} must be a named type to carry a copy helper", context),
            ));
        }
    };

    let (canonical, def) = classifier
        .table()
        .resolve_alias(target, &context)
        .map_err(CodegenError::from_schema)?;

    Ok(match def {
        TypeDef::Builtin(builtin) if builtin.marker == BuiltinMarker::Capability => {
            ElementCopy::Capability(canonical.to_string())
        }
        TypeDef::Builtin(_) => ElementCopy::External(canonical.to_string()),
        _ => {
            if pending.require(canonical, owner) {
                tracing::trace!("Queued private copy of '{}' for {}", canonical, context);
            }
            ElementCopy::Helper(canonical.to_string())
        }
    })
}

fn slot_kind(slot: &str) -> &'static str {
    if slot == "element" { "element" } else { "field" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clonegen_schema::{BuiltinDef, RecordDef, TypeTable};

    fn table() -> TypeTable {
        TypeTable::with_primitives()
            .with("Tokens", BuiltinDef::marked(BuiltinMarker::SequenceOfExternal))
            .and_then(|t| t.with("Image", TypeDef::capability()))
            .and_then(|t| t.with("Images", TypeDef::dynamic("Image")))
            .and_then(|t| t.with("B", RecordDef::new().field("z", "String")))
            .and_then(|t| t.with("Bs", TypeDef::dynamic("B")))
            .and_then(|t| {
                t.with(
                    "A",
                    RecordDef::new().field("x", "i32").field("y", "Bs"),
                )
            })
            .and_then(|t| t.with("C", TypeDef::fixed(3, "bool")))
            .and_then(|t| t.with("Pair", TypeDef::fixed(2, "Bs")))
            .and_then(|t| t.with("BList", TypeDef::alias("Bs")))
            .and_then(|t| {
                t.with(
                    "Background",
                    RecordDef::new()
                        .field("image", "Image")
                        .field("tokens", "Tokens")
                        .field("layers", "BList")
                        .field("opacity", "f32"),
                )
            })
            .expect("table")
    }

    #[test]
    fn test_value_type_is_shallow() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_copy(&mut classifier, "C", &mut pending).expect("C");
        assert!(body.is_shallow());
        assert!(pending.is_empty());

        let body = synthesize_copy(&mut classifier, "B", &mut pending).expect("B");
        assert_eq!(body, CopyBody::Shallow);
    }

    #[test]
    fn test_builtin_is_trivial() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_copy(&mut classifier, "i32", &mut pending).expect("i32");
        assert_eq!(body, CopyBody::Trivial);
    }

    #[test]
    fn test_capability_request_is_unsupported() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let err = synthesize_copy(&mut classifier, "Image", &mut pending).expect_err("capability");
        assert!(matches!(err, CodegenError::UnsupportedShape { .. }));
    }

    #[test]
    fn test_record_overrides_reference_fields() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_copy(&mut classifier, "A", &mut pending).expect("A");

        let overrides: Vec<&FieldCopy> = body.overrides().collect();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].name, "y");
        assert_eq!(overrides[0].copy, ElementCopy::Helper("Bs".to_string()));
        assert_eq!(pending.pending(), ["Bs"]);
    }

    #[test]
    fn test_dynamic_sequence_of_values() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_copy(&mut classifier, "Bs", &mut pending).expect("Bs");
        assert_eq!(
            body,
            CopyBody::Sequence {
                kind: SequenceKind::Dynamic,
                element: ElementCopy::Assign,
            }
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn test_fixed_sequence_of_references() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_copy(&mut classifier, "Pair", &mut pending).expect("Pair");
        assert_eq!(
            body,
            CopyBody::Sequence {
                kind: SequenceKind::Fixed(2),
                element: ElementCopy::Helper("Bs".to_string()),
            }
        );
        assert!(pending.is_pending("Bs"));
    }

    #[test]
    fn test_capability_elements_and_fields() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();

        let body = synthesize_copy(&mut classifier, "Images", &mut pending).expect("Images");
        assert_eq!(body.capabilities(), ["Image"]);
        assert!(!pending.is_pending("Image"));

        let body = synthesize_copy(&mut classifier, "Background", &mut pending).expect("bg");
        let copies: Vec<&ElementCopy> = body.overrides().map(|f| &f.copy).collect();
        assert_eq!(
            copies,
            [
                &ElementCopy::Capability("Image".to_string()),
                &ElementCopy::External("Tokens".to_string()),
                &ElementCopy::Helper("Bs".to_string()),
            ]
        );
        assert_eq!(pending.pending(), ["Bs"]);
    }

    #[test]
    fn test_alias_request_resolves_to_target() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let via_alias = synthesize_copy(&mut classifier, "BList", &mut pending).expect("alias");
        let direct = synthesize_copy(&mut classifier, "Bs", &mut pending).expect("direct");
        assert_eq!(via_alias, direct);
    }

    #[test]
    fn test_inline_reference_record_is_unsupported() {
        let table = TypeTable::with_primitives()
            .with("Names", TypeDef::dynamic("String"))
            .and_then(|t| {
                t.with(
                    "Outer",
                    RecordDef::new().field("inner", RecordDef::new().field("names", "Names")),
                )
            })
            .expect("table");
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let err = synthesize_copy(&mut classifier, "Outer", &mut pending).expect_err("inline");
        match err {
            CodegenError::UnsupportedShape { type_name, reason } => {
                assert_eq!(type_name, "Outer");
                assert!(reason.contains("inner"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
