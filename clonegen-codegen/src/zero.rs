//! Zero-predicate synthesis.
//!
//! Produces the structure of an "is zero" test for one type and queues the
//! field types whose own predicate it delegates to.

use crate::classify::Classifier;
use crate::error::CodegenError;
use crate::worklist::Worklist;
use clonegen_schema::{BuiltinMarker, RecordDef, TypeDef, TypeRef};

/// Test applied to one record field or sequence element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZeroTest {
    /// Equality against a builtin's zero literal.
    Literal(String),
    /// Equality against the type's zero value; `None` for anonymous records.
    ZeroValue(Option<String>),
    /// Dynamic sequence is empty. `newtype` is true for named sequences
    /// wrapping their storage.
    Empty {
        /// Whether the storage sits behind a newtype.
        newtype: bool,
    },
    /// Capability slot is unset.
    Unset,
    /// Delegate to the field type's own predicate.
    Delegate(String),
}

impl ZeroTest {
    /// Returns the type whose predicate this test calls, if any.
    #[must_use]
    pub fn delegate(&self) -> Option<&str> {
        match self {
            Self::Delegate(name) => Some(name),
            _ => None,
        }
    }
}

/// One field test of a record predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTest {
    /// Field name.
    pub name: String,
    /// Test applied to the field.
    pub test: ZeroTest,
}

/// Synthesized zero-predicate body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZeroBody {
    /// The whole value equals the type's zero value.
    EqualsZeroValue,
    /// Conjunction of per-field tests, in declaration order.
    AllFields(Vec<FieldTest>),
    /// Every element of a fixed sequence passes the same test.
    AllElements(ZeroTest),
}

impl ZeroBody {
    /// Returns the types whose predicate this body calls.
    #[must_use]
    pub fn delegates(&self) -> Vec<&str> {
        match self {
            Self::EqualsZeroValue => Vec::new(),
            Self::AllFields(tests) => tests.iter().filter_map(|t| t.test.delegate()).collect(),
            Self::AllElements(test) => test.delegate().into_iter().collect(),
        }
    }
}

/// Synthesizes the zero predicate of `name`.
///
/// Returns `None` for aliases and dynamic sequences, which have no
/// predicate of their own. Delegated field and element types are pushed
/// onto `pending`.
///
/// # Errors
/// Returns `CodegenError::UnsupportedShape` when asked for a builtin or a
/// capability type, or when a reference-typed field or element is an
/// anonymous record.
pub fn synthesize_zero(
    classifier: &mut Classifier<'_>,
    name: &str,
    pending: &mut Worklist,
) -> Result<Option<ZeroBody>, CodegenError> {
    let table = classifier.table();
    let def = table
        .lookup(name, "zero-predicate request")
        .map_err(CodegenError::from_schema)?;

    match def {
        TypeDef::Builtin(builtin) => Err(CodegenError::unsupported(
            name,
            format!(
                "no zero predicate for {} builtins",
                builtin.marker.as_str()
            ),
        )),
        TypeDef::Alias(_) | TypeDef::DynamicSequence(_) => Ok(None),
        TypeDef::FixedSequence { element, .. } => {
            if classifier.is_value_name(name, "zero-predicate request")? {
                return Ok(Some(ZeroBody::EqualsZeroValue));
            }
            let context = format!("element of '{}'", name);
            field_test(classifier, element, &context, name, pending)
                .map(|test| Some(ZeroBody::AllElements(test)))
        }
        TypeDef::Record(record) => {
            if classifier.is_value_name(name, "zero-predicate request")? {
                Ok(Some(ZeroBody::EqualsZeroValue))
            } else {
                record_tests(classifier, record, name, pending)
                    .map(|tests| Some(ZeroBody::AllFields(tests)))
            }
        }
    }
}

fn record_tests(
    classifier: &mut Classifier<'_>,
    record: &RecordDef,
    owner: &str,
    pending: &mut Worklist,
) -> Result<Vec<FieldTest>, CodegenError> {
    let mut tests = Vec::with_capacity(record.len());
    for (field, type_ref) in &record.fields {
        let context = format!("field '{}' of '{}'", field, owner);
        let test = field_test(classifier, type_ref, &context, owner, pending)?;
        tests.push(FieldTest {
            name: field.clone(),
            test,
        });
    }
    Ok(tests)
}

/// Picks the cheapest applicable test for one field or element.
fn field_test(
    classifier: &mut Classifier<'_>,
    type_ref: &TypeRef,
    context: &str,
    owner: &str,
    pending: &mut Worklist,
) -> Result<ZeroTest, CodegenError> {
    let target = match type_ref {
        TypeRef::Named(target) => target,
        TypeRef::Inline(_) => {
            if classifier.is_value_type(type_ref, context)? {
                return Ok(ZeroTest::ZeroValue(None));
            }
            return Err(CodegenError::unsupported(
                owner,
                format!("{} must be a named type to carry a zero predicate", context),
            ));
        }
    };

    let (canonical, def) = classifier
        .table()
        .resolve_alias(target, context)
        .map_err(CodegenError::from_schema)?;

    if let TypeDef::Builtin(builtin) = def
        && let Some(literal) = &builtin.zero_literal
    {
        return Ok(ZeroTest::Literal(literal.clone()));
    }

    if classifier.is_value_name(canonical, context)? {
        return Ok(ZeroTest::ZeroValue(Some(canonical.to_string())));
    }

    match def {
        TypeDef::DynamicSequence(_) => Ok(ZeroTest::Empty { newtype: true }),
        TypeDef::Builtin(builtin) if builtin.marker == BuiltinMarker::SequenceOfExternal => {
            Ok(ZeroTest::Empty { newtype: false })
        }
        TypeDef::Builtin(_) => Ok(ZeroTest::Unset),
        _ => {
            if pending.require(canonical, owner) {
                tracing::trace!("Queued zero predicate of '{}' for {}", canonical, context);
            }
            Ok(ZeroTest::Delegate(canonical.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clonegen_schema::{BuiltinDef, TypeTable};

    fn table() -> TypeTable {
        TypeTable::with_primitives()
            .with("Color", BuiltinDef::value())
            .and_then(|t| t.with("Tokens", BuiltinDef::marked(BuiltinMarker::SequenceOfExternal)))
            .and_then(|t| t.with("Image", TypeDef::capability()))
            .and_then(|t| t.with("Flags", TypeDef::fixed(3, "bool")))
            .and_then(|t| t.with("Slots", TypeDef::fixed(2, "Image")))
            .and_then(|t| t.with("Shelves", TypeDef::fixed(2, "NameList")))
            .and_then(|t| t.with("Names", TypeDef::dynamic("String")))
            .and_then(|t| t.with("NameList", TypeDef::alias("Names")))
            .and_then(|t| t.with("Depth", TypeDef::alias("i32")))
            .and_then(|t| t.with("Point", RecordDef::new().field("x", "f32").field("y", "f32")))
            .and_then(|t| {
                t.with(
                    "Counter",
                    RecordDef::new().field("name", "String").field("values", "Names"),
                )
            })
            .and_then(|t| {
                t.with(
                    "Style",
                    RecordDef::new()
                        .field("depth", "Depth")
                        .field("color", "Color")
                        .field("origin", "Point")
                        .field("names", "NameList")
                        .field("tokens", "Tokens")
                        .field("image", "Image")
                        .field("counter", "Counter"),
                )
            })
            .expect("table")
    }

    #[test]
    fn test_fixed_sequence_compares_to_zero_value() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_zero(&mut classifier, "Flags", &mut pending).expect("Flags");
        assert_eq!(body, Some(ZeroBody::EqualsZeroValue));
    }

    #[test]
    fn test_fixed_sequence_of_references_tests_each_element() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let slots = synthesize_zero(&mut classifier, "Slots", &mut pending).expect("Slots");
        assert_eq!(slots, Some(ZeroBody::AllElements(ZeroTest::Unset)));
        let shelves = synthesize_zero(&mut classifier, "Shelves", &mut pending).expect("Shelves");
        assert_eq!(
            shelves,
            Some(ZeroBody::AllElements(ZeroTest::Empty { newtype: true }))
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn test_value_record_compares_to_zero_value() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_zero(&mut classifier, "Point", &mut pending).expect("Point");
        assert_eq!(body, Some(ZeroBody::EqualsZeroValue));
    }

    #[test]
    fn test_no_predicate_for_sequences_and_aliases() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        assert_eq!(
            synthesize_zero(&mut classifier, "Names", &mut pending).expect("Names"),
            None
        );
        assert_eq!(
            synthesize_zero(&mut classifier, "NameList", &mut pending).expect("NameList"),
            None
        );
    }

    #[test]
    fn test_builtin_request_is_unsupported() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        for name in ["i32", "Image"] {
            let err = synthesize_zero(&mut classifier, name, &mut pending).expect_err(name);
            assert!(matches!(err, CodegenError::UnsupportedShape { .. }));
        }
    }

    #[test]
    fn test_reference_record_field_tests() {
        let table = table();
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_zero(&mut classifier, "Style", &mut pending)
            .expect("Style")
            .expect("predicate");

        let tests = match body {
            ZeroBody::AllFields(tests) => tests,
            other => panic!("unexpected body: {:?}", other),
        };
        let by_field: Vec<(&str, &ZeroTest)> =
            tests.iter().map(|t| (t.name.as_str(), &t.test)).collect();
        assert_eq!(
            by_field,
            [
                ("depth", &ZeroTest::Literal("0".to_string())),
                ("color", &ZeroTest::ZeroValue(Some("Color".to_string()))),
                ("origin", &ZeroTest::ZeroValue(Some("Point".to_string()))),
                ("names", &ZeroTest::Empty { newtype: true }),
                ("tokens", &ZeroTest::Empty { newtype: false }),
                ("image", &ZeroTest::Unset),
                ("counter", &ZeroTest::Delegate("Counter".to_string())),
            ]
        );
        assert_eq!(pending.pending(), ["Counter"]);
        assert_eq!(pending.requester("Counter"), Some("Style"));
    }

    #[test]
    fn test_inline_value_record_field() {
        let table = TypeTable::with_primitives()
            .with("Names", TypeDef::dynamic("String"))
            .and_then(|t| {
                t.with(
                    "Outer",
                    RecordDef::new()
                        .field("names", "Names")
                        .field("inner", RecordDef::new().field("a", "i32")),
                )
            })
            .expect("table");
        let mut classifier = Classifier::new(&table);
        let mut pending = Worklist::new();
        let body = synthesize_zero(&mut classifier, "Outer", &mut pending)
            .expect("Outer")
            .expect("predicate");
        match body {
            ZeroBody::AllFields(tests) => {
                assert_eq!(tests[1].test, ZeroTest::ZeroValue(None));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }
}
