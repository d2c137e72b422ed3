//! Type table validation utilities.
//!
//! This module checks that a table is closed, that every record and field
//! name can be emitted as a Rust identifier, and that no type contains
//! itself by value.

use crate::error::SchemaError;
use crate::naming::is_valid_identifier;
use crate::types::{RecordDef, TypeDef, TypeRef, TypeTable};
use std::collections::HashSet;

/// Validates a type table for correctness.
///
/// # Arguments
/// * `table` - The table to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the issue.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_table(table: &TypeTable) -> Result<(), SchemaError> {
    validate_references(table)?;
    validate_identifiers(table)?;
    validate_containment(table)?;
    Ok(())
}

/// Checks that every reference resolves inside the table.
fn validate_references(table: &TypeTable) -> Result<(), SchemaError> {
    for (name, def) in table.iter() {
        match def {
            TypeDef::Builtin(_) => {}
            TypeDef::Alias(target) => {
                table.lookup(target, &format!("alias '{}'", name))?;
            }
            TypeDef::FixedSequence { element, .. } | TypeDef::DynamicSequence(element) => {
                validate_ref(table, element, &format!("element of '{}'", name))?;
            }
            TypeDef::Record(record) => {
                validate_record_refs(table, record, name)?;
            }
        }
    }
    Ok(())
}

fn validate_ref(table: &TypeTable, type_ref: &TypeRef, context: &str) -> Result<(), SchemaError> {
    match type_ref {
        TypeRef::Named(target) => table.lookup(target, context).map(|_| ()),
        TypeRef::Inline(record) => validate_record_refs(table, record, context),
    }
}

fn validate_record_refs(
    table: &TypeTable,
    record: &RecordDef,
    owner: &str,
) -> Result<(), SchemaError> {
    for (field, type_ref) in &record.fields {
        validate_ref(
            table,
            type_ref,
            &format!("field '{}' of '{}'", field, owner),
        )?;
    }
    Ok(())
}

/// Checks that names the emitter turns into identifiers are valid.
///
/// Builtin names are exempt: they are spelled by the table author and
/// rendered as type paths.
fn validate_identifiers(table: &TypeTable) -> Result<(), SchemaError> {
    for (name, def) in table.iter() {
        if def.is_builtin() {
            continue;
        }
        if !is_valid_identifier(name) {
            return Err(SchemaError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        if let TypeDef::Record(record) = def {
            validate_field_names(record)?;
        }
    }
    Ok(())
}

fn validate_field_names(record: &RecordDef) -> Result<(), SchemaError> {
    for (field, type_ref) in &record.fields {
        if !is_valid_identifier(field) {
            return Err(SchemaError::InvalidIdentifier {
                name: field.clone(),
            });
        }
        if let TypeRef::Inline(inner) = type_ref {
            validate_field_names(inner)?;
        }
    }
    Ok(())
}

/// Rejects types that contain themselves by value.
///
/// Containment edges follow aliases, fixed sequence elements and record
/// fields. A dynamic sequence owns its elements behind a heap pointer and
/// breaks the cycle.
fn validate_containment(table: &TypeTable) -> Result<(), SchemaError> {
    let mut finished: HashSet<&str> = HashSet::new();
    for name in table.names() {
        let mut path = Vec::new();
        visit_containment(table, name, &mut path, &mut finished)?;
    }
    Ok(())
}

fn visit_containment<'a>(
    table: &'a TypeTable,
    name: &'a str,
    path: &mut Vec<&'a str>,
    finished: &mut HashSet<&'a str>,
) -> Result<(), SchemaError> {
    if finished.contains(name) {
        return Ok(());
    }
    if path.contains(&name) {
        path.push(name);
        let start = path.iter().position(|n| *n == name).unwrap_or(0);
        return Err(SchemaError::circular(&path[start..]));
    }

    path.push(name);
    let def = table.lookup(name, "containment check")?;
    match def {
        TypeDef::Builtin(_) | TypeDef::DynamicSequence(_) => {}
        TypeDef::Alias(target) => visit_containment(table, target, path, finished)?,
        TypeDef::FixedSequence { element, .. } => {
            visit_contained_ref(table, element, path, finished)?;
        }
        TypeDef::Record(record) => visit_contained_record(table, record, path, finished)?,
    }
    path.pop();
    finished.insert(name);
    Ok(())
}

fn visit_contained_ref<'a>(
    table: &'a TypeTable,
    type_ref: &'a TypeRef,
    path: &mut Vec<&'a str>,
    finished: &mut HashSet<&'a str>,
) -> Result<(), SchemaError> {
    match type_ref {
        TypeRef::Named(target) => visit_containment(table, target, path, finished),
        TypeRef::Inline(record) => visit_contained_record(table, record, path, finished),
    }
}

fn visit_contained_record<'a>(
    table: &'a TypeTable,
    record: &'a RecordDef,
    path: &mut Vec<&'a str>,
    finished: &mut HashSet<&'a str>,
) -> Result<(), SchemaError> {
    for type_ref in record.fields.values() {
        visit_contained_ref(table, type_ref, path, finished)?;
    }
    Ok(())
}
