//! Identifier helpers shared by validation and emission.

/// Converts a string to snake_case.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c == '-' || c == ' ' {
            result.push('_');
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    result
}

/// Returns true if `name` parses as a plain (non-keyword) Rust identifier.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    syn::parse_str::<syn::Ident>(name).is_ok()
}
