//! Zero predicate rendering.

use super::{conjunction, ident, type_path};
use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::zero::{ZeroBody, ZeroTest};
use proc_macro2::TokenStream;
use quote::quote;

/// Renders zero predicates.
pub struct ZeroEmitter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> ZeroEmitter<'a> {
    /// Creates a new zero emitter.
    #[must_use]
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Renders the predicate of one type.
    ///
    /// # Errors
    /// Returns `CodegenError` for unrenderable names and literals.
    pub fn predicate(&self, type_name: &str, body: &ZeroBody) -> Result<TokenStream, CodegenError> {
        let ty = ident(type_name)?;
        let method = ident(&self.config.zero_method)?;

        let body = match body {
            ZeroBody::EqualsZeroValue => quote!(*self == Self::default()),
            ZeroBody::AllFields(tests) => {
                let tests = tests
                    .iter()
                    .map(|test| {
                        let field = ident(&test.name)?;
                        self.test(&test.test, quote!(self.#field), false)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                conjunction(tests)
            }
            ZeroBody::AllElements(test) => {
                let test = self.test(test, quote!(k), true)?;
                quote!(self.0.iter().all(|k| #test))
            }
        };

        Ok(quote! {
            impl #ty {
                /// Returns true if no field carries content.
                pub fn #method(&self) -> bool {
                    #body
                }
            }
        })
    }

    /// Renders one test on `place`; `by_ref` places are compared through a
    /// dereference.
    fn test(
        &self,
        test: &ZeroTest,
        place: TokenStream,
        by_ref: bool,
    ) -> Result<TokenStream, CodegenError> {
        let value = if by_ref { quote!(*#place) } else { place.clone() };
        Ok(match test {
            ZeroTest::Literal(literal) => {
                let literal = syn::parse_str::<syn::Expr>(literal).map_err(|_| {
                    CodegenError::InvalidExpression {
                        expr: literal.clone(),
                    }
                })?;
                quote!(#value == #literal)
            }
            ZeroTest::ZeroValue(Some(type_name)) => {
                let ty = type_path(type_name)?;
                quote!(#value == <#ty>::default())
            }
            ZeroTest::ZeroValue(None) => quote!(#value == Default::default()),
            ZeroTest::Empty { newtype: true } => quote!(#place.0.is_empty()),
            ZeroTest::Empty { newtype: false } => quote!(#place.is_empty()),
            ZeroTest::Unset => quote!(#place.is_none()),
            ZeroTest::Delegate(_) => {
                let method = ident(&self.config.zero_method)?;
                quote!(#place.#method())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zero::FieldTest;

    fn render(tokens: TokenStream) -> String {
        tokens.to_string()
    }

    fn test(name: &str, test: ZeroTest) -> FieldTest {
        FieldTest {
            name: name.to_string(),
            test,
        }
    }

    #[test]
    fn test_equals_zero_value() {
        let config = GeneratorConfig::default();
        let code = render(
            ZeroEmitter::new(&config)
                .predicate("Flags", &ZeroBody::EqualsZeroValue)
                .expect("render"),
        );
        syn::parse_file(&code).expect("valid Rust");
        assert!(code.contains(&render(quote!(pub fn is_zero(&self) -> bool))));
        assert!(code.contains(&render(quote!(*self == Self::default()))));
    }

    #[test]
    fn test_field_conjunction() {
        let config = GeneratorConfig::default();
        let body = ZeroBody::AllFields(vec![
            test("depth", ZeroTest::Literal("0".to_string())),
            test("label", ZeroTest::Literal("\"\"".to_string())),
            test("origin", ZeroTest::ZeroValue(Some("Point".to_string()))),
            test("names", ZeroTest::Empty { newtype: true }),
            test("tokens", ZeroTest::Empty { newtype: false }),
            test("image", ZeroTest::Unset),
            test("counter", ZeroTest::Delegate("Counter".to_string())),
        ]);
        let code = render(
            ZeroEmitter::new(&config)
                .predicate("Style", &body)
                .expect("render"),
        );
        syn::parse_file(&code).expect("valid Rust");
        let expected = quote! {
            self.depth == 0
                && self.label == ""
                && self.origin == <Point>::default()
                && self.names.0.is_empty()
                && self.tokens.is_empty()
                && self.image.is_none()
                && self.counter.is_zero()
        };
        assert!(code.contains(&render(expected)));
    }

    #[test]
    fn test_fixed_sequence_element_tests() {
        let config = GeneratorConfig::default();
        let emitter = ZeroEmitter::new(&config);

        let slots = render(
            emitter
                .predicate("Slots", &ZeroBody::AllElements(ZeroTest::Unset))
                .expect("render"),
        );
        syn::parse_file(&slots).expect("valid Rust");
        assert!(slots.contains(&render(quote!(self.0.iter().all(|k| k.is_none())))));
        assert!(!slots.contains("default"));

        let depths = render(
            emitter
                .predicate("Depths", &ZeroBody::AllElements(ZeroTest::Literal("0".to_string())))
                .expect("render"),
        );
        assert!(depths.contains(&render(quote!(self.0.iter().all(|k| *k == 0)))));
    }

    #[test]
    fn test_empty_record_is_always_zero() {
        let config = GeneratorConfig::default();
        let code = render(
            ZeroEmitter::new(&config)
                .predicate("Unit", &ZeroBody::AllFields(Vec::new()))
                .expect("render"),
        );
        assert!(code.contains("true"));
    }

    #[test]
    fn test_invalid_literal() {
        let config = GeneratorConfig::default();
        let body = ZeroBody::AllFields(vec![test("x", ZeroTest::Literal("0 +".to_string()))]);
        let err = ZeroEmitter::new(&config)
            .predicate("Bad", &body)
            .expect_err("literal");
        assert!(matches!(err, CodegenError::InvalidExpression { .. }));
    }

    #[test]
    fn test_custom_zero_method() {
        let config = GeneratorConfig::default().zero_method("is_none");
        let body = ZeroBody::AllFields(vec![test("inner", ZeroTest::Delegate("Inner".to_string()))]);
        let code = render(
            ZeroEmitter::new(&config)
                .predicate("Outer", &body)
                .expect("render"),
        );
        assert!(code.contains(&render(quote!(pub fn is_none(&self) -> bool))));
        assert!(code.contains(&render(quote!(self.inner.is_none()))));
    }
}
