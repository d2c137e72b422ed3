//! Copy method rendering.

use super::ident;
use crate::config::GeneratorConfig;
use crate::copy::{CopyBody, ElementCopy, SequenceKind};
use crate::error::CodegenError;
use proc_macro2::TokenStream;
use quote::quote;

/// Renders public and private copy methods.
pub struct CopyEmitter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> CopyEmitter<'a> {
    /// Creates a new copy emitter.
    #[must_use]
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Renders the public copy of a root type.
    ///
    /// The typed copy is public and, when a public trait is configured, the
    /// trait implementation boxes it.
    ///
    /// # Errors
    /// Returns `CodegenError` for trivial bodies and unrenderable names.
    pub fn public(&self, type_name: &str, body: &CopyBody) -> Result<TokenStream, CodegenError> {
        let ty = ident(type_name)?;
        let method = ident(&self.config.private_method)?;
        let body = self.body(type_name, body)?;

        let mut output = quote! {
            impl #ty {
                /// Returns a deep copy of this value.
                pub fn #method(&self) -> Self {
                    #body
                }
            }
        };

        if let Some(public_trait) = &self.config.public_trait {
            let public_trait = ident(public_trait)?;
            let public_method = ident(&self.config.public_method)?;
            output.extend(quote! {
                impl #public_trait for #ty {
                    fn #public_method(&self) -> Box<dyn #public_trait> {
                        Box::new(self.#method())
                    }
                }
            });
        }

        Ok(output)
    }

    /// Renders a crate-private copy helper.
    ///
    /// # Errors
    /// Returns `CodegenError` for trivial bodies and unrenderable names.
    pub fn private(&self, type_name: &str, body: &CopyBody) -> Result<TokenStream, CodegenError> {
        let ty = ident(type_name)?;
        let method = ident(&self.config.private_method)?;
        let body = self.body(type_name, body)?;

        Ok(quote! {
            impl #ty {
                pub(crate) fn #method(&self) -> Self {
                    #body
                }
            }
        })
    }

    fn body(&self, type_name: &str, body: &CopyBody) -> Result<TokenStream, CodegenError> {
        match body {
            CopyBody::Trivial => Err(CodegenError::unsupported(
                type_name,
                "builtins are copied by their own mechanism",
            )),
            CopyBody::Shallow => Ok(quote!(self.clone())),
            CopyBody::Sequence { kind, element } => {
                let element = self.element(element, quote!(k))?;
                Ok(match kind {
                    SequenceKind::Dynamic => quote! {
                        Self(self.0.iter().map(|k| #element).collect())
                    },
                    SequenceKind::Fixed(_) => quote! {
                        Self(self.0.each_ref().map(|k| #element))
                    },
                })
            }
            CopyBody::Record { fields } => {
                let mut inits = Vec::with_capacity(fields.len());
                for field in fields {
                    let name = ident(&field.name)?;
                    let value = self.element(&field.copy, quote!(self.#name))?;
                    inits.push(quote!(#name: #value));
                }
                Ok(quote! {
                    Self {
                        #(#inits,)*
                    }
                })
            }
        }
    }

    fn element(&self, copy: &ElementCopy, receiver: TokenStream) -> Result<TokenStream, CodegenError> {
        Ok(match copy {
            ElementCopy::Assign | ElementCopy::External(_) => quote!(#receiver.clone()),
            ElementCopy::Helper(_) => {
                let method = ident(&self.config.private_method)?;
                quote!(#receiver.#method())
            }
            ElementCopy::Capability(capability) => {
                let method = ident(&self.config.capability_clone_method(capability))?;
                quote!(#receiver.as_ref().map(|v| v.#method()))
            }
        })
    }
}
