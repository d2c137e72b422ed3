//! Rust rendering of synthesized bodies.
//!
//! Methods attach to the types of the table with this shape: records are
//! structs with the same field names, named sequences are newtypes over
//! `Vec<T>` or `[T; N]`, aliases are transparent `type` aliases and
//! capability slots are `Option<Box<dyn Capability>>`.

pub mod copy;
pub mod zero;

pub use copy::CopyEmitter;
pub use zero::ZeroEmitter;

use crate::closure::{MethodBody, MethodFamily, Synthesis};
use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use proc_macro2::{Ident, TokenStream};

/// Header prepended to rendered sources.
pub const GENERATED_HEADER: &str = "// @generated by clonegen. Do not edit.\n";

/// One rendered method block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedMethod {
    /// Type the block is attached to.
    pub type_name: String,
    /// Method family.
    pub family: MethodFamily,
    /// True if the type was reached as a dependency rather than a root.
    pub discovered: bool,
    /// Rendered Rust source.
    pub code: String,
}

/// Clone operation a capability must declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityClone {
    /// Capability trait name.
    pub capability: String,
    /// Clone method name.
    pub method: String,
}

impl CapabilityClone {
    /// Returns the signature every concrete variant implements.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("fn {}(&self) -> Box<dyn {}>", self.method, self.capability)
    }
}

/// Rendered output of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    /// Method blocks in emission order.
    pub methods: Vec<EmittedMethod>,
    /// Capability clone operations the blocks call.
    pub capabilities: Vec<CapabilityClone>,
}

impl GeneratedCode {
    /// Concatenates every block into one source file.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut output = String::from(GENERATED_HEADER);
        for capability in &self.capabilities {
            output.push_str(&format!(
                "// requires `{}` on `{}`\n",
                capability.signature(),
                capability.capability
            ));
        }
        for method in &self.methods {
            output.push('\n');
            output.push_str(&method.code);
            output.push('\n');
        }
        output
    }

    /// Returns the blocks of one family.
    pub fn family(&self, family: MethodFamily) -> impl Iterator<Item = &EmittedMethod> {
        self.methods.iter().filter(move |m| m.family == family)
    }
}

/// Renders a whole synthesis.
pub struct RustEmitter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> RustEmitter<'a> {
    /// Creates a new emitter.
    #[must_use]
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Renders every synthesized method.
    ///
    /// # Errors
    /// Returns `CodegenError` if a name or literal cannot be rendered as Rust.
    pub fn emit(&self, synthesis: &Synthesis) -> Result<GeneratedCode, CodegenError> {
        let copies = CopyEmitter::new(self.config);
        let zeros = ZeroEmitter::new(self.config);

        let mut methods = Vec::with_capacity(synthesis.methods.len());
        for method in &synthesis.methods {
            let tokens = match (&method.family, &method.body) {
                (MethodFamily::PublicCopy, MethodBody::Copy(body)) => {
                    copies.public(&method.type_name, body)?
                }
                (MethodFamily::PrivateCopy, MethodBody::Copy(body)) => {
                    copies.private(&method.type_name, body)?
                }
                (MethodFamily::ZeroPredicate, MethodBody::Zero(body)) => {
                    zeros.predicate(&method.type_name, body)?
                }
                (family, _) => {
                    return Err(CodegenError::unsupported(
                        &method.type_name,
                        format!("body does not belong to the {} family", family),
                    ));
                }
            };
            methods.push(EmittedMethod {
                type_name: method.type_name.clone(),
                family: method.family,
                discovered: method.discovered,
                code: tokens.to_string(),
            });
        }

        let capabilities = synthesis
            .capabilities
            .iter()
            .map(|capability| CapabilityClone {
                capability: capability.clone(),
                method: self.config.capability_clone_method(capability),
            })
            .collect();

        Ok(GeneratedCode {
            methods,
            capabilities,
        })
    }
}

/// Parses a name as a Rust identifier.
pub(crate) fn ident(name: &str) -> Result<Ident, CodegenError> {
    syn::parse_str::<Ident>(name).map_err(|_| CodegenError::InvalidIdentifier {
        name: name.to_string(),
    })
}

/// Parses a name as a Rust type.
pub(crate) fn type_path(name: &str) -> Result<syn::Type, CodegenError> {
    syn::parse_str::<syn::Type>(name).map_err(|_| CodegenError::InvalidIdentifier {
        name: name.to_string(),
    })
}

/// Joins boolean expressions with `&&`, `true` when empty.
pub(crate) fn conjunction(tests: Vec<TokenStream>) -> TokenStream {
    let mut iter = tests.into_iter();
    let Some(first) = iter.next() else {
        return quote::quote!(true);
    };
    iter.fold(first, |acc, test| quote::quote!(#acc && #test))
}
