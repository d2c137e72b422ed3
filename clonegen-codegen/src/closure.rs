//! Dependency closure over the copy and zero-predicate method families.
//!
//! Roots receive a public copy and a predicate. Every type a generated body
//! calls into is then drained through its family's worklist until the
//! closure is complete.

use crate::classify::Classifier;
use crate::config::GeneratorConfig;
use crate::copy::{CopyBody, synthesize_copy};
use crate::error::CodegenError;
use crate::worklist::Worklist;
use crate::zero::{ZeroBody, synthesize_zero};
use clonegen_schema::{TypeDef, TypeRef, TypeTable, validate_table};
use indexmap::IndexSet;
use std::collections::HashSet;
use std::fmt;

/// Family a generated method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodFamily {
    /// Public copy of a root type.
    PublicCopy,
    /// Crate-private copy helper.
    PrivateCopy,
    /// Zero predicate.
    ZeroPredicate,
}

impl fmt::Display for MethodFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PublicCopy => "public copy",
            Self::PrivateCopy => "private copy",
            Self::ZeroPredicate => "zero predicate",
        };
        f.write_str(name)
    }
}

/// Synthesized body of either family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodBody {
    /// Deep-copy body.
    Copy(CopyBody),
    /// Zero-predicate body.
    Zero(ZeroBody),
}

/// One synthesized method with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedMethod {
    /// Canonical type name the method is attached to.
    pub type_name: String,
    /// Method family.
    pub family: MethodFamily,
    /// Synthesized body.
    pub body: MethodBody,
    /// True if the type was reached as a dependency rather than a root.
    pub discovered: bool,
}

/// Result of one closure run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesis {
    /// Methods in emission order.
    pub methods: Vec<SynthesizedMethod>,
    /// Capabilities whose clone operation generated bodies call.
    pub capabilities: IndexSet<String>,
}

impl Synthesis {
    /// Returns the method of `family` attached to `type_name`.
    #[must_use]
    pub fn find(&self, type_name: &str, family: MethodFamily) -> Option<&SynthesizedMethod> {
        self.methods
            .iter()
            .find(|m| m.type_name == type_name && m.family == family)
    }

    /// Returns the names that received a method of `family`, in order.
    #[must_use]
    pub fn names(&self, family: MethodFamily) -> Vec<&str> {
        self.methods
            .iter()
            .filter(|m| m.family == family)
            .map(|m| m.type_name.as_str())
            .collect()
    }

    /// Returns the copy body available for `type_name` in either copy family.
    #[must_use]
    pub fn copy_body(&self, type_name: &str) -> Option<&CopyBody> {
        self.methods.iter().find_map(|m| match &m.body {
            MethodBody::Copy(body) if m.type_name == type_name => Some(body),
            _ => None,
        })
    }

    /// Returns the zero body for `type_name`.
    #[must_use]
    pub fn zero_body(&self, type_name: &str) -> Option<&ZeroBody> {
        self.methods.iter().find_map(|m| match &m.body {
            MethodBody::Zero(body) if m.type_name == type_name => Some(body),
            _ => None,
        })
    }
}

/// Runs both worklist fixpoints for one table and root set.
///
/// Each driver owns fresh per-run state; construct a new one per run.
pub struct ClosureDriver<'a> {
    table: &'a TypeTable,
    config: &'a GeneratorConfig,
    classifier: Classifier<'a>,
    private_copy: Worklist,
    zero: Worklist,
    public_done: IndexSet<String>,
    output: Synthesis,
}

impl<'a> ClosureDriver<'a> {
    /// Creates a driver over `table`.
    #[must_use]
    pub fn new(table: &'a TypeTable, config: &'a GeneratorConfig) -> Self {
        Self {
            table,
            config,
            classifier: Classifier::new(table),
            private_copy: Worklist::new(),
            zero: Worklist::new(),
            public_done: IndexSet::new(),
            output: Synthesis::default(),
        }
    }

    /// Runs the closure for the given roots.
    ///
    /// Roots are sorted and deduplicated before processing.
    ///
    /// # Errors
    /// Returns `CodegenError` if the table is invalid, a root is unknown,
    /// a body cannot be synthesized, or a family exceeds its work budget.
    pub fn run<S: AsRef<str>>(mut self, roots: &[S]) -> Result<Synthesis, CodegenError> {
        if self.config.validate {
            validate_table(self.table).map_err(CodegenError::from_schema)?;
        }

        let mut sorted: Vec<&str> = roots.iter().map(|r| r.as_ref()).collect();
        sorted.sort_unstable();
        sorted.dedup();

        for root in sorted {
            self.public_root(root)?;
        }
        self.drain_private_copies()?;
        self.drain_zero_predicates()?;

        tracing::debug!(
            "Closure complete: {} methods, {} capabilities",
            self.output.methods.len(),
            self.output.capabilities.len()
        );
        Ok(self.output)
    }

    /// Number of bodies a family may synthesize before the run is declared
    /// non-terminating. Each body adds one new Done entry.
    fn budget(&self) -> usize {
        self.config
            .max_steps
            .unwrap_or_else(|| self.table.len() + 1)
    }

    fn public_root(&mut self, root: &str) -> Result<(), CodegenError> {
        let table = self.table;
        let (canonical, def) = table
            .resolve_alias(root, "root list")
            .map_err(CodegenError::from_schema)?;

        if def.is_capability() {
            tracing::debug!("Skipping capability root '{}'", root);
            return Ok(());
        }
        if !self.public_done.insert(canonical.to_string()) {
            tracing::trace!("Root '{}' already emitted as '{}'", root, canonical);
            return Ok(());
        }

        let body = synthesize_copy(&mut self.classifier, canonical, &mut self.private_copy)?;
        if body == CopyBody::Trivial {
            tracing::debug!("Skipping builtin root '{}'", canonical);
        } else {
            tracing::debug!("Synthesized public copy for '{}'", canonical);
            self.push_copy(canonical, MethodFamily::PublicCopy, body, false);
        }

        if !def.is_builtin()
            && let Some(body) = synthesize_zero(&mut self.classifier, canonical, &mut self.zero)?
        {
            tracing::debug!("Synthesized zero predicate for root '{}'", canonical);
            self.push_zero(canonical, body);
        }

        self.private_copy.mark_done(canonical);
        self.zero.mark_done(canonical);
        Ok(())
    }

    fn drain_private_copies(&mut self) -> Result<(), CodegenError> {
        let table = self.table;
        let budget = self.budget();
        let mut steps = 0usize;

        while let Some(name) = self.private_copy.pop() {
            let def = table
                .lookup(&name, "private copy queue")
                .map_err(CodegenError::from_schema)?;
            if def.is_builtin() {
                tracing::trace!("No private copy needed for builtin '{}'", name);
                self.private_copy.mark_done(&name);
                continue;
            }

            steps += 1;
            if steps > budget {
                return Err(self.exhausted(MethodFamily::PrivateCopy, budget, name));
            }
            let body = synthesize_copy(&mut self.classifier, &name, &mut self.private_copy)?;
            tracing::debug!("Synthesized private copy for '{}'", name);
            self.push_copy(&name, MethodFamily::PrivateCopy, body, true);
            self.private_copy.mark_done(&name);
        }
        Ok(())
    }

    fn drain_zero_predicates(&mut self) -> Result<(), CodegenError> {
        let table = self.table;
        for (name, def) in table.iter() {
            if !def.is_builtin() {
                self.zero.push(name);
            }
        }

        let budget = self.budget();
        let mut steps = 0usize;

        while let Some(name) = self.zero.pop() {
            let def = table
                .lookup(&name, "zero-predicate queue")
                .map_err(CodegenError::from_schema)?;
            if def.is_builtin() {
                self.zero.mark_done(&name);
                continue;
            }

            steps += 1;
            if steps > budget {
                return Err(self.exhausted(MethodFamily::ZeroPredicate, budget, name));
            }
            if let Some(body) = synthesize_zero(&mut self.classifier, &name, &mut self.zero)? {
                tracing::debug!("Synthesized zero predicate for '{}'", name);
                self.push_zero(&name, body);
            }
            self.zero.mark_done(&name);
        }

        self.mark_delegated_predicates();
        Ok(())
    }

    /// Flags predicates reached through another predicate's body.
    fn mark_delegated_predicates(&mut self) {
        let delegated: HashSet<String> = self
            .output
            .methods
            .iter()
            .filter_map(|m| match &m.body {
                MethodBody::Zero(body) => Some(body.delegates()),
                MethodBody::Copy(_) => None,
            })
            .flatten()
            .map(str::to_string)
            .collect();

        for method in &mut self.output.methods {
            if method.family == MethodFamily::ZeroPredicate {
                method.discovered = !self.public_done.contains(&method.type_name)
                    && delegated.contains(&method.type_name);
            }
        }
    }

    fn exhausted(&self, family: MethodFamily, budget: usize, name: String) -> CodegenError {
        let work = match family {
            MethodFamily::ZeroPredicate => &self.zero,
            MethodFamily::PublicCopy | MethodFamily::PrivateCopy => &self.private_copy,
        };
        let chain = dependency_chain(self.table, work, &name);
        tracing::warn!("{} closure exceeded {} steps along {}", family, budget, chain);

        let mut pending = vec![name];
        pending.extend(work.pending());
        CodegenError::NonTerminatingClosure {
            family,
            budget,
            chain,
            pending,
        }
    }

    fn push_copy(&mut self, name: &str, family: MethodFamily, body: CopyBody, discovered: bool) {
        for capability in body.capabilities() {
            if self.output.capabilities.insert(capability.to_string()) {
                tracing::debug!("'{}' requires a concrete-preserving clone", capability);
            }
        }
        self.output.methods.push(SynthesizedMethod {
            type_name: name.to_string(),
            family,
            body: MethodBody::Copy(body),
            discovered,
        });
    }

    fn push_zero(&mut self, name: &str, body: ZeroBody) {
        self.output.methods.push(SynthesizedMethod {
            type_name: name.to_string(),
            family: MethodFamily::ZeroPredicate,
            body: MethodBody::Zero(body),
            discovered: false,
        });
    }
}

/// Walks the referrers of `name` back to a root, closing the chain when
/// `name` itself refers into it.
fn dependency_chain(table: &TypeTable, work: &Worklist, name: &str) -> String {
    let mut chain = vec![name.to_string()];
    let mut current = name;
    while let Some(parent) = work.requester(current) {
        if chain.iter().any(|n| n == parent) {
            break;
        }
        chain.push(parent.to_string());
        current = parent;
    }
    chain.reverse();

    if let Some(back) = references(table, name)
        .into_iter()
        .find(|r| chain.contains(r))
    {
        chain.push(back);
    }
    chain.join(" -> ")
}

/// Canonical names a type refers to by name.
fn references(table: &TypeTable, name: &str) -> Vec<String> {
    let Ok((_, def)) = table.resolve_alias(name, "dependency chain") else {
        return Vec::new();
    };
    let refs: Vec<&TypeRef> = match def {
        TypeDef::Record(record) => record.fields.values().collect(),
        TypeDef::FixedSequence { element, .. } | TypeDef::DynamicSequence(element) => {
            vec![element]
        }
        TypeDef::Builtin(_) | TypeDef::Alias(_) => Vec::new(),
    };
    refs.into_iter()
        .filter_map(TypeRef::name)
        .filter_map(|target| table.resolve_alias(target, "dependency chain").ok())
        .map(|(canonical, _)| canonical.to_string())
        .collect()
}
