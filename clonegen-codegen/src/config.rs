//! Generator configuration.

/// Naming and closure settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Trait every root implements, returning a boxed copy of itself.
    pub public_trait: Option<String>,
    /// Trait method of the public copy.
    pub public_method: String,
    /// Typed copy method name, shared by public and private copies.
    pub private_method: String,
    /// Zero predicate method name.
    pub zero_method: String,
    /// Prefix of the clone operation each capability declares.
    pub capability_clone_prefix: String,
    /// Validate the table before synthesis.
    pub validate: bool,
    /// Work budget per method family; defaults to the table size plus one.
    pub max_steps: Option<usize>,
}

impl GeneratorConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            public_trait: Some("Property".to_string()),
            public_method: "copy_property".to_string(),
            private_method: "copy".to_string(),
            zero_method: "is_zero".to_string(),
            capability_clone_prefix: "clone_".to_string(),
            validate: true,
            max_steps: None,
        }
    }

    /// Sets the trait roots implement.
    #[must_use]
    pub fn public_trait(mut self, name: impl Into<String>) -> Self {
        self.public_trait = Some(name.into());
        self
    }

    /// Emits inherent public copies only.
    #[must_use]
    pub fn without_public_trait(mut self) -> Self {
        self.public_trait = None;
        self
    }

    /// Sets the public trait method name.
    #[must_use]
    pub fn public_method(mut self, name: impl Into<String>) -> Self {
        self.public_method = name.into();
        self
    }

    /// Sets the typed copy method name.
    #[must_use]
    pub fn private_method(mut self, name: impl Into<String>) -> Self {
        self.private_method = name.into();
        self
    }

    /// Sets the zero predicate method name.
    #[must_use]
    pub fn zero_method(mut self, name: impl Into<String>) -> Self {
        self.zero_method = name.into();
        self
    }

    /// Sets the capability clone prefix.
    #[must_use]
    pub fn capability_clone_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.capability_clone_prefix = prefix.into();
        self
    }

    /// Enables or disables table validation.
    #[must_use]
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Sets the work budget per method family.
    #[must_use]
    pub fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Returns the clone operation name of a capability.
    #[must_use]
    pub fn capability_clone_method(&self, capability: &str) -> String {
        format!(
            "{}{}",
            self.capability_clone_prefix,
            clonegen_schema::to_snake_case(capability)
        )
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}
