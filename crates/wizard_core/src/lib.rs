use std::{fmt, future::Future, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::info;

pub mod config;
pub mod registry;
pub mod session;

pub use config::{load_settings, WizardSettings};
pub use registry::StepRegistry;
pub use session::WizardSession;
pub use wizard_types::{
    domain::{
        FieldBinding, ForwardAction, NavigationControls, ValidationResult, ValueSet,
        WizardSnapshot,
    },
    error::WizardError,
    protocol::{AdvanceOutcome, RetreatOutcome, SubmitPolicy},
};

/// Produces field-level errors for a page. Receives the whole value set so
/// rules may reference fields owned by other pages.
pub trait Validator: Send + Sync {
    fn validate(&self, values: &ValueSet) -> ValidationResult;
}

impl<F> Validator for F
where
    F: Fn(&ValueSet) -> ValidationResult + Send + Sync,
{
    fn validate(&self, values: &ValueSet) -> ValidationResult {
        self(values)
    }
}

/// Fails every listed field whose value is missing or blank.
#[derive(Debug, Clone, Default)]
pub struct RequiredFields {
    rules: Vec<(String, String)>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("{name} is required.");
        self.field_with_message(name, message)
    }

    pub fn field_with_message(
        mut self,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.rules.push((name.into(), message.into()));
        self
    }
}

impl Validator for RequiredFields {
    fn validate(&self, values: &ValueSet) -> ValidationResult {
        let mut errors = ValidationResult::valid();
        for (field, message) in &self.rules {
            if values.value_or_empty(field).trim().is_empty() {
                errors.insert(field.as_str(), message.as_str());
            }
        }
        errors
    }
}

#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, values: ValueSet) -> Result<()>;
}

pub struct MissingSubmitHandler;

#[async_trait]
impl SubmitHandler for MissingSubmitHandler {
    async fn submit(&self, _values: ValueSet) -> Result<()> {
        Err(anyhow!("no submit handler is configured for this wizard"))
    }
}

/// Emits the submitted values as a structured log event and succeeds.
pub struct LoggingSubmitHandler;

#[async_trait]
impl SubmitHandler for LoggingSubmitHandler {
    async fn submit(&self, values: ValueSet) -> Result<()> {
        info!(values = %values.to_json(), "wizard values submitted");
        Ok(())
    }
}

/// Adapts an async closure into a [`SubmitHandler`].
pub struct SubmitFn<F>(pub F);

#[async_trait]
impl<F, Fut> SubmitHandler for SubmitFn<F>
where
    F: Fn(ValueSet) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn submit(&self, values: ValueSet) -> Result<()> {
        (self.0)(values).await
    }
}

#[derive(Clone, Default)]
pub struct PageDefinition {
    pub title: Option<String>,
    pub fields: Vec<String>,
    validator: Option<Arc<dyn Validator>>,
}

impl PageDefinition {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            fields: fields.into_iter().map(Into::into).collect(),
            validator: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_validator(self, validator: impl Validator + 'static) -> Self {
        self.with_shared_validator(Arc::new(validator))
    }

    pub fn with_shared_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn validator(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// A page without a validator always passes.
    pub fn validate(&self, values: &ValueSet) -> ValidationResult {
        self.validator
            .as_ref()
            .map(|validator| validator.validate(values))
            .unwrap_or_default()
    }
}

impl fmt::Debug for PageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDefinition")
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("has_validator", &self.has_validator())
            .finish()
    }
}

pub struct WizardDefinition {
    pub pages: Vec<PageDefinition>,
    pub initial_values: ValueSet,
    pub submit_handler: Arc<dyn SubmitHandler>,
}

impl WizardDefinition {
    pub fn new(initial_values: ValueSet) -> Self {
        Self {
            pages: Vec::new(),
            initial_values,
            submit_handler: Arc::new(MissingSubmitHandler),
        }
    }

    pub fn page(mut self, page: PageDefinition) -> Self {
        self.pages.push(page);
        self
    }

    pub fn on_submit(self, handler: impl SubmitHandler + 'static) -> Self {
        self.on_submit_shared(Arc::new(handler))
    }

    pub fn on_submit_shared(mut self, handler: Arc<dyn SubmitHandler>) -> Self {
        self.submit_handler = handler;
        self
    }
}

impl fmt::Debug for WizardDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardDefinition")
            .field("pages", &self.pages)
            .field("initial_values", &self.initial_values)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
