//! TOML description of a wizard: initial values plus ordered pages with
//! optional required-field rules.

use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

use anyhow::Context;
use serde::Deserialize;
use wizard_core::{
    PageDefinition, RequiredFields, SubmitHandler, ValueSet, WizardDefinition, WizardError,
};

pub const REGISTRATION_MANIFEST: &str = include_str!("../registration.toml");

#[derive(Debug, Deserialize)]
pub struct WizardManifest {
    #[serde(default)]
    pub initial_values: BTreeMap<String, String>,
    #[serde(default)]
    pub pages: Vec<PageManifest>,
}

#[derive(Debug, Deserialize)]
pub struct PageManifest {
    pub title: Option<String>,
    pub fields: Vec<String>,
    #[serde(default)]
    pub required: Vec<RequiredRule>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RequiredRule {
    Field(String),
    WithMessage { field: String, message: String },
}

impl WizardManifest {
    pub fn from_toml(raw: &str) -> Result<Self, WizardError> {
        toml::from_str(raw)
            .map_err(|err| WizardError::configuration(format!("invalid wizard manifest: {err}")))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read wizard manifest '{}'", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("failed to parse wizard manifest '{}'", path.display()))
    }

    pub fn registration() -> Result<Self, WizardError> {
        Self::from_toml(REGISTRATION_MANIFEST)
    }

    /// Every field a page declares gets an initial value, empty when the
    /// manifest does not provide one.
    pub fn into_definition(
        self,
        submit_handler: Arc<dyn SubmitHandler>,
    ) -> Result<WizardDefinition, WizardError> {
        let mut initial_values = self.initial_values;
        for page in &self.pages {
            for field in &page.fields {
                initial_values.entry(field.clone()).or_default();
            }
        }

        let mut definition =
            WizardDefinition::new(ValueSet::from(initial_values)).on_submit_shared(submit_handler);
        for (index, page) in self.pages.into_iter().enumerate() {
            definition = definition.page(page.into_definition(index)?);
        }
        Ok(definition)
    }
}

impl PageManifest {
    fn into_definition(self, index: usize) -> Result<PageDefinition, WizardError> {
        let mut required = RequiredFields::new();
        let has_rules = !self.required.is_empty();
        for rule in self.required {
            let field = match &rule {
                RequiredRule::Field(field) | RequiredRule::WithMessage { field, .. } => field,
            };
            if !self.fields.contains(field) {
                return Err(WizardError::configuration(format!(
                    "page {index} requires '{field}' but does not declare it"
                )));
            }
            required = match rule {
                RequiredRule::Field(field) => required.field(field),
                RequiredRule::WithMessage { field, message } => {
                    required.field_with_message(field, message)
                }
            };
        }

        let mut page = PageDefinition::new(self.fields);
        if let Some(title) = self.title {
            page = page.with_title(title);
        }
        if has_rules {
            page = page.with_validator(required);
        }
        Ok(page)
    }
}
