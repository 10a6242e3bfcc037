//! Fixed, ordered lookup over the pages a wizard was declared with.

use wizard_types::error::WizardError;

use crate::{PageDefinition, Validator};

#[derive(Debug, Clone)]
pub struct StepRegistry {
    pages: Vec<PageDefinition>,
}

impl StepRegistry {
    pub fn new(pages: Vec<PageDefinition>) -> Result<Self, WizardError> {
        if pages.is_empty() {
            return Err(WizardError::configuration(
                "a wizard must declare at least one page",
            ));
        }
        Ok(Self { pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_at(&self, index: usize) -> Result<&PageDefinition, WizardError> {
        self.pages.get(index).ok_or(WizardError::IndexOutOfRange {
            index,
            page_count: self.page_count(),
        })
    }

    pub fn validator_at(&self, index: usize) -> Result<Option<&dyn Validator>, WizardError> {
        Ok(self.page_at(index)?.validator())
    }

    pub fn is_last_page(&self, index: usize) -> bool {
        index + 1 == self.page_count()
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageDefinition> {
        self.pages.iter()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
