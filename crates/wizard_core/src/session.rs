//! The wizard controller: owns the active page index and mediates between
//! navigation requests, page validators and the terminal submit handler.

use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};
use wizard_types::{
    domain::{
        FieldBinding, ForwardAction, NavigationControls, ValidationResult, ValueSet,
        WizardSnapshot,
    },
    error::WizardError,
    protocol::{AdvanceOutcome, RetreatOutcome, SubmitPolicy},
};

use crate::{
    config::WizardSettings, registry::StepRegistry, PageDefinition, SubmitHandler,
    WizardDefinition,
};

struct SessionState {
    current_index: usize,
    submitted: bool,
    values: ValueSet,
    touched: BTreeSet<String>,
    errors: ValidationResult,
}

impl SessionState {
    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.submitted {
            return Err(WizardError::SessionFinished);
        }
        Ok(())
    }

    fn binding(&self, field: &str) -> FieldBinding {
        let touched = self.touched.contains(field);
        FieldBinding {
            name: field.to_string(),
            value: self.values.value_or_empty(field).to_string(),
            touched,
            error: touched
                .then(|| self.errors.error_for(field).map(str::to_string))
                .flatten(),
        }
    }
}

pub struct WizardSession {
    registry: StepRegistry,
    submit_handler: Arc<dyn SubmitHandler>,
    settings: WizardSettings,
    state: Mutex<SessionState>,
    submitting: AtomicBool,
    submit_settled: Notify,
}

/// Clears the in-flight flag when a submit settles, including when the
/// advancing future is dropped mid-submit.
struct InFlightSubmit<'a> {
    session: &'a WizardSession,
}

impl Drop for InFlightSubmit<'_> {
    fn drop(&mut self) {
        self.session.submitting.store(false, Ordering::SeqCst);
        self.session.submit_settled.notify_waiters();
    }
}

impl WizardSession {
    pub fn initialize(definition: WizardDefinition) -> Result<Arc<Self>, WizardError> {
        Self::initialize_with_settings(definition, WizardSettings::default())
    }

    pub fn initialize_with_settings(
        definition: WizardDefinition,
        settings: WizardSettings,
    ) -> Result<Arc<Self>, WizardError> {
        let WizardDefinition {
            pages,
            initial_values,
            submit_handler,
        } = definition;
        let registry = StepRegistry::new(pages)?;

        debug!(
            page_count = registry.page_count(),
            field_count = initial_values.len(),
            submit_policy = ?settings.submit_policy,
            "wizard session initialized"
        );

        Ok(Arc::new(Self {
            registry,
            submit_handler,
            settings,
            state: Mutex::new(SessionState {
                current_index: 0,
                submitted: false,
                values: initial_values,
                touched: BTreeSet::new(),
                errors: ValidationResult::valid(),
            }),
            submitting: AtomicBool::new(false),
            submit_settled: Notify::new(),
        }))
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    pub fn page_count(&self) -> usize {
        self.registry.page_count()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub async fn is_submitted(&self) -> bool {
        self.state.lock().await.submitted
    }

    pub async fn current_index(&self) -> usize {
        self.state.lock().await.current_index
    }

    pub async fn current_page(&self) -> Result<&PageDefinition, WizardError> {
        let index = self.current_index().await;
        self.registry.page_at(index)
    }

    pub async fn is_at_last_page(&self) -> bool {
        let index = self.current_index().await;
        self.registry.is_last_page(index)
    }

    pub async fn values(&self) -> ValueSet {
        self.state.lock().await.values.clone()
    }

    /// Errors from the most recent forward attempt on the active page.
    pub async fn errors(&self) -> ValidationResult {
        self.state.lock().await.errors.clone()
    }

    /// Writes a field value without validating it. Returns whether the
    /// stored value changed.
    pub async fn handle_field_change(
        &self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<bool, WizardError> {
        let field = field.into();
        let mut state = self.state.lock().await;
        state.ensure_open()?;

        let changed = state.values.set(field.clone(), value);
        if changed {
            debug!(field = %field, "field value changed");
        }
        state.touched.insert(field);
        Ok(changed)
    }

    /// Records that a field lost focus, so its error becomes visible.
    pub async fn mark_touched(&self, field: impl Into<String>) -> Result<(), WizardError> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        state.touched.insert(field.into());
        Ok(())
    }

    pub async fn field(&self, field: &str) -> FieldBinding {
        self.state.lock().await.binding(field)
    }

    /// Bindings for every field declared by the active page, in page order.
    pub async fn page_fields(&self) -> Result<Vec<FieldBinding>, WizardError> {
        let state = self.state.lock().await;
        let page = self.registry.page_at(state.current_index)?;
        Ok(page.fields.iter().map(|field| state.binding(field)).collect())
    }

    pub async fn controls(&self) -> NavigationControls {
        let index = self.current_index().await;
        NavigationControls {
            show_back: index > 0,
            forward: if self.registry.is_last_page(index) {
                ForwardAction::Submit
            } else {
                ForwardAction::Next
            },
        }
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let state = self.state.lock().await;
        WizardSnapshot {
            current_index: state.current_index,
            page_count: self.registry.page_count(),
            submitting: self.is_submitting(),
            submitted: state.submitted,
            values: state.values.clone(),
            errors: state.errors.clone(),
        }
    }

    /// Validates the active page and then moves forward, or submits when the
    /// active page is the last one.
    pub async fn advance(&self) -> Result<AdvanceOutcome, WizardError> {
        loop {
            // Registered before the flag is read so a settle in between is not missed.
            let settled = self.submit_settled.notified();
            let mut state = self.state.lock().await;
            state.ensure_open()?;

            if self.is_submitting() {
                match self.settings.submit_policy {
                    SubmitPolicy::Reject => {
                        warn!("advance rejected while a submit is in flight");
                        return Err(WizardError::SubmitInProgress);
                    }
                    SubmitPolicy::Queue => {
                        drop(state);
                        debug!("advance queued behind in-flight submit");
                        settled.await;
                        continue;
                    }
                }
            }

            let index = state.current_index;
            let page = self.registry.page_at(index)?;
            if self.settings.touch_page_fields_on_advance {
                state.touched.extend(page.fields.iter().cloned());
            }

            let errors = page.validate(&state.values);
            if !errors.is_valid() {
                debug!(
                    index,
                    error_count = errors.len(),
                    "page validation failed"
                );
                state.errors = errors.clone();
                return Ok(AdvanceOutcome::ValidationFailed(errors));
            }
            state.errors = ValidationResult::valid();

            if !self.registry.is_last_page(index) {
                let next = index + 1;
                state.current_index = next;
                info!(
                    from = index,
                    to = next,
                    page_count = self.registry.page_count(),
                    "wizard advanced"
                );
                return Ok(AdvanceOutcome::Advanced(next));
            }

            self.submitting.store(true, Ordering::SeqCst);
            let in_flight = InFlightSubmit { session: self };
            let values = state.values.clone();
            drop(state);

            info!(field_count = values.len(), "submitting wizard values");
            if let Err(err) = self.submit_handler.submit(values).await {
                warn!(error = %err, "submit handler failed");
                return Err(WizardError::Submit(err));
            }

            self.state.lock().await.submitted = true;
            drop(in_flight);
            info!("wizard submitted");
            return Ok(AdvanceOutcome::Submitted);
        }
    }

    /// Steps back one page without validating. A no-op on the first page.
    pub async fn retreat(&self) -> Result<RetreatOutcome, WizardError> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        if self.is_submitting() {
            warn!("retreat rejected while a submit is in flight");
            return Err(WizardError::SubmitInProgress);
        }

        let Some(previous) = state.current_index.checked_sub(1) else {
            debug!("retreat ignored on first page");
            return Ok(RetreatOutcome::AtFirstPage);
        };

        state.current_index = previous;
        state.errors = ValidationResult::valid();
        info!(to = previous, "wizard retreated");
        Ok(RetreatOutcome::Retreated(previous))
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
