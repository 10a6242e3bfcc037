use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("invalid wizard configuration: {0}")]
    Configuration(String),
    #[error("page index {index} is out of range for a wizard with {page_count} pages")]
    IndexOutOfRange { index: usize, page_count: usize },
    #[error("a submit is already in flight")]
    SubmitInProgress,
    #[error("the wizard session has already been submitted")]
    SessionFinished,
    #[error(transparent)]
    Submit(anyhow::Error),
}

impl WizardError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Errors the caller may recover from by retrying the same action later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WizardError::SubmitInProgress | WizardError::Submit(_))
    }
}
