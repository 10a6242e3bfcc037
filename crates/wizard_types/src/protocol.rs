use serde::{Deserialize, Serialize};

use crate::domain::ValidationResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    ValidationFailed(ValidationResult),
    Advanced(usize),
    Submitted,
}

impl AdvanceOutcome {
    pub fn errors(&self) -> Option<&ValidationResult> {
        match self {
            AdvanceOutcome::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RetreatOutcome {
    Retreated(usize),
    AtFirstPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// `advance()` during a pending submit fails with `SubmitInProgress`.
    #[default]
    Reject,
    /// `advance()` during a pending submit waits for it to settle first.
    Queue,
}

impl std::str::FromStr for SubmitPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(SubmitPolicy::Reject),
            "queue" => Ok(SubmitPolicy::Queue),
            other => Err(format!("unknown submit policy '{other}'")),
        }
    }
}
