use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;
use wizard_types::protocol::SubmitPolicy;

pub const DEFAULT_SETTINGS_FILE: &str = "wizard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSettings {
    pub submit_policy: SubmitPolicy,
    pub touch_page_fields_on_advance: bool,
    pub log_filter: String,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            submit_policy: SubmitPolicy::Reject,
            touch_page_fields_on_advance: true,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    submit_policy: Option<SubmitPolicy>,
    touch_page_fields_on_advance: Option<bool>,
    log_filter: Option<String>,
}

/// Defaults, then `wizard.toml` in the working directory, then environment.
pub fn load_settings() -> WizardSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> WizardSettings {
    let mut settings = WizardSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw, path);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file_overrides(settings: &mut WizardSettings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<SettingsFile>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable wizard settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.submit_policy {
        settings.submit_policy = v;
    }
    if let Some(v) = file_cfg.touch_page_fields_on_advance {
        settings.touch_page_fields_on_advance = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env_overrides(settings: &mut WizardSettings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["WIZARD_SUBMIT_POLICY", "APP__SUBMIT_POLICY"] {
        if let Some(v) = lookup(key) {
            match v.parse::<SubmitPolicy>() {
                Ok(policy) => settings.submit_policy = policy,
                Err(err) => warn!(key, error = %err, "ignoring submit policy override"),
            }
        }
    }

    if let Some(v) = lookup("WIZARD_TOUCH_ON_ADVANCE") {
        if let Some(parsed) = parse_flag(&v) {
            settings.touch_page_fields_on_advance = parsed;
        }
    }

    if let Some(v) = lookup("WIZARD_LOG") {
        settings.log_filter = v;
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
