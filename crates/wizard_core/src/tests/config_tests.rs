use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_reject_reentrant_submits() {
    let settings = WizardSettings::default();
    assert_eq!(settings.submit_policy, SubmitPolicy::Reject);
    assert!(settings.touch_page_fields_on_advance);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = WizardSettings::default();
    apply_file_overrides(
        &mut settings,
        "submit_policy = \"queue\"\ntouch_page_fields_on_advance = false\n",
        Path::new("wizard.toml"),
    );

    assert_eq!(settings.submit_policy, SubmitPolicy::Queue);
    assert!(!settings.touch_page_fields_on_advance);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn malformed_file_keeps_previous_values() {
    let mut settings = WizardSettings::default();
    apply_file_overrides(&mut settings, "submit_policy = [", Path::new("wizard.toml"));
    assert_eq!(settings, WizardSettings::default());
}

#[test]
fn env_overrides_file_and_app_prefix_wins_last() {
    let mut settings = WizardSettings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("WIZARD_SUBMIT_POLICY", "queue"),
            ("APP__SUBMIT_POLICY", "reject"),
            ("WIZARD_TOUCH_ON_ADVANCE", "off"),
            ("WIZARD_LOG", "wizard_core=debug"),
        ]),
    );

    assert_eq!(settings.submit_policy, SubmitPolicy::Reject);
    assert!(!settings.touch_page_fields_on_advance);
    assert_eq!(settings.log_filter, "wizard_core=debug");
}

#[test]
fn unparseable_env_values_are_ignored() {
    let mut settings = WizardSettings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("WIZARD_SUBMIT_POLICY", "sometimes"),
            ("WIZARD_TOUCH_ON_ADVANCE", "maybe"),
        ]),
    );
    assert_eq!(settings, WizardSettings::default());
}

#[test]
fn loads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("wizard_settings_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("wizard.toml");
    fs::write(&path, "log_filter = \"warn\"\n").expect("write settings");

    let settings = load_settings_from(&path);
    if env::var("WIZARD_LOG").is_err() {
        assert_eq!(settings.log_filter, "warn");
    }

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/wizard.toml"));
    if env::var("WIZARD_SUBMIT_POLICY").is_err() && env::var("APP__SUBMIT_POLICY").is_err() {
        assert_eq!(settings.submit_policy, SubmitPolicy::Reject);
    }
}
