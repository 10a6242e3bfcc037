use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

macro_rules! field_map_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(BTreeMap<String, String>);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn get(&self, field: &str) -> Option<&str> {
                self.0.get(field).map(String::as_str)
            }

            pub fn contains(&self, field: &str) -> bool {
                self.0.contains_key(field)
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
                self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
            }

            pub fn into_inner(self) -> BTreeMap<String, String> {
                self.0
            }
        }

        impl<K, V> FromIterator<(K, V)> for $name
        where
            K: Into<String>,
            V: Into<String>,
        {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
            }
        }

        impl From<BTreeMap<String, String>> for $name {
            fn from(value: BTreeMap<String, String>) -> Self {
                Self(value)
            }
        }
    };
}

field_map_newtype!(ValueSet);
field_map_newtype!(ValidationResult);

impl ValueSet {
    /// Writes `value` under `field`. Returns `false` when the stored value
    /// was already identical.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> bool {
        let field = field.into();
        let value = value.into();
        if self.0.get(&field) == Some(&value) {
            return false;
        }
        self.0.insert(field, value);
        true
    }

    /// Missing fields read as the empty string.
    pub fn value_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps the first message reported for a field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardAction {
    Next,
    Submit,
}

impl ForwardAction {
    pub fn label(self) -> &'static str {
        match self {
            ForwardAction::Next => "next",
            ForwardAction::Submit => "submit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationControls {
    pub show_back: bool,
    pub forward: ForwardAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBinding {
    pub name: String,
    pub value: String,
    pub touched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub current_index: usize,
    pub page_count: usize,
    pub submitting: bool,
    pub submitted: bool,
    pub values: ValueSet,
    pub errors: ValidationResult,
}
