//! The prompt set: message key → template text
//!
//! Loaded once per run by an external collaborator and read-only afterwards.

use super::template::{Placeholder, unrendered_placeholders};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys every prompt set must provide
pub const REQUIRED_KEYS: [&str; 6] = [
    "conversion-system",
    "conversion-request",
    "verification-system",
    "verification-request",
    "validation-system",
    "validation-request",
];

/// Map a legacy `data_<stage>_<kind>_msg` key to its canonical form
///
/// `data_conversion_system_msg` becomes `conversion-system`. Keys that are
/// not in legacy form are returned unchanged.
pub fn canonical_key(key: &str) -> String {
    let Some(inner) = key
        .strip_prefix("data_")
        .and_then(|k| k.strip_suffix("_msg"))
    else {
        return key.to_string();
    };

    match inner.rsplit_once('_') {
        Some((stage, kind)) if kind == "system" || kind == "request" => {
            format!("{}-{}", stage.replace('_', "-"), kind)
        }
        _ => key.to_string(),
    }
}

/// Mapping from message key to template text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptSet {
    templates: BTreeMap<String, String>,
}

impl PromptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw key/value pairs, normalizing legacy keys
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let templates = entries
            .into_iter()
            .map(|(k, v)| (canonical_key(k.as_ref()), v.into()))
            .collect();
        Self { templates }
    }

    pub fn with(mut self, key: impl AsRef<str>, template: impl Into<String>) -> Self {
        self.templates
            .insert(canonical_key(key.as_ref()), template.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Check that every required key is present with non-blank text
    pub fn validate(&self) -> Result<(), DomainError> {
        for key in REQUIRED_KEYS {
            match self.get(key) {
                Some(text) if !text.trim().is_empty() => {}
                _ => return Err(DomainError::MissingPrompt(key.to_string())),
            }
        }
        Ok(())
    }

    /// Check that `key` only uses placeholders from `allowed`
    pub fn check_placeholders(&self, key: &str, allowed: &[Placeholder]) -> Result<(), DomainError> {
        let text = self
            .get(key)
            .ok_or_else(|| DomainError::MissingPrompt(key.to_string()))?;

        match unrendered_placeholders(text)
            .into_iter()
            .find(|p| !allowed.contains(p))
        {
            Some(placeholder) => Err(DomainError::UnrenderablePlaceholder {
                key: key.to_string(),
                placeholder: placeholder.token().to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_set() -> PromptSet {
        REQUIRED_KEYS
            .iter()
            .fold(PromptSet::new(), |set, key| set.with(key, format!("{key} text")))
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("data_conversion_system_msg"), "conversion-system");
        assert_eq!(canonical_key("data_validation_request_msg"), "validation-request");
        assert_eq!(canonical_key("verification-request"), "verification-request");
        assert_eq!(canonical_key("data_extra_msg"), "data_extra_msg");
    }

    #[test]
    fn test_from_entries_normalizes_legacy_keys() {
        let set = PromptSet::from_entries([
            ("data_verification_system_msg", "You verify."),
            ("custom-request", "Custom"),
        ]);
        assert_eq!(set.get("verification-system"), Some("You verify."));
        assert_eq!(set.get("custom-request"), Some("Custom"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_validate_complete() {
        assert!(complete_set().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_key() {
        let set = PromptSet::new().with("conversion-system", "x");
        assert_eq!(
            set.validate(),
            Err(DomainError::MissingPrompt("conversion-request".to_string()))
        );
    }

    #[test]
    fn test_validate_blank_value() {
        let set = complete_set().with("validation-request", "   ");
        assert_eq!(
            set.validate(),
            Err(DomainError::MissingPrompt("validation-request".to_string()))
        );
    }

    #[test]
    fn test_check_placeholders() {
        let set = complete_set()
            .with("verification-request", "Check {<!--Data-->} against {<!--Output-->}");

        let allowed = [Placeholder::Data, Placeholder::DateTime];
        assert!(matches!(
            set.check_placeholders("verification-request", &allowed),
            Err(DomainError::UnrenderablePlaceholder { ref placeholder, .. }) if placeholder == "{<!--Output-->}"
        ));
        assert!(set.check_placeholders("conversion-request", &allowed).is_ok());
    }
}
