//! Prompt set loading (YAML)

use super::error::ConfigLoadError;
use figment::{
    Figment,
    providers::{Format, Yaml},
    value::Value,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use udc_domain::PromptSet;

/// Loads a [`PromptSet`] from a YAML mapping of key to template
///
/// Non-string values are ignored, so a prompt file may carry other settings
/// alongside its templates.
pub struct PromptSetLoader;

impl PromptSetLoader {
    pub fn load(path: &Path) -> Result<PromptSet, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let raw: BTreeMap<String, Value> = Figment::new().merge(Yaml::file(path)).extract()?;
        let entries = raw.into_iter().filter_map(|(key, value)| match value.into_string() {
            Some(template) => Some((key, template)),
            None => {
                debug!(key = %key, "Skipping non-string prompt entry");
                None
            }
        });

        let prompts = PromptSet::from_entries(entries);
        prompts.validate()?;

        info!(path = %path.display(), templates = prompts.len(), "Loaded prompt set");
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use udc_domain::DomainError;

    const LEGACY: &str = r#"
data_verification_system_msg: "You check whether input is convertible."
data_verification_request_msg: "Input: {<!--Data-->}"
data_conversion_system_msg: "You convert documents."
data_conversion_request_msg: |
  Attempt {<!--RunIndex-->}
  {<!--PreviousConversionNotes-->}
  {<!--Data-->}
data_validation_system_msg: "You compare input and output."
data_validation_request_msg: "{<!--Data-->} vs {<!--Output-->}"
file_save:
  file_extension: json
"#;

    #[test]
    fn test_legacy_keys_are_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conv.yaml");
        fs::write(&path, LEGACY).unwrap();

        let prompts = PromptSetLoader::load(&path).unwrap();
        assert!(prompts.contains("verification-system"));
        assert!(prompts.contains("conversion-request"));
        assert!(prompts.get("validation-request").unwrap().contains("{<!--Output-->}"));
        assert!(!prompts.contains("file_save"));
    }

    #[test]
    fn test_missing_required_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.yaml");
        fs::write(&path, "conversion-system: \"convert\"\n").unwrap();

        assert!(matches!(
            PromptSetLoader::load(&path),
            Err(ConfigLoadError::Invalid(DomainError::MissingPrompt(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PromptSetLoader::load(Path::new("/nonexistent/prompts.yaml")),
            Err(ConfigLoadError::NotFound(_))
        ));
    }
}
