use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::rules::MergeRules;
use crate::types::KEY_SEPARATOR;

/// Placeholder replaced by the language code in `exportUrlTemplate`.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// File name of the default upstream cache inside the temp directory.
const DEFAULT_CACHE_FILE: &str = "locale-sync-upstream.json";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "rules.pluralSuffixes[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Source language all translations are written against.
    pub reference_language: String,

    /// Extension of the locale files (without dot).
    pub file_extension: String,

    /// Page listing the languages offered upstream.
    pub languages_url: String,

    /// Export URL with a `{code}` placeholder.
    pub export_url_template: String,

    /// Upstream snapshot location. Defaults to a file in the temp directory.
    pub cache_path: Option<PathBuf>,

    pub request_timeout_secs: u64,

    pub rules: MergeRules,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            reference_language: "en".to_string(),
            file_extension: "yml".to_string(),
            languages_url: "https://translatewiki.net/wiki/Special:SupportedLanguages".to_string(),
            export_url_template: "https://translatewiki.net/w/i.php?title=Special:ExportTranslations&group=out-osm-site&language={code}&format=export-to-file".to_string(),
            cache_path: None,
            request_timeout_secs: 30,
            rules: MergeRules::default(),
        }
    }
}

impl SyncSettings {
    /// Resolved location of the upstream snapshot.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_CACHE_FILE))
    }

    /// Export URL for a single language.
    #[must_use]
    pub fn export_url(&self, code: &str) -> String {
        self.export_url_template.replace(CODE_PLACEHOLDER, code)
    }

    /// # Errors
    /// - Required field is empty
    /// - Invalid URL or missing placeholder
    /// - Key fragment containing the key separator
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.reference_language.is_empty() {
            errors.push(ValidationError::new(
                "referenceLanguage",
                "The reference language cannot be empty. Example: \"en\"",
            ));
        }

        if self.file_extension.is_empty() || self.file_extension.contains('.') {
            errors.push(ValidationError::new(
                "fileExtension",
                "Specify the extension without a dot, for example: \"yml\"",
            ));
        }

        if !is_http_url(&self.languages_url) {
            errors.push(ValidationError::new(
                "languagesUrl",
                format!("Expected an http(s) URL, got '{}'", self.languages_url),
            ));
        }

        if !is_http_url(&self.export_url_template) {
            errors.push(ValidationError::new(
                "exportUrlTemplate",
                format!("Expected an http(s) URL, got '{}'", self.export_url_template),
            ));
        } else if !self.export_url_template.contains(CODE_PLACEHOLDER) {
            errors.push(ValidationError::new(
                "exportUrlTemplate",
                format!("The template must contain the '{CODE_PLACEHOLDER}' placeholder"),
            ));
        }

        if self.request_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "requestTimeoutSecs",
                "The timeout must be at least 1 second",
            ));
        }

        if self.rules.table_entry_prefix.is_empty() {
            errors.push(ValidationError::new(
                "rules.tableEntryPrefix",
                "The prefix cannot be empty. Example: \"site.key.table.entry\"",
            ));
        }

        for (index, suffix) in self.rules.plural_suffixes.iter().enumerate() {
            if suffix.is_empty() || suffix.contains(KEY_SEPARATOR) {
                errors.push(ValidationError::new(
                    format!("rules.pluralSuffixes[{index}]"),
                    format!("Invalid plural suffix '{suffix}': must be a single key segment"),
                ));
            }
        }

        for (index, key) in self.rules.restore_keys.iter().enumerate() {
            if key.is_empty() || key.split(KEY_SEPARATOR).any(str::is_empty) {
                errors.push(ValidationError::new(
                    format!("rules.restoreKeys[{index}]"),
                    format!("Invalid key '{key}': segments cannot be empty"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn validate_valid_settings() {
        let settings = SyncSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"referenceLanguage": "de", "rules": {"pluralSuffixes": ["one", "other"]}}"#;

        let settings: SyncSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.reference_language, eq("de"));
        assert_that!(settings.file_extension, eq("yml"));
        assert_that!(settings.rules.plural_suffixes, elements_are![eq("one"), eq("other")]);
        assert_that!(settings.rules.table_entry_prefix, eq("site.key.table.entry"));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let settings: SyncSettings = serde_json::from_str("{}").unwrap();

        assert_that!(settings.reference_language, eq("en"));
        assert_that!(settings.request_timeout_secs, eq(30));
        assert_that!(settings.cache_path, none());
    }

    #[rstest]
    fn export_url_substitutes_code() {
        let settings = SyncSettings {
            export_url_template: "https://example.org/export?lang={code}".to_string(),
            ..SyncSettings::default()
        };

        assert_that!(settings.export_url("pt-br"), eq("https://example.org/export?lang=pt-br"));
    }

    #[rstest]
    fn cache_path_prefers_configured_value() {
        let settings = SyncSettings {
            cache_path: Some(PathBuf::from("/var/cache/upstream.json")),
            ..SyncSettings::default()
        };

        assert_that!(settings.cache_path(), eq(&PathBuf::from("/var/cache/upstream.json")));
        assert_that!(
            SyncSettings::default().cache_path(),
            eq(&std::env::temp_dir().join(DEFAULT_CACHE_FILE))
        );
    }

    #[rstest]
    #[case::empty_reference(
        SyncSettings { reference_language: String::new(), ..SyncSettings::default() },
        "referenceLanguage"
    )]
    #[case::dotted_extension(
        SyncSettings { file_extension: ".yml".to_string(), ..SyncSettings::default() },
        "fileExtension"
    )]
    #[case::bad_languages_url(
        SyncSettings { languages_url: "ftp://example.org".to_string(), ..SyncSettings::default() },
        "languagesUrl"
    )]
    #[case::missing_placeholder(
        SyncSettings {
            export_url_template: "https://example.org/export".to_string(),
            ..SyncSettings::default()
        },
        "exportUrlTemplate"
    )]
    #[case::zero_timeout(
        SyncSettings { request_timeout_secs: 0, ..SyncSettings::default() },
        "requestTimeoutSecs"
    )]
    fn validate_rejects_invalid_field(#[case] settings: SyncSettings, #[case] field_path: &str) {
        assert_that!(
            settings.validate(),
            err(elements_are![field!(ValidationError.field_path, eq(field_path))])
        );
    }

    #[rstest]
    fn validate_invalid_rules() {
        let settings = SyncSettings {
            rules: MergeRules {
                restore_keys: vec!["layouts..help_url".to_string()],
                plural_suffixes: vec!["one".to_string(), "x.y".to_string()],
                table_entry_prefix: String::new(),
            },
            ..SyncSettings::default()
        };

        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![
                field!(ValidationError.field_path, eq("rules.tableEntryPrefix")),
                field!(ValidationError.field_path, eq("rules.pluralSuffixes[1]")),
                field!(ValidationError.field_path, eq("rules.restoreKeys[0]")),
            ])
        );
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = SyncSettings {
            reference_language: String::new(),
            request_timeout_secs: 0,
            ..SyncSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. referenceLanguage"));
        assert_that!(error_message, contains_substring("2. requestTimeoutSecs"));
    }
}
