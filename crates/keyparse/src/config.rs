//! Form parsing configuration.

use serde::{Deserialize, Serialize};

/// Default maximum total body size for multipart (50 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum size per field (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum number of multipart fields.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Configuration for [`FormParser`](crate::FormParser) and multipart decoding.
///
/// Every field has a default, so partial documents deserialize.
///
/// # Example
///
/// ```
/// use keyparse::FormConfig;
///
/// let config: FormConfig = serde_json::from_str(r#"{ "empty_as_missing": false }"#).unwrap();
/// assert!(!config.empty_as_missing);
/// assert_eq!(config.max_fields, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Treat a falsy first entry (empty text, `0`, `NaN`) as a missing key
    /// in [`FormParser::get`](crate::FormParser::get).
    ///
    /// When `false`, `get` succeeds whenever `has` is true.
    pub empty_as_missing: bool,

    /// Maximum total multipart body size in bytes.
    pub max_body_size: usize,

    /// Maximum size of a single multipart field in bytes.
    pub max_field_size: usize,

    /// Maximum number of multipart fields.
    pub max_fields: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            empty_as_missing: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl FormConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether falsy first entries count as missing.
    #[must_use]
    pub fn empty_as_missing(mut self, enabled: bool) -> Self {
        self.empty_as_missing = enabled;
        self
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the maximum field size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Set the maximum number of fields.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_config_default() {
        let config = FormConfig::default();

        assert!(config.empty_as_missing);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(config.max_field_size, DEFAULT_MAX_FIELD_SIZE);
        assert_eq!(config.max_fields, 100);
    }

    #[test]
    fn test_form_config_builder() {
        let config = FormConfig::new()
            .empty_as_missing(false)
            .max_body_size(100)
            .max_field_size(50)
            .max_fields(10);

        assert!(!config.empty_as_missing);
        assert_eq!(config.max_body_size, 100);
        assert_eq!(config.max_field_size, 50);
        assert_eq!(config.max_fields, 10);
    }

    #[test]
    fn test_form_config_deserialize_partial() {
        let config: FormConfig = serde_json::from_str(r#"{ "max_fields": 5 }"#).unwrap();

        assert_eq!(config.max_fields, 5);
        assert!(config.empty_as_missing);
    }

    #[test]
    fn test_form_config_rejects_unknown_fields() {
        let result: Result<FormConfig, _> = serde_json::from_str(r#"{ "max_feilds": 5 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_form_config_roundtrip() {
        let config = FormConfig::new().max_fields(3);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: FormConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
