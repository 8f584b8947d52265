//! Form data parser.
//!
//! [`FormParser`] reads typed values from a multi-valued [`FormData`]
//! mapping, where each key may carry several text or file entries.

use bytes::Bytes;
use http::HeaderMap;

use crate::multipart::{FormDataError, UploadedFile};
use crate::value::{coerce_number, TypeTag};
use crate::{FormConfig, ParseError, ParseResult, Parser};

/// A single form entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Text entry.
    Text(String),
    /// Numeric entry.
    Number(f64),
    /// File entry.
    File(UploadedFile),
}

impl FormValue {
    /// Returns the runtime type tag.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Text(_) => TypeTag::String,
            Self::Number(_) => TypeTag::Number,
            Self::File(_) => TypeTag::File,
        }
    }

    /// Returns the text, if this is a text entry.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the file, if this is a file entry.
    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::File(_) => true,
        }
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for FormValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<UploadedFile> for FormValue {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

/// Ordered multi-valued form mapping.
///
/// Entries keep their insertion order across keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Returns [`FormDataError::Malformed`] if the body cannot be decoded.
    pub fn from_urlencoded(body: &str) -> Result<Self, FormDataError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)
            .map_err(|e| FormDataError::Malformed(e.to_string()))?;
        Ok(pairs.into_iter().collect())
    }

    /// Adds an entry without touching existing entries for the key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Replaces all entries for the key with a single entry.
    ///
    /// The new entry takes the position of the first existing one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        let key = key.into();
        let mut value = Some(value.into());
        self.entries.retain_mut(|(name, entry)| {
            if *name != key {
                return true;
            }
            match value.take() {
                Some(new) => {
                    *entry = new;
                    true
                }
                None => false,
            }
        });
        if let Some(value) = value {
            self.entries.push((key, value));
        }
    }

    /// Removes every entry for the key.
    pub fn delete(&mut self, key: &str) {
        self.entries.retain(|(name, _)| name != key);
    }

    /// Returns the first entry for the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns every entry for the key, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&FormValue> {
        self.entries
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value)
            .collect()
    }

    /// Returns `true` if at least one entry exists for the key.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }

    /// Iterates all entries in order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FormValue>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Parser over form submissions.
///
/// # Example
///
/// ```rust
/// use keyparse::{FormData, FormParser};
///
/// let data = FormData::from_urlencoded("age=25&subscribe=on&tags=a&tags=b").unwrap();
/// let form = FormParser::new(data);
///
/// assert_eq!(form.number("age").unwrap(), 25.0);
/// assert!(form.boolean("subscribe"));
/// assert!(!form.boolean("missing"));
/// assert_eq!(form.string_array("tags"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FormParser {
    input: FormData,
    config: FormConfig,
}

impl FormParser {
    /// Creates a parser with the default configuration.
    #[must_use]
    pub fn new(input: FormData) -> Self {
        Self::with_config(input, FormConfig::default())
    }

    /// Creates a parser with a custom configuration.
    #[must_use]
    pub fn with_config(input: FormData, config: FormConfig) -> Self {
        tracing::trace!(entries = input.len(), "form parser created");
        Self { input, config }
    }

    /// Decodes a multipart body and wraps it.
    ///
    /// # Errors
    ///
    /// See [`FormData::from_multipart`].
    pub async fn from_multipart(
        headers: &HeaderMap,
        body: Bytes,
        config: FormConfig,
    ) -> Result<Self, FormDataError> {
        let input = FormData::from_multipart(headers, body, &config).await?;
        Ok(Self::with_config(input, config))
    }

    /// Returns the wrapped form data.
    #[must_use]
    pub fn input(&self) -> &FormData {
        &self.input
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Returns `true` if at least one entry exists for the key.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.input.has(key)
    }

    /// Returns the first entry for the key.
    ///
    /// With [`FormConfig::empty_as_missing`] enabled (the default), an empty
    /// first entry is reported as missing, the same as an unsent field.
    pub fn get(&self, key: &str) -> ParseResult<&FormValue> {
        match self.input.get(key) {
            Some(value) if !self.config.empty_as_missing || value.is_truthy() => Ok(value),
            _ => Err(ParseError::missing_key(key).traced()),
        }
    }

    /// Returns every entry for the key; an absent key yields an empty list.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&FormValue> {
        self.input.get_all(key)
    }

    /// Checkbox convention: `true` only if the first entry is the text `"on"`.
    #[must_use]
    pub fn boolean(&self, key: &str) -> bool {
        matches!(self.input.get(key), Some(FormValue::Text(text)) if text == "on")
    }

    /// Returns the first entry as text.
    pub fn string(&self, key: &str) -> ParseResult<&str> {
        match self.get(key)? {
            FormValue::Text(text) => Ok(text),
            other => Err(ParseError::invalid_type(key, TypeTag::String, other.type_tag()).traced()),
        }
    }

    /// Returns the first entry as a file.
    pub fn file(&self, key: &str) -> ParseResult<&UploadedFile> {
        self.get(key)?
            .as_file()
            .ok_or_else(|| ParseError::invalid_instance_of(key, "File").traced())
    }

    /// Returns the text entries for the key, skipping files.
    #[must_use]
    pub fn string_array(&self, key: &str) -> Vec<&str> {
        self.input
            .get_all(key)
            .into_iter()
            .filter_map(FormValue::as_text)
            .collect()
    }

    /// Returns the file entries for the key, skipping text.
    #[must_use]
    pub fn file_array(&self, key: &str) -> Vec<&UploadedFile> {
        self.input
            .get_all(key)
            .into_iter()
            .filter_map(FormValue::as_file)
            .collect()
    }

    /// Returns the first entry as a number, converting text.
    pub fn number(&self, key: &str) -> ParseResult<f64> {
        match self.get(key)? {
            FormValue::Number(n) => Ok(*n),
            FormValue::Text(text) => {
                coerce_number(text).ok_or_else(|| ParseError::coercion(key, "number").traced())
            }
            other => Err(ParseError::invalid_type(key, TypeTag::Number, other.type_tag()).traced()),
        }
    }

    /// Replaces all entries for the key with a single text value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.input.set(key, FormValue::Text(value.into()));
    }
}

impl From<FormData> for FormParser {
    fn from(input: FormData) -> Self {
        Self::new(input)
    }
}

impl Parser for FormParser {
    type Input = FormData;
    type Key = str;
    type Value = FormValue;

    fn input(&self) -> &FormData {
        &self.input
    }

    fn into_input(self) -> FormData {
        self.input
    }

    fn has(&self, key: &str) -> bool {
        FormParser::has(self, key)
    }

    fn get(&self, key: &str) -> ParseResult<&FormValue> {
        FormParser::get(self, key)
    }
}
