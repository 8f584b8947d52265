//! Multipart form decoding and uploaded files.
//!
//! [`FormData::from_multipart`] reads a `multipart/form-data` body into a
//! [`FormData`] mapping: parts with a file name become [`UploadedFile`]
//! entries, all other parts become text.

use bytes::Bytes;
use http::{header, HeaderMap};
use std::io;
use thiserror::Error;

use crate::{FormConfig, FormData, FormValue};

/// Error raised while decoding a form body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormDataError {
    /// No Content-Type header was sent.
    #[error("missing content type: expected '{expected}'")]
    MissingContentType {
        /// The content type that was required.
        expected: &'static str,
    },

    /// The Content-Type header is unusable.
    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    /// The body or a field exceeds the configured limit.
    #[error("payload too large: max {max} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// The configured limit.
        max: usize,
        /// The size that was received.
        actual: usize,
    },

    /// The body has more fields than allowed.
    #[error("too many fields (max {max})")]
    TooManyFields {
        /// The configured limit.
        max: usize,
    },

    /// A text field is not valid UTF-8.
    #[error("field '{field}' is not valid UTF-8")]
    InvalidUtf8 {
        /// The field name.
        field: String,
    },

    /// The body could not be parsed.
    #[error("malformed form body: {0}")]
    Malformed(String),
}

impl FormData {
    /// Decodes a `multipart/form-data` body.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the Content-Type header is missing, not multipart, or has no boundary
    /// - the body, a field, or the field count exceeds the configured limits
    /// - the multipart data is malformed or a text field is not UTF-8
    pub async fn from_multipart(
        headers: &HeaderMap,
        body: Bytes,
        config: &FormConfig,
    ) -> Result<Self, FormDataError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .ok_or(FormDataError::MissingContentType {
                expected: "multipart/form-data",
            })?
            .to_str()
            .map_err(|_| {
                FormDataError::InvalidContentType("invalid UTF-8 in Content-Type header".into())
            })?;

        let mime: mime::Mime = content_type
            .parse()
            .map_err(|_| FormDataError::InvalidContentType(content_type.to_string()))?;
        if mime.type_() != mime::MULTIPART || mime.subtype() != mime::FORM_DATA {
            return Err(FormDataError::InvalidContentType(format!(
                "expected multipart/form-data, got {mime}"
            )));
        }

        let boundary = multer::parse_boundary(content_type).map_err(|_| {
            FormDataError::InvalidContentType(
                "missing or invalid boundary in multipart Content-Type".into(),
            )
        })?;

        if body.len() > config.max_body_size {
            tracing::warn!(
                max = config.max_body_size,
                actual = body.len(),
                "multipart body exceeds limit"
            );
            return Err(FormDataError::PayloadTooLarge {
                max: config.max_body_size,
                actual: body.len(),
            });
        }

        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut data = FormData::new();
        let mut field_count = 0;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormDataError::Malformed(e.to_string()))?
        {
            if field_count >= config.max_fields {
                tracing::warn!(max = config.max_fields, "multipart field count exceeds limit");
                return Err(FormDataError::TooManyFields {
                    max: config.max_fields,
                });
            }
            field_count += 1;

            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| FormDataError::Malformed(format!("failed to read field: {e}")))?;

            if bytes.len() > config.max_field_size {
                tracing::warn!(
                    field = %name,
                    max = config.max_field_size,
                    actual = bytes.len(),
                    "multipart field exceeds limit"
                );
                return Err(FormDataError::PayloadTooLarge {
                    max: config.max_field_size,
                    actual: bytes.len(),
                });
            }

            let value = if file_name.is_some() {
                FormValue::File(UploadedFile::new(
                    Some(name.clone()),
                    file_name,
                    content_type,
                    bytes,
                ))
            } else {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|_| FormDataError::InvalidUtf8 { field: name.clone() })?;
                FormValue::Text(text)
            };
            data.append(name, value);
        }

        tracing::trace!(fields = field_count, "multipart body decoded");
        Ok(data)
    }
}

/// A file part decoded from a multipart body.
///
/// Both the form entry's key and `name` hold the part's field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Field name from `Content-Disposition`.
    pub name: Option<String>,
    /// Client-supplied `filename`, if any.
    pub file_name: Option<String>,
    /// Part `Content-Type`, if sent.
    pub content_type: Option<String>,
    /// Raw part body.
    pub data: Bytes,
}

impl UploadedFile {
    /// Builds a file entry from its parts.
    #[must_use]
    pub fn new(
        name: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name,
            file_name,
            content_type,
            data,
        }
    }

    /// Client-supplied file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Body length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the body has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Text after the last `.` of the file name.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
    }
}
