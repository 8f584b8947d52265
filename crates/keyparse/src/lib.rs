//! # keyparse
//!
//! Fail-fast, typed extraction of values from loosely-typed inputs.
//!
//! Each parser wraps one input and exposes typed accessors. An accessor
//! either returns the narrowed value or a [`ParseError`] describing why the
//! key could not be read.
//!
//! ## Parsers
//!
//! | Parser | Input | Description |
//! |--------|-------|-------------|
//! | [`ObjectParser`] | [`Object`] | Typed access to arbitrary key/value mappings |
//! | [`QueryParser`] | [`QueryParams`], URI, request, URL text | Query string parameters |
//! | [`FormParser`] | [`FormData`] | Multi-valued text and file form fields |
//!
//! ## Example
//!
//! ```rust
//! use keyparse::{ObjectParser, QueryParser, FormData, FormParser};
//! use serde_json::json;
//!
//! let user = ObjectParser::try_from(json!({ "name": "Alice", "age": 20 })).unwrap();
//! assert_eq!(user.string("name").unwrap(), "Alice");
//!
//! let query = QueryParser::new("https://example.com/?page=2").unwrap();
//! assert_eq!(query.number("page").unwrap(), 2.0);
//!
//! let form = FormParser::new(FormData::from_urlencoded("remember=on").unwrap());
//! assert!(form.boolean("remember"));
//! ```
//!
//! ## Error Handling
//!
//! All accessors return [`ParseError`], which has four kinds:
//!
//! - `MissingKey`: the key is absent
//! - `InvalidType`: the value has the wrong runtime type
//! - `InvalidInstanceOf`: the value is not an instance of a required class
//! - `Coercion`: text could not be converted to the requested type
//!
//! ```rust
//! use keyparse::{ErrorKind, QueryParser};
//!
//! let query = QueryParser::from_query_string("name=Alice").unwrap();
//! let err = query.get("missing").unwrap_err();
//!
//! assert_eq!(err.kind(), ErrorKind::MissingKey);
//! assert_eq!(err.to_string(), r#"Key "missing" does not exist"#);
//! assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
//! ```

#![doc(html_root_url = "https://docs.rs/keyparse/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod form;
mod multipart;
mod object;
mod parser;
mod query;
mod value;

pub use config::{FormConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FIELDS, DEFAULT_MAX_FIELD_SIZE};
pub use error::{ErrorKind, ParseError, ParseResult};
pub use form::{FormData, FormParser, FormValue};
pub use multipart::{FormDataError, UploadedFile};
pub use object::{Object, ObjectParser};
pub use parser::Parser;
pub use query::{QueryInput, QueryParams, QueryParser};
pub use value::{Callable, Class, Date, Instance, Key, Symbol, TypeTag, Value};
