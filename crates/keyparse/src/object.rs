//! Typed access to arbitrary key/value mappings.
//!
//! [`ObjectParser`] wraps an [`Object`] and narrows its properties to
//! concrete types, failing with a [`ParseError`] on the first mismatch.

use indexmap::IndexMap;

use crate::value::{Callable, Class, Date, Key, Symbol, TypeTag, Value};
use crate::{ParseError, ParseResult, Parser};

/// Ordered key/value mapping with an optional prototype.
///
/// Lookups fall back to the prototype chain, so a property is present when
/// the object or any of its prototypes defines it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    properties: IndexMap<Key, Value>,
    prototype: Option<Box<Object>>,
}

impl Object {
    /// Creates an empty object with no prototype.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property and returns the object.
    #[must_use]
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets the prototype and returns the object.
    #[must_use]
    pub fn with_prototype(mut self, prototype: Object) -> Self {
        self.prototype = Some(Box::new(prototype));
        self
    }

    /// Inserts an own property, returning the previous own value.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// Returns the property, searching the prototype chain.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        let mut current = Some(self);
        while let Some(object) = current {
            if let Some(value) = object.properties.get(key) {
                return Some(value);
            }
            current = object.prototype.as_deref();
        }
        None
    }

    /// Returns an own property, ignoring the prototype chain.
    #[must_use]
    pub fn get_own(&self, key: &Key) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns `true` if the property is own or inherited.
    #[must_use]
    pub fn has(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` if the property is an own property.
    #[must_use]
    pub fn has_own(&self, key: &Key) -> bool {
        self.properties.contains_key(key)
    }

    /// Iterates own keys in insertion order.
    pub fn own_keys(&self) -> impl Iterator<Item = &Key> {
        self.properties.keys()
    }

    /// Returns the prototype, if any.
    #[must_use]
    pub fn prototype(&self) -> Option<&Object> {
        self.prototype.as_deref()
    }

    /// Number of own properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if there are no own properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            prototype: None,
        }
    }
}

/// Parser over an arbitrary key/value mapping.
///
/// # Example
///
/// ```rust
/// use keyparse::{ObjectParser, Value};
/// use serde_json::json;
///
/// let parser = ObjectParser::new(Value::from(json!({
///     "name": "Alice",
///     "age": 20,
///     "active": true,
/// })))
/// .unwrap();
///
/// assert_eq!(parser.string("name").unwrap(), "Alice");
/// assert_eq!(parser.number("age").unwrap(), 20.0);
/// assert!(parser.boolean("active").unwrap());
///
/// let err = parser.string("age").unwrap_err();
/// assert_eq!(err.to_string(), r#"Key "age" expected string but got number"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectParser {
    input: Object,
}

impl ObjectParser {
    /// Wraps a value that must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidType`] with key `"object"` when `value`
    /// is anything other than [`Value::Object`].
    pub fn new(value: impl Into<Value>) -> ParseResult<Self> {
        match value.into() {
            Value::Object(input) => {
                tracing::trace!(properties = input.len(), "object parser created");
                Ok(Self { input })
            }
            other => Err(ParseError::invalid_type("object", "object", other.type_tag()).traced()),
        }
    }

    /// Returns the wrapped object.
    #[must_use]
    pub fn input(&self) -> &Object {
        &self.input
    }

    /// Returns `true` if the key is an own or inherited property.
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.input.has(&key.into())
    }

    /// Returns the raw value.
    pub fn get(&self, key: impl Into<Key>) -> ParseResult<&Value> {
        let key = key.into();
        self.input
            .get(&key)
            .ok_or_else(|| ParseError::missing_key(&key).traced())
    }

    /// Returns the runtime type tag of the value.
    pub fn type_of(&self, key: impl Into<Key>) -> ParseResult<TypeTag> {
        self.get(key).map(Value::type_tag)
    }

    /// Returns the value as text.
    pub fn string(&self, key: impl Into<Key>) -> ParseResult<&str> {
        let key = key.into();
        match self.get(&key)? {
            Value::String(s) => Ok(s),
            other => Err(mismatch(&key, TypeTag::String, other)),
        }
    }

    /// Returns the value as a number.
    pub fn number(&self, key: impl Into<Key>) -> ParseResult<f64> {
        let key = key.into();
        match self.get(&key)? {
            Value::Number(n) => Ok(*n),
            other => Err(mismatch(&key, TypeTag::Number, other)),
        }
    }

    /// Returns the value as a boolean.
    pub fn boolean(&self, key: impl Into<Key>) -> ParseResult<bool> {
        let key = key.into();
        match self.get(&key)? {
            Value::Boolean(b) => Ok(*b),
            other => Err(mismatch(&key, TypeTag::Boolean, other)),
        }
    }

    /// Returns the value as a large integer.
    pub fn bigint(&self, key: impl Into<Key>) -> ParseResult<i128> {
        let key = key.into();
        match self.get(&key)? {
            Value::BigInt(n) => Ok(*n),
            other => Err(mismatch(&key, TypeTag::BigInt, other)),
        }
    }

    /// Returns the value as a callable.
    pub fn function(&self, key: impl Into<Key>) -> ParseResult<&Callable> {
        let key = key.into();
        match self.get(&key)? {
            Value::Function(f) => Ok(f),
            other => Err(mismatch(&key, TypeTag::Function, other)),
        }
    }

    /// Returns the value as a symbol.
    pub fn symbol(&self, key: impl Into<Key>) -> ParseResult<&Symbol> {
        let key = key.into();
        match self.get(&key)? {
            Value::Symbol(s) => Ok(s),
            other => Err(mismatch(&key, TypeTag::Symbol, other)),
        }
    }

    /// Returns the value as an ordered sequence.
    pub fn array(&self, key: impl Into<Key>) -> ParseResult<&[Value]> {
        let key = key.into();
        match self.get(&key)? {
            Value::Array(items) => Ok(items),
            other => Err(mismatch(&key, TypeTag::Array, other)),
        }
    }

    /// Returns the nested object wrapped in a new parser.
    pub fn object(&self, key: impl Into<Key>) -> ParseResult<ObjectParser> {
        let key = key.into();
        match self.get(&key)? {
            Value::Object(object) => Ok(Self {
                input: object.clone(),
            }),
            other => Err(mismatch(&key, TypeTag::Object, other)),
        }
    }

    /// Returns `true` if the value is null.
    pub fn is_null(&self, key: impl Into<Key>) -> ParseResult<bool> {
        self.get(key).map(Value::is_null)
    }

    /// Returns `true` if the value is undefined.
    ///
    /// A missing key is an error, not `true`.
    pub fn is_undefined(&self, key: impl Into<Key>) -> ParseResult<bool> {
        self.get(key).map(Value::is_undefined)
    }

    /// Returns the value as a date.
    pub fn date(&self, key: impl Into<Key>) -> ParseResult<&Date> {
        self.instance_of::<Date>(key)
    }

    /// Returns the value as an instance of `T`.
    pub fn instance_of<T: Class>(&self, key: impl Into<Key>) -> ParseResult<&T> {
        let key = key.into();
        T::narrow(self.get(&key)?)
            .ok_or_else(|| ParseError::invalid_instance_of(&key, T::NAME).traced())
    }
}

impl From<Object> for ObjectParser {
    fn from(input: Object) -> Self {
        Self { input }
    }
}

impl TryFrom<serde_json::Value> for ObjectParser {
    type Error = ParseError;

    fn try_from(value: serde_json::Value) -> ParseResult<Self> {
        Self::new(Value::from(value))
    }
}

impl Parser for ObjectParser {
    type Input = Object;
    type Key = Key;
    type Value = Value;

    fn input(&self) -> &Object {
        &self.input
    }

    fn into_input(self) -> Object {
        self.input
    }

    fn has(&self, key: &Key) -> bool {
        self.input.has(key)
    }

    fn get(&self, key: &Key) -> ParseResult<&Value> {
        ObjectParser::get(self, key)
    }
}

fn mismatch(key: &Key, expected: TypeTag, actual: &Value) -> ParseError {
    ParseError::invalid_type(key, expected, actual.type_tag()).traced()
}
