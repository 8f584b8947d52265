//! Loosely-typed values and keys.
//!
//! [`Value`] is the closed set of shapes a loosely-typed input can hold.
//! Accessors narrow a `Value` to one variant or fail with a typed error;
//! nothing here inspects types dynamically beyond matching on the enum.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::multipart::UploadedFile;
use crate::object::Object;

/// Point in time stored by [`Value::Date`].
pub type Date = DateTime<Utc>;

/// Runtime type tag of a [`Value`].
///
/// The display text is what appears as the actual type in
/// [`ParseError::InvalidType`](crate::ParseError::InvalidType).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `bigint`
    BigInt,
    /// `function`
    Function,
    /// `symbol`
    Symbol,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `date`
    Date,
    /// `file`
    File,
    /// `instance`
    Instance,
}

impl TypeTag {
    /// Returns the tag's name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::BigInt => "bigint",
            Self::Function => "function",
            Self::Symbol => "symbol",
            Self::Array => "array",
            Self::Object => "object",
            Self::Date => "date",
            Self::File => "file",
            Self::Instance => "instance",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unique token, equal only to itself and its clones.
///
/// Two symbols created with the same description are distinct.
#[derive(Clone)]
pub struct Symbol(Arc<Option<String>>);

impl Symbol {
    /// Creates a new symbol with a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self(Arc::new(Some(description.into())))
    }

    /// Creates a new symbol without a description.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Arc::new(None))
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A named callable value.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl Callable {
    /// Wraps a closure as a callable value.
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.name)
    }
}

/// A value of an arbitrary Rust type tagged with a class name.
///
/// User types become narrowable through [`Value::instance_of`] by
/// implementing [`Class`] with [`Instance::downcast_ref`].
#[derive(Clone)]
pub struct Instance {
    class_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wraps `value` as an instance of `T`.
    pub fn new<T: Class + Any + Send + Sync>(value: T) -> Self {
        Self {
            class_name: T::NAME,
            inner: Arc::new(value),
        }
    }

    /// Returns the class name the instance was created with.
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

/// A loosely-typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Text.
    String(String),
    /// Double-precision number.
    Number(f64),
    /// Boolean.
    Boolean(bool),
    /// Large integer.
    BigInt(i128),
    /// Callable.
    Function(Callable),
    /// Unique token.
    Symbol(Symbol),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Key/value mapping.
    Object(Object),
    /// Point in time.
    Date(Date),
    /// Uploaded file.
    File(UploadedFile),
    /// Value of a user-defined class.
    Instance(Instance),
}

impl Value {
    /// Returns the runtime type tag.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Undefined => TypeTag::Undefined,
            Self::Null => TypeTag::Null,
            Self::String(_) => TypeTag::String,
            Self::Number(_) => TypeTag::Number,
            Self::Boolean(_) => TypeTag::Boolean,
            Self::BigInt(_) => TypeTag::BigInt,
            Self::Function(_) => TypeTag::Function,
            Self::Symbol(_) => TypeTag::Symbol,
            Self::Array(_) => TypeTag::Array,
            Self::Object(_) => TypeTag::Object,
            Self::Date(_) => TypeTag::Date,
            Self::File(_) => TypeTag::File,
            Self::Instance(_) => TypeTag::Instance,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for [`Value::Undefined`].
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Loose truthiness: `undefined`, `null`, `false`, `0`, `NaN`, `""` and
    /// `0n` are falsy, everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::BigInt(n) => *n != 0,
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Narrows to a class implementing [`Class`].
    #[must_use]
    pub fn instance_of<T: Class>(&self) -> Option<&T> {
        T::narrow(self)
    }
}

/// A type that values can be checked against structurally.
///
/// # Example
///
/// ```rust
/// use keyparse::{Class, Instance, ObjectParser, Object, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Money(u64);
///
/// impl Class for Money {
///     const NAME: &'static str = "Money";
///
///     fn narrow(value: &Value) -> Option<&Self> {
///         match value {
///             Value::Instance(instance) => instance.downcast_ref(),
///             _ => None,
///         }
///     }
/// }
///
/// let parser = ObjectParser::from(Object::new().with("price", Instance::new(Money(250))));
/// assert_eq!(parser.instance_of::<Money>("price").unwrap(), &Money(250));
/// ```
pub trait Class: Sized {
    /// Display name used in
    /// [`ParseError::InvalidInstanceOf`](crate::ParseError::InvalidInstanceOf).
    const NAME: &'static str;

    /// Returns the value as `Self` if it is an instance.
    fn narrow(value: &Value) -> Option<&Self>;
}

impl Class for Date {
    const NAME: &'static str = "Date";

    fn narrow(value: &Value) -> Option<&Self> {
        match value {
            Value::Date(date) => Some(date),
            _ => None,
        }
    }
}

impl Class for UploadedFile {
    const NAME: &'static str = "File";

    fn narrow(value: &Value) -> Option<&Self> {
        match value {
            Value::File(file) => Some(file),
            _ => None,
        }
    }
}

impl Class for Object {
    const NAME: &'static str = "Object";

    fn narrow(value: &Value) -> Option<&Self> {
        match value {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl Class for Vec<Value> {
    const NAME: &'static str = "Array";

    fn narrow(value: &Value) -> Option<&Self> {
        match value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Self::BigInt(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Self::Function(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<UploadedFile> for Value {
    fn from(value: UploadedFile) -> Self {
        Self::File(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Self::Instance(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (Key::from(key), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Converts text to a number after trimming.
///
/// Accepts decimal and exponent notation, an optionally signed `Infinity`,
/// and unsigned `0x`/`0o`/`0b` integers. Empty text, `NaN` and the other
/// spellings `f64::from_str` allows (`inf`, `infinity`) yield `None`.
pub(crate) fn coerce_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if let Some(n) = coerce_radix(trimmed) {
        return Some(n);
    }
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return Some(if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn coerce_radix(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc.mul_add(f64::from(radix), f64::from(d)))
    })
}

/// A property key.
///
/// Textual keys in canonical decimal form (`"0"`, `"42"`, not `"01"`) are
/// stored as [`Key::Index`], so `Key::from("3") == Key::from(3usize)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Named property.
    Name(String),
    /// Integer index.
    Index(usize),
    /// Symbol-keyed property.
    Symbol(Symbol),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
            Self::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        match value.parse::<usize>() {
            Ok(index) if index.to_string() == value => Self::Index(index),
            _ => Self::Name(value),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl From<Symbol> for Key {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<&Symbol> for Key {
    fn from(value: &Symbol) -> Self {
        Self::Symbol(value.clone())
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_type_tags() {
        assert_eq!(Value::from("a").type_tag(), TypeTag::String);
        assert_eq!(Value::from(1.5).type_tag(), TypeTag::Number);
        assert_eq!(Value::from(true).type_tag(), TypeTag::Boolean);
        assert_eq!(Value::from(7_i128).type_tag(), TypeTag::BigInt);
        assert_eq!(Value::Null.type_tag().to_string(), "null");
        assert_eq!(Value::Undefined.type_tag().to_string(), "undefined");
        assert_eq!(Value::Array(vec![]).type_tag().to_string(), "array");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from(0_i128).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn test_symbol_identity() {
        let a = Symbol::new("id");
        let b = Symbol::new("id");

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "Symbol(id)");
        assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
    }

    #[test]
    fn test_callable_invocation() {
        let double = Callable::new("double", |args| match args.first() {
            Some(Value::Number(n)) => Value::Number(n * 2.0),
            _ => Value::Undefined,
        });

        assert_eq!(double.name(), "double");
        assert_eq!(double.call(&[Value::from(4)]), Value::Number(8.0));
        assert_eq!(format!("{double:?}"), "[Function: double]");
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("25"), Some(25.0));
        assert_eq!(coerce_number(" -1.5 "), Some(-1.5));
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("twenty-five"), None);
        assert_eq!(coerce_number("1e3"), Some(1000.0));
        assert_eq!(coerce_number(".5"), Some(0.5));
    }

    #[test]
    fn test_coerce_number_infinity_spellings() {
        assert_eq!(coerce_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(coerce_number("+Infinity"), Some(f64::INFINITY));
        assert_eq!(coerce_number(" -Infinity "), Some(f64::NEG_INFINITY));
        assert_eq!(coerce_number("inf"), None);
        assert_eq!(coerce_number("-inf"), None);
        assert_eq!(coerce_number("infinity"), None);
        assert_eq!(coerce_number("INFINITY"), None);
        assert_eq!(coerce_number("nan"), None);
    }

    #[test]
    fn test_coerce_number_radix_prefixes() {
        assert_eq!(coerce_number("0x10"), Some(16.0));
        assert_eq!(coerce_number("0XfF"), Some(255.0));
        assert_eq!(coerce_number("0o17"), Some(15.0));
        assert_eq!(coerce_number("0b101"), Some(5.0));
        assert_eq!(coerce_number("0x"), None);
        assert_eq!(coerce_number("0x1g"), None);
        assert_eq!(coerce_number("-0x10"), None);
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(Key::from("3"), Key::Index(3));
        assert_eq!(Key::from("03"), Key::Name("03".to_string()));
        assert_eq!(Key::from("name"), Key::Name("name".to_string()));
        assert_eq!(Key::from(3usize).to_string(), "3");
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(serde_json::json!({
            "name": "Alice",
            "tags": ["a", 1],
            "meta": null,
        }));

        let Value::Object(object) = value else {
            panic!("expected object");
        };
        assert_eq!(object.get(&Key::from("name")), Some(&Value::from("Alice")));
        assert_eq!(
            object.get(&Key::from("tags")),
            Some(&Value::Array(vec![Value::from("a"), Value::from(1)]))
        );
        assert_eq!(object.get(&Key::from("meta")), Some(&Value::Null));
    }

    #[test]
    fn test_class_narrowing() {
        let file = UploadedFile::new(None, Some("a.txt".into()), None, Bytes::from_static(b"x"));
        let value = Value::from(file.clone());

        assert_eq!(value.instance_of::<UploadedFile>(), Some(&file));
        assert!(value.instance_of::<Date>().is_none());
        assert_eq!(<Vec<Value> as Class>::NAME, "Array");
    }
}
