//! Core parser trait.
//!
//! The [`Parser`] trait is the contract shared by every adapter.

use crate::ParseResult;

/// Trait for adapters that expose keyed lookup over a wrapped input.
///
/// Each adapter owns exactly one input for its lifetime and implements
/// lookup for its own input shape; there is no shared lookup algorithm.
/// Typed accessors are inherent methods on each adapter.
///
/// # Example
///
/// ```rust
/// use keyparse::{Parser, QueryParser};
///
/// fn require<P: Parser<Key = str, Value = str>>(parser: &P, key: &str) -> String {
///     parser.get(key).map(str::to_string).unwrap_or_default()
/// }
///
/// let query = QueryParser::new("https://example.com/?name=Alice").unwrap();
/// assert_eq!(require(&query, "name"), "Alice");
/// assert_eq!(require(&query, "missing"), "");
/// ```
pub trait Parser {
    /// The wrapped input type.
    type Input;

    /// The key type used for lookup.
    type Key: ?Sized;

    /// The raw value type returned by [`Parser::get`].
    type Value: ?Sized;

    /// Returns the wrapped input.
    fn input(&self) -> &Self::Input;

    /// Consumes the parser and returns the wrapped input.
    fn into_input(self) -> Self::Input
    where
        Self: Sized;

    /// Returns `true` if the key is present.
    fn has(&self, key: &Self::Key) -> bool;

    /// Returns the raw value for the key.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingKey`](crate::ParseError::MissingKey) if
    /// the key is absent.
    fn get(&self, key: &Self::Key) -> ParseResult<&Self::Value>;
}
