//! Query string parser.
//!
//! [`QueryParser`] reads string values from a flat query mapping. The
//! mapping can be built from parsed parameters, a URI, a request, or URL
//! text; every shape is normalized once at construction.

use http::{Request, Uri};
use indexmap::IndexMap;

use crate::value::coerce_number;
use crate::{ParseError, ParseResult, Parser};

/// Flat, ordered `String -> String` query mapping.
///
/// Repeated keys keep their first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: IndexMap<String, String>,
}

impl QueryParams {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL-encoded query string, with or without a leading `?`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Coercion`] with key `"query"` if the string
    /// cannot be decoded.
    pub fn parse(query: &str) -> ParseResult<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|_| ParseError::coercion("query", "query string").traced())?;
        Ok(pairs.into_iter().collect())
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    /// Returns `true` if the key is present, even with an empty value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    /// Sets a value, replacing any existing one in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(key.into(), value.into());
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.pairs.shift_remove(key)
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.keys().map(String::as_str)
    }

    /// Iterates key/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encodes the mapping as a URL-encoded query string without `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<(&str, &str)> = self.iter().collect();
        // String pairs always serialize.
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs = IndexMap::new();
        for (key, value) in iter {
            pairs.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { pairs }
    }
}

/// Input shapes accepted by [`QueryParser::new`].
#[derive(Debug, Clone)]
pub enum QueryInput {
    /// Already-parsed parameters.
    Params(QueryParams),
    /// A URI whose query component is used.
    Uri(Uri),
    /// URL text, parsed as a URI.
    Text(String),
}

impl From<QueryParams> for QueryInput {
    fn from(params: QueryParams) -> Self {
        Self::Params(params)
    }
}

impl From<Uri> for QueryInput {
    fn from(uri: Uri) -> Self {
        Self::Uri(uri)
    }
}

impl From<&Uri> for QueryInput {
    fn from(uri: &Uri) -> Self {
        Self::Uri(uri.clone())
    }
}

impl<B> From<&Request<B>> for QueryInput {
    fn from(request: &Request<B>) -> Self {
        Self::Uri(request.uri().clone())
    }
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Parser over URL query parameters.
///
/// # Example
///
/// ```rust
/// use keyparse::QueryParser;
/// use http::Request;
///
/// let request = Request::builder()
///     .uri("https://example.com/users?limit=10&search=rust+lang")
///     .body(())
///     .unwrap();
///
/// let mut query = QueryParser::new(&request).unwrap();
/// assert_eq!(query.get("search").unwrap(), "rust lang");
/// assert_eq!(query.number("limit").unwrap(), 10.0);
///
/// query.set("offset", "20");
/// assert!(query.has("offset"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParser {
    input: QueryParams,
}

impl QueryParser {
    /// Creates a parser from any accepted input shape.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Coercion`] with key `"url"` when URL text is
    /// not an absolute URL or an origin-form path such as `/search?q=x`, or with key `"query"` when the query component
    /// cannot be decoded.
    pub fn new(input: impl Into<QueryInput>) -> ParseResult<Self> {
        let input = match input.into() {
            QueryInput::Params(params) => params,
            QueryInput::Uri(uri) => params_from_uri(&uri)?,
            QueryInput::Text(text) => {
                let uri = parse_url(&text)?;
                params_from_uri(&uri)?
            }
        };
        tracing::trace!(params = input.len(), "query parser created");
        Ok(Self { input })
    }

    /// Creates a parser from a raw query string such as `"a=1&b=2"`.
    ///
    /// # Errors
    ///
    /// See [`QueryParams::parse`].
    pub fn from_query_string(query: &str) -> ParseResult<Self> {
        QueryParams::parse(query).map(Self::from)
    }

    /// Returns the wrapped parameters.
    #[must_use]
    pub fn input(&self) -> &QueryParams {
        &self.input
    }

    /// Returns `true` if the key is present, even with an empty value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.input.contains_key(key)
    }

    /// Returns the value for the key.
    ///
    /// An empty value is returned as `""`; only absence is an error.
    pub fn get(&self, key: &str) -> ParseResult<&str> {
        self.input
            .get(key)
            .ok_or_else(|| ParseError::missing_key(key).traced())
    }

    /// Same as [`QueryParser::get`].
    pub fn string(&self, key: &str) -> ParseResult<&str> {
        self.get(key)
    }

    /// Returns the value converted to a number.
    pub fn number(&self, key: &str) -> ParseResult<f64> {
        let text = self.get(key)?;
        coerce_number(text).ok_or_else(|| ParseError::coercion(key, "number").traced())
    }

    /// Returns the value converted to a boolean (`"true"` or `"false"`).
    pub fn boolean(&self, key: &str) -> ParseResult<bool> {
        match self.get(key)? {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ParseError::coercion(key, "boolean").traced()),
        }
    }

    /// Sets a value in the wrapped parameters.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.input.set(key, value);
    }

    /// Removes a key from the wrapped parameters.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.input.remove(key)
    }
}

impl From<QueryParams> for QueryParser {
    fn from(input: QueryParams) -> Self {
        Self { input }
    }
}

impl Parser for QueryParser {
    type Input = QueryParams;
    type Key = str;
    type Value = str;

    fn input(&self) -> &QueryParams {
        &self.input
    }

    /// Hands back the owned parameters, including mutations.
    ///
    /// Repeated keys were collapsed to their first value at construction,
    /// so `?tag=a&tag=b` comes back as `tag=a`.
    fn into_input(self) -> QueryParams {
        self.input
    }

    fn has(&self, key: &str) -> bool {
        QueryParser::has(self, key)
    }

    fn get(&self, key: &str) -> ParseResult<&str> {
        QueryParser::get(self, key)
    }
}

/// Parses URL text, rejecting authority-only and bare text such as
/// `example.com` or `name=Alice`.
fn parse_url(text: &str) -> ParseResult<Uri> {
    let invalid = || ParseError::coercion("url", "URL").traced();
    let uri: Uri = text.parse().map_err(|_| invalid())?;
    let origin_form = uri
        .path_and_query()
        .is_some_and(|pq| pq.path().starts_with('/'));
    if uri.scheme().is_some() || origin_form {
        Ok(uri)
    } else {
        Err(invalid())
    }
}

fn params_from_uri(uri: &Uri) -> ParseResult<QueryParams> {
    uri.query()
        .map_or_else(|| Ok(QueryParams::new()), QueryParams::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const URL: &str = "https://example.com/users?name=Alice&age=20&empty=&tag=a&tag=b";

    #[test]
    fn test_get_from_raw_query() {
        let query = QueryParser::from_query_string("name=Alice").unwrap();

        assert_eq!(query.get("name").unwrap(), "Alice");
        assert_eq!(
            query.get("missing").unwrap_err().to_string(),
            r#"Key "missing" does not exist"#
        );
    }

    #[test]
    fn test_leading_question_mark() {
        let params = QueryParams::parse("?a=1").unwrap();
        assert_eq!(params.get("a"), Some("1"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let query = QueryParser::new(URL).unwrap();

        assert!(query.has("empty"));
        assert_eq!(query.get("empty").unwrap(), "");
    }

    #[test]
    fn test_repeated_key_keeps_first() {
        let query = QueryParser::new(URL).unwrap();
        assert_eq!(query.get("tag").unwrap(), "a");
    }

    #[test]
    fn test_input_shapes_agree() {
        let uri: Uri = URL.parse().unwrap();
        let request = Request::builder().uri(URL).body(()).unwrap();
        let params = QueryParams::parse(uri.query().unwrap()).unwrap();

        let parsers = [
            QueryParser::new(&uri).unwrap(),
            QueryParser::new(URL).unwrap(),
            QueryParser::new(&request).unwrap(),
            QueryParser::new(params).unwrap(),
        ];

        for parser in &parsers[1..] {
            assert_eq!(parser, &parsers[0]);
        }
        for key in ["name", "age", "empty", "tag", "missing"] {
            let expected = parsers[0].get(key).ok();
            for parser in &parsers {
                assert_eq!(parser.get(key).ok(), expected);
            }
        }
    }

    #[test]
    fn test_uri_without_query() {
        let query = QueryParser::new("https://example.com/").unwrap();
        assert!(query.input().is_empty());
        assert!(!query.has("anything"));
    }

    #[test]
    fn test_invalid_url_text() {
        let err = QueryParser::new("not a url").unwrap_err();
        assert_eq!(err, ParseError::coercion("url", "URL"));
    }

    #[test]
    fn test_bare_query_text_is_not_a_url() {
        let err = QueryParser::new("name=Alice").unwrap_err();
        assert_eq!(err, ParseError::coercion("url", "URL"));
    }

    #[test]
    fn test_authority_only_text_is_not_a_url() {
        let err = QueryParser::new("example.com").unwrap_err();
        assert_eq!(err, ParseError::coercion("url", "URL"));
    }

    #[test]
    fn test_percent_decoding() {
        let query = QueryParser::new("/search?q=rust+lang&sym=%26%3D").unwrap();

        assert_eq!(query.get("q").unwrap(), "rust lang");
        assert_eq!(query.get("sym").unwrap(), "&=");
    }

    #[test]
    fn test_set_then_get() {
        let mut query = QueryParser::new(URL).unwrap();

        query.set("name", "Bob");
        query.set("page", "2");

        assert_eq!(query.get("name").unwrap(), "Bob");
        assert!(query.has("page"));
        assert_eq!(query.get("page").unwrap(), "2");
        assert_eq!(query.input().keys().next(), Some("name"));
    }

    #[test]
    fn test_remove() {
        let mut query = QueryParser::new(URL).unwrap();

        assert_eq!(query.remove("name"), Some("Alice".to_string()));
        assert!(!query.has("name"));
    }

    #[test]
    fn test_number_and_boolean() {
        let query = QueryParser::from_query_string("n=25&bad=abc&t=true&f=false&x=yes").unwrap();

        assert_eq!(query.number("n").unwrap(), 25.0);
        assert_eq!(query.number("bad").unwrap_err().kind(), ErrorKind::Coercion);
        assert!(query.boolean("t").unwrap());
        assert!(!query.boolean("f").unwrap());
        assert_eq!(
            query.boolean("x").unwrap_err().to_string(),
            r#"Key "x" could not be coerced to boolean"#
        );
        assert_eq!(query.number("missing").unwrap_err().kind(), ErrorKind::MissingKey);
    }

    #[test]
    fn test_to_query_string() {
        let mut params = QueryParams::new();
        params.set("q", "rust lang");
        params.set("page", "1");

        assert_eq!(params.to_query_string(), "q=rust+lang&page=1");
        assert_eq!(QueryParams::parse(&params.to_query_string()).unwrap(), params);
    }

    #[test]
    fn test_into_input_returns_mutations() {
        let mut query = QueryParser::from_query_string("a=1").unwrap();
        query.set("b", "2");

        let params = Parser::into_input(query);
        assert_eq!(params.get("b"), Some("2"));
    }

    #[test]
    fn test_into_input_drops_repeated_values() {
        let query = QueryParser::new("https://example.com/?tag=a&tag=b").unwrap();

        let params = Parser::into_input(query);
        assert_eq!(params.to_query_string(), "tag=a");
    }
}
