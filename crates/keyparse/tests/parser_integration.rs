//! End-to-end tests across the three parsers.
//!
//! These tests drive each parser the way a request handler would: build
//! the parser from a request part, read typed values, and turn failures
//! into client-facing messages.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use keyparse::{
    ErrorKind, FormConfig, FormData, FormParser, FormValue, Key, Object, ObjectParser, ParseError,
    Parser, QueryParams, QueryParser, UploadedFile, Value,
};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn multipart_body(boundary: &str) -> Vec<u8> {
    format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"names\"\r\n\r\n\
         Alice\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"names\"; filename=\"bob.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         Bob\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"age\"\r\n\r\n\
         25\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"newsletter\"\r\n\r\n\
         on\r\n\
         --{boundary}--\r\n"
    )
    .into_bytes()
}

#[test]
fn test_object_parser_scenario() {
    init_tracing();
    let parser = ObjectParser::try_from(json!({ "name": "Alice", "age": 20, "active": true }))
        .unwrap();

    assert_eq!(parser.string("name").unwrap(), "Alice");
    assert_eq!(parser.number("age").unwrap(), 20.0);
    assert!(parser.boolean("active").unwrap());

    let err = parser.string("age").unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidType {
            key: "age".into(),
            expected: "string".into(),
            actual: "number".into(),
        }
    );
    assert_eq!(err.to_string(), r#"Key "age" expected string but got number"#);
}

#[test]
fn test_nested_object_round_trip() {
    let address = Object::new().with("city", "Paris").with("zip", 75001);
    let parser = ObjectParser::from(Object::new().with("address", address.clone()));

    let nested = parser.object("address").unwrap();
    assert_eq!(nested.input(), &address);
    assert_eq!(nested.number("zip").unwrap(), 75001.0);
}

#[test]
fn test_query_parser_scenario() {
    init_tracing();
    let query = QueryParser::from_query_string("name=Alice").unwrap();

    assert_eq!(query.get("name").unwrap(), "Alice");
    let err = query.get("missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingKey);
    assert_eq!(err.to_string(), r#"Key "missing" does not exist"#);
}

#[test]
fn test_query_from_request_to_error_envelope() {
    let request = Request::builder()
        .uri("/users?limit=ten")
        .body(())
        .unwrap();
    let query = QueryParser::new(&request).unwrap();

    let err = query.number("limit").unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.error_code(), "COERCION_FAILED");
    assert_eq!(err.to_string(), r#"Key "limit" could not be coerced to number"#);
}

#[test]
fn test_query_mutation_is_visible_after_into_input() {
    let mut query = QueryParser::new(QueryParams::parse("page=1").unwrap()).unwrap();
    query.set("page", "2");

    let params: QueryParams = query.into_input();
    assert_eq!(params.to_query_string(), "page=2");
}

#[test]
fn test_form_array_scenario() {
    let mut data = FormData::new();
    data.append("names", "Alice");
    data.append(
        "names",
        UploadedFile::new(None, Some("a.txt".into()), None, Bytes::from_static(b"a")),
    );
    let form = FormParser::new(data);

    assert_eq!(form.string_array("names"), vec!["Alice"]);

    let text_only = FormParser::new(FormData::from_iter([("names", "Alice")]));
    assert!(text_only.file_array("names").is_empty());
}

#[test]
fn test_form_number_and_boolean_rules() {
    let mut data = FormData::from_iter([("a", "25"), ("b", "twenty-five")]);
    data.append("c", 42.0);
    data.append("on", "on");
    data.append("off", "off");
    let form = FormParser::new(data);

    assert_eq!(form.number("a").unwrap(), 25.0);
    assert_eq!(form.number("b").unwrap_err(), ParseError::coercion("b", "number"));
    assert_eq!(form.number("c").unwrap(), 42.0);
    assert!(form.boolean("on"));
    assert!(!form.boolean("off"));
    assert!(!form.boolean("absent"));
}

#[tokio::test]
async fn test_form_from_multipart_request() {
    init_tracing();
    let boundary = "----keyparse";
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&format!("multipart/form-data; boundary={boundary}")).unwrap(),
    );

    let form = FormParser::from_multipart(
        &headers,
        Bytes::from(multipart_body(boundary)),
        FormConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(form.string("names").unwrap(), "Alice");
    assert_eq!(form.string_array("names"), vec!["Alice"]);
    assert_eq!(form.file_array("names")[0].file_name(), Some("bob.txt"));
    assert_eq!(form.number("age").unwrap(), 25.0);
    assert!(form.boolean("newsletter"));
    assert_eq!(
        form.file("age").unwrap_err().to_string(),
        r#"Key "age" expected instance of File"#
    );
}

#[test]
fn test_generic_parser_contract() {
    fn missing_is_error<P: Parser>(parser: &P, key: &P::Key) -> bool {
        !parser.has(key) && matches!(parser.get(key), Err(e) if e.kind() == ErrorKind::MissingKey)
    }

    let object = ObjectParser::from(Object::new());
    let query = QueryParser::from(QueryParams::new());
    let form = FormParser::new(FormData::new());

    assert!(missing_is_error(&object, &Key::from("x")));
    assert!(missing_is_error(&query, "x"));
    assert!(missing_is_error(&form, "x"));
}

#[test]
fn test_form_get_returns_entry() {
    let form = FormParser::new(FormData::from_iter([("k", "v")]));
    assert_eq!(Parser::get(&form, "k").unwrap(), &FormValue::from("v"));
}

#[test]
fn test_object_from_any_value_must_be_object() {
    let err = ObjectParser::new(Value::from(vec![Value::from(1)])).unwrap_err();
    assert_eq!(err.to_string(), r#"Key "object" expected object but got array"#);
}
