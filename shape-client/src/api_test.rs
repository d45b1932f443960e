use super::*;

// =============================================================
// Status errors
// =============================================================

#[test]
fn from_status_lifts_error_code() {
    let err = ApiError::from_status(400, r#"{"error":"E_TYPE_IMMUTABLE","message":"nope"}"#.into());
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.code(), Some("E_TYPE_IMMUTABLE"));
}

#[test]
fn from_status_tolerates_plain_text() {
    let err = ApiError::from_status(502, "Bad Gateway".into());
    assert_eq!(err.code(), None);
    assert!(err.to_string().contains("502"));
}

#[test]
fn not_found_detection() {
    assert!(ApiError::from_status(404, String::new()).is_not_found());
    assert!(!ApiError::Request("refused".into()).is_not_found());
}

// =============================================================
// Body parsing
// =============================================================

#[test]
fn parse_list_accepts_bare_array() {
    let items = parse_list(r#"[{"id":"a"},{"id":"b"}]"#).unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn parse_list_accepts_wrapped_array() {
    let items = parse_list(r#"{"shapes":[{"id":"a"}]}"#).unwrap();
    assert_eq!(items[0]["id"], "a");
}

#[test]
fn parse_list_rejects_other_shapes() {
    assert!(matches!(parse_list(r#"{"id":"a"}"#), Err(ApiError::Decode(_))));
    assert!(matches!(parse_list("not json"), Err(ApiError::Decode(_))));
}

#[test]
fn parse_record_falls_back_to_null() {
    assert_eq!(parse_record("created"), Value::Null);
    assert_eq!(parse_record(r#"{"id":"a"}"#)["id"], "a");
}

// =============================================================
// Client
// =============================================================

#[test]
fn http_client_builds_from_config() {
    let api = HttpShapeApi::new(ClientConfig::new("http://localhost:9", "/api/shapes")).unwrap();
    assert_eq!(api.config().collection_url(), "http://localhost:9/api/shapes");
}
