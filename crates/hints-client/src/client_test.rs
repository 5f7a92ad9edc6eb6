use super::*;

fn test_client(base_url: &str) -> HintsClient {
    HintsClient::with_base_url(base_url, 30).expect("client construction should not fail")
}

#[test]
fn endpoint_appends_segments_to_root() {
    let client = test_client("http://127.0.0.1:8000");
    let url = client.endpoint(&["api", "search", "status", "t-1"], &[]);
    assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/search/status/t-1");
}

#[test]
fn endpoint_keeps_mount_prefix_and_strips_trailing_slash() {
    let client = test_client("https://hints.example.com/backend/");
    let url = client.endpoint(&["api", "analysis", "stats"], &[("task_id", "abc")]);
    assert_eq!(
        url.as_str(),
        "https://hints.example.com/backend/api/analysis/stats?task_id=abc"
    );
}

#[test]
fn endpoint_encodes_path_segments() {
    let client = test_client("http://localhost:8000");
    let url = client.endpoint(&["api", "search", "comments", "dy", "a/b c"], &[]);
    assert!(
        url.as_str().ends_with("/comments/dy/a%2Fb%20c"),
        "post id should stay one segment: {url}"
    );
}

#[test]
fn rejects_non_http_base_urls() {
    assert!(matches!(
        HintsClient::with_base_url("ftp://example.com", 30),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        HintsClient::with_base_url("not a url", 30),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn error_detail_reads_string_detail() {
    let detail = error_detail(r#"{"detail":"请输入关键词"}"#, StatusCode::BAD_REQUEST);
    assert_eq!(detail, "请输入关键词");
}

#[test]
fn error_detail_joins_validation_messages() {
    let body = r#"{"detail":[{"loc":["body","keywords"],"msg":"field required"},{"msg":"bad platform"}]}"#;
    assert_eq!(
        error_detail(body, StatusCode::UNPROCESSABLE_ENTITY),
        "field required; bad platform"
    );
}

#[test]
fn error_detail_falls_back_to_body_then_reason() {
    assert_eq!(
        error_detail("  upstream exploded ", StatusCode::BAD_GATEWAY),
        "upstream exploded"
    );
    assert_eq!(error_detail("", StatusCode::NOT_FOUND), "Not Found");
}
