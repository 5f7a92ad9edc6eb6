//! Integration tests for `HintsClient` using wiremock HTTP mocks.

use hints_client::{remote_report, ClientError, HintsClient, LeadsRequest};
use hints_core::{Platform, Post, SearchRequest, TaskStatus};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> HintsClient {
    HintsClient::with_base_url(base_url, 30)
        .expect("client construction should not fail")
        .with_retry(0, 0)
}

fn post_json(platform: &str, id: &str, likes: u64) -> serde_json::Value {
    json!({
        "platform": platform,
        "post_id": id,
        "title": format!("post {id}"),
        "content": "",
        "author": { "author_id": format!("a{id}"), "author_name": "someone", "platform": platform },
        "publish_time": "2024-03-01T10:00:00",
        "like_count": likes,
        "comment_count": 1,
        "share_count": 0,
        "url": format!("https://example.com/{id}")
    })
}

#[tokio::test]
async fn start_search_posts_request_and_parses_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search/start"))
        .and(body_partial_json(json!({
            "keywords": "露营装备",
            "platforms": ["dy", "xhs"],
            "max_count": 50
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "task-42",
            "status": "pending",
            "message": "started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = SearchRequest::new("露营装备", vec![Platform::Douyin, Platform::Xhs]);
    let response = client.start_search(&request).await.expect("start should succeed");

    assert_eq!(response.task_id, "task-42");
    assert_eq!(response.status, TaskStatus::Pending);
}

#[tokio::test]
async fn rejected_start_surfaces_backend_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search/start"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "请至少选择一个平台" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .start_search(&SearchRequest::new("x", vec![Platform::Douyin]))
        .await
        .expect_err("400 should be an error");

    assert!(
        matches!(err, ClientError::UnexpectedStatus { status: 400, .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.user_message(), "请至少选择一个平台");
}

#[tokio::test]
async fn search_results_filters_by_platform() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/results/task-1"))
        .and(query_param("platform", "xhs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json("xhs", "9", 12)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let posts = client
        .search_results("task-1", Some(&Platform::Xhs))
        .await
        .expect("results should parse");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].key(), "xhs-9");
    assert_eq!(posts[0].like_count, 12);
}

#[tokio::test]
async fn stop_and_comments_hit_expected_paths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search/stop/task-7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "task_id": "task-7" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/search/comments/dy/p1"))
        .and(query_param("task_id", "task-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "comment_id": "c1", "post_id": "p1", "platform": "dy", "content": "求链接" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.stop_search("task-7").await.expect("stop should succeed");
    let comments = client
        .post_comments(&Platform::Douyin, "p1", Some("task-7"))
        .await
        .expect("comments should parse");

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "求链接");
}

#[tokio::test]
async fn comments_for_prefers_embedded_comments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/comments/xhs/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut raw = post_json("xhs", "n1", 3);
    raw["platform_data"] = json!({
        "comments": [
            { "comment_id": "e1", "content": "在哪买的" },
            { "content": "missing id is skipped" }
        ]
    });
    let post: Post = serde_json::from_value(raw).unwrap();

    let comments = test_client(&server.uri()).comments_for(&post, None).await;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment_id, "e1");
}

#[tokio::test]
async fn comments_for_fetches_when_none_embedded_and_swallows_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/comments/dy/p2"))
        .and(query_param("task_id", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "comment_id": "c9", "post_id": "p2", "platform": "dy", "content": "多少钱" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/search/comments/dy/p3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let fetched: Post = serde_json::from_value(post_json("dy", "p2", 1)).unwrap();
    let comments = client.comments_for(&fetched, Some("t2")).await;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "多少钱");

    let failing: Post = serde_json::from_value(post_json("dy", "p3", 1)).unwrap();
    assert!(client.comments_for(&failing, None).await.is_empty());
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/status/task-3"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/search/status/task-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "task-3",
            "status": "running",
            "total_found": 4
        })))
        .mount(&server)
        .await;

    let client = HintsClient::with_base_url(&server.uri(), 30)
        .unwrap()
        .with_retry(2, 0);
    let status = client.search_status("task-3").await.expect("retry should recover");

    assert_eq!(status.status, TaskStatus::Running);
    assert_eq!(status.total_found, 4);
}

#[tokio::test]
async fn start_search_is_not_retried_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search/start"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let client = HintsClient::with_base_url(&server.uri(), 30)
        .unwrap()
        .with_retry(3, 1);
    let request = SearchRequest::new("露营", vec![Platform::Xhs]);
    let err = client.start_search(&request).await.unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedStatus { status: 502, .. }));
    let received = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1, "start must be sent exactly once");
}

#[tokio::test]
async fn llm_leads_is_not_retried_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analysis/llm-leads"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = HintsClient::with_base_url(&server.uri(), 30)
        .unwrap()
        .with_retry(3, 1);
    let result = client.llm_leads(&LeadsRequest::for_task("t1")).await;

    assert!(result.is_err());
    let received = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1, "llm analysis must be sent exactly once");
}

#[tokio::test]
async fn remote_report_combines_analysis_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analysis/stats"))
        .and(query_param("task_id", "t9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_posts": 3,
            "total_comments": 0,
            "total_authors": 2,
            "platform_stats": [
                { "platform": "dy", "post_count": 2, "comment_count": 0, "author_count": 1,
                  "avg_likes": 15.0, "avg_comments": 0.5 },
                { "platform": "xhs", "post_count": 1, "comment_count": 0, "author_count": 1,
                  "avg_likes": 2.0, "avg_comments": 0.0 }
            ],
            "time_range": {}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/analysis/distribution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dy": 2, "xhs": 1 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/analysis/trends"))
        .and(query_param("interval", "day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/analysis/top-authors"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "author": { "author_id": "a1", "author_name": "老王", "platform": "dy" }, "post_count": 2 }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let report = remote_report(&client, "t9").await.expect("report should assemble");

    assert_eq!(report.total_posts, 3);
    assert_eq!(report.platform_stats.len(), 2);
    assert_eq!(report.platform_distribution["dy"], 2);
    assert!(report.trend.is_empty());
    assert_eq!(report.top_authors[0].author.author_name, "老王");
    assert_eq!(report.like_buckets.len(), 4, "histogram labels always present");
}

#[tokio::test]
async fn llm_endpoints_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analysis/llm-leads"))
        .and(body_partial_json(json!({ "task_id": "t5", "model": "qwen-plus", "scene": "ticket" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "potential_sellers": [
                { "author_id": "s1", "author_name": "票务小张", "platform": "dy",
                  "reason": "出票", "source_post_id": "p1", "contacts": ["wx: abc"] }
            ],
            "potential_buyers": [],
            "contacts_summary": [],
            "analysis_summary": "1 seller"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/analysis/llm-scenarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "ticket", "name": "演出票务", "seller_label": "卖票方", "buyer_label": "求票方" }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = LeadsRequest::for_task("t5")
        .with_model("qwen-plus")
        .with_scene(Some("ticket".to_string()));
    let leads = client.llm_leads(&request).await.expect("leads should parse");
    assert_eq!(leads.potential_sellers[0].author_name, "票务小张");
    assert_eq!(leads.analysis_summary.as_deref(), Some("1 seller"));

    let scenarios = client.llm_scenarios().await.expect("scenarios should parse");
    assert_eq!(scenarios[0].seller_label, "卖票方");
}

#[tokio::test]
async fn llm_failure_is_an_error_with_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analysis/llm-leads"))
        .respond_with(
            ResponseTemplate::new(502).set_body_json(json!({ "detail": "LLM provider timeout" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .llm_leads(&LeadsRequest::for_task("t5"))
        .await
        .expect_err("502 should fail");
    assert_eq!(err.user_message(), "LLM provider timeout");
}
