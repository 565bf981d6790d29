// tests/http_client.rs
//! The HTTP block store against a mock Notion API.

use notionmd::constants::NOTION_API_VERSION;
use notionmd::{
    export_page, import_markdown, parse_document, parse_property_patches, AppError, ApiKey, Block,
    BlockId, BlockStore, ChildPageBlock, ChildRecord, ClientConfig, ImportMode, NotionErrorCode,
    NotionHttpClient, PageId, Parent, PropertyName, PropertyPatch, PropertyPatches, RetryPolicy,
    SchemaError, TextSpan,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{
    body_partial_json, header, method, path, path_regex, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const API_KEY: &str = "secret_test_key_0123456789abcdef";
const PAGE_ID: &str = "11111111-2222-3333-4444-555555555555";

fn client_with(server: &MockServer, max_retries: u32, interval: Duration) -> NotionHttpClient {
    let config = ClientConfig::new(ApiKey::new(API_KEY).unwrap())
        .with_base_url(format!("{}/v1", server.uri()))
        .with_min_request_interval(interval)
        .with_retry(RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        });
    NotionHttpClient::new(&config).unwrap()
}

fn client(server: &MockServer) -> NotionHttpClient {
    client_with(server, 3, Duration::ZERO)
}

fn page_id() -> PageId {
    PageId::parse(PAGE_ID).unwrap()
}

fn text_item(content: &str) -> Value {
    json!({
        "type": "text",
        "text": {"content": content, "link": null},
        "plain_text": content,
        "annotations": {
            "bold": false, "italic": false, "strikethrough": false,
            "underline": false, "code": false, "color": "default"
        }
    })
}

fn block_record(id: &str, block_type: &str, body: Value, has_children: bool) -> Value {
    json!({
        "object": "block",
        "id": id,
        "type": block_type,
        "has_children": has_children,
        block_type: body,
    })
}

fn page_record(title: &str) -> Value {
    json!({
        "object": "page",
        "id": PAGE_ID,
        "url": "https://www.notion.so/Roadmap-11111111222233334444555555555555",
        "archived": false,
        "properties": {
            "Name": {"id": "title", "type": "title", "title": [text_item(title)]}
        }
    })
}

fn error_body(status: u16, code: &str, message: &str) -> Value {
    json!({
        "object": "error",
        "status": status,
        "code": code,
        "message": message,
        "request_id": "req-42"
    })
}

/// Answers an append with one fresh id per block sent.
struct EchoCreated;

impl Respond for EchoCreated {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let count = body["children"].as_array().map(Vec::len).unwrap_or(0);
        let results: Vec<Value> = (0..count)
            .map(|_| json!({"object": "block", "id": uuid::Uuid::new_v4().to_string()}))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"object": "list", "results": results}))
    }
}

fn appended_counts(requests: &[Request]) -> Vec<usize> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["children"].as_array().unwrap().len()
        })
        .collect()
}

#[tokio::test]
async fn test_fetch_children_sends_auth_and_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/blocks/{}/children", PAGE_ID)))
        .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
        .and(header("notion-version", NOTION_API_VERSION))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [
                block_record(
                    "aaaaaaaa-0000-0000-0000-000000000001",
                    "paragraph",
                    json!({"rich_text": [text_item("hello")], "color": "default"}),
                    false
                ),
                {"object": "block", "id": "aaaaaaaa-0000-0000-0000-000000000002",
                 "type": "table_row", "table_row": {"cells": [[text_item("x")]]}}
            ],
            "next_cursor": null,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let children = client(&server)
        .fetch_children(&page_id().as_block_id(), 100, None)
        .await
        .unwrap();

    assert!(!children.has_more);
    assert_eq!(children.results.len(), 2);
    match &children.results[0] {
        ChildRecord::Block { block, has_children } => {
            assert!(!has_children);
            assert_eq!(block, &{
                let mut expected = Block::paragraph(vec![TextSpan::plain("hello")]);
                expected.common_mut().id =
                    Some(BlockId::parse("aaaaaaaa-0000-0000-0000-000000000001").unwrap());
                expected
            });
        }
        other => panic!("expected a block record, got {:?}", other),
    }
    assert_eq!(
        children.results[1],
        ChildRecord::TableRow(vec![vec![TextSpan::plain("x")]])
    );
}

#[tokio::test]
async fn test_export_follows_cursors_and_children() {
    let server = MockServer::start().await;
    let list_id = "bbbbbbbb-0000-0000-0000-000000000002";

    Mock::given(method("GET"))
        .and(path(format!("/v1/blocks/{}/children", PAGE_ID)))
        .and(query_param_is_missing("start_cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [block_record(
                "bbbbbbbb-0000-0000-0000-000000000001",
                "heading_2",
                json!({"rich_text": [text_item("Agenda")]}),
                false
            )],
            "next_cursor": "cursor-2",
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/blocks/{}/children", PAGE_ID)))
        .and(query_param("start_cursor", "cursor-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [block_record(
                list_id,
                "bulleted_list_item",
                json!({"rich_text": [text_item("topics")]}),
                true
            )],
            "next_cursor": null,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/blocks/{}/children", list_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [block_record(
                "bbbbbbbb-0000-0000-0000-000000000003",
                "to_do",
                json!({"rich_text": [text_item("budget")], "checked": true}),
                false
            )],
            "next_cursor": null,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let markdown = export_page(&client(&server), &page_id()).await.unwrap();
    assert_eq!(markdown, "## Agenda\n\n- topics\n  - [x] budget\n");
}

#[tokio::test]
async fn test_rate_limit_honours_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/pages/{}", PAGE_ID)))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_json(error_body(429, "rate_limited", "slow down")),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/pages/{}", PAGE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_record("Roadmap")))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server).retrieve_page(&page_id()).await.unwrap();
    assert_eq!(page.title.as_str(), "Roadmap");
    assert_eq!(page.id, page_id());
    assert!(!page.archived);
}

#[tokio::test]
async fn test_gives_up_after_retry_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/pages/{}", PAGE_ID)))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(error_body(503, "service_unavailable", "try later")),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = client_with(&server, 2, Duration::ZERO)
        .retrieve_page(&page_id())
        .await
        .unwrap_err();

    match err {
        AppError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            match *last {
                AppError::NotionService {
                    code,
                    message,
                    status,
                    request_id,
                    ..
                } => {
                    assert_eq!(code, NotionErrorCode::ServiceUnavailable);
                    assert_eq!(message, "try later");
                    assert_eq!(status, 503);
                    assert_eq!(request_id.as_deref(), Some("req-42"));
                }
                other => panic!("unexpected inner error: {:?}", other),
            }
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/v1/blocks/[0-9a-f-]+$"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(error_body(400, "validation_error", "bad block")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .update_block(
            &BlockId::parse(PAGE_ID).unwrap(),
            &Block::paragraph(vec![TextSpan::plain("x")]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.notion_code(), Some(&NotionErrorCode::ValidationFailed));
}

#[tokio::test]
async fn test_schema_violations_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = client(&server);
    let parent = page_id().as_block_id();

    let mut heading = Block::heading(1, vec![TextSpan::plain("deep")]);
    if let Block::Heading(h) = &mut heading {
        h.level = 4;
    }
    let err = store
        .append_children(&parent, &[Block::divider(), heading])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Schema(SchemaError::InvalidField { ref field, .. }) if field == "heading.level"
    ));

    let err = store
        .append_children(&parent, &[Block::image("not a url", vec![])])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Schema(SchemaError::InvalidField { .. })));

    let child_page = Block::ChildPage(ChildPageBlock {
        title: "Sub".to_string(),
        ..Default::default()
    });
    let err = store.append_children(&parent, &[child_page]).await.unwrap_err();
    assert!(matches!(err, AppError::Schema(SchemaError::UnsupportedBlock { .. })));
}

/// Valid at the top level; the toggle's child image has a relative url.
const NESTED_INVALID_MARKDOWN: &str =
    "intro\n\n<details>\n<summary>More</summary>\n\n![x](relative.png)\n\n</details>";

#[tokio::test]
async fn test_invalid_import_sends_nothing() {
    let server = MockServer::start().await;
    let store = client(&server);

    for mode in [ImportMode::Replace, ImportMode::Append] {
        let err = import_markdown(&store, &page_id(), NESTED_INVALID_MARKDOWN, mode)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                AppError::Schema(SchemaError::InvalidField { ref field, .. }) if field == "image.url"
            ),
            "{mode:?}: {err:?}"
        );
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_page_rejects_invalid_nested_content_up_front() {
    let server = MockServer::start().await;
    let parent = Parent::Page {
        page_id: page_id(),
    };

    let err = client(&server)
        .create_page(&parent, "Notes", &parse_document(NESTED_INVALID_MARKDOWN))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Schema(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_append_is_chunked_at_one_hundred() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/blocks/{}/children", PAGE_ID)))
        .respond_with(EchoCreated)
        .expect(2)
        .mount(&server)
        .await;

    let blocks: Vec<Block> = (0..150)
        .map(|i| Block::paragraph(vec![TextSpan::plain(format!("line {i}"))]))
        .collect();
    let created = client(&server)
        .append_children(&page_id().as_block_id(), &blocks)
        .await
        .unwrap();

    assert_eq!(created.len(), 150);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(appended_counts(&requests), vec![100, 50]);
}

#[tokio::test]
async fn test_create_page_appends_nested_content_afterwards() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(body_partial_json(json!({"parent": {"page_id": PAGE_ID}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_record("Notes")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/v1/blocks/[0-9a-f-]+/children$"))
        .respond_with(EchoCreated)
        .expect(2)
        .mount(&server)
        .await;

    let blocks = parse_document("intro\n\n- parent\n  - child\n");
    let parent = Parent::Page {
        page_id: page_id(),
    };
    let page = client(&server)
        .create_page(&parent, "Notes", &blocks)
        .await
        .unwrap();
    assert_eq!(page.title.as_str(), "Notes");

    let requests = server.received_requests().await.unwrap();
    let create: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(create["children"].as_array().unwrap().len(), 1);
    assert_eq!(
        create["properties"]["title"]["title"][0]["text"]["content"],
        "Notes"
    );
    assert_eq!(appended_counts(&requests), vec![1, 1]);
}

#[tokio::test]
async fn test_search_collects_all_pages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_partial_json(json!({"start_cursor": "next"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [page_record("Second")],
            "next_cursor": null,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_partial_json(json!({"query": "road", "filter": {"value": "page"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [page_record("First")],
            "next_cursor": "next",
            "has_more": true
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let pages = client(&server).search("road").await.unwrap();
    let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_requests_are_spaced_by_the_throttle() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "block"})))
        .expect(3)
        .mount(&server)
        .await;

    let store = client_with(&server, 0, Duration::from_millis(60));
    let id = BlockId::parse(PAGE_ID).unwrap();
    let started = Instant::now();
    for _ in 0..3 {
        store.delete_block(&id).await.unwrap();
    }
    assert!(started.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_property_updates_are_validated_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/pages/{}", PAGE_ID)))
        .and(body_partial_json(json!({
            "properties": {"Done": {"checkbox": true}, "Stage": {"select": {"name": "Doing"}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_record("Roadmap")))
        .expect(1)
        .mount(&server)
        .await;

    let store = client(&server);
    let patches = parse_property_patches(&json!({
        "Done": {"checkbox": true},
        "Stage": {"select": "Doing"}
    }))
    .unwrap();
    store
        .update_page_properties(&page_id(), &patches)
        .await
        .unwrap();

    let mut invalid = PropertyPatches::new();
    invalid.insert(PropertyName::new("Score"), PropertyPatch::Number(Some(f64::NAN)));
    let err = store
        .update_page_properties(&page_id(), &invalid)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Schema(SchemaError::InvalidField { .. })));
}
