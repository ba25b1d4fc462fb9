//! Gateway HTTP contract tests
//!
//! | Command | Behavior | Test |
//! |---------|----------|------|
//! | add | multipart upload, string size | `add_*` |
//! | dag/put | directory payload, structured errors | `dag_put_*` |
//! | object/stat | bodyless request, error encodings | `object_stat_*` |
//! | cat | streamed body, 404 | `cat_*` |

use futures::TryStreamExt;
use ipfs_add::cancel::{self, Cancellation};
use ipfs_add::dag::{Cid, Link};
use ipfs_add::error::ApiError;
use ipfs_add::gateway::{DagStore, Gateway, Reader};
use serde_json::json;
use std::io::Cursor;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> Gateway {
    Gateway::new(&server.uri()).unwrap()
}

fn reader(content: &'static [u8]) -> Reader {
    Box::new(Cursor::new(content))
}

// ── add ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_uploads_single_file_part() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/add"))
        .and(query_param("progress", "false"))
        .and(query_param("pin", "true"))
        .and(query_param("encoding", "json"))
        .and(query_param("stream-channels", "true"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains(r#"name="file""#))
        .and(body_string_contains(r#"filename="""#))
        .and(body_string_contains("application/octet-stream"))
        .and(body_string_contains("hello gateway"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "",
            "Hash": "QmFile",
            "Size": "21"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway(&server)
        .add(reader(b"hello gateway"), &Cancellation::never())
        .await
        .unwrap();
    assert_eq!(result.hash, "QmFile");
    assert_eq!(result.size, 21);
}

#[tokio::test]
async fn add_rejects_numeric_size() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Hash": "QmFile",
            "Size": 21
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .add(reader(b"x"), &Cancellation::never())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn add_with_empty_success_body_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/add"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .add(reader(b"x"), &Cancellation::never())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "add: empty response");
}

// ── dag/put ─────────────────────────────────────────────────────────

#[tokio::test]
async fn dag_put_sends_directory_node() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/dag/put"))
        .and(query_param("format", "protobuf"))
        .and(query_param("input-enc", "json"))
        .and(query_param("pin", "true"))
        .and(body_string_contains(
            r#"{"data":"CAE=","links":[{"Cid":{"/":"QmB"},"Name":"b","Size":3},{"Cid":{"/":"QmA"},"Name":"a","Size":5}]}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Cid": {"/": "QmDir"}})))
        .expect(1)
        .mount(&server)
        .await;

    let links = vec![
        Cid::from("QmB").to_link("b", 3),
        Cid::from("QmA").to_link("a", 5),
    ];
    let cid = gateway(&server)
        .dag_put_links(&links, &Cancellation::never())
        .await
        .unwrap();
    assert_eq!(cid, Cid::from("QmDir"));
}

#[tokio::test]
async fn dag_put_structured_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/dag/put"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"Message": "boom", "Code": 7})),
        )
        .mount(&server)
        .await;

    let err = gateway(&server)
        .dag_put_links(&[], &Cancellation::never())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Gateway(_)));
    assert_eq!(err.to_string(), "dag/put: 7: boom");
}

#[tokio::test]
async fn dag_put_partially_malformed_error_keeps_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/dag/put"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"Message": "boom", "Code": "seven"})),
        )
        .mount(&server)
        .await;

    let err = gateway(&server)
        .dag_put_links(&[], &Cancellation::never())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Gateway(_)));
    assert_eq!(err.to_string(), "dag/put: boom");
}

#[tokio::test]
async fn dag_put_malformed_cid_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/dag/put"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Cid": {"/": ""}})))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .dag_put_links(&[], &Cancellation::never())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cid was incorrectly formatted"));
}

// ── object/stat ─────────────────────────────────────────────────────

#[tokio::test]
async fn object_stat_sends_no_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/object/stat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Hash": "QmDir",
            "NumLinks": 2,
            "BlockSize": 106,
            "LinksSize": 104,
            "DataSize": 2,
            "CumulativeSize": 150
        })))
        .mount(&server)
        .await;

    let stat = gateway(&server)
        .object_stat("QmDir", &Cancellation::never())
        .await
        .unwrap();
    assert_eq!(stat.num_links, 2);
    assert_eq!(stat.cumulative_size, 150);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.query(),
        Some("arg=QmDir&encoding=json&stream-channels=true")
    );
    assert!(requests[0].body.is_empty());
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn object_stat_plain_text_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/object/stat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw("merkledag: not found", "text/plain; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let err = gateway(&server)
        .object_stat("QmMissing", &Cancellation::never())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "object/stat: merkledag: not found");
}

#[tokio::test]
async fn object_stat_unknown_error_encoding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/object/stat"))
        .respond_with(ResponseTemplate::new(502).set_body_raw("<h1>Bad Gateway</h1>", "text/html"))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .object_stat("QmDir", &Cancellation::never())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"object/stat: unknown gateway error encoding: "text/html" - "<h1>Bad Gateway</h1>""#
    );
}

#[tokio::test]
async fn object_stat_error_command_override() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/object/stat"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "Message": "invalid path",
            "Code": 0,
            "Command": "resolve"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .object_stat("not-a-cid", &Cancellation::never())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "resolve: invalid path");
}

// ── cat ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn cat_streams_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/cat"))
        .and(query_param("arg", "QmDir/file 1.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("file one content", "text/plain"))
        .mount(&server)
        .await;

    let body = gateway(&server)
        .cat("QmDir/file 1.txt", &Cancellation::never())
        .await
        .unwrap();
    let chunks: Vec<_> = body.into_stream().try_collect().await.unwrap();
    let content: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    assert_eq!(content, b"file one content");
}

#[tokio::test]
async fn cat_not_found_ignores_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/cat"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"Message": "ignored"})))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .cat("QmFile", &Cancellation::never())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "cat: command not found");
}

// ── transport and cancellation ──────────────────────────────────────

#[tokio::test]
async fn transport_failure_is_not_a_gateway_error() {
    let gateway = Gateway::new("http://127.0.0.1:1").unwrap();
    let err = gateway
        .object_stat("QmDir", &Cancellation::never())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn cancellation_aborts_in_flight_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/object/stat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let (handle, cancellation) = cancel::channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let started = Instant::now();
    let err = gateway(&server)
        .object_stat("QmDir", &cancellation)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn link_decodes_gateway_json() {
    let link: Link = serde_json::from_value(json!({
        "Cid": {"/": "QmFile"},
        "Name": "file1.txt",
        "Size": 22
    }))
    .unwrap();
    assert_eq!(link, Cid::from("QmFile").to_link("file1.txt", 22));
}
