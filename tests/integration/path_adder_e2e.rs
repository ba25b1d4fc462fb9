//! End-to-end: add a two-file directory through a mocked gateway.

use ipfs_add::adder::{PathAdder, RecordingSink};
use ipfs_add::cancel::Cancellation;
use ipfs_add::gateway::Gateway;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILE1: (&str, &str, &str, u64) = ("file1.txt", "first file content\n", "QmFileOne", 27);
const FILE2: (&str, &str, &str, u64) = ("file2.txt", "second file content\n", "QmFileTwo", 28);

async fn mount_fixture_gateway(server: &MockServer) {
    for (_, content, hash, size) in [FILE1, FILE2] {
        Mock::given(method("POST"))
            .and(path("/api/v0/add"))
            .and(body_string_contains(content))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Name": "",
                "Hash": hash,
                "Size": size.to_string()
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/api/v0/dag/put"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Cid": {"/": "QmDirectory"}})))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v0/object/stat"))
        .and(query_param("arg", "QmDirectory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Hash": "QmDirectory",
            "NumLinks": 2,
            "BlockSize": 95,
            "LinksSize": 93,
            "DataSize": 2,
            "CumulativeSize": 150
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn listing_order(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn fixture(name: &str) -> (&'static str, u64) {
    let (_, _, hash, size) = [FILE1, FILE2]
        .into_iter()
        .find(|(file, ..)| *file == name)
        .unwrap();
    (hash, size)
}

#[tokio::test]
async fn add_two_file_directory() {
    let server = MockServer::start().await;
    mount_fixture_gateway(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("dir");
    fs::create_dir(&dir).unwrap();
    for (name, content, ..) in [FILE1, FILE2] {
        fs::write(dir.join(name), content).unwrap();
    }
    fs::write(dir.join(".hidden"), "not uploaded").unwrap();

    let sink = Arc::new(RecordingSink::new());
    let adder = PathAdder::with_sink(Gateway::new(&server.uri()).unwrap(), false, sink.clone());
    adder.add_path(&dir, &Cancellation::never()).await.unwrap();

    let order: Vec<String> = listing_order(&dir)
        .into_iter()
        .filter(|name| !name.starts_with('.'))
        .collect();

    // Files first in listing order, then the directory itself.
    let events = sink.events();
    let names: Vec<&str> = events.iter().map(|(name, _)| name.as_str()).collect();
    let mut expected_names: Vec<String> = order.iter().map(|n| format!("dir/{}", n)).collect();
    expected_names.push("dir".to_string());
    assert_eq!(names, expected_names);

    let (_, dir_result) = &events[2];
    assert_eq!(dir_result.hash, "QmDirectory");
    assert_eq!(dir_result.size, 150);
    assert!(dir_result.size > FILE1.3 + FILE2.3);

    // The directory node links both files by short name, in listing order.
    let links: Vec<String> = order
        .iter()
        .map(|name| {
            let (hash, size) = fixture(name);
            format!(r#"{{"Cid":{{"/":"{}"}},"Name":"{}","Size":{}}}"#, hash, name, size)
        })
        .collect();
    let payload = format!(r#"{{"data":"CAE=","links":[{}]}}"#, links.join(","));

    let requests = server.received_requests().await.unwrap();
    let dag_put = requests
        .iter()
        .find(|r| r.url.path() == "/api/v0/dag/put")
        .unwrap();
    assert!(String::from_utf8_lossy(&dag_put.body).contains(&payload));

    let commands: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(
        commands,
        vec!["/api/v0/add", "/api/v0/add", "/api/v0/dag/put", "/api/v0/object/stat"]
    );
}

#[tokio::test]
async fn failed_upload_skips_directory_node() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/add"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"Message": "disk full", "Code": 0})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v0/dag/put"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Cid": {"/": "QmNever"}})))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("dir");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("a"), "a").unwrap();
    fs::write(dir.join("b"), "b").unwrap();

    let sink = Arc::new(RecordingSink::new());
    let adder = PathAdder::with_sink(Gateway::new(&server.uri()).unwrap(), false, sink.clone());
    let err = adder
        .add_path(&dir, &Cancellation::never())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "add: disk full");
    assert!(sink.events().is_empty());
}
