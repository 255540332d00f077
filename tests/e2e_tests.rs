//! End-to-end probe tests against a mock manager REST endpoint

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stands in for the Python rados binding: answers each request by its `op`
const FAKE_BINDING: &str = r#"req=$(cat)
case "$req" in
  *'"op":"mon_command"'*) printf '{"status": -22, "outb": "", "outs": "unrecognized variable"}' ;;
  *'"op":"write_full"'*) printf '{"status": 0}' ;;
  *'"op":"exec"'*) printf '{"status": 6, "output": [48, 44, 49, 50, 51, 52]}' ;;
  *) exit 1 ;;
esac
"#;

/// Run the binary off the async runtime so the mock server keeps serving
async fn run_probe(server: &MockServer, args: &[&str]) -> Output {
    let endpoint = server.uri();
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();

    tokio::task::spawn_blocking(move || {
        let workdir = TempDir::new().unwrap();
        let binding = workdir.path().join("fake-binding.sh");
        std::fs::write(&binding, FAKE_BINDING).unwrap();

        Command::cargo_bin("cls-overhead")
            .unwrap()
            .current_dir(workdir.path())
            .env("NO_COLOR", "1")
            .env_remove("CEPH_POOL")
            .env_remove("CEPH_TIMEOUT_SECONDS")
            .env_remove("CEPH_BACKEND")
            .env_remove("CEPH_CONF")
            .env_remove("CEPH_CLIENT_ID")
            .env("CEPH_RESTFUL_URL", endpoint)
            .env("CEPH_RESTFUL_KEY", "secret")
            .env("CEPH_PYTHON", format!("sh {}", binding.display()))
            .arg("set-lua-class")
            .args(args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn finished(outs: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "is_finished": true,
        "has_failed": false,
        "finished": [{"outb": "", "outs": outs}],
        "failed": [],
    }))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_prints_command_and_raw_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(query_param("wait", "1"))
        .respond_with(finished("set pool 3 lua_class to ..."))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_probe(&server, &["--pool", "lua-pool"]).await;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);

    let command: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(command["prefix"], "osd pool set");
    assert_eq!(command["pool"], "lua-pool");
    assert_eq!(command["var"], "lua_class");
    assert!(command["val"].as_str().unwrap().contains("cls.register(run)"));

    assert_eq!(lines[1], "0  set pool 3 lua_class to ... 0");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, command);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_repeat_sends_each_round() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .respond_with(finished(""))
        .expect(3)
        .mount(&server)
        .await;

    let output = run_probe(&server, &["--script", "lua_empty", "--repeat", "3"]).await;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().lines().count(), 6);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_failed_command_still_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_finished": true,
            "has_failed": true,
            "finished": [],
            "failed": [{"outb": "", "outs": "unrecognized variable 'lua_class'"}],
        })))
        .mount(&server)
        .await;

    let output = run_probe(&server, &[]).await;
    output.assert()
        .success()
        .stdout(predicate::str::contains("-1  unrecognized variable 'lua_class' 0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_http_error_exits_with_cluster_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let output = run_probe(&server, &[]).await;
    output.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("401"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exec_writes_object_and_prints_method_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(finished(""))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_probe(&server, &["--object", "obj.0", "--data", "hello"]).await;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[2], "wrote 5 bytes to obj.0");
    assert_eq!(lines[3], "6 0,1234");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_librados_backend_relays_raw_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(finished(""))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_probe(&server, &["--backend", "librados"]).await;
    output.assert()
        .success()
        .stdout(predicate::str::contains("-22  unrecognized variable 0"));
}
