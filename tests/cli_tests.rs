//! Runs the `treeroute` binary end to end.

use std::io::Write;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::NamedTempFile;

fn treeroute(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_treeroute"))
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("TREEROUTE_DEFAULT_VERSION")
        .env_remove("TREEROUTE_VERSION_PATTERN")
        .output()
        .unwrap()
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_check_accepts_valid_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "name: Shop\ndefault_version: 2\nintegrations: [rate_limit]").unwrap();

    let output = treeroute(&["check", "--config", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "ok: Shop");
    assert!(lines.contains(&"default version: v2".to_string()));
    assert!(lines.contains(&"integrations: rate_limit".to_string()));
}

#[test]
fn test_check_rejects_invalid_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "integrations: [carrier_pigeon]").unwrap();

    let output = treeroute(&["check", "--config", file.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("carrier_pigeon"));
}

#[test]
fn test_dispatch_prints_status_and_body() {
    let output = treeroute(&[
        "dispatch",
        "--route",
        "1:GET,PUT:users/me",
        "--header",
        "x-request-id:01ARZ3NDEKTSV4RRFFQ69G5FAV",
        "--client",
        "10.9.8.7",
        "PUT",
        "/v1/users/me",
    ]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "200");
    let body: Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["url"], "users/me");
    assert_eq!(body["client"], "10.9.8.7");
    assert_eq!(body["request_id"], "01ARZ3NDEKTSV4RRFFQ69G5FAV");
    assert_eq!(body["message"], "Ok");
}

#[test]
fn test_dispatch_reports_misses() {
    let output = treeroute(&["dispatch", "-r", "1:GET:users", "POST", "/v1/users"]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output)[0], "405");

    let output = treeroute(&["dispatch", "-r", "1:GET:users", "GET", "/v1"]);
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "404");
    assert_eq!(lines[1], r#"{"message":"No Path!"}"#);
}

#[test]
fn test_routes_table() {
    let output = treeroute(&["routes", "-r", "1:GET:users", "-r", "2:POST:orders/new"]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("v1") && lines[0].ends_with("/v1/users"));
    assert!(lines[1].ends_with("/v2/orders"));
    assert!(lines[2].contains("POST") && lines[2].ends_with("/v2/orders/new"));
}

#[test]
fn test_bad_route_argument_is_a_usage_error() {
    let output = treeroute(&["routes", "-r", "users"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("VERSION:METHODS:PATH"));
}
