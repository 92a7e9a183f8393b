//! Unit tests for CLI commands

use super::commands::RouteSpec;
use crate::cli::{run_cli_with, Cli, Commands};
use clap::Parser;
use http::Method;

#[test]
fn test_route_spec_parses() {
    let route: RouteSpec = "1:get,POST:/users/me".parse().unwrap();
    assert_eq!(route.version, "1");
    assert_eq!(route.methods, vec![Method::GET, Method::POST]);
    assert_eq!(route.path, "users/me");

    let route: RouteSpec = "beta::ping".parse().unwrap();
    assert!(route.methods.is_empty());
}

#[test]
fn test_route_spec_rejects_bad_input() {
    assert!("1:GET".parse::<RouteSpec>().is_err());
    assert!(":GET:users".parse::<RouteSpec>().is_err());
    assert!("1:GET:/".parse::<RouteSpec>().is_err());
    assert!("1:FETCH:users".parse::<RouteSpec>().is_err());
}

#[test]
fn test_dispatch_command_parses() {
    let cli = Cli::try_parse_from([
        "treeroute",
        "dispatch",
        "--route",
        "1:GET:users",
        "-r",
        "1:GET:users/me",
        "-H",
        "x-request-id: 01ARZ3NDEKTSV4RRFFQ69G5FAV",
        "--client",
        "10.1.1.1",
        "GET",
        "/v1/users/me",
    ])
    .unwrap();

    match cli.command {
        Commands::Dispatch {
            routes,
            headers,
            client,
            method,
            path,
            config,
        } => {
            assert_eq!(routes.len(), 2);
            assert_eq!(
                headers,
                vec![("x-request-id".to_string(), "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string())]
            );
            assert_eq!(client, "10.1.1.1");
            assert_eq!(method, "GET");
            assert_eq!(path, "/v1/users/me");
            assert!(config.is_none());
        }
        _ => panic!("Expected Dispatch command"),
    }
}

#[test]
fn test_dispatch_requires_a_route() {
    assert!(Cli::try_parse_from(["treeroute", "dispatch", "GET", "/v1/users"]).is_err());
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["treeroute", "check", "--config", "api.yaml"],
        vec!["treeroute", "dispatch", "-r", "1:GET:ping", "GET", "/v1/ping"],
        vec!["treeroute", "routes"],
        vec!["treeroute", "--json-logs", "routes", "--json"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_dispatch_registers_missing_parents() {
    let cli = Cli::try_parse_from(["treeroute", "dispatch", "-r", "1:GET:users/me", "GET", "/v1/users"]).unwrap();
    let mut out = Vec::new();
    run_cli_with(&cli, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("200"));
    let body: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
    assert_eq!(body["url"], "users");
    assert_eq!(body["version"], "v1");
}

#[test]
fn test_routes_lists_shallow_first() {
    let cli = Cli::try_parse_from([
        "treeroute",
        "routes",
        "-r",
        "2:GET:users/me",
        "-r",
        "2:GET,DELETE:users",
        "--json",
    ])
    .unwrap();
    let mut out = Vec::new();
    run_cli_with(&cli, &mut out).unwrap();
    let table: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        table,
        serde_json::json!([
            {"version": "v2", "path": "/v2/users", "methods": ["GET", "DELETE"]},
            {"version": "v2", "path": "/v2/users/me", "methods": ["GET"]},
        ])
    );
}
