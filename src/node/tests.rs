use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use serde_json::json;

use super::{NodeId, NodeTree};
use crate::envelope::{Body, Envelope};
use crate::request::{HeaderVec, RequestContext};

fn ctx(method: Method, url: &str) -> RequestContext {
    RequestContext::new(method, HeaderVec::new(), "127.0.0.1", url, Some("v1".into()))
}

fn route(tree: &NodeTree, method: Method, url: &str) -> Envelope {
    let segments: Vec<&str> = url.split('/').collect();
    tree.find_node(tree.root(), &segments, &ctx(method, url), &[])
}

fn users_tree() -> (NodeTree, NodeId) {
    let mut tree = NodeTree::new("v1");
    let root = tree.root();
    let me = {
        let mut root = tree.builder(root).unwrap();
        let mut users = root.add("users", [Method::GET], |_: &RequestContext| 200u16);
        let me = users.add("me", [Method::GET, Method::PUT], |ctx: &RequestContext| {
            let mut body = Body::new();
            body.insert("method".into(), json!(ctx.method().as_str()));
            (200u16, body)
        });
        me.id()
    };
    (tree, me)
}

#[test]
fn test_nested_lookup() {
    let (tree, _) = users_tree();
    let env = route(&tree, Method::PUT, "users/me");
    assert_eq!(env.status(), 200);
    assert_eq!(env.body()["method"], json!("PUT"));
    assert_eq!(env.message(), "Ok");

    assert_eq!(route(&tree, Method::GET, "users").status(), 200);
}

#[test]
fn test_unknown_segment_is_404() {
    let (tree, _) = users_tree();
    for url in ["nobody", "users/you", "users/me/extra", "users/", "Users"] {
        let env = route(&tree, Method::GET, url);
        assert_eq!(env.status(), 404, "{url}");
        assert_eq!(env.message(), "Not Found");
    }
}

#[test]
fn test_method_not_accepted_is_405() {
    let (tree, _) = users_tree();
    let env = route(&tree, Method::POST, "users/me");
    assert_eq!(env.status(), 405);
    assert_eq!(env.message(), "Method Not Allowed");
}

#[test]
fn test_failed_request_check_skips_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let later_checks = Arc::new(AtomicUsize::new(0));
    let mut tree = NodeTree::new("v1");
    let root = tree.root();
    {
        let counter = Arc::clone(&calls);
        let later = Arc::clone(&later_checks);
        let mut root = tree.builder(root).unwrap();
        root.add("admin", [Method::GET], move |_: &RequestContext| {
            counter.fetch_add(1, Ordering::SeqCst);
            200u16
        })
        .request_check(401, |ctx: &RequestContext| ctx.get_header("authorization").is_some())
        .request_check(403, move |_: &RequestContext| {
            later.fetch_add(1, Ordering::SeqCst);
            false
        });
    }

    let env = route(&tree, Method::GET, "admin");
    assert_eq!(env.status(), 401);
    assert_eq!(env.message(), "Unauthorized");
    assert!(env.body().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(later_checks.load(Ordering::SeqCst), 0);
}

#[test]
fn test_response_checks_run_in_order() {
    let mut tree = NodeTree::new("v1");
    let root = tree.root();
    {
        let mut root = tree.builder(root).unwrap();
        root.add("items", [Method::GET], |_: &RequestContext| 200u16)
            .response_check(|env: &mut Envelope| {
                env.body_mut().insert("trail".into(), json!("a"));
            })
            .response_check(|env: &mut Envelope| {
                let trail = format!("{}b", env.body()["trail"].as_str().unwrap_or_default());
                env.body_mut().insert("trail".into(), json!(trail));
            });
    }

    let env = route(&tree, Method::GET, "items");
    assert_eq!(env.body()["trail"], json!("ab"));
}

#[test]
fn test_later_registration_replaces_sibling() {
    let mut tree = NodeTree::new("v1");
    let root = tree.root();
    {
        let mut root = tree.builder(root).unwrap();
        root.add("ping", [Method::GET], |_: &RequestContext| (200u16, "first"));
        root.add("ping", [Method::GET], |_: &RequestContext| (200u16, "second"));
    }

    assert_eq!(route(&tree, Method::GET, "ping").message(), "Second");
    assert_eq!(tree.get(root).unwrap().children.len(), 1);
}

#[test]
fn test_empty_method_set_answers_405() {
    let mut tree = NodeTree::new("v1");
    let root = tree.root();
    tree.builder(root)
        .unwrap()
        .add("frozen", Vec::<Method>::new(), |_: &RequestContext| 200u16);

    assert_eq!(route(&tree, Method::GET, "frozen").status(), 405);
}

#[test]
fn test_path_of_follows_parents() {
    let (tree, me) = users_tree();
    assert_eq!(tree.path_of(me), "/v1/users/me");
    assert_eq!(tree.path_of(tree.root()), "/v1");
    assert_eq!(tree.lookup("users/me"), Some(me));
    assert_eq!(tree.lookup("users/you"), None);
}

#[test]
fn test_endpoints_skip_replaced_nodes() {
    let (mut tree, _) = users_tree();
    let root = tree.root();
    tree.builder(root)
        .unwrap()
        .add("health", [Method::HEAD], |_: &RequestContext| 204u16);

    let endpoints: Vec<String> = tree.endpoints().into_iter().map(|(path, _)| path).collect();
    assert_eq!(endpoints, vec!["/v1/users", "/v1/users/me", "/v1/health"]);

    tree.builder(root)
        .unwrap()
        .add("users", [Method::GET], |_: &RequestContext| 200u16);
    let endpoints: Vec<String> = tree.endpoints().into_iter().map(|(path, _)| path).collect();
    assert_eq!(endpoints, vec!["/v1/users", "/v1/health"]);
}
