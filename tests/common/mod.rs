#![allow(dead_code)]

use http::Method;
use serde_json::{json, Value};
use treeroute::envelope::Body;
use treeroute::{ApiBuilder, ApiConfig, DispatchResponse, Dispatcher, HeaderVec, RequestContext};

/// Parse a dispatched body, failing the test on invalid JSON.
pub fn body_json(res: &DispatchResponse) -> Value {
    serde_json::from_str(&res.body).unwrap()
}

pub fn get(dispatcher: &Dispatcher, path: &str) -> DispatchResponse {
    dispatcher.dispatch("GET", path, HeaderVec::new(), "127.0.0.1")
}

pub fn config_with_default(version: u64) -> ApiConfig {
    ApiConfig {
        default_version: Some(version.into()),
        ..ApiConfig::default()
    }
}

/// A small user API used across the dispatcher tests:
///
/// ```text
/// /v1/users        GET
/// /v1/users/me     GET, PUT
/// /v1/status       GET        -> 204
/// ```
pub fn user_api(config: ApiConfig) -> Dispatcher {
    let mut api = ApiBuilder::new(config).unwrap();
    {
        let mut v1 = api.add_version(1);
        let mut users = v1.add("users", [Method::GET], |_: &RequestContext| {
            let mut body = Body::new();
            body.insert("users".into(), json!(["ada", "grace"]));
            (200u16, body)
        });
        users.add("me", [Method::GET, Method::PUT], |ctx: &RequestContext| {
            let mut body = Body::new();
            body.insert("name".into(), json!("ada"));
            body.insert("client".into(), json!(ctx.client()));
            (200u16, body)
        });
        v1.add("status", [Method::GET], |_: &RequestContext| 204u16);
    }
    api.build().unwrap()
}
