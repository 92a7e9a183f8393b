use serde_json::json;

use crate::envelope::Body;
use crate::request::RequestContext;

/// Example handler: echoes the request context back as the body.
///
/// Used by the `treeroute dispatch` command so a route table can be
/// exercised without writing any handler code.
pub fn echo_handler(ctx: &RequestContext) -> (u16, Body) {
    let mut body = Body::new();
    body.insert("method".into(), json!(ctx.method().as_str()));
    body.insert("url".into(), json!(ctx.url()));
    body.insert("version".into(), json!(ctx.version()));
    body.insert("client".into(), json!(ctx.client()));
    body.insert("request_id".into(), json!(ctx.request_id().to_string()));
    (200, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::header_vec;
    use http::Method;

    #[test]
    fn test_echo_reports_context() {
        let ctx = RequestContext::new(
            Method::POST,
            header_vec([("X-Request-Id", "01ARZ3NDEKTSV4RRFFQ69G5FAV")]),
            "192.168.1.20",
            "users/me",
            Some("v2".into()),
        );
        let (status, body) = echo_handler(&ctx);
        assert_eq!(status, 200);
        assert_eq!(body["method"], json!("POST"));
        assert_eq!(body["url"], json!("users/me"));
        assert_eq!(body["version"], json!("v2"));
        assert_eq!(body["client"], json!("192.168.1.20"));
        assert_eq!(body["request_id"], json!("01ARZ3NDEKTSV4RRFFQ69G5FAV"));
    }
}
