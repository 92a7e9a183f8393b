//! Registration warnings, observed through a capturing subscriber.

mod tracing_util;

use http::Method;
use tracing_util::TestTracing;
use treeroute::{ApiBuilder, ApiConfig, Dispatcher, RequestContext};

fn api_with_unreachable_endpoint(config: ApiConfig) -> Dispatcher {
    let mut api = ApiBuilder::new(config).unwrap();
    {
        let mut v1 = api.add_version(1);
        v1.add("sealed", std::iter::empty::<Method>(), |_: &RequestContext| 200u16);
        v1.add("open", [Method::GET], |_: &RequestContext| 200u16);
    }
    api.build().unwrap()
}

#[test]
fn test_empty_method_set_is_warned() {
    let tracing = TestTracing::init();
    let dispatcher = api_with_unreachable_endpoint(ApiConfig::default());

    let logs = tracing.output();
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("no accepted methods"), "{logs}");
    // Only the sealed endpoint is reported.
    assert_eq!(logs.matches("no accepted methods").count(), 1, "{logs}");

    let res = dispatcher.dispatch("GET", "/v1/sealed", Default::default(), "127.0.0.1");
    assert_eq!(res.status, 405);
}

#[test]
fn test_empty_method_warning_can_be_silenced() {
    let tracing = TestTracing::init();
    let config = ApiConfig {
        warn_empty_methods: false,
        ..ApiConfig::default()
    };
    let dispatcher = api_with_unreachable_endpoint(config);

    let logs = tracing.output();
    assert!(!logs.contains("no accepted methods"), "{logs}");

    let res = dispatcher.dispatch("GET", "/v1/sealed", Default::default(), "127.0.0.1");
    assert_eq!(res.status, 405);
}
