use regoq_core::{
    Config, Error, ErrorKind, HttpMethod, HttpResponse, QueryOptions, Source, TransportError,
    with_logger,
};
use regoq_remote::{BearerAuth, RemoteSource};
use regoq_test_util::{LogCapture, StubTransport, body_json};
use serde_json::{Value, json};
use std::sync::Arc;

fn remote(stub: &Arc<StubTransport>) -> RemoteSource {
    let mut source = RemoteSource::new("http://opa.local:8181/v1").with_transport(Arc::clone(stub));
    source.configure(&Config::default()).expect("configure");
    source
}

#[tokio::test]
async fn posts_input_envelope_to_the_translated_url() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": {"allow": true}})));
    let source = remote(&stub);

    let value = source
        .query("data.system.authz", &json!({"user": "alice"}), &QueryOptions::new())
        .await
        .expect("query");
    assert_eq!(value, json!({"allow": true}));

    let sent = stub.last_request().expect("request recorded");
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.url, "http://opa.local:8181/v1/data/system/authz");
    assert_eq!(sent.header_value("content-type"), Some("application/json"));
    assert_eq!(body_json(&sent), json!({"input": {"user": "alice"}}));
}

#[tokio::test]
async fn extra_headers_follow_the_content_type() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": true})));
    let source = remote(&stub);

    let opts = QueryOptions::new().with_header("X-Request-Id", "abc");
    source
        .query("data.a", &json!({}), &opts)
        .await
        .expect("query");

    let sent = stub.last_request().expect("request recorded");
    let names: Vec<&str> = sent.headers.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Content-Type", "X-Request-Id"]);
}

#[tokio::test]
async fn empty_object_result_is_defined() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": {}})));
    let value = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .expect("query");
    assert_eq!(value, json!({}));
}

#[tokio::test]
async fn missing_result_is_no_result() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({})));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_no_result());
}

#[tokio::test]
async fn non_200_carries_status_and_body() {
    let stub = Arc::new(StubTransport::replying(500, "boom"));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteRequestFailed);
    match err {
        Error::RemoteStatus { url, status, body } => {
            assert_eq!(url, "http://opa.local:8181/v1/data/a");
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn other_2xx_statuses_are_failures_for_queries() {
    let stub = Arc::new(StubTransport::replying(204, ""));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RemoteStatus { status: 204, .. }));
}

#[tokio::test]
async fn unreadable_error_body_keeps_the_status() {
    let stub = Arc::new(StubTransport::new(|_| {
        Ok(HttpResponse {
            status: 503,
            body: Err(TransportError::new("connection reset")),
        })
    }));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    match err {
        Error::RemoteStatus { status, body, .. } => {
            assert_eq!(status, 503);
            assert!(body.contains("connection reset"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreadable_success_body_is_a_transport_failure() {
    let stub = Arc::new(StubTransport::new(|_| {
        Ok(HttpResponse {
            status: 200,
            body: Err(TransportError::new("truncated")),
        })
    }));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RemoteTransport { .. }));
}

#[tokio::test]
async fn malformed_body_is_unexpected_response() {
    let stub = Arc::new(StubTransport::replying(200, "not json"));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
    match err {
        Error::UnexpectedResponse { body, .. } => assert_eq!(body, "not json"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn transport_failure_is_request_failed() {
    let stub = Arc::new(StubTransport::failing("connection refused"));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteRequestFailed);
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn local_only_options_are_rejected_before_any_request() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": true})));
    let source = remote(&stub);

    for opts in [
        QueryOptions::new().with_package_suffix(".test"),
        QueryOptions::new().with_print_writer(Vec::new()),
    ] {
        let err = source.query("data.a", &json!({}), &opts).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQueryOption);
    }
    assert_eq!(stub.request_count(), 0);
}

#[test]
fn invalid_base_url_fails_configure() {
    for raw in ["mailto:ops@example.com", "::nope", "ftp://h/v1"] {
        let mut source = RemoteSource::new(raw);
        let err = source.configure(&Config::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl, "{raw}");
    }
}

#[tokio::test]
async fn query_before_configure_is_invalid_input() {
    let source =
        RemoteSource::new("http://h/v1").with_transport(StubTransport::replying(200, "{}"));
    let err = source
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn bearer_wrapper_composes_with_the_source() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": 1})));
    let mut source = RemoteSource::new("http://h/v1")
        .with_transport(BearerAuth::new(Arc::clone(&stub), "tkn"));
    source.configure(&Config::default()).expect("configure");

    source
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .expect("query");
    let sent = stub.last_request().expect("recorded");
    assert_eq!(sent.header_value("Authorization"), Some("Bearer tkn"));
}

#[tokio::test]
async fn request_and_response_are_logged() {
    let capture = LogCapture::new();
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": "ok"})));
    let mut source = RemoteSource::new("http://h/v1").with_transport(Arc::clone(&stub));
    source
        .configure(&Config::default().apply([with_logger(capture.logger())]))
        .expect("configure");

    source
        .query("data.a.b", &json!({"k": 1}), &QueryOptions::new())
        .await
        .expect("query");

    let logs = capture.contents();
    assert!(logs.contains("http://h/v1/data/a/b"), "{logs}");
    assert!(logs.contains("status=200"), "{logs}");
    assert!(logs.contains(r#"{"input":{"k":1}}"#), "{logs}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_use_independent_urls() {
    let stub = Arc::new(StubTransport::new(|req| {
        let leaf = req.url.rsplit('/').next().unwrap_or_default().to_string();
        Ok(HttpResponse::new(200, json!({ "result": leaf }).to_string()))
    }));
    let source = Arc::new(remote(&stub));

    let tasks: Vec<_> = (0..50)
        .map(|n| {
            let source = Arc::clone(&source);
            tokio::spawn(async move {
                let got = source
                    .query(&format!("data.p{n}"), &json!({}), &QueryOptions::new())
                    .await
                    .expect("query");
                (n, got)
            })
        })
        .collect();

    for joined in futures::future::join_all(tasks).await {
        let (n, got) = joined.expect("task");
        assert_eq!(got, Value::String(format!("p{n}")));
    }
    assert_eq!(source.base_url().map(|u| u.as_str()), Some("http://opa.local:8181/v1"));
}

#[tokio::test]
async fn null_result_is_no_result() {
    let stub = Arc::new(StubTransport::replying(200, r#"{"result": null}"#));
    let err = remote(&stub)
        .query("data.a", &json!({}), &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_no_result());
}
