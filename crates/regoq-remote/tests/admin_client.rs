use regoq_core::{Error, ErrorKind, HttpMethod, HttpResponse};
use regoq_remote::{AdminClient, PolicyModule};
use regoq_test_util::{StubTransport, body_json};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

fn admin(stub: &Arc<StubTransport>) -> AdminClient {
    AdminClient::new("http://opa.local:8181/")
        .expect("valid base")
        .with_transport(Arc::clone(stub))
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    name: String,
    admin: bool,
}

#[tokio::test]
async fn get_data_without_input_is_a_get() {
    let stub = Arc::new(StubTransport::replying_json(
        200,
        &json!({"result": {"name": "alice", "admin": true}}),
    ));
    let user: Option<User> = admin(&stub)
        .get_data("users/alice", None::<&Value>)
        .await
        .expect("get");
    assert_eq!(
        user,
        Some(User {
            name: "alice".to_string(),
            admin: true
        })
    );

    let sent = stub.last_request().expect("recorded");
    assert_eq!(sent.method, HttpMethod::Get);
    assert_eq!(sent.url, "http://opa.local:8181/v1/data/users/alice");
    assert!(sent.body.is_none());
}

#[tokio::test]
async fn get_data_with_input_is_a_post() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": true})));
    let allowed: Option<bool> = admin(&stub)
        .get_data("authz/allow", Some(&json!({"user": "bob"})))
        .await
        .expect("get");
    assert_eq!(allowed, Some(true));

    let sent = stub.last_request().expect("recorded");
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(body_json(&sent), json!({"input": {"user": "bob"}}));
}

#[tokio::test]
async fn empty_path_addresses_the_root_and_absent_result_is_none() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({})));
    let root: Option<Value> = admin(&stub)
        .get_data("", None::<&Value>)
        .await
        .expect("get");
    assert_eq!(root, None);
    assert_eq!(
        stub.last_request().expect("recorded").url,
        "http://opa.local:8181/v1/data"
    );
}

#[tokio::test]
async fn mismatched_result_type_is_a_decode_error() {
    let stub = Arc::new(StubTransport::replying_json(200, &json!({"result": "nope"})));
    let err = admin(&stub)
        .get_data::<Value, User>("users/x", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn writes_accept_no_content() {
    let stub = Arc::new(StubTransport::replying(204, ""));
    let client = admin(&stub);

    client
        .put_data("users/carol", &json!({"name": "carol", "admin": false}))
        .await
        .expect("put data");
    client.delete_data("users/carol").await.expect("delete data");
    client
        .put_policy("authz", "package authz\n")
        .await
        .expect("put policy");
    client.delete_policy("authz").await.expect("delete policy");

    let sent = stub.requests();
    let calls: Vec<(HttpMethod, &str)> = sent
        .iter()
        .map(|r| (r.method, r.url.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![
            (HttpMethod::Put, "http://opa.local:8181/v1/data/users/carol"),
            (HttpMethod::Delete, "http://opa.local:8181/v1/data/users/carol"),
            (HttpMethod::Put, "http://opa.local:8181/v1/policies/authz"),
            (HttpMethod::Delete, "http://opa.local:8181/v1/policies/authz"),
        ]
    );
    assert_eq!(body_json(&sent[0]), json!({"name": "carol", "admin": false}));
    assert_eq!(sent[2].header_value("Content-Type"), Some("text/plain"));
    assert_eq!(sent[2].body.as_deref(), Some("package authz\n".as_bytes()));
}

#[tokio::test]
async fn policies_are_listed_and_fetched() {
    let stub = Arc::new(StubTransport::new(|req| {
        let body = if req.url.ends_with("/v1/policies") {
            json!({"result": [{"id": "a", "raw": "package a", "ast": {}}]})
        } else {
            json!({"result": {"id": "b", "raw": "package b"}})
        };
        Ok(HttpResponse::new(200, body.to_string()))
    }));
    let client = admin(&stub);

    let listed = client.list_policies().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "a");

    let fetched = client.get_policy("b").await.expect("get");
    assert_eq!(
        fetched,
        Some(PolicyModule {
            id: "b".to_string(),
            raw: "package b".to_string(),
            ast: Value::Null,
        })
    );
}

#[tokio::test]
async fn missing_policy_is_none() {
    let stub = Arc::new(StubTransport::replying(404, r#"{"code":"resource_not_found"}"#));
    let fetched = admin(&stub).get_policy("gone").await.expect("get");
    assert_eq!(fetched, None);
}

#[tokio::test]
async fn server_errors_carry_the_body() {
    let stub = Arc::new(StubTransport::replying(400, "bad policy"));
    let err = admin(&stub)
        .put_policy("x", "package")
        .await
        .unwrap_err();
    match err {
        Error::RemoteStatus { status, body, .. } => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad policy");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = AdminClient::new("data:text/plain,hi").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUrl);
}
