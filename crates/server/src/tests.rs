use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use versemark_store::Store;

use crate::service;

fn app() -> Router {
    service(Store::in_memory())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");

    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn device_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-versemark-device", "dev1")
        .header("content-type", "application/json");

    match body {
        Some(body) => builder.body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build")
}

#[tokio::test]
async fn health_check_is_open() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "alive");
}

#[tokio::test]
async fn markings_round_trip_for_anonymous_device() {
    let app = app();

    let markings = json!({
        "3:2": { "highlight": { "value": "#ff0000", "createdAt": 7 } }
    });

    let put = app
        .clone()
        .oneshot(device_request(
            "PUT",
            "/annotations/KJV/43/3/markings",
            Some(json!({ "markings": markings })),
        ))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let get = app
        .oneshot(device_request("GET", "/annotations/KJV/43/3/markings", None))
        .await
        .unwrap();
    assert_eq!(get.status(), StatusCode::OK);

    let body = body_json(get).await;
    assert_eq!(body["data"]["value"], markings);
}

#[tokio::test]
async fn put_prunes_empty_layer_sets_from_the_wire() {
    let app = app();

    let put = app
        .clone()
        .oneshot(device_request(
            "PUT",
            "/annotations/KJV/43/3/markings",
            Some(json!({ "markings": { "3:2": {} } })),
        ))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let get = app
        .oneshot(device_request("GET", "/annotations/KJV/43/3/markings", None))
        .await
        .unwrap();

    let body = body_json(get).await;
    assert_eq!(
        body["data"]["value"],
        json!({}),
        "a coordinate with no layers must never be stored"
    );
}

#[tokio::test]
async fn owner_scoped_operation_without_credentials_is_unauthorized() {
    let response = app()
        .oneshot(
            Request::get("/annotations/KJV/43/3/markings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_device_id_is_rejected() {
    let response = app()
        .oneshot(
            Request::get("/annotations/KJV/43/3/markings")
                .header("x-versemark-device", "x".repeat(65))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn preferences_reject_anonymous_owners() {
    let response = app()
        .oneshot(device_request("GET", "/preferences", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn clearing_markings_leaves_a_restorable_backup() {
    let app = app();

    let markings = json!({
        "3:2": { "highlight": { "value": "#ff0000", "createdAt": 7 } }
    });

    let put = app
        .clone()
        .oneshot(device_request(
            "PUT",
            "/annotations/KJV/43/3/markings",
            Some(json!({ "markings": markings })),
        ))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let clear = app
        .clone()
        .oneshot(device_request(
            "PUT",
            "/annotations/KJV/43/3/markings",
            Some(json!({ "markings": {} })),
        ))
        .await
        .unwrap();
    assert_eq!(clear.status(), StatusCode::OK);

    let backup = app
        .clone()
        .oneshot(device_request(
            "GET",
            "/annotations/KJV/43/3/markings/backup",
            None,
        ))
        .await
        .unwrap();
    let body = body_json(backup).await;
    assert_eq!(body["data"]["value"], markings, "snapshot should be offered");

    let restore = app
        .clone()
        .oneshot(device_request(
            "POST",
            "/annotations/KJV/43/3/markings/restore",
            None,
        ))
        .await
        .unwrap();
    let body = body_json(restore).await;
    assert_eq!(body["data"]["value"], markings);

    let gone = app
        .oneshot(device_request(
            "GET",
            "/annotations/KJV/43/3/markings/backup",
            None,
        ))
        .await
        .unwrap();
    let body = body_json(gone).await;
    assert!(body["data"].is_null(), "restore must consume the snapshot");
}

#[tokio::test]
async fn notes_and_palette_store_opaque_json() {
    let app = app();

    let put = app
        .clone()
        .oneshot(device_request(
            "PUT",
            "/palette",
            Some(json!({ "value": ["star|#fff|bold", "★"] })),
        ))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let get = app
        .clone()
        .oneshot(device_request("GET", "/palette", None))
        .await
        .unwrap();
    let body = body_json(get).await;
    assert_eq!(body["data"]["value"], json!(["star|#fff|bold", "★"]));

    let put = app
        .clone()
        .oneshot(device_request(
            "PUT",
            "/annotations/KJV/43/3/notes",
            Some(json!({ "value": [{ "verse": 3, "text": "in the beginning" }] })),
        ))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let get = app
        .oneshot(device_request("GET", "/annotations/KJV/43/3/notes", None))
        .await
        .unwrap();
    let body = body_json(get).await;
    assert_eq!(body["data"]["value"][0]["text"], "in the beginning");
}
