mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{
    body_json, get_request, json_request, multipart_request, offline_config, retrieval_deps,
    retrieval_router, Part, PNG_BYTES,
};
use memoria::retrieval::RetrievalDeps;
use memoria::Dependency;

async fn describe(app: &axum::Router, user_id: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/describe-image",
            &[
                Part::File("image", "shot.png", PNG_BYTES),
                Part::Text("userId", user_id),
            ],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_health_lists_collaborators() {
    let mut deps = retrieval_deps("a kitchen");
    deps.generator = Dependency::Unavailable;
    let app = retrieval_router(offline_config(), deps);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "retrieval-gateway");
    assert_eq!(body["generator"], "disconnected");
    assert_eq!(body["embedder"], "connected");
    assert_eq!(body["vector_index"], "connected");
}

#[tokio::test]
async fn test_describe_image_stores_description() {
    let app = retrieval_router(
        offline_config(),
        retrieval_deps("A tidy kitchen with a kettle."),
    );

    let body = describe(&app, "dana").await;
    assert_eq!(body["userId"], "dana");
    assert_eq!(body["description"], "A tidy kitchen with a kettle.");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    let response = app
        .oneshot(json_request(
            "/query",
            json!({"query": "what was in the kitchen?", "userId": "dana"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["userId"], "dana");
    assert_eq!(body["query"], "what was in the kitchen?");
    assert_eq!(body["response"], "answered from 1 descriptions");
}

#[tokio::test]
async fn test_describe_image_requires_fields() {
    let app = retrieval_router(offline_config(), retrieval_deps("x"));

    let response = app
        .oneshot(multipart_request(
            "/describe-image",
            &[Part::File("image", "shot.png", PNG_BYTES)],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Image and userId are required"
    );
}

#[tokio::test]
async fn test_describe_image_rejects_non_image() {
    let app = retrieval_router(offline_config(), retrieval_deps("x"));

    let response = app
        .oneshot(multipart_request(
            "/describe-image",
            &[
                Part::File("image", "doc.pdf", b"%PDF-1.7 not really"),
                Part::Text("userId", "dana"),
            ],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_describe_image_without_generator_is_unavailable() {
    let deps = RetrievalDeps {
        generator: Dependency::Unavailable,
        ..retrieval_deps("x")
    };
    let app = retrieval_router(offline_config(), deps);

    let response = app
        .oneshot(multipart_request(
            "/describe-image",
            &[
                Part::File("image", "shot.png", PNG_BYTES),
                Part::Text("userId", "dana"),
            ],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(response).await["error"],
        "Generator service unavailable"
    );
}

#[tokio::test]
async fn test_query_is_scoped_to_user() {
    let app = retrieval_router(offline_config(), retrieval_deps("A garage"));
    describe(&app, "erin").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/query",
            json!({"query": "garage?", "userId": "frank"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"response": "No relevant information found."})
    );

    let missing = app
        .oneshot(json_request("/query", json!({"query": "garage?"}), None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(missing).await["error"],
        "Query and userId are required"
    );
}

#[tokio::test]
async fn test_clear_context_removes_only_that_user() {
    let app = retrieval_router(offline_config(), retrieval_deps("A garden"));
    describe(&app, "gail").await;
    describe(&app, "gail").await;
    describe(&app, "hank").await;

    let response = app
        .clone()
        .oneshot(json_request("/clear-context", json!({"userId": "gail"}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Cleared context for userId: gail");
    assert_eq!(body["deleted_entries"], 2);

    let again = app
        .clone()
        .oneshot(json_request("/clear-context", json!({"userId": "gail"}), None))
        .await
        .unwrap();
    assert_eq!(
        body_json(again).await["message"],
        "No context found for this user."
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "/query",
            json!({"query": "garden", "userId": "hank"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await["response"],
        "answered from 1 descriptions"
    );

    let missing = app
        .oneshot(json_request("/clear-context", json!({}), None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "UserId is required");
}
