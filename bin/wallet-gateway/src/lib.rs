//! Wallet Gateway - HTTP surface for the wallet tracker
//!
//! Routes:
//! - `GET /` - HTML page
//! - `GET /value`, `POST /value` - current state, set the value
//! - `POST /message` - set the message
//! - `GET /transactions` - ledger
//! - `GET /health` - liveness
//! - `/static/*` - static assets

pub mod api;
pub mod error;
pub mod logging;

use api::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the gateway router.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health_check))
        .route("/value", get(api::get_value).post(api::set_value))
        .route("/message", post(api::set_message))
        .route("/transactions", get(api::get_transactions))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tower::ServiceExt;
    use wallet_common::config::ServerConfig;
    use wallet_store::{DurableStore, Wallet};

    fn test_router(dir: &Path) -> Router {
        let server = ServerConfig {
            static_dir: dir.join("static"),
            templates_dir: dir.join("templates"),
            ..ServerConfig::default()
        };
        let wallet = Wallet::open(DurableStore::new(dir.join("wallet_data.json")));
        router(Arc::new(AppState::new(wallet, &server)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_value_message_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (status, body) = send_json(&app, get("/value")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], 0.0);
        assert_eq!(body["transactions"].as_array().unwrap().len(), 0);

        let (status, body) = send_json(&app, post_json("/value", r#"{"new_value": 42.5}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], 42.5);
        let txs = body["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0]["previous_value"], 0.0);
        assert_eq!(txs[0]["value"], 42.5);
        assert_eq!(txs[0]["message"], "Updated value to 42.5");

        let (status, body) =
            send_json(&app, post_json("/message", r#"{"message": "Bonus!"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Bonus!");
        assert_eq!(body["value"], 42.5);
        let txs = body["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[1]["previous_value"], 42.5);
        assert_eq!(txs[1]["value"], 42.5);

        let (status, body) = send_json(&app, get("/transactions")).await;
        assert_eq!(status, StatusCode::OK);
        let txs = body["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0]["message"], "Updated value to 42.5");
        assert_eq!(txs[1]["message"], "Bonus!");
    }

    #[tokio::test]
    async fn test_value_response_shape() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (_, body) = send_json(&app, get("/value")).await;
        let object = body.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["last_updated", "message", "transactions", "value"]);
        assert!(body["last_updated"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_rejects_wrong_value_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (status, body) =
            send_json(&app, post_json("/value", r#"{"new_value": "lots"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "InvalidRequest");

        let (status, _) = send_json(&app, post_json("/value", "{}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send_json(&app, post_json("/value", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Nothing reached the ledger
        let (_, body) = send_json(&app, get("/transactions")).await;
        assert_eq!(body["transactions"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_rejects_wrong_message_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (status, _) = send_json(&app, post_json("/message", r#"{"message": 5}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let request = Request::builder()
            .method("POST")
            .uri("/message")
            .body(Body::from(r#"{"message": "hi"}"#))
            .unwrap();
        let (status, _) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_empty_message_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (status, body) = send_json(&app, post_json("/message", r#"{"message": ""}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "");
    }

    #[tokio::test]
    async fn test_save_failure_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let path = dir.path().join("wallet_data.json");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let (status, body) = send_json(&app, post_json("/value", r#"{"new_value": 1}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "StorageError");
        assert!(!dir.path().join("wallet_data.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupted_store_is_not_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        fs::write(dir.path().join("wallet_data.json"), b"{{{{").unwrap();

        let (status, body) = send_json(&app, get("/transactions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactions"].as_array().unwrap().len(), 0);
        assert!(dir.path().join("wallet_data.json.corrupted").exists());
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (status, body) = send_json(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_and_static() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (status, _) = send_json(&app, get("/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        fs::create_dir(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("templates/index.html"), "<h1>wallet</h1>").unwrap();
        fs::create_dir(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/app.js"), "console.log(1);").unwrap();

        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>wallet</h1>");

        let (status, body) = send(&app, get("/static/app.js")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log(1);");
    }
}
