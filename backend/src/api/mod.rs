use std::sync::Arc;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{get, post},
    Extension, Router,
};
use shared::token::extract_bearer_token;
use tower_http::trace::TraceLayer;

use crate::custody::Custody;
use crate::error::ApiError;

pub mod login;
pub mod registration;
pub mod videos;

pub fn router(custody: Arc<Custody>) -> Router {
    Router::new()
        .route("/register", post(registration::register))
        .route("/login", post(login::login))
        .route("/videos", post(videos::record_video).get(videos::list_videos))
        .route("/videos/:id/verify", get(videos::verify_video))
        .layer(Extension(custody))
        .layer(TraceLayer::new_for_http())
}

/// The bearer token from `Authorization`, or `Unauthenticated`.
pub(crate) fn bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    extract_bearer_token(header).ok_or(ApiError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use shared::derivation::MIN_PBKDF2_ITERATIONS;
    use shared::token::SessionTokens;
    use shared::vault::KeyVault;
    use tower::ServiceExt;

    use crate::store::Store;

    async fn app() -> Router {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.run_migrations().await.unwrap();

        router(Arc::new(Custody::new(
            store,
            KeyVault::with_iterations(MIN_PBKDF2_ITERATIONS).unwrap(),
            SessionTokens::with_default_lifetime(b"0123456789abcdef0123456789abcdef").unwrap(),
        )))
    }

    fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut request = Request::post(uri).header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_login_record_verify() {
        let app = app().await;
        let credentials = json!({ "email": "a@x.com", "password": "Abcd1234" });

        let response = app
            .clone()
            .oneshot(post("/register", None, credentials.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let account = json_body(response).await;
        assert!(account.get("wrapped_key").is_none());
        assert!(account.get("credential_hash").is_none());
        let wallet_address = account["wallet_address"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post("/register", None, credentials.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["kind"], "email_taken");

        let response = app
            .clone()
            .oneshot(post("/login", None, credentials))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = json_body(response).await["token"].as_str().unwrap().to_string();

        let upload = json!({
            "location_url": "https://cdn/v1.mp4",
            "title": "My Clip",
            "password": "Abcd1234",
        });
        let response = app
            .clone()
            .oneshot(post("/videos", Some(&token), upload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let video = json_body(response).await;
        let video_id = video["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/videos/{video_id}/verify"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let verification = json_body(response).await;
        assert_eq!(verification["valid"], true);
        assert_eq!(verification["wallet_address"], wallet_address.as_str());

        let response = app
            .oneshot(
                Request::get("/videos")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_without_token_is_unauthenticated() {
        let app = app().await;
        let upload = json!({
            "location_url": "https://cdn/v1.mp4",
            "title": "My Clip",
            "password": "Abcd1234",
        });

        let response = app.oneshot(post("/videos", None, upload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["kind"], "unauthenticated");
    }

    #[tokio::test]
    async fn weak_password_is_bad_request() {
        let app = app().await;
        let response = app
            .oneshot(post(
                "/register",
                None,
                json!({ "email": "a@x.com", "password": "password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "weak_password");
    }
}
