//! Body and query extractors whose rejections render as `{"error": "..."}`.
//!
//! Axum's own [`Json`], [`Form`] and [`Query`] reject with plain-text 400/415/422 responses.
//! These wrappers run the same extraction and turn any rejection into [`Error::Validation`], so a
//! malformed request gets the same 400 body as a failed field check.

use axum::{
    Form, Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::errors::Error;

/// JSON request body.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

/// `application/x-www-form-urlencoded` request body.
#[derive(Debug)]
pub struct ValidForm<T>(pub T);

/// URL query string.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: Option<String>,
    }

    async fn echo(ValidQuery(query): ValidQuery<Payload>, ValidJson(body): ValidJson<Payload>) -> String {
        format!("{}/{}", query.name.unwrap_or_default(), body.name.unwrap_or_default())
    }

    async fn error_of(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(uri: &str, content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_well_formed_input() {
        let app = Router::new().route("/", post(echo));
        let response = app
            .oneshot(request("/?name=q", "application/json", r#"{"name":"b"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejections_become_validation_errors() {
        let app = Router::new().route("/", post(echo));
        let cases = [
            request("/", "application/json", r#"{"name":5}"#),
            request("/", "application/json", "{not json"),
            request("/", "text/plain", "hello"),
        ];

        for req in cases {
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = error_of(response).await;
            assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{body}");
        }
    }

    #[tokio::test]
    async fn test_form_rejection_is_validation_error() {
        async fn form(ValidForm(body): ValidForm<Payload>) -> String {
            body.name.unwrap_or_default()
        }

        let app = Router::new().route("/", post(form));
        let response = app.oneshot(request("/", "application/json", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_of(response).await["error"].is_string());
    }
}
