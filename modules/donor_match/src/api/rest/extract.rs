//! Extractors whose rejections render as problem+json.
//!
//! The axum built-ins answer malformed input with `text/plain`; these wrap
//! them and map every rejection onto a `ProblemResponse`.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::rest::error::from_parts;
use crate::api::rest::problem::ProblemResponse;

fn invalid_request(status: StatusCode, detail: String, instance: &str) -> ProblemResponse {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => from_parts(
            status,
            "PAYLOAD_TOO_LARGE",
            "Payload too large",
            detail,
            instance,
        ),
        _ => from_parts(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "Invalid input",
            detail,
            instance,
        ),
    }
}

/// JSON request body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(e) => Err(invalid_request(e.status(), e.body_text(), &instance)),
        }
    }
}

/// JSON request body that may be left out; an empty body yields `T::default()`.
#[derive(Debug, Clone)]
pub struct OptionalJsonBody<T>(pub T);

impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| invalid_request(e.status(), e.body_text(), &instance))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        match Json::<T>::from_bytes(&bytes) {
            Ok(Json(value)) => Ok(Self(value)),
            Err(e) => Err(invalid_request(e.status(), e.body_text(), &instance)),
        }
    }
}

/// Path parameters.
#[derive(Debug, Clone)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(e) => Err(invalid_request(e.status(), e.body_text(), parts.uri.path())),
        }
    }
}

/// Query string parameters.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(e) => Err(invalid_request(e.status(), e.body_text(), parts.uri.path())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    struct Payload {
        #[serde(default)]
        note: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Required {
        #[allow(dead_code)]
        name: String,
    }

    fn post(body: &'static str, content_type: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/things");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn empty_optional_body_falls_back_to_default() {
        let OptionalJsonBody(payload) =
            OptionalJsonBody::<Payload>::from_request(post("", None), &()).await.unwrap();
        assert!(payload.note.is_none());

        let OptionalJsonBody(payload) = OptionalJsonBody::<Payload>::from_request(
            post(r#"{"note":"hi"}"#, Some("application/json")),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(payload.note.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn malformed_optional_body_is_invalid_input() {
        let ProblemResponse(p) =
            OptionalJsonBody::<Payload>::from_request(post("{", Some("application/json")), &())
                .await
                .unwrap_err();
        assert_eq!(p.status, 400);
        assert_eq!(p.code, "INVALID_INPUT");
        assert_eq!(p.instance, "/things");
    }

    #[tokio::test]
    async fn missing_fields_and_content_type_are_invalid_input() {
        let ProblemResponse(p) =
            JsonBody::<Required>::from_request(post("{}", Some("application/json")), &())
                .await
                .unwrap_err();
        assert_eq!(p.status, 400);
        assert_eq!(p.code, "INVALID_INPUT");

        let ProblemResponse(p) = JsonBody::<Required>::from_request(post("", None), &())
            .await
            .unwrap_err();
        assert_eq!(p.status, 400);
        assert_eq!(p.code, "INVALID_INPUT");
    }
}
