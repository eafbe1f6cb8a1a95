//! axum middleware that validates request bodies and query strings.
//!
//! ```no_run
//! use axum::{middleware::from_fn_with_state, routing::post, Extension, Router};
//! use jio::http::{validate_body, JsonValidator, Validated};
//! use jio::{object, string, Keys};
//!
//! let schema = object().keys(Keys::new().key("name", string().required()));
//! let app: Router = Router::new()
//!     .route("/", post(|Extension(Validated(doc)): Extension<Validated>| async move {
//!         doc.to_string()
//!     }))
//!     .layer(from_fn_with_state(JsonValidator::new(schema), validate_body));
//! ```

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::loader::load_document_slice;
use crate::schema::Schema;
use crate::validator::validate;

/// Default limit on request bodies read by [`validate_body`].
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Builds the response sent when a request is rejected.
pub type ErrorResponder = Arc<dyn Fn(&Parts, &Error) -> Response + Send + Sync>;

/// The validated document, inserted into request extensions on success.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated(pub Value);

/// Middleware state: the schema plus how to reject requests.
#[derive(Clone)]
pub struct JsonValidator {
    schema: Arc<dyn Schema>,
    responder: ErrorResponder,
    body_limit: usize,
}

impl fmt::Debug for JsonValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonValidator")
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl JsonValidator {
    pub fn new(schema: impl Schema + 'static) -> Self {
        Self {
            schema: Arc::new(schema),
            responder: Arc::new(default_error_responder),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Replace the response built for rejected requests.
    pub fn error_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&Parts, &Error) -> Response + Send + Sync + 'static,
    {
        self.responder = Arc::new(responder);
        self
    }

    /// Maximum body size in bytes; larger bodies are rejected.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    fn reject(&self, parts: &Parts, err: &Error) -> Response {
        tracing::debug!(
            method = %parts.method,
            uri = %parts.uri,
            error = %err,
            "request rejected"
        );
        (self.responder)(parts, err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// Responds 400 with `{"message": "<error text>"}`.
pub fn default_error_responder(_parts: &Parts, err: &Error) -> Response {
    let body = ErrorBody {
        message: err.to_string(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Validate the JSON request body.
///
/// On success the body is replaced with the encoded validated document,
/// `Content-Length` is set to its size and [`Validated`] is added to the
/// request extensions.
pub async fn validate_body(
    State(validator): State<JsonValidator>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, validator.body_limit).await {
        Ok(bytes) => bytes,
        Err(source) => return validator.reject(&parts, &Error::Body { source }),
    };

    let document = match load_document_slice(&bytes)
        .and_then(|document| validate(validator.schema.as_ref(), document).map_err(Error::from))
    {
        Ok(document) => document,
        Err(err) => return validator.reject(&parts, &err),
    };

    let encoded = match serde_json::to_vec(&document) {
        Ok(encoded) => encoded,
        Err(source) => return validator.reject(&parts, &Error::Encode { source }),
    };

    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(encoded.len()));
    parts.extensions.insert(Validated(document));
    next.run(Request::from_parts(parts, Body::from(encoded))).await
}

/// Validate the URL query as a mapping of string values.
///
/// A key repeated in the query keeps its first value. On success
/// [`Validated`] is added to the request extensions.
pub async fn validate_query(
    State(validator): State<JsonValidator>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let document = query_document(&parts);
    let document = match validate(validator.schema.as_ref(), document) {
        Ok(document) => document,
        Err(err) => return validator.reject(&parts, &Error::from(err)),
    };

    parts.extensions.insert(Validated(document));
    next.run(Request::from_parts(parts, body)).await
}

fn query_document(parts: &Parts) -> Value {
    let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();

    let mut map = Map::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;

    fn parts(uri: &str) -> Parts {
        let (parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn query_first_value_wins() {
        let doc = query_document(&parts("/?a=1&b=x&a=2"));
        assert_eq!(doc, json!({"a": "1", "b": "x"}));
    }

    #[test]
    fn query_without_string_is_empty_mapping() {
        assert_eq!(query_document(&parts("/")), json!({}));
    }

    #[test]
    fn query_values_are_decoded() {
        let doc = query_document(&parts("/?name=hello%20world&q=a+b"));
        assert_eq!(doc, json!({"name": "hello world", "q": "a b"}));
    }

    #[test]
    fn default_responder_is_bad_request() {
        let err = Error::from(crate::ValidationError::custom("nope"));
        let response = default_error_responder(&parts("/"), &err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }

    #[test]
    fn builder_options() {
        let validator = JsonValidator::new(crate::any()).body_limit(16);
        assert_eq!(validator.body_limit, 16);
        assert!(format!("{:?}", validator).contains("body_limit: 16"));
    }
}
