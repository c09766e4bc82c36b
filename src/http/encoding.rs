//! JSON envelope encoding.
//!
//! Content negotiation is fixed to `application/json` in both directions.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::http::error::ApiError;

/// Failure to serialize a response payload.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode response: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Failure to parse a request body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("request body is empty")]
    Empty,

    #[error("malformed JSON body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serialize `payload` as a JSON response with `status`.
///
/// The payload is serialized in full before the response is built, so a
/// failure never yields a partial body.
pub fn encode<T>(status: StatusCode, payload: &T) -> Result<Response, EncodeError>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(payload)?;
    Ok((
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response())
}

/// Parse a JSON request body. Empty and whitespace-only bodies are rejected.
pub fn decode<T>(body: &[u8]) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Extractor running `decode` on the request body.
///
/// Rejects with 400 `{"error":"invalid request body"}`, or 413 when the body
/// exceeds the configured limit.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                tracing::warn!(error = %rejection, "Failed to read request body");
                ApiError::invalid_body()
            }
        })?;

        decode(&bytes).map(JsonBody).map_err(|e| {
            tracing::warn!(error = %e, "Failed to decode request");
            ApiError::invalid_body()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::{Deserialize, Serializer};
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        tags: Vec<String>,
        price: Option<u32>,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("channels cannot be serialized"))
        }
    }

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_encode_sets_status_and_content_type() {
        let response = encode(
            StatusCode::BAD_REQUEST,
            &HashMap::from([("error", "bad request")]),
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(&body_bytes(response).await[..], br#"{"error":"bad request"}"#);
    }

    #[test]
    fn test_encode_failure_is_an_error() {
        let err = encode(StatusCode::OK, &Unserializable).unwrap_err();
        assert!(err.to_string().contains("channels cannot be serialized"));
    }

    #[tokio::test]
    async fn test_encoded_body_decodes_back() {
        let item = Item {
            name: "widget".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            price: Some(3),
        };
        let response = encode(StatusCode::OK, &item).unwrap();
        let decoded: Item = decode(&body_bytes(response).await).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn test_decode_rejects_empty_body() {
        assert!(matches!(decode::<Item>(b""), Err(DecodeError::Empty)));
        assert!(matches!(decode::<Item>(b"  \n"), Err(DecodeError::Empty)));
        assert!(matches!(
            decode::<HashMap<String, String>>(b""),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_body() {
        assert!(matches!(
            decode::<Item>(b"{\"name\":"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            decode::<Item>(b"{\"name\": 5}"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_map() {
        let map: HashMap<String, String> = decode(b"{}").unwrap();
        assert!(map.is_empty());
        let map: HashMap<String, String> = decode(br#"{"k":"v"}"#).unwrap();
        assert_eq!(map["k"], "v");
    }
}
