//! Common HTTP types used throughout the handler chain.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;

/// The HTTP request type used in the handler chain.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body: the body is
/// fully buffered, so middleware can inspect it and downstream handlers can
/// still read the identical bytes.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the handler chain.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a response with the given status code and an empty body.
    fn empty(status: http::StatusCode) -> Response;

    /// Creates a JSON response with the given status code.
    fn json<T: Serialize + ?Sized>(status: http::StatusCode, body: &T) -> Response;
}

impl ResponseExt for Response {
    fn empty(status: http::StatusCode) -> Response {
        http::Response::builder()
            .status(status)
            .body(Full::new(Bytes::new()))
            .expect("failed to build empty response")
    }

    fn json<T: Serialize + ?Sized>(status: http::StatusCode, body: &T) -> Response {
        let body = serde_json::to_vec(body).expect("failed to serialize JSON response");

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build JSON response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_empty_response() {
        let response = Response::empty(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(http::header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(StatusCode::BAD_REQUEST, &json!({"code": "oops"}));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
