//! Status capture around the inner handler.

use std::future::Future;

use axum::{http::StatusCode, response::Response};

/// Status produced by the inner handler, `200 OK` until one is observed.
///
/// The response itself passes through untouched: headers, body and timing are
/// exactly what the inner handler produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedStatus(StatusCode);

impl Default for CapturedStatus {
    fn default() -> Self {
        Self(StatusCode::OK)
    }
}

impl CapturedStatus {
    /// Drive `inner` to completion, recording the status of its response.
    pub async fn capture<F>(&mut self, inner: F) -> Response
    where
        F: Future<Output = Response>,
    {
        let response = inner.await;
        self.0 = response.status();
        response
    }

    pub fn status(self) -> StatusCode {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::header,
        response::IntoResponse,
    };

    #[test]
    fn defaults_to_ok() {
        assert_eq!(CapturedStatus::default().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn records_inner_status() {
        let mut captured = CapturedStatus::default();
        let resp = captured
            .capture(async { StatusCode::METHOD_NOT_ALLOWED.into_response() })
            .await;
        assert_eq!(captured.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn response_passes_through_unchanged() {
        let mut captured = CapturedStatus::default();
        let resp = captured
            .capture(async {
                (
                    StatusCode::CREATED,
                    [(header::CONTENT_TYPE, "text/plain"), (header::ETAG, "\"v1\"")],
                    "body bytes",
                )
                    .into_response()
            })
            .await;

        assert_eq!(captured.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(resp.headers()[header::ETAG], "\"v1\"");
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"body bytes");
    }

    #[tokio::test]
    async fn implicit_status_stays_ok() {
        let mut captured = CapturedStatus::default();
        let _ = captured
            .capture(async { Body::from("no explicit status").into_response() })
            .await;
        assert_eq!(captured.status(), StatusCode::OK);
    }
}
