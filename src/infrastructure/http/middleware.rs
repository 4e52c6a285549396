//! HTTP Middleware
//!
//! 传输层错误日志；业务错误（errno != 0）在 ApiError::into_response() 中记录

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 4xx/5xx 响应记录方法、路径与耗时
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::util::ServiceExt;

    async fn accepted() -> StatusCode {
        StatusCode::ACCEPTED
    }

    async fn unavailable() -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    fn router() -> Router {
        Router::new()
            .route("/load", post(accepted))
            .route("/fetch", post(unavailable))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_statuses_pass_through_unchanged() {
        assert_eq!(status_of("/load").await, StatusCode::ACCEPTED);
        assert_eq!(status_of("/fetch").await, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of("/missing").await, StatusCode::NOT_FOUND);
    }
}
