//! Response header middleware.
//!
//! Every RMA response tells crawlers to stay away:
//!
//! ```text
//! X-Robots-Tag: noindex, nofollow
//! ```
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use rma_desk_web::middleware::no_index_layer;
//!
//! let app = Router::new()
//!     .route("/rma", get(show_form))
//!     .layer(no_index_layer());
//! ```

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    response::Response,
};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Header name for crawler directives.
pub const ROBOTS_TAG_HEADER: &str = "x-robots-tag";

/// Value sent on every response.
pub const NO_INDEX: &str = "noindex, nofollow";

/// Create a layer that adds `X-Robots-Tag: noindex, nofollow` to all responses.
#[must_use]
pub const fn no_index_layer() -> NoIndexLayer {
    NoIndexLayer
}

/// Layer for the robots header.
#[derive(Clone, Debug)]
pub struct NoIndexLayer;

impl<S> Layer<S> for NoIndexLayer {
    type Service = NoIndexMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        NoIndexMiddleware { inner }
    }
}

/// Middleware service for the robots header.
#[derive(Clone, Debug)]
pub struct NoIndexMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for NoIndexMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.await?;
            response.headers_mut().insert(
                HeaderName::from_static(ROBOTS_TAG_HEADER),
                HeaderValue::from_static(NO_INDEX),
            );
            Ok(response)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_header_added_to_success() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(no_index_layer());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(ROBOTS_TAG_HEADER).unwrap(),
            "noindex, nofollow"
        );
    }

    #[tokio::test]
    async fn test_header_added_to_errors() {
        let app = Router::new()
            .route(
                "/test",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .layer(no_index_layer());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(ROBOTS_TAG_HEADER));
    }
}
