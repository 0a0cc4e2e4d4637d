//! Error types.
//!
//! [`Error`] is returned by the pure date and milestone calculations.
//! [`AppError`] covers everything a request handler can fail with and
//! renders itself as an HTML error page through axum's [`IntoResponse`].

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Errors produced by the date and milestone calculations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An argument was outside the domain of the operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request was missing a parameter or carried a malformed one.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The OAuth callback referenced a request token we never issued,
    /// or one that was already exchanged.
    #[error("unknown or expired request token")]
    UnknownRequestToken,

    /// Twitter returned an error or could not be reached.
    #[error("twitter error: {0:#}")]
    Upstream(#[from] anyhow::Error),

    /// A template failed to render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A statistic could not be computed from the profile.
    #[error(transparent)]
    Core(#[from] Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::UnknownRequestToken => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Template(_) | Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let message = self.to_string();
        match crate::render::error_page(status, &message) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to render error page");
                (status, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::UnknownRequestToken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(anyhow::anyhow!("timeout")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(Error::InvalidInput("rate".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn responds_with_rendered_error_page() {
        let response = AppError::UnknownRequestToken.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert!(body.contains("<h1>400 Bad Request</h1>"));
        assert!(body.contains("unknown or expired request token"));
    }
}
