use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::templates::ErrorPage;

/// Any failure while handling a request. Storage errors end up here and are
/// reported as a 500 page; they are never swallowed.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.0);
        error!(error = %message, "request failed");

        let body = ErrorPage {
            message: message.clone(),
        }
        .render()
        .unwrap_or_else(|_| message);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}
