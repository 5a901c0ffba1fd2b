//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error renders the same error page: a generic message plus a link
//! back to the menu. Upstream details are logged, never shown.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fast_pizza_core::SubmissionError;
use thiserror::Error;

use crate::restaurant::RestaurantError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Restaurant API operation failed.
    #[error("Restaurant API error: {0}")]
    Restaurant(#[from] RestaurantError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The order form carried a malformed hidden field.
    #[error("Invalid order submission: {0}")]
    Submission(#[from] SubmissionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Restaurant(err) => match err {
                RestaurantError::NotFound(_) => StatusCode::NOT_FOUND,
                RestaurantError::Validation { status, .. } if *status == StatusCode::NOT_FOUND => {
                    StatusCode::NOT_FOUND
                }
                RestaurantError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RestaurantError::Http(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
                RestaurantError::Http(_)
                | RestaurantError::Server { .. }
                | RestaurantError::Parse(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Submission(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show to visitors.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Restaurant(RestaurantError::NotFound(id)) => {
                format!("Couldn't find order #{id}")
            }
            Self::Restaurant(RestaurantError::Validation { message, .. }) => message.clone(),
            Self::Restaurant(_) => {
                "The restaurant is not answering right now. Please try again in a moment."
                    .to_string()
            }
            Self::Session(_) | Self::Internal(_) => "Something went very wrong.".to_string(),
            Self::Submission(_) => "The order form was incomplete. Please try again.".to_string(),
            Self::NotFound(what) => format!("Couldn't find {what}"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

/// Error boundary page.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let page = ErrorTemplate {
            status: status.as_u16(),
            message: self.public_message(),
        };
        (status, page).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added pizza", Some(&[("pizza_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
