//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element via htmx
//! response targeting, so endpoints can report the outcome of an action
//! without a full page reload.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A success or error message to display to the user.
#[derive(Debug, Clone)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple {
        message: String,
    },
    /// An error message with additional details.
    Error {
        message: String,
        details: String,
    },
}

impl Alert {
    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        let (message, details, container_style) = match self {
            Alert::SuccessSimple { message } => (
                message,
                String::new(),
                "p-4 text-green-800 border border-green-300 rounded-lg \
                bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
            ),
            Alert::Error { message, details } => (
                message,
                details,
                "p-4 text-red-800 border border-red-300 rounded-lg \
                bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
            ),
        };

        html!(
            div
                class=(container_style)
                role="alert"
                onclick="this.parentElement.classList.add('hidden')"
            {
                p class="font-medium" { (message) }

                @if !details.is_empty() {
                    p { (details) }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

/// Render `markup` as an HTML response with the given `status`.
pub(crate) fn render(status: StatusCode, alert: Alert) -> Response {
    (status, alert.into_html()).into_response()
}
