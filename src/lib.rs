//! D-Tracker is a web app for recording personal expenses and reviewing
//! where the money went.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod analysis;
mod app_state;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod expense;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod period;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;

pub use app_state::AppState;
pub use category::{Category, CategoryId, get_all_categories};
pub use db::initialize as initialize_db;
pub use expense::{Expense, ExpenseBuilder, create_expense};
pub use logging::logging_middleware;
pub use routing::build_router;

use crate::{
    alert::{Alert, render},
    internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A string that is not a hex color code was used to create a category
    /// color.
    #[error("\"{0}\" is not a valid color, expected a hex code like #1f77b4")]
    InvalidColor(String),

    /// A category with the same name (ignoring case) already exists.
    #[error("a category named \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID used to create an expense did not match a valid
    /// category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A zero or negative amount was used to create an expense.
    ///
    /// Expenses record money that was spent, so amounts must be greater
    /// than zero.
    #[error("{0} is not a valid amount, expenses must be greater than zero")]
    NonPositiveAmount(f64),

    /// Tried to delete a category that still has expenses referencing it.
    ///
    /// The caller should reassign the expenses to another category first.
    #[error("there are {count} expense(s) associated with this category, so it cannot be deleted")]
    CategoryInUse {
        /// The number of expenses referencing the category.
        count: u32,
    },

    /// The source and target of a merge or reassignment were the same
    /// category.
    #[error("the source and target categories must be different")]
    SameCategory,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The CSV export could not be generated.
    #[error("could not generate the CSV export: {0}")]
    CsvError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::DuplicateCategoryName(name) => render(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Duplicate Category Name",
                    &format!(
                        "A category named \"{name}\" already exists. \
                        Choose a different name, or merge this category into the existing one.",
                    ),
                ),
            ),
            Error::InvalidCategory(category_id) => render(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid category ID",
                    &format!("Could not find a category with the ID {category_id:?}"),
                ),
            ),
            Error::NonPositiveAmount(amount) => render(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid expense amount",
                    &format!("{amount} is not a valid amount. Enter an amount greater than zero."),
                ),
            ),
            Error::CategoryInUse { count } => render(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Could not delete category",
                    &format!(
                        "There are {count} expense(s) associated with this category. \
                        Reassign them to another category first.",
                    ),
                ),
            ),
            Error::SameCategory => render(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Could not merge categories",
                    "The source and target categories must be different.",
                ),
            ),
            Error::UpdateMissingCategory => render(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update category",
                    "The category could not be found.",
                ),
            ),
            Error::DeleteMissingCategory => render(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                ),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
