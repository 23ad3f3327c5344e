//! Category deletion and reassign-then-delete endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE},
    category::{
        Category, CategoryId, db::delete_category, delete_category_reassign,
        domain::ReassignFormData,
    },
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category deletion. Returns success alert or error.
///
/// Deleting a category that still has expenses fails with an alert that
/// reports how many expenses reference it.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Category deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::CategoryInUse { .. } | Error::DeleteMissingCategory)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Handle the reassign-then-delete form submission.
///
/// The path parameter is the category being deleted; its expenses move to
/// the target selected in the form before the category is removed.
pub async fn reassign_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
    Form(form_data): Form<ReassignFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category_reassign(category_id, form_data.target_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::SameCategory | Error::NotFound | Error::DeleteMissingCategory)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while reassigning category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// The form on the edit page for deleting a category after moving its
/// expenses elsewhere.
pub(super) fn reassign_category_form_view(
    category: &Category,
    reassign_targets: &[Category],
) -> Markup {
    let reassign_endpoint = endpoints::format_endpoint(endpoints::REASSIGN_CATEGORY, category.id);
    let confirm_message = format!(
        "Delete '{}'? Its expenses will be reassigned to the selected category first.",
        category.name
    );

    html! {
        form
            hx-post=(reassign_endpoint)
            hx-confirm=(confirm_message)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-lg font-semibold" { "Delete and Reassign Expenses" }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Moves every expense of \"" (category.name) "\" to the
                selected category, then deletes \"" (category.name) "\",
                keeping its name and color."
            }

            div
            {
                label
                    for="reassign_target_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Reassign Expenses To"
                }

                select
                    id="reassign_target_id"
                    name="target_id"
                    required
                    class=(FORM_SELECT_STYLE)
                {
                    @for target in reassign_targets {
                        option value=(target.id) { (target.name) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Reassign and Delete" }
        }
    }
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Html;
    use time::macros::date;

    use crate::{
        category::{
            CategoryColor, CategoryName, create_category, create_category_table,
            delete_category_endpoint,
        },
        expense::{Expense, create_expense, create_expense_table},
        test_utils::{assert_valid_html, get_header, parse_html_fragment},
    };

    use super::DeleteCategoryEndpointState;

    fn get_delete_category_state() -> DeleteCategoryEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        connection
            .pragma_update(None, "foreign_keys", true)
            .expect("Could not enable foreign keys");
        create_category_table(&connection).expect("Could not create category table");
        create_expense_table(&connection).expect("Could not create expense table");

        DeleteCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn delete_category_endpoint_succeeds() {
        let state = get_delete_category_state();
        let category = create_category(
            CategoryName::new_unchecked("Test Category"),
            CategoryColor::new_unchecked("#ff7f0e"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test category");

        let response = delete_category_endpoint(Path(category.id), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn delete_category_endpoint_reports_referencing_expense_count() {
        let state = get_delete_category_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryName::new_unchecked("Busy"),
                CategoryColor::new_unchecked("#ff7f0e"),
                &connection,
            )
            .unwrap();
            for _ in 0..2 {
                create_expense(
                    Expense::build(5.0, category.id, date!(2024 - 01 - 01)),
                    &connection,
                )
                .unwrap();
            }
            category
        };

        let response = delete_category_endpoint(Path(category.id), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_alert_contains(&html, "2 expense(s)");
    }

    #[tokio::test]
    async fn delete_category_endpoint_with_invalid_id_returns_error_html() {
        let state = get_delete_category_state();
        let invalid_id = 999999;

        let response = delete_category_endpoint(Path(invalid_id), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_alert_contains(&html, "Could not delete category");
    }

    #[track_caller]
    fn assert_alert_contains(html: &Html, want_text: &str) {
        let p = scraper::Selector::parse("p").unwrap();
        let alert_text = html
            .select(&p)
            .flat_map(|element| element.text())
            .collect::<Vec<_>>()
            .join(" ");

        assert!(
            alert_text.contains(want_text),
            "want alert containing {want_text:?}, got {alert_text:?}"
        );
    }
}
