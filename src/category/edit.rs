//! Category editing page with rename/recolor and merge endpoints.
//!
//! Renaming a category to an existing name is rejected rather than silently
//! merging. Merging is its own explicit form on this page, so combining two
//! categories is always a deliberate action.

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
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    category::{
        Category, CategoryColor, CategoryId, CategoryName, domain::CategoryFormData,
        domain::MergeFormData, get_all_categories, get_category, merge_categories,
        update_category,
    },
};

/// The state needed for the edit category page.
#[derive(Debug, Clone)]
pub struct EditCategoryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating or merging a category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    match get_category(category_id, &connection) {
        Ok(category) => {
            let merge_targets: Vec<Category> = get_all_categories(&connection)
                .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?
                .into_iter()
                .filter(|other| other.id != category_id)
                .collect();

            Ok(edit_category_view(
                &edit_endpoint,
                &update_endpoint,
                &category,
                &merge_targets,
                "",
            )
            .into_response())
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Category not found",
                _ => {
                    tracing::error!("Failed to retrieve category {category_id}: {error}");
                    "Failed to load category"
                }
            };

            let placeholder = Category {
                id: category_id,
                name: CategoryName::new_unchecked(""),
                color: CategoryColor::new_unchecked("#1f77b4"),
            };

            Ok(edit_category_view(
                &edit_endpoint,
                &update_endpoint,
                &placeholder,
                &[],
                error_message,
            )
            .into_response())
        }
    }
}

/// Handle category update form submission.
///
/// Renaming to a name held by another category fails with an alert that
/// points the user at the merge form instead.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<UpdateCategoryEndpointState>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return update_category_form_view(
                &update_endpoint,
                &form_data.name,
                &form_data.color,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let color = match CategoryColor::new(&form_data.color) {
        Ok(color) => color,
        Err(error) => {
            return update_category_form_view(
                &update_endpoint,
                &form_data.name,
                &form_data.color,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, name, color, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::DuplicateCategoryName(_) | Error::UpdateMissingCategory)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Handle the merge form submission.
///
/// The path parameter is the source category; its expenses move to the
/// selected target before the source is deleted. The optional name and
/// color fields rename/recolor the target as part of the same transaction.
pub async fn merge_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<UpdateCategoryEndpointState>,
    Form(form_data): Form<MergeFormData>,
) -> Response {
    let new_name = match &form_data.name {
        Some(name) if !name.trim().is_empty() => Some(CategoryName::new_unchecked(name.trim())),
        _ => None,
    };
    let new_color = match &form_data.color {
        Some(color) if !color.trim().is_empty() => match CategoryColor::new(color) {
            Ok(color) => Some(color),
            Err(error) => {
                return error.into_alert_response();
            }
        },
        _ => None,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match merge_categories(
        category_id,
        form_data.target_id,
        new_name,
        new_color,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::SameCategory | Error::NotFound | Error::DuplicateCategoryName(_)),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while merging category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    category: &Category,
    merge_targets: &[Category],
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let update_form = update_category_form_view(
        update_endpoint,
        category.name.as_ref(),
        category.color.as_ref(),
        error_message,
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            (update_form)

            @if !merge_targets.is_empty() {
                div class="w-full mt-10 pt-6 border-t border-gray-200 dark:border-gray-700"
                {
                    (merge_category_form_view(category, merge_targets))
                }

                div class="w-full mt-10 pt-6 border-t border-gray-200 dark:border-gray-700"
                {
                    (super::delete::reassign_category_form_view(category, merge_targets))
                }
            }
        }
    };

    base("Edit Category", &[], &content)
}

fn update_category_form_view(
    update_endpoint: &str,
    category_name: &str,
    category_color: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    value=(category_name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="color"
                    class=(FORM_LABEL_STYLE)
                {
                    "Color"
                }

                input
                    id="color"
                    type="color"
                    name="color"
                    value=(category_color)
                    class="h-10 w-20 cursor-pointer rounded border border-gray-300 dark:border-gray-600";
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}

fn merge_category_form_view(category: &Category, merge_targets: &[Category]) -> Markup {
    let merge_endpoint = endpoints::format_endpoint(endpoints::MERGE_CATEGORY, category.id);
    let confirm_message = format!(
        "Merge '{}' into the selected category? All of its expenses will be reassigned and '{}' will be deleted.",
        category.name, category.name
    );

    html! {
        form
            hx-post=(merge_endpoint)
            hx-confirm=(confirm_message)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-lg font-semibold" { "Merge Into Another Category" }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Reassigns every expense of \"" (category.name) "\" to the
                selected category, then deletes \"" (category.name) "\"."
            }

            div
            {
                label
                    for="target_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Target Category"
                }

                select
                    id="target_id"
                    name="target_id"
                    required
                    class=(FORM_SELECT_STYLE)
                {
                    @for target in merge_targets {
                        option value=(target.id) { (target.name) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Merge" }
        }
    }
}


#[cfg(test)]
mod update_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        category::{
            CategoryColor, CategoryName, create_category, create_category_table,
            domain::CategoryFormData, edit::UpdateCategoryEndpointState, get_category,
            update_category_endpoint,
        },
        endpoints,
        test_utils::assert_hx_redirect,
    };

    fn get_update_category_state() -> UpdateCategoryEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");

        UpdateCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn update_category_endpoint_succeeds() {
        let state = get_update_category_state();
        let category = create_category(
            CategoryName::new_unchecked("Original"),
            CategoryColor::new_unchecked("#ff7f0e"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test category");

        let form = CategoryFormData {
            name: "Updated".to_string(),
            color: "#2ca02c".to_string(),
        };

        let response = update_category_endpoint(Path(category.id), State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);

        let updated = get_category(category.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.name.as_ref(), "Updated");
        assert_eq!(updated.color.as_ref(), "#2ca02c");
    }

    #[tokio::test]
    async fn update_category_endpoint_rejects_name_collision() {
        let state = get_update_category_state();
        let (category, other) = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryName::new_unchecked("Dining"),
                CategoryColor::new_unchecked("#ff7f0e"),
                &connection,
            )
            .unwrap();
            let other = create_category(
                CategoryName::new_unchecked("Food"),
                CategoryColor::new_unchecked("#2ca02c"),
                &connection,
            )
            .unwrap();
            (category, other)
        };

        let form = CategoryFormData {
            name: other.name.to_string(),
            color: "#ff7f0e".to_string(),
        };

        let response = update_category_endpoint(Path(category.id), State(state.clone()), Form(form))
            .await
            .into_response();

        // Renaming over another category must be rejected, not merged.
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let unchanged = get_category(category.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(unchanged.name.as_ref(), "Dining");
    }

    #[tokio::test]
    async fn update_category_endpoint_with_invalid_id_returns_not_found() {
        let state = get_update_category_state();
        let invalid_id = 999999;
        let form = CategoryFormData {
            name: "Updated".to_string(),
            color: "#2ca02c".to_string(),
        };

        let response = update_category_endpoint(Path(invalid_id), State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod merge_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{
            CategoryColor, CategoryName, create_category, create_category_table,
            domain::MergeFormData, edit::UpdateCategoryEndpointState, get_category,
            merge_category_endpoint,
        },
        endpoints,
        expense::{Expense, create_expense, create_expense_table, get_expense},
        test_utils::assert_hx_redirect,
    };

    fn get_merge_state() -> UpdateCategoryEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        connection
            .pragma_update(None, "foreign_keys", true)
            .expect("Could not enable foreign keys");
        create_category_table(&connection).expect("Could not create category table");
        create_expense_table(&connection).expect("Could not create expense table");

        UpdateCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn merge_endpoint_reassigns_expenses_and_redirects() {
        let state = get_merge_state();
        let (source, target, expense) = {
            let connection = state.db_connection.lock().unwrap();
            let source = create_category(
                CategoryName::new_unchecked("Dining"),
                CategoryColor::new_unchecked("#ff7f0e"),
                &connection,
            )
            .unwrap();
            let target = create_category(
                CategoryName::new_unchecked("Food"),
                CategoryColor::new_unchecked("#2ca02c"),
                &connection,
            )
            .unwrap();
            let expense = create_expense(
                Expense::build(25.0, source.id, date!(2024 - 02 - 10)),
                &connection,
            )
            .unwrap();
            (source, target, expense)
        };

        let form = MergeFormData {
            target_id: target.id,
            name: None,
            color: None,
        };

        let response = merge_category_endpoint(Path(source.id), State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_category(source.id, &connection), Err(Error::NotFound));
        let moved = get_expense(expense.id, &connection).unwrap();
        assert_eq!(moved.category_id, target.id);
    }

    #[tokio::test]
    async fn merge_endpoint_rejects_same_category() {
        let state = get_merge_state();
        let category = create_category(
            CategoryName::new_unchecked("Food"),
            CategoryColor::new_unchecked("#2ca02c"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let form = MergeFormData {
            target_id: category.id,
            name: None,
            color: None,
        };

        let response = merge_category_endpoint(Path(category.id), State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
