//! Expense entry page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, base, link,
    },
    navigation::NavBar,
    category::{Category, CategoryId, get_all_categories},
    expense::{Expense, create_expense},
    timezone::get_local_offset,
};

/// Form data for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseFormData {
    pub amount: f64,
    pub date: Date,
    #[serde(default)]
    pub description: String,
    pub category_id: CategoryId,
}

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Paris".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense entry page with the date defaulting to today.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    Ok(new_expense_view(&categories, today).into_response())
}

/// Handle expense entry form submission.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseEndpointState>,
    Form(form_data): Form<ExpenseFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut builder = Expense::build(form_data.amount, form_data.category_id, form_data.date);
    let description = form_data.description.trim();
    if !description.is_empty() {
        builder = builder.description(description);
    }

    match create_expense(builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::NonPositiveAmount(_) | Error::InvalidCategory(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");

            error.into_alert_response()
        }
    }
}

fn new_expense_view(categories: &[Category], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            @if categories.is_empty() {
                p
                {
                    "Create a category before recording expenses. "
                    (link(endpoints::NEW_CATEGORY_VIEW, "Create one now"))
                }
            } @else {
                (new_expense_form_view(categories, today))
            }
        }
    };

    base("New Expense", &[], &content)
}

fn new_expense_form_view(categories: &[Category], today: Date) -> Markup {
    let create_expense_endpoint = endpoints::POST_EXPENSE;

    html! {
        form
            hx-post=(create_expense_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="amount"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount (€)"
                }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="category_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category"
                }

                select
                    id="category_id"
                    name="category_id"
                    required
                    class=(FORM_SELECT_STYLE)
                {
                    @for category in categories {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            div
            {
                label
                    for="date"
                    class=(FORM_LABEL_STYLE)
                {
                    "Date"
                }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(today)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="description"
                    class=(FORM_LABEL_STYLE)
                {
                    "Description (optional)"
                }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="e.g. Lunch with friends"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record Expense" }
        }
    }
}


#[cfg(test)]
mod create_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{Category, CategoryColor, CategoryName, create_category, create_category_table},
        endpoints,
        expense::{
            count_expenses,
            create::{CreateExpenseEndpointState, ExpenseFormData},
            create_expense_endpoint, create_expense_table, get_expense,
        },
        test_utils::assert_hx_redirect,
    };

    fn get_create_expense_state() -> (CreateExpenseEndpointState, Category) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        connection
            .pragma_update(None, "foreign_keys", true)
            .expect("Could not enable foreign keys");
        create_category_table(&connection).expect("Could not create category table");
        create_expense_table(&connection).expect("Could not create expense table");

        let category = create_category(
            CategoryName::new_unchecked("Food"),
            CategoryColor::new_unchecked("#ff7f0e"),
            &connection,
        )
        .expect("Could not create test category");

        (
            CreateExpenseEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            category,
        )
    }

    #[tokio::test]
    async fn can_create_expense() {
        let (state, category) = get_create_expense_state();
        let form = ExpenseFormData {
            amount: 12.5,
            date: date!(2024 - 01 - 01),
            description: "Groceries".to_string(),
            category_id: category.id,
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);

        let created = get_expense(1, &state.db_connection.lock().unwrap())
            .expect("Could not get created expense");
        assert_eq!(created.amount, 12.5);
        assert_eq!(created.date, date!(2024 - 01 - 01));
        assert_eq!(created.description.as_deref(), Some("Groceries"));
        assert_eq!(created.category_id, category.id);
    }

    #[tokio::test]
    async fn blank_description_is_stored_as_none() {
        let (state, category) = get_create_expense_state();
        let form = ExpenseFormData {
            amount: 5.0,
            date: date!(2024 - 01 - 01),
            description: "   ".to_string(),
            category_id: category.id,
        };

        create_expense_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        let created = get_expense(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(created.description, None);
    }

    #[tokio::test]
    async fn create_expense_fails_on_invalid_category() {
        let (state, category) = get_create_expense_state();
        let form = ExpenseFormData {
            amount: 12.5,
            date: date!(2024 - 01 - 01),
            description: String::new(),
            category_id: category.id + 42,
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            count_expenses(&state.db_connection.lock().unwrap()),
            Ok(0),
            "no expense should be recorded"
        );
    }

    #[tokio::test]
    async fn create_expense_fails_on_non_positive_amount() {
        let (state, category) = get_create_expense_state();
        let form = ExpenseFormData {
            amount: 0.0,
            date: date!(2024 - 01 - 01),
            description: String::new(),
            category_id: category.id,
        };

        let response = create_expense_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
