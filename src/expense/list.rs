//! Expense history page with date and category filters.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    category::{Category, get_all_categories},
    expense::{ExpenseFilter, ExpenseRow, get_expenses},
    timezone::get_local_offset,
};

/// How far back the history page looks when no start date is given.
const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Query parameters for the expense history page.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub category: Option<String>,
}

/// The state needed for the expense history page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Paris".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the filtered expense history, newest first.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let filter = ExpenseFilter {
        start_date: Some(
            query
                .start_date
                .unwrap_or(today - Duration::days(DEFAULT_HISTORY_DAYS)),
        ),
        end_date: Some(query.end_date.unwrap_or(today)),
        category: query.category.filter(|category| !category.is_empty()),
    };

    let expenses = get_expenses(&filter, &connection)
        .inspect_err(|error| tracing::error!("Could not get expenses: {error}"))?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(expenses_view(&filter, &categories, &expenses).into_response())
}

/// Build the CSV download URL carrying the current filters.
fn export_url(filter: &ExpenseFilter) -> String {
    let mut query_pairs = Vec::new();

    if let Some(start_date) = filter.start_date {
        query_pairs.push(format!("start_date={start_date}"));
    }

    if let Some(end_date) = filter.end_date {
        query_pairs.push(format!("end_date={end_date}"));
    }

    if let Some(category) = &filter.category {
        query_pairs.push(format!("category={category}"));
    }

    if query_pairs.is_empty() {
        endpoints::EXPORT_EXPENSES.to_owned()
    } else {
        format!("{}?{}", endpoints::EXPORT_EXPENSES, query_pairs.join("&"))
    }
}

fn expenses_view(
    filter: &ExpenseFilter,
    categories: &[Category],
    expenses: &[ExpenseRow],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expense History" }

                    a href=(export_url(filter)) class=(LINK_STYLE)
                    {
                        "Export as CSV"
                    }
                }

                (filter_form_view(filter, categories))

                (expenses_table_view(expenses))
            }
        }
    );

    base("History", &[], &content)
}

fn filter_form_view(filter: &ExpenseFilter, categories: &[Category]) -> Markup {
    let selected_category = filter.category.as_deref().unwrap_or("");

    html!(
        form
            method="get"
            action=(endpoints::EXPENSES_VIEW)
            class="flex flex-wrap items-end gap-4 bg-gray-50 dark:bg-gray-800 p-4 rounded-lg"
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }

                input
                    id="start_date"
                    type="date"
                    name="start_date"
                    value=[filter.start_date.map(|date| date.to_string())]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }

                input
                    id="end_date"
                    type="date"
                    name="end_date"
                    value=[filter.end_date.map(|date| date.to_string())]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    id="category"
                    name="category"
                    class=(FORM_SELECT_STYLE)
                {
                    option value="" selected[selected_category.is_empty()] { "All" }

                    @for category in categories {
                        option
                            value=(category.name)
                            selected[category.name.as_ref().eq_ignore_ascii_case(selected_category)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply Filters" }
        }
    )
}

fn expenses_table_view(expenses: &[ExpenseRow]) -> Markup {
    html!(
        section class="dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right
                text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        (expense_row_view(expense))
                    }

                    @if expenses.is_empty() {
                        tr
                        {
                            td
                                colspan="4"
                                class="px-6 py-4 text-center
                                    text-gray-500 dark:text-gray-400"
                            {
                                "No expenses found for the selected filters."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn expense_row_view(expense: &ExpenseRow) -> Markup {
    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (expense.date) }

            td class=(TABLE_CELL_STYLE)
            {
                @match (&expense.category_name, &expense.category_color) {
                    (Some(name), Some(color)) => {
                        span
                            class="inline-flex items-center gap-2"
                        {
                            span
                                class="inline-block h-3 w-3 rounded-full"
                                style=(format!("background-color: {color};"))
                            {}
                            (name)
                        }
                    }
                    _ => {
                        span class="italic text-gray-400" { "Uncategorized" }
                    }
                }
            }

            td class=(TABLE_CELL_STYLE) { (format_currency(expense.amount)) }

            td class=(TABLE_CELL_STYLE)
            {
                (expense.description.as_deref().unwrap_or(""))
            }
        }
    )
}
