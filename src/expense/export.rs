//! CSV download of the filtered expense list.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    expense::{ExpenseFilter, ExpenseRow, get_expenses, list::ExpensesQuery},
    timezone::get_local_offset,
};

/// How far back the export looks when no start date is given, matching the
/// history page.
const DEFAULT_EXPORT_DAYS: i64 = 30;

/// The state needed for exporting expenses.
#[derive(Debug, Clone)]
pub struct ExportExpensesState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Paris".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// One line of the CSV download.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    date: String,
    category: &'a str,
    amount: String,
    description: &'a str,
}

/// Download the expenses matching the filters as a CSV file.
///
/// The file has the columns `date, category, amount, description` and uses
/// the same filter defaults as the history page, so the download always
/// matches the table the user is looking at.
pub async fn export_expenses(
    State(state): State<ExportExpensesState>,
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
                .unwrap_or(today - Duration::days(DEFAULT_EXPORT_DAYS)),
        ),
        end_date: Some(query.end_date.unwrap_or(today)),
        category: query.category.filter(|category| !category.is_empty()),
    };

    let expenses = get_expenses(&filter, &connection)
        .inspect_err(|error| tracing::error!("Could not get expenses for export: {error}"))?;

    let csv_data = write_csv(&expenses)?;

    let filename = format!(
        "expenses_{}_{}.csv",
        filter.start_date.expect("start date was set above"),
        filter.end_date.expect("end date was set above"),
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv_data,
    )
        .into_response())
}

fn write_csv(expenses: &[ExpenseRow]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for expense in expenses {
        writer
            .serialize(ExportRow {
                date: expense.date.to_string(),
                category: expense
                    .category_name
                    .as_ref()
                    .map(|name| name.as_ref())
                    .unwrap_or(""),
                amount: format!("{:.2}", expense.amount),
                description: expense.description.as_deref().unwrap_or(""),
            })
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}
