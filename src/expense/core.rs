//! Defines the core data model and database queries for expenses.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, category::CategoryId};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// A single recorded spending event.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount of money spent. Always greater than zero.
    pub amount: f64,
    /// A free-text note of what the money was spent on.
    pub description: Option<String>,
    /// The ID of the category the expense belongs to.
    pub category_id: CategoryId,
    /// The day the money was spent. Expenses have no time component.
    pub date: Date,
    /// When the expense was recorded.
    pub created_at: OffsetDateTime,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(amount: f64, category_id: CategoryId, date: Date) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            category_id,
            date,
            description: None,
        }
    }
}

/// A builder for creating [Expense] instances.
#[derive(Debug, PartialEq, Clone)]
pub struct ExpenseBuilder {
    /// The amount of money spent. Must be greater than zero.
    pub amount: f64,
    /// The ID of the category the expense belongs to. Must refer to an
    /// existing category.
    pub category_id: CategoryId,
    /// The day the money was spent.
    pub date: Date,
    /// An optional free-text description, e.g. "Lunch with friends".
    pub description: Option<String>,
}

impl ExpenseBuilder {
    /// Set the description for the expense.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

/// Create a new expense in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(builder: ExpenseBuilder, connection: &Connection) -> Result<Expense, Error> {
    if builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    let expense = connection
        .prepare(
            "INSERT INTO expense (amount, description, category_id, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, description, category_id, date, created_at",
        )?
        .query_row(
            (
                builder.amount,
                builder.description,
                builder.category_id,
                builder.date,
                OffsetDateTime::now_utc(),
            ),
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(builder.category_id)),
            error => error.into(),
        })?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, amount, description, category_id, date, created_at FROM expense WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Get the total number of expenses in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_expenses(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                description TEXT,
                category_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id)
                )",
        (),
    )?;

    // Composite index used by the date-range and per-category queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date_category ON expense(date, category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an Expense.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let description = row.get(2)?;
    let category_id = row.get(3)?;
    let date = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Expense {
        id,
        amount,
        description,
        category_id,
        date,
        created_at,
    })
}
