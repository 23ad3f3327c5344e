//! Database query helpers for the expense history page and CSV export.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    category::{CategoryColor, CategoryName},
    expense::ExpenseId,
};

/// Optional filters for listing expenses.
///
/// Absent filters match all rows. Date bounds are inclusive, and the
/// category name is matched ignoring case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub category: Option<String>,
}

/// An expense joined with its category for display.
///
/// The category fields are `None` when the expense references a category
/// that no longer exists. Reads tolerate such rows instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow {
    pub id: ExpenseId,
    pub amount: f64,
    pub description: Option<String>,
    pub date: Date,
    pub category_name: Option<CategoryName>,
    pub category_color: Option<CategoryColor>,
}

/// Get expenses matching `filter`, newest first.
///
/// Rows are sorted by date descending, then by ID descending so the most
/// recently recorded expense of a day comes first and the order is stable.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_expenses(filter: &ExpenseFilter, connection: &Connection) -> Result<Vec<ExpenseRow>, Error> {
    let mut conditions = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(start_date) = filter.start_date {
        conditions.push("e.date >= ?");
        params.push(start_date.to_string());
    }

    if let Some(end_date) = filter.end_date {
        conditions.push("e.date <= ?");
        params.push(end_date.to_string());
    }

    if let Some(category) = &filter.category {
        // The name column is declared COLLATE NOCASE, so this comparison
        // ignores case.
        conditions.push("c.name = ?");
        params.push(category.clone());
    }

    let mut query = String::from(
        "SELECT e.id, e.amount, e.description, e.date, c.name, c.color \
        FROM expense e \
        LEFT JOIN category c ON e.category_id = c.id",
    );

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    query.push_str(" ORDER BY e.date DESC, e.id DESC");

    connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(params), |row| {
            let category_name = row
                .get::<usize, Option<String>>(4)?
                .map(|name| CategoryName::new_unchecked(&name));
            let category_color = row
                .get::<usize, Option<String>>(5)?
                .map(|color| CategoryColor::new_unchecked(&color));

            Ok(ExpenseRow {
                id: row.get(0)?,
                amount: row.get(1)?,
                description: row.get(2)?,
                date: row.get(3)?,
                category_name,
                category_color,
            })
        })?
        .map(|expense_result| expense_result.map_err(Error::SqlError))
        .collect()
}
