//! Aggregate queries over expenses for the dashboard and analysis pages.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    category::{CategoryColor, CategoryName},
};

/// Aggregated totals for one category.
///
/// The category fields are `None` for expenses whose category no longer
/// exists; such rows are grouped together rather than dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category_name: Option<CategoryName>,
    pub color: Option<CategoryColor>,
    pub total: f64,
    pub count: u32,
}

/// The total spent on a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: Date,
    pub total: f64,
}

/// The total spent on a single day within one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDailyTotal {
    pub category_name: CategoryName,
    pub date: Date,
    pub total: f64,
}

/// Get per-category totals and counts, sorted by total descending.
///
/// Date bounds are inclusive; absent bounds match all rows.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_stats_by_category(
    start_date: Option<Date>,
    end_date: Option<Date>,
    connection: &Connection,
) -> Result<Vec<CategoryStat>, Error> {
    let mut conditions = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(start_date) = start_date {
        conditions.push("e.date >= ?");
        params.push(start_date.to_string());
    }

    if let Some(end_date) = end_date {
        conditions.push("e.date <= ?");
        params.push(end_date.to_string());
    }

    let mut query = String::from(
        "SELECT c.name, c.color, SUM(e.amount) AS total, COUNT(e.id) \
        FROM expense e \
        LEFT JOIN category c ON e.category_id = c.id",
    );

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    query.push_str(" GROUP BY c.id, c.name, c.color ORDER BY total DESC");

    connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(params), |row| {
            let category_name = row
                .get::<usize, Option<String>>(0)?
                .map(|name| CategoryName::new_unchecked(&name));
            let color = row
                .get::<usize, Option<String>>(1)?
                .map(|color| CategoryColor::new_unchecked(&color));

            Ok(CategoryStat {
                category_name,
                color,
                total: row.get(2)?,
                count: row.get(3)?,
            })
        })?
        .map(|stat_result| stat_result.map_err(Error::SqlError))
        .collect()
}

/// Get the sum of all expense amounts in the date range.
///
/// Returns zero when no expenses match.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_total_expenses(
    start_date: Option<Date>,
    end_date: Option<Date>,
    connection: &Connection,
) -> Result<f64, Error> {
    let mut conditions = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(start_date) = start_date {
        conditions.push("date >= ?");
        params.push(start_date.to_string());
    }

    if let Some(end_date) = end_date {
        conditions.push("date <= ?");
        params.push(end_date.to_string());
    }

    let mut query = String::from("SELECT COALESCE(SUM(amount), 0) FROM expense");

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    connection
        .prepare(&query)?
        .query_row(rusqlite::params_from_iter(params), |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get per-day totals for the inclusive date range, ascending by date.
///
/// Days without expenses are absent from the result.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_daily_expenses(
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<DailyTotal>, Error> {
    connection
        .prepare(
            "SELECT date, SUM(amount) FROM expense \
            WHERE date BETWEEN ?1 AND ?2 \
            GROUP BY date \
            ORDER BY date ASC",
        )?
        .query_map(
            [start_date.to_string(), end_date.to_string()],
            |row| {
                Ok(DailyTotal {
                    date: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )?
        .map(|total_result| total_result.map_err(Error::SqlError))
        .collect()
}

/// Get per-day totals for each of the named categories, ascending by date.
///
/// Category names are matched ignoring case. Days on which a category has
/// no expenses are absent from the result.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_daily_expenses_by_category(
    start_date: Date,
    end_date: Date,
    category_names: &[String],
    connection: &Connection,
) -> Result<Vec<CategoryDailyTotal>, Error> {
    if category_names.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; category_names.len()].join(", ");
    let query = format!(
        "SELECT c.name, e.date, SUM(e.amount) \
        FROM expense e \
        INNER JOIN category c ON e.category_id = c.id \
        WHERE e.date BETWEEN ? AND ? AND c.name IN ({placeholders}) \
        GROUP BY c.name, e.date \
        ORDER BY e.date ASC, c.name ASC",
    );

    let mut params = vec![start_date.to_string(), end_date.to_string()];
    params.extend(category_names.iter().cloned());

    connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(params), |row| {
            let raw_name: String = row.get(0)?;

            Ok(CategoryDailyTotal {
                category_name: CategoryName::new_unchecked(&raw_name),
                date: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .map(|total_result| total_result.map_err(Error::SqlError))
        .collect()
}
