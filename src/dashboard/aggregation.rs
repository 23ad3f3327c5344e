//! Pure helpers that reshape aggregate query rows for chart display.

use time::{Date, Duration};

use crate::expense::{CategoryDailyTotal, DailyTotal};

/// Every day in the inclusive range, in order.
pub(crate) fn date_labels(start_date: Date, end_date: Date) -> Vec<Date> {
    let mut labels = Vec::new();
    let mut current = start_date;

    while current <= end_date {
        labels.push(current);
        current += Duration::days(1);
    }

    labels
}

/// Align per-day totals to `days`, filling days without expenses with zero.
pub(crate) fn daily_values(days: &[Date], totals: &[DailyTotal]) -> Vec<f64> {
    days.iter()
        .map(|day| {
            totals
                .iter()
                .find(|total| total.date == *day)
                .map(|total| total.total)
                .unwrap_or(0.0)
        })
        .collect()
}

/// Group per-day, per-category totals into one series per category.
///
/// Each series has one entry per day in `days`, with `None` for days on
/// which the category has no expenses so charts show gaps instead of zeros.
/// Categories appear in the order of their first occurrence in `totals`,
/// which follows the query's ordering.
pub(crate) fn pivot_daily_by_category(
    days: &[Date],
    totals: &[CategoryDailyTotal],
) -> Vec<(String, Vec<Option<f64>>)> {
    let mut category_order: Vec<&str> = Vec::new();

    for total in totals {
        let name = total.category_name.as_ref();
        if !category_order.contains(&name) {
            category_order.push(name);
        }
    }

    category_order
        .into_iter()
        .map(|category| {
            let values = days
                .iter()
                .map(|day| {
                    totals
                        .iter()
                        .find(|total| {
                            total.category_name.as_ref() == category && total.date == *day
                        })
                        .map(|total| total.total)
                })
                .collect();

            (category.to_owned(), values)
        })
        .collect()
}
