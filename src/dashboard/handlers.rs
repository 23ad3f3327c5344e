//! Dashboard HTTP handler and view rendering.

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
    dashboard::{
        DashboardChart,
        aggregation::date_labels,
        cards::{category_progress_view, summary_cards_view},
        charts::{charts_script, daily_expenses_chart, echarts_script_link},
    },
    expense::{
        CategoryStat, ExpenseFilter, get_expenses, get_stats_by_category, get_total_expenses,
        get_daily_expenses,
    },
    html::{FORM_SELECT_STYLE, base},
    navigation::NavBar,
    period::{Period, PeriodDates},
    timezone::get_local_offset,
};

/// Number of days shown in the daily evolution chart.
const DAILY_CHART_DAYS: i64 = 7;

/// Query parameters for the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<Period>,
}

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Paris".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    period: Period,
    current_total: f64,
    previous_total: f64,
    current_count: usize,
    previous_count: usize,
    stats: Vec<CategoryStat>,
    daily_chart: DashboardChart,
}

/// Display a page with a summary of the user's spending for a period.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
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

    let period = query.period.unwrap_or(Period::default_preset());
    let data = build_dashboard_data(period, today, &connection)?;

    Ok(dashboard_view(&data).into_response())
}

/// Fetches all data needed for the dashboard display.
fn build_dashboard_data(
    period: Period,
    today: Date,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let PeriodDates { current, previous } = period.date_ranges(today);

    let current_total = get_total_expenses(Some(current.start), Some(current.end), connection)
        .inspect_err(|error| tracing::error!("Could not get current total: {error}"))?;
    let previous_total = get_total_expenses(Some(previous.start), Some(previous.end), connection)
        .inspect_err(|error| tracing::error!("Could not get previous total: {error}"))?;

    let current_count = get_expenses(
        &ExpenseFilter {
            start_date: Some(current.start),
            end_date: Some(current.end),
            category: None,
        },
        connection,
    )
    .inspect_err(|error| tracing::error!("Could not get current expenses: {error}"))?
    .len();
    let previous_count = get_expenses(
        &ExpenseFilter {
            start_date: Some(previous.start),
            end_date: Some(previous.end),
            category: None,
        },
        connection,
    )
    .inspect_err(|error| tracing::error!("Could not get previous expenses: {error}"))?
    .len();

    let stats = get_stats_by_category(Some(current.start), Some(current.end), connection)
        .inspect_err(|error| tracing::error!("Could not get category stats: {error}"))?;

    let chart_days = date_labels(today - Duration::days(DAILY_CHART_DAYS - 1), today);
    let daily_totals = get_daily_expenses(
        today - Duration::days(DAILY_CHART_DAYS - 1),
        today,
        connection,
    )
    .inspect_err(|error| tracing::error!("Could not get daily totals: {error}"))?;

    let daily_chart = DashboardChart {
        id: "daily-expenses-chart",
        options: daily_expenses_chart(&chart_days, &daily_totals).to_string(),
    };

    Ok(DashboardData {
        period,
        current_total,
        previous_total,
        current_count,
        previous_count,
        stats,
        daily_chart,
    })
}

/// Renders the dashboard page.
fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let charts = [DashboardChart {
        id: data.daily_chart.id,
        options: data.daily_chart.options.clone(),
    }];

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            section class="w-full mx-auto mb-4 flex justify-between flex-wrap items-end"
            {
                h2 class="text-xl font-semibold" { "Summary: " (data.period.label()) }

                (period_selector_view(data.period))
            }

            (summary_cards_view(
                data.current_total,
                data.previous_total,
                data.current_count,
                data.previous_count,
                data.period.previous_label(),
            ))

            section class="w-full mx-auto mb-4"
            {
                h3 class="text-xl font-semibold mb-4" { "Breakdown by Category" }

                (category_progress_view(&data.stats))
            }

            section class="w-full mx-auto mb-4"
            {
                div
                    id=(data.daily_chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
        }
    );

    let scripts = [echarts_script_link(), charts_script(&charts)];

    base("Dashboard", &scripts, &content)
}

fn period_selector_view(selected: Period) -> Markup {
    let periods = [
        Period::Day,
        Period::Week,
        Period::Month,
        Period::Year,
        Period::All,
    ];

    html!(
        form method="get" action=(endpoints::DASHBOARD_VIEW)
        {
            select
                name="period"
                onchange="this.form.submit()"
                class=(FORM_SELECT_STYLE)
            {
                @for period in periods {
                    option
                        value=(period.as_query_value())
                        selected[period == selected]
                    {
                        (period.label())
                    }
                }
            }
        }
    )
}
