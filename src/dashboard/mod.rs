//! Dashboard page with summary metrics, category breakdown and charts.

mod aggregation;
mod cards;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;

pub(crate) use aggregation::{date_labels, pivot_daily_by_category};
pub(crate) use charts::{
    DashboardChart, charts_script, currency_formatter, currency_tooltip, echarts_script_link,
};
