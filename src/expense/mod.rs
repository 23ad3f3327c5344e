//! Expense recording, listing and aggregation.

mod core;
mod create;
mod export;
mod list;
mod query;
mod stats;

pub use core::{
    Expense, ExpenseBuilder, ExpenseId, count_expenses, create_expense, create_expense_table,
    get_expense,
};
pub use create::{create_expense_endpoint, get_new_expense_page};
pub use export::export_expenses;
pub use list::get_expenses_page;
pub use query::{ExpenseFilter, ExpenseRow, get_expenses};
pub use stats::{
    CategoryDailyTotal, CategoryStat, DailyTotal, get_daily_expenses,
    get_daily_expenses_by_category, get_stats_by_category, get_total_expenses,
};
