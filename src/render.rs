use crate::{
    compute::Dashboard,
    data::{format_date, Category, DateInterval, Summary, Transaction, DISPLAY_DIGITS},
};
use comfy_table::{Cell, CellAlignment, Color, Table, TableComponent};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

/// Width of the longest bar in the dashboard panels, in characters.
const BAR_WIDTH: usize = 30;
const INCOME_BAR: char = '█';
const EXPENSE_BAR: char = '▒';

/// Format $ amount
pub(crate) fn format_amount(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(DISPLAY_DIGITS as u32, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = DISPLAY_DIGITS)
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Income => Color::Green,
        Category::Expense => Color::Red,
    }
}

fn bar(value: Decimal, max: Decimal, glyph: char) -> String {
    if max <= Decimal::ZERO {
        return String::new();
    }
    let width = (value / max * Decimal::from(BAR_WIDTH))
        .round()
        .to_usize()
        .unwrap_or_default();
    std::iter::repeat(glyph).take(width).collect()
}

/// Percentage of `part` in `income + expense`, `None` when both are zero. Everything
/// is scaled down by the larger total first, so the sum can't overflow.
fn share(part: Decimal, summary: &Summary) -> Option<Decimal> {
    let largest = summary.total_income.max(summary.total_expense);
    if largest.is_zero() {
        return None;
    }
    let whole = summary.total_income / largest + summary.total_expense / largest;
    Some((part / largest / whole * Decimal::ONE_HUNDRED).round_dp(1))
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);
    table
}

/// The list of transactions found in `interval`, or a notice when there is none.
pub(crate) fn render_transactions(interval: &DateInterval, transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found in the given date range.\n".to_string();
    }
    let mut table = new_table();
    table.set_header(vec!["Date", "Amount ($)", "Category", "Description"]);
    for t in transactions {
        table.add_row(vec![
            Cell::new(format_date(t.date)).set_alignment(CellAlignment::Center),
            Cell::new(format_amount(t.amount)).set_alignment(CellAlignment::Right),
            Cell::new(t.category.as_str()).fg(category_color(t.category)),
            Cell::new(&t.description),
        ]);
    }
    format!(
        "Transactions from {} to {}\nTransactions Summary\n{table}\n",
        format_date(interval.start),
        format_date(interval.end)
    )
}

pub(crate) fn render_summary(summary: &Summary) -> String {
    format!(
        "Summary:\nTotal Income: ${}\nTotal Expense: ${}\nNet Savings: ${}\n",
        format_amount(summary.total_income),
        format_amount(summary.total_expense),
        format_amount(summary.net_savings())
    )
}

/// Text rendition of the dashboard: daily amounts over time, the income/expense
/// split, and the total per category. Plain characters only, so the result can be
/// saved to a file as is.
pub(crate) fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::from("Financial Dashboard\n\n");
    if dashboard.income.is_empty() {
        out.push_str("Nothing to plot for the selected range.\n");
        return out;
    }

    let max = dashboard.income.max().max(dashboard.expense.max());
    let mut over_time = new_table();
    over_time.set_header(vec!["Date", "Income ($)", "Expenses ($)", ""]);
    for date in dashboard.income.dates() {
        let income = dashboard.income.get(date);
        let expense = dashboard.expense.get(date);
        over_time.add_row(vec![
            Cell::new(format_date(date)),
            Cell::new(format_amount(income)).set_alignment(CellAlignment::Right),
            Cell::new(format_amount(expense)).set_alignment(CellAlignment::Right),
            Cell::new(format!(
                "{}\n{}",
                bar(income, max, INCOME_BAR),
                bar(expense, max, EXPENSE_BAR)
            )),
        ]);
    }

    let summary = &dashboard.summary;
    let mut split = new_table();
    split.set_header(vec!["Category", "Share"]);
    let mut by_category = new_table();
    by_category.set_header(vec!["Category", "Amount ($)", ""]);
    let largest = summary.total_income.max(summary.total_expense);
    for (category, glyph) in [
        (Category::Income, INCOME_BAR),
        (Category::Expense, EXPENSE_BAR),
    ] {
        let total = summary.total(category);
        let percent = match share(total, summary) {
            Some(percent) => format!("{percent:.1}%"),
            None => "n/a".to_string(),
        };
        split.add_row(vec![
            Cell::new(category.as_str()),
            Cell::new(percent).set_alignment(CellAlignment::Right),
        ]);
        by_category.add_row(vec![
            Cell::new(category.as_str()),
            Cell::new(format!("${}", format_amount(total))).set_alignment(CellAlignment::Right),
            Cell::new(bar(total, largest, glyph)),
        ]);
    }

    out.push_str(&format!(
        "Income and Expenses Over Time ({INCOME_BAR} income, {EXPENSE_BAR} expenses)\n{over_time}\n\n\
         Income vs. Expenses\n{split}\n\n\
         Total Amount by Category\n{by_category}\n"
    ));
    out
}
