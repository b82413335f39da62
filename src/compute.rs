use crate::{
    data::{checked_sum, Category, DailySeries, DateInterval, Error, Summary, Transaction},
    store::Store,
};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeSet;

/// Everything the dashboard needs: both daily series over the same dates, and the
/// category totals for the breakdown panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Dashboard {
    pub income: DailySeries,
    pub expense: DailySeries,
    pub summary: Summary,
}

/// Validates the user input, then records it. `today` is what a missing date means.
pub(crate) fn add_transaction(
    store: &Store,
    date: Option<&str>,
    amount: &str,
    category: &str,
    description: &str,
    today: NaiveDate,
) -> Result<Transaction, Error> {
    let tx = Transaction::from_input(date, amount, category, description, today)?;
    store.initialize()?;
    store.append(&tx)?;
    Ok(tx)
}

/// Loads the whole store and keeps what falls within `start..=end` (both `dd-mm-yyyy`).
/// Finding nothing is a normal outcome, not an error. The CLI validates the dates on
/// its own before touching the store, then goes through `query_interval`.
#[allow(dead_code)]
pub(crate) fn query_range(
    store: &Store,
    start: &str,
    end: &str,
) -> Result<(Vec<Transaction>, Summary), Error> {
    query_interval(store, &DateInterval::parse(start, end)?)
}

/// Same as `query_range`, for an interval that has already been parsed.
pub(crate) fn query_interval(
    store: &Store,
    interval: &DateInterval,
) -> Result<(Vec<Transaction>, Summary), Error> {
    let records = store.read_all()?;
    let filtered = filter_by_interval(&records, interval);
    info!(
        "{} of {} transactions between {} and {}",
        filtered.len(),
        records.len(),
        interval.start,
        interval.end
    );
    let summary = summarize(&filtered)?;
    Ok((filtered, summary))
}

pub(crate) fn build_dashboard_data(filtered: &[Transaction]) -> Result<Dashboard, Error> {
    let (income, expense) = build_daily_series(filtered)?;
    Ok(Dashboard {
        income,
        expense,
        summary: summarize(filtered)?,
    })
}

/// Keeps the records dated within `interval`, in their original order.
pub(crate) fn filter_by_interval(
    records: &[Transaction],
    interval: &DateInterval,
) -> Vec<Transaction> {
    records
        .iter()
        .filter(|tx| interval.contains(tx.date))
        .cloned()
        .collect()
}

/// Fails with `AmountOverflow` rather than wrapping or panicking when the totals
/// don't fit in a `Decimal`.
pub(crate) fn summarize(records: &[Transaction]) -> Result<Summary, Error> {
    let mut summary = Summary::default();
    for tx in records {
        summary.record(tx)?;
    }
    Ok(summary)
}

/// Sums amounts per day and category. Both series cover exactly the days on which
/// anything happened, whatever the category: a day with only expenses still gets a
/// zero income entry, and days without any transaction are left out.
pub(crate) fn build_daily_series(
    records: &[Transaction],
) -> Result<(DailySeries, DailySeries), Error> {
    let domain: BTreeSet<NaiveDate> = records.iter().map(|tx| tx.date).collect();
    let mut income = DailySeries(domain.iter().map(|&d| (d, Default::default())).collect());
    let mut expense = income.clone();
    for tx in records {
        let series = match tx.category {
            Category::Income => &mut income,
            Category::Expense => &mut expense,
        };
        let total = series.0.entry(tx.date).or_default();
        *total = checked_sum(*total, tx.amount)?;
    }
    Ok((income, expense))
}
