use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

/// Date format used in the store and on the command line.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// The fixed column set of the store, in file order.
pub const COLUMNS: [&str; 4] = ["date", "amount", "category", "description"];

/// Fractional digits shown when an amount is displayed. Sums are never rounded.
pub const DISPLAY_DIGITS: usize = 2;

/// The two kinds of entries we track. Stored as `Income` / `Expense` verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum Category {
    Income,
    Expense,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Expense => "Expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parsing for user input: case doesn't matter and `I` / `E` are accepted
/// as shorthands. The store itself only ever holds the canonical spelling.
impl FromStr for Category {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "i" | "income" => Ok(Category::Income),
            "e" | "expense" => Ok(Category::Expense),
            _ => Err(InputError::UnknownCategory(s.to_string())),
        }
    }
}

/// One entry of the ledger. Records have no id: their identity is their position
/// in the store, and they are never updated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: Category,
    pub description: String,
}

impl Transaction {
    /// Validates raw user input. A missing or blank `date` means `today`.
    pub fn from_input(
        date: Option<&str>,
        amount: &str,
        category: &str,
        description: &str,
        today: NaiveDate,
    ) -> Result<Self, InputError> {
        let date = match date {
            Some(date) if !date.trim().is_empty() => parse_date(date)?,
            _ => today,
        };
        Ok(Self {
            date,
            amount: parse_amount(amount)?,
            category: category.parse()?,
            description: description.to_string(),
        })
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| InputError::InvalidDate(s.to_string()))
}

/// Amounts are plain non-negative decimals; the category carries the sign.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal, InputError> {
    let amount =
        Decimal::from_str(s.trim()).map_err(|_| InputError::InvalidAmount(s.to_string()))?;
    if amount < Decimal::ZERO {
        return Err(InputError::NegativeAmount(amount));
    }
    Ok(amount)
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Closed date range, both ends included. `start <= end` is not checked: an inverted
/// interval is legal and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn parse(start: &str, end: &str) -> Result<Self, InputError> {
        Ok(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Totals over a set of transactions. Like an account's total balance, net savings
/// is a "virtual" field: it's always `total_income - total_expense`, so it is computed
/// on demand instead of being kept in sync.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
}

impl Summary {
    pub fn record(&mut self, tx: &Transaction) -> Result<(), Error> {
        let total = match tx.category {
            Category::Income => &mut self.total_income,
            Category::Expense => &mut self.total_expense,
        };
        *total = checked_sum(*total, tx.amount)?;
        Ok(())
    }

    pub fn net_savings(&self) -> Decimal {
        self.total_income - self.total_expense
    }

    pub fn total(&self, category: Category) -> Decimal {
        match category {
            Category::Income => self.total_income,
            Category::Expense => self.total_expense,
        }
    }
}

/// Adds two amounts, failing instead of panicking past `Decimal::MAX`.
pub(crate) fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal, Error> {
    a.checked_add(b).ok_or(Error::AmountOverflow)
}

/// Summed amount per calendar day for one category, ordered by date.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DailySeries(pub BTreeMap<NaiveDate, Decimal>);

impl DailySeries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Amount for `date`, zero when the day isn't part of the series.
    pub fn get(&self, date: NaiveDate) -> Decimal {
        self.0.get(&date).copied().unwrap_or_default()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }

    pub fn max(&self) -> Decimal {
        self.0.values().copied().max().unwrap_or_default()
    }
}

/// Problems with what the user typed. Always reported, never coerced into something valid.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid date {0:?}, expected dd-mm-yyyy")]
    InvalidDate(String),
    #[error("Invalid amount {0:?}, expected a number")]
    InvalidAmount(String),
    #[error("Amount must be non-negative (got {0})")]
    NegativeAmount(Decimal),
    #[error("Unknown category {0:?}, expected Income or Expense")]
    UnknownCategory(String),
}

/// Everything that can go wrong when recording or querying transactions. The store
/// errors don't know which file they're about; the caller adds that context.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Malformed record at line {line}: {reason}")]
    StoreFormat { line: u64, reason: String },
    #[error("Can't read the transaction store")]
    StoreRead(#[source] std::io::Error),
    #[error("Can't write the transaction store")]
    StoreWrite(#[source] std::io::Error),
    #[error("Amounts add up to more than can be represented")]
    AmountOverflow,
}

#[cfg(test)]
mod tests {
    use super::{Category, DateInterval, Error, InputError, Summary, Transaction};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_category_input() {
        assert_eq!("Income".parse::<Category>(), Ok(Category::Income));
        assert_eq!(" e ".parse::<Category>(), Ok(Category::Expense));
        assert_eq!("I".parse::<Category>(), Ok(Category::Income));
        assert_eq!("EXPENSE".parse::<Category>(), Ok(Category::Expense));
        assert_eq!(
            "savings".parse::<Category>(),
            Err(InputError::UnknownCategory("savings".to_string()))
        );
    }

    #[test]
    fn test_from_input() {
        let tx = Transaction::from_input(
            Some("15-03-2024"),
            "12.345",
            "expense",
            "groceries, weekly",
            day(1, 1, 2000),
        )
        .unwrap();
        assert_eq!(
            tx,
            Transaction {
                date: day(15, 3, 2024),
                amount: dec!(12.345),
                category: Category::Expense,
                description: "groceries, weekly".to_string(),
            }
        );
    }

    #[test]
    fn test_from_input_defaults_to_today() {
        let today = day(18, 10, 2026);
        let tx = Transaction::from_input(None, "10", "i", "salary", today).unwrap();
        assert_eq!(tx.date, today);
        let tx = Transaction::from_input(Some("  "), "10", "i", "salary", today).unwrap();
        assert_eq!(tx.date, today);
    }

    #[test]
    fn test_invalid_input() {
        let today = day(18, 10, 2026);
        assert_eq!(
            Transaction::from_input(Some("2024-03-15"), "1", "i", "", today),
            Err(InputError::InvalidDate("2024-03-15".to_string()))
        );
        assert_eq!(
            Transaction::from_input(Some("31-02-2024"), "1", "i", "", today),
            Err(InputError::InvalidDate("31-02-2024".to_string()))
        );
        assert_eq!(
            Transaction::from_input(None, "ten", "i", "", today),
            Err(InputError::InvalidAmount("ten".to_string()))
        );
        assert_eq!(
            Transaction::from_input(None, "-5", "i", "", today),
            Err(InputError::NegativeAmount(dec!(-5)))
        );
        assert_eq!(
            Transaction::from_input(None, "5", "gift", "", today),
            Err(InputError::UnknownCategory("gift".to_string()))
        );
    }

    #[test]
    fn test_zero_amount_is_allowed() {
        let tx = Transaction::from_input(None, "0", "e", "", day(1, 1, 2024)).unwrap();
        assert_eq!(tx.amount, dec!(0));
    }

    #[test]
    fn test_interval_bounds_are_inclusive() {
        let interval = DateInterval::parse("01-01-2024", "31-01-2024").unwrap();
        assert!(interval.contains(day(1, 1, 2024)));
        assert!(interval.contains(day(31, 1, 2024)));
        assert!(!interval.contains(day(31, 12, 2023)));
        assert!(!interval.contains(day(1, 2, 2024)));

        let inverted = DateInterval::parse("31-01-2024", "01-01-2024").unwrap();
        assert!(!inverted.contains(day(15, 1, 2024)));
    }

    #[test]
    fn test_net_savings() {
        let mut summary = Summary::default();
        summary
            .record(&Transaction {
                date: day(1, 1, 2024),
                amount: dec!(100.10),
                category: Category::Income,
                description: String::new(),
            })
            .unwrap();
        summary
            .record(&Transaction {
                date: day(2, 1, 2024),
                amount: dec!(150.005),
                category: Category::Expense,
                description: String::new(),
            })
            .unwrap();
        assert_eq!(summary.total_income, dec!(100.10));
        assert_eq!(summary.total_expense, dec!(150.005));
        assert_eq!(summary.net_savings(), dec!(-49.905));
    }

    #[test]
    fn test_record_overflow() {
        let huge = Transaction {
            date: day(1, 1, 2024),
            amount: Decimal::MAX,
            category: Category::Income,
            description: String::new(),
        };
        let mut summary = Summary::default();
        summary.record(&huge).unwrap();
        assert!(matches!(summary.record(&huge), Err(Error::AmountOverflow)));
        assert_eq!(summary.total_income, Decimal::MAX);
        // the other category is summed on its own
        summary
            .record(&Transaction {
                category: Category::Expense,
                ..huge
            })
            .unwrap();
    }
}
