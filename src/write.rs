use crate::data::{format_date, Category, Error, Transaction, COLUMNS};
use rust_decimal::Decimal;
use serde::Serialize;

/// Mirror of `read::StoredRow` for the way out: the date is formatted by hand since
/// `NaiveDate` would otherwise serialize as ISO 8601.
#[derive(Serialize)]
struct StoredRow<'a> {
    date: String,
    amount: Decimal,
    category: Category,
    description: &'a str,
}

impl<'a> From<&'a Transaction> for StoredRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            date: format_date(tx.date),
            amount: tx.amount,
            category: tx.category,
            description: &tx.description,
        }
    }
}

/// Writes the fixed header line of a fresh store.
pub(crate) fn write_header<W: std::io::Write>(writer: W) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS).map_err(write_error)?;
    wtr.flush().map_err(Error::StoreWrite)?;
    Ok(())
}

/// Basic CSV exporter for a single `Transaction`, without header: meant to be
/// pointed at a file opened in append mode.
pub(crate) fn write_transaction<W: std::io::Write>(
    writer: W,
    tx: &Transaction,
) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.serialize(StoredRow::from(tx)).map_err(write_error)?;
    wtr.flush().map_err(Error::StoreWrite)?;
    Ok(())
}

fn write_error(err: csv::Error) -> Error {
    Error::StoreWrite(err.into())
}
