use crate::data::{parse_amount, parse_date, Category, Error, Transaction, COLUMNS};
use serde::Deserialize;

/// Trait for doing something with a `Transaction` read from the store. The store
/// simply collects them into a `Vec`; a sink may also refuse a transaction, which
/// aborts the read.
pub(crate) trait TransactionSink {
    fn accept(&mut self, tx: Transaction) -> Result<(), Error>;
}

impl TransactionSink for Vec<Transaction> {
    fn accept(&mut self, tx: Transaction) -> Result<(), Error> {
        self.push(tx);
        Ok(())
    }
}

/// A row as it sits in the file. Date and amount are kept as text so a bad value can
/// be reported with our own message instead of serde's.
#[derive(Deserialize)]
struct StoredRow {
    date: String,
    amount: String,
    category: Category,
    description: String,
}

/// Strict CSV importer for `Transaction`s: the first malformed row aborts the whole
/// read, nothing is skipped. A completely empty input is treated as an empty store.
pub(crate) fn read_transactions<R: std::io::Read, S: TransactionSink>(
    reader: R,
    sink: &mut S,
) -> Result<(), Error> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    if headers.is_empty() {
        return Ok(());
    }
    if !headers.iter().eq(COLUMNS) {
        return Err(Error::StoreFormat {
            line: 1,
            reason: format!(
                "unexpected header {:?}, expected {}",
                headers.iter().collect::<Vec<_>>(),
                COLUMNS.join(",")
            ),
        });
    }
    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map_or(0, |pos| pos.line());
        let row: StoredRow = record.deserialize(Some(&headers)).map_err(csv_error)?;
        let tx = Transaction {
            date: parse_date(&row.date).map_err(|e| format_error(line, e))?,
            amount: parse_amount(&row.amount).map_err(|e| format_error(line, e))?,
            category: row.category,
            description: row.description,
        };
        sink.accept(tx)?;
    }
    Ok(())
}

fn format_error(line: u64, err: impl std::fmt::Display) -> Error {
    Error::StoreFormat {
        line,
        reason: err.to_string(),
    }
}

fn csv_error(err: csv::Error) -> Error {
    if err.is_io_error() {
        return Error::StoreRead(err.into());
    }
    let line = err.position().map_or(0, |pos| pos.line());
    format_error(line, err)
}
