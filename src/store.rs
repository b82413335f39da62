use crate::{
    data::{Error, Transaction},
    read::read_transactions,
    write::{write_header, write_transaction},
};
use log::{debug, info, warn};
use std::{
    fs::{self, File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// The flat CSV file holding every transaction, in the order they were added.
/// Single process, single writer: nothing here locks the file.
#[derive(Debug, Clone)]
pub(crate) struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with its header unless it already exists. Returns whether
    /// a new store was created.
    pub fn initialize(&self) -> Result<bool, Error> {
        self.create_with(write_header)
    }

    /// A file left without its header would be taken for an existing store by the
    /// next `initialize`, so it is removed when `header` fails.
    fn create_with<F>(&self, header: F) -> Result<bool, Error>
    where
        F: FnOnce(File) -> Result<(), Error>,
    {
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(Error::StoreWrite(e)),
        };
        if let Err(e) = header(file) {
            if let Err(remove) = fs::remove_file(&self.path) {
                warn!("Can't remove {}: {remove}", self.path.display());
            }
            return Err(e);
        }
        info!("Created transaction store {}", self.path.display());
        Ok(true)
    }

    /// Appends one record at the end of the file. The store must have been initialized.
    pub fn append(&self, tx: &Transaction) -> Result<(), Error> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(Error::StoreWrite)?;
        write_transaction(file, tx)?;
        debug!("Appended {tx:?} to {}", self.path.display());
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<Transaction>, Error> {
        let file = File::open(&self.path).map_err(Error::StoreRead)?;
        let mut txs = Vec::new();
        read_transactions(file, &mut txs)?;
        debug!("Read {} transactions from {}", txs.len(), self.path.display());
        Ok(txs)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        data::{Category::*, Error, Transaction},
        store::Store,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn tx(d: u32, amount: rust_decimal::Decimal, description: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            amount,
            category: Expense,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("finance_data.csv"));
        assert!(store.initialize().unwrap());
        store.append(&tx(1, dec!(5), "lunch")).unwrap();
        assert!(!store.initialize().unwrap());
        assert_eq!(store.read_all().unwrap().len(), 1);
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("date,amount,category,description\n"));
    }

    #[test]
    fn test_empty_store() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("finance_data.csv"));
        store.initialize().unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("finance_data.csv"));
        store.initialize().unwrap();
        let records = [
            tx(3, dec!(12.3456), "first"),
            Transaction {
                category: Income,
                ..tx(1, dec!(2000), "pay, january")
            },
            tx(2, dec!(0), "line\nbreak \"quoted\""),
        ];
        for (i, record) in records.iter().enumerate() {
            store.append(record).unwrap();
            let all = store.read_all().unwrap();
            assert_eq!(all.len(), i + 1);
            assert_eq!(all.last(), Some(record));
        }
        assert_eq!(store.read_all().unwrap(), records);
    }

    #[test]
    fn test_append_without_store() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("missing").join("finance_data.csv"));
        assert!(matches!(
            store.append(&tx(1, dec!(1), "x")),
            Err(Error::StoreWrite(_))
        ));
        assert!(matches!(store.initialize(), Err(Error::StoreWrite(_))));
    }

    #[test]
    fn test_read_missing_store() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("finance_data.csv"));
        assert!(matches!(store.read_all(), Err(Error::StoreRead(_))));
    }

    #[test]
    fn test_malformed_row_is_rejected() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("finance_data.csv"));
        std::fs::write(
            store.path(),
            "date,amount,category,description\n01-01-2024,abc,Income,x\n",
        )
        .unwrap();
        assert!(matches!(
            store.read_all(),
            Err(Error::StoreFormat { line: 2, .. })
        ));
    }

    #[test]
    fn test_failed_header_leaves_no_file() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("finance_data.csv"));
        let result = store.create_with(|_| {
            Err(Error::StoreWrite(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        });
        assert!(matches!(result, Err(Error::StoreWrite(_))));
        assert!(!store.path().exists());

        assert!(store.initialize().unwrap());
        store.append(&tx(1, dec!(3), "after retry")).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }
}
