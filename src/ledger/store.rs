use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::iter;
use std::path::{Path, PathBuf};

use getset::Getters;
use log::{debug, info};

use super::record::{ExpenseRecord, RawRow};
use super::{LedgerError, HEADER};

/// Header plus every data row of the ledger, as raw text.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct LedgerContents {
    header: RawRow,
    records: Vec<RawRow>,
}

impl LedgerContents {
    /// All rows in file order, header first.
    pub fn rows(&self) -> impl Iterator<Item = &RawRow> {
        iter::once(&self.header).chain(self.records.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// File-backed ledger. Every operation opens the file, does a single pass and
/// closes it again; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> LedgerStore {
        LedgerStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the ledger with only the header row unless it already exists.
    /// Returns `true` when the file was created.
    pub fn ensure_initialized(&self) -> Result<bool, LedgerError> {
        let file = match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        write_header(file)?;
        info!("created ledger at {}", self.path.display());

        Ok(true)
    }

    /// Appends one record. The file must already exist.
    pub fn append(&self, record: &ExpenseRecord) -> Result<(), LedgerError> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|err| self.map_open_error(err))?;

        let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        csv_writer.serialize(record)?;
        csv_writer.flush()?;

        debug!("appended record to {}, record={:?}", self.path.display(), record);

        Ok(())
    }

    /// Reads the header and every data row without interpreting any field.
    pub fn read_all(&self) -> Result<LedgerContents, LedgerError> {
        let file = File::open(&self.path).map_err(|err| self.map_open_error(err))?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::new();
        for record in csv_reader.byte_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect::<RawRow>(),
            );
        }

        let mut rows = rows.into_iter();
        let header = rows.next().ok_or_else(|| LedgerError::MissingHeader(self.path.clone()))?;

        Ok(LedgerContents {
            header,
            records: rows.collect(),
        })
    }

    /// Replaces the ledger with a header-only file. Prior records are gone.
    pub fn truncate(&self) -> Result<(), LedgerError> {
        let file = File::create(&self.path)?;
        write_header(file)?;
        info!("cleared ledger at {}", self.path.display());

        Ok(())
    }

    fn map_open_error(&self, err: std::io::Error) -> LedgerError {
        if err.kind() == ErrorKind::NotFound {
            LedgerError::Missing(self.path.clone())
        } else {
            err.into()
        }
    }
}

fn write_header<W: Write>(writer: W) -> Result<(), LedgerError> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(HEADER)?;
    csv_writer.flush()?;

    Ok(())
}
