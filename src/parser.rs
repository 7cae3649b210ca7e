use std::collections::HashSet;

use crate::{FxRateRow, Header, Symbol};

/// Possible errors to occur while parsing an FX rate file
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("File is empty.")]
    EmptyFile,
    #[error("Invalid file format. File must contain Symbol, Bid, and Ask columns.")]
    InvalidFormat,
    #[error("Duplicate currency symbols found in the file.")]
    DuplicateSymbol(Symbol),
    #[error("No valid data found in the file.")]
    NoValidRows,
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// The result of parsing one FX rate file
///
/// Either a non-empty list of rows in file order, or the reason the whole
/// file was rejected.
pub type ParseOutcome = Result<Vec<FxRateRow>, ParseError>;

/// The rows accepted so far, together with the symbols they use
#[derive(Debug, Default)]
struct RateBatch {
    rows: Vec<FxRateRow>,
    seen: HashSet<Symbol>,
}

impl RateBatch {
    fn push(mut self, row: FxRateRow) -> Result<Self, ParseError> {
        self.seen
            .insert(row.symbol().clone())
            .then(|| ())
            .ok_or_else(|| ParseError::DuplicateSymbol(row.symbol().clone()))?;
        self.rows.push(row);

        Ok(self)
    }
}

/// Decodes raw file contents and parses them as FX rates
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn parse_bytes(contents: &[u8]) -> ParseOutcome {
    parse_rates(&String::from_utf8_lossy(contents))
}

/// Parses the text of an FX rate file
///
/// The first non-blank line is the header and has to name the `symbol`,
/// `bid` and `ask` columns. Every following line is read positionally as
/// `symbol,bid,ask`; lines missing one of them are skipped. A symbol that
/// appears twice rejects the whole file.
pub fn parse_rates(text: &str) -> ParseOutcome {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut records = reader
        .records()
        .filter(|record| !matches!(record, Ok(record) if is_blank(record)));

    let header = match records.next() {
        Some(record) => Header::from_fields(record?.iter()),
        None => return Err(ParseError::EmptyFile),
    };
    if !header.is_valid() {
        tracing::warn!(columns = ?header.columns(), "rejecting file without required columns");
        return Err(ParseError::InvalidFormat);
    }

    let batch = records.try_fold(RateBatch::default(), |batch, record| -> Result<_, ParseError> {
        let record = record?;
        match parse_record(&record) {
            Some(row) => batch.push(row),
            None => {
                tracing::debug!(line = ?record.position().map(csv::Position::line), "skipping incomplete row");
                Ok(batch)
            }
        }
    });

    match batch {
        Ok(batch) if batch.rows.is_empty() => Err(ParseError::NoValidRows),
        Ok(batch) => {
            tracing::info!(rows = batch.rows.len(), "parsed fx rates");
            Ok(batch.rows)
        }
        Err(err) => {
            if let ParseError::DuplicateSymbol(symbol) = &err {
                tracing::warn!(%symbol, "rejecting file with duplicate symbol");
            }
            Err(err)
        }
    }
}

/// Reads the first three fields of a record as symbol, bid and ask
fn parse_record(record: &csv::StringRecord) -> Option<FxRateRow> {
    FxRateRow::from_fields(record.get(0)?, record.get(1)?, record.get(2)?)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty)
}
