/// The columns every FX rate file has to provide
pub const REQUIRED_COLUMNS: [&str; 3] = ["symbol", "bid", "ask"];

const BYTE_ORDER_MARK: char = '\u{feff}';

/// The normalized header row of an FX rate file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    /// Normalizes the raw column names of a header row
    ///
    /// Names are trimmed and lowercased. A byte order mark in front of the
    /// first column is dropped.
    pub fn from_fields<'a, I>(fields: I) -> Self
        where I: IntoIterator<Item = &'a str>
    {
        let columns = fields
            .into_iter()
            .map(|field| field.trim_start_matches(BYTE_ORDER_MARK).trim().to_lowercase())
            .collect();

        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether all [`REQUIRED_COLUMNS`] are present
    pub fn is_valid(&self) -> bool {
        has_required_columns(&self.columns)
    }
}

/// Checks that `columns` contains every required column
///
/// The order does not matter and additional columns are permitted. The
/// columns are expected to already be trimmed and lowercased.
pub fn has_required_columns<S: AsRef<str>>(columns: &[S]) -> bool {
    REQUIRED_COLUMNS
        .iter()
        .all(|required| columns.iter().any(|column| column.as_ref() == *required))
}
