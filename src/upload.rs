use std::path::Path;

use crate::{parse_bytes, FxRateRow, ParseError, ParseOutcome};

const SAVED: &str = "FX rates saved successfully.";

/// Possible errors to occur while driving an upload
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Please select a valid CSV file.")]
    UnsupportedExtension,
    #[error("Please select a file to upload.")]
    NoFileSelected,
    #[error("No rates to save.")]
    NothingToSave,
}

/// A file chosen for upload, with its raw contents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    contents: Vec<u8>,
}

impl SelectedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

/// The state of one upload cycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadState {
    /// Nothing selected, or the last attempt failed
    Idle,
    /// A CSV file is selected but not yet parsed
    FileSelected { file: SelectedFile },
    /// The file was parsed and its rows wait to be saved
    Parsed { file: SelectedFile, rows: Vec<FxRateRow> },
    /// The rows were saved
    Saved { file: SelectedFile, rows: Vec<FxRateRow> },
}

/// The message shown to the user after the last action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Error(String),
    Success(String),
}

/// Identifies the file an upload was started for
///
/// Selecting another file or cancelling invalidates all tickets handed out
/// before, so a parse that finishes late cannot overwrite newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

/// What happened to a finished parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was applied to the uploader
    Applied,
    /// The ticket was outdated and the outcome was dropped
    Stale,
}

/// Drives an FX rate file through selection, parsing and saving
#[derive(Debug, Default)]
pub struct RateUploader {
    state: UploadState,
    message: Option<Message>,
    /// Bumped whenever the selected file changes or the cycle is reset
    generation: u64,
}

impl Default for UploadState {
    fn default() -> Self {
        UploadState::Idle
    }
}

impl RateUploader {
    /// Creates a new, idle uploader
    pub fn new() -> Self {
        Self {
            state: UploadState::Idle,
            message: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// The error message of the last action, if it failed
    pub fn error(&self) -> Option<&str> {
        match &self.message {
            Some(Message::Error(message)) => Some(message),
            _ => None,
        }
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.state {
            UploadState::FileSelected { file }
            | UploadState::Parsed { file, .. }
            | UploadState::Saved { file, .. } => Some(file),
            UploadState::Idle => None,
        }
    }

    /// The rows of the last successful parse
    ///
    /// Empty unless the current file has been parsed.
    pub fn rows(&self) -> &[FxRateRow] {
        match &self.state {
            UploadState::Parsed { rows, .. } | UploadState::Saved { rows, .. } => rows,
            UploadState::Idle | UploadState::FileSelected { .. } => &[],
        }
    }

    /// Selects a new file, discarding everything about the previous one
    ///
    /// Only files with a `csv` extension are accepted. Any other file leaves
    /// the uploader idle with an error.
    pub fn select_file(&mut self, name: impl Into<String>, contents: Vec<u8>) -> Result<(), UploadError> {
        let name = name.into();
        self.generation += 1;

        if !has_csv_extension(&name) {
            tracing::warn!(file = %name, "rejecting file with unsupported extension");
            self.state = UploadState::Idle;
            return Err(self.fail(UploadError::UnsupportedExtension));
        }

        tracing::info!(file = %name, bytes = contents.len(), "selected fx rate file");
        self.state = UploadState::FileSelected { file: SelectedFile { name, contents } };
        self.message = None;

        Ok(())
    }

    /// Starts parsing the selected file
    ///
    /// The returned ticket has to be handed back together with the parse
    /// outcome to [`RateUploader::complete_upload`].
    pub fn begin_upload(&mut self) -> Result<UploadTicket, UploadError> {
        if self.selected_file().is_none() {
            return Err(self.fail(UploadError::NoFileSelected));
        }

        Ok(UploadTicket { generation: self.generation })
    }

    /// Applies the outcome of a parse started with [`RateUploader::begin_upload`]
    ///
    /// A successful parse makes the rows available for saving. A failed one
    /// resets the uploader to idle, clears all rows and is returned as error.
    pub fn complete_upload(&mut self, ticket: UploadTicket, outcome: ParseOutcome) -> Result<Completion, UploadError> {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping outcome of outdated upload"
            );
            return Ok(Completion::Stale);
        }

        let file = match std::mem::take(&mut self.state) {
            UploadState::FileSelected { file }
            | UploadState::Parsed { file, .. }
            | UploadState::Saved { file, .. } => file,
            UploadState::Idle => return Ok(Completion::Stale),
        };

        match outcome {
            Ok(rows) => {
                tracing::info!(file = %file.name, rows = rows.len(), "fx rate file parsed");
                self.state = UploadState::Parsed { file, rows };
                self.message = None;
                Ok(Completion::Applied)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Parses the selected file in one step
    pub fn upload(&mut self) -> Result<&[FxRateRow], UploadError> {
        let ticket = self.begin_upload()?;
        let outcome = self
            .selected_file()
            .map(|file| parse_bytes(file.contents()))
            .ok_or(UploadError::NoFileSelected)?;
        self.complete_upload(ticket, outcome)?;

        Ok(self.rows())
    }

    /// Saves the parsed rows
    ///
    /// Saving does not leave memory yet; it only confirms the rows to the
    /// user. The rows stay available afterwards.
    pub fn save(&mut self) -> Result<&'static str, UploadError> {
        let (file, rows) = match std::mem::take(&mut self.state) {
            UploadState::Parsed { file, rows } | UploadState::Saved { file, rows } => (file, rows),
            state => {
                self.state = state;
                return Err(self.fail(UploadError::NothingToSave));
            }
        };

        tracing::info!(file = %file.name, rows = rows.len(), "fx rates saved");
        self.state = UploadState::Saved { file, rows };
        self.message = Some(Message::Success(SAVED.to_owned()));

        Ok(SAVED)
    }

    /// Abandons the current cycle and returns to idle
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = UploadState::Idle;
        self.message = None;
    }

    fn fail(&mut self, err: UploadError) -> UploadError {
        self.message = Some(Message::Error(err.to_string()));
        err
    }
}

fn has_csv_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map_or(false, |extension| extension.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: &[u8] = b"symbol,bid,ask\nUSD,1.30,1.32\nEUR,0.90,0.92";

    fn parsed() -> RateUploader {
        let mut uploader = RateUploader::new();
        uploader.select_file("rates.csv", RATES.to_vec()).unwrap();
        uploader.upload().unwrap();
        uploader
    }

    #[test]
    fn starts_idle() {
        let uploader = RateUploader::new();

        assert_eq!(uploader.state(), &UploadState::Idle);
        assert!(uploader.rows().is_empty());
        assert!(uploader.message().is_none());
    }

    #[test]
    fn select_csv_file() {
        let mut uploader = RateUploader::new();
        uploader.select_file("Rates.CSV", RATES.to_vec()).unwrap();

        assert!(matches!(uploader.state(), UploadState::FileSelected { .. }));
        assert_eq!(uploader.selected_file().unwrap().name(), "Rates.CSV");
        assert!(uploader.rows().is_empty());
    }

    #[test]
    fn select_unsupported_extension() {
        let mut uploader = parsed();
        let err = uploader.select_file("rates.xlsx", vec![]).unwrap_err();

        assert!(matches!(err, UploadError::UnsupportedExtension));
        assert_eq!(uploader.state(), &UploadState::Idle);
        assert_eq!(uploader.error(), Some("Please select a valid CSV file."));
        assert!(uploader.rows().is_empty());

        assert!(uploader.select_file("csv", vec![]).is_err());
    }

    #[test]
    fn upload_parses_rows() {
        let uploader = parsed();

        assert!(matches!(uploader.state(), UploadState::Parsed { .. }));
        let symbols: Vec<_> = uploader.rows().iter().map(|row| row.symbol().as_str()).collect();
        assert_eq!(symbols, ["USD", "EUR"]);
        assert!(uploader.message().is_none());
    }

    #[test]
    fn upload_without_file() {
        let mut uploader = RateUploader::new();
        let err = uploader.upload().unwrap_err();

        assert!(matches!(err, UploadError::NoFileSelected));
        assert_eq!(uploader.error(), Some("Please select a file to upload."));
    }

    #[test]
    fn failed_upload_resets_to_idle() {
        let mut uploader = RateUploader::new();
        uploader
            .select_file("rates.csv", b"symbol,bid,ask\nUSD,1.30,1.32\nUSD,1.10,1.12".to_vec())
            .unwrap();
        let err = uploader.upload().unwrap_err();

        assert!(matches!(err, UploadError::Parse(ParseError::DuplicateSymbol(_))));
        assert_eq!(uploader.state(), &UploadState::Idle);
        assert_eq!(uploader.error(), Some("Duplicate currency symbols found in the file."));
        assert!(uploader.rows().is_empty());
    }

    #[test]
    fn empty_file_reports_message() {
        let mut uploader = RateUploader::new();
        uploader.select_file("rates.csv", vec![]).unwrap();
        uploader.upload().unwrap_err();

        assert_eq!(uploader.error(), Some("File is empty."));
    }

    #[test]
    fn save_keeps_rows() {
        let mut uploader = parsed();
        let message = uploader.save().unwrap();

        assert_eq!(message, "FX rates saved successfully.");
        assert!(matches!(uploader.state(), UploadState::Saved { .. }));
        assert_eq!(uploader.rows().len(), 2);
        assert_eq!(uploader.message(), Some(&Message::Success(message.to_owned())));
    }

    #[test]
    fn save_without_rows() {
        let mut uploader = RateUploader::new();
        uploader.select_file("rates.csv", RATES.to_vec()).unwrap();
        let err = uploader.save().unwrap_err();

        assert!(matches!(err, UploadError::NothingToSave));
        assert!(matches!(uploader.state(), UploadState::FileSelected { .. }));
    }

    #[test]
    fn cancel_resets() {
        let mut uploader = parsed();
        uploader.save().unwrap();
        uploader.cancel();

        assert_eq!(uploader.state(), &UploadState::Idle);
        assert!(uploader.rows().is_empty());
        assert!(uploader.message().is_none());
    }

    #[test]
    fn new_file_clears_previous_rows() {
        let mut uploader = parsed();
        uploader.select_file("other.csv", RATES.to_vec()).unwrap();

        assert!(uploader.rows().is_empty());
        assert!(matches!(uploader.state(), UploadState::FileSelected { .. }));
    }

    #[test]
    fn outdated_upload_is_dropped() {
        let mut uploader = RateUploader::new();
        uploader.select_file("first.csv", RATES.to_vec()).unwrap();
        let ticket = uploader.begin_upload().unwrap();
        let outcome = parse_bytes(uploader.selected_file().unwrap().contents());

        uploader.select_file("second.csv", b"symbol,bid,ask\nGBP,1.55,1.58".to_vec()).unwrap();
        let completion = uploader.complete_upload(ticket, outcome).unwrap();

        assert_eq!(completion, Completion::Stale);
        assert!(uploader.rows().is_empty());
        assert_eq!(uploader.selected_file().unwrap().name(), "second.csv");

        let rows = uploader.upload().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol().as_str(), "GBP");
    }

    #[test]
    fn upload_after_cancel_is_dropped() {
        let mut uploader = RateUploader::new();
        uploader.select_file("rates.csv", RATES.to_vec()).unwrap();
        let ticket = uploader.begin_upload().unwrap();
        uploader.cancel();

        let completion = uploader.complete_upload(ticket, parse_bytes(RATES)).unwrap();
        assert_eq!(completion, Completion::Stale);
        assert_eq!(uploader.state(), &UploadState::Idle);
    }

    #[test]
    fn reupload_after_save() {
        let mut uploader = parsed();
        uploader.save().unwrap();
        uploader.upload().unwrap();

        assert!(matches!(uploader.state(), UploadState::Parsed { .. }));
        assert!(uploader.message().is_none());
    }
}
