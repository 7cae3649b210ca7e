pub use self::{
    header::{has_required_columns, Header, REQUIRED_COLUMNS},
    parser::{parse_bytes, parse_rates, ParseError, ParseOutcome},
    rate::{FxRateRow, Quote, Symbol},
    upload::{Completion, Message, RateUploader, SelectedFile, UploadError, UploadState, UploadTicket},
};

mod header;
mod parser;
mod rate;
mod upload;
