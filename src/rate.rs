use std::fmt;
use std::str::FromStr;

use fixed::types::I64F64;

/// The currency symbol a rate is quoted for
///
/// Symbols are trimmed and never empty. They are compared exactly, so `usd`
/// and `USD` are two different symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from the given text, or `None` if it is blank
    pub fn new(text: &str) -> Option<Self> {
        let text = text.trim();
        match text.is_empty() {
            true => None,
            false => Some(Self(text.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One side of a quote
///
/// Values that cannot be read as a number are kept as [`Quote::Blank`]
/// instead of rejecting the row they belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quote {
    Price(I64F64),
    Blank,
}

impl Quote {
    /// Reads a quote from text, falling back to [`Quote::Blank`]
    pub fn parse(text: &str) -> Self {
        I64F64::from_str(text.trim())
            .map(Quote::Price)
            .unwrap_or(Quote::Blank)
    }

    /// The numeric value, if there is one
    pub fn price(&self) -> Option<I64F64> {
        match self {
            Quote::Price(price) => Some(*price),
            Quote::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Quote::Blank)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::Price(price) => fmt::Display::fmt(price, f),
            Quote::Blank => Ok(()),
        }
    }
}

impl serde::Serialize for Quote {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        match self {
            Quote::Price(price) => serde::Serialize::serialize(price, serializer),
            Quote::Blank => serializer.serialize_str(""),
        }
    }
}

/// A bid/ask quote pair for one currency symbol
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FxRateRow {
    symbol: Symbol,
    bid: Quote,
    ask: Quote,
}

impl FxRateRow {
    pub fn new(symbol: Symbol, bid: Quote, ask: Quote) -> Self {
        Self { symbol, bid, ask }
    }

    /// Builds a row from raw field text
    ///
    /// Returns `None` if any of the three fields is blank. A present but
    /// unparsable bid or ask is kept as [`Quote::Blank`].
    pub fn from_fields(symbol: &str, bid: &str, ask: &str) -> Option<Self> {
        let symbol = Symbol::new(symbol)?;
        if bid.trim().is_empty() || ask.trim().is_empty() {
            return None;
        }

        Some(Self::new(symbol, Quote::parse(bid), Quote::parse(ask)))
    }

    /// The symbol, unique within one batch
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn bid(&self) -> Quote {
        self.bid
    }

    pub fn ask(&self) -> Quote {
        self.ask
    }
}
