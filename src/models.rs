use serde::{Deserialize, Serialize};

/// Indices shown on the dashboard. Display names map to NSE symbol codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketIndex {
    Nifty,
    BankNifty,
    Sensex,
}

impl MarketIndex {
    pub const ALL: &'static [MarketIndex] =
        &[MarketIndex::Nifty, MarketIndex::BankNifty, MarketIndex::Sensex];

    pub fn display_name(&self) -> &'static str {
        match self {
            MarketIndex::Nifty => "Nifty",
            MarketIndex::BankNifty => "Bank Nifty",
            MarketIndex::Sensex => "Sensex",
        }
    }

    /// Upstream symbol code used in API URLs.
    pub fn symbol(&self) -> &'static str {
        match self {
            MarketIndex::Nifty => "NIFTY",
            MarketIndex::BankNifty => "BANKNIFTY",
            MarketIndex::Sensex => "SENSEX",
        }
    }

    /// Accepts either the display name or the symbol code.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|idx| {
            idx.display_name().eq_ignore_ascii_case(name)
                || idx.symbol().eq_ignore_ascii_case(name)
        })
    }
}

/// Main response structure from the NSE option chain API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub records: Records,
}

/// Records section containing timestamp, underlying value, and all strike data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub timestamp: String,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: f64,

    #[serde(rename = "expiryDates")]
    pub expiry_dates: Vec<String>,

    pub data: Vec<OptionRecord>,
}

/// Option data for one strike of one expiry. A record missing strikePrice
/// or expiryDate fails the parse of the whole payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionRecord {
    #[serde(rename = "strikePrice")]
    pub strike_price: f64,

    #[serde(rename = "expiryDate")]
    pub expiry_date: String,

    #[serde(rename = "CE")]
    pub call: Option<OptionSideQuote>,

    #[serde(rename = "PE")]
    pub put: Option<OptionSideQuote>,
}

/// One side (CE or PE) of a strike. Numeric fields the upstream omits
/// parse as 0.0 rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionSideQuote {
    #[serde(default)]
    pub theta: f64,

    #[serde(default)]
    pub change: f64,

    #[serde(default, rename = "lastPrice")]
    pub last_price: f64,

    #[serde(default, rename = "openInterest")]
    pub open_interest: f64,

    #[serde(default, rename = "impliedVolatility")]
    pub implied_volatility: f64,
}
