use std::time::Duration;

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

pub fn nse_option_chain_url(symbol: &str) -> String {
    format!(
        "{}/api/option-chain-indices?symbol={}",
        NSE_BASE_URL,
        urlencoding::encode(symbol)
    )
}

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

// -----------------------------------------------
// SESSION WARMUP
// -----------------------------------------------
pub const WARMUP_DELAY_MS: u64 = 200;

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 200;
pub const RETRY_FACTOR: u64 = 2;
pub const RETRY_MAX_DELAY_SECS: u64 = 3;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// SNAPSHOT CACHE
// -----------------------------------------------
/// Width of a cache time bucket. Two fetches for the same symbol inside
/// one bucket reuse the first snapshot.
pub const CACHE_BUCKET_SECS: u64 = 60;

// -----------------------------------------------
// ANALYSIS DEFAULTS
// -----------------------------------------------
/// Strikes further than this from the underlying are ignored.
pub const DEFAULT_DECAY_WINDOW: f64 = 150.0;

// -----------------------------------------------
// DASHBOARD REFRESH
// -----------------------------------------------
pub const REFRESH_MIN_SECS: u64 = 30;
pub const REFRESH_MAX_SECS: u64 = 120;
pub const REFRESH_DEFAULT_SECS: u64 = 60;

// -----------------------------------------------
// HTTP HEADERS
// -----------------------------------------------
pub const HEADER_REFERER: &str = "https://www.nseindia.com/";
pub const HEADER_X_REQUESTED_WITH: &str = "XMLHttpRequest";
pub const HEADER_ACCEPT_HTML: &str = "text/html";

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to single
pub fn get_execution_mode() -> String {
    std::env::var("NSE_MODE").unwrap_or_else(|_| "single".to_string())
}

/// Get the selected index display name or symbol
pub fn get_index_name() -> String {
    std::env::var("NSE_INDEX").unwrap_or_else(|_| "Nifty".to_string())
}

/// Get an explicit expiry selection, if any
pub fn get_expiry() -> Option<String> {
    std::env::var("NSE_EXPIRY").ok().filter(|s| !s.is_empty())
}

/// Get port for server mode
pub fn get_port() -> u16 {
    std::env::var("NSE_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or(3001)
}

/// Auto-refresh toggle for watch mode
pub fn get_auto_refresh() -> bool {
    std::env::var("NSE_AUTO_REFRESH")
        .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(true)
}

/// Get the watch-mode refresh interval in seconds (clamped by the session)
pub fn get_refresh_secs() -> u64 {
    std::env::var("NSE_REFRESH")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(REFRESH_DEFAULT_SECS)
}
