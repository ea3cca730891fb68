pub mod api_server;
pub mod config;
pub mod logging;
pub mod models;
pub mod nse_client;
pub mod processor;
pub mod rules;
pub mod session;
pub mod signals;

// Re-exports for convenience
pub use models::{MarketIndex, OptionChain, OptionRecord, OptionSideQuote, Records};
pub use nse_client::NSEClient;
pub use processor::{DecayRow, DecaySide, MarketBias, detect_decay, filter_by_expiry, select_expiry};
pub use rules::{Recommendation, recommend};
pub use session::{SessionState, SnapshotCache};
pub use signals::{Candle, Signal, SupportResistance, hammer_signal};
