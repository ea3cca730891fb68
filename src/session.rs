use crate::config;
use crate::models::{MarketIndex, OptionChain};
use crate::processor;
use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

// -----------------------------------------------
// TIME-BUCKETED SNAPSHOT CACHE
// -----------------------------------------------

/// Snapshot cache keyed by (symbol, time bucket). A snapshot stays valid
/// for the bucket it was fetched in; the next bucket is a miss.
#[derive(Default)]
pub struct SnapshotCache {
    entries: HashMap<String, (u64, OptionChain)>,
}

/// Bucket index for a wall-clock instant.
pub fn bucket_for(now: SystemTime) -> u64 {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    secs / config::CACHE_BUCKET_SECS
}

/// Bucket index for the current wall-clock time.
pub fn current_bucket() -> u64 {
    bucket_for(SystemTime::now())
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str, bucket: u64) -> Option<&OptionChain> {
        match self.entries.get(symbol) {
            Some((cached_bucket, chain)) if *cached_bucket == bucket => Some(chain),
            _ => None,
        }
    }

    pub fn insert(&mut self, symbol: &str, bucket: u64, chain: OptionChain) {
        self.entries.insert(symbol.to_string(), (bucket, chain));
    }

    /// Drop the cached snapshot for one symbol (the manual-refresh path).
    pub fn invalidate(&mut self, symbol: &str) {
        self.entries.remove(symbol);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// -----------------------------------------------
// DASHBOARD SESSION STATE
// -----------------------------------------------

/// Everything the dashboard holds between renders: selection, refresh
/// policy, and the last good snapshot. No ambient globals.
pub struct SessionState {
    selected_index: MarketIndex,
    selected_expiry: Option<String>,
    auto_refresh: bool,
    refresh_interval: Duration,
    last_fetch: Option<Instant>,
    snapshot: Option<OptionChain>,
}

impl SessionState {
    pub fn new(index: MarketIndex) -> Self {
        Self {
            selected_index: index,
            selected_expiry: None,
            auto_refresh: true,
            refresh_interval: Duration::from_secs(config::REFRESH_DEFAULT_SECS),
            last_fetch: None,
            snapshot: None,
        }
    }

    pub fn selected_index(&self) -> MarketIndex {
        self.selected_index
    }

    /// Switching index drops the snapshot and expiry selection.
    pub fn select_index(&mut self, index: MarketIndex) {
        if index != self.selected_index {
            self.selected_index = index;
            self.selected_expiry = None;
            self.snapshot = None;
            self.last_fetch = None;
        }
    }

    pub fn selected_expiry(&self) -> Option<&str> {
        self.selected_expiry.as_deref()
    }

    pub fn select_expiry(&mut self, expiry: String) {
        self.selected_expiry = Some(expiry);
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Clamped to the allowed 30-120 s band.
    pub fn set_refresh_interval(&mut self, secs: u64) {
        let secs = secs.clamp(config::REFRESH_MIN_SECS, config::REFRESH_MAX_SECS);
        self.refresh_interval = Duration::from_secs(secs);
    }

    /// True when no fetch has happened yet or the interval has elapsed.
    pub fn refresh_due(&self) -> bool {
        match self.last_fetch {
            Some(at) => at.elapsed() >= self.refresh_interval,
            None => true,
        }
    }

    /// Mark a poll attempt without a snapshot. Keeps a failed fetch from
    /// being retried before the next scheduled cycle.
    pub fn record_attempt(&mut self) {
        self.last_fetch = Some(Instant::now());
    }

    /// Store a successful fetch. Resolves a default expiry from the payload
    /// when the user has not picked one.
    pub fn record_snapshot(&mut self, chain: OptionChain) {
        if self.selected_expiry.is_none() {
            self.selected_expiry = processor::select_expiry(&chain.records.expiry_dates)
                .ok()
                .cloned()
                .or_else(|| chain.records.expiry_dates.first().cloned());
        }
        self.last_fetch = Some(Instant::now());
        self.snapshot = Some(chain);
    }

    /// Last good snapshot, if any fetch has succeeded this session.
    pub fn snapshot(&self) -> Option<&OptionChain> {
        self.snapshot.as_ref()
    }
}
