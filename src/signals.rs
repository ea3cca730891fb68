use serde::{Deserialize, Serialize};

// Hammer shape thresholds: long lower wick, short upper wick, small body
const LOWER_WICK_MIN_RATIO: f64 = 0.5;
const UPPER_WICK_MAX_RATIO: f64 = 0.2;
const BODY_MAX_RATIO: f64 = 0.3;

/// Proximity band around support/resistance, as a fraction of the level
const LEVEL_PROXIMITY: f64 = 0.02;

/// One OHLC observation period
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    #[serde(default)]
    pub volume: Option<f64>,
}

/// Price levels a reversal is checked against
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

impl SupportResistance {
    /// Single-candle window: support is the low, resistance the high.
    pub fn from_candle(candle: &Candle) -> Self {
        Self {
            support: candle.low,
            resistance: candle.high,
        }
    }

    /// Min low / max high over a window of candles. Empty windows have no levels.
    pub fn from_window(candles: &[Candle]) -> Option<Self> {
        let first = candles.first()?;
        let mut levels = Self::from_candle(first);
        for candle in &candles[1..] {
            levels.support = levels.support.min(candle.low);
            levels.resistance = levels.resistance.max(candle.high);
        }
        Some(levels)
    }
}

/// Discrete trading signal from the candle detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    #[serde(rename = "Buy CE")]
    BuyCe,
    #[serde(rename = "Buy PE")]
    BuyPe,
    Sideways,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::BuyCe => "Buy CE",
            Signal::BuyPe => "Buy PE",
            Signal::Sideways => "Sideways",
        }
    }
}

/// Detect a hammer reversal against support/resistance.
///
/// Total over finite OHLC inputs: a degenerate candle (high == low) is
/// Sideways, every other input lands on exactly one of the three labels.
pub fn hammer_signal(candle: &Candle, levels: &SupportResistance) -> Signal {
    let range = candle.high - candle.low;
    if range == 0.0 {
        return Signal::Sideways;
    }

    let body = (candle.close - candle.open).abs();
    let lower_wick = candle.open.min(candle.close) - candle.low;
    let upper_wick = candle.high - candle.open.max(candle.close);

    let is_hammer = lower_wick / range > LOWER_WICK_MIN_RATIO
        && upper_wick / range < UPPER_WICK_MAX_RATIO
        && body / range < BODY_MAX_RATIO;

    if !is_hammer {
        return Signal::Sideways;
    }

    if candle.close >= levels.support * (1.0 - LEVEL_PROXIMITY) {
        // Holding at or above support: bullish reversal
        Signal::BuyCe
    } else if candle.close <= levels.resistance * (1.0 + LEVEL_PROXIMITY) {
        // Broken below support, capped under resistance: bearish
        Signal::BuyPe
    } else {
        Signal::Sideways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle { open, high, low, close, volume: None }
    }

    #[test]
    fn test_degenerate_candle_is_sideways() {
        let flat = candle(19500.0, 19500.0, 19500.0, 19500.0);
        let levels = SupportResistance { support: 19000.0, resistance: 20000.0 };
        assert_eq!(hammer_signal(&flat, &levels), Signal::Sideways);
    }

    #[test]
    fn test_lower_wick_at_exactly_half_range_is_not_a_hammer() {
        // body=20, range=200, lower_wick=100 (ratio 0.5, not strictly above)
        let c = candle(19500.0, 19600.0, 19400.0, 19520.0);
        let levels = SupportResistance { support: 19450.0, resistance: 19650.0 };
        assert_eq!(hammer_signal(&c, &levels), Signal::Sideways);
    }

    #[test]
    fn test_hammer_holding_support_signals_buy_ce() {
        // body=0.5, range=11, lower_wick=9.5, upper_wick=1
        let c = candle(100.0, 101.0, 90.0, 99.5);
        let levels = SupportResistance { support: 100.0, resistance: 110.0 };
        assert_eq!(hammer_signal(&c, &levels), Signal::BuyCe);
    }

    #[test]
    fn test_hammer_below_broken_support_signals_buy_pe() {
        let c = candle(19600.0, 19625.0, 19500.0, 19610.0);
        // Close sits more than 2% under the support level, within the
        // resistance band
        let levels = SupportResistance { support: 20100.0, resistance: 19650.0 };
        assert_eq!(hammer_signal(&c, &levels), Signal::BuyPe);
    }

    #[test]
    fn test_levels_from_single_candle() {
        let c = candle(100.0, 101.0, 90.0, 99.5);
        let levels = SupportResistance::from_candle(&c);
        assert_eq!(levels.support, 90.0);
        assert_eq!(levels.resistance, 101.0);
    }

    #[test]
    fn test_levels_from_window() {
        let window = [
            candle(100.0, 105.0, 95.0, 102.0),
            candle(102.0, 110.0, 99.0, 108.0),
            candle(108.0, 109.0, 92.0, 93.0),
        ];
        let levels = SupportResistance::from_window(&window).unwrap();
        assert_eq!(levels.support, 92.0);
        assert_eq!(levels.resistance, 110.0);
        assert!(SupportResistance::from_window(&[]).is_none());
    }
}
