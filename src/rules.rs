use crate::processor::MarketBias;
use serde::Serialize;

/// Strategy suggestions for one market bias
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub bias: MarketBias,
    pub outlook: &'static str,
    pub strategies: &'static [&'static str],
}

/// Fixed lookup from aggregate bias to suggested strategies. Heavy call
/// decay reads bearish, heavy put decay bullish.
pub fn recommend(bias: MarketBias) -> Recommendation {
    match bias {
        MarketBias::CeDecayActive => Recommendation {
            bias,
            outlook: "Bearish (Downside)",
            strategies: &[
                "Sell Call Options (Short Call)",
                "Buy Put Options (Long Put)",
                "Bear Put Spread",
            ],
        },
        MarketBias::PeDecayActive => Recommendation {
            bias,
            outlook: "Bullish (Upside)",
            strategies: &[
                "Sell Put Options (Short Put)",
                "Buy Call Options (Long Call)",
                "Bull Call Spread",
            ],
        },
        MarketBias::BothSidesDecay => Recommendation {
            bias,
            outlook: "Neutral/Range-bound",
            strategies: &[
                "Sell Straddle or Strangle",
                "Iron Condor",
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ce_decay_maps_to_bearish_list() {
        let rec = recommend(MarketBias::CeDecayActive);
        assert_eq!(rec.outlook, "Bearish (Downside)");
        assert_eq!(rec.strategies.len(), 3);
        assert!(rec.strategies.contains(&"Bear Put Spread"));
    }

    #[test]
    fn test_each_bias_has_a_distinct_list() {
        let bearish = recommend(MarketBias::CeDecayActive).strategies;
        let bullish = recommend(MarketBias::PeDecayActive).strategies;
        let neutral = recommend(MarketBias::BothSidesDecay).strategies;
        assert_ne!(bearish, bullish);
        assert_ne!(bullish, neutral);
        assert!(neutral.contains(&"Iron Condor"));
    }
}
