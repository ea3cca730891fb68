use nse_decay_monitor::{
    DecaySide, MarketBias, OptionRecord, OptionSideQuote, detect_decay, filter_by_expiry,
    recommend,
};

fn quote(theta: f64, change: f64) -> Option<OptionSideQuote> {
    Some(OptionSideQuote {
        theta,
        change,
        ..Default::default()
    })
}

fn record(
    strike: f64,
    expiry: &str,
    ce: Option<OptionSideQuote>,
    pe: Option<OptionSideQuote>,
) -> OptionRecord {
    OptionRecord {
        strike_price: strike,
        expiry_date: expiry.to_string(),
        call: ce,
        put: pe,
    }
}

#[test]
fn test_balanced_decay_reads_as_both_sides() {
    // One strike decaying on the call side, one on the put side
    let data = vec![
        record(19400.0, "30-Dec-2025", quote(-5.0, -2.0), quote(-2.0, 1.0)),
        record(19500.0, "30-Dec-2025", quote(-1.0, 1.0), quote(-6.0, -3.0)),
    ];

    let (rows, bias) = detect_decay(&data, 19450.0, 150.0);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].decay_side, DecaySide::Ce);
    assert_eq!(rows[1].decay_side, DecaySide::Pe);
    assert_eq!(bias, MarketBias::BothSidesDecay);
}

#[test]
fn test_ce_majority_gives_ce_decay_active() {
    let data = vec![
        record(19350.0, "30-Dec-2025", quote(-5.0, -2.0), quote(-2.0, 1.0)),
        record(19450.0, "30-Dec-2025", quote(-7.0, -1.5), quote(-3.0, 0.5)),
        record(19550.0, "30-Dec-2025", quote(-1.0, 1.0), quote(-6.0, -3.0)),
    ];

    let (_, bias) = detect_decay(&data, 19450.0, 150.0);
    assert_eq!(bias, MarketBias::CeDecayActive);
}

#[test]
fn test_all_rows_stay_inside_the_window() {
    let strikes: Vec<f64> = (0..40).map(|i| 18500.0 + 50.0 * i as f64).collect();
    let data: Vec<OptionRecord> = strikes
        .iter()
        .map(|&s| record(s, "30-Dec-2025", quote(-2.0, -1.0), quote(-2.0, -1.0)))
        .collect();

    let underlying = 19437.0;
    let radius = 150.0;
    let (rows, _) = detect_decay(&data, underlying, radius);

    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| (r.strike_price - underlying).abs() <= radius));
}

#[test]
fn test_detection_is_deterministic() {
    let data = vec![
        record(19400.0, "30-Dec-2025", quote(-5.0, -2.0), quote(-2.0, 1.0)),
        record(19500.0, "30-Dec-2025", quote(0.0, -1.0), quote(0.0, -3.0)),
        record(19600.0, "30-Dec-2025", quote(-4.0, 2.0), quote(-4.0, 2.0)),
    ];

    let first = detect_decay(&data, 19450.0, 150.0);
    let second = detect_decay(&data, 19450.0, 150.0);

    assert_eq!(first.1, second.1);
    assert_eq!(
        serde_json::to_string(&first.0).unwrap(),
        serde_json::to_string(&second.0).unwrap()
    );
}

#[test]
fn test_empty_input_is_a_tie() {
    let (rows, bias) = detect_decay(&[], 19450.0, 150.0);
    assert!(rows.is_empty());
    assert_eq!(bias, MarketBias::BothSidesDecay);
}

#[test]
fn test_decay_runs_over_the_selected_expiry_only() {
    let data = vec![
        // Near expiry: CE decay
        record(19400.0, "30-Dec-2025", quote(-5.0, -2.0), quote(-2.0, 1.0)),
        // Far expiry: PE decay on the same strike
        record(19400.0, "06-Jan-2026", quote(-1.0, 1.0), quote(-6.0, -3.0)),
    ];

    let near = filter_by_expiry(&data, "30-Dec-2025");
    let (rows, bias) = detect_decay(&near, 19450.0, 150.0);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].decay_side, DecaySide::Ce);
    assert_eq!(bias, MarketBias::CeDecayActive);
}

#[test]
fn test_recommendation_lookup_is_fixed_per_bias() {
    let bearish = recommend(MarketBias::CeDecayActive);
    assert_eq!(bearish.outlook, "Bearish (Downside)");
    assert_eq!(
        bearish.strategies,
        &[
            "Sell Call Options (Short Call)",
            "Buy Put Options (Long Put)",
            "Bear Put Spread",
        ][..]
    );

    let bullish = recommend(MarketBias::PeDecayActive);
    assert_eq!(bullish.outlook, "Bullish (Upside)");
    assert!(bullish.strategies.contains(&"Bull Call Spread"));

    let neutral = recommend(MarketBias::BothSidesDecay);
    assert_eq!(neutral.strategies, &["Sell Straddle or Strangle", "Iron Condor"][..]);
}

#[test]
fn test_bias_serializes_with_domain_labels() {
    assert_eq!(
        serde_json::to_string(&MarketBias::CeDecayActive).unwrap(),
        "\"CE Decay Active\""
    );
    assert_eq!(
        serde_json::to_string(&MarketBias::BothSidesDecay).unwrap(),
        "\"Both Sides Decay\""
    );
}
