use crate::models::{OptionRecord, OptionSideQuote};
use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Which side of a strike is losing value fastest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DecaySide {
    #[serde(rename = "CE")]
    Ce,
    #[serde(rename = "PE")]
    Pe,
    Both,
}

/// Aggregate bias over the current strike window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketBias {
    #[serde(rename = "CE Decay Active")]
    CeDecayActive,
    #[serde(rename = "PE Decay Active")]
    PeDecayActive,
    #[serde(rename = "Both Sides Decay")]
    BothSidesDecay,
}

impl MarketBias {
    pub fn label(&self) -> &'static str {
        match self {
            MarketBias::CeDecayActive => "CE Decay Active",
            MarketBias::PeDecayActive => "PE Decay Active",
            MarketBias::BothSidesDecay => "Both Sides Decay",
        }
    }
}

/// Per-strike decay row derived on every analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayRow {
    #[serde(rename = "strikePrice")]
    pub strike_price: f64,

    pub ce_theta: f64,
    pub pe_theta: f64,
    pub ce_change: f64,
    pub pe_change: f64,

    pub decay_side: DecaySide,
}

/// Keep only the records for one expiry date
pub fn filter_by_expiry(data: &[OptionRecord], expiry: &str) -> Vec<OptionRecord> {
    data.iter()
        .filter(|opt| opt.expiry_date == expiry)
        .cloned()
        .collect()
}

/// Run decay detection over one expiry's records.
///
/// Step 1: keep strikes within `window` of the underlying that quote both
/// legs. Step 2: classify each strike's decay side. Step 3: sort by strike
/// for display and aggregate CE vs PE counts into the overall bias.
pub fn detect_decay(
    data: &[OptionRecord],
    underlying_value: f64,
    window: f64,
) -> (Vec<DecayRow>, MarketBias) {
    let mut rows: Vec<DecayRow> = data
        .iter()
        .filter(|opt| (opt.strike_price - underlying_value).abs() <= window)
        .filter_map(|opt| {
            // Strikes quoting only one leg are dropped, not errors
            let ce = opt.call.as_ref()?;
            let pe = opt.put.as_ref()?;

            Some(DecayRow {
                strike_price: opt.strike_price,
                ce_theta: ce.theta,
                pe_theta: pe.theta,
                ce_change: ce.change,
                pe_change: pe.change,
                decay_side: classify_strike(ce, pe),
            })
        })
        .collect();

    // Sort by strike price (stable display order only)
    rows.sort_by(|a, b| a.strike_price.partial_cmp(&b.strike_price).unwrap());

    let bias = aggregate_bias(&rows);
    (rows, bias)
}

/// Classify which side of a strike is decaying.
///
/// Theta magnitude alone is not enough: the heavier-theta side must also be
/// losing value (change < 0) to count. When thetas are absent, negative
/// price changes on both legs are compared instead.
fn classify_strike(ce: &OptionSideQuote, pe: &OptionSideQuote) -> DecaySide {
    if ce.theta != 0.0 && pe.theta != 0.0 {
        if ce.theta.abs() > pe.theta.abs() && ce.change < 0.0 {
            DecaySide::Ce
        } else if pe.theta.abs() > ce.theta.abs() && pe.change < 0.0 {
            DecaySide::Pe
        } else {
            DecaySide::Both
        }
    } else if ce.theta == 0.0 && pe.theta == 0.0 && ce.change < 0.0 && pe.change < 0.0 {
        if ce.change.abs() > pe.change.abs() {
            DecaySide::Ce
        } else if pe.change.abs() > ce.change.abs() {
            DecaySide::Pe
        } else {
            DecaySide::Both
        }
    } else {
        DecaySide::Both
    }
}

/// Pick the nearest tradeable expiry from the fetched list. Past dates are
/// skipped; a same-day expiry only counts before the 15:30 close.
pub fn select_expiry(expiry_dates: &[String]) -> Result<&String> {
    if expiry_dates.is_empty() {
        return Err(anyhow!("No expiry dates found"));
    }

    let mut parsed: Vec<(NaiveDate, usize)> = Vec::new();
    for (idx, s) in expiry_dates.iter().enumerate() {
        let d = NaiveDate::parse_from_str(s, "%d-%b-%Y")
            .with_context(|| format!("Failed to parse expiry date: {}", s))?;
        parsed.push((d, idx));
    }
    parsed.sort_by_key(|(d, _)| *d);

    let now = Local::now();
    let today = now.date_naive();
    let cutoff = NaiveTime::from_hms_opt(15, 30, 0).unwrap();

    for (date, idx) in parsed {
        if date < today {
            continue;
        }
        if date == today && now.time() >= cutoff {
            continue;
        }
        return Ok(&expiry_dates[idx]);
    }

    Err(anyhow!("No valid expiry found (all past or after cutoff)"))
}

/// Count CE- vs PE-labeled rows. Ties (including the empty set) read as
/// both sides decaying.
fn aggregate_bias(rows: &[DecayRow]) -> MarketBias {
    let ce_count = rows.iter().filter(|r| r.decay_side == DecaySide::Ce).count();
    let pe_count = rows.iter().filter(|r| r.decay_side == DecaySide::Pe).count();

    if ce_count > pe_count {
        MarketBias::CeDecayActive
    } else if pe_count > ce_count {
        MarketBias::PeDecayActive
    } else {
        MarketBias::BothSidesDecay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(theta: f64, change: f64) -> OptionSideQuote {
        OptionSideQuote {
            theta,
            change,
            ..Default::default()
        }
    }

    fn record(strike: f64, ce: Option<OptionSideQuote>, pe: Option<OptionSideQuote>) -> OptionRecord {
        OptionRecord {
            strike_price: strike,
            expiry_date: "30-Dec-2025".to_string(),
            call: ce,
            put: pe,
        }
    }

    #[test]
    fn test_classify_heavier_ce_theta_needs_negative_change() {
        // |ce_theta| wins but CE is gaining value, so no CE label
        assert_eq!(classify_strike(&quote(-5.0, 2.0), &quote(-2.0, -1.0)), DecaySide::Both);
        assert_eq!(classify_strike(&quote(-5.0, -2.0), &quote(-2.0, 1.0)), DecaySide::Ce);
        assert_eq!(classify_strike(&quote(-1.0, 1.0), &quote(-6.0, -3.0)), DecaySide::Pe);
    }

    #[test]
    fn test_classify_zero_theta_fallback_compares_changes() {
        assert_eq!(classify_strike(&quote(0.0, -3.0), &quote(0.0, -1.0)), DecaySide::Ce);
        assert_eq!(classify_strike(&quote(0.0, -1.0), &quote(0.0, -3.0)), DecaySide::Pe);
        assert_eq!(classify_strike(&quote(0.0, -2.0), &quote(0.0, -2.0)), DecaySide::Both);
        // One change positive: fallback does not apply
        assert_eq!(classify_strike(&quote(0.0, -3.0), &quote(0.0, 1.0)), DecaySide::Both);
    }

    #[test]
    fn test_classify_mixed_zero_theta_defaults_to_both() {
        assert_eq!(classify_strike(&quote(0.0, -3.0), &quote(-2.0, -1.0)), DecaySide::Both);
    }

    #[test]
    fn test_window_filter_drops_far_strikes_and_single_leg_rows() {
        let data = vec![
            record(19400.0, Some(quote(-5.0, -2.0)), Some(quote(-2.0, 1.0))),
            // Outside the ±150 window
            record(19700.0, Some(quote(-9.0, -4.0)), Some(quote(-1.0, -1.0))),
            // PE leg missing
            record(19500.0, Some(quote(-3.0, -1.0)), None),
        ];

        let (rows, _) = detect_decay(&data, 19450.0, 150.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].strike_price, 19400.0);
        assert!(rows.iter().all(|r| (r.strike_price - 19450.0).abs() <= 150.0));
    }

    #[test]
    fn test_rows_sorted_by_strike() {
        let data = vec![
            record(19500.0, Some(quote(-1.0, 1.0)), Some(quote(-6.0, -3.0))),
            record(19350.0, Some(quote(-5.0, -2.0)), Some(quote(-2.0, 1.0))),
            record(19450.0, Some(quote(-4.0, -1.0)), Some(quote(-4.0, -1.0))),
        ];

        let (rows, _) = detect_decay(&data, 19450.0, 150.0);
        let strikes: Vec<f64> = rows.iter().map(|r| r.strike_price).collect();
        assert_eq!(strikes, vec![19350.0, 19450.0, 19500.0]);
    }

    #[test]
    fn test_aggregate_tie_reads_as_both_sides() {
        let data = vec![
            record(19400.0, Some(quote(-5.0, -2.0)), Some(quote(-2.0, 1.0))),
            record(19500.0, Some(quote(-1.0, 1.0)), Some(quote(-6.0, -3.0))),
        ];

        let (rows, bias) = detect_decay(&data, 19450.0, 150.0);
        assert_eq!(rows[0].decay_side, DecaySide::Ce);
        assert_eq!(rows[1].decay_side, DecaySide::Pe);
        assert_eq!(bias, MarketBias::BothSidesDecay);
    }

    #[test]
    fn test_empty_window_yields_both_sides_decay() {
        let (rows, bias) = detect_decay(&[], 19450.0, 150.0);
        assert!(rows.is_empty());
        assert_eq!(bias, MarketBias::BothSidesDecay);
    }

    #[test]
    fn test_select_expiry_skips_past_dates() {
        let yesterday = Local::now().date_naive() - chrono::Duration::days(1);
        let tomorrow = Local::now().date_naive() + chrono::Duration::days(1);
        let next_week = Local::now().date_naive() + chrono::Duration::days(7);

        let dates = vec![
            next_week.format("%d-%b-%Y").to_string(),
            yesterday.format("%d-%b-%Y").to_string(),
            tomorrow.format("%d-%b-%Y").to_string(),
        ];

        assert_eq!(select_expiry(&dates).unwrap(), &dates[2]);

        let only_past = vec![yesterday.format("%d-%b-%Y").to_string()];
        assert!(select_expiry(&only_past).is_err());
        assert!(select_expiry(&[]).is_err());
    }

    #[test]
    fn test_select_expiry_rejects_unparseable_dates() {
        let dates = vec!["2025-12-30".to_string()];
        assert!(select_expiry(&dates).is_err());
    }

    #[test]
    fn test_filter_by_expiry() {
        let mut near = record(19400.0, Some(quote(-5.0, -2.0)), Some(quote(-2.0, 1.0)));
        near.expiry_date = "30-Dec-2025".to_string();
        let mut far = record(19400.0, Some(quote(-1.0, -1.0)), Some(quote(-1.0, -1.0)));
        far.expiry_date = "06-Jan-2026".to_string();

        let filtered = filter_by_expiry(&[near, far], "30-Dec-2025");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].expiry_date, "30-Dec-2025");
    }
}
