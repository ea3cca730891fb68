use anyhow::{Context, Result, bail};
use colored::Colorize;
use nse_decay_monitor::models::{MarketIndex, OptionChain};
use nse_decay_monitor::nse_client::NSEClient;
use nse_decay_monitor::processor::{self, DecayRow, DecaySide, MarketBias};
use nse_decay_monitor::session::{SessionState, SnapshotCache};
use nse_decay_monitor::signals::{Candle, SupportResistance, hammer_signal};
use nse_decay_monitor::{api_server, config, logging, rules};
use std::time::Duration;
use tokio::sync::RwLock;

/// One fetch, one render, exit
async fn run_single(index: MarketIndex) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "NSE Option Decay Monitor".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let client = NSEClient::new()?;

    println!(
        "{} Fetching option chain for {}...",
        "→".cyan(),
        index.display_name().yellow()
    );
    let chain = client.fetch_option_chain(index).await?;

    let expiry = match config::get_expiry() {
        Some(expiry) => expiry,
        None => processor::select_expiry(&chain.records.expiry_dates)?.clone(),
    };

    render_dashboard(index, &chain, &expiry);
    Ok(())
}

/// Polling dashboard loop. A failed poll keeps the previous snapshot on
/// screen until the next cycle.
async fn run_watch(index: MarketIndex) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "NSE Option Decay Monitor (watch)".green().bold());
    println!("{}", "=".repeat(60).blue());

    let mut session = SessionState::new(index);
    session.set_auto_refresh(config::get_auto_refresh());
    session.set_refresh_interval(config::get_refresh_secs());
    if let Some(expiry) = config::get_expiry() {
        session.select_expiry(expiry);
    }

    println!(
        "{} Index: {}  Refresh: every {}s",
        "ℹ".blue(),
        index.display_name().yellow(),
        session.refresh_interval().as_secs()
    );
    println!();

    let client = NSEClient::new()?;
    let cache = RwLock::new(SnapshotCache::new());

    loop {
        if session.refresh_due() {
            match client.fetch_chain_cached(index, &cache).await {
                Ok(chain) => {
                    session.record_snapshot(chain);
                    let expiry = session
                        .selected_expiry()
                        .map(str::to_string)
                        .unwrap_or_default();
                    if let Some(chain) = session.snapshot() {
                        render_dashboard(index, chain, &expiry);
                    }
                }
                Err(e) => {
                    session.record_attempt();
                    println!("{} Fetch failed: {}", "⚠".yellow(), e);
                    match session.snapshot() {
                        Some(_) => {
                            println!("{} Showing last good snapshot", "ℹ".blue());
                        }
                        None => {
                            println!(
                                "{} No data yet, waiting for the next poll",
                                "ℹ".blue()
                            );
                        }
                    }
                }
            }
        }

        if !session.auto_refresh() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Ok(())
}

/// Evaluate one candle from the environment and print the signal
fn run_hammer() -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Hammer Signal Check".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let candle = Candle {
        open: env_f64("NSE_OPEN")?,
        high: env_f64("NSE_HIGH")?,
        low: env_f64("NSE_LOW")?,
        close: env_f64("NSE_CLOSE")?,
        volume: None,
    };

    // Levels default to the candle's own extremes (single-row window)
    let defaults = SupportResistance::from_candle(&candle);
    let levels = SupportResistance {
        support: env_f64("NSE_SUPPORT").unwrap_or(defaults.support),
        resistance: env_f64("NSE_RESISTANCE").unwrap_or(defaults.resistance),
    };

    let signal = hammer_signal(&candle, &levels);

    println!(
        "{} Candle: O {:.2}  H {:.2}  L {:.2}  C {:.2}",
        "→".cyan(),
        candle.open,
        candle.high,
        candle.low,
        candle.close
    );
    println!(
        "{} Support: {:.2}  Resistance: {:.2}",
        "→".cyan(),
        levels.support,
        levels.resistance
    );
    println!();
    println!("{} Signal: {}", "✓".green(), signal.label().bold());

    Ok(())
}

fn env_f64(name: &str) -> Result<f64> {
    std::env::var(name)
        .with_context(|| format!("{} not set", name))?
        .parse::<f64>()
        .with_context(|| format!("{} is not a number", name))
}

/// Render the decay table and recommendations for one snapshot
fn render_dashboard(index: MarketIndex, chain: &OptionChain, expiry: &str) {
    let underlying = chain.records.underlying_value;
    let filtered = processor::filter_by_expiry(&chain.records.data, expiry);
    let (rows, bias) = processor::detect_decay(&filtered, underlying, config::DEFAULT_DECAY_WINDOW);

    println!();
    println!("{}", "=".repeat(60).blue());
    println!(
        "{} {}  |  {}  |  Expiry: {}",
        index.display_name().cyan().bold(),
        format!("{:.2}", underlying).yellow(),
        chain.records.timestamp,
        expiry.yellow()
    );
    println!("{}", "=".repeat(60).blue());

    if rows.is_empty() {
        println!("{} No strikes in the decay window", "ℹ".blue());
    } else {
        println!(
            "{:>10}  {:>9} {:>9}  {:>8} {:>8}  {}",
            "Strike", "CE Theta", "PE Theta", "CE Chg", "PE Chg", "Decay"
        );
        for row in &rows {
            println!("{}", format_row(row));
        }
    }

    println!();
    let rec = rules::recommend(bias);
    let bias_label = match bias {
        MarketBias::CeDecayActive => bias.label().red().bold(),
        MarketBias::PeDecayActive => bias.label().green().bold(),
        MarketBias::BothSidesDecay => bias.label().yellow().bold(),
    };
    println!("{} Market Bias: {} ({})", "✓".green(), bias_label, rec.outlook);
    println!("{} Recommended strategies:", "ℹ".blue());
    for strategy in rec.strategies {
        println!("   • {}", strategy);
    }
    println!();
}

fn format_row(row: &DecayRow) -> String {
    let side = match row.decay_side {
        DecaySide::Ce => "CE".red().to_string(),
        DecaySide::Pe => "PE".green().to_string(),
        DecaySide::Both => "Both".yellow().to_string(),
    };
    format!(
        "{:>10.2}  {:>9.2} {:>9.2}  {:>8.2} {:>8.2}  {}",
        row.strike_price, row.ce_theta, row.pe_theta, row.ce_change, row.pe_change, side
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let mode = config::get_execution_mode();
    let index_name = config::get_index_name();
    let Some(index) = MarketIndex::parse(&index_name) else {
        bail!(
            "Unknown index '{}'. Use Nifty, Bank Nifty, or Sensex",
            index_name
        );
    };

    match mode.as_str() {
        "single" => run_single(index).await?,
        "watch" => run_watch(index).await?,
        "server" => api_server::start_server(config::get_port()).await?,
        "hammer" => run_hammer()?,
        _ => {
            eprintln!("Invalid mode '{}'. Use 'single', 'watch', 'server', or 'hammer'", mode);
            eprintln!("Set NSE_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  NSE_MODE=single NSE_INDEX=Nifty cargo run");
            eprintln!("  NSE_MODE=watch NSE_INDEX='Bank Nifty' NSE_REFRESH=60 cargo run");
            eprintln!("  NSE_MODE=server NSE_PORT=3001 cargo run");
            eprintln!("  NSE_MODE=hammer NSE_OPEN=19500 NSE_HIGH=19600 NSE_LOW=19400 NSE_CLOSE=19520 cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}
