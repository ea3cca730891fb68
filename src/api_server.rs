use crate::config;
use crate::models::MarketIndex;
use crate::nse_client::NSEClient;
use crate::processor::{self, DecayRow, MarketBias};
use crate::rules::{self, Recommendation};
use crate::session::SnapshotCache;
use crate::signals::{Candle, Signal, SupportResistance, hammer_signal};
use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub index: String,
}

#[derive(Debug, Deserialize)]
pub struct DecayQuery {
    pub index: String,
    pub expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HammerRequest {
    pub candle: Candle,
    pub support: f64,
    pub resistance: f64,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, start: Instant) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }

    fn err(error: impl ToString, start: Instant) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexInfo {
    pub name: &'static str,
    pub symbol: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ExpiriesResponse {
    pub symbol: String,
    pub expiry_dates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DecayResponse {
    pub symbol: String,
    pub timestamp: String,
    pub underlying_value: f64,
    pub expiry: String,
    pub rows: Vec<DecayRow>,
    pub bias: MarketBias,
    pub recommendation: Recommendation,
}

#[derive(Debug, Serialize)]
pub struct HammerResponse {
    pub signal: Signal,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub symbol: String,
    pub timestamp: String,
    pub underlying_value: f64,
    pub strikes: usize,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    client: Arc<NSEClient>,
    cache: Arc<RwLock<SnapshotCache>>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Arc::new(NSEClient::new()?),
            cache: Arc::new(RwLock::new(SnapshotCache::new())),
        })
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/indices - The fixed index table
async fn get_indices() -> Json<ApiResponse<Vec<IndexInfo>>> {
    let start = Instant::now();
    let indices = MarketIndex::ALL
        .iter()
        .map(|idx| IndexInfo {
            name: idx.display_name(),
            symbol: idx.symbol(),
        })
        .collect();

    Json(ApiResponse::ok(indices, start))
}

/// GET /api/expiries?index=Nifty - Expiry list for an index
async fn get_expiries(
    Query(query): Query<IndexQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<ExpiriesResponse>>, StatusCode> {
    let start = Instant::now();

    let Some(index) = MarketIndex::parse(&query.index) else {
        return Ok(Json(ApiResponse::err(
            format!("Unknown index: {}", query.index),
            start,
        )));
    };

    match app_state.client.fetch_chain_cached(index, &app_state.cache).await {
        Ok(chain) => Ok(Json(ApiResponse::ok(
            ExpiriesResponse {
                symbol: index.symbol().to_string(),
                expiry_dates: chain.records.expiry_dates,
            },
            start,
        ))),
        Err(e) => Ok(Json(ApiResponse::err(e, start))),
    }
}

/// GET /api/decay?index=Nifty&expiry=30-Dec-2025 - Decay analysis for one expiry
async fn get_decay(
    Query(query): Query<DecayQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<DecayResponse>>, StatusCode> {
    let start = Instant::now();

    let Some(index) = MarketIndex::parse(&query.index) else {
        return Ok(Json(ApiResponse::err(
            format!("Unknown index: {}", query.index),
            start,
        )));
    };

    let chain = match app_state.client.fetch_chain_cached(index, &app_state.cache).await {
        Ok(chain) => chain,
        Err(e) => return Ok(Json(ApiResponse::err(e, start))),
    };

    // Analysis runs over the selected expiry only; default to the nearest
    // tradeable one
    let expiry = match query.expiry {
        Some(expiry) => expiry,
        None => match processor::select_expiry(&chain.records.expiry_dates) {
            Ok(expiry) => expiry.clone(),
            Err(e) => return Ok(Json(ApiResponse::err(e, start))),
        },
    };

    let filtered = processor::filter_by_expiry(&chain.records.data, &expiry);
    let (rows, bias) = processor::detect_decay(
        &filtered,
        chain.records.underlying_value,
        config::DEFAULT_DECAY_WINDOW,
    );

    Ok(Json(ApiResponse::ok(
        DecayResponse {
            symbol: index.symbol().to_string(),
            timestamp: chain.records.timestamp,
            underlying_value: chain.records.underlying_value,
            expiry,
            rows,
            bias,
            recommendation: rules::recommend(bias),
        },
        start,
    )))
}

/// POST /api/hammer - Evaluate one candle against support/resistance
async fn post_hammer(Json(req): Json<HammerRequest>) -> Json<ApiResponse<HammerResponse>> {
    let start = Instant::now();

    let levels = SupportResistance {
        support: req.support,
        resistance: req.resistance,
    };
    let signal = hammer_signal(&req.candle, &levels);

    Json(ApiResponse::ok(
        HammerResponse {
            signal,
            label: signal.label(),
        },
        start,
    ))
}

/// POST /api/refresh?index=Nifty - Drop the cached snapshot and refetch
async fn post_refresh(
    Query(query): Query<IndexQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<RefreshResponse>>, StatusCode> {
    let start = Instant::now();

    let Some(index) = MarketIndex::parse(&query.index) else {
        return Ok(Json(ApiResponse::err(
            format!("Unknown index: {}", query.index),
            start,
        )));
    };

    {
        let mut cache = app_state.cache.write().await;
        cache.invalidate(index.symbol());
    }

    match app_state.client.fetch_chain_cached(index, &app_state.cache).await {
        Ok(chain) => Ok(Json(ApiResponse::ok(
            RefreshResponse {
                symbol: index.symbol().to_string(),
                timestamp: chain.records.timestamp,
                underlying_value: chain.records.underlying_value,
                strikes: chain.records.data.len(),
            },
            start,
        ))),
        Err(e) => Ok(Json(ApiResponse::err(e, start))),
    }
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub async fn start_server(port: u16) -> Result<()> {
    let app_state = AppState::new()?;

    let app = Router::new()
        .route("/api/indices", get(get_indices))
        .route("/api/expiries", get(get_expiries))
        .route("/api/decay", get(get_decay))
        .route("/api/hammer", post(post_hammer))
        .route("/api/refresh", post(post_refresh))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Decay monitor API running on http://{}", addr);
    println!("Available endpoints:");
    println!("   GET  /api/indices");
    println!("   GET  /api/expiries?index=Nifty");
    println!("   GET  /api/decay?index=Nifty&expiry=30-Dec-2025");
    println!("   POST /api/hammer");
    println!("   POST /api/refresh?index=Nifty");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
