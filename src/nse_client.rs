use crate::config;
use crate::models::{MarketIndex, OptionChain};
use crate::session::{self, SnapshotCache};
use anyhow::{Context, Result};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct NSEClient {
    client: Client,
    warmed_up: Arc<RwLock<bool>>,
}

impl NSEClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            warmed_up: Arc::new(RwLock::new(false)),
        })
    }

    /// Warmup NSE session (only once per client)
    async fn warmup_if_needed(&self) -> Result<()> {
        if *self.warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            let _ = self
                .client
                .get(config::NSE_BASE_URL)
                .header("Accept", config::HEADER_ACCEPT_HTML)
                .send()
                .await
                .context("Failed to warm up NSE session")?;

            tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
            *warmed = true;
        }

        Ok(())
    }

    /// Generic retry fetch with better error handling
    async fn fetch_json(&self, url: &str) -> Result<String> {
        self.warmup_if_needed().await?;

        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .get(url)
                .header("Referer", config::HEADER_REFERER)
                .header("X-Requested-With", config::HEADER_X_REQUESTED_WITH)
                .send()
                .await
                .context("Request send failed")?;

            let status = res.status();

            if status.is_success() {
                let text = res.text().await.context("Failed to read body")?;

                // Validate JSON
                let trimmed = text.trim();
                if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                    let preview: String = text.chars().take(200).collect();
                    anyhow::bail!("Non-JSON response: {}", preview);
                }

                Ok(text)
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                // Retry on server errors and rate limits
                warn!(%status, url, "retryable upstream error");
                anyhow::bail!("Retryable error: {}", status)
            } else {
                // Fail fast on client errors
                let body = res.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                anyhow::bail!("Client error {}: {}", status, preview)
            }
        })
        .await
    }

    // -----------------------------------------------
    // FETCH OPTION CHAIN
    // -----------------------------------------------
    pub async fn fetch_option_chain(&self, index: MarketIndex) -> Result<OptionChain> {
        let url = config::nse_option_chain_url(index.symbol());
        let text = self.fetch_json(&url).await?;
        let chain: OptionChain =
            serde_json::from_str(&text).context("Failed to parse option chain")?;

        debug!(
            symbol = index.symbol(),
            strikes = chain.records.data.len(),
            underlying = chain.records.underlying_value,
            "fetched option chain"
        );
        Ok(chain)
    }

    // -----------------------------------------------
    // CACHED FETCH (TIME-BUCKETED)
    // -----------------------------------------------
    /// Fetch through the snapshot cache. A hit in the current time bucket
    /// skips the network round trip entirely.
    pub async fn fetch_chain_cached(
        &self,
        index: MarketIndex,
        cache: &RwLock<SnapshotCache>,
    ) -> Result<OptionChain> {
        let bucket = session::current_bucket();
        let symbol = index.symbol();

        {
            let cache = cache.read().await;
            if let Some(chain) = cache.get(symbol, bucket) {
                debug!(symbol, bucket, "snapshot cache hit");
                return Ok(chain.clone());
            }
        }

        let chain = self.fetch_option_chain(index).await?;

        {
            let mut cache = cache.write().await;
            cache.insert(symbol, bucket, chain.clone());
        }

        Ok(chain)
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    // Rotating Accept-Language headers (fingerprint avoidance)
    let lang = config::ACCEPT_LANGUAGES.choose(&mut thread_rng()).unwrap();
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Ok(Client::builder()
        .default_headers(headers)
        .cookie_store(true) // crucial for NSE
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?)
}
