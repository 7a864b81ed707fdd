//! CoinGecko market data provider implementation

use crate::{
    constants::{
        COINGECKO_API_URL, COINGECKO_MARKETS_ENDPOINT, MARKET_ORDER, PAGE, PAGE_SIZE,
        REQUEST_TIMEOUT_SECS, SPARKLINE, USER_AGENT, VS_CURRENCY,
    },
    error::ProviderError,
    provider::MarketDataProvider,
    types::MarketRecord,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

/// CoinGecko market data provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider against the public API
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(COINGECKO_API_URL)
    }

    /// Creates a provider against another base URL (mirrors, local mock servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds the CoinGecko markets URL with the fixed query
    pub fn build_url(&self) -> String {
        format!(
            "{}{}?vs_currency={}&order={}&per_page={}&page={}&sparkline={}",
            self.base_url,
            COINGECKO_MARKETS_ENDPOINT,
            VS_CURRENCY,
            MARKET_ORDER,
            PAGE_SIZE,
            PAGE,
            SPARKLINE
        )
    }

    /// Parses a markets response body
    fn parse_response(body: &str) -> Result<Vec<MarketRecord>, ProviderError> {
        serde_json::from_str(body).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse CoinGecko response: {}. Response: {}",
                e, body
            ))
        })
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_markets(&self) -> Result<Vec<MarketRecord>, ProviderError> {
        let url = self.build_url();
        let start = Instant::now();
        tracing::debug!(url = %url, "Fetching markets from CoinGecko");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded);
        }

        if !status.is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(ProviderError::from_transport)?;
        let records = Self::parse_response(&body)?;

        tracing::debug!(
            count = records.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Successfully fetched markets from CoinGecko"
        );

        Ok(records)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn markets_body() -> serde_json::Value {
        json!([
            {
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "image": "https://example.com/btc.png",
                "current_price": 50000,
                "market_cap": 980000000000u64,
                "total_volume": 31000000000u64,
                "price_change_percentage_24h": 2.5
            },
            {
                "id": "ethereum",
                "symbol": "eth",
                "name": "Ether",
                "image": "https://example.com/eth.png",
                "current_price": 3000,
                "market_cap": 360000000000u64,
                "total_volume": 15000000000u64,
                "price_change_percentage_24h": null
            }
        ])
    }

    #[test]
    fn test_build_url() {
        let provider = CoinGeckoProvider::with_base_url("http://localhost:1234/").unwrap();
        assert_eq!(
            provider.build_url(),
            "http://localhost:1234/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=10&page=1&sparkline=false"
        );

        let public = CoinGeckoProvider::new().unwrap();
        assert!(public.build_url().starts_with(COINGECKO_API_URL));
    }

    #[tokio::test]
    async fn test_fetch_markets_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .and(query_param("vs_currency", "usd"))
            .and(query_param("order", "market_cap_desc"))
            .and(query_param("per_page", "10"))
            .and(query_param("page", "1"))
            .and(query_param("sparkline", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri()).unwrap();
        let records = provider.fetch_markets().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Bitcoin");
        assert_eq!(records[0].current_price, 50000.0);
        assert_eq!(records[1].price_change_percentage_24h, None);
    }

    #[tokio::test]
    async fn test_fetch_markets_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri()).unwrap();
        let err = provider.fetch_markets().await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimitExceeded));
    }

    #[tokio::test]
    async fn test_fetch_markets_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri()).unwrap();
        match provider.fetch_markets().await {
            Err(ProviderError::ApiError(msg)) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("maintenance"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_markets_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri()).unwrap();
        let err = provider.fetch_markets().await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_markets_connection_refused() {
        // Nothing listens on port 9 of localhost in the test environment
        let provider = CoinGeckoProvider::with_base_url("http://127.0.0.1:9").unwrap();
        let err = provider.fetch_markets().await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::NetworkError(_) | ProviderError::Timeout
        ));
    }
}
