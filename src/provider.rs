//! Provider abstraction for fetching market listings from external APIs

use crate::{error::ProviderError, types::MarketRecord};
use async_trait::async_trait;

/// Trait for market data providers
///
/// Implementations return the fixed top-N market listing in one request.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the market listing
    ///
    /// # Returns
    /// All records of the response, or an error if the request or decoding fails.
    /// The response is all-or-nothing: no partial lists are returned.
    async fn fetch_markets(&self) -> Result<Vec<MarketRecord>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
