//! Constants for the crypto market table
//!
//! All configuration for the table is centralized here.
//! No runtime configuration is used - the component operates
//! with these compile-time constants.

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API endpoint for market listings
pub const COINGECKO_MARKETS_ENDPOINT: &str = "/coins/markets";

/// Quote currency for prices and volumes
pub const VS_CURRENCY: &str = "usd";

/// Ordering requested from the provider
pub const MARKET_ORDER: &str = "market_cap_desc";

/// Number of records fetched (top N by market cap)
pub const PAGE_SIZE: u32 = 10;

/// Page requested; only the first page is ever fetched
pub const PAGE: u32 = 1;

/// Whether sparkline data is requested
pub const SPARKLINE: bool = false;

/// HTTP request timeout when fetching markets (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "crypto-market-table/0.1.0";

/// Prefix for price and volume cells
pub const CURRENCY_PREFIX: &str = "$";

/// Suffix for the 24h change cell
pub const PERCENT_SUFFIX: &str = "%";

/// Placeholder text of the search input
pub const SEARCH_PLACEHOLDER: &str = "Search by name";

/// Buffered table events per subscriber before lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
