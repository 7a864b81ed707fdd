//! # Crypto Market Table
//!
//! A searchable, sortable table of the top cryptocurrency markets, loaded once
//! from CoinGecko when the table is mounted.
//!
//! ## Usage
//!
//! ```no_run
//! use crypto_market_table::{CryptoTable, LoadState, RenderOptions, SortField};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let table = CryptoTable::coingecko()?;
//! table.initialize().await?;
//!
//! if let LoadState::Failed { reason, .. } = table.load_state().await {
//!     eprintln!("No data: {}", reason);
//! }
//!
//! table.set_search("coin").await?;
//! table.sort_by(SortField::PriceChangePercentage24h).await?;
//! for row in table.rows().await {
//!     println!("{} {} {}", row.name, row.price, row.change.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! CryptoTable::initialize()   (once, cancellable)
//!     ↓
//! MarketDataProvider (CoinGecko /coins/markets)
//!     ↓
//! ViewState: LoadState + search + sort directive
//!     ↓
//! pipeline: sort (memoized) → name filter
//!     ↓
//! render: rows → HTML / text
//! ```

pub mod constants;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod render;
pub mod store;
pub mod table;
pub mod types;

// Re-export commonly used types
pub use error::{ProviderError, TableError};
pub use provider::MarketDataProvider;
pub use render::{ChangeTone, RenderOptions, TableRow};
pub use table::CryptoTable;
pub use types::{
    ComponentHealth, HealthStatus, LoadState, MarketRecord, SortDirection, SortDirective,
    SortField, TableEvent,
};
