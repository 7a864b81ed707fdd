//! Types for the crypto market table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of market data as returned by the provider
///
/// Field names match the provider's JSON keys. Keys not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Provider identifier, unique within one fetch
    pub id: String,

    /// Display name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// Thumbnail image URL
    pub image: String,

    /// Current price in the quote currency
    pub current_price: f64,

    /// Total trade volume in the quote currency
    pub total_volume: f64,

    /// Market capitalization
    #[serde(default)]
    pub market_cap: Option<f64>,

    /// 24h price change percentage
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl MarketRecord {
    /// Returns the value of a sortable field, `None` when the provider left it out
    pub fn sort_value(&self, field: SortField) -> Option<f64> {
        match field {
            SortField::CurrentPrice => Some(self.current_price),
            SortField::TotalVolume => Some(self.total_volume),
            SortField::MarketCap => self.market_cap,
            SortField::PriceChangePercentage24h => self.price_change_percentage_24h,
        }
    }
}

/// Fields the table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Current price
    CurrentPrice,
    /// Total volume
    TotalVolume,
    /// Market capitalization
    MarketCap,
    /// 24h price change percentage
    #[serde(rename = "price_change_percentage_24h")]
    PriceChangePercentage24h,
}

impl SortField {
    /// Get the provider key for this field
    pub fn key(&self) -> &'static str {
        match self {
            SortField::CurrentPrice => "current_price",
            SortField::TotalVolume => "total_volume",
            SortField::MarketCap => "market_cap",
            SortField::PriceChangePercentage24h => "price_change_percentage_24h",
        }
    }

    /// Get the label of the sort button for this field
    pub fn button_label(&self) -> &'static str {
        match self {
            SortField::CurrentPrice => "Sort by Price",
            SortField::TotalVolume => "Sort by Volume",
            SortField::MarketCap => "Sort by Market Cap",
            SortField::PriceChangePercentage24h => "Sort by percentage",
        }
    }

    /// Fields that get a sort button in the rendered markup
    pub fn with_buttons() -> &'static [SortField] {
        &[SortField::MarketCap, SortField::PriceChangePercentage24h]
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The currently active sort field and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDirective {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortDirective {
    /// Creates a directive for `field` in `direction`
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Ascending directive for `field`
    pub fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    /// Descending directive for `field`
    pub fn descending(field: SortField) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Load state of the table's raw data
///
/// Keeps "nothing fetched yet", "fetch failed" and "zero results" apart.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// No response has arrived yet
    NotLoaded,

    /// A response was received
    Loaded {
        records: Vec<MarketRecord>,
        fetched_at: DateTime<Utc>,
    },

    /// The fetch failed before any data was loaded
    Failed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl LoadState {
    /// Raw records, empty unless loaded
    pub fn records(&self) -> &[MarketRecord] {
        match self {
            LoadState::Loaded { records, .. } => records,
            _ => &[],
        }
    }

    /// True once a response has been stored
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded { .. })
    }

    /// Short name of the state, used in logs and health details
    pub fn name(&self) -> &'static str {
        match self {
            LoadState::NotLoaded => "not_loaded",
            LoadState::Loaded { .. } => "loaded",
            LoadState::Failed { .. } => "failed",
        }
    }
}

/// Table events, broadcast to hosts so they know when to re-render
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableEvent {
    /// Raw data was replaced by a fetch result
    DataLoaded {
        id: Uuid,
        provider: String,
        record_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The fetch failed
    LoadFailed {
        id: Uuid,
        provider: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// Search term changed
    SearchChanged {
        id: Uuid,
        term: String,
        timestamp: DateTime<Utc>,
    },

    /// Sort directive changed
    SortChanged {
        id: Uuid,
        directive: Option<SortDirective>,
        timestamp: DateTime<Utc>,
    },

    /// The table was torn down
    TornDown { id: Uuid, timestamp: DateTime<Utc> },
}

impl TableEvent {
    /// Creates a DataLoaded event
    pub fn data_loaded(provider: &str, record_count: usize) -> Self {
        Self::DataLoaded {
            id: Uuid::new_v4(),
            provider: provider.to_string(),
            record_count,
            timestamp: Utc::now(),
        }
    }

    /// Creates a LoadFailed event
    pub fn load_failed(provider: &str, error_message: impl Into<String>) -> Self {
        Self::LoadFailed {
            id: Uuid::new_v4(),
            provider: provider.to_string(),
            error_message: error_message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a SearchChanged event
    pub fn search_changed(term: &str) -> Self {
        Self::SearchChanged {
            id: Uuid::new_v4(),
            term: term.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a SortChanged event
    pub fn sort_changed(directive: Option<SortDirective>) -> Self {
        Self::SortChanged {
            id: Uuid::new_v4(),
            directive,
            timestamp: Utc::now(),
        }
    }

    /// Creates a TornDown event
    pub fn torn_down() -> Self {
        Self::TornDown {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            TableEvent::DataLoaded { id, .. }
            | TableEvent::LoadFailed { id, .. }
            | TableEvent::SearchChanged { id, .. }
            | TableEvent::SortChanged { id, .. }
            | TableEvent::TornDown { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            TableEvent::DataLoaded { .. } => "DATA_LOADED",
            TableEvent::LoadFailed { .. } => "LOAD_FAILED",
            TableEvent::SearchChanged { .. } => "SEARCH_CHANGED",
            TableEvent::SortChanged { .. } => "SORT_CHANGED",
            TableEvent::TornDown { .. } => "TORN_DOWN",
        }
    }
}

impl std::fmt::Display for TableEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableEvent::DataLoaded {
                provider,
                record_count,
                ..
            } => write!(f, "Loaded {} records from {}", record_count, provider),
            TableEvent::LoadFailed {
                provider,
                error_message,
                ..
            } => write!(f, "Load from {} failed: {}", provider, error_message),
            TableEvent::SearchChanged { term, .. } => write!(f, "Search term: {:?}", term),
            TableEvent::SortChanged { directive, .. } => match directive {
                Some(d) => write!(f, "Sorted by {} ({:?})", d.field.key(), d.direction),
                None => write!(f, "Sort cleared"),
            },
            TableEvent::TornDown { .. } => write!(f, "Table torn down"),
        }
    }
}

/// Overall component health status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Data is loaded
    Healthy,
    /// No data has arrived yet
    Degraded,
    /// The fetch failed or the table was torn down
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}
