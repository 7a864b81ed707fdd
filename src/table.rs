//! The crypto market table component
//!
//! Owns the view state, performs the single fetch-on-mount and hands out
//! rendered projections.

use crate::{
    constants::EVENT_CHANNEL_CAPACITY,
    error::{ProviderError, TableError},
    provider::MarketDataProvider,
    providers::CoinGeckoProvider,
    render::{self, RenderOptions, TableRow},
    store::ViewState,
    types::{
        ComponentHealth, HealthStatus, LoadState, MarketRecord, SortDirective, SortField,
        TableEvent,
    },
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Searchable, sortable market table
///
/// # Example
/// ```no_run
/// use crypto_market_table::{CryptoTable, RenderOptions, SortField};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let table = CryptoTable::coingecko()?;
/// table.initialize().await?;
///
/// table.set_search("eth").await?;
/// table.sort_by(SortField::MarketCap).await?;
/// print!("{}", table.render_text(&RenderOptions::default()).await);
/// # Ok(())
/// # }
/// ```
pub struct CryptoTable {
    provider: Arc<dyn MarketDataProvider>,
    state: RwLock<ViewState>,
    events: broadcast::Sender<TableEvent>,
    cancel: CancellationToken,
    initialized: AtomicBool,
}

impl CryptoTable {
    /// Creates a table over a custom provider
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            provider,
            state: RwLock::new(ViewState::new()),
            events,
            cancel: CancellationToken::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Creates a table backed by the public CoinGecko API
    pub fn coingecko() -> Result<Self, ProviderError> {
        Ok(Self::new(Arc::new(CoinGeckoProvider::new()?)))
    }

    fn emit(&self, event: TableEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn ensure_live(&self) -> Result<(), TableError> {
        if self.cancel.is_cancelled() {
            Err(TableError::TornDown)
        } else {
            Ok(())
        }
    }

    /// Performs the mount-time fetch
    ///
    /// Only the first call fetches; later calls return `AlreadyInitialized`.
    /// A failed fetch is logged and stored as [`LoadState::Failed`], it is not
    /// returned as an error. If the table is torn down while the request is in
    /// flight, the response is dropped.
    pub async fn initialize(&self) -> Result<(), TableError> {
        self.ensure_live()?;
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(TableError::AlreadyInitialized);
        }

        let provider = self.provider.provider_name();
        let start = Instant::now();
        tracing::debug!(provider, "Loading market data");

        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!(provider, "Table torn down before market data arrived");
                return Ok(());
            }
            result = self.provider.fetch_markets() => result,
        };

        let mut state = self.state.write().await;
        if self.cancel.is_cancelled() {
            tracing::debug!(provider, "Discarding market data for torn down table");
            return Ok(());
        }

        match result {
            Ok(records) => {
                let count = records.len();
                state.replace_records(records);
                tracing::info!(
                    provider,
                    count,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Market data loaded"
                );
                self.emit(TableEvent::data_loaded(provider, count));
            }
            Err(e) => {
                tracing::error!(provider, error = %e, "Error fetching market data");
                if state.mark_failed(e.to_string()) {
                    self.emit(TableEvent::load_failed(provider, e.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Runs [`initialize`](Self::initialize) on the tokio runtime without waiting for it
    pub fn spawn_initialize(self: &Arc<Self>) -> JoinHandle<()> {
        let table = self.clone();
        tokio::spawn(async move {
            if let Err(e) = table.initialize().await {
                tracing::warn!(error = %e, "Skipped market data load");
            }
        })
    }

    /// Sets the search term applied to display names
    pub async fn set_search(&self, term: &str) -> Result<(), TableError> {
        self.ensure_live()?;
        self.state.write().await.set_search(term);
        self.emit(TableEvent::search_changed(term));
        Ok(())
    }

    /// Handles a click on the sort control for `field`
    ///
    /// # Returns
    /// The directive now in effect
    pub async fn sort_by(&self, field: SortField) -> Result<SortDirective, TableError> {
        self.ensure_live()?;
        let directive = self.state.write().await.click_sort(field);
        tracing::debug!(field = field.key(), direction = ?directive.direction, "Sort changed");
        self.emit(TableEvent::sort_changed(Some(directive)));
        Ok(directive)
    }

    /// Drops the sort directive; rows go back to provider order
    pub async fn clear_sort(&self) -> Result<(), TableError> {
        self.ensure_live()?;
        self.state.write().await.set_directive(None);
        self.emit(TableEvent::sort_changed(None));
        Ok(())
    }

    /// Sorted then filtered records
    pub async fn projection(&self) -> Vec<MarketRecord> {
        self.state.read().await.projection()
    }

    /// Rows for the current projection
    pub async fn rows(&self) -> Vec<TableRow> {
        render::rows(&self.projection().await)
    }

    /// Renders the whole component as HTML
    pub async fn render_html(&self, options: &RenderOptions) -> String {
        let state = self.state.read().await;
        let rows = render::rows(&state.projection());
        render::render_html(&rows, state.search(), state.directive(), options)
    }

    /// Renders the current rows as a plain-text table
    pub async fn render_text(&self, options: &RenderOptions) -> String {
        render::render_text(&self.rows().await, options)
    }

    /// Returns a snapshot of the load state
    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load_state().clone()
    }

    /// Returns the current search term as typed
    pub async fn search(&self) -> String {
        self.state.read().await.search().to_string()
    }

    /// Returns the active sort directive, if any
    pub async fn directive(&self) -> Option<SortDirective> {
        self.state.read().await.directive()
    }

    /// Subscribes to table events
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Returns true once `teardown` has run
    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Tears the table down
    ///
    /// Cancels an in-flight fetch. Results arriving afterwards are discarded
    /// and mutating calls return `TornDown`.
    pub async fn teardown(&self) {
        // Holding the write lock orders this against a fetch result being stored
        let _state = self.state.write().await;
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        tracing::debug!(provider = self.provider_name(), "Table torn down");
        self.emit(TableEvent::torn_down());
    }

    /// Perform a health check on the table
    pub async fn health_check(&self) -> ComponentHealth {
        let state = self.state.read().await;
        let load = state.load_state();

        let mut details = HashMap::new();
        details.insert("load_state".to_string(), serde_json::json!(load.name()));
        details.insert("record_count".to_string(), serde_json::json!(load.records().len()));
        details.insert("visible_rows".to_string(), serde_json::json!(state.projection().len()));
        details.insert("provider_name".to_string(), serde_json::json!(self.provider_name()));

        let (status, message) = if self.is_torn_down() {
            (HealthStatus::Unhealthy, "Table has been torn down".to_string())
        } else {
            match load {
                LoadState::Loaded { records, fetched_at } => (
                    HealthStatus::Healthy,
                    format!("Loaded {} records at {}", records.len(), fetched_at),
                ),
                LoadState::NotLoaded => (
                    HealthStatus::Degraded,
                    "Market data has not arrived yet".to_string(),
                ),
                LoadState::Failed { reason, .. } => (
                    HealthStatus::Unhealthy,
                    format!("Market data load failed: {}", reason),
                ),
            }
        };

        ComponentHealth {
            name: "crypto_market_table".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{record, MockProvider};
    use crate::render::ChangeTone;
    use crate::types::SortDirection;

    fn example_records() -> Vec<MarketRecord> {
        vec![record("Bitcoin", 50000.0, Some(2.5)), record("Ether", 3000.0, Some(-1.2))]
    }

    fn loaded_table(records: Vec<MarketRecord>) -> (CryptoTable, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider::new());
        provider.set_records(records);
        (CryptoTable::new(provider.clone()), provider)
    }

    fn names(records: &[MarketRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_initialize_loads_records() {
        let (table, provider) = loaded_table(example_records());
        assert_eq!(table.load_state().await, LoadState::NotLoaded);
        assert!(table.projection().await.is_empty());

        table.initialize().await.unwrap();

        assert!(table.load_state().await.is_loaded());
        assert_eq!(table.projection().await.len(), 2);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let (table, provider) = loaded_table(example_records());
        table.initialize().await.unwrap();

        assert_eq!(table.initialize().await, Err(TableError::AlreadyInitialized));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_swallowed() {
        let provider = Arc::new(MockProvider::new());
        provider.set_error("HTTP 500");
        let table = CryptoTable::new(provider.clone());
        let mut events = table.subscribe();

        assert!(table.initialize().await.is_ok());

        match table.load_state().await {
            LoadState::Failed { reason, .. } => assert!(reason.contains("HTTP 500")),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(table.projection().await.is_empty());
        assert_eq!(events.recv().await.unwrap().event_type(), "LOAD_FAILED");
        assert_eq!(table.health_check().await.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_search_sort_and_render_example() {
        let (table, _) = loaded_table(example_records());
        table.initialize().await.unwrap();

        table.set_search("eth").await.unwrap();
        assert_eq!(names(&table.projection().await), vec!["Ether"]);

        table.set_search("").await.unwrap();
        let directive = table.sort_by(SortField::CurrentPrice).await.unwrap();
        assert_eq!(directive, SortDirective::ascending(SortField::CurrentPrice));
        assert_eq!(names(&table.projection().await), vec!["Ether", "Bitcoin"]);

        let rows = table.rows().await;
        assert_eq!(rows[0].change.text, "-1.20%");
        assert_eq!(rows[0].change.tone, ChangeTone::Negative);
        assert_eq!(rows[1].price, "$50000.00");
    }

    #[tokio::test]
    async fn test_same_control_twice_toggles_order() {
        let records = vec![
            record("Bitcoin", 50000.0, Some(2.5)),
            record("Ether", 3000.0, Some(-1.2)),
            record("Solana", 150.0, Some(7.0)),
        ];
        let (table, _) = loaded_table(records);
        table.initialize().await.unwrap();

        let field = SortField::PriceChangePercentage24h;
        assert_eq!(table.sort_by(field).await.unwrap().direction, SortDirection::Ascending);
        assert_eq!(names(&table.projection().await), vec!["Ether", "Bitcoin", "Solana"]);

        assert_eq!(table.sort_by(field).await.unwrap().direction, SortDirection::Descending);
        assert_eq!(names(&table.projection().await), vec!["Solana", "Bitcoin", "Ether"]);

        table.clear_sort().await.unwrap();
        assert_eq!(table.directive().await, None);
        assert_eq!(names(&table.projection().await), vec!["Bitcoin", "Ether", "Solana"]);
    }

    #[tokio::test]
    async fn test_row_count_independent_of_sort() {
        let records: Vec<_> = (0..10)
            .map(|i| {
                let change = if i % 3 == 0 { None } else { Some(i as f64 - 5.0) };
                record(&format!("Coin{}", i), (i * 7 % 10) as f64, change)
            })
            .collect();
        let (table, _) = loaded_table(records);
        table.initialize().await.unwrap();

        let clicks = [
            SortField::MarketCap,
            SortField::PriceChangePercentage24h,
            SortField::MarketCap,
        ];
        for field in clicks {
            table.sort_by(field).await.unwrap();
            assert_eq!(table.rows().await.len(), 10);
        }
    }

    #[tokio::test]
    async fn test_teardown_discards_in_flight_fetch() {
        let (provider, gate) = MockProvider::gated();
        provider.set_records(example_records());
        let provider = Arc::new(provider);
        let table = Arc::new(CryptoTable::new(provider.clone()));

        let handle = table.spawn_initialize();
        while provider.call_count() == 0 {
            tokio::task::yield_now().await;
        }

        table.teardown().await;
        gate.notify_one();
        handle.await.unwrap();

        assert_eq!(table.load_state().await, LoadState::NotLoaded);
        assert!(table.is_torn_down());
        assert_eq!(table.set_search("btc").await, Err(TableError::TornDown));
        assert_eq!(table.sort_by(SortField::MarketCap).await, Err(TableError::TornDown));
        assert_eq!(table.initialize().await, Err(TableError::TornDown));
    }

    #[tokio::test]
    async fn test_events_and_health() {
        let (table, _) = loaded_table(example_records());
        let mut events = table.subscribe();
        assert_eq!(table.health_check().await.status, HealthStatus::Degraded);

        table.initialize().await.unwrap();
        table.set_search("bit").await.unwrap();

        assert_eq!(events.recv().await.unwrap().event_type(), "DATA_LOADED");
        assert_eq!(events.recv().await.unwrap().event_type(), "SEARCH_CHANGED");

        let health = table.health_check().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.details["record_count"], serde_json::json!(2));
        assert_eq!(health.details["visible_rows"], serde_json::json!(1));
        assert_eq!(table.search().await, "bit");

        table.teardown().await;
        assert_eq!(events.recv().await.unwrap().event_type(), "TORN_DOWN");
        assert_eq!(table.health_check().await.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_render_html_reflects_state() {
        let (table, _) = loaded_table(example_records());
        table.initialize().await.unwrap();
        table.sort_by(SortField::MarketCap).await.unwrap();
        table.sort_by(SortField::MarketCap).await.unwrap();

        let html = table.render_html(&RenderOptions::default()).await;
        assert!(html.contains("data-sort=\"market_cap\" data-direction=\"descending\""));
        assert_eq!(html.matches("<tr data-id=").count(), 2);
        assert!(html.find("data-id=\"bitcoin\"").unwrap() < html.find("data-id=\"ether\"").unwrap());
    }
}
