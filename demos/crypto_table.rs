use crypto_market_table::{CryptoTable, LoadState, RenderOptions, SortField};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("crypto_market_table=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let table = Arc::new(CryptoTable::coingecko()?);
    let mut events = table.subscribe();

    // Mount: one fetch in the background, like a page load
    let mount = table.spawn_initialize();
    let options = RenderOptions { show_header: true };

    println!("Before data arrives:");
    print!("{}", table.render_text(&options).await);

    mount.await?;
    if let Ok(event) = events.try_recv() {
        println!("Event: {}", event);
    }

    match table.load_state().await {
        LoadState::Loaded { records, fetched_at } => {
            println!("\n{} markets fetched at {}\n", records.len(), fetched_at);
        }
        LoadState::Failed { reason, .. } => {
            eprintln!("Could not load markets: {}", reason);
            return Ok(());
        }
        LoadState::NotLoaded => return Ok(()),
    }

    print!("{}", table.render_text(&options).await);

    println!("\nSorted by 24h change (ascending, then descending):");
    table.sort_by(SortField::PriceChangePercentage24h).await?;
    print!("{}", table.render_text(&options).await);
    table.sort_by(SortField::PriceChangePercentage24h).await?;
    print!("{}", table.render_text(&options).await);

    println!("\nSearch \"coin\":");
    table.set_search("coin").await?;
    print!("{}", table.render_text(&options).await);

    println!("\nHTML:");
    print!("{}", table.render_html(&RenderOptions::default()).await);

    let health = table.health_check().await;
    println!("\nHealth: {:?} ({})", health.status, health.message.unwrap_or_default());

    table.teardown().await;
    Ok(())
}
