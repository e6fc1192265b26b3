use chrono::Local;
use shelf_keeper::{
    config::load_config_or_default,
    core::{
        Locale, flush_catalog, open_catalog,
        ordering::{ProductComparator, by_price, by_rating},
        report,
    },
    entities::{Product, Rating},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const CLIENTS: [&str; 5] = ["alice", "bob", "carmen", "didier", "mei"];

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenvy::dotenv().ok();

    // 3. Load the application configuration
    let config_path =
        env::var("SHELF_KEEPER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config_or_default(&config_path)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Restore, bulk load, or start empty
    let (catalog, source) = open_catalog(&config).await?;
    info!(
        "Catalog opened from {:?} with {} products",
        source,
        catalog.len().await
    );

    // 5. Simulated clients, each with its own locale
    let today = Local::now().date_naive();
    let handles: Vec<_> = CLIENTS
        .into_iter()
        .zip(Locale::ALL)
        .enumerate()
        .map(|(index, (client, locale))| {
            let catalog = catalog.clone();
            let reports_dir = config.catalog.reports_dir.clone();
            tokio::spawn(async move {
                let id = 201 + i32::try_from(index).unwrap_or_default();
                let best_before = (index % 2 == 0).then_some(today);
                catalog
                    .create_product(
                        id,
                        &format!("Item {id}"),
                        Decimal::new(199 + 100 * i64::from(id % 3), 2),
                        Rating::NotRated,
                        best_before,
                    )
                    .await;

                for target in [101, id] {
                    let rating = Rating::convert(i64::from(target % 5) + 1);
                    match catalog
                        .review_product(target, rating, &format!("Review from {client}"))
                        .await
                    {
                        Ok(product) => info!("{} reviewed {}", client, product),
                        Err(Error::NotFound { id }) => warn!("{} found no product {}", client, id),
                        Err(e) => return Err(e),
                    }
                }

                report::write_product_report(&catalog, id, locale, client, &reports_dir, today)
                    .await
                    .map(|_| ())
            })
        })
        .collect();

    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Client failed: {}", e),
            Err(e) => error!("Client task panicked: {}", e),
        }
    }

    // 6. Summaries in the configured locale
    let locale = Locale::from_tag(&config.catalog.default_locale);
    for (stars, total) in catalog.discounts(locale).await {
        info!("Discounts {}: {}", stars, total);
    }
    let listing = report::render_products(
        &catalog,
        |_: &Product| true,
        by_rating.reversed().then_by(by_price),
        locale,
        today,
    )
    .await;
    println!("{listing}");

    // 7. Flush on shutdown
    flush_catalog(&catalog, &config)
        .await
        .inspect_err(|e| error!("Failed to flush catalog: {}", e))?;

    Ok(())
}
