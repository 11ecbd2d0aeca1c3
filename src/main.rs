use anyhow::Context;
use dotenv::dotenv;
use log::{LevelFilter, error, info};
use parkplatz::{ParkingScraper, ScrapingContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let context = ScrapingContext::new().context("failed to set up scraping context")?;
    let scraper = ParkingScraper::new(context);
    match scraper.run().await {
        Ok(collection) => {
            info!("Done, {} features", collection.len());
            Ok(())
        }
        Err(e) => {
            error!("Scrape aborted: {e}");
            Err(e.into())
        }
    }
}
