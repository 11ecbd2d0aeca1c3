use std::path::Path;

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};
use reqwest::Url;

use crate::{
    ScrapeError, ScrapingContext, Stage,
    detail_scraper::{ParkingLot, parse_detail, parse_exception_detail},
    geojson::FeatureCollection,
    index_scraper::{LinkList, extract_links, split_links},
    writer::write_feature_collection,
};

/// Scrapes every parking lot listed on the index page into a GeoJSON
/// feature collection.
pub struct ParkingScraper {
    context: ScrapingContext,
}

impl ParkingScraper {
    pub fn new(context: ScrapingContext) -> Self {
        Self { context }
    }

    /// Scrapes and writes the collection to the configured output path.
    /// Nothing is written if any page fails.
    pub async fn run(&self) -> Result<FeatureCollection, ScrapeError> {
        let collection = self.scrape().await?;
        let config = &self.context.scraping_config;
        let output_path: &Path = &config.output_path;
        write_feature_collection(output_path, &collection, config.pretty_output)
            .map_err(ScrapeError::at(Stage::WriteOutput, &output_path.display().to_string()))?;
        info!(
            "Wrote {} parking lots to {}",
            collection.len(),
            output_path.display()
        );
        Ok(collection)
    }

    pub async fn scrape(&self) -> Result<FeatureCollection, ScrapeError> {
        let config = &self.context.scraping_config;
        let index_url = &config.index_url;

        info!("Scraping parking index: {index_url}");
        let index = self
            .context
            .request_client
            .fetch_page(index_url.as_str())
            .await
            .map_err(ScrapeError::at(Stage::FetchIndex, index_url.as_str()))?;

        let LinkList { common, exception } = extract_links(&index.markup, index_url)
            .and_then(|links| {
                info!("Found {} detail links", links.len());
                split_links(links, &config.exception_rule)
            })
            .map_err(ScrapeError::at(Stage::ExtractLinks, index_url.as_str()))?;
        info!(
            "Exception page ({}): {exception}",
            config.exception_rule
        );

        // `buffered` yields in link order, however the requests finish.
        let lots: Vec<ParkingLot> = stream::iter(&common)
            .map(|url| self.scrape_detail(url))
            .buffered(config.max_concurrent_requests.get())
            .try_collect()
            .await?;
        let exception_lot = self.scrape_exception(&exception).await?;

        FeatureCollection::assemble(lots, exception_lot, config.coordinate_format)
            .map_err(ScrapeError::at(Stage::Assemble, index_url.as_str()))
    }

    async fn scrape_detail(&self, url: &Url) -> Result<ParkingLot, ScrapeError> {
        let page = self
            .context
            .request_client
            .fetch_page(url.as_str())
            .await
            .map_err(ScrapeError::at(Stage::FetchDetail, url.as_str()))?;
        let lot = parse_detail(&page.markup, &page.url)
            .map_err(ScrapeError::at(Stage::ParseDetail, url.as_str()))?;
        debug!("Parsed {} ({} spaces) from {url}", lot.name, lot.capacity);
        Ok(lot)
    }

    async fn scrape_exception(&self, url: &Url) -> Result<ParkingLot, ScrapeError> {
        let page = self
            .context
            .request_client
            .fetch_page(url.as_str())
            .await
            .map_err(ScrapeError::at(Stage::FetchDetail, url.as_str()))?;
        let lot = parse_exception_detail(&page.markup, &page.url)
            .map_err(ScrapeError::at(Stage::ParseException, url.as_str()))?;
        debug!("Parsed exception {} ({} spaces) from {url}", lot.name, lot.capacity);
        Ok(lot)
    }
}
