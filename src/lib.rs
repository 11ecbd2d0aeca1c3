pub mod config;
pub mod detail_scraper;
mod error;
pub mod geojson;
pub mod index_scraper;
mod parking_scraper;
mod ratelimit;
pub mod requests;
mod scraping_context;
mod text_manipulators;
pub mod writer;

pub use config::ScrapingConfig;
pub use detail_scraper::ParkingLot;
pub use error::{ScrapeError, Stage};
pub use geojson::{CoordinateFormat, FeatureCollection};
pub use index_scraper::ExceptionRule;
pub use parking_scraper::ParkingScraper;
pub use scraping_context::ScrapingContext;
