//! GeoJSON output types for scraped parking lots.

use std::str::FromStr;

use serde::Serialize;

use crate::{ScrapeError, detail_scraper::ParkingLot};

/// How Point coordinates are written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateFormat {
    /// Decimal strings copied from the page, as the original dataset has them.
    #[default]
    Text,
    /// JSON numbers, as the GeoJSON standard expects.
    Numeric,
}

impl FromStr for CoordinateFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Ok(CoordinateFormat::Text),
            "numeric" | "number" => Ok(CoordinateFormat::Numeric),
            other => Err(ScrapeError::Config(format!(
                "unknown coordinate format `{other}`, expected `text` or `numeric`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Position {
    Text([String; 2]),
    Numeric([f64; 2]),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Point")]
pub struct Geometry {
    pub coordinates: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Properties {
    pub name: String,
    pub address: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    pub fn from_lot(lot: ParkingLot, format: CoordinateFormat) -> Result<Self, ScrapeError> {
        let coordinates = match format {
            CoordinateFormat::Text => Position::Text(lot.coordinates),
            CoordinateFormat::Numeric => {
                let [lon, lat] = &lot.coordinates;
                Position::Numeric([
                    parse_degrees(lon, &lot.source_url)?,
                    parse_degrees(lat, &lot.source_url)?,
                ])
            }
        };
        Ok(Feature {
            geometry: Geometry { coordinates },
            properties: Properties {
                name: lot.name,
                address: lot.address,
                capacity: lot.capacity,
            },
        })
    }
}

fn parse_degrees(raw: &str, url: &str) -> Result<f64, ScrapeError> {
    raw.trim().parse::<f64>().map_err(|e| {
        ScrapeError::extraction(url, "coordinates", format!("`{raw}` is not a number: {e}"))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Builds the collection from the common-layout lots, in link order, followed
    /// by the exception lot, so there is always one feature per link.
    pub fn assemble(
        common: Vec<ParkingLot>,
        exception: ParkingLot,
        format: CoordinateFormat,
    ) -> Result<Self, ScrapeError> {
        let features = common
            .into_iter()
            .chain(std::iter::once(exception))
            .map(|lot| Feature::from_lot(lot, format))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureCollection { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
