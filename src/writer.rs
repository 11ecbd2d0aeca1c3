use std::fs;
use std::path::Path;

use crate::{ScrapeError, geojson::FeatureCollection};

/// Writes `collection` to `path` as UTF-8 JSON, replacing whatever was there.
pub fn write_feature_collection(
    path: &Path,
    collection: &FeatureCollection,
    pretty: bool,
) -> Result<(), ScrapeError> {
    let json = if pretty {
        serde_json::to_string_pretty(collection)?
    } else {
        serde_json::to_string(collection)?
    };
    fs::write(path, json).map_err(|source| ScrapeError::Io {
        path: path.display().to_string(),
        source,
    })
}
