use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::{
    ScrapeError,
    text_manipulators::{extract_lines, extract_text},
};

/// Manual `[longitude, latitude]` for the exception page, whose map link
/// can't be trusted.
pub const EXCEPTION_COORDINATES: [&str; 2] = ["8.86822", "48.59946"];

const CONTENT_CONTAINER_ID: &str = "#mainContentArea";
const MAP_LINK: &str = r#"a[target="googleMaps"]"#;
const HEADING: &str = "h2";
const ADDRESS_BLOCK: &str = "div.cCore_addressBlock_address";

static CONTENT_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CONTENT_CONTAINER_ID).expect("static selector"));
static MAP_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(MAP_LINK).expect("static selector"));
static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(HEADING).expect("static selector"));
static ADDRESS_BLOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(ADDRESS_BLOCK).expect("static selector"));

/// One parking facility as scraped from its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingLot {
    /// `[longitude, latitude]`, exactly as written in the page.
    pub coordinates: [String; 2],
    pub name: String,
    pub address: String,
    pub capacity: u32,
    pub source_url: String,
}

/// Parses a detail page with the common layout.
///
/// The heading reads like `Bahnhof, 200 Stellplätze` and the map link carries
/// `latitude%2Clongitude` after its first `=`.
pub fn parse_detail(markup: &str, url: &str) -> Result<ParkingLot, ScrapeError> {
    let document = Html::parse_document(markup);
    let container = content_container(&document, url)?;

    let coordinates = parse_coordinates(&map_link_href(container, url)?, url)?;
    let heading = heading_text(container, url)?;
    let name = parse_name(&heading);
    let capacity = parse_capacity(&heading, url)?;
    let address = parse_address(container, url)?;

    Ok(ParkingLot {
        coordinates,
        name,
        address,
        capacity,
        source_url: url.to_string(),
    })
}

/// Parses the exception page. Its heading reads like `Sonderparkplatz 150`
/// and its coordinates are replaced by [`EXCEPTION_COORDINATES`].
pub fn parse_exception_detail(markup: &str, url: &str) -> Result<ParkingLot, ScrapeError> {
    let document = Html::parse_document(markup);
    let container = content_container(&document, url)?;

    let heading = heading_text(container, url)?;
    let name = parse_name(&heading);
    let capacity = parse_exception_capacity(&heading, url)?;
    let address = parse_address(container, url)?;

    Ok(ParkingLot {
        coordinates: EXCEPTION_COORDINATES.map(str::to_string),
        name,
        address,
        capacity,
        source_url: url.to_string(),
    })
}

fn content_container<'a>(document: &'a Html, url: &str) -> Result<ElementRef<'a>, ScrapeError> {
    document
        .select(&CONTENT_CONTAINER)
        .next()
        .ok_or_else(|| ScrapeError::structure(url, CONTENT_CONTAINER_ID))
}

fn map_link_href(container: ElementRef, url: &str) -> Result<String, ScrapeError> {
    let anchor = container
        .select(&MAP_LINK_SELECTOR)
        .next()
        .ok_or_else(|| ScrapeError::extraction(url, "coordinates", "no map link"))?;
    anchor
        .value()
        .attr("href")
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::extraction(url, "coordinates", "map link has no href"))
}

/// `...?q=48.59946%2C8.86822` becomes `["8.86822", "48.59946"]`.
pub fn parse_coordinates(href: &str, url: &str) -> Result<[String; 2], ScrapeError> {
    let query = href.split('=').nth(1).ok_or_else(|| {
        ScrapeError::extraction(url, "coordinates", format!("no `=` in map link `{href}`"))
    })?;
    let mut tokens = query.split("%2C");
    match (tokens.next(), tokens.next()) {
        (Some(latitude), Some(longitude)) => Ok([longitude.to_string(), latitude.to_string()]),
        _ => Err(ScrapeError::extraction(
            url,
            "coordinates",
            format!("no `%2C` between latitude and longitude in `{query}`"),
        )),
    }
}

fn heading_text(container: ElementRef, url: &str) -> Result<String, ScrapeError> {
    container
        .select(&HEADING_SELECTOR)
        .next()
        .map(|heading| extract_text(heading).trim().to_string())
        .ok_or_else(|| ScrapeError::structure(url, HEADING))
}

pub fn parse_name(heading: &str) -> String {
    heading.split(',').next().unwrap_or_default().trim().to_string()
}

/// The first word after `", "` in the heading.
pub fn parse_capacity(heading: &str, url: &str) -> Result<u32, ScrapeError> {
    let after_comma = heading.split(", ").nth(1).ok_or_else(|| {
        ScrapeError::extraction(url, "capacity", format!("no `, ` in heading `{heading}`"))
    })?;
    let token = after_comma.split_whitespace().next().unwrap_or_default();
    parse_count(token, url)
}

/// The second word of the heading.
pub fn parse_exception_capacity(heading: &str, url: &str) -> Result<u32, ScrapeError> {
    let token = heading.split_whitespace().nth(1).ok_or_else(|| {
        ScrapeError::extraction(url, "capacity", format!("heading `{heading}` has one word"))
    })?;
    parse_count(token, url)
}

fn parse_count(token: &str, url: &str) -> Result<u32, ScrapeError> {
    token.parse::<u32>().map_err(|e| {
        ScrapeError::extraction(url, "capacity", format!("`{token}` is not a count: {e}"))
    })
}

fn parse_address(container: ElementRef, url: &str) -> Result<String, ScrapeError> {
    let block = container
        .select(&ADDRESS_BLOCK_SELECTOR)
        .next()
        .ok_or_else(|| ScrapeError::structure(url, ADDRESS_BLOCK))?;
    // First line is the facility name again, second is the street.
    extract_lines(block)
        .into_iter()
        .nth(1)
        .ok_or_else(|| ScrapeError::extraction(url, "address", "address block has no line break"))
}
