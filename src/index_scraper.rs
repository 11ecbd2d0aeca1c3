use std::fmt;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};

use crate::{ScrapeError, text_manipulators::unescape_ampersands};

const LINK_CONTAINER_ID: &str = "#mainColArea";

static LINK_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(LINK_CONTAINER_ID).expect("static selector"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("static selector"));

/// How the one detail page with a non-standard layout is picked out of the
/// index links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionRule {
    /// The link at this position in document order.
    Position(usize),
    /// The only link whose URL contains this text.
    UrlContains(String),
}

impl fmt::Display for ExceptionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionRule::Position(index) => write!(f, "link #{index}"),
            ExceptionRule::UrlContains(marker) => write!(f, "link containing `{marker}`"),
        }
    }
}

/// Detail links from the index page, with the exception page set aside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkList {
    pub common: Vec<Url>,
    pub exception: Url,
}

/// Collects the detail-page links listed in the index page's main column.
///
/// Fragment links (anything with a `#`) are dropped, double-escaped
/// ampersands are fixed and relative targets are resolved against
/// `base_url`. Order follows the document.
pub fn extract_links(markup: &str, base_url: &Url) -> Result<Vec<Url>, ScrapeError> {
    let document = Html::parse_document(markup);
    let container = document
        .select(&LINK_CONTAINER)
        .next()
        .ok_or_else(|| ScrapeError::structure(base_url.as_str(), LINK_CONTAINER_ID))?;

    let mut links = vec![];
    for anchor in container.select(&LINK) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.contains('#') {
            continue;
        }
        let href = unescape_ampersands(href);
        let link = base_url.join(&href).map_err(|e| {
            ScrapeError::extraction(base_url.as_str(), "detail link", format!("`{href}`: {e}"))
        })?;
        links.push(link);
    }
    Ok(links)
}

/// Removes the exception link from `links` according to `rule`.
///
/// Fails if the rule doesn't pick out exactly one link, since that means the
/// index page no longer looks the way the scraper expects.
pub fn split_links(mut links: Vec<Url>, rule: &ExceptionRule) -> Result<LinkList, ScrapeError> {
    let position = match rule {
        ExceptionRule::Position(index) => {
            if *index >= links.len() {
                return Err(ScrapeError::Assumption(format!(
                    "exception {rule} is out of range, the index page only lists {} links",
                    links.len()
                )));
            }
            *index
        }
        ExceptionRule::UrlContains(marker) => {
            let mut matching = links
                .iter()
                .enumerate()
                .filter(|(_, link)| link.as_str().contains(marker.as_str()))
                .map(|(i, _)| i);
            match (matching.next(), matching.next()) {
                (Some(i), None) => i,
                (None, _) => {
                    return Err(ScrapeError::Assumption(format!(
                        "no {rule} on the index page"
                    )));
                }
                (Some(_), Some(_)) => {
                    return Err(ScrapeError::Assumption(format!(
                        "more than one {rule} on the index page"
                    )));
                }
            }
        }
    };
    let exception = links.remove(position);
    Ok(LinkList {
        common: links,
        exception,
    })
}
