//! End-to-end runs of `ParkingScraper` against a local `wiremock` server
//! standing in for the municipal website.

use std::path::PathBuf;
use std::time::Duration;

use nonzero_ext::nonzero;
use reqwest::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parkplatz::{
    CoordinateFormat, ExceptionRule, ParkingScraper, ScrapeError, ScrapingConfig,
    ScrapingContext, Stage,
};

fn index_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{href}">Parkplatz</a></li>"#))
        .collect();
    format!(
        r##"<html><body>
          <div id="mainColArea">
            <a href="#content">Zum Inhalt</a>
            <ul>{anchors}</ul>
          </div>
        </body></html>"##
    )
}

fn detail_page(heading: &str, street: &str, lat: &str, lon: &str) -> String {
    format!(
        r#"<html><body><div id="mainContentArea">
          <h2>{heading}</h2>
          <div class="cCore_addressBlock_address">Stadt Herrenberg<br/>{street}<br/>71083 Herrenberg</div>
          <p><a target="googleMaps" href="https://maps.google.de/maps?q={lat}%2C{lon}">Google Maps</a></p>
        </div></body></html>"#
    )
}

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn output_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("parkplatz-{name}-{}.geojson", std::process::id()))
}

fn test_config(server: &MockServer, output: PathBuf) -> ScrapingConfig {
    ScrapingConfig {
        index_url: Url::parse(&format!("{}/parkplaetze", server.uri())).unwrap(),
        output_path: output,
        exception_rule: ExceptionRule::UrlContains("sonderparkplatz".to_string()),
        requests_per_second: nonzero!(100u32),
        ..ScrapingConfig::default()
    }
}

/// Index with two regular lots and the exception page listed first.
async fn mount_site(server: &MockServer) {
    serve(
        server,
        "/parkplaetze",
        index_page(&["/parken/sonderparkplatz", "/parken/bahnhof", "/parken/altstadt"]),
    )
    .await;
    serve(
        server,
        "/parken/bahnhof",
        detail_page("Bahnhof, 200 Stellplätze", "Bahnhofstraße 10", "48.59", "8.87"),
    )
    .await;
    serve(
        server,
        "/parken/altstadt",
        detail_page("Altstadt, 85 Stellplätze", "Tübinger Straße 2", "48.60", "8.86"),
    )
    .await;
    serve(
        server,
        "/parken/sonderparkplatz",
        detail_page("Sonderparkplatz 150", "Seestraße 1", "0.0", "0.0"),
    )
    .await;
}

#[tokio::test]
async fn writes_common_lots_in_link_order_then_the_exception() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let output = output_path("happy");

    let context = ScrapingContext::with_config(test_config(&server, output.clone())).unwrap();
    let collection = ParkingScraper::new(context).run().await.unwrap();
    assert_eq!(collection.len(), 3);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    std::fs::remove_file(&output).unwrap();

    assert_eq!(written["type"], "FeatureCollection");
    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);

    assert_eq!(features[0]["properties"]["name"], "Bahnhof");
    assert_eq!(features[0]["properties"]["address"], "Bahnhofstraße 10");
    assert_eq!(features[0]["properties"]["capacity"], 200);
    assert_eq!(
        features[0]["geometry"]["coordinates"],
        serde_json::json!(["8.87", "48.59"])
    );

    assert_eq!(features[1]["properties"]["name"], "Altstadt");
    assert_eq!(features[1]["properties"]["capacity"], 85);

    assert_eq!(features[2]["properties"]["name"], "Sonderparkplatz 150");
    assert_eq!(features[2]["properties"]["capacity"], 150);
    assert_eq!(
        features[2]["geometry"]["coordinates"],
        serde_json::json!(["8.86822", "48.59946"])
    );

    for feature in features {
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["properties"].as_object().unwrap().len(), 3);
    }
}

#[tokio::test]
async fn slow_first_page_keeps_its_place() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/parkplaetze",
        index_page(&["/parken/langsam", "/parken/schnell", "/parken/sonderparkplatz"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/parken/langsam"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page(
                    "Langsam, 10 Stellplätze",
                    "Hauptstraße 1",
                    "48.1",
                    "8.1",
                ))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    serve(
        &server,
        "/parken/schnell",
        detail_page("Schnell, 20 Stellplätze", "Hauptstraße 2", "48.2", "8.2"),
    )
    .await;
    serve(
        &server,
        "/parken/sonderparkplatz",
        detail_page("Sonderparkplatz 3", "Seestraße 1", "0.0", "0.0"),
    )
    .await;

    let config = test_config(&server, output_path("completion-order"));
    assert!(config.max_concurrent_requests.get() > 1);
    let context = ScrapingContext::with_config(config).unwrap();
    let collection = ParkingScraper::new(context).scrape().await.unwrap();

    let names: Vec<&str> = collection
        .features
        .iter()
        .map(|f| f.properties.name.as_str())
        .collect();
    assert_eq!(names, vec!["Langsam", "Schnell", "Sonderparkplatz 3"]);
}

#[tokio::test]
async fn sequential_numeric_run_emits_numbers() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let config = ScrapingConfig {
        coordinate_format: CoordinateFormat::Numeric,
        max_concurrent_requests: nonzero!(1usize),
        ..test_config(&server, output_path("numeric"))
    };
    let context = ScrapingContext::with_config(config).unwrap();
    let collection = ParkingScraper::new(context).scrape().await.unwrap();

    let value = serde_json::to_value(&collection).unwrap();
    assert_eq!(
        value["features"][0]["geometry"]["coordinates"],
        serde_json::json!([8.87, 48.59])
    );
}

#[tokio::test]
async fn failing_detail_page_aborts_without_output() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/parkplaetze",
        index_page(&["/parken/bahnhof", "/parken/weg", "/parken/sonderparkplatz"]),
    )
    .await;
    serve(
        &server,
        "/parken/bahnhof",
        detail_page("Bahnhof, 200 Stellplätze", "Bahnhofstraße 10", "48.59", "8.87"),
    )
    .await;
    serve(
        &server,
        "/parken/sonderparkplatz",
        detail_page("Sonderparkplatz 150", "Seestraße 1", "0.0", "0.0"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/parken/weg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = output_path("missing-page");
    let context = ScrapingContext::with_config(test_config(&server, output.clone())).unwrap();
    let err = ParkingScraper::new(context).run().await.unwrap_err();

    match &err {
        ScrapeError::Stage { stage, url, .. } => {
            assert_eq!(*stage, Stage::FetchDetail);
            assert!(url.ends_with("/parken/weg"), "unexpected url {url}");
        }
        other => panic!("expected stage context, got {other:?}"),
    }
    assert!(matches!(err.root(), ScrapeError::Status { status: 404, .. }));
    assert!(!output.exists());
}

#[tokio::test]
async fn missing_exception_link_is_an_assumption_error() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/parkplaetze",
        index_page(&["/parken/bahnhof", "/parken/altstadt"]),
    )
    .await;

    let context =
        ScrapingContext::with_config(test_config(&server, output_path("no-exception"))).unwrap();
    let err = ParkingScraper::new(context).scrape().await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Stage {
            stage: Stage::ExtractLinks,
            ..
        }
    ));
    assert!(matches!(err.root(), ScrapeError::Assumption(_)));
}

#[tokio::test]
async fn legacy_position_out_of_range_fails() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/parkplaetze",
        index_page(&["/parken/bahnhof", "/parken/altstadt"]),
    )
    .await;

    let config = ScrapingConfig {
        exception_rule: ExceptionRule::Position(13),
        ..test_config(&server, output_path("position"))
    };
    let context = ScrapingContext::with_config(config).unwrap();
    let err = ParkingScraper::new(context).scrape().await.unwrap_err();

    assert!(matches!(err.root(), ScrapeError::Assumption(_)));
}

#[tokio::test]
async fn index_without_container_is_a_structure_error() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/parkplaetze",
        "<html><body><p>Wartungsarbeiten</p></body></html>".to_string(),
    )
    .await;

    let context =
        ScrapingContext::with_config(test_config(&server, output_path("no-container"))).unwrap();
    let err = ParkingScraper::new(context).scrape().await.unwrap_err();

    assert!(matches!(err.root(), ScrapeError::Structure { .. }));
}
