//! Client for the World Air Quality Index feed
//!
//! Each operation sends one request, classifies the response and builds the
//! resulting records. There are no retries; a failed request surfaces its
//! classified error directly.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::Result;
use crate::builder::EntityBuilder;
use crate::classifier::{FeedQuery, classify};
use crate::config::ApiConfig;
use crate::diagnostics::{DiagnosticReporter, TracingReporter};
use crate::models::{AirQuality, SearchResult};
use crate::transport::{FeedTransport, HttpTransport};

/// Client for the feed service
pub struct WaqiClient {
    transport: Box<dyn FeedTransport>,
    reporter: Arc<dyn DiagnosticReporter>,
    token: Option<String>,
}

impl WaqiClient {
    /// Create a client talking HTTP to the configured service
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let mut client = Self::with_transport(Box::new(transport));
        client.token = config.token.clone();
        Ok(client)
    }

    /// Create a client on top of any transport
    #[must_use]
    pub fn with_transport(transport: Box<dyn FeedTransport>) -> Self {
        Self {
            transport,
            reporter: Arc::new(TracingReporter),
            token: None,
        }
    }

    /// Send notices about unsupported feed values to `reporter`
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn DiagnosticReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set the API token used for every following request
    pub fn authenticate(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Air quality of a city
    #[instrument(skip(self))]
    pub async fn get_by_city(&self, city: &str) -> Result<AirQuality> {
        let path = feed_path(city);
        self.fetch_air_quality(FeedQuery::City(city.to_string()), &path)
            .await
    }

    /// Air quality of a station by name
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<AirQuality> {
        let path = feed_path(name);
        self.fetch_air_quality(FeedQuery::Station(name.to_string()), &path)
            .await
    }

    /// Air quality of a station by its numeric id
    pub async fn get_by_station_number(&self, station_number: i64) -> Result<AirQuality> {
        self.get_by_name(&format!("@{station_number}")).await
    }

    /// Air quality of the station nearest to a position
    #[instrument(skip(self))]
    pub async fn get_by_coordinates(&self, latitude: f64, longitude: f64) -> Result<AirQuality> {
        let path = format!("feed/geo:{latitude};{longitude}/");
        self.fetch_air_quality(
            FeedQuery::Coordinates {
                latitude,
                longitude,
            },
            &path,
        )
        .await
    }

    /// Air quality of the station the service locates from the caller's IP
    pub async fn get_by_ip(&self) -> Result<AirQuality> {
        self.get_by_name("here").await
    }

    /// Stations matching a keyword
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>> {
        let query = FeedQuery::Search(keyword.to_string());
        let data = self
            .request(&query, "search/", vec![("keyword", keyword.to_string())])
            .await?;

        let results = EntityBuilder::new(self.reporter.as_ref()).build_search_results(&data)?;
        info!("Found {} stations for '{}'", results.len(), keyword);
        Ok(results)
    }

    async fn fetch_air_quality(&self, query: FeedQuery, path: &str) -> Result<AirQuality> {
        let data = self.request(&query, path, Vec::new()).await?;
        let record = EntityBuilder::new(self.reporter.as_ref()).build_air_quality(&data)?;

        info!(
            "Retrieved air quality for {} (station {}, aqi {:?})",
            query, record.station_id, record.air_quality_index
        );
        Ok(record)
    }

    async fn request(
        &self,
        query: &FeedQuery,
        path: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<Value> {
        if let Some(token) = &self.token {
            params.push(("token", token.clone()));
        }

        let start_time = Instant::now();
        let response = self.transport.get(path, &params).await?;

        classify(query, &response).inspect_err(|e| {
            warn!(
                "Request for {} failed after {:.3}s: {}",
                query,
                start_time.elapsed().as_secs_f64(),
                e
            );
        })
    }
}

/// `feed/<name>/`, encoding each `/`-separated segment of `name`.
/// `@` and `:` are valid in a path segment and stay literal.
fn feed_path(name: &str) -> String {
    let segments: Vec<String> = name
        .trim_matches('/')
        .split('/')
        .map(|segment| {
            urlencoding::encode(segment)
                .replace("%40", "@")
                .replace("%3A", ":")
        })
        .collect();
    format!("feed/{}/", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaqiError;
    use crate::transport::FeedResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers every request with the same body and records what was asked
    struct CannedTransport {
        body: String,
        requests: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
    }

    #[async_trait]
    impl FeedTransport for CannedTransport {
        async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<FeedResponse> {
            self.requests.lock().unwrap().push((
                path.to_string(),
                query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            Ok(FeedResponse {
                status: 200,
                content_type: "application/json".to_string(),
                body: self.body.clone(),
            })
        }
    }

    type Requests = Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>;

    fn client(body: Value) -> (WaqiClient, Requests) {
        let requests = Requests::default();
        let transport = CannedTransport {
            body: body.to_string(),
            requests: Arc::clone(&requests),
        };
        let mut client = WaqiClient::with_transport(Box::new(transport));
        client.authenticate("test");
        (client, requests)
    }

    #[tokio::test]
    async fn test_paths_and_token() {
        let (client, requests) = client(json!({ "status": "error", "data": "Unknown station" }));

        let _ = client.get_by_city("den haag").await;
        let _ = client.get_by_station_number(6332).await;
        let _ = client.get_by_coordinates(52.1, 5.12).await;
        let _ = client.get_by_ip().await;
        let _ = client.search("utrecht").await;

        let requests = requests.lock().unwrap();
        let paths: Vec<&str> = requests.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "feed/den%20haag/",
                "feed/@6332/",
                "feed/geo:52.1;5.12/",
                "feed/here/",
                "search/"
            ]
        );
        assert!(requests.iter().all(|(_, query)| query
            .iter()
            .any(|(key, value)| key == "token" && value == "test")));
        assert_eq!(requests[4].1[0], ("keyword".to_string(), "utrecht".to_string()));
    }

    #[test]
    fn test_feed_path_keeps_station_urls() {
        assert_eq!(
            feed_path("netherland/utrecht/griftpark"),
            "feed/netherland/utrecht/griftpark/"
        );
        assert_eq!(feed_path("/netherland/utrecht/"), "feed/netherland/utrecht/");
        assert_eq!(feed_path("@6332"), "feed/@6332/");
        assert_eq!(feed_path("den haag"), "feed/den%20haag/");
        assert_eq!(feed_path("a?b#c"), "feed/a%3Fb%23c/");
    }

    #[tokio::test]
    async fn test_station_url_from_search_is_accepted() {
        let (client, requests) = client(json!({ "status": "error", "data": "Unknown station" }));

        let _ = client.get_by_name("netherland/utrecht/griftpark").await;

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].0, "feed/netherland/utrecht/griftpark/");
    }

    #[tokio::test]
    async fn test_unknown_station_by_query_kind() {
        let (client, _) = client(json!({ "status": "error", "data": "Unknown station" }));

        assert!(matches!(
            client.get_by_city("atlantis").await,
            Err(WaqiError::UnknownCity { .. })
        ));
        assert!(matches!(
            client.get_by_name("atlantis").await,
            Err(WaqiError::UnknownStation { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let (client, _) = client(json!({ "status": "error", "data": "Invalid key" }));
        assert!(matches!(
            client.search("utrecht").await,
            Err(WaqiError::Authentication)
        ));
    }
}
