//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for reverse geocoding and forward search.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::config::GeocodingConfig;
use crate::constants::api::USER_AGENT;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::geo::{Address, GeoBackend, PlaceName, SearchResult};
use serde::Deserialize;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
    accept_language: String,
}

/// Nominatim reverse response
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<Address>,
    /// Present when nothing was found: `{"error": "Unable to geocode"}`
    error: Option<String>,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct SearchItem {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: Option<Address>,
}

impl NominatimBackend {
    /// Create a new Nominatim backend
    pub fn new(base_url: impl Into<String>, accept_language: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            accept_language: accept_language.into(),
        })
    }

    /// Create a backend from the geocoding config section
    pub fn from_config(config: &GeocodingConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.accept_language)
    }

    /// Parse lat/lon strings to a coordinate
    fn parse_coords(lat: &str, lon: &str) -> Result<Coordinate> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid latitude: {}", lat)))?;
        let lon: f64 = lon
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid longitude: {}", lon)))?;
        Ok(Coordinate::new(lat, lon))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        Ok(response)
    }
}

impl GeoBackend for NominatimBackend {
    async fn reverse_geocode(&self, coord: Coordinate) -> Result<PlaceName> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom=18&addressdetails=1",
            self.base_url, coord.lat, coord.lon
        );
        debug!("Reverse geocoding {}", coord);

        let result: ReverseResponse = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        if let Some(error) = result.error {
            return Err(Error::Geocoding(error));
        }

        Ok(PlaceName::from_address(
            &result.address.unwrap_or_default(),
            result.display_name.as_deref(),
            coord,
        ))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/search?format=json&addressdetails=1&q={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        debug!("Searching for {:?}", query);

        let items: Vec<SearchItem> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        Ok(items
            .into_iter()
            .filter_map(|item| match Self::parse_coords(&item.lat, &item.lon) {
                Ok(coord) => Some(SearchResult::new(
                    coord,
                    item.display_name,
                    &item.address.unwrap_or_default(),
                )),
                Err(e) => {
                    debug!("Skipping search result {:?}: {}", item.display_name, e);
                    None
                }
            })
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    /// Serve a router on an ephemeral local port and return its base URL
    pub(crate) async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// A stand-in for the Nominatim API
    pub(crate) fn fake_nominatim() -> Router {
        async fn reverse(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
            let lat: f64 = params["lat"].parse().unwrap();
            if lat > 80.0 {
                return Json(serde_json::json!({ "error": "Unable to geocode" }));
            }
            Json(serde_json::json!({
                "display_name": "Nairobi, Nairobi County, Kenya",
                "address": {
                    "city": "Nairobi",
                    "state": "Nairobi County",
                    "country": "Kenya"
                }
            }))
        }

        async fn search(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
            let limit: usize = params["limit"].parse().unwrap();
            let all = serde_json::json!([
                {
                    "lat": "-1.2921", "lon": "36.8219",
                    "display_name": "Nairobi, Nairobi County, Kenya",
                    "address": { "city": "Nairobi", "country": "Kenya" }
                },
                {
                    "lat": "-0.7167", "lon": "36.4333",
                    "display_name": "Naivasha, Nakuru, Kenya",
                    "address": { "town": "Naivasha", "county": "Nakuru", "country": "Kenya" }
                },
                {
                    "lat": "-1.0333", "lon": "37.0693",
                    "display_name": "Thika, Kiambu, Kenya"
                }
            ]);
            let items: Vec<_> = all.as_array().unwrap().iter().take(limit).cloned().collect();
            Json(serde_json::Value::Array(items))
        }

        async fn partial_search() -> Json<serde_json::Value> {
            Json(serde_json::json!([
                { "lat": "n/a", "lon": "36.8219", "display_name": "Broken, Kenya" },
                {
                    "lat": "-0.3031", "lon": "36.0800",
                    "display_name": "Nakuru, Kenya",
                    "address": { "city": "Nakuru", "country": "Kenya" }
                }
            ]))
        }

        Router::new()
            .route("/reverse", get(reverse))
            .route("/search", get(search))
            .route("/partial/search", get(partial_search))
            .route("/broken/reverse", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/garbled/reverse", get(|| async { "<html>not json</html>" }))
    }

    #[test]
    fn test_parse_coords() {
        let coord = NominatimBackend::parse_coords("-1.2921", "36.8219").unwrap();
        assert!((coord.lat - (-1.2921)).abs() < 0.0001);
        assert!((coord.lon - 36.8219).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimBackend::parse_coords("invalid", "0").is_err());
        assert!(NominatimBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_backend_creation() {
        let backend = NominatimBackend::from_config(&GeocodingConfig::default()).unwrap();
        assert_eq!(backend.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(backend.accept_language, "en");
    }

    #[tokio::test]
    async fn test_reverse_geocode() {
        let base = serve(fake_nominatim()).await;
        let backend = NominatimBackend::new(base, "en").unwrap();

        let place = backend
            .reverse_geocode(Coordinate::new(-1.2921, 36.8219))
            .await
            .unwrap();

        assert_eq!(place.name, "Nairobi");
        assert_eq!(place.label(), "Nairobi, Kenya");
        assert_eq!(place.full_address, "Nairobi, Nairobi County, Kenya");
        assert_eq!(place.region.as_deref(), Some("Nairobi County"));
    }

    #[tokio::test]
    async fn test_reverse_geocode_not_found() {
        let base = serve(fake_nominatim()).await;
        let backend = NominatimBackend::new(base, "en").unwrap();

        let result = backend.reverse_geocode(Coordinate::new(85.0, 0.0)).await;
        assert!(matches!(result, Err(Error::Geocoding(_))));
    }

    #[tokio::test]
    async fn test_reverse_geocode_http_error() {
        let base = serve(fake_nominatim()).await;
        let backend = NominatimBackend::new(format!("{}/broken", base), "en").unwrap();

        let result = backend.reverse_geocode(Coordinate::new(0.0, 0.0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reverse_geocode_bad_shape() {
        let base = serve(fake_nominatim()).await;
        let backend = NominatimBackend::new(format!("{}/garbled", base), "en").unwrap();

        let result = backend.reverse_geocode(Coordinate::new(0.0, 0.0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search() {
        let base = serve(fake_nominatim()).await;
        let backend = NominatimBackend::new(base, "en").unwrap();

        let results = backend.search("Nai", 6).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].place_name, "Nairobi");
        assert_eq!(results[1].address.county.as_deref(), Some("Nakuru"));
        assert_eq!(results[2].place_name, "Thika");

        let limited = backend.search("Nai", 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_search_skips_unparsable_items() {
        let base = serve(fake_nominatim()).await;
        let backend = NominatimBackend::new(format!("{}/partial", base), "en").unwrap();

        let results = backend.search("Nak", 6).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].place_name, "Nakuru");
    }
}
