//! Scripted geocoding backend for tests

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::geo::{Address, GeoBackend, PlaceName, SearchResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Geocoder with per-coordinate names and delays, recording every call
#[derive(Default)]
pub(crate) struct MockBackend {
    names: HashMap<String, String>,
    reverse_delays: HashMap<String, Duration>,
    search_delays: HashMap<String, Duration>,
    fail_reverse: bool,
    fail_search: bool,
    reverse_calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_name(mut self, coord: Coordinate, name: &str) -> Self {
        self.names.insert(coord.label(), name.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, coord: Coordinate, delay: Duration) -> Self {
        self.reverse_delays.insert(coord.label(), delay);
        self
    }

    pub(crate) fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(query.to_string(), delay);
        self
    }

    pub(crate) fn failing_reverse(mut self) -> Self {
        self.fail_reverse = true;
        self
    }

    pub(crate) fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub(crate) fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl GeoBackend for MockBackend {
    async fn reverse_geocode(&self, coord: Coordinate) -> Result<PlaceName> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.reverse_delays.get(&coord.label()) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_reverse {
            return Err(Error::Geocoding("scripted failure".to_string()));
        }

        let address = Address {
            city: Some(
                self.names
                    .get(&coord.label())
                    .cloned()
                    .unwrap_or_else(|| "Somewhere".to_string()),
            ),
            country: Some("Kenya".to_string()),
            ..Default::default()
        };
        Ok(PlaceName::from_address(&address, None, coord))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_search {
            return Err(Error::Geocoding("scripted failure".to_string()));
        }

        Ok((0..limit.min(3))
            .map(|i| {
                let address = Address {
                    city: Some(format!("{} {}", query, i)),
                    country: Some("Kenya".to_string()),
                    ..Default::default()
                };
                SearchResult::new(
                    Coordinate::new(-1.0 - i as f64, 36.0 + i as f64),
                    format!("{} {}, Kenya", query, i),
                    &address,
                )
            })
            .collect())
    }
}
