//! Search-as-you-type controller
//!
//! Every keystroke goes through [`SearchController::on_query_change`]. Input
//! is debounced with a trailing timer; only the last query of a burst reaches
//! the geocoder. Each query takes a generation number, and a result set is
//! published only if its generation is still current when it arrives.

use crate::config::Config;
use crate::coord::SelectionType;
use crate::geo::resolver::search_places;
use crate::geo::{GeoBackend, SearchResult};
use crate::selection::{PendingSelection, SelectedLocation, SelectionWorkflow};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub debounce: Duration,
    /// Longest a single search may take before it counts as empty
    pub timeout: Duration,
    /// Maximum number of results requested
    pub limit: usize,
    /// Route chosen results through the preview gate instead of committing
    pub preview: bool,
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.geocoding.debounce(),
            timeout: config.geocoding.timeout(),
            limit: config.geocoding.search_limit,
            preview: config.selection.preview,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of choosing a search result
#[derive(Debug)]
pub enum SearchSelection {
    /// Committed; name resolution is running
    Committed(PendingSelection),
    /// Shown as a preview awaiting confirmation
    Previewed(SelectedLocation),
}

#[derive(Debug, Default)]
struct State {
    generation: u64,
    query: String,
}

struct Inner<G> {
    workflow: SelectionWorkflow<G>,
    settings: SearchSettings,
    state: Mutex<State>,
    results: watch::Sender<Vec<SearchResult>>,
}

/// Debounced geocoder search feeding the selection workflow
pub struct SearchController<G> {
    inner: Arc<Inner<G>>,
}

impl<G> Clone for SearchController<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: GeoBackend + 'static> SearchController<G> {
    pub fn new(workflow: SelectionWorkflow<G>, settings: SearchSettings) -> Self {
        let (results, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                workflow,
                settings,
                state: Mutex::new(State::default()),
                results,
            }),
        }
    }

    pub fn workflow(&self) -> &SelectionWorkflow<G> {
        &self.inner.workflow
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SearchResult>> {
        self.inner.results.subscribe()
    }

    /// Results of the latest completed query
    pub fn results(&self) -> Vec<SearchResult> {
        self.inner.results.borrow().clone()
    }

    /// The raw text of the latest query
    pub async fn query(&self) -> String {
        self.inner.state.lock().await.query.clone()
    }

    /// Handle a change of the search box text
    ///
    /// Blank text clears the results at once and cancels any pending search.
    /// Otherwise a search is scheduled after the debounce delay; the returned
    /// handle completes when it has been applied, discarded or skipped.
    pub async fn on_query_change(&self, text: &str) -> Option<JoinHandle<()>> {
        let generation = {
            let mut state = self.inner.state.lock().await;
            state.generation += 1;
            state.query = text.to_string();

            if text.trim().is_empty() {
                self.inner.results.send_replace(Vec::new());
                return None;
            }
            state.generation
        };

        let inner = Arc::clone(&self.inner);
        let query = text.trim().to_string();
        Some(tokio::spawn(async move {
            tokio::time::sleep(inner.settings.debounce).await;

            if inner.state.lock().await.generation != generation {
                return;
            }

            let found = search_places(
                inner.workflow.backend(),
                &query,
                inner.settings.limit,
                inner.settings.timeout,
            )
            .await;

            let state = inner.state.lock().await;
            if state.generation != generation {
                debug!("Discarding {} results for stale query {:?}", found.len(), query);
                return;
            }
            inner.results.send_replace(found);
        }))
    }

    /// Feed the result at `index` into the selection workflow
    ///
    /// Clears the result list and supersedes any pending search. Returns
    /// `None` when the index is out of range.
    pub async fn select_result(&self, index: usize) -> Option<SearchSelection> {
        let chosen = {
            let mut state = self.inner.state.lock().await;
            let chosen = self.inner.results.borrow().get(index).cloned()?;
            state.generation += 1;
            self.inner.results.send_replace(Vec::new());
            chosen
        };

        debug!("Selected search result {:?}", chosen.display_name);
        let workflow = &self.inner.workflow;
        let selection = if self.inner.settings.preview {
            SearchSelection::Previewed(
                workflow
                    .preview_coordinate(chosen.coordinate, SelectionType::Search)
                    .await,
            )
        } else {
            SearchSelection::Committed(
                workflow
                    .select_coordinate(chosen.coordinate, SelectionType::Search)
                    .await,
            )
        };
        Some(selection)
    }
}
