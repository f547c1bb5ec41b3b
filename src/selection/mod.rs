//! Location selection workflow
//!
//! Turns a chosen coordinate into the `SelectedLocation` the rest of the UI
//! renders. Each selection goes through two emissions:
//!
//! 1. **Provisional**: metrics are synthesized synchronously and the location
//!    is published straight away with a placeholder name and `is_loading`.
//! 2. **Resolved**: once the place name resolves (or falls back), the same
//!    location is published again with the name and `is_loading = false`.
//!
//! Every committed selection takes a new request id. A resolution result is
//! applied only if its id is still the latest when it arrives, so a slow
//! lookup for an older selection never overwrites a newer one.
//!
//! An optional preview gate shows a tentative location without committing it;
//! `confirm` promotes it into a normal selection and `cancel` drops it, leaving
//! the committed selection untouched. A new committed selection also drops
//! any open preview.

use crate::config::Config;
use crate::coord::region::find_region;
use crate::coord::{Coordinate, SelectionType};
use crate::environment::{synthesize_at, EnvironmentalSnapshot, SynthesisOptions};
use crate::error::{Error, Result};
use crate::geo::resolver::resolve_name;
use crate::geo::{GeoBackend, PlaceName};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Lifecycle stage of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    /// Metrics known, name still resolving
    Provisional,
    /// Name resolved or fallen back
    Resolved,
}

/// The location currently shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedLocation {
    /// Unique ID of this selection
    pub id: String,
    /// Sequence number used to detect superseded results
    pub request_id: u64,
    pub coordinate: Coordinate,
    pub environmental: EnvironmentalSnapshot,
    pub place: PlaceName,
    pub is_loading: bool,
    #[serde(default)]
    pub is_preview: bool,
    pub selection_type: SelectionType,
}

impl SelectedLocation {
    fn new(
        request_id: u64,
        coordinate: Coordinate,
        selection_type: SelectionType,
        options: &SynthesisOptions,
        place: PlaceName,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request_id,
            coordinate,
            environmental: synthesize_at(coordinate, options),
            place,
            is_loading: false,
            is_preview: false,
            selection_type,
        }
    }

    pub fn state(&self) -> SelectionState {
        if self.is_loading {
            SelectionState::Provisional
        } else {
            SelectionState::Resolved
        }
    }

    /// Same selection with its name resolved
    fn resolved(&self, place: PlaceName) -> Self {
        Self {
            place,
            is_loading: false,
            ..self.clone()
        }
    }
}

/// Tunables of the workflow
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub synthesis: SynthesisOptions,
    /// Reverse geocoding timeout
    pub timeout: Duration,
    /// Number of resolved selections remembered
    pub recent_limit: usize,
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            synthesis: SynthesisOptions::from_config(&config.synthesis),
            timeout: config.geocoding.timeout(),
            recent_limit: config.selection.recent_limit,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A committed selection whose name is still resolving
#[derive(Debug)]
pub struct PendingSelection {
    /// The provisional location, already published
    pub location: SelectedLocation,
    /// Completes once the resolution has been applied or discarded
    pub resolution: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct State {
    /// Last id handed out
    next_id: u64,
    /// Id of the latest committed selection
    latest: u64,
    preview: Option<SelectedLocation>,
    recent: VecDeque<SelectedLocation>,
}

struct Inner<G> {
    backend: G,
    settings: WorkflowSettings,
    state: Mutex<State>,
    current: watch::Sender<Option<SelectedLocation>>,
    preview: watch::Sender<Option<SelectedLocation>>,
}

/// Owner of the current selection
pub struct SelectionWorkflow<G> {
    inner: Arc<Inner<G>>,
}

impl<G> Clone for SelectionWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: GeoBackend + 'static> SelectionWorkflow<G> {
    /// Create a workflow with no selection
    pub fn new(backend: G, settings: WorkflowSettings) -> Self {
        let (current, _) = watch::channel(None);
        let (preview, _) = watch::channel(None);

        Self {
            inner: Arc::new(Inner {
                backend,
                settings,
                state: Mutex::new(State::default()),
                current,
                preview,
            }),
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.inner.settings
    }

    pub fn backend(&self) -> &G {
        &self.inner.backend
    }

    /// Receive every committed selection as it is published
    pub fn subscribe(&self) -> watch::Receiver<Option<SelectedLocation>> {
        self.inner.current.subscribe()
    }

    /// Receive preview changes
    pub fn subscribe_preview(&self) -> watch::Receiver<Option<SelectedLocation>> {
        self.inner.preview.subscribe()
    }

    /// The latest committed selection
    pub fn current(&self) -> Option<SelectedLocation> {
        self.inner.current.borrow().clone()
    }

    /// The pending preview, if any
    pub fn preview(&self) -> Option<SelectedLocation> {
        self.inner.preview.borrow().clone()
    }

    /// Most recent resolved selections, newest first
    pub async fn recent(&self) -> Vec<SelectedLocation> {
        self.inner.state.lock().await.recent.iter().cloned().collect()
    }

    /// Commit a coordinate as the current selection
    ///
    /// Publishes the provisional location before returning and starts the
    /// name resolution in the background. Any earlier in-flight resolution is
    /// superseded.
    pub async fn select_coordinate(
        &self,
        coord: Coordinate,
        selection_type: SelectionType,
    ) -> PendingSelection {
        let provisional = {
            let mut state = self.inner.state.lock().await;
            state.next_id += 1;
            state.latest = state.next_id;
            self.inner.drop_preview(&mut state);

            let mut location = SelectedLocation::new(
                state.latest,
                coord,
                selection_type,
                &self.inner.settings.synthesis,
                PlaceName::placeholder(coord),
            );
            location.is_loading = true;

            self.inner.current.send_replace(Some(location.clone()));
            location
        };

        let inner = Arc::clone(&self.inner);
        let pending = provisional.clone();
        let resolution = tokio::spawn(async move {
            let place = resolve_name(&inner.backend, coord, inner.settings.timeout).await;
            inner.apply(&pending, place).await;
        });

        PendingSelection {
            location: provisional,
            resolution,
        }
    }

    /// Commit a catalog region under its own name, without geocoding
    pub async fn select_region(&self, name: &str) -> Result<SelectedLocation> {
        let region = find_region(name).ok_or_else(|| Error::UnknownRegion(name.to_string()))?;
        let coord = region.center();

        let mut state = self.inner.state.lock().await;
        state.next_id += 1;
        state.latest = state.next_id;
        self.inner.drop_preview(&mut state);

        let location = SelectedLocation::new(
            state.latest,
            coord,
            SelectionType::Region,
            &self.inner.settings.synthesis,
            PlaceName::named(region.name, coord),
        );

        remember(&mut state.recent, &location, self.inner.settings.recent_limit);
        self.inner.current.send_replace(Some(location.clone()));
        Ok(location)
    }

    /// Show a tentative location without committing it
    pub async fn preview_coordinate(
        &self,
        coord: Coordinate,
        selection_type: SelectionType,
    ) -> SelectedLocation {
        let mut state = self.inner.state.lock().await;
        state.next_id += 1;

        let mut location = SelectedLocation::new(
            state.next_id,
            coord,
            selection_type,
            &self.inner.settings.synthesis,
            PlaceName::fallback(coord),
        );
        location.is_preview = true;

        state.preview = Some(location.clone());
        self.inner.preview.send_replace(Some(location.clone()));
        location
    }

    /// Promote the preview to the committed selection
    ///
    /// Returns `None` when there is nothing to confirm.
    pub async fn confirm(&self) -> Option<PendingSelection> {
        let preview = {
            let mut state = self.inner.state.lock().await;
            let preview = state.preview.take()?;
            self.inner.preview.send_replace(None);
            preview
        };

        Some(
            self.select_coordinate(preview.coordinate, preview.selection_type)
                .await,
        )
    }

    /// Drop the preview and return the committed selection it was hiding
    pub async fn cancel(&self) -> Option<SelectedLocation> {
        let mut state = self.inner.state.lock().await;
        self.inner.drop_preview(&mut state);
        self.current()
    }
}

impl<G> Inner<G> {
    fn drop_preview(&self, state: &mut State) {
        if state.preview.take().is_some() {
            self.preview.send_replace(None);
        }
    }

    /// Publish a resolved name unless a newer selection has been made
    async fn apply(&self, provisional: &SelectedLocation, place: PlaceName) {
        let mut state = self.state.lock().await;

        if state.latest != provisional.request_id {
            debug!(
                "Discarding superseded resolution {} (latest is {})",
                provisional.request_id, state.latest
            );
            return;
        }

        let resolved = provisional.resolved(place);
        remember(&mut state.recent, &resolved, self.settings.recent_limit);
        self.current.send_replace(Some(resolved));
    }
}

/// Push to the front of the recent list, dropping duplicates and overflow
fn remember(recent: &mut VecDeque<SelectedLocation>, location: &SelectedLocation, limit: usize) {
    recent.retain(|r| r.coordinate != location.coordinate);
    recent.push_front(location.clone());
    recent.truncate(limit);
}
