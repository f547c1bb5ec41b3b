//! agri-space: farm location explorer
//!
//! A library and CLI for choosing a location on a map and seeing what a farm
//! there would look like: deterministic environmental metrics, a resolved
//! place name, and threshold probabilities from the weather backend.
//!
//! ## Features
//!
//! - Deterministic metric/imperial environmental synthesis per coordinate
//! - Reverse geocoding with timeout and fallback naming
//! - Provisional → resolved selection workflow with supersession and preview
//! - Debounced search-as-you-type
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use agri_space::environment::{synthesize, UnitSystem};
//!
//! let snapshot = synthesize(-1.2921, 36.8219, UnitSystem::Metric); // Nairobi
//! assert!(snapshot.soil_moisture <= 100);
//! println!("{}: {}", snapshot.crop_suitability, snapshot.recommendation);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod environment;
pub mod error;
pub mod format;
pub mod geo;
pub mod search;
pub mod selection;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use coord::{Coordinate, SelectionType};
pub use environment::{synthesize, EnvironmentalSnapshot, UnitSystem};
pub use error::{Error, Result};
pub use selection::{SelectedLocation, SelectionWorkflow};
