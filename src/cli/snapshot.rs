//! Snapshot command handler
//!
//! Prints the synthesized environmental metrics for a coordinate without
//! geocoding or touching any selection state.

use crate::config::Config;
use crate::coord::Coordinate;
use crate::environment::{synthesize_at, SynthesisOptions, UnitSystem};
use crate::error::Result;
use clap::Args;

#[derive(Args)]
pub struct SnapshotArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// metric or imperial (defaults to synthesis.units)
    #[arg(long, short = 'u')]
    pub units: Option<UnitSystem>,

    /// Fold a month (1-12) into the values
    #[arg(long, short = 'm', value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

pub fn run(args: SnapshotArgs) -> Result<()> {
    let config = Config::load()?;

    let coord = Coordinate::new(args.lat, args.lon);
    coord.validate()?;

    let mut options = SynthesisOptions::from_config(&config.synthesis);
    if let Some(units) = args.units {
        options.units = units;
    }
    if let Some(month) = args.month {
        options = options.with_month(month);
    }

    let snapshot = synthesize_at(coord, &options);
    let output = serde_json::to_string_pretty(&snapshot)?;
    super::emit(&output, args.output.as_deref())
}
