//! Locate command handler
//!
//! Runs one selection through the workflow: the provisional location is
//! reported as soon as the metrics are known, the full output once the place
//! name has resolved or fallen back.

use crate::config::Config;
use crate::coord::{Coordinate, SelectionType};
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, url::UrlFormatter, OutputFormatter};
use crate::geo::nominatim::NominatimBackend;
use crate::selection::{SelectedLocation, SelectionWorkflow, WorkflowSettings};
use clap::Args;

#[derive(Args)]
pub struct LocateArgs {
    #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with = "region")]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat", conflicts_with = "region")]
    pub lon: Option<f64>,

    /// Pick a catalog region instead of a coordinate
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Map provider for the url format
    #[arg(long)]
    pub provider: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats and regions
    #[arg(short = 'F', long = "list")]
    pub list: bool,
}

pub async fn run(args: LocateArgs) -> Result<()> {
    if args.list {
        list_choices();
        return Ok(());
    }

    let config = Config::load()?;
    let backend = NominatimBackend::from_config(&config.geocoding)?;
    let workflow = SelectionWorkflow::new(backend, WorkflowSettings::from_config(&config));

    let location = match (&args.region, args.lat, args.lon) {
        (Some(region), _, _) => workflow.select_region(region).await?,
        (None, Some(lat), Some(lon)) => {
            let coord = Coordinate::new(lat, lon);
            coord.validate()?;
            select_and_wait(&workflow, coord).await
        }
        _ => {
            return Err(Error::InvalidCoordinates(
                "No location specified. Use --lat/--lon or --region".to_string(),
            ))
        }
    };

    render(&location, &config, &args)
}

async fn select_and_wait(
    workflow: &SelectionWorkflow<NominatimBackend>,
    coord: Coordinate,
) -> SelectedLocation {
    let pending = workflow.select_coordinate(coord, SelectionType::Click).await;
    let provisional = &pending.location;
    eprintln!(
        "{} ({}): {}, {:.1}{}",
        provisional.place.name,
        provisional.coordinate.short_label(),
        provisional.environmental.crop_suitability,
        provisional.environmental.temperature,
        provisional.environmental.units.temperature_unit()
    );

    let fallback = pending.location.clone();
    if let Err(e) = pending.resolution.await {
        tracing::warn!("Name resolution task failed: {}", e);
    }
    workflow.current().unwrap_or(fallback)
}

fn render(location: &SelectedLocation, config: &Config, args: &LocateArgs) -> Result<()> {
    let output = if args.format.eq_ignore_ascii_case("url") {
        UrlFormatter.format_with_provider(location, config, args.provider.as_deref())?
    } else {
        let formatter = get_formatter(&args.format)
            .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;
        formatter.format(location, config)?
    };
    super::emit(&output, args.output.as_deref())
}

fn list_choices() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
    println!();
    println!("Available regions:");
    for region in crate::coord::region::available_regions() {
        println!("  {:10} {}", region.name, region.center().short_label());
    }
}
