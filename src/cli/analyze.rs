//! Analyze command handler
//!
//! Asks the backend how likely each weather variable is to cross a threshold
//! on a calendar date at the chosen location.

use crate::api::{AnalysisRequest, ApiClient, ClimateRequest, Envelope, Threshold, Variable};
use crate::config::Config;
use crate::coord::region::find_region;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::session::SessionStore;
use chrono::NaiveDate;
use clap::Args;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with = "region")]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat", conflicts_with = "region")]
    pub lon: Option<f64>,

    /// Analyze the centre of a catalog region
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Date as YYYY-MM-DD (defaults to today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// variable:value[:above|below], repeatable
    #[arg(long = "threshold", short = 't', default_value = "temperature:30:above")]
    pub thresholds: Vec<Threshold>,

    /// Also print the five-year NASA averages
    #[arg(long)]
    pub climate: bool,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let coord = match (&args.region, args.lat, args.lon) {
        (Some(name), _, _) => find_region(name)
            .ok_or_else(|| Error::UnknownRegion(name.clone()))?
            .center(),
        (None, Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        _ => {
            return Err(Error::InvalidCoordinates(
                "No location specified. Use --lat/--lon or --region".to_string(),
            ))
        }
    };
    coord.validate()?;

    let config = Config::load()?;
    let token = SessionStore::load()?.token().map(str::to_string);
    let client = ApiClient::from_config(&config.api)?.with_token(token);
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    if args.climate {
        match client.nasa_data(&ClimateRequest::new(coord, date)).await {
            Envelope::Success { data, message } => {
                if let Some(message) = message {
                    eprintln!("{}", message);
                }
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
            Envelope::Failure { error } => eprintln!("Climate data unavailable: {}", error),
        }
    }

    let request = AnalysisRequest::new(coord, date, &args.thresholds);
    let results = client.analysis(&request).await.into_result()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("Threshold analysis for {} on {}", coord.short_label(), date);
    for result in &results {
        let unit = result
            .variable
            .parse::<Variable>()
            .map(|v| v.unit())
            .unwrap_or("");
        let condition = result
            .threshold
            .map(|t| format!("{} {}{}", t.operator, t.value, unit))
            .unwrap_or_default();
        println!(
            "  {:14} {:>3}%  {:6}  {}",
            result.variable,
            result.probability,
            result.level.to_string(),
            condition
        );
    }

    Ok(())
}
