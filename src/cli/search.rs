//! Search command handler
//!
//! Runs a query through the search controller and lists the candidates;
//! `--pick N` feeds the N-th result into the selection workflow.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{get_formatter, OutputFormatter};
use crate::geo::nominatim::NominatimBackend;
use crate::search::{SearchController, SearchSelection, SearchSettings};
use crate::selection::{SelectionWorkflow, WorkflowSettings};
use clap::Args;

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text place query
    pub query: String,

    /// Select the N-th result (1-based)
    #[arg(long, short = 'p')]
    pub pick: Option<usize>,

    /// Output format for the picked location
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let backend = NominatimBackend::from_config(&config.geocoding)?;
    let workflow = SelectionWorkflow::new(backend, WorkflowSettings::from_config(&config));
    let search = SearchController::new(workflow.clone(), SearchSettings::from_config(&config));

    if let Some(task) = search.on_query_change(&args.query).await {
        if let Err(e) = task.await {
            tracing::warn!("Search task failed: {}", e);
        }
    }

    let results = search.results();
    if results.is_empty() {
        eprintln!("No places found for '{}'", args.query.trim());
        return Ok(());
    }

    let Some(pick) = args.pick else {
        for (i, result) in results.iter().enumerate() {
            println!(
                "{:>2}. {} ({})",
                i + 1,
                result.display_name,
                result.coordinate.short_label()
            );
        }
        return Ok(());
    };

    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let chosen = match pick.checked_sub(1) {
        Some(index) => search.select_result(index).await,
        None => None,
    };
    let pending = match chosen {
        Some(SearchSelection::Committed(pending)) => pending,
        Some(SearchSelection::Previewed(preview)) => {
            eprintln!("Previewing {}", preview.coordinate.label());
            workflow
                .confirm()
                .await
                .ok_or_else(|| Error::Config("Preview vanished before confirmation".to_string()))?
        }
        None => {
            return Err(Error::Config(format!(
                "No result #{} ({} found)",
                pick,
                results.len()
            )))
        }
    };

    let fallback = pending.location.clone();
    if let Err(e) = pending.resolution.await {
        tracing::warn!("Name resolution task failed: {}", e);
    }
    let location = workflow.current().unwrap_or(fallback);

    println!("{}", formatter.format(&location, &config)?);
    Ok(())
}
