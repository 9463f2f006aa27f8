pub mod chronicle;
pub mod deferred;
pub mod execute;
pub mod init;
pub mod new;
pub mod project;
pub mod queue;
pub mod schedule;
pub mod status;

use std::path::Path;

use ars_core::{Activity, Season, TimelinePosition};
use ars_seasons::{
    ExecutionState, OperationOutcome, Saga, SeasonConfig, SeasonEngine, SeasonError,
};
use colored::Colorize;

use crate::store::JsonStore;

/// Open the saga in `dir` for running operations. The dice pick up from the
/// saga's roll count, so separate runs do not repeat each other.
fn open_engine(dir: &Path, seed: u64) -> Result<SeasonEngine<JsonStore>, String> {
    let store = open_store(dir)?;
    let config = SeasonConfig::default().with_seed(seed);
    SeasonEngine::open(store, config).map_err(|e| format!("cannot load saga: {e}"))
}

/// Load the saga in `dir` for display only.
fn load_saga(dir: &Path) -> Result<Saga, String> {
    let store = open_store(dir)?;
    ars_seasons::store::load_saga(&store).map_err(|e| format!("cannot load saga: {e}"))
}

fn open_store(dir: &Path) -> Result<JsonStore, String> {
    let store = JsonStore::new(dir);
    if !store.exists() {
        return Err(format!(
            "no saga in {} (create one with `ars init <name>`)",
            dir.display()
        ));
    }
    Ok(store)
}

fn slot(year: i32, season: &str) -> Result<TimelinePosition, String> {
    let season: Season = season.parse().map_err(|e| format!("{e}"))?;
    Ok(TimelinePosition::new(year, season))
}

fn parse_activity(json: &str) -> Result<Activity, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid activity: {e}"))
}

/// Print a failed operation's outcome and turn it into the command error.
fn rejected(error: SeasonError) -> String {
    let outcome = OperationOutcome::failure(&error);
    tracing::warn!(%outcome, "operation rejected");
    outcome.to_string()
}

fn state_label(state: ExecutionState) -> colored::ColoredString {
    match state {
        ExecutionState::Completed => "completed".green(),
        ExecutionState::Failed => "failed".red().bold(),
        ExecutionState::Interrupted => "interrupted".yellow(),
        ExecutionState::Idle => "idle".dimmed(),
        ExecutionState::Executing => "executing".normal(),
    }
}
