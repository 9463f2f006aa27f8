use std::path::Path;

use colored::Colorize;

pub fn interrupt(
    dir: &Path,
    seed: u64,
    character: &str,
    reason: &str,
    duration: u32,
    save_progress: bool,
) -> Result<(), String> {
    let mut engine = super::open_engine(dir, seed)?;
    let report = engine
        .interrupt(character, reason, duration, save_progress)
        .map_err(super::rejected)?;

    println!(
        "  {} {} for {} season(s): {}",
        report.project.bold(),
        super::state_label(report.state),
        duration,
        reason
    );
    println!("    {} season(s) of work done", report.elapsed_seasons);
    if report.released > 0 {
        println!("    released {} queued season(s)", report.released);
    }
    match (report.saved_progress, report.resumable_from) {
        (Some(progress), Some(from)) => {
            println!("    {progress} points kept; resumable from {from}");
        }
        _ => println!("    {}", "progress discarded".red()),
    }
    Ok(())
}

pub fn resume(
    dir: &Path,
    seed: u64,
    character: &str,
    year: i32,
    season: &str,
    seasons: Option<u32>,
) -> Result<(), String> {
    let start = super::slot(year, season)?;
    let mut engine = super::open_engine(dir, seed)?;
    let receipt = engine
        .resume(character, start, seasons)
        .map_err(super::rejected)?;
    let record = engine
        .saga()
        .characters
        .get(character)
        .and_then(|c| c.in_progress_project.as_ref())
        .and_then(|p| p.interruption.clone());

    let last = receipt.slots.last().copied().unwrap_or(start);
    println!(
        "  {} {} from {} to {}",
        "resumed".green(),
        receipt.activity.bold(),
        start,
        last
    );
    if let Some(record) = record {
        println!(
            "    {} season(s) already worked, {} points carried over",
            record.elapsed_seasons, record.saved_progress
        );
    }
    Ok(())
}

pub fn abandon(dir: &Path, seed: u64, character: &str) -> Result<(), String> {
    let mut engine = super::open_engine(dir, seed)?;
    let project = engine
        .abandon_project(character)
        .map_err(super::rejected)?;
    println!("  {character} abandoned {}", project.bold());
    Ok(())
}
