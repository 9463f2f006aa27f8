use std::fs;
use std::path::Path;

use ars_core::Activity;
use ars_seasons::ScheduleReceipt;
use colored::Colorize;
use serde::Deserialize;

/// One entry of a batch file.
#[derive(Deserialize)]
struct BatchEntry {
    activity: Activity,
    year: i32,
    season: String,
}

pub fn run(
    dir: &Path,
    seed: u64,
    character: &str,
    activity: Option<&str>,
    year: Option<i32>,
    season: Option<&str>,
) -> Result<(), String> {
    let activity = activity.ok_or("an activity is required (or --file for a batch)")?;
    let (Some(year), Some(season)) = (year, season) else {
        return Err("--year and --season are required".into());
    };
    let activity = super::parse_activity(activity)?;
    let start = super::slot(year, season)?;

    let mut engine = super::open_engine(dir, seed)?;
    let receipt = engine
        .schedule(character, activity, start)
        .map_err(super::rejected)?;
    print_receipt(&receipt);
    Ok(())
}

pub fn batch(dir: &Path, seed: u64, character: &str, file: &Path) -> Result<(), String> {
    let text = fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let entries: Vec<BatchEntry> =
        serde_json::from_str(&text).map_err(|e| format!("invalid batch file: {e}"))?;
    let activities = entries
        .into_iter()
        .map(|entry| Ok((entry.activity, super::slot(entry.year, &entry.season)?)))
        .collect::<Result<Vec<_>, String>>()?;

    let mut engine = super::open_engine(dir, seed)?;
    let receipts = engine
        .schedule_many(character, activities)
        .map_err(super::rejected)?;
    for receipt in &receipts {
        print_receipt(receipt);
    }
    println!();
    println!("  {} activities queued for {character}", receipts.len());
    Ok(())
}

pub fn coordinate(
    dir: &Path,
    seed: u64,
    character: &str,
    activity: &str,
    year: i32,
    season: &str,
) -> Result<(), String> {
    let activity = super::parse_activity(activity)?;
    let slot = super::slot(year, season)?;

    let mut engine = super::open_engine(dir, seed)?;
    let receipt = engine
        .coordinate(character, activity, slot)
        .map_err(super::rejected)?;
    print_receipt(&receipt);
    Ok(())
}

fn print_receipt(receipt: &ScheduleReceipt) {
    let when = match (receipt.slots.first(), receipt.slots.last()) {
        (Some(first), Some(last)) if first != last => format!("{first} to {last}"),
        (Some(first), _) => first.to_string(),
        _ => String::new(),
    };
    println!(
        "  {} {} for {} in {}",
        "queued".green(),
        receipt.activity.bold(),
        receipt.character,
        when
    );
    if let Some(partner) = &receipt.reserved_for {
        println!("    {} reserved {}", partner, when.dimmed());
    }
    println!("    series {}", receipt.series.to_string().dimmed());
}
