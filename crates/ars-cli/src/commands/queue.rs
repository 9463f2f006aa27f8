use std::path::Path;

use ars_core::QueuedActivity;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(dir: &Path, character: &str) -> Result<(), String> {
    let saga = super::load_saga(dir)?;
    let record = saga
        .characters
        .get(character)
        .ok_or_else(|| format!("character not found: \"{character}\""))?;

    println!("  {} {}", record.name.bold(), "queue".dimmed());
    println!();
    if record.activity_queue.is_empty() {
        println!("  Nothing queued.");
    } else {
        println!("{}", table(&record.activity_queue));
    }

    if !record.deferred.is_empty() {
        println!();
        println!("  {}", "Deferred".bold().underline());
        println!("{}", table(&record.deferred));
    }
    Ok(())
}

fn table(entries: &[QueuedActivity]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Season", "Activity", "Part", "Series"]);
    for entry in entries {
        let series = entry.series.to_string();
        table.add_row(vec![
            entry.slot.to_string(),
            entry.activity.label(),
            format!("{}/{}", entry.part, entry.of),
            series[..8].to_string(),
        ]);
    }
    table
}
