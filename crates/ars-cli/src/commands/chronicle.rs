use std::path::Path;

use ars_seasons::{ChronicleEntry, ChronicleKind};
use colored::Colorize;

pub fn run(dir: &Path, name: Option<&str>, last: Option<usize>) -> Result<(), String> {
    let saga = super::load_saga(dir)?;

    let entries: Vec<&ChronicleEntry> = match name {
        Some(name) => saga.chronicle.entries_for(name),
        None => saga.chronicle.entries().iter().collect(),
    };
    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));

    println!("  {} {}", "Chronicle".bold().underline(), saga.name.dimmed());
    println!();
    if entries.is_empty() {
        println!("  {}", "(no entries)".dimmed());
        return Ok(());
    }
    for entry in entries.iter().skip(skip) {
        let when = format!("[{}]", entry.at).dimmed();
        println!("  {when} {}", colorize(&entry.kind, &entry.description));
    }
    println!();
    println!("  {} entries", entries.len());
    Ok(())
}

fn colorize(kind: &ChronicleKind, description: &str) -> String {
    match kind {
        ChronicleKind::Died { .. } => description.red().bold().to_string(),
        ChronicleKind::ActivityFailed { .. } | ChronicleKind::ActivityLapsed { .. } => {
            description.red().to_string()
        }
        ChronicleKind::Interrupted { .. } | ChronicleKind::Abandoned { .. } => {
            description.yellow().to_string()
        }
        ChronicleKind::ProjectCompleted { .. } => description.green().bold().to_string(),
        ChronicleKind::RandomEvent { .. } => description.magenta().to_string(),
        ChronicleKind::Weather { .. } => description.cyan().to_string(),
        ChronicleKind::Scheduled { .. } | ChronicleKind::Reserved { .. } => {
            description.dimmed().to_string()
        }
        _ => description.to_string(),
    }
}
