use std::path::Path;

use ars_seasons::{ExecutionState, SeasonReport, WeatherKind};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn season_for(
    dir: &Path,
    seed: u64,
    character: &str,
    year: i32,
    season: &str,
) -> Result<(), String> {
    let slot = super::slot(year, season)?;
    let mut engine = super::open_engine(dir, seed)?;
    let report = engine.execute(character, slot).map_err(super::rejected)?;
    print_report(&report);
    Ok(())
}

pub fn year(dir: &Path, seed: u64, character: &str, year: i32, events: bool) -> Result<(), String> {
    let mut engine = super::open_engine(dir, seed)?;
    let reports = engine
        .execute_year(character, year, events)
        .map_err(super::rejected)?;

    println!(
        "  {} {} {}",
        "Year".bold(),
        year,
        format!("({character}, seed={seed})").dimmed()
    );
    println!();
    if reports.is_empty() {
        println!("  {}", "(every season of this year was already executed)".dimmed());
        return Ok(());
    }
    print_table(&reports);
    Ok(())
}

pub fn saga_season(dir: &Path, seed: u64, events: bool) -> Result<(), String> {
    let mut engine = super::open_engine(dir, seed)?;
    let slot = engine.saga().current;
    let reports = engine
        .execute_saga_season(events)
        .map_err(super::rejected)?;

    println!(
        "  {} {} {}",
        "Season".bold(),
        slot,
        format!("({} characters)", reports.len()).dimmed()
    );
    if let Some(weather) = reports.iter().find_map(|r| r.weather.as_ref()) {
        println!("  {} {}", "Weather:".dimmed(), weather.description());
    }
    println!();
    if !reports.is_empty() {
        print_table(&reports);
        println!();
    }
    println!("  The saga moves on to {}", engine.saga().current);
    Ok(())
}

fn print_report(report: &SeasonReport) {
    println!(
        "  {} {}: {}",
        report.character.bold(),
        report.slot,
        super::state_label(report.state)
    );
    if let Some(activity) = &report.activity {
        println!("    activity: {activity}");
    }
    let summary = if report.state == ExecutionState::Failed {
        report.summary.red().to_string()
    } else {
        report.summary.clone()
    };
    println!("    {summary}");
    for event in &report.events {
        println!("    {} {event}", "EVENT".yellow().bold());
    }
}

fn print_table(reports: &[SeasonReport]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Character", "Season", "State", "Activity", "Result"]);
    for report in reports {
        let state = match report.state {
            ExecutionState::Failed => match report.failure {
                Some(kind) => format!("failed ({kind:?})"),
                None => "failed".to_string(),
            },
            ExecutionState::Completed => "completed".to_string(),
            ExecutionState::Interrupted => "interrupted".to_string(),
            ExecutionState::Idle => "idle".to_string(),
            ExecutionState::Executing => "executing".to_string(),
        };
        let mut result = report.summary.clone();
        if let Some(weather) = report.weather.as_ref().filter(|w| w.kind != WeatherKind::Mild) {
            result.push_str(&format!("\nweather: {}", weather.description()));
        }
        for event in &report.events {
            result.push_str(&format!("\nevent: {event}"));
        }
        table.add_row(vec![
            report.character.clone(),
            report.slot.to_string(),
            state,
            report.activity.clone().unwrap_or_else(|| "—".to_string()),
            result,
        ]);
    }
    println!("{table}");
}
