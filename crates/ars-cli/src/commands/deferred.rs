use std::path::Path;

use ars_seasons::Saga;
use colored::Colorize;
use uuid::Uuid;

pub fn retry(
    dir: &Path,
    seed: u64,
    character: &str,
    series: &str,
    year: i32,
    season: &str,
) -> Result<(), String> {
    let start = super::slot(year, season)?;
    let mut engine = super::open_engine(dir, seed)?;
    let series = find_series(engine.saga(), character, series)?;
    let receipt = engine
        .retry_deferred(character, series, start)
        .map_err(super::rejected)?;
    println!(
        "  {} {} for {character} from {start}",
        "requeued".green(),
        receipt.activity.bold()
    );
    Ok(())
}

pub fn dismiss(dir: &Path, seed: u64, character: &str, series: &str) -> Result<(), String> {
    let mut engine = super::open_engine(dir, seed)?;
    let series = find_series(engine.saga(), character, series)?;
    let dropped = engine
        .abandon_deferred(character, series)
        .map_err(super::rejected)?;
    println!("  dropped {} ({})", dropped.activity.label().bold(), dropped.slot);
    Ok(())
}

/// Resolve a full series id or a unique prefix among the character's
/// deferred activities.
fn find_series(saga: &Saga, character: &str, prefix: &str) -> Result<Uuid, String> {
    if let Ok(id) = Uuid::parse_str(prefix) {
        return Ok(id);
    }
    let record = saga
        .characters
        .get(character)
        .ok_or_else(|| format!("character not found: \"{character}\""))?;
    let mut matches: Vec<Uuid> = record
        .deferred
        .iter()
        .map(|entry| entry.series)
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();
    matches.dedup();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("{character} has no deferred activity matching \"{prefix}\"")),
        _ => Err(format!("\"{prefix}\" matches several deferred activities")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ars_core::{Activity, Character, QueuedActivity, Season, TimelinePosition};

    #[test]
    fn prefix_picks_the_deferred_series() {
        let start = TimelinePosition::new(1220, Season::Spring);
        let entry = QueuedActivity::series(
            Activity::Service {
                ability: "Leadership".into(),
                description: String::new(),
            },
            start,
        )
        .remove(0);
        let id = entry.series;
        let mut character = Character::new("Aurelius");
        character.deferred.push(entry);
        let mut saga = Saga::new("Rhine", start);
        saga.add_character(character);

        let prefix = &id.to_string()[..8];
        assert_eq!(find_series(&saga, "Aurelius", prefix).unwrap(), id);
        assert!(find_series(&saga, "Aurelius", "zzz").is_err());
    }
}
