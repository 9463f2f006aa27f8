use std::path::Path;

use ars_core::{Art, Character, CharacterStatus, Subject};
use ars_seasons::Saga;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(dir: &Path, character: Option<&str>) -> Result<(), String> {
    let saga = super::load_saga(dir)?;
    match character {
        Some(name) => show_character(&saga, name),
        None => {
            overview(&saga);
            Ok(())
        }
    }
}

fn overview(saga: &Saga) {
    println!("  {} {}", saga.name.bold(), format!("({})", saga.current).dimmed());
    println!();

    if saga.characters.is_empty() {
        println!("  No characters yet.");
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            "Character", "Age", "Covenant", "Status", "Queued", "Deferred", "Project",
        ]);
        for character in saga.characters.values() {
            let status = match character.status {
                CharacterStatus::Alive => "alive",
                CharacterStatus::Dead => "dead",
            };
            table.add_row(vec![
                character.name.clone(),
                character.age.to_string(),
                character.covenant.clone().unwrap_or_else(|| "—".to_string()),
                status.to_string(),
                character.activity_queue.len().to_string(),
                character.deferred.len().to_string(),
                project_line(character).unwrap_or_else(|| "—".to_string()),
            ]);
        }
        println!("{table}");
    }

    if !saga.covenants.is_empty() {
        println!();
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Covenant", "Aura", "Vis", "Library", "Resources"]);
        for covenant in saga.covenants.values() {
            table.add_row(vec![
                covenant.name.clone(),
                covenant.aura.to_string(),
                covenant.vis_stock.total().to_string(),
                covenant.library.len().to_string(),
                covenant.resources.to_string(),
            ]);
        }
        println!("{table}");
    }
}

fn show_character(saga: &Saga, name: &str) -> Result<(), String> {
    let character = saga
        .characters
        .get(name)
        .ok_or_else(|| format!("character not found: \"{name}\""))?;

    let status = match character.status {
        CharacterStatus::Alive => "alive".green(),
        CharacterStatus::Dead => "dead".red(),
    };
    println!("  {} [{}]", character.name.bold(), status);
    println!();
    println!("  age:         {} (looks {})", character.age, character.apparent_age);
    if let Some(covenant) = &character.covenant {
        println!("  covenant:    {covenant}");
    }
    if let Some(done) = character.last_executed {
        println!("  last season: {done}");
    }
    println!(
        "  warping:     {} ({} points)",
        character.warping_score(),
        character.warping_points
    );
    println!(
        "  decrepitude: {} ({} points)",
        character.decrepitude_score(),
        character.decrepitude_points
    );

    let arts: Vec<String> = Art::TECHNIQUES
        .into_iter()
        .chain(Art::FORMS)
        .filter(|art| character.arts.contains_key(art))
        .map(|art| {
            let subject = Subject::Art(art);
            format!("{art} {} ({} xp)", character.score(&subject), character.xp(&subject))
        })
        .collect();
    if !arts.is_empty() {
        println!("  arts:        {}", arts.join(", "));
    }
    let abilities: Vec<String> = character
        .abilities
        .iter()
        .map(|(name, xp)| format!("{name} {} ({xp} xp)", character.ability_score(name)))
        .collect();
    if !abilities.is_empty() {
        println!("  abilities:   {}", abilities.join(", "));
    }
    if let Some(project) = project_line(character) {
        println!("  project:     {project}");
    }
    if !character.spells.is_empty() {
        println!("  spells:      {}", character.spells.join(", "));
    }
    if !character.items.is_empty() {
        println!("  items:       {}", character.items.join(", "));
    }
    if !character.flags.is_empty() {
        let flags: Vec<&str> = character.flags.iter().map(String::as_str).collect();
        println!("  flags:       {}", flags.join(", "));
    }
    println!(
        "  queue:       {} queued, {} deferred",
        character.activity_queue.len(),
        character.deferred.len()
    );
    Ok(())
}

fn project_line(character: &Character) -> Option<String> {
    let project = character.in_progress_project.as_ref()?;
    let mut line = format!(
        "{} {}/{}",
        project.activity.label(),
        project.accumulated_progress,
        project.target_progress
    );
    if let Some(record) = &project.interruption {
        line.push_str(&format!(
            " (interrupted: {}, after {} season(s), until {})",
            record.reason,
            record.elapsed_seasons,
            record.blocked_until()
        ));
    }
    Some(line)
}
