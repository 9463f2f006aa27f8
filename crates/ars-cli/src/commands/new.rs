use std::path::Path;

use ars_core::{Art, Character, Covenant, Laboratory, StudySource, Subject};
use ars_seasons::SeasonConfig;

pub struct SourceSpec {
    pub title: String,
    pub subject: String,
    pub quality: u32,
    pub level: Option<u32>,
    pub single_use: bool,
}

pub fn character(
    dir: &Path,
    name: &str,
    covenant: Option<&str>,
    age: u32,
    scores: &[String],
    lab: bool,
) -> Result<(), String> {
    let mut engine = super::open_engine(dir, SeasonConfig::default().seed)?;
    if engine.saga().characters.contains_key(name) {
        return Err(format!("character already exists: \"{name}\""));
    }
    if let Some(covenant) = covenant {
        if !engine.saga().covenants.contains_key(covenant) {
            return Err(format!("covenant not found: \"{covenant}\""));
        }
    }

    let mut record = Character::new(name).with_age(age);
    for score in scores {
        let (subject, value) = split_pair(score, "SUBJECT=SCORE")?;
        record = record.with_score(Subject::parse(subject), value);
    }
    if let Some(covenant) = covenant {
        record = record.with_covenant(covenant);
    }

    engine
        .update(|saga| {
            if let Some(covenant) = covenant.and_then(|c| saga.covenants.get_mut(c)) {
                covenant.magi.push(name.to_string());
            }
            saga.add_character(record);
            if lab {
                saga.add_laboratory(Laboratory::new(name));
            }
        })
        .map_err(|e| format!("cannot save: {e}"))?;

    println!("Added character '{name}'");
    if lab {
        println!("  with a laboratory");
    }
    Ok(())
}

pub fn covenant(dir: &Path, name: &str, aura: i32, vis: &[String]) -> Result<(), String> {
    let mut engine = super::open_engine(dir, SeasonConfig::default().seed)?;
    if engine.saga().covenants.contains_key(name) {
        return Err(format!("covenant already exists: \"{name}\""));
    }

    let mut record = Covenant::new(name, aura);
    for pair in vis {
        let (art, pawns) = split_pair(pair, "ART=PAWNS")?;
        let art: Art = art.parse().map_err(|e| format!("{e}"))?;
        record = record.with_vis(art, pawns);
    }
    let pawns = record.vis_stock.total();

    engine
        .update(|saga| saga.add_covenant(record))
        .map_err(|e| format!("cannot save: {e}"))?;

    println!("Added covenant '{name}' (aura {aura}, {pawns} pawns of vis)");
    Ok(())
}

pub fn source(dir: &Path, covenant: &str, spec: SourceSpec) -> Result<(), String> {
    let mut engine = super::open_engine(dir, SeasonConfig::default().seed)?;
    let library = &engine
        .saga()
        .covenants
        .get(covenant)
        .ok_or_else(|| format!("covenant not found: \"{covenant}\""))?
        .library;
    if library.iter().any(|s| s.title == spec.title) {
        return Err(format!("\"{}\" is already in the library", spec.title));
    }

    let subject = Subject::parse(&spec.subject);
    let mut book = match spec.level {
        Some(level) => StudySource::summa(&spec.title, subject, level, spec.quality),
        None => StudySource::tractatus(&spec.title, subject, spec.quality),
    };
    if spec.single_use {
        book = book.single_use();
    }
    let kind = if spec.level.is_some() { "summa" } else { "tractatus" };

    engine
        .update(|saga| {
            if let Some(record) = saga.covenants.get_mut(covenant) {
                record.library.push(book);
            }
        })
        .map_err(|e| format!("cannot save: {e}"))?;

    println!("Added {kind} \"{}\" to the library of {covenant}", spec.title);
    Ok(())
}

/// Split `key=value` with a numeric value.
fn split_pair<'a>(pair: &'a str, shape: &str) -> Result<(&'a str, u32), String> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("expected {shape}, got \"{pair}\""))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("expected {shape}, got \"{pair}\""))?;
    Ok((key.trim(), value))
}
