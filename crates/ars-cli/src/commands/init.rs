use std::fs;
use std::path::Path;

use ars_seasons::{Saga, SagaStore};

use crate::store::{HEADER_FILE, JsonStore};

pub fn run(dir: &Path, name: &str, year: i32, season: &str) -> Result<(), String> {
    let start = super::slot(year, season)?;
    let mut store = JsonStore::new(dir);
    if store.exists() {
        return Err(format!("{} already holds a saga", dir.display()));
    }
    fs::create_dir_all(dir).map_err(|e| format!("cannot create directory: {e}"))?;

    let saga = Saga::new(name, start);
    store
        .save_header(&saga.header())
        .map_err(|e| format!("cannot write {HEADER_FILE}: {e}"))?;

    println!("Created saga '{}' in {}/", name, dir.display());
    println!("  {HEADER_FILE}  saga date ({start}) and chronicle");
    println!();
    println!("Get started:");
    println!("  ars new-covenant <name> --aura 3");
    println!("  ars new-character <name> --covenant <covenant> --lab");
    println!("  ars schedule <name> '<activity json>' --year {year} --season {season}");
    println!("  ars season    # resolve the current season for everyone");

    Ok(())
}
