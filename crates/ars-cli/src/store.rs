//! A saga stored as pretty-printed JSON documents in a directory:
//!
//! ```text
//! saga.json
//! characters/<name>.json
//! covenants/<name>.json
//! laboratories/<owner>.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ars_core::{Character, Covenant, Laboratory};
use ars_seasons::{SagaHeader, SagaStore, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const HEADER_FILE: &str = "saga.json";
const CHARACTERS: &str = "characters";
const COVENANTS: &str = "covenants";
const LABORATORIES: &str = "laboratories";

pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns true if a saga header exists in the directory.
    pub fn exists(&self) -> bool {
        self.root.join(HEADER_FILE).is_file()
    }

    fn record_path(&self, folder: &str, name: &str) -> PathBuf {
        self.root.join(folder).join(format!("{}.json", file_stem(name)))
    }

    fn names(&self, folder: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(folder);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|source| io_error(&dir, source))?;
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    fn read<T: DeserializeOwned>(
        &self,
        path: &Path,
        kind: &'static str,
        name: &str,
    ) -> Result<T, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    kind,
                    name: name.to_string(),
                }
            } else {
                io_error(path, source)
            }
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Format {
            path: path.display().to_string(),
            source,
        })
    }

    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }
        let text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Format {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, text + "\n").map_err(|source| io_error(path, source))
    }
}

/// Record names become file names; path separators are replaced.
fn file_stem(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl SagaStore for JsonStore {
    fn load_header(&self) -> Result<SagaHeader, StoreError> {
        let path = self.root.join(HEADER_FILE);
        self.read(&path, "saga", &self.root.display().to_string())
    }

    fn save_header(&mut self, header: &SagaHeader) -> Result<(), StoreError> {
        self.write(&self.root.join(HEADER_FILE), header)
    }

    fn character_names(&self) -> Result<Vec<String>, StoreError> {
        self.names(CHARACTERS)
    }

    fn load_character(&self, name: &str) -> Result<Character, StoreError> {
        self.read(&self.record_path(CHARACTERS, name), "character", name)
    }

    fn save_character(&mut self, character: &Character) -> Result<(), StoreError> {
        self.write(&self.record_path(CHARACTERS, &character.name), character)
    }

    fn covenant_names(&self) -> Result<Vec<String>, StoreError> {
        self.names(COVENANTS)
    }

    fn load_covenant(&self, name: &str) -> Result<Covenant, StoreError> {
        self.read(&self.record_path(COVENANTS, name), "covenant", name)
    }

    fn save_covenant(&mut self, covenant: &Covenant) -> Result<(), StoreError> {
        self.write(&self.record_path(COVENANTS, &covenant.name), covenant)
    }

    fn laboratory_names(&self) -> Result<Vec<String>, StoreError> {
        self.names(LABORATORIES)
    }

    fn load_laboratory(&self, owner: &str) -> Result<Laboratory, StoreError> {
        self.read(&self.record_path(LABORATORIES, owner), "laboratory", owner)
    }

    fn save_laboratory(&mut self, laboratory: &Laboratory) -> Result<(), StoreError> {
        self.write(&self.record_path(LABORATORIES, &laboratory.owner), laboratory)
    }
}
