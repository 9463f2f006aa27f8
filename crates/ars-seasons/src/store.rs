//! Persistence of saga records.
//!
//! Characters, covenants, and laboratories are separate documents so a
//! season only rewrites what it touched. The saga header carries the
//! current season and the chronicle.

use std::collections::BTreeMap;

use ars_core::{Character, Covenant, Laboratory};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::saga::{Saga, SagaHeader};

/// Errors raised by a [`SagaStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record of this kind and name exists.
    #[error("{kind} not found in store: \"{name}\"")]
    NotFound {
        /// Record kind ("character", "covenant", ...).
        kind: &'static str,
        /// Record name.
        name: String,
    },

    /// The underlying storage could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        /// Location of the record.
        path: String,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded or decoded.
    #[error("malformed record {path}: {source}")]
    Format {
        /// Location of the record.
        path: String,
        /// The decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Loads and saves the documents of one saga.
pub trait SagaStore {
    /// Load the saga header.
    fn load_header(&self) -> Result<SagaHeader, StoreError>;
    /// Save the saga header.
    fn save_header(&mut self, header: &SagaHeader) -> Result<(), StoreError>;

    /// Names of every stored character.
    fn character_names(&self) -> Result<Vec<String>, StoreError>;
    /// Load one character.
    fn load_character(&self, name: &str) -> Result<Character, StoreError>;
    /// Save one character.
    fn save_character(&mut self, character: &Character) -> Result<(), StoreError>;

    /// Names of every stored covenant.
    fn covenant_names(&self) -> Result<Vec<String>, StoreError>;
    /// Load one covenant.
    fn load_covenant(&self, name: &str) -> Result<Covenant, StoreError>;
    /// Save one covenant.
    fn save_covenant(&mut self, covenant: &Covenant) -> Result<(), StoreError>;

    /// Owners of every stored laboratory.
    fn laboratory_names(&self) -> Result<Vec<String>, StoreError>;
    /// Load one laboratory by owner.
    fn load_laboratory(&self, owner: &str) -> Result<Laboratory, StoreError>;
    /// Save one laboratory.
    fn save_laboratory(&mut self, laboratory: &Laboratory) -> Result<(), StoreError>;
}

/// Load every record of a saga.
pub fn load_saga(store: &impl SagaStore) -> Result<Saga, StoreError> {
    let header = store.load_header()?;
    let characters = store
        .character_names()?
        .iter()
        .map(|name| store.load_character(name))
        .collect::<Result<Vec<_>, _>>()?;
    let covenants = store
        .covenant_names()?
        .iter()
        .map(|name| store.load_covenant(name))
        .collect::<Result<Vec<_>, _>>()?;
    let laboratories = store
        .laboratory_names()?
        .iter()
        .map(|owner| store.load_laboratory(owner))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Saga::from_parts(header, characters, covenants, laboratories))
}

/// Save every record of a saga.
pub fn save_saga(store: &mut impl SagaStore, saga: &Saga) -> Result<(), StoreError> {
    for character in saga.characters.values() {
        store.save_character(character)?;
    }
    for covenant in saga.covenants.values() {
        store.save_covenant(covenant)?;
    }
    for laboratory in saga.laboratories.values() {
        store.save_laboratory(laboratory)?;
    }
    store.save_header(&saga.header())
}

/// A store that keeps encoded documents in memory. Used by tests and
/// embedding callers that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    header: Option<serde_json::Value>,
    characters: BTreeMap<String, serde_json::Value>,
    covenants: BTreeMap<String, serde_json::Value>,
    laboratories: BTreeMap<String, serde_json::Value>,
    saves: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents written so far.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// The stored document of a character, as JSON.
    pub fn character_document(&self, name: &str) -> Option<&serde_json::Value> {
        self.characters.get(name)
    }

    fn put<T: Serialize>(
        &mut self,
        kind: &'static str,
        name: &str,
        value: &T,
    ) -> Result<serde_json::Value, StoreError> {
        self.saves += 1;
        serde_json::to_value(value).map_err(|source| StoreError::Format {
            path: format!("memory:{kind}/{name}"),
            source,
        })
    }
}

fn get<T: DeserializeOwned>(
    documents: &BTreeMap<String, serde_json::Value>,
    kind: &'static str,
    name: &str,
) -> Result<T, StoreError> {
    let document = documents.get(name).ok_or_else(|| StoreError::NotFound {
        kind,
        name: name.to_string(),
    })?;
    serde_json::from_value(document.clone()).map_err(|source| StoreError::Format {
        path: format!("memory:{kind}/{name}"),
        source,
    })
}

impl SagaStore for MemoryStore {
    fn load_header(&self) -> Result<SagaHeader, StoreError> {
        let document = self.header.as_ref().ok_or_else(|| StoreError::NotFound {
            kind: "saga",
            name: "header".into(),
        })?;
        serde_json::from_value(document.clone()).map_err(|source| StoreError::Format {
            path: "memory:saga".into(),
            source,
        })
    }

    fn save_header(&mut self, header: &SagaHeader) -> Result<(), StoreError> {
        let document = self.put("saga", "header", header)?;
        self.header = Some(document);
        Ok(())
    }

    fn character_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.characters.keys().cloned().collect())
    }

    fn load_character(&self, name: &str) -> Result<Character, StoreError> {
        get(&self.characters, "character", name)
    }

    fn save_character(&mut self, character: &Character) -> Result<(), StoreError> {
        let document = self.put("character", &character.name, character)?;
        self.characters.insert(character.name.clone(), document);
        Ok(())
    }

    fn covenant_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.covenants.keys().cloned().collect())
    }

    fn load_covenant(&self, name: &str) -> Result<Covenant, StoreError> {
        get(&self.covenants, "covenant", name)
    }

    fn save_covenant(&mut self, covenant: &Covenant) -> Result<(), StoreError> {
        let document = self.put("covenant", &covenant.name, covenant)?;
        self.covenants.insert(covenant.name.clone(), document);
        Ok(())
    }

    fn laboratory_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.laboratories.keys().cloned().collect())
    }

    fn load_laboratory(&self, owner: &str) -> Result<Laboratory, StoreError> {
        get(&self.laboratories, "laboratory", owner)
    }

    fn save_laboratory(&mut self, laboratory: &Laboratory) -> Result<(), StoreError> {
        let document = self.put("laboratory", &laboratory.owner, laboratory)?;
        self.laboratories.insert(laboratory.owner.clone(), document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ars_core::{Activity, Art, InProgressProject, ResearchTarget, Season, TimelinePosition};

    fn saga() -> Saga {
        let start = TimelinePosition::new(1220, Season::Spring);
        let mut saga = Saga::new("Tribunal of the Rhine", start);
        let mut magus = Character::new("Aurelius").with_covenant("Semita Errabunda");
        magus.in_progress_project = Some(InProgressProject::new(
            Activity::Research {
                topic: "Wards against fire".into(),
                target: ResearchTarget::Spell,
                technique: Art::Rego,
                form: Art::Ignem,
                level: 20,
                seasons: 3,
                experimental: false,
                assistant: None,
            },
            20,
            start,
        ));
        saga.add_character(magus);
        saga.add_covenant(Covenant::new("Semita Errabunda", 3).with_vis(Art::Vim, 6));
        saga.add_laboratory(Laboratory::new("Aurelius"));
        saga
    }

    #[test]
    fn save_then_load_restores_saga() {
        let saga = saga();
        let mut store = MemoryStore::new();
        save_saga(&mut store, &saga).unwrap();
        assert_eq!(store.saves(), 4);
        let loaded = load_saga(&store).unwrap();
        assert_eq!(loaded, saga);
    }

    #[test]
    fn project_is_stored_flat() {
        let mut store = MemoryStore::new();
        save_saga(&mut store, &saga()).unwrap();
        let document = store.character_document("Aurelius").unwrap();
        let project = &document["in_progress_project"];
        assert_eq!(project["activity_type"], "research");
        assert_eq!(project["accumulated_progress"], 0);
        assert_eq!(project["interrupted"], false);
    }

    #[test]
    fn missing_records_report_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.load_header(),
            Err(StoreError::NotFound { kind: "saga", .. })
        ));
        let err = store.load_character("Nobody").unwrap_err();
        assert_eq!(err.to_string(), "character not found in store: \"Nobody\"");
    }
}
