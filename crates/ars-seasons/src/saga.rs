use std::collections::BTreeMap;

use ars_core::{Character, Covenant, Laboratory, TimelinePosition};
use serde::{Deserialize, Serialize};

use crate::chronicle::Chronicle;
use crate::error::{SeasonError, SeasonResult};
use crate::weather::Weather;

/// The saga-level record saved alongside the individual documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaHeader {
    /// Saga name.
    pub name: String,
    /// The season the saga has reached.
    pub current: TimelinePosition,
    /// Dice drawn over the saga's life; reopening continues from here.
    #[serde(default)]
    pub rolls: u64,
    /// Weather of every season rolled so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weather: Vec<Weather>,
    /// Everything that has happened.
    #[serde(default)]
    pub chronicle: Chronicle,
}

/// The top-level container: every character, covenant, and laboratory of one
/// saga, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Saga {
    /// Saga name.
    pub name: String,
    /// The season the saga has reached.
    pub current: TimelinePosition,
    /// Characters by name.
    pub characters: BTreeMap<String, Character>,
    /// Covenants by name.
    pub covenants: BTreeMap<String, Covenant>,
    /// Laboratories by owner name.
    pub laboratories: BTreeMap<String, Laboratory>,
    /// Dice drawn so far.
    pub rolls: u64,
    /// Weather by season.
    pub weather: Vec<Weather>,
    /// Everything that has happened.
    pub chronicle: Chronicle,
}

impl Saga {
    /// Create an empty saga starting at `current`.
    pub fn new(name: impl Into<String>, current: TimelinePosition) -> Self {
        Self {
            name: name.into(),
            current,
            characters: BTreeMap::new(),
            covenants: BTreeMap::new(),
            laboratories: BTreeMap::new(),
            rolls: 0,
            weather: Vec::new(),
            chronicle: Chronicle::default(),
        }
    }

    /// Rebuild a saga from its header and records.
    pub fn from_parts(
        header: SagaHeader,
        characters: impl IntoIterator<Item = Character>,
        covenants: impl IntoIterator<Item = Covenant>,
        laboratories: impl IntoIterator<Item = Laboratory>,
    ) -> Self {
        Self {
            name: header.name,
            current: header.current,
            characters: characters.into_iter().map(|c| (c.name.clone(), c)).collect(),
            covenants: covenants.into_iter().map(|c| (c.name.clone(), c)).collect(),
            laboratories: laboratories
                .into_iter()
                .map(|l| (l.owner.clone(), l))
                .collect(),
            rolls: header.rolls,
            weather: header.weather,
            chronicle: header.chronicle,
        }
    }

    /// The saga-level record.
    pub fn header(&self) -> SagaHeader {
        SagaHeader {
            name: self.name.clone(),
            current: self.current,
            rolls: self.rolls,
            weather: self.weather.clone(),
            chronicle: self.chronicle.clone(),
        }
    }

    /// Add or replace a character.
    pub fn add_character(&mut self, character: Character) {
        self.characters.insert(character.name.clone(), character);
    }

    /// Add or replace a covenant.
    pub fn add_covenant(&mut self, covenant: Covenant) {
        self.covenants.insert(covenant.name.clone(), covenant);
    }

    /// Add or replace a laboratory.
    pub fn add_laboratory(&mut self, laboratory: Laboratory) {
        self.laboratories
            .insert(laboratory.owner.clone(), laboratory);
    }

    /// Look up a character.
    pub fn character(&self, name: &str) -> SeasonResult<&Character> {
        self.characters
            .get(name)
            .ok_or_else(|| SeasonError::CharacterNotFound(name.to_string()))
    }

    /// Look up a character mutably.
    pub fn character_mut(&mut self, name: &str) -> SeasonResult<&mut Character> {
        self.characters
            .get_mut(name)
            .ok_or_else(|| SeasonError::CharacterNotFound(name.to_string()))
    }

    /// The covenant a character belongs to, if it exists.
    pub fn covenant_of(&self, character: &Character) -> Option<&Covenant> {
        character
            .covenant
            .as_deref()
            .and_then(|name| self.covenants.get(name))
    }

    /// The aura a character works in: their covenant's, or 0.
    pub fn aura_for(&self, character: &Character) -> i32 {
        self.covenant_of(character).map_or(0, |c| c.aura)
    }

    /// The weather recorded for `slot`, if it has been rolled.
    pub fn weather_at(&self, slot: TimelinePosition) -> Option<&Weather> {
        self.weather.iter().find(|w| w.slot == slot)
    }

    /// Names of living characters in alphabetical order.
    pub fn living_characters(&self) -> Vec<String> {
        self.characters
            .values()
            .filter(|c| c.is_alive())
            .map(|c| c.name.clone())
            .collect()
    }
}
