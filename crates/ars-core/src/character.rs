use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::activity::QueuedActivity;
use crate::art::{Art, Characteristic, Subject, ability_score, art_score};
use crate::project::InProgressProject;
use crate::timeline::TimelinePosition;

/// Whether a character can still act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterStatus {
    /// Alive and able to take seasonal activities.
    #[default]
    Alive,
    /// Dead; the queue is frozen.
    Dead,
}

/// A magus, companion, or grog tracked by the saga.
///
/// Arts and Abilities are stored as experience; scores are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Unique name within the saga.
    pub name: String,
    /// Player controlling the character.
    #[serde(default)]
    pub player: Option<String>,
    /// Covenant the character belongs to.
    #[serde(default)]
    pub covenant: Option<String>,
    /// Age in years.
    pub age: u32,
    /// Apparent age in years.
    pub apparent_age: u32,
    /// Characteristic scores.
    #[serde(default)]
    pub characteristics: BTreeMap<Characteristic, i32>,
    /// Experience per Art.
    #[serde(default)]
    pub arts: BTreeMap<Art, u32>,
    /// Experience per Ability.
    #[serde(default)]
    pub abilities: BTreeMap<String, u32>,
    /// Accumulated warping points.
    #[serde(default)]
    pub warping_points: u32,
    /// Accumulated decrepitude points.
    #[serde(default)]
    pub decrepitude_points: u32,
    /// Longevity ritual modifier subtracted from aging rolls.
    #[serde(default)]
    pub longevity: i32,
    /// Alive or dead.
    #[serde(default)]
    pub status: CharacterStatus,
    /// Narrative flags set by stories, events, and custom activities.
    #[serde(default)]
    pub flags: BTreeSet<String>,
    /// Known spells.
    #[serde(default)]
    pub spells: Vec<String>,
    /// Enchanted items and item designs.
    #[serde(default)]
    pub items: Vec<String>,
    /// Titles of tractatus already read.
    #[serde(default)]
    pub sources_read: BTreeSet<String>,
    /// Planned activities in execution order.
    #[serde(default)]
    pub activity_queue: Vec<QueuedActivity>,
    /// Activities that lapsed or failed and await a retry or abandon decision.
    #[serde(default)]
    pub deferred: Vec<QueuedActivity>,
    /// The multi-season project currently being worked on.
    #[serde(default)]
    pub in_progress_project: Option<InProgressProject>,
    /// The most recent slot this character executed.
    #[serde(default)]
    pub last_executed: Option<TimelinePosition>,
}

impl Character {
    /// Create a 25-year-old character with an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            player: None,
            covenant: None,
            age: 25,
            apparent_age: 25,
            characteristics: BTreeMap::new(),
            arts: BTreeMap::new(),
            abilities: BTreeMap::new(),
            warping_points: 0,
            decrepitude_points: 0,
            longevity: 0,
            status: CharacterStatus::Alive,
            flags: BTreeSet::new(),
            spells: Vec::new(),
            items: Vec::new(),
            sources_read: BTreeSet::new(),
            activity_queue: Vec::new(),
            deferred: Vec::new(),
            in_progress_project: None,
            last_executed: None,
        }
    }

    /// Set the covenant.
    pub fn with_covenant(mut self, covenant: impl Into<String>) -> Self {
        self.covenant = Some(covenant.into());
        self
    }

    /// Set both real and apparent age.
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self.apparent_age = age;
        self
    }

    /// Set a characteristic score.
    pub fn with_characteristic(mut self, characteristic: Characteristic, value: i32) -> Self {
        self.characteristics.insert(characteristic, value);
        self
    }

    /// Give the character exactly enough experience for a score.
    pub fn with_score(mut self, subject: Subject, score: u32) -> Self {
        let xp = subject.xp_for_score(score);
        self.set_xp(&subject, xp);
        self
    }

    /// Returns true if the character is alive.
    pub fn is_alive(&self) -> bool {
        self.status == CharacterStatus::Alive
    }

    /// A characteristic score, 0 if unset.
    pub fn characteristic(&self, characteristic: Characteristic) -> i32 {
        self.characteristics.get(&characteristic).copied().unwrap_or(0)
    }

    /// Current score in an Art.
    pub fn art_score(&self, art: Art) -> u32 {
        art_score(self.arts.get(&art).copied().unwrap_or(0))
    }

    /// Current score in an Ability.
    pub fn ability_score(&self, ability: &str) -> u32 {
        ability_score(self.abilities.get(ability).copied().unwrap_or(0))
    }

    /// Experience held in a subject.
    pub fn xp(&self, subject: &Subject) -> u32 {
        match subject {
            Subject::Art(art) => self.arts.get(art).copied().unwrap_or(0),
            Subject::Ability(name) => self.abilities.get(name).copied().unwrap_or(0),
        }
    }

    /// Current score in a subject.
    pub fn score(&self, subject: &Subject) -> u32 {
        subject.score_for_xp(self.xp(subject))
    }

    /// Overwrite the experience held in a subject.
    pub fn set_xp(&mut self, subject: &Subject, xp: u32) {
        match subject {
            Subject::Art(art) => {
                self.arts.insert(*art, xp);
            }
            Subject::Ability(name) => {
                self.abilities.insert(name.clone(), xp);
            }
        }
    }

    /// Add experience to a subject.
    pub fn add_xp(&mut self, subject: &Subject, xp: u32) {
        let total = self.xp(subject).saturating_add(xp);
        self.set_xp(subject, total);
    }

    /// Warping score derived from warping points.
    pub fn warping_score(&self) -> u32 {
        ability_score(self.warping_points)
    }

    /// Decrepitude score derived from decrepitude points.
    pub fn decrepitude_score(&self) -> u32 {
        ability_score(self.decrepitude_points)
    }

    /// The queue entry occupying `slot`, if any.
    pub fn queued_at(&self, slot: TimelinePosition) -> Option<&QueuedActivity> {
        self.activity_queue.iter().find(|entry| entry.slot == slot)
    }

    /// Seasons already committed by queued entries in `year`.
    pub fn committed_in_year(&self, year: i32) -> u32 {
        let count = self
            .activity_queue
            .iter()
            .filter(|entry| entry.slot.year == year)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// The slot of the last queued entry.
    pub fn last_queued(&self) -> Option<TimelinePosition> {
        self.activity_queue.iter().map(|entry| entry.slot).max()
    }
}
