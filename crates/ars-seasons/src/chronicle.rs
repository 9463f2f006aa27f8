use ars_core::TimelinePosition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::weather::WeatherKind;

/// What kind of thing happened in the saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChronicleKind {
    /// An activity was added to a queue.
    Scheduled {
        /// Whose queue.
        character: String,
        /// Label of the activity.
        activity: String,
    },
    /// A counterpart entry was reserved on a partner's queue.
    Reserved {
        /// The initiator.
        character: String,
        /// The partner whose slot was reserved.
        partner: String,
    },
    /// A season's activity resolved.
    ActivityCompleted {
        /// The acting character.
        character: String,
        /// Label of the activity.
        activity: String,
    },
    /// A coupled pair resolved together.
    CoupledResolved {
        /// The teacher or lead.
        initiator: String,
        /// The student or assistant.
        partner: String,
    },
    /// A project gained progress but is not finished.
    ProjectAdvanced {
        /// The character.
        character: String,
        /// Label of the project.
        project: String,
        /// Progress so far.
        progress: u32,
        /// Progress needed.
        target: u32,
    },
    /// A project finished.
    ProjectCompleted {
        /// The character.
        character: String,
        /// Label of the project.
        project: String,
    },
    /// An activity failed to resolve.
    ActivityFailed {
        /// The character.
        character: String,
        /// Label of the activity.
        activity: String,
        /// Why it failed.
        reason: String,
    },
    /// A queued entry passed without being executed and was deferred.
    ActivityLapsed {
        /// The character.
        character: String,
        /// Label of the activity.
        activity: String,
    },
    /// A project was interrupted.
    Interrupted {
        /// The character.
        character: String,
        /// Label of the project.
        project: String,
        /// Whether progress was kept.
        saved: bool,
    },
    /// An interrupted project was picked up again.
    Resumed {
        /// The character.
        character: String,
        /// Label of the project.
        project: String,
    },
    /// A project was abandoned.
    Abandoned {
        /// The character.
        character: String,
        /// Label of the project.
        project: String,
    },
    /// A character made an aging roll.
    Aged {
        /// The character.
        character: String,
        /// Decrepitude points gained.
        decrepitude: u32,
    },
    /// A character died.
    Died {
        /// The character.
        character: String,
        /// Cause of death.
        cause: String,
    },
    /// A random event struck.
    RandomEvent {
        /// The character whose season it followed.
        character: String,
        /// The affected covenant, if any.
        covenant: Option<String>,
        /// Event title.
        title: String,
    },
    /// A covenant harvested its vis sources.
    VisCollected {
        /// The covenant.
        covenant: String,
        /// Pawns gathered.
        pawns: u32,
    },
    /// The season's weather was rolled.
    Weather {
        /// How it turned out.
        weather: WeatherKind,
    },
}

impl ChronicleKind {
    /// Check whether a named character or covenant is involved.
    pub fn involves(&self, name: &str) -> bool {
        match self {
            Self::Scheduled { character, .. }
            | Self::ActivityCompleted { character, .. }
            | Self::ProjectAdvanced { character, .. }
            | Self::ProjectCompleted { character, .. }
            | Self::ActivityFailed { character, .. }
            | Self::ActivityLapsed { character, .. }
            | Self::Interrupted { character, .. }
            | Self::Resumed { character, .. }
            | Self::Abandoned { character, .. }
            | Self::Aged { character, .. }
            | Self::Died { character, .. } => character == name,
            Self::Reserved { character, partner } => character == name || partner == name,
            Self::CoupledResolved { initiator, partner } => initiator == name || partner == name,
            Self::RandomEvent {
                character,
                covenant,
                ..
            } => character == name || covenant.as_deref() == Some(name),
            Self::VisCollected { covenant, .. } => covenant == name,
            Self::Weather { .. } => false,
        }
    }
}

/// A record of something that happened in the saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicleEntry {
    /// The saga slot it happened in.
    pub at: TimelinePosition,
    /// The specific kind of entry.
    pub kind: ChronicleKind,
    /// A human-readable description.
    pub description: String,
    /// Wall-clock time it was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl ChronicleEntry {
    /// Create an entry stamped with the current time.
    pub fn new(at: TimelinePosition, kind: ChronicleKind, description: impl Into<String>) -> Self {
        Self {
            at,
            kind,
            description: description.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Accumulates chronicle entries for a saga.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chronicle {
    entries: Vec<ChronicleEntry>,
    #[serde(default)]
    max_entries: usize,
}

impl Chronicle {
    /// Create a chronicle with the given maximum capacity (0 = unlimited).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    /// Change the capacity, trimming the oldest entries if needed.
    pub fn set_capacity(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.trim();
    }

    /// Append an entry, dropping the oldest entries if over capacity.
    pub fn push(&mut self, entry: ChronicleEntry) {
        self.entries.push(entry);
        self.trim();
    }

    fn trim(&mut self) {
        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            let drain_count = self.entries.len() - self.max_entries;
            self.entries.drain(..drain_count);
        }
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> &[ChronicleEntry] {
        &self.entries
    }

    /// Entries recorded in the given slot.
    pub fn entries_at(&self, at: TimelinePosition) -> Vec<&ChronicleEntry> {
        self.entries.iter().filter(|e| e.at == at).collect()
    }

    /// Entries involving the given character or covenant.
    pub fn entries_for(&self, name: &str) -> Vec<&ChronicleEntry> {
        self.entries.iter().filter(|e| e.kind.involves(name)).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
