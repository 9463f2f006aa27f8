//! Yearly aging rolls.
//!
//! Every Winter a character old enough rolls a stress die (no botch), adds a
//! tenth of their age rounded up, and subtracts their longevity modifier.

use ars_core::Character;
use ars_core::art::ability_score;
use serde::{Deserialize, Serialize};

use crate::dice::{RollSource, stress_die};

/// Decrepitude score at which a character dies.
pub const FATAL_DECREPITUDE: u32 = 5;

/// What an aging roll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgingOutcome {
    /// The character shows no sign of the year.
    NoEffect,
    /// The character looks a year older.
    ApparentAge,
    /// The character gains decrepitude points.
    Decrepitude(u32),
    /// An aging crisis: decrepitude points and a brush with death.
    Crisis(u32),
}

impl AgingOutcome {
    /// Decrepitude points gained.
    pub fn decrepitude(self) -> u32 {
        match self {
            Self::NoEffect | Self::ApparentAge => 0,
            Self::Decrepitude(points) | Self::Crisis(points) => points,
        }
    }
}

/// Look up an aging total on the table.
pub fn aging_outcome(total: i32) -> AgingOutcome {
    match total {
        i32::MIN..=2 => AgingOutcome::NoEffect,
        3..=9 => AgingOutcome::ApparentAge,
        10..=12 => AgingOutcome::Decrepitude(1),
        13..=21 => AgingOutcome::Decrepitude(2),
        _ => AgingOutcome::Crisis(3),
    }
}

/// Result of one aging check, ready to be applied to a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// The modified aging total.
    pub total: i32,
    /// Table outcome.
    pub outcome: AgingOutcome,
    /// Years added to apparent age.
    pub apparent_years: u32,
    /// Decrepitude points gained.
    pub decrepitude_points: u32,
    /// True if the new decrepitude score is fatal.
    pub fatal: bool,
}

/// Roll aging for `character` without modifying it.
pub fn check_aging(character: &Character, roller: &mut dyn RollSource) -> AgingReport {
    let die = stress_die(roller, 0);
    let age_modifier = i32::try_from(character.age.div_ceil(10)).unwrap_or(i32::MAX);
    let total = i32::try_from(die.value)
        .unwrap_or(i32::MAX)
        .saturating_add(age_modifier)
        .saturating_sub(character.longevity);
    let outcome = aging_outcome(total);
    let decrepitude_points = outcome.decrepitude();
    let apparent_years = u32::from(outcome != AgingOutcome::NoEffect);
    let fatal =
        ability_score(character.decrepitude_points + decrepitude_points) >= FATAL_DECREPITUDE;
    AgingReport {
        total,
        outcome,
        apparent_years,
        decrepitude_points,
        fatal,
    }
}
