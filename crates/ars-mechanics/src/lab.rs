//! Laboratory totals and the extraordinary results table.

use ars_core::art::MAGIC_THEORY;
use ars_core::{Art, Character, Characteristic, Laboratory};
use serde::{Deserialize, Serialize};

use crate::dice::{RollSource, StressRoll, simple_die, stress_die};

/// Lab total for a technique and form: both Arts, Intelligence, Magic
/// Theory, the aura, and any laboratory bonus.
pub fn lab_total(
    character: &Character,
    technique: Art,
    form: Art,
    aura: i32,
    lab: Option<&Laboratory>,
) -> i32 {
    let arts = character.art_score(technique) + character.art_score(form);
    let magic_theory = character.ability_score(MAGIC_THEORY);
    let lab_bonus = lab.map_or(0, |l| l.bonus_for(technique, form));
    i32::try_from(arts + magic_theory).unwrap_or(i32::MAX)
        + character.characteristic(Characteristic::Intelligence)
        + aura
        + lab_bonus
}

/// What a lab assistant adds to the lead's lab total.
pub fn assistant_bonus(assistant: &Character) -> i32 {
    i32::try_from(assistant.ability_score(MAGIC_THEORY)).unwrap_or(i32::MAX)
        + assistant.characteristic(Characteristic::Intelligence)
}

/// Warping points gained from a season of work in a strong aura.
pub fn aura_warping(aura: i32) -> u32 {
    u32::try_from(((aura - 5) / 2).max(0)).unwrap_or(0)
}

/// An entry of the extraordinary results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extraordinary {
    /// A botch: the season's work is lost and the magus is warped.
    Disaster {
        /// Number of botches rolled.
        botches: u32,
    },
    /// A zero: some accumulated progress is lost.
    Setback {
        /// Points lost.
        points: u32,
    },
    /// Nothing unusual.
    NoEffect,
    /// Extra progress this season.
    Bonus {
        /// Points gained.
        points: u32,
    },
    /// The work completes at once.
    Breakthrough,
}

/// Roll on the extraordinary results table.
///
/// `botch_dice` comes from the experimental risk taken.
pub fn experimental_result(
    roller: &mut dyn RollSource,
    botch_dice: u32,
) -> (StressRoll, Extraordinary) {
    let die = stress_die(roller, botch_dice);
    let result = if die.is_botch() {
        Extraordinary::Disaster {
            botches: die.botches,
        }
    } else if die.is_zero() {
        Extraordinary::Setback {
            points: simple_die(roller),
        }
    } else {
        match die.value {
            0..=5 => Extraordinary::NoEffect,
            6..=9 => Extraordinary::Bonus {
                points: simple_die(roller),
            },
            10..=17 => Extraordinary::Bonus { points: die.value },
            _ => Extraordinary::Breakthrough,
        }
    };
    (die, result)
}
