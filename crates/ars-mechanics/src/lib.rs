//! Ars Magica game mechanics.
//!
//! Provides the ten-sided stress and simple dice with botch and exploding
//! semantics, the aging table, and laboratory total arithmetic including the
//! extraordinary results table for experimental research.

pub mod aging;
pub mod dice;
pub mod error;
pub mod lab;

pub use aging::{AgingOutcome, AgingReport, check_aging};
pub use dice::{
    CountingRolls, MAX_EXPLOSIONS, RollSource, ScriptedRolls, StressRoll, roll, simple_die, stress_die,
};
pub use error::{MechError, MechResult};
pub use lab::{Extraordinary, aura_warping, experimental_result, lab_total};
