//! Ten-sided dice: simple rolls, stress rolls, and botch checks.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Anything that can produce die faces.
///
/// Implemented for a seeded [`StdRng`] and for [`ScriptedRolls`], which
/// replays fixed faces for deterministic tests.
pub trait RollSource {
    /// A raw d10 face, 0..=9.
    fn face(&mut self) -> u32;

    /// A uniform draw in `0..n`, used for percentile checks and tables.
    fn below(&mut self, n: u32) -> u32;
}

impl RollSource for StdRng {
    fn face(&mut self) -> u32 {
        self.random_range(0..10)
    }

    fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.random_range(0..n)
    }
}

impl<R: RollSource + ?Sized> RollSource for &mut R {
    fn face(&mut self) -> u32 {
        (**self).face()
    }

    fn below(&mut self, n: u32) -> u32 {
        (**self).below(n)
    }
}

/// Wraps a [`RollSource`] and counts every face and draw taken from it.
#[derive(Debug)]
pub struct CountingRolls<R> {
    inner: R,
    drawn: u64,
}

impl<R: RollSource> CountingRolls<R> {
    /// Start counting draws from `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner, drawn: 0 }
    }

    /// Faces and draws taken so far.
    pub fn drawn(&self) -> u64 {
        self.drawn
    }
}

impl<R: RollSource> RollSource for CountingRolls<R> {
    fn face(&mut self) -> u32 {
        self.drawn += 1;
        self.inner.face()
    }

    fn below(&mut self, n: u32) -> u32 {
        self.drawn += 1;
        self.inner.below(n)
    }
}

/// A [`RollSource`] that replays a fixed script.
///
/// Once the faces run out every further face is `fallback`; once the draws
/// run out every further draw is `n - 1`, the highest possible value.
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    faces: VecDeque<u32>,
    draws: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedRolls {
    /// Script the given faces. Every face must be in 0..=9.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> MechResult<Self> {
        let faces: VecDeque<u32> = faces.into_iter().collect();
        if let Some(bad) = faces.iter().find(|f| **f > 9) {
            return Err(MechError::InvalidFace(*bad));
        }
        Ok(Self {
            faces,
            draws: VecDeque::new(),
            fallback: 5,
        })
    }

    /// Script the values returned by [`RollSource::below`].
    pub fn with_draws(mut self, draws: impl IntoIterator<Item = u32>) -> Self {
        self.draws = draws.into_iter().collect();
        self
    }

    /// Change the face returned once the script is exhausted.
    pub fn with_fallback(mut self, face: u32) -> MechResult<Self> {
        if face > 9 {
            return Err(MechError::InvalidFace(face));
        }
        self.fallback = face;
        Ok(self)
    }

    /// Faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl RollSource for ScriptedRolls {
    fn face(&mut self) -> u32 {
        self.faces.pop_front().unwrap_or(self.fallback)
    }

    fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.draws.pop_front().map_or(n - 1, |v| v % n)
    }
}

/// A simple die: 1..=10, with a face of 0 read as 10.
pub fn simple_die(roller: &mut dyn RollSource) -> u32 {
    match roller.face() {
        0 => 10,
        face => face,
    }
}

/// The result of a stress die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressRoll {
    /// Final value; 0 when a zero was rolled.
    pub value: u32,
    /// Doubling factor from consecutive ones (1 if none).
    pub multiplier: u32,
    /// Botch dice that came up zero.
    pub botches: u32,
    /// Every face drawn, in order, including botch dice.
    pub faces: Vec<u32>,
}

impl StressRoll {
    /// Returns true if any botch die came up zero.
    pub fn is_botch(&self) -> bool {
        self.botches > 0
    }

    /// Returns true if the first face was a zero.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Returns true if at least one 1 doubled the result.
    pub fn exploded(&self) -> bool {
        self.multiplier > 1
    }
}

/// Doublings a single stress die can reach; a further 1 reads as 1.
pub const MAX_EXPLOSIONS: u32 = 10;

/// Roll a stress die.
///
/// A 1 rerolls and doubles, up to [`MAX_EXPLOSIONS`] times. A 0 scores zero and rolls
/// `botch_dice` further dice; each of those showing 0 is a botch. With no
/// botch dice a zero is simply zero.
pub fn stress_die(roller: &mut dyn RollSource, botch_dice: u32) -> StressRoll {
    let mut faces = Vec::new();
    let first = roller.face();
    faces.push(first);

    match first {
        0 => {
            let mut botches = 0;
            for _ in 0..botch_dice {
                let face = roller.face();
                faces.push(face);
                if face == 0 {
                    botches += 1;
                }
            }
            StressRoll {
                value: 0,
                multiplier: 1,
                botches,
                faces,
            }
        }
        1 => {
            let mut multiplier: u32 = 2;
            let mut explosions = 1;
            loop {
                let face = roller.face();
                faces.push(face);
                match face {
                    1 if explosions < MAX_EXPLOSIONS => {
                        multiplier = multiplier.saturating_mul(2);
                        explosions += 1;
                    }
                    0 => {
                        return StressRoll {
                            value: 10 * multiplier,
                            multiplier,
                            botches: 0,
                            faces,
                        };
                    }
                    face => {
                        return StressRoll {
                            value: face * multiplier,
                            multiplier,
                            botches: 0,
                            faces,
                        };
                    }
                }
            }
        }
        face => StressRoll {
            value: face,
            multiplier: 1,
            botches: 0,
            faces,
        },
    }
}

/// Roll a single die: a stress die with one botch die, or a simple die.
///
/// A stress result of 0 signals a possible botch.
pub fn roll(roller: &mut dyn RollSource, stress: bool) -> u32 {
    if stress {
        stress_die(roller, 1).value
    } else {
        simple_die(roller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn scripted(faces: &[u32]) -> ScriptedRolls {
        ScriptedRolls::new(faces.iter().copied()).unwrap()
    }

    #[test]
    fn simple_die_reads_zero_as_ten() {
        let mut dice = scripted(&[0, 7]);
        assert_eq!(simple_die(&mut dice), 10);
        assert_eq!(simple_die(&mut dice), 7);
    }

    #[test]
    fn stress_plain_face() {
        let roll = stress_die(&mut scripted(&[6]), 1);
        assert_eq!(roll.value, 6);
        assert!(!roll.exploded());
        assert!(!roll.is_botch());
    }

    #[test]
    fn stress_one_doubles_repeatedly() {
        let roll = stress_die(&mut scripted(&[1, 1, 4]), 1);
        assert_eq!(roll.multiplier, 4);
        assert_eq!(roll.value, 16);
        assert_eq!(roll.faces, vec![1, 1, 4]);

        let roll = stress_die(&mut scripted(&[1, 0]), 1);
        assert_eq!(roll.value, 20);
    }

    #[test]
    fn endless_ones_stop_doubling() {
        let mut dice = scripted(&[]).with_fallback(1).unwrap();
        let roll = stress_die(&mut dice, 1);
        assert_eq!(roll.multiplier, 1 << MAX_EXPLOSIONS);
        assert_eq!(roll.value, 1024);
        assert_eq!(roll.faces.len(), 11);
    }

    #[test]
    fn counting_rolls_tallies_faces_and_draws() {
        let mut inner = scripted(&[1, 6, 4]).with_draws([12]);
        let mut counted = CountingRolls::new(&mut inner);
        assert_eq!(stress_die(&mut counted, 1).value, 12);
        assert_eq!(counted.below(100), 12);
        assert_eq!(counted.drawn(), 3);
        assert_eq!(inner.remaining(), 1);
    }

    #[test]
    fn stress_zero_checks_for_botch() {
        let roll = stress_die(&mut scripted(&[0, 0, 3, 0]), 3);
        assert!(roll.is_zero());
        assert_eq!(roll.botches, 2);
        assert!(roll.is_botch());

        let roll = stress_die(&mut scripted(&[0, 4]), 1);
        assert!(roll.is_zero());
        assert!(!roll.is_botch());
    }

    #[test]
    fn zero_without_botch_dice_is_plain_zero() {
        let mut dice = scripted(&[0, 0]);
        let roll = stress_die(&mut dice, 0);
        assert_eq!(roll.value, 0);
        assert!(!roll.is_botch());
        assert_eq!(dice.remaining(), 1);
    }

    #[test]
    fn roll_dispatches_on_stress_flag() {
        let mut dice = scripted(&[0, 3, 0]);
        assert_eq!(roll(&mut dice, true), 0);
        assert_eq!(roll(&mut dice, false), 10);
    }

    #[test]
    fn scripted_rejects_invalid_faces() {
        assert!(matches!(
            ScriptedRolls::new([3, 12]),
            Err(MechError::InvalidFace(12))
        ));
        assert!(scripted(&[]).with_fallback(10).is_err());
    }

    #[test]
    fn scripted_draws_fall_back_to_highest() {
        let mut dice = scripted(&[]).with_draws([7]);
        assert_eq!(dice.below(100), 7);
        assert_eq!(dice.below(100), 99);
        assert_eq!(dice.face(), 5);
    }

    #[test]
    fn seeded_rng_faces_in_range_and_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let face = a.face();
            assert!(face <= 9);
            assert_eq!(face, b.face());
        }
        for _ in 0..50 {
            assert!(stress_die(&mut a, 1).value <= 10 * 1024);
            assert!((1..=10).contains(&simple_die(&mut a)));
        }
    }
}
