use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One quarter of a saga year. Declaration order is chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    /// First season of the year.
    Spring,
    /// Second season of the year.
    Summer,
    /// Third season of the year.
    Autumn,
    /// Last season of the year; aging is checked at its end.
    Winter,
}

impl Season {
    /// All seasons in the order a year is played.
    pub const ALL: [Season; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    /// Zero-based position within the year.
    pub fn index(self) -> u32 {
        match self {
            Self::Spring => 0,
            Self::Summer => 1,
            Self::Autumn => 2,
            Self::Winter => 3,
        }
    }

    /// The following season, wrapping Winter back to Spring.
    pub fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Autumn,
            Self::Autumn => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        };
        f.write_str(name)
    }
}

impl FromStr for Season {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "autumn" | "fall" => Ok(Self::Autumn),
            "winter" => Ok(Self::Winter),
            _ => Err(CoreError::UnknownSeason(s.to_string())),
        }
    }
}

/// A slot on the saga timeline: one season of one year.
///
/// Field order matters: the derived ordering compares the year first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimelinePosition {
    /// The saga year, e.g. 1220.
    pub year: i32,
    /// The season within that year.
    pub season: Season,
}

impl TimelinePosition {
    /// Create a position from a year and season.
    pub fn new(year: i32, season: Season) -> Self {
        Self { year, season }
    }

    /// Returns a sort key counting seasons since year zero.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 4 + i64::from(self.season.index())
    }

    /// The slot immediately after this one.
    pub fn next(self) -> Self {
        match self.season {
            Season::Winter => Self::new(self.year + 1, Season::Spring),
            season => Self::new(self.year, season.next()),
        }
    }

    /// The slot `n` seasons after this one.
    pub fn advance_by(self, n: u32) -> Self {
        (0..n).fold(self, |pos, _| pos.next())
    }

    /// Number of seasons from `earlier` to `self` (negative if `earlier` is later).
    pub fn seasons_since(self, earlier: Self) -> i64 {
        self.ordinal() - earlier.ordinal()
    }
}

impl fmt::Display for TimelinePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn season_cycle() {
        assert_eq!(Season::Spring.next(), Season::Summer);
        assert_eq!(Season::Winter.next(), Season::Spring);
        assert!(Season::Spring < Season::Winter);
    }

    #[test]
    fn winter_rolls_into_next_year() {
        let pos = TimelinePosition::new(1220, Season::Winter);
        assert_eq!(pos.next(), TimelinePosition::new(1221, Season::Spring));
    }

    #[test]
    fn ordering_compares_year_first() {
        let late_winter = TimelinePosition::new(1220, Season::Winter);
        let early_spring = TimelinePosition::new(1221, Season::Spring);
        assert!(late_winter < early_spring);
    }

    #[test]
    fn advance_and_distance() {
        let start = TimelinePosition::new(1220, Season::Autumn);
        let later = start.advance_by(5);
        assert_eq!(later, TimelinePosition::new(1221, Season::Winter));
        assert_eq!(later.seasons_since(start), 5);
        assert_eq!(start.seasons_since(later), -5);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("autumn".parse::<Season>().unwrap(), Season::Autumn);
        assert_eq!("Fall".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());
        let pos = TimelinePosition::new(1220, Season::Spring);
        assert_eq!(pos.to_string(), "Spring 1220");
    }

    proptest! {
        #[test]
        fn next_is_strictly_later(year in -2000i32..2000, idx in 0usize..4) {
            let pos = TimelinePosition::new(year, Season::ALL[idx]);
            prop_assert!(pos.next() > pos);
            prop_assert_eq!(pos.next().seasons_since(pos), 1);
        }

        #[test]
        fn ordinal_agrees_with_ordering(
            y1 in -500i32..500, i1 in 0usize..4,
            y2 in -500i32..500, i2 in 0usize..4,
        ) {
            let a = TimelinePosition::new(y1, Season::ALL[i1]);
            let b = TimelinePosition::new(y2, Season::ALL[i2]);
            prop_assert_eq!(a.cmp(&b), a.ordinal().cmp(&b.ordinal()));
        }
    }
}
