//! Seasonal weather.
//!
//! When random effects are on, each saga season gets one weather roll with
//! odds that depend on the season. The result is recorded on the saga so
//! every character's season reads the same weather. Anything worse than mild
//! cuts adventure experience; severe weather also drains covenant resources,
//! and an extraordinary season lifts laboratory totals.

use std::fmt;

use ars_core::{Season, TimelinePosition};
use ars_mechanics::RollSource;
use serde::{Deserialize, Serialize};

use crate::chronicle::ChronicleKind;
use crate::context::SeasonContext;

/// How a season's weather turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    /// Ordinary weather for the season.
    Mild,
    /// Hard going outdoors.
    Harsh,
    /// Storms, floods, or deep snow.
    Severe,
    /// Weather with a touch of the uncanny.
    Extraordinary,
}

impl WeatherKind {
    const ALL: [WeatherKind; 4] = [Self::Mild, Self::Harsh, Self::Severe, Self::Extraordinary];

    /// Percent odds of each kind in `season`, in the order of `ALL`.
    fn odds(season: Season) -> [u32; 4] {
        match season {
            Season::Spring => [50, 30, 15, 5],
            Season::Summer => [60, 25, 10, 5],
            Season::Autumn => [40, 40, 15, 5],
            Season::Winter => [30, 40, 25, 5],
        }
    }

    /// The modifiers this weather imposes.
    pub fn modifiers(self) -> WeatherModifiers {
        match self {
            Self::Mild => WeatherModifiers::default(),
            Self::Harsh => WeatherModifiers {
                outdoor: -2,
                ..WeatherModifiers::default()
            },
            Self::Severe => WeatherModifiers {
                outdoor: -4,
                living: -1,
                laboratory: 0,
            },
            Self::Extraordinary => WeatherModifiers {
                outdoor: -6,
                living: -2,
                laboratory: 2,
            },
        }
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mild => "mild",
            Self::Harsh => "harsh",
            Self::Severe => "severe",
            Self::Extraordinary => "extraordinary",
        };
        f.write_str(name)
    }
}

/// Adjustments a season's weather makes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherModifiers {
    /// Added to experience from stories; the result never drops below zero.
    pub outdoor: i32,
    /// Added once to every covenant's resources.
    pub living: i32,
    /// Added to laboratory totals for research, invention, and enchantment.
    pub laboratory: i32,
}

/// The weather of one saga season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    /// The season it applies to.
    pub slot: TimelinePosition,
    /// What it was like.
    pub kind: WeatherKind,
}

impl Weather {
    /// The modifiers in force.
    pub fn modifiers(&self) -> WeatherModifiers {
        self.kind.modifiers()
    }

    /// A one-line account, e.g. "harsh winter conditions".
    pub fn description(&self) -> String {
        let season = self.slot.season.to_string().to_lowercase();
        match self.kind {
            WeatherKind::Mild => format!("normal {season} weather"),
            WeatherKind::Harsh => format!("harsh {season} conditions"),
            WeatherKind::Severe => format!("severe {season} weather"),
            WeatherKind::Extraordinary => format!("extraordinary {season} phenomena"),
        }
    }
}

/// Roll the weather for `slot`.
pub fn roll_weather(roller: &mut dyn RollSource, slot: TimelinePosition) -> Weather {
    let mut roll = roller.below(100);
    for (kind, chance) in WeatherKind::ALL.into_iter().zip(WeatherKind::odds(slot.season)) {
        if roll < chance {
            return Weather { slot, kind };
        }
        roll -= chance;
    }
    Weather {
        slot,
        kind: WeatherKind::Mild,
    }
}

/// The weather at `slot`. The first call for a slot rolls it, applies its
/// cost to every covenant, and records it on the saga.
pub fn weather_for(ctx: &mut SeasonContext<'_>, slot: TimelinePosition) -> Weather {
    if let Some(weather) = ctx.saga.weather_at(slot) {
        return weather.clone();
    }
    let weather = roll_weather(&mut *ctx.roller, slot);
    let living = weather.modifiers().living;
    if living != 0 {
        for covenant in ctx.saga.covenants.values_mut() {
            covenant.resources = (covenant.resources + living).max(0);
        }
    }
    ctx.emit(
        slot,
        ChronicleKind::Weather { weather: weather.kind },
        weather.description(),
    );
    tracing::debug!(%slot, kind = %weather.kind, "weather rolled");
    ctx.saga.weather.push(weather.clone());
    weather
}
