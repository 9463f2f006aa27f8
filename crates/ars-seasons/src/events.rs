//! Random seasonal events.
//!
//! After a season, an event strikes with `event_chance` percent probability.
//! The kind is weighted, with magical events growing likelier in strong
//! auras; severity runs from 1 to 5 and picks the event's title. Effects
//! land on the character's covenant where one exists, otherwise on the
//! character as a story hook.

use std::fmt;

use ars_core::{Art, TimelinePosition};
use ars_mechanics::{RollSource, simple_die};

use crate::chronicle::ChronicleKind;
use crate::context::SeasonContext;
use crate::error::SeasonResult;

/// Broad category of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Weather, trade, bandits, disease.
    Mundane,
    /// Disturbances in the magical realm.
    Magical,
    /// Nobles, envoys, and tribunals.
    Political,
    /// The Church and the Divine.
    Religious,
    /// The fae.
    Faerie,
    /// Demons and their servants.
    Infernal,
}

impl EventKind {
    const ALL: [EventKind; 6] = [
        Self::Mundane,
        Self::Magical,
        Self::Political,
        Self::Religious,
        Self::Faerie,
        Self::Infernal,
    ];

    fn weight(self, aura: i32) -> u32 {
        match self {
            Self::Mundane => 40,
            Self::Magical => 20 + 5 * u32::try_from(aura.max(0)).unwrap_or(0),
            Self::Political => 15,
            Self::Religious | Self::Faerie => 10,
            Self::Infernal => 5,
        }
    }

    fn titles(self) -> [&'static str; 5] {
        match self {
            Self::Mundane => [
                "Local Festival",
                "Trade Caravan",
                "Bandit Activity",
                "Disease Outbreak",
                "Natural Disaster",
            ],
            Self::Magical => [
                "Vis Surge",
                "Magic Disturbance",
                "Magical Beast",
                "Wizard's War",
                "Twilight Event",
            ],
            Self::Political => [
                "Envoy Arrives",
                "Tax Dispute",
                "Noble's Demand",
                "Tribunal Summons",
                "Feud Erupts",
            ],
            Self::Religious => [
                "Pilgrims",
                "Miracle Rumored",
                "Bishop's Visit",
                "Heresy Accusation",
                "Interdict",
            ],
            Self::Faerie => [
                "Faerie Revel",
                "Changeling",
                "Faerie Bargain",
                "Glamour Theft",
                "Faerie Court",
            ],
            Self::Infernal => [
                "Ill Omen",
                "Possession",
                "Demonic Whispers",
                "Diabolist Cult",
                "Infernal Incursion",
            ],
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mundane => "mundane",
            Self::Magical => "magical",
            Self::Political => "political",
            Self::Religious => "religious",
            Self::Faerie => "faerie",
            Self::Infernal => "infernal",
        };
        f.write_str(name)
    }
}

/// What an event does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEffect {
    /// The covenant loses resources.
    ResourceLoss(i32),
    /// Raw vis appears in the covenant stock.
    VisSurge {
        /// Art of the vis.
        art: Art,
        /// Pawns found.
        pawns: u32,
    },
    /// The covenant aura strengthens or weakens.
    AuraShift(i32),
    /// The character gains warping points.
    Warping(u32),
    /// The character gains a story hook flag.
    StoryHook,
}

/// An event that struck after a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEvent {
    /// Category.
    pub kind: EventKind,
    /// Title, chosen by severity.
    pub title: String,
    /// 1 (minor) to 5 (grave).
    pub severity: u32,
    /// What it did.
    pub effect: EventEffect,
    /// Readable account.
    pub description: String,
}

/// Highest aura an event can raise a covenant to.
const MAX_AURA: i32 = 10;

/// Roll for an event after `name`'s season at `slot` and apply it.
pub fn roll_event(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    slot: TimelinePosition,
) -> SeasonResult<Option<SeasonEvent>> {
    if ctx.roller.below(100) >= ctx.config.event_chance {
        return Ok(None);
    }
    let character = ctx.saga.character(name)?;
    let covenant = character.covenant.clone().filter(|c| ctx.saga.covenants.contains_key(c));
    let aura = ctx.saga.aura_for(character);

    let kind = pick_kind(&mut *ctx.roller, aura);
    let severity = simple_die(&mut *ctx.roller).div_ceil(2);
    let title = kind.titles()[usize::try_from(severity - 1).unwrap_or(0)].to_string();
    let mut effect = effect_for(kind, severity, &mut *ctx.roller);
    if covenant.is_none()
        && matches!(
            effect,
            EventEffect::ResourceLoss(_) | EventEffect::VisSurge { .. } | EventEffect::AuraShift(_)
        )
    {
        effect = EventEffect::StoryHook;
    }

    let description = match &effect {
        EventEffect::ResourceLoss(amount) => {
            format!("{title}: the covenant loses {amount} resources")
        }
        EventEffect::VisSurge { art, pawns } => format!("{title}: {pawns} pawns of {art} vis found"),
        EventEffect::AuraShift(delta) if *delta > 0 => format!("{title}: the aura strengthens"),
        EventEffect::AuraShift(_) => format!("{title}: the aura weakens"),
        EventEffect::Warping(points) => format!("{title}: {name} gains {points} warping points"),
        EventEffect::StoryHook => format!("{title}: a story awaits {name}"),
    };

    match (&effect, covenant.as_deref()) {
        (EventEffect::ResourceLoss(amount), Some(c)) => {
            if let Some(covenant) = ctx.saga.covenants.get_mut(c) {
                covenant.resources = (covenant.resources - amount).max(0);
            }
        }
        (EventEffect::VisSurge { art, pawns }, Some(c)) => {
            if let Some(covenant) = ctx.saga.covenants.get_mut(c) {
                covenant.vis_stock.add(*art, *pawns);
            }
        }
        (EventEffect::AuraShift(delta), Some(c)) => {
            if let Some(covenant) = ctx.saga.covenants.get_mut(c) {
                covenant.aura = (covenant.aura + delta).clamp(0, MAX_AURA);
            }
        }
        (EventEffect::Warping(points), _) => {
            let character = ctx.saga.character_mut(name)?;
            character.warping_points = character.warping_points.saturating_add(*points);
        }
        _ => {
            ctx.saga
                .character_mut(name)?
                .flags
                .insert(format!("hook: {title}"));
        }
    }

    ctx.emit(
        slot,
        ChronicleKind::RandomEvent {
            character: name.to_string(),
            covenant: covenant.clone(),
            title: title.clone(),
        },
        description.clone(),
    );
    tracing::debug!(character = name, %kind, severity, %title, "random event");
    Ok(Some(SeasonEvent {
        kind,
        title,
        severity,
        effect,
        description,
    }))
}

fn pick_kind(roller: &mut dyn RollSource, aura: i32) -> EventKind {
    let total: u32 = EventKind::ALL.iter().map(|k| k.weight(aura)).sum();
    let mut roll = roller.below(total);
    for kind in EventKind::ALL {
        let weight = kind.weight(aura);
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    EventKind::Mundane
}

fn effect_for(kind: EventKind, severity: u32, roller: &mut dyn RollSource) -> EventEffect {
    match (kind, severity) {
        (EventKind::Mundane, 4..) => EventEffect::ResourceLoss(i32::try_from(severity).unwrap_or(0)),
        (EventKind::Magical, 1) => {
            let arts: Vec<Art> = Art::TECHNIQUES.into_iter().chain(Art::FORMS).collect();
            let index = usize::try_from(roller.below(15)).unwrap_or(0);
            let art = arts.get(index).copied().unwrap_or(Art::Vim);
            let pawns = (simple_die(roller) / 2).max(1);
            EventEffect::VisSurge { art, pawns }
        }
        (EventKind::Magical, 2) => EventEffect::AuraShift(1),
        (EventKind::Magical, 5) => EventEffect::Warping(2),
        (EventKind::Infernal, 4..) => EventEffect::AuraShift(-1),
        _ => EventEffect::StoryHook,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeasonConfig;
    use crate::saga::Saga;
    use ars_core::{Character, Covenant, Season};
    use ars_mechanics::ScriptedRolls;

    fn saga() -> Saga {
        let mut saga = Saga::new("Rhine", TimelinePosition::new(1220, Season::Spring));
        saga.add_covenant(Covenant::new("Semita Errabunda", 2));
        saga.add_character(Character::new("Aurelius").with_covenant("Semita Errabunda"));
        saga.add_character(Character::new("Wanderer"));
        saga
    }

    fn slot() -> TimelinePosition {
        TimelinePosition::new(1220, Season::Spring)
    }

    #[test]
    fn no_event_above_chance() {
        let mut saga = saga();
        let config = SeasonConfig::default().with_event_chance(30);
        let mut dice = ScriptedRolls::new([]).unwrap().with_draws([30]);
        let mut ctx = SeasonContext::new(&mut saga, &mut dice, &config);
        assert!(roll_event(&mut ctx, "Aurelius", slot()).unwrap().is_none());
        assert!(saga.chronicle.is_empty());
    }

    #[test]
    fn mundane_disaster_costs_resources() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        // Chance 0 < 30, kind draw 0 is Mundane, die 9 is severity 5.
        let mut dice = ScriptedRolls::new([9]).unwrap().with_draws([0, 0]);
        let mut ctx = SeasonContext::new(&mut saga, &mut dice, &config);
        let event = roll_event(&mut ctx, "Aurelius", slot()).unwrap().unwrap();
        assert_eq!(event.kind, EventKind::Mundane);
        assert_eq!(event.title, "Natural Disaster");
        assert_eq!(event.effect, EventEffect::ResourceLoss(5));
        assert_eq!(saga.covenants["Semita Errabunda"].resources, 5);
        assert_eq!(saga.chronicle.len(), 1);
    }

    #[test]
    fn vis_surge_fills_stock() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        // Kind draw 40 is the first Magical slot; die 2 is severity 1;
        // art draw 14 is Vim; die 6 gives 3 pawns.
        let mut dice = ScriptedRolls::new([2, 6]).unwrap().with_draws([0, 40, 14]);
        let mut ctx = SeasonContext::new(&mut saga, &mut dice, &config);
        let event = roll_event(&mut ctx, "Aurelius", slot()).unwrap().unwrap();
        assert_eq!(event.effect, EventEffect::VisSurge { art: Art::Vim, pawns: 3 });
        assert_eq!(saga.covenants["Semita Errabunda"].vis_stock.get(Art::Vim), 3);
    }

    #[test]
    fn without_covenant_effects_become_story_hooks() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        let mut dice = ScriptedRolls::new([9]).unwrap().with_draws([0, 0]);
        let mut ctx = SeasonContext::new(&mut saga, &mut dice, &config);
        let event = roll_event(&mut ctx, "Wanderer", slot()).unwrap().unwrap();
        assert_eq!(event.effect, EventEffect::StoryHook);
        assert!(saga.characters["Wanderer"].flags.contains("hook: Natural Disaster"));
    }

    #[test]
    fn strong_aura_favours_magic() {
        let mut dice = ScriptedRolls::new([]).unwrap().with_draws([60]);
        assert_eq!(pick_kind(&mut dice, 0), EventKind::Political);
        let mut dice = ScriptedRolls::new([]).unwrap().with_draws([60]);
        assert_eq!(pick_kind(&mut dice, 5), EventKind::Magical);
    }
}
