//! One resolver per activity kind.
//!
//! A resolver reads borrowed snapshots of the records involved and returns a
//! [`Resolution`]: the delta to apply and a summary for display. Resolvers
//! never mutate records; the executor applies the delta in one step.

mod craft;
mod generic;
mod research;
mod study;
mod teach;

use ars_core::{
    Activity, Character, Covenant, InProgressProject, Laboratory, QueuedActivity, Subject,
    TimelinePosition, VisStock,
};
use ars_mechanics::RollSource;

use crate::config::SeasonConfig;
use crate::error::{SeasonError, SeasonResult};
use crate::weather::{Weather, WeatherModifiers};

pub use generic::validate_custom;

pub(crate) use craft::{craft_points, split_vis_cost};
pub(crate) use research::points_per_season;

/// Everything a resolver may read.
#[derive(Debug, Clone, Copy)]
pub struct ResolverInput<'a> {
    /// The acting character.
    pub character: &'a Character,
    /// The queue entry being executed.
    pub entry: &'a QueuedActivity,
    /// The acting character's covenant.
    pub covenant: Option<&'a Covenant>,
    /// The acting character's laboratory.
    pub laboratory: Option<&'a Laboratory>,
    /// The student or assistant of a coupled activity.
    pub partner: Option<&'a Character>,
    /// The character's project, if any.
    pub project: Option<&'a InProgressProject>,
    /// Resolution settings.
    pub config: &'a SeasonConfig,
    /// The season's weather, if it was rolled.
    pub weather: Option<&'a Weather>,
}

impl ResolverInput<'_> {
    /// The activity being resolved.
    pub fn activity(&self) -> &Activity {
        &self.entry.activity
    }

    /// The slot being resolved.
    pub fn slot(&self) -> TimelinePosition {
        self.entry.slot
    }

    /// The covenant aura, or 0 without a covenant.
    pub fn aura(&self) -> i32 {
        self.covenant.map_or(0, |c| c.aura)
    }

    /// Weather modifiers in force; all zero without weather.
    pub fn conditions(&self) -> WeatherModifiers {
        self.weather.map(Weather::modifiers).unwrap_or_default()
    }

    /// Build a prerequisite failure for this activity.
    pub(crate) fn unmet(&self, reason: impl Into<String>) -> SeasonError {
        SeasonError::PrerequisiteNotMet {
            character: self.character.name.clone(),
            activity: self.activity().label(),
            slot: self.slot(),
            reason: reason.into(),
        }
    }
}

/// What happens to the character's project after this season.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectState {
    /// The activity is not a project.
    #[default]
    Untouched,
    /// The project continues with this state.
    Continuing(InProgressProject),
    /// The project finished this season.
    Completed,
}

/// Changes produced by one season of one activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonDelta {
    /// Experience for the acting character.
    pub xp: Vec<(Subject, u32)>,
    /// Experience for the partner of a coupled activity.
    pub partner_xp: Vec<(Subject, u32)>,
    /// Warping points for the acting character.
    pub warping_points: u32,
    /// Narrative flags for the acting character.
    pub flags: Vec<String>,
    /// Spells learned.
    pub spells: Vec<String>,
    /// Items made.
    pub items: Vec<String>,
    /// Tractatus titles now read.
    pub sources_read: Vec<String>,
    /// Library source to mark exhausted.
    pub exhausted_source: Option<String>,
    /// Vis taken from the covenant stock.
    pub covenant_vis: VisStock,
    /// Vis taken from the laboratory store.
    pub lab_vis: VisStock,
    /// Seasons of service given to the covenant.
    pub covenant_service: u32,
    /// The project afterwards.
    pub project: ProjectState,
}

/// A resolver's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Changes to apply.
    pub delta: SeasonDelta,
    /// What happened, for display.
    pub summary: String,
}

impl Resolution {
    /// Pair a delta with its summary.
    pub fn new(delta: SeasonDelta, summary: impl Into<String>) -> Self {
        Self {
            delta,
            summary: summary.into(),
        }
    }
}

/// Resolve one season of the entry in `input`.
pub fn resolve(input: &ResolverInput<'_>, roller: &mut dyn RollSource) -> SeasonResult<Resolution> {
    match input.activity() {
        Activity::Study { .. } => study::resolve(input, roller),
        Activity::Research { .. } => research::resolve(input, roller),
        Activity::Teach { .. } => teach::resolve(input),
        Activity::Invent { .. } | Activity::Enchant { .. } => craft::resolve(input),
        Activity::Service { .. } => generic::service(input),
        Activity::Story { .. } => generic::story(input),
        Activity::Custom { .. } => generic::custom(input),
        Activity::Learn { .. } | Activity::Assist { .. } => {
            Err(input.unmet("resolved together with the partner's activity"))
        }
    }
}

/// The project this season continues, or a fresh one.
///
/// A continuation after an interruption picks up the saved progress and
/// drops the interruption record.
pub(crate) fn project_for(input: &ResolverInput<'_>, target: u32) -> InProgressProject {
    let activity = input.activity();
    let mut project = match input.project {
        Some(existing) if existing.is_continued_by(activity) => existing.clone(),
        _ => InProgressProject::new(activity.clone(), target, input.slot()),
    };
    if let Some(interruption) = project.interruption.take() {
        project.accumulated_progress = interruption.saved_progress;
    }
    project.activity = activity.clone();
    project.remaining_seasons = input.entry.of.saturating_sub(input.entry.part);
    project
}

/// Finish a project's season: record work and decide whether it completed.
pub(crate) fn settle(mut project: InProgressProject, gained: u32) -> (ProjectState, InProgressProject) {
    project.accumulated_progress = project.accumulated_progress.saturating_add(gained);
    project.seasons_worked += 1;
    if project.is_complete() {
        (ProjectState::Completed, project)
    } else {
        (ProjectState::Continuing(project.clone()), project)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use ars_core::art::MAGIC_THEORY;
    use ars_core::{Art, Characteristic, Season, StudySource};

    use super::*;

    pub fn slot() -> TimelinePosition {
        TimelinePosition::new(1220, Season::Spring)
    }

    pub fn entry(activity: Activity) -> QueuedActivity {
        QueuedActivity::series(activity, slot()).remove(0)
    }

    pub fn magus() -> Character {
        Character::new("Aurelius")
            .with_covenant("Semita Errabunda")
            .with_characteristic(Characteristic::Intelligence, 2)
            .with_characteristic(Characteristic::Communication, 1)
            .with_score(Subject::Art(Art::Creo), 10)
            .with_score(Subject::Art(Art::Ignem), 8)
            .with_score(Subject::Art(Art::Vim), 5)
            .with_score(Subject::Ability(MAGIC_THEORY.into()), 4)
            .with_score(Subject::Ability("Teaching".into()), 2)
    }

    pub fn covenant() -> Covenant {
        Covenant::new("Semita Errabunda", 3)
            .with_source(
                StudySource::summa("Liber Creationis", Subject::Art(Art::Creo), 15, 10)
                    .single_use(),
            )
            .with_source(StudySource::tractatus(
                "On Flames",
                Subject::Art(Art::Ignem),
                8,
            ))
            .with_vis(Art::Vim, 4)
            .with_vis(Art::Creo, 2)
    }

    pub fn input<'a>(
        character: &'a Character,
        entry: &'a QueuedActivity,
        covenant: Option<&'a Covenant>,
        config: &'a SeasonConfig,
    ) -> ResolverInput<'a> {
        ResolverInput {
            character,
            entry,
            covenant,
            laboratory: None,
            partner: None,
            project: None,
            config,
            weather: None,
        }
    }
}
