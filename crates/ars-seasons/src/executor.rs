//! Season execution.
//!
//! `execute` takes the entry queued for a slot, resolves it against
//! snapshots of the records involved, and applies the resulting delta to
//! copies that replace the originals only once every change has succeeded.
//! A failed activity leaves the records as they were, is removed from the
//! queue, and waits in the character's deferred list.
//!
//! Coupled activities resolve once, from the initiator's side. A student or
//! assistant whose season comes first delegates to the initiator's entry.

use ars_core::{
    Activity, Character, CharacterStatus, QueuedActivity, Role, Season, TimelinePosition, VisStock,
};
use ars_mechanics::{RollSource, check_aging};

use crate::chronicle::ChronicleKind;
use crate::config::SeasonConfig;
use crate::context::SeasonContext;
use crate::error::{FailureKind, SeasonError, SeasonResult};
use crate::events;
use crate::resolve::{ProjectState, Resolution, ResolverInput, SeasonDelta, resolve};
use crate::saga::Saga;
use crate::scheduler::{self, next_free_slot, withdraw_series};
use crate::weather::{self, Weather};

/// Where a character's season stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Nothing to do, or a project waiting for its next season.
    Idle,
    /// A season is being resolved.
    Executing,
    /// The season's activity finished.
    Completed,
    /// The project was interrupted.
    Interrupted,
    /// The season's activity failed and was deferred.
    Failed,
}

/// What happened to one character in one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonReport {
    /// The character.
    pub character: String,
    /// The slot executed.
    pub slot: TimelinePosition,
    /// Final state of the season.
    pub state: ExecutionState,
    /// Label of the activity, if one was queued.
    pub activity: Option<String>,
    /// What happened.
    pub summary: String,
    /// Why the activity failed, if it did.
    pub failure: Option<FailureKind>,
    /// Random events that followed the season.
    pub events: Vec<String>,
    /// The season's weather, if it was rolled.
    pub weather: Option<Weather>,
}

impl SeasonReport {
    fn new(character: &str, slot: TimelinePosition) -> Self {
        Self {
            character: character.to_string(),
            slot,
            state: ExecutionState::Executing,
            activity: None,
            summary: String::new(),
            failure: None,
            events: Vec::new(),
            weather: None,
        }
    }

    fn settle(&mut self, step: Step) {
        self.state = step.state;
        self.summary = step.summary;
        self.failure = step.failure;
    }
}

struct Step {
    state: ExecutionState,
    summary: String,
    failure: Option<FailureKind>,
}

impl Step {
    fn new(state: ExecutionState, summary: impl Into<String>) -> Self {
        Self {
            state,
            summary: summary.into(),
            failure: None,
        }
    }
}

/// Execute `name`'s season at `slot` without random events.
pub fn execute(ctx: &mut SeasonContext<'_>, name: &str, slot: TimelinePosition) -> SeasonResult<SeasonReport> {
    execute_season(ctx, name, slot, false)
}

/// Execute `name`'s season at `slot`, then roll for a random event if
/// `include_events` is set. Winter ends with a year of aging.
pub fn execute_season(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    slot: TimelinePosition,
    include_events: bool,
) -> SeasonResult<SeasonReport> {
    let mut report = SeasonReport::new(name, slot);
    {
        let character = ctx.saga.character(name)?;
        if !character.is_alive() {
            report.settle(Step::new(ExecutionState::Idle, format!("{name} is dead")));
            return Ok(report);
        }
        if let Some(done) = character.last_executed.filter(|&done| slot <= done) {
            return Err(SeasonError::InvalidTimelineOrder {
                character: name.to_string(),
                slot,
                earliest: done.next(),
            });
        }
    }

    if include_events && ctx.config.weather {
        report.weather = Some(weather::weather_for(ctx, slot));
    }
    lapse_overdue(ctx, name, slot)?;
    let entry = ctx.saga.character(name)?.queued_at(slot).cloned();
    let step = match entry {
        Some(entry) => {
            report.activity = Some(entry.activity.label());
            run(ctx, name, &entry)?
        }
        None => match resolved_with(ctx.saga, name, slot) {
            Some(partner) => Step::new(
                ExecutionState::Completed,
                format!("resolved together with {partner}"),
            ),
            None => Step::new(ExecutionState::Idle, "no activity"),
        },
    };
    report.settle(step);

    if include_events {
        if let Some(event) = events::roll_event(ctx, name, slot)? {
            report.events.push(event.description);
        }
    }
    finish_season(ctx, name, slot)?;

    tracing::info!(
        character = name,
        %slot,
        state = ?report.state,
        summary = %report.summary,
        "season executed"
    );
    Ok(report)
}

/// Execute every season of `year` for one character in order Spring,
/// Summer, Autumn, Winter. Seasons already executed are skipped.
pub fn execute_year(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    year: i32,
    include_events: bool,
) -> SeasonResult<Vec<SeasonReport>> {
    let mut reports = Vec::new();
    for season in Season::ALL {
        let slot = TimelinePosition::new(year, season);
        let done = ctx
            .saga
            .character(name)?
            .last_executed
            .is_some_and(|done| slot <= done);
        if !done {
            reports.push(execute_season(ctx, name, slot, include_events)?);
        }
    }
    Ok(reports)
}

/// Execute the saga's current season for every living character, harvest
/// covenant vis, and advance the saga to the next season.
///
/// Characters run in alphabetical order, so a teacher or lead whose name
/// sorts first resolves the coupled activity.
pub fn execute_saga_season(ctx: &mut SeasonContext<'_>, include_events: bool) -> SeasonResult<Vec<SeasonReport>> {
    let slot = ctx.now();
    let mut reports = Vec::new();
    for name in ctx.saga.living_characters() {
        let done = ctx
            .saga
            .character(&name)?
            .last_executed
            .is_some_and(|done| slot <= done);
        if !done {
            reports.push(execute_season(ctx, &name, slot, include_events)?);
        }
    }

    let covenants: Vec<String> = ctx.saga.covenants.keys().cloned().collect();
    for name in covenants {
        let Some(covenant) = ctx.saga.covenants.get_mut(&name) else {
            continue;
        };
        let gathered = covenant.collect_vis(slot.season);
        if !gathered.is_empty() {
            ctx.emit(
                slot,
                ChronicleKind::VisCollected {
                    covenant: name.clone(),
                    pawns: gathered.total(),
                },
                format!("{name} gathered {gathered} vis"),
            );
        }
    }

    ctx.saga.current = slot.next();
    tracing::info!(%slot, characters = reports.len(), "saga season executed");
    Ok(reports)
}

/// Move entries for slots before `slot` to the deferred list.
fn lapse_overdue(ctx: &mut SeasonContext<'_>, name: &str, slot: TimelinePosition) -> SeasonResult<()> {
    let character = ctx.saga.character_mut(name)?;
    let (overdue, keep): (Vec<_>, Vec<_>) = character
        .activity_queue
        .drain(..)
        .partition(|entry| entry.slot < slot);
    character.activity_queue = keep;
    character.deferred.extend(overdue.iter().cloned());

    for entry in overdue {
        let label = entry.activity.label();
        tracing::debug!(character = name, activity = %label, slot = %entry.slot, "activity lapsed");
        ctx.emit(
            entry.slot,
            ChronicleKind::ActivityLapsed {
                character: name.to_string(),
                activity: label.clone(),
            },
            format!("{name} never got to {label} in {}", entry.slot),
        );
    }
    Ok(())
}

/// The partner a coupled activity at `slot` was resolved with, if any.
fn resolved_with(saga: &Saga, name: &str, slot: TimelinePosition) -> Option<String> {
    saga.chronicle
        .entries_at(slot)
        .into_iter()
        .find_map(|entry| match &entry.kind {
            ChronicleKind::CoupledResolved { initiator, partner } if partner == name => {
                Some(initiator.clone())
            }
            ChronicleKind::CoupledResolved { initiator, partner } if initiator == name => {
                Some(partner.clone())
            }
            _ => None,
        })
}

fn run(ctx: &mut SeasonContext<'_>, name: &str, entry: &QueuedActivity) -> SeasonResult<Step> {
    let Some((lead, Role::Passive)) = entry.activity.partner() else {
        return resolve_entry(ctx, name, entry);
    };
    let lead_entry = ctx
        .saga
        .characters
        .get(lead)
        .filter(|c| c.is_alive())
        .and_then(|c| c.queued_at(entry.slot))
        .filter(|e| {
            e.activity.partner() == Some((name, Role::Initiator))
                && e.activity.counterpart(lead).as_ref() == Some(&entry.activity)
        })
        .cloned();
    match lead_entry {
        Some(lead_entry) => {
            let lead = lead.to_string();
            let step = resolve_entry(ctx, &lead, &lead_entry)?;
            Ok(Step {
                summary: format!("with {lead}: {}", step.summary),
                ..step
            })
        }
        None => {
            let err = partner_missing(&entry.activity, name, lead, entry.slot);
            fail(ctx, name, entry, err)
        }
    }
}

fn partner_missing(
    activity: &Activity,
    name: &str,
    partner: &str,
    slot: TimelinePosition,
) -> SeasonError {
    match activity {
        Activity::Teach { .. } => SeasonError::StudentUnavailable {
            teacher: name.to_string(),
            student: partner.to_string(),
            slot,
        },
        Activity::Learn { .. } => SeasonError::StudentUnavailable {
            teacher: partner.to_string(),
            student: name.to_string(),
            slot,
        },
        _ => SeasonError::PartnerUnavailable {
            character: name.to_string(),
            partner: partner.to_string(),
            slot,
        },
    }
}

/// Resolve the entry of a character acting on their own or as initiator.
fn resolve_entry(ctx: &mut SeasonContext<'_>, actor: &str, entry: &QueuedActivity) -> SeasonResult<Step> {
    let partner = match entry.activity.partner() {
        Some((partner, Role::Initiator)) => Some(partner.to_string()),
        _ => None,
    };
    let outcome = attempt(
        &*ctx.saga,
        &mut *ctx.roller,
        ctx.config,
        actor,
        entry,
        partner.as_deref(),
    )
    .and_then(|resolution| {
        apply(&mut *ctx.saga, actor, partner.as_deref(), entry, &resolution.delta)?;
        Ok(resolution)
    });
    let resolution = match outcome {
        Ok(resolution) => resolution,
        Err(err) => return fail(ctx, actor, entry, err),
    };

    let label = entry.activity.label();
    ctx.emit(
        entry.slot,
        ChronicleKind::ActivityCompleted {
            character: actor.to_string(),
            activity: label.clone(),
        },
        format!("{actor} {}", resolution.summary),
    );
    if let Some(partner) = &partner {
        ctx.emit(
            entry.slot,
            ChronicleKind::CoupledResolved {
                initiator: actor.to_string(),
                partner: partner.clone(),
            },
            format!("{actor} and {partner} worked together: {label}"),
        );
    }

    let state = match &resolution.delta.project {
        ProjectState::Continuing(project) => {
            ctx.emit(
                entry.slot,
                ChronicleKind::ProjectAdvanced {
                    character: actor.to_string(),
                    project: label.clone(),
                    progress: project.accumulated_progress,
                    target: project.target_progress,
                },
                format!(
                    "{label}: {}/{}",
                    project.accumulated_progress, project.target_progress
                ),
            );
            ExecutionState::Idle
        }
        ProjectState::Completed => {
            ctx.emit(
                entry.slot,
                ChronicleKind::ProjectCompleted {
                    character: actor.to_string(),
                    project: label.clone(),
                },
                format!("{actor} completed {label}"),
            );
            ExecutionState::Completed
        }
        ProjectState::Untouched => ExecutionState::Completed,
    };
    Ok(Step::new(state, resolution.summary))
}

fn attempt(
    saga: &Saga,
    roller: &mut dyn RollSource,
    config: &SeasonConfig,
    actor: &str,
    entry: &QueuedActivity,
    partner: Option<&str>,
) -> SeasonResult<Resolution> {
    let character = saga.character(actor)?;
    let partner = match partner {
        Some(partner) => {
            let counterpart = entry.activity.counterpart(actor);
            let ready = saga
                .characters
                .get(partner)
                .filter(|p| p.is_alive())
                .filter(|p| {
                    p.queued_at(entry.slot)
                        .is_some_and(|e| Some(&e.activity) == counterpart.as_ref())
                });
            Some(ready.ok_or_else(|| partner_missing(&entry.activity, actor, partner, entry.slot))?)
        }
        None => None,
    };
    let input = ResolverInput {
        character,
        entry,
        covenant: saga.covenant_of(character),
        laboratory: saga.laboratories.get(actor),
        partner,
        project: character.in_progress_project.as_ref(),
        config,
        weather: saga.weather_at(entry.slot),
    };
    resolve(&input, roller)
}

/// Apply a season's delta. Records are changed on copies and written back
/// together, so a failure part-way leaves the saga untouched.
fn apply(
    saga: &mut Saga,
    actor: &str,
    partner: Option<&str>,
    entry: &QueuedActivity,
    delta: &SeasonDelta,
) -> SeasonResult<()> {
    let mut character = saga.character(actor)?.clone();
    let mut partner_record = partner.map(|p| saga.character(p).cloned()).transpose()?;
    let mut covenant = saga.covenant_of(&character).cloned();
    let mut laboratory = saga.laboratories.get(actor).cloned();

    let short = |needed: &VisStock, available: VisStock| SeasonError::InsufficientResources {
        character: actor.to_string(),
        activity: entry.activity.label(),
        needed: needed.clone(),
        available,
    };
    if !delta.lab_vis.is_empty() {
        let lab = laboratory
            .as_mut()
            .ok_or_else(|| short(&delta.lab_vis, VisStock::new()))?;
        let held = lab.vis_store.clone();
        lab.vis_store
            .deduct(&delta.lab_vis)
            .map_err(|_| short(&delta.lab_vis, held))?;
    }
    if !delta.covenant_vis.is_empty() {
        let stock = covenant
            .as_mut()
            .ok_or_else(|| short(&delta.covenant_vis, VisStock::new()))?;
        let held = stock.vis_stock.clone();
        stock
            .vis_stock
            .deduct(&delta.covenant_vis)
            .map_err(|_| short(&delta.covenant_vis, held))?;
    }

    grant(&mut character, delta);
    if let Some(partner) = partner_record.as_mut() {
        for (subject, xp) in &delta.partner_xp {
            partner.add_xp(subject, *xp);
        }
    }
    if let Some(covenant) = covenant.as_mut() {
        covenant.service_seasons += delta.covenant_service;
        if let Some(source) = delta
            .exhausted_source
            .as_deref()
            .and_then(|title| covenant.source_mut(title))
        {
            source.exhausted = true;
        }
    }

    character
        .activity_queue
        .retain(|e| !(e.series == entry.series && e.slot == entry.slot));
    if let Some(partner) = partner_record.as_mut() {
        partner.activity_queue.retain(|e| e.slot != entry.slot);
    }
    match &delta.project {
        ProjectState::Untouched => {}
        ProjectState::Continuing(project) => character.in_progress_project = Some(project.clone()),
        ProjectState::Completed => {
            character.in_progress_project = None;
            character.activity_queue.retain(|e| e.series != entry.series);
            if let Some(partner) = partner_record.as_mut() {
                partner.activity_queue.retain(|e| e.series != entry.series);
            }
        }
    }

    saga.add_character(character);
    if let Some(partner) = partner_record {
        saga.add_character(partner);
    }
    if let Some(covenant) = covenant {
        saga.add_covenant(covenant);
    }
    if let Some(laboratory) = laboratory {
        saga.add_laboratory(laboratory);
    }
    Ok(())
}

fn grant(character: &mut Character, delta: &SeasonDelta) {
    for (subject, xp) in &delta.xp {
        character.add_xp(subject, *xp);
    }
    character.warping_points = character.warping_points.saturating_add(delta.warping_points);
    character.flags.extend(delta.flags.iter().cloned());
    for spell in &delta.spells {
        if !character.spells.contains(spell) {
            character.spells.push(spell.clone());
        }
    }
    character.items.extend(delta.items.iter().cloned());
    character
        .sources_read
        .extend(delta.sources_read.iter().cloned());
}

/// Record a failed activity: withdraw its series from both queues, then
/// requeue or defer it.
fn fail(ctx: &mut SeasonContext<'_>, actor: &str, entry: &QueuedActivity, err: SeasonError) -> SeasonResult<Step> {
    let kind = err.kind();
    let reason = err.to_string();
    let label = entry.activity.label();
    let partner = entry.activity.partner().map(|(p, _)| p.to_string());
    withdraw_series(ctx.saga, actor, partner.as_deref().unwrap_or(actor), entry.series);

    let passive = matches!(entry.activity.partner(), Some((_, Role::Passive)));
    let mut summary = reason.clone();
    let requeued = if ctx.config.requeue_failed && !passive {
        let start = next_free_slot(ctx.saga.character(actor)?, entry.slot.next());
        match scheduler::schedule(ctx, actor, entry.activity.clone(), start) {
            Ok(_) => {
                summary.push_str(&format!("; requeued for {start}"));
                true
            }
            Err(refused) => {
                tracing::debug!(character = actor, %start, error = %refused, "requeue refused");
                summary.push_str(&format!("; requeue failed ({:?}): {refused}", refused.kind()));
                false
            }
        }
    } else {
        false
    };
    if !requeued {
        ctx.saga.character_mut(actor)?.deferred.push(entry.clone());
    }

    ctx.emit(
        entry.slot,
        ChronicleKind::ActivityFailed {
            character: actor.to_string(),
            activity: label.clone(),
            reason: reason.clone(),
        },
        format!("{actor} could not {label}: {reason}"),
    );
    tracing::warn!(character = actor, activity = %label, slot = %entry.slot, %reason, "activity failed");
    Ok(Step {
        state: ExecutionState::Failed,
        summary,
        failure: Some(kind),
    })
}

/// Close the season: mark it executed and, in Winter, age the character.
fn finish_season(ctx: &mut SeasonContext<'_>, name: &str, slot: TimelinePosition) -> SeasonResult<()> {
    let aging_start = ctx.config.aging_start_age;
    let roller = &mut *ctx.roller;
    let character = ctx.saga.character_mut(name)?;
    character.last_executed = Some(slot);
    if slot.season != Season::Winter || !character.is_alive() {
        return Ok(());
    }

    character.age += 1;
    if character.age < aging_start {
        character.apparent_age += 1;
        return Ok(());
    }
    let aging = check_aging(character, roller);
    character.apparent_age += aging.apparent_years;
    character.decrepitude_points += aging.decrepitude_points;
    let died = aging.fatal;
    if died {
        character.status = CharacterStatus::Dead;
    }
    let age = character.age;

    tracing::debug!(character = name, total = aging.total, outcome = ?aging.outcome, "aging roll");
    ctx.emit(
        slot,
        ChronicleKind::Aged {
            character: name.to_string(),
            decrepitude: aging.decrepitude_points,
        },
        format!("{name} turned {age} (aging roll {})", aging.total),
    );
    if died {
        ctx.emit(
            slot,
            ChronicleKind::Died {
                character: name.to_string(),
                cause: "old age".into(),
            },
            format!("{name} died of old age at {age}"),
        );
        tracing::info!(character = name, age, "character died");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::schedule;
    use ars_core::art::MAGIC_THEORY;
    use crate::weather::WeatherKind;
    use ars_core::{Art, Covenant, ItemDesign, ItemKind, Laboratory, StudyMaterial, StudySource, Subject};
    use ars_mechanics::ScriptedRolls;

    fn at(season: Season) -> TimelinePosition {
        TimelinePosition::new(1220, season)
    }

    fn practice(art: Art) -> Activity {
        Activity::Study {
            subject: Subject::Art(art),
            material: StudyMaterial::Practice,
        }
    }

    fn saga() -> Saga {
        let mut saga = Saga::new("Rhine", at(Season::Spring));
        saga.add_covenant(
            Covenant::new("Semita Errabunda", 3)
                .with_source(
                    StudySource::summa("Liber Creationis", Subject::Art(Art::Creo), 15, 10)
                        .single_use(),
                )
                .with_vis(Art::Vim, 4),
        );
        saga.add_character(
            Character::new("Aurelius")
                .with_covenant("Semita Errabunda")
                .with_score(Subject::Art(Art::Creo), 10)
                .with_score(Subject::Art(Art::Ignem), 8)
                .with_score(Subject::Ability(MAGIC_THEORY.into()), 4),
        );
        saga.add_character(Character::new("Fenicia").with_covenant("Semita Errabunda"));
        saga.add_laboratory(Laboratory::new("Aurelius"));
        saga
    }

    fn run<T>(saga: &mut Saga, config: &SeasonConfig, op: impl FnOnce(&mut SeasonContext<'_>) -> T) -> T {
        let mut dice = ScriptedRolls::new([]).unwrap();
        let mut ctx = SeasonContext::new(saga, &mut dice, config);
        op(&mut ctx)
    }

    #[test]
    fn study_from_single_use_summa() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        saga.characters
            .get_mut("Fenicia")
            .unwrap()
            .arts
            .insert(Art::Creo, 0);
        let read = Activity::Study {
            subject: Subject::Art(Art::Creo),
            material: StudyMaterial::Book {
                title: "Liber Creationis".into(),
            },
        };
        let report = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Fenicia", read.clone(), at(Season::Spring)).unwrap();
            execute(ctx, "Fenicia", at(Season::Spring)).unwrap()
        });
        assert_eq!(report.state, ExecutionState::Completed);
        assert_eq!(saga.character("Fenicia").unwrap().xp(&Subject::Art(Art::Creo)), 10);
        let covenant = &saga.covenants["Semita Errabunda"];
        assert!(covenant.source("Liber Creationis").unwrap().exhausted);

        let again = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Fenicia", read, at(Season::Summer)).unwrap_err()
        });
        assert_eq!(again.kind(), FailureKind::SourceExhausted);
    }

    #[test]
    fn summa_stops_at_its_level() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        // Creo 14 is 105 xp; a level 15 summa holds 120.
        saga.characters
            .get_mut("Fenicia")
            .unwrap()
            .arts
            .insert(Art::Creo, 115);
        let read = Activity::Study {
            subject: Subject::Art(Art::Creo),
            material: StudyMaterial::Book {
                title: "Liber Creationis".into(),
            },
        };
        run(&mut saga, &config, |ctx| {
            schedule(ctx, "Fenicia", read, at(Season::Spring)).unwrap();
            execute(ctx, "Fenicia", at(Season::Spring)).unwrap();
        });
        assert_eq!(saga.character("Fenicia").unwrap().xp(&Subject::Art(Art::Creo)), 120);
    }

    #[test]
    fn teaching_resolves_once_for_both() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        let teach = Activity::Teach {
            student: "Fenicia".into(),
            subject: Subject::Art(Art::Creo),
        };
        let (teacher, student) = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Aurelius", teach, at(Season::Spring)).unwrap();
            (
                execute(ctx, "Aurelius", at(Season::Spring)).unwrap(),
                execute(ctx, "Fenicia", at(Season::Spring)).unwrap(),
            )
        });
        assert_eq!(teacher.state, ExecutionState::Completed);
        assert_eq!(student.state, ExecutionState::Completed);
        assert!(student.summary.contains("Aurelius"));
        // 3 + Com 0 + Teaching 0
        assert_eq!(saga.character("Fenicia").unwrap().xp(&Subject::Art(Art::Creo)), 3);
        assert!(saga.character("Fenicia").unwrap().activity_queue.is_empty());
    }

    #[test]
    fn student_first_delegates_to_teacher() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        let teach = Activity::Teach {
            student: "Fenicia".into(),
            subject: Subject::Art(Art::Creo),
        };
        let teacher = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Aurelius", teach, at(Season::Spring)).unwrap();
            execute(ctx, "Fenicia", at(Season::Spring)).unwrap();
            execute(ctx, "Aurelius", at(Season::Spring)).unwrap()
        });
        assert_eq!(teacher.state, ExecutionState::Completed);
        assert_eq!(teacher.summary, "resolved together with Fenicia");
        assert_eq!(saga.character("Fenicia").unwrap().xp(&Subject::Art(Art::Creo)), 3);
    }

    #[test]
    fn enchant_without_vis_fails_and_defers() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        let enchant = Activity::Enchant {
            item: ItemDesign {
                name: "Lamp of Undying Flame".into(),
                kind: ItemKind::Invested,
                technique: Art::Creo,
                form: Art::Ignem,
                level: 10,
            },
            seasons: 1,
        };
        let report = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Aurelius", enchant, at(Season::Spring)).unwrap();
            execute(ctx, "Aurelius", at(Season::Spring)).unwrap()
        });
        assert_eq!(report.state, ExecutionState::Failed);
        assert_eq!(report.failure, Some(FailureKind::InsufficientResources));
        let aurelius = saga.character("Aurelius").unwrap();
        assert!(aurelius.activity_queue.is_empty());
        assert_eq!(aurelius.deferred.len(), 1);
        assert!(aurelius.items.is_empty());
        assert_eq!(
            saga.covenants["Semita Errabunda"].vis_stock,
            VisStock::from_pairs([(Art::Vim, 4)])
        );
    }

    #[test]
    fn year_runs_in_order_with_or_without_events() {
        let saga = saga();
        let config = SeasonConfig::default().with_event_chance(100);
        for include_events in [false, true] {
            let mut saga = saga.clone();
            let reports = run(&mut saga, &config, |ctx| {
                schedule(ctx, "Fenicia", practice(Art::Vim), at(Season::Summer)).unwrap();
                schedule(ctx, "Fenicia", practice(Art::Vim), at(Season::Winter)).unwrap();
                execute_year(ctx, "Fenicia", 1220, include_events).unwrap()
            });
            let order: Vec<Season> = reports.iter().map(|r| r.slot.season).collect();
            assert_eq!(order, Season::ALL.to_vec());
            let states: Vec<ExecutionState> = reports.iter().map(|r| r.state).collect();
            assert_eq!(
                states,
                vec![
                    ExecutionState::Idle,
                    ExecutionState::Completed,
                    ExecutionState::Idle,
                    ExecutionState::Completed
                ]
            );
            assert_eq!(reports.iter().any(|r| !r.events.is_empty()), include_events);
            let fenicia = saga.character("Fenicia").unwrap();
            assert_eq!(fenicia.age, 26);
            assert_eq!(fenicia.last_executed, Some(at(Season::Winter)));
        }
    }

    #[test]
    fn executed_slot_cannot_run_again() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        let err = run(&mut saga, &config, |ctx| {
            execute(ctx, "Fenicia", at(Season::Summer)).unwrap();
            execute(ctx, "Fenicia", at(Season::Spring)).unwrap_err()
        });
        assert_eq!(err.kind(), FailureKind::InvalidTimelineOrder);
    }

    #[test]
    fn skipped_entries_are_deferred() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        run(&mut saga, &config, |ctx| {
            schedule(ctx, "Fenicia", practice(Art::Vim), at(Season::Spring)).unwrap();
            execute(ctx, "Fenicia", at(Season::Summer)).unwrap();
        });
        let fenicia = saga.character("Fenicia").unwrap();
        assert!(fenicia.activity_queue.is_empty());
        assert_eq!(fenicia.deferred.len(), 1);
        assert_eq!(fenicia.xp(&Subject::Art(Art::Vim)), 0);
    }

    #[test]
    fn winter_aging_can_kill() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        {
            let elder = saga.characters.get_mut("Fenicia").unwrap();
            elder.age = 80;
            elder.decrepitude_points = 73;
        }
        let mut dice = ScriptedRolls::new([9]).unwrap();
        let mut ctx = SeasonContext::new(&mut saga, &mut dice, &config);
        execute(&mut ctx, "Fenicia", at(Season::Winter)).unwrap();
        // 9 + 9 (age 81) = 18: two decrepitude points reach score 5.
        let fenicia = saga.character("Fenicia").unwrap();
        assert_eq!(fenicia.decrepitude_points, 75);
        assert_eq!(fenicia.status, CharacterStatus::Dead);
        assert!(saga
            .chronicle
            .entries_for("Fenicia")
            .iter()
            .any(|e| matches!(e.kind, ChronicleKind::Died { .. })));
    }

    #[test]
    fn saga_season_runs_everyone_and_advances() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        saga.covenants
            .get_mut("Semita Errabunda")
            .unwrap()
            .vis_sources
            .push(ars_core::VisSource {
                name: "Dew of the old oak".into(),
                art: Art::Herbam,
                pawns: 3,
                season: Some(Season::Spring),
            });
        let reports = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Fenicia", practice(Art::Vim), at(Season::Spring)).unwrap();
            execute_saga_season(ctx, false).unwrap()
        });
        let names: Vec<&str> = reports.iter().map(|r| r.character.as_str()).collect();
        assert_eq!(names, vec!["Aurelius", "Fenicia"]);
        assert_eq!(saga.current, at(Season::Summer));
        assert_eq!(saga.covenants["Semita Errabunda"].vis_stock.get(Art::Herbam), 3);
    }

    #[test]
    fn saga_season_shares_one_weather_roll() {
        let mut saga = saga();
        let config = SeasonConfig::default();
        // Exhausted draws read as 99: extraordinary weather and no event.
        let reports = run(&mut saga, &config, |ctx| execute_saga_season(ctx, true).unwrap());
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert_eq!(report.weather.as_ref().map(|w| w.kind), Some(WeatherKind::Extraordinary));
            assert!(report.events.is_empty());
        }
        assert_eq!(saga.weather.len(), 1);
        assert_eq!(saga.covenants["Semita Errabunda"].resources, 8);

        let quiet = SeasonConfig::default().with_weather(false);
        let reports = run(&mut saga, &quiet, |ctx| execute_saga_season(ctx, true).unwrap());
        assert!(reports.iter().all(|r| r.weather.is_none()));
        assert_eq!(saga.weather.len(), 1);
    }

    #[test]
    fn requeue_moves_failure_to_next_free_season() {
        let mut saga = saga();
        let config = SeasonConfig::default().with_requeue_failed(true);
        let read = Activity::Study {
            subject: Subject::Art(Art::Vim),
            material: StudyMaterial::Vis,
        };
        // Fenicia needs one pawn of Vim; empty the stock first.
        saga.covenants
            .get_mut("Semita Errabunda")
            .unwrap()
            .vis_stock = VisStock::new();
        let report = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Fenicia", read, at(Season::Spring)).unwrap();
            execute(ctx, "Fenicia", at(Season::Spring)).unwrap()
        });
        assert_eq!(report.state, ExecutionState::Failed);
        assert!(report.summary.contains("requeued for Summer 1220"));
        let fenicia = saga.character("Fenicia").unwrap();
        assert!(fenicia.queued_at(at(Season::Summer)).is_some());
        assert!(fenicia.deferred.is_empty());
    }

    #[test]
    fn requeue_goes_after_the_last_queued_season() {
        let mut saga = saga();
        let config = SeasonConfig::default().with_requeue_failed(true);
        saga.covenants
            .get_mut("Semita Errabunda")
            .unwrap()
            .vis_stock = VisStock::new();
        let read = Activity::Study {
            subject: Subject::Art(Art::Vim),
            material: StudyMaterial::Vis,
        };
        let report = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Fenicia", read, at(Season::Spring)).unwrap();
            schedule(ctx, "Fenicia", practice(Art::Creo), at(Season::Autumn)).unwrap();
            execute(ctx, "Fenicia", at(Season::Spring)).unwrap()
        });
        assert!(report.summary.contains("requeued for Winter 1220"));
        let slots: Vec<_> = saga
            .character("Fenicia")
            .unwrap()
            .activity_queue
            .iter()
            .map(|e| e.slot)
            .collect();
        assert_eq!(slots, vec![at(Season::Autumn), at(Season::Winter)]);
    }

    #[test]
    fn refused_requeue_is_reported_and_deferred() {
        let mut saga = saga();
        let config = SeasonConfig::default().with_requeue_failed(true);
        let read = Activity::Study {
            subject: Subject::Art(Art::Creo),
            material: StudyMaterial::Book {
                title: "Liber Creationis".into(),
            },
        };
        // Aurelius uses up the single-use summa before Fenicia's turn.
        let report = run(&mut saga, &config, |ctx| {
            schedule(ctx, "Aurelius", read.clone(), at(Season::Spring)).unwrap();
            schedule(ctx, "Fenicia", read, at(Season::Spring)).unwrap();
            execute(ctx, "Aurelius", at(Season::Spring)).unwrap();
            execute(ctx, "Fenicia", at(Season::Spring)).unwrap()
        });
        assert_eq!(report.state, ExecutionState::Failed);
        assert_eq!(report.failure, Some(FailureKind::SourceExhausted));
        assert!(report.summary.contains("requeue failed (SourceExhausted)"));
        let fenicia = saga.character("Fenicia").unwrap();
        assert!(fenicia.activity_queue.is_empty());
        assert_eq!(fenicia.deferred.len(), 1);
    }
}
