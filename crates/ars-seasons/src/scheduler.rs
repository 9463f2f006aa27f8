//! Validation and queueing of activities.
//!
//! Every check runs before anything is written, so a rejected activity
//! leaves the saga untouched. Queues only grow at the end: a new entry must
//! lie after the last queued slot, so insertion order is execution order.
//! Coupled
//! activities (teaching, assisted research) reserve the partner's slot with
//! the counterpart entry under the same series id.

use std::collections::BTreeMap;

use ars_core::art::MAGIC_THEORY;
use ars_core::{
    Activity, Character, QueuedActivity, Role, StudyMaterial, TimelinePosition,
};
use uuid::Uuid;

use crate::chronicle::ChronicleKind;
use crate::config::SeasonConfig;
use crate::context::SeasonContext;
use crate::error::{SeasonError, SeasonResult};
use crate::resolve::{ResolverInput, craft_points, points_per_season, validate_custom};
use crate::saga::Saga;

/// Seasons a character can commit in one year.
pub const SEASONS_PER_YEAR: u32 = 4;

/// What a successful scheduling call committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReceipt {
    /// The character whose queue received the activity.
    pub character: String,
    /// Label of the activity.
    pub activity: String,
    /// Series id shared by every entry.
    pub series: Uuid,
    /// Slots the activity occupies.
    pub slots: Vec<TimelinePosition>,
    /// Partner whose slots were reserved with the counterpart entry.
    pub reserved_for: Option<String>,
}

/// Returns true if `a` leads when `a` and `b` both claim to initiate the
/// same coupled slot. The alphabetically first name leads.
pub fn leads(a: &str, b: &str) -> bool {
    a < b
}

/// The first slot at or after `from` that follows everything queued.
pub fn next_free_slot(character: &Character, from: TimelinePosition) -> TimelinePosition {
    character
        .activity_queue
        .last()
        .map_or(from, |last| last.slot.next().max(from))
}

/// Validate `activity` and queue it for `name` starting at `start`.
pub fn schedule(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    activity: Activity,
    start: TimelinePosition,
) -> SeasonResult<ScheduleReceipt> {
    let slots: Vec<TimelinePosition> = (0..activity.seasons())
        .map(|i| start.advance_by(i))
        .collect();

    let (series, reservation) = {
        let saga = &*ctx.saga;
        let character = saga.character(name)?;
        if !character.is_alive() {
            return Err(unmet(name, &activity, start, "the character is dead"));
        }
        check_capacity(character, &slots)?;
        check_timeline(saga, character, start)?;
        check_free(character, &slots)?;
        check_prerequisites(saga, ctx.config, character, &activity, start)?;
        check_project(character, &activity, start)?;
        let series = match activity.partner() {
            Some((lead, Role::Passive)) => initiator_series(saga, character, &activity, lead, start)?,
            _ => Uuid::new_v4(),
        };
        (series, plan_reservation(saga, character, &activity, &slots)?)
    };

    let label = activity.label();
    let of = activity.seasons();
    let entries = (1..)
        .zip(&slots)
        .map(|(part, &slot)| QueuedActivity {
            series,
            activity: activity.clone(),
            slot,
            part,
            of,
        })
        .collect();
    enqueue(ctx.saga.character_mut(name)?, entries);

    let description = if of > 1 {
        format!("{name} will {label} for {of} seasons from {start}")
    } else {
        format!("{name} will {label} in {start}")
    };
    ctx.emit(
        start,
        ChronicleKind::Scheduled {
            character: name.to_string(),
            activity: label.clone(),
        },
        description,
    );

    let reserved_for = match reservation {
        Some(Reservation {
            partner,
            counterpart,
            parts,
        }) => {
            if !parts.is_empty() {
                let counterpart_label = counterpart.label();
                let entries = parts
                    .into_iter()
                    .map(|(part, slot)| QueuedActivity {
                        series,
                        activity: counterpart.clone(),
                        slot,
                        part,
                        of,
                    })
                    .collect();
                enqueue(ctx.saga.character_mut(&partner)?, entries);
                ctx.emit(
                    start,
                    ChronicleKind::Reserved {
                        character: name.to_string(),
                        partner: partner.clone(),
                    },
                    format!("{partner} is reserved to {counterpart_label}"),
                );
            }
            Some(partner)
        }
        None => None,
    };

    tracing::debug!(
        character = name,
        activity = %label,
        %start,
        seasons = of,
        partner = reserved_for.as_deref().unwrap_or(""),
        "activity scheduled"
    );
    Ok(ScheduleReceipt {
        character: name.to_string(),
        activity: label,
        series,
        slots,
        reserved_for,
    })
}

/// Schedule several activities for one character as a unit.
///
/// If any activity is rejected, none are committed and the error names the
/// failing activity's position.
pub fn schedule_many(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    activities: Vec<(Activity, TimelinePosition)>,
) -> SeasonResult<Vec<ScheduleReceipt>> {
    ctx.atomically(|ctx| {
        activities
            .into_iter()
            .enumerate()
            .map(|(index, (activity, start))| {
                let label = activity.label();
                schedule(ctx, name, activity, start).map_err(|source| SeasonError::BatchRejected {
                    index,
                    activity: label,
                    source: Box::new(source),
                })
            })
            .collect()
    })
}

/// Schedule a coupled activity, settling a clash with a partner who
/// initiated the mirror-image activity in the same slot.
///
/// The alphabetically first of the two leads. If `initiator` leads, the
/// partner's clashing entry is moved to their deferred list; otherwise the
/// initiator takes the passive counterpart of the partner's activity.
pub fn coordinate(
    ctx: &mut SeasonContext<'_>,
    initiator: &str,
    activity: Activity,
    slot: TimelinePosition,
) -> SeasonResult<ScheduleReceipt> {
    let Some((partner, Role::Initiator)) = activity.partner() else {
        return Err(unmet(
            initiator,
            &activity,
            slot,
            "only teaching and assisted research can be coordinated",
        ));
    };
    let partner = partner.to_string();

    ctx.atomically(|ctx| {
        let clash = ctx
            .saga
            .character(&partner)?
            .queued_at(slot)
            .filter(|entry| entry.activity.partner() == Some((initiator, Role::Initiator)))
            .cloned();
        let Some(theirs) = clash else {
            return schedule(ctx, initiator, activity, slot);
        };

        if leads(initiator, &partner) {
            withdraw_series(ctx.saga, &partner, initiator, theirs.series);
            ctx.saga.character_mut(&partner)?.deferred.push(theirs);
            tracing::info!(
                lead = initiator,
                partner = partner.as_str(),
                %slot,
                "coupled clash settled for the initiator"
            );
            return schedule(ctx, initiator, activity, slot);
        }

        let Some(counterpart) = theirs.activity.counterpart(&partner) else {
            return Err(unmet(initiator, &activity, slot, "the partner's activity has no counterpart"));
        };
        tracing::info!(
            lead = partner.as_str(),
            partner = initiator,
            %slot,
            "coupled clash settled for the partner"
        );
        let mine = ctx.saga.character(initiator)?.queued_at(slot).cloned();
        match mine {
            Some(entry) if entry.activity == counterpart => Ok(ScheduleReceipt {
                character: initiator.to_string(),
                activity: counterpart.label(),
                series: entry.series,
                slots: vec![slot],
                reserved_for: None,
            }),
            _ => schedule(ctx, initiator, counterpart, slot),
        }
    })
}

/// Put a deferred activity back on the queue starting at `start`.
pub fn retry_deferred(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    series: Uuid,
    start: TimelinePosition,
) -> SeasonResult<ScheduleReceipt> {
    ctx.atomically(|ctx| {
        let entry = take_deferred(ctx.saga, name, series)?;
        schedule(ctx, name, entry.activity, start)
    })
}

/// Drop a deferred activity for good.
pub fn abandon_deferred(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    series: Uuid,
) -> SeasonResult<QueuedActivity> {
    let entry = take_deferred(ctx.saga, name, series)?;
    tracing::debug!(character = name, %series, "deferred activity abandoned");
    Ok(entry)
}

fn take_deferred(saga: &mut Saga, name: &str, series: Uuid) -> SeasonResult<QueuedActivity> {
    let character = saga.character_mut(name)?;
    let index = character
        .deferred
        .iter()
        .position(|entry| entry.series == series)
        .ok_or_else(|| SeasonError::DeferredNotFound {
            character: name.to_string(),
            series,
        })?;
    Ok(character.deferred.remove(index))
}

/// Remove every entry of `series` from both characters' queues.
pub(crate) fn withdraw_series(saga: &mut Saga, name: &str, partner: &str, series: Uuid) {
    for who in [name, partner] {
        if let Some(character) = saga.characters.get_mut(who) {
            character.activity_queue.retain(|entry| entry.series != series);
        }
    }
}

/// Append entries to the end of the queue.
pub(crate) fn enqueue(character: &mut Character, entries: Vec<QueuedActivity>) {
    character.activity_queue.extend(entries);
}

fn unmet(name: &str, activity: &Activity, slot: TimelinePosition, reason: impl Into<String>) -> SeasonError {
    SeasonError::PrerequisiteNotMet {
        character: name.to_string(),
        activity: activity.label(),
        slot,
        reason: reason.into(),
    }
}

fn unavailable(activity: &Activity, name: &str, partner: &str, slot: TimelinePosition) -> SeasonError {
    match activity {
        Activity::Teach { .. } | Activity::Learn { .. } => {
            let (teacher, student) = if matches!(activity, Activity::Teach { .. }) {
                (name, partner)
            } else {
                (partner, name)
            };
            SeasonError::StudentUnavailable {
                teacher: teacher.to_string(),
                student: student.to_string(),
                slot,
            }
        }
        _ => SeasonError::PartnerUnavailable {
            character: name.to_string(),
            partner: partner.to_string(),
            slot,
        },
    }
}

fn check_capacity(character: &Character, slots: &[TimelinePosition]) -> SeasonResult<()> {
    let mut requested: BTreeMap<i32, u32> = BTreeMap::new();
    for slot in slots {
        *requested.entry(slot.year).or_default() += 1;
    }
    for (year, requested) in requested {
        let committed = character.committed_in_year(year);
        if committed + requested > SEASONS_PER_YEAR {
            return Err(SeasonError::CapacityExceeded {
                character: character.name.clone(),
                year,
                committed,
                requested,
            });
        }
    }
    Ok(())
}

/// A start on the last queued slot itself falls through to `check_free`.
fn check_timeline(saga: &Saga, character: &Character, start: TimelinePosition) -> SeasonResult<()> {
    let open = character
        .last_executed
        .map_or(saga.current, |done| done.next().max(saga.current));
    let last_queued = character.activity_queue.last().map(|entry| entry.slot);
    let earliest = last_queued.map_or(open, |last| last.next().max(open));
    if start < open || last_queued.is_some_and(|last| start < last) {
        return Err(SeasonError::InvalidTimelineOrder {
            character: character.name.clone(),
            slot: start,
            earliest,
        });
    }
    Ok(())
}

fn check_free(character: &Character, slots: &[TimelinePosition]) -> SeasonResult<()> {
    for &slot in slots {
        if let Some(entry) = character.queued_at(slot) {
            return Err(SeasonError::SlotOccupied {
                character: character.name.clone(),
                slot,
                occupant: entry.activity.label(),
            });
        }
    }
    Ok(())
}

fn check_lab_work(character: &Character, saga: &Saga, activity: &Activity, start: TimelinePosition) -> SeasonResult<()> {
    if character.ability_score(MAGIC_THEORY) == 0 {
        return Err(unmet(&character.name, activity, start, "no Magic Theory"));
    }
    if !saga.laboratories.contains_key(&character.name) {
        return Err(unmet(&character.name, activity, start, "no laboratory"));
    }
    Ok(())
}

fn check_prerequisites(
    saga: &Saga,
    config: &SeasonConfig,
    character: &Character,
    activity: &Activity,
    start: TimelinePosition,
) -> SeasonResult<()> {
    let name = character.name.as_str();
    let fail = |reason: String| unmet(name, activity, start, reason);
    let covenant = saga.covenant_of(character);
    let trial = QueuedActivity {
        series: Uuid::nil(),
        activity: activity.clone(),
        slot: start,
        part: 1,
        of: activity.seasons(),
    };

    match activity {
        Activity::Study { subject, material } => match material {
            StudyMaterial::Book { title } => {
                let covenant = covenant.ok_or_else(|| fail("no covenant library to study from".into()))?;
                let source = covenant
                    .source(title)
                    .ok_or_else(|| fail(format!("the library holds no \"{title}\"")))?;
                if source.subject != *subject {
                    return Err(fail(format!("\"{title}\" covers {}, not {subject}", source.subject)));
                }
                let already_read = source.level.is_none() && character.sources_read.contains(title);
                if source.exhausted || already_read {
                    return Err(SeasonError::SourceExhausted {
                        character: name.to_string(),
                        title: title.clone(),
                    });
                }
                if let Some(level) = source.level.filter(|&level| character.score(subject) >= level) {
                    return Err(fail(format!("already at level {level}, beyond what \"{title}\" teaches")));
                }
            }
            StudyMaterial::Vis => {
                if !subject.is_art() {
                    return Err(fail("vis can only teach a Hermetic Art".into()));
                }
                if covenant.is_none() {
                    return Err(fail("no covenant vis stock to study from".into()));
                }
            }
            StudyMaterial::Practice => {}
        },
        Activity::Research {
            level, assistant, ..
        } => {
            if *level == 0 {
                return Err(fail("research needs a target level".into()));
            }
            check_lab_work(character, saga, activity, start)?;
            if assistant.as_deref() == Some(name) {
                return Err(fail("cannot assist themselves".into()));
            }
            let partner = assistant.as_deref().and_then(|a| saga.characters.get(a));
            if points_per_season(&trial_input(saga, config, character, &trial, partner)) == 0 {
                return Err(fail("lab total is too low to earn research points".into()));
            }
        }
        Activity::Teach { student, subject } => {
            if student == name {
                return Err(fail("cannot teach themselves".into()));
            }
            let own = character.score(subject);
            if own == 0 {
                return Err(fail(format!("knows nothing of {subject} to teach")));
            }
            if saga
                .characters
                .get(student)
                .is_some_and(|s| s.score(subject) >= own)
            {
                return Err(fail(format!("{student} already knows as much {subject}")));
            }
        }
        Activity::Invent { spell, .. } => {
            check_lab_work(character, saga, activity, start)?;
            if craft_points(&trial_input(saga, config, character, &trial, None)) <= 0 {
                return Err(fail(format!("lab total does not exceed level {}", spell.level)));
            }
        }
        Activity::Enchant { item, .. } => {
            check_lab_work(character, saga, activity, start)?;
            if craft_points(&trial_input(saga, config, character, &trial, None)) <= 0 {
                return Err(fail(format!("lab total does not exceed level {}", item.level)));
            }
        }
        Activity::Service { ability, .. } => {
            if covenant.is_none() {
                return Err(fail("no covenant to serve".into()));
            }
            if ability.trim().is_empty() {
                return Err(fail("service needs an Ability".into()));
            }
        }
        Activity::Story {
            experience, subject, ..
        } => {
            if *experience > config.max_story_xp {
                return Err(fail(format!(
                    "a story awards at most {} xp, not {experience}",
                    config.max_story_xp
                )));
            }
            if *experience > 0 && subject.is_none() {
                return Err(fail("story experience needs a subject".into()));
            }
        }
        Activity::Custom {
            name: custom,
            seasons,
            requirements,
            results,
        } => validate_custom(custom, *seasons, requirements, results).map_err(fail)?,
        Activity::Learn { .. } | Activity::Assist { .. } => {}
    }
    Ok(())
}

/// Resolver input for checking an activity before it is queued.
fn trial_input<'a>(
    saga: &'a Saga,
    config: &'a SeasonConfig,
    character: &'a Character,
    trial: &'a QueuedActivity,
    partner: Option<&'a Character>,
) -> ResolverInput<'a> {
    ResolverInput {
        character,
        entry: trial,
        covenant: saga.covenant_of(character),
        laboratory: saga.laboratories.get(&character.name),
        partner,
        project: character.in_progress_project.as_ref(),
        config,
        weather: None,
    }
}

/// One project at a time, and none inside an interruption window.
fn check_project(character: &Character, activity: &Activity, start: TimelinePosition) -> SeasonResult<()> {
    let Some(key) = activity.project_key() else {
        return Ok(());
    };
    let name = character.name.as_str();
    if let Some(project) = &character.in_progress_project {
        if !project.is_continued_by(activity) {
            return Err(unmet(
                name,
                activity,
                start,
                format!("{} is already in progress", project.activity.label()),
            ));
        }
        if let Some(interruption) = project.interruption.as_ref().filter(|i| i.blocks(start)) {
            return Err(unmet(
                name,
                activity,
                start,
                format!(
                    "the project is interrupted ({}) until after {}",
                    interruption.reason,
                    interruption.blocked_until()
                ),
            ));
        }
    }
    let other = character
        .activity_queue
        .iter()
        .find(|entry| entry.activity.project_key().is_some_and(|k| k != key));
    if let Some(other) = other {
        return Err(unmet(
            name,
            activity,
            start,
            format!("{} is already queued", other.activity.label()),
        ));
    }
    Ok(())
}

/// A passive entry joins the series of the initiator's entry in that slot.
fn initiator_series(
    saga: &Saga,
    character: &Character,
    activity: &Activity,
    lead: &str,
    slot: TimelinePosition,
) -> SeasonResult<Uuid> {
    let name = character.name.as_str();
    saga.characters
        .get(lead)
        .filter(|c| c.is_alive())
        .and_then(|c| c.queued_at(slot))
        .filter(|entry| {
            entry.activity.partner() == Some((name, Role::Initiator))
                && entry.activity.counterpart(lead).as_ref() == Some(activity)
        })
        .map(|entry| entry.series)
        .ok_or_else(|| unavailable(activity, name, lead, slot))
}

struct Reservation {
    partner: String,
    counterpart: Activity,
    parts: Vec<(u32, TimelinePosition)>,
}

/// Work out which of the partner's slots need the counterpart entry.
fn plan_reservation(
    saga: &Saga,
    character: &Character,
    activity: &Activity,
    slots: &[TimelinePosition],
) -> SeasonResult<Option<Reservation>> {
    let Some((partner_name, Role::Initiator)) = activity.partner() else {
        return Ok(None);
    };
    let Some(counterpart) = activity.counterpart(&character.name) else {
        return Ok(None);
    };
    let name = character.name.as_str();
    let first = slots.first().copied().unwrap_or(saga.current);
    let partner = saga
        .characters
        .get(partner_name)
        .filter(|p| p.is_alive())
        .ok_or_else(|| unavailable(activity, name, partner_name, first))?;

    let last_queued = partner.activity_queue.last().map(|entry| entry.slot);
    let mut parts = Vec::new();
    for (part, &slot) in (1..).zip(slots) {
        if partner.last_executed.is_some_and(|done| slot <= done) {
            return Err(unavailable(activity, name, partner_name, slot));
        }
        match partner.queued_at(slot) {
            None if last_queued.is_some_and(|last| slot < last) => {
                return Err(unavailable(activity, name, partner_name, slot));
            }
            None => parts.push((part, slot)),
            Some(entry) if entry.activity == counterpart => {}
            Some(_) => return Err(unavailable(activity, name, partner_name, slot)),
        }
    }
    Ok(Some(Reservation {
        partner: partner_name.to_string(),
        counterpart,
        parts,
    }))
}
