//! Interrupting, resuming, and abandoning multi-season projects.
//!
//! Interrupting releases the project's queued seasons. With progress saved,
//! the project keeps an interruption record until a continuation of the same
//! activity executes after the interruption has run its course.

use std::collections::BTreeSet;

use ars_core::{Activity, Character, InterruptionRecord, TimelinePosition};
use chrono::Utc;
use uuid::Uuid;

use crate::chronicle::ChronicleKind;
use crate::context::SeasonContext;
use crate::error::{SeasonError, SeasonResult};
use crate::executor::ExecutionState;
use crate::saga::Saga;
use crate::scheduler::{self, ScheduleReceipt};

/// Result of interrupting a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptReport {
    /// The character.
    pub character: String,
    /// Label of the project.
    pub project: String,
    /// Always [`ExecutionState::Interrupted`].
    pub state: ExecutionState,
    /// Queued seasons released.
    pub released: usize,
    /// Seasons worked on the project before it stopped.
    pub elapsed_seasons: u32,
    /// Progress kept for a later resume, if saved.
    pub saved_progress: Option<u32>,
    /// First slot a continuation may occupy, if saved.
    pub resumable_from: Option<TimelinePosition>,
}

/// Interrupt `name`'s project for `duration` seasons.
///
/// With `save_progress`, accumulated progress is kept in an interruption
/// record; otherwise the project is discarded and cannot be resumed.
pub fn interrupt(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    reason: &str,
    duration: u32,
    save_progress: bool,
) -> SeasonResult<InterruptReport> {
    let now = ctx.now();
    let character = ctx.saga.character_mut(name)?;
    let project = character
        .in_progress_project
        .as_ref()
        .ok_or_else(|| SeasonError::NoProjectInProgress(name.to_string()))?;
    let label = project.activity.label();
    if project.is_interrupted() {
        return Err(SeasonError::NestedInterruptionRejected {
            character: name.to_string(),
            project: label,
        });
    }
    let progress = project.accumulated_progress;
    let elapsed_seasons = project.seasons_worked;
    let activity = project.activity.clone();
    let interrupted_at = character.last_executed.unwrap_or(now);

    let (released, partners) = release(character, &activity);
    let record = InterruptionRecord {
        reason: reason.to_string(),
        duration,
        elapsed_seasons,
        saved_progress: progress,
        interrupted_at,
        recorded_at: Utc::now(),
    };
    let resumable_from = save_progress.then(|| record.blocked_until().next());
    if save_progress {
        if let Some(project) = character.in_progress_project.as_mut() {
            project.interruption = Some(record);
            project.remaining_seasons = 0;
        }
    } else {
        character.in_progress_project = None;
    }
    release_partners(ctx.saga, &partners);

    let description = if save_progress {
        format!("{name} set aside {label} ({reason}) after {elapsed_seasons} season(s), with {progress} progress kept")
    } else {
        format!("{name} gave up {label} ({reason}); the work is lost")
    };
    ctx.emit(
        interrupted_at,
        ChronicleKind::Interrupted {
            character: name.to_string(),
            project: label.clone(),
            saved: save_progress,
        },
        description,
    );
    tracing::info!(
        character = name,
        project = %label,
        duration,
        elapsed_seasons,
        save_progress,
        released,
        "project interrupted"
    );

    Ok(InterruptReport {
        character: name.to_string(),
        project: label,
        state: ExecutionState::Interrupted,
        released,
        elapsed_seasons,
        saved_progress: save_progress.then_some(progress),
        resumable_from,
    })
}

/// Queue a continuation of `name`'s interrupted project from `start`.
///
/// `seasons` overrides how many seasons to reserve for research and
/// laboratory work. Progress is restored when the continuation executes.
pub fn resume(
    ctx: &mut SeasonContext<'_>,
    name: &str,
    start: TimelinePosition,
    seasons: Option<u32>,
) -> SeasonResult<ScheduleReceipt> {
    let activity = {
        let character = ctx.saga.character(name)?;
        let not_resumable = |reason: &str| SeasonError::NotResumable {
            character: name.to_string(),
            reason: reason.to_string(),
        };
        let project = character
            .in_progress_project
            .as_ref()
            .ok_or_else(|| not_resumable("no project in progress"))?;
        if !project.is_interrupted() {
            return Err(not_resumable("the project is not interrupted"));
        }
        let mut activity = project.activity.clone();
        if let Some(seasons) = seasons {
            set_seasons(&mut activity, seasons);
        }
        activity
    };
    let label = activity.label();
    let receipt = scheduler::schedule(ctx, name, activity, start)?;
    ctx.emit(
        start,
        ChronicleKind::Resumed {
            character: name.to_string(),
            project: label.clone(),
        },
        format!("{name} will take up {label} again in {start}"),
    );
    Ok(receipt)
}

/// Drop `name`'s project and release its queued seasons.
pub fn abandon_project(ctx: &mut SeasonContext<'_>, name: &str) -> SeasonResult<String> {
    let now = ctx.now();
    let character = ctx.saga.character_mut(name)?;
    let project = character
        .in_progress_project
        .take()
        .ok_or_else(|| SeasonError::NoProjectInProgress(name.to_string()))?;
    let at = character.last_executed.unwrap_or(now);
    let (_, partners) = release(character, &project.activity);
    release_partners(ctx.saga, &partners);

    let label = project.activity.label();
    ctx.emit(
        at,
        ChronicleKind::Abandoned {
            character: name.to_string(),
            project: label.clone(),
        },
        format!(
            "{name} abandoned {label} at {}/{}",
            project.accumulated_progress, project.target_progress
        ),
    );
    Ok(label)
}

fn set_seasons(activity: &mut Activity, n: u32) {
    match activity {
        Activity::Research { seasons, .. }
        | Activity::Invent { seasons, .. }
        | Activity::Enchant { seasons, .. } => *seasons = n.max(1),
        _ => {}
    }
}

/// Remove queued entries that continue `activity`. Returns how many were
/// removed and the partners holding entries of the same series.
fn release(character: &mut Character, activity: &Activity) -> (usize, Vec<(String, Uuid)>) {
    let key = activity.project_key();
    let continues = |a: &Activity| key.is_some() && a.project_key() == key;
    let series: BTreeSet<Uuid> = character
        .activity_queue
        .iter()
        .filter(|e| continues(&e.activity))
        .map(|e| e.series)
        .collect();
    let partners = character
        .activity_queue
        .iter()
        .filter(|e| series.contains(&e.series))
        .filter_map(|e| e.activity.partner().map(|(p, _)| (p.to_string(), e.series)))
        .collect();
    let before = character.activity_queue.len();
    character
        .activity_queue
        .retain(|e| !series.contains(&e.series));
    (before - character.activity_queue.len(), partners)
}

fn release_partners(saga: &mut Saga, partners: &[(String, Uuid)]) {
    for (partner, series) in partners {
        if let Some(record) = saga.characters.get_mut(partner) {
            record.activity_queue.retain(|e| e.series != *series);
        }
    }
}
