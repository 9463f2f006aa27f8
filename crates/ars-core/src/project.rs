use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityKind};
use crate::error::CoreError;
use crate::timeline::TimelinePosition;

/// Saved state of an interrupted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptionRecord {
    /// Why the work stopped.
    pub reason: String,
    /// Seasons the interruption lasts.
    pub duration: u32,
    /// Seasons already worked on the project when it stopped.
    pub elapsed_seasons: u32,
    /// Progress at the moment of interruption.
    pub saved_progress: u32,
    /// Saga slot at which the work stopped.
    pub interrupted_at: TimelinePosition,
    /// Wall-clock time the interruption was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl InterruptionRecord {
    /// Last slot during which the project cannot be continued.
    pub fn blocked_until(&self) -> TimelinePosition {
        self.interrupted_at.advance_by(self.duration)
    }

    /// Returns true if `slot` falls inside the interruption.
    pub fn blocks(&self, slot: TimelinePosition) -> bool {
        slot <= self.blocked_until()
    }
}

/// Accumulated state of a multi-season activity that is not yet complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ProjectDocument", try_from = "ProjectDocument")]
pub struct InProgressProject {
    /// The activity being worked on.
    pub activity: Activity,
    /// Points or seasons invested so far.
    pub accumulated_progress: u32,
    /// Progress needed to complete.
    pub target_progress: u32,
    /// Seasons still reserved on the queue for this project.
    pub remaining_seasons: u32,
    /// Seasons spent on the project.
    pub seasons_worked: u32,
    /// Slot of the first season worked.
    pub started_at: TimelinePosition,
    /// Whether the up-front vis cost has been paid.
    pub vis_paid: bool,
    /// Present while the project is interrupted.
    pub interruption: Option<InterruptionRecord>,
}

impl InProgressProject {
    /// Start a project at `started_at` with nothing accumulated.
    pub fn new(activity: Activity, target_progress: u32, started_at: TimelinePosition) -> Self {
        Self {
            remaining_seasons: activity.seasons(),
            activity,
            accumulated_progress: 0,
            target_progress,
            seasons_worked: 0,
            started_at,
            vis_paid: false,
            interruption: None,
        }
    }

    /// The project's activity kind.
    pub fn activity_type(&self) -> ActivityKind {
        self.activity.kind()
    }

    /// Returns true while an interruption record is present.
    pub fn is_interrupted(&self) -> bool {
        self.interruption.is_some()
    }

    /// Returns true once accumulated progress reaches the target.
    pub fn is_complete(&self) -> bool {
        self.accumulated_progress >= self.target_progress
    }

    /// Returns true if `activity` continues this project.
    pub fn is_continued_by(&self, activity: &Activity) -> bool {
        activity.project_key().is_some() && activity.project_key() == self.activity.project_key()
    }
}

/// Flat persisted layout of an [`InProgressProject`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Kind of the project's activity.
    pub activity_type: ActivityKind,
    /// Points or seasons invested so far.
    pub accumulated_progress: u32,
    /// Seasons still reserved on the queue.
    pub remaining_seasons: u32,
    /// Whether an interruption is in effect.
    pub interrupted: bool,
    /// Why the project was interrupted.
    #[serde(default)]
    pub interruption_reason: Option<String>,
    /// The full activity parameters.
    pub activity: Activity,
    /// Progress needed to complete.
    pub target_progress: u32,
    /// Seasons spent on the project.
    #[serde(default)]
    pub seasons_worked: u32,
    /// Slot of the first season worked.
    pub started_at: TimelinePosition,
    /// Whether the up-front vis cost has been paid.
    #[serde(default)]
    pub vis_paid: bool,
    /// Seasons the interruption lasts.
    #[serde(default)]
    pub interruption_duration: Option<u32>,
    /// Seasons worked before the interruption.
    #[serde(default)]
    pub elapsed_seasons: Option<u32>,
    /// Progress saved at interruption.
    #[serde(default)]
    pub saved_progress: Option<u32>,
    /// Saga slot of the interruption.
    #[serde(default)]
    pub interrupted_at: Option<TimelinePosition>,
    /// Wall-clock time of the interruption.
    #[serde(default)]
    pub interruption_recorded_at: Option<DateTime<Utc>>,
}

impl From<InProgressProject> for ProjectDocument {
    fn from(project: InProgressProject) -> Self {
        let interruption = project.interruption;
        Self {
            activity_type: project.activity.kind(),
            accumulated_progress: project.accumulated_progress,
            remaining_seasons: project.remaining_seasons,
            interrupted: interruption.is_some(),
            interruption_reason: interruption.as_ref().map(|i| i.reason.clone()),
            activity: project.activity,
            target_progress: project.target_progress,
            seasons_worked: project.seasons_worked,
            started_at: project.started_at,
            vis_paid: project.vis_paid,
            interruption_duration: interruption.as_ref().map(|i| i.duration),
            elapsed_seasons: interruption.as_ref().map(|i| i.elapsed_seasons),
            saved_progress: interruption.as_ref().map(|i| i.saved_progress),
            interrupted_at: interruption.as_ref().map(|i| i.interrupted_at),
            interruption_recorded_at: interruption.as_ref().map(|i| i.recorded_at),
        }
    }
}

impl TryFrom<ProjectDocument> for InProgressProject {
    type Error = CoreError;

    fn try_from(doc: ProjectDocument) -> Result<Self, Self::Error> {
        if doc.activity_type != doc.activity.kind() {
            return Err(CoreError::InvalidDocument(format!(
                "project activity_type is {} but activity is {}",
                doc.activity_type,
                doc.activity.kind()
            )));
        }
        let interruption = if doc.interrupted {
            let interrupted_at = doc.interrupted_at.ok_or_else(|| {
                CoreError::InvalidDocument("interrupted project without interrupted_at".into())
            })?;
            Some(InterruptionRecord {
                reason: doc.interruption_reason.unwrap_or_default(),
                duration: doc.interruption_duration.unwrap_or(0),
                elapsed_seasons: doc.elapsed_seasons.unwrap_or(doc.seasons_worked),
                saved_progress: doc.saved_progress.unwrap_or(doc.accumulated_progress),
                interrupted_at,
                recorded_at: doc.interruption_recorded_at.unwrap_or_else(Utc::now),
            })
        } else {
            None
        };
        Ok(Self {
            activity: doc.activity,
            accumulated_progress: doc.accumulated_progress,
            target_progress: doc.target_progress,
            remaining_seasons: doc.remaining_seasons,
            seasons_worked: doc.seasons_worked,
            started_at: doc.started_at,
            vis_paid: doc.vis_paid,
            interruption,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ResearchTarget;
    use crate::art::Art;
    use crate::timeline::Season;

    fn project() -> InProgressProject {
        let activity = Activity::Research {
            topic: "Wizard's Sight".into(),
            target: ResearchTarget::Spell,
            technique: Art::Intellego,
            form: Art::Vim,
            level: 25,
            seasons: 3,
            experimental: false,
            assistant: None,
        };
        InProgressProject::new(activity, 25, TimelinePosition::new(1220, Season::Spring))
    }

    #[test]
    fn new_project_reserves_declared_seasons() {
        let p = project();
        assert_eq!(p.remaining_seasons, 3);
        assert!(!p.is_complete());
        assert!(!p.is_interrupted());
        assert_eq!(p.activity_type(), ActivityKind::Research);
    }

    #[test]
    fn persisted_layout_is_flat() {
        let mut p = project();
        p.accumulated_progress = 12;
        p.seasons_worked = 2;
        p.interruption = Some(InterruptionRecord {
            reason: "Tribunal".into(),
            duration: 1,
            elapsed_seasons: 2,
            saved_progress: 12,
            interrupted_at: TimelinePosition::new(1220, Season::Summer),
            recorded_at: Utc::now(),
        });
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["activity_type"], "research");
        assert_eq!(value["accumulated_progress"], 12);
        assert_eq!(value["remaining_seasons"], 3);
        assert_eq!(value["interrupted"], true);
        assert_eq!(value["interruption_reason"], "Tribunal");
        assert_eq!(value["elapsed_seasons"], 2);

        let back: InProgressProject = serde_json::from_value(value).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn mismatched_activity_type_is_rejected() {
        let mut value = serde_json::to_value(project()).unwrap();
        value["activity_type"] = "enchant".into();
        assert!(serde_json::from_value::<InProgressProject>(value).is_err());
    }

    #[test]
    fn older_documents_take_elapsed_seasons_from_work_done() {
        let mut p = project();
        p.seasons_worked = 3;
        p.interruption = Some(InterruptionRecord {
            reason: "Tribunal".into(),
            duration: 1,
            elapsed_seasons: 3,
            saved_progress: 0,
            interrupted_at: TimelinePosition::new(1220, Season::Winter),
            recorded_at: Utc::now(),
        });
        let mut value = serde_json::to_value(&p).unwrap();
        value.as_object_mut().unwrap().remove("elapsed_seasons");
        let back: InProgressProject = serde_json::from_value(value).unwrap();
        assert_eq!(back.interruption.map(|i| i.elapsed_seasons), Some(3));
    }

    #[test]
    fn interruption_window() {
        let record = InterruptionRecord {
            reason: "Wounded".into(),
            duration: 2,
            elapsed_seasons: 1,
            saved_progress: 5,
            interrupted_at: TimelinePosition::new(1220, Season::Summer),
            recorded_at: Utc::now(),
        };
        assert_eq!(record.blocked_until(), TimelinePosition::new(1220, Season::Winter));
        assert!(record.blocks(TimelinePosition::new(1220, Season::Autumn)));
        assert!(!record.blocks(TimelinePosition::new(1221, Season::Spring)));
    }
}
