use ars_core::{TimelinePosition, VisStock};
use uuid::Uuid;

use crate::store::StoreError;

/// Alias for `Result<T, SeasonError>`.
pub type SeasonResult<T> = Result<T, SeasonError>;

/// The category of a failed operation, for display and caller decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The year already holds four committed seasons.
    CapacityExceeded,
    /// An activity-specific requirement is unmet.
    PrerequisiteNotMet,
    /// A study source is used up.
    SourceExhausted,
    /// A teaching partner is not free.
    StudentUnavailable,
    /// A laboratory partner is not free.
    PartnerUnavailable,
    /// Not enough vis to pay a cost.
    InsufficientResources,
    /// The project is already interrupted.
    NestedInterruptionRejected,
    /// The slot is out of order on the timeline.
    InvalidTimelineOrder,
    /// Another activity already occupies the slot.
    SlotOccupied,
    /// A named record does not exist.
    NotFound,
    /// There is no project to act on.
    NoProjectInProgress,
    /// The project cannot be resumed.
    NotResumable,
    /// Persistence failed.
    Store,
}

/// Errors raised by scheduling, execution, and interruption.
///
/// Every variant carries the character, activity, or slot involved.
#[derive(Debug, thiserror::Error)]
pub enum SeasonError {
    /// Scheduling would commit more than four seasons in a year.
    #[error("{character} already has {committed} of 4 seasons committed in {year}; {requested} more requested")]
    CapacityExceeded {
        /// The character being scheduled.
        character: String,
        /// The overcommitted year.
        year: i32,
        /// Seasons already committed that year.
        committed: u32,
        /// Seasons the request adds to that year.
        requested: u32,
    },

    /// An activity-specific requirement is unmet.
    #[error("{character} cannot {activity} in {slot}: {reason}")]
    PrerequisiteNotMet {
        /// The acting character.
        character: String,
        /// Label of the activity.
        activity: String,
        /// The slot requested.
        slot: TimelinePosition,
        /// What is missing.
        reason: String,
    },

    /// A study source cannot be read again.
    #[error("\"{title}\" is exhausted for {character}")]
    SourceExhausted {
        /// The reader.
        character: String,
        /// Title of the source.
        title: String,
    },

    /// The student has a conflicting activity in the slot.
    #[error("{student} is not available to be taught by {teacher} in {slot}")]
    StudentUnavailable {
        /// The teacher.
        teacher: String,
        /// The student.
        student: String,
        /// The slot requested.
        slot: TimelinePosition,
    },

    /// A laboratory partner has a conflicting activity in the slot.
    #[error("{partner} is not available to work with {character} in {slot}")]
    PartnerUnavailable {
        /// The character asking.
        character: String,
        /// The partner.
        partner: String,
        /// The slot requested.
        slot: TimelinePosition,
    },

    /// The vis stock cannot cover a cost. Nothing was deducted.
    #[error("{character} cannot {activity}: needs {needed} vis, only {available} available")]
    InsufficientResources {
        /// The acting character.
        character: String,
        /// Label of the activity.
        activity: String,
        /// Full cost.
        needed: VisStock,
        /// What laboratory and covenant hold of the needed Arts.
        available: VisStock,
    },

    /// The project is already interrupted.
    #[error("{project} of {character} is already interrupted")]
    NestedInterruptionRejected {
        /// The character.
        character: String,
        /// Label of the project.
        project: String,
    },

    /// The slot is before a point the timeline has already passed.
    #[error("{slot} is out of order for {character}: nothing can happen before {earliest}")]
    InvalidTimelineOrder {
        /// The character.
        character: String,
        /// The slot requested.
        slot: TimelinePosition,
        /// The earliest slot still open.
        earliest: TimelinePosition,
    },

    /// Another activity already holds the slot.
    #[error("{character} is busy in {slot} with {occupant}")]
    SlotOccupied {
        /// The character.
        character: String,
        /// The slot requested.
        slot: TimelinePosition,
        /// Label of the activity already there.
        occupant: String,
    },

    /// No character with this name exists in the saga.
    #[error("character not found: \"{0}\"")]
    CharacterNotFound(String),

    /// No covenant with this name exists in the saga.
    #[error("covenant not found: \"{0}\"")]
    CovenantNotFound(String),

    /// The character has no multi-season project.
    #[error("{0} has no project in progress")]
    NoProjectInProgress(String),

    /// The project is not in a state that can be resumed.
    #[error("cannot resume for {character}: {reason}")]
    NotResumable {
        /// The character.
        character: String,
        /// Why not.
        reason: String,
    },

    /// No deferred activity with this series id.
    #[error("{character} has no deferred activity {series}")]
    DeferredNotFound {
        /// The character.
        character: String,
        /// Series id looked up.
        series: Uuid,
    },

    /// One activity of a batch failed, so none were committed.
    #[error("batch rejected at activity {index} ({activity}): {source}")]
    BatchRejected {
        /// Zero-based position of the failing activity.
        index: usize,
        /// Label of the failing activity.
        activity: String,
        /// Why it failed.
        #[source]
        source: Box<SeasonError>,
    },

    /// Loading or saving a record failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SeasonError {
    /// The category of this error. A rejected batch reports the category
    /// of the activity that failed.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::CapacityExceeded { .. } => FailureKind::CapacityExceeded,
            Self::PrerequisiteNotMet { .. } => FailureKind::PrerequisiteNotMet,
            Self::SourceExhausted { .. } => FailureKind::SourceExhausted,
            Self::StudentUnavailable { .. } => FailureKind::StudentUnavailable,
            Self::PartnerUnavailable { .. } => FailureKind::PartnerUnavailable,
            Self::InsufficientResources { .. } => FailureKind::InsufficientResources,
            Self::NestedInterruptionRejected { .. } => FailureKind::NestedInterruptionRejected,
            Self::InvalidTimelineOrder { .. } => FailureKind::InvalidTimelineOrder,
            Self::SlotOccupied { .. } => FailureKind::SlotOccupied,
            Self::CharacterNotFound(_)
            | Self::CovenantNotFound(_)
            | Self::DeferredNotFound { .. } => FailureKind::NotFound,
            Self::NoProjectInProgress(_) => FailureKind::NoProjectInProgress,
            Self::NotResumable { .. } => FailureKind::NotResumable,
            Self::BatchRejected { source, .. } => source.kind(),
            Self::Store(_) => FailureKind::Store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ars_core::Season;

    #[test]
    fn batch_reports_inner_kind() {
        let inner = SeasonError::SourceExhausted {
            character: "Aurelius".into(),
            title: "Liber Ignis".into(),
        };
        let err = SeasonError::BatchRejected {
            index: 3,
            activity: "Study Ignem".into(),
            source: Box::new(inner),
        };
        assert_eq!(err.kind(), FailureKind::SourceExhausted);
        let message = err.to_string();
        assert!(message.contains("activity 3"));
        assert!(message.contains("Liber Ignis"));
    }

    #[test]
    fn messages_carry_context() {
        let err = SeasonError::StudentUnavailable {
            teacher: "Aurelius".into(),
            student: "Fenicia".into(),
            slot: TimelinePosition::new(1220, Season::Summer),
        };
        assert_eq!(
            err.to_string(),
            "Fenicia is not available to be taught by Aurelius in Summer 1220"
        );
    }
}
