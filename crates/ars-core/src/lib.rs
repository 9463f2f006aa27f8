//! Core records for Ars Magica sagas: characters, covenants, laboratories,
//! and the activities they spend their seasons on.
//!
//! This crate holds passive data only. Scheduling, resolution, and dice live
//! in `ars-seasons` and `ars-mechanics`; everything here can be constructed
//! programmatically or deserialized from the JSON documents a saga is saved as.

/// Activities a character can spend a season on, and queued entries.
pub mod activity;
/// Hermetic Arts, characteristics, subjects, and experience tables.
pub mod art;
/// Character records.
pub mod character;
/// Covenant records, libraries, and vis sources.
pub mod covenant;
/// Error types used throughout the crate.
pub mod error;
/// Laboratory records.
pub mod laboratory;
/// Multi-season projects and interruption records.
pub mod project;
/// Seasons and positions on the saga timeline.
pub mod timeline;
/// Vis stocks and costs.
pub mod vis;

/// Re-export activity types.
pub use activity::{
    Activity, ActivityKind, ItemDesign, ItemKind, QueuedActivity, ResearchTarget, Role,
    SpellDesign, StudyMaterial,
};
/// Re-export art and subject types.
pub use art::{Art, Characteristic, Subject};
/// Re-export character types.
pub use character::{Character, CharacterStatus};
/// Re-export covenant types.
pub use covenant::{Covenant, StudySource, VisSource};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export laboratory types.
pub use laboratory::Laboratory;
/// Re-export project types.
pub use project::{InProgressProject, InterruptionRecord, ProjectDocument};
/// Re-export timeline types.
pub use timeline::{Season, TimelinePosition};
/// Re-export vis types.
pub use vis::VisStock;
