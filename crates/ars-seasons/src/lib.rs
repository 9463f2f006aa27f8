//! Seasonal activity scheduling and resolution for Ars Magica sagas.
//!
//! A [`Saga`] holds every character, covenant, and laboratory. Operations
//! take a [`SeasonContext`] borrowing the saga, a dice source, and the
//! [`SeasonConfig`], so several sagas can run side by side in one process.
//! [`SeasonEngine`] wraps the same operations with a persistence store and
//! saves after every successful season.

/// Chronicle of everything that happened in the saga.
pub mod chronicle;
/// Configuration for season resolution.
pub mod config;
/// Mutable context passed to every operation.
pub mod context;
/// Top-level orchestrator owning a saga, its dice, and its store.
pub mod engine;
/// Error types for the seasons crate.
pub mod error;
/// Random seasonal events.
pub mod events;
/// Season execution: dispatch, delta application, and aging.
pub mod executor;
/// Interrupting, resuming, and abandoning multi-season projects.
pub mod interruption;
/// Structured results for display.
pub mod outcome;
/// Per-activity resolvers.
pub mod resolve;
/// The saga container.
pub mod saga;
/// Validation and queueing of activities.
pub mod scheduler;
/// Persistence interface and an in-memory store.
pub mod store;
/// Seasonal weather.
pub mod weather;

/// Re-exports of [`chronicle::Chronicle`], [`chronicle::ChronicleEntry`], and [`chronicle::ChronicleKind`].
pub use chronicle::{Chronicle, ChronicleEntry, ChronicleKind};
/// Re-export of [`config::SeasonConfig`].
pub use config::SeasonConfig;
/// Re-export of [`context::SeasonContext`].
pub use context::SeasonContext;
/// Re-export of [`engine::SeasonEngine`].
pub use engine::SeasonEngine;
/// Re-exports of [`error::SeasonError`], [`error::FailureKind`], and [`error::SeasonResult`].
pub use error::{FailureKind, SeasonError, SeasonResult};
/// Re-exports of [`events::EventKind`], [`events::EventEffect`], and [`events::SeasonEvent`].
pub use events::{EventEffect, EventKind, SeasonEvent};
/// Re-exports of [`executor::ExecutionState`] and [`executor::SeasonReport`].
pub use executor::{ExecutionState, SeasonReport};
/// Re-export of [`interruption::InterruptReport`].
pub use interruption::InterruptReport;
/// Re-exports of [`outcome::OperationOutcome`] and [`outcome::OutcomeKind`].
pub use outcome::{OperationOutcome, OutcomeKind};
/// Re-exports of [`saga::Saga`] and [`saga::SagaHeader`].
pub use saga::{Saga, SagaHeader};
/// Re-export of [`scheduler::ScheduleReceipt`].
pub use scheduler::ScheduleReceipt;
/// Re-exports of [`store::SagaStore`], [`store::MemoryStore`], and [`store::StoreError`].
pub use store::{MemoryStore, SagaStore, StoreError};
/// Re-exports of [`weather::Weather`], [`weather::WeatherKind`], and [`weather::WeatherModifiers`].
pub use weather::{Weather, WeatherKind, WeatherModifiers};
