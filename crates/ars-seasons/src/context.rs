use ars_core::TimelinePosition;
use ars_mechanics::RollSource;

use crate::chronicle::{ChronicleEntry, ChronicleKind};
use crate::config::SeasonConfig;
use crate::saga::Saga;

/// Mutable context passed to every scheduling and execution operation.
pub struct SeasonContext<'a> {
    /// The saga being played.
    pub saga: &'a mut Saga,
    /// Dice for every roll the operation makes.
    pub roller: &'a mut dyn RollSource,
    /// Resolution settings.
    pub config: &'a SeasonConfig,
}

impl<'a> SeasonContext<'a> {
    /// Bundle a saga, a dice source, and a configuration.
    pub fn new(
        saga: &'a mut Saga,
        roller: &'a mut dyn RollSource,
        config: &'a SeasonConfig,
    ) -> Self {
        Self {
            saga,
            roller,
            config,
        }
    }
}

impl SeasonContext<'_> {
    /// Record a chronicle entry for the given slot.
    pub fn emit(&mut self, at: TimelinePosition, kind: ChronicleKind, description: impl Into<String>) {
        self.saga
            .chronicle
            .push(ChronicleEntry::new(at, kind, description));
    }

    /// The season the saga has reached.
    pub fn now(&self) -> TimelinePosition {
        self.saga.current
    }

    /// Run `op` against a copy of the saga, keeping the copy only if `op`
    /// succeeds.
    pub fn atomically<T, E>(
        &mut self,
        op: impl FnOnce(&mut SeasonContext<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut scratch = self.saga.clone();
        let result = {
            let mut inner = SeasonContext {
                saga: &mut scratch,
                roller: &mut *self.roller,
                config: self.config,
            };
            op(&mut inner)
        };
        if result.is_ok() {
            *self.saga = scratch;
        }
        result
    }
}
