use ars_core::{Activity, QueuedActivity, Season, TimelinePosition};
use ars_mechanics::{CountingRolls, RollSource};
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::config::SeasonConfig;
use crate::context::SeasonContext;
use crate::error::SeasonResult;
use crate::executor::{self, SeasonReport};
use crate::interruption::{self, InterruptReport};
use crate::saga::Saga;
use crate::scheduler::{self, ScheduleReceipt};
use crate::store::{SagaStore, load_saga};

/// Top-level orchestrator: owns a saga, its dice, and the store it is
/// persisted to.
///
/// Every successful operation saves the records it changed, plus the saga
/// header when the season, chronicle, or dice count moved. The saga counts
/// every die drawn, and [`SeasonEngine::new`] mixes that count into the
/// seed, so a reopened saga does not replay the dice of earlier seasons.
pub struct SeasonEngine<S, R = StdRng> {
    saga: Saga,
    store: S,
    roller: R,
    config: SeasonConfig,
}

impl<S: SagaStore> SeasonEngine<S, StdRng> {
    /// Load the saga from `store`, seeding the dice from the configuration.
    pub fn open(store: S, config: SeasonConfig) -> SeasonResult<Self> {
        let saga = load_saga(&store)?;
        Ok(Self::new(saga, store, config))
    }

    /// Wrap an already loaded saga.
    pub fn new(saga: Saga, store: S, config: SeasonConfig) -> Self {
        let roller = StdRng::seed_from_u64(reseed(config.seed, saga.rolls));
        Self::with_roller(saga, store, config, roller)
    }
}

/// The seed for a saga that has already drawn `rolls` dice.
fn reseed(seed: u64, rolls: u64) -> u64 {
    seed ^ rolls.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl<S: SagaStore, R: RollSource> SeasonEngine<S, R> {
    /// Wrap a saga with a specific dice source.
    pub fn with_roller(mut saga: Saga, store: S, config: SeasonConfig, roller: R) -> Self {
        saga.chronicle.set_capacity(config.max_chronicle_entries);
        Self {
            saga,
            store,
            roller,
            config,
        }
    }

    /// The saga.
    pub fn saga(&self) -> &Saga {
        &self.saga
    }

    /// The store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configuration.
    pub fn config(&self) -> &SeasonConfig {
        &self.config
    }

    /// Close the engine and hand back its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Change saga records directly (new characters, covenants, library
    /// books) and save what changed.
    pub fn update(&mut self, edit: impl FnOnce(&mut Saga)) -> SeasonResult<()> {
        self.run(|ctx| {
            edit(ctx.saga);
            Ok(())
        })
    }

    /// Validate and queue an activity.
    pub fn schedule(
        &mut self,
        name: &str,
        activity: Activity,
        start: TimelinePosition,
    ) -> SeasonResult<ScheduleReceipt> {
        self.run(|ctx| scheduler::schedule(ctx, name, activity, start))
    }

    /// Queue several activities, all or none.
    pub fn schedule_many(
        &mut self,
        name: &str,
        activities: Vec<(Activity, TimelinePosition)>,
    ) -> SeasonResult<Vec<ScheduleReceipt>> {
        self.run(|ctx| scheduler::schedule_many(ctx, name, activities))
    }

    /// Queue a coupled activity, settling a clash with the partner.
    pub fn coordinate(
        &mut self,
        initiator: &str,
        activity: Activity,
        slot: TimelinePosition,
    ) -> SeasonResult<ScheduleReceipt> {
        self.run(|ctx| scheduler::coordinate(ctx, initiator, activity, slot))
    }

    /// Execute one character's season.
    pub fn execute(&mut self, name: &str, slot: TimelinePosition) -> SeasonResult<SeasonReport> {
        self.run(|ctx| executor::execute(ctx, name, slot))
    }

    /// Execute a character's year season by season, saving after each.
    pub fn execute_year(
        &mut self,
        name: &str,
        year: i32,
        include_events: bool,
    ) -> SeasonResult<Vec<SeasonReport>> {
        let mut reports = Vec::new();
        for season in Season::ALL {
            let slot = TimelinePosition::new(year, season);
            let done = self
                .saga
                .character(name)?
                .last_executed
                .is_some_and(|done| slot <= done);
            if !done {
                let report = self.run(|ctx| executor::execute_season(ctx, name, slot, include_events))?;
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Execute the saga's current season for everyone and advance it.
    pub fn execute_saga_season(&mut self, include_events: bool) -> SeasonResult<Vec<SeasonReport>> {
        self.run(|ctx| executor::execute_saga_season(ctx, include_events))
    }

    /// Interrupt a character's project.
    pub fn interrupt(
        &mut self,
        name: &str,
        reason: &str,
        duration: u32,
        save_progress: bool,
    ) -> SeasonResult<InterruptReport> {
        self.run(|ctx| interruption::interrupt(ctx, name, reason, duration, save_progress))
    }

    /// Queue the continuation of an interrupted project.
    pub fn resume(
        &mut self,
        name: &str,
        start: TimelinePosition,
        seasons: Option<u32>,
    ) -> SeasonResult<ScheduleReceipt> {
        self.run(|ctx| interruption::resume(ctx, name, start, seasons))
    }

    /// Drop a character's project.
    pub fn abandon_project(&mut self, name: &str) -> SeasonResult<String> {
        self.run(|ctx| interruption::abandon_project(ctx, name))
    }

    /// Requeue a deferred activity.
    pub fn retry_deferred(
        &mut self,
        name: &str,
        series: Uuid,
        start: TimelinePosition,
    ) -> SeasonResult<ScheduleReceipt> {
        self.run(|ctx| scheduler::retry_deferred(ctx, name, series, start))
    }

    /// Drop a deferred activity.
    pub fn abandon_deferred(&mut self, name: &str, series: Uuid) -> SeasonResult<QueuedActivity> {
        self.run(|ctx| scheduler::abandon_deferred(ctx, name, series))
    }

    fn run<T>(&mut self, op: impl FnOnce(&mut SeasonContext<'_>) -> SeasonResult<T>) -> SeasonResult<T> {
        let before = self.saga.clone();
        let mut dice = CountingRolls::new(&mut self.roller);
        let value = {
            let mut ctx = SeasonContext::new(&mut self.saga, &mut dice, &self.config);
            op(&mut ctx)
        };
        // Dice drawn by a rejected operation still count.
        self.saga.rolls = self.saga.rolls.wrapping_add(dice.drawn());
        let value = value?;
        self.persist(&before)?;
        Ok(value)
    }

    /// Save every record that differs from `before`.
    fn persist(&mut self, before: &Saga) -> SeasonResult<()> {
        for (name, character) in &self.saga.characters {
            if before.characters.get(name) != Some(character) {
                self.store.save_character(character)?;
            }
        }
        for (name, covenant) in &self.saga.covenants {
            if before.covenants.get(name) != Some(covenant) {
                self.store.save_covenant(covenant)?;
            }
        }
        for (owner, laboratory) in &self.saga.laboratories {
            if before.laboratories.get(owner) != Some(laboratory) {
                self.store.save_laboratory(laboratory)?;
            }
        }
        if before.current != self.saga.current
            || before.rolls != self.saga.rolls
            || before.weather != self.saga.weather
            || before.name != self.saga.name
            || before.chronicle != self.saga.chronicle
        {
            self.store.save_header(&self.saga.header())?;
        }
        Ok(())
    }
}
