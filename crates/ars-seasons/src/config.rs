/// Configuration for season resolution.
#[derive(Debug, Clone)]
pub struct SeasonConfig {
    /// RNG seed for deterministic dice.
    pub seed: u64,
    /// Maximum chronicle size (oldest entries dropped when exceeded). 0 = unlimited.
    pub max_chronicle_entries: usize,
    /// Multiplier applied to a book's quality.
    pub study_multiplier: u32,
    /// Experience from a season of practice.
    pub practice_xp: u32,
    /// Experience from exposure while serving or teaching.
    pub exposure_xp: u32,
    /// Base experience a student gains from a season of teaching.
    pub teaching_base: u32,
    /// Most experience a single story may award.
    pub max_story_xp: u32,
    /// Lab total is divided by this to get research points per season.
    pub research_divisor: u32,
    /// Botch dice rolled for experimental research.
    pub experimental_botch_dice: u32,
    /// Percent chance of a random event after each season.
    pub event_chance: u32,
    /// Age from which aging rolls are made every Winter.
    pub aging_start_age: u32,
    /// Re-queue failed activities at the next free season instead of deferring them.
    pub requeue_failed: bool,
    /// Roll seasonal weather along with random events.
    pub weather: bool,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_chronicle_entries: 0,
            study_multiplier: 1,
            practice_xp: 4,
            exposure_xp: 2,
            teaching_base: 3,
            max_story_xp: 10,
            research_divisor: 5,
            experimental_botch_dice: 1,
            event_chance: 30,
            aging_start_age: 35,
            requeue_failed: false,
            weather: true,
        }
    }
}

impl SeasonConfig {
    /// Set the RNG seed for deterministic dice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum chronicle size (0 = unlimited).
    pub fn with_max_chronicle_entries(mut self, max: usize) -> Self {
        self.max_chronicle_entries = max;
        self
    }

    /// Set the multiplier applied to book quality.
    pub fn with_study_multiplier(mut self, multiplier: u32) -> Self {
        self.study_multiplier = multiplier;
        self
    }

    /// Set the percent chance of a random event after each season.
    pub fn with_event_chance(mut self, percent: u32) -> Self {
        self.event_chance = percent.min(100);
        self
    }

    /// Set the age from which aging rolls are made.
    pub fn with_aging_start_age(mut self, age: u32) -> Self {
        self.aging_start_age = age;
        self
    }

    /// Re-queue failed activities instead of deferring them.
    pub fn with_requeue_failed(mut self, requeue: bool) -> Self {
        self.requeue_failed = requeue;
        self
    }

    /// Turn seasonal weather on or off.
    pub fn with_weather(mut self, weather: bool) -> Self {
        self.weather = weather;
        self
    }

    /// Set the divisor turning lab totals into research points.
    pub fn with_research_divisor(mut self, divisor: u32) -> Self {
        self.research_divisor = divisor.max(1);
        self
    }
}
