//! CLI frontend for the Ars Magica season engine.

mod commands;
mod store;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ars",
    about = "Ars Magica saga manager: plan and resolve seasons",
    version,
    propagate_version = true
)]
struct Cli {
    /// Saga directory (holds saga.json and the record folders)
    #[arg(short, long, global = true, default_value = ".")]
    dir: PathBuf,

    /// RNG seed for deterministic dice
    #[arg(long, global = true, default_value = "42")]
    seed: u64,

    /// Log scheduling and resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new saga in the saga directory
    Init {
        /// Name of the saga
        name: String,

        /// Starting year
        #[arg(short, long, default_value = "1220")]
        year: i32,

        /// Starting season
        #[arg(short, long, default_value = "spring")]
        season: String,
    },

    /// Add a character
    NewCharacter {
        /// Character name
        name: String,

        /// Covenant the character belongs to
        #[arg(short, long)]
        covenant: Option<String>,

        /// Age in years
        #[arg(short, long, default_value = "25")]
        age: u32,

        /// Starting scores as SUBJECT=SCORE, e.g. Creo=10 or "Magic Theory=4"
        #[arg(long = "score", value_name = "SUBJECT=SCORE")]
        scores: Vec<String>,

        /// Also create a laboratory owned by the character
        #[arg(long)]
        lab: bool,
    },

    /// Add a covenant
    NewCovenant {
        /// Covenant name
        name: String,

        /// Magic aura
        #[arg(short, long, default_value = "3")]
        aura: i32,

        /// Starting vis as ART=PAWNS, e.g. Vim=5
        #[arg(long = "vis", value_name = "ART=PAWNS")]
        vis: Vec<String>,
    },

    /// Add a book to a covenant library
    AddSource {
        /// Covenant owning the library
        covenant: String,

        /// Title of the book
        title: String,

        /// Subject taught (an Art name or an Ability)
        #[arg(long)]
        subject: String,

        /// Experience per season of study
        #[arg(short, long)]
        quality: u32,

        /// Summa level; omit for a tractatus
        #[arg(short, long)]
        level: Option<u32>,

        /// The book is spent after one read
        #[arg(long)]
        single_use: bool,
    },

    /// Queue an activity (JSON) for a character
    Schedule {
        /// Character name
        character: String,

        /// Activity as JSON, e.g. '{"type":"study","subject":{"art":"Vim"},"material":{"kind":"practice"}}'
        activity: Option<String>,

        /// Year of the first season
        #[arg(short, long)]
        year: Option<i32>,

        /// First season
        #[arg(short, long)]
        season: Option<String>,

        /// Batch file: a JSON array of {"activity", "year", "season"}; all or none are queued
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Queue a teaching or assisted research season, settling clashes with the partner
    Coordinate {
        /// Initiating character
        character: String,

        /// Activity as JSON
        activity: String,

        /// Year
        #[arg(short, long)]
        year: i32,

        /// Season
        #[arg(short, long)]
        season: String,
    },

    /// Execute one season for a character
    Execute {
        /// Character name
        character: String,

        /// Year
        #[arg(short, long)]
        year: i32,

        /// Season
        #[arg(short, long)]
        season: String,
    },

    /// Execute a whole year for a character
    Year {
        /// Character name
        character: String,

        /// Year to execute
        year: i32,

        /// Roll for random events after each season
        #[arg(short, long)]
        events: bool,
    },

    /// Execute the saga's current season for every character and advance it
    Season {
        /// Roll for random events after each season
        #[arg(short, long)]
        events: bool,
    },

    /// Interrupt a character's project
    Interrupt {
        /// Character name
        character: String,

        /// Why the work stopped
        #[arg(short, long)]
        reason: String,

        /// Seasons the interruption lasts
        #[arg(long, default_value = "1")]
        duration: u32,

        /// Throw away accumulated progress
        #[arg(long)]
        discard: bool,
    },

    /// Queue the continuation of an interrupted project
    Resume {
        /// Character name
        character: String,

        /// Year
        #[arg(short, long)]
        year: i32,

        /// Season
        #[arg(short, long)]
        season: String,

        /// Seasons to reserve for the remaining work
        #[arg(long)]
        seasons: Option<u32>,
    },

    /// Abandon a character's project
    Abandon {
        /// Character name
        character: String,
    },

    /// Requeue a deferred activity
    Retry {
        /// Character name
        character: String,

        /// Series id (or a unique prefix) of the deferred activity
        series: String,

        /// Year
        #[arg(short, long)]
        year: i32,

        /// Season
        #[arg(short, long)]
        season: String,
    },

    /// Drop a deferred activity
    Dismiss {
        /// Character name
        character: String,

        /// Series id (or a unique prefix) of the deferred activity
        series: String,
    },

    /// Show the saga overview, or one character in detail
    Status {
        /// Character name
        character: Option<String>,
    },

    /// Show a character's queued and deferred activities
    Queue {
        /// Character name
        character: String,
    },

    /// Show the saga chronicle
    Chronicle {
        /// Only entries involving this character or covenant
        #[arg(short, long)]
        name: Option<String>,

        /// Show only the most recent entries
        #[arg(short, long)]
        last: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ARS_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dir = cli.dir.as_path();
    let seed = cli.seed;
    let result = match cli.command {
        Commands::Init { name, year, season } => commands::init::run(dir, &name, year, &season),
        Commands::NewCharacter {
            name,
            covenant,
            age,
            scores,
            lab,
        } => commands::new::character(dir, &name, covenant.as_deref(), age, &scores, lab),
        Commands::NewCovenant { name, aura, vis } => commands::new::covenant(dir, &name, aura, &vis),
        Commands::AddSource {
            covenant,
            title,
            subject,
            quality,
            level,
            single_use,
        } => commands::new::source(
            dir,
            &covenant,
            commands::new::SourceSpec {
                title,
                subject,
                quality,
                level,
                single_use,
            },
        ),
        Commands::Schedule {
            character,
            activity,
            year,
            season,
            file,
        } => match file {
            Some(file) => commands::schedule::batch(dir, seed, &character, &file),
            None => commands::schedule::run(
                dir,
                seed,
                &character,
                activity.as_deref(),
                year,
                season.as_deref(),
            ),
        },
        Commands::Coordinate {
            character,
            activity,
            year,
            season,
        } => commands::schedule::coordinate(dir, seed, &character, &activity, year, &season),
        Commands::Execute {
            character,
            year,
            season,
        } => commands::execute::season_for(dir, seed, &character, year, &season),
        Commands::Year {
            character,
            year,
            events,
        } => commands::execute::year(dir, seed, &character, year, events),
        Commands::Season { events } => commands::execute::saga_season(dir, seed, events),
        Commands::Interrupt {
            character,
            reason,
            duration,
            discard,
        } => commands::project::interrupt(dir, seed, &character, &reason, duration, !discard),
        Commands::Resume {
            character,
            year,
            season,
            seasons,
        } => commands::project::resume(dir, seed, &character, year, &season, seasons),
        Commands::Abandon { character } => commands::project::abandon(dir, seed, &character),
        Commands::Retry {
            character,
            series,
            year,
            season,
        } => commands::deferred::retry(dir, seed, &character, &series, year, &season),
        Commands::Dismiss { character, series } => {
            commands::deferred::dismiss(dir, seed, &character, &series)
        }
        Commands::Status { character } => commands::status::run(dir, character.as_deref()),
        Commands::Queue { character } => commands::queue::run(dir, &character),
        Commands::Chronicle { name, last } => commands::chronicle::run(dir, name.as_deref(), last),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
