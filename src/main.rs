use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

mod aggregate;
mod config;
mod engine;
mod error;
mod ingest;
mod logging;
mod models;
mod report;
mod scoring;

use config::{ScoringConfig, Weights};
use engine::MatchInputs;
use models::{CoachDirectory, EventTag, Roster, SessionRecord};

#[derive(Parser)]
#[command(name = "coach-matcher")]
#[command(about = "Rank coaches for a tournament group from drill history", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log filter, e.g. `debug` or `coach_matcher=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Drill/session log CSV
    #[arg(long)]
    drills: PathBuf,
    /// Group roster CSV
    #[arg(long)]
    roster: PathBuf,
    /// Coach metadata CSV
    #[arg(long)]
    coaches: PathBuf,
    /// Only count sessions of this event, e.g. LD, PF, CX
    #[arg(long)]
    event: Option<String>,
    #[arg(long, default_value_t = config::DEFAULT_MIN_SESSIONS)]
    min_sessions: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Score coaches and write a recommendation CSV
    Recommend {
        #[command(flatten)]
        inputs: InputArgs,
        /// Tournament label copied into every row
        #[arg(long)]
        tournament: String,
        #[arg(long)]
        output: PathBuf,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value_t = config::DEFAULT_HALF_LIFE_DAYS)]
        half_life_days: f64,
        /// JSON object of component weights
        #[arg(long)]
        weights: Option<String>,
        #[arg(long, default_value_t = config::DEFAULT_RATING_SCALE_MAX)]
        rating_scale_max: f64,
        /// Rows to print in the summary
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Print per-coach aggregates as JSON
    Inspect {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

struct Tables {
    sessions: Vec<SessionRecord>,
    roster: Roster,
    coaches: CoachDirectory,
}

impl Tables {
    fn inputs(&self) -> MatchInputs<'_> {
        MatchInputs {
            sessions: &self.sessions,
            roster: &self.roster,
            coaches: &self.coaches,
        }
    }
}

fn open(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn load_tables(args: &InputArgs) -> anyhow::Result<Tables> {
    let sessions = ingest::read_sessions(open(&args.drills)?)
        .with_context(|| format!("invalid drills file {}", args.drills.display()))?;
    let roster = ingest::read_roster(open(&args.roster)?)
        .with_context(|| format!("invalid roster file {}", args.roster.display()))?;
    let coaches = ingest::read_coaches(open(&args.coaches)?)
        .with_context(|| format!("invalid coaches file {}", args.coaches.display()))?;
    Ok(Tables {
        sessions,
        roster,
        coaches,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_level.as_deref())?;

    match cli.command {
        Commands::Recommend {
            inputs,
            tournament,
            output,
            as_of,
            half_life_days,
            weights,
            rating_scale_max,
            top,
        } => {
            let weights = match weights {
                Some(raw) => Weights::from_json(&raw).context("invalid --weights")?,
                None => Weights::default(),
            };
            let mut config = ScoringConfig {
                half_life_days,
                min_sessions: inputs.min_sessions,
                event: inputs.event.as_deref().and_then(EventTag::parse),
                weights,
                rating_scale_max,
                ..ScoringConfig::default()
            };
            if let Some(as_of) = as_of {
                config.as_of = as_of;
            }
            config.validate()?;

            let tables = load_tables(&inputs)?;
            let rows = engine::recommend(&tables.inputs(), &config, &tournament)?;

            let file = File::create(&output)
                .with_context(|| format!("failed to create {}", output.display()))?;
            report::write_csv(file, &rows)
                .with_context(|| format!("failed to write {}", output.display()))?;

            print!("{}", report::build_summary(&rows, top));
            println!("Wrote {} recommendations to {}.", rows.len(), output.display());
        }
        Commands::Inspect { inputs } => {
            let config = ScoringConfig {
                min_sessions: inputs.min_sessions,
                event: inputs.event.as_deref().and_then(EventTag::parse),
                ..ScoringConfig::default()
            };
            let tables = load_tables(&inputs)?;
            let aggregates = engine::aggregates(&tables.inputs(), &config)?;
            println!("{}", serde_json::to_string_pretty(&aggregates)?);
        }
    }

    Ok(())
}
