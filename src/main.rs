use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

mod cohort;
mod db;
mod error;
mod humanize;
mod logging;
mod metrics;
mod models;
mod report;
mod risk;
mod snapshot;
mod timewindow;

use error::LoadError;
use humanize::{format_passive_days, Locale};
use models::Student;

const DEFAULT_SNAPSHOT: &str = "cohort.json";

#[derive(Parser)]
#[command(name = "coach-risk")]
#[command(about = "Risk scoring and segmentation for exam-preparation coaches", long_about = None)]
struct Cli {
    /// Read the cohort from a local JSON snapshot instead of Postgres
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    /// Evaluation instant (RFC 3339); defaults to the current time
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,
    #[arg(long, global = true, value_enum, default_value_t = LocaleArg::Tr)]
    locale: LocaleArg,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LocaleArg {
    Tr,
    En,
}

impl From<LocaleArg> for Locale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::Tr => Locale::Tr,
            LocaleArg::En => Locale::En,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank students by risk score
    Score {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Cohort-level counts and the most active student
    Summary {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Import daily study logs from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Cache the Postgres cohort into a local snapshot
    Sync {
        #[arg(long, default_value = DEFAULT_SNAPSHOT)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    let now = cli.now.unwrap_or_else(Utc::now);
    let locale = Locale::from(cli.locale);

    match cli.command {
        Commands::Score { limit, format } => {
            let students = load_students(cli.snapshot.as_deref()).await?;
            let ranked = cohort::rank_by_risk(&students, now);
            let shown = &ranked[..limit.min(ranked.len())];

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(shown)?),
                OutputFormat::Text => {
                    if shown.is_empty() {
                        println!("No students found.");
                        return Ok(());
                    }
                    println!("Students by risk score:");
                    for entry in shown {
                        let risk = &entry.risk;
                        let last_seen =
                            format_passive_days(entry.student.last_active.as_deref(), now, locale);
                        println!(
                            "- {} score {:.1} [{}] last seen {}, {} overdue, {}% done this week, {:+}% questions",
                            entry.student.name,
                            risk.score,
                            risk.label,
                            last_seen,
                            risk.overdue_count,
                            risk.weekly_completion_rate,
                            risk.weekly_change
                        );
                    }
                }
            }
        }
        Commands::Summary { format } => {
            let students = load_students(cli.snapshot.as_deref()).await?;
            let summary = cohort::summarize(&students, now);

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Text => {
                    println!("Students: {}", summary.student_count);
                    println!("Critical: {}", summary.critical_count);
                    println!("At risk today: {}", summary.at_risk_count);
                    println!("Overdue assignments: {}", summary.total_overdue);
                    println!(
                        "Most active this week: {}",
                        summary.most_active.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Commands::Report { out } => {
            let students = load_students(cli.snapshot.as_deref()).await?;
            let report = report::build_report(&students, now, locale);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Import { csv } => {
            let pool = connect(&database_url()?).await?;
            let inserted = db::import_logs_csv(&pool, &csv).await?;
            println!("Inserted {inserted} daily logs from {}.", csv.display());
        }
        Commands::Sync { out } => {
            let pool = connect(&database_url()?).await?;
            let students = db::fetch_students(&pool).await?;
            snapshot::write(&out, &students)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Cached {} students to {}.", students.len(), out.display());
        }
    }

    Ok(())
}

fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")
}

async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Explicit snapshot first, then Postgres, then the cached snapshot when
/// Postgres is unconfigured or unreachable.
async fn load_students(explicit: Option<&Path>) -> anyhow::Result<Vec<Student>> {
    if let Some(path) = explicit {
        return Ok(snapshot::load(path)?);
    }

    let fallback = Path::new(DEFAULT_SNAPSHOT);
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        if fallback.exists() {
            info!(path = %fallback.display(), "DATABASE_URL unset, using cached snapshot");
            return Ok(snapshot::load(fallback)?);
        }
        return Err(LoadError::NoSource.into());
    };

    let fetched = match connect(&database_url).await {
        Ok(pool) => db::fetch_students(&pool).await,
        Err(err) => Err(err),
    };

    match fetched {
        Ok(students) => {
            info!(count = students.len(), "loaded cohort from Postgres");
            Ok(students)
        }
        Err(err) if fallback.exists() && is_unavailable(&err) => {
            warn!(
                error = %err,
                path = %fallback.display(),
                "Postgres unavailable, using cached snapshot"
            );
            Ok(snapshot::load(fallback)?)
        }
        Err(err) => Err(err),
    }
}

/// Connection and query failures can fall back to the cache; invalid remote
/// data must surface.
fn is_unavailable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<LoadError>().is_none()
}
