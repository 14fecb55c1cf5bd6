use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use storage::Database;
use storage::models::Discipline;
use storage::repository::{DisciplineFilter, DisciplineRepository};
use synchronizer::scores::ScoreUpdater;
use synchronizer::synchronization::{BatchRun, BatchStep, load_score_list};
use synchronizer::{
    AnomalySink, Config, DisciplineSynchronizer, HttpScraper, IgnoredEntries, RetryPolicy,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ti-sync")]
#[command(about = "Synchronizes the local results store with the public bestlists", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the bestlists and reconcile the stored results with them
    Sync {
        #[command(flatten)]
        selection: DisciplineSelection,

        #[command(flatten)]
        years: YearSelection,

        /// Log every deleted result after the summary
        #[arg(long)]
        log_deletions: bool,
    },
    /// Recompute the points of stored results from the score lists
    UpdateScores {
        #[command(flatten)]
        selection: DisciplineSelection,
    },
    /// List the registered disciplines
    Disciplines {
        #[command(flatten)]
        selection: DisciplineSelection,
    },
}

#[derive(Args)]
struct YearSelection {
    /// Synchronize this year only
    #[arg(long, conflicts_with_all = ["start_year", "end_year"])]
    year: Option<i32>,

    /// Most recent year to synchronize. Without it the all-time list is synchronized first
    #[arg(long)]
    start_year: Option<i32>,

    /// Oldest year to synchronize
    #[arg(long)]
    end_year: Option<i32>,
}

impl YearSelection {
    /// `(start_year, end_year)`
    fn range(&self) -> (Option<i32>, Option<i32>) {
        match self.year {
            Some(year) => (Some(year), Some(year)),
            None => (self.start_year, self.end_year),
        }
    }
}

#[derive(Args)]
struct DisciplineSelection {
    /// Discipline name, e.g. "100 m"
    #[arg(short, long)]
    discipline: Option<String>,

    #[arg(long, conflicts_with = "outdoor")]
    indoor: bool,

    #[arg(long)]
    outdoor: bool,

    #[arg(long, conflicts_with = "female")]
    male: bool,

    #[arg(long)]
    female: bool,
}

impl DisciplineSelection {
    fn filter(&self) -> DisciplineFilter {
        DisciplineFilter {
            name: self.discipline.clone(),
            indoor: flag(self.indoor, self.outdoor),
            male: flag(self.male, self.female),
        }
    }
}

fn flag(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ti_sync={log_level},synchronizer={log_level},storage={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Commands::Sync {
            selection,
            years,
            log_deletions,
        } => {
            let disciplines = list_disciplines(&db, &selection).await?;
            let (start_year, end_year) = years.range();
            handle_sync(
                &config,
                &db,
                &disciplines,
                start_year,
                end_year,
                log_deletions,
            )
            .await?;
        }
        Commands::UpdateScores { selection } => {
            let disciplines = list_disciplines(&db, &selection).await?;
            let summary = ScoreUpdater::new(db.pool(), &config.score_lists_dir)
                .update(&disciplines)
                .await
                .context("Failed to update scores")?;
            tracing::info!(
                "Rescored {} results in {} disciplines, {} flagged, {} without score list",
                summary.results,
                summary.disciplines,
                summary.flagged,
                summary.skipped_disciplines
            );
        }
        Commands::Disciplines { selection } => {
            for discipline in list_disciplines(&db, &selection).await? {
                println!(
                    "{:<20} {:<8} {:<6} {}",
                    discipline.name,
                    discipline.place(),
                    discipline.gender(),
                    discipline.score_identifier.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

async fn list_disciplines(
    db: &Database,
    selection: &DisciplineSelection,
) -> anyhow::Result<Vec<Discipline>> {
    let disciplines = DisciplineRepository::new(db.pool())
        .list(&selection.filter())
        .await
        .context("Failed to load disciplines")?;

    if disciplines.is_empty() {
        tracing::warn!("No discipline matches the selection");
    }
    Ok(disciplines)
}

async fn handle_sync(
    config: &Config,
    db: &Database,
    disciplines: &[Discipline],
    start_year: Option<i32>,
    end_year: Option<i32>,
    log_deletions: bool,
) -> anyhow::Result<()> {
    let ignored = IgnoredEntries::load(&config.ignored_entries_path())
        .context("Failed to load ignored entries")?;
    let scraper = HttpScraper::new(&config.bestlist_url, config.request_timeout)
        .context("Failed to build HTTP client")?;
    let store = db.store();
    let retry = RetryPolicy::new(config.max_retries, RetryPolicy::default().delay);

    let mut batch = BatchRun::default();

    for discipline in disciplines {
        let anomalies = AnomalySink::for_discipline(&config.data_dir, &discipline.name);
        let score_list = load_score_list(&config.score_lists_dir, discipline);

        let result = DisciplineSynchronizer::new(
            discipline.clone(),
            &store,
            &scraper,
            anomalies,
            &ignored,
        )
        .with_score_list(score_list)
        .with_retry(retry)
        .synchronize(start_year, end_year)
        .await;

        if batch.record(&discipline.name, result) == BatchStep::Stop {
            break;
        }
    }

    batch.log_summary(log_deletions);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_years(args: &[&str]) -> (Option<i32>, Option<i32>) {
        let cli = Cli::try_parse_from(["ti-sync", "sync"].iter().chain(args)).unwrap();
        match cli.command {
            Commands::Sync { years, .. } => years.range(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_single_year_sets_both_bounds() {
        assert_eq!(sync_years(&["--year", "2023"]), (Some(2023), Some(2023)));
        assert_eq!(
            sync_years(&["--start-year", "2024", "--end-year", "2020"]),
            (Some(2024), Some(2020))
        );
        assert_eq!(sync_years(&[]), (None, None));
    }

    #[test]
    fn test_single_year_conflicts_with_range() {
        let args = ["ti-sync", "sync", "--year", "2023", "--end-year", "2020"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_log_deletions_flag() {
        let cli = Cli::try_parse_from(["ti-sync", "sync", "--log-deletions"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Sync {
                log_deletions: true,
                ..
            }
        ));
    }
}
