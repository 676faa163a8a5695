use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};

use aura::config::AppConfig;
use aura::database::{Database, StoredCheckIn};
use aura::directive::TrainingDirective;
use aura::export::{export_history, DateRange, ExportFormat};
use aura::logging::init_logging;
use aura::models::{
    Chronotype, ClockTime, ExperienceLevel, MuscleGroup, MuscleSoreness, ReadinessState,
    SorenessLevel, TrainingGoal, UserProfile, WorkoutSplit,
};
use aura::readiness::ReadinessCalculator;
use aura::service::{CheckInService, HistorySummary};
use aura::sleep::SleepDebtLevel;
use aura::validation::CheckInPayload;
use aura::warehouse::JsonLinesWarehouse;
use aura::AuraError;

/// Aura - Training Readiness CLI
///
/// Turns a daily check-in (sleep, stress, effort, soreness) into a readiness
/// score, a per-muscle recovery map and an hourly performance curve.
#[derive(Parser)]
#[command(name = "aura")]
#[command(version)]
#[command(about = "Training readiness and recovery CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Overrides the database file from the config
    #[arg(long, value_name = "FILE", global = true)]
    database: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a profile
    Register {
        /// Profile id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// lion, bear, wolf or dolphin
        #[arg(long, default_value = "bear")]
        chronotype: Chronotype,

        /// beginner, intermediate or advanced
        #[arg(long, default_value = "intermediate")]
        experience: ExperienceLevel,

        /// hypertrophy, strength or cutting
        #[arg(long, default_value = "hypertrophy")]
        goal: TrainingGoal,

        /// ppl, upper_lower or arnold
        #[arg(long, default_value = "ppl")]
        split: WorkoutSplit,

        /// Nightly sleep target in hours
        #[arg(long, default_value = "8")]
        target_sleep: f64,

        /// Habitual wake time (HH:MM)
        #[arg(long, default_value = "07:00")]
        wake: ClockTime,

        /// IANA timezone name
        #[arg(long, default_value = "UTC")]
        timezone: String,

        /// Make this the default profile even if one is already set
        #[arg(long)]
        set_default: bool,
    },

    /// Record today's check-in
    Checkin {
        /// Profile id (defaults to the configured profile)
        #[arg(short, long)]
        user: Option<String>,

        /// Read the check-in from a JSON payload file
        #[arg(short, long, conflicts_with_all = ["sleep", "stress", "rpe", "soreness"])]
        file: Option<PathBuf>,

        /// Check-in date (YYYY-MM-DD or RFC 3339, default now)
        #[arg(long)]
        date: Option<String>,

        /// Hours slept last night
        #[arg(long)]
        sleep: Option<f64>,

        /// Wake time this morning (HH:MM, default profile wake time)
        #[arg(long)]
        wake: Option<String>,

        /// Stress 0-10
        #[arg(long)]
        stress: Option<f64>,

        /// RPE of the last session 0-10
        #[arg(long)]
        rpe: Option<f64>,

        /// Overall soreness 0-10
        #[arg(long)]
        soreness: Option<f64>,

        /// Sore muscle as GROUP or GROUP=LEVEL (repeatable)
        #[arg(long = "sore", value_parser = parse_sore_muscle)]
        sore: Vec<(MuscleGroup, SorenessLevel)>,

        /// Note on yesterday's session
        #[arg(long)]
        workout: Option<String>,
    },

    /// Show today's readiness
    Readiness {
        #[arg(short, long)]
        user: Option<String>,

        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-muscle recovery
    Recovery {
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show the hourly performance curve
    Curve {
        #[arg(short, long)]
        user: Option<String>,
    },

    /// List stored check-ins
    History {
        #[arg(short, long)]
        user: Option<String>,

        /// Number of recent check-ins to show
        #[arg(short, long, default_value = "14")]
        limit: usize,

        /// Recompute scores with the current weights
        #[arg(long)]
        rescore: bool,
    },

    /// Show rolling sleep debt
    SleepDebt {
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Export check-in history
    Export {
        #[arg(short, long)]
        user: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (csv, json; inferred from the extension when omitted)
        #[arg(short = 'f', long)]
        format: Option<ExportFormat>,

        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Delete every check-in of a profile
    Reset {
        #[arg(short, long)]
        user: Option<String>,

        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Tabled)]
struct HistoryDisplay {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Sleep")]
    sleep: String,
    #[tabled(rename = "Stress")]
    stress: u8,
    #[tabled(rename = "RPE")]
    rpe: u8,
    #[tabled(rename = "Soreness")]
    soreness: u8,
    #[tabled(rename = "Sore muscles")]
    sore_muscles: usize,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "State")]
    state: String,
}

#[derive(Tabled)]
struct RecoveryDisplay {
    #[tabled(rename = "Muscle")]
    muscle: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last flagged")]
    last_flagged: String,
    #[tabled(rename = "Days left")]
    remaining: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<AuraError>() {
            Some(aura_error) => eprintln!("{} {}", "✗".red(), aura_error.user_message().red()),
            None => eprintln!("{} {:#}", "✗".red(), e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default_from(&config_path)?;

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    let service = open_service(&config, cli.database.as_deref())?;

    match cli.command {
        Commands::Register {
            id,
            chronotype,
            experience,
            goal,
            split,
            target_sleep,
            wake,
            timezone,
            set_default,
        } => {
            let profile = service.register_profile(UserProfile {
                id: id.unwrap_or_default(),
                chronotype,
                experience_level: experience,
                training_goal: goal,
                target_sleep_hours: target_sleep,
                workout_split: split,
                wake_time: wake,
                timezone,
            })?;

            println!("{}", "✓ Profile registered".green().bold());
            println!("  Id:         {}", profile.id);
            println!("  Chronotype: {}", profile.chronotype);
            println!("  Wake time:  {}", profile.wake_time);

            if set_default || config.default_user_id.is_none() {
                config.set_default_user(profile.id.clone());
                config.save_to_file(&config_path)?;
                println!("  {}", "Set as default profile".dimmed());
            }
        }

        Commands::Checkin {
            user,
            file,
            date,
            sleep,
            wake,
            stress,
            rpe,
            soreness,
            sore,
            workout,
        } => {
            let user_id = resolve_user(&config, user)?;
            let payload = match file {
                Some(path) => read_payload(&path)?,
                None => {
                    let profile = service.profile(&user_id)?;
                    CheckInPayload {
                        date: date.unwrap_or_else(|| Utc::now().to_rfc3339()),
                        sleep_duration_hours: sleep.unwrap_or(profile.target_sleep_hours),
                        wake_time: wake.unwrap_or_else(|| profile.wake_time.to_string()),
                        stress: stress.unwrap_or(0.0),
                        yesterday_workout: workout,
                        last_session_rpe: rpe.unwrap_or(0.0),
                        subjective_soreness: soreness.unwrap_or(0.0),
                        muscle_soreness: sore.into_iter().collect::<MuscleSoreness>(),
                        readiness_score: None,
                        readiness_state: None,
                        profile_snapshot: None,
                    }
                }
            };

            let submitted = service.submit(&user_id, &payload)?;
            println!(
                "{} Check-in stored for {}",
                "✓".green(),
                submitted.record.day_key
            );
            print_score(submitted.readiness.score, submitted.readiness.state);
            println!(
                "  {}",
                TrainingDirective::for_readiness(&submitted.readiness).headline()
            );
        }

        Commands::Readiness { user, json } => {
            let user_id = resolve_user(&config, user)?;
            let dashboard = service.dashboard(&user_id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                return Ok(());
            }

            println!("{}", "Today's readiness".cyan().bold());
            print_score(dashboard.readiness.score, dashboard.readiness.state);

            let headline = dashboard.directive.headline();
            if dashboard.directive.is_override() {
                println!("  {}", headline.red().bold());
            } else {
                println!("  {}", headline.bold());
            }
            println!("  {}", dashboard.readiness.summary);

            let (start, end) = dashboard
                .readiness
                .peak_window
                .clock_labels(dashboard.profile.wake_time);
            println!("  Peak window: {} - {}", start, end);

            if !dashboard.has_history {
                println!(
                    "  {}",
                    "No check-ins yet. Run `aura checkin` to personalize.".dimmed()
                );
            }
        }

        Commands::Recovery { user } => {
            let user_id = resolve_user(&config, user)?;
            let dashboard = service.dashboard(&user_id)?;

            let rows: Vec<RecoveryDisplay> = dashboard
                .recovery
                .iter()
                .map(|recovery| RecoveryDisplay {
                    muscle: recovery.group.label().to_string(),
                    status: recovery.status.label().to_string(),
                    last_flagged: recovery
                        .last_flagged
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    remaining: format!("{:.1}", recovery.remaining_days()),
                })
                .collect();

            println!("{}", "Muscle recovery".cyan().bold());
            println!("{}", Table::new(rows).with(Style::rounded()));
        }

        Commands::Curve { user } => {
            let user_id = resolve_user(&config, user)?;
            let dashboard = service.dashboard(&user_id)?;
            let curve = dashboard.readiness.hourly_performance;
            let peak = aura::circadian::peak_hour(&curve);

            println!("{}", "Hourly performance".cyan().bold());
            for (hour, value) in curve.iter().enumerate() {
                let bar = "█".repeat(usize::from(*value) / 4);
                let line = format!("  {:02}:00 {:>3} {}", hour, value, bar);
                if hour == usize::from(peak) {
                    println!("{}", line.green().bold());
                } else {
                    println!("{}", line);
                }
            }
        }

        Commands::History {
            user,
            limit,
            rescore,
        } => {
            let user_id = resolve_user(&config, user)?;
            let records = service.history(&user_id, Some(limit))?;
            if records.is_empty() {
                println!("{}", "No check-ins recorded".yellow());
                return Ok(());
            }

            let rescored = if rescore {
                Some(service.timeline(&user_id, Some(limit))?)
            } else {
                None
            };

            let rows: Vec<HistoryDisplay> = records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    let (score, state) = match &rescored {
                        Some(timeline) => (
                            timeline.get(index).map(|r| r.score),
                            timeline.get(index).map(|r| r.state),
                        ),
                        None => (record.readiness_score, record.readiness_state),
                    };
                    history_row(record, score, state)
                })
                .collect();

            println!("{}", Table::new(rows).with(Style::rounded()));
            if let Some(summary) = HistorySummary::from_records(&records) {
                print_history_summary(&summary);
            }
        }

        Commands::SleepDebt { user } => {
            let user_id = resolve_user(&config, user)?;
            let dashboard = service.dashboard(&user_id)?;
            let debt = &dashboard.sleep_debt;

            let level = match debt.level {
                SleepDebtLevel::Low => debt.level.to_string().green(),
                SleepDebtLevel::Moderate => debt.level.to_string().yellow(),
                SleepDebtLevel::High => debt.level.to_string().red(),
            };
            let filled = (debt.gauge_fraction() * 20.0).round() as usize;

            println!("{}", "Sleep debt".cyan().bold());
            println!(
                "  {:.1}h over {} nights  {}",
                debt.total_debt_hours,
                debt.nights_considered(),
                level
            );
            println!("  [{}{}]", "#".repeat(filled), ".".repeat(20 - filled));
            for delta in &debt.daily_deltas {
                let text = format!("{:+.1}h", delta.delta_hours);
                let text = if delta.delta_hours < 0.0 { text.red() } else { text.green() };
                println!("  {}  {}", delta.date, text);
            }
        }

        Commands::Export {
            user,
            output,
            format,
            from,
            to,
        } => {
            let user_id = resolve_user(&config, user)?;
            let format = match format {
                Some(format) => format,
                None => ExportFormat::from_path(&output)?,
            };

            let records = service.history(&user_id, None)?;
            let selected = DateRange::new(from, to).filter(&records);
            let written = export_history(&selected, format, &output)?;

            println!(
                "{} Exported {} check-ins to {}",
                "✓".green(),
                written,
                output.display()
            );
        }

        Commands::Reset { user, yes } => {
            let user_id = resolve_user(&config, user)?;
            if !yes {
                println!(
                    "{}",
                    "This deletes every stored check-in. Re-run with --yes to confirm.".yellow()
                );
                return Ok(());
            }

            let deleted = service.reset_history(&user_id)?;
            println!("{} Deleted {} check-ins", "✓".green(), deleted);
        }
    }

    Ok(())
}

fn open_service(config: &AppConfig, database: Option<&Path>) -> Result<CheckInService> {
    let db_path = database
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.database_path());
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    let db = Database::new(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let mut service = CheckInService::new(db)
        .with_calculator(ReadinessCalculator::with_config(config.readiness.clone()));

    if let Some(path) = config.warehouse_path() {
        let sink = JsonLinesWarehouse::open(&path)
            .with_context(|| format!("Failed to open warehouse file: {}", path.display()))?;
        service = service.with_mirror(Arc::new(sink));
    }

    Ok(service)
}

fn resolve_user(config: &AppConfig, user: Option<String>) -> Result<String> {
    match user.or_else(|| config.default_user_id.clone()) {
        Some(user_id) => Ok(user_id),
        None => bail!("No profile selected. Pass --user or run `aura register` first."),
    }
}

fn read_payload(path: &Path) -> Result<CheckInPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read check-in file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid check-in JSON in {}", path.display()))
}

fn parse_sore_muscle(raw: &str) -> std::result::Result<(MuscleGroup, SorenessLevel), String> {
    let (group, level) = match raw.split_once('=') {
        Some((group, level)) => {
            let level: i64 = level
                .trim()
                .parse()
                .map_err(|_| format!("invalid soreness level in {:?}", raw))?;
            (group, SorenessLevel::from_level(level))
        }
        None => (raw, SorenessLevel::Sore),
    };
    let group = group.parse::<MuscleGroup>().map_err(|e| e.to_string())?;
    Ok((group, level))
}

fn print_score(score: u8, state: ReadinessState) {
    let text = format!("{} ({})", score, state.as_str().to_uppercase());
    let styled = match state {
        ReadinessState::Green => text.green().bold(),
        ReadinessState::Yellow => text.yellow().bold(),
        ReadinessState::Red => text.red().bold(),
    };
    println!("  Readiness: {}", styled);
}

fn print_history_summary(summary: &HistorySummary) {
    let readiness = summary
        .avg_readiness
        .map(|avg| format!("{:.0}", avg))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{} {} days  avg sleep {:.1}h  avg stress {:.1}  avg readiness {}",
        "Summary:".cyan().bold(),
        summary.days,
        summary.avg_sleep_hours,
        summary.avg_stress,
        readiness
    );
}

fn history_row(
    record: &StoredCheckIn,
    score: Option<u8>,
    state: Option<ReadinessState>,
) -> HistoryDisplay {
    let check_in = &record.check_in;
    HistoryDisplay {
        day: record.day_key.to_string(),
        sleep: format!("{:.1}h", check_in.sleep_duration_hours),
        stress: check_in.stress,
        rpe: check_in.last_session_rpe,
        soreness: check_in.subjective_soreness,
        sore_muscles: check_in.muscle_soreness.flagged().count(),
        score: score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        state: state
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "-".to_string()),
    }
}
