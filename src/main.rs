use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use uuid::Uuid;

use cyclecast::commands::{self, CommandError, DayEntry, SettingsUpdate};
use cyclecast::config::Config;
use cyclecast::models::{BleedingIntensity, Mood, Symptom};
use cyclecast::storage::JsonFileStore;
use cyclecast::{dates, logging};

#[derive(Parser)]
#[command(name = "cyclecast", version, about = "On-device cycle tracker")]
struct Cli {
    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log or replace the entry for a day
    Log {
        /// Day to log, defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum)]
        bleeding: Option<Bleeding>,
        #[arg(long, value_enum)]
        mood: Option<MoodArg>,
        /// Repeatable; unknown names are stored as custom symptoms
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Glasses of water
        #[arg(long)]
        water: Option<u32>,
    },
    /// Set the water count for a day
    Water {
        glasses: u32,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a log by id
    Delete { id: Uuid },
    /// Mark today as the first day of a period
    StartPeriod,
    /// Cycle day, phase and upcoming dates
    Today,
    /// Calendar day sets for a month
    Month {
        year: i32,
        /// 1-12
        month: u32,
    },
    /// Cycle statistics
    Stats,
    /// Show or change cycle settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Print all data as JSON
    Export,
    /// Permanently delete all data
    Wipe {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        cycle_length: Option<i64>,
        #[arg(long)]
        period_length: Option<i64>,
        #[arg(long, conflicts_with = "clear_last_period_start")]
        last_period_start: Option<String>,
        #[arg(long)]
        clear_last_period_start: bool,
        #[arg(long)]
        derive_from_logs: Option<bool>,
        #[arg(long)]
        show_fertility: Option<bool>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Bleeding {
    None,
    Light,
    Medium,
    Heavy,
}

impl From<Bleeding> for BleedingIntensity {
    fn from(value: Bleeding) -> Self {
        match value {
            Bleeding::None => BleedingIntensity::None,
            Bleeding::Light => BleedingIntensity::Light,
            Bleeding::Medium => BleedingIntensity::Medium,
            Bleeding::Heavy => BleedingIntensity::Heavy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MoodArg {
    Bad,
    Neutral,
    Good,
}

impl From<MoodArg> for Mood {
    fn from(value: MoodArg) -> Self {
        match value {
            MoodArg::Bad => Mood::Bad,
            MoodArg::Neutral => Mood::Neutral,
            MoodArg::Good => Mood::Good,
        }
    }
}

fn parse_symptom(name: &str) -> Symptom {
    match name.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
        "cramps" => Symptom::Cramps,
        "headache" => Symptom::Headache,
        "mood" | "mood_swings" => Symptom::MoodSwings,
        "energy" | "low_energy" => Symptom::LowEnergy,
        "bloating" => Symptom::Bloating,
        "sleep" | "sleep_issues" => Symptom::SleepIssues,
        _ => Symptom::Custom(name.trim().to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli, store: &mut JsonFileStore) -> Result<(), CommandError> {
    let today = match cli.today.as_deref() {
        Some(raw) => dates::parse_iso(raw).map_err(|_| CommandError::InvalidDate(raw.to_string()))?,
        None => chrono::Local::now().date_naive(),
    };
    let date_or_today = |date: Option<String>| date.unwrap_or_else(|| dates::format_iso(today));

    match cli.command {
        Commands::Log {
            date,
            bleeding,
            mood,
            symptoms,
            notes,
            water,
        } => {
            let entry = DayEntry {
                bleeding_intensity: bleeding.map(Into::into),
                mood: mood.map(Into::into),
                symptoms: symptoms.iter().map(|s| parse_symptom(s)).collect(),
                notes,
                water_intake: water,
            };
            print_json(&commands::log_day(store, &date_or_today(date), entry, today)?)
        }
        Commands::Water { glasses, date } => print_json(&commands::set_water_intake(
            store,
            &date_or_today(date),
            glasses,
            today,
        )?),
        Commands::Delete { id } => commands::delete_log(store, id),
        Commands::StartPeriod => print_json(&commands::start_period(store, today)?),
        Commands::Today => print_json(&commands::overview(store, today)?),
        Commands::Month { year, month } => print_json(&commands::month(store, year, month, today)?),
        Commands::Stats => print_json(&commands::stats(store, today)?),
        Commands::Settings { action } => match action {
            None | Some(SettingsAction::Show) => print_json(&commands::settings(store)?),
            Some(SettingsAction::Set {
                cycle_length,
                period_length,
                last_period_start,
                clear_last_period_start,
                derive_from_logs,
                show_fertility,
            }) => {
                let update = SettingsUpdate {
                    cycle_length,
                    period_length,
                    last_period_start,
                    clear_last_period_start,
                    derive_from_logs,
                    show_fertility,
                };
                print_json(&commands::update_settings(store, update)?)
            }
        },
        Commands::Export => {
            println!("{}", commands::export_data(store)?);
            Ok(())
        }
        Commands::Wipe { yes } => {
            if !yes {
                return Err(CommandError::WipeNotConfirmed);
            }
            commands::wipe_all_data(store)
        }
    }
}

fn main() {
    let config = Config::from_env();
    logging::init(&config.log_filter);

    let cli = Cli::parse();
    let result = config
        .open_store()
        .map_err(CommandError::from)
        .and_then(|mut store| {
            tracing::debug!(path = %store.path().display(), "opened store");
            run(cli, &mut store)
        });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
