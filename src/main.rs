//! Pomocycle - a Pomodoro cycle timer.
//!
//! Runs as a menubar app on macOS and in the terminal everywhere else, and
//! keeps daily, all-time and streak statistics of completed work intervals.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pomocycle::persistence::{ConfigStore, Database, ProgressStore};
use pomocycle::stats::{StatsSummary, StreakTier};
use pomocycle::TimerConfiguration;

#[cfg(target_os = "macos")]
mod audio;
#[cfg(target_os = "macos")]
mod event;
#[cfg(target_os = "macos")]
mod menu;
mod terminal;
#[cfg(target_os = "macos")]
mod tray;

/// Pomocycle - Pomodoro timer with cycle and streak tracking
#[derive(Parser)]
#[command(name = "pomocycle")]
#[command(about = "Pomodoro timer with cycle and streak tracking")]
#[command(version)]
struct Cli {
    /// Database holding the configuration and statistics
    #[arg(long, env = "POMOCYCLE_DB", value_name = "PATH", global = true)]
    database: Option<PathBuf>,

    /// Start the first work interval right away
    #[arg(long)]
    auto_start: bool,

    /// Run in the terminal even where a menubar is available
    #[arg(long)]
    headless: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer (default)
    Run,
    /// Show cycle statistics
    Stats,
    /// Show the timer configuration, or replace it when options are given
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default, PartialEq)]
struct ConfigArgs {
    /// Work interval length
    #[arg(long, value_name = "MINS")]
    work: Option<u32>,

    /// Short break length
    #[arg(long, value_name = "MINS")]
    short_break: Option<u32>,

    /// Long break length
    #[arg(long, value_name = "MINS")]
    long_break: Option<u32>,

    /// Work intervals before a long break
    #[arg(long, value_name = "COUNT")]
    cycles: Option<u32>,

    /// Play a chime when an interval ends
    #[arg(long, value_name = "BOOL")]
    sound: Option<bool>,

    /// Start breaks without waiting
    #[arg(long, value_name = "BOOL")]
    auto_start_breaks: Option<bool>,

    /// Start work intervals without waiting
    #[arg(long, value_name = "BOOL")]
    auto_start_work: Option<bool>,
}

impl ConfigArgs {
    /// Builds the replacement configuration, or `None` if nothing was given.
    fn apply(&self, current: &TimerConfiguration) -> Option<TimerConfiguration> {
        if *self == Self::default() {
            return None;
        }

        Some(TimerConfiguration {
            work_minutes: self.work.unwrap_or(current.work_minutes),
            break_minutes: self.short_break.unwrap_or(current.break_minutes),
            long_break_minutes: self.long_break.unwrap_or(current.long_break_minutes),
            cycles_before_long_break: self.cycles.unwrap_or(current.cycles_before_long_break),
            sound_enabled: self.sound.unwrap_or(current.sound_enabled),
            auto_start_breaks: self.auto_start_breaks.unwrap_or(current.auto_start_breaks),
            auto_start_work: self.auto_start_work.unwrap_or(current.auto_start_work),
        })
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();

    let db_path = cli.database.unwrap_or_else(Database::default_path);
    let db = Database::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "opened database");

    match cli.command {
        None | Some(Commands::Run) => run_timer(db, cli.auto_start, cli.headless),
        Some(Commands::Stats) => cmd_stats(&db),
        Some(Commands::Config(args)) => cmd_config(&db, &args),
    }
}

#[cfg(target_os = "macos")]
fn run_timer(db: Database, auto_start: bool, headless: bool) -> Result<(), Box<dyn Error>> {
    if headless {
        terminal::run(db, auto_start)
    } else {
        tray::run(db, auto_start)
    }
}

#[cfg(not(target_os = "macos"))]
fn run_timer(db: Database, auto_start: bool, _headless: bool) -> Result<(), Box<dyn Error>> {
    terminal::run(db, auto_start)
}

fn cmd_stats(db: &Database) -> Result<(), Box<dyn Error>> {
    let mut progress = db.load_progress()?;
    progress.check_day_rollover(chrono::Local::now().date_naive());

    let summary = StatsSummary::from_progress(&progress);
    let badge = match summary.streak_tier() {
        StreakTier::Hot => "🔥🔥🔥",
        StreakTier::Warm => "🔥",
        StreakTier::Cold => "",
    };
    println!("Your Pomodoro Stats {}", badge);
    println!();
    println!("{}", summary);
    Ok(())
}

fn cmd_config(db: &Database, args: &ConfigArgs) -> Result<(), Box<dyn Error>> {
    let mut config = db.load_config()?;

    if let Some(replacement) = args.apply(&config) {
        replacement.validate()?;
        db.save_config(&replacement)?;
        println!("[ok] Configuration saved");
        config = replacement;
    }

    println!("Work:                  {} min", config.work_minutes);
    println!("Short break:           {} min", config.break_minutes);
    println!("Long break:            {} min", config.long_break_minutes);
    println!("Long break after:      {} cycles", config.cycles_before_long_break);
    println!("Sound:                 {}", on_off(config.sound_enabled));
    println!("Auto-start breaks:     {}", on_off(config.auto_start_breaks));
    println!("Auto-start work:       {}", on_off(config.auto_start_work));
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_config_overrides() {
        let cli = Cli::parse_from([
            "pomocycle",
            "config",
            "--work",
            "50",
            "--sound",
            "false",
        ]);
        let Some(Commands::Config(args)) = cli.command else {
            panic!("expected config command");
        };
        assert_eq!(args.work, Some(50));
        assert_eq!(args.sound, Some(false));
        assert_eq!(args.cycles, None);
    }

    #[test]
    fn test_config_args_without_options_change_nothing() {
        let args = ConfigArgs::default();
        assert_eq!(args.apply(&TimerConfiguration::default()), None);
    }

    #[test]
    fn test_config_args_override_only_given_fields() {
        let current = TimerConfiguration {
            long_break_minutes: 20,
            ..TimerConfiguration::default()
        };
        let args = ConfigArgs {
            work: Some(45),
            auto_start_work: Some(true),
            ..ConfigArgs::default()
        };

        let replacement = args.apply(&current).unwrap();
        assert_eq!(replacement.work_minutes, 45);
        assert!(replacement.auto_start_work);
        assert_eq!(replacement.long_break_minutes, 20);
        assert_eq!(replacement.break_minutes, 5);
    }

    #[test]
    fn test_cli_defaults_to_running() {
        let cli = Cli::parse_from(["pomocycle", "--headless"]);
        assert!(cli.command.is_none());
        assert!(cli.headless);
        assert!(!cli.auto_start);
    }

    #[test]
    fn test_config_command_saves_valid_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("pomocycle.db")).unwrap();
        let args = ConfigArgs {
            cycles: Some(3),
            ..ConfigArgs::default()
        };

        cmd_config(&db, &args).unwrap();
        assert_eq!(db.load_config().unwrap().cycles_before_long_break, 3);
    }

    #[test]
    fn test_config_command_rejects_invalid_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("pomocycle.db")).unwrap();
        let args = ConfigArgs {
            work: Some(0),
            ..ConfigArgs::default()
        };

        assert!(cmd_config(&db, &args).is_err());
        assert_eq!(db.load_config().unwrap(), TimerConfiguration::default());
    }
}
