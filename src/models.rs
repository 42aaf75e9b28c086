//! Data models for the Pomodoro cycle engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest allowed duration for any interval, in minutes.
pub const MIN_DURATION_MINS: u32 = 1;

/// Smallest allowed number of work intervals between long breaks.
pub const MIN_CYCLES_BEFORE_LONG_BREAK: u32 = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    BelowMinimum {
        field: &'static str,
        min: u32,
        value: u32,
    },
}

/// The three phases of a pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Returns true for either kind of break.
    pub fn is_break(&self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::ShortBreak => "Short break",
            Self::LongBreak => "Long break",
        }
    }
}

/// User-configurable durations and behavior flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerConfiguration {
    /// Duration of a work interval in minutes.
    pub work_minutes: u32,
    /// Duration of a short break in minutes.
    pub break_minutes: u32,
    /// Duration of a long break in minutes.
    pub long_break_minutes: u32,
    /// Number of completed work intervals before a long break.
    pub cycles_before_long_break: u32,
    /// Whether to play a chime when an interval ends.
    pub sound_enabled: bool,
    /// Whether a break starts counting down on its own.
    pub auto_start_breaks: bool,
    /// Whether a work interval starts counting down on its own after a break.
    pub auto_start_work: bool,
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long_break: 4,
            sound_enabled: true,
            auto_start_breaks: false,
            auto_start_work: false,
        }
    }
}

impl TimerConfiguration {
    /// Checks every duration and the long-break threshold against their minimums.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("workMinutes", self.work_minutes),
            ("breakMinutes", self.break_minutes),
            ("longBreakMinutes", self.long_break_minutes),
        ];
        for (field, value) in durations {
            if value < MIN_DURATION_MINS {
                return Err(ConfigError::BelowMinimum {
                    field,
                    min: MIN_DURATION_MINS,
                    value,
                });
            }
        }

        if self.cycles_before_long_break < MIN_CYCLES_BEFORE_LONG_BREAK {
            return Err(ConfigError::BelowMinimum {
                field: "cyclesBeforeLongBreak",
                min: MIN_CYCLES_BEFORE_LONG_BREAK,
                value: self.cycles_before_long_break,
            });
        }

        Ok(())
    }

    /// Returns the configured length of `mode` in minutes.
    pub fn minutes_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_minutes,
            TimerMode::ShortBreak => self.break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        }
    }

    /// Returns the configured length of `mode` in seconds.
    pub fn duration_secs(&self, mode: TimerMode) -> u32 {
        self.minutes_for(mode).saturating_mul(60)
    }
}

/// The live countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRunState {
    pub mode: TimerMode,
    pub seconds_remaining: u32,
    pub is_running: bool,
}

impl TimerRunState {
    /// A fresh, full-length interval for `mode`.
    pub fn fresh(mode: TimerMode, config: &TimerConfiguration, is_running: bool) -> Self {
        Self {
            mode,
            seconds_remaining: config.duration_secs(mode),
            is_running,
        }
    }

    /// Returns the elapsed fraction (0.0 to 1.0) of an interval `total_secs` long.
    pub fn progress_percent(&self, total_secs: u32) -> f32 {
        if total_secs == 0 {
            return 1.0;
        }
        let remaining = self.seconds_remaining.min(total_secs);
        1.0 - (remaining as f32 / total_secs as f32)
    }
}

/// Counters that survive across sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CycleProgress {
    /// Work intervals completed on `last_reset_date`.
    pub completed_cycles_today: u32,
    /// Work intervals completed since the last long break.
    pub cycles_since_last_long_break: u32,
    /// Work intervals ever completed. Never reset.
    pub total_cycles_all_time: u64,
    /// Consecutive calendar days with at least one completed work interval.
    pub streak_days: u32,
    /// Day of the most recently completed work interval.
    pub last_session_date: Option<NaiveDate>,
    /// Day `completed_cycles_today` counts for.
    pub last_reset_date: Option<NaiveDate>,
}

impl CycleProgress {
    /// Zeroes the daily counter when `today` differs from the stored day.
    /// Returns true if anything changed.
    pub fn check_day_rollover(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == Some(today) {
            return false;
        }
        self.completed_cycles_today = 0;
        self.last_reset_date = Some(today);
        true
    }

    /// Records one completed work interval on `today`.
    pub fn complete_cycle(&mut self, today: NaiveDate) {
        self.check_day_rollover(today);
        self.completed_cycles_today += 1;
        self.cycles_since_last_long_break += 1;
        self.total_cycles_all_time += 1;
        self.update_streak(today);
    }

    fn update_streak(&mut self, today: NaiveDate) {
        match self.last_session_date {
            Some(last) if last == today => {}
            Some(last) if today.pred_opt() == Some(last) => self.streak_days += 1,
            _ => self.streak_days = 1,
        }
        self.last_session_date = Some(today);
    }

    /// Returns true if a long break is due based on the threshold.
    pub fn is_long_break_due(&self, threshold: u32) -> bool {
        self.cycles_since_last_long_break >= threshold
    }

    /// Resets the current cycle counter (called when a long break begins).
    pub fn reset_cycle(&mut self) {
        self.cycles_since_last_long_break = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_configuration_default() {
        let config = TimerConfiguration::default();
        assert_eq!(config.work_minutes, 25);
        assert_eq!(config.break_minutes, 5);
        assert_eq!(config.long_break_minutes, 15);
        assert_eq!(config.cycles_before_long_break, 4);
        assert!(config.sound_enabled);
        assert!(!config.auto_start_breaks);
        assert!(!config.auto_start_work);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configuration_rejects_zero_duration() {
        let config = TimerConfiguration {
            work_minutes: 0,
            ..TimerConfiguration::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BelowMinimum {
                field: "workMinutes",
                min: 1,
                value: 0,
            })
        );

        let config = TimerConfiguration {
            long_break_minutes: 0,
            ..TimerConfiguration::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BelowMinimum {
                field: "longBreakMinutes",
                ..
            })
        ));
    }

    #[test]
    fn test_configuration_rejects_single_cycle_threshold() {
        let config = TimerConfiguration {
            cycles_before_long_break: 1,
            ..TimerConfiguration::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "cyclesBeforeLongBreak must be at least 2 (got 1)"
        );
    }

    #[test]
    fn test_duration_secs_per_mode() {
        let config = TimerConfiguration {
            work_minutes: 50,
            break_minutes: 10,
            long_break_minutes: 30,
            ..TimerConfiguration::default()
        };
        assert_eq!(config.duration_secs(TimerMode::Work), 3000);
        assert_eq!(config.duration_secs(TimerMode::ShortBreak), 600);
        assert_eq!(config.duration_secs(TimerMode::LongBreak), 1800);
    }

    #[test]
    fn test_configuration_json_uses_camel_case() {
        let json = serde_json::to_string(&TimerConfiguration::default()).unwrap();
        assert!(json.contains("\"workMinutes\":25"));
        assert!(json.contains("\"cyclesBeforeLongBreak\":4"));

        // Missing fields fall back to defaults
        let partial: TimerConfiguration = serde_json::from_str(r#"{"workMinutes":40}"#).unwrap();
        assert_eq!(partial.work_minutes, 40);
        assert_eq!(partial.break_minutes, 5);
    }

    #[test]
    fn test_run_state_progress() {
        let config = TimerConfiguration::default();
        let mut run = TimerRunState::fresh(TimerMode::Work, &config, false);
        assert_eq!(run.seconds_remaining, 1500);
        assert_eq!(run.progress_percent(1500), 0.0);

        run.seconds_remaining = 300;
        assert!((run.progress_percent(1500) - 0.8).abs() < 0.01);
        assert_eq!(run.progress_percent(0), 1.0);
    }

    #[test]
    fn test_mode_is_break() {
        assert!(!TimerMode::Work.is_break());
        assert!(TimerMode::ShortBreak.is_break());
        assert!(TimerMode::LongBreak.is_break());
    }

    #[test]
    fn test_complete_cycle_counts() {
        let today = day(2024, 1, 15);
        let mut progress = CycleProgress::default();

        progress.complete_cycle(today);
        progress.complete_cycle(today);

        assert_eq!(progress.completed_cycles_today, 2);
        assert_eq!(progress.cycles_since_last_long_break, 2);
        assert_eq!(progress.total_cycles_all_time, 2);
        assert_eq!(progress.streak_days, 1);
        assert_eq!(progress.last_session_date, Some(today));
    }

    #[test]
    fn test_streak_consecutive_days() {
        let mut progress = CycleProgress::default();
        progress.complete_cycle(day(2024, 1, 15));
        assert_eq!(progress.streak_days, 1);

        progress.complete_cycle(day(2024, 1, 16));
        assert_eq!(progress.streak_days, 2);

        // Only the first completion of a day counts towards the streak
        progress.complete_cycle(day(2024, 1, 16));
        assert_eq!(progress.streak_days, 2);
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let mut progress = CycleProgress::default();
        progress.complete_cycle(day(2024, 1, 15));
        progress.complete_cycle(day(2024, 1, 16));
        assert_eq!(progress.streak_days, 2);

        progress.complete_cycle(day(2024, 1, 19));
        assert_eq!(progress.streak_days, 1);
        assert_eq!(progress.total_cycles_all_time, 3);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let mut progress = CycleProgress::default();
        progress.complete_cycle(day(2024, 2, 29));
        progress.complete_cycle(day(2024, 3, 1));
        assert_eq!(progress.streak_days, 2);
    }

    #[test]
    fn test_day_rollover_resets_today_only() {
        let mut progress = CycleProgress::default();
        progress.complete_cycle(day(2024, 1, 15));
        progress.complete_cycle(day(2024, 1, 15));

        assert!(!progress.check_day_rollover(day(2024, 1, 15)));
        assert!(progress.check_day_rollover(day(2024, 1, 16)));

        assert_eq!(progress.completed_cycles_today, 0);
        assert_eq!(progress.cycles_since_last_long_break, 2);
        assert_eq!(progress.total_cycles_all_time, 2);
        assert_eq!(progress.last_reset_date, Some(day(2024, 1, 16)));
    }

    #[test]
    fn test_long_break_due() {
        let mut progress = CycleProgress::default();
        assert!(!progress.is_long_break_due(4));

        progress.cycles_since_last_long_break = 3;
        assert!(!progress.is_long_break_due(4));

        progress.cycles_since_last_long_break = 4;
        assert!(progress.is_long_break_due(4));

        progress.reset_cycle();
        assert_eq!(progress.cycles_since_last_long_break, 0);
    }
}
