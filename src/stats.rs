//! Summary statistics over the cycle counters.

use crate::models::CycleProgress;
use chrono::NaiveDate;
use std::fmt;

/// How hot the current streak is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTier {
    /// Fewer than three days.
    Cold,
    /// Three to six days.
    Warm,
    /// A week or more.
    Hot,
}

impl StreakTier {
    pub fn from_days(days: u32) -> Self {
        match days {
            7.. => Self::Hot,
            3..=6 => Self::Warm,
            _ => Self::Cold,
        }
    }
}

/// Headline numbers shown by `pomocycle stats` and the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub today: u32,
    pub total: u64,
    pub streak_days: u32,
    /// Rough cycles per active day: total spread over the streak.
    pub daily_average: u64,
    pub last_session: Option<NaiveDate>,
}

impl StatsSummary {
    pub fn from_progress(progress: &CycleProgress) -> Self {
        let total = progress.total_cycles_all_time;
        let days = u64::from(progress.streak_days.max(1));
        let daily_average = if total > 0 {
            (total + days / 2) / days
        } else {
            0
        };

        Self {
            today: progress.completed_cycles_today,
            total,
            streak_days: progress.streak_days,
            daily_average,
            last_session: progress.last_session_date,
        }
    }

    pub fn streak_tier(&self) -> StreakTier {
        StreakTier::from_days(self.streak_days)
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Today's focus:   {}", self.today)?;
        writeln!(f, "Total sessions:  {}", self.total)?;
        writeln!(f, "Daily average:   {}", self.daily_average)?;
        writeln!(f, "Day streak:      {}", self.streak_days)?;
        match self.last_session {
            Some(date) => writeln!(f, "Last session:    {}", date)?,
            None => writeln!(f, "Last session:    never")?,
        }
        write!(f, "{}", motivation(self.today))
    }
}

/// Encouragement matching how many cycles were completed today.
pub fn motivation(today: u32) -> &'static str {
    match today {
        0 => "Ready to start your focus session? 🍅",
        1 => "Great start! Keep the momentum going! 💪",
        2 | 3 => "You're on fire! Excellent progress! 🔥",
        _ => "Outstanding dedication! You're crushing it today! 🎉",
    }
}
