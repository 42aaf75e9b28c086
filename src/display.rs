//! Text rendering of the timer for the tray title, menu and terminal.

use crate::models::{CycleProgress, TimerMode, TimerRunState};

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats the tray title for the current run state.
pub fn format_title(run: &TimerRunState) -> String {
    let icon = if !run.is_running {
        "⏸"
    } else if run.mode.is_break() {
        "☕"
    } else {
        "🍅"
    };
    format!("{} {}", icon, format_time(run.seconds_remaining))
}

/// Formats the status line for the menu.
pub fn format_status(run: &TimerRunState) -> String {
    let time = format_time(run.seconds_remaining);
    match (run.mode, run.is_running) {
        (TimerMode::Work, true) => format!("⏱  {} remaining", time),
        (TimerMode::Work, false) => format!("⏸  {} (paused)", time),
        (mode, true) => format!("☕  {} - {}", mode.label(), time),
        (mode, false) => format!("☕  {} - {} (paused)", mode.label(), time),
    }
}

/// Formats the progress bar for an interval `total_secs` long.
pub fn format_progress(run: &TimerRunState, total_secs: u32) -> String {
    let pct = run.progress_percent(total_secs);
    let filled = ((pct * 20.0).round() as usize).min(20);
    let empty = 20 - filled;
    format!(
        "{}{}  {}%",
        "█".repeat(filled),
        "░".repeat(empty),
        (pct * 100.0).round() as u32
    )
}

/// Formats the cycle counters for the menu.
pub fn format_stats(progress: &CycleProgress) -> String {
    let today = progress.completed_cycles_today;
    if today == 0 {
        return format!(
            "Today: —  0 · total {} · streak {}d",
            progress.total_cycles_all_time, progress.streak_days
        );
    }

    let tomatoes = "🍅".repeat(today.min(10) as usize);
    let extra = if today > 10 {
        format!("+{}", today - 10)
    } else {
        String::new()
    };
    format!(
        "Today: {}{}  {} · total {} · streak {}d",
        tomatoes, extra, today, progress.total_cycles_all_time, progress.streak_days
    )
}
