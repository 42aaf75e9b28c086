//! Menu building and updating for the tray dropdown.

use muda::accelerator::Accelerator;
use muda::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use pomocycle::display::{format_progress, format_stats, format_status};
use pomocycle::{Engine, TimerConfiguration, TimerMode};
use std::collections::HashMap;
use thiserror::Error;

// Menu item IDs as constants
pub const ID_STATUS: &str = "status";
pub const ID_PROGRESS: &str = "progress";
pub const ID_STATS: &str = "stats";
pub const ID_START: &str = "start";
pub const ID_PAUSE: &str = "pause";
pub const ID_RESET: &str = "reset";
pub const ID_SKIP: &str = "skip";
pub const ID_SOUND_TOGGLE: &str = "sound_toggle";
pub const ID_AUTO_BREAKS_TOGGLE: &str = "auto_breaks_toggle";
pub const ID_AUTO_WORK_TOGGLE: &str = "auto_work_toggle";
pub const ID_QUIT: &str = "quit";

// Prefixes of the duration submenu items, followed by the value
pub const PREFIX_WORK: &str = "work_";
pub const PREFIX_SHORT: &str = "short_";
pub const PREFIX_LONG: &str = "long_";
pub const PREFIX_THRESHOLD: &str = "thresh_";

const WORK_CHOICES: [u32; 6] = [15, 20, 25, 30, 45, 60];
const SHORT_CHOICES: [u32; 4] = [3, 5, 10, 15];
const LONG_CHOICES: [u32; 4] = [10, 15, 20, 30];
const THRESHOLD_CHOICES: [u32; 5] = [2, 3, 4, 5, 6];

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu error: {0}")]
    Muda(#[from] muda::Error),
}

/// A submenu of mutually exclusive numeric choices.
pub struct ChoiceMenu {
    submenu: Submenu,
    checks: HashMap<u32, CheckMenuItem>,
}

impl ChoiceMenu {
    fn build(prefix: &str, choices: &[u32], unit: &str, current: u32) -> Result<Self, MenuError> {
        let submenu = Submenu::new("", true);
        let mut checks = HashMap::new();
        for &value in choices {
            let item = CheckMenuItem::with_id(
                MenuId::new(format!("{}{}", prefix, value)),
                format!("{} {}", value, unit),
                true,
                value == current,
                None::<Accelerator>,
            );
            submenu.append(&item)?;
            checks.insert(value, item);
        }
        Ok(Self { submenu, checks })
    }

    fn select(&self, title: String, current: u32) {
        self.submenu.set_text(title);
        for (&value, check) in &self.checks {
            check.set_checked(value == current);
        }
    }
}

/// Holds references to menu items that need dynamic updates.
pub struct MenuItems {
    pub status: MenuItem,
    pub progress: MenuItem,
    pub stats: MenuItem,
    pub start: MenuItem,
    pub pause: MenuItem,
    pub reset: MenuItem,
    pub skip: MenuItem,
    pub work: ChoiceMenu,
    pub short_break: ChoiceMenu,
    pub long_break: ChoiceMenu,
    pub threshold: ChoiceMenu,
    pub sound_toggle: CheckMenuItem,
    pub auto_breaks_toggle: CheckMenuItem,
    pub auto_work_toggle: CheckMenuItem,
}

fn info_item(id: &str) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), "", false, None::<Accelerator>)
}

fn action_item(id: &str, text: &str) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), text, true, None::<Accelerator>)
}

fn toggle_item(id: &str, text: &str, checked: bool) -> CheckMenuItem {
    CheckMenuItem::with_id(MenuId::new(id), text, true, checked, None::<Accelerator>)
}

/// Builds the complete menu structure.
pub fn build_menu(engine: &Engine) -> Result<(Menu, MenuItems), MenuError> {
    let config = engine.configuration();
    let menu = Menu::new();

    // Status display (disabled, info only)
    let status = info_item(ID_STATUS);
    let progress = info_item(ID_PROGRESS);
    menu.append(&status)?;
    menu.append(&progress)?;
    menu.append(&PredefinedMenuItem::separator())?;

    let stats = info_item(ID_STATS);
    menu.append(&stats)?;
    menu.append(&PredefinedMenuItem::separator())?;

    // Control buttons
    let start = action_item(ID_START, "▶  Start");
    let pause = action_item(ID_PAUSE, "⏸  Pause");
    let reset = action_item(ID_RESET, "↺  Reset");
    let skip = action_item(ID_SKIP, "⏭  Skip");
    menu.append(&start)?;
    menu.append(&pause)?;
    menu.append(&reset)?;
    menu.append(&skip)?;
    menu.append(&PredefinedMenuItem::separator())?;

    // Settings submenu
    let settings = Submenu::new("⚙  Settings", true);
    let work = ChoiceMenu::build(PREFIX_WORK, &WORK_CHOICES, "min", config.work_minutes)?;
    let short_break =
        ChoiceMenu::build(PREFIX_SHORT, &SHORT_CHOICES, "min", config.break_minutes)?;
    let long_break =
        ChoiceMenu::build(PREFIX_LONG, &LONG_CHOICES, "min", config.long_break_minutes)?;
    let threshold = ChoiceMenu::build(
        PREFIX_THRESHOLD,
        &THRESHOLD_CHOICES,
        "pomodoros",
        config.cycles_before_long_break,
    )?;
    settings.append(&work.submenu)?;
    settings.append(&short_break.submenu)?;
    settings.append(&long_break.submenu)?;
    settings.append(&threshold.submenu)?;
    settings.append(&PredefinedMenuItem::separator())?;

    let sound_toggle = toggle_item(ID_SOUND_TOGGLE, "Sound Enabled", config.sound_enabled);
    let auto_breaks_toggle =
        toggle_item(ID_AUTO_BREAKS_TOGGLE, "Auto-start Breaks", config.auto_start_breaks);
    let auto_work_toggle =
        toggle_item(ID_AUTO_WORK_TOGGLE, "Auto-start Work", config.auto_start_work);
    settings.append(&sound_toggle)?;
    settings.append(&auto_breaks_toggle)?;
    settings.append(&auto_work_toggle)?;
    menu.append(&settings)?;

    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&action_item(ID_QUIT, "Quit Pomocycle"))?;

    let items = MenuItems {
        status,
        progress,
        stats,
        start,
        pause,
        reset,
        skip,
        work,
        short_break,
        long_break,
        threshold,
        sound_toggle,
        auto_breaks_toggle,
        auto_work_toggle,
    };
    update_menu_items(&items, engine);
    update_settings_items(&items, config);

    Ok((menu, items))
}

/// Updates the countdown-dependent items.
pub fn update_menu_items(items: &MenuItems, engine: &Engine) {
    let run = engine.run_state();

    items.status.set_text(format_status(&run));
    items
        .progress
        .set_text(format_progress(&run, engine.total_secs()));
    items.stats.set_text(format_stats(engine.progress()));

    items.start.set_enabled(!run.is_running);
    items.pause.set_enabled(run.is_running);
    items.skip.set_text(match run.mode {
        TimerMode::Work => "⏭  Skip to Break",
        TimerMode::ShortBreak | TimerMode::LongBreak => "⏭  Skip Break",
    });
}

/// Brings the settings submenu in line with `config`.
pub fn update_settings_items(items: &MenuItems, config: &TimerConfiguration) {
    items
        .work
        .select(format!("Work: {} min", config.work_minutes), config.work_minutes);
    items.short_break.select(
        format!("Short Break: {} min", config.break_minutes),
        config.break_minutes,
    );
    items.long_break.select(
        format!("Long Break: {} min", config.long_break_minutes),
        config.long_break_minutes,
    );
    items.threshold.select(
        format!("Long Break After: {} pomodoros", config.cycles_before_long_break),
        config.cycles_before_long_break,
    );
    items.sound_toggle.set_checked(config.sound_enabled);
    items.auto_breaks_toggle.set_checked(config.auto_start_breaks);
    items.auto_work_toggle.set_checked(config.auto_start_work);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_selectable() {
        let config = TimerConfiguration::default();
        assert!(WORK_CHOICES.contains(&config.work_minutes));
        assert!(SHORT_CHOICES.contains(&config.break_minutes));
        assert!(LONG_CHOICES.contains(&config.long_break_minutes));
        assert!(THRESHOLD_CHOICES.contains(&config.cycles_before_long_break));
    }

    #[test]
    fn test_choices_satisfy_validation() {
        let minimum = pomocycle::models::MIN_CYCLES_BEFORE_LONG_BREAK;
        assert!(THRESHOLD_CHOICES.iter().all(|&c| c >= minimum));
        assert!(WORK_CHOICES
            .iter()
            .chain(&SHORT_CHOICES)
            .chain(&LONG_CHOICES)
            .all(|&m| m >= pomocycle::models::MIN_DURATION_MINS));
    }
}
