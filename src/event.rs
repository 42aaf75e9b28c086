//! Menu event handling.

use crate::menu::{
    ID_AUTO_BREAKS_TOGGLE, ID_AUTO_WORK_TOGGLE, ID_PAUSE, ID_QUIT, ID_RESET, ID_SKIP,
    ID_SOUND_TOGGLE, ID_START, PREFIX_LONG, PREFIX_SHORT, PREFIX_THRESHOLD, PREFIX_WORK,
};
use muda::MenuEvent;
use pomocycle::{Engine, TimerConfiguration};

/// Result of handling a menu event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventResult {
    /// Event handled, continue running.
    Continue,
    /// User requested quit.
    Quit,
    /// Timer state changed, menu needs update.
    StateChanged,
    /// Configuration changed (or was rejected), settings need a refresh.
    SettingsChanged,
}

/// A change picked from one of the duration submenus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingChange {
    Work(u32),
    ShortBreak(u32),
    LongBreak(u32),
    Threshold(u32),
}

impl SettingChange {
    /// Parses a submenu item id such as `work_25`.
    pub fn parse(id: &str) -> Option<Self> {
        let prefixes: [(&str, fn(u32) -> Self); 4] = [
            (PREFIX_WORK, Self::Work),
            (PREFIX_SHORT, Self::ShortBreak),
            (PREFIX_LONG, Self::LongBreak),
            (PREFIX_THRESHOLD, Self::Threshold),
        ];
        prefixes.iter().find_map(|(prefix, make)| {
            id.strip_prefix(prefix)
                .and_then(|value| value.parse::<u32>().ok())
                .map(make)
        })
    }

    pub fn apply(self, config: &mut TimerConfiguration) {
        match self {
            Self::Work(mins) => config.work_minutes = mins,
            Self::ShortBreak(mins) => config.break_minutes = mins,
            Self::LongBreak(mins) => config.long_break_minutes = mins,
            Self::Threshold(count) => config.cycles_before_long_break = count,
        }
    }
}

/// Handles a menu event and drives the engine accordingly.
pub fn handle_menu_event(engine: &mut Engine, event: MenuEvent) -> EventResult {
    let id: &str = event.id().as_ref();

    match id {
        ID_START => {
            engine.start();
            EventResult::StateChanged
        }
        ID_PAUSE => {
            engine.pause();
            EventResult::StateChanged
        }
        ID_RESET => {
            engine.reset();
            EventResult::StateChanged
        }
        ID_SKIP => {
            engine.skip();
            EventResult::StateChanged
        }
        ID_SOUND_TOGGLE => update_configuration(engine, |c| c.sound_enabled = !c.sound_enabled),
        ID_AUTO_BREAKS_TOGGLE => {
            update_configuration(engine, |c| c.auto_start_breaks = !c.auto_start_breaks)
        }
        ID_AUTO_WORK_TOGGLE => {
            update_configuration(engine, |c| c.auto_start_work = !c.auto_start_work)
        }
        ID_QUIT => EventResult::Quit,
        _ => match SettingChange::parse(id) {
            Some(change) => update_configuration(engine, |c| change.apply(c)),
            None => EventResult::Continue,
        },
    }
}

/// Replaces the engine configuration with an edited copy.
fn update_configuration<F>(engine: &mut Engine, edit: F) -> EventResult
where
    F: FnOnce(&mut TimerConfiguration),
{
    let mut config = engine.configuration().clone();
    edit(&mut config);
    if let Err(e) = engine.update_configuration(config) {
        tracing::warn!(error = %e, "rejected configuration from menu");
    }
    EventResult::SettingsChanged
}
