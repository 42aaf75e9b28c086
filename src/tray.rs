//! Menubar driver: owns the engine on the main thread and feeds it ticks,
//! menu clicks and configuration changes.

use std::error::Error;
use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use muda::MenuEvent;
use tray_icon::{TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use pomocycle::clock::SystemClock;
use pomocycle::display::format_title;
use pomocycle::notifications::{self, Alert, Notifier, NotifyError};
use pomocycle::persistence::Database;
use pomocycle::timer::{Command, ThreadTicker, TimerMessage, TICK_INTERVAL};
use pomocycle::{Engine, EngineEvent, EngineParts};

use crate::audio::AudioPlayer;
use crate::event::{self, EventResult};
use crate::menu::{self, MenuItems};

/// Plays the chime through rodio and posts alerts to Notification Center.
struct TrayNotifier {
    audio: Option<AudioPlayer>,
}

impl Notifier for TrayNotifier {
    fn chime(&self) {
        if let Some(ref audio) = self.audio {
            audio.play_chime();
        }
    }

    fn post(&self, alert: &Alert) -> Result<(), NotifyError> {
        notifications::show(alert)
    }
}

/// Sleeps until the next tick is due; menu clicks are picked up on that wake.
fn next_wake(now: Instant) -> ControlFlow {
    ControlFlow::WaitUntil(now + TICK_INTERVAL)
}

/// Application handler for the winit event loop.
struct TrayApp {
    engine: Engine,
    tray: TrayIcon,
    menu_items: MenuItems,
    timer_rx: Receiver<TimerMessage>,
    events: Receiver<EngineEvent>,
}

impl TrayApp {
    fn refresh(&self) {
        self.tray
            .set_title(Some(format_title(&self.engine.run_state())));
        menu::update_menu_items(&self.menu_items, &self.engine);
    }

    /// Returns false once the app should exit.
    fn process_timer_messages(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.timer_rx.try_recv() {
            match message {
                TimerMessage::Tick { generation } => self.engine.handle_tick(generation),
                TimerMessage::Command(Command::Quit) => return false,
                TimerMessage::Command(command) => self.engine.apply(command),
            }
            changed = true;
        }

        for event in self.events.try_iter() {
            if let EngineEvent::ModeChanged { mode, progress } = event {
                tracing::info!(
                    mode = mode.label(),
                    today = progress.completed_cycles_today,
                    "interval finished"
                );
            }
        }

        if changed {
            self.refresh();
        }
        true
    }

    fn process_menu_events(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            match event::handle_menu_event(&mut self.engine, event) {
                EventResult::Quit => {
                    event_loop.exit();
                    return;
                }
                EventResult::StateChanged => self.refresh(),
                EventResult::SettingsChanged => {
                    menu::update_settings_items(&self.menu_items, self.engine.configuration());
                    self.refresh();
                }
                EventResult::Continue => {}
            }
        }
    }
}

impl ApplicationHandler for TrayApp {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Nothing to do on resume for a tray-only app
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // No window events for a tray-only app
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(next_wake(Instant::now()));

        if !self.process_timer_messages() {
            event_loop.exit();
            return;
        }
        self.process_menu_events(event_loop);
    }
}

/// Runs the menubar timer until the user quits.
pub fn run(db: Database, auto_start: bool) -> Result<(), Box<dyn Error>> {
    // Required for the tray on macOS
    let event_loop = EventLoop::new()?;

    let (tx, timer_rx) = mpsc::channel();
    let (event_tx, events) = mpsc::channel();

    // Audio is created on the main thread; the output stream is not Send
    let audio = match AudioPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            tracing::warn!(error = %e, "audio unavailable, chimes disabled");
            None
        }
    };

    let engine = Engine::new(
        EngineParts {
            store: Box::new(db),
            clock: Box::new(SystemClock),
            ticker: Box::new(ThreadTicker::new(tx)),
            notifier: Box::new(TrayNotifier { audio }),
            observer: Box::new(event_tx),
        },
        auto_start,
    );

    let (built_menu, menu_items) = menu::build_menu(&engine)?;

    // No icon image, the title text carries the countdown
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(built_menu))
        .with_title(format_title(&engine.run_state()))
        .with_tooltip("Pomocycle - Pomodoro Timer")
        .build()?;

    let mut app = TrayApp {
        engine,
        tray,
        menu_items,
        timer_rx,
        events,
    };
    event_loop.run_app(&mut app)?;

    tracing::info!("timer stopped");
    Ok(())
}
