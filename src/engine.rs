//! The pomodoro cycle engine: countdown, mode transitions and cycle bookkeeping.

use crate::clock::Clock;
use crate::models::{ConfigError, CycleProgress, TimerConfiguration, TimerMode, TimerRunState};
use crate::notifications::{Alert, Notifier};
use crate::persistence::Store;
use crate::timer::{Command, TickSource};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Receives countdown updates from the engine.
pub trait EngineObserver {
    /// Called once for every second counted down while running.
    fn on_tick(&mut self, seconds_remaining: u32, mode: TimerMode);
    /// Called once per mode transition, natural or skipped.
    fn on_mode_change(&mut self, mode: TimerMode, progress: &CycleProgress);
}

/// Observer callbacks as values, for forwarding over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Tick {
        seconds_remaining: u32,
        mode: TimerMode,
    },
    ModeChanged {
        mode: TimerMode,
        progress: CycleProgress,
    },
}

impl EngineObserver for Sender<EngineEvent> {
    fn on_tick(&mut self, seconds_remaining: u32, mode: TimerMode) {
        let _ = self.send(EngineEvent::Tick {
            seconds_remaining,
            mode,
        });
    }

    fn on_mode_change(&mut self, mode: TimerMode, progress: &CycleProgress) {
        let _ = self.send(EngineEvent::ModeChanged {
            mode,
            progress: progress.clone(),
        });
    }
}

/// The collaborators an engine is built from.
pub struct EngineParts {
    pub store: Box<dyn Store>,
    pub clock: Box<dyn Clock>,
    pub ticker: Box<dyn TickSource>,
    pub notifier: Box<dyn Notifier>,
    pub observer: Box<dyn EngineObserver>,
}

pub struct Engine {
    config: TimerConfiguration,
    run: TimerRunState,
    progress: CycleProgress,
    store: Box<dyn Store>,
    clock: Box<dyn Clock>,
    ticker: Box<dyn TickSource>,
    notifier: Box<dyn Notifier>,
    observer: Box<dyn EngineObserver>,
    /// Tag of the only ticker whose ticks are honored.
    generation: u64,
    /// Instant the current run is measured from; `None` while stopped.
    anchor: Option<Instant>,
    /// Whole seconds already counted down since `anchor`.
    applied_secs: u64,
    /// Sub-second remainder kept across a pause.
    carry: Duration,
}

impl Engine {
    /// Creates an engine in Work mode with a full-length interval, loading
    /// configuration and progress from the store.
    pub fn new(parts: EngineParts, auto_start: bool) -> Self {
        let EngineParts {
            store,
            clock,
            ticker,
            notifier,
            observer,
        } = parts;

        let config = match store.load_config() {
            Ok(config) => match config.validate() {
                Ok(()) => config,
                Err(e) => {
                    warn!(error = %e, "stored configuration is invalid, using defaults");
                    TimerConfiguration::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to load configuration, using defaults");
                TimerConfiguration::default()
            }
        };

        let progress = store.load_progress().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load cycle progress, starting from zero");
            CycleProgress::default()
        });

        let mut engine = Self {
            run: TimerRunState::fresh(TimerMode::Work, &config, false),
            config,
            progress,
            store,
            clock,
            ticker,
            notifier,
            observer,
            generation: 0,
            anchor: None,
            applied_secs: 0,
            carry: Duration::ZERO,
        };

        engine.refresh_day();
        if auto_start {
            engine.start();
        }
        engine
    }

    pub fn configuration(&self) -> &TimerConfiguration {
        &self.config
    }

    pub fn progress(&self) -> &CycleProgress {
        &self.progress
    }

    pub fn run_state(&self) -> TimerRunState {
        self.run
    }

    /// Full length of the current mode in seconds.
    pub fn total_secs(&self) -> u32 {
        self.config.duration_secs(self.run.mode)
    }

    /// Starts the countdown. If it is already running, the active ticker is
    /// replaced without losing or double-counting elapsed time.
    pub fn start(&mut self) {
        if self.run.is_running {
            self.sync();
            if !self.run.is_running {
                return;
            }
            self.suspend_driver();
        }

        if self.run.seconds_remaining == 0 {
            self.run.seconds_remaining = self.total_secs();
        }
        self.run.is_running = true;
        self.launch_driver();
    }

    /// Pauses the countdown, keeping the time left. Does nothing when paused.
    pub fn pause(&mut self) {
        if !self.run.is_running {
            return;
        }
        self.sync();
        if !self.run.is_running {
            return;
        }
        self.suspend_driver();
        self.run.is_running = false;
    }

    /// Starts if paused, pauses if running.
    pub fn toggle(&mut self) {
        if self.run.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stops and rewinds the current mode to its full configured length.
    /// A short break whose long-break threshold is now met becomes a long
    /// break.
    pub fn reset(&mut self) {
        self.cancel_driver();
        let mode = match self.run.mode {
            TimerMode::ShortBreak => self.break_due(),
            mode => mode,
        };
        let changed = mode != self.run.mode;
        if changed && mode == TimerMode::LongBreak {
            self.progress.reset_cycle();
            self.persist_progress();
        }

        self.run = TimerRunState::fresh(mode, &self.config, false);
        if changed {
            debug!(mode = ?mode, "reset into due long break");
            self.observer.on_mode_change(mode, &self.progress);
        }
    }

    /// Stops and flips to the next mode without counting a completed cycle.
    pub fn skip(&mut self) {
        self.cancel_driver();
        let next = match self.run.mode {
            TimerMode::Work => self.break_due(),
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
        };
        self.run = TimerRunState::fresh(next, &self.config, false);
        debug!(mode = ?next, "skipped to next mode");
        self.observer.on_mode_change(next, &self.progress);
    }

    /// Replaces the configuration wholesale, then stops and rewinds the
    /// current mode under it. Invalid configurations change nothing.
    pub fn update_configuration(&mut self, config: TimerConfiguration) -> Result<(), ConfigError> {
        config.validate()?;

        self.config = config;
        if let Err(e) = self.store.save_config(&self.config) {
            warn!(error = %e, "failed to save configuration");
        }

        self.cancel_driver();
        self.run = TimerRunState::fresh(self.run.mode, &self.config, false);
        Ok(())
    }

    /// Runs a control request.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::StartPause => self.toggle(),
            Command::Reset => self.reset(),
            Command::Skip => self.skip(),
            // Quitting is up to whoever owns the engine.
            Command::Quit => {}
        }
    }

    /// Advances the countdown to the clock. Ticks from a cancelled ticker are
    /// ignored.
    pub fn handle_tick(&mut self, generation: u64) {
        if generation != self.generation || !self.run.is_running {
            trace!(generation, current = self.generation, "ignoring stale tick");
            return;
        }
        self.refresh_day();
        self.sync();
    }

    fn break_due(&self) -> TimerMode {
        if self
            .progress
            .is_long_break_due(self.config.cycles_before_long_break)
        {
            TimerMode::LongBreak
        } else {
            TimerMode::ShortBreak
        }
    }

    fn refresh_day(&mut self) {
        if self.progress.check_day_rollover(self.clock.today()) {
            self.persist_progress();
        }
    }

    fn persist_progress(&self) {
        if let Err(e) = self.store.save_progress(&self.progress) {
            warn!(error = %e, "failed to save cycle progress");
        }
    }

    /// Counts down one second per whole second elapsed since the anchor.
    fn sync(&mut self) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let elapsed = self.clock.now().saturating_duration_since(anchor).as_secs();

        while self.applied_secs < elapsed && self.run.seconds_remaining > 0 {
            self.applied_secs += 1;
            self.run.seconds_remaining -= 1;
            self.observer.on_tick(self.run.seconds_remaining, self.run.mode);
        }

        if self.run.seconds_remaining == 0 {
            self.expire();
        }
    }

    fn expire(&mut self) {
        let finished = self.run.mode;
        let next = match finished {
            TimerMode::Work => {
                self.progress.complete_cycle(self.clock.today());
                let next = self.break_due();
                if next == TimerMode::LongBreak {
                    self.progress.reset_cycle();
                }
                self.persist_progress();
                next
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
        };

        self.cancel_driver();
        let auto_start = match next {
            TimerMode::Work => self.config.auto_start_work,
            TimerMode::ShortBreak | TimerMode::LongBreak => self.config.auto_start_breaks,
        };
        self.run = TimerRunState::fresh(next, &self.config, auto_start);
        if auto_start {
            self.launch_driver();
        }

        debug!(
            from = ?finished,
            to = ?next,
            today = self.progress.completed_cycles_today,
            "interval finished"
        );
        self.observer.on_mode_change(next, &self.progress);

        if self.config.sound_enabled {
            self.notifier.chime();
        }
        let alert = Alert::for_transition(next, &self.progress, &self.config);
        if let Err(e) = self.notifier.post(&alert) {
            warn!(error = %e, "failed to post notification");
        }
    }

    fn launch_driver(&mut self) {
        self.generation += 1;
        let now = self.clock.now();
        self.anchor = Some(now.checked_sub(self.carry).unwrap_or(now));
        self.applied_secs = 0;
        self.carry = Duration::ZERO;
        self.ticker.start(self.generation);
    }

    /// Stops the ticker, remembering the part of a second already elapsed.
    fn suspend_driver(&mut self) {
        self.ticker.stop();
        self.generation += 1;
        if let Some(anchor) = self.anchor.take() {
            let elapsed = self.clock.now().saturating_duration_since(anchor);
            self.carry = elapsed.saturating_sub(Duration::from_secs(self.applied_secs));
        }
        self.applied_secs = 0;
    }

    /// Stops the ticker and forgets any partial second.
    fn cancel_driver(&mut self) {
        self.ticker.stop();
        self.generation += 1;
        self.anchor = None;
        self.applied_secs = 0;
        self.carry = Duration::ZERO;
    }
}
