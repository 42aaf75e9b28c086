//! Hand-driven collaborators for engine tests.

use crate::clock::Clock;
use crate::models::{CycleProgress, TimerConfiguration};
use crate::notifications::{Alert, Notifier, NotifyError};
use crate::persistence::{ConfigStore, DatabaseError, ProgressStore};
use crate::timer::TickSource;
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
    today: Rc<Cell<NaiveDate>>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
            today: Rc::new(Cell::new(today)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.today.set(today);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

#[derive(Default)]
struct TickerLog {
    active: Option<u64>,
    starts: Vec<u64>,
    stops: usize,
}

/// Records start/stop calls instead of spawning threads.
#[derive(Clone, Default)]
pub struct ManualTicker {
    log: Rc<RefCell<TickerLog>>,
}

impl ManualTicker {
    /// Generation of the running ticker, if any.
    pub fn active(&self) -> Option<u64> {
        self.log.borrow().active
    }

    pub fn starts(&self) -> Vec<u64> {
        self.log.borrow().starts.clone()
    }

    pub fn stops(&self) -> usize {
        self.log.borrow().stops
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self, generation: u64) {
        let mut log = self.log.borrow_mut();
        if log.active.take().is_some() {
            log.stops += 1;
        }
        log.active = Some(generation);
        log.starts.push(generation);
    }

    fn stop(&mut self) {
        let mut log = self.log.borrow_mut();
        if log.active.take().is_some() {
            log.stops += 1;
        }
    }
}

#[derive(Default)]
struct NotifierLog {
    chimes: usize,
    alerts: Vec<Alert>,
}

/// Collects chimes and alerts; can be told to fail every post.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    log: Rc<RefCell<NotifierLog>>,
    fail: Rc<Cell<bool>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.set(true);
        notifier
    }

    pub fn chimes(&self) -> usize {
        self.log.borrow().chimes
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.log.borrow().alerts.clone()
    }
}

impl Notifier for RecordingNotifier {
    fn chime(&self) {
        self.log.borrow_mut().chimes += 1;
    }

    fn post(&self, alert: &Alert) -> Result<(), NotifyError> {
        if self.fail.get() {
            return Err(NotifyError::Unavailable("permission denied".into()));
        }
        self.log.borrow_mut().alerts.push(alert.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Records {
    config: Option<TimerConfiguration>,
    progress: Option<CycleProgress>,
}

/// Shared in-memory store; clones see the same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Rc<RefCell<Records>>,
    fail: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn with_config(config: TimerConfiguration) -> Self {
        let store = Self::default();
        store.records.borrow_mut().config = Some(config);
        store
    }

    /// A store whose every read and write fails.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.fail.set(true);
        store
    }

    pub fn set_progress(&self, progress: CycleProgress) {
        self.records.borrow_mut().progress = Some(progress);
    }

    pub fn saved_config(&self) -> Option<TimerConfiguration> {
        self.records.borrow().config.clone()
    }

    pub fn saved_progress(&self) -> Option<CycleProgress> {
        self.records.borrow().progress.clone()
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.fail.get() {
            return Err(DatabaseError::DirectoryCreation(PathBuf::from("/unavailable")));
        }
        Ok(())
    }
}

impl ConfigStore for MemoryStore {
    fn load_config(&self) -> Result<TimerConfiguration, DatabaseError> {
        self.check()?;
        Ok(self.records.borrow().config.clone().unwrap_or_default())
    }

    fn save_config(&self, config: &TimerConfiguration) -> Result<(), DatabaseError> {
        self.check()?;
        self.records.borrow_mut().config = Some(config.clone());
        Ok(())
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self) -> Result<CycleProgress, DatabaseError> {
        self.check()?;
        Ok(self.records.borrow().progress.clone().unwrap_or_default())
    }

    fn save_progress(&self, progress: &CycleProgress) -> Result<(), DatabaseError> {
        self.check()?;
        self.records.borrow_mut().progress = Some(progress.clone());
        Ok(())
    }
}
