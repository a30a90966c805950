//! The wall-clock timer label started by the `timer` command.
//!
//! There is at most one ticker thread per [`Timer`]. Re-arming only changes
//! the label parameters. The ticker runs until the `Timer` is dropped; the
//! protocol has no command to stop it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::color::Rgb;

/// Default tick interval
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Label parameters and the last rendered time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub visible: bool,
    pub x: i32,
    pub y: i32,
    pub font_size: i32,
    pub color: Rgb,
    /// `HH:MM:SS`, empty until the first tick
    pub text: String,
}

impl Default for TimerState {
    fn default() -> Self {
        TimerState {
            visible: false,
            x: 0,
            y: 0,
            font_size: 0,
            color: Rgb::BLACK,
            text: String::new(),
        }
    }
}

type Observer = Arc<dyn Fn(&TimerState) + Send + Sync>;

/// State shared with the ticker thread
struct Shared {
    state: Mutex<TimerState>,
    shutdown: AtomicBool,
    ticks: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        // A panicking observer must not take the label down with it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct Timer {
    shared: Arc<Shared>,
    interval: Duration,
    observer: Option<Observer>,
    ticker: Option<JoinHandle<()>>,
    spawns: u64,
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Timer {
            shared: Arc::new(Shared {
                state: Mutex::new(TimerState::default()),
                shutdown: AtomicBool::new(false),
                ticks: AtomicU64::new(0),
            }),
            interval,
            observer: None,
            ticker: None,
            spawns: 0,
        }
    }

    /// Called with the label state after every tick, under the state lock.
    pub fn with_observer<F>(mut self, f: F) -> Self
    where
        F: Fn(&TimerState) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(f));
        self
    }

    /// Set the label parameters, show it, and start ticking if not already.
    pub fn arm(&mut self, x: i32, y: i32, font_size: i32, color: Rgb) {
        {
            let mut state = self.shared.lock();
            state.x = x;
            state.y = y;
            state.font_size = font_size;
            state.color = color;
            state.visible = true;
        }

        if self.ticker.is_none() {
            log::debug!("[TIMER] starting ticker, interval {:?}", self.interval);
            self.ticker = Some(self.spawn_ticker());
            self.spawns += 1;
        } else {
            log::debug!("[TIMER] re-armed at ({}, {})", x, y);
        }
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let observer = self.observer.clone();
        let interval = self.interval;
        std::thread::spawn(move || loop {
            std::thread::sleep(interval);
            if shared.shutdown.load(Ordering::Relaxed) {
                break;
            }
            let mut state = shared.lock();
            state.text = current_time();
            shared.ticks.fetch_add(1, Ordering::Relaxed);
            if let Some(observer) = &observer {
                observer(&state);
            }
        })
    }

    /// Snapshot of the label state
    pub fn state(&self) -> TimerState {
        self.shared.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Number of ticks rendered so far
    pub fn tick_count(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    /// Number of ticker threads ever started by this timer
    pub fn ticker_spawns(&self) -> u64 {
        self.spawns
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new(TICK_INTERVAL)
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        // The ticker notices on its next wake-up; don't block on it here
        self.shared.shutdown.store(true, Ordering::Relaxed);
    }
}

/// Local wall-clock time as `HH:MM:SS`
pub fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
