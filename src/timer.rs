//! Countdown timer driving each game phase.
//!
//! The timer measures real elapsed time between ticks through an injected
//! [`Clock`], so a stalled runtime produces one large delta on the next tick
//! rather than gradual catch-up. Control edges (pause, stop, reset) always
//! abort the pending ticker task before anything else runs, so two tick
//! chains can never race on the same state.

use crate::clock::Clock;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Callback invoked with the current value on every tick.
pub type TickFn = dyn Fn(f64) + Send + Sync;
/// Callback invoked when the countdown reaches zero. Fires at most once
/// between resets.
pub type CompleteFn = dyn Fn() + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerState {
    /// Seconds remaining; negative while in overtime.
    pub time: f64,
    pub is_running: bool,
    pub is_paused: bool,
    pub is_overtime: bool,
}

#[derive(Debug, Clone)]
pub struct TimerConfig {
    pub initial_seconds: f64,
    /// Wall-clock tick cadence: 1s in normal mode, 100ms when accelerated.
    pub tick_interval: Duration,
    /// When enabled the value continues past zero instead of completing.
    pub enable_overtime: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            initial_seconds: 60.0,
            tick_interval: Duration::from_secs(1),
            enable_overtime: false,
        }
    }
}

#[derive(Debug)]
struct Inner {
    time: f64,
    is_running: bool,
    is_paused: bool,
    is_overtime: bool,
    completed: bool,
    /// Clock reading at the previous tick; re-anchored on start/resume so
    /// paused wall time is not counted.
    last_tick: Option<Duration>,
}

/// A countdown with pause/resume/extend controls and tick/completion
/// callbacks. Must be used inside a tokio runtime.
pub struct Timer {
    config: TimerConfig,
    clock: Arc<dyn Clock>,
    inner: Arc<Mutex<Inner>>,
    on_tick: Option<Arc<TickFn>>,
    on_complete: Option<Arc<CompleteFn>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Timer {
    pub fn new(config: TimerConfig, clock: Arc<dyn Clock>) -> Self {
        let inner = Inner {
            time: config.initial_seconds,
            is_running: false,
            is_paused: false,
            is_overtime: false,
            completed: false,
            last_tick: None,
        };
        Self {
            config,
            clock,
            inner: Arc::new(Mutex::new(inner)),
            on_tick: None,
            on_complete: None,
            ticker: Mutex::new(None),
        }
    }

    pub fn on_tick(mut self, f: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Arc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    pub fn state(&self) -> TimerState {
        let inner = self.inner.lock().unwrap();
        TimerState {
            time: inner.time,
            is_running: inner.is_running,
            is_paused: inner.is_paused,
            is_overtime: inner.is_overtime,
        }
    }

    /// Begin ticking from the current value. No-op while already running.
    pub fn start(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.is_running && !inner.is_paused {
                return;
            }
            inner.is_running = true;
            inner.is_paused = false;
            inner.last_tick = Some(self.clock.now());
        }
        self.spawn_ticker();
    }

    /// Suspend ticking without resetting the value.
    pub fn pause(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if !inner.is_running || inner.is_paused {
                return;
            }
            inner.is_paused = true;
        }
        self.abort_ticker();
    }

    /// Resume a paused countdown. Wall time spent paused is not counted.
    pub fn resume(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if !inner.is_running || !inner.is_paused {
                return;
            }
            inner.is_paused = false;
            inner.last_tick = Some(self.clock.now());
        }
        self.spawn_ticker();
    }

    /// Halt ticking and clear the overtime flag. The value is left as-is.
    pub fn stop(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.is_running = false;
            inner.is_paused = false;
            inner.is_overtime = false;
        }
        self.abort_ticker();
    }

    /// Set the value to `new_time` (or the configured initial value) and
    /// stop ticking. Re-arms the completion callback.
    pub fn reset(&self, new_time: Option<f64>) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.time = new_time.unwrap_or(self.config.initial_seconds);
            inner.is_running = false;
            inner.is_paused = false;
            inner.is_overtime = false;
            inner.completed = false;
            inner.last_tick = None;
        }
        self.abort_ticker();
    }

    /// Add seconds to the current value without touching the run state.
    pub fn extend(&self, seconds: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.time += seconds;
    }

    fn spawn_ticker(&self) {
        self.abort_ticker();

        let inner = Arc::clone(&self.inner);
        let clock = Arc::clone(&self.clock);
        let on_tick = self.on_tick.clone();
        let on_complete = self.on_complete.clone();
        let enable_overtime = self.config.enable_overtime;
        let period = self.config.tick_interval;

        let handle = tokio::spawn(async move {
            enum Outcome {
                Tick(f64),
                Complete,
            }

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick resolves immediately; skip it so the
            // first real tick sees a full period of elapsed time.
            interval.tick().await;

            loop {
                interval.tick().await;
                let now = clock.now();

                let outcome = {
                    let mut inner = inner.lock().unwrap();
                    if !inner.is_running || inner.is_paused {
                        break;
                    }
                    let last = inner.last_tick.unwrap_or(now);
                    let delta = now.saturating_sub(last).as_secs_f64();
                    inner.last_tick = Some(now);

                    let new_time = inner.time - delta;
                    if new_time <= 0.0 && !inner.is_overtime {
                        if enable_overtime {
                            inner.is_overtime = true;
                            inner.time = new_time;
                            Outcome::Tick(new_time)
                        } else {
                            inner.time = 0.0;
                            inner.is_running = false;
                            if inner.completed {
                                break;
                            }
                            inner.completed = true;
                            Outcome::Complete
                        }
                    } else {
                        inner.time = new_time;
                        Outcome::Tick(new_time)
                    }
                };

                match outcome {
                    Outcome::Tick(time) => {
                        if let Some(f) = &on_tick {
                            f(time);
                        }
                    }
                    Outcome::Complete => {
                        if let Some(f) = &on_complete {
                            f();
                        }
                        if let Some(f) = &on_tick {
                            f(0.0);
                        }
                        break;
                    }
                }
            }
        });

        *self.ticker.lock().unwrap() = Some(handle);
    }

    fn abort_ticker(&self) {
        if let Some(handle) = self.ticker.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.abort_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SystemClock};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn fast_config(initial_seconds: f64) -> TimerConfig {
        TimerConfig {
            initial_seconds,
            tick_interval: Duration::from_millis(100),
            enable_overtime: false,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        // One tick (0.1s) of slack: a tick due exactly at a control edge may
        // or may not have been processed first
        assert!(
            (actual - expected).abs() < 0.2,
            "expected ~{expected}, got {actual}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_and_completes_once() {
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        let timer = Timer::new(fast_config(3.0), Arc::new(SystemClock::new()))
            .on_complete(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        timer.start();
        sleep(Duration::from_secs(5)).await;

        let state = timer.state();
        assert_eq!(state.time, 0.0);
        assert!(!state.is_running);
        assert_eq!(completions.load(Ordering::SeqCst), 1);

        // A stray start after completion must not fire the callback again
        timer.start();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_excludes_elapsed_wall_time() {
        let timer = Timer::new(fast_config(10.0), Arc::new(SystemClock::new()));
        timer.start();
        sleep(Duration::from_secs(2)).await;

        timer.pause();
        let paused_at = timer.state().time;
        assert_close(paused_at, 8.0);

        // Five seconds pass while paused; none of it counts
        sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.state().time, paused_at);
        assert!(timer.state().is_paused);

        timer.resume();
        sleep(Duration::from_secs(1)).await;
        assert_close(timer.state().time, 7.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overtime_continues_negative() {
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        let config = TimerConfig {
            enable_overtime: true,
            ..fast_config(1.0)
        };
        let timer = Timer::new(config, Arc::new(SystemClock::new())).on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.start();
        sleep(Duration::from_secs(3)).await;

        let state = timer.state();
        assert!(state.time < 0.0);
        assert!(state.is_overtime);
        assert!(state.is_running);
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        // stop() clears the overtime flag
        timer.stop();
        assert!(!timer.state().is_overtime);
        assert!(!timer.state().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extend_during_overtime_goes_positive_but_stays_latched() {
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        let config = TimerConfig {
            enable_overtime: true,
            ..fast_config(1.0)
        };
        let timer = Timer::new(config, Arc::new(SystemClock::new())).on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.start();
        sleep(Duration::from_secs(2)).await;
        assert!(timer.state().time < 0.0);
        assert!(timer.state().is_overtime);

        // Extending past zero brings the value positive; the overtime flag
        // stays latched until stop/reset, and zero is never "crossed" again
        timer.extend(5.0);
        sleep(Duration::from_secs(1)).await;

        let state = timer.state();
        assert!(state.time > 0.0);
        assert_close(state.time, 3.0);
        assert!(state.is_overtime);
        assert!(state.is_running);
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        timer.stop();
        assert!(!timer.state().is_overtime);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extend_adds_time_without_changing_run_state() {
        let timer = Timer::new(fast_config(5.0), Arc::new(SystemClock::new()));
        timer.extend(10.0);
        let state = timer.state();
        assert_eq!(state.time, 15.0);
        assert!(!state.is_running);

        timer.start();
        sleep(Duration::from_secs(1)).await;
        timer.extend(2.0);
        assert!(timer.state().is_running);
        assert_close(timer.state().time, 16.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_ticking_and_rearms() {
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        let timer = Timer::new(fast_config(2.0), Arc::new(SystemClock::new()))
            .on_complete(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        timer.start();
        sleep(Duration::from_secs(3)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);

        timer.reset(Some(1.0));
        let state = timer.state();
        assert_eq!(state.time, 1.0);
        assert!(!state.is_running && !state.is_paused && !state.is_overtime);

        // Completion re-arms after reset
        timer.start();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_control_round_trip_leaves_no_dangling_ticker() {
        let timer = Timer::new(fast_config(30.0), Arc::new(SystemClock::new()));
        timer.reset(Some(10.0));
        timer.start();
        timer.pause();
        timer.resume();
        timer.stop();

        let stopped_at = timer.state().time;
        sleep(Duration::from_secs(5)).await;
        // No ticker task is left running after stop()
        assert_eq!(timer.state().time, stopped_at);
        assert!(!timer.state().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_noop_while_running() {
        let timer = Timer::new(fast_config(10.0), Arc::new(SystemClock::new()));
        timer.start();
        sleep(Duration::from_secs(2)).await;
        timer.start();
        sleep(Duration::from_secs(1)).await;
        // A redundant start neither resets the value nor forks a second
        // tick chain (which would double the decrement rate)
        assert_close(timer.state().time, 7.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_clock_drives_the_countdown() {
        let clock = Arc::new(ManualClock::new());
        let timer = Timer::new(fast_config(10.0), Arc::clone(&clock) as Arc<dyn Clock>);
        timer.start();

        // The ticker runs but the clock is frozen, so nothing elapses
        sleep(Duration::from_secs(1)).await;
        assert_eq!(timer.state().time, 10.0);

        clock.advance(Duration::from_secs(4));
        sleep(Duration::from_millis(200)).await;
        assert_close(timer.state().time, 6.0);
    }
}
