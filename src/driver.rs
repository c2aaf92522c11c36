//! Wires the timer engine to the phase state machine: one countdown per
//! phase, advancement on expiry, and host controls over the armed timer.

use crate::clock::Clock;
use crate::events::GameEvent;
use crate::state::GameState;
use crate::timer::{Timer, TimerConfig};
use crate::types::GamePhase;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

pub struct GameDriver {
    state: GameState,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    current: Arc<Mutex<Option<Arc<Timer>>>>,
}

/// Host controls targeting whichever timer is currently armed. Between
/// phases (or after game over) the controls are no-ops.
#[derive(Clone)]
pub struct DriverHandle {
    current: Arc<Mutex<Option<Arc<Timer>>>>,
}

impl DriverHandle {
    pub fn pause(&self) {
        if let Some(timer) = self.timer() {
            timer.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(timer) = self.timer() {
            timer.resume();
        }
    }

    pub fn extend(&self, seconds: f64) {
        if let Some(timer) = self.timer() {
            timer.extend(seconds);
        }
    }

    fn timer(&self) -> Option<Arc<Timer>> {
        self.current.lock().unwrap().clone()
    }
}

impl GameDriver {
    pub fn new(state: GameState, clock: Arc<dyn Clock>, tick_interval: Duration) -> Self {
        Self {
            state,
            clock,
            tick_interval,
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn handle(&self) -> DriverHandle {
        DriverHandle {
            current: Arc::clone(&self.current),
        }
    }

    /// Run the game to completion: arm a timer for the current phase, wait
    /// for it to expire or for the phase to change underneath us (the
    /// expedited vote path), then move on. Returns once GAME_OVER is
    /// reached.
    pub async fn run(&self) {
        loop {
            let mut events = self.state.subscribe();
            let phase = self.state.phase().await;
            let Some(duration) = self.state.config.phase_duration(phase) else {
                break;
            };

            tracing::debug!(?phase, duration, "Arming phase timer");
            // Seed the cached value so snapshots show the full countdown
            // before the first tick lands
            self.state.record_tick(duration);

            let (done_tx, mut done_rx) = mpsc::unbounded_channel();
            let timer = Arc::new(
                Timer::new(
                    TimerConfig {
                        initial_seconds: duration,
                        tick_interval: self.tick_interval,
                        enable_overtime: false,
                    },
                    Arc::clone(&self.clock),
                )
                .on_tick({
                    let state = self.state.clone();
                    move |seconds| state.record_tick(seconds)
                })
                .on_complete(move || {
                    let _ = done_tx.send(());
                }),
            );
            timer.start();
            *self.current.lock().unwrap() = Some(Arc::clone(&timer));

            let expired = tokio::select! {
                _ = done_rx.recv() => true,
                _ = wait_for_phase_change(&mut events, phase) => false,
            };

            timer.stop();
            *self.current.lock().unwrap() = None;

            // Advance from the phase this timer was armed for. If an
            // expedited vote moved the game on while the timer was draining,
            // the stale transition is rejected and the expedite wins.
            if expired {
                if let Err(e) = self.state.advance_phase_from(phase).await {
                    tracing::debug!("Phase moved before timer expiry landed: {e}");
                }
            }
        }

        tracing::info!("Game over, phase driver finished");
    }
}

async fn wait_for_phase_change(events: &mut broadcast::Receiver<GameEvent>, current: GamePhase) {
    loop {
        match events.recv().await {
            Ok(GameEvent::Phase { phase, .. }) if phase != current => return,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
