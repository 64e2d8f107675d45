//! Background simulation loop

use super::store::GridStore;
use crate::game_of_life::GameOfLifeRules;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A stoppable task that steps the store's grid at a fixed interval.
///
/// The stop signal is checked at the top of every tick and wakes the
/// wait between ticks. A tick that has already started always publishes.
#[derive(Debug)]
pub struct SimulationDriver {
    stop_signal: mpsc::Sender<()>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl SimulationDriver {
    /// Start stepping `store` every `interval`, optionally stopping on its own
    /// after `max_generations` ticks.
    pub fn spawn(
        store: Arc<GridStore>,
        interval: Duration,
        max_generations: Option<u64>,
    ) -> Result<Self> {
        let (stop_signal, stop_receiver) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let loop_running = Arc::clone(&running);

        let thread = thread::Builder::new()
            .name("life-simulation".to_string())
            .spawn(move || {
                let ticks = sim_loop(&store, interval, max_generations, &stop_receiver);
                loop_running.store(false, Ordering::Release);
                ticks
            })
            .context("Failed to spawn simulation thread")?;

        log::debug!("simulation driver started (interval {:?})", interval);
        Ok(Self {
            stop_signal,
            running,
            thread: Some(thread),
        })
    }

    /// Whether the loop is still ticking. Turns false once the loop has exited.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Signal the loop to stop and wait for it; returns the number of ticks run
    pub fn stop(mut self) -> Result<u64> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<u64> {
        // the loop may already have exited after reaching its generation limit
        let _ = self.stop_signal.send(());
        match self.thread.take() {
            Some(thread) => {
                let ticks = thread
                    .join()
                    .map_err(|_| anyhow::anyhow!("Simulation thread panicked"))?;
                log::debug!("simulation driver stopped after {} ticks", ticks);
                Ok(ticks)
            }
            None => Ok(0),
        }
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("{:#}", e);
        }
    }
}

fn stop_requested(receiver: &mpsc::Receiver<()>) -> bool {
    !matches!(receiver.try_recv(), Err(TryRecvError::Empty))
}

fn sim_loop(
    store: &GridStore,
    interval: Duration,
    max_generations: Option<u64>,
    stop_receiver: &mpsc::Receiver<()>,
) -> u64 {
    let mut ticks = 0;

    loop {
        if stop_requested(stop_receiver) || max_generations.is_some_and(|max| ticks >= max) {
            break;
        }

        let current = store.snapshot();
        let next = GameOfLifeRules::step(&current);
        match store.publish_next(next) {
            Ok(frame) => {
                ticks += 1;
                log::trace!(
                    "generation {} published ({} alive)",
                    frame.generation,
                    frame.grid.living_count()
                );
            }
            Err(e) => {
                log::error!("failed to publish generation: {}", e);
                break;
            }
        }

        if max_generations.is_some_and(|max| ticks >= max) {
            break;
        }

        match stop_receiver.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    ticks
}
