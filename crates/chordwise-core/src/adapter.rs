//! Glue between an input source and the engine.
//!
//! The engine itself is not synchronized. Hosts that receive key presses on a
//! different thread than the one owning the engine wrap it in a
//! [`SharedEngine`] and feed it through [`run_event_loop`], which handles one
//! event at a time.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::types::KeyPress;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};

pub type SharedEngine = Arc<Mutex<Engine>>;

pub fn shared(config: EngineConfig) -> SharedEngine {
    Arc::new(Mutex::new(Engine::new(config)))
}

/// Dispatches events from `events` until every sender is dropped.
///
/// When `fired` is given, the ids returned by each `handle` call are forwarded
/// on it. Returns the number of events processed.
pub fn run_event_loop(
    engine: &Mutex<Engine>,
    events: &Receiver<KeyPress>,
    fired: Option<&Sender<Vec<String>>>,
) -> usize {
    info!("Starting key event loop...");
    let mut processed = 0;

    for mut event in events.iter() {
        let ids = engine.lock().handle(&mut event);
        processed += 1;

        if let (Some(ids), Some(tx)) = (ids, fired) {
            if tx.send(ids).is_err() {
                warn!("Fired-id receiver dropped; no longer forwarding");
            }
        }
    }

    info!("Key event loop exited after {} events.", processed);
    processed
}

/// Runs [`run_event_loop`] on a dedicated thread.
pub fn spawn_event_loop(
    engine: SharedEngine,
    events: Receiver<KeyPress>,
    fired: Option<Sender<Vec<String>>>,
) -> JoinHandle<usize> {
    std::thread::spawn(move || run_event_loop(&engine, &events, fired.as_ref()))
}
