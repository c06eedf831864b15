//! A battery state-estimation and notification daemon.
//!
//! The heart of the crate is the pure engine under [`engine`]: one call per
//! poll takes the previous [`engine::EngineState`] and a fresh telemetry
//! snapshot, and returns the next state plus the notification events that
//! must fire. Telemetry reading ([`collection`]), the property registry
//! ([`registry`]), the signal bus ([`signals`]), and the indicator pattern
//! controller ([`engine::pattern`]) are collaborators at the edges, and
//! [`daemon`] wires them together once per poll.

#![warn(rust_2018_idioms)]

pub mod collection;
pub mod constants;
pub mod daemon;
pub mod engine;
pub mod event;
pub mod options;
pub mod registry;
pub mod signals;

pub mod utils {
    pub mod error;
    pub mod logging;
}

use std::{
    sync::{mpsc::Sender, Arc, Condvar, Mutex},
    thread,
    time::Duration,
};

use collection::Collector;
use event::BatmonEvent;

/// Spawn the telemetry collection thread.
///
/// Polls the collector once per `poll_rate` and sends each snapshot to the
/// main thread. The termination lock/cvar pair lets shutdown interrupt the
/// inter-poll sleep instead of waiting it out.
pub fn create_collection_thread(
    sender: Sender<BatmonEvent>, termination_ctrl_lock: Arc<Mutex<bool>>,
    termination_ctrl_cvar: Arc<Condvar>, mut collector: Collector, poll_rate: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        collector.init();

        loop {
            // Check once at the very top...
            if let Ok(is_terminated) = termination_ctrl_lock.try_lock() {
                // We don't block here.
                if *is_terminated {
                    drop(is_terminated);
                    break;
                }
            }

            let telemetry = collector.poll();
            if sender.send(BatmonEvent::Update(Box::new(telemetry))).is_err() {
                break;
            }

            if let Ok((is_terminated, _wait_timeout_result)) = termination_ctrl_cvar
                .wait_timeout(termination_ctrl_lock.lock().unwrap(), poll_rate)
            {
                if *is_terminated {
                    drop(is_terminated);
                    break;
                }
            }
        }
    })
}
