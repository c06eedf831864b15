//! Some code around handling events.

use crate::daemon::InfoRequest;
use crate::engine::telemetry::Telemetry;

/// Events sent to the main thread.
#[derive(Debug)]
pub enum BatmonEvent {
    /// A fresh telemetry snapshot from the collection thread.
    Update(Box<Telemetry>),
    /// An on-demand information request from a downstream consumer.
    Request(InfoRequest),
    Terminate,
}
