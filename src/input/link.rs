//! Connectivity producer.
//!
//! Polls the Wi-Fi link and reports edges as [`Event::ConnectivityChanged`].
//! The monitor starts out assuming the link is up, since bring-up waits for a
//! connection before the terminal starts.

use crate::event::{Event, EventSender, SendError};

const LOG_TARGET: &str = "pluto::input";

/// Read-only view of the link state, safe to use from a producer thread.
pub trait LinkProbe {
    /// Current link state.
    fn is_connected(&self) -> bool;
}

/// Blocking reconnection control used by the terminal.
pub trait Network {
    /// Block until the link is up or `timeout` elapses; true if connected.
    fn wait_for_connection(&mut self, timeout: core::time::Duration) -> bool;
}

/// Emits connectivity events on link state changes.
#[derive(Debug)]
pub struct LinkMonitor<P: LinkProbe, S: EventSender> {
    probe: P,
    sender: S,
    last_connected: bool,
}

impl<P: LinkProbe, S: EventSender> LinkMonitor<P, S> {
    /// Create a monitor; the link is assumed up.
    pub fn new(probe: P, sender: S) -> Self {
        Self {
            probe,
            sender,
            last_connected: true,
        }
    }

    /// Sample the link once and report an edge if the state changed.
    ///
    /// Returns `false` if the queue is closed. A dropped event leaves the
    /// previous state in place so the edge is reported again on the next poll.
    pub fn poll(&mut self) -> bool {
        let connected = self.probe.is_connected();
        if connected == self.last_connected {
            return true;
        }

        match self.sender.send(Event::ConnectivityChanged { connected }) {
            Ok(()) => {
                if connected {
                    log::info!(target: LOG_TARGET, "wifi link up");
                } else {
                    log::warn!(target: LOG_TARGET, "wifi link lost");
                }
                self.last_connected = connected;
                true
            }
            Err(SendError::Full(_)) => {
                log::warn!(target: LOG_TARGET, "wifi monitor: queue full, retrying");
                true
            }
            Err(SendError::Disconnected(_)) => {
                log::error!(target: LOG_TARGET, "wifi monitor: event queue closed");
                false
            }
        }
    }
}
