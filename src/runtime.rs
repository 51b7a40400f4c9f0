//! Thread-backed event queue and producer threads (requires `std`).
//!
//! The queue is a bounded `sync_channel` of [`EVENT_QUEUE_CAPACITY`] slots.
//! Senders never block indefinitely: while the queue is full a send is retried
//! until the configured send timeout expires, after which the event is
//! dropped and returned in [`SendError::Full`].

use crate::event::{EVENT_QUEUE_CAPACITY, Event, EventReceiver, EventSender, SendError};
use crate::input::{KeypadProducer, KeypadScanner, LinkMonitor, LinkProbe};
use std::io;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const LOG_TARGET: &str = "pluto::runtime";

/// Pause between send attempts on a full queue.
const RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Create the event queue.
pub fn event_queue(send_timeout: Duration) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
    (QueueSender { tx, send_timeout }, QueueReceiver { rx })
}

/// Producer handle. Clone one per producer.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: SyncSender<Event>,
    send_timeout: Duration,
}

impl EventSender for QueueSender {
    fn send(&self, event: Event) -> Result<(), SendError> {
        let deadline = Instant::now() + self.send_timeout;
        let mut pending = event;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Disconnected(event)) => {
                    return Err(SendError::Disconnected(event));
                }
                Err(TrySendError::Full(event)) => {
                    if Instant::now() >= deadline {
                        log::warn!(
                            target: LOG_TARGET,
                            "queue full for {:?}, dropping {} event",
                            self.send_timeout,
                            event.kind()
                        );
                        return Err(SendError::Full(event));
                    }
                    pending = event;
                    thread::sleep(RETRY_INTERVAL);
                }
            }
        }
    }
}

/// Consumer handle, owned by the terminal.
#[derive(Debug)]
pub struct QueueReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver for QueueReceiver {
    fn receive(&mut self, timeout: Option<Duration>) -> Option<Event> {
        match timeout {
            None => self.rx.recv().ok(),
            Some(timeout) => self.rx.recv_timeout(timeout).ok(),
        }
    }

    fn reset(&mut self) {
        let dropped = self.rx.try_iter().count();
        if dropped > 0 {
            log::debug!(target: LOG_TARGET, "discarded {} stale events", dropped);
        }
    }
}

/// Run a keypad producer on its own thread.
pub fn spawn_keypad<K>(scanner: K, sender: QueueSender) -> io::Result<JoinHandle<()>>
where
    K: KeypadScanner + Send + 'static,
{
    thread::Builder::new()
        .name("keypad".into())
        .spawn(move || KeypadProducer::new(scanner, sender).run())
}

/// Poll a link probe every `interval` on its own thread.
pub fn spawn_link_monitor<P>(
    probe: P,
    sender: QueueSender,
    interval: Duration,
) -> io::Result<JoinHandle<()>>
where
    P: LinkProbe + Send + 'static,
{
    thread::Builder::new()
        .name("link-monitor".into())
        .spawn(move || {
            let mut monitor = LinkMonitor::new(probe, sender);
            while monitor.poll() {
                thread::sleep(interval);
            }
            log::info!(target: LOG_TARGET, "link monitor stopped");
        })
}
