//! Wall clock, timestamps and persisted time.
//!
//! The terminal stamps every payment with local time. After a restart the
//! clock is restored from the last persisted value; if there is none, it is
//! synchronized from the network and the result is persisted.

use crate::error::TerminalError;
use chrono::{Datelike, NaiveDateTime, Timelike};
use core::fmt::{self, Write};
use core::time::Duration;

const LOG_TARGET: &str = "pluto::clock";

/// Storage namespace holding the persisted time.
pub const TIME_NAMESPACE: &str = "Storage";

/// Storage key of the persisted time.
pub const TIME_KEY: &str = "timespace";

/// Network sync attempts before giving up.
pub const SYNC_ATTEMPTS: u32 = 10;

/// Upper bound on a single network sync attempt.
pub const SYNC_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(20);

/// Length of a rendered timestamp (`YYYY-MM-DDTHH:MM:SS`).
pub const TIMESTAMP_LEN: usize = 19;

/// Rendered local timestamp.
pub type Timestamp = heapless::String<TIMESTAMP_LEN>;

/// Local wall clock.
pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Key/value storage for the persisted time (NVS on the device).
pub trait TimeStore {
    /// Storage-specific error type
    type Error: fmt::Debug;

    /// Read a value; `Ok(None)` if the key was never written.
    fn load(&mut self, namespace: &str, key: &str) -> Result<Option<i64>, Self::Error>;

    /// Write and commit a value.
    fn store(&mut self, namespace: &str, key: &str, value: i64) -> Result<(), Self::Error>;
}

/// Network time and the system clock setter.
pub trait TimeSource {
    /// Wait up to `timeout` for a network time fix; seconds since the epoch.
    fn sync(&mut self, timeout: Duration) -> Option<i64>;

    /// Set the system clock.
    fn set_time(&mut self, epoch_secs: i64);
}

/// Render `%Y-%m-%dT%H:%M:%S`.
///
/// `None` for years outside `0..=9999`.
pub fn format_timestamp(at: &NaiveDateTime) -> Option<Timestamp> {
    let mut out = Timestamp::new();
    if !(0..=9999).contains(&at.year()) {
        return None;
    }
    write!(
        out,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
    .ok()?;
    Some(out)
}

/// Restore the system clock at startup.
///
/// Uses the persisted time if there is one; otherwise synchronizes from the
/// network and persists the result. Returns the epoch seconds applied.
pub fn restore_wall_clock<S, T>(store: &mut S, source: &mut T) -> Result<i64, TerminalError>
where
    S: TimeStore,
    T: TimeSource,
{
    let stored = store.load(TIME_NAMESPACE, TIME_KEY).map_err(|e| {
        log::error!(target: LOG_TARGET, "unable to open time storage: {:?}", e);
        TerminalError::Storage
    })?;

    match stored {
        Some(epoch) => {
            source.set_time(epoch);
            log::info!(target: LOG_TARGET, "clock restored from storage");
            Ok(epoch)
        }
        None => persist_network_time(store, source),
    }
}

/// Synchronize from the network, set the clock and persist the result.
pub fn persist_network_time<S, T>(store: &mut S, source: &mut T) -> Result<i64, TerminalError>
where
    S: TimeStore,
    T: TimeSource,
{
    let epoch = sync_with_retries(source).ok_or(TerminalError::TimeSync)?;
    source.set_time(epoch);

    store.store(TIME_NAMESPACE, TIME_KEY, epoch).map_err(|e| {
        log::error!(target: LOG_TARGET, "error updating stored time: {:?}", e);
        TerminalError::Storage
    })?;
    log::info!(target: LOG_TARGET, "updated stored time");
    Ok(epoch)
}

fn sync_with_retries<T: TimeSource>(source: &mut T) -> Option<i64> {
    for attempt in 1..=SYNC_ATTEMPTS {
        if let Some(epoch) = source.sync(SYNC_ATTEMPT_TIMEOUT) {
            return Some(epoch);
        }
        log::error!(
            target: LOG_TARGET,
            "unable to update time on try {} within {} seconds",
            attempt,
            SYNC_ATTEMPT_TIMEOUT.as_secs()
        );
    }
    None
}
