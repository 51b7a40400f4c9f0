//! Ordered subsystem start-up with rollback.
//!
//! Subsystems start in the order given. If one fails, the ones already
//! running are stopped in reverse order before the failure is reported, so a
//! failed bring-up leaves nothing half-initialized.

use crate::error::TerminalError;

const LOG_TARGET: &str = "pluto::bringup";

/// A device or service with an explicit start/stop lifecycle.
pub trait Subsystem {
    /// Name used in logs and in [`TerminalError::Init`].
    fn name(&self) -> &'static str;

    /// Acquire the resource.
    fn start(&mut self) -> Result<(), TerminalError>;

    /// Release the resource. Only called after a successful `start`.
    fn stop(&mut self);
}

/// Start every subsystem in order.
///
/// On failure, stops the already-started subsystems in reverse order and
/// returns `TerminalError::Init` naming the one that failed.
pub fn bring_up(subsystems: &mut [&mut dyn Subsystem]) -> Result<(), TerminalError> {
    for index in 0..subsystems.len() {
        let Some(subsystem) = subsystems.get_mut(index) else {
            break;
        };
        let name = subsystem.name();

        if let Err(err) = subsystem.start() {
            log::error!(target: LOG_TARGET, "failed to start {}: {}", name, err);
            if let Some(started) = subsystems.get_mut(..index) {
                shut_down(started);
            }
            return Err(TerminalError::Init { subsystem: name });
        }
        log::info!(target: LOG_TARGET, "{} started", name);
    }
    Ok(())
}

/// Stop every subsystem in reverse order.
pub fn shut_down(subsystems: &mut [&mut dyn Subsystem]) {
    for subsystem in subsystems.iter_mut().rev() {
        subsystem.stop();
        log::info!(target: LOG_TARGET, "{} stopped", subsystem.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;
    use core::cell::RefCell;
    use std::format;
    use std::string::String;
    use std::vec::Vec;

    struct Probe<'a> {
        name: &'static str,
        fail: bool,
        log: &'a RefCell<Vec<String>>,
    }

    impl Subsystem for Probe<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn start(&mut self) -> Result<(), TerminalError> {
            self.log.borrow_mut().push(format!("start {}", self.name));
            if self.fail {
                Err(TerminalError::CardReader)
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.log.borrow_mut().push(format!("stop {}", self.name));
        }
    }

    impl<'a> Probe<'a> {
        fn new(name: &'static str, log: &'a RefCell<Vec<String>>) -> Self {
            Self {
                name,
                fail: false,
                log,
            }
        }

        fn failing(name: &'static str, log: &'a RefCell<Vec<String>>) -> Self {
            Self {
                fail: true,
                ..Self::new(name, log)
            }
        }
    }

    #[test]
    fn test_all_start_in_order() {
        let log = RefCell::new(Vec::new());
        let mut a = Probe::new("lcd", &log);
        let mut b = Probe::new("wifi", &log);

        assert!(bring_up(&mut [&mut a, &mut b]).is_ok());
        assert_eq!(*log.borrow(), ["start lcd", "start wifi"]);
    }

    #[test]
    fn test_failure_rolls_back_in_reverse() {
        let log = RefCell::new(Vec::new());
        let mut lcd = Probe::new("lcd", &log);
        let mut wifi = Probe::new("wifi", &log);
        let mut reader = Probe::failing("rc522", &log);
        let mut keypad = Probe::new("keypad", &log);

        let result = bring_up(&mut [&mut lcd, &mut wifi, &mut reader, &mut keypad]);

        assert_eq!(result, Err(TerminalError::Init { subsystem: "rc522" }));
        assert_eq!(
            *log.borrow(),
            ["start lcd", "start wifi", "start rc522", "stop wifi", "stop lcd"]
        );
    }

    #[test]
    fn test_first_failure_stops_nothing() {
        let log = RefCell::new(Vec::new());
        let mut lcd = Probe::failing("lcd", &log);

        assert!(bring_up(&mut [&mut lcd]).is_err());
        assert_eq!(*log.borrow(), ["start lcd"]);
    }

    #[test]
    fn test_shut_down_reverse() {
        let log = RefCell::new(Vec::new());
        let mut a = Probe::new("a", &log);
        let mut b = Probe::new("b", &log);

        shut_down(&mut [&mut a, &mut b]);
        assert_eq!(*log.borrow(), ["stop b", "stop a"]);
    }
}
