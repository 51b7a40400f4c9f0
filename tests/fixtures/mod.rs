//! Test fixtures and utilities for pluto-terminal testing.
//!
//! Provides:
//! - `ScriptedQueue`: EventReceiver replaying a fixed script of events and timeouts
//! - `RecordingDisplay`, `RecordingReader`, `RecordingTransport`: devices that log every call
//! - `MockNetwork`, `FixedClock`, `CountingRng`, `NoDelay`: deterministic stand-ins
//! - `TestPlatform`: Platform wiring all of the above together

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use pluto_terminal::clock::Clock;
use pluto_terminal::display::{CharDisplay, Frame};
use pluto_terminal::event::{Event, EventReceiver};
use pluto_terminal::input::Network;
use pluto_terminal::terminal::{CardReader, Platform};
use pluto_terminal::transport::{SignedRequest, Transport, TransportReply};
use std::collections::VecDeque;
use std::time::Duration;

// ============================================================================
// ScriptedQueue - Test EventReceiver
// ============================================================================

/// One entry of a queue script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Event delivered by the next receive
    Deliver(Event),

    /// Next receive times out
    Timeout,

    /// Event already queued; dropped by the next reset
    Stale(Event),
}

/// Replays a script. Once the script is exhausted every receive returns
/// `None`, which the terminal sees as a timeout (or a closed queue when
/// waiting without one).
#[derive(Debug, Default)]
pub struct ScriptedQueue {
    script: VecDeque<Step>,

    /// Timeout passed to each receive call
    pub waits: Vec<Option<Duration>>,

    /// Number of reset calls
    pub resets: usize,
}

impl ScriptedQueue {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: script.into(),
            ..Default::default()
        }
    }

    /// Entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl EventReceiver for ScriptedQueue {
    fn receive(&mut self, timeout: Option<Duration>) -> Option<Event> {
        self.waits.push(timeout);
        match self.script.pop_front()? {
            Step::Deliver(event) | Step::Stale(event) => Some(event),
            Step::Timeout => None,
        }
    }

    fn reset(&mut self) {
        self.resets += 1;
        while matches!(self.script.front(), Some(Step::Stale(_))) {
            self.script.pop_front();
        }
    }
}

// ============================================================================
// RecordingDisplay
// ============================================================================

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub frames: Vec<Frame>,
    pub clears: usize,
    pub fail: bool,
}

impl RecordingDisplay {
    /// Every frame drawn, as `"row0\nrow1"` with trailing padding removed.
    pub fn screens(&self) -> Vec<String> {
        self.frames
            .iter()
            .map(|f| format!("{}\n{}", f.row(0).trim_end(), f.row(1).trim_end()))
            .collect()
    }

    /// True if any frame contained `text` on either row.
    pub fn showed(&self, text: &str) -> bool {
        self.frames
            .iter()
            .any(|f| f.row(0).contains(text) || f.row(1).contains(text))
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl CharDisplay for RecordingDisplay {
    type Error = &'static str;

    fn clear(&mut self) -> Result<(), Self::Error> {
        if self.fail {
            return Err("i2c nack");
        }
        self.clears += 1;
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        if self.fail {
            return Err("i2c nack");
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}

// ============================================================================
// RecordingReader
// ============================================================================

#[derive(Debug, Default)]
pub struct RecordingReader {
    /// "enable" / "disable" in call order
    pub calls: Vec<&'static str>,
    pub fail_enable: bool,
}

impl RecordingReader {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    /// True if the reader is currently scanning.
    pub fn is_active(&self) -> bool {
        self.calls.last() == Some(&"enable")
    }
}

impl CardReader for RecordingReader {
    type Error = &'static str;

    fn enable(&mut self) -> Result<(), Self::Error> {
        if self.fail_enable {
            return Err("rc522 not responding");
        }
        self.calls.push("enable");
        Ok(())
    }

    fn disable(&mut self) {
        self.calls.push("disable");
    }
}

// ============================================================================
// MockNetwork
// ============================================================================

#[derive(Debug)]
pub struct MockNetwork {
    /// Result of every wait
    pub reconnects: bool,

    /// Timeout passed to each wait
    pub waits: Vec<Duration>,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self {
            reconnects: true,
            waits: Vec::new(),
        }
    }
}

impl Network for MockNetwork {
    fn wait_for_connection(&mut self, timeout: Duration) -> bool {
        self.waits.push(timeout);
        self.reconnects
    }
}

// ============================================================================
// RecordingTransport
// ============================================================================

/// Owned copy of a request the terminal sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub host: String,
    pub path: String,
    pub signature: String,
    pub body: String,
}

#[derive(Debug)]
pub struct RecordingTransport {
    pub requests: Vec<CapturedRequest>,
    pub reply: TransportReply,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            reply: TransportReply::accepted("Payment accepted"),
        }
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, request: &SignedRequest<'_>) -> TransportReply {
        self.requests.push(CapturedRequest {
            host: request.endpoint.host.to_string(),
            path: request.endpoint.path.to_string(),
            signature: request.signature.to_string(),
            body: request.body.to_string(),
        });
        self.reply.clone()
    }
}

// ============================================================================
// Clock, RNG, delay
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Default for FixedClock {
    fn default() -> Self {
        let at = NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(14, 30, 5))
            .unwrap();
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Deterministic RNG: returns 42, 43, 44, ...
#[derive(Debug)]
pub struct CountingRng(pub u32);

impl Default for CountingRng {
    fn default() -> Self {
        Self(42)
    }
}

impl rand_core::RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.0;
        self.0 = self.0.wrapping_add(1);
        value
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for b in dst {
            *b = self.next_u32() as u8;
        }
    }
}

/// Delay that returns immediately and records the requested time.
#[derive(Debug, Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// ============================================================================
// TestPlatform
// ============================================================================

#[derive(Debug)]
pub struct TestPlatform;

impl Platform for TestPlatform {
    type Queue = ScriptedQueue;
    type Display = RecordingDisplay;
    type Reader = RecordingReader;
    type Network = MockNetwork;
    type Transport = RecordingTransport;
    type Clock = FixedClock;
    type Rng = CountingRng;
    type Delay = NoDelay;
}
