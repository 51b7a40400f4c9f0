//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
pub mod fixtures;

pub use fixtures::{Step, TestPlatform};

use fixtures::{
    CountingRng, FixedClock, MockNetwork, NoDelay, RecordingDisplay, RecordingReader,
    RecordingTransport, ScriptedQueue,
};
use pluto_terminal::config::{DeviceProfile, DeviceSecret, Endpoint, MacAddress};
use pluto_terminal::event::{CardId, Event};
use pluto_terminal::terminal::{Peripherals, Terminal};

pub const TEST_SECRET: &str = "test-device-secret";
pub const TEST_HOST: &str = "pay.pluto.test";
pub const TEST_PATH: &str = "/api/v1/payments";

// ============================================================================
// Terminal Creation Helpers
// ============================================================================

pub fn test_profile() -> DeviceProfile {
    DeviceProfile {
        endpoint: Endpoint::new(TEST_HOST, 443, TEST_PATH).unwrap(),
        mac: MacAddress([0x24, 0x0a, 0xc4, 0x12, 0x34, 0xfe]),
        secret: DeviceSecret::new(TEST_SECRET).unwrap(),
    }
}

pub fn test_peripherals(script: Vec<Step>) -> Peripherals<TestPlatform> {
    Peripherals {
        queue: ScriptedQueue::new(script),
        display: RecordingDisplay::default(),
        reader: RecordingReader::default(),
        network: MockNetwork::default(),
        transport: RecordingTransport::default(),
        clock: FixedClock::default(),
        rng: CountingRng::default(),
        delay: NoDelay::default(),
    }
}

/// Terminal with default config, replaying `script`.
pub fn create_terminal(script: Vec<Step>) -> Terminal<TestPlatform> {
    Terminal::new(test_peripherals(script), test_profile())
}

// ============================================================================
// Script Builders
// ============================================================================

/// One delivered key press per character.
pub fn keys(text: &str) -> Vec<Step> {
    text.chars()
        .map(|c| Step::Deliver(Event::key(c).unwrap()))
        .collect()
}

pub fn card(uid: &str) -> Step {
    Step::Deliver(Event::CardScanned(CardId::new(uid).unwrap()))
}

pub fn link_lost() -> Step {
    Step::Deliver(Event::ConnectivityChanged { connected: false })
}

pub fn link_up() -> Step {
    Step::Deliver(Event::ConnectivityChanged { connected: true })
}

/// Concatenate script fragments.
pub fn script(parts: &[&[Step]]) -> Vec<Step> {
    parts.iter().flat_map(|p| p.iter().cloned()).collect()
}

/// Key that wakes the terminal without meaning anything in the menu.
pub fn wake() -> Step {
    Step::Deliver(Event::key('#').unwrap())
}

/// Amount, card and PIN for a complete payment (no menu keys).
pub fn payment_steps(amount: &str, uid: &str, pin: &str) -> Vec<Step> {
    script(&[&keys(amount), &keys("A"), &[card(uid)], &keys(pin), &keys("A")])
}

/// Wake, menu accept, then a complete payment.
pub fn full_payment(amount: &str, uid: &str, pin: &str) -> Vec<Step> {
    script(&[
        &[wake()],
        &keys("A"),
        &keys(amount),
        &keys("A"),
        &[card(uid)],
        &keys(pin),
        &keys("A"),
    ])
}

// ============================================================================
// Assertions
// ============================================================================

pub fn assert_shown(terminal: &Terminal<TestPlatform>, text: &str) {
    let display = &terminal.peripherals().display;
    assert!(
        display.showed(text),
        "expected {:?} on screen, got:\n{:#?}",
        text,
        display.screens()
    );
}

pub fn assert_no_request(terminal: &Terminal<TestPlatform>) {
    let requests = &terminal.peripherals().transport.requests;
    assert!(requests.is_empty(), "unexpected request: {:?}", requests);
}

pub fn assert_reader_paired(terminal: &Terminal<TestPlatform>) {
    let reader = &terminal.peripherals().reader;
    assert_eq!(reader.count("enable"), reader.count("disable"), "{:?}", reader.calls);
    assert!(!reader.is_active());
}
