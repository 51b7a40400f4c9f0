//! States and pure transition functions of the payment flow.
//!
//! Each function maps one received event (or a timeout) to the action the
//! terminal takes. None of them touch devices, so every transition and its
//! guard is testable on its own.

use crate::error::AbortReason;
use crate::event::{CardId, Event, Key, KeyRole};

/// High-level state of the terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SystemState {
    /// Idle, waiting indefinitely for any event
    #[default]
    Sleeping,

    /// Menu shown, waiting for a choice
    Waiting,

    /// Collecting amount, card and PIN
    CreatePayment,

    /// Signing and submitting the request
    MakePayment,

    /// Showing the server's answer
    CheckPayment,

    /// Link restored after a connectivity loss
    WifiReconnected,
}

/// Result of one payment sub-step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step filled its part of the payment
    Completed,

    /// Step ended early; the remaining steps are skipped
    Aborted(AbortReason),
}

/// Result of one payment attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Request reached the transport; `accepted` is the server verdict
    Submitted {
        /// Server reported success
        accepted: bool,
    },

    /// A sub-step aborted before anything was sent
    Aborted(AbortReason),
}

/// What an event means while sleeping.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SleepAction {
    /// Any key wakes the terminal into the menu
    OpenMenu,

    /// Link lost; run the reconnection flow
    Reconnect,

    /// No effect at this level
    Ignore,
}

/// What an event (or its absence) means while the menu is shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Start a payment
    NewPayment,

    /// Back to sleep (cancel key or timeout)
    Close,

    /// Link lost; reconnect, then back to sleep
    Reconnect,

    /// Keep waiting
    Ignore,
}

/// Event as seen by a payment sub-step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    /// Keypad key
    Key(Key),

    /// Card identifier decoded
    Card(CardId),

    /// Card present but unreadable
    ScanFailed,

    /// Link lost
    LinkLost,

    /// Nothing arrived within the wait window
    Timeout,

    /// Irrelevant event (link restored)
    Ignore,
}

/// How the card step ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardStep {
    /// Card identifier received
    Scanned(CardId),

    /// Card presented but rejected by the reader
    Unreadable,

    /// Cancel key
    Cancelled,

    /// Link lost
    LinkLost,

    /// No card within the wait window
    Timeout,
}

/// Transition out of [`SystemState::Sleeping`].
pub fn on_sleeping(event: &Event) -> SleepAction {
    match event {
        Event::KeyPress(_) => SleepAction::OpenMenu,
        Event::ConnectivityChanged { connected: false } => SleepAction::Reconnect,
        _ => SleepAction::Ignore,
    }
}

/// Transition out of [`SystemState::Waiting`]. `None` is a timeout.
pub fn on_menu(event: Option<&Event>) -> MenuAction {
    match event {
        None => MenuAction::Close,
        Some(Event::KeyPress(key)) => match key.role() {
            KeyRole::Accept => MenuAction::NewPayment,
            KeyRole::Cancel => MenuAction::Close,
            _ => MenuAction::Ignore,
        },
        Some(Event::ConnectivityChanged { connected: false }) => MenuAction::Reconnect,
        Some(_) => MenuAction::Ignore,
    }
}

/// Classify what a sub-step received. `None` is a timeout.
pub fn step_input(event: Option<Event>) -> StepInput {
    match event {
        None => StepInput::Timeout,
        Some(Event::KeyPress(key)) => StepInput::Key(key),
        Some(Event::CardScanned(id)) => StepInput::Card(id),
        Some(Event::ScanFailed) => StepInput::ScanFailed,
        Some(Event::ConnectivityChanged { connected: false }) => StepInput::LinkLost,
        Some(Event::ConnectivityChanged { connected: true }) => StepInput::Ignore,
    }
}

/// Card step transition. `None` means keep waiting.
pub fn on_card_step(input: StepInput) -> Option<CardStep> {
    match input {
        StepInput::Card(id) => Some(CardStep::Scanned(id)),
        StepInput::ScanFailed => Some(CardStep::Unreadable),
        StepInput::Key(key) if key.role() == KeyRole::Cancel => Some(CardStep::Cancelled),
        StepInput::LinkLost => Some(CardStep::LinkLost),
        StepInput::Timeout => Some(CardStep::Timeout),
        StepInput::Key(_) | StepInput::Ignore => None,
    }
}
