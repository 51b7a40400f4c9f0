//! Payment state machine.
//!
//! The `Terminal` struct is the single consumer of the event queue. It owns
//! every device handle and drives the menu and payment workflow:
//!
//! ```text
//! Sleeping ──key──▶ Waiting ──A──▶ CreatePayment ──▶ MakePayment ──▶ CheckPayment
//!    ▲                 │             amount/card/PIN                     │
//!    └──── C / timeout ┘◀──────── abort (timeout, cancel, link loss) ◀───┘
//! ```
//!
//! Any sub-step abort skips the remaining steps; only a fully collected
//! [`Payment`] reaches the transport.

pub mod amount;
pub mod payment;
pub mod pin;
pub mod reader;
pub mod state;

pub use amount::{AmountBuffer, AmountInput};
pub use payment::Payment;
pub use pin::{PinBuffer, PinInput};
pub use reader::{CardReader, ReaderSession};
pub use state::{PaymentOutcome, StepOutcome, SystemState};

use crate::clock::{Clock, format_timestamp};
use crate::config::{DefaultConfig, DeviceProfile, Endpoint, TerminalConfig};
use crate::display::{CharDisplay, Frame, render_amount, render_message, render_pin};
use crate::error::{AbortReason, TerminalError};
use crate::event::EventReceiver;
use crate::input::Network;
use crate::security::{HexDigest, RequestBody, RequestFields, Signer, generate_nonce};
use crate::transport::{SignedRequest, Transport};
use core::fmt;
use core::marker::PhantomData;
use core::time::Duration;
use embedded_hal::delay::DelayNs;
use payment::DeviceMac;
use rand_core::RngCore;
use state::{CardStep, MenuAction, SleepAction, StepInput};

const LOG_TARGET: &str = "pluto::terminal";

const AMOUNT_PROMPT: &str = "Enter amount:";
const PIN_HEADER: &str = "Enter PIN";
const PIN_PROMPT: &str = "PIN: ";

/// A payment sub-step.
type Step<P, C> = fn(&mut Terminal<P, C>, &mut Payment) -> Result<StepOutcome, TerminalError>;

/// Device types of one hardware platform.
pub trait Platform {
    /// Consumer side of the event queue
    type Queue: EventReceiver;

    /// Character LCD
    type Display: CharDisplay;

    /// Contactless card reader
    type Reader: CardReader;

    /// Wi-Fi reconnection control
    type Network: Network;

    /// Payment API client
    type Transport: Transport;

    /// Local wall clock
    type Clock: Clock;

    /// Nonce randomness
    type Rng: RngCore;

    /// Blocking delay for message dwell
    type Delay: DelayNs;
}

/// The owned device set handed to [`Terminal::new`].
pub struct Peripherals<P: Platform> {
    /// Event queue receiver
    pub queue: P::Queue,
    /// Display
    pub display: P::Display,
    /// Card reader
    pub reader: P::Reader,
    /// Network control
    pub network: P::Network,
    /// Transport client
    pub transport: P::Transport,
    /// Wall clock
    pub clock: P::Clock,
    /// Random source
    pub rng: P::Rng,
    /// Delay provider
    pub delay: P::Delay,
}

impl<P: Platform> fmt::Debug for Peripherals<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peripherals").finish_non_exhaustive()
    }
}

/// Payment terminal.
///
/// Generic over:
/// - `P`: Platform providing the device types
/// - `C`: TerminalConfig implementation (timeouts, PIN length, currency)
pub struct Terminal<P: Platform, C: TerminalConfig = DefaultConfig> {
    io: Peripherals<P>,
    endpoint: Endpoint,
    mac: DeviceMac,
    signer: Signer,
    state: SystemState,
    previous: SystemState,
    _config: PhantomData<C>,
}

impl<P: Platform, C: TerminalConfig> fmt::Debug for Terminal<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("state", &self.state)
            .field("previous", &self.previous)
            .field("endpoint", &self.endpoint)
            .field("mac", &self.mac)
            .finish_non_exhaustive()
    }
}

impl<P: Platform, C: TerminalConfig> Terminal<P, C> {
    /// Create a terminal from its devices and provisioning profile.
    pub fn new(io: Peripherals<P>, profile: DeviceProfile) -> Self {
        let DeviceProfile {
            endpoint,
            mac,
            secret,
        } = profile;

        Self {
            io,
            endpoint,
            mac: mac.to_text(),
            signer: Signer::new(secret),
            state: SystemState::Sleeping,
            previous: SystemState::Sleeping,
            _config: PhantomData,
        }
    }

    /// Current high-level state.
    pub fn state(&self) -> SystemState {
        self.state
    }

    /// State held before the last transition.
    pub fn previous_state(&self) -> SystemState {
        self.previous
    }

    /// Owned devices.
    pub fn peripherals(&self) -> &Peripherals<P> {
        &self.io
    }

    /// Owned devices (mutable).
    pub fn peripherals_mut(&mut self) -> &mut Peripherals<P> {
        &mut self.io
    }

    /// Serve events until the queue closes.
    ///
    /// Errors from a single iteration are logged and the loop continues.
    pub fn run(&mut self) {
        log::info!(target: LOG_TARGET, "terminal started");
        loop {
            match self.run_once() {
                Ok(true) => {}
                Ok(false) => {
                    log::warn!(target: LOG_TARGET, "event queue closed, terminal stopping");
                    return;
                }
                Err(err) => log::error!(target: LOG_TARGET, "{}", err),
            }
        }
    }

    /// One iteration of the top-level loop.
    ///
    /// Clears the display, returns to [`SystemState::Sleeping`] (discarding
    /// stale events) and blocks for the next event. Returns `Ok(false)` once
    /// the queue can no longer deliver.
    ///
    /// A failed clear is logged but does not skip the wait, so a dead display
    /// cannot turn [`run`](Self::run) into a busy loop.
    pub fn run_once(&mut self) -> Result<bool, TerminalError> {
        if let Err(e) = self.io.display.clear() {
            log::error!(target: LOG_TARGET, "display clear failed: {:?}", e);
        }

        if self.state != SystemState::Sleeping {
            self.io.queue.reset();
            self.set_state(SystemState::Sleeping);
        }

        let Some(event) = self.io.queue.receive(None) else {
            return Ok(false);
        };

        match state::on_sleeping(&event) {
            SleepAction::OpenMenu => self.run_menu()?,
            SleepAction::Reconnect => {
                self.reconnect()?;
            }
            SleepAction::Ignore => {
                log::debug!(target: LOG_TARGET, "ignoring {} event while sleeping", event.kind());
            }
        }
        Ok(true)
    }

    /// Show the menu and act on the choice.
    pub fn run_menu(&mut self) -> Result<(), TerminalError> {
        self.set_state(SystemState::Waiting);
        self.show(&Frame::text("A:New payment", "C:Cancel"))?;

        loop {
            let event = self.io.queue.receive(Some(C::MENU_TIMEOUT));
            match state::on_menu(event.as_ref()) {
                MenuAction::NewPayment => {
                    let outcome = self.create_payment()?;
                    log::info!(target: LOG_TARGET, "payment attempt finished: {:?}", outcome);
                    return Ok(());
                }
                MenuAction::Close => {
                    if event.is_none() {
                        log::info!(target: LOG_TARGET, "menu timed out");
                    }
                    return Ok(());
                }
                MenuAction::Reconnect => {
                    self.reconnect()?;
                    return Ok(());
                }
                MenuAction::Ignore => {}
            }
        }
    }

    /// Collect amount, card and PIN, then sign and submit.
    pub fn create_payment(&mut self) -> Result<PaymentOutcome, TerminalError> {
        self.set_state(SystemState::CreatePayment);
        let mut payment = Payment::default();

        let steps: [Step<P, C>; 3] = [Self::enter_amount, Self::scan_card, Self::enter_pin];
        for step in steps {
            if let StepOutcome::Aborted(reason) = step(self, &mut payment)? {
                return self.abort(reason);
            }
        }

        self.set_state(SystemState::MakePayment);
        let accepted = self.submit(&mut payment)?;
        Ok(PaymentOutcome::Submitted { accepted })
    }

    /// Reconnection flow: wait up to the reconnect window for the link.
    ///
    /// Returns whether the link came back. Losing the link is not an error.
    pub fn reconnect(&mut self) -> Result<bool, TerminalError> {
        log::warn!(
            target: LOG_TARGET,
            "wifi lost, waiting up to {}s for reconnection",
            C::RECONNECT_WINDOW.as_secs()
        );
        self.show(&render_message("Wifi lost...\nReconnecting..."))?;

        if self.io.network.wait_for_connection(C::RECONNECT_WINDOW) {
            self.set_state(SystemState::WifiReconnected);
            log::info!(target: LOG_TARGET, "wifi reconnected");
            self.show(&render_message("Wifi reconnected"))?;
            self.dwell(C::MESSAGE_DWELL);
            Ok(true)
        } else {
            log::error!(
                target: LOG_TARGET,
                "wifi not restored within {}s",
                C::RECONNECT_WINDOW.as_secs()
            );
            self.show(&render_message("No connection"))?;
            self.dwell(C::MESSAGE_DWELL);
            Ok(false)
        }
    }

    fn enter_amount(&mut self, payment: &mut Payment) -> Result<StepOutcome, TerminalError> {
        let mut amount = AmountBuffer::new();
        self.show(&render_amount(AMOUNT_PROMPT, amount.as_str(), C::CURRENCY))?;

        loop {
            let key = match state::step_input(self.io.queue.receive(Some(C::ENTRY_TIMEOUT))) {
                StepInput::Key(key) => key,
                StepInput::Timeout => return Ok(StepOutcome::Aborted(AbortReason::Timeout)),
                StepInput::LinkLost => return self.link_lost(),
                other => {
                    log::debug!(target: LOG_TARGET, "amount entry ignoring {:?}", other);
                    continue;
                }
            };

            match amount.apply(key) {
                AmountInput::Changed => {
                    self.show(&render_amount(AMOUNT_PROMPT, amount.as_str(), C::CURRENCY))?
                }
                AmountInput::Ignored => {}
                AmountInput::Cancel => return Ok(StepOutcome::Aborted(AbortReason::Cancelled)),
                AmountInput::Accept => match amount.finalize() {
                    Some(value) => {
                        log::info!(target: LOG_TARGET, "amount entered: {} {}", value, C::CURRENCY);
                        payment.amount = value;
                        payment.currency = C::CURRENCY;
                        return Ok(StepOutcome::Completed);
                    }
                    None => {
                        self.show(&render_message("Enter an amount"))?;
                        self.dwell(C::CONFIRM_DWELL);
                        self.show(&render_amount(AMOUNT_PROMPT, amount.as_str(), C::CURRENCY))?;
                    }
                },
            }
        }
    }

    fn scan_card(&mut self, payment: &mut Payment) -> Result<StepOutcome, TerminalError> {
        self.show(&render_message("Scan card..."))?;

        // The session disables the reader when the match arm ends
        let waited = match ReaderSession::start(&mut self.io.reader) {
            Ok(_session) => Ok(Self::wait_for_card(&mut self.io.queue)),
            Err(err) => Err(err),
        };

        let step = match waited {
            Ok(step) => step,
            Err(err) => {
                log::error!(target: LOG_TARGET, "card reader enable failed: {:?}", err);
                self.show(&render_message("Card reader\nerror"))?;
                self.dwell(C::MESSAGE_DWELL);
                return Err(TerminalError::CardReader);
            }
        };

        match step {
            CardStep::Scanned(id) => {
                let mut number = heapless::String::new();
                if number.push_str(id.as_str()).is_err() {
                    log::warn!(
                        target: LOG_TARGET,
                        "card identifier too long ({} chars)",
                        id.as_str().len()
                    );
                    self.show(&render_message("Invalid card"))?;
                    self.dwell(C::MESSAGE_DWELL);
                    return Ok(StepOutcome::Aborted(AbortReason::InvalidInput));
                }
                payment.card_number = number;
                self.show(&render_message("Card read"))?;
                self.dwell(C::CONFIRM_DWELL);
                Ok(StepOutcome::Completed)
            }
            CardStep::Unreadable => {
                log::warn!(target: LOG_TARGET, "card scan failed");
                self.show(&render_message("Card read failed"))?;
                self.dwell(C::MESSAGE_DWELL);
                Ok(StepOutcome::Aborted(AbortReason::InvalidInput))
            }
            CardStep::Cancelled => Ok(StepOutcome::Aborted(AbortReason::Cancelled)),
            CardStep::LinkLost => self.link_lost(),
            CardStep::Timeout => Ok(StepOutcome::Aborted(AbortReason::Timeout)),
        }
    }

    fn wait_for_card(queue: &mut P::Queue) -> CardStep {
        loop {
            let input = state::step_input(queue.receive(Some(C::CARD_TIMEOUT)));
            if let Some(step) = state::on_card_step(input) {
                return step;
            }
        }
    }

    fn enter_pin(&mut self, payment: &mut Payment) -> Result<StepOutcome, TerminalError> {
        let mut pin = PinBuffer::new(C::PIN_LENGTH);
        self.show_pin(&pin)?;

        loop {
            let key = match state::step_input(self.io.queue.receive(Some(C::ENTRY_TIMEOUT))) {
                StepInput::Key(key) => key,
                StepInput::Timeout => return Ok(StepOutcome::Aborted(AbortReason::Timeout)),
                StepInput::LinkLost => return self.link_lost(),
                _ => continue,
            };

            match pin.apply(key) {
                PinInput::Changed => self.show_pin(&pin)?,
                PinInput::Ignored => {}
                PinInput::TooShort => {
                    log::info!(
                        target: LOG_TARGET,
                        "PIN accept with {} of {} digits",
                        pin.len(),
                        pin.required()
                    );
                    self.show(&render_message("PIN too short"))?;
                    self.dwell(C::CONFIRM_DWELL);
                    self.io.queue.reset();
                    self.show_pin(&pin)?;
                }
                PinInput::Cancel => return Ok(StepOutcome::Aborted(AbortReason::Cancelled)),
                PinInput::Accept => {
                    payment.pin_code = pin.finalize()?;
                    return Ok(StepOutcome::Completed);
                }
            }
        }
    }

    fn submit(&mut self, payment: &mut Payment) -> Result<bool, TerminalError> {
        self.show(&render_message("Processing..."))?;

        let (body, signature) = match self.seal(payment) {
            Ok(sealed) => sealed,
            Err(err) => {
                log::error!(target: LOG_TARGET, "unable to prepare request: {}", err);
                self.show(&render_message("Payment error"))?;
                self.dwell(C::MESSAGE_DWELL);
                return Err(err);
            }
        };

        log::info!(
            target: LOG_TARGET,
            "submitting {} {} to {}",
            payment.amount,
            payment.currency,
            self.endpoint.host
        );
        let request = SignedRequest {
            endpoint: &self.endpoint,
            signature: &signature,
            body: &body,
        };
        let reply = self.io.transport.send(&request);

        self.set_state(SystemState::CheckPayment);
        if reply.success {
            log::info!(target: LOG_TARGET, "payment accepted: {}", reply.message);
        } else {
            log::warn!(target: LOG_TARGET, "payment rejected: {}", reply.message);
        }
        self.show(&render_message(&reply.message))?;
        self.dwell(C::MESSAGE_DWELL);
        Ok(reply.success)
    }

    /// Stamp the payment and produce its body and signature.
    fn seal(&mut self, payment: &mut Payment) -> Result<(RequestBody, HexDigest), TerminalError> {
        payment.time_stamp = format_timestamp(&self.io.clock.now()).ok_or_else(|| {
            log::error!(target: LOG_TARGET, "clock out of range");
            TerminalError::TimeSync
        })?;
        payment.nonce = generate_nonce(&mut self.io.rng);
        payment.operation = C::OPERATION;
        payment.device_mac_address = self.mac.clone();

        let body = payment.to_body()?;
        let signature = self.signer.sign(&body)?;
        Ok((body, signature))
    }

    fn abort(&mut self, reason: AbortReason) -> Result<PaymentOutcome, TerminalError> {
        log::info!(target: LOG_TARGET, "payment aborted: {}", reason);

        // Link loss and invalid input have already shown their own message
        let message = match reason {
            AbortReason::Timeout => Some("Timed out"),
            AbortReason::Cancelled => Some("Payment\ncancelled"),
            AbortReason::ConnectivityLost | AbortReason::InvalidInput => None,
        };
        if let Some(message) = message {
            self.show(&render_message(message))?;
            self.dwell(C::CONFIRM_DWELL);
        }
        Ok(PaymentOutcome::Aborted(reason))
    }

    fn link_lost(&mut self) -> Result<StepOutcome, TerminalError> {
        self.reconnect()?;
        Ok(StepOutcome::Aborted(AbortReason::ConnectivityLost))
    }

    fn show_pin(&mut self, pin: &PinBuffer) -> Result<(), TerminalError> {
        self.show(&render_pin(PIN_HEADER, PIN_PROMPT, pin.len(), pin.required()))
    }

    fn show(&mut self, frame: &Frame) -> Result<(), TerminalError> {
        self.io.display.draw(frame).map_err(|e| {
            log::error!(target: LOG_TARGET, "display write failed: {:?}", e);
            TerminalError::Display
        })
    }

    fn dwell(&mut self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        self.io.delay.delay_ms(ms);
    }

    fn set_state(&mut self, next: SystemState) {
        if self.state != next {
            log::debug!(target: LOG_TARGET, "state {:?} -> {:?}", self.state, next);
            self.previous = self.state;
            self.state = next;
        }
    }
}
