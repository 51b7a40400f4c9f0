//! Host simulator for the payment terminal.
//!
//! Runs the real state machine against console stand-ins for the hardware:
//!
//! - the LCD is printed to stdout
//! - stdin lines drive the keypad (`12*50A`), the card reader (`card <uid>`)
//!   and the Wi-Fi link (`wifi down`, `wifi up`)
//! - requests go out over plain TCP to the profile's endpoint
//!
//! Usage: `pluto-sim [profile.toml] [time-store.toml]`
//!
//! Profile format:
//!
//! ```toml
//! [endpoint]
//! host = "localhost"
//! port = 8080
//! path = "/api/payments"
//!
//! [device]
//! mac = "24:0A:C4:12:34:FE"
//! secret = "device-secret"
//! ```

use pluto_terminal::TerminalError;
use pluto_terminal::bringup::{Subsystem, bring_up};
use pluto_terminal::clock::{Clock, TimeSource, TimeStore, restore_wall_clock};
use pluto_terminal::config::{
    DefaultConfig, DeviceProfile, DeviceSecret, Endpoint, MacAddress, TerminalConfig,
};
use pluto_terminal::display::{CharDisplay, Frame, render_message};
use pluto_terminal::input::{CardEventBridge, KeypadScanner, LinkProbe, Network};
use pluto_terminal::runtime::{
    QueueReceiver, QueueSender, event_queue, spawn_keypad, spawn_link_monitor,
};
use pluto_terminal::terminal::{CardReader, Peripherals, Platform, Terminal};
use pluto_terminal::transport::{Connector, HttpClient};
use rand_core::{OsRng, TryRngCore, UnwrapErr};
use serde::Deserialize;
use std::convert::Infallible;
use std::error::Error;
use std::io::{self, BufRead};
use std::net::TcpStream;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use std::{env, fs, thread};
use tracing_subscriber::EnvFilter;

const LINK_POLL_INTERVAL: Duration = Duration::from_millis(200);
const IO_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProfileFile {
    endpoint: Endpoint,
    device: DeviceSection,
}

#[derive(Debug, Deserialize)]
struct DeviceSection {
    mac: String,
    secret: DeviceSecret,
}

fn parse_mac(text: &str) -> Result<MacAddress, TerminalError> {
    let mut bytes = [0u8; 6];
    let mut parts = text.split(':');
    for byte in bytes.iter_mut() {
        let part = parts.next().ok_or(TerminalError::InvalidProfile("mac"))?;
        *byte = u8::from_str_radix(part, 16).map_err(|_| TerminalError::InvalidProfile("mac"))?;
    }
    if parts.next().is_some() {
        return Err(TerminalError::InvalidProfile("mac"));
    }
    Ok(MacAddress(bytes))
}

fn load_profile(path: &str) -> Result<DeviceProfile, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let file: ProfileFile = toml::from_str(&text)?;
    Ok(DeviceProfile {
        endpoint: file.endpoint,
        mac: parse_mac(&file.device.mac)?,
        secret: file.device.secret,
    })
}

// ============================================================================
// Devices
// ============================================================================

/// Prints each frame as a boxed 16x2 screen.
#[derive(Debug, Default)]
struct ConsoleDisplay;

impl CharDisplay for ConsoleDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), Infallible> {
        println!("+----------------+");
        for row in frame.rows() {
            println!("|{}|", row);
        }
        println!("+----------------+");
        Ok(())
    }
}

impl Subsystem for ConsoleDisplay {
    fn name(&self) -> &'static str {
        "lcd"
    }

    fn start(&mut self) -> Result<(), TerminalError> {
        self.draw(&render_message("Connecting to\ninternet..."))
            .map_err(|_| TerminalError::Display)
    }

    fn stop(&mut self) {}
}

/// Reader whose scanning state is shared with the console thread.
#[derive(Debug, Clone)]
struct SimReader(Arc<AtomicBool>);

impl CardReader for SimReader {
    type Error = Infallible;

    fn enable(&mut self) -> Result<(), Infallible> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disable(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Wi-Fi link toggled from the console.
#[derive(Debug, Clone)]
struct SimLink(Arc<AtomicBool>);

impl LinkProbe for SimLink {
    fn is_connected(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Network for SimLink {
    fn wait_for_connection(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_connected() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(LINK_POLL_INTERVAL);
        }
        true
    }
}

impl Subsystem for SimLink {
    fn name(&self) -> &'static str {
        "wifi"
    }

    fn start(&mut self) -> Result<(), TerminalError> {
        if self.wait_for_connection(DefaultConfig::RECONNECT_WINDOW) {
            Ok(())
        } else {
            Err(TerminalError::Init { subsystem: "wifi" })
        }
    }

    fn stop(&mut self) {}
}

/// Keys typed on stdin, forwarded by the console thread.
struct ChannelScanner(Receiver<char>);

impl KeypadScanner for ChannelScanner {
    fn next_key(&mut self) -> Option<char> {
        self.0.recv().ok()
    }
}

/// Plain TCP; TLS is out of scope for the simulator.
#[derive(Debug, Default)]
struct TcpConnector;

struct TcpConn(TcpStream);

fn io_kind(err: io::Error) -> embedded_io::ErrorKind {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => embedded_io::ErrorKind::TimedOut,
        io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
        io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
        io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
        io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
        _ => embedded_io::ErrorKind::Other,
    }
}

impl embedded_io::ErrorType for TcpConn {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for TcpConn {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        io::Read::read(&mut self.0, buf).map_err(io_kind)
    }
}

impl embedded_io::Write for TcpConn {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        io::Write::write(&mut self.0, buf).map_err(io_kind)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        io::Write::flush(&mut self.0).map_err(io_kind)
    }
}

impl Connector for TcpConnector {
    type Connection = TcpConn;
    type Error = io::Error;

    fn connect(&mut self, host: &str, port: u16) -> Result<TcpConn, io::Error> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;
        Ok(TcpConn(stream))
    }
}

#[derive(Debug, Default)]
struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> chrono::NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[derive(Debug, Default)]
struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

// ============================================================================
// Time persistence
// ============================================================================

/// TOML file standing in for NVS: one table per namespace.
#[derive(Debug)]
struct FileTimeStore {
    path: String,
}

impl FileTimeStore {
    fn read_table(&self) -> Result<toml::Table, Box<dyn Error>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text.parse::<toml::Table>()?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(toml::Table::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl TimeStore for FileTimeStore {
    type Error = Box<dyn Error>;

    fn load(&mut self, namespace: &str, key: &str) -> Result<Option<i64>, Self::Error> {
        let table = self.read_table()?;
        Ok(table
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .and_then(toml::Value::as_integer))
    }

    fn store(&mut self, namespace: &str, key: &str, value: i64) -> Result<(), Self::Error> {
        let mut table = self.read_table()?;
        let section = table
            .entry(namespace)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if let toml::Value::Table(section) = section {
            section.insert(key.to_string(), toml::Value::Integer(value));
        }
        fs::write(&self.path, toml::to_string(&table)?)?;
        Ok(())
    }
}

/// The host OS keeps the real clock; sync just reads it.
#[derive(Debug, Default)]
struct HostTime;

impl TimeSource for HostTime {
    fn sync(&mut self, _timeout: Duration) -> Option<i64> {
        let since = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        i64::try_from(since.as_secs()).ok()
    }

    fn set_time(&mut self, epoch_secs: i64) {
        log::info!("wall clock reference set to {}", epoch_secs);
    }
}

#[derive(Debug)]
struct TimeService {
    store: FileTimeStore,
    source: HostTime,
}

impl Subsystem for TimeService {
    fn name(&self) -> &'static str {
        "time"
    }

    fn start(&mut self) -> Result<(), TerminalError> {
        restore_wall_clock(&mut self.store, &mut self.source).map(|_| ())
    }

    fn stop(&mut self) {}
}

// ============================================================================
// Console
// ============================================================================

fn spawn_console(
    keys: Sender<char>,
    cards: CardEventBridge<QueueSender>,
    reader_on: Arc<AtomicBool>,
    link_up: Arc<AtomicBool>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new().name("console".into()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let line = line.trim();

            if let Some(uid) = line.strip_prefix("card ") {
                if reader_on.load(Ordering::SeqCst) {
                    cards.on_card_present(uid.trim().as_bytes());
                    cards.on_card_removed();
                } else {
                    println!("(reader is off)");
                }
            } else if line == "wifi down" {
                link_up.store(false, Ordering::SeqCst);
            } else if line == "wifi up" {
                link_up.store(true, Ordering::SeqCst);
            } else {
                for c in line.chars().filter(|c| !c.is_whitespace()) {
                    if keys.send(c).is_err() {
                        return;
                    }
                }
            }
        }
        log::info!("stdin closed, exiting");
        std::process::exit(0);
    })
}

// ============================================================================
// Main
// ============================================================================

struct Sim;

impl Platform for Sim {
    type Queue = QueueReceiver;
    type Display = ConsoleDisplay;
    type Reader = SimReader;
    type Network = SimLink;
    type Transport = HttpClient<TcpConnector>;
    type Clock = LocalClock;
    type Rng = UnwrapErr<OsRng>;
    type Delay = StdDelay;
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let profile_path = args.get(1).map(String::as_str).unwrap_or("pluto.toml");
    let time_path = args.get(2).map(String::as_str).unwrap_or("pluto-time.toml");

    let profile = load_profile(profile_path)?;
    log::info!("loaded profile for {} ({})", profile.mac, profile.endpoint.host);

    let reader_on = Arc::new(AtomicBool::new(false));
    let link_up = Arc::new(AtomicBool::new(true));

    let mut display = ConsoleDisplay;
    let mut wifi = SimLink(link_up.clone());
    let mut time = TimeService {
        store: FileTimeStore {
            path: time_path.to_string(),
        },
        source: HostTime,
    };
    bring_up(&mut [&mut display, &mut wifi, &mut time])?;

    let (sender, receiver) = event_queue(DefaultConfig::SEND_TIMEOUT);
    let (key_tx, key_rx) = mpsc::channel();
    spawn_keypad(ChannelScanner(key_rx), sender.clone())?;
    spawn_link_monitor(wifi.clone(), sender.clone(), LINK_POLL_INTERVAL)?;
    spawn_console(key_tx, CardEventBridge::new(sender), reader_on.clone(), link_up)?;

    let io = Peripherals::<Sim> {
        queue: receiver,
        display,
        reader: SimReader(reader_on),
        network: wifi,
        transport: HttpClient::new(TcpConnector),
        clock: LocalClock,
        rng: OsRng.unwrap_err(),
        delay: StdDelay,
    };

    let mut terminal: Terminal<Sim> = Terminal::new(io, profile);
    terminal.run();
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("pluto-sim: {}", err);
            ExitCode::FAILURE
        }
    }
}
