//! scan-monitor - Print barcode scans typed into this terminal
//!
//! Puts the terminal in raw mode, listens for scanner bursts and prints one
//! payload per line. Ctrl+C exits.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::terminal;
use spark_signals::effect;

use barcode_scan_listener::pipeline::{run_loop, EventChannel, InputThread, LoopExit};
use barcode_scan_listener::state::global_keys::setup_global_keys;
use barcode_scan_listener::{document, on_scan, ScanOptions, SystemClock, Timers};

#[derive(Parser, Debug)]
#[command(name = "scan-monitor", version, about = "Print barcode scans typed into this terminal")]
struct Cli {
    /// TOML file with barcodePrefix, barcodeValueTest, finishScanOnMatch, scanDuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix identifying scanner input (overrides the config file)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Regular expression the payload must match (overrides the config file)
    #[arg(short, long)]
    test: Option<String>,

    /// Finish a scan as soon as the payload matches
    #[arg(short, long)]
    finish_on_match: bool,

    /// Inactivity window in milliseconds (overrides the config file)
    #[arg(short, long)]
    duration: Option<u64>,

    /// Echo every key press to stderr
    #[arg(short, long)]
    echo: bool,
}

impl Cli {
    fn options(&self) -> anyhow::Result<ScanOptions> {
        let mut options = match &self.config {
            Some(path) => ScanOptions::load(path)
                .with_context(|| format!("loading scan options from {}", path.display()))?,
            None => ScanOptions::new(),
        };
        if let Some(prefix) = &self.prefix {
            options = options.barcode_prefix(prefix.as_str());
        }
        if let Some(test) = &self.test {
            options = options.barcode_value_test(test.as_str());
        }
        if self.finish_on_match {
            options = options.finish_scan_on_match(true);
        }
        if let Some(ms) = self.duration {
            options = options.scan_duration(Duration::from_millis(ms));
        }
        Ok(options)
    }
}

/// Leaves raw mode when dropped, including on early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = cli.options()?;

    let keyboard = document();
    let timers = Timers::new(SystemClock::new());
    let running = Arc::new(AtomicBool::new(true));

    let listener = on_scan(&keyboard, &timers, &options, |payload| {
        // Raw mode: move to column 0 explicitly
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{payload}\r\n");
        let _ = stdout.flush();
    })
    .context("registering scan listener")?;
    let global_keys = setup_global_keys(&keyboard, running.clone());

    let stop_echo = cli.echo.then(|| {
        let last = keyboard.last_event_signal();
        effect(move || {
            if let Some(event) = last.get().filter(|event| event.is_press()) {
                eprint!("key {:?} {:?}\r\n", event.key, event.modifiers);
            }
        })
    });

    eprintln!("Listening for scans with prefix {:?}, Ctrl+C to quit", listener.config().prefix());

    let exit = {
        let _raw = RawModeGuard::enable().context("enabling raw mode")?;
        let channel = EventChannel::new();
        let mut input = InputThread::spawn(channel.sender()).context("spawning input thread")?;
        let exit = run_loop(&keyboard, &timers, &channel, &running);
        input.stop();
        exit
    };

    if let Some(stop_echo) = stop_echo {
        stop_echo();
    }
    global_keys.cleanup();
    listener.remove();

    if exit == LoopExit::Closed {
        bail!("terminal input closed");
    }
    Ok(())
}
