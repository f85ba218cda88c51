//! Host Loop - Serializes key events and timer firings
//!
//! Everything scan-related runs on the thread calling `run_loop`: key
//! events arrive over the channel, timers fire between events, and the
//! loop sleeps exactly until whichever comes first.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use super::events::{AppEvent, EventChannel, Wait};
use crate::state::input::{convert_event, route_event};
use crate::state::keyboard::Keyboard;
use crate::state::timers::Timers;

/// Why `run_loop` returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// `AppEvent::Stop` received.
    Stopped,
    /// All senders dropped.
    Closed,
    /// The `running` flag was cleared (e.g. by Ctrl+C).
    Interrupted,
}

/// Drive `keyboard` and `timers` from `channel` until told to stop.
pub fn run_loop(
    keyboard: &Keyboard,
    timers: &Timers,
    channel: &EventChannel,
    running: &AtomicBool,
) -> LoopExit {
    let exit = loop {
        if !running.load(Ordering::SeqCst) {
            break LoopExit::Interrupted;
        }
        match channel.wait(timers.time_until_next()) {
            Wait::Event(AppEvent::Input(event)) => {
                route_event(keyboard, convert_event(event));
            }
            Wait::Event(AppEvent::Stop) => break LoopExit::Stopped,
            Wait::Closed => break LoopExit::Closed,
            Wait::TimedOut => {}
        }
        timers.run_due();
    };
    debug!("host loop exited: {exit:?}");
    exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{on_scan, ScanOptions};
    use crate::state::timers::SystemClock;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc::Sender;
    use std::thread;
    use std::time::Duration;

    fn send_text(tx: &Sender<AppEvent>, text: &str) {
        for c in text.chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            tx.send(AppEvent::Input(Event::Key(key))).unwrap();
        }
    }

    #[test]
    fn test_scan_completes_on_timeout_then_stops() {
        let keyboard = Keyboard::new();
        let timers = Timers::new(SystemClock::new());
        let channel = EventChannel::new();
        let running = AtomicBool::new(true);

        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = calls.clone();
        let options = ScanOptions::new()
            .barcode_prefix("L%")
            .barcode_value_test(".*")
            .scan_duration(Duration::from_millis(10));
        let _listener = on_scan(&keyboard, &timers, &options, move |payload| {
            calls_clone.borrow_mut().push(payload.to_owned());
        })
        .unwrap();

        let tx = channel.sender();
        let producer = thread::spawn(move || {
            send_text(&tx, "L%123abc");
            thread::sleep(Duration::from_millis(100));
            tx.send(AppEvent::Stop).unwrap();
        });

        let exit = run_loop(&keyboard, &timers, &channel, &running);
        producer.join().unwrap();

        assert_eq!(exit, LoopExit::Stopped);
        assert_eq!(*calls.borrow(), vec!["123abc".to_string()]);
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        let keyboard = Keyboard::new();
        let timers = Timers::new(SystemClock::new());
        let channel = EventChannel::new();
        let running = std::sync::Arc::new(AtomicBool::new(true));
        let handle = crate::state::global_keys::setup_global_keys(&keyboard, running.clone());

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        channel.tx.send(AppEvent::Input(Event::Key(key))).unwrap();

        assert_eq!(run_loop(&keyboard, &timers, &channel, &running), LoopExit::Interrupted);
        handle.cleanup();
    }

    #[test]
    fn test_closed_channel_exits() {
        let keyboard = Keyboard::new();
        let timers = Timers::new(SystemClock::new());
        let EventChannel { tx, rx } = EventChannel::new();
        drop(tx);
        let channel = EventChannel {
            tx: std::sync::mpsc::channel().0,
            rx,
        };
        let running = AtomicBool::new(true);

        assert_eq!(run_loop(&keyboard, &timers, &channel, &running), LoopExit::Closed);
    }
}
