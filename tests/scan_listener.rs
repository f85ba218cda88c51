//! Registration contract of `on_scan`, driven by a fake clock.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use barcode_scan_listener::{
    on_scan, Keyboard, KeyboardEvent, ManualClock, ScanConfigError, ScanListener, ScanOptions,
    SessionState, Timers,
};
use toml::Value;

struct Page {
    keyboard: Keyboard,
    clock: ManualClock,
    timers: Timers,
}

fn setup() -> Page {
    let clock = ManualClock::new();
    Page {
        keyboard: Keyboard::new(),
        timers: Timers::new(clock.clone()),
        clock,
    }
}

impl Page {
    /// Type `barcode` all at once, then let `idle` pass.
    fn scan_barcode(&self, barcode: &str, idle: Duration) {
        for c in barcode.chars() {
            let event = KeyboardEvent::from_char_code(c as u32).unwrap();
            self.keyboard.dispatch(event);
        }
        self.clock.tick(&self.timers, idle);
    }

    fn listen(&self, options: &ScanOptions) -> (ScanListener, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = calls.clone();
        let listener = on_scan(&self.keyboard, &self.timers, options, move |payload| {
            calls_clone.borrow_mut().push(payload.to_owned());
        })
        .unwrap();
        (listener, calls)
    }

    fn register_err(&self, options: &ScanOptions) -> ScanConfigError {
        let err = on_scan(&self.keyboard, &self.timers, options, |_| {}).unwrap_err();
        assert_eq!(self.keyboard.handler_count(), 0, "no subscription on failure");
        err
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn prefixed(test: &str) -> ScanOptions {
    ScanOptions::new().barcode_prefix("L%").barcode_value_test(test)
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn errors_if_no_barcode_prefix() {
    let page = setup();
    let err = page.register_err(&ScanOptions::new());
    assert_eq!(err.to_string(), "barcodePrefix must be a string");
}

#[test]
fn errors_if_barcode_value_test_is_not_a_pattern() {
    let page = setup();
    let mut options = ScanOptions::new().barcode_prefix("L%");
    options.barcode_value_test = Some(Value::Table(Default::default()));
    let err = page.register_err(&options);
    assert_eq!(err.to_string(), "barcodeValueTest must be a regular expression");
}

#[test]
fn errors_if_finish_scan_on_match_is_not_a_boolean() {
    let page = setup();
    let mut options = prefixed(".*");
    options.finish_scan_on_match = Some(Value::Integer(3));
    let err = page.register_err(&options);
    assert_eq!(err.to_string(), "finishScanOnMatch must be a boolean");
}

#[test]
fn errors_if_scan_duration_is_not_a_number() {
    let page = setup();
    let mut options = prefixed(".*");
    options.scan_duration = Some(Value::String("500".into()));
    let err = page.register_err(&options);
    assert_eq!(err.to_string(), "scanDuration must be a number");
}

#[test]
fn errors_if_no_handler() {
    let page = setup();
    let err = ScanListener::builder(&prefixed(".*"))
        .register(&page.keyboard, &page.timers)
        .unwrap_err();
    assert_eq!(err.to_string(), "scanHandler must be a function");
    assert_eq!(page.keyboard.handler_count(), 0);
}

// =============================================================================
// PREFIX AND VALUE TEST
// =============================================================================

#[test]
fn calls_handler_for_scanned_barcode_with_prefix() {
    let page = setup();
    let (_listener, calls) = page.listen(&prefixed(".*"));
    page.scan_barcode("L%123abc", ms(100));
    assert_eq!(*calls.borrow(), vec!["123abc"]);
}

#[test]
fn does_not_call_handler_if_prefix_differs() {
    let page = setup();
    let (_listener, calls) = page.listen(&prefixed(".*"));
    page.scan_barcode("C%123abc", ms(100));
    assert!(calls.borrow().is_empty());
}

#[test]
fn calls_handler_if_value_passes_test() {
    let page = setup();
    let (_listener, calls) = page.listen(&prefixed("^123.*"));
    page.scan_barcode("L%123abc", ms(100));
    assert_eq!(*calls.borrow(), vec!["123abc"]);
}

#[test]
fn does_not_call_handler_if_value_fails_test() {
    let page = setup();
    let (_listener, calls) = page.listen(&prefixed("^123.*"));
    page.scan_barcode("L%213abc", ms(100));
    assert!(calls.borrow().is_empty());
}

#[test]
fn supports_empty_value() {
    let page = setup();
    let (_listener, calls) = page.listen(&prefixed("^$"));
    page.scan_barcode("L%", ms(100));
    assert_eq!(*calls.borrow(), vec![""]);
}

// =============================================================================
// FINISH SCAN ON MATCH
// =============================================================================

#[test]
fn finishes_immediately_on_match() {
    let page = setup();
    let (_listener, calls) = page.listen(&prefixed("^123.*").finish_scan_on_match(true));
    page.scan_barcode("L%123blabla", ms(10));
    assert_eq!(*calls.borrow(), vec!["123"]);
}

#[test]
fn scans_again_without_finish_on_match() {
    let page = setup();
    let options = prefixed("^123.*")
        .finish_scan_on_match(false)
        .scan_duration(ms(50));
    let (_listener, calls) = page.listen(&options);

    page.scan_barcode("L%123ab", ms(100));
    page.scan_barcode("L%123cd", ms(100));
    assert_eq!(*calls.borrow(), vec!["123ab", "123cd"]);
}

#[test]
fn scans_again_with_finish_on_match() {
    let page = setup();
    let options = prefixed("^123.*")
        .finish_scan_on_match(true)
        .scan_duration(ms(50));
    let (_listener, calls) = page.listen(&options);

    page.scan_barcode("L%123ab", ms(10));
    page.scan_barcode("L%123cd", ms(10));
    assert_eq!(*calls.borrow(), vec!["123", "123"]);
}

// =============================================================================
// SCAN DURATION AND LIFECYCLE
// =============================================================================

#[test]
fn does_not_call_handler_before_scan_duration_elapses() {
    let page = setup();
    let (listener, calls) = page.listen(&prefixed(".*").scan_duration(ms(25)));

    page.scan_barcode("L%123abc", ms(24));
    assert!(calls.borrow().is_empty());
    assert_eq!(listener.state(), SessionState::Accumulating);

    page.clock.tick(&page.timers, ms(1));
    assert_eq!(*calls.borrow(), vec!["123abc"]);
}

#[test]
fn discarded_session_leaves_listener_idle() {
    let page = setup();
    let (listener, calls) = page.listen(&prefixed("^123"));

    page.scan_barcode("C%999", ms(100));
    assert_eq!(listener.state(), SessionState::Idle);
    assert_eq!(listener.buffered(), "");
    assert_eq!(page.timers.pending(), 0);

    page.scan_barcode("L%123", ms(100));
    assert_eq!(*calls.borrow(), vec!["123"]);
}

#[test]
fn removes_the_listener() {
    let page = setup();
    let (listener, calls) = page.listen(&prefixed(".*"));

    page.scan_barcode("L%123abc", ms(100));
    assert_eq!(*calls.borrow(), vec!["123abc"]);
    calls.borrow_mut().clear();

    listener.remove();
    page.scan_barcode("L%123abc", ms(100));
    assert!(calls.borrow().is_empty());
}

#[test]
fn remove_mid_scan_prevents_timeout_firing() {
    let page = setup();
    let (listener, calls) = page.listen(&prefixed(".*"));

    page.scan_barcode("L%12", ms(50));
    listener.remove();
    page.clock.tick(&page.timers, ms(100));
    assert!(calls.borrow().is_empty());
}

#[test]
fn listeners_track_sessions_independently() {
    let page = setup();
    let (_location, locations) = page.listen(&prefixed(".*"));
    let (_crates_listener, crates) = page.listen(
        &ScanOptions::new()
            .barcode_prefix("C%")
            .barcode_value_test("^[0-9]+$")
            .finish_scan_on_match(true),
    );

    page.scan_barcode("C%42", ms(100));
    page.scan_barcode("L%7", ms(100));

    assert_eq!(*locations.borrow(), vec!["7"]);
    assert_eq!(*crates.borrow(), vec!["4"]);
}
