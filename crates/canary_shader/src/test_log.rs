//! Test logger: forwards to `env_logger` and lets a test collect the records
//! emitted on its own thread.

use std::{cell::RefCell, sync::OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CaptureLogger {
    inner: env_logger::Logger,
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<(Level, String)>>> = const { RefCell::new(None) };
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|captured| {
            if let Some(records) = captured.borrow_mut().as_mut() {
                records.push((record.level(), record.args().to_string()));
            }
        });
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

pub(crate) fn init() {
    let logger = LOGGER.get_or_init(|| CaptureLogger {
        inner: env_logger::builder().is_test(true).build(),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
}

/// Runs `f` and returns what it logged on this thread.
pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    init();
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    let result = f();
    let records = CAPTURED.with(|captured| captured.borrow_mut().take()).unwrap_or_default();
    (result, records)
}
