//! `log`-crate front end over a [`LogBackend`].
//!
//! The `log` facade hands records to a shared `&'static` logger, so the
//! backend sits behind a critical-section mutex. Records are rendered as
//! `<LEVEL> target: message\r\n`. Emission is best-effort all the way
//! down: backend errors are swallowed, and a reentrant record (logging
//! from the notification path while one is being emitted) is dropped
//! rather than deadlocking.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use log::{Log, Metadata, Record};

use crate::backend::LogBackend;

pub struct UsbLogger<B> {
    backend: Mutex<RefCell<B>>,
}

impl<B: LogBackend> UsbLogger<B> {
    pub const fn new(backend: B) -> Self {
        Self {
            backend: Mutex::new(RefCell::new(backend)),
        }
    }

    /// Runs `f` against the wrapped backend, e.g. to initialize it during
    /// startup. Must not be called from inside an emit.
    pub fn with<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        critical_section::with(|cs| f(&mut self.backend.borrow_ref_mut(cs)))
    }

    /// Fatal-path hook: puts the backend into panic mode so the handler
    /// that called it can keep making progress without interrupts.
    pub fn panic_set(&self) {
        critical_section::with(|cs| {
            if let Ok(mut backend) = self.backend.borrow(cs).try_borrow_mut() {
                backend.panic_set();
            }
        });
    }
}

struct Line<'a, 'b>(&'a Record<'b>);

impl fmt::Display for Line<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}> {}: {}\r\n",
            self.0.level(),
            self.0.target(),
            self.0.args()
        )
    }
}

impl<B: LogBackend + Send> Log for UsbLogger<B> {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        critical_section::with(|cs| {
            if let Ok(mut backend) = self.backend.borrow(cs).try_borrow_mut() {
                let _ = backend.put(&Line(record));
            }
        });
    }

    fn flush(&self) {
        critical_section::with(|cs| {
            if let Ok(mut backend) = self.backend.borrow(cs).try_borrow_mut() {
                let _ = backend.flush();
            }
        });
    }
}
