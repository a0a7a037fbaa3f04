//! USB log backend: takes formatted records from a logging front end and
//! delivers their text to the host over a CDC-ACM virtual serial port.
//!
//! The backend runs on a single cooperative thread. Transfer completions
//! and connection state arrive through the transport's event queue, so the
//! emit path pumps that queue while it waits; it never parks on a
//! scheduler, because there is none. Output is best-effort throughout:
//! records are dropped while no host has the port open, and once the
//! backend enters panic mode the transmit path stays down for good.

mod bridge;

use core::fmt;

use self::bridge::FormatBridge;

use crate::lifecycle::Lifecycle;
use crate::transport::signals::ChannelSignals;
use crate::transport::{EventPump, SerialPort};

/// Lifecycle of one backend instance. `Panicked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendState {
    Uninitialized,
    Initialized,
    Panicked,
}

/// Failures the backend escalates to its caller. All of them are checked
/// synchronously; nothing is queued or deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendError<E> {
    /// A stack or clock call failed during bring-up.
    Stack(E),
    /// A chunk submission was rejected mid-record.
    Transport(E),
    /// The record's own renderer reported an error.
    Format,
}

/// A record the front end hands in for one emit call. The backend never
/// keeps it past that call; rendering stays with the front end, which
/// implements [`core::fmt::Display`] for its record type and gets this
/// trait for free.
pub trait LogRecord {
    fn render(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

impl<T: fmt::Display + ?Sized> LogRecord for T {
    fn render(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", self)
    }
}

/// The fixed backend surface a log front end drives.
pub trait LogBackend {
    type Error;

    /// Emit one record. May cooperatively block until its transfers
    /// complete.
    fn put(&mut self, record: &dyn LogRecord) -> Result<(), Self::Error>;

    /// Push out buffered output. For this transport it does nothing, see
    /// [`UsbLogBackend`].
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Switch to panic mode: give up the transmit path so the fatal-error
    /// handler is never left waiting on interrupts that no longer fire.
    fn panic_set(&mut self);
}

/// Log backend over a USB CDC-ACM port.
///
/// `N` is the scratch capacity records render through; a record longer than
/// `N` bytes is transmitted in multiple passes. The signal cell is shared
/// with the transport integration, which feeds it from its notification
/// path.
pub struct UsbLogBackend<'s, L, P, const N: usize> {
    lifecycle: L,
    port: P,
    signals: &'s ChannelSignals,
    scratch: [u8; N],
    state: BackendState,
}

impl<'s, L, P, E, const N: usize> UsbLogBackend<'s, L, P, N>
where
    L: Lifecycle<Error = E>,
    P: SerialPort<Error = E>,
{
    pub fn new(lifecycle: L, port: P, signals: &'s ChannelSignals) -> Self {
        assert!(N > 0, "scratch capacity must be non-zero");
        Self {
            lifecycle,
            port,
            signals,
            scratch: [0; N],
            state: BackendState::Uninitialized,
        }
    }

    pub fn state(&self) -> BackendState {
        self.state
    }

    /// The signal cell the transport integration must notify.
    pub fn signals(&self) -> &'s ChannelSignals {
        self.signals
    }

    /// Brings up the transport through the lifecycle controller. Calling it
    /// again once initialized is a no-op; any bring-up failure leaves the
    /// backend uninitialized and is propagated as fatal.
    pub fn init(&mut self) -> Result<(), BackendError<E>> {
        if self.state != BackendState::Uninitialized {
            return Ok(());
        }
        self.lifecycle.init().map_err(BackendError::Stack)?;
        self.state = BackendState::Initialized;
        Ok(())
    }

    /// Drains pending transport events. Host applications call this from
    /// their idle loop to keep the connection state fresh between records.
    pub fn process(&mut self) {
        if self.state != BackendState::Initialized {
            return;
        }
        while self.lifecycle.pump_events() {}
    }

    fn emit(&mut self, record: &dyn LogRecord) -> Result<(), BackendError<E>> {
        if self.state != BackendState::Initialized {
            return Ok(());
        }

        while self.lifecycle.pump_events() {}

        let mut out = FormatBridge::new(
            &mut self.scratch,
            &mut self.lifecycle,
            &mut self.port,
            self.signals,
        );
        match record.render(&mut out) {
            Ok(()) => out.finish(),
            Err(fmt::Error) => Err(out.into_failure()),
        }
    }
}

impl<'s, L, P, E, const N: usize> LogBackend for UsbLogBackend<'s, L, P, N>
where
    L: Lifecycle<Error = E>,
    P: SerialPort<Error = E>,
{
    type Error = BackendError<E>;

    fn put(&mut self, record: &dyn LogRecord) -> Result<(), Self::Error> {
        self.emit(record)
    }

    /// Deliberately a no-op: once a chunk is handed to the device stack
    /// there is no way to force it onto the wire, so there is nothing a
    /// flush could wait for.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn panic_set(&mut self) {
        // Interrupts may already be off, so the completion wait in the
        // emit path could spin forever. Detach instead and stop emitting;
        // a detach failure has nowhere left to escalate.
        let _ = self.lifecycle.shutdown();
        self.state = BackendState::Panicked;
    }
}
