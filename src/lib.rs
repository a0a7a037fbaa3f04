//! USB CDC-ACM log backend.
//!
//! Delivers formatted log records to a host over a USB virtual serial
//! port, on top of any event-queue-driven device stack. The stack itself
//! is out of scope: integrations implement the [`transport`] traits over
//! their vendor stack and feed connection/completion notifications into a
//! [`ChannelSignals`] cell; the backend supplies the state machine, the
//! fixed scratch buffer records render through, and the chunked, strictly
//! ordered transmit path.
//!
//! Delivery is best-effort by design. Output is dropped while no host has
//! the port open, there is no completion timeout, and after
//! [`LogBackend::panic_set`] the transmit path is permanently detached so
//! a fatal-error handler can keep running without interrupts.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod lifecycle;
#[cfg(feature = "log")]
pub mod logger;
pub mod serial_num;
pub mod transport;

pub use backend::{BackendError, BackendState, LogBackend, LogRecord, UsbLogBackend};
pub use lifecycle::{DelegatedLifecycle, Lifecycle, OwnedLifecycle, StartupPolicy};
#[cfg(feature = "log")]
pub use logger::UsbLogger;
pub use transport::signals::{ChannelSignals, PortEvent};
pub use transport::{
    ClockControl, EventPump, InitOutcome, SerialPort, SerialPortConfig, StackEvent, UsbStack,
};
