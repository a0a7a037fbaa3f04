//! Connection and completion flags shared between the transport's
//! notification path and the cooperative wait loops.
//!
//! Each flag has exactly one producer (the stack's event callback, which may
//! run at interrupt priority) and one consumer (the main-thread poll loop),
//! so plain release/acquire atomics are enough; the store only becomes
//! meaningful once a later poll observes it.

use core::sync::atomic::{AtomicBool, Ordering};

/// Connection-state and transfer-completion notifications a CDC-ACM class
/// delivers for the log port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortEvent {
    /// Host opened the virtual serial port.
    Open,
    /// Host closed the virtual serial port.
    Close,
    /// The previously submitted chunk finished transmitting.
    TxDone,
    /// Received data is pending on the OUT endpoint.
    RxDone,
}

/// The channel state of one log port: `port_open` tracks whether a host is
/// listening, `tx_done` acknowledges the chunk in flight, `rx_done` flags
/// pending receive data.
pub struct ChannelSignals {
    port_open: AtomicBool,
    tx_done: AtomicBool,
    rx_done: AtomicBool,
}

impl ChannelSignals {
    pub const fn new() -> Self {
        Self {
            port_open: AtomicBool::new(false),
            tx_done: AtomicBool::new(false),
            rx_done: AtomicBool::new(false),
        }
    }

    /// Producer side: called from the stack's notification path for every
    /// port event.
    pub fn notify(&self, event: PortEvent) {
        match event {
            PortEvent::Open => self.port_open.store(true, Ordering::Release),
            PortEvent::Close => self.port_open.store(false, Ordering::Release),
            PortEvent::TxDone => self.tx_done.store(true, Ordering::Release),
            PortEvent::RxDone => self.rx_done.store(true, Ordering::Release),
        }
    }

    /// True while the host has the virtual serial port open.
    pub fn port_open(&self) -> bool {
        self.port_open.load(Ordering::Acquire)
    }

    /// Must be called before submitting a chunk, never while one is in
    /// flight.
    pub fn clear_tx_done(&self) {
        self.tx_done.store(false, Ordering::Release)
    }

    /// True once the chunk submitted after the last [`Self::clear_tx_done`]
    /// has completed.
    pub fn tx_done(&self) -> bool {
        self.tx_done.load(Ordering::Acquire)
    }

    /// Consumes a pending receive notification, if any.
    pub fn take_rx_done(&self) -> bool {
        self.rx_done.swap(false, Ordering::AcqRel)
    }
}

impl Default for ChannelSignals {
    fn default() -> Self {
        Self::new()
    }
}
