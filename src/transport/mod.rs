//! Interfaces to the external USB transport.
//!
//! The backend never talks to a vendor USB stack directly. Integrations
//! implement these traits over their stack of choice; the backend only
//! relies on the cooperative contract: submitted transfers complete
//! asynchronously, and completions are delivered by pumping the stack's
//! event queue, not out-of-band.

pub mod chunk;
#[cfg(test)]
pub(crate) mod mock;
pub mod signals;

/// Stack-level events the transport surfaces while its queue is pumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackEvent {
    /// The stack finished stopping.
    Stopped,
    /// Bus power appeared.
    PowerDetected,
    /// Bus power was removed.
    PowerRemoved,
    /// Bus power is stable enough to start the stack.
    PowerReady,
}

/// Result of [`UsbStack::init`]. Repeated initialization is a success
/// outcome, not an error; implementations map their stack's
/// "invalid state" code to [`InitOutcome::AlreadyInitialized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitOutcome {
    Initialized,
    AlreadyInitialized,
}

/// Interface and endpoint wiring of the log port. Fixed at construction;
/// there is no runtime reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialPortConfig {
    pub comm_interface: u8,
    pub data_interface: u8,
    pub endpoint_in: u8,
    pub endpoint_out: u8,
}

impl Default for SerialPortConfig {
    fn default() -> Self {
        Self {
            comm_interface: 0,
            data_interface: 1,
            endpoint_in: 1,
            endpoint_out: 1,
        }
    }
}

/// Lifecycle and event-queue surface of the USB device stack.
pub trait UsbStack {
    type Error;

    /// Initialize the stack, tolerating a stack someone else already
    /// initialized.
    fn init(&mut self) -> Result<InitOutcome, Self::Error>;

    fn enable(&mut self);
    fn disable(&mut self);
    fn start(&mut self);
    fn stop(&mut self);
    fn is_enabled(&self) -> bool;
    fn is_started(&self) -> bool;

    /// Switch the stack to power-event driven enable/start.
    fn enable_power_events(&mut self) -> Result<(), Self::Error>;

    /// Register the log port's CDC-ACM class instance with the stack.
    fn attach(&mut self, config: &SerialPortConfig) -> Result<(), Self::Error>;

    /// Remove the log port's class instance from the stack.
    fn detach(&mut self) -> Result<(), Self::Error>;

    /// Process one pending event, delivering any notifications it carries.
    /// Returns `true` if an event was processed (more may be pending).
    fn process_event(&mut self) -> bool;

    /// Stack-level event surfaced by the last [`Self::process_event`] call,
    /// if that event was not a class-level notification.
    fn take_stack_event(&mut self) -> Option<StackEvent>;

    /// Unique device identifier words, used to derive the serial number.
    fn device_id(&self) -> [u32; 2];

    /// Install the serial-number string reported during enumeration.
    fn set_serial_number(&mut self, serial: &str);
}

/// Per-class operations of the CDC-ACM instance carrying the log port.
pub trait SerialPort {
    type Error;

    /// Largest transfer the IN endpoint accepts in one submission.
    fn max_packet_size(&self) -> usize;

    /// Submit one chunk. Completion arrives later as
    /// [`signals::PortEvent::TxDone`]; a second submission before that is a
    /// contract violation.
    fn write(&mut self, chunk: &[u8]) -> Result<(), Self::Error>;

    /// Fetch received bytes after a [`signals::PortEvent::RxDone`].
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Number of bytes the last completed receive produced.
    fn rx_size(&self) -> usize;
}

/// Clock bring-up the stack depends on. Mirrors the usual vendor driver
/// shape: idempotent init plus a low-frequency clock that is requested once
/// and polled until running.
pub trait ClockControl {
    type Error;

    fn is_initialized(&self) -> bool;
    fn init(&mut self) -> Result<(), Self::Error>;
    fn lfclk_is_running(&self) -> bool;
    fn request_lfclk(&mut self);
}

/// The minimal pump interface the wait loops need. Lifecycle controllers
/// implement this by draining their stack's queue one event at a time.
pub trait EventPump {
    /// Process one pending transport event; returns `true` if one was
    /// processed.
    fn pump_events(&mut self) -> bool;
}
