//! Bring-up and teardown of the transport under the backend.
//!
//! Two controllers implement the same minimal interface. [`OwnedLifecycle`]
//! is for firmware where nothing else touches USB: it brings up the clock
//! and the stack itself and owns the stack-level event policy.
//! [`DelegatedLifecycle`] is for host applications that already run the
//! stack; it only registers the log port's class instance and leaves
//! stack-level events to the application's own handler.

use crate::serial_num;
use crate::transport::{ClockControl, EventPump, SerialPortConfig, StackEvent, UsbStack};

/// What the backend needs from a lifecycle controller, besides pumping.
pub trait Lifecycle: EventPump {
    type Error;

    /// Bring the transport to the point where the port can enumerate.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Detach the log port from the stack. Used on the panic path.
    fn shutdown(&mut self) -> Result<(), Self::Error>;
}

/// How [`OwnedLifecycle`] gets the stack from enabled to started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupPolicy {
    /// Let the stack enable and start itself off bus-power events.
    PowerEvents,
    /// Enable and start right away.
    Immediate,
}

/// Controller that owns the whole bring-up: clock, serial number, stack
/// init, class registration, and the power-event policy.
pub struct OwnedLifecycle<S, K> {
    stack: S,
    clock: K,
    config: SerialPortConfig,
    policy: StartupPolicy,
}

impl<S, K> OwnedLifecycle<S, K> {
    pub fn new(stack: S, clock: K, config: SerialPortConfig, policy: StartupPolicy) -> Self {
        Self {
            stack,
            clock,
            config,
            policy,
        }
    }
}

impl<S: UsbStack, K> OwnedLifecycle<S, K> {
    fn apply(&mut self, event: StackEvent) {
        match event {
            StackEvent::Stopped => self.stack.disable(),
            StackEvent::PowerDetected => {
                if !self.stack.is_enabled() {
                    self.stack.enable();
                }
            }
            StackEvent::PowerRemoved => self.stack.stop(),
            StackEvent::PowerReady => {
                if !self.stack.is_started() {
                    self.stack.start();
                }
            }
        }
    }
}

impl<S: UsbStack, K> EventPump for OwnedLifecycle<S, K> {
    fn pump_events(&mut self) -> bool {
        let processed = self.stack.process_event();
        if let Some(event) = self.stack.take_stack_event() {
            self.apply(event);
        }
        processed
    }
}

impl<S, K, E> Lifecycle for OwnedLifecycle<S, K>
where
    S: UsbStack<Error = E>,
    K: ClockControl<Error = E>,
{
    type Error = E;

    fn init(&mut self) -> Result<(), E> {
        if !self.clock.is_initialized() {
            self.clock.init()?;
        }
        if !self.clock.lfclk_is_running() {
            self.clock.request_lfclk();
            while !self.clock.lfclk_is_running() {}
        }

        let serial = serial_num::from_device_id(self.stack.device_id());
        self.stack.set_serial_number(&serial);

        // A stack someone already initialized is fine, everything else is
        // fatal to the caller.
        self.stack.init()?;
        self.stack.attach(&self.config)?;

        match self.policy {
            StartupPolicy::PowerEvents => self.stack.enable_power_events()?,
            StartupPolicy::Immediate => {
                if !self.stack.is_enabled() {
                    self.stack.enable();
                }
                if !self.stack.is_started() {
                    self.stack.start();
                }
            }
        }

        while !self.stack.is_started() {
            while self.pump_events() {}
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), E> {
        self.stack.detach()
    }
}

/// Controller for transports the host application runs itself. The
/// application keeps responsibility for stack init, power policy, and
/// pumping outside of emit calls.
pub struct DelegatedLifecycle<S> {
    stack: S,
    config: SerialPortConfig,
}

impl<S> DelegatedLifecycle<S> {
    pub fn new(stack: S, config: SerialPortConfig) -> Self {
        Self { stack, config }
    }
}

impl<S: UsbStack> EventPump for DelegatedLifecycle<S> {
    fn pump_events(&mut self) -> bool {
        self.stack.process_event()
    }
}

impl<S: UsbStack> Lifecycle for DelegatedLifecycle<S> {
    type Error = S::Error;

    fn init(&mut self) -> Result<(), S::Error> {
        self.stack.attach(&self.config)
    }

    fn shutdown(&mut self) -> Result<(), S::Error> {
        self.stack.detach()
    }
}
