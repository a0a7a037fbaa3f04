//! Scripted stand-ins for the transport traits. Completions and port
//! events only reach the signal cells when the queue is pumped, matching
//! the delivery model of the real stack.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::signals::{ChannelSignals, PortEvent};
use super::{
    ClockControl, EventPump, InitOutcome, SerialPort, SerialPortConfig, StackEvent, UsbStack,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

/// Everything the doubles did, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    ClockInit,
    LfclkRequest,
    SerialInstalled,
    StackInit,
    Attach,
    Detach,
    Enable,
    Disable,
    Start,
    Stop,
    PowerEvents,
    Submit(Vec<u8>),
    Pump(Option<PortEvent>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Queued {
    Port(PortEvent),
    Stack(StackEvent),
}

pub(crate) struct BusState {
    pub queue: VecDeque<Queued>,
    pub actions: Vec<Action>,
    pub submits: Vec<Vec<u8>>,
    pub rx_data: VecDeque<u8>,
    pub max_packet: usize,
    pub enabled: bool,
    pub started: bool,
    pub stack_initialized: bool,
    /// When set, every accepted write schedules its own `TxDone`.
    pub auto_complete: bool,
    pub fail_write: bool,
    pub fail_attach: bool,
    pub fail_detach: bool,
    pub serial: Option<String>,
    pub attach_count: usize,
    pub detach_count: usize,
}

impl BusState {
    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn count(&self, action: &Action) -> usize {
        self.actions.iter().filter(|a| *a == action).count()
    }
}

pub(crate) type SharedBus = Rc<RefCell<BusState>>;

pub(crate) fn bus(max_packet: usize) -> SharedBus {
    Rc::new(RefCell::new(BusState {
        queue: VecDeque::new(),
        actions: Vec::new(),
        submits: Vec::new(),
        rx_data: VecDeque::new(),
        max_packet,
        enabled: false,
        started: false,
        stack_initialized: false,
        auto_complete: true,
        fail_write: false,
        fail_attach: false,
        fail_detach: false,
        serial: None,
        attach_count: 0,
        detach_count: 0,
    }))
}

pub(crate) fn queue_port_event(bus: &SharedBus, event: PortEvent) {
    bus.borrow_mut().queue.push_back(Queued::Port(event));
}

pub(crate) fn queue_stack_event(bus: &SharedBus, event: StackEvent) {
    bus.borrow_mut().queue.push_back(Queued::Stack(event));
}

pub(crate) struct MockStack<'s> {
    bus: SharedBus,
    signals: &'s ChannelSignals,
    pending: Option<StackEvent>,
}

impl<'s> MockStack<'s> {
    pub fn new(bus: &SharedBus, signals: &'s ChannelSignals) -> Self {
        Self {
            bus: Rc::clone(bus),
            signals,
            pending: None,
        }
    }
}

impl UsbStack for MockStack<'_> {
    type Error = MockError;

    fn init(&mut self) -> Result<InitOutcome, MockError> {
        let mut bus = self.bus.borrow_mut();
        bus.actions.push(Action::StackInit);
        if bus.stack_initialized {
            Ok(InitOutcome::AlreadyInitialized)
        } else {
            bus.stack_initialized = true;
            Ok(InitOutcome::Initialized)
        }
    }

    fn enable(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.enabled = true;
        bus.actions.push(Action::Enable);
    }

    fn disable(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.enabled = false;
        bus.actions.push(Action::Disable);
    }

    fn start(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.started = true;
        bus.actions.push(Action::Start);
    }

    fn stop(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.started = false;
        bus.actions.push(Action::Stop);
    }

    fn is_enabled(&self) -> bool {
        self.bus.borrow().enabled
    }

    fn is_started(&self) -> bool {
        self.bus.borrow().started
    }

    fn enable_power_events(&mut self) -> Result<(), MockError> {
        let mut bus = self.bus.borrow_mut();
        bus.actions.push(Action::PowerEvents);
        bus.queue.push_back(Queued::Stack(StackEvent::PowerDetected));
        bus.queue.push_back(Queued::Stack(StackEvent::PowerReady));
        Ok(())
    }

    fn attach(&mut self, _config: &SerialPortConfig) -> Result<(), MockError> {
        let mut bus = self.bus.borrow_mut();
        if bus.fail_attach {
            return Err(MockError);
        }
        bus.attach_count += 1;
        bus.actions.push(Action::Attach);
        Ok(())
    }

    fn detach(&mut self) -> Result<(), MockError> {
        let mut bus = self.bus.borrow_mut();
        if bus.fail_detach {
            return Err(MockError);
        }
        bus.detach_count += 1;
        bus.actions.push(Action::Detach);
        Ok(())
    }

    fn process_event(&mut self) -> bool {
        let item = self.bus.borrow_mut().queue.pop_front();
        match item {
            Some(Queued::Port(event)) => {
                self.signals.notify(event);
                self.bus.borrow_mut().actions.push(Action::Pump(Some(event)));
                true
            }
            Some(Queued::Stack(event)) => {
                self.pending = Some(event);
                self.bus.borrow_mut().actions.push(Action::Pump(None));
                true
            }
            None => false,
        }
    }

    fn take_stack_event(&mut self) -> Option<StackEvent> {
        self.pending.take()
    }

    fn device_id(&self) -> [u32; 2] {
        [0xDEAD_BEEF, 0x0012_3456]
    }

    fn set_serial_number(&mut self, serial: &str) {
        let mut bus = self.bus.borrow_mut();
        bus.serial = Some(serial.to_owned());
        bus.actions.push(Action::SerialInstalled);
    }
}

impl EventPump for MockStack<'_> {
    fn pump_events(&mut self) -> bool {
        self.process_event()
    }
}

pub(crate) struct MockPort {
    bus: SharedBus,
}

impl MockPort {
    pub fn new(bus: &SharedBus) -> Self {
        Self { bus: Rc::clone(bus) }
    }
}

impl SerialPort for MockPort {
    type Error = MockError;

    fn max_packet_size(&self) -> usize {
        self.bus.borrow().max_packet
    }

    fn write(&mut self, chunk: &[u8]) -> Result<(), MockError> {
        let mut bus = self.bus.borrow_mut();
        if bus.fail_write {
            return Err(MockError);
        }
        bus.submits.push(chunk.to_vec());
        bus.actions.push(Action::Submit(chunk.to_vec()));
        if bus.auto_complete {
            bus.queue.push_back(Queued::Port(PortEvent::TxDone));
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), MockError> {
        let mut bus = self.bus.borrow_mut();
        let len = usize::min(buf.len(), bus.rx_data.len());
        for (slot, byte) in buf.iter_mut().zip(bus.rx_data.drain(..len)) {
            *slot = byte;
        }
        Ok(())
    }

    fn rx_size(&self) -> usize {
        self.bus.borrow().rx_data.len()
    }
}

pub(crate) struct MockClock {
    bus: SharedBus,
    initialized: bool,
    lfclk_running: bool,
}

impl MockClock {
    pub fn new(bus: &SharedBus) -> Self {
        Self {
            bus: Rc::clone(bus),
            initialized: false,
            lfclk_running: false,
        }
    }
}

impl ClockControl for MockClock {
    type Error = MockError;

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn init(&mut self) -> Result<(), MockError> {
        self.initialized = true;
        self.bus.borrow_mut().actions.push(Action::ClockInit);
        Ok(())
    }

    fn lfclk_is_running(&self) -> bool {
        self.lfclk_running
    }

    fn request_lfclk(&mut self) {
        self.lfclk_running = true;
        self.bus.borrow_mut().actions.push(Action::LfclkRequest);
    }
}
