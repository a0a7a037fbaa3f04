//! Bridge between record rendering and the chunked transmitter.
//!
//! Records render through `core::fmt::Write` into a fixed scratch buffer.
//! Whenever the buffer fills, its contents are transmitted in full before
//! rendering continues, so a record of any length needs no more memory than
//! the scratch capacity. Long records fragment across several USB writes;
//! that is the accepted cost of keeping the buffer small.

use core::fmt;

use crate::transport::chunk;
use crate::transport::signals::ChannelSignals;
use crate::transport::{EventPump, SerialPort};

use super::BackendError;

pub(crate) struct FormatBridge<'a, Q, P>
where
    Q: EventPump,
    P: SerialPort,
{
    scratch: &'a mut [u8],
    fill: usize,
    pump: &'a mut Q,
    port: &'a mut P,
    signals: &'a ChannelSignals,
    failure: Option<BackendError<P::Error>>,
}

impl<'a, Q, P> FormatBridge<'a, Q, P>
where
    Q: EventPump,
    P: SerialPort,
{
    pub(crate) fn new(
        scratch: &'a mut [u8],
        pump: &'a mut Q,
        port: &'a mut P,
        signals: &'a ChannelSignals,
    ) -> Self {
        Self {
            scratch,
            fill: 0,
            pump,
            port,
            signals,
            failure: None,
        }
    }

    /// Transmits the buffered pass and rewinds for the next one.
    fn flush_pass(&mut self) -> fmt::Result {
        match chunk::transmit(self.pump, self.port, self.signals, &self.scratch[..self.fill]) {
            Ok(()) => {
                self.fill = 0;
                Ok(())
            }
            Err(err) => {
                self.failure = Some(BackendError::Transport(err));
                Err(fmt::Error)
            }
        }
    }

    /// Transmits whatever the final pass left in the buffer.
    pub(crate) fn finish(mut self) -> Result<(), BackendError<P::Error>> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        if self.fill > 0 && self.flush_pass().is_err() {
            return Err(self.into_failure());
        }
        Ok(())
    }

    /// The error behind a `fmt::Error` the renderer reported. Falls back to
    /// [`BackendError::Format`] when the renderer failed on its own rather
    /// than because a pass could not be transmitted.
    pub(crate) fn into_failure(self) -> BackendError<P::Error> {
        self.failure.unwrap_or(BackendError::Format)
    }
}

impl<Q, P> fmt::Write for FormatBridge<'_, Q, P>
where
    Q: EventPump,
    P: SerialPort,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            if self.fill == self.scratch.len() {
                self.flush_pass()?;
                continue;
            }
            let take = usize::min(self.scratch.len() - self.fill, bytes.len());
            self.scratch[self.fill..self.fill + take].copy_from_slice(&bytes[..take]);
            self.fill += take;
            bytes = &bytes[take..];
        }
        Ok(())
    }
}
