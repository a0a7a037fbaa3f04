//! Chunked transmission over one IN endpoint.

use super::signals::ChannelSignals;
use super::{EventPump, SerialPort};

/// Sends `data` through the serial port in endpoint-sized chunks, pumping
/// the transport's event queue until each chunk's completion is observed
/// before the next one is submitted. Chunks therefore reach the wire in
/// strict offset order.
///
/// While no host has the port open the whole call is a silent no-op: log
/// output is dropped, not queued. `data` may be empty, in which case nothing
/// is submitted.
///
/// There is no completion timeout. If the host stops acknowledging
/// transfers after opening the port, the wait loop spins until it does.
///
/// # Errors
///
/// A rejected submission is returned as-is and the remainder of `data` is
/// abandoned; by that point the stack is in a state this layer cannot
/// repair, so there is no retry.
pub fn transmit<Q, P>(
    pump: &mut Q,
    port: &mut P,
    signals: &ChannelSignals,
    data: &[u8],
) -> Result<(), P::Error>
where
    Q: EventPump + ?Sized,
    P: SerialPort + ?Sized,
{
    if !signals.port_open() {
        return Ok(());
    }

    let max = port.max_packet_size();
    debug_assert!(max > 0);

    let mut offset = 0;
    while offset < data.len() {
        let len = usize::min(max, data.len() - offset);

        signals.clear_tx_done();
        port.write(&data[offset..offset + len])?;
        while !signals.tx_done() {
            // The completion notification travels through the same queue,
            // so the wait must keep pumping it.
            pump.pump_events();
        }

        offset += len;
    }
    Ok(())
}
