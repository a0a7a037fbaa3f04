//! Serial-number derivation from the device's unique identifier.

use core::fmt::Write;

use heapless::String;

/// Formats the two device-id words as 16 uppercase hex digits, the string
/// the stack reports in its serial-number descriptor.
pub fn from_device_id(id: [u32; 2]) -> String<16> {
    let mut serial = String::new();
    // 16 digits exactly fill the buffer, the write cannot fail.
    let _ = write!(serial, "{:08X}{:08X}", id[0], id[1]);
    serial
}
