// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Bus-polling peripheral models: [Ram], [Rom] and [Serial]
//!
//! Each device implements the three-line contract of [Peripheral]:
//! subtract the mount base from the latched address, and if the result
//! falls inside the window, answer the read or accept the write.

use crate::bus::{Bus, Peripheral};
use std::fmt::{Debug, Formatter};
use std::io::{Read, Write};

/// General-purpose read/write memory mounted at a fixed base address.
///
/// # Examples
/// ```rust
/// # use adr8::*;
/// let mut bus = Bus::new();
/// let mut ram = Ram::new(0x0000, 0x1000);
/// bus.write(0x0042, 0xa5);
/// ram.tick(&mut bus);
/// bus.read(0x0042);
/// ram.tick(&mut bus);
/// assert_eq!(0xa5, bus.data());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ram {
    mount: u16,
    cells: Vec<u8>,
}

impl Ram {
    /// Constructs a zeroed memory of `size` bytes mounted at `mount`
    pub fn new(mount: u16, size: u16) -> Self {
        Ram {
            mount,
            cells: vec![0; size as usize],
        }
    }

    /// Copies `image` into memory starting at window offset `offset`.
    ///
    /// Bytes past the end of the window are dropped.
    pub fn load(&mut self, offset: u16, image: &[u8]) -> &mut Self {
        for (i, byte) in image.iter().enumerate() {
            if let Some(cell) = self.cells.get_mut(offset as usize + i) {
                *cell = *byte;
            }
        }
        self
    }

    /// Gets a slice of the backing store
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Reads one byte at window offset `offset`, without touching the bus
    pub fn peek(&self, offset: u16) -> u8 {
        self.cells.get(offset as usize).copied().unwrap_or(0)
    }
}

impl Peripheral for Ram {
    fn tick(&mut self, bus: &mut Bus) {
        let offset = bus.address().wrapping_sub(self.mount) as usize;
        if let Some(cell) = self.cells.get_mut(offset) {
            if bus.read_intent() {
                bus.respond(*cell);
            } else {
                *cell = bus.data();
            }
        }
    }
}

/// Read-only memory with a fixed image. Writes into the window are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rom {
    mount: u16,
    cells: Vec<u8>,
}

impl Rom {
    /// Constructs a read-only memory holding `image`, mounted at `mount`
    pub fn new(mount: u16, image: &[u8]) -> Self {
        Rom {
            mount,
            cells: image.to_vec(),
        }
    }
}

impl Peripheral for Rom {
    fn tick(&mut self, bus: &mut Bus) {
        let offset = bus.address().wrapping_sub(self.mount) as usize;
        if bus.read_intent() {
            if let Some(cell) = self.cells.get(offset) {
                bus.respond(*cell);
            }
        }
    }
}

/// A byte-stream device occupying a single bus address.
///
/// Reads consume one byte from the input stream (0 once the stream is
/// exhausted); writes emit one byte to the output stream. One read
/// request consumes exactly one input byte: the bus latch persists
/// through the core's commit tick, so the device remembers having
/// serviced the current request until the latched address leaves its
/// window or the intent changes.
pub struct Serial<R, W> {
    mount: u16,
    input: R,
    output: W,
    serviced: bool,
}

impl<R: Read, W: Write> Serial<R, W> {
    /// Constructs a serial port at bus address `mount` over an
    /// input/output stream pair
    pub fn new(mount: u16, input: R, output: W) -> Self {
        Serial {
            mount,
            input,
            output,
            serviced: false,
        }
    }
}

impl<R, W> Debug for Serial<R, W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serial").field("mount", &self.mount).finish()
    }
}

impl<R: Read, W: Write> Peripheral for Serial<R, W> {
    fn tick(&mut self, bus: &mut Bus) {
        if bus.address() != self.mount {
            self.serviced = false;
            return;
        }
        if bus.read_intent() {
            if !self.serviced {
                let mut byte = [0u8];
                let n = self.input.read(&mut byte).unwrap_or(0);
                bus.respond(if n == 0 { 0 } else { byte[0] });
                self.serviced = true;
            }
        } else {
            self.serviced = false;
            let _ = self.output.write_all(&[bus.data()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{empty, sink, Cursor};

    #[test]
    fn ram_read_write() {
        let mut bus = Bus::new();
        let mut ram = Ram::new(0x100, 0x10);
        bus.write(0x105, 0x42);
        ram.tick(&mut bus);
        assert_eq!(0x42, ram.peek(0x5));
        bus.read(0x105);
        ram.tick(&mut bus);
        assert_eq!(0x42, bus.data());
    }

    #[test]
    fn ram_ignores_requests_outside_window() {
        let mut bus = Bus::new();
        let mut ram = Ram::new(0x100, 0x10);
        bus.write(0x0ff, 0x42);
        ram.tick(&mut bus);
        bus.write(0x110, 0x42);
        ram.tick(&mut bus);
        assert!(ram.cells().iter().all(|cell| *cell == 0));
    }

    #[test]
    fn rom_ignores_writes() {
        let mut bus = Bus::new();
        let mut rom = Rom::new(0x0, &[0xaa, 0xbb]);
        bus.write(0x0, 0x00);
        rom.tick(&mut bus);
        bus.read(0x0);
        rom.tick(&mut bus);
        assert_eq!(0xaa, bus.data());
    }

    #[test]
    fn serial_reads_one_byte_per_request() {
        let mut bus = Bus::new();
        let mut serial = Serial::new(0x1000, Cursor::new(vec![1, 2, 3]), sink());
        // one request, latched across two edges
        bus.read(0x1000);
        serial.tick(&mut bus);
        assert_eq!(1, bus.data());
        serial.tick(&mut bus);
        assert_eq!(1, bus.data());
        // the request goes elsewhere, then comes back
        bus.read(0x0000);
        serial.tick(&mut bus);
        bus.read(0x1000);
        serial.tick(&mut bus);
        assert_eq!(2, bus.data());
    }

    #[test]
    fn serial_reads_zero_at_end_of_stream() {
        let mut bus = Bus::new();
        let mut serial = Serial::new(0x1000, empty(), sink());
        bus.read(0x1000);
        serial.tick(&mut bus);
        assert_eq!(0, bus.data());
    }

    #[test]
    fn serial_writes_to_output() {
        let mut bus = Bus::new();
        let mut out = Vec::new();
        {
            let mut serial = Serial::new(0x1000, empty(), &mut out);
            bus.write(0x1000, b'!');
            serial.tick(&mut bus);
        }
        assert_eq!(b"!", out.as_slice());
    }
}
