// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The Bus connects the Core to its peripherals
//!
//! This is not a memory map: it models the physical wires between the
//! CPU and every mounted device for one clock edge. The core latches a
//! request onto the bus; on the same edge, whichever device claims the
//! address answers the read or accepts the write.

use std::fmt::{Display, Formatter};

/// The shared address/data/read-intent latch.
///
/// The latch persists across clock edges until something overwrites it.
/// The [Bus] never validates addresses; claiming an address is entirely
/// up to the mounted [Peripheral]s.
///
/// # Examples
/// ```rust
/// # use adr8::*;
/// let mut bus = Bus::default();
/// bus.write(0x1234, 0x56);
/// assert_eq!(0x56, bus.data());
/// bus.read(0x1234);
/// assert!(bus.read_intent());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bus {
    address: u16,
    data: u8,
    read: bool,
}

impl Bus {
    /// Constructs a new bus with all wires low
    pub fn new() -> Self {
        Bus::default()
    }

    /// Latches a write request: address and data, read intent cleared.
    ///
    /// The device claiming `address` stores `data` on its next tick.
    pub fn write(&mut self, address: u16, data: u8) {
        self.address = address;
        self.data = data;
        self.read = false;
    }

    /// Latches a read request: address and read intent.
    ///
    /// The device claiming `address` overwrites the data latch on its
    /// next tick; the requester sees the byte via [Bus::data] one edge
    /// later.
    pub fn read(&mut self, address: u16) {
        self.address = address;
        self.read = true;
    }

    /// Returns the latched data byte.
    ///
    /// Valid after a device has answered a read, or immediately after a
    /// write.
    pub fn data(&self) -> u8 {
        self.data
    }

    /// Returns the latched address
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Returns true if the latched request is a read
    pub fn read_intent(&self) -> bool {
        self.read
    }

    /// Answers the latched request from a device's backing store.
    ///
    /// Only meaningful from inside [Peripheral::tick].
    pub fn respond(&mut self, data: u8) {
        self.data = data;
    }
}

impl Display for Bus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "adr: [{:04X}] dat: [{:02X}] {}",
            self.address,
            self.data,
            if self.read { "R" } else { "W" }
        )
    }
}

/// A memory-mapped device, advanced in lock-step with the [Core](crate::cpu::Core).
///
/// The core never calls into a device; devices poll the bus. A device
/// owns a mount window `[mount_base, mount_base + window_size)`, and on
/// each tick either answers a read or accepts a write when the latched
/// address falls inside the window, and does nothing otherwise.
///
/// At most one mounted device should claim a given address. Overlapping
/// windows are not detected; the device ticked last wins.
pub trait Peripheral: std::fmt::Debug {
    /// Reacts to the bus state the core set on this clock edge
    fn tick(&mut self, bus: &mut Bus);
}
