// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! This crate implements the ADR8 8-bit computer: a memory-mapped bus,
//! a multi-cycle CPU core that executes a fixed instruction set over
//! that bus, and a two-pass assembler that compiles textual programs
//! into the core's machine code.
//!
//! The core and the peripherals advance in lock-step, one clock edge at
//! a time; the assembler is an offline batch pipeline. The two share
//! exactly one thing: the opcode table in [cpu::opcode].

pub mod asm;
pub mod bus;
pub mod cpu;
pub mod devices;
pub mod error;

pub use asm::Assembler;
pub use bus::{Bus, Peripheral};
pub use cpu::Core;
pub use devices::{Ram, Rom, Serial};
pub use error::{Error, Result};

/// Builds an [Adr8] machine from a list of peripherals, mounted in tick
/// order
/// # Examples
/// ```rust
/// # use adr8::*;
/// # use std::io::{empty, sink};
/// let mut machine = machine! {
///     Ram::new(0x0000, 0x1000),
///     Serial::new(0x1000, empty(), sink()),
/// };
/// // zeroed RAM reads as NOPs; run a while and stop
/// machine.run(Some(100)).unwrap();
/// ```
#[macro_export]
macro_rules! machine {
    ($($device:expr),* $(,)?) => {
        $crate::Adr8::new()
        $(
            .attach(::std::boxed::Box::new($device))
        )*
    };
}

/// A whole machine: one [Core], one [Bus], and the attached
/// peripherals.
///
/// [Adr8::tick] is one logical clock edge: the core exactly once, then
/// every peripheral exactly once, in mount order. A peripheral reacts
/// to the bus state the core set on that same edge.
#[derive(Debug, Default)]
pub struct Adr8 {
    /// The execution core
    pub core: Core,
    /// The shared bus latch
    pub bus: Bus,
    devices: Vec<Box<dyn Peripheral>>,
}

impl Adr8 {
    /// Constructs a machine with no peripherals attached
    pub fn new() -> Self {
        Adr8::default()
    }

    /// Attaches a peripheral behind every previously attached one
    pub fn attach(mut self, device: Box<dyn Peripheral>) -> Self {
        self.devices.push(device);
        self
    }

    /// Advances the machine by one clock edge.
    ///
    /// The peripherals tick even on the edge a core fault surfaces, so
    /// the bus settles the way the hardware would; the fault is then
    /// returned to the caller.
    pub fn tick(&mut self) -> Result<()> {
        let fault = self.core.tick(&mut self.bus);
        for device in &mut self.devices {
            device.tick(&mut self.bus);
        }
        fault
    }

    /// Runs until the core halts, a fault surfaces, or `limit` clock
    /// edges elapse. Returns the number of edges consumed.
    ///
    /// # Examples
    /// ```rust
    /// # use adr8::*;
    /// let mut ram = Ram::new(0x0000, 0x100);
    /// ram.load(0, &[0x00, 0x00, 0x01]); // NOP NOP HALT
    /// let mut machine = machine![ram];
    /// machine.run(None).unwrap();
    /// assert!(machine.core.halted());
    /// ```
    pub fn run(&mut self, limit: Option<usize>) -> Result<usize> {
        let mut edges = 0;
        while !self.core.halted() && limit.map_or(true, |limit| edges < limit) {
            self.tick()?;
            edges += 1;
        }
        Ok(edges)
    }
}

/// Common imports for adr8
pub mod prelude {
    pub use crate::{
        asm::Assembler,
        bus::{Bus, Peripheral},
        cpu::Core,
        devices::{Ram, Rom, Serial},
        error::Result,
        machine, Adr8,
    };
}
