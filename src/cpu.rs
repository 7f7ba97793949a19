// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions, one clock edge at a time

#[cfg(test)]
mod tests;

pub mod exec;
pub mod opcode;
pub mod register;

pub use opcode::{Command, MNEMONICS};
pub use register::{Half, Ptr, Reg16, RegFile, Wide};

use crate::{
    bus::Bus,
    error::{Error, Result},
};
use std::fmt::{Display, Formatter};

/// The multi-cycle execution core.
///
/// The core is a per-clock-edge state machine over a shared [Bus]: one
/// call to [Core::tick] is one clock edge, and every instruction spans
/// several. All pending state lives in the command register ([Command])
/// and the register file; there is no hidden continuation.
///
/// A freshly constructed core fetches its first instruction from
/// address 0.
///
/// # Examples
/// ```rust
/// # use adr8::*;
/// let mut bus = Bus::new();
/// let mut ram = Ram::new(0x0000, 0x100);
/// // SETA 0x0102; HALT
/// ram.load(0, &[0x0A, 0x02, 0x01, 0x01]);
///
/// let mut core = Core::new();
/// while !core.halted() {
///     core.tick(&mut bus).unwrap();
///     ram.tick(&mut bus);
/// }
/// assert_eq!(0x0102, core.a());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Core {
    reg: RegFile,
    #[cfg_attr(feature = "serde", serde(skip))]
    cmd: Option<Command>,
    fetch: bool,
    halt: bool,
}

impl Core {
    /// Constructs a core in the power-on state: registers zeroed, first
    /// tick fetches from address 0
    pub fn new() -> Self {
        Core::default()
    }

    /// Advances the core by one clock edge.
    ///
    /// One edge does exactly one of:
    /// - nothing, if the core is halted;
    /// - issue the instruction fetch at pc (when the fetch flag is set);
    /// - latch the fetched opcode and run its first cycle;
    /// - run the next cycle of the instruction in flight.
    ///
    /// Returns the fault if the latched byte decodes to no instruction,
    /// or if `DIV` divides by zero. Both faults also set the permanent
    /// halt flag; a halted core ticks as a no-op.
    ///
    /// The external driver must tick the core exactly once per edge,
    /// before the peripherals.
    ///
    /// # Examples
    /// ```rust
    /// # use adr8::*;
    /// let mut bus = Bus::new();
    /// let mut ram = Ram::new(0x0000, 0x100);
    /// ram.load(0, &[0x02]); // not an instruction
    ///
    /// let mut core = Core::new();
    /// core.tick(&mut bus).unwrap(); // fetch edge
    /// ram.tick(&mut bus);
    /// core.tick(&mut bus).expect_err("0x02 is not an instruction");
    /// assert!(core.halted());
    /// ```
    pub fn tick(&mut self, bus: &mut Bus) -> Result<()> {
        if self.halt {
            return Ok(());
        }

        if self.fetch {
            self.cmd = None;
            bus.read(self.reg.pc.full());
            self.fetch = false;
            return Ok(());
        }

        let cmd = match self.cmd {
            Some(cmd) => cmd,
            None => {
                let byte = bus.data();
                match Command::decode(byte) {
                    Some(cmd) => cmd,
                    None => {
                        self.halt = true;
                        return Err(Error::UnknownOpcode {
                            opcode: byte,
                            pc: self.reg.pc.full(),
                        });
                    }
                }
            }
        };

        self.cmd = Some(self.exec(bus, cmd)?);
        Ok(())
    }

    /// Finishes the current instruction: bump pc past the last consumed
    /// byte and fetch on the next edge
    fn advance(&mut self) {
        self.reg.pc.offset(1);
        self.fetch = true;
    }

    /// Requests the next operand byte: bump pc onto it and issue the read
    fn fetch_operand(&mut self, bus: &mut Bus) {
        self.reg.pc.offset(1);
        bus.read(self.reg.pc.full());
    }

    /// Returns true once the core is permanently inert
    /// # Examples
    /// ```rust
    /// # use adr8::*;
    /// assert!(!Core::new().halted());
    /// ```
    pub fn halted(&self) -> bool {
        self.halt
    }

    /// Gets the register file
    pub fn registers(&self) -> &RegFile {
        &self.reg
    }

    /// Gets a mutable reference to the register file.
    ///
    /// Useful for embedding drivers that preload a stack pointer or
    /// entry point before the first tick.
    pub fn registers_mut(&mut self) -> &mut RegFile {
        &mut self.reg
    }

    /// Gets the full a register
    pub fn a(&self) -> u16 {
        self.reg.a.full()
    }

    /// Gets the full b register
    pub fn b(&self) -> u16 {
        self.reg.b.full()
    }

    /// Gets the full x register
    pub fn x(&self) -> u16 {
        self.reg.x.full()
    }

    /// Gets the full y register
    pub fn y(&self) -> u16 {
        self.reg.y.full()
    }

    /// Gets the program counter
    pub fn pc(&self) -> u16 {
        self.reg.pc.full()
    }

    /// Gets the stack pointer
    pub fn stk(&self) -> u16 {
        self.reg.stk.full()
    }
}

impl Default for Core {
    fn default() -> Self {
        Core {
            reg: RegFile::default(),
            cmd: None,
            fetch: true,
            halt: false,
        }
    }
}

impl Display for Core {
    /// One-line register dump in the machine's traditional trace format
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cmd: [{}] {}",
            self.reg,
            match self.cmd {
                Some(cmd) => format!("{cmd:?}"),
                None => "--".into(),
            },
            match (self.halt, self.fetch) {
                (true, _) => "HALT",
                (false, true) => "FETCH",
                (false, false) => "EXEC",
            }
        )
    }
}
