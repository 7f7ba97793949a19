// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Per-cycle execution of each [Command] family

use super::{
    opcode::{
        AbsJumpStep, AluOp, CallStep, Command, Cond, Dir, ImmStep, IndLoadStep, IndLoadWideStep,
        IndStoreWideStep, LoadStep, LoadWideStep, PopStep, PopWideStep, PushWideStep, RelStep,
        RetStep, StoreStep, StoreWideStep,
    },
    register::{Half, Ptr, Wide},
    Core,
};
use crate::{
    bus::Bus,
    error::{Error, Result},
};

impl Core {
    /// Executes one cycle of the in-flight command, returning the
    /// command to carry into the next cycle.
    pub(super) fn exec(&mut self, bus: &mut Bus, cmd: Command) -> Result<Command> {
        Ok(match cmd {
            Command::Nop => {
                self.advance();
                cmd
            }
            Command::Halt => {
                self.halt = true;
                cmd
            }
            Command::Transfer { src, dst } => self.transfer(src, dst),
            Command::Alu(op) => self.alu(op)?,
            Command::Adjust { ptr, dir } => self.adjust(ptr, dir),
            Command::SetImm { dst, step } => self.set_imm(bus, dst, step),
            Command::LoadAbs { dst, step } => self.load_abs(bus, dst, step),
            Command::LoadAbsWide { dst, step } => self.load_abs_wide(bus, dst, step),
            Command::LoadInd { ptr, dst, step } => self.load_ind(bus, ptr, dst, step),
            Command::LoadIndWide { ptr, dst, step } => self.load_ind_wide(bus, ptr, dst, step),
            Command::StoreAbs { src, step } => self.store_abs(bus, src, step),
            Command::StoreAbsWide { src, step } => self.store_abs_wide(bus, src, step),
            Command::StoreInd { ptr, src } => self.store_ind(bus, ptr, src),
            Command::StoreIndWide { ptr, src, step } => self.store_ind_wide(bus, ptr, src, step),
            Command::BranchRel { cond, step } => self.branch_rel(bus, cond, step),
            Command::BranchAbs { cond, step } => self.branch_abs(bus, cond, step),
            Command::Call(step) => self.call(bus, step),
            Command::Ret(step) => self.ret(bus, step),
            Command::Push { src } => self.push(bus, src),
            Command::PushWide { src, step } => self.push_wide(bus, src, step),
            Command::Pop { dst, step } => self.pop(bus, dst, step),
            Command::PopWide { dst, step } => self.pop_wide(bus, dst, step),
        })
    }
}

/// Single-cycle register ops
///
/// | mnemonic | effect              |
/// |----------|---------------------|
/// | `TRAB`   | b = a               |
/// | `TRBA`   | a = b               |
/// | `TRAX`   | x = a               |
/// | `TRXA`   | a = x               |
/// | `TRAY`   | y = a               |
/// | `TRYA`   | a = y               |
/// | `ADD`    | a += b, wrapping    |
/// | `SUB`    | a -= b, wrapping    |
/// | `MUL`    | a *= b, wrapping    |
/// | `DIV`    | a /= b, fault on 0  |
/// | `INCX`..`DECY` | x/y += ±1     |
impl Core {
    fn transfer(&mut self, src: Wide, dst: Wide) -> Command {
        let value = self.reg.wide(src);
        self.reg.wide_mut(dst).set_full(value);
        self.advance();
        Command::Transfer { src, dst }
    }

    fn alu(&mut self, op: AluOp) -> Result<Command> {
        let (a, b) = (self.reg.a.full(), self.reg.b.full());
        let result = match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::Div => {
                if b == 0 {
                    self.halt = true;
                    return Err(Error::DivisionByZero {
                        pc: self.reg.pc.full(),
                    });
                }
                a / b
            }
        };
        self.reg.a.set_full(result);
        self.advance();
        Ok(Command::Alu(op))
    }

    fn adjust(&mut self, ptr: Ptr, dir: Dir) -> Command {
        self.reg.ptr_mut(ptr).offset(match dir {
            Dir::Inc => 1,
            Dir::Dec => 1u16.wrapping_neg(),
        });
        self.advance();
        Command::Adjust { ptr, dir }
    }
}

/// Immediate 16-bit register set (`SETK` `SETA` `SETB` `SETX` `SETY`)
///
/// Three cycles: request low at pc+1, latch low and request high at
/// pc+2, latch high.
impl Core {
    fn set_imm(&mut self, bus: &mut Bus, dst: Wide, step: ImmStep) -> Command {
        let step = match step {
            ImmStep::FetchLow => {
                self.fetch_operand(bus);
                ImmStep::FetchHigh
            }
            ImmStep::FetchHigh => {
                let low = bus.data();
                self.reg.wide_mut(dst).set_low(low);
                self.fetch_operand(bus);
                ImmStep::Commit
            }
            ImmStep::Commit => {
                let high = bus.data();
                self.reg.wide_mut(dst).set_high(high);
                self.advance();
                step
            }
        };
        Command::SetImm { dst, step }
    }
}

/// Absolute loads (`LDAL`..`LDBH`, `LDA`..`LDY`)
///
/// Two operand cycles build a 16-bit address in the `adr` latch, then
/// one read per destination byte.
impl Core {
    fn load_abs(&mut self, bus: &mut Bus, dst: Half, step: LoadStep) -> Command {
        let step = match step {
            LoadStep::FetchLow => {
                self.fetch_operand(bus);
                LoadStep::FetchHigh
            }
            LoadStep::FetchHigh => {
                self.reg.adr.set_low(bus.data());
                self.fetch_operand(bus);
                LoadStep::Access
            }
            LoadStep::Access => {
                self.reg.adr.set_high(bus.data());
                bus.read(self.reg.adr.full());
                LoadStep::Commit
            }
            LoadStep::Commit => {
                self.reg.set_half(dst, bus.data());
                self.advance();
                step
            }
        };
        Command::LoadAbs { dst, step }
    }

    fn load_abs_wide(&mut self, bus: &mut Bus, dst: Wide, step: LoadWideStep) -> Command {
        let step = match step {
            LoadWideStep::FetchLow => {
                self.fetch_operand(bus);
                LoadWideStep::FetchHigh
            }
            LoadWideStep::FetchHigh => {
                self.reg.adr.set_low(bus.data());
                self.fetch_operand(bus);
                LoadWideStep::AccessLow
            }
            LoadWideStep::AccessLow => {
                self.reg.adr.set_high(bus.data());
                bus.read(self.reg.adr.full());
                LoadWideStep::AccessHigh
            }
            LoadWideStep::AccessHigh => {
                let low = bus.data();
                self.reg.wide_mut(dst).set_low(low);
                bus.read(self.reg.adr.full().wrapping_add(1));
                LoadWideStep::Commit
            }
            LoadWideStep::Commit => {
                let high = bus.data();
                self.reg.wide_mut(dst).set_high(high);
                self.advance();
                step
            }
        };
        Command::LoadAbsWide { dst, step }
    }
}

/// Pointer-indirect loads (`LXAL` `LXAH` `LYBL` `LYBH`, `LXA` `LYB`)
///
/// The x or y register supplies the source address directly.
impl Core {
    fn load_ind(&mut self, bus: &mut Bus, ptr: Ptr, dst: Half, step: IndLoadStep) -> Command {
        let step = match step {
            IndLoadStep::Access => {
                bus.read(self.reg.ptr(ptr));
                IndLoadStep::Commit
            }
            IndLoadStep::Commit => {
                self.reg.set_half(dst, bus.data());
                self.advance();
                step
            }
        };
        Command::LoadInd { ptr, dst, step }
    }

    fn load_ind_wide(
        &mut self,
        bus: &mut Bus,
        ptr: Ptr,
        dst: Wide,
        step: IndLoadWideStep,
    ) -> Command {
        let step = match step {
            IndLoadWideStep::AccessLow => {
                bus.read(self.reg.ptr(ptr));
                IndLoadWideStep::AccessHigh
            }
            IndLoadWideStep::AccessHigh => {
                let low = bus.data();
                self.reg.wide_mut(dst).set_low(low);
                bus.read(self.reg.ptr(ptr).wrapping_add(1));
                IndLoadWideStep::Commit
            }
            IndLoadWideStep::Commit => {
                let high = bus.data();
                self.reg.wide_mut(dst).set_high(high);
                self.advance();
                step
            }
        };
        Command::LoadIndWide { ptr, dst, step }
    }
}

/// Absolute stores (`STAL`..`STBH`, `STA`..`STY`)
impl Core {
    fn store_abs(&mut self, bus: &mut Bus, src: Half, step: StoreStep) -> Command {
        let step = match step {
            StoreStep::FetchLow => {
                self.fetch_operand(bus);
                StoreStep::FetchHigh
            }
            StoreStep::FetchHigh => {
                self.reg.adr.set_low(bus.data());
                self.fetch_operand(bus);
                StoreStep::Commit
            }
            StoreStep::Commit => {
                self.reg.adr.set_high(bus.data());
                bus.write(self.reg.adr.full(), self.reg.half(src));
                self.advance();
                step
            }
        };
        Command::StoreAbs { src, step }
    }

    fn store_abs_wide(&mut self, bus: &mut Bus, src: Wide, step: StoreWideStep) -> Command {
        let step = match step {
            StoreWideStep::FetchLow => {
                self.fetch_operand(bus);
                StoreWideStep::FetchHigh
            }
            StoreWideStep::FetchHigh => {
                self.reg.adr.set_low(bus.data());
                self.fetch_operand(bus);
                StoreWideStep::WriteLow
            }
            StoreWideStep::WriteLow => {
                self.reg.adr.set_high(bus.data());
                bus.write(self.reg.adr.full(), self.reg.wide(src) as u8);
                StoreWideStep::Commit
            }
            StoreWideStep::Commit => {
                bus.write(
                    self.reg.adr.full().wrapping_add(1),
                    (self.reg.wide(src) >> 8) as u8,
                );
                self.advance();
                step
            }
        };
        Command::StoreAbsWide { src, step }
    }
}

/// Pointer-indirect stores (`SXAL` `SXAH` `SYBL` `SYBH`, `SXA` `SYB`)
impl Core {
    fn store_ind(&mut self, bus: &mut Bus, ptr: Ptr, src: Half) -> Command {
        bus.write(self.reg.ptr(ptr), self.reg.half(src));
        self.advance();
        Command::StoreInd { ptr, src }
    }

    fn store_ind_wide(
        &mut self,
        bus: &mut Bus,
        ptr: Ptr,
        src: Wide,
        step: IndStoreWideStep,
    ) -> Command {
        let step = match step {
            IndStoreWideStep::WriteLow => {
                bus.write(self.reg.ptr(ptr), self.reg.wide(src) as u8);
                IndStoreWideStep::Commit
            }
            IndStoreWideStep::Commit => {
                bus.write(
                    self.reg.ptr(ptr).wrapping_add(1),
                    (self.reg.wide(src) >> 8) as u8,
                );
                self.advance();
                step
            }
        };
        Command::StoreIndWide { ptr, src, step }
    }
}

/// Control flow (`JMPR`..`JLTR`, `JMPA`..`JLTA`, `JSR`, `RSR`)
///
/// A relative jump that is not taken contributes zero displacement; the
/// unconditional pc += 1 of "advance" then steps over the operand byte.
/// An absolute jump retargets pc to target - 1 for the same reason,
/// landing exactly on the target.
impl Core {
    fn branch_rel(&mut self, bus: &mut Bus, cond: Cond, step: RelStep) -> Command {
        let step = match step {
            RelStep::Fetch => {
                self.fetch_operand(bus);
                RelStep::Commit
            }
            RelStep::Commit => {
                let offset = match cond.holds(self.reg.a.full(), self.reg.b.full()) {
                    true => bus.data() as i8 as i16,
                    false => 0,
                };
                self.reg.pc.offset(offset as u16);
                self.advance();
                step
            }
        };
        Command::BranchRel { cond, step }
    }

    fn branch_abs(&mut self, bus: &mut Bus, cond: Cond, step: AbsJumpStep) -> Command {
        let step = match step {
            AbsJumpStep::FetchLow => {
                self.fetch_operand(bus);
                AbsJumpStep::FetchHigh
            }
            AbsJumpStep::FetchHigh => {
                self.reg.adr.set_low(bus.data());
                self.fetch_operand(bus);
                AbsJumpStep::Commit
            }
            AbsJumpStep::Commit => {
                self.reg.adr.set_high(bus.data());
                if cond.holds(self.reg.a.full(), self.reg.b.full()) {
                    self.reg.pc.set_full(self.reg.adr.full().wrapping_sub(1));
                }
                self.advance();
                step
            }
        };
        Command::BranchAbs { cond, step }
    }

    fn call(&mut self, bus: &mut Bus, step: CallStep) -> Command {
        let step = match step {
            CallStep::FetchLow => {
                self.fetch_operand(bus);
                CallStep::FetchHigh
            }
            CallStep::FetchHigh => {
                self.reg.adr.set_low(bus.data());
                self.fetch_operand(bus);
                CallStep::PushHigh
            }
            CallStep::PushHigh => {
                self.reg.adr.set_high(bus.data());
                // pc points at the call's last operand byte; that is the
                // return address RSR resumes from
                bus.write(self.reg.stk.full(), self.reg.pc.high());
                self.reg.stk.offset(1u16.wrapping_neg());
                CallStep::Commit
            }
            CallStep::Commit => {
                bus.write(self.reg.stk.full(), self.reg.pc.low());
                self.reg.stk.offset(1u16.wrapping_neg());
                self.reg.pc.set_full(self.reg.adr.full().wrapping_sub(1));
                self.advance();
                step
            }
        };
        Command::Call(step)
    }

    fn ret(&mut self, bus: &mut Bus, step: RetStep) -> Command {
        let step = match step {
            RetStep::PopLow => {
                self.reg.stk.offset(1);
                bus.read(self.reg.stk.full());
                RetStep::PopHigh
            }
            RetStep::PopHigh => {
                self.reg.adr.set_low(bus.data());
                self.reg.stk.offset(1);
                bus.read(self.reg.stk.full());
                RetStep::Commit
            }
            RetStep::Commit => {
                self.reg.adr.set_high(bus.data());
                // saved pc was the call's last operand byte; advance
                // lands on the instruction after the call
                self.reg.pc.set_full(self.reg.adr.full());
                self.advance();
                step
            }
        };
        Command::Ret(step)
    }
}

/// The stack (`PUAL`..`PUBH`, `PUA`..`PUY`, `POAL`..`POBH`, `POA`..`POY`)
///
/// The stack grows downward, no bounds checking. Wide pushes write the
/// high half first so wide pops read the low half first.
impl Core {
    fn push(&mut self, bus: &mut Bus, src: Half) -> Command {
        bus.write(self.reg.stk.full(), self.reg.half(src));
        self.reg.stk.offset(1u16.wrapping_neg());
        self.advance();
        Command::Push { src }
    }

    fn push_wide(&mut self, bus: &mut Bus, src: Wide, step: PushWideStep) -> Command {
        let step = match step {
            PushWideStep::WriteHigh => {
                bus.write(self.reg.stk.full(), (self.reg.wide(src) >> 8) as u8);
                self.reg.stk.offset(1u16.wrapping_neg());
                PushWideStep::Commit
            }
            PushWideStep::Commit => {
                bus.write(self.reg.stk.full(), self.reg.wide(src) as u8);
                self.reg.stk.offset(1u16.wrapping_neg());
                self.advance();
                step
            }
        };
        Command::PushWide { src, step }
    }

    fn pop(&mut self, bus: &mut Bus, dst: Half, step: PopStep) -> Command {
        let step = match step {
            PopStep::Request => {
                self.reg.stk.offset(1);
                bus.read(self.reg.stk.full());
                PopStep::Commit
            }
            PopStep::Commit => {
                self.reg.set_half(dst, bus.data());
                self.advance();
                step
            }
        };
        Command::Pop { dst, step }
    }

    fn pop_wide(&mut self, bus: &mut Bus, dst: Wide, step: PopWideStep) -> Command {
        let step = match step {
            PopWideStep::RequestLow => {
                self.reg.stk.offset(1);
                bus.read(self.reg.stk.full());
                PopWideStep::RequestHigh
            }
            PopWideStep::RequestHigh => {
                let low = bus.data();
                self.reg.wide_mut(dst).set_low(low);
                self.reg.stk.offset(1);
                bus.read(self.reg.stk.full());
                PopWideStep::Commit
            }
            PopWideStep::Commit => {
                let high = bus.data();
                self.reg.wide_mut(dst).set_high(high);
                self.advance();
                step
            }
        };
        Command::PopWide { dst, step }
    }
}
