// CPU execution - one bus cycle per tick
//
// `tick` performs the access belonging to the current `State`, computes the
// state for the next cycle, then samples the interrupt lines.

use super::addressing::resolve_indexed;
use super::opcodes::decode;
use super::pipeline::{
    Index, Interrupt, Operation, PullOp, PushOp, ReadOp, State, UnstableStore,
};
use super::{Cpu, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR, STACK_BASE};
use crate::bus::CpuBus;

impl Cpu {
    /// Advance the CPU by exactly one cycle
    #[allow(clippy::too_many_lines)]
    pub fn tick<B: CpuBus + ?Sized>(&mut self, bus: &mut B) {
        let next = match self.state {
            State::FetchOpcode => {
                if self.interrupt_previous {
                    bus.read(self.pc);
                    State::InterruptPadding(Interrupt::Hardware)
                } else {
                    let opcode_pc = self.pc;
                    let opcode = self.fetch(bus);
                    let next = decode(opcode);
                    if next == State::Jam {
                        tracing::warn!(
                            "CPU jammed by opcode ${:02X} at ${:04X}",
                            opcode,
                            opcode_pc
                        );
                    }
                    next
                }
            }

            // ---- Single-operand and register forms ----
            State::Immediate(op) => {
                let value = self.fetch(bus);
                self.execute_read(op, value);
                State::FetchOpcode
            }
            State::Implied(op) => {
                bus.read(self.pc);
                self.execute_implied(op);
                State::FetchOpcode
            }
            State::Accumulator(op) => {
                bus.read(self.pc);
                self.a = self.execute_modify(op, self.a);
                State::FetchOpcode
            }

            // ---- Address resolution ----
            State::ZeroPage(op) => {
                let address = self.fetch(bus) as u16;
                State::Execute { op, address }
            }
            State::ZeroPageIndexed(op, index) => {
                let base = self.fetch(bus);
                State::ZeroPageIndexedAdd { op, base, index }
            }
            State::ZeroPageIndexedAdd { op, base, index } => {
                bus.read(base as u16);
                let address = base.wrapping_add(self.index(index)) as u16;
                State::Execute { op, address }
            }
            State::Absolute(op) => {
                let low = self.fetch(bus);
                State::AbsoluteHigh { op, low }
            }
            State::AbsoluteHigh { op, low } => {
                let high = self.fetch(bus);
                State::Execute {
                    op,
                    address: u16::from_le_bytes([low, high]),
                }
            }
            State::AbsoluteIndexed(op, index) => {
                let low = self.fetch(bus);
                State::AbsoluteIndexedHigh { op, low, index }
            }
            State::AbsoluteIndexedHigh { op, low, index } => {
                let high = self.fetch(bus);
                resolve_indexed(op, u16::from_le_bytes([low, high]), self.index(index))
            }
            State::IndexedIndirect(op) => {
                let pointer = self.fetch(bus);
                State::IndexedIndirectAdd { op, pointer }
            }
            State::IndexedIndirectAdd { op, pointer } => {
                bus.read(pointer as u16);
                State::IndexedIndirectLow {
                    op,
                    pointer: pointer.wrapping_add(self.x),
                }
            }
            State::IndexedIndirectLow { op, pointer } => {
                let low = bus.read(pointer as u16);
                State::IndexedIndirectHigh { op, pointer, low }
            }
            State::IndexedIndirectHigh { op, pointer, low } => {
                let high = bus.read(pointer.wrapping_add(1) as u16);
                State::Execute {
                    op,
                    address: u16::from_le_bytes([low, high]),
                }
            }
            State::IndirectIndexed(op) => {
                let pointer = self.fetch(bus);
                State::IndirectIndexedLow { op, pointer }
            }
            State::IndirectIndexedLow { op, pointer } => {
                let low = bus.read(pointer as u16);
                State::IndirectIndexedHigh { op, pointer, low }
            }
            State::IndirectIndexedHigh { op, pointer, low } => {
                let high = bus.read(pointer.wrapping_add(1) as u16);
                resolve_indexed(op, u16::from_le_bytes([low, high]), self.y)
            }
            State::PageFixup {
                op,
                uncorrected,
                address,
            } => {
                bus.read(uncorrected);
                match op {
                    Operation::Unstable(store) => {
                        self.unstable_store(store, uncorrected, address)
                    }
                    _ => State::Execute { op, address },
                }
            }

            // ---- Operation cycles ----
            State::Execute { op, address } => match op {
                Operation::Read(read) => {
                    let value = bus.read(address);
                    self.execute_read(read, value);
                    State::FetchOpcode
                }
                Operation::Write(write) => {
                    bus.write(address, self.write_value(write));
                    State::FetchOpcode
                }
                Operation::Modify(modify) => {
                    let value = bus.read(address);
                    State::ModifyWriteBack {
                        op: modify,
                        address,
                        value,
                    }
                }
                Operation::Unstable(store) => {
                    unreachable!("{:?} only uses indexed modes", store)
                }
            },
            State::ModifyWriteBack { op, address, value } => {
                bus.write(address, value);
                let value = self.execute_modify(op, value);
                State::WriteValue { address, value }
            }
            State::WriteValue { address, value } => {
                bus.write(address, value);
                State::FetchOpcode
            }

            // ---- Branches ----
            State::Branch(condition) => {
                let offset = self.fetch(bus);
                if self.branch_taken(condition) {
                    State::BranchTaken { offset }
                } else {
                    State::FetchOpcode
                }
            }
            State::BranchTaken { offset } => {
                bus.read(self.pc);
                let target = self.pc.wrapping_add(offset as i8 as u16);
                if target & 0xFF00 == self.pc & 0xFF00 {
                    self.pc = target;
                    // A taken branch that stays in its page does not sample
                    // interrupts on its last cycle
                    if self.interrupt_latched && !self.interrupt_previous {
                        self.interrupt_latched = false;
                    }
                    State::FetchOpcode
                } else {
                    self.pc = (self.pc & 0xFF00) | (target & 0x00FF);
                    State::BranchFixup { target }
                }
            }
            State::BranchFixup { target } => {
                bus.read(self.pc);
                self.pc = target;
                State::FetchOpcode
            }

            // ---- Jumps and subroutines ----
            State::JmpAbsolute => {
                let low = self.fetch(bus);
                State::JmpAbsoluteHigh { low }
            }
            State::JmpAbsoluteHigh { low } => {
                let high = bus.read(self.pc);
                self.pc = u16::from_le_bytes([low, high]);
                State::FetchOpcode
            }
            State::JmpIndirect => {
                let low = self.fetch(bus);
                State::JmpIndirectHigh { low }
            }
            State::JmpIndirectHigh { low } => {
                let high = self.fetch(bus);
                State::JmpIndirectTargetLow {
                    pointer: u16::from_le_bytes([low, high]),
                }
            }
            State::JmpIndirectTargetLow { pointer } => {
                let low = bus.read(pointer);
                State::JmpIndirectTargetHigh { pointer, low }
            }
            State::JmpIndirectTargetHigh { pointer, low } => {
                // The pointer's high byte never receives the carry: JMP ($10FF)
                // reads its target from $10FF and $1000
                let high_address = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
                let high = bus.read(high_address);
                self.pc = u16::from_le_bytes([low, high]);
                State::FetchOpcode
            }
            State::Jsr => {
                let low = self.fetch(bus);
                State::JsrStackRead { low }
            }
            State::JsrStackRead { low } => {
                bus.read(self.stack_address());
                State::JsrPushHigh { low }
            }
            State::JsrPushHigh { low } => {
                self.push(bus, (self.pc >> 8) as u8);
                State::JsrPushLow { low }
            }
            State::JsrPushLow { low } => {
                self.push(bus, self.pc as u8);
                State::JsrHigh { low }
            }
            State::JsrHigh { low } => {
                let high = bus.read(self.pc);
                self.pc = u16::from_le_bytes([low, high]);
                State::FetchOpcode
            }
            State::Rts => {
                bus.read(self.pc);
                State::RtsIncrementSp
            }
            State::RtsIncrementSp => {
                self.stack_dummy_read(bus);
                State::RtsPullLow
            }
            State::RtsPullLow => {
                let low = self.pull(bus);
                State::RtsPullHigh { low }
            }
            State::RtsPullHigh { low } => {
                let high = bus.read(self.stack_address());
                self.pc = u16::from_le_bytes([low, high]);
                State::RtsIncrementPc
            }
            State::RtsIncrementPc => {
                self.fetch(bus);
                State::FetchOpcode
            }
            State::Rti => {
                bus.read(self.pc);
                State::RtiIncrementSp
            }
            State::RtiIncrementSp => {
                self.stack_dummy_read(bus);
                State::RtiPullStatus
            }
            State::RtiPullStatus => {
                let status = self.pull(bus);
                self.set_status_from_stack(status);
                State::RtiPullLow
            }
            State::RtiPullLow => {
                let low = self.pull(bus);
                State::RtiPullHigh { low }
            }
            State::RtiPullHigh { low } => {
                let high = bus.read(self.stack_address());
                self.pc = u16::from_le_bytes([low, high]);
                State::FetchOpcode
            }

            // ---- Stack ----
            State::Push(op) => {
                bus.read(self.pc);
                State::PushWrite(op)
            }
            State::PushWrite(op) => {
                let value = match op {
                    PushOp::Pha => self.a,
                    PushOp::Php => self.status_for_push(true),
                };
                self.push(bus, value);
                State::FetchOpcode
            }
            State::Pull(op) => {
                bus.read(self.pc);
                State::PullIncrementSp(op)
            }
            State::PullIncrementSp(op) => {
                self.stack_dummy_read(bus);
                State::PullRead(op)
            }
            State::PullRead(op) => {
                let value = bus.read(self.stack_address());
                match op {
                    PullOp::Pla => self.execute_read(ReadOp::Lda, value),
                    PullOp::Plp => self.set_status_from_stack(value),
                }
                State::FetchOpcode
            }

            // ---- Interrupt sequence ----
            State::Reset => {
                bus.read(self.pc);
                State::InterruptPadding(Interrupt::Reset)
            }
            State::InterruptPadding(kind) => {
                bus.read(self.pc);
                if kind == Interrupt::Break {
                    self.pc = self.pc.wrapping_add(1);
                }
                State::InterruptPushHigh(kind)
            }
            State::InterruptPushHigh(kind) => {
                self.interrupt_push(bus, kind, (self.pc >> 8) as u8);
                State::InterruptPushLow(kind)
            }
            State::InterruptPushLow(kind) => {
                self.interrupt_push(bus, kind, self.pc as u8);
                State::InterruptPushStatus(kind)
            }
            State::InterruptPushStatus(kind) => {
                let status = self.status_for_push(kind == Interrupt::Break);
                self.interrupt_push(bus, kind, status);
                self.set_interrupt_disable(true);
                let vector = if kind == Interrupt::Reset {
                    RESET_VECTOR
                } else if self.nmi_pending {
                    // NMI hijacks an IRQ or BRK that has not fetched its vector
                    self.nmi_pending = false;
                    NMI_VECTOR
                } else {
                    IRQ_VECTOR
                };
                State::InterruptVectorLow { vector }
            }
            State::InterruptVectorLow { vector } => {
                let low = bus.read(vector);
                State::InterruptVectorHigh { vector, low }
            }
            State::InterruptVectorHigh { vector, low } => {
                let high = bus.read(vector.wrapping_add(1));
                self.pc = u16::from_le_bytes([low, high]);
                State::FetchOpcode
            }

            State::Jam => {
                bus.read(0xFFFF);
                State::Jam
            }
        };

        self.state = next;
        self.cycles = self.cycles.wrapping_add(1);
        self.poll_interrupts(bus);
    }

    /// Address the next tick reads, or `None` when the next tick writes
    ///
    /// The DMA unit can only halt the CPU on a read cycle, and repeats this
    /// read while the CPU is halted.
    pub fn pending_read(&self) -> Option<u16> {
        let address = match self.state {
            State::ZeroPageIndexedAdd { base, .. } => base as u16,
            State::IndexedIndirectAdd { pointer, .. }
            | State::IndexedIndirectLow { pointer, .. }
            | State::IndirectIndexedLow { pointer, .. } => pointer as u16,
            State::IndexedIndirectHigh { pointer, .. }
            | State::IndirectIndexedHigh { pointer, .. } => pointer.wrapping_add(1) as u16,
            State::PageFixup { uncorrected, .. } => uncorrected,
            State::Execute { op, address } => match op {
                Operation::Read(_) | Operation::Modify(_) => address,
                Operation::Write(_) | Operation::Unstable(_) => return None,
            },
            State::ModifyWriteBack { .. }
            | State::WriteValue { .. }
            | State::JsrPushHigh { .. }
            | State::JsrPushLow { .. }
            | State::PushWrite(_) => return None,
            State::InterruptPushHigh(kind)
            | State::InterruptPushLow(kind)
            | State::InterruptPushStatus(kind) => {
                if kind != Interrupt::Reset {
                    return None;
                }
                self.stack_address()
            }
            State::JmpIndirectTargetLow { pointer } => pointer,
            State::JmpIndirectTargetHigh { pointer, .. } => {
                (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF)
            }
            State::JsrStackRead { .. }
            | State::RtsIncrementSp
            | State::RtsPullLow
            | State::RtsPullHigh { .. }
            | State::RtiIncrementSp
            | State::RtiPullStatus
            | State::RtiPullLow
            | State::RtiPullHigh { .. }
            | State::PullIncrementSp(_)
            | State::PullRead(_) => self.stack_address(),
            State::InterruptVectorLow { vector } => vector,
            State::InterruptVectorHigh { vector, .. } => vector.wrapping_add(1),
            State::Jam => 0xFFFF,
            // Opcode, operand and dummy reads at PC
            State::FetchOpcode
            | State::Immediate(_)
            | State::Implied(_)
            | State::Accumulator(_)
            | State::ZeroPage(_)
            | State::ZeroPageIndexed(..)
            | State::Absolute(_)
            | State::AbsoluteHigh { .. }
            | State::AbsoluteIndexed(..)
            | State::AbsoluteIndexedHigh { .. }
            | State::IndexedIndirect(_)
            | State::IndirectIndexed(_)
            | State::Branch(_)
            | State::BranchTaken { .. }
            | State::BranchFixup { .. }
            | State::JmpAbsolute
            | State::JmpAbsoluteHigh { .. }
            | State::JmpIndirect
            | State::JmpIndirectHigh { .. }
            | State::Jsr
            | State::JsrHigh { .. }
            | State::Rts
            | State::RtsIncrementPc
            | State::Rti
            | State::Push(_)
            | State::Pull(_)
            | State::Reset
            | State::InterruptPadding(_) => self.pc,
        };
        Some(address)
    }

    /// Sample NMI (edge) and IRQ (level) at the end of a cycle
    fn poll_interrupts<B: CpuBus + ?Sized>(&mut self, bus: &B) {
        let nmi = bus.nmi_line();
        if nmi && !self.nmi_previous {
            self.nmi_pending = true;
        }
        self.nmi_previous = nmi;

        self.interrupt_previous = self.interrupt_latched;
        self.interrupt_latched =
            self.nmi_pending || (bus.irq_line() && !self.get_interrupt_disable());
    }

    /// Final cycle of SHA/SHX/SHY/TAS
    ///
    /// The stored value is ANDed with the base high byte plus one; when the
    /// index crossed a page, that value also replaces the target high byte.
    fn unstable_store(&mut self, store: UnstableStore, uncorrected: u16, address: u16) -> State {
        let high = (uncorrected >> 8) as u8;
        let value = self.unstable_value(store) & high.wrapping_add(1);
        let address = if uncorrected != address {
            ((value as u16) << 8) | (address & 0x00FF)
        } else {
            address
        };
        State::WriteValue { address, value }
    }

    // ========================================
    // Bus helpers
    // ========================================

    /// Read the byte at PC and advance PC
    #[inline]
    fn fetch<B: CpuBus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    #[inline]
    fn index(&self, index: Index) -> u8 {
        match index {
            Index::X => self.x,
            Index::Y => self.y,
        }
    }

    #[inline]
    fn stack_address(&self) -> u16 {
        STACK_BASE | self.sp as u16
    }

    fn push<B: CpuBus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        bus.write(self.stack_address(), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Read the current stack byte, then increment SP
    fn pull<B: CpuBus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.stack_address());
        self.sp = self.sp.wrapping_add(1);
        value
    }

    fn stack_dummy_read<B: CpuBus + ?Sized>(&mut self, bus: &mut B) {
        self.pull(bus);
    }

    /// RESET performs the three stack cycles as reads
    fn interrupt_push<B: CpuBus + ?Sized>(&mut self, bus: &mut B, kind: Interrupt, value: u8) {
        if kind == Interrupt::Reset {
            bus.read(self.stack_address());
            self.sp = self.sp.wrapping_sub(1);
        } else {
            self.push(bus, value);
        }
    }
}
