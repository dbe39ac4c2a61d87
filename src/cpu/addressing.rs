// Addressing modes for the 6502
//
// Maps each mode to the pipeline state that begins its operand cycles, and
// resolves indexed addresses into either a direct access or a page fixup.

use super::pipeline::{Index, Operation, State};
use serde::{Deserialize, Serialize};

/// Addressing modes supported by the 6502
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressingMode {
    /// Implied - No operand (e.g., CLC, NOP)
    Implied,

    /// Accumulator - Operate on accumulator (e.g., LSR A)
    Accumulator,

    /// Immediate - 8-bit constant (e.g., LDA #$01)
    Immediate,

    /// Zero Page - Address in zero page $00-$FF (e.g., LDA $80)
    ZeroPage,

    /// Zero Page,X - Zero page address + X register (e.g., LDA $80,X)
    ZeroPageX,

    /// Zero Page,Y - Zero page address + Y register (e.g., LDX $80,Y)
    ZeroPageY,

    /// Relative - Signed 8-bit offset for branches (e.g., BNE label)
    Relative,

    /// Absolute - 16-bit address (e.g., LDA $8000)
    Absolute,

    /// Absolute,X - 16-bit address + X register (e.g., LDA $8000,X)
    AbsoluteX,

    /// Absolute,Y - 16-bit address + Y register (e.g., LDA $8000,Y)
    AbsoluteY,

    /// Indirect - 16-bit pointer (JMP only) (e.g., JMP ($FFFC))
    Indirect,

    /// Indexed Indirect - Zero page pointer + X (e.g., LDA ($40,X))
    IndexedIndirect,

    /// Indirect Indexed - Zero page pointer + Y (e.g., LDA ($40),Y)
    IndirectIndexed,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// First operand cycle of a memory operation in this mode
    ///
    /// # Panics
    ///
    /// Modes without a memory operand (implied, accumulator, immediate,
    /// relative, indirect) never carry an [`Operation`]; the opcode table is
    /// closed, so reaching one here is an emulator defect.
    pub fn entry_state(self, op: Operation) -> State {
        match self {
            AddressingMode::ZeroPage => State::ZeroPage(op),
            AddressingMode::ZeroPageX => State::ZeroPageIndexed(op, Index::X),
            AddressingMode::ZeroPageY => State::ZeroPageIndexed(op, Index::Y),
            AddressingMode::Absolute => State::Absolute(op),
            AddressingMode::AbsoluteX => State::AbsoluteIndexed(op, Index::X),
            AddressingMode::AbsoluteY => State::AbsoluteIndexed(op, Index::Y),
            AddressingMode::IndexedIndirect => State::IndexedIndirect(op),
            AddressingMode::IndirectIndexed => State::IndirectIndexed(op),
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Immediate
            | AddressingMode::Relative
            | AddressingMode::Indirect => {
                unreachable!("{:?} has no memory operand for {:?}", self, op)
            }
        }
    }
}

/// Helper function to check if a page boundary was crossed
#[inline]
pub fn page_crossed(base: u16, offset: u8) -> bool {
    let addr = base.wrapping_add(offset as u16);
    (base & 0xFF00) != (addr & 0xFF00)
}

/// Next state after an indexed base address is known
///
/// Reads that stay within the page go straight to the final access. Every
/// other case first reads the address whose high byte has not yet received
/// the carry: reads only when the page is crossed, writes and
/// read-modify-writes always.
pub fn resolve_indexed(op: Operation, base: u16, offset: u8) -> State {
    let address = base.wrapping_add(offset as u16);
    let uncorrected = (base & 0xFF00) | (address & 0x00FF);

    match op {
        Operation::Read(_) if !page_crossed(base, offset) => State::Execute { op, address },
        _ => State::PageFixup {
            op,
            uncorrected,
            address,
        },
    }
}
