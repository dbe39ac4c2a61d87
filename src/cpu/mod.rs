// CPU module - Cycle-stepped 6502 (2A03) core
//
// The CPU advances exactly one bus cycle per `tick`. Every tick performs one
// read or write on the bus, including the dummy accesses real hardware makes,
// so side-effecting registers (PPUSTATUS, PPUDATA, controller ports) observe the
// same access pattern a game would produce on a console.
//
// Interrupt lines are sampled at the end of every cycle. An instruction boundary
// acts on the value sampled at the end of the previous instruction's
// second-to-last cycle, which is where the 6502 makes its decision.

mod addressing;
mod execute;
mod instructions;
pub mod opcodes;
pub mod pipeline;


pub use addressing::AddressingMode;
pub use opcodes::{Instruction, Kind, OPCODE_TABLE};
pub use pipeline::State;

use serde::{Deserialize, Serialize};

/// Processor Status Flags (P register)
///
/// Bit layout:
/// ```text
/// 7  6  5  4  3  2  1  0
/// N  V  -  B  D  I  Z  C
/// ```
///
/// Bits 4 and 5 only exist on the stack: the register always reads with
/// bit 5 set and bit 4 clear.
pub mod flags {
    pub const CARRY: u8 = 0b0000_0001; // Bit 0: C
    pub const ZERO: u8 = 0b0000_0010; // Bit 1: Z
    pub const INTERRUPT_DISABLE: u8 = 0b0000_0100; // Bit 2: I
    pub const DECIMAL: u8 = 0b0000_1000; // Bit 3: D (no effect on the 2A03)
    pub const BREAK: u8 = 0b0001_0000; // Bit 4: B (stack copies only)
    pub const UNUSED: u8 = 0b0010_0000; // Bit 5: - (always 1)
    pub const OVERFLOW: u8 = 0b0100_0000; // Bit 6: V
    pub const NEGATIVE: u8 = 0b1000_0000; // Bit 7: N
}

/// Stack page base address
pub(crate) const STACK_BASE: u16 = 0x0100;

/// Interrupt vectors
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// CPU structure representing the 6502 processor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    // Registers
    pub a: u8,      // Accumulator
    pub x: u8,      // Index Register X
    pub y: u8,      // Index Register Y
    pub sp: u8,     // Stack Pointer
    pub pc: u16,    // Program Counter
    pub status: u8, // Processor Status flags

    /// Total CPU cycles executed since power-on
    pub cycles: u64,

    /// Cycle to perform on the next tick
    state: State,

    /// NMI line level at the previous sample (edge detection)
    nmi_previous: bool,
    /// A falling NMI edge was seen and has not been serviced yet
    nmi_pending: bool,
    /// Interrupt wanted, as sampled at the end of the last cycle
    interrupt_latched: bool,
    /// Interrupt wanted, as sampled one cycle earlier
    interrupt_previous: bool,
}

impl Cpu {
    /// Create a CPU in its power-on state
    ///
    /// The registers are cleared, SP starts at $00 and the reset sequence is
    /// queued. Its three suppressed stack pushes bring SP to $FD and load PC
    /// from $FFFC-$FFFD over the first seven ticks.
    pub fn new() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0x00,
            pc: 0,
            status: flags::UNUSED | flags::INTERRUPT_DISABLE,
            cycles: 0,
            state: State::Reset,
            nmi_previous: false,
            nmi_pending: false,
            interrupt_latched: false,
            interrupt_previous: false,
        }
    }

    /// Assert RESET
    ///
    /// Registers keep their values; the seven-cycle reset sequence starts on
    /// the next tick, lowering SP by three and setting I.
    pub fn reset(&mut self) {
        self.state = State::Reset;
        self.nmi_pending = false;
        self.interrupt_latched = false;
        self.interrupt_previous = false;
    }

    /// Continue execution at `addr` from an instruction boundary
    ///
    /// Used by test harnesses that start a ROM somewhere other than its
    /// reset vector (nestest automation mode runs from $C000).
    pub fn jump_to(&mut self, addr: u16) {
        self.pc = addr;
        self.state = State::FetchOpcode;
    }

    /// The next tick fetches an opcode (or starts a pending interrupt)
    pub fn at_instruction_boundary(&self) -> bool {
        self.state == State::FetchOpcode
    }

    /// The CPU executed a JAM opcode and will not run again until reset
    pub fn is_jammed(&self) -> bool {
        self.state == State::Jam
    }

    /// Cycle the CPU performs next
    pub fn state(&self) -> State {
        self.state
    }

    // ========================================
    // Status Flag Manipulation Methods
    // ========================================

    /// Get the value of a specific flag
    #[inline]
    pub fn get_flag(&self, flag: u8) -> bool {
        (self.status & flag) != 0
    }

    /// Update a flag based on a condition
    #[inline]
    pub fn update_flag(&mut self, flag: u8, condition: bool) {
        if condition {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    #[inline]
    pub fn get_carry(&self) -> bool {
        self.get_flag(flags::CARRY)
    }

    #[inline]
    pub fn get_zero(&self) -> bool {
        self.get_flag(flags::ZERO)
    }

    #[inline]
    pub fn get_interrupt_disable(&self) -> bool {
        self.get_flag(flags::INTERRUPT_DISABLE)
    }

    #[inline]
    pub fn get_decimal(&self) -> bool {
        self.get_flag(flags::DECIMAL)
    }

    #[inline]
    pub fn get_overflow(&self) -> bool {
        self.get_flag(flags::OVERFLOW)
    }

    #[inline]
    pub fn get_negative(&self) -> bool {
        self.get_flag(flags::NEGATIVE)
    }

    #[inline]
    pub fn set_carry(&mut self, value: bool) {
        self.update_flag(flags::CARRY, value);
    }

    #[inline]
    pub fn set_zero(&mut self, value: bool) {
        self.update_flag(flags::ZERO, value);
    }

    #[inline]
    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.update_flag(flags::INTERRUPT_DISABLE, value);
    }

    /// Set Decimal mode flag (D); stored, but arithmetic stays binary
    #[inline]
    pub fn set_decimal(&mut self, value: bool) {
        self.update_flag(flags::DECIMAL, value);
    }

    #[inline]
    pub fn set_overflow(&mut self, value: bool) {
        self.update_flag(flags::OVERFLOW, value);
    }

    #[inline]
    pub fn set_negative(&mut self, value: bool) {
        self.update_flag(flags::NEGATIVE, value);
    }

    /// Update Zero and Negative flags from a result byte
    #[inline]
    pub fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_zero(value == 0);
        self.set_negative((value & 0x80) != 0);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
