// Instruction semantics
//
// Register and flag effects of every operation tag. Memory access and timing
// live in the pipeline; these functions only see operand values.

use super::flags;
use super::pipeline::{Condition, ImpliedOp, ModifyOp, ReadOp, UnstableStore, WriteOp};
use super::Cpu;

/// Constant ORed into A by the unstable XAA/LXA opcodes
const UNSTABLE_MAGIC: u8 = 0xEE;

impl Cpu {
    // ========================================
    // Read operations
    // ========================================

    pub(super) fn execute_read(&mut self, op: ReadOp, value: u8) {
        match op {
            ReadOp::Adc => self.add_with_carry(value),
            ReadOp::Sbc => self.add_with_carry(!value),
            ReadOp::And => self.set_a(self.a & value),
            ReadOp::Eor => self.set_a(self.a ^ value),
            ReadOp::Ora => self.set_a(self.a | value),
            ReadOp::Bit => {
                self.set_zero(self.a & value == 0);
                self.set_overflow(value & 0x40 != 0);
                self.set_negative(value & 0x80 != 0);
            }
            ReadOp::Cmp => self.compare(self.a, value),
            ReadOp::Cpx => self.compare(self.x, value),
            ReadOp::Cpy => self.compare(self.y, value),
            ReadOp::Lda => self.set_a(value),
            ReadOp::Ldx => self.set_x(value),
            ReadOp::Ldy => self.set_y(value),
            ReadOp::Nop => {}
            ReadOp::Lax => {
                self.x = value;
                self.set_a(value);
            }
            ReadOp::Anc => {
                self.set_a(self.a & value);
                self.set_carry(self.a & 0x80 != 0);
            }
            ReadOp::Alr => {
                let masked = self.a & value;
                self.set_carry(masked & 0x01 != 0);
                self.set_a(masked >> 1);
            }
            ReadOp::Arr => {
                let masked = self.a & value;
                let result = (masked >> 1) | ((self.get_carry() as u8) << 7);
                self.set_a(result);
                self.set_carry(result & 0x40 != 0);
                self.set_overflow(((result >> 6) ^ (result >> 5)) & 1 != 0);
            }
            ReadOp::Axs => {
                let masked = self.a & self.x;
                self.set_carry(masked >= value);
                self.set_x(masked.wrapping_sub(value));
            }
            ReadOp::Xaa => self.set_a((self.a | UNSTABLE_MAGIC) & self.x & value),
            ReadOp::Lxa => {
                let result = (self.a | UNSTABLE_MAGIC) & value;
                self.x = result;
                self.set_a(result);
            }
            ReadOp::Las => {
                let result = value & self.sp;
                self.sp = result;
                self.x = result;
                self.set_a(result);
            }
        }
    }

    // ========================================
    // Write operations
    // ========================================

    pub(super) fn write_value(&self, op: WriteOp) -> u8 {
        match op {
            WriteOp::Sta => self.a,
            WriteOp::Stx => self.x,
            WriteOp::Sty => self.y,
            WriteOp::Sax => self.a & self.x,
        }
    }

    /// Value an unstable store ANDs with the target high byte plus one
    pub(super) fn unstable_value(&mut self, op: UnstableStore) -> u8 {
        match op {
            UnstableStore::Sha => self.a & self.x,
            UnstableStore::Shx => self.x,
            UnstableStore::Shy => self.y,
            UnstableStore::Tas => {
                self.sp = self.a & self.x;
                self.sp
            }
        }
    }

    // ========================================
    // Read-modify-write operations
    // ========================================

    /// Apply a read-modify-write operation and return the byte to store
    pub(super) fn execute_modify(&mut self, op: ModifyOp, value: u8) -> u8 {
        match op {
            ModifyOp::Asl => self.shift_left(value),
            ModifyOp::Lsr => self.shift_right(value),
            ModifyOp::Rol => self.rotate_left(value),
            ModifyOp::Ror => self.rotate_right(value),
            ModifyOp::Inc => {
                let result = value.wrapping_add(1);
                self.update_zero_and_negative_flags(result);
                result
            }
            ModifyOp::Dec => {
                let result = value.wrapping_sub(1);
                self.update_zero_and_negative_flags(result);
                result
            }
            ModifyOp::Slo => {
                let result = self.shift_left(value);
                self.set_a(self.a | result);
                result
            }
            ModifyOp::Rla => {
                let result = self.rotate_left(value);
                self.set_a(self.a & result);
                result
            }
            ModifyOp::Sre => {
                let result = self.shift_right(value);
                self.set_a(self.a ^ result);
                result
            }
            ModifyOp::Rra => {
                let result = self.rotate_right(value);
                self.add_with_carry(result);
                result
            }
            ModifyOp::Dcp => {
                let result = value.wrapping_sub(1);
                self.compare(self.a, result);
                result
            }
            ModifyOp::Isc => {
                let result = value.wrapping_add(1);
                self.add_with_carry(!result);
                result
            }
        }
    }

    // ========================================
    // Implied operations
    // ========================================

    pub(super) fn execute_implied(&mut self, op: ImpliedOp) {
        match op {
            ImpliedOp::Clc => self.set_carry(false),
            ImpliedOp::Cld => self.set_decimal(false),
            ImpliedOp::Cli => self.set_interrupt_disable(false),
            ImpliedOp::Clv => self.set_overflow(false),
            ImpliedOp::Sec => self.set_carry(true),
            ImpliedOp::Sed => self.set_decimal(true),
            ImpliedOp::Sei => self.set_interrupt_disable(true),
            ImpliedOp::Tax => self.set_x(self.a),
            ImpliedOp::Tay => self.set_y(self.a),
            ImpliedOp::Tsx => self.set_x(self.sp),
            ImpliedOp::Txa => self.set_a(self.x),
            // TXS is the one transfer that leaves the flags alone
            ImpliedOp::Txs => self.sp = self.x,
            ImpliedOp::Tya => self.set_a(self.y),
            ImpliedOp::Inx => self.set_x(self.x.wrapping_add(1)),
            ImpliedOp::Iny => self.set_y(self.y.wrapping_add(1)),
            ImpliedOp::Dex => self.set_x(self.x.wrapping_sub(1)),
            ImpliedOp::Dey => self.set_y(self.y.wrapping_sub(1)),
            ImpliedOp::Nop => {}
        }
    }

    pub(super) fn branch_taken(&self, condition: Condition) -> bool {
        match condition {
            Condition::Plus => !self.get_negative(),
            Condition::Minus => self.get_negative(),
            Condition::OverflowClear => !self.get_overflow(),
            Condition::OverflowSet => self.get_overflow(),
            Condition::CarryClear => !self.get_carry(),
            Condition::CarrySet => self.get_carry(),
            Condition::NotEqual => !self.get_zero(),
            Condition::Equal => self.get_zero(),
        }
    }

    // ========================================
    // ALU helpers
    // ========================================

    fn set_a(&mut self, value: u8) {
        self.a = value;
        self.update_zero_and_negative_flags(value);
    }

    fn set_x(&mut self, value: u8) {
        self.x = value;
        self.update_zero_and_negative_flags(value);
    }

    fn set_y(&mut self, value: u8) {
        self.y = value;
        self.update_zero_and_negative_flags(value);
    }

    /// Binary add; the NES 2A03 has no decimal mode
    fn add_with_carry(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.get_carry() as u16;
        let result = sum as u8;
        self.set_carry(sum > 0xFF);
        self.set_overflow((self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.set_a(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_carry(register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
    }

    fn shift_left(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn shift_right(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rotate_left(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.get_carry() as u8;
        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rotate_right(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | ((self.get_carry() as u8) << 7);
        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    /// Status byte as pushed by PHP/BRK (`brk`) or IRQ/NMI
    pub(super) fn status_for_push(&self, brk: bool) -> u8 {
        let status = self.status | flags::UNUSED;
        if brk {
            status | flags::BREAK
        } else {
            status & !flags::BREAK
        }
    }

    /// Load P from the stack; bits 4 and 5 do not exist in the register
    pub(super) fn set_status_from_stack(&mut self, value: u8) {
        self.status = (value & !flags::BREAK) | flags::UNUSED;
    }
}
