// Disassembler - 6502 instruction disassembly
//
// Converts raw bytes into 6502 assembly using the CPU's opcode table, in the
// spelling nestest logs use (undocumented opcodes are starred).

use crate::bus::Bus;
use crate::cpu::{AddressingMode, OPCODE_TABLE};

/// Disassembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInstruction {
    /// Address where the instruction is located
    pub address: u16,

    /// Opcode byte
    pub opcode: u8,

    /// Mnemonic (e.g., "LDA", "STA", "JMP")
    pub mnemonic: &'static str,

    pub addressing_mode: AddressingMode,

    /// Operand bytes
    pub operands: Vec<u8>,

    /// Not part of the documented instruction set
    pub undocumented: bool,
}

impl DisassembledInstruction {
    /// Total instruction length in bytes
    pub fn length(&self) -> u8 {
        1 + self.operands.len() as u8
    }

    fn operand_byte(&self) -> u8 {
        self.operands.first().copied().unwrap_or(0)
    }

    fn operand_word(&self) -> u16 {
        u16::from_le_bytes([
            self.operand_byte(),
            self.operands.get(1).copied().unwrap_or(0),
        ])
    }

    /// Format the instruction as assembly code
    ///
    /// # Returns
    ///
    /// A string like "LDA #$42", "LSR A" or "JMP ($0200)"
    pub fn format_assembly(&self) -> String {
        let operand = match self.addressing_mode {
            AddressingMode::Implied => String::new(),
            AddressingMode::Accumulator => " A".to_string(),
            AddressingMode::Immediate => format!(" #${:02X}", self.operand_byte()),
            AddressingMode::ZeroPage => format!(" ${:02X}", self.operand_byte()),
            AddressingMode::ZeroPageX => format!(" ${:02X},X", self.operand_byte()),
            AddressingMode::ZeroPageY => format!(" ${:02X},Y", self.operand_byte()),
            AddressingMode::Absolute => format!(" ${:04X}", self.operand_word()),
            AddressingMode::AbsoluteX => format!(" ${:04X},X", self.operand_word()),
            AddressingMode::AbsoluteY => format!(" ${:04X},Y", self.operand_word()),
            AddressingMode::Indirect => format!(" (${:04X})", self.operand_word()),
            AddressingMode::IndexedIndirect => format!(" (${:02X},X)", self.operand_byte()),
            AddressingMode::IndirectIndexed => format!(" (${:02X}),Y", self.operand_byte()),
            AddressingMode::Relative => {
                let offset = self.operand_byte() as i8;
                let target = self.address.wrapping_add(2).wrapping_add(offset as u16);
                format!(" ${:04X}", target)
            }
        };

        format!("{}{}", self.mnemonic, operand)
    }

    /// Format the instruction bytes as hex
    ///
    /// # Returns
    ///
    /// A string like "A9 42" or "4C 00 80"
    pub fn format_bytes(&self) -> String {
        let mut result = format!("{:02X}", self.opcode);

        for operand in &self.operands {
            result.push_str(&format!(" {:02X}", operand));
        }

        result
    }
}

impl std::fmt::Display for DisassembledInstruction {
    /// nestest column layout: address, bytes, star marker, assembly
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04X}  {:<9}{}{:<31}",
            self.address,
            self.format_bytes(),
            if self.undocumented { '*' } else { ' ' },
            self.format_assembly()
        )
    }
}

/// Disassemble the instruction at `addr`
///
/// Memory is read with [`Bus::peek`], so disassembling has no side effects
/// on PPU registers or the controller port.
///
/// # Example
///
/// ```
/// use cyclenes::debug::disassemble_instruction;
/// use cyclenes::{Bus, MemoryMappedDevice};
///
/// let mut bus = Bus::new();
/// bus.write(0x0200, 0xA9);
/// bus.write(0x0201, 0x42);
/// let instruction = disassemble_instruction(0x0200, &bus);
/// assert_eq!(instruction.format_assembly(), "LDA #$42");
/// ```
pub fn disassemble_instruction(addr: u16, bus: &Bus) -> DisassembledInstruction {
    let opcode = bus.peek(addr);
    let info = &OPCODE_TABLE[opcode as usize];

    let operands = (1..info.bytes())
        .map(|i| bus.peek(addr.wrapping_add(u16::from(i))))
        .collect();

    DisassembledInstruction {
        address: addr,
        opcode,
        mnemonic: info.mnemonic(),
        addressing_mode: info.mode,
        operands,
        undocumented: info.undocumented,
    }
}

/// Disassemble a range of memory
///
/// # Arguments
///
/// * `start` - Start address
/// * `end` - End address (inclusive)
/// * `bus` - Bus to read memory from
pub fn disassemble_range(start: u16, end: u16, bus: &Bus) -> Vec<DisassembledInstruction> {
    let mut instructions = Vec::new();
    let mut addr = start;

    while addr <= end {
        let instruction = disassemble_instruction(addr, bus);
        addr = addr.wrapping_add(u16::from(instruction.length()));
        instructions.push(instruction);

        // Wrapped past $FFFF
        if addr < start {
            break;
        }
    }

    instructions
}

/// Disassemble a specific number of instructions
pub fn disassemble_count(start: u16, count: usize, bus: &Bus) -> Vec<DisassembledInstruction> {
    let mut instructions = Vec::with_capacity(count);
    let mut addr = start;

    for _ in 0..count {
        let instruction = disassemble_instruction(addr, bus);
        addr = addr.wrapping_add(u16::from(instruction.length()));
        instructions.push(instruction);
    }

    instructions
}
