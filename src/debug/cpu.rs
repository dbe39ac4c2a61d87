// CPU trace records
//
// Provides:
// - CPU state capture at instruction boundaries
// - nestest-format trace lines
// - Register and stack dumps

use super::disassembler::{disassemble_instruction, DisassembledInstruction};
use crate::bus::Bus;
use crate::cpu::{flags, Cpu};

/// CPU state snapshot
///
/// Captured before the instruction at `pc` executes. `cycles` counts every
/// CPU cycle since power-on, DMA cycles included, as nestest's `CYC` column
/// does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    /// Program Counter
    pub pc: u16,

    /// Accumulator
    pub a: u8,

    /// X register
    pub x: u8,

    /// Y register
    pub y: u8,

    /// Stack Pointer
    pub sp: u8,

    /// Status flags
    pub status: u8,

    /// Cycle count
    pub cycles: u64,

    /// PPU position at capture time
    pub scanline: u16,
    pub dot: u16,

    /// Instruction about to execute
    pub instruction: DisassembledInstruction,
}

impl CpuState {
    /// Capture the CPU and PPU position without side effects
    ///
    /// # Arguments
    ///
    /// * `cpu` - CPU at an instruction boundary
    /// * `bus` - Bus used to read the instruction bytes
    /// * `cycles` - Total CPU cycles executed so far
    pub fn capture(cpu: &Cpu, bus: &Bus, cycles: u64) -> Self {
        CpuState {
            pc: cpu.pc,
            a: cpu.a,
            x: cpu.x,
            y: cpu.y,
            sp: cpu.sp,
            status: cpu.status,
            cycles,
            scanline: bus.ppu().scanline(),
            dot: bus.ppu().dot(),
            instruction: disassemble_instruction(cpu.pc, bus),
        }
    }

    /// Format the status flags as a string
    ///
    /// # Returns
    ///
    /// A string representation of the status flags (e.g., "NV-BDIZC")
    pub fn format_status(&self) -> String {
        let flag = |mask: u8, set: char| {
            if self.status & mask != 0 {
                set
            } else {
                set.to_ascii_lowercase()
            }
        };

        [
            flag(flags::NEGATIVE, 'N'),
            flag(flags::OVERFLOW, 'V'),
            '-',
            flag(flags::BREAK, 'B'),
            flag(flags::DECIMAL, 'D'),
            flag(flags::INTERRUPT_DISABLE, 'I'),
            flag(flags::ZERO, 'Z'),
            flag(flags::CARRY, 'C'),
        ]
        .iter()
        .collect()
    }

    /// Register columns of a nestest log line
    pub fn format_registers(&self) -> String {
        format!(
            "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            self.a, self.x, self.y, self.status, self.sp
        )
    }
}

impl std::fmt::Display for CpuState {
    /// `C000  4C F5 C5  JMP $C5F5    ...    A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} PPU:{:>3},{:>3} CYC:{}",
            self.instruction,
            self.format_registers(),
            self.scanline,
            self.dot,
            self.cycles
        )
    }
}

/// Hex dump of the stack page with the stack pointer bracketed
pub fn dump_stack(cpu: &Cpu, bus: &Bus) -> String {
    let mut output = format!("Stack (SP = ${:02X}):\n", cpu.sp);

    for row in 0..16u16 {
        let base_addr = 0x0100 + row * 16;
        output.push_str(&format!("  ${:04X}: ", base_addr));

        for col in 0..16 {
            let addr = base_addr + col;
            let value = bus.peek(addr);

            if (addr & 0xFF) as u8 == cpu.sp {
                output.push_str(&format!("[{:02X}] ", value));
            } else {
                output.push_str(&format!("{:02X} ", value));
            }
        }

        output.push('\n');
    }

    output
}
