// Debug module - Tracing tools for the emulation core
//
// - CPU state capture and nestest-format trace lines
// - Side-effect free disassembly
// - Bounded trace logger with optional file output

pub mod cpu;
pub mod disassembler;
pub mod logger;

pub use cpu::{dump_stack, CpuState};
pub use disassembler::{
    disassemble_count, disassemble_instruction, disassemble_range, DisassembledInstruction,
};
pub use logger::Logger;
