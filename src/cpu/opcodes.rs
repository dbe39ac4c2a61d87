// Opcode table - the closed 256-entry 6502 decode
//
// Every byte maps to an instruction, undocumented ones included; the twelve
// JAM opcodes halt the processor.

use super::addressing::AddressingMode;
use super::pipeline::{
    Condition, ImpliedOp, Interrupt, ModifyOp, Operation, PullOp, PushOp, ReadOp, State,
    UnstableStore, WriteOp,
};

/// What an opcode does, independent of its addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Read(ReadOp),
    Write(WriteOp),
    Modify(ModifyOp),
    Unstable(UnstableStore),
    Implied(ImpliedOp),
    Branch(Condition),
    Push(PushOp),
    Pull(PullOp),
    Jmp,
    Jsr,
    Rts,
    Rti,
    Brk,
    Jam,
}

/// Opcode table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub kind: Kind,
    pub mode: AddressingMode,
    /// Not part of the documented 6502 instruction set
    pub undocumented: bool,
}

impl Instruction {
    const fn new(kind: Kind, mode: AddressingMode) -> Self {
        Instruction {
            kind,
            mode,
            undocumented: false,
        }
    }

    const fn unofficial(mut self) -> Self {
        self.undocumented = true;
        self
    }

    /// Instruction length including the opcode byte
    pub const fn bytes(&self) -> u8 {
        1 + self.mode.operand_bytes()
    }

    /// Assembler mnemonic (nestest spelling for undocumented opcodes)
    pub const fn mnemonic(&self) -> &'static str {
        match self.kind {
            Kind::Read(op) => match op {
                ReadOp::Adc => "ADC",
                ReadOp::And => "AND",
                ReadOp::Bit => "BIT",
                ReadOp::Cmp => "CMP",
                ReadOp::Cpx => "CPX",
                ReadOp::Cpy => "CPY",
                ReadOp::Eor => "EOR",
                ReadOp::Lda => "LDA",
                ReadOp::Ldx => "LDX",
                ReadOp::Ldy => "LDY",
                ReadOp::Ora => "ORA",
                ReadOp::Sbc => "SBC",
                ReadOp::Nop => "NOP",
                ReadOp::Lax => "LAX",
                ReadOp::Anc => "ANC",
                ReadOp::Alr => "ALR",
                ReadOp::Arr => "ARR",
                ReadOp::Axs => "AXS",
                ReadOp::Xaa => "XAA",
                ReadOp::Lxa => "LXA",
                ReadOp::Las => "LAS",
            },
            Kind::Write(op) => match op {
                WriteOp::Sta => "STA",
                WriteOp::Stx => "STX",
                WriteOp::Sty => "STY",
                WriteOp::Sax => "SAX",
            },
            Kind::Modify(op) => match op {
                ModifyOp::Asl => "ASL",
                ModifyOp::Lsr => "LSR",
                ModifyOp::Rol => "ROL",
                ModifyOp::Ror => "ROR",
                ModifyOp::Inc => "INC",
                ModifyOp::Dec => "DEC",
                ModifyOp::Slo => "SLO",
                ModifyOp::Rla => "RLA",
                ModifyOp::Sre => "SRE",
                ModifyOp::Rra => "RRA",
                ModifyOp::Dcp => "DCP",
                ModifyOp::Isc => "ISB",
            },
            Kind::Unstable(op) => match op {
                UnstableStore::Sha => "SHA",
                UnstableStore::Shx => "SHX",
                UnstableStore::Shy => "SHY",
                UnstableStore::Tas => "TAS",
            },
            Kind::Implied(op) => match op {
                ImpliedOp::Clc => "CLC",
                ImpliedOp::Cld => "CLD",
                ImpliedOp::Cli => "CLI",
                ImpliedOp::Clv => "CLV",
                ImpliedOp::Sec => "SEC",
                ImpliedOp::Sed => "SED",
                ImpliedOp::Sei => "SEI",
                ImpliedOp::Tax => "TAX",
                ImpliedOp::Tay => "TAY",
                ImpliedOp::Tsx => "TSX",
                ImpliedOp::Txa => "TXA",
                ImpliedOp::Txs => "TXS",
                ImpliedOp::Tya => "TYA",
                ImpliedOp::Inx => "INX",
                ImpliedOp::Iny => "INY",
                ImpliedOp::Dex => "DEX",
                ImpliedOp::Dey => "DEY",
                ImpliedOp::Nop => "NOP",
            },
            Kind::Branch(condition) => match condition {
                Condition::Plus => "BPL",
                Condition::Minus => "BMI",
                Condition::OverflowClear => "BVC",
                Condition::OverflowSet => "BVS",
                Condition::CarryClear => "BCC",
                Condition::CarrySet => "BCS",
                Condition::NotEqual => "BNE",
                Condition::Equal => "BEQ",
            },
            Kind::Push(PushOp::Pha) => "PHA",
            Kind::Push(PushOp::Php) => "PHP",
            Kind::Pull(PullOp::Pla) => "PLA",
            Kind::Pull(PullOp::Plp) => "PLP",
            Kind::Jmp => "JMP",
            Kind::Jsr => "JSR",
            Kind::Rts => "RTS",
            Kind::Rti => "RTI",
            Kind::Brk => "BRK",
            Kind::Jam => "JAM",
        }
    }

    /// Pipeline state that follows the opcode fetch
    pub fn first_state(&self) -> State {
        match (self.kind, self.mode) {
            (Kind::Read(op), AddressingMode::Immediate) => State::Immediate(op),
            (Kind::Modify(op), AddressingMode::Accumulator) => State::Accumulator(op),
            (Kind::Read(op), mode) => mode.entry_state(Operation::Read(op)),
            (Kind::Write(op), mode) => mode.entry_state(Operation::Write(op)),
            (Kind::Modify(op), mode) => mode.entry_state(Operation::Modify(op)),
            (Kind::Unstable(op), mode) => mode.entry_state(Operation::Unstable(op)),
            (Kind::Implied(op), _) => State::Implied(op),
            (Kind::Branch(condition), _) => State::Branch(condition),
            (Kind::Push(op), _) => State::Push(op),
            (Kind::Pull(op), _) => State::Pull(op),
            (Kind::Jmp, AddressingMode::Indirect) => State::JmpIndirect,
            (Kind::Jmp, _) => State::JmpAbsolute,
            (Kind::Jsr, _) => State::Jsr,
            (Kind::Rts, _) => State::Rts,
            (Kind::Rti, _) => State::Rti,
            (Kind::Brk, _) => State::InterruptPadding(Interrupt::Break),
            (Kind::Jam, _) => State::Jam,
        }
    }
}

/// Decode table indexed by opcode
pub static OPCODE_TABLE: [Instruction; 256] = build_table();

/// Pipeline state entered after fetching `opcode`
#[inline]
pub fn decode(opcode: u8) -> State {
    OPCODE_TABLE[opcode as usize].first_state()
}

const fn build_table() -> [Instruction; 256] {
    let mut table = [Instruction::new(Kind::Jam, AddressingMode::Implied); 256];
    let mut opcode = 0;
    while opcode < 256 {
        table[opcode] = describe(opcode as u8);
        opcode += 1;
    }
    table
}

#[allow(clippy::too_many_lines)]
const fn describe(opcode: u8) -> Instruction {
    use AddressingMode as Mode;

    const fn read(op: ReadOp, mode: AddressingMode) -> Instruction {
        Instruction::new(Kind::Read(op), mode)
    }
    const fn write(op: WriteOp, mode: AddressingMode) -> Instruction {
        Instruction::new(Kind::Write(op), mode)
    }
    const fn modify(op: ModifyOp, mode: AddressingMode) -> Instruction {
        Instruction::new(Kind::Modify(op), mode)
    }
    const fn unstable(op: UnstableStore, mode: AddressingMode) -> Instruction {
        Instruction::new(Kind::Unstable(op), mode).unofficial()
    }
    const fn implied(op: ImpliedOp) -> Instruction {
        Instruction::new(Kind::Implied(op), AddressingMode::Implied)
    }
    const fn branch(condition: Condition) -> Instruction {
        Instruction::new(Kind::Branch(condition), AddressingMode::Relative)
    }
    const fn nop(mode: AddressingMode) -> Instruction {
        match mode {
            AddressingMode::Implied => implied(ImpliedOp::Nop).unofficial(),
            _ => read(ReadOp::Nop, mode).unofficial(),
        }
    }
    const fn jam() -> Instruction {
        Instruction::new(Kind::Jam, AddressingMode::Implied).unofficial()
    }

    match opcode {
        // ---- $00-$1F ----
        0x00 => Instruction::new(Kind::Brk, Mode::Implied),
        0x01 => read(ReadOp::Ora, Mode::IndexedIndirect),
        0x02 => jam(),
        0x03 => modify(ModifyOp::Slo, Mode::IndexedIndirect).unofficial(),
        0x04 => nop(Mode::ZeroPage),
        0x05 => read(ReadOp::Ora, Mode::ZeroPage),
        0x06 => modify(ModifyOp::Asl, Mode::ZeroPage),
        0x07 => modify(ModifyOp::Slo, Mode::ZeroPage).unofficial(),
        0x08 => Instruction::new(Kind::Push(PushOp::Php), Mode::Implied),
        0x09 => read(ReadOp::Ora, Mode::Immediate),
        0x0A => modify(ModifyOp::Asl, Mode::Accumulator),
        0x0B => read(ReadOp::Anc, Mode::Immediate).unofficial(),
        0x0C => nop(Mode::Absolute),
        0x0D => read(ReadOp::Ora, Mode::Absolute),
        0x0E => modify(ModifyOp::Asl, Mode::Absolute),
        0x0F => modify(ModifyOp::Slo, Mode::Absolute).unofficial(),
        0x10 => branch(Condition::Plus),
        0x11 => read(ReadOp::Ora, Mode::IndirectIndexed),
        0x12 => jam(),
        0x13 => modify(ModifyOp::Slo, Mode::IndirectIndexed).unofficial(),
        0x14 => nop(Mode::ZeroPageX),
        0x15 => read(ReadOp::Ora, Mode::ZeroPageX),
        0x16 => modify(ModifyOp::Asl, Mode::ZeroPageX),
        0x17 => modify(ModifyOp::Slo, Mode::ZeroPageX).unofficial(),
        0x18 => implied(ImpliedOp::Clc),
        0x19 => read(ReadOp::Ora, Mode::AbsoluteY),
        0x1A => nop(Mode::Implied),
        0x1B => modify(ModifyOp::Slo, Mode::AbsoluteY).unofficial(),
        0x1C => nop(Mode::AbsoluteX),
        0x1D => read(ReadOp::Ora, Mode::AbsoluteX),
        0x1E => modify(ModifyOp::Asl, Mode::AbsoluteX),
        0x1F => modify(ModifyOp::Slo, Mode::AbsoluteX).unofficial(),

        // ---- $20-$3F ----
        0x20 => Instruction::new(Kind::Jsr, Mode::Absolute),
        0x21 => read(ReadOp::And, Mode::IndexedIndirect),
        0x22 => jam(),
        0x23 => modify(ModifyOp::Rla, Mode::IndexedIndirect).unofficial(),
        0x24 => read(ReadOp::Bit, Mode::ZeroPage),
        0x25 => read(ReadOp::And, Mode::ZeroPage),
        0x26 => modify(ModifyOp::Rol, Mode::ZeroPage),
        0x27 => modify(ModifyOp::Rla, Mode::ZeroPage).unofficial(),
        0x28 => Instruction::new(Kind::Pull(PullOp::Plp), Mode::Implied),
        0x29 => read(ReadOp::And, Mode::Immediate),
        0x2A => modify(ModifyOp::Rol, Mode::Accumulator),
        0x2B => read(ReadOp::Anc, Mode::Immediate).unofficial(),
        0x2C => read(ReadOp::Bit, Mode::Absolute),
        0x2D => read(ReadOp::And, Mode::Absolute),
        0x2E => modify(ModifyOp::Rol, Mode::Absolute),
        0x2F => modify(ModifyOp::Rla, Mode::Absolute).unofficial(),
        0x30 => branch(Condition::Minus),
        0x31 => read(ReadOp::And, Mode::IndirectIndexed),
        0x32 => jam(),
        0x33 => modify(ModifyOp::Rla, Mode::IndirectIndexed).unofficial(),
        0x34 => nop(Mode::ZeroPageX),
        0x35 => read(ReadOp::And, Mode::ZeroPageX),
        0x36 => modify(ModifyOp::Rol, Mode::ZeroPageX),
        0x37 => modify(ModifyOp::Rla, Mode::ZeroPageX).unofficial(),
        0x38 => implied(ImpliedOp::Sec),
        0x39 => read(ReadOp::And, Mode::AbsoluteY),
        0x3A => nop(Mode::Implied),
        0x3B => modify(ModifyOp::Rla, Mode::AbsoluteY).unofficial(),
        0x3C => nop(Mode::AbsoluteX),
        0x3D => read(ReadOp::And, Mode::AbsoluteX),
        0x3E => modify(ModifyOp::Rol, Mode::AbsoluteX),
        0x3F => modify(ModifyOp::Rla, Mode::AbsoluteX).unofficial(),

        // ---- $40-$5F ----
        0x40 => Instruction::new(Kind::Rti, Mode::Implied),
        0x41 => read(ReadOp::Eor, Mode::IndexedIndirect),
        0x42 => jam(),
        0x43 => modify(ModifyOp::Sre, Mode::IndexedIndirect).unofficial(),
        0x44 => nop(Mode::ZeroPage),
        0x45 => read(ReadOp::Eor, Mode::ZeroPage),
        0x46 => modify(ModifyOp::Lsr, Mode::ZeroPage),
        0x47 => modify(ModifyOp::Sre, Mode::ZeroPage).unofficial(),
        0x48 => Instruction::new(Kind::Push(PushOp::Pha), Mode::Implied),
        0x49 => read(ReadOp::Eor, Mode::Immediate),
        0x4A => modify(ModifyOp::Lsr, Mode::Accumulator),
        0x4B => read(ReadOp::Alr, Mode::Immediate).unofficial(),
        0x4C => Instruction::new(Kind::Jmp, Mode::Absolute),
        0x4D => read(ReadOp::Eor, Mode::Absolute),
        0x4E => modify(ModifyOp::Lsr, Mode::Absolute),
        0x4F => modify(ModifyOp::Sre, Mode::Absolute).unofficial(),
        0x50 => branch(Condition::OverflowClear),
        0x51 => read(ReadOp::Eor, Mode::IndirectIndexed),
        0x52 => jam(),
        0x53 => modify(ModifyOp::Sre, Mode::IndirectIndexed).unofficial(),
        0x54 => nop(Mode::ZeroPageX),
        0x55 => read(ReadOp::Eor, Mode::ZeroPageX),
        0x56 => modify(ModifyOp::Lsr, Mode::ZeroPageX),
        0x57 => modify(ModifyOp::Sre, Mode::ZeroPageX).unofficial(),
        0x58 => implied(ImpliedOp::Cli),
        0x59 => read(ReadOp::Eor, Mode::AbsoluteY),
        0x5A => nop(Mode::Implied),
        0x5B => modify(ModifyOp::Sre, Mode::AbsoluteY).unofficial(),
        0x5C => nop(Mode::AbsoluteX),
        0x5D => read(ReadOp::Eor, Mode::AbsoluteX),
        0x5E => modify(ModifyOp::Lsr, Mode::AbsoluteX),
        0x5F => modify(ModifyOp::Sre, Mode::AbsoluteX).unofficial(),

        // ---- $60-$7F ----
        0x60 => Instruction::new(Kind::Rts, Mode::Implied),
        0x61 => read(ReadOp::Adc, Mode::IndexedIndirect),
        0x62 => jam(),
        0x63 => modify(ModifyOp::Rra, Mode::IndexedIndirect).unofficial(),
        0x64 => nop(Mode::ZeroPage),
        0x65 => read(ReadOp::Adc, Mode::ZeroPage),
        0x66 => modify(ModifyOp::Ror, Mode::ZeroPage),
        0x67 => modify(ModifyOp::Rra, Mode::ZeroPage).unofficial(),
        0x68 => Instruction::new(Kind::Pull(PullOp::Pla), Mode::Implied),
        0x69 => read(ReadOp::Adc, Mode::Immediate),
        0x6A => modify(ModifyOp::Ror, Mode::Accumulator),
        0x6B => read(ReadOp::Arr, Mode::Immediate).unofficial(),
        0x6C => Instruction::new(Kind::Jmp, Mode::Indirect),
        0x6D => read(ReadOp::Adc, Mode::Absolute),
        0x6E => modify(ModifyOp::Ror, Mode::Absolute),
        0x6F => modify(ModifyOp::Rra, Mode::Absolute).unofficial(),
        0x70 => branch(Condition::OverflowSet),
        0x71 => read(ReadOp::Adc, Mode::IndirectIndexed),
        0x72 => jam(),
        0x73 => modify(ModifyOp::Rra, Mode::IndirectIndexed).unofficial(),
        0x74 => nop(Mode::ZeroPageX),
        0x75 => read(ReadOp::Adc, Mode::ZeroPageX),
        0x76 => modify(ModifyOp::Ror, Mode::ZeroPageX),
        0x77 => modify(ModifyOp::Rra, Mode::ZeroPageX).unofficial(),
        0x78 => implied(ImpliedOp::Sei),
        0x79 => read(ReadOp::Adc, Mode::AbsoluteY),
        0x7A => nop(Mode::Implied),
        0x7B => modify(ModifyOp::Rra, Mode::AbsoluteY).unofficial(),
        0x7C => nop(Mode::AbsoluteX),
        0x7D => read(ReadOp::Adc, Mode::AbsoluteX),
        0x7E => modify(ModifyOp::Ror, Mode::AbsoluteX),
        0x7F => modify(ModifyOp::Rra, Mode::AbsoluteX).unofficial(),

        // ---- $80-$9F ----
        0x80 => nop(Mode::Immediate),
        0x81 => write(WriteOp::Sta, Mode::IndexedIndirect),
        0x82 => nop(Mode::Immediate),
        0x83 => write(WriteOp::Sax, Mode::IndexedIndirect).unofficial(),
        0x84 => write(WriteOp::Sty, Mode::ZeroPage),
        0x85 => write(WriteOp::Sta, Mode::ZeroPage),
        0x86 => write(WriteOp::Stx, Mode::ZeroPage),
        0x87 => write(WriteOp::Sax, Mode::ZeroPage).unofficial(),
        0x88 => implied(ImpliedOp::Dey),
        0x89 => nop(Mode::Immediate),
        0x8A => implied(ImpliedOp::Txa),
        0x8B => read(ReadOp::Xaa, Mode::Immediate).unofficial(),
        0x8C => write(WriteOp::Sty, Mode::Absolute),
        0x8D => write(WriteOp::Sta, Mode::Absolute),
        0x8E => write(WriteOp::Stx, Mode::Absolute),
        0x8F => write(WriteOp::Sax, Mode::Absolute).unofficial(),
        0x90 => branch(Condition::CarryClear),
        0x91 => write(WriteOp::Sta, Mode::IndirectIndexed),
        0x92 => jam(),
        0x93 => unstable(UnstableStore::Sha, Mode::IndirectIndexed),
        0x94 => write(WriteOp::Sty, Mode::ZeroPageX),
        0x95 => write(WriteOp::Sta, Mode::ZeroPageX),
        0x96 => write(WriteOp::Stx, Mode::ZeroPageY),
        0x97 => write(WriteOp::Sax, Mode::ZeroPageY).unofficial(),
        0x98 => implied(ImpliedOp::Tya),
        0x99 => write(WriteOp::Sta, Mode::AbsoluteY),
        0x9A => implied(ImpliedOp::Txs),
        0x9B => unstable(UnstableStore::Tas, Mode::AbsoluteY),
        0x9C => unstable(UnstableStore::Shy, Mode::AbsoluteX),
        0x9D => write(WriteOp::Sta, Mode::AbsoluteX),
        0x9E => unstable(UnstableStore::Shx, Mode::AbsoluteY),
        0x9F => unstable(UnstableStore::Sha, Mode::AbsoluteY),

        // ---- $A0-$BF ----
        0xA0 => read(ReadOp::Ldy, Mode::Immediate),
        0xA1 => read(ReadOp::Lda, Mode::IndexedIndirect),
        0xA2 => read(ReadOp::Ldx, Mode::Immediate),
        0xA3 => read(ReadOp::Lax, Mode::IndexedIndirect).unofficial(),
        0xA4 => read(ReadOp::Ldy, Mode::ZeroPage),
        0xA5 => read(ReadOp::Lda, Mode::ZeroPage),
        0xA6 => read(ReadOp::Ldx, Mode::ZeroPage),
        0xA7 => read(ReadOp::Lax, Mode::ZeroPage).unofficial(),
        0xA8 => implied(ImpliedOp::Tay),
        0xA9 => read(ReadOp::Lda, Mode::Immediate),
        0xAA => implied(ImpliedOp::Tax),
        0xAB => read(ReadOp::Lxa, Mode::Immediate).unofficial(),
        0xAC => read(ReadOp::Ldy, Mode::Absolute),
        0xAD => read(ReadOp::Lda, Mode::Absolute),
        0xAE => read(ReadOp::Ldx, Mode::Absolute),
        0xAF => read(ReadOp::Lax, Mode::Absolute).unofficial(),
        0xB0 => branch(Condition::CarrySet),
        0xB1 => read(ReadOp::Lda, Mode::IndirectIndexed),
        0xB2 => jam(),
        0xB3 => read(ReadOp::Lax, Mode::IndirectIndexed).unofficial(),
        0xB4 => read(ReadOp::Ldy, Mode::ZeroPageX),
        0xB5 => read(ReadOp::Lda, Mode::ZeroPageX),
        0xB6 => read(ReadOp::Ldx, Mode::ZeroPageY),
        0xB7 => read(ReadOp::Lax, Mode::ZeroPageY).unofficial(),
        0xB8 => implied(ImpliedOp::Clv),
        0xB9 => read(ReadOp::Lda, Mode::AbsoluteY),
        0xBA => implied(ImpliedOp::Tsx),
        0xBB => read(ReadOp::Las, Mode::AbsoluteY).unofficial(),
        0xBC => read(ReadOp::Ldy, Mode::AbsoluteX),
        0xBD => read(ReadOp::Lda, Mode::AbsoluteX),
        0xBE => read(ReadOp::Ldx, Mode::AbsoluteY),
        0xBF => read(ReadOp::Lax, Mode::AbsoluteY).unofficial(),

        // ---- $C0-$DF ----
        0xC0 => read(ReadOp::Cpy, Mode::Immediate),
        0xC1 => read(ReadOp::Cmp, Mode::IndexedIndirect),
        0xC2 => nop(Mode::Immediate),
        0xC3 => modify(ModifyOp::Dcp, Mode::IndexedIndirect).unofficial(),
        0xC4 => read(ReadOp::Cpy, Mode::ZeroPage),
        0xC5 => read(ReadOp::Cmp, Mode::ZeroPage),
        0xC6 => modify(ModifyOp::Dec, Mode::ZeroPage),
        0xC7 => modify(ModifyOp::Dcp, Mode::ZeroPage).unofficial(),
        0xC8 => implied(ImpliedOp::Iny),
        0xC9 => read(ReadOp::Cmp, Mode::Immediate),
        0xCA => implied(ImpliedOp::Dex),
        0xCB => read(ReadOp::Axs, Mode::Immediate).unofficial(),
        0xCC => read(ReadOp::Cpy, Mode::Absolute),
        0xCD => read(ReadOp::Cmp, Mode::Absolute),
        0xCE => modify(ModifyOp::Dec, Mode::Absolute),
        0xCF => modify(ModifyOp::Dcp, Mode::Absolute).unofficial(),
        0xD0 => branch(Condition::NotEqual),
        0xD1 => read(ReadOp::Cmp, Mode::IndirectIndexed),
        0xD2 => jam(),
        0xD3 => modify(ModifyOp::Dcp, Mode::IndirectIndexed).unofficial(),
        0xD4 => nop(Mode::ZeroPageX),
        0xD5 => read(ReadOp::Cmp, Mode::ZeroPageX),
        0xD6 => modify(ModifyOp::Dec, Mode::ZeroPageX),
        0xD7 => modify(ModifyOp::Dcp, Mode::ZeroPageX).unofficial(),
        0xD8 => implied(ImpliedOp::Cld),
        0xD9 => read(ReadOp::Cmp, Mode::AbsoluteY),
        0xDA => nop(Mode::Implied),
        0xDB => modify(ModifyOp::Dcp, Mode::AbsoluteY).unofficial(),
        0xDC => nop(Mode::AbsoluteX),
        0xDD => read(ReadOp::Cmp, Mode::AbsoluteX),
        0xDE => modify(ModifyOp::Dec, Mode::AbsoluteX),
        0xDF => modify(ModifyOp::Dcp, Mode::AbsoluteX).unofficial(),

        // ---- $E0-$FF ----
        0xE0 => read(ReadOp::Cpx, Mode::Immediate),
        0xE1 => read(ReadOp::Sbc, Mode::IndexedIndirect),
        0xE2 => nop(Mode::Immediate),
        0xE3 => modify(ModifyOp::Isc, Mode::IndexedIndirect).unofficial(),
        0xE4 => read(ReadOp::Cpx, Mode::ZeroPage),
        0xE5 => read(ReadOp::Sbc, Mode::ZeroPage),
        0xE6 => modify(ModifyOp::Inc, Mode::ZeroPage),
        0xE7 => modify(ModifyOp::Isc, Mode::ZeroPage).unofficial(),
        0xE8 => implied(ImpliedOp::Inx),
        0xE9 => read(ReadOp::Sbc, Mode::Immediate),
        0xEA => implied(ImpliedOp::Nop),
        0xEB => read(ReadOp::Sbc, Mode::Immediate).unofficial(),
        0xEC => read(ReadOp::Cpx, Mode::Absolute),
        0xED => read(ReadOp::Sbc, Mode::Absolute),
        0xEE => modify(ModifyOp::Inc, Mode::Absolute),
        0xEF => modify(ModifyOp::Isc, Mode::Absolute).unofficial(),
        0xF0 => branch(Condition::Equal),
        0xF1 => read(ReadOp::Sbc, Mode::IndirectIndexed),
        0xF2 => jam(),
        0xF3 => modify(ModifyOp::Isc, Mode::IndirectIndexed).unofficial(),
        0xF4 => nop(Mode::ZeroPageX),
        0xF5 => read(ReadOp::Sbc, Mode::ZeroPageX),
        0xF6 => modify(ModifyOp::Inc, Mode::ZeroPageX),
        0xF7 => modify(ModifyOp::Isc, Mode::ZeroPageX).unofficial(),
        0xF8 => implied(ImpliedOp::Sed),
        0xF9 => read(ReadOp::Sbc, Mode::AbsoluteY),
        0xFA => nop(Mode::Implied),
        0xFB => modify(ModifyOp::Isc, Mode::AbsoluteY).unofficial(),
        0xFC => nop(Mode::AbsoluteX),
        0xFD => read(ReadOp::Sbc, Mode::AbsoluteX),
        0xFE => modify(ModifyOp::Inc, Mode::AbsoluteX),
        0xFF => modify(ModifyOp::Isc, Mode::AbsoluteX).unofficial(),
    }
}
