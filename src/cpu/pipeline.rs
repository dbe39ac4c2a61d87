// Pipeline state for the cycle-stepped 6502
//
// Each `State` variant names the next cycle the CPU will perform and carries
// whatever the instruction has resolved so far (operand bytes, partially
// computed address, the operation still to run). Addressing-mode states are
// shared by every opcode with the same cycle shape; the operation itself is
// a plain tag carried along in the payload.

use serde::{Deserialize, Serialize};

/// Operations whose final cycle reads memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadOp {
    Adc,
    And,
    Bit,
    Cmp,
    Cpx,
    Cpy,
    Eor,
    Lda,
    Ldx,
    Ldy,
    Ora,
    Sbc,
    Nop,
    // Undocumented
    Lax,
    Anc,
    Alr,
    Arr,
    Axs,
    Xaa,
    Lxa,
    Las,
}

/// Operations whose final cycle writes a register-derived value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
    Sta,
    Stx,
    Sty,
    Sax,
}

/// Read-modify-write operations (also used on the accumulator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifyOp {
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
    // Undocumented: modify, then combine with A
    Slo,
    Rla,
    Sre,
    Rra,
    Dcp,
    Isc,
}

/// Stores that AND the value with the target's high byte plus one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnstableStore {
    /// A & X
    Sha,
    /// X
    Shx,
    /// Y
    Shy,
    /// SP = A & X, then store SP
    Tas,
}

/// Two-cycle register instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpliedOp {
    Clc,
    Cld,
    Cli,
    Clv,
    Sec,
    Sed,
    Sei,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    Inx,
    Iny,
    Dex,
    Dey,
    Nop,
}

/// Memory operation carried through the addressing states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Read(ReadOp),
    Write(WriteOp),
    Modify(ModifyOp),
    Unstable(UnstableStore),
}

/// Index register added by an indexed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Index {
    X,
    Y,
}

/// Branch condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// BPL
    Plus,
    /// BMI
    Minus,
    /// BVC
    OverflowClear,
    /// BVS
    OverflowSet,
    /// BCC
    CarryClear,
    /// BCS
    CarrySet,
    /// BNE
    NotEqual,
    /// BEQ
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushOp {
    Pha,
    Php,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullOp {
    Pla,
    Plp,
}

/// What started the 7-cycle interrupt sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interrupt {
    /// BRK opcode: PC skips the padding byte, B is set in the pushed status
    Break,
    /// IRQ or NMI; the vector is chosen when the status is pushed
    Hardware,
    /// RESET: stack writes become reads
    Reset,
}

/// The cycle the CPU performs on its next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Instruction boundary: fetch an opcode, or start a pending interrupt
    FetchOpcode,

    // ---- Single-operand and register forms ----
    Immediate(ReadOp),
    Implied(ImpliedOp),
    Accumulator(ModifyOp),

    // ---- Address resolution ----
    ZeroPage(Operation),
    ZeroPageIndexed(Operation, Index),
    ZeroPageIndexedAdd {
        op: Operation,
        base: u8,
        index: Index,
    },
    Absolute(Operation),
    AbsoluteHigh {
        op: Operation,
        low: u8,
    },
    AbsoluteIndexed(Operation, Index),
    AbsoluteIndexedHigh {
        op: Operation,
        low: u8,
        index: Index,
    },
    IndexedIndirect(Operation),
    IndexedIndirectAdd {
        op: Operation,
        pointer: u8,
    },
    IndexedIndirectLow {
        op: Operation,
        pointer: u8,
    },
    IndexedIndirectHigh {
        op: Operation,
        pointer: u8,
        low: u8,
    },
    IndirectIndexed(Operation),
    IndirectIndexedLow {
        op: Operation,
        pointer: u8,
    },
    IndirectIndexedHigh {
        op: Operation,
        pointer: u8,
        low: u8,
    },
    /// Dummy read at the address before the carry reached the high byte
    PageFixup {
        op: Operation,
        uncorrected: u16,
        address: u16,
    },

    // ---- Operation cycles ----
    Execute {
        op: Operation,
        address: u16,
    },
    /// Read-modify-write: write the unmodified value back
    ModifyWriteBack {
        op: ModifyOp,
        address: u16,
        value: u8,
    },
    /// Final write of an already computed value
    WriteValue {
        address: u16,
        value: u8,
    },

    // ---- Branches ----
    Branch(Condition),
    BranchTaken {
        offset: u8,
    },
    BranchFixup {
        target: u16,
    },

    // ---- Jumps and subroutines ----
    JmpAbsolute,
    JmpAbsoluteHigh {
        low: u8,
    },
    JmpIndirect,
    JmpIndirectHigh {
        low: u8,
    },
    JmpIndirectTargetLow {
        pointer: u16,
    },
    JmpIndirectTargetHigh {
        pointer: u16,
        low: u8,
    },
    Jsr,
    JsrStackRead {
        low: u8,
    },
    JsrPushHigh {
        low: u8,
    },
    JsrPushLow {
        low: u8,
    },
    JsrHigh {
        low: u8,
    },
    Rts,
    RtsIncrementSp,
    RtsPullLow,
    RtsPullHigh {
        low: u8,
    },
    RtsIncrementPc,
    Rti,
    RtiIncrementSp,
    RtiPullStatus,
    RtiPullLow,
    RtiPullHigh {
        low: u8,
    },

    // ---- Stack ----
    Push(PushOp),
    PushWrite(PushOp),
    Pull(PullOp),
    PullIncrementSp(PullOp),
    PullRead(PullOp),

    // ---- Interrupt sequence ----
    /// First cycle of RESET (the others start from an opcode fetch)
    Reset,
    InterruptPadding(Interrupt),
    InterruptPushHigh(Interrupt),
    InterruptPushLow(Interrupt),
    InterruptPushStatus(Interrupt),
    InterruptVectorLow {
        vector: u16,
    },
    InterruptVectorHigh {
        vector: u16,
        low: u8,
    },

    /// Halted by a JAM opcode; only RESET recovers
    Jam,
}
