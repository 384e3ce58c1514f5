/// Number of architecturally visible general-purpose registers (`R0..R15`).
pub const GENERAL_REGISTER_COUNT: usize = 16;
/// Number of addressable instruction-memory lines (12-bit PC).
pub const INSTRUCTION_MEMORY_LINES: usize = 4096;
/// Mask applied to every value written into the program counter.
pub const PC_MASK: u16 = 0x0FFF;

/// Architecturally visible general-purpose register identifier.
///
/// Names follow the assembler's calling convention. `Zero` always reads as
/// zero; `Imm1` and `Imm2` are reloaded from the current instruction on every
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    Zero = 0,
    Imm1 = 1,
    Imm2 = 2,
    V0 = 3,
    A0 = 4,
    A1 = 5,
    A2 = 6,
    T0 = 7,
    T1 = 8,
    T2 = 9,
    S0 = 10,
    S1 = 11,
    S2 = 12,
    Gp = 13,
    Sp = 14,
    Ra = 15,
}

impl Register {
    /// Ordered list of all architectural general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::Zero,
        Self::Imm1,
        Self::Imm2,
        Self::V0,
        Self::A0,
        Self::A1,
        Self::A2,
        Self::T0,
        Self::T1,
        Self::T2,
        Self::S0,
        Self::S1,
        Self::S2,
        Self::Gp,
        Self::Sp,
        Self::Ra,
    ];

    /// Returns the array index for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a 4-bit register field. Upper bits are ignored.
    #[must_use]
    pub const fn from_u4(bits: u8) -> Self {
        Self::ALL[(bits & 0x0F) as usize]
    }

    /// Assembler-facing name, e.g. `$v0`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zero => "$zero",
            Self::Imm1 => "$imm1",
            Self::Imm2 => "$imm2",
            Self::V0 => "$v0",
            Self::A0 => "$a0",
            Self::A1 => "$a1",
            Self::A2 => "$a2",
            Self::T0 => "$t0",
            Self::T1 => "$t1",
            Self::T2 => "$t2",
            Self::S0 => "$s0",
            Self::S1 => "$s1",
            Self::S2 => "$s2",
            Self::Gp => "$gp",
            Self::Sp => "$sp",
            Self::Ra => "$ra",
        }
    }
}

/// General register file plus the 12-bit program counter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    gpr: [i32; GENERAL_REGISTER_COUNT],
    pc: u16,
}

impl RegisterFile {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: Register) -> i32 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register. Writes to `$zero` are discarded.
    pub const fn set_gpr(&mut self, reg: Register, value: i32) {
        if !matches!(reg, Register::Zero) {
            self.gpr[reg.index()] = value;
        }
    }

    /// Loads the sign-extended immediates of the instruction about to run.
    pub const fn load_immediates(&mut self, imm1: i32, imm2: i32) {
        self.gpr[Register::Imm1.index()] = imm1;
        self.gpr[Register::Imm2.index()] = imm2;
    }

    /// Copy of all sixteen registers in index order.
    #[must_use]
    pub const fn snapshot(&self) -> [i32; GENERAL_REGISTER_COUNT] {
        self.gpr
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register, keeping only the low 12 bits.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value & PC_MASK;
    }
}
