/// Assigned SIMP opcodes, valued by their 8-bit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Add = 0,
    Sub = 1,
    Mac = 2,
    And = 3,
    Or = 4,
    Xor = 5,
    Sll = 6,
    Sra = 7,
    Srl = 8,
    Beq = 9,
    Bne = 10,
    Blt = 11,
    Bgt = 12,
    Ble = 13,
    Bge = 14,
    Jal = 15,
    Lw = 16,
    Sw = 17,
    Reti = 18,
    In = 19,
    Out = 20,
    Halt = 21,
}

/// Single source-of-truth opcode table: `(encoding, opcode, mnemonic)`.
///
/// Any opcode value not present here has no instruction assigned.
pub const OPCODE_TABLE: &[(u8, Opcode, &str)] = &[
    (0, Opcode::Add, "add"),
    (1, Opcode::Sub, "sub"),
    (2, Opcode::Mac, "mac"),
    (3, Opcode::And, "and"),
    (4, Opcode::Or, "or"),
    (5, Opcode::Xor, "xor"),
    (6, Opcode::Sll, "sll"),
    (7, Opcode::Sra, "sra"),
    (8, Opcode::Srl, "srl"),
    (9, Opcode::Beq, "beq"),
    (10, Opcode::Bne, "bne"),
    (11, Opcode::Blt, "blt"),
    (12, Opcode::Bgt, "bgt"),
    (13, Opcode::Ble, "ble"),
    (14, Opcode::Bge, "bge"),
    (15, Opcode::Jal, "jal"),
    (16, Opcode::Lw, "lw"),
    (17, Opcode::Sw, "sw"),
    (18, Opcode::Reti, "reti"),
    (19, Opcode::In, "in"),
    (20, Opcode::Out, "out"),
    (21, Opcode::Halt, "halt"),
];

impl Opcode {
    /// Encoded opcode value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Assembler mnemonic.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        OPCODE_TABLE
            .iter()
            .find_map(|(_, opcode, name)| (*opcode == self).then_some(*name))
            .unwrap_or("?")
    }
}

/// Returns the assigned opcode for an encoded opcode value.
///
/// `None` means no instruction is assigned to `value`.
#[must_use]
pub fn classify_opcode(value: u8) -> Option<Opcode> {
    OPCODE_TABLE
        .iter()
        .find_map(|(encoding, opcode, _)| (*encoding == value).then_some(*opcode))
}
