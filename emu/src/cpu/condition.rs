//! # ARM Conditional Execution
//!
//! Almost every ARM instruction carries a condition in its top 4 bits
//! (31-28). The decoder extracts it as the `Cond` field; the branch renderer
//! appends its suffix to the mnemonic (`BEQ`, `BLNE`, ...).
//!
//! ```text
//! ┌───────┬────────┬─────────────────────┬─────────────────────────────────┐
//! │ Code  │ Suffix │     Meaning         │          Flags Tested           │
//! ├───────┼────────┼─────────────────────┼─────────────────────────────────┤
//! │ 0000  │   EQ   │ Equal               │ Z=1                             │
//! │ 0001  │   NE   │ Not equal           │ Z=0                             │
//! │ 0010  │   HS   │ Higher or same (u)  │ C=1                             │
//! │ 0011  │   LO   │ Lower (unsigned)    │ C=0                             │
//! │ 0100  │   MI   │ Minus / negative    │ N=1                             │
//! │ 0101  │   PL   │ Plus / non-negative │ N=0                             │
//! │ 0110  │   VS   │ Overflow set        │ V=1                             │
//! │ 0111  │   VC   │ Overflow clear      │ V=0                             │
//! │ 1000  │   HI   │ Higher (unsigned)   │ C=1 AND Z=0                     │
//! │ 1001  │   LS   │ Lower/same (unsig)  │ C=0 OR Z=1                      │
//! │ 1010  │   GE   │ ≥ (signed)          │ N=V                             │
//! │ 1011  │   LT   │ < (signed)          │ N≠V                             │
//! │ 1100  │   GT   │ > (signed)          │ Z=0 AND N=V                     │
//! │ 1101  │   LE   │ ≤ (signed)          │ Z=1 OR N≠V                      │
//! │ 1110  │  (AL)  │ Always              │ (unconditional)                 │
//! │ 1111  │   NV   │ Never (reserved)    │ (don't use)                     │
//! └───────┴────────┴─────────────────────┴─────────────────────────────────┘
//! ```
//!
//! `AL` is never written out: `B` and `BAL` are the same instruction.

use serde::{Deserialize, Serialize};

/// Condition codes for ARM conditional execution.
///
/// See the [module-level documentation](self) for the flags each one tests.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    /// Equal (Z=1)
    EQ = 0x0,

    /// Not equal (Z=0)
    NE = 0x1,

    /// Unsigned higher or same (C=1). Also known as CS (Carry Set).
    HS = 0x2,

    /// Unsigned lower (C=0). Also known as CC (Carry Clear).
    LO = 0x3,

    /// Minus / negative (N=1)
    MI = 0x4,

    /// Plus / positive or zero (N=0)
    PL = 0x5,

    /// Overflow set (V=1)
    VS = 0x6,

    /// Overflow clear (V=0)
    VC = 0x7,

    /// Unsigned higher (C=1 AND Z=0)
    HI = 0x8,

    /// Unsigned lower or same (C=0 OR Z=1)
    LS = 0x9,

    /// Signed greater or equal (N=V)
    GE = 0xA,

    /// Signed less than (N≠V)
    LT = 0xB,

    /// Signed greater than (Z=0 AND N=V)
    GT = 0xC,

    /// Signed less than or equal (Z=1 OR N≠V)
    LE = 0xD,

    /// Always (unconditional)
    ///
    /// The instruction always executes. This is the default when no
    /// condition suffix is specified in assembly (e.g., `MOV` = `MOVAL`).
    AL = 0xE,

    /// Never (reserved, do not use)
    ///
    /// In ARMv1/v2 this meant "never execute". In `ARMv3+` it's reserved
    /// and should not be used by normal code.
    NV = 0xF,
}

impl Condition {
    /// Mnemonic suffix, empty for [`Condition::AL`].
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::EQ => "EQ",
            Self::NE => "NE",
            Self::HS => "HS",
            Self::LO => "LO",
            Self::MI => "MI",
            Self::PL => "PL",
            Self::VS => "VS",
            Self::VC => "VC",
            Self::HI => "HI",
            Self::LS => "LS",
            Self::GE => "GE",
            Self::LT => "LT",
            Self::GT => "GT",
            Self::LE => "LE",
            Self::AL => "",
            Self::NV => "NV",
        }
    }
}

impl From<u32> for Condition {
    /// Panics if `item` does not fit in 4 bits: condition fields are always
    /// extracted from bits 31-28.
    fn from(item: u32) -> Self {
        match item {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::HS,
            0x3 => Self::LO,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            0xF => Self::NV,
            _ => unreachable!("condition field is 4 bits wide, got {item:#X}"),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}
