//! Mnemonic tables for the data processing and multiply formats.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::DecodeError;

/// Data processing opcode, bits 24-21.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum ArmModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Rsc = 0x7,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mov = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl ArmModeAluInstruction {
    /// TST, TEQ, CMP and CMN only update the flags. They must have `S` set and
    /// no destination register.
    #[must_use]
    pub const fn is_compare(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }
}

impl TryFrom<u32> for ArmModeAluInstruction {
    type Error = DecodeError;

    fn try_from(alu_op_code: u32) -> Result<Self, Self::Error> {
        use ArmModeAluInstruction::*;
        Ok(match alu_op_code {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x3 => Rsb,
            0x4 => Add,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Rsc,
            0x8 => Tst,
            0x9 => Teq,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mov,
            0xE => Bic,
            0xF => Mvn,
            _ => return Err(DecodeError::UnknownAluOpcode(alu_op_code)),
        })
    }
}

impl Display for ArmModeAluInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Eor => f.write_str("EOR"),
            Self::Sub => f.write_str("SUB"),
            Self::Rsb => f.write_str("RSB"),
            Self::Add => f.write_str("ADD"),
            Self::Adc => f.write_str("ADC"),
            Self::Sbc => f.write_str("SBC"),
            Self::Rsc => f.write_str("RSC"),
            Self::Tst => f.write_str("TST"),
            Self::Teq => f.write_str("TEQ"),
            Self::Cmp => f.write_str("CMP"),
            Self::Cmn => f.write_str("CMN"),
            Self::Orr => f.write_str("ORR"),
            Self::Mov => f.write_str("MOV"),
            Self::Bic => f.write_str("BIC"),
            Self::Mvn => f.write_str("MVN"),
        }
    }
}

/// Multiply opcode, bits 23-21 of both multiply formats.
///
/// `0b011` is not assigned.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum ArmModeMultiplyInstruction {
    Mul = 0x0,
    Mla = 0x1,
    Umaal = 0x2,
    Umull = 0x4,
    Umlal = 0x5,
    Smull = 0x6,
    Smlal = 0x7,
}

impl TryFrom<u32> for ArmModeMultiplyInstruction {
    type Error = DecodeError;

    fn try_from(mul_op_code: u32) -> Result<Self, Self::Error> {
        use ArmModeMultiplyInstruction::*;
        Ok(match mul_op_code {
            0x0 => Mul,
            0x1 => Mla,
            0x2 => Umaal,
            0x4 => Umull,
            0x5 => Umlal,
            0x6 => Smull,
            0x7 => Smlal,
            _ => return Err(DecodeError::UnknownMultiplyOpcode(mul_op_code)),
        })
    }
}

impl Display for ArmModeMultiplyInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mul => f.write_str("MUL"),
            Self::Mla => f.write_str("MLA"),
            Self::Umaal => f.write_str("UMAAL"),
            Self::Umull => f.write_str("UMULL"),
            Self::Umlal => f.write_str("UMLAL"),
            Self::Smull => f.write_str("SMULL"),
            Self::Smlal => f.write_str("SMLAL"),
        }
    }
}
