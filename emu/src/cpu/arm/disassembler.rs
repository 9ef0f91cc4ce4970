//! Text rendering of decoded instructions:
//! `[ADDRESS : ][OPCODE | ]MNEMONIC[ OPERAND]`.
//!
//! Only the mnemonic is produced for the ALU and multiply formats, and most
//! other formats render as their kind name between brackets.

use serde::{Deserialize, Serialize};

use crate::bitwise::sign_extend;
use crate::cpu::condition::Condition;

use super::DecodeError;
use super::alu_instruction::{ArmModeAluInstruction, ArmModeMultiplyInstruction};
use super::instructions::{ArmInstruction, InstructionKind};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub show_address: bool,
    pub show_opcode: bool,
}

/// Destination of a `B`/`BL` at `address`: the PC is two instructions ahead
/// when the offset is applied, and the 24 bits offset counts words.
#[must_use]
pub const fn branch_target(address: u32, offset: u32) -> u32 {
    address
        .wrapping_add(8)
        .wrapping_add_signed(sign_extend(offset, 24).wrapping_mul(4))
}

pub fn render(instruction: &ArmInstruction, options: FormatOptions) -> Result<String, DecodeError> {
    let mut line = String::new();
    if options.show_address {
        line.push_str(&format!("{:08X} : ", instruction.address));
    }
    if options.show_opcode {
        line.push_str(&format!("{:08X} | ", instruction.opcode));
    }

    use InstructionKind::*;
    let (mnemonic, operand) = match instruction.kind {
        Unknown => ("???".to_string(), None),
        DataProcRegShiftImm | DataProcRegShiftReg | DataProcImm => {
            let alu = ArmModeAluInstruction::try_from(instruction.field("Op")?)?;
            (alu.to_string(), None)
        }
        BranchExchange => {
            let mnemonic = if instruction.field("L")? == 0 { "BX" } else { "BLX" };
            let operand = format!("R{}", instruction.field("Rn")?);
            (mnemonic.to_string(), Some(operand))
        }
        Multiply | MultiplyLong => {
            let mul = ArmModeMultiplyInstruction::try_from(instruction.field("Op")?)?;
            (mul.to_string(), None)
        }
        Branch => {
            let link = if instruction.field("L")? == 1 { "BL" } else { "B" };
            let condition = Condition::from(instruction.field("Cond")?);
            let target = branch_target(instruction.address, instruction.field("Offset")?);
            (format!("{link}{condition}"), Some(format!("0x{target:08X}")))
        }
        SoftwareInterrupt => ("SWI".to_string(), None),
        kind => (format!("[{kind}]"), None),
    };

    line.push_str(&mnemonic);
    if let Some(operand) = operand {
        line.push(' ');
        line.push_str(&operand);
    }
    Ok(line)
}
