//! # ARM Instruction Set (32-bit)
//!
//! Classification and rendering of 32-bit ARM opcodes.
//!
//! ## Format
//!
//! ```text
//! 31-28   27-25   24-0
//! [Cond] [Format] [Instruction-specific]
//! ```
//!
//! - **Condition (bits 28-31)**: See [`condition`](super::condition)
//! - **Format (bits 25-27)**: Narrows the instruction category, the rest of
//!   the discriminating bits are listed in [`filter::FILTERS`].
//!
//! ## Submodules
//!
//! - [`filter`] - Bit-pattern table and classification
//! - [`instructions`] - Decoded instruction record
//! - [`alu_instruction`] - ALU and multiply mnemonic tables
//! - [`disassembler`] - Text rendering

pub mod alu_instruction;
pub mod disassembler;

#[allow(clippy::unreadable_literal)]
pub mod filter;

#[allow(clippy::similar_names)]
pub mod instructions;

use thiserror::Error;

use instructions::InstructionKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("opcode 0x{opcode:08X} decodes to multiple valid instructions: {candidates:?}")]
    Ambiguous {
        opcode: u32,
        candidates: Vec<InstructionKind>,
    },

    #[error("unknown ALU opcode: {0}")]
    UnknownAluOpcode(u32),

    #[error("unknown MUL opcode: {0}")]
    UnknownMultiplyOpcode(u32),

    #[error("{kind:?} instruction has no `{name}` field")]
    MissingField {
        kind: InstructionKind,
        name: &'static str,
    },
}
