pub mod arm;

#[allow(clippy::module_name_repetitions)]
pub mod arm7tdmi;
pub mod condition;
pub mod register_bank;
pub mod registers;

use serde::Serialize;
use thiserror::Error;

use crate::memory::MemoryError;
use arm::DecodeError;
use arm::instructions::InstructionKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpuError {
    #[error("fetch failed: {0}")]
    Memory(#[from] MemoryError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// One rendered line, produced when an instruction leaves the decode stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisasmEntry {
    pub address: u32,
    pub opcode: u32,
    pub kind: InstructionKind,
    pub text: String,
}
