//! # ARM Instruction Decoding
//!
//! A fetched opcode becomes an [`ArmInstruction`]: the address it was fetched
//! from, the raw opcode, the [`InstructionKind`] found by the
//! [filter table](super::filter::FILTERS) and the named fields extracted by
//! the matching filter.
//!
//! ## Instruction Encoding Example
//!
//! ```text
//! ADD R0, R1, R2, LSL #3
//!
//! 31-28  27-26  25  24-21  20  19-16  15-12  11-7   6-5  4  3-0
//! [1110] [ 00 ] [0] [0100] [0] [0001] [0000] [00011][00] [0][0010]
//!   ↑       ↑    ↑    ↑     ↑    ↑      ↑      ↑     ↑   ↑   ↑
//!   │       │    │    │     │    │      │      │     │   │   └─ Rm = R2
//!   │       │    │    │     │    │      │      │     │   └──── Shift by imm
//!   │       │    │    │     │    │      │      │     └──────── Typ = LSL
//!   │       │    │    │     │    │      │      └────────────── Shift = 3
//!   │       │    │    │     │    │      └───────────────────── Rd = R0
//!   │       │    │    │     │    └──────────────────────────── Rn = R1
//!   │       │    │    │     └───────────────────────────────── S = 0 (no flags)
//!   │       │    │    └─────────────────────────────────────── Op = ADD
//!   │       │    └──────────────────────────────────────────── Register operand
//!   │       └───────────────────────────────────────────────── Data processing
//!   └───────────────────────────────────────────────────────── Cond = AL
//! ```
//!
//! Decoded as `DataProcRegShiftImm` with the fields
//! `Cond=0xE, Op=0x4, S=0, Rn=1, Rd=0, Shift=3, Typ=0, Rm=2`.

use std::fmt::{Display, Formatter};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::DecodeError;
use super::filter::{Classification, classify};

/// Every format the classifier can recognise, in filter table order.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    /// ALU, second operand register shifted by immediate.
    DataProcRegShiftImm,
    /// ALU, second operand register shifted by register.
    DataProcRegShiftReg,
    /// ALU, second operand rotated immediate.
    DataProcImm,
    /// MSR with an immediate operand.
    PsrImm,
    /// MRS, or MSR with a register operand.
    PsrReg,
    /// BX / BLX with a register target.
    BranchExchange,
    Multiply,
    MultiplyLong,
    /// SWP / SWPB.
    Swap,
    /// LDRH / STRH / LDRSB / LDRSH, register offset.
    HalfwordTransferReg,
    /// LDRH / STRH / LDRSB / LDRSH, immediate offset.
    HalfwordTransferImm,
    /// LDR / STR, 12 bits immediate offset.
    TransferImm,
    /// LDR / STR, shifted register offset.
    TransferReg,
    Undefined,
    /// LDM / STM.
    BlockTransfer,
    /// B / BL.
    Branch,
    CoprocessorDataTransfer,
    CoprocessorDataOperation,
    CoprocessorRegisterTransfer,
    SoftwareInterrupt,
    Unknown,
}

impl Display for InstructionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Named fields extracted from an opcode, in extraction order.
///
/// Field names are unique inside one filter, a lookup is a linear scan over
/// at most 11 entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(&'static str, u32)>);

impl Fields {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub(super) fn push(&mut self, name: &'static str, value: u32) {
        self.0.push((name, value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.0
            .iter()
            .find_map(|(field, value)| (*field == name).then_some(*value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.0.iter().copied()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One fetched opcode and what the classifier made of it.
///
/// A freshly built instruction is `Unknown` with no fields until
/// [`ArmInstruction::decode`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArmInstruction {
    pub address: u32,
    pub opcode: u32,
    pub kind: InstructionKind,
    pub fields: Fields,
}

impl ArmInstruction {
    #[must_use]
    pub const fn new(address: u32, opcode: u32) -> Self {
        Self {
            address,
            opcode,
            kind: InstructionKind::Unknown,
            fields: Fields::new(),
        }
    }

    /// Classifies the opcode and stores the result.
    ///
    /// An opcode no filter accepts becomes `Unknown` with an empty field set.
    /// An opcode accepted by more than one filter is an error and leaves the
    /// instruction as it was.
    pub fn decode(&mut self) -> Result<(), DecodeError> {
        match classify(self.opcode) {
            Classification::Decoded { kind, fields } => {
                self.kind = kind;
                self.fields = fields;
            }
            Classification::Unknown => {
                self.kind = InstructionKind::Unknown;
                self.fields = Fields::new();
            }
            Classification::Ambiguous(candidates) => {
                return Err(DecodeError::Ambiguous {
                    opcode: self.opcode,
                    candidates,
                });
            }
        }
        Ok(())
    }

    /// Value of a field the instruction kind is known to carry.
    pub fn field(&self, name: &'static str) -> Result<u32, DecodeError> {
        self.fields.get(name).ok_or(DecodeError::MissingField {
            kind: self.kind,
            name,
        })
    }
}

impl TryFrom<u32> for ArmInstruction {
    type Error = DecodeError;

    /// Decodes an opcode that was not fetched from memory (address 0).
    fn try_from(opcode: u32) -> Result<Self, Self::Error> {
        let mut instruction = Self::new(0, opcode);
        instruction.decode()?;
        Ok(instruction)
    }
}
