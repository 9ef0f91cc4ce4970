//! # Instruction Filters
//!
//! Each entry of [`FILTERS`] recognises one ARM format: a set of control bits
//! that must match exactly, plus the fields to extract when they do.
//!
//! ```text
//! ┌─────────────────────────────┬────────────────────────────────────────┐
//! │ Kind                        │ Control bits                           │
//! ├─────────────────────────────┼────────────────────────────────────────┤
//! │ DataProcRegShiftImm         │ 27-25=000, 4=0                         │
//! │ DataProcRegShiftReg         │ 27-25=000, 7=0, 4=1                    │
//! │ DataProcImm                 │ 27-25=001                              │
//! │ PsrImm                      │ 27-23=00110, 21-20=10                  │
//! │ PsrReg                      │ 27-23=00010, 20=0, 11-4=0              │
//! │ BranchExchange              │ 27-6=00_0100_1011_1111_1111_1100, 4=1  │
//! │ Multiply                    │ 27-22=000000, 7-4=1001                 │
//! │ MultiplyLong                │ 27-23=00001, 7-4=1001                  │
//! │ Swap                        │ 27-23=00010, 21-20=00, 11-4=00001001   │
//! │ HalfwordTransferReg         │ 27-25=000, 22=0, 11-7=00001, 4=1       │
//! │ HalfwordTransferImm         │ 27-25=000, 22=1, 7=1, 4=1              │
//! │ TransferImm                 │ 27-25=010                              │
//! │ TransferReg                 │ 27-25=011, 4=0                         │
//! │ Undefined                   │ 27-25=011, 4=1                         │
//! │ BlockTransfer               │ 27-25=100                              │
//! │ Branch                      │ 27-25=101                              │
//! │ CoprocessorDataTransfer     │ 27-25=110                              │
//! │ CoprocessorDataOperation    │ 27-24=1110, 4=0                        │
//! │ CoprocessorRegisterTransfer │ 27-24=1110, 4=1                        │
//! │ SoftwareInterrupt           │ 27-24=1111                             │
//! └─────────────────────────────┴────────────────────────────────────────┘
//! ```
//!
//! The patterns overlap: `MUL` also matches the register shifted ALU format
//! and the halfword transfer format, `MRS` matches the ALU formats as a
//! `TST`/`TEQ`/`CMP`/`CMN` without `S`. Every filter is tested and each
//! match goes through a validity check that drops the encodings a format
//! cannot have. Exactly one survivor must remain, more than one is reported
//! as [`Classification::Ambiguous`].

use crate::bitwise::{bit_mask, bits_equal, extract_bits};

use super::alu_instruction::ArmModeAluInstruction;
use super::instructions::{Fields, InstructionKind};

/// `(high, low, expected)`: bits `high..=low` must equal `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBits {
    pub high: u8,
    pub low: u8,
    pub expected: u32,
}

impl ControlBits {
    const fn new(high: u8, low: u8, expected: u32) -> Self {
        assert!(
            expected <= bit_mask(high, low),
            "expected value does not fit in the control bits"
        );
        Self {
            high,
            low,
            expected,
        }
    }

    #[must_use]
    pub const fn matches(&self, opcode: u32) -> bool {
        bits_equal(opcode, self.high, self.low, self.expected)
    }
}

/// `(high, low, name)`: bits `high..=low` are extracted as `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub high: u8,
    pub low: u8,
    pub name: &'static str,
}

impl FieldSpec {
    const fn new(high: u8, low: u8, name: &'static str) -> Self {
        // Rejects reversed ranges while the table is built.
        let _ = bit_mask(high, low);
        Self { high, low, name }
    }
}

#[derive(Debug)]
pub struct InstructionFilter {
    pub kind: InstructionKind,
    pub control: &'static [ControlBits],
    pub fields: &'static [FieldSpec],
}

impl InstructionFilter {
    #[must_use]
    pub fn matches(&self, opcode: u32) -> bool {
        self.control.iter().all(|bits| bits.matches(opcode))
    }

    #[must_use]
    pub fn extract(&self, opcode: u32) -> Fields {
        let mut fields = Fields::new();
        for field in self.fields {
            fields.push(field.name, extract_bits(opcode, field.high, field.low));
        }
        fields
    }
}

const fn cb(high: u8, low: u8, expected: u32) -> ControlBits {
    ControlBits::new(high, low, expected)
}

const fn f(high: u8, low: u8, name: &'static str) -> FieldSpec {
    FieldSpec::new(high, low, name)
}

const COND: FieldSpec = f(31, 28, "Cond");

pub static FILTERS: [InstructionFilter; 20] = [
    InstructionFilter {
        kind: InstructionKind::DataProcRegShiftImm,
        control: &[cb(27, 25, 0b000), cb(4, 4, 0b0)],
        fields: &[
            COND,
            f(24, 21, "Op"),
            f(20, 20, "S"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(11, 7, "Shift"),
            f(6, 5, "Typ"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::DataProcRegShiftReg,
        control: &[cb(27, 25, 0b000), cb(7, 7, 0b0), cb(4, 4, 0b1)],
        fields: &[
            COND,
            f(24, 21, "Op"),
            f(20, 20, "S"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(11, 8, "Rs"),
            f(6, 5, "Typ"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::DataProcImm,
        control: &[cb(27, 25, 0b001)],
        fields: &[
            COND,
            f(24, 21, "Op"),
            f(20, 20, "S"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(11, 8, "Shift"),
            f(7, 0, "Immediate"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::PsrImm,
        control: &[cb(27, 23, 0b00110), cb(21, 20, 0b10)],
        fields: &[
            COND,
            f(22, 22, "P"),
            f(19, 16, "Field"),
            f(15, 12, "Rd"),
            f(11, 8, "Shift"),
            f(7, 0, "Immediate"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::PsrReg,
        control: &[cb(27, 23, 0b00010), cb(20, 20, 0b0), cb(11, 4, 0b0000_0000)],
        fields: &[
            COND,
            f(22, 22, "P"),
            f(21, 21, "L"),
            f(19, 16, "Field"),
            f(15, 12, "Rd"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::BranchExchange,
        control: &[cb(27, 6, 0b00_0100_1011_1111_1111_1100), cb(4, 4, 0b1)],
        fields: &[COND, f(5, 5, "L"), f(3, 0, "Rn")],
    },
    InstructionFilter {
        kind: InstructionKind::Multiply,
        control: &[cb(27, 22, 0b00_0000), cb(7, 4, 0b1001)],
        fields: &[
            COND,
            f(23, 21, "Op"),
            f(21, 21, "A"),
            f(20, 20, "S"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(11, 8, "Rs"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::MultiplyLong,
        control: &[cb(27, 23, 0b00001), cb(7, 4, 0b1001)],
        fields: &[
            COND,
            f(23, 21, "Op"),
            f(22, 22, "U"),
            f(21, 21, "A"),
            f(20, 20, "S"),
            f(19, 16, "RdHi"),
            f(15, 12, "RdLo"),
            f(11, 8, "Rs"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::Swap,
        control: &[cb(27, 23, 0b00010), cb(21, 20, 0b00), cb(11, 4, 0b0000_1001)],
        fields: &[
            COND,
            f(22, 22, "B"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::HalfwordTransferReg,
        control: &[
            cb(27, 25, 0b000),
            cb(22, 22, 0b0),
            cb(11, 7, 0b00001),
            cb(4, 4, 0b1),
        ],
        fields: &[
            COND,
            f(24, 24, "P"),
            f(23, 23, "U"),
            f(21, 21, "W"),
            f(20, 20, "L"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(6, 6, "S"),
            f(5, 5, "H"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::HalfwordTransferImm,
        control: &[
            cb(27, 25, 0b000),
            cb(22, 22, 0b1),
            cb(7, 7, 0b1),
            cb(4, 4, 0b1),
        ],
        fields: &[
            COND,
            f(24, 24, "P"),
            f(23, 23, "U"),
            f(21, 21, "W"),
            f(20, 20, "L"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(11, 8, "OffsetH"),
            f(6, 6, "S"),
            f(5, 5, "H"),
            f(3, 0, "OffsetL"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::TransferImm,
        control: &[cb(27, 25, 0b010)],
        fields: &[
            COND,
            f(24, 24, "P"),
            f(23, 23, "U"),
            f(22, 22, "B"),
            f(21, 21, "W"),
            f(20, 20, "L"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(11, 0, "Offset"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::TransferReg,
        control: &[cb(27, 25, 0b011), cb(4, 4, 0b0)],
        fields: &[
            COND,
            f(24, 24, "P"),
            f(23, 23, "U"),
            f(22, 22, "B"),
            f(21, 21, "W"),
            f(20, 20, "L"),
            f(19, 16, "Rn"),
            f(15, 12, "Rd"),
            f(11, 7, "Shift"),
            f(6, 5, "Typ"),
            f(3, 0, "Rm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::Undefined,
        control: &[cb(27, 25, 0b011), cb(4, 4, 0b1)],
        fields: &[COND],
    },
    InstructionFilter {
        kind: InstructionKind::BlockTransfer,
        control: &[cb(27, 25, 0b100)],
        fields: &[
            COND,
            f(24, 24, "P"),
            f(23, 23, "U"),
            f(22, 22, "S"),
            f(21, 21, "W"),
            f(20, 20, "L"),
            f(19, 16, "Rn"),
            f(15, 0, "RegList"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::Branch,
        control: &[cb(27, 25, 0b101)],
        fields: &[COND, f(24, 24, "L"), f(23, 0, "Offset")],
    },
    InstructionFilter {
        kind: InstructionKind::CoprocessorDataTransfer,
        control: &[cb(27, 25, 0b110)],
        fields: &[
            COND,
            f(24, 24, "P"),
            f(23, 23, "U"),
            f(22, 22, "N"),
            f(21, 21, "W"),
            f(20, 20, "L"),
            f(19, 16, "Rn"),
            f(15, 12, "CRd"),
            f(11, 8, "CP#"),
            f(7, 0, "Offset"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::CoprocessorDataOperation,
        control: &[cb(27, 24, 0b1110), cb(4, 4, 0b0)],
        fields: &[
            COND,
            f(23, 20, "CPopc"),
            f(19, 16, "CRn"),
            f(15, 12, "CRd"),
            f(11, 8, "CP#"),
            f(7, 5, "CP"),
            f(3, 0, "CRm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::CoprocessorRegisterTransfer,
        control: &[cb(27, 24, 0b1110), cb(4, 4, 0b1)],
        fields: &[
            COND,
            f(23, 21, "CPopc"),
            f(20, 20, "L"),
            f(19, 16, "CRn"),
            f(15, 12, "Rd"),
            f(11, 8, "CP#"),
            f(7, 5, "CP"),
            f(3, 0, "CRm"),
        ],
    },
    InstructionFilter {
        kind: InstructionKind::SoftwareInterrupt,
        // Bit 4 belongs to the comment field and is not constrained, so
        // `SWI 5` (0xEF000005) decodes.
        control: &[cb(27, 24, 0b1111)],
        fields: &[COND, f(23, 0, "Comment")],
    },
];

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Decoded {
        kind: InstructionKind,
        fields: Fields,
    },
    Unknown,
    /// More than one filter produced a valid instruction. Kinds are listed
    /// in table order.
    Ambiguous(Vec<InstructionKind>),
}

/// Drops encodings a matching format cannot actually have.
fn is_valid(kind: InstructionKind, fields: &Fields) -> bool {
    use InstructionKind::*;
    match kind {
        DataProcRegShiftImm | DataProcRegShiftReg | DataProcImm => {
            let is_compare = fields
                .get("Op")
                .and_then(|op| ArmModeAluInstruction::try_from(op).ok())
                .is_some_and(ArmModeAluInstruction::is_compare);

            // Compare operations must set the flags and have Rd = R0 or R15.
            !is_compare
                || (fields.get("S") == Some(1) && matches!(fields.get("Rd"), Some(0x0 | 0xF)))
        }
        // SH = 00 is the swap and multiply encoding space.
        HalfwordTransferReg | HalfwordTransferImm => {
            !(fields.get("S") == Some(0) && fields.get("H") == Some(0))
        }
        _ => true,
    }
}

/// Tests `opcode` against every filter and keeps the valid matches.
#[must_use]
pub fn classify(opcode: u32) -> Classification {
    let mut candidates: Vec<(InstructionKind, Fields)> = FILTERS
        .iter()
        .filter(|filter| filter.matches(opcode))
        .map(|filter| (filter.kind, filter.extract(opcode)))
        .filter(|(kind, fields)| is_valid(*kind, fields))
        .collect();

    if candidates.len() > 1 {
        return Classification::Ambiguous(candidates.into_iter().map(|(kind, _)| kind).collect());
    }

    candidates
        .pop()
        .map_or(Classification::Unknown, |(kind, fields)| {
            Classification::Decoded { kind, fields }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn kind_of(opcode: u32) -> InstructionKind {
        match classify(opcode) {
            Classification::Decoded { kind, .. } => kind,
            Classification::Unknown => InstructionKind::Unknown,
            Classification::Ambiguous(candidates) => {
                panic!("0x{opcode:08X} is ambiguous: {candidates:?}")
            }
        }
    }

    #[test]
    fn table_order() {
        let kinds: Vec<InstructionKind> = FILTERS.iter().map(|filter| filter.kind).collect();
        use InstructionKind::*;
        assert_eq!(
            kinds,
            [
                DataProcRegShiftImm,
                DataProcRegShiftReg,
                DataProcImm,
                PsrImm,
                PsrReg,
                BranchExchange,
                Multiply,
                MultiplyLong,
                Swap,
                HalfwordTransferReg,
                HalfwordTransferImm,
                TransferImm,
                TransferReg,
                Undefined,
                BlockTransfer,
                Branch,
                CoprocessorDataTransfer,
                CoprocessorDataOperation,
                CoprocessorRegisterTransfer,
                SoftwareInterrupt,
            ]
        );
    }

    #[test]
    fn field_names_are_unique() {
        for filter in &FILTERS {
            let mut names: Vec<&str> = filter.fields.iter().map(|field| field.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), filter.fields.len(), "{:?}", filter.kind);
        }
    }

    #[test]
    fn every_filter_extracts_condition() {
        for filter in &FILTERS {
            assert_eq!(filter.fields[0], COND);
        }
    }

    #[test]
    fn known_opcodes() {
        use InstructionKind::*;
        let cases = [
            (0xE1A0_0000, DataProcRegShiftImm), // MOV R0, R0
            (0xE081_0312, DataProcRegShiftReg), // ADD R0, R1, R2, LSL R3
            (0xE3A0_0001, DataProcImm),         // MOV R0, #1
            (0xE150_0000, DataProcRegShiftImm), // CMP R0, R0
            (0xE328_F001, PsrImm),              // MSR CPSR_f, #1
            (0xE10F_0000, PsrReg),              // MRS R0, CPSR
            (0xE129_F000, PsrReg),              // MSR CPSR_fc, R0
            (0xE12F_FF11, BranchExchange),      // BX R1
            (0xE12F_FF31, BranchExchange),      // BLX R1
            (0xE000_0091, Multiply),            // MUL R0, R1, R0
            (0xE021_0392, Multiply),            // MLA R1, R2, R3, R0
            (0xE081_0392, MultiplyLong),        // UMULL R0, R1, R2, R3
            (0xE0E1_0392, MultiplyLong),        // SMLAL R0, R1, R2, R3
            (0xE101_0092, Swap),                // SWP R0, R2, [R1]
            (0xE141_0092, Swap),                // SWPB R0, R2, [R1]
            (0xE191_00B2, HalfwordTransferReg), // LDRH R0, [R1, R2]
            (0xE1D1_00B2, HalfwordTransferImm), // LDRH R0, [R1, #2]
            (0xE1D1_00D1, HalfwordTransferImm), // LDRSB R0, [R1, #1]
            (0xE591_0004, TransferImm),         // LDR R0, [R1, #4]
            (0xE791_0002, TransferReg),         // LDR R0, [R1, R2]
            (0xE7F0_00F0, Undefined),
            (0xE92D_4000, BlockTransfer), // STMFD SP!, {LR}
            (0xEA00_002E, Branch),
            (0xEB00_0000, Branch),
            (0xED90_0100, CoprocessorDataTransfer),
            (0xEE01_0200, CoprocessorDataOperation),
            (0xEE11_0210, CoprocessorRegisterTransfer),
            (0xEF00_0005, SoftwareInterrupt),
        ];

        for (opcode, expected) in cases {
            assert_eq!(kind_of(opcode), expected, "0x{opcode:08X}");
        }
    }

    #[test]
    fn compare_requires_s_bit() {
        // CMP R0, R0, LSL #1 without S: not a PSR transfer because 11-4 != 0.
        assert_eq!(classify(0xE140_0080), Classification::Unknown);
    }

    #[test]
    fn compare_requires_rd_zero_or_pc() {
        assert_eq!(classify(0xE150_5000), Classification::Unknown);
        assert_eq!(kind_of(0xE150_0000), InstructionKind::DataProcRegShiftImm);
        assert_eq!(kind_of(0xE150_F000), InstructionKind::DataProcRegShiftImm);
        assert_eq!(kind_of(0xE350_0001), InstructionKind::DataProcImm);
        assert_eq!(classify(0xE350_1001), Classification::Unknown);
    }

    #[test]
    fn psr_transfer_is_not_alu() {
        // Bits 27-20 of MRS look like TST without S.
        let Classification::Decoded { kind, fields } = classify(0xE10F_0000) else {
            panic!("MRS must decode");
        };
        assert_eq!(kind, InstructionKind::PsrReg);
        assert_eq!(fields.get("Rd"), Some(0));
        assert_eq!(fields.get("Field"), Some(0xF));
    }

    #[test]
    fn multiply_op_field() {
        let Classification::Decoded { fields, .. } = classify(0xE021_0392) else {
            panic!("MLA must decode");
        };
        assert_eq!(fields.get("Op"), Some(1));
        assert_eq!(fields.get("A"), Some(1));
        assert_eq!(fields.get("Rn"), Some(1));
        assert_eq!(fields.get("Rd"), Some(0));
        assert_eq!(fields.get("Rs"), Some(3));
        assert_eq!(fields.get("Rm"), Some(2));

        let Classification::Decoded { fields, .. } = classify(0xE0E1_0392) else {
            panic!("SMLAL must decode");
        };
        assert_eq!(fields.get("Op"), Some(7));
        assert_eq!(fields.get("RdHi"), Some(1));
        assert_eq!(fields.get("RdLo"), Some(0));
    }

    #[test]
    fn branch_fields() {
        let Classification::Decoded { kind, fields } = classify(0x0BFF_FFFE) else {
            panic!("BLEQ must decode");
        };
        assert_eq!(kind, InstructionKind::Branch);
        assert_eq!(
            fields.iter().collect::<Vec<_>>(),
            [("Cond", 0x0), ("L", 1), ("Offset", 0x00FF_FFFE)]
        );
    }

    #[test]
    fn extracted_fields_fit_their_width() {
        let mut rng = rand::thread_rng();
        for _ in 0..5_000 {
            let opcode: u32 = rng.r#gen();
            for filter in FILTERS.iter().filter(|filter| filter.matches(opcode)) {
                let fields = filter.extract(opcode);
                for (spec, (name, value)) in filter.fields.iter().zip(fields.iter()) {
                    assert_eq!(spec.name, name);
                    assert!(value <= bit_mask(spec.high, spec.low));
                    assert_eq!(value, (opcode >> spec.low) & bit_mask(spec.high, spec.low));
                }
            }
        }
    }

    /// Walks every value of bits 27-20 and 7-4 with bit 0 set, `Rs` at both
    /// extremes and a handful of patterns for bits 19-12.
    #[test]
    fn no_opcode_is_ambiguous() {
        for high in 0..=0xFF_u32 {
            for low in 0..=0xF_u32 {
                for rs in [0x0, 0xF] {
                    for middle in [0x00, 0xFF, 0xF0, 0x0F, 0x55] {
                        let opcode =
                            0xE000_0000 | high << 20 | middle << 12 | rs << 8 | low << 4 | 0x1;
                        assert!(
                            !matches!(classify(opcode), Classification::Ambiguous(_)),
                            "0x{opcode:08X} is ambiguous"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn swi_comment_is_unconstrained() {
        for opcode in [0xEF00_0005, 0xEF00_0015, 0xEFFF_FFEF] {
            let Classification::Decoded { kind, fields } = classify(opcode) else {
                panic!("0x{opcode:08X} must decode");
            };
            assert_eq!(kind, InstructionKind::SoftwareInterrupt);
            assert_eq!(fields.get("Comment"), Some(opcode & 0x00FF_FFFF));
        }
    }

    #[test]
    fn random_opcodes_are_never_ambiguous() {
        let mut rng = rand::thread_rng();
        for _ in 0..20_000 {
            let opcode: u32 = rng.r#gen();
            let first = classify(opcode);
            assert!(
                !matches!(first, Classification::Ambiguous(_)),
                "0x{opcode:08X} is ambiguous: {first:?}"
            );
            assert_eq!(classify(opcode), first);
        }
    }
}
