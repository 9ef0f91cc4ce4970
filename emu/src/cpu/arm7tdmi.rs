//! # Three Stage Pipeline
//!
//! The ARM7TDMI fetches, decodes and executes in parallel: while one
//! instruction executes, the next one is decoded and the one after is
//! fetched.
//!
//! ```text
//! cycle   fetch   decode   execute
//!   1      I0       -         -
//!   2      I1      I0         -
//!   3      I2      I1        I0
//!   4      I3      I2        I1
//! ```
//!
//! Each stage is a single slot and instructions are moved from one slot to
//! the next, never copied. The execute stage does not run anything yet.

use tracing::{debug, trace};

use crate::memory::AddressSpace;

use super::arm::disassembler::{FormatOptions, render};
use super::arm::instructions::ArmInstruction;
use super::register_bank::RegisterBank;
use super::registers::Registers;
use super::{CpuError, DisasmEntry};

pub const SIZE_OF_ARM_INSTRUCTION: u32 = 4;

pub struct Arm7tdmi {
    pub memory: AddressSpace,

    pub cpsr: u32,
    pub registers: Registers,
    pub register_bank: RegisterBank,

    pub format: FormatOptions,

    fetched: Option<ArmInstruction>,
    decoding: Option<ArmInstruction>,
    executing: Option<ArmInstruction>,
}

impl Default for Arm7tdmi {
    fn default() -> Self {
        Self::new(AddressSpace::default(), FormatOptions::default())
    }
}

impl Arm7tdmi {
    #[must_use]
    pub fn new(memory: AddressSpace, format: FormatOptions) -> Self {
        Self {
            memory,
            cpsr: 0,
            registers: Registers::default(),
            register_bank: RegisterBank::default(),
            format,
            fetched: None,
            decoding: None,
            executing: None,
        }
    }

    #[must_use]
    pub const fn fetch_stage(&self) -> Option<&ArmInstruction> {
        self.fetched.as_ref()
    }

    #[must_use]
    pub const fn decode_stage(&self) -> Option<&ArmInstruction> {
        self.decoding.as_ref()
    }

    #[must_use]
    pub const fn execute_stage(&self) -> Option<&ArmInstruction> {
        self.executing.as_ref()
    }

    /// Reads the word at PC, then shifts every stage by one.
    ///
    /// Nothing moves if the read fails.
    fn advance(&mut self) -> Result<(), CpuError> {
        let pc = self.registers.program_counter();
        let opcode = self.memory.read32(pc)?;

        self.executing = self.decoding.take();
        self.decoding = self.fetched.replace(ArmInstruction::new(pc, opcode));
        self.registers.advance_program_counter(SIZE_OF_ARM_INSTRUCTION);

        trace!("fetched {opcode:08X} at {pc:08X}");
        Ok(())
    }

    // Consumes the instruction: it leaves the pipeline here.
    #[allow(clippy::needless_pass_by_value)]
    fn execute(instruction: ArmInstruction) {
        trace!("retired {:08X}", instruction.address);
    }

    /// Runs one pipeline cycle and returns the line rendered by the decode
    /// stage, if an instruction was there.
    pub fn step(&mut self) -> Result<Option<DisasmEntry>, CpuError> {
        if self.executing.is_none() {
            self.advance()?;
        }

        let entry = match self.decoding.as_mut() {
            Some(instruction) => {
                instruction.decode()?;
                let text = render(instruction, self.format)?;
                debug!("{text}");
                Some(DisasmEntry {
                    address: instruction.address,
                    opcode: instruction.opcode,
                    kind: instruction.kind,
                    text,
                })
            }
            None => None,
        };

        if let Some(instruction) = self.executing.take() {
            Self::execute(instruction);
            self.advance()?;
        }

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::arm::instructions::InstructionKind;
    use crate::memory::MemoryError;
    use pretty_assertions::assert_eq;

    fn cpu_with_program(base: u32, program: &[u32]) -> Arm7tdmi {
        let mut cpu = Arm7tdmi::default();
        for (index, opcode) in program.iter().enumerate() {
            cpu.memory.write32(base + 4 * index as u32, *opcode).unwrap();
        }
        cpu.registers.set_program_counter(base);
        cpu
    }

    #[test]
    fn reset_state() {
        let cpu = Arm7tdmi::default();
        assert_eq!(cpu.registers.to_vec(), vec![0; 16]);
        assert_eq!(cpu.register_bank, RegisterBank::default());
        assert_eq!(cpu.cpsr, 0);
        assert!(cpu.fetch_stage().is_none());
        assert!(cpu.decode_stage().is_none());
        assert!(cpu.execute_stage().is_none());
    }

    #[test]
    fn pipeline_fills_up() {
        let program = [0xE3A0_0001, 0xE1A0_0000, 0xEA00_0001, 0xEF00_0005];
        let mut cpu = cpu_with_program(0x0300_0000, &program);

        assert_eq!(cpu.step(), Ok(None));
        assert_eq!(cpu.fetch_stage().map(|i| i.opcode), Some(0xE3A0_0001));
        assert_eq!(cpu.registers.program_counter(), 0x0300_0004);

        let entry = cpu.step().unwrap().unwrap();
        assert_eq!(entry.address, 0x0300_0000);
        assert_eq!(entry.opcode, 0xE3A0_0001);
        assert_eq!(entry.kind, InstructionKind::DataProcImm);
        assert_eq!(entry.text, "MOV");
        assert!(cpu.execute_stage().is_none());

        // Third cycle: the first instruction reaches execute and is retired.
        let entry = cpu.step().unwrap().unwrap();
        assert_eq!(entry.address, 0x0300_0004);
        assert_eq!(cpu.execute_stage().map(|i| i.address), Some(0x0300_0004));
        assert_eq!(cpu.decode_stage().map(|i| i.address), Some(0x0300_0008));
        assert_eq!(cpu.fetch_stage().map(|i| i.address), Some(0x0300_000C));
        assert_eq!(cpu.registers.program_counter(), 0x0300_0010);

        let entry = cpu.step().unwrap().unwrap();
        assert_eq!(entry.text, "B 0x03000014");
    }

    #[test]
    fn decoded_lines_are_sequential() {
        let program = [0xE1A0_0000; 16];
        let mut cpu = cpu_with_program(0x0200_0000, &program);

        let addresses: Vec<u32> = (0..10)
            .filter_map(|_| cpu.step().unwrap())
            .map(|entry| entry.address)
            .collect();
        assert_eq!(
            addresses,
            (0..9).map(|i| 0x0200_0000 + 4 * i).collect::<Vec<_>>()
        );
    }

    #[test]
    fn rendering_uses_format_options() {
        let mut cpu = cpu_with_program(0x0300_0000, &[0xE12F_FF11]);
        cpu.format = FormatOptions {
            show_address: true,
            show_opcode: true,
        };

        cpu.step().unwrap();
        let entry = cpu.step().unwrap().unwrap();
        assert_eq!(entry.text, "03000000 : E12FFF11 | BX R1");
    }

    #[test]
    fn fetch_failure_leaves_pipeline_untouched() {
        let mut cpu = cpu_with_program(0x0300_7FF8, &[0xE1A0_0000, 0xE1A0_0000]);

        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.registers.program_counter(), 0x0300_8000);

        let error = cpu.step();
        assert_eq!(
            error,
            Err(CpuError::Memory(MemoryError::OutOfZone {
                address: 0x0300_8000,
                zone: 3
            }))
        );
        assert_eq!(cpu.registers.program_counter(), 0x0300_8000);
        assert_eq!(cpu.decode_stage().map(|i| i.address), Some(0x0300_7FF8));
        assert_eq!(cpu.fetch_stage().map(|i| i.address), Some(0x0300_7FFC));
    }
}
