use std::path::Path;

use crate::cpu::arm::disassembler::FormatOptions;
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::{CpuError, DisasmEntry};
use crate::memory::loader::{self, LoadError};
use crate::memory::zone::ROM0_BASE;

/// The console: a CPU that owns the whole address space.
#[derive(Default)]
pub struct Gba {
    pub cpu: Arm7tdmi,
}

impl Gba {
    #[must_use]
    pub fn new(format: FormatOptions) -> Self {
        let mut cpu = Arm7tdmi::default();
        cpu.format = format;
        Self { cpu }
    }

    pub fn load_bios(&mut self, image: &[u8]) -> Result<(), LoadError> {
        loader::load_bios(&mut self.cpu.memory, image)
    }

    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), LoadError> {
        loader::load_rom(&mut self.cpu.memory, image)
    }

    pub fn load_bios_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        loader::load_bios_file(&mut self.cpu.memory, path)
    }

    pub fn load_rom_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        loader::load_rom_file(&mut self.cpu.memory, path)
    }

    /// Starts execution at the cartridge entry point instead of the BIOS.
    pub const fn skip_bios(&mut self) {
        self.cpu.registers.set_program_counter(ROM0_BASE);
    }

    pub fn step(&mut self) -> Result<Option<DisasmEntry>, CpuError> {
        self.cpu.step()
    }

    /// Runs `cycles` pipeline cycles and collects the decoded lines.
    pub fn run(&mut self, cycles: usize) -> Result<Vec<DisasmEntry>, CpuError> {
        let mut lines = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            if let Some(entry) = self.step()? {
                lines.push(entry);
            }
        }
        Ok(lines)
    }
}
