//! # ARM7TDMI Register File
//!
//! The 16 general-purpose registers visible at any time.
//!
//! - **R0-R12**: General purpose
//! - **R13 (SP)**: Stack pointer (by convention)
//! - **R14 (LR)**: Link register (return address)
//! - **R15 (PC)**: Program counter, the address of the next fetch
//!
//! For the registers swapped in by exception modes see
//! [`register_bank`](super::register_bank).

use serde::{Deserialize, Serialize};

/// Stack Pointer register index.
pub const REG_SP: usize = 0xD;

/// Link Register index (return address for subroutines).
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: usize = 0xF;

/// The 16 general-purpose registers visible to the CPU.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers([u32; 16]);

impl Registers {
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.0[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.0[REG_PROGRAM_COUNTER] = new_value;
    }

    pub const fn advance_program_counter(&mut self, bytes: u32) {
        self.0[REG_PROGRAM_COUNTER] = self.0[REG_PROGRAM_COUNTER].wrapping_add(bytes);
    }

    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        assert!(reg <= 15, "Invalid register index: {reg} (0x{reg:X})");
        self.0[reg] = new_value;
    }

    #[must_use]
    pub const fn register_at(&self, reg: usize) -> u32 {
        self.0[reg]
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u32> {
        self.0.as_slice().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn program_counter_is_r15() {
        let mut registers = Registers::default();
        registers.set_program_counter(0x0800_0000);
        registers.advance_program_counter(4);

        assert_eq!(registers.register_at(REG_PROGRAM_COUNTER), 0x0800_0004);
        assert_eq!(registers.program_counter(), 0x0800_0004);
    }

    #[test]
    fn program_counter_wraps() {
        let mut registers = Registers::default();
        registers.set_program_counter(0xFFFF_FFFC);
        registers.advance_program_counter(4);
        assert_eq!(registers.program_counter(), 0);
    }

    #[test]
    fn set_register() {
        let mut registers = Registers::default();
        registers.set_register_at(REG_SP, 0x0300_7F00);
        registers.set_register_at(REG_LR, 0x0800_0100);

        let mut expected = vec![0; 16];
        expected[REG_SP] = 0x0300_7F00;
        expected[REG_LR] = 0x0800_0100;
        assert_eq!(registers.to_vec(), expected);
    }

    #[test]
    #[should_panic(expected = "Invalid register index")]
    fn invalid_register() {
        Registers::default().set_register_at(16, 0);
    }
}
