//! # Banked Registers for Exception Modes
//!
//! Each exception mode has its own R13 (SP), R14 (LR), and SPSR.
//! FIQ additionally banks R8-R12 for faster interrupt handling.
//!
//! ```text
//! ┌──────┬────────────┬─────────┐
//! │ Mode │ Banked     │ SPSR    │
//! ├──────┼────────────┼─────────┤
//! │ FIQ  │ R8-R14     │ yes     │
//! │ SVC  │ R13-R14    │ yes     │
//! │ ABT  │ R13-R14    │ yes     │
//! │ IRQ  │ R13-R14    │ yes     │
//! │ UND  │ R13-R14    │ yes     │
//! └──────┴────────────┴─────────┘
//! ```
//!
//! Nothing switches modes yet: the bank only holds the reset state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBank {
    // FIQ mode banked registers
    pub r8_fiq: u32,
    pub r9_fiq: u32,
    pub r10_fiq: u32,
    pub r11_fiq: u32,
    pub r12_fiq: u32,
    pub r13_fiq: u32,
    pub r14_fiq: u32,

    /// R13 (SP) for Supervisor mode (SWI handler stack).
    pub r13_svc: u32,
    /// R14 (LR) for Supervisor mode (return address from SWI).
    pub r14_svc: u32,

    pub r13_abt: u32,
    pub r14_abt: u32,

    /// R13 (SP) for IRQ mode (interrupt handler stack).
    pub r13_irq: u32,
    /// R14 (LR) for IRQ mode (return address from interrupt).
    pub r14_irq: u32,

    pub r13_und: u32,
    pub r14_und: u32,

    // Saved Program Status Registers (one per exception mode)
    pub spsr_fiq: u32,
    pub spsr_svc: u32,
    pub spsr_abt: u32,
    pub spsr_irq: u32,
    pub spsr_und: u32,
}
