pub mod address_space;
pub mod loader;
pub mod zone;

use thiserror::Error;

pub use address_space::AddressSpace;
pub use zone::Region;

/// Invalid memory access. None of these are recoverable for the access that
/// raised them: values are never clamped or wrapped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address 0x{0:08X} uses the upper 4 bits of the address bus")]
    BusWidth(u32),

    #[error("address 0x{address:08X} is out of zone {zone}")]
    OutOfZone { address: u32, zone: usize },

    #[error("reversed or empty interval 0x{start:08X}..0x{end:08X}")]
    ReversedRange { start: u32, end: u32 },

    #[error("interval 0x{start:08X}..0x{end:08X} spans memory zones {first} and {last}")]
    CrossZone {
        start: u32,
        end: u32,
        first: usize,
        last: usize,
    },
}
