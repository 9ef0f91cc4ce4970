//! Copies BIOS and cartridge images into an [`AddressSpace`].
//!
//! Both regions are filled with `0xFF` before the image is written, so the
//! bytes past the end of a short image read as open ROM.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use super::zone::{BIOS_BASE, BIOS_SIZE, ROM_SIZE, ROM0_BASE, ROM1_BASE};
use super::{AddressSpace, MemoryError};

const ERASED: u32 = 0xFFFF_FFFF;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("BIOS image is {0} bytes, at most {max} are allowed", max = BIOS_SIZE)]
    BiosTooLarge(usize),

    #[error("ROM image is {0} bytes, at most {max} are allowed", max = ROM_SIZE)]
    RomTooLarge(usize),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("cannot read image: {0}")]
    Io(#[from] io::Error),
}

pub fn load_bios(memory: &mut AddressSpace, image: &[u8]) -> Result<(), LoadError> {
    if image.len() > BIOS_SIZE as usize {
        warn!("rejecting BIOS of {} bytes", image.len());
        return Err(LoadError::BiosTooLarge(image.len()));
    }

    memory.fill(BIOS_BASE, BIOS_BASE + BIOS_SIZE, ERASED)?;
    if !image.is_empty() {
        memory.write_block(BIOS_BASE, image)?;
    }

    info!("BIOS loaded ({} bytes)", image.len());
    Ok(())
}

/// Loads a cartridge image in the Wait State 0 window. The image is visible
/// through the two other windows as well.
pub fn load_rom(memory: &mut AddressSpace, image: &[u8]) -> Result<(), LoadError> {
    if image.len() > ROM_SIZE as usize {
        warn!("rejecting ROM of {} bytes", image.len());
        return Err(LoadError::RomTooLarge(image.len()));
    }

    memory.fill(ROM0_BASE, ROM1_BASE, ERASED)?;
    if !image.is_empty() {
        memory.write_block(ROM0_BASE, image)?;
    }

    info!("ROM loaded ({} bytes)", image.len());
    Ok(())
}

pub fn load_bios_file(memory: &mut AddressSpace, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let image = fs::read(path)?;
    load_bios(memory, &image)
}

pub fn load_rom_file(memory: &mut AddressSpace, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let image = fs::read(path)?;
    load_rom(memory, &image)
}
