use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use super::MemoryError;
use super::zone::{Region, locate, locate_len, locate_range};

/// Owns the nine buffers that back the GBA address space.
///
/// Every access is validated through the zone table in [`super::zone`] before
/// it reaches a buffer, so an out of range index is never observed here.
pub struct AddressSpace {
    bios: Box<[u8]>,
    ewram: Box<[u8]>,
    iwram: Box<[u8]>,
    io: Box<[u8]>,
    palette: Box<[u8]>,
    vram: Box<[u8]>,
    oam: Box<[u8]>,
    rom: Box<[u8]>,
    sram: Box<[u8]>,
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

fn zeroed(region: Region) -> Box<[u8]> {
    vec![0; region.size() as usize].into_boxed_slice()
}

impl AddressSpace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bios: zeroed(Region::Bios),
            ewram: zeroed(Region::Ewram),
            iwram: zeroed(Region::Iwram),
            io: zeroed(Region::Io),
            palette: zeroed(Region::Palette),
            vram: zeroed(Region::Vram),
            oam: zeroed(Region::Oam),
            rom: zeroed(Region::Rom),
            sram: zeroed(Region::Sram),
        }
    }

    fn buffer(&self, region: Region) -> &[u8] {
        match region {
            Region::Bios => &self.bios,
            Region::Ewram => &self.ewram,
            Region::Iwram => &self.iwram,
            Region::Io => &self.io,
            Region::Palette => &self.palette,
            Region::Vram => &self.vram,
            Region::Oam => &self.oam,
            Region::Rom => &self.rom,
            Region::Sram => &self.sram,
        }
    }

    fn buffer_mut(&mut self, region: Region) -> &mut [u8] {
        match region {
            Region::Bios => &mut self.bios,
            Region::Ewram => &mut self.ewram,
            Region::Iwram => &mut self.iwram,
            Region::Io => &mut self.io,
            Region::Palette => &mut self.palette,
            Region::Vram => &mut self.vram,
            Region::Oam => &mut self.oam,
            Region::Rom => &mut self.rom,
            Region::Sram => &mut self.sram,
        }
    }

    /// Reads `N` bytes starting at `address`, the whole span being validated.
    fn read_bytes<const N: usize>(&self, address: u32) -> Result<[u8; N], MemoryError> {
        let span = locate_len(address, N)?;
        let mut bytes = [0; N];
        bytes.copy_from_slice(&self.buffer(span.region)[span.range]);
        Ok(bytes)
    }

    pub fn read8(&self, address: u32) -> Result<u8, MemoryError> {
        let location = locate(address)?;
        Ok(self.buffer(location.region)[location.offset])
    }

    pub fn read16(&self, address: u32) -> Result<u16, MemoryError> {
        self.read_bytes(address).map(u16::from_le_bytes)
    }

    pub fn read32(&self, address: u32) -> Result<u32, MemoryError> {
        self.read_bytes(address).map(u32::from_le_bytes)
    }

    pub fn write8(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        let location = locate(address)?;
        self.buffer_mut(location.region)[location.offset] = value;
        Ok(())
    }

    pub fn write16(&mut self, address: u32, value: u16) -> Result<(), MemoryError> {
        self.write_block(address, &value.to_le_bytes())
    }

    pub fn write32(&mut self, address: u32, value: u32) -> Result<(), MemoryError> {
        self.write_block(address, &value.to_le_bytes())
    }

    /// Copies `data` starting at `address`. Nothing is written unless the
    /// whole destination range is valid.
    pub fn write_block(&mut self, address: u32, data: &[u8]) -> Result<(), MemoryError> {
        let span = locate_len(address, data.len())?;
        self.buffer_mut(span.region)[span.range].copy_from_slice(data);
        Ok(())
    }

    /// Fills `[start, end)` with the little-endian bytes of `pattern`, repeated.
    /// When the range length is not a multiple of 4 the last repetition is
    /// truncated.
    pub fn fill(&mut self, start: u32, end: u32, pattern: u32) -> Result<(), MemoryError> {
        let span = locate_range(start, end)?;
        let bytes = pattern.to_le_bytes();
        for chunk in self.buffer_mut(span.region)[span.range].chunks_mut(4) {
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }

    #[must_use]
    pub fn region_bytes(&self, region: Region) -> &[u8] {
        self.buffer(region)
    }

    /// Writes the raw content of `region` to `path`.
    pub fn dump_region(&self, region: Region, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        debug!("dumping {region} to {}", path.display());
        fs::write(path, self.buffer(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::zone::{ROM0_BASE, ROM1_BASE, ROM2_BASE};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_work_ram() {
        let mut memory = AddressSpace::default();
        memory.write8(0x0300_0005, 5).unwrap();

        assert_eq!(memory.region_bytes(Region::Iwram)[5], 5);
        assert_eq!(memory.read8(0x0300_0005), Ok(5));
    }

    #[test]
    fn test_last_byte_work_ram() {
        let mut memory = AddressSpace::default();
        memory.write8(0x0300_7FFF, 5).unwrap();

        assert_eq!(memory.region_bytes(Region::Iwram)[0x7FFF], 5);
        assert_eq!(
            memory.write8(0x0300_8000, 5),
            Err(MemoryError::OutOfZone {
                address: 0x0300_8000,
                zone: 3
            })
        );
    }

    #[test]
    fn test_read_write_bios_memory() {
        let mut memory = AddressSpace::default();
        memory.write8(0x0000_01EC, 10).unwrap();
        assert_eq!(memory.read8(0x0000_01EC), Ok(10));
    }

    #[test]
    fn little_endian_reads() {
        let mut memory = AddressSpace::default();
        memory
            .write_block(0x0200_0000, &[0x78, 0x56, 0x34, 0x12])
            .unwrap();

        assert_eq!(memory.read32(0x0200_0000), Ok(0x1234_5678));
        assert_eq!(memory.read16(0x0200_0000), Ok(0x5678));
        assert_eq!(memory.read16(0x0200_0002), Ok(0x1234));
        assert_eq!(memory.read8(0x0200_0003), Ok(0x12));
    }

    #[test]
    fn little_endian_writes() {
        let mut memory = AddressSpace::default();
        memory.write32(0x0600_0000, 0xDEAD_BEEF).unwrap();
        memory.write16(0x0600_0004, 0xCAFE).unwrap();

        assert_eq!(
            &memory.region_bytes(Region::Vram)[..6],
            &[0xEF, 0xBE, 0xAD, 0xDE, 0xFE, 0xCA]
        );
    }

    #[test]
    fn read_past_zone_end() {
        let memory = AddressSpace::default();
        assert!(memory.read32(0x0203_FFFC).is_ok());
        assert_eq!(
            memory.read32(0x0203_FFFE),
            Err(MemoryError::OutOfZone {
                address: 0x0204_0001,
                zone: 2
            })
        );
    }

    #[test]
    fn rom_mirrors() {
        let mut memory = AddressSpace::default();
        memory.write8(ROM0_BASE, 0xAB).unwrap();
        assert_eq!(memory.read8(ROM1_BASE), Ok(0xAB));
        assert_eq!(memory.read8(ROM2_BASE), Ok(0xAB));

        memory.write8(0x0D00_0004, 0xCD).unwrap();
        assert_eq!(memory.read8(0x0900_0004), Ok(0xCD));
        assert_eq!(memory.region_bytes(Region::Rom)[0x0100_0004], 0xCD);
    }

    #[test]
    fn word_across_rom_halves() {
        let mut memory = AddressSpace::default();
        memory.write32(0x0AFF_FFFE, 0x1122_3344).unwrap();
        assert_eq!(memory.read32(0x08FF_FFFE), Ok(0x1122_3344));
        assert_eq!(memory.read16(0x0D00_0000), Ok(0x1122));
    }

    #[test]
    fn fill_truncates_tail() {
        let mut memory = AddressSpace::default();
        memory.fill(0x0300_0000, 0x0300_0006, 0x4433_2211).unwrap();

        assert_eq!(
            &memory.region_bytes(Region::Iwram)[..8],
            &[0x11, 0x22, 0x33, 0x44, 0x11, 0x22, 0, 0]
        );
    }

    #[test]
    fn fill_rejects_invalid_range() {
        let mut memory = AddressSpace::default();
        assert!(memory.fill(0x0300_0010, 0x0300_0010, 0).is_err());
        assert!(memory.fill(0x0200_0000, 0x0300_0010, 0).is_err());
        assert!(memory.region_bytes(Region::Ewram).iter().all(|b| *b == 0));
    }

    #[test]
    fn write_block_is_all_or_nothing() {
        let mut memory = AddressSpace::default();
        assert!(memory.write_block(0x0700_03FE, &[1, 2, 3, 4]).is_err());
        assert_eq!(memory.read16(0x0700_03FE), Ok(0));

        memory.write_block(0x0700_03FC, &[1, 2, 3, 4]).unwrap();
        assert_eq!(memory.read32(0x0700_03FC), Ok(0x0403_0201));
    }

    #[test]
    fn unmapped_zone_access() {
        let mut memory = AddressSpace::default();
        assert!(memory.read8(0x0100_0000).is_err());
        assert!(memory.write8(0x0F00_0000, 1).is_err());
        assert_eq!(
            memory.read32(0x1000_0000),
            Err(MemoryError::BusWidth(0x1000_0000))
        );
    }

    #[test]
    fn dump_region_writes_raw_bytes() {
        let mut memory = AddressSpace::default();
        memory.write32(0x0700_0000, 0x0403_0201).unwrap();

        let path = std::env::temp_dir().join(format!("oam_dump_{}.bin", std::process::id()));
        memory.dump_region(Region::Oam, &path).unwrap();
        let dumped = fs::read(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(dumped.len(), 0x400);
        assert_eq!(&dumped[..4], &[1, 2, 3, 4]);
    }
}
