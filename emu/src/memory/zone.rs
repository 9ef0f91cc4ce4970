//! # GBA Memory Map
//!
//! The address space is split in 16 zones selected by address bits 27-24.
//! Every zone is backed by one of nine buffers (or by nothing at all):
//!
//! ```text
//! ┌──────┬─────────────┬──────────┬──────────────────────────────────────┐
//! │ Zone │ Base        │ Size     │ Backing                              │
//! ├──────┼─────────────┼──────────┼──────────────────────────────────────┤
//! │  0   │ 0x0000_0000 │ 16 KB    │ BIOS - System ROM                    │
//! │  1   │ 0x0100_0000 │ -        │ Not used                             │
//! │  2   │ 0x0200_0000 │ 256 KB   │ EWRAM - On-board Work RAM            │
//! │  3   │ 0x0300_0000 │ 32 KB    │ IWRAM - On-chip Work RAM             │
//! │  4   │ 0x0400_0000 │ 0x3FF    │ I/O Registers                        │
//! │  5   │ 0x0500_0000 │ 1 KB     │ BG/OBJ Palette RAM                   │
//! │  6   │ 0x0600_0000 │ 96 KB    │ VRAM - Video RAM                     │
//! │  7   │ 0x0700_0000 │ 1 KB     │ OAM - OBJ Attributes                 │
//! │  8   │ 0x0800_0000 │ 16 MB    │ Game Pak ROM low half, Wait State 0  │
//! │  9   │ 0x0900_0000 │ 16 MB    │ Game Pak ROM high half, Wait State 0 │
//! │ 10   │ 0x0A00_0000 │ 16 MB    │ Game Pak ROM low half, Wait State 1  │
//! │ 11   │ 0x0B00_0000 │ 16 MB    │ Game Pak ROM high half, Wait State 1 │
//! │ 12   │ 0x0C00_0000 │ 16 MB    │ Game Pak ROM low half, Wait State 2  │
//! │ 13   │ 0x0D00_0000 │ 16 MB    │ Game Pak ROM high half, Wait State 2 │
//! │ 14   │ 0x0E00_0000 │ 64 KB    │ Game Pak SRAM - 8bit bus width       │
//! │ 15   │ 0x0F00_0000 │ -        │ Not used                             │
//! └──────┴─────────────┴──────────┴──────────────────────────────────────┘
//! ```
//!
//! Addresses with any of the upper 4 bits set are invalid: the address bus is
//! 28 bits wide.
//!
//! The Game Pak ROM is mirrored to three address windows (Wait State 0-2).
//! The three windows share the same 32 MB buffer, so a write through one of
//! them is visible through the other two.

use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::MemoryError;
use crate::bitwise::extract_bits;

pub const BIOS_SIZE: u32 = 0x4000;
pub const EWRAM_SIZE: u32 = 0x0004_0000;
pub const IWRAM_SIZE: u32 = 0x8000;
pub const IO_SIZE: u32 = 0x3FF;
pub const PALETTE_SIZE: u32 = 0x400;
pub const VRAM_SIZE: u32 = 0x0001_8000;
pub const OAM_SIZE: u32 = 0x400;
pub const ROM_SIZE: u32 = 0x0200_0000;
pub const SRAM_SIZE: u32 = 0x0001_0000;

pub const BIOS_BASE: u32 = 0x0000_0000;
pub const EWRAM_BASE: u32 = 0x0200_0000;
pub const IWRAM_BASE: u32 = 0x0300_0000;
pub const IO_BASE: u32 = 0x0400_0000;
pub const PALETTE_BASE: u32 = 0x0500_0000;
pub const VRAM_BASE: u32 = 0x0600_0000;
pub const OAM_BASE: u32 = 0x0700_0000;
pub const ROM0_BASE: u32 = 0x0800_0000;
pub const ROM1_BASE: u32 = 0x0A00_0000;
pub const ROM2_BASE: u32 = 0x0C00_0000;
pub const SRAM_BASE: u32 = 0x0E00_0000;

pub const ZONE_COUNT: usize = 16;

const ROM_HALF: u32 = ROM_SIZE / 2;

/// One of the nine buffers owned by the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Bios,
    Ewram,
    Iwram,
    Io,
    Palette,
    Vram,
    Oam,
    Rom,
    Sram,
}

impl Region {
    pub const ALL: [Self; 9] = [
        Self::Bios,
        Self::Ewram,
        Self::Iwram,
        Self::Io,
        Self::Palette,
        Self::Vram,
        Self::Oam,
        Self::Rom,
        Self::Sram,
    ];

    /// Size of the whole backing buffer. For the ROM this spans two zones.
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Bios => BIOS_SIZE,
            Self::Ewram => EWRAM_SIZE,
            Self::Iwram => IWRAM_SIZE,
            Self::Io => IO_SIZE,
            Self::Palette => PALETTE_SIZE,
            Self::Vram => VRAM_SIZE,
            Self::Oam => OAM_SIZE,
            Self::Rom => ROM_SIZE,
            Self::Sram => SRAM_SIZE,
        }
    }

    /// Address where the buffer starts; for the ROM it is the Wait State 0 window.
    #[must_use]
    pub const fn base(self) -> u32 {
        match self {
            Self::Bios => BIOS_BASE,
            Self::Ewram => EWRAM_BASE,
            Self::Iwram => IWRAM_BASE,
            Self::Io => IO_BASE,
            Self::Palette => PALETTE_BASE,
            Self::Vram => VRAM_BASE,
            Self::Oam => OAM_BASE,
            Self::Rom => ROM0_BASE,
            Self::Sram => SRAM_BASE,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bios => f.write_str("bios"),
            Self::Ewram => f.write_str("ewram"),
            Self::Iwram => f.write_str("iwram"),
            Self::Io => f.write_str("io"),
            Self::Palette => f.write_str("palette"),
            Self::Vram => f.write_str("vram"),
            Self::Oam => f.write_str("oam"),
            Self::Rom => f.write_str("rom"),
            Self::Sram => f.write_str("sram"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown memory region `{0}`")]
pub struct UnknownRegion(String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|region| region.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

/// Where a zone lands inside its backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backing {
    pub region: Region,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub base: u32,
    pub size: u32,
    pub backing: Option<Backing>,
}

impl Zone {
    const fn mapped(base: u32, size: u32, region: Region, offset: u32) -> Self {
        Self {
            base,
            size,
            backing: Some(Backing { region, offset }),
        }
    }

    const fn unmapped(base: u32) -> Self {
        Self {
            base,
            size: 0,
            backing: None,
        }
    }
}

pub static ZONES: [Zone; ZONE_COUNT] = [
    Zone::mapped(BIOS_BASE, BIOS_SIZE, Region::Bios, 0),
    Zone::unmapped(0x0100_0000),
    Zone::mapped(EWRAM_BASE, EWRAM_SIZE, Region::Ewram, 0),
    Zone::mapped(IWRAM_BASE, IWRAM_SIZE, Region::Iwram, 0),
    Zone::mapped(IO_BASE, IO_SIZE, Region::Io, 0),
    Zone::mapped(PALETTE_BASE, PALETTE_SIZE, Region::Palette, 0),
    Zone::mapped(VRAM_BASE, VRAM_SIZE, Region::Vram, 0),
    Zone::mapped(OAM_BASE, OAM_SIZE, Region::Oam, 0),
    Zone::mapped(ROM0_BASE, ROM_HALF, Region::Rom, 0),
    Zone::mapped(0x0900_0000, ROM_HALF, Region::Rom, ROM_HALF),
    Zone::mapped(ROM1_BASE, ROM_HALF, Region::Rom, 0),
    Zone::mapped(0x0B00_0000, ROM_HALF, Region::Rom, ROM_HALF),
    Zone::mapped(ROM2_BASE, ROM_HALF, Region::Rom, 0),
    Zone::mapped(0x0D00_0000, ROM_HALF, Region::Rom, ROM_HALF),
    Zone::mapped(SRAM_BASE, SRAM_SIZE, Region::Sram, 0),
    Zone::unmapped(0x0F00_0000),
];

/// A validated single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub region: Region,
    pub offset: usize,
}

/// A validated byte range, already translated into buffer offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub region: Region,
    pub range: Range<usize>,
}

const fn check_bus_width(address: u32) -> Result<(), MemoryError> {
    if address & 0xF000_0000 != 0 {
        return Err(MemoryError::BusWidth(address));
    }
    Ok(())
}

#[must_use]
pub const fn zone_index(address: u32) -> usize {
    extract_bits(address, 27, 24) as usize
}

/// Offset of `address` inside its zone's buffer, if it lies inside the zone.
fn buffer_offset(address: u32, zone: usize) -> Result<(Region, usize), MemoryError> {
    let descriptor = &ZONES[zone];
    let relative = address.wrapping_sub(descriptor.base);
    match descriptor.backing {
        Some(backing) if relative < descriptor.size => {
            Ok((backing.region, (backing.offset + relative) as usize))
        }
        _ => Err(MemoryError::OutOfZone { address, zone }),
    }
}

/// Validates a single address and resolves it to its owning buffer.
pub fn locate(address: u32) -> Result<Location, MemoryError> {
    check_bus_width(address)?;
    let (region, offset) = buffer_offset(address, zone_index(address))?;
    Ok(Location { region, offset })
}

/// Two different zones can be covered by one range only when they are the two
/// halves of the same ROM wait state window.
const fn is_wait_state_pair(first: usize, last: usize) -> bool {
    first >= 8 && last < 14 && first % 2 == 0 && last == first + 1
}

/// Validates the half-open range `[start, end)`.
///
/// Zone and bound checks are done on the first and on the last byte of the
/// range (`end - 1`).
pub fn locate_range(start: u32, end: u32) -> Result<Span, MemoryError> {
    if start >= end {
        return Err(MemoryError::ReversedRange { start, end });
    }
    let last = end - 1;
    check_bus_width(start)?;
    check_bus_width(last)?;

    let first_zone = zone_index(start);
    let last_zone = zone_index(last);
    if first_zone != last_zone && !is_wait_state_pair(first_zone, last_zone) {
        return Err(MemoryError::CrossZone {
            start,
            end,
            first: first_zone,
            last: last_zone,
        });
    }

    let (region, first_offset) = buffer_offset(start, first_zone)?;
    let (_, last_offset) = buffer_offset(last, last_zone)?;

    Ok(Span {
        region,
        range: first_offset..last_offset + 1,
    })
}

/// Validates `len` bytes starting at `start`.
pub fn locate_len(start: u32, len: usize) -> Result<Span, MemoryError> {
    let end = u32::try_from(len)
        .ok()
        .and_then(|len| start.checked_add(len))
        .ok_or(MemoryError::BusWidth(start))?;
    locate_range(start, end)
}
