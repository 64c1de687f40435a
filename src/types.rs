pub use zerocopy::IntoBytes;

use bitflags::bitflags;
use zerocopy::{
    little_endian::{U32, U64},
    FromBytes, Immutable, KnownLayout, Unaligned,
};

/// Magic marking an image as SDFS formatted.
pub const SDFS_SIGNATURE: [u8; 8] = *b"SDFSSDFS";
/// Zero bytes between the signature and the directory entry.
pub const SIGNATURE_PADDING: [u8; 8] = [0; 8];

/// Length of the reserved area at the start of the image. Owned by the
/// bootloader partition and never written by this tool.
pub const ESP_LENGTH_BYTES: u64 = 104_857_600;

pub const SECTOR_SIZE: u64 = 512;
pub const BLOCK_SIZE: u64 = 4096;

pub const ENTRY_SIZE: u64 = core::mem::size_of::<DirectoryEntry>() as u64;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryFlags: u8 {
        const SYSTEM     = 1 << 7;
        const READ_WRITE = 1 << 6;
        const SHOWN      = 1 << 5;
        const UNLOCKED   = 1 << 4;
    }
}

impl Default for EntryFlags {
    fn default() -> Self {
        EntryFlags::SYSTEM | EntryFlags::READ_WRITE
    }
}

/// The single on-disk directory entry, describing the placement of the
/// filesystem region and the kernel payload in 512-byte sectors.
///
/// All multi-byte fields are little-endian, on every build host. The two
/// sector counts are 41-bit values split across the last five fields:
/// bit 40 of the filesystem count occupies the low bit of
/// `shared_sector_bits`, and bit 0 of the combined count occupies its high
/// bit. The remaining bits of the combined count follow shifted down by one.
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct DirectoryEntry {
    pub flags:                 u8,
    pub entry_id_low:          U64,
    pub entry_id_high:         U64,
    pub fsystem_sectors_low:   U32,
    pub fsystem_sectors_mid:   u8,
    pub shared_sector_bits:    u8,
    pub combined_sectors_mid:  U32,
    pub combined_sectors_high: u8,
}
