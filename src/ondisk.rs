// This file contains the AMD firmware Flash on-disk format for the firmware entry table, the PSP and BIOS directories and the extended entry header.  Please only change it in coordination with the AMD firmware team.  Even then, you probably shouldn't.

use byteorder::LittleEndian;
use modular_bitfield::prelude::*;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use zerocopy::{AsBytes, FromBytes, LayoutVerified, Unaligned, U32, U64};

/// Given *BUF (a collection of multiple items), retrieves the first of the items and returns a copy of it.
/// If the item cannot be parsed, returns None.
pub fn header_from_collection<T: FromBytes + Unaligned + Copy>(buf: &[u8]) -> Option<T> {
    LayoutVerified::<_, T>::new_unaligned_from_prefix(buf).map(|(item, _xbuf)| *item)
}

/// Given *BUF (a collection of multiple items), retrieves the first of the items and returns it.
/// If the item cannot be parsed, returns None.
pub fn header_from_collection_mut<'a, T: FromBytes + AsBytes + Unaligned>(buf: &'a mut [u8]) -> Option<&'a mut T> {
    match LayoutVerified::<_, T>::new_unaligned_from_prefix(buf) {
        Some((item, _xbuf)) => {
            Some(item.into_mut())
        },
        None => None,
    }
}

type LU32 = U32<LittleEndian>;
type LU64 = U64<LittleEndian>;

macro_rules! make_accessors {(
    $StructName:ident {
        $($field_name:ident : $field_type:ty),* $(,)?
    }
) => (
    paste::paste! {
        impl $StructName {
            $(
                pub fn $field_name(&self) -> $field_type {
                    self.$field_name.get()
                }
                pub fn [<set_ $field_name>](&mut self, value: $field_type) {
                    self.$field_name.set(value)
                }
                pub fn [<with_ $field_name>](mut self, value: $field_type) -> Self {
                    self.$field_name.set(value);
                    self
                }
            )*
        }
    }
)}

pub const FIRMWARE_ENTRY_TABLE_SIGNATURE: u32 = 0x55aa_55aa;

// The first one is the default; the others are where older and bigger parts looked.
pub const FIRMWARE_ENTRY_TABLE_POSITION: [u32; 6] = [0x2_0000, 0, 0x82_0000, 0xC2_0000, 0xE2_0000, 0xF2_0000];

/// Pointer value the table uses for "nothing here".
pub const FIRMWARE_ENTRY_TABLE_POINTER_ABSENT: u32 = 0xffff_ffff;

/// Where the top of a 16 MiB flash is mapped in the x86 address space.
pub const DEFAULT_FLASH_MAPPING: u32 = 0xff00_0000;

// 16 MiB, 8 MiB, 5 MiB, 3 MiB, 2 MiB, 1.5 MiB windows below the top of the address space.
pub const FLASH_MAPPING_WINDOWS: [u32; 6] = [0, 0x80_0000, 0xB0_0000, 0xD0_0000, 0xE0_0000, 0xE8_0000];

/// Upper bound for one entry record, used to reject absurd entry counts.
pub const DIRECTORY_ENTRY_SIZE_BOUND: usize = 32;

/// Reserved region after a 2PSP header.
pub const DUAL_PSP_RESERVED_SIZE: usize = 16;

/// Entry types whose payload is itself a directory.
pub const PSP_LEVEL2_DIRECTORY_TYPE: u32 = 0x40;
pub const BIOS_LEVEL2_DIRECTORY_TYPE: u32 = 0x70;

pub const ENTRY_HEADER_SIZE: usize = 0x100;
pub const ENTRY_SIGNATURE_SIZE: usize = 256 / 8;

/// Entry size meaning "not a payload" (the location is then a value).
pub const ENTRY_SIZE_UNBOUNDED: u32 = 0xffff_ffff;

/// Destination of a BIOS directory entry that is not copied anywhere.
pub const BIOS_ENTRY_NO_DESTINATION: u64 = 0xffff_ffff_ffff_ffff;

#[repr(u32)]
#[derive(Debug, PartialEq, Eq, FromPrimitive, ToPrimitive, Clone, Copy)]
pub enum DirectoryCookie {
    Psp = 0x5053_5024,       // "$PSP"
    DualPsp = 0x5053_5032,   // "2PSP"
    PspLevel2 = 0x324c_5024, // "$PL2"
    Bhd = 0x4448_4224,       // "$BHD"
    BhdLevel2 = 0x324c_4224, // "$BL2"
}

impl DirectoryCookie {
    pub fn from_bytes(cookie: [u8; 4]) -> Option<Self> {
        Self::from_u32(u32::from_le_bytes(cookie))
    }

    pub fn to_bytes(self) -> [u8; 4] {
        (self as u32).to_le_bytes()
    }

    pub fn is_psp(self) -> bool {
        matches!(self, Self::Psp | Self::DualPsp | Self::PspLevel2)
    }

    pub fn is_dual_psp(self) -> bool {
        self == Self::DualPsp
    }

    /// BIOS directory entries carry an extra 64-bit destination.
    pub fn is_bios(self) -> bool {
        matches!(self, Self::Bhd | Self::BhdLevel2)
    }
}

#[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, packed)]
pub struct Fet {
    signature: LU32, // 0x55aa_55aa
    imc_rom_base: LU32, // usually unused
    gec_rom_base: LU32, // usually unused
    xhci_rom_base: LU32, // usually unused
    psp_directory_base: LU32,
    new_psp_directory_base: LU32,
    bhd_directory_base: LU32,
    new_bhd_directory_base: LU32,
}

make_accessors! {
    Fet {
        signature: u32,
        imc_rom_base: u32,
        gec_rom_base: u32,
        xhci_rom_base: u32,
        psp_directory_base: u32,
        new_psp_directory_base: u32,
        bhd_directory_base: u32,
        new_bhd_directory_base: u32,
    }
}

#[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, packed)]
pub struct DirectoryHeader {
    cookie: [u8; 4], // fourcc "$PSP", "2PSP", "$PL2", "$BHD" or "$BL2"
    checksum: LU32, // Fletcher-32 of header below this field and including all entries
    total_entries: LU32,
    reserved: LU32, // PSP: additional info; BIOS: reserved
}

make_accessors! {
    DirectoryHeader {
        checksum: u32,
        total_entries: u32,
        reserved: u32,
    }
}

impl DirectoryHeader {
    pub fn cookie(&self) -> [u8; 4] {
        self.cookie
    }
    pub fn set_cookie(&mut self, value: [u8; 4]) {
        self.cookie = value
    }
    pub fn with_cookie(mut self, value: [u8; 4]) -> Self {
        self.cookie = value;
        self
    }
    pub fn additional_info(&self) -> DirectoryAdditionalInfo {
        DirectoryAdditionalInfo::from_bytes(self.reserved.get().to_le_bytes())
    }
}

#[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, packed)]
pub struct PspDirectoryEntry {
    type_code: LU32, // see PspEntryType
    size: LU32, // 0xffff_ffff: location is a value
    location: LU32,
    reserved: LU32,
}

make_accessors! {
    PspDirectoryEntry {
        type_code: u32,
        size: u32,
        location: u32,
        reserved: u32,
    }
}

#[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, packed)]
pub struct BiosDirectoryEntry {
    type_code: LU32, // see BiosEntryType
    size: LU32,
    location: LU32,
    reserved: LU32,
    destination_location: LU64, // 0xffff_ffff_ffff_ffff: none
}

make_accessors! {
    BiosDirectoryEntry {
        type_code: u32,
        size: u32,
        location: u32,
        reserved: u32,
        destination_location: u64,
    }
}

impl Default for BiosDirectoryEntry {
    fn default() -> Self {
        Self {
            type_code: 0.into(),
            size: 0.into(),
            location: 0.into(),
            reserved: 0.into(),
            destination_location: BIOS_ENTRY_NO_DESTINATION.into(),
        }
    }
}

/// Extended header at the start of most payloads.  Only the fields we know about have accessors; the rest is carried along as-is.
#[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, packed)]
pub struct EntryHeader {
    _unknown_00: [u8; 0x10],
    id: LU32, // 0x10
    size_signed: LU32, // 0x14
    is_encrypted: LU32, // 0x18
    _unknown_1c: LU32,
    encryption_fingerprint: [u8; 0x10], // 0x20
    is_signed: LU32, // 0x30
    _unknown_34: LU32,
    signature_fingerprint: [u8; 0x10], // 0x38
    is_compressed: LU32, // 0x48; 0 or 1
    _unknown_4c: LU32,
    full_size: LU32, // 0x50
    _unknown_54: [u8; 0xc],
    version: [u8; 4], // 0x60
    _unknown_64: [u8; 8],
    size_packed: LU32, // 0x6c
    _unknown_70: [u8; 0x90],
}

make_accessors! {
    EntryHeader {
        id: u32,
        size_signed: u32,
        is_encrypted: u32,
        is_signed: u32,
        is_compressed: u32,
        full_size: u32,
        size_packed: u32,
    }
}

impl EntryHeader {
    pub fn encryption_fingerprint(&self) -> [u8; 0x10] {
        self.encryption_fingerprint
    }
    pub fn with_encryption_fingerprint(mut self, value: [u8; 0x10]) -> Self {
        self.encryption_fingerprint = value;
        self
    }
    pub fn signature_fingerprint(&self) -> [u8; 0x10] {
        self.signature_fingerprint
    }
    pub fn with_signature_fingerprint(mut self, value: [u8; 0x10]) -> Self {
        self.signature_fingerprint = value;
        self
    }
    pub fn version(&self) -> [u8; 4] {
        self.version
    }
    pub fn with_version(mut self, value: [u8; 4]) -> Self {
        self.version = value;
        self
    }
}

impl Default for EntryHeader {
    fn default() -> Self {
        Self::new_zeroed()
    }
}

#[bitfield(bits = 32)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PspEntryType {
    pub type_: B8,
    pub sub_program: B8,
    pub rom_id: B2,
    #[skip]
    __: B14,
}

#[bitfield(bits = 32)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiosEntryType {
    pub type_: B8,
    pub region_type: B8,
    pub reset_image: bool,
    pub copy_image: bool,
    pub read_only: bool,
    pub compressed: bool,
    pub instance: B4,
    pub sub_program: B3,
    pub rom_id: B2,
    pub writable: bool,
    #[skip]
    __: B2,
}

/// PSP directory header's "reserved" word, on parts that use it.
#[bitfield(bits = 32)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectoryAdditionalInfo {
    pub max_size: B10, // in 4 KiB blocks
    pub spi_block_size: B4,
    pub base_address: B15, // [26:12] of the directory image base
    pub address_mode: B2,
    #[skip]
    __: B1,
}
