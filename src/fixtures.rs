//! Real directory dumps and helpers shared by the unit tests.

use crate::fet::FirmwareEntryTable;
use crate::ondisk::DEFAULT_FLASH_MAPPING;
use alloc::vec::Vec;

pub const IMAGE_SIZE: usize = 16 * 1024 * 1024;

pub const FET_LOCATION: u32 = 0x2_0000;
pub const XHCI_ROM_BASE: u32 = 0xff02_1000;
pub const PSP_DIRECTORY_BASE: u32 = 0xff10_1000;
pub const NEW_PSP_DIRECTORY_BASE: u32 = 0x10_0000;
pub const BHD_DIRECTORY_BASE: u32 = 0xff1c_1000;
pub const NEW_BHD_DIRECTORY_BASE: u32 = 0xff2b_d000;

pub const FET: &[u8] = &[
    0xaa, 0x55, 0xaa, 0x55, 0x00, 0x00, 0x00, 0x00, 0x67, 0x45, 0x23, 0x01, 0x00, 0x10, 0x02, 0xff,
    0x00, 0x10, 0x10, 0xff, 0x00, 0x00, 0x10, 0x00, 0x00, 0x10, 0x1c, 0xff, 0x00, 0xd0, 0x2b, 0xff,
];

/// "$PSP" with 0x14 entries; checksum 0xea88_2e70.
pub const PSP_DIRECTORY: &[u8] = &[
    0x24, 0x50, 0x53, 0x50, 0x70, 0x2e, 0x88, 0xea, 0x14, 0x00, 0x00, 0x00, 0x01, 0x0e, 0x18, 0x80,
    0x00, 0x00, 0x00, 0x00, 0x40, 0x02, 0x00, 0x00, 0x00, 0x10, 0x0c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x10, 0x18, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x08, 0x00, 0x00, 0x00, 0x00, 0x40, 0x01, 0x00, 0x00, 0x90, 0x18, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x03, 0x00, 0x00, 0x00, 0x00, 0x60, 0x00, 0x00, 0x00, 0x20, 0x0c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x05, 0x00, 0x00, 0x00, 0x40, 0x03, 0x00, 0x00, 0x00, 0x80, 0x0c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x06, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0xf0, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00, 0x00, 0xe0, 0x01, 0x00, 0x00, 0xd0, 0x19, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x09, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x08, 0x01, 0x00, 0x00, 0x00, 0x40, 0x01, 0x00, 0x00, 0xb0, 0x1b, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x09, 0x00, 0x00, 0x00, 0x40, 0x03, 0x00, 0x00, 0x00, 0x90, 0x0c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x0b, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x0c, 0x00, 0x00, 0x00, 0x00, 0xa0, 0x01, 0x00, 0x00, 0xf0, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x0d, 0x00, 0x00, 0x00, 0x40, 0x03, 0x00, 0x00, 0x00, 0xa0, 0x0c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x10, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x90, 0x1e, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x12, 0x00, 0x00, 0x00, 0x00, 0xb0, 0x00, 0x00, 0x00, 0x10, 0x1f, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0xc0, 0x1f, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x12, 0x01, 0x00, 0x00, 0x00, 0xb0, 0x00, 0x00, 0x00, 0xc0, 0x21, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x5f, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x70, 0x22, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x5f, 0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x80, 0x22, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x1a, 0x00, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0x00, 0x90, 0x22, 0xff, 0x00, 0x00, 0x00, 0x00,
];

/// "2PSP" with 4 entries; checksum 0x7f60_33ad.
pub const DUAL_PSP_DIRECTORY: &[u8] = &[
    0x32, 0x50, 0x53, 0x50, 0xad, 0x33, 0x60, 0x7f, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x0b, 0xbc, 0x00, 0x90, 0x2e, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0a, 0xbc, 0x00, 0xd0, 0x1d, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x0a, 0xbc, 0x00, 0xd0, 0x1d, 0xff, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09, 0xbc, 0x00, 0x10, 0x11, 0xff, 0x00, 0x00, 0x00, 0x00,
];

/// "$BHD" with 0xb entries; checksum 0x9e63_f852.
pub const BHD_DIRECTORY: &[u8] = &[
    0x24, 0x42, 0x48, 0x44, 0x52, 0xf8, 0x63, 0x9e, 0x0b, 0x00, 0x00, 0x00, 0x1c, 0x04, 0x00, 0x00,
    0x60, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0x20, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x60, 0x00, 0x20, 0x00, 0x00, 0x20, 0x00, 0x00,
    0x00, 0x40, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x68, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0x60, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x68, 0x00, 0x20, 0x00, 0x00, 0x20, 0x00, 0x00,
    0x00, 0x80, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x61, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x20, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x62, 0x00, 0x03, 0x00, 0x00, 0x00, 0x20, 0x00,
    0x00, 0x00, 0xe0, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xe0, 0x09, 0x00, 0x00, 0x00, 0x00,
    0x64, 0x00, 0x10, 0x00, 0x40, 0x3c, 0x00, 0x00, 0x00, 0xa0, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x65, 0x00, 0x10, 0x00, 0x30, 0x03, 0x00, 0x00,
    0x00, 0xdd, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x64, 0x00, 0x40, 0x00, 0x10, 0x46, 0x00, 0x00, 0x00, 0xe1, 0x1c, 0xff, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x65, 0x00, 0x40, 0x00, 0x20, 0x03, 0x00, 0x00,
    0x00, 0x28, 0x1d, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x70, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x10, 0x64, 0xff, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// "$PSP" with a single entry.  The checksum is the one of PSP_DIRECTORY and hence wrong.
pub const PSP_MINI_DIRECTORY: &[u8] = &[
    0x24, 0x50, 0x53, 0x50, 0x70, 0x2e, 0x88, 0xea, 0x01, 0x00, 0x00, 0x00, 0x01, 0x0e, 0x18, 0x80,
    0x00, 0x00, 0x00, 0x00, 0x40, 0x02, 0x00, 0x00, 0x00, 0x10, 0x0c, 0xff, 0x00, 0x00, 0x00, 0x00,
];

pub fn file_offset(address: u32) -> u32 {
    address - DEFAULT_FLASH_MAPPING
}

/// A zeroed flash image with each (file offset, bytes) pair copied in.
pub fn image_with(parts: &[(u32, &[u8])]) -> Vec<u8> {
    let mut image = vec![0u8; IMAGE_SIZE];
    for (offset, bytes) in parts {
        let offset = *offset as usize;
        image[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
    image
}

/// The table in FET, decoded at FET_LOCATION.
pub fn fet() -> FirmwareEntryTable {
    FirmwareEntryTable {
        location: FET_LOCATION,
        signature: 0x55aa_55aa,
        imc_rom_base: Some(0),
        gec_rom_base: Some(0x0123_4567),
        xhci_rom_base: Some(XHCI_ROM_BASE),
        psp_directory_base: Some(PSP_DIRECTORY_BASE),
        new_psp_directory_base: Some(NEW_PSP_DIRECTORY_BASE),
        bhd_directory_base: Some(BHD_DIRECTORY_BASE),
        new_bhd_directory_base: Some(NEW_BHD_DIRECTORY_BASE),
    }
}

/// FET at its default location and a bare "$PSP" cookie where it points.
pub fn fet_image() -> Vec<u8> {
    image_with(&[(FET_LOCATION, FET), (PSP_DIRECTORY_BASE - DEFAULT_FLASH_MAPPING, &b"$PSP"[..])])
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
