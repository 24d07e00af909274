//! Figures out where the flash image is mapped in the address space the
//! firmware entry table pointers live in.

use crate::fet::FirmwareEntryTable;
use crate::ondisk::DirectoryCookie;
use crate::ondisk::DEFAULT_FLASH_MAPPING;
use crate::ondisk::FLASH_MAPPING_WINDOWS;
use crate::types::Error;
use crate::types::Result;

const PSP_COOKIES: &[DirectoryCookie] = &[DirectoryCookie::Psp, DirectoryCookie::DualPsp];
const BHD_COOKIES: &[DirectoryCookie] = &[DirectoryCookie::Bhd];

/// Converts an address from a table into a file offset.  Addresses below the mapping are taken to be file offsets already.
pub fn file_offset(address: u32, flash_mapping: u32) -> u32 {
    if address >= flash_mapping {
        address - flash_mapping
    } else {
        address
    }
}

fn probe(firmware: &[u8], address: u32, cookies: &[DirectoryCookie]) -> Option<u32> {
    for window in FLASH_MAPPING_WINDOWS.iter() {
        let mapping = DEFAULT_FLASH_MAPPING + window;
        let offset = match address.checked_sub(mapping) {
            Some(offset) => offset as usize,
            None => continue,
        };
        let candidate = match firmware.get(offset..offset + 4) {
            Some(candidate) => candidate,
            None => continue,
        };
        log::trace!("probing mapping 0x{:08X} for 0x{:08X}", mapping, address);
        if cookies.iter().any(|cookie| candidate == cookie.to_bytes()) {
            return Some(mapping);
        }
    }
    None
}

/// Finds the flash mapping by looking for a directory cookie where the table's directory pointers point, trying each of the usual windows in turn.
/// The first hit wins.
pub fn resolve(firmware: &[u8], fet: &FirmwareEntryTable) -> Result<u32> {
    let candidates = [
        (fet.psp_directory_base, PSP_COOKIES),
        (fet.new_psp_directory_base, PSP_COOKIES),
        (fet.bhd_directory_base, BHD_COOKIES),
    ];
    for (address, cookies) in candidates.iter() {
        let address = match address {
            Some(address) if *address != 0 => *address,
            _ => continue,
        };
        if let Some(mapping) = probe(firmware, address, cookies) {
            log::debug!("flash mapping is 0x{:08X}", mapping);
            return Ok(mapping);
        }
    }
    Err(Error::FlashMappingNotFound)
}
