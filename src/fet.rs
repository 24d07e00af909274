use crate::ondisk::header_from_collection;
use crate::ondisk::header_from_collection_mut;
use crate::ondisk::Fet;
use crate::ondisk::FIRMWARE_ENTRY_TABLE_POINTER_ABSENT;
use crate::ondisk::FIRMWARE_ENTRY_TABLE_POSITION;
use crate::ondisk::FIRMWARE_ENTRY_TABLE_SIGNATURE;
use crate::rom::RomType;
use crate::types::Error;
use crate::types::Result;
use core::mem::size_of;

/// The table everything else hangs off.  Pointers are absolute flash addresses (or, on some images, file offsets); `None` means the slot held 0xffff_ffff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct FirmwareEntryTable {
    /// File offset the table was read from.
    pub location: u32,
    pub signature: u32,
    pub imc_rom_base: Option<u32>,
    pub gec_rom_base: Option<u32>,
    pub xhci_rom_base: Option<u32>,
    pub psp_directory_base: Option<u32>,
    pub new_psp_directory_base: Option<u32>,
    pub bhd_directory_base: Option<u32>,
    pub new_bhd_directory_base: Option<u32>,
}

fn pointer(value: u32) -> Option<u32> {
    if value == FIRMWARE_ENTRY_TABLE_POINTER_ABSENT {
        None
    } else {
        Some(value)
    }
}

fn raw_pointer(value: Option<u32>) -> u32 {
    value.unwrap_or(FIRMWARE_ENTRY_TABLE_POINTER_ABSENT)
}

fn check_signature(firmware: &[u8], address: u32) -> Result<()> {
    let offset = address as usize;
    let magic = firmware
        .get(offset..offset.saturating_add(4))
        .ok_or(Error::FetRangeCheck { offset: address })?;
    let found = u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]);
    if found == FIRMWARE_ENTRY_TABLE_SIGNATURE {
        Ok(())
    } else {
        Err(Error::FetSignatureMismatch { offset: address, found })
    }
}

/// Looks for the signature at the usual positions, in order.
pub fn find(firmware: &[u8]) -> Result<u32> {
    for position in FIRMWARE_ENTRY_TABLE_POSITION.iter() {
        log::trace!("probing for firmware entry table at 0x{:08X}", position);
        if check_signature(firmware, *position).is_ok() {
            return Ok(*position);
        }
    }
    Err(Error::FetNotFound)
}

/// Looks for the signature at every byte offset (slow).
pub fn find_by_scan(firmware: &[u8]) -> Result<u32> {
    let magic = FIRMWARE_ENTRY_TABLE_SIGNATURE.to_le_bytes();
    firmware
        .windows(magic.len())
        .position(|window| window == magic)
        .map(|position| position as u32)
        .ok_or(Error::FetNotFound)
}

impl FirmwareEntryTable {
    /// A table at LOCATION with no pointers set.
    pub fn new(location: u32) -> Self {
        Self::from_ondisk(&Fet::default().with_signature(FIRMWARE_ENTRY_TABLE_SIGNATURE), location)
    }

    pub fn from_ondisk(fet: &Fet, location: u32) -> Self {
        Self {
            location,
            signature: fet.signature(),
            imc_rom_base: pointer(fet.imc_rom_base()),
            gec_rom_base: pointer(fet.gec_rom_base()),
            xhci_rom_base: pointer(fet.xhci_rom_base()),
            psp_directory_base: pointer(fet.psp_directory_base()),
            new_psp_directory_base: pointer(fet.new_psp_directory_base()),
            bhd_directory_base: pointer(fet.bhd_directory_base()),
            new_bhd_directory_base: pointer(fet.new_bhd_directory_base()),
        }
    }

    pub fn to_ondisk(&self) -> Fet {
        Fet::default()
            .with_signature(self.signature)
            .with_imc_rom_base(raw_pointer(self.imc_rom_base))
            .with_gec_rom_base(raw_pointer(self.gec_rom_base))
            .with_xhci_rom_base(raw_pointer(self.xhci_rom_base))
            .with_psp_directory_base(raw_pointer(self.psp_directory_base))
            .with_new_psp_directory_base(raw_pointer(self.new_psp_directory_base))
            .with_bhd_directory_base(raw_pointer(self.bhd_directory_base))
            .with_new_bhd_directory_base(raw_pointer(self.new_bhd_directory_base))
    }

    /// Parses the table at ADDRESS (a file offset).
    pub fn decode(firmware: &[u8], address: u32) -> Result<Self> {
        check_signature(firmware, address)?;
        let fet: Fet = header_from_collection(&firmware[address as usize..])
            .ok_or(Error::FetRangeCheck { offset: address })?;
        let result = Self::from_ondisk(&fet, address);
        log::debug!("firmware entry table at 0x{:08X}: {:x?}", address, result);
        Ok(result)
    }

    /// Writes the table into IMAGE at ADDRESS (a file offset).
    pub fn encode(&self, image: &mut [u8], address: u32) -> Result<()> {
        let size = size_of::<Fet>();
        let start = address as usize;
        if start.saturating_add(size) > image.len() {
            return Err(Error::WriteRangeCheck { location: address, size });
        }
        let item = header_from_collection_mut::<Fet>(&mut image[start..])
            .ok_or(Error::WriteRangeCheck { location: address, size })?;
        *item = self.to_ondisk();
        Ok(())
    }

    pub fn address_of(&self, rom_type: RomType) -> Option<u32> {
        match rom_type {
            RomType::Imc => self.imc_rom_base,
            RomType::Gec => self.gec_rom_base,
            RomType::Xhci => self.xhci_rom_base,
            RomType::Psp => self.psp_directory_base,
            RomType::NewPsp => self.new_psp_directory_base,
            RomType::Bhd => self.bhd_directory_base,
            RomType::NewBhd => self.new_bhd_directory_base,
        }
    }
}
