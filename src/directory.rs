use crate::amdfletcher32::fletcher32;
use crate::entry::Entry;
use crate::entry::PayloadBudget;
use crate::mapping::file_offset;
use crate::ondisk::header_from_collection;
use crate::ondisk::header_from_collection_mut;
use crate::ondisk::BiosDirectoryEntry;
use crate::ondisk::BiosEntryType;
use crate::ondisk::DirectoryCookie;
use crate::ondisk::DirectoryHeader;
use crate::ondisk::PspDirectoryEntry;
use crate::ondisk::PspEntryType;
use crate::ondisk::BIOS_ENTRY_NO_DESTINATION;
use crate::ondisk::DIRECTORY_ENTRY_SIZE_BOUND;
use crate::ondisk::DUAL_PSP_RESERVED_SIZE;
use crate::registry::TypeRegistry;
use crate::types::Error;
use crate::types::Result;
use alloc::vec::Vec;
use core::mem::size_of;
use zerocopy::AsBytes;

const HEADER_SIZE: usize = size_of::<DirectoryHeader>();
const CHECKSUM_END: usize = 8; // cookie and checksum are not covered by the checksum

/// A directory entry as stored in the directory table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct DirectoryEntry {
    pub type_code: u32,
    pub size: u32,
    pub location: u32,
    pub reserved: u32,
    /// Only in BIOS directories; opaque to us.
    pub destination_location: Option<u64>,
}

impl From<&PspDirectoryEntry> for DirectoryEntry {
    fn from(record: &PspDirectoryEntry) -> Self {
        Self {
            type_code: record.type_code(),
            size: record.size(),
            location: record.location(),
            reserved: record.reserved(),
            destination_location: None,
        }
    }
}

impl From<&BiosDirectoryEntry> for DirectoryEntry {
    fn from(record: &BiosDirectoryEntry) -> Self {
        Self {
            type_code: record.type_code(),
            size: record.size(),
            location: record.location(),
            reserved: record.reserved(),
            destination_location: Some(record.destination_location()),
        }
    }
}

impl DirectoryEntry {
    pub fn psp_type(&self) -> PspEntryType {
        PspEntryType::from_bytes(self.type_code.to_le_bytes())
    }

    pub fn bios_type(&self) -> BiosEntryType {
        BiosEntryType::from_bytes(self.type_code.to_le_bytes())
    }

    pub fn to_psp_record(&self) -> PspDirectoryEntry {
        PspDirectoryEntry::default()
            .with_type_code(self.type_code)
            .with_size(self.size)
            .with_location(self.location)
            .with_reserved(self.reserved)
    }

    /// A missing destination is written as "none".
    pub fn to_bios_record(&self) -> BiosDirectoryEntry {
        BiosDirectoryEntry::default()
            .with_type_code(self.type_code)
            .with_size(self.size)
            .with_location(self.location)
            .with_reserved(self.reserved)
            .with_destination_location(self.destination_location.unwrap_or(BIOS_ENTRY_NO_DESTINATION))
    }

    /// Writes the record at ADDRESS (a file offset) in IMAGE, in the BIOS layout if BIOS is set.
    pub fn encode(&self, image: &mut [u8], address: u32, bios: bool) -> Result<()> {
        let size = if bios { size_of::<BiosDirectoryEntry>() } else { size_of::<PspDirectoryEntry>() };
        let start = address as usize;
        let error = Error::WriteRangeCheck { location: address, size };
        let target = start.checked_add(size).and_then(|end| image.get_mut(start..end)).ok_or(error.clone())?;
        if bios {
            *header_from_collection_mut::<BiosDirectoryEntry>(target).ok_or(error)? = self.to_bios_record();
        } else {
            *header_from_collection_mut::<PspDirectoryEntry>(target).ok_or(error)? = self.to_psp_record();
        }
        Ok(())
    }
}

/// A PSP or BIOS directory: header, entry table and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Directory {
    #[cfg_attr(feature = "schemars", schemars(with = "crate::serializers::SerdeDirectoryHeader"))]
    pub header: DirectoryHeader,
    pub entries: Vec<Entry>,
    /// File offset of the header.
    pub location: u32,
}

impl Directory {
    pub fn cookie(&self) -> Option<DirectoryCookie> {
        DirectoryCookie::from_bytes(self.header.cookie())
    }

    fn is_dual_psp(&self) -> bool {
        self.cookie().map_or(false, DirectoryCookie::is_dual_psp)
    }

    fn is_bios(&self) -> bool {
        self.cookie().map_or(false, DirectoryCookie::is_bios)
    }

    /// Size of one record in the entry table.
    pub fn entry_stride(&self) -> usize {
        if self.is_bios() {
            size_of::<BiosDirectoryEntry>()
        } else {
            size_of::<PspDirectoryEntry>()
        }
    }

    fn entry_table_offset(&self) -> usize {
        if self.is_dual_psp() {
            HEADER_SIZE + DUAL_PSP_RESERVED_SIZE
        } else {
            HEADER_SIZE
        }
    }

    /// Size of header and entry table (not including the payloads).
    pub fn encoded_size(&self) -> usize {
        self.entry_table_offset() + self.entries.len() * self.entry_stride()
    }

    /// Parses the directory at ADDRESS, which is either absolute or a file offset.
    /// Entries that cannot be decoded are kept (with comments) and do not fail the directory.
    /// Payload copies are limited to the size of FIRMWARE.
    pub fn decode(firmware: &[u8], address: u32, flash_mapping: u32, registry: &dyn TypeRegistry) -> Result<Self> {
        Self::decode_with_budget(firmware, address, flash_mapping, registry, &mut PayloadBudget::new(firmware.len()))
    }

    /// Like `decode`, but charges the copied payloads to BUDGET.
    pub fn decode_with_budget(
        firmware: &[u8],
        address: u32,
        flash_mapping: u32,
        registry: &dyn TypeRegistry,
        budget: &mut PayloadBudget,
    ) -> Result<Self> {
        let location = if address > flash_mapping { address - flash_mapping } else { address };
        let start = location as usize;
        if start > firmware.len() {
            return Err(Error::DirectoryRangeCheck { location });
        }
        let header: DirectoryHeader =
            header_from_collection(&firmware[start..]).ok_or(Error::DirectoryRangeCheck { location })?;
        let cookie = DirectoryCookie::from_bytes(header.cookie())
            .ok_or(Error::DirectoryCookieUnknown { cookie: header.cookie() })?;

        let count = header.total_entries();
        let remaining = firmware.len().saturating_sub(start + CHECKSUM_END);
        if (count as usize).saturating_mul(DIRECTORY_ENTRY_SIZE_BOUND) > remaining {
            return Err(Error::DirectoryTooManyEntries { location, count });
        }

        let mut offset = start + HEADER_SIZE;
        if cookie.is_dual_psp() {
            offset += DUAL_PSP_RESERVED_SIZE;
        }
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let records = firmware.get(offset..).ok_or(Error::DirectoryRangeCheck { location })?;
            let directory_entry = if cookie.is_bios() {
                offset += size_of::<BiosDirectoryEntry>();
                header_from_collection::<BiosDirectoryEntry>(records).map(|record| DirectoryEntry::from(&record))
            } else {
                offset += size_of::<PspDirectoryEntry>();
                header_from_collection::<PspDirectoryEntry>(records).map(|record| DirectoryEntry::from(&record))
            }
            .ok_or(Error::DirectoryRangeCheck { location })?;

            let (mut entry, _) = Entry::decode(firmware, directory_entry, flash_mapping, registry, budget);
            if cookie.is_dual_psp() {
                // Every 2PSP entry is a complete PSP directory.
                entry.set_type_info("PSP_DIRECTORY", "Full PSP Directory");
            }
            entries.push(entry);
        }
        log::debug!("{:?} directory at 0x{:08X} with {} entries", cookie, location, count);
        Ok(Self { header, entries, location })
    }

    /// Writes header, entry table and every payload back into IMAGE.  The stored checksum is written as-is.
    pub fn encode(&self, image: &mut [u8], flash_mapping: u32) -> Result<()> {
        let start = self.location as usize;
        let size = self.encoded_size();
        let error = Error::WriteRangeCheck { location: self.location, size };
        if start > image.len() {
            return Err(error);
        }
        let header = header_from_collection_mut::<DirectoryHeader>(&mut image[start..]).ok_or(error.clone())?;
        *header = self.header;

        if self.is_dual_psp() {
            let reserved = image
                .get_mut(start + HEADER_SIZE..start + HEADER_SIZE + DUAL_PSP_RESERVED_SIZE)
                .ok_or(error)?;
            reserved.iter_mut().for_each(|b| *b = 0);
        }

        let table = start + self.entry_table_offset();
        let stride = self.entry_stride();
        let bios = self.is_bios();
        for (i, entry) in self.entries.iter().enumerate() {
            let address = (table + i * stride) as u32;
            entry.directory_entry.encode(image, address, bios)?;
            entry.encode(image, file_offset(entry.directory_entry.location, flash_mapping))?;
        }
        Ok(())
    }

    fn checksummed_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_size() - CHECKSUM_END);
        buf.extend_from_slice(&self.header.total_entries().to_le_bytes());
        buf.extend_from_slice(&self.header.reserved().to_le_bytes());
        if self.is_dual_psp() {
            buf.extend_from_slice(&[0u8; DUAL_PSP_RESERVED_SIZE]);
        }
        let bios = self.is_bios();
        for entry in self.entries.iter() {
            if bios {
                buf.extend_from_slice(entry.directory_entry.to_bios_record().as_bytes());
            } else {
                buf.extend_from_slice(entry.directory_entry.to_psp_record().as_bytes());
            }
        }
        buf
    }

    pub fn compute_checksum(&self) -> u32 {
        fletcher32(&self.checksummed_bytes())
    }

    /// Returns whether the stored checksum matches, and the checksum the directory should have.
    pub fn validate_checksum(&self) -> (bool, u32) {
        let actual = self.compute_checksum();
        (actual == self.header.checksum(), actual)
    }

    /// Stores the computed checksum in the header.
    pub fn update_checksum(&mut self) {
        let checksum = self.compute_checksum();
        self.header.set_checksum(checksum);
    }
}
