use crate::directory::DirectoryEntry;
use crate::mapping::file_offset;
use crate::ondisk::header_from_collection;
use crate::ondisk::EntryHeader;
use crate::ondisk::BIOS_LEVEL2_DIRECTORY_TYPE;
use crate::ondisk::ENTRY_HEADER_SIZE;
use crate::ondisk::ENTRY_SIGNATURE_SIZE;
use crate::ondisk::ENTRY_SIZE_UNBOUNDED;
use crate::ondisk::PSP_LEVEL2_DIRECTORY_TYPE;
use crate::registry::TypeInfo;
use crate::registry::TypeRegistry;
use crate::types::Error;
use crate::types::Result;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// One directory entry together with what it points to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Entry {
    pub directory_entry: DirectoryEntry,
    /// Extended header, if the payload has a sensible one.
    #[cfg_attr(feature = "schemars", schemars(with = "Option<crate::serializers::SerdeEntryHeader>"))]
    pub header: Option<EntryHeader>,
    /// Copy of the payload; `None` if the entry does not describe an in-bounds payload.
    pub raw: Option<Vec<u8>>,
    pub type_info: Option<TypeInfo>,
    /// Anomalies found while decoding.
    pub comments: Vec<String>,
}

/// Caps how many payload bytes one parse copies out of the input.  Entries may alias the same region of the image, so the sum of their sizes is not bounded by the image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadBudget {
    remaining: usize,
}

impl PayloadBudget {
    pub fn new(limit: usize) -> Self {
        Self { remaining: limit }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn take(&mut self, size: u32) -> Result<()> {
        self.remaining = self
            .remaining
            .checked_sub(size as usize)
            .ok_or(Error::EntryPayloadBudgetExceeded { size, remaining: self.remaining })?;
        Ok(())
    }
}

fn all_one_value(bytes: &[u8]) -> bool {
    match bytes.split_first() {
        Some((first, rest)) => rest.iter().all(|b| b == first),
        None => true,
    }
}

impl Entry {
    pub fn new(directory_entry: DirectoryEntry) -> Self {
        Self { directory_entry, ..Default::default() }
    }

    fn note(&mut self, error: Error) -> Error {
        log::warn!("entry 0x{:08X} at 0x{:08X}: {}", self.directory_entry.type_code, self.directory_entry.location, error);
        self.comments.push(error.to_string());
        error
    }

    /// Decodes the payload DIRECTORY_ENTRY describes.  This never gives up on the entry: on failure the returned error is also recorded in `comments` and the entry keeps whatever was decoded up to that point.
    /// The copied payload is charged to BUDGET; once it runs out, `raw` stays `None`.
    pub fn decode(
        firmware: &[u8],
        directory_entry: DirectoryEntry,
        flash_mapping: u32,
        registry: &dyn TypeRegistry,
        budget: &mut PayloadBudget,
    ) -> (Self, Option<Error>) {
        let mut entry = Self::new(directory_entry);
        match entry.decode_payload(firmware, flash_mapping, registry, budget) {
            Ok(()) => (entry, None),
            Err(error) => {
                let error = entry.note(error);
                (entry, Some(error))
            }
        }
    }

    fn decode_payload(
        &mut self,
        firmware: &[u8],
        flash_mapping: u32,
        registry: &dyn TypeRegistry,
        budget: &mut PayloadBudget,
    ) -> Result<()> {
        let type_code = self.directory_entry.type_code;
        self.type_info = registry.lookup(type_code);
        if self.type_info.is_none() {
            self.note(Error::EntryTypeUnknown { type_code });
        }

        let location = file_offset(self.directory_entry.location, flash_mapping);
        let size = self.directory_entry.size;
        let start = location as usize;
        if start > firmware.len() {
            return Err(Error::EntryLocationRangeCheck { location });
        }
        if size == ENTRY_SIZE_UNBOUNDED {
            return Err(Error::EntrySizeUnbounded);
        }
        if size as usize > firmware.len() - start {
            return Err(Error::EntrySizeRangeCheck { size });
        }
        budget.take(size)?;
        let payload = &firmware[start..start + size as usize];
        self.raw = Some(payload.to_vec());

        if size == 0 {
            return Err(Error::EntryEmpty);
        }
        if payload.len() < ENTRY_HEADER_SIZE {
            return Err(Error::EntryTooSmallForHeader { size });
        }
        let header_bytes = &payload[..ENTRY_HEADER_SIZE];
        if all_one_value(header_bytes) {
            return Err(Error::EntryUnpopulated { fill: header_bytes[0] });
        }
        let header: EntryHeader =
            header_from_collection(header_bytes).ok_or(Error::EntryTooSmallForHeader { size })?;
        if header.is_compressed() > 1 {
            return Err(Error::EntryHeaderCompression { value: header.is_compressed() });
        }
        if header.size_signed() == 0 && header.full_size() == 0 && header.size_packed() == 0 {
            return Err(Error::EntryHeaderSizes);
        }
        self.header = Some(header);
        Ok(())
    }

    /// Copies the payload to ADDRESS (a file offset) in IMAGE.  Entries without a payload write nothing.
    pub fn encode(&self, image: &mut [u8], address: u32) -> Result<()> {
        let raw = match &self.raw {
            Some(raw) => raw,
            None => return Ok(()),
        };
        let start = address as usize;
        let target = start
            .checked_add(raw.len())
            .and_then(|end| image.get_mut(start..end))
            .ok_or(Error::WriteRangeCheck { location: address, size: raw.len() })?;
        target.copy_from_slice(raw);
        Ok(())
    }

    /// The trailing signature of a payload that has a header.
    pub fn signature(&self) -> Option<&[u8]> {
        if self.header.is_none() {
            return None;
        }
        let raw = self.raw.as_ref()?;
        raw.get(raw.len().checked_sub(ENTRY_SIGNATURE_SIZE)?..)
    }

    /// Whether the payload is a second level directory.
    pub fn is_directory_pointer(&self) -> bool {
        let type_code = self.directory_entry.type_code;
        type_code == PSP_LEVEL2_DIRECTORY_TYPE || type_code == BIOS_LEVEL2_DIRECTORY_TYPE
    }

    pub(crate) fn set_type_info(&mut self, name: &str, comment: &str) {
        self.type_info = Some(TypeInfo { name: name.to_string(), comment: comment.to_string() });
    }
}
