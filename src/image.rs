use crate::fet;
use crate::fet::FirmwareEntryTable;
use crate::mapping;
use crate::registry::KnownTypes;
use crate::registry::TypeRegistry;
use crate::rom::parse_roms;
use crate::rom::Rom;
use crate::types::Error;
use crate::types::Result;
use alloc::vec::Vec;
use core::fmt;

/// How to look for the firmware entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetSearch {
    /// Only at the usual positions.
    Probe,
    /// At every byte offset.
    Scan,
    ProbeThenScan,
}

impl Default for FetSearch {
    fn default() -> Self {
        Self::Probe
    }
}

impl FetSearch {
    pub fn find(self, firmware: &[u8]) -> Result<u32> {
        match self {
            Self::Probe => fet::find(firmware),
            Self::Scan => fet::find_by_scan(firmware),
            Self::ProbeThenScan => fet::find(firmware).or_else(|_| fet::find_by_scan(firmware)),
        }
    }
}

#[derive(Clone, Copy)]
pub struct ParseOptions<'r> {
    pub registry: &'r dyn TypeRegistry,
    pub fet_search: FetSearch,
    /// How many levels of directories may hang below a ROM's root directory.
    pub max_directory_depth: usize,
    /// How many directories one ROM may list, root included.
    pub max_directories: usize,
    /// How many payload bytes one parse may copy, summed over all entries.
    pub max_payload_bytes: usize,
}

impl Default for ParseOptions<'static> {
    fn default() -> Self {
        Self {
            registry: &KnownTypes,
            fet_search: FetSearch::default(),
            max_directory_depth: 8,
            max_directories: 256,
            max_payload_bytes: 0x400_0000,
        }
    }
}

impl fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("fet_search", &self.fet_search)
            .field("max_directory_depth", &self.max_directory_depth)
            .field("max_directories", &self.max_directories)
            .field("max_payload_bytes", &self.max_payload_bytes)
            .finish_non_exhaustive()
    }
}

impl<'r> ParseOptions<'r> {
    pub fn with_registry<'s>(self, registry: &'s dyn TypeRegistry) -> ParseOptions<'s> {
        ParseOptions {
            registry,
            fet_search: self.fet_search,
            max_directory_depth: self.max_directory_depth,
            max_directories: self.max_directories,
            max_payload_bytes: self.max_payload_bytes,
        }
    }

    pub fn with_fet_search(mut self, fet_search: FetSearch) -> Self {
        self.fet_search = fet_search;
        self
    }

    pub fn with_max_directory_depth(mut self, max_directory_depth: usize) -> Self {
        self.max_directory_depth = max_directory_depth;
        self
    }

    pub fn with_max_directories(mut self, max_directories: usize) -> Self {
        self.max_directories = max_directories;
        self
    }

    pub fn with_max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }
}

/// A decoded flash image.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Image {
    pub fet: FirmwareEntryTable,
    /// Where the flash is mapped; without one, only the table can be written back.
    pub flash_mapping: Option<u32>,
    pub roms: Vec<Rom>,
}

impl Image {
    pub fn parse(firmware: &[u8]) -> Result<(Self, Vec<Error>)> {
        Self::parse_with(firmware, &ParseOptions::default())
    }

    /// Fails if there is no firmware entry table or no flash mapping.  Anything that goes wrong below that is returned
    /// alongside the (partial) image.
    pub fn parse_with(firmware: &[u8], options: &ParseOptions<'_>) -> Result<(Self, Vec<Error>)> {
        let location = options.fet_search.find(firmware)?;
        let fet = FirmwareEntryTable::decode(firmware, location)?;
        let flash_mapping = mapping::resolve(firmware, &fet)?;
        let (roms, errors) = parse_roms(firmware, &fet, flash_mapping, options);
        if !errors.is_empty() {
            log::warn!("{} problem(s) while parsing the image", errors.len());
        }
        Ok((Self { fet, flash_mapping: Some(flash_mapping), roms }, errors))
    }

    /// Writes the table and all ROMs into IMAGE.  On error, IMAGE may have been partially written.
    pub fn write(&self, image: &mut [u8]) -> Result<()> {
        self.fet.encode(image, self.fet.location)?;
        if let Some(flash_mapping) = self.flash_mapping {
            for rom in self.roms.iter() {
                rom.write(image, &self.fet, flash_mapping)?;
            }
        }
        Ok(())
    }

    /// Writes into a new buffer of LEN bytes of FILL.
    pub fn to_vec(&self, len: usize, fill: u8) -> Result<Vec<u8>> {
        let mut image = vec![fill; len];
        self.write(&mut image)?;
        Ok(image)
    }
}
