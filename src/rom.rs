use crate::directory::Directory;
use crate::entry::PayloadBudget;
use crate::fet::FirmwareEntryTable;
use crate::image::ParseOptions;
use crate::mapping::file_offset;
use crate::types::Error;
use crate::types::Result;
use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The slots of the firmware entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum RomType {
    #[strum(serialize = "IMC")]
    Imc,
    #[strum(serialize = "GEC")]
    Gec,
    #[strum(serialize = "XHCI")]
    Xhci,
    #[strum(serialize = "PSP")]
    Psp,
    #[strum(serialize = "NEWPSP")]
    NewPsp,
    #[strum(serialize = "BHD")]
    Bhd,
    #[strum(serialize = "NEWBHD")]
    NewBhd,
}

impl RomType {
    /// Whether the slot points to a directory (rather than to a blob of unknown size).
    pub fn has_directories(self) -> bool {
        matches!(self, Self::Psp | Self::NewPsp | Self::Bhd | Self::NewBhd)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum RomContents {
    /// Root directory first, then every nested directory in depth-first order.
    Directories(Vec<Directory>),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Rom {
    pub rom_type: RomType,
    pub contents: RomContents,
}

/// Identifies a directory on the current nesting chain.
type ChainLink = ([u8; 4], u32);

struct Expander<'a, 'r> {
    firmware: &'a [u8],
    flash_mapping: u32,
    options: &'a ParseOptions<'r>,
    budget: PayloadBudget,
    /// Directories whose children were already listed.
    expanded: BTreeSet<ChainLink>,
    /// Directories decoded so far, root included.
    decoded: usize,
    stopped: bool,
}

impl Expander<'_, '_> {
    /// Decodes every directory PARENT refers to, recursively.  DIRECTORIES receives them in depth-first order.
    /// A directory reached more than once is listed every time but expanded only the first time.
    fn expand(&mut self, parent: &Directory, chain: &mut Vec<ChainLink>, directories: &mut Vec<Directory>, errors: &mut Vec<Error>) {
        let dual_psp = parent.cookie().map_or(false, |cookie| cookie.is_dual_psp());
        let addresses: Vec<u32> = parent
            .entries
            .iter()
            .filter(|entry| dual_psp || entry.is_directory_pointer())
            .map(|entry| entry.directory_entry.location)
            .collect();

        for address in addresses {
            if self.decoded >= self.options.max_directories {
                if !self.stopped {
                    log::warn!("not expanding any more directories: {} decoded", self.decoded);
                    errors.push(Error::DirectoryBudgetExceeded { max_directories: self.options.max_directories });
                    self.stopped = true;
                }
                return;
            }
            if chain.len() > self.options.max_directory_depth {
                let location = file_offset(address, self.flash_mapping);
                log::warn!("not expanding directory at 0x{:08X}: nested too deep", location);
                errors.push(Error::DirectoryDepthExceeded { location, max_depth: self.options.max_directory_depth });
                continue;
            }
            self.decoded += 1;
            let child = match Directory::decode_with_budget(
                self.firmware,
                address,
                self.flash_mapping,
                self.options.registry,
                &mut self.budget,
            ) {
                Ok(child) => child,
                Err(error) => {
                    log::warn!("could not read nested directory at 0x{:08X}: {}", address, error);
                    errors.push(Error::NestedDirectory { location: address, source: Box::new(error) });
                    continue;
                }
            };
            let link = (child.header.cookie(), child.location);
            if chain.contains(&link) {
                log::warn!("directory at 0x{:08X} is already being expanded", child.location);
                errors.push(Error::DirectoryCycle { location: child.location });
                continue;
            }
            if !self.expanded.insert(link) {
                log::debug!("nested directory at 0x{:08X} again", child.location);
                directories.push(child);
                continue;
            }
            log::debug!("nested directory at 0x{:08X} (depth {})", child.location, chain.len());

            let mut descendants = Vec::new();
            chain.push(link);
            self.expand(&child, chain, &mut descendants, errors);
            chain.pop();
            directories.push(child);
            directories.append(&mut descendants);
        }
    }
}

impl Rom {
    pub fn directories(&self) -> &[Directory] {
        match &self.contents {
            RomContents::Directories(directories) => directories,
            RomContents::Raw(_) => &[],
        }
    }

    pub fn raw(&self) -> Option<&[u8]> {
        match &self.contents {
            RomContents::Directories(_) => None,
            RomContents::Raw(raw) => Some(raw.as_slice()),
        }
    }

    /// Decodes the root directory of ROM_TYPE and everything nested in it.
    /// Only a failure to read the root directory is an error; nested failures are returned alongside the ROM.
    pub fn decode(
        firmware: &[u8],
        fet: &FirmwareEntryTable,
        flash_mapping: u32,
        rom_type: RomType,
        options: &ParseOptions<'_>,
    ) -> Result<(Self, Vec<Error>)> {
        let mut budget = PayloadBudget::new(options.max_payload_bytes);
        Self::decode_with_budget(firmware, fet, flash_mapping, rom_type, options, &mut budget)
    }

    /// Like `decode`, but charges the copied payloads to BUDGET.
    pub fn decode_with_budget(
        firmware: &[u8],
        fet: &FirmwareEntryTable,
        flash_mapping: u32,
        rom_type: RomType,
        options: &ParseOptions<'_>,
        budget: &mut PayloadBudget,
    ) -> Result<(Self, Vec<Error>)> {
        let address = fet.address_of(rom_type).ok_or(Error::RomAddressUnavailable { rom: rom_type })?;
        let root = Directory::decode_with_budget(firmware, address, flash_mapping, options.registry, budget)?;

        let mut expander = Expander {
            firmware,
            flash_mapping,
            options,
            budget: *budget,
            expanded: BTreeSet::new(),
            decoded: 1,
            stopped: false,
        };
        let mut chain = vec![(root.header.cookie(), root.location)];
        let mut descendants = Vec::new();
        let mut errors = Vec::new();
        expander.expand(&root, &mut chain, &mut descendants, &mut errors);
        *budget = expander.budget;

        let mut directories = Vec::with_capacity(descendants.len() + 1);
        directories.push(root);
        directories.append(&mut descendants);
        Ok((Self { rom_type, contents: RomContents::Directories(directories) }, errors))
    }

    /// Writes the ROM back to where it came from.  Stops at the first directory that does not fit.
    pub fn write(&self, image: &mut [u8], fet: &FirmwareEntryTable, flash_mapping: u32) -> Result<()> {
        match &self.contents {
            RomContents::Raw(raw) => {
                let address = fet.address_of(self.rom_type).ok_or(Error::RomAddressUnavailable { rom: self.rom_type })?;
                let location = file_offset(address, flash_mapping);
                let start = location as usize;
                let target = start
                    .checked_add(raw.len())
                    .and_then(|end| image.get_mut(start..end))
                    .ok_or(Error::WriteRangeCheck { location, size: raw.len() })?;
                target.copy_from_slice(raw);
            }
            RomContents::Directories(directories) => {
                for directory in directories.iter() {
                    directory.encode(image, flash_mapping)?;
                }
            }
        }
        Ok(())
    }
}

/// Decodes every directory ROM the table points to.  Slots without a pointer are skipped.
pub fn parse_roms(
    firmware: &[u8],
    fet: &FirmwareEntryTable,
    flash_mapping: u32,
    options: &ParseOptions<'_>,
) -> (Vec<Rom>, Vec<Error>) {
    let mut roms = Vec::new();
    let mut errors = Vec::new();
    let mut budget = PayloadBudget::new(options.max_payload_bytes);
    for rom_type in RomType::iter().filter(|rom_type| rom_type.has_directories()) {
        if fet.address_of(rom_type).is_none() {
            log::debug!("no {} rom", rom_type);
            continue;
        }
        match Rom::decode_with_budget(firmware, fet, flash_mapping, rom_type, options, &mut budget) {
            Ok((rom, rom_errors)) => {
                roms.push(rom);
                errors.extend(rom_errors.into_iter().map(|error| Error::Rom { rom: rom_type, source: Box::new(error) }));
            }
            Err(error) => {
                log::warn!("could not parse {} rom: {}", rom_type, error);
                errors.push(Error::Rom { rom: rom_type, source: Box::new(error) });
            }
        }
    }
    (roms, errors)
}
