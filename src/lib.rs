#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
extern crate alloc;

mod amdfletcher32;
mod directory;
mod entry;
mod fet;
mod image;
mod mapping;
mod ondisk;
mod registry;
mod rom;
#[cfg(feature = "serde")]
mod serializers;
mod types;
#[cfg(test)]
mod fixtures;

pub use types::Result;
pub use types::Error;
pub use crate::amdfletcher32::fletcher32;
pub use crate::directory::Directory;
pub use crate::directory::DirectoryEntry;
pub use crate::entry::Entry;
pub use crate::entry::PayloadBudget;
pub use crate::fet::find as find_fet;
pub use crate::fet::find_by_scan as find_fet_by_scan;
pub use crate::fet::FirmwareEntryTable;
pub use crate::image::FetSearch;
pub use crate::image::Image;
pub use crate::image::ParseOptions;
pub use crate::mapping::file_offset;
pub use crate::mapping::resolve as resolve_flash_mapping;
pub use crate::registry::KnownType;
pub use crate::registry::KnownTypes;
pub use crate::registry::TypeInfo;
pub use crate::registry::TypeRegistry;
pub use crate::registry::KNOWN_TYPES;
pub use crate::rom::parse_roms;
pub use crate::rom::Rom;
pub use crate::rom::RomContents;
pub use crate::rom::RomType;
#[cfg(feature = "serde")]
pub use crate::serializers::{SerdeDirectoryHeader, SerdeEntryHeader};
pub use ondisk::*;
