use crate::rom::RomType;
use alloc::boxed::Box;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	#[error("no firmware entry table found")]
	FetNotFound,
	#[error("firmware entry table at 0x{offset:08X} is out of bounds")]
	FetRangeCheck { offset: u32 },
	#[error("no firmware entry table signature at 0x{offset:08X} (found 0x{found:08X})")]
	FetSignatureMismatch { offset: u32, found: u32 },
	#[error("no valid flash mapping found")]
	FlashMappingNotFound,
	#[error("directory at 0x{location:08X} is out of bounds")]
	DirectoryRangeCheck { location: u32 },
	#[error("no valid cookie at start of directory: {cookie:02X?}")]
	DirectoryCookieUnknown { cookie: [u8; 4] },
	#[error("directory at 0x{location:08X} declares too many entries ({count})")]
	DirectoryTooManyEntries { location: u32, count: u32 },
	#[error("directory at 0x{location:08X} nests deeper than {max_depth} levels")]
	DirectoryDepthExceeded { location: u32, max_depth: usize },
	#[error("stopped after {max_directories} directories")]
	DirectoryBudgetExceeded { max_directories: usize },
	#[error("directory at 0x{location:08X} refers back to itself")]
	DirectoryCycle { location: u32 },
	#[error("could not read nested directory at 0x{location:08X}: {source}")]
	NestedDirectory { location: u32, source: Box<Error> },
	#[error("Unknown Type: 0x{type_code:08X}")]
	EntryTypeUnknown { type_code: u32 },
	#[error("not a parsable entry: location out of bounds (0x{location:08X})")]
	EntryLocationRangeCheck { location: u32 },
	#[error("not a parsable entry: size too big (0x{size:08X})")]
	EntrySizeRangeCheck { size: u32 },
	#[error("not a parsable entry: payload of 0x{size:X} bytes exceeds what is left to copy (0x{remaining:X} bytes)")]
	EntryPayloadBudgetExceeded { size: u32, remaining: usize },
	#[error("not a parsable entry: size is unbounded")]
	EntrySizeUnbounded,
	#[error("not a parsable entry: empty payload")]
	EntryEmpty,
	#[error("not a parsable entry: too small for header parsing (0x{size:X} bytes)")]
	EntryTooSmallForHeader { size: u32 },
	#[error("not a parsable entry: all fields are 0x{fill:02X}")]
	EntryUnpopulated { fill: u8 },
	#[error("not a parsable entry: compressed field is 0x{value:02X}")]
	EntryHeaderCompression { value: u32 },
	#[error("not a parsable entry: size values not reasonable")]
	EntryHeaderSizes,
	#[error("could not write 0x{size:X} bytes at 0x{location:08X}: target too small")]
	WriteRangeCheck { location: u32, size: usize },
	#[error("no {rom} address in the firmware entry table")]
	RomAddressUnavailable { rom: RomType },
	#[error("could not parse {rom} rom: {source}")]
	Rom { rom: RomType, source: Box<Error> },
}

pub type Result<Q> = core::result::Result<Q, Error>;
