// This file contains the serializers for the ondisk headers.  These serialize into a nice simple user-visible type and deserialize from it (can be lossy: bytes of the headers we have no name for are not carried along).

use crate::ondisk::*;

#[derive(serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename = "DirectoryHeader")]
pub struct SerdeDirectoryHeader {
	pub cookie: [u8; 4],
	pub checksum: u32,
	pub total_entries: u32,
	pub reserved: u32,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename = "EntryHeader")]
pub struct SerdeEntryHeader {
	pub id: u32,
	pub size_signed: u32,
	pub is_encrypted: u32,
	pub encryption_fingerprint: [u8; 0x10],
	pub is_signed: u32,
	pub signature_fingerprint: [u8; 0x10],
	pub is_compressed: u32,
	pub full_size: u32,
	pub version: [u8; 4],
	pub size_packed: u32,
}

// Note: This is written such that it will fail if the mirror struct has fields added/removed/renamed that have no accessor.
macro_rules! make_serde{($StructName:ident, [$($field_name:ident),* $(,)?]
) => (
	paste::paste!{
		impl<'de> serde::de::Deserialize<'de> for $StructName {
			fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
			where D: serde::de::Deserializer<'de>, {
				let config = [<Serde $StructName>]::deserialize(deserializer)?;
				Ok($StructName::default()
				$(
				.[<with_ $field_name>](config.$field_name)
				)*)
			}
		}
		impl serde::Serialize for $StructName {
			fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
			where S: serde::Serializer, {
				[<Serde $StructName>] {
					$(
						$field_name: self.$field_name(),
					)*
				}.serialize(serializer)
			}
		}
	}
)}

make_serde!(DirectoryHeader, [cookie, checksum, total_entries, reserved]);
make_serde!(
	EntryHeader,
	[
		id,
		size_signed,
		is_encrypted,
		encryption_fingerprint,
		is_signed,
		signature_fingerprint,
		is_compressed,
		full_size,
		version,
		size_packed
	]
);
