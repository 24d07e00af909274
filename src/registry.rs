//! Lookup from directory entry type codes to human names.
//!
//! Decoding only needs [`TypeRegistry::lookup`]; the registry is passed in
//! explicitly so callers (and tests) can use their own table.

use alloc::string::{String, ToString};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct TypeInfo {
    pub name: String,
    pub comment: String,
}

pub trait TypeRegistry {
    fn lookup(&self, type_code: u32) -> Option<TypeInfo>;
}

impl<F: Fn(u32) -> Option<TypeInfo>> TypeRegistry for F {
    fn lookup(&self, type_code: u32) -> Option<TypeInfo> {
        self(type_code)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KnownType {
    pub type_code: u32,
    pub name: &'static str,
    /// Used when `name` is empty.
    pub proposed_name: &'static str,
    pub comment: &'static str,
}

impl TypeRegistry for [KnownType] {
    fn lookup(&self, type_code: u32) -> Option<TypeInfo> {
        let known = self.iter().find(|known| known.type_code == type_code)?;
        let name = if known.name.is_empty() { known.proposed_name } else { known.name };
        Some(TypeInfo { name: name.to_string(), comment: known.comment.to_string() })
    }
}

/// The built-in [`KNOWN_TYPES`] table.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownTypes;

impl TypeRegistry for KnownTypes {
    fn lookup(&self, type_code: u32) -> Option<TypeInfo> {
        KNOWN_TYPES.lookup(type_code)
    }
}

macro_rules! known_types {(
    $($type_code:literal => $name:literal, $proposed_name:literal, $comment:literal;)*
) => (
    pub static KNOWN_TYPES: &[KnownType] = &[
        $(
            KnownType { type_code: $type_code, name: $name, proposed_name: $proposed_name, comment: $comment },
        )*
    ];
)}

known_types! {
    0x00 => "AMD_PUBLIC_KEY", "", "AMD public key used to verify PSP firmware";
    0x01 => "PSP_FW_BOOT_LOADER", "", "PSP boot loader in SPI space";
    0x02 => "PSP_FW_TRUSTED_OS", "", "PSP secure OS";
    0x03 => "PSP_FW_RECOVERY_BOOT_LOADER", "", "Recovery PSP boot loader";
    0x04 => "PSP_NV_DATA", "", "PSP non-volatile data";
    0x05 => "BIOS_PUBLIC_KEY", "", "OEM key used to verify the BIOS";
    0x06 => "BIOS_RTM_FIRMWARE", "", "BIOS root of trust volume";
    0x07 => "BIOS_RTM_SIGNATURE", "", "Signature over the BIOS root of trust volume";
    0x08 => "SMU_OFFCHIP_FW", "", "SMU firmware";
    0x09 => "SEC_DBG_PUBLIC_KEY", "", "Secure unlock debug key";
    0x0A => "OEM_PSP_FW_PUBLIC_KEY", "", "OEM key for PSP trustlets";
    0x0B => "AMD_SOFT_FUSE_CHAIN_01", "", "Soft fuse chain; location holds the value";
    0x0C => "PSP_BOOT_TIME_TRUSTLETS", "", "Trustlets loaded at boot";
    0x0D => "PSP_BOOT_TIME_TRUSTLETS_KEY", "", "Key for boot time trustlets";
    0x10 => "PSP_AGESA_RESUME_FW", "", "S3 resume firmware";
    0x12 => "SMU_OFF_CHIP_FW_2", "", "Second SMU firmware";
    0x13 => "PSP_EARLY_UNLOCK_DEBUG_IMAGE", "", "";
    0x1A => "PSP_S3_NV_DATA", "", "S3 image data";
    0x20 => "", "IP_DISCOVERY", "Hardware IP configuration";
    0x21 => "WRAPPED_IKEK", "", "Wrapped intermediate key encryption key";
    0x22 => "TOKEN_UNLOCK", "", "Token unlock data";
    0x24 => "SEC_GASKET", "", "Security policy gasket binary";
    0x25 => "MP2_FW", "", "MP2 firmware";
    0x28 => "DRIVER_ENTRIES", "", "PSP drivers";
    0x2D => "S0I3_DRIVER", "", "S0i3 driver";
    0x30 => "ABL0", "", "AGESA boot loader 0";
    0x31 => "ABL1", "", "AGESA boot loader 1";
    0x32 => "ABL2", "", "AGESA boot loader 2";
    0x33 => "ABL3", "", "AGESA boot loader 3";
    0x34 => "ABL4", "", "AGESA boot loader 4";
    0x35 => "ABL5", "", "AGESA boot loader 5";
    0x36 => "ABL6", "", "AGESA boot loader 6";
    0x37 => "ABL7", "", "AGESA boot loader 7";
    0x38 => "SEV_DATA", "", "SEV data";
    0x39 => "SEV_CODE", "", "SEV code";
    0x3A => "FW_PSP_WHITELIST", "", "Serial number whitelist";
    0x40 => "PSP_L2_DIRECTORY", "", "Second level PSP directory";
    0x45 => "TOS_SECURITY_POLICY", "", "Security policy for the secure OS";
    0x50 => "KEY_DATABASE", "", "PSP key database";
    0x5F => "FW_PSP_SMUSCS", "", "SMU scan settings";
    0x60 => "BIOS_APCB", "", "AGESA PSP customization block";
    0x61 => "BIOS_APOB", "", "AGESA PSP output block";
    0x62 => "BIOS_BINARY", "", "BIOS image";
    0x63 => "BIOS_APOB_NV_COPY", "", "Non-volatile copy of the APOB";
    0x64 => "PMU_FIRMWARE_INSTRUCTIONS", "", "DRAM training firmware code";
    0x65 => "PMU_FIRMWARE_DATA", "", "DRAM training firmware data";
    0x66 => "MICROCODE_PATCH", "", "CPU microcode";
    0x67 => "CORE_MCE_DATA", "", "Machine check exception data";
    0x68 => "BIOS_APCB_BACKUP", "", "Backup of the APCB";
    0x6A => "", "MP2_FW_CONFIG", "MP2 firmware configuration";
    0x70 => "BIOS_L2_DIRECTORY", "", "Second level BIOS directory";
}
