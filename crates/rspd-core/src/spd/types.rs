//! Typed records for the DDR4 base region
//!
//! Every field carries explicit units in its name or documentation; mixing
//! cycles and nanoseconds across the decode/encode boundary is the classic
//! failure mode of SPD tooling.

use alloc::string::String;

/// A module or DRAM-die manufacturer, resolved from its JEP106 byte pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ManufacturerId {
    /// Resolved vendor name, or `Unknown (0x....)` for codes not in the table
    pub name: String,
    /// Raw (bank, code) bytes as stored in the SPD
    pub code: [u8; 2],
}

impl ManufacturerId {
    /// Hex form of the raw byte pair, e.g. `0x029E`.
    pub fn id_hex(&self) -> String {
        alloc::format!("0x{:02X}{:02X}", self.code[0], self.code[1])
    }
}

/// Module identity block (bytes 320-351 plus the type bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct DramIdentity {
    /// Memory type label ("DDR4", or `Unknown (0x..)`)
    pub memory_type: String,
    /// Module type label ("UDIMM", "SO-DIMM", ...)
    pub module_type: String,
    /// Module manufacturer
    pub manufacturer: ManufacturerId,
    /// DRAM die manufacturer; distinct from the module vendor
    pub dram_manufacturer: ManufacturerId,
    /// Manufacturing location code (byte 322)
    pub manufacturing_location: u8,
    /// Manufacturing date, `"20YY Week WW"` or `"Unknown"`
    pub manufacturing_date: String,
    /// Serial number, 4 raw bytes rendered as hex
    pub serial_number: String,
    /// Part number, printable ASCII, trimmed
    pub part_number: String,
    /// Module revision code (byte 349)
    pub revision_code: u8,
}

/// Capacity and organization, derived from the density/addressing bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacityInfo {
    /// Density per die in Gb
    pub density_per_die_gb: f64,
    /// Number of bank groups (2 or 4)
    pub bank_groups: u8,
    /// Row address bits
    pub row_bits: u8,
    /// Column address bits
    pub col_bits: u8,
    /// SDRAM device width in bits
    pub device_width: u32,
    /// Package ranks on the module
    pub ranks: u8,
    /// Primary bus width in bits
    pub bus_width: u32,
    /// Total capacity in GB: `density * (bus_width/device_width) * ranks * die_count / 8`
    pub total_capacity_gb: f64,
    /// Human-readable capacity ("16 GB", "1.5 GB", "512 MB")
    pub capacity_str: String,
    /// Rank/width organization string, e.g. "2Rx8"
    pub organization: String,
    /// Whether the package is stacked (3DS)
    pub is_3ds: bool,
    /// Dies per package (1 for monolithic)
    pub die_count: u8,
}

/// Base-region timing parameters. All times in ns; `cl` in clock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingSet {
    /// Minimum clock period tCKAVGmin
    pub tck: f64,
    /// CAS latency time tAAmin
    pub taa: f64,
    /// RAS-to-CAS delay tRCDmin
    pub trcd: f64,
    /// Row precharge time tRPmin
    pub trp: f64,
    /// Active-to-precharge time tRASmin
    pub tras: f64,
    /// Active-to-active/refresh time tRCmin
    pub trc: f64,
    /// Refresh recovery tRFC1min
    pub trfc1: f64,
    /// Refresh recovery tRFC2min (2x mode)
    pub trfc2: f64,
    /// Refresh recovery tRFC4min (4x mode)
    pub trfc4: f64,
    /// Four-activate window tFAWmin
    pub tfaw: f64,
    /// Activate-to-activate, different bank group, tRRD_Smin
    pub trrd_s: f64,
    /// Activate-to-activate, same bank group, tRRD_Lmin
    pub trrd_l: f64,
    /// CAS-to-CAS, same bank group, tCCD_Lmin
    pub tccd_l: f64,
    /// Write recovery tWRmin
    pub twr: f64,
    /// Write-to-read, different bank group, tWTR_Smin
    pub twtr_s: f64,
    /// Write-to-read, same bank group, tWTR_Lmin
    pub twtr_l: f64,
    /// Derived CAS latency in cycles: `round(tAA / tCK)`, 0 when tCK is 0
    pub cl: u16,
}

/// Die and package detail (byte 6 plus density).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct DieInfo {
    /// Density per die in Gb
    pub density_gb: f64,
    /// Dies per package
    pub die_count: u8,
    /// "Monolithic" or "3DS (Non-Monolithic)"
    pub package_type: String,
    /// Signal loading label
    pub signal_loading: String,
    /// Organization string, e.g. "16384 Mb x8 (2048M x 8 x 8 banks)"
    pub organization: String,
}

/// Bank-group configuration (byte 4, bits 7:6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BankConfig {
    /// Number of bank groups (2 or 4)
    pub bank_groups: u8,
    /// Banks per group; always 4 for DDR4
    pub banks_per_group: u8,
    /// Total bank count
    pub total_banks: u8,
}

/// Row/column addressing detail (byte 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressingInfo {
    /// Row address bits
    pub row_bits: u8,
    /// Column address bits
    pub col_bits: u8,
    /// Page size in bytes: `2^col_bits * device_width / 8`
    pub page_size_bytes: u32,
}

/// Bus width and ECC extension (byte 13).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct EccInfo {
    /// Primary bus width in bits
    pub primary_width: u32,
    /// Extension width in bits (8 for ECC modules, else 0)
    pub extension_width: u32,
    /// Primary plus extension width
    pub total_width: u32,
    /// Whether the module carries an ECC extension
    pub has_ecc: bool,
}
