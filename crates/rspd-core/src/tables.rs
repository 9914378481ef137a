//! Static lookup tables for DDR4 SPD field codes
//!
//! Immutable code-to-quantity maps per JEDEC DDR4 SPD. Every table has a
//! single documented fallback for unknown codes; lookups never fail.

/// Per-die density in Gb for the density code (byte 4, bits 3:0).
///
/// Unknown codes map to 0.
pub fn density_gb(code: u8) -> f64 {
    match code {
        0b0000 => 0.256,
        0b0001 => 0.512,
        0b0010 => 1.0,
        0b0011 => 2.0,
        0b0100 => 4.0,
        0b0101 => 8.0,
        0b0110 => 16.0,
        0b0111 => 32.0,
        0b1000 => 12.0,
        0b1001 => 24.0,
        _ => 0.0,
    }
}

/// SDRAM device width in bits for the width code (byte 12, bits 2:0).
///
/// Unknown codes fall back to x8, the most common organization.
pub fn device_width(code: u8) -> u32 {
    match code {
        0b000 => 4,
        0b001 => 8,
        0b010 => 16,
        0b011 => 32,
        _ => 8,
    }
}

/// Row address bits for the row code (byte 5, bits 5:3). Unknown codes map to 0.
pub fn row_bits(code: u8) -> u8 {
    match code {
        0b000 => 12,
        0b001 => 13,
        0b010 => 14,
        0b011 => 15,
        0b100 => 16,
        0b101 => 17,
        0b110 => 18,
        _ => 0,
    }
}

/// Column address bits for the column code (byte 5, bits 2:0). Unknown codes map to 0.
pub fn col_bits(code: u8) -> u8 {
    match code {
        0b000 => 9,
        0b001 => 10,
        0b010 => 11,
        0b011 => 12,
        _ => 0,
    }
}

/// Module type name for the low nibble of byte 3.
///
/// `None` for codes the standard leaves reserved; callers degrade to an
/// `Unknown (0x..)` label.
pub fn module_type(code: u8) -> Option<&'static str> {
    Some(match code {
        0x01 => "RDIMM",
        0x02 => "UDIMM",
        0x03 => "SO-DIMM",
        0x04 => "LRDIMM",
        0x05 => "Mini-RDIMM",
        0x06 => "Mini-UDIMM",
        0x08 => "72b-SO-RDIMM",
        0x09 => "72b-SO-UDIMM",
        0x0C => "16b-SO-DIMM",
        0x0D => "32b-SO-DIMM",
        _ => return None,
    })
}

/// Die count for the 3DS die-count code (byte 6, bits 6:4).
pub fn die_count(code: u8) -> u8 {
    (code & 0x07) + 1
}

/// Signal loading label for byte 6, bits 1:0.
pub fn signal_loading(code: u8) -> &'static str {
    match code & 0x03 {
        0 => "Not specified",
        1 => "Multi-load stack",
        2 => "Single-load stack (3DS)",
        _ => "Reserved",
    }
}

/// Banks per bank group; DDR4 always has 4.
pub const BANKS_PER_GROUP: u8 = 4;

/// Canonical JEDEC speed bins as half-open tCK ranges in ps.
///
/// Order matters: lookup is a linear first-match scan. The ranges are
/// disjoint, so in practice at most one entry matches.
pub const JEDEC_SPEED_BINS: &[(i64, i64, u32)] = &[
    (625, 682, 3200),
    (682, 750, 2933),
    (750, 833, 2666),
    (833, 938, 2400),
    (938, 1071, 2133),
    (1071, 1250, 1866),
    (1250, 1500, 1600),
];

/// Canonical XMP frequency bins in MT/s, used only for snapping decoded
/// frequencies to the values reference tools report.
pub const XMP_FREQUENCY_BINS: &[u32] = &[
    1600, 1866, 2133, 2400, 2666, 2800, 2933, 3000, 3200, 3333, 3400, 3466, 3600, 3733, 3800,
    3866, 4000, 4133, 4266, 4400, 4500, 4600, 4800, 5000, 5200, 5400, 5600, 5800, 6000,
];

/// Module/DRAM manufacturer names keyed by the raw JEP106 (bank, code) byte
/// pair as stored in the SPD. Unknown pairs degrade to `Unknown (0x....)`.
pub const MANUFACTURERS: &[(u8, u8, &str)] = &[
    (0x80, 0xCE, "Samsung"),
    (0x80, 0xAD, "SK Hynix"),
    (0x80, 0x2C, "Micron Technology"),
    (0x01, 0x98, "Kingston"),
    (0x02, 0x9E, "Corsair"),
    (0x04, 0xCD, "G.Skill"),
    (0x04, 0xCB, "ADATA"),
    (0x04, 0xEF, "Team Group"),
];

/// Look up a manufacturer name by its raw SPD byte pair.
pub fn manufacturer_name(first: u8, second: u8) -> Option<&'static str> {
    MANUFACTURERS
        .iter()
        .find(|(f, s, _)| *f == first && *s == second)
        .map(|(_, _, name)| *name)
}

/// JEDEC lower-bound thresholds for one timing parameter, in ns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingLimit {
    /// Parameter name as used in decode output ("tAA", "tRCD", ...)
    pub name: &'static str,
    /// Slowest JEDEC-specified minimum across DDR4 speed bins
    pub jedec_min: f64,
    /// Values below this are flagged as a warning
    pub warning_ns: f64,
    /// Values below this are flagged as dangerous
    pub danger_ns: f64,
}

/// Advisory JEDEC timing thresholds (JESD79-4C derived).
pub const TIMING_LIMITS: &[TimingLimit] = &[
    TimingLimit { name: "tCK", jedec_min: 0.625, warning_ns: 0.500, danger_ns: 0.417 },
    TimingLimit { name: "tAA", jedec_min: 12.5, warning_ns: 10.0, danger_ns: 8.0 },
    TimingLimit { name: "tRCD", jedec_min: 12.5, warning_ns: 10.0, danger_ns: 8.0 },
    TimingLimit { name: "tRP", jedec_min: 12.5, warning_ns: 10.0, danger_ns: 8.0 },
    TimingLimit { name: "tRAS", jedec_min: 32.0, warning_ns: 28.0, danger_ns: 24.0 },
    TimingLimit { name: "tRC", jedec_min: 45.0, warning_ns: 40.0, danger_ns: 35.0 },
    TimingLimit { name: "tRFC1", jedec_min: 350.0, warning_ns: 280.0, danger_ns: 175.0 },
];

/// Inclusive clamp range applied to user-supplied XMP cycle counts before
/// encoding. 0 means "leave the field untouched" for most fields, so the
/// lower bounds here only bind non-zero input.
pub mod clamp {
    /// Frequency in MT/s; a hard invariant of the byte encoding
    pub const FREQUENCY: (u32, u32) = (1600, 6000);
    /// CAS latency in cycles
    pub const CL: (u16, u16) = (10, 40);
    /// tRCD in cycles
    pub const TRCD: (u16, u16) = (10, 80);
    /// tRP in cycles
    pub const TRP: (u16, u16) = (10, 80);
    /// tRAS in cycles
    pub const TRAS: (u16, u16) = (20, 200);
    /// tRC in cycles (0 = keep stored value)
    pub const TRC: (u16, u16) = (0, 400);
    /// tRFC1/2/4 in cycles
    pub const TRFC: (u16, u16) = (0, 10000);
    /// tFAW in cycles
    pub const TFAW: (u16, u16) = (0, 256);
    /// tRRD_S in cycles
    pub const TRRD_S: (u16, u16) = (0, 64);
    /// tRRD_L in cycles
    pub const TRRD_L: (u16, u16) = (0, 128);
    /// tWR in cycles
    pub const TWR: (u16, u16) = (0, 512);
    /// tCCD_L in cycles (experimental write path)
    pub const TCCD_L: (u16, u16) = (0, 128);
    /// tWTR_S in cycles (experimental write path)
    pub const TWTR_S: (u16, u16) = (0, 128);
    /// tWTR_L in cycles (experimental write path)
    pub const TWTR_L: (u16, u16) = (0, 256);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_codes() {
        assert_eq!(density_gb(0b0101), 8.0);
        assert_eq!(density_gb(0b0110), 16.0);
        // Asymmetric codes added by later SPD revisions
        assert_eq!(density_gb(0b1000), 12.0);
        assert_eq!(density_gb(0b1111), 0.0);
    }

    #[test]
    fn test_speed_bins_are_half_open() {
        // 938 ps is the start of the 2133 bin, not the end of the 2400 bin
        let hit = JEDEC_SPEED_BINS
            .iter()
            .find(|(lo, hi, _)| (*lo..*hi).contains(&938))
            .unwrap();
        assert_eq!(hit.2, 2133);
    }

    #[test]
    fn test_manufacturer_lookup() {
        assert_eq!(manufacturer_name(0x02, 0x9E), Some("Corsair"));
        assert_eq!(manufacturer_name(0x80, 0xCE), Some("Samsung"));
        assert_eq!(manufacturer_name(0x7F, 0x01), None);
    }

    #[test]
    fn test_unknown_module_type_is_none() {
        assert_eq!(module_type(0x02), Some("UDIMM"));
        assert_eq!(module_type(0x0F), None);
    }
}
