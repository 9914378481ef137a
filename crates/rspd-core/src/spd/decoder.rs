//! Base-region field decoding for [`SpdImage`]

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::types::*;
use super::SpdImage;
use crate::layout::{base, DDR4_TYPE};
use crate::tables;
use crate::timebase::{
    decode_time_ps, decode_u12, decode_u16le, div_round, signed_ftb, MTB_PS,
};

impl SpdImage {
    /// Whether the snapshot looks like a DDR4 SPD image.
    ///
    /// Requires the full base region (256 bytes) to have been present in the
    /// source buffer and the DRAM type byte to read DDR4.
    pub fn is_valid(&self) -> bool {
        self.source_len() >= 256 && self.byte(base::DRAM_TYPE) == DDR4_TYPE
    }

    /// Memory type label from the DRAM type byte.
    pub fn memory_type(&self) -> String {
        match self.byte(base::DRAM_TYPE) {
            DDR4_TYPE => String::from("DDR4"),
            0x0E => String::from("DDR5"),
            0x0B => String::from("DDR3"),
            other => format!("Unknown (0x{:02X})", other),
        }
    }

    /// Module form-factor label from the low nibble of the module type byte.
    pub fn module_type(&self) -> String {
        let code = self.byte(base::MODULE_TYPE) & 0x0F;
        match tables::module_type(code) {
            Some(name) => String::from(name),
            None => format!("Unknown (0x{:02X})", code),
        }
    }

    /// Capacity and organization of the module.
    pub fn capacity(&self) -> CapacityInfo {
        let density_byte = self.byte(base::DENSITY_BANKS);
        let addressing_byte = self.byte(base::ADDRESSING);
        let org_byte = self.byte(base::MODULE_ORG);
        let width_byte = self.byte(base::BUS_WIDTH);
        let package_byte = self.byte(base::PACKAGE_TYPE);

        let density_gb = tables::density_gb(density_byte & 0x0F);
        let bank_groups = bank_groups_from(density_byte);
        let row_bits = tables::row_bits((addressing_byte >> 3) & 0x07);
        let col_bits = tables::col_bits(addressing_byte & 0x07);
        let device_width = tables::device_width(org_byte & 0x07);
        let ranks = ((org_byte >> 3) & 0x07) + 1;
        let bus_width = 8u32 << (width_byte & 0x07);

        // Die count only multiplies capacity for 3DS packages; monolithic
        // parts sometimes carry a stale die-count code.
        let is_3ds = (package_byte >> 7) & 0x01 != 0;
        let die_count = if is_3ds {
            tables::die_count((package_byte >> 4) & 0x07)
        } else {
            1
        };

        let total_capacity_gb = density_gb * (bus_width as f64 / device_width as f64)
            * ranks as f64
            * die_count as f64
            / 8.0;

        CapacityInfo {
            density_per_die_gb: density_gb,
            bank_groups,
            row_bits,
            col_bits,
            device_width,
            ranks,
            bus_width,
            total_capacity_gb,
            capacity_str: format_capacity(total_capacity_gb),
            organization: format!("{}Rx{}", ranks, device_width),
            is_3ds,
            die_count,
        }
    }

    /// Base-region JEDEC timing parameters, in ns.
    pub fn timings(&self) -> TimingSet {
        let tck_ps = self.base_tck_ps();
        let taa_ps = decode_time_ps(self.byte(base::TAA_MIN), self.byte(base::TAA_MIN_FTB));
        let trcd_ps = decode_time_ps(self.byte(base::TRCD_MIN), self.byte(base::TRCD_MIN_FTB));
        let trp_ps = decode_time_ps(self.byte(base::TRP_MIN), self.byte(base::TRP_MIN_FTB));

        let shared = self.byte(base::TRAS_TRC_HIGH);
        let tras_ps = decode_u12(shared & 0x0F, self.byte(base::TRAS_MIN_LOW)) as i64 * MTB_PS;
        let trc_ps = decode_u12(shared >> 4, self.byte(base::TRC_MIN_LOW)) as i64 * MTB_PS
            + signed_ftb(self.byte(base::TRC_MIN_FTB));

        let trfc1_ps =
            decode_u16le(self.byte(base::TRFC1_LOW), self.byte(base::TRFC1_HIGH)) as i64 * MTB_PS;
        let trfc2_ps =
            decode_u16le(self.byte(base::TRFC2_LOW), self.byte(base::TRFC2_HIGH)) as i64 * MTB_PS;
        let trfc4_ps =
            decode_u16le(self.byte(base::TRFC4_LOW), self.byte(base::TRFC4_HIGH)) as i64 * MTB_PS;

        let tfaw_ps =
            decode_u12(self.byte(base::TFAW_HIGH), self.byte(base::TFAW_LOW)) as i64 * MTB_PS;
        let twr_ps =
            decode_u12(self.byte(base::TWR_MIN_HIGH), self.byte(base::TWR_MIN_LOW)) as i64 * MTB_PS;

        // tWTR_S and tWTR_L share one high-nibble byte; the split here is a
        // known regression spot, see the nibble test below.
        let twtr_high = self.byte(base::TWTR_MIN_HIGH);
        let twtr_s_ps = decode_u12(twtr_high & 0x0F, self.byte(base::TWTR_S_MIN)) as i64 * MTB_PS;
        let twtr_l_ps = decode_u12(twtr_high >> 4, self.byte(base::TWTR_L_MIN)) as i64 * MTB_PS;

        TimingSet {
            tck: ns(tck_ps),
            taa: ns(taa_ps),
            trcd: ns(trcd_ps),
            trp: ns(trp_ps),
            tras: ns(tras_ps),
            trc: ns(trc_ps),
            trfc1: ns(trfc1_ps),
            trfc2: ns(trfc2_ps),
            trfc4: ns(trfc4_ps),
            tfaw: ns(tfaw_ps),
            trrd_s: ns(self.byte(base::TRRD_S_MIN) as i64 * MTB_PS),
            trrd_l: ns(self.byte(base::TRRD_L_MIN) as i64 * MTB_PS),
            tccd_l: ns(self.byte(base::TCCD_L_MIN) as i64 * MTB_PS),
            twr: ns(twr_ps),
            twtr_s: ns(twtr_s_ps),
            twtr_l: ns(twtr_l_ps),
            cl: div_round(taa_ps, tck_ps) as u16,
        }
    }

    /// Primary timing string for the base profile, e.g. `CL16-18-18-36`.
    ///
    /// Base-region parameters round to nearest (the stored values already
    /// sit on JEDEC grid points), unlike the XMP path which rounds up.
    pub fn timing_string(&self) -> String {
        let tck_ps = self.base_tck_ps();
        if tck_ps <= 0 {
            return String::from("Unknown");
        }
        let cl = div_round(
            decode_time_ps(self.byte(base::TAA_MIN), self.byte(base::TAA_MIN_FTB)),
            tck_ps,
        );
        let trcd = div_round(
            decode_time_ps(self.byte(base::TRCD_MIN), self.byte(base::TRCD_MIN_FTB)),
            tck_ps,
        );
        let trp = div_round(
            decode_time_ps(self.byte(base::TRP_MIN), self.byte(base::TRP_MIN_FTB)),
            tck_ps,
        );
        let shared = self.byte(base::TRAS_TRC_HIGH);
        let tras = div_round(
            decode_u12(shared & 0x0F, self.byte(base::TRAS_MIN_LOW)) as i64 * MTB_PS,
            tck_ps,
        );
        format!("CL{}-{}-{}-{}", cl, trcd, trp, tras)
    }

    /// JEDEC speed grade in MT/s from the base tCK.
    ///
    /// Falls back to the exact data rate when tCK sits outside every
    /// canonical bin; 0 when tCK is unset.
    pub fn speed_grade(&self) -> u32 {
        let tck_ps = self.base_tck_ps();
        if tck_ps <= 0 {
            return 0;
        }
        for &(lo, hi, speed) in tables::JEDEC_SPEED_BINS {
            if (lo..hi).contains(&tck_ps) {
                return speed;
            }
        }
        (2_000_000 / tck_ps) as u32
    }

    /// CAS latencies advertised by the 4-byte base bitmap, ascending.
    pub fn supported_cas_latencies(&self) -> Vec<u16> {
        let mut out = Vec::new();
        for byte_idx in 0..4 {
            let val = self.byte(base::CAS_LATENCIES + byte_idx);
            for bit in 0..8 {
                if val & (1 << bit) != 0 {
                    out.push(7 + byte_idx as u16 * 8 + bit as u16);
                }
            }
        }
        out
    }

    /// Module identity: vendor, date, serial, part number.
    pub fn identity(&self) -> DramIdentity {
        DramIdentity {
            memory_type: self.memory_type(),
            module_type: self.module_type(),
            manufacturer: self.manufacturer_at(
                base::MANUFACTURER_ID_FIRST,
                base::MANUFACTURER_ID_SECOND,
            ),
            dram_manufacturer: self.manufacturer_at(
                base::DRAM_MANUFACTURER_ID_FIRST,
                base::DRAM_MANUFACTURER_ID_SECOND,
            ),
            manufacturing_location: self.byte(base::MANUFACTURING_LOCATION),
            manufacturing_date: self.manufacturing_date(),
            serial_number: self.serial_number(),
            part_number: self.part_number(),
            revision_code: self.byte(base::REVISION_CODE),
        }
    }

    /// Die/package detail with the organization breakdown string.
    pub fn die_info(&self) -> DieInfo {
        let density_byte = self.byte(base::DENSITY_BANKS);
        let package_byte = self.byte(base::PACKAGE_TYPE);
        let org_byte = self.byte(base::MODULE_ORG);

        let density_gb = tables::density_gb(density_byte & 0x0F);
        let is_3ds = (package_byte >> 7) & 0x01 != 0;
        let device_width = tables::device_width(org_byte & 0x07);
        let bank_groups = bank_groups_from(density_byte);
        let banks_total = bank_groups as u32 * tables::BANKS_PER_GROUP as u32;
        let density_mb = (density_gb * 1024.0) as i64;

        DieInfo {
            density_gb,
            die_count: tables::die_count((package_byte >> 4) & 0x07),
            package_type: String::from(if is_3ds {
                "3DS (Non-Monolithic)"
            } else {
                "Monolithic"
            }),
            signal_loading: String::from(tables::signal_loading(package_byte)),
            organization: format!(
                "{} Mb x{} ({}M x {} x {} banks)",
                density_mb,
                device_width,
                density_mb / 8,
                device_width,
                banks_total
            ),
        }
    }

    /// Bank-group configuration.
    pub fn bank_config(&self) -> BankConfig {
        let bank_groups = bank_groups_from(self.byte(base::DENSITY_BANKS));
        BankConfig {
            bank_groups,
            banks_per_group: tables::BANKS_PER_GROUP,
            total_banks: bank_groups * tables::BANKS_PER_GROUP,
        }
    }

    /// Row/column addressing and derived page size.
    pub fn addressing(&self) -> AddressingInfo {
        let addressing_byte = self.byte(base::ADDRESSING);
        let col_bits = tables::col_bits(addressing_byte & 0x07);
        let device_width = tables::device_width(self.byte(base::MODULE_ORG) & 0x07);
        AddressingInfo {
            row_bits: tables::row_bits((addressing_byte >> 3) & 0x07),
            col_bits,
            page_size_bytes: (1u32 << col_bits) * device_width / 8,
        }
    }

    /// Bus-width extension (ECC) detail.
    pub fn ecc_info(&self) -> EccInfo {
        let width_byte = self.byte(base::BUS_WIDTH);
        let primary_width = 8u32 << (width_byte & 0x07);
        let extension_width = match (width_byte >> 3) & 0x03 {
            0b01 => 8,
            0b10 => 16,
            _ => 0,
        };
        EccInfo {
            primary_width,
            extension_width,
            total_width: primary_width + extension_width,
            has_ecc: extension_width > 0,
        }
    }

    /// Whether the module carries an on-DIMM thermal sensor.
    pub fn has_thermal_sensor(&self) -> bool {
        self.byte(base::THERMAL_SENSOR) & 0x80 != 0
    }

    /// Whether the module is operable at the DDR4 nominal 1.2 V.
    pub fn is_1v2_operable(&self) -> bool {
        self.byte(base::VOLTAGE) & 0x02 != 0
    }

    pub(crate) fn base_tck_ps(&self) -> i64 {
        decode_time_ps(self.byte(base::TCK_MIN), self.byte(base::TCK_MIN_FTB))
    }

    fn manufacturer_at(&self, first_off: usize, second_off: usize) -> ManufacturerId {
        let first = self.byte(first_off);
        let second = self.byte(second_off);
        let name = match tables::manufacturer_name(first, second) {
            Some(name) => String::from(name),
            None => format!("Unknown (0x{:02X}{:02X})", first, second),
        };
        ManufacturerId {
            name,
            code: [first, second],
        }
    }

    fn manufacturing_date(&self) -> String {
        let year = self.byte(base::MANUFACTURING_YEAR);
        let week = self.byte(base::MANUFACTURING_WEEK);
        if year == 0 || year == 0xFF {
            return String::from("Unknown");
        }
        // Packed BCD, no validation: vendors ship nonsense nibbles and the
        // string renders them as-is.
        format!(
            "20{}{} Week {}{}",
            (year >> 4) & 0x0F,
            year & 0x0F,
            (week >> 4) & 0x0F,
            week & 0x0F
        )
    }

    fn serial_number(&self) -> String {
        let mut s = String::with_capacity(base::SERIAL_NUMBER_LEN * 2);
        for i in 0..base::SERIAL_NUMBER_LEN {
            s.push_str(&format!("{:02X}", self.byte(base::SERIAL_NUMBER + i)));
        }
        s
    }

    fn part_number(&self) -> String {
        let mut s = String::with_capacity(base::PART_NUMBER_LEN);
        for i in 0..base::PART_NUMBER_LEN {
            let b = self.byte(base::PART_NUMBER + i);
            // Non-printable bytes are dropped, not replaced
            if (32..127).contains(&b) {
                s.push(b as char);
            }
        }
        String::from(s.trim())
    }
}

fn bank_groups_from(density_byte: u8) -> u8 {
    if (density_byte >> 6) & 0x03 == 0 {
        4
    } else {
        2
    }
}

fn ns(ps: i64) -> f64 {
    ps as f64 / 1000.0
}

fn format_capacity(capacity_gb: f64) -> String {
    if capacity_gb >= 1.0 {
        let whole = capacity_gb as i64;
        if capacity_gb == whole as f64 {
            format!("{} GB", whole)
        } else {
            format!("{:.1} GB", capacity_gb)
        }
    } else {
        format!("{} MB", (capacity_gb * 1024.0) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::base;

    fn image_with(bytes: &[(usize, u8)]) -> SpdImage {
        let mut raw = [0u8; 512];
        raw[base::DRAM_TYPE] = DDR4_TYPE;
        for &(off, val) in bytes {
            raw[off] = val;
        }
        SpdImage::new(&raw)
    }

    #[test]
    fn test_validity_needs_length_and_type() {
        assert!(image_with(&[]).is_valid());
        assert!(!SpdImage::new(&[0u8; 512]).is_valid());
        // Right type byte but truncated base region
        let mut short = [0u8; 100];
        short[base::DRAM_TYPE] = DDR4_TYPE;
        assert!(!SpdImage::new(&short).is_valid());
    }

    #[test]
    fn test_capacity_formula() {
        // 8 Gb x8, 1 rank, 64-bit bus -> 8 GB
        let img = image_with(&[
            (base::DENSITY_BANKS, 0x05),
            (base::MODULE_ORG, 0x01),
            (base::BUS_WIDTH, 0x03),
        ]);
        let cap = img.capacity();
        assert_eq!(cap.total_capacity_gb, 8.0);
        assert_eq!(cap.capacity_str, "8 GB");
        assert_eq!(cap.organization, "1Rx8");
        assert_eq!(cap.bank_groups, 4);

        // Same die on a 16-bit bus: 2 GB
        let img = image_with(&[
            (base::DENSITY_BANKS, 0x05),
            (base::MODULE_ORG, 0x01),
            (base::BUS_WIDTH, 0x01),
        ]);
        assert_eq!(img.capacity().total_capacity_gb, 2.0);
    }

    #[test]
    fn test_capacity_3ds_multiplies_dies() {
        // 8 Gb x8 2-high 3DS, 1 rank, 64-bit -> 16 GB
        let img = image_with(&[
            (base::DENSITY_BANKS, 0x05),
            (base::MODULE_ORG, 0x01),
            (base::BUS_WIDTH, 0x03),
            (base::PACKAGE_TYPE, 0x91),
        ]);
        let cap = img.capacity();
        assert!(cap.is_3ds);
        assert_eq!(cap.die_count, 2);
        assert_eq!(cap.total_capacity_gb, 16.0);

        // Monolithic with a stale die-count code: not multiplied
        let img = image_with(&[
            (base::DENSITY_BANKS, 0x05),
            (base::MODULE_ORG, 0x01),
            (base::BUS_WIDTH, 0x03),
            (base::PACKAGE_TYPE, 0x10),
        ]);
        assert_eq!(img.capacity().total_capacity_gb, 8.0);
    }

    #[test]
    fn test_sub_gigabyte_capacity_string() {
        // 0.512 Gb x8, 1 rank, 8-bit bus -> 65 MB (truncated from 65.536)
        let img = image_with(&[
            (base::DENSITY_BANKS, 0x01),
            (base::MODULE_ORG, 0x01),
            (base::BUS_WIDTH, 0x00),
        ]);
        assert_eq!(img.capacity().capacity_str, "65 MB");
    }

    #[test]
    fn test_fractional_capacity_string() {
        assert_eq!(format_capacity(1.5), "1.5 GB");
        assert_eq!(format_capacity(16.0), "16 GB");
        assert_eq!(format_capacity(0.5), "512 MB");
    }

    #[test]
    fn test_twtr_nibble_split() {
        // Byte 43 = 0x41: low nibble 1 extends tWTR_S, high nibble 4 extends
        // tWTR_L. Swapping them is the classic regression.
        let img = image_with(&[
            (base::TWTR_MIN_HIGH, 0x41),
            (base::TWTR_S_MIN, 0x23),
            (base::TWTR_L_MIN, 0x56),
        ]);
        let t = img.timings();
        assert_eq!(t.twtr_s, 0x123 as f64 * 0.125);
        assert_eq!(t.twtr_l, 0x456 as f64 * 0.125);
    }

    #[test]
    fn test_tras_trc_nibble_split() {
        // Byte 27 = 0x21: low nibble extends tRAS, high nibble extends tRC
        let img = image_with(&[
            (base::TRAS_TRC_HIGH, 0x21),
            (base::TRAS_MIN_LOW, 0x00),
            (base::TRC_MIN_LOW, 0x00),
        ]);
        let t = img.timings();
        assert_eq!(t.tras, 0x100 as f64 * 0.125);
        assert_eq!(t.trc, 0x200 as f64 * 0.125);
    }

    #[test]
    fn test_speed_grade_bins_and_fallback() {
        // 938 ps with FTB correction -> 2133 bin
        let img = image_with(&[(base::TCK_MIN, 0x08), (base::TCK_MIN_FTB, 0xC2)]);
        assert_eq!(img.speed_grade(), 2133);
        // 625 ps -> 3200 bin
        let img = image_with(&[(base::TCK_MIN, 0x05)]);
        assert_eq!(img.speed_grade(), 3200);
        // 500 ps sits outside every bin: exact rate
        let img = image_with(&[(base::TCK_MIN, 0x04)]);
        assert_eq!(img.speed_grade(), 4000);
        // Unset tCK
        assert_eq!(image_with(&[]).speed_grade(), 0);
    }

    #[test]
    fn test_cas_bitmap() {
        // Bit n of byte i encodes CL 7 + i*8 + n
        let img = image_with(&[
            (base::CAS_LATENCIES, 0x80),
            (base::CAS_LATENCIES + 1, 0x01),
            (base::CAS_LATENCIES + 2, 0x02),
        ]);
        assert_eq!(img.supported_cas_latencies(), [14, 15, 24]);
    }

    #[test]
    fn test_manufacturing_date() {
        let img = image_with(&[
            (base::MANUFACTURING_YEAR, 0x23),
            (base::MANUFACTURING_WEEK, 0x07),
        ]);
        assert_eq!(img.identity().manufacturing_date, "2023 Week 07");
        assert_eq!(image_with(&[]).identity().manufacturing_date, "Unknown");
        let img = image_with(&[(base::MANUFACTURING_YEAR, 0xFF)]);
        assert_eq!(img.identity().manufacturing_date, "Unknown");
    }

    #[test]
    fn test_part_number_drops_non_printable() {
        let mut fields: alloc::vec::Vec<(usize, u8)> = alloc::vec::Vec::new();
        for (i, b) in b"ABC-123\0\0\xFF   ".iter().enumerate() {
            fields.push((base::PART_NUMBER + i, *b));
        }
        let img = image_with(&fields);
        assert_eq!(img.identity().part_number, "ABC-123");
    }

    #[test]
    fn test_serial_number_hex() {
        let img = image_with(&[
            (base::SERIAL_NUMBER, 0xDE),
            (base::SERIAL_NUMBER + 1, 0xAD),
            (base::SERIAL_NUMBER + 2, 0xBE),
            (base::SERIAL_NUMBER + 3, 0xEF),
        ]);
        assert_eq!(img.identity().serial_number, "DEADBEEF");
    }

    #[test]
    fn test_manufacturer_lookup_and_fallback() {
        let img = image_with(&[
            (base::MANUFACTURER_ID_FIRST, 0x02),
            (base::MANUFACTURER_ID_SECOND, 0x9E),
            (base::DRAM_MANUFACTURER_ID_FIRST, 0x7F),
            (base::DRAM_MANUFACTURER_ID_SECOND, 0x33),
        ]);
        let id = img.identity();
        assert_eq!(id.manufacturer.name, "Corsair");
        assert_eq!(id.manufacturer.id_hex(), "0x029E");
        assert_eq!(id.dram_manufacturer.name, "Unknown (0x7F33)");
    }

    #[test]
    fn test_addressing_page_size() {
        // 10 column bits, x8 device -> 1 KB page
        let img = image_with(&[(base::ADDRESSING, 0x29), (base::MODULE_ORG, 0x01)]);
        let addr = img.addressing();
        assert_eq!(addr.row_bits, 17);
        assert_eq!(addr.col_bits, 10);
        assert_eq!(addr.page_size_bytes, 1024);
    }

    #[test]
    fn test_ecc_extension() {
        // 64-bit primary + 8-bit extension
        let img = image_with(&[(base::BUS_WIDTH, 0x0B)]);
        let ecc = img.ecc_info();
        assert!(ecc.has_ecc);
        assert_eq!(ecc.total_width, 72);
        assert!(!image_with(&[(base::BUS_WIDTH, 0x03)]).ecc_info().has_ecc);
    }

    #[test]
    fn test_thermal_and_voltage_flags() {
        assert!(image_with(&[(base::THERMAL_SENSOR, 0x80)]).has_thermal_sensor());
        assert!(!image_with(&[]).has_thermal_sensor());
        assert!(image_with(&[(base::VOLTAGE, 0x03)]).is_1v2_operable());
    }

    #[test]
    fn test_base_timing_string() {
        // DDR4-2133 C14: tCK 938 ps, tAA/tRCD/tRP 13.5 ns, tRAS 33 ns
        let img = image_with(&[
            (base::TCK_MIN, 0x08),
            (base::TCK_MIN_FTB, 0xC2),
            (base::TAA_MIN, 0x6C),
            (base::TRCD_MIN, 0x6C),
            (base::TRP_MIN, 0x6C),
            (base::TRAS_TRC_HIGH, 0x01),
            (base::TRAS_MIN_LOW, 0x08),
        ]);
        assert_eq!(img.timing_string(), "CL14-14-14-35");
        assert_eq!(image_with(&[]).timing_string(), "Unknown");
    }
}
