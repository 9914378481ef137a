//! DDR4 SPD byte-offset map
//!
//! Absolute offsets into the 512-byte SPD image, per JEDEC DDR4 SPD (base
//! region and the manufacturer block) plus the Intel XMP 2.0 extension
//! region. These values are part of the wire contract and must match the
//! third-party reference decoders bit-for-bit.

/// Total size of a DDR4 SPD image in bytes
pub const SPD_SIZE: usize = 512;

/// DRAM device type code for DDR4 (byte 2)
pub const DDR4_TYPE: u8 = 0x0C;

/// Base configuration region (bytes 0-127) and manufacturer block (320-351)
pub mod base {
    /// Number of SPD bytes used
    pub const BYTES_USED: usize = 0;
    /// SPD revision
    pub const REVISION: usize = 1;
    /// DRAM device type (0x0C = DDR4)
    pub const DRAM_TYPE: usize = 2;
    /// Module type (low nibble)
    pub const MODULE_TYPE: usize = 3;
    /// SDRAM density (low nibble) and bank-group code (bits 7:6)
    pub const DENSITY_BANKS: usize = 4;
    /// Row (bits 5:3) and column (bits 2:0) address bit codes
    pub const ADDRESSING: usize = 5;
    /// Package type: bit 7 = 3DS flag, bits 6:4 = die count, bits 1:0 = signal loading
    pub const PACKAGE_TYPE: usize = 6;
    /// Module nominal voltage (bit 1 = 1.2 V operable)
    pub const VOLTAGE: usize = 11;
    /// Module organization: bits 2:0 = device width code, bits 5:3 = ranks - 1
    pub const MODULE_ORG: usize = 12;
    /// Bus width: bits 2:0 = primary width code, bits 4:3 = extension code
    pub const BUS_WIDTH: usize = 13;
    /// Thermal sensor (bit 7 = present)
    pub const THERMAL_SENSOR: usize = 14;

    /// tCKAVGmin (MTB)
    pub const TCK_MIN: usize = 18;
    /// Supported CAS latency bitmap, 4 bytes, bit = CL - 7
    pub const CAS_LATENCIES: usize = 20;
    /// tAAmin (MTB)
    pub const TAA_MIN: usize = 24;
    /// tRCDmin (MTB)
    pub const TRCD_MIN: usize = 25;
    /// tRPmin (MTB)
    pub const TRP_MIN: usize = 26;
    /// Shared high nibbles: low nibble = tRAS bits 11:8, high nibble = tRC bits 11:8
    pub const TRAS_TRC_HIGH: usize = 27;
    /// tRASmin bits 7:0 (MTB)
    pub const TRAS_MIN_LOW: usize = 28;
    /// tRCmin bits 7:0 (MTB)
    pub const TRC_MIN_LOW: usize = 29;
    /// tRFC1min low byte (MTB)
    pub const TRFC1_LOW: usize = 30;
    /// tRFC1min high byte (MTB)
    pub const TRFC1_HIGH: usize = 31;
    /// tRFC2min low byte (MTB)
    pub const TRFC2_LOW: usize = 32;
    /// tRFC2min high byte (MTB)
    pub const TRFC2_HIGH: usize = 33;
    /// tRFC4min low byte (MTB)
    pub const TRFC4_LOW: usize = 34;
    /// tRFC4min high byte (MTB)
    pub const TRFC4_HIGH: usize = 35;
    /// tFAWmin bits 11:8 (low nibble)
    pub const TFAW_HIGH: usize = 36;
    /// tFAWmin bits 7:0 (MTB)
    pub const TFAW_LOW: usize = 37;
    /// tRRD_Smin (MTB)
    pub const TRRD_S_MIN: usize = 38;
    /// tRRD_Lmin (MTB)
    pub const TRRD_L_MIN: usize = 39;
    /// tCCD_Lmin (MTB)
    pub const TCCD_L_MIN: usize = 40;
    /// tWRmin bits 11:8 (low nibble)
    pub const TWR_MIN_HIGH: usize = 41;
    /// tWRmin bits 7:0 (MTB)
    pub const TWR_MIN_LOW: usize = 42;
    /// Shared high nibbles: low nibble = tWTR_S bits 11:8, high nibble = tWTR_L bits 11:8
    pub const TWTR_MIN_HIGH: usize = 43;
    /// tWTR_Smin bits 7:0 (MTB)
    pub const TWTR_S_MIN: usize = 44;
    /// tWTR_Lmin bits 7:0 (MTB)
    pub const TWTR_L_MIN: usize = 45;

    /// tRCmin fine offset (signed FTB)
    pub const TRC_MIN_FTB: usize = 120;
    /// tRPmin fine offset (signed FTB)
    pub const TRP_MIN_FTB: usize = 121;
    /// tRCDmin fine offset (signed FTB)
    pub const TRCD_MIN_FTB: usize = 122;
    /// tAAmin fine offset (signed FTB)
    pub const TAA_MIN_FTB: usize = 123;
    /// tCKAVGmin fine offset (signed FTB)
    pub const TCK_MIN_FTB: usize = 125;

    /// Module manufacturer ID, first byte (JEP106 bank)
    pub const MANUFACTURER_ID_FIRST: usize = 320;
    /// Module manufacturer ID, second byte (JEP106 code)
    pub const MANUFACTURER_ID_SECOND: usize = 321;
    /// Manufacturing location code
    pub const MANUFACTURING_LOCATION: usize = 322;
    /// Manufacturing year (packed BCD)
    pub const MANUFACTURING_YEAR: usize = 323;
    /// Manufacturing week (packed BCD)
    pub const MANUFACTURING_WEEK: usize = 324;
    /// Serial number, 4 raw bytes
    pub const SERIAL_NUMBER: usize = 325;
    /// Serial number length in bytes
    pub const SERIAL_NUMBER_LEN: usize = 4;
    /// Part number, 20 ASCII bytes
    pub const PART_NUMBER: usize = 329;
    /// Part number length in bytes
    pub const PART_NUMBER_LEN: usize = 20;
    /// Module revision code
    pub const REVISION_CODE: usize = 349;
    /// DRAM die manufacturer ID, first byte
    pub const DRAM_MANUFACTURER_ID_FIRST: usize = 350;
    /// DRAM die manufacturer ID, second byte
    pub const DRAM_MANUFACTURER_ID_SECOND: usize = 351;
}

/// XMP 2.0 extension region (bytes 384-511)
pub mod xmp {
    /// XMP identification string, byte 0 (0x0C)
    pub const HEADER: usize = 384;
    /// First XMP signature byte
    pub const MAGIC0: u8 = 0x0C;
    /// Second XMP signature byte ('J')
    pub const MAGIC1: u8 = 0x4A;
    /// Profile enable bitmap: bit 0 = profile 1, bit 1 = profile 2
    pub const PROFILE_ENABLED: usize = 386;
    /// XMP revision, nibble.nibble (0x20 = 2.0)
    pub const REVISION: usize = 387;
    /// Revision byte written when initializing a fresh XMP header
    pub const DEFAULT_REVISION: u8 = 0x20;
    /// Profile 1 start offset
    pub const PROFILE1: usize = 393;
    /// Profile 2 start offset
    pub const PROFILE2: usize = 440;
    /// Length of one profile structure in bytes
    pub const PROFILE_LEN: usize = 47;

    /// Field offsets relative to a profile's start.
    ///
    /// All timing fields use the same MTB/FTB timebases as the DDR4 base
    /// region (125 ps / signed 1 ps). The FTB bytes sit at the tail of the
    /// profile structure.
    pub mod field {
        /// VDD voltage: bit 7 = profile enabled, bits 6:0 = 10 mV steps from 1.00 V
        pub const VDD_VOLTAGE: usize = 0;
        /// tCKAVGmin (MTB)
        pub const TCK_MTB: usize = 3;
        /// Supported CAS latency bitmap, 3 bytes, bit = CL - 7
        pub const CAS_LATENCIES: usize = 4;
        /// tAAmin (MTB)
        pub const TAA_MTB: usize = 8;
        /// tRCDmin (MTB)
        pub const TRCD_MTB: usize = 9;
        /// tRPmin (MTB)
        pub const TRP_MTB: usize = 10;
        /// Shared high nibbles: low nibble = tRAS bits 11:8, high nibble = tRC bits 11:8
        pub const TRAS_TRC_HIGH: usize = 11;
        /// tRASmin bits 7:0 (MTB)
        pub const TRAS_LOW: usize = 12;
        /// tRCmin bits 7:0 (MTB)
        pub const TRC_LOW: usize = 13;
        /// tRFC1min low byte (MTB)
        pub const TRFC1_LOW: usize = 14;
        /// tRFC1min high byte (MTB)
        pub const TRFC1_HIGH: usize = 15;
        /// tRFC2min low byte (MTB)
        pub const TRFC2_LOW: usize = 16;
        /// tRFC2min high byte (MTB)
        pub const TRFC2_HIGH: usize = 17;
        /// tRFC4min low byte (MTB)
        pub const TRFC4_LOW: usize = 18;
        /// tRFC4min high byte (MTB)
        pub const TRFC4_HIGH: usize = 19;
        /// tFAWmin bits 11:8 (low nibble)
        pub const TFAW_HIGH: usize = 20;
        /// tFAWmin bits 7:0 (MTB)
        pub const TFAW_LOW: usize = 21;
        /// tRRD_Smin (MTB)
        pub const TRRD_S_MIN: usize = 22;
        /// tRRD_Lmin (MTB)
        pub const TRRD_L_MIN: usize = 23;
        /// tCCD_Lmin (MTB)
        pub const TCCD_L_MIN: usize = 24;
        /// tWRmin bits 11:8 (low nibble)
        pub const TWR_HIGH: usize = 25;
        /// tWRmin bits 7:0 (MTB)
        pub const TWR_LOW: usize = 26;
        /// tWTR_Smin (MTB, write path only)
        pub const TWTR_S_MIN: usize = 27;
        /// tWTR_Lmin (MTB, write path only)
        pub const TWTR_L_MIN: usize = 28;
        /// tRCmin fine offset (signed FTB)
        pub const TRC_FTB: usize = 34;
        /// tRPmin fine offset (signed FTB)
        pub const TRP_FTB: usize = 35;
        /// tRCDmin fine offset (signed FTB)
        pub const TRCD_FTB: usize = 36;
        /// tAAmin fine offset (signed FTB)
        pub const TAA_FTB: usize = 37;
        /// tCKAVGmin fine offset (signed FTB)
        pub const TCK_FTB: usize = 38;
    }
}
