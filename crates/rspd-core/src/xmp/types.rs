//! XMP profile records and edit descriptors

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use bitflags::bitflags;

use crate::layout::xmp;

bitflags! {
    /// Profile enable bits from byte 386.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EnabledProfiles: u8 {
        /// Profile 1 enabled
        const PROFILE1 = 0x01;
        /// Profile 2 enabled
        const PROFILE2 = 0x02;
    }
}

bitflags! {
    /// Which fields of an [`XmpEdit`] the user actually touched.
    ///
    /// Untouched fields keep their stored bytes, so editing one value never
    /// re-encodes (and thereby perturbs) the rest of the profile.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChangedFields: u32 {
        /// Target frequency; forces every derived timing to re-encode
        const FREQUENCY = 1 << 0;
        /// VDD voltage
        const VOLTAGE = 1 << 1;
        /// CAS latency
        const CL = 1 << 2;
        /// tRCD
        const TRCD = 1 << 3;
        /// tRP
        const TRP = 1 << 4;
        /// tRAS
        const TRAS = 1 << 5;
        /// tRC
        const TRC = 1 << 6;
        /// tRFC1
        const TRFC1 = 1 << 7;
        /// tRFC2
        const TRFC2 = 1 << 8;
        /// tRFC4
        const TRFC4 = 1 << 9;
        /// tFAW
        const TFAW = 1 << 10;
        /// tRRD_S
        const TRRD_S = 1 << 11;
        /// tRRD_L
        const TRRD_L = 1 << 12;
        /// tWR
        const TWR = 1 << 13;
        /// tCCD_L (experimental write path)
        const TCCD_L = 1 << 14;
        /// tWTR_S (experimental write path)
        const TWTR_S = 1 << 15;
        /// tWTR_L (experimental write path)
        const TWTR_L = 1 << 16;
    }
}

/// Which of the two XMP profile slots an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ProfileId {
    /// Profile 1 at byte 393
    One,
    /// Profile 2 at byte 440
    Two,
}

impl ProfileId {
    /// Absolute offset of the profile structure.
    pub fn offset(self) -> usize {
        match self {
            Self::One => xmp::PROFILE1,
            Self::Two => xmp::PROFILE2,
        }
    }

    /// The profile's bit in the enable bitmap.
    pub fn bit(self) -> EnabledProfiles {
        match self {
            Self::One => EnabledProfiles::PROFILE1,
            Self::Two => EnabledProfiles::PROFILE2,
        }
    }

    /// 1-based profile number, as shown to users.
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// One decoded XMP profile.
///
/// Primary timings (`cl`..`tras`) are always reported; a stored 0 simply
/// decodes as 0 cycles. Advanced timings are `None` when the stored field is
/// zero, which vendors use to mean "not specified".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct XmpProfile {
    /// 1-based profile number
    pub profile_num: u8,
    /// VDD voltage in volts
    pub voltage: f64,
    /// Data rate in MT/s, snapped to the canonical bin; 0 when implausible
    pub frequency: u32,
    /// CAS latency in cycles
    pub cl: u16,
    /// tRCD in cycles
    pub trcd: u16,
    /// tRP in cycles
    pub trp: u16,
    /// tRAS in cycles
    pub tras: u16,
    /// tRC in cycles
    pub trc: Option<u16>,
    /// tRFC1 in cycles
    pub trfc1: Option<u16>,
    /// tRFC2 in cycles
    pub trfc2: Option<u16>,
    /// tRFC4 in cycles
    pub trfc4: Option<u16>,
    /// tFAW in cycles
    pub tfaw: Option<u16>,
    /// tRRD_S in cycles
    pub trrd_s: Option<u16>,
    /// tRRD_L in cycles
    pub trrd_l: Option<u16>,
    /// tWR in cycles
    pub twr: Option<u16>,
}

impl XmpProfile {
    /// Primary timing string, `CL20-25-25-47-73`; tRC is appended only when
    /// the profile specifies one.
    pub fn timing_string(&self) -> String {
        match self.trc {
            Some(trc) if trc > 0 => format!(
                "CL{}-{}-{}-{}-{}",
                self.cl, self.trcd, self.trp, self.tras, trc
            ),
            _ => format!("CL{}-{}-{}-{}", self.cl, self.trcd, self.trp, self.tras),
        }
    }
}

/// Decoded state of the whole XMP region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmpDocument {
    /// Whether the image carries the XMP signature
    pub supported: bool,
    /// Revision string from byte 387, e.g. "2.0"; `None` when unsupported
    pub version: Option<String>,
    /// Raw profile enable bits
    pub enabled: EnabledProfiles,
    /// Decoded profiles, in slot order; disabled slots are omitted
    pub profiles: Vec<XmpProfile>,
}

/// One byte write against the SPD image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Patch {
    /// Absolute byte offset
    pub offset: u16,
    /// New value
    pub value: u8,
}

/// A requested profile edit, all timings in cycles at the target frequency.
///
/// For the advanced fields a value of 0 means "leave the stored bytes
/// alone" on an existing profile and "leave unspecified" on a new one. The
/// `changed` set drives which bytes actually get re-encoded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct XmpEdit {
    /// Target data rate in MT/s
    pub frequency: u32,
    /// VDD voltage in volts
    pub voltage: f64,
    /// CAS latency in cycles
    pub cl: u16,
    /// tRCD in cycles
    pub trcd: u16,
    /// tRP in cycles
    pub trp: u16,
    /// tRAS in cycles
    pub tras: u16,
    /// tRC in cycles; 0 keeps the stored value (new profiles fall back to
    /// tRAS + tRP)
    pub trc: u16,
    /// tRFC1 in cycles; 0 keeps the stored value
    pub trfc1: u16,
    /// tRFC2 in cycles; 0 keeps the stored value
    pub trfc2: u16,
    /// tRFC4 in cycles; 0 keeps the stored value
    pub trfc4: u16,
    /// tFAW in cycles; 0 keeps the stored value
    pub tfaw: u16,
    /// tRRD_S in cycles; 0 keeps the stored value
    pub trrd_s: u16,
    /// tRRD_L in cycles; 0 keeps the stored value
    pub trrd_l: u16,
    /// tWR in cycles; 0 keeps the stored value
    pub twr: u16,
    /// tCCD_L in cycles; only written on the experimental path
    pub tccd_l: u16,
    /// tWTR_S in cycles; only written on the experimental path
    pub twtr_s: u16,
    /// tWTR_L in cycles; only written on the experimental path
    pub twtr_l: u16,
    /// Fields the user touched
    #[cfg_attr(feature = "std", serde(skip))]
    pub changed: ChangedFields,
}

impl Default for XmpEdit {
    fn default() -> Self {
        // DDR4-3200 C16 at 1.35 V, the customary starting point for a new
        // profile
        Self {
            frequency: 3200,
            voltage: 1.35,
            cl: 16,
            trcd: 18,
            trp: 18,
            tras: 36,
            trc: 0,
            trfc1: 0,
            trfc2: 0,
            trfc4: 0,
            tfaw: 0,
            trrd_s: 0,
            trrd_l: 0,
            twr: 0,
            tccd_l: 0,
            twtr_s: 0,
            twtr_l: 0,
            changed: ChangedFields::empty(),
        }
    }
}

impl XmpEdit {
    /// Pre-populate an edit from a decoded profile, with nothing marked
    /// changed yet.
    pub fn from_profile(profile: &XmpProfile) -> Self {
        Self {
            frequency: profile.frequency,
            voltage: profile.voltage,
            cl: profile.cl,
            trcd: profile.trcd,
            trp: profile.trp,
            tras: profile.tras,
            trc: profile.trc.unwrap_or(0),
            trfc1: profile.trfc1.unwrap_or(0),
            trfc2: profile.trfc2.unwrap_or(0),
            trfc4: profile.trfc4.unwrap_or(0),
            tfaw: profile.tfaw.unwrap_or(0),
            trrd_s: profile.trrd_s.unwrap_or(0),
            trrd_l: profile.trrd_l.unwrap_or(0),
            twr: profile.twr.unwrap_or(0),
            tccd_l: 0,
            twtr_s: 0,
            twtr_l: 0,
            changed: ChangedFields::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_id_mapping() {
        assert_eq!(ProfileId::One.offset(), 393);
        assert_eq!(ProfileId::Two.offset(), 440);
        assert_eq!(ProfileId::One.bit(), EnabledProfiles::PROFILE1);
        assert_eq!(ProfileId::Two.number(), 2);
    }

    #[test]
    fn test_timing_string_omits_zero_trc() {
        let mut p = XmpProfile {
            profile_num: 1,
            voltage: 1.35,
            frequency: 4000,
            cl: 20,
            trcd: 25,
            trp: 25,
            tras: 47,
            trc: Some(73),
            trfc1: None,
            trfc2: None,
            trfc4: None,
            tfaw: None,
            trrd_s: None,
            trrd_l: None,
            twr: None,
        };
        assert_eq!(p.timing_string(), "CL20-25-25-47-73");
        p.trc = None;
        assert_eq!(p.timing_string(), "CL20-25-25-47");
        p.trc = Some(0);
        assert_eq!(p.timing_string(), "CL20-25-25-47");
    }

    #[test]
    fn test_edit_round_trips_profile() {
        let p = XmpProfile {
            profile_num: 2,
            voltage: 1.4,
            frequency: 3600,
            cl: 18,
            trcd: 22,
            trp: 22,
            tras: 42,
            trc: Some(66),
            trfc1: Some(1100),
            trfc2: None,
            trfc4: None,
            tfaw: Some(44),
            trrd_s: Some(8),
            trrd_l: Some(12),
            twr: None,
        };
        let edit = XmpEdit::from_profile(&p);
        assert_eq!(edit.frequency, 3600);
        assert_eq!(edit.trc, 66);
        assert_eq!(edit.trfc2, 0);
        assert!(edit.changed.is_empty());
    }
}
