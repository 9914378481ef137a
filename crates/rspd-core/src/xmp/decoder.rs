//! XMP region decoding

use alloc::format;

use log::debug;

use super::types::{EnabledProfiles, ProfileId, XmpDocument, XmpProfile};
use crate::layout::xmp::{self, field};
use crate::spd::SpdImage;
use crate::timebase::{
    cycles_from_ps, decode_time_ps, decode_u12, decode_u16le, frequency_millis,
    snap_frequency_millis, signed_ftb, MTB_PS,
};

/// Plausible tCK window for an XMP profile, in ps (500 MT/s .. 10000 MT/s).
/// Values outside decode with frequency 0 and no derived cycle counts.
const TCK_MIN_PS: i64 = 200;
const TCK_MAX_PS: i64 = 2000;

/// Decode the XMP region of an image.
///
/// Never fails: images without the signature return `supported: false`, and
/// a disabled or garbage profile slot is simply omitted from `profiles`.
pub fn decode(image: &SpdImage) -> XmpDocument {
    let mut doc = XmpDocument::default();

    if image.source_len() < 440 {
        return doc;
    }
    if image.byte(xmp::HEADER) != xmp::MAGIC0 || image.byte(xmp::HEADER + 1) != xmp::MAGIC1 {
        return doc;
    }
    doc.supported = true;

    let revision = image.byte(xmp::REVISION);
    doc.version = Some(if revision != 0 {
        format!("{}.{}", (revision >> 4) & 0x0F, revision & 0x0F)
    } else {
        alloc::string::String::from("2.0")
    });

    let enabled_byte = image.byte(xmp::PROFILE_ENABLED);
    doc.enabled = EnabledProfiles::from_bits_truncate(enabled_byte);

    // A zero enable byte is treated as "try both slots": images written by
    // some vendor tools leave byte 386 clear while carrying a valid profile,
    // and the voltage gate below still rejects empty slots.
    if enabled_byte == 0 || doc.enabled.contains(EnabledProfiles::PROFILE1) {
        if let Some(profile) = decode_profile(image, ProfileId::One) {
            doc.profiles.push(profile);
        }
    }
    if image.source_len() >= 487
        && (enabled_byte == 0 || doc.enabled.contains(EnabledProfiles::PROFILE2))
    {
        if let Some(profile) = decode_profile(image, ProfileId::Two) {
            doc.profiles.push(profile);
        }
    }

    doc
}

fn decode_profile(image: &SpdImage, id: ProfileId) -> Option<XmpProfile> {
    let start = id.offset();

    // The voltage byte doubles as the presence gate: bit 7 must be set and
    // the all-zero/all-ones patterns of blank EEPROM regions are rejected.
    let voltage_byte = image.byte(start + field::VDD_VOLTAGE);
    if voltage_byte == 0x00 || voltage_byte == 0xFF || voltage_byte & 0x80 == 0 {
        debug!(
            "XMP profile {} disabled (voltage byte 0x{:02X})",
            id.number(),
            voltage_byte
        );
        return None;
    }
    let voltage = 1.0 + (voltage_byte & 0x7F) as f64 * 0.01;

    let tck_raw_ps = decode_time_ps(
        image.byte(start + field::TCK_MTB),
        image.byte(start + field::TCK_FTB),
    );
    // Outside the plausibility window the profile is still reported (the
    // slot is enabled), but with no frequency and no cycle counts.
    let tck_ps = if (TCK_MIN_PS..=TCK_MAX_PS).contains(&tck_raw_ps) {
        tck_raw_ps
    } else {
        0
    };

    let mut frequency = snap_frequency_millis(frequency_millis(tck_ps));
    if !(1600..=6000).contains(&frequency) {
        if frequency != 0 {
            debug!(
                "XMP profile {} frequency {} MT/s out of range, dropping",
                id.number(),
                frequency
            );
        }
        frequency = 0;
    }

    let cl = ftb_field_cycles(image, start, field::TAA_MTB, field::TAA_FTB, tck_ps);
    let trcd = ftb_field_cycles(image, start, field::TRCD_MTB, field::TRCD_FTB, tck_ps);
    let trp = ftb_field_cycles(image, start, field::TRP_MTB, field::TRP_FTB, tck_ps);

    let shared = image.byte(start + field::TRAS_TRC_HIGH);
    let tras_mtb = decode_u12(shared & 0x0F, image.byte(start + field::TRAS_LOW));
    let tras = mtb_cycles(tras_mtb, 0, tck_ps);

    let trc_mtb = decode_u12(shared >> 4, image.byte(start + field::TRC_LOW));
    let trc = mtb_cycles(trc_mtb, signed_ftb(image.byte(start + field::TRC_FTB)), tck_ps);

    let trfc1 = mtb_cycles(
        decode_u16le(image.byte(start + field::TRFC1_LOW), image.byte(start + field::TRFC1_HIGH)),
        0,
        tck_ps,
    );
    let trfc2 = mtb_cycles(
        decode_u16le(image.byte(start + field::TRFC2_LOW), image.byte(start + field::TRFC2_HIGH)),
        0,
        tck_ps,
    );
    let trfc4 = mtb_cycles(
        decode_u16le(image.byte(start + field::TRFC4_LOW), image.byte(start + field::TRFC4_HIGH)),
        0,
        tck_ps,
    );
    let tfaw = mtb_cycles(
        decode_u12(image.byte(start + field::TFAW_HIGH), image.byte(start + field::TFAW_LOW)),
        0,
        tck_ps,
    );
    let trrd_s = mtb_cycles(image.byte(start + field::TRRD_S_MIN) as u32, 0, tck_ps);
    let trrd_l = mtb_cycles(image.byte(start + field::TRRD_L_MIN) as u32, 0, tck_ps);
    let twr = mtb_cycles(
        decode_u12(image.byte(start + field::TWR_HIGH), image.byte(start + field::TWR_LOW)),
        0,
        tck_ps,
    );

    let profile = XmpProfile {
        profile_num: id.number(),
        voltage,
        frequency,
        cl,
        trcd,
        trp,
        tras,
        trc: nonzero(trc),
        trfc1: nonzero(trfc1),
        trfc2: nonzero(trfc2),
        trfc4: nonzero(trfc4),
        tfaw: nonzero(tfaw),
        trrd_s: nonzero(trrd_s),
        trrd_l: nonzero(trrd_l),
        twr: nonzero(twr),
    };
    debug!(
        "XMP profile {}: {} @ {} MT/s, {:.3} V",
        id.number(),
        profile.timing_string(),
        profile.frequency,
        profile.voltage
    );
    Some(profile)
}

/// Ceiling cycle count for a one-byte MTB field with a signed fine offset.
fn ftb_field_cycles(
    image: &SpdImage,
    start: usize,
    mtb_off: usize,
    ftb_off: usize,
    tck_ps: i64,
) -> u16 {
    let mtb = image.byte(start + mtb_off);
    if mtb == 0 {
        return 0;
    }
    let time_ps = decode_time_ps(mtb, image.byte(start + ftb_off));
    cycles_from_ps(time_ps, tck_ps) as u16
}

/// Ceiling cycle count for a multi-byte MTB field.
fn mtb_cycles(mtb: u32, ftb: i64, tck_ps: i64) -> u16 {
    if mtb == 0 {
        return 0;
    }
    cycles_from_ps(mtb as i64 * MTB_PS + ftb, tck_ps) as u16
}

fn nonzero(v: u16) -> Option<u16> {
    if v > 0 {
        Some(v)
    } else {
        None
    }
}
