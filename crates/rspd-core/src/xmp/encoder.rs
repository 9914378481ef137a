//! Patch-based XMP profile encoding
//!
//! All writes are staged against a snapshot and emitted as a deduplicated,
//! offset-ordered patch list. Bytes that already hold the target value are
//! dropped at emit time, so re-applying an edit is a no-op and EEPROM wear
//! stays bounded by what actually changed.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use log::debug;

use super::types::{ChangedFields, Patch, ProfileId, XmpEdit};
use crate::error::{Error, Result};
use crate::layout::xmp::{self, field};
use crate::spd::SpdImage;
use crate::tables::clamp;
use crate::timebase::{decode_time_ps, encode_time_ps, minimal_mtb_for_cycles};

/// Knobs for [`encode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Create the profile (and the XMP header if absent) instead of editing
    /// an existing one
    pub new_profile: bool,
    /// Allow writes to tCCD_L/tWTR_S/tWTR_L. These bytes are not part of
    /// the profile layout every reference decoder agrees on, so they are
    /// opt-in and only written when explicitly changed.
    pub write_experimental: bool,
}

/// Staged writes over an immutable snapshot.
///
/// Reads see staged values first, which matters when profile 1 is copied as
/// the template for a new profile 2 and then partially overwritten.
struct Stage<'a> {
    image: &'a SpdImage,
    writes: BTreeMap<usize, u8>,
}

impl<'a> Stage<'a> {
    fn new(image: &'a SpdImage) -> Self {
        Self {
            image,
            writes: BTreeMap::new(),
        }
    }

    fn get(&self, offset: usize) -> u8 {
        match self.writes.get(&offset) {
            Some(&v) => v,
            None => self.image.byte(offset),
        }
    }

    fn set(&mut self, offset: usize, value: u8) {
        self.writes.insert(offset, value);
    }

    fn into_patches(self) -> Vec<Patch> {
        self.writes
            .into_iter()
            .filter(|&(offset, value)| self.image.byte(offset) != value)
            .map(|(offset, value)| Patch {
                offset: offset as u16,
                value,
            })
            .collect()
    }
}

/// Encode a profile edit as a patch list against `image`.
///
/// With `new_profile` unset this edits an existing profile: the image must
/// carry the XMP signature and the target slot must be enabled. An edit
/// with an empty change set yields an empty patch list.
///
/// Untouched fields keep their stored bytes. A frequency change re-encodes
/// every timing at the new clock so the cycle counts the user sees stay
/// put.
pub fn encode(
    image: &SpdImage,
    id: ProfileId,
    edit: &XmpEdit,
    opts: EncodeOptions,
) -> Result<Vec<Patch>> {
    if !opts.new_profile && edit.changed.is_empty() {
        return Ok(Vec::new());
    }

    if !opts.new_profile {
        if image.byte(xmp::HEADER) != xmp::MAGIC0 || image.byte(xmp::HEADER + 1) != xmp::MAGIC1 {
            return Err(Error::XmpNotPresent);
        }
        let voltage_byte = image.byte(id.offset() + field::VDD_VOLTAGE);
        if voltage_byte == 0x00 || voltage_byte == 0xFF || voltage_byte & 0x80 == 0 {
            return Err(Error::ProfileNotPresent);
        }
    }

    let mut stage = Stage::new(image);
    let is_new = opts.new_profile;
    let changed = edit.changed;
    let start = id.offset();

    if is_new && stage.get(xmp::HEADER) != xmp::MAGIC0 {
        stage.set(xmp::HEADER, xmp::MAGIC0);
        stage.set(xmp::HEADER + 1, xmp::MAGIC1);
        stage.set(xmp::REVISION, xmp::DEFAULT_REVISION);
    }

    // A new profile 2 starts as a copy of profile 1 when one exists, so
    // bytes this encoder does not model carry over instead of staying zero.
    if is_new && id == ProfileId::Two {
        let p1_voltage = stage.get(xmp::PROFILE1);
        if p1_voltage & 0x80 != 0 && p1_voltage != 0x00 && p1_voltage != 0xFF {
            for i in 0..xmp::PROFILE_LEN {
                let b = stage.get(xmp::PROFILE1 + i);
                stage.set(xmp::PROFILE2 + i, b);
            }
        }
    }

    let frequency = clamp_range(edit.frequency.max(1), clamp::FREQUENCY) as i64;
    let frequency_changed = is_new || changed.contains(ChangedFields::FREQUENCY);

    // Prefer the stored tCK when the frequency itself was not touched, so
    // snapping and integer rounding cannot drift other fields.
    let current_tck_ps = decode_time_ps(
        stage.get(start + field::TCK_MTB),
        stage.get(start + field::TCK_FTB),
    );
    let tck_ps = if frequency_changed || current_tck_ps <= 0 {
        nearest_tck_ps(frequency)
    } else {
        current_tck_ps
    };

    if frequency_changed {
        let mtb = tck_ps / 125;
        let ftb = tck_ps - mtb * 125;
        stage.set(start + field::TCK_MTB, mtb as u8);
        stage.set(start + field::TCK_FTB, ftb as u8);
    }

    if is_new || changed.contains(ChangedFields::VOLTAGE) {
        // Code 0x7F would encode as byte 0xFF, which the decoder treats as a
        // blank (disabled) slot, so the usable ceiling is 0x7E (2.26 V).
        let code = (((edit.voltage - 1.0) * 100.0 + 0.5) as i32).clamp(0, 0x7E);
        stage.set(start + field::VDD_VOLTAGE, 0x80 | code as u8);
    }

    let cl = clamp_range(edit.cl, clamp::CL);
    let trcd = clamp_range(edit.trcd, clamp::TRCD);
    let trp = clamp_range(edit.trp, clamp::TRP);
    let tras = clamp_range(edit.tras, clamp::TRAS);
    let trc_input = clamp_range(edit.trc, clamp::TRC);

    // Primary timings carry an exact fine offset so cycles * tCK decodes
    // back to the same count regardless of the clock
    if frequency_changed || changed.contains(ChangedFields::CL) {
        let (mtb, ftb) = encode_time_ps(cl as i64 * tck_ps, 0xFF);
        stage.set(start + field::TAA_MTB, mtb as u8);
        stage.set(start + field::TAA_FTB, ftb);
    }
    if frequency_changed || changed.contains(ChangedFields::TRCD) {
        let (mtb, ftb) = encode_time_ps(trcd as i64 * tck_ps, 0xFF);
        stage.set(start + field::TRCD_MTB, mtb as u8);
        stage.set(start + field::TRCD_FTB, ftb);
    }
    if frequency_changed || changed.contains(ChangedFields::TRP) {
        let (mtb, ftb) = encode_time_ps(trp as i64 * tck_ps, 0xFF);
        stage.set(start + field::TRP_MTB, mtb as u8);
        stage.set(start + field::TRP_FTB, ftb);
    }

    // tRAS has no fine offset; it shares its high-nibble byte with tRC
    let tras_mtb = ((tras as i64 * tck_ps / 125) as u32).min(0xFFF);
    let tras_upper = ((tras_mtb >> 8) & 0x0F) as u8;

    let should_write_tras = is_new || frequency_changed || changed.contains(ChangedFields::TRAS);
    let should_write_trc = is_new || frequency_changed || changed.contains(ChangedFields::TRC);

    // tRC 0 keeps the stored bytes on an existing profile; a new profile
    // gets the tRAS + tRP fallback so decoders that require tRC stay happy
    if should_write_trc && (trc_input > 0 || is_new) {
        let trc_cycles = if trc_input > 0 {
            trc_input
        } else {
            tras + trp
        };
        let (trc_mtb, trc_ftb) = encode_time_ps(trc_cycles as i64 * tck_ps, 0xFFF);
        let trc_upper = ((trc_mtb >> 8) & 0x0F) as u8;
        stage.set(start + field::TRAS_TRC_HIGH, (trc_upper << 4) | tras_upper);
        stage.set(start + field::TRC_LOW, (trc_mtb & 0xFF) as u8);
        stage.set(start + field::TRC_FTB, trc_ftb);
    } else if should_write_tras {
        let existing = stage.get(start + field::TRAS_TRC_HIGH);
        stage.set(start + field::TRAS_TRC_HIGH, (existing & 0xF0) | tras_upper);
    }
    if should_write_tras {
        stage.set(start + field::TRAS_LOW, (tras_mtb & 0xFF) as u8);
    }

    // Mark the chosen CL as supported without clearing other bits
    if is_new || frequency_changed || changed.contains(ChangedFields::CL) {
        let cl_bit = cl as i32 - 7;
        if (0..24).contains(&cl_bit) {
            let off = start + field::CAS_LATENCIES + (cl_bit / 8) as usize;
            let mask = 1u8 << (cl_bit % 8);
            let b = stage.get(off);
            stage.set(off, b | mask);
        }
    }

    // Advanced timings use the minimal MTB encoding; 0 keeps the stored
    // bytes on existing profiles and stays 0 on new ones
    let force = |bit: ChangedFields| is_new || frequency_changed || changed.contains(bit);

    write_u16(
        &mut stage, start, field::TRFC1_LOW, field::TRFC1_HIGH,
        clamp_range(edit.trfc1, clamp::TRFC), tck_ps, is_new,
        force(ChangedFields::TRFC1),
    );
    write_u16(
        &mut stage, start, field::TRFC2_LOW, field::TRFC2_HIGH,
        clamp_range(edit.trfc2, clamp::TRFC), tck_ps, is_new,
        force(ChangedFields::TRFC2),
    );
    write_u16(
        &mut stage, start, field::TRFC4_LOW, field::TRFC4_HIGH,
        clamp_range(edit.trfc4, clamp::TRFC), tck_ps, is_new,
        force(ChangedFields::TRFC4),
    );
    write_u12(
        &mut stage, start, field::TFAW_HIGH, field::TFAW_LOW,
        clamp_range(edit.tfaw, clamp::TFAW), tck_ps, is_new,
        force(ChangedFields::TFAW),
    );
    write_u8(
        &mut stage, start, field::TRRD_S_MIN,
        clamp_range(edit.trrd_s, clamp::TRRD_S), tck_ps, is_new,
        force(ChangedFields::TRRD_S),
    );
    write_u8(
        &mut stage, start, field::TRRD_L_MIN,
        clamp_range(edit.trrd_l, clamp::TRRD_L), tck_ps, is_new,
        force(ChangedFields::TRRD_L),
    );

    if opts.write_experimental {
        write_u8(
            &mut stage, start, field::TCCD_L_MIN,
            clamp_range(edit.tccd_l, clamp::TCCD_L), tck_ps, is_new,
            changed.contains(ChangedFields::TCCD_L),
        );
        write_u8(
            &mut stage, start, field::TWTR_S_MIN,
            clamp_range(edit.twtr_s, clamp::TWTR_S), tck_ps, is_new,
            changed.contains(ChangedFields::TWTR_S),
        );
        write_u8(
            &mut stage, start, field::TWTR_L_MIN,
            clamp_range(edit.twtr_l, clamp::TWTR_L), tck_ps, is_new,
            changed.contains(ChangedFields::TWTR_L),
        );
    }

    write_u12(
        &mut stage, start, field::TWR_HIGH, field::TWR_LOW,
        clamp_range(edit.twr, clamp::TWR), tck_ps, is_new,
        force(ChangedFields::TWR),
    );

    let enabled = stage.get(xmp::PROFILE_ENABLED);
    stage.set(xmp::PROFILE_ENABLED, enabled | id.bit().bits());

    let patches = stage.into_patches();
    debug!(
        "encoded XMP profile {} edit: {} byte(s) to write",
        id.number(),
        patches.len()
    );
    Ok(patches)
}

/// Integer tCK in ps whose exact data rate lands closest to `freq` MT/s.
fn nearest_tck_ps(freq: i64) -> i64 {
    let floor = (2_000_000 / freq).max(1);
    let ceil = if 2_000_000 % freq == 0 {
        floor
    } else {
        floor + 1
    };
    // err(ps) = |2e6/ps - freq| compared via cross-multiplication
    let err_floor = (2_000_000 - freq * floor).abs() * ceil;
    let err_ceil = (2_000_000 - freq * ceil).abs() * floor;
    if err_floor <= err_ceil {
        floor
    } else {
        ceil
    }
}

fn clamp_range<T: Ord + Copy>(v: T, (lo, hi): (T, T)) -> T {
    v.clamp(lo, hi)
}

fn write_u8(
    stage: &mut Stage<'_>,
    start: usize,
    rel: usize,
    cycles: u16,
    tck_ps: i64,
    is_new: bool,
    force: bool,
) {
    if !force || (cycles == 0 && !is_new) {
        return;
    }
    let mtb = minimal_mtb_for_cycles(cycles as u32, tck_ps, 0xFF);
    stage.set(start + rel, mtb as u8);
}

fn write_u12(
    stage: &mut Stage<'_>,
    start: usize,
    rel_high: usize,
    rel_low: usize,
    cycles: u16,
    tck_ps: i64,
    is_new: bool,
    force: bool,
) {
    if !force || (cycles == 0 && !is_new) {
        return;
    }
    let mtb = minimal_mtb_for_cycles(cycles as u32, tck_ps, 0xFFF);
    // The high nibble lives in a shared byte; the neighbor nibble is kept
    let existing = stage.get(start + rel_high);
    stage.set(start + rel_high, (existing & 0xF0) | ((mtb >> 8) & 0x0F) as u8);
    stage.set(start + rel_low, (mtb & 0xFF) as u8);
}

fn write_u16(
    stage: &mut Stage<'_>,
    start: usize,
    rel_low: usize,
    rel_high: usize,
    cycles: u16,
    tck_ps: i64,
    is_new: bool,
    force: bool,
) {
    if !force || (cycles == 0 && !is_new) {
        return;
    }
    let mtb = minimal_mtb_for_cycles(cycles as u32, tck_ps, 0xFFFF);
    stage.set(start + rel_low, (mtb & 0xFF) as u8);
    stage.set(start + rel_high, ((mtb >> 8) & 0xFF) as u8);
}
