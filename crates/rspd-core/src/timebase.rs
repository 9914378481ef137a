//! MTB/FTB timebase arithmetic
//!
//! DDR4 SPD encodes times as a medium timebase count (125 ps units) plus a
//! signed fine offset (1 ps units, two's-complement byte). All conversions
//! here are pure integer arithmetic so the crate stays exact (and `no_std`
//! clean - `core` has no float rounding).

use crate::tables::XMP_FREQUENCY_BINS;

/// Medium timebase unit in ps
pub const MTB_PS: i64 = 125;
/// Fine timebase unit in ps
pub const FTB_PS: i64 = 1;

/// Interpret a raw fine-offset byte as a signed two's-complement value.
pub fn signed_ftb(raw: u8) -> i64 {
    raw as i8 as i64
}

/// Decode an (MTB byte, signed FTB byte) pair to picoseconds.
pub fn decode_time_ps(mtb: u8, ftb_raw: u8) -> i64 {
    mtb as i64 * MTB_PS + signed_ftb(ftb_raw) * FTB_PS
}

/// Compose a 12-bit MTB count from a high nibble and a low byte.
pub fn decode_u12(high_nibble: u8, low: u8) -> u32 {
    (((high_nibble & 0x0F) as u32) << 8) | low as u32
}

/// Compose a 16-bit MTB count from little-endian bytes.
pub fn decode_u16le(low: u8, high: u8) -> u32 {
    ((high as u32) << 8) | low as u32
}

/// Convert a time to clock cycles, rounding up.
///
/// Defined as 0 when either input is not positive; used uniformly for every
/// XMP timing field so that minimal re-encoding round-trips (see
/// [`minimal_mtb_for_cycles`]).
pub fn cycles_from_ps(time_ps: i64, tck_ps: i64) -> u32 {
    if time_ps <= 0 || tck_ps <= 0 {
        return 0;
    }
    ((time_ps + tck_ps - 1) / tck_ps) as u32
}

/// Divide rounding half-up; 0 when either input is not positive.
pub fn div_round(num: i64, den: i64) -> u32 {
    if num <= 0 || den <= 0 {
        return 0;
    }
    ((2 * num + den) / (2 * den)) as u32
}

/// Smallest MTB count in `[0, max_mtb]` whose decoded time still rounds up
/// to `cycles` at the given clock.
///
/// Starts from the analytic lower bound `ceil(((cycles-1)*tck + 1) / 125)`
/// and adjusts by one in either direction until the ceiling matches. Using
/// the minimal encoding is what makes decode-edit-encode-decode a fixpoint:
/// any larger count that still ceils to `cycles` would drift upward on the
/// next edit of a dependent field.
pub fn minimal_mtb_for_cycles(cycles: u32, tck_ps: i64, max_mtb: u32) -> u32 {
    if cycles == 0 || tck_ps <= 0 {
        return 0;
    }
    let time_min_ps = (cycles as i64 - 1) * tck_ps + 1;
    let mut mtb = ((time_min_ps + MTB_PS - 1) / MTB_PS).clamp(0, max_mtb as i64) as u32;
    while mtb < max_mtb && cycles_from_ps(mtb as i64 * MTB_PS, tck_ps) < cycles {
        mtb += 1;
    }
    while mtb > 0 && cycles_from_ps((mtb as i64 - 1) * MTB_PS, tck_ps) == cycles {
        mtb -= 1;
    }
    mtb
}

/// Split a time into an (MTB count, raw FTB byte) pair.
///
/// The fine offset is kept in `0..MTB_PS`, so the encoded pair decodes back
/// to exactly `time_ps`. Times whose MTB count exceeds `max_mtb` saturate to
/// `(max_mtb, 0)`; non-positive times encode as `(0, 0)`.
pub fn encode_time_ps(time_ps: i64, max_mtb: u32) -> (u32, u8) {
    if time_ps <= 0 {
        return (0, 0);
    }
    let mtb = time_ps / MTB_PS;
    if mtb > max_mtb as i64 {
        return (max_mtb, 0);
    }
    let ftb = (time_ps - mtb * MTB_PS).min(127);
    (mtb as u32, ftb as u8)
}

/// Snap a decoded frequency to the nearest canonical XMP bin.
///
/// `freq_millis` is the raw frequency in thousandths of MT/s. Fine-offset
/// rounding noise in real images otherwise yields readings like 3597 MT/s
/// where reference tools report 3600; the 3 MT/s tolerance is pinned by the
/// regression suite and must not be changed.
pub fn snap_frequency_millis(freq_millis: i64) -> u32 {
    if freq_millis <= 0 {
        return 0;
    }
    let mut nearest = XMP_FREQUENCY_BINS[0];
    let mut best = i64::MAX;
    for &bin in XMP_FREQUENCY_BINS {
        let diff = (bin as i64 * 1000 - freq_millis).abs();
        if diff < best {
            best = diff;
            nearest = bin;
        }
    }
    if best <= 3000 {
        nearest
    } else {
        ((freq_millis + 500) / 1000) as u32
    }
}

/// Raw frequency of a clock period, in thousandths of MT/s.
pub fn frequency_millis(tck_ps: i64) -> i64 {
    if tck_ps <= 0 {
        return 0;
    }
    2_000_000_000 / tck_ps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_ftb() {
        assert_eq!(signed_ftb(0x00), 0);
        assert_eq!(signed_ftb(0x7F), 127);
        assert_eq!(signed_ftb(0x80), -128);
        assert_eq!(signed_ftb(0xF6), -10);
        assert_eq!(signed_ftb(0xC2), -62);
    }

    #[test]
    fn test_decode_time() {
        // 4 * 125 + 0x37 = 555 ps
        assert_eq!(decode_time_ps(4, 0x37), 555);
        // negative fine offset pulls below the MTB grid
        assert_eq!(decode_time_ps(8, 0xC2), 938);
    }

    #[test]
    fn test_composites() {
        assert_eq!(decode_u12(0x41 & 0x0F, 0x23), 0x123);
        assert_eq!(decode_u12(0xF1, 0x23), 0x123);
        assert_eq!(decode_u16le(0x30, 0x11), 0x1130);
    }

    #[test]
    fn test_cycles_from_ps() {
        assert_eq!(cycles_from_ps(10000, 625), 16);
        assert_eq!(cycles_from_ps(10001, 625), 17);
        assert_eq!(cycles_from_ps(0, 625), 0);
        assert_eq!(cycles_from_ps(10000, 0), 0);
        assert_eq!(cycles_from_ps(-5, 625), 0);
    }

    #[test]
    fn test_minimal_encoding_converges() {
        // For every (cycles, tck) the minimal encoding must decode back to
        // the same cycle count, and one MTB step lower must not.
        for &tck_ps in &[200i64, 556, 625, 682, 938, 1250, 2000] {
            for cycles in 1u32..200 {
                let mtb = minimal_mtb_for_cycles(cycles, tck_ps, 0xFFFF);
                assert_eq!(
                    cycles_from_ps(mtb as i64 * MTB_PS, tck_ps),
                    cycles,
                    "cycles={} tck={}",
                    cycles,
                    tck_ps
                );
                if mtb > 0 {
                    assert_ne!(
                        cycles_from_ps((mtb as i64 - 1) * MTB_PS, tck_ps),
                        cycles,
                        "encoding not minimal for cycles={} tck={}",
                        cycles,
                        tck_ps
                    );
                }
            }
        }
    }

    #[test]
    fn test_minimal_encoding_respects_clamp() {
        // Impossible targets saturate at the field maximum
        let mtb = minimal_mtb_for_cycles(5000, 625, 0xFF);
        assert_eq!(mtb, 0xFF);
    }

    #[test]
    fn test_encode_time_round_trips() {
        for time_ps in [1i64, 124, 125, 556, 10000, 11120, 40588] {
            let (mtb, ftb) = encode_time_ps(time_ps, 0xFFF);
            assert_eq!(mtb as i64 * MTB_PS + signed_ftb(ftb), time_ps);
        }
        assert_eq!(encode_time_ps(0, 0xFF), (0, 0));
        // 0x200 MTB units do not fit an 8-bit field
        assert_eq!(encode_time_ps(0x200 * 125, 0xFF), (0xFF, 0));
    }

    #[test]
    fn test_frequency_snapping() {
        // tCK = 556 ps -> 3597.1 MT/s, within 3 MT/s of the 3600 bin
        let raw = frequency_millis(556);
        assert_eq!(raw / 1000, 3597);
        assert_eq!(snap_frequency_millis(raw), 3600);
        // tCK = 500 ps -> exactly 4000
        assert_eq!(snap_frequency_millis(frequency_millis(500)), 4000);
        // Far from any bin: rounded raw value survives
        assert_eq!(snap_frequency_millis(3100_000), 3100);
        assert_eq!(snap_frequency_millis(0), 0);
    }
}
