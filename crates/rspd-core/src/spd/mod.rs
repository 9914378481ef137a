//! SPD image snapshot and base-region decoding
//!
//! [`SpdImage`] owns a fixed 512-byte copy of the EEPROM contents. Decoding
//! is pure and infallible: short input is zero-padded, long input truncated,
//! and every accessor degrades to a documented fallback instead of erroring.
//! Images read from hardware regularly carry garbage in individual fields;
//! one bad byte must not take down the rest of the decode.

mod decoder;
mod types;

pub use types::{
    AddressingInfo, BankConfig, CapacityInfo, DieInfo, DramIdentity, EccInfo, ManufacturerId,
    TimingSet,
};

use crate::layout::SPD_SIZE;
use crate::xmp::Patch;

/// An owned snapshot of a DDR4 SPD EEPROM image.
///
/// The snapshot never aliases caller memory, so decode results stay coherent
/// even if the source buffer is refreshed from hardware mid-session.
#[derive(Clone)]
pub struct SpdImage {
    data: [u8; SPD_SIZE],
    source_len: usize,
}

impl SpdImage {
    /// Snapshot `raw` into a fixed 512-byte image.
    ///
    /// Short input is zero-padded; input beyond 512 bytes is ignored. The
    /// original length is kept for the validity check, which requires at
    /// least the first 256 bytes to have been present.
    pub fn new(raw: &[u8]) -> Self {
        let mut data = [0u8; SPD_SIZE];
        let n = raw.len().min(SPD_SIZE);
        data[..n].copy_from_slice(&raw[..n]);
        Self {
            data,
            source_len: raw.len(),
        }
    }

    /// Read one byte by absolute offset. Out-of-range offsets read as 0.
    pub fn byte(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(0)
    }

    /// The full 512-byte image.
    pub fn as_bytes(&self) -> &[u8; SPD_SIZE] {
        &self.data
    }

    /// Length of the buffer this snapshot was taken from.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Apply a patch list in place. Out-of-range offsets are ignored.
    pub fn apply(&mut self, patches: &[Patch]) {
        for p in patches {
            if (p.offset as usize) < SPD_SIZE {
                self.data[p.offset as usize] = p.value;
            }
        }
    }
}

impl core::fmt::Debug for SpdImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpdImage")
            .field("source_len", &self.source_len)
            .field("dram_type", &self.byte(crate::layout::base::DRAM_TYPE))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_is_padded() {
        let img = SpdImage::new(&[0xAA; 100]);
        assert_eq!(img.byte(99), 0xAA);
        assert_eq!(img.byte(100), 0);
        assert_eq!(img.byte(511), 0);
        assert_eq!(img.source_len(), 100);
    }

    #[test]
    fn test_long_input_is_truncated() {
        let img = SpdImage::new(&[0x55; 600]);
        assert_eq!(img.byte(511), 0x55);
        assert_eq!(img.source_len(), 600);
    }

    #[test]
    fn test_out_of_range_read_is_zero() {
        let img = SpdImage::new(&[0xFF; 512]);
        assert_eq!(img.byte(512), 0);
        assert_eq!(img.byte(usize::MAX), 0);
    }

    #[test]
    fn test_apply_patches() {
        let mut img = SpdImage::new(&[0; 512]);
        img.apply(&[
            Patch { offset: 3, value: 0x02 },
            Patch { offset: 511, value: 0xEE },
            Patch { offset: 600, value: 0xFF },
        ]);
        assert_eq!(img.byte(3), 0x02);
        assert_eq!(img.byte(511), 0xEE);
    }
}
