//! rspd-core - DDR4 SPD / XMP decoding and patching library
//!
//! This crate turns a raw 512-byte DDR4 Serial Presence Detect (SPD) image
//! into structured, physically meaningful values (capacity, organization,
//! timings, manufacturer identity, XMP overclocking profiles), and back:
//! given user-edited profile values it computes a minimal list of byte
//! patches that re-decode to exactly the edited values.
//!
//! The crate is `no_std` compatible (requires `alloc`). Decoding is a pure
//! function of the input bytes; every call takes its own snapshot and no
//! state is retained between calls, so the API is safe to use from multiple
//! threads.
//!
//! # Features
//!
//! - `std` - Enable standard library support and serde derives on the
//!   public value types (default)
//!
//! # Example
//!
//! ```ignore
//! use rspd_core::SpdImage;
//!
//! let image = SpdImage::new(&raw_bytes);
//! if image.is_valid() {
//!     let cap = image.capacity();
//!     println!("{} ({})", cap.capacity_str, cap.organization);
//!     for profile in rspd_core::xmp::decode(&image).profiles {
//!         println!("XMP {} MT/s {}", profile.frequency, profile.timing_string());
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

pub mod error;
pub mod layout;
pub mod spd;
pub mod tables;
pub mod timebase;
pub mod validate;
pub mod xmp;

pub use error::{Error, Result};
pub use spd::SpdImage;
pub use xmp::Patch;
