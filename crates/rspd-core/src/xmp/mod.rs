//! XMP 2.0 extension decoding and patch-based encoding
//!
//! The XMP region (bytes 384-511) carries up to two overclocking profiles.
//! Decoding yields an [`XmpDocument`]; editing goes the other way through
//! [`encode`], which never touches the image directly. It returns a list of
//! [`Patch`] byte writes so the caller can batch them into EEPROM page
//! writes and skip bytes that already hold the right value.

mod decoder;
mod encoder;
mod types;

pub use decoder::decode;
pub use encoder::{encode, EncodeOptions};
pub use types::{ChangedFields, EnabledProfiles, Patch, ProfileId, XmpDocument, XmpEdit, XmpProfile};
