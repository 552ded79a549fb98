#![forbid(unsafe_code)]

//! Headerless formats: the raw RGB pixel dump, and raw palette files.
//!
//! A raw palette is just 256 `[r, g, b]` entries. The Adobe color table (ACT)
//! variant is the same thing, sometimes with 4 more bytes after: a `u16`
//! big-endian count of the entries actually used, and a `u16` transparent
//! index (which this crate ignores).

use alloc::vec::Vec;

use crate::{image::palette_from_rgb_bytes, Bitmap, CodecError, Palette};

/// Byte length of a raw palette.
pub const RAW_PALETTE_LEN: usize = 256 * 3;

/// Reads a raw or ACT palette.
///
/// Gives the palette and how many entries of it are used. That's 256 unless an
/// ACT trailer says otherwise.
///
/// ## Failure
/// * [`UnexpectedEof`](CodecError::UnexpectedEof) if there's less than a full
///   palette.
pub fn palette_from_raw_bytes(bytes: &[u8]) -> Result<(Palette, usize), CodecError> {
  let rgb = bytes.get(..RAW_PALETTE_LEN).ok_or(CodecError::UnexpectedEof)?;
  let count = match bytes.get(RAW_PALETTE_LEN..RAW_PALETTE_LEN + 2) {
    Some(&[hi, lo]) => match u16::from_be_bytes([hi, lo]) {
      0 | 257.. => 256,
      n => usize::from(n),
    },
    _ => 256,
  };
  Ok((palette_from_rgb_bytes(rgb), count))
}

impl Bitmap {
  /// Encodes the bitmap as tightly packed `[r, g, b]` bytes, top row first,
  /// with no header. Alpha is dropped.
  pub fn to_raw_rgb_bytes(&self) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    out.try_reserve_exact(self.pixels.len() * 3)?;
    for p in self.pixels.iter() {
      out.extend_from_slice(&[p.r, p.g, p.b]);
    }
    Ok(out)
  }
}

#[test]
fn test_act_trailer_count() {
  use alloc::vec;
  let mut bytes = vec![0_u8; RAW_PALETTE_LEN];
  bytes[3] = 9;
  let (palette, count) = palette_from_raw_bytes(&bytes).unwrap();
  assert_eq!((palette[1].r, count), (9, 256));
  bytes.extend_from_slice(&[0x00, 0x10, 0xFF, 0xFF]);
  assert_eq!(palette_from_raw_bytes(&bytes).unwrap().1, 16);
  bytes[RAW_PALETTE_LEN + 1] = 0;
  assert_eq!(palette_from_raw_bytes(&bytes).unwrap().1, 256);
  assert_eq!(palette_from_raw_bytes(&bytes[..700]), Err(CodecError::UnexpectedEof));
}
