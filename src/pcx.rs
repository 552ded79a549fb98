//! Module for ZSoft PCX files.
//!
//! Only the 256 color variant is handled: 8 bits per pixel, a single plane,
//! version 5 or later.
//!
//! * The file starts with a 128 byte header ([`PcxHeader`]). All multi-byte
//!   values are little-endian.
//! * Next is the image data, one run-length encoded scanline after another
//!   (see [`pcx_rle_unpack`]). Each scanline is `bytes_per_line` bytes once
//!   unpacked, which can be more than the image width.
//! * The last 769 bytes of the file are the palette: a `0x0C` marker byte then
//!   256 `[r, g, b]` entries.

use alloc::vec::Vec;
use bytemuck::{Pod, Zeroable};
use pack1::U16LE;

use crate::{
  image::{palette_from_rgb_bytes, try_vec_filled},
  logging::trace,
  rle::{pcx_rle_pack_row, pcx_rle_unpack},
  Bitmap, ByteSource, CodecError, DecodeOptions, Palette, Palmap,
};

/// The byte before the palette at the end of the file.
pub const PCX_PALETTE_MARKER: u8 = 0x0C;
/// Length of the palette trailer, including the marker byte.
pub const PCX_PALETTE_TRAILER_LEN: usize = 1 + 256 * 3;

/// The fixed 128 byte header at the start of every PCX file.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct PcxHeader {
  /// Always `0x0A`.
  pub manufacturer: u8,
  pub version: u8,
  /// 1 is RLE, the only encoding there is.
  pub encoding: u8,
  pub bits_per_pixel: u8,
  pub x_min: U16LE,
  pub y_min: U16LE,
  pub x_max: U16LE,
  pub y_max: U16LE,
  pub h_dpi: U16LE,
  pub v_dpi: U16LE,
  pub ega_palette: [u8; 48],
  pub reserved: u8,
  pub num_planes: u8,
  pub bytes_per_line: U16LE,
  pub palette_info: U16LE,
  pub h_screen_size: U16LE,
  pub v_screen_size: U16LE,
  pub filler: [u8; 54],
}
impl Default for PcxHeader {
  #[inline]
  fn default() -> Self {
    Self::zeroed()
  }
}
impl PcxHeader {
  /// Checks that this is a header this crate can decode.
  ///
  /// Gives the width, height, and bytes per line.
  pub fn check_decodable(&self) -> Result<(u32, u32, usize), CodecError> {
    if self.manufacturer != 0x0A {
      return Err(CodecError::BadHeader("PCX manufacturer byte"));
    }
    if self.version < 5 {
      return Err(CodecError::Unsupported("PCX version before 5"));
    }
    if self.encoding != 1 {
      return Err(CodecError::Unsupported("PCX encoding other than RLE"));
    }
    if self.bits_per_pixel != 8 || self.num_planes != 1 {
      return Err(CodecError::Unsupported("PCX other than 8-bit single plane"));
    }
    let (x_min, x_max) = (self.x_min.get(), self.x_max.get());
    let (y_min, y_max) = (self.y_min.get(), self.y_max.get());
    if x_max < x_min || y_max < y_min {
      return Err(CodecError::BadHeader("PCX window"));
    }
    let width = u32::from(x_max - x_min) + 1;
    let height = u32::from(y_max - y_min) + 1;
    let bytes_per_line = usize::from(self.bytes_per_line.get());
    if bytes_per_line < width as usize {
      return Err(CodecError::BadHeader("PCX bytes per line less than width"));
    }
    Ok((width, height, bytes_per_line))
  }
}

/// Reads the palette trailer at the end of a PCX file.
///
/// ## Failure
/// * [`MissingPalette`](CodecError::MissingPalette) if the file is too short
///   or the marker byte isn't there.
#[inline]
pub fn pcx_read_palette(bytes: &[u8]) -> Result<Palette, CodecError> {
  let trailer_start =
    bytes.len().checked_sub(PCX_PALETTE_TRAILER_LEN).ok_or(CodecError::MissingPalette)?;
  match &bytes[trailer_start..] {
    [PCX_PALETTE_MARKER, rgb @ ..] => Ok(palette_from_rgb_bytes(rgb)),
    _ => Err(CodecError::MissingPalette),
  }
}

impl Palmap {
  /// Attempts to parse the bytes of a PCX file into an indexed image.
  #[inline]
  pub fn try_from_pcx_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    Self::try_from_pcx_bytes_with(bytes, &DecodeOptions::default())
  }

  /// As [`try_from_pcx_bytes`](Self::try_from_pcx_bytes), with options.
  pub fn try_from_pcx_bytes_with(
    bytes: &[u8], options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    let mut src = ByteSource::new(bytes);
    let header: PcxHeader = src.read_pod()?;
    trace!("PCX header: {header:?}");
    let (width, height, bytes_per_line) = header.check_decodable()?;

    let palette = pcx_read_palette(bytes)?;
    let body_end = bytes.len() - PCX_PALETTE_TRAILER_LEN;
    if body_end < src.position() {
      return Err(CodecError::MissingPalette);
    }
    let mut body = src.take(body_end - src.position())?;
    options.check_dimensions(width, height)?;
    // a run is two bytes and covers at most 63
    let least_line = 2 * ((bytes_per_line + 62) / 63);
    if body.remaining() / least_line.max(1) < height as usize {
      return Err(CodecError::UnexpectedEof);
    }

    let mut palmap = Palmap::try_new(width, height, options)?;
    palmap.palette = palette;
    let mut line = try_vec_filled(bytes_per_line, 0_u8)?;
    for row in palmap.indexes.chunks_exact_mut(width as usize) {
      pcx_rle_unpack(&mut body, &mut line, 1, bytes_per_line, 1)?;
      row.copy_from_slice(&line[..row.len()]);
    }
    Ok(palmap)
  }

  /// Encodes the image as an 8-bit PCX file.
  ///
  /// Scanlines are padded to an even number of bytes, and the palette trailer
  /// is always written.
  ///
  /// ## Failure
  /// * Either dimension is more than `u16::MAX`.
  /// * Allocation failure.
  pub fn to_pcx_bytes(&self) -> Result<Vec<u8>, CodecError> {
    const TOO_BIG: CodecError = CodecError::Unsupported("PCX dimensions are limited to 65535");
    let x_max = u16::try_from(self.width.saturating_sub(1)).map_err(|_| TOO_BIG)?;
    let y_max = u16::try_from(self.height.saturating_sub(1)).map_err(|_| TOO_BIG)?;
    let bytes_per_line = u16::try_from(self.width.saturating_add(1) & !1).map_err(|_| TOO_BIG)?;
    let header = PcxHeader {
      manufacturer: 0x0A,
      version: 5,
      encoding: 1,
      bits_per_pixel: 8,
      x_max: x_max.into(),
      y_max: y_max.into(),
      h_dpi: U16LE::from(72_u16),
      v_dpi: U16LE::from(72_u16),
      num_planes: 1,
      bytes_per_line: bytes_per_line.into(),
      palette_info: U16LE::from(1_u16),
      ..PcxHeader::default()
    };

    let mut out = Vec::new();
    out.try_reserve(core::mem::size_of::<PcxHeader>() + PCX_PALETTE_TRAILER_LEN)?;
    out.extend_from_slice(bytemuck::bytes_of(&header));
    for row in self.indexes.chunks_exact(self.width.max(1) as usize) {
      pcx_rle_pack_row(row, &mut out)?;
      if row.len() % 2 != 0 {
        out.extend_from_slice(&[0xC1, 0x00]);
      }
    }
    out.try_reserve(PCX_PALETTE_TRAILER_LEN)?;
    out.push(PCX_PALETTE_MARKER);
    for c in self.palette.iter() {
      out.extend_from_slice(&[c.r, c.g, c.b]);
    }
    Ok(out)
  }
}

impl Bitmap {
  /// Attempts to parse the bytes of a PCX file into a bitmap.
  ///
  /// Every index is looked up in the palette, so the output is always opaque.
  #[inline]
  pub fn try_from_pcx_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    Self::try_from_pcx_bytes_with(bytes, &DecodeOptions::default())
  }

  /// As [`try_from_pcx_bytes`](Self::try_from_pcx_bytes), with options.
  #[inline]
  pub fn try_from_pcx_bytes_with(
    bytes: &[u8], options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    Palmap::try_from_pcx_bytes_with(bytes, options)?.try_to_bitmap()
  }
}

#[test]
fn test_pcx_header_is_128_bytes() {
  assert_eq!(core::mem::size_of::<PcxHeader>(), 128);
  assert_eq!(core::mem::offset_of!(PcxHeader, num_planes), 65);
  assert_eq!(core::mem::offset_of!(PcxHeader, bytes_per_line), 66);
}

#[test]
fn test_pcx_odd_width_is_padded() {
  let mut palmap = Palmap::try_new(3, 2, &DecodeOptions::default()).unwrap();
  palmap.indexes.copy_from_slice(&[1, 1, 1, 2, 3, 4]);
  palmap.palette[4].g = 0x80;
  let bytes = palmap.to_pcx_bytes().unwrap();
  assert_eq!(&bytes[66..68], &[4, 0]);
  assert_eq!(&bytes[128..133], &[0xC3, 1, 0xC1, 0x00, 2]);
  assert_eq!(bytes[bytes.len() - PCX_PALETTE_TRAILER_LEN], PCX_PALETTE_MARKER);
  assert_eq!(Palmap::try_from_pcx_bytes(&bytes), Ok(palmap));
}

#[test]
fn test_pcx_without_trailer_is_missing_palette() {
  let mut palmap = Palmap::try_new(2, 2, &DecodeOptions::default()).unwrap();
  palmap.indexes[3] = 9;
  let mut bytes = palmap.to_pcx_bytes().unwrap();
  let marker = bytes.len() - PCX_PALETTE_TRAILER_LEN;
  bytes[marker] = 0;
  assert_eq!(Palmap::try_from_pcx_bytes(&bytes), Err(CodecError::MissingPalette));
  bytes.truncate(200);
  assert_eq!(Palmap::try_from_pcx_bytes(&bytes), Err(CodecError::MissingPalette));
}
