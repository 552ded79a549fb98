//! Module for Truevision TGA files.
//!
//! Note: All multi-byte values in TGA are little-endian encoded.
//!
//! * The file starts with an 18 byte header ([`TgaHeader`]).
//! * Next is an optional image ID field, the length of which is given in the
//!   header. This crate skips it.
//! * Next there **might** be a color map. This crate doesn't decode
//!   color-mapped images, so any file with a color map is rejected.
//! * Next is the pixel data. Each pixel is `[b, g, r]` (24 bpp) or
//!   `[b, g, r, a]` (32 bpp). Image type 2 stores these raw, image type 10
//!   stores them with run-length packets (see
//!   [`tga_rle_unpack`](crate::rle::tga_rle_unpack)).
//! * Rows normally go from the bottom of the image to the top. Bit 5 of the
//!   image descriptor flips that to top to bottom.
//!
//! The encoder always writes uncompressed 32 bpp data with bottom-up rows.

use alloc::vec::Vec;
use bytemuck::{Pod, Zeroable};
use pack1::U16LE;

use crate::{
  image::try_vec_filled, logging::trace, r8g8b8a8_Srgb, rle::tga_rle_unpack,
  Bitmap, ByteSource, CodecError, DecodeOptions,
};

/// Uncompressed true-color image.
pub const TGA_TYPE_RAW: u8 = 2;
/// Run-length encoded true-color image.
pub const TGA_TYPE_RLE: u8 = 10;

/// Image descriptor bit: rows go top to bottom.
pub const TGA_DESCRIPTOR_TOP_TO_BOTTOM: u8 = 0b0010_0000;
/// Image descriptor bits: the old two/four way interleave setting.
pub const TGA_DESCRIPTOR_INTERLEAVE: u8 = 0b1100_0000;

/// The fixed 18 byte header at the start of every TGA file.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct TgaHeader {
  pub id_length: u8,
  pub color_map_type: u8,
  pub image_type: u8,
  pub color_map_first: U16LE,
  pub color_map_length: U16LE,
  pub color_map_entry_bits: u8,
  pub x_origin: U16LE,
  pub y_origin: U16LE,
  pub width: U16LE,
  pub height: U16LE,
  pub bits_per_pixel: u8,
  /// * Bits 0-3: alpha bits per pixel
  /// * Bit 5: top-to-bottom row order
  /// * Bits 6-7: interleave
  pub descriptor: u8,
}
impl Default for TgaHeader {
  #[inline]
  fn default() -> Self {
    Self::zeroed()
  }
}
impl TgaHeader {
  /// Checks that this is a header this crate can decode.
  ///
  /// Gives if the image data is run-length encoded, and the bytes per pixel.
  #[inline]
  pub fn check_decodable(&self) -> Result<(bool, usize), CodecError> {
    if self.color_map_type != 0 {
      return Err(CodecError::Unsupported("color-mapped TGA"));
    }
    if (self.descriptor & TGA_DESCRIPTOR_INTERLEAVE) != 0 {
      return Err(CodecError::Unsupported("interleaved TGA"));
    }
    let compressed = match self.image_type {
      TGA_TYPE_RAW => false,
      TGA_TYPE_RLE => true,
      _ => return Err(CodecError::Unsupported("TGA image type other than 2 or 10")),
    };
    let bytes_per_pixel = match self.bits_per_pixel {
      24 => 3,
      32 => 4,
      _ => return Err(CodecError::Unsupported("TGA bit depth other than 24 or 32")),
    };
    Ok((compressed, bytes_per_pixel))
  }
}

impl Bitmap {
  /// Attempts to parse the bytes of a TGA file into a bitmap.
  ///
  /// 32 bpp images set `has_alpha`.
  #[inline]
  pub fn try_from_tga_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    Self::try_from_tga_bytes_with(bytes, &DecodeOptions::default())
  }

  /// As [`try_from_tga_bytes`](Self::try_from_tga_bytes), with options.
  pub fn try_from_tga_bytes_with(
    bytes: &[u8], options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    let mut src = ByteSource::new(bytes);
    let header: TgaHeader = src.read_pod()?;
    trace!("TGA header: {header:?}");
    let (compressed, bytes_per_pixel) = header.check_decodable()?;
    src.skip(usize::from(header.id_length))?;

    let width = u32::from(header.width.get());
    let height = u32::from(header.height.get());
    options.check_dimensions(width, height)?;
    let pixel_count = width as usize * height as usize;
    // a run packet is one control byte and one pixel, covering up to 128
    let least_input = if compressed {
      ((pixel_count + 127) / 128) * (1 + bytes_per_pixel)
    } else {
      pixel_count * bytes_per_pixel
    };
    if src.remaining() < least_input {
      return Err(CodecError::UnexpectedEof);
    }
    let mut bitmap = Bitmap::try_new(width, height, r8g8b8a8_Srgb::default(), options)?;

    let unpacked: Vec<u8>;
    let data: &[u8] = if compressed {
      let mut v = try_vec_filled(pixel_count * bytes_per_pixel, 0_u8)?;
      tga_rle_unpack(&mut src, &mut v, bytes_per_pixel, pixel_count)?;
      unpacked = v;
      &unpacked
    } else {
      src.read_slice(pixel_count * bytes_per_pixel)?
    };

    for (pixel, stored) in bitmap.pixels.iter_mut().zip(data.chunks_exact(bytes_per_pixel)) {
      *pixel = match *stored {
        [b, g, r] => r8g8b8a8_Srgb { r, g, b, a: 0xFF },
        [b, g, r, a] => r8g8b8a8_Srgb { r, g, b, a },
        _ => unreachable!(),
      };
    }
    if (header.descriptor & TGA_DESCRIPTOR_TOP_TO_BOTTOM) == 0 {
      bitmap.vertical_flip();
    }
    bitmap.has_alpha = bytes_per_pixel == 4;
    Ok(bitmap)
  }

  /// Encodes the bitmap as an uncompressed 32 bpp TGA file.
  ///
  /// ## Failure
  /// * Either dimension is more than `u16::MAX`.
  /// * Allocation failure.
  pub fn to_tga_bytes(&self) -> Result<Vec<u8>, CodecError> {
    let (Ok(width), Ok(height)) = (u16::try_from(self.width), u16::try_from(self.height)) else {
      return Err(CodecError::Unsupported("TGA dimensions are limited to 65535"));
    };
    let header = TgaHeader {
      image_type: TGA_TYPE_RAW,
      width: width.into(),
      height: height.into(),
      bits_per_pixel: 32,
      descriptor: 8,
      ..TgaHeader::default()
    };
    let mut out = Vec::new();
    out.try_reserve(core::mem::size_of::<TgaHeader>() + self.pixels.len() * 4)?;
    out.extend_from_slice(bytemuck::bytes_of(&header));
    for row in self.rows().rev() {
      for p in row {
        out.extend_from_slice(&[p.b, p.g, p.r, p.a]);
      }
    }
    Ok(out)
  }
}

#[test]
fn test_tga_header_is_18_bytes() {
  assert_eq!(core::mem::size_of::<TgaHeader>(), 18);
}

#[test]
fn test_tga_rejects_color_maps_and_odd_depths() {
  let mut header =
    TgaHeader { image_type: TGA_TYPE_RAW, bits_per_pixel: 24, ..TgaHeader::default() };
  assert_eq!(header.check_decodable(), Ok((false, 3)));
  header.color_map_type = 1;
  assert!(matches!(header.check_decodable(), Err(CodecError::Unsupported(_))));
  header.color_map_type = 0;
  header.bits_per_pixel = 16;
  assert!(matches!(header.check_decodable(), Err(CodecError::Unsupported(_))));
  header.bits_per_pixel = 32;
  header.descriptor = 0x40;
  assert!(matches!(header.check_decodable(), Err(CodecError::Unsupported(_))));
  header.descriptor = 0;
  header.image_type = 1;
  assert!(matches!(header.check_decodable(), Err(CodecError::Unsupported(_))));
}
