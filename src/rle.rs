#![forbid(unsafe_code)]

//! The run-length encoding schemes shared by several formats.
//!
//! All the unpackers here work the same basic way: a control byte says either
//! "repeat the next value N times" or "copy the next N values as-is". They
//! differ in how the control byte is split up, and in what a "value" is.
//!
//! * [`packbits_unpack`]: PSD channel planes.
//! * [`tga_rle_unpack`]: TGA pixel data, where a value is a whole pixel.
//! * [`pcx_rle_unpack`]: PCX scanlines.
//!
//! The unpackers write to `dest[i * stride]` for output number `i`, so a single
//! channel plane can be written straight into interleaved pixel data. A run that
//! would go past the end of its row (or the image, for TGA) is an
//! [`Overrun`](CodecError::Overrun) error, and running out of input partway is
//! an [`UnexpectedEof`](CodecError::UnexpectedEof) error. There's no attempt
//! to salvage a partial image.

use alloc::vec::Vec;

use crate::{ByteSource, CodecError};

/// Checks that `count` outputs at the given `stride` all land inside a
/// destination of `dest_len` elements.
#[inline]
fn check_dest(dest_len: usize, stride: usize, count: usize) -> Result<(), CodecError> {
  if count == 0 {
    return Ok(());
  }
  let last = (count - 1).checked_mul(stride).ok_or(CodecError::Overrun)?;
  if last < dest_len {
    Ok(())
  } else {
    Err(CodecError::Overrun)
  }
}

/// Unpacks PackBits data, `height` rows of `width` bytes each.
///
/// For each control byte `c` (read as an `i8`):
/// * `0 ..= 127`: copy the next `c + 1` bytes.
/// * `-128 ..= -1`: repeat the next byte `1 - c` times.
///
/// Each row is packed separately, so a run can't cross from one row into the
/// next.
pub fn packbits_unpack(
  src: &mut ByteSource<'_>, dest: &mut [u8], stride: usize, width: usize, height: usize,
) -> Result<(), CodecError> {
  let total = width.checked_mul(height).ok_or(CodecError::Overrun)?;
  check_dest(dest.len(), stride, total)?;
  for y in 0..height {
    let row_base = y * width;
    let mut x = 0;
    while x < width {
      let c = src.read_u8()? as i8;
      match c {
        c if c < 0 => {
          let count = (1 - isize::from(c)) as usize;
          if x + count > width {
            return Err(CodecError::Overrun);
          }
          let value = src.read_u8()?;
          for i in (row_base + x)..(row_base + x + count) {
            dest[i * stride] = value;
          }
          x += count;
        }
        c => {
          let count = c as usize + 1;
          if x + count > width {
            return Err(CodecError::Overrun);
          }
          let literal = src.read_slice(count)?;
          for (i, value) in ((row_base + x)..).zip(literal.iter().copied()) {
            dest[i * stride] = value;
          }
          x += count;
        }
      }
    }
  }
  Ok(())
}

/// Unpacks TGA run-length pixel data.
///
/// Pixels are `bytes_per_pixel` bytes each, and get written tightly packed
/// into `dest` in file order (so, `[b, g, r]` or `[b, g, r, a]`, with the
/// rows still bottom-up).
///
/// For each control byte `c`:
/// * high bit set: one pixel follows, and it's repeated `(c & 0x7F) + 1`
///   times.
/// * high bit clear: `c + 1` pixels follow, each used once.
///
/// Runs can cross from one row into the next, but not past `pixel_count`.
pub fn tga_rle_unpack(
  src: &mut ByteSource<'_>, dest: &mut [u8], bytes_per_pixel: usize, pixel_count: usize,
) -> Result<(), CodecError> {
  let needed = pixel_count.checked_mul(bytes_per_pixel).ok_or(CodecError::Overrun)?;
  if bytes_per_pixel == 0 || dest.len() < needed {
    return Err(CodecError::Overrun);
  }
  let mut out = dest[..needed].chunks_exact_mut(bytes_per_pixel);
  let mut written = 0;
  while written < pixel_count {
    let c = src.read_u8()?;
    let count = usize::from(c & 0x7F) + 1;
    if written + count > pixel_count {
      return Err(CodecError::Overrun);
    }
    if (c & 0x80) != 0 {
      let pixel = src.read_slice(bytes_per_pixel)?;
      for dest_pixel in out.by_ref().take(count) {
        dest_pixel.copy_from_slice(pixel);
      }
    } else {
      let pixels = src.read_slice(count * bytes_per_pixel)?;
      let pixels = pixels.chunks_exact(bytes_per_pixel);
      for (dest_pixel, pixel) in out.by_ref().take(count).zip(pixels) {
        dest_pixel.copy_from_slice(pixel);
      }
    }
    written += count;
  }
  Ok(())
}

/// Unpacks PCX run-length data, `height` scanlines of `width` bytes each.
///
/// If the top two bits of a byte are both set then the low six bits are a
/// repeat count for the byte that follows. Any other byte is a literal. This
/// means that a literal value of `0xC0` or more can only be stored as a run of
/// one.
pub fn pcx_rle_unpack(
  src: &mut ByteSource<'_>, dest: &mut [u8], stride: usize, width: usize, height: usize,
) -> Result<(), CodecError> {
  let total = width.checked_mul(height).ok_or(CodecError::Overrun)?;
  check_dest(dest.len(), stride, total)?;
  for y in 0..height {
    let row_base = y * width;
    let mut x = 0;
    while x < width {
      let byte = src.read_u8()?;
      if (byte & 0xC0) == 0xC0 {
        let count = usize::from(byte & 0x3F);
        if x + count > width {
          return Err(CodecError::Overrun);
        }
        let value = src.read_u8()?;
        for i in (row_base + x)..(row_base + x + count) {
          dest[i * stride] = value;
        }
        x += count;
      } else {
        dest[(row_base + x) * stride] = byte;
        x += 1;
      }
    }
  }
  Ok(())
}

/// Packs one PCX scanline, appending to `out`.
///
/// Bytes below `0xC0` are packed into runs of at most 63, or written as a
/// literal when alone. Bytes of `0xC0` or more are never packed into runs:
/// each one is written as a run of one (`0xC1`) in front of the byte.
pub fn pcx_rle_pack_row(row: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
  out.try_reserve(row.len() * 2)?;
  let mut rest = row;
  while let [value, ..] = rest {
    let value = *value;
    if value >= 0xC0 {
      out.extend_from_slice(&[0xC1, value]);
      rest = &rest[1..];
      continue;
    }
    let run = rest.iter().take(63).take_while(|&&b| b == value).count();
    if run == 1 {
      out.push(value);
    } else {
      out.push(0xC0 | run as u8);
      out.push(value);
    }
    rest = &rest[run..];
  }
  Ok(())
}

#[test]
fn test_packbits_unpack_strided() {
  // two rows of 3: [1, 1, 1] and [7, 8, 9], written to every other byte.
  let data = [0xFE, 1, 0x02, 7, 8, 9];
  let mut dest = [0_u8; 11];
  packbits_unpack(&mut ByteSource::new(&data), &mut dest, 2, 3, 2).unwrap();
  assert_eq!(dest, [1, 0, 1, 0, 1, 0, 7, 0, 8, 0, 9]);
}

#[test]
fn test_packbits_run_crossing_row_is_overrun() {
  let data = [0xFD, 5, 0x00, 6];
  let mut dest = [0_u8; 4];
  assert_eq!(
    packbits_unpack(&mut ByteSource::new(&data), &mut dest, 1, 2, 2),
    Err(CodecError::Overrun)
  );
}

#[test]
fn test_pcx_rle_unpack_and_truncation() {
  let data = [0xC3, 0x55, 0x01];
  let mut dest = [0_u8; 4];
  pcx_rle_unpack(&mut ByteSource::new(&data), &mut dest, 1, 4, 1).unwrap();
  assert_eq!(dest, [0x55, 0x55, 0x55, 0x01]);
  assert_eq!(
    pcx_rle_unpack(&mut ByteSource::new(&data[..2]), &mut dest, 1, 4, 1),
    Err(CodecError::UnexpectedEof)
  );
}

#[test]
fn test_pcx_rle_pack_row_escapes_high_literals() {
  let mut out = Vec::new();
  pcx_rle_pack_row(&[0xC5, 0x10, 0xC5, 0xFF, 0xFF], &mut out).unwrap();
  assert_eq!(out, [0xC1, 0xC5, 0x10, 0xC1, 0xC5, 0xC1, 0xFF, 0xC1, 0xFF]);
}

#[test]
fn test_tga_rle_unpack_mixed_packets() {
  // a run of 2 pixels then a literal packet of 1 pixel, 3 bytes per pixel.
  let data = [0x81, 1, 2, 3, 0x00, 4, 5, 6];
  let mut dest = [0_u8; 9];
  tga_rle_unpack(&mut ByteSource::new(&data), &mut dest, 3, 3).unwrap();
  assert_eq!(dest, [1, 2, 3, 1, 2, 3, 4, 5, 6]);
  assert_eq!(
    tga_rle_unpack(&mut ByteSource::new(&data), &mut dest, 3, 1),
    Err(CodecError::Overrun)
  );
}
