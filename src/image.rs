#![forbid(unsafe_code)]

//! Provides the two heap-allocated image types that every decoder produces.

use alloc::vec::Vec;

use crate::{r8g8b8_Srgb, r8g8b8a8_Srgb, CodecError, DecodeOptions};

/// A 256 entry RGB color table.
pub type Palette = [r8g8b8_Srgb; 256];

/// An all-black [`Palette`].
pub const BLACK_PALETTE: Palette = [r8g8b8_Srgb { r: 0, g: 0, b: 0 }; 256];

/// Builds a palette from `[r, g, b]` triples.
///
/// Only the first 256 triples are used, any extra bytes are ignored. Entries
/// past the end of the data stay black.
#[inline]
#[must_use]
pub fn palette_from_rgb_bytes(bytes: &[u8]) -> Palette {
  let mut palette = BLACK_PALETTE;
  for (entry, rgb) in palette.iter_mut().zip(bytes.chunks_exact(3)) {
    *entry = r8g8b8_Srgb { r: rgb[0], g: rgb[1], b: rgb[2] };
  }
  palette
}

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// You don't ever need to call this function yourself, but it's how the image
/// containers convert 2d coordinates into index values within their payload
/// vectors.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// Allocates a `Vec` of `count` copies of `fill`, reporting allocation failure
/// instead of aborting.
pub(crate) fn try_vec_filled<T: Clone>(count: usize, fill: T) -> Result<Vec<T>, CodecError> {
  let mut v = Vec::new();
  v.try_reserve_exact(count)?;
  v.resize(count, fill);
  Ok(v)
}

pub(crate) fn try_alloc_plane<T: Clone>(
  width: u32, height: u32, fill: T,
) -> Result<Vec<T>, CodecError> {
  let count = (width as usize).checked_mul(height as usize).ok_or(CodecError::DimensionsTooLarge)?;
  try_vec_filled(count, fill)
}

/// Swaps rows top to bottom in place.
fn flip_rows<T>(mut data: &mut [T], width: usize) {
  if width == 0 {
    return;
  }
  while data.len() >= width * 2 {
    let (low, mid) = core::mem::take(&mut data).split_at_mut(width);
    let mid_len = mid.len();
    let (mid, high) = mid.split_at_mut(mid_len - width);
    low.swap_with_slice(high);
    data = mid;
  }
}

/// A direct-color RGBA image.
///
/// * `pixels` is row-major with the top row first, and always has exactly
///   `width * height` entries.
/// * Every pixel has an alpha value, but the alpha is only meaningful when
///   `has_alpha` is set.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct Bitmap {
  pub width: u32,
  pub height: u32,
  pub has_alpha: bool,
  pub pixels: Vec<r8g8b8a8_Srgb>,
}
impl Bitmap {
  /// Makes a new image with every pixel set to `fill`.
  ///
  /// ## Failure
  /// * Either dimension is zero, or beyond the option limits.
  /// * Allocation failure.
  #[inline]
  pub fn try_new(
    width: u32, height: u32, fill: r8g8b8a8_Srgb, options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    options.check_dimensions(width, height)?;
    let pixels = try_alloc_plane(width, height, fill)?;
    Ok(Self { width, height, has_alpha: false, pixels })
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&r8g8b8a8_Srgb> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut r8g8b8a8_Srgb> {
    if x < self.width && y < self.height {
      self.pixels.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Iterates the rows, top to bottom.
  #[inline]
  pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[r8g8b8a8_Srgb]> + '_ {
    self.pixels.chunks_exact(self.width.max(1) as usize)
  }

  /// Flips the image top to bottom.
  #[inline]
  pub fn vertical_flip(&mut self) {
    flip_rows(&mut self.pixels, self.width as usize);
  }
}

/// An indexed-color image with a full 256 entry palette.
///
/// Every index byte is a valid palette position, but it might point at an
/// entry the file never actually set (those are black).
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct Palmap {
  pub width: u32,
  pub height: u32,
  pub indexes: Vec<u8>,
  pub palette: Palette,
}
impl Palmap {
  /// Makes a new image of all index 0 with an all black palette.
  ///
  /// ## Failure
  /// * Either dimension is zero, or beyond the option limits.
  /// * Allocation failure.
  #[inline]
  pub fn try_new(width: u32, height: u32, options: &DecodeOptions) -> Result<Self, CodecError> {
    options.check_dimensions(width, height)?;
    let indexes = try_alloc_plane(width, height, 0_u8)?;
    Ok(Self { width, height, indexes, palette: BLACK_PALETTE })
  }

  /// Gets the index at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut u8> {
    if x < self.width && y < self.height {
      self.indexes.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Flips the image top to bottom.
  #[inline]
  pub fn vertical_flip(&mut self) {
    flip_rows(&mut self.indexes, self.width as usize);
  }

  /// Looks up every index in the palette, giving fully opaque pixels.
  #[inline]
  pub fn try_to_bitmap(&self) -> Result<Bitmap, CodecError> {
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(self.indexes.len())?;
    pixels.extend(self.indexes.iter().map(|&i| {
      let r8g8b8_Srgb { r, g, b } = self.palette[usize::from(i)];
      r8g8b8a8_Srgb { r, g, b, a: 0xFF }
    }));
    Ok(Bitmap { width: self.width, height: self.height, has_alpha: false, pixels })
  }
}

#[test]
fn test_vertical_flip() {
  use alloc::vec;
  let px = |v: u8| r8g8b8a8_Srgb { r: v, g: v, b: v, a: v };
  let mut bitmap = Bitmap {
    width: 2,
    height: 3,
    has_alpha: false,
    pixels: vec![px(0), px(1), px(2), px(3), px(4), px(5)],
  };
  bitmap.vertical_flip();
  let rs: Vec<u8> = bitmap.pixels.iter().map(|p| p.r).collect();
  assert_eq!(rs, [4, 5, 2, 3, 0, 1]);

  let mut palmap = Palmap::try_new(1, 4, &DecodeOptions::default()).unwrap();
  palmap.indexes.copy_from_slice(&[1, 2, 3, 4]);
  palmap.vertical_flip();
  assert_eq!(palmap.indexes, [4, 3, 2, 1]);
}

#[test]
fn test_palette_from_rgb_bytes() {
  let palette = palette_from_rgb_bytes(&[1, 2, 3, 4, 5, 6, 7]);
  assert_eq!(palette[0], r8g8b8_Srgb { r: 1, g: 2, b: 3 });
  assert_eq!(palette[1], r8g8b8_Srgb { r: 4, g: 5, b: 6 });
  assert_eq!(palette[2], r8g8b8_Srgb { r: 0, g: 0, b: 0 });
}

#[test]
fn test_palmap_to_bitmap_is_opaque() {
  let mut palmap = Palmap::try_new(2, 1, &DecodeOptions::default()).unwrap();
  palmap.palette[7] = r8g8b8_Srgb { r: 1, g: 2, b: 3 };
  palmap.indexes[1] = 7;
  let bitmap = palmap.try_to_bitmap().unwrap();
  assert!(!bitmap.has_alpha);
  let p = bitmap.get(1, 0).unwrap();
  assert_eq!([p.r, p.g, p.b, p.a], [1, 2, 3, 0xFF]);
  let p = bitmap.get(0, 0).unwrap();
  assert_eq!([p.r, p.g, p.b, p.a], [0, 0, 0, 0xFF]);
  assert!(bitmap.get(2, 0).is_none());
}
