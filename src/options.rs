//! Knobs that influence decoding.

use crate::CodecError;

/// Options passed to the `_with` decoder functions.
///
/// The plain decoder functions use [`DecodeOptions::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// Images wider than this fail with
  /// [`DimensionsTooLarge`](CodecError::DimensionsTooLarge).
  pub max_width: u32,
  /// Images taller than this fail with
  /// [`DimensionsTooLarge`](CodecError::DimensionsTooLarge).
  pub max_height: u32,
  /// When a PSD's merged image has no alpha channel of its own but the layer
  /// section carries a merged transparency plane, use that plane as the
  /// alpha channel.
  pub psd_merged_transparency: bool,
}
impl Default for DecodeOptions {
  /// Limits width and height to 17,000 each, to prevent accidental
  /// out-of-memory problems with hostile headers.
  #[inline]
  fn default() -> Self {
    Self { max_width: 17_000, max_height: 17_000, psd_merged_transparency: true }
  }
}
impl DecodeOptions {
  /// Sets the maximum width and height.
  #[inline]
  #[must_use]
  pub const fn with_max_dimensions(self, max_width: u32, max_height: u32) -> Self {
    Self { max_width, max_height, ..self }
  }

  /// Sets [`psd_merged_transparency`](Self::psd_merged_transparency).
  #[inline]
  #[must_use]
  pub const fn with_psd_merged_transparency(self, yes: bool) -> Self {
    Self { psd_merged_transparency: yes, ..self }
  }

  /// Checks a header's declared dimensions against these options.
  #[inline]
  pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), CodecError> {
    if width == 0 || height == 0 {
      Err(CodecError::WidthOrHeightZero)
    } else if width > self.max_width || height > self.max_height {
      Err(CodecError::DimensionsTooLarge)
    } else {
      Ok(())
    }
  }
}

#[test]
fn test_check_dimensions() {
  let opts = DecodeOptions::default().with_max_dimensions(10, 20);
  assert_eq!(opts.check_dimensions(10, 20), Ok(()));
  assert_eq!(opts.check_dimensions(0, 5), Err(CodecError::WidthOrHeightZero));
  assert_eq!(opts.check_dimensions(11, 5), Err(CodecError::DimensionsTooLarge));
  assert_eq!(opts.check_dimensions(5, 21), Err(CodecError::DimensionsTooLarge));
}
