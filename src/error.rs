//! Error type shared by every decoder and encoder.

use alloc::string::String;
use core::{fmt, num::TryFromIntError};

use crate::gff::GffTag;

/// An error from the `pixcodec` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
  /// The allocator couldn't give us enough space.
  Alloc,

  /// A header field is wrong: bad magic, bad version, bad mode, or a
  /// structural value that can't be right.
  BadHeader(&'static str),

  /// The file is probably fine, but it uses a variant this crate doesn't
  /// decode (bit depth, compression type, channel count, ...).
  Unsupported(&'static str),

  /// The data ran out in the middle of a structure or a run.
  UnexpectedEof,

  /// A decoded run would write past the end of its row, plane, or image.
  Overrun,

  /// The file extension doesn't map to a format, or that format can't go in
  /// the requested direction. Holds the extension.
  UnsupportedFormat(String),

  /// A GFF chunk that may appear only once appeared again.
  DuplicateChunk(GffTag),

  /// A GFF chunk required for this operation isn't present.
  MissingChunk(GffTag),

  /// A paletted image had no palette.
  MissingPalette,

  /// The image is larger than the configured
  /// [`DecodeOptions`](crate::DecodeOptions) limits.
  DimensionsTooLarge,

  /// The declared width and/or height of this image is 0.
  WidthOrHeightZero,

  /// A file system operation failed.
  #[cfg(feature = "std")]
  Io(std::io::ErrorKind),
}

impl fmt::Display for CodecError {
  #[inline]
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Alloc => f.write_str("out of memory"),
      Self::BadHeader(why) => write!(f, "malformed header: {why}"),
      Self::Unsupported(what) => write!(f, "unsupported variant: {what}"),
      Self::UnexpectedEof => f.write_str("unexpected end of input"),
      Self::Overrun => f.write_str("decoded run overruns the destination"),
      Self::UnsupportedFormat(ext) => write!(f, "unsupported format: {ext:?}"),
      Self::DuplicateChunk(tag) => write!(f, "duplicate {tag:?} chunk"),
      Self::MissingChunk(tag) => write!(f, "missing {tag:?} chunk"),
      Self::MissingPalette => f.write_str("no palette found"),
      Self::DimensionsTooLarge => f.write_str("image dimensions exceed the configured limits"),
      Self::WidthOrHeightZero => f.write_str("image width or height is zero"),
      #[cfg(feature = "std")]
      Self::Io(kind) => write!(f, "i/o error: {kind}"),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

impl From<alloc::collections::TryReserveError> for CodecError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
impl From<TryFromIntError> for CodecError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::DimensionsTooLarge
  }
}
#[cfg(feature = "std")]
impl From<std::io::Error> for CodecError {
  #[inline]
  fn from(e: std::io::Error) -> Self {
    Self::Io(e.kind())
  }
}
