#![forbid(unsafe_code)]

//! Picks a format from a file's extension and does the file I/O.
//!
//! ```no_run
//! use pixcodec::dispatch::Session;
//!
//! let mut session = Session::new();
//! let bitmap = session.decode_rgba("input.psd")?;
//! session.encode_rgba("output.tga", &bitmap)?;
//! # Ok::<(), pixcodec::CodecError>(())
//! ```
//!
//! A [`Session`] counts the warnings and errors of every operation done
//! through it, and keeps the most recent error. Sessions don't share anything,
//! so separate threads should each use their own.

use alloc::string::{String, ToString};
use std::{fs, path::Path};

use crate::{
  gff::GffContainer,
  logging::{error, warn},
  pcx::pcx_read_palette,
  raw::palette_from_raw_bytes,
  Bitmap, CodecError, DecodeOptions, Palette, Palmap,
};

/// The formats this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum FormatKind {
  Psd,
  Tga,
  Pcx,
  Pic,
  Gff,
  RawRgb,
  /// Raw or ACT palette file.
  Palette,
}
impl FormatKind {
  /// Matches a file extension (without the dot), ignoring case.
  #[must_use]
  pub fn from_extension(ext: &str) -> Option<Self> {
    Some(match ext.to_ascii_lowercase().as_str() {
      "psd" => Self::Psd,
      "tga" => Self::Tga,
      "pcx" => Self::Pcx,
      "pic" => Self::Pic,
      "gff" => Self::Gff,
      "raw" | "rgb" => Self::RawRgb,
      "pal" | "act" => Self::Palette,
      _ => return None,
    })
  }

  /// Matches the extension of a path.
  ///
  /// ## Failure
  /// * [`UnsupportedFormat`](CodecError::UnsupportedFormat) holding the
  ///   extension (which might be empty).
  pub fn from_path(path: &Path) -> Result<Self, CodecError> {
    let ext = extension_of(path);
    Self::from_extension(&ext).ok_or(CodecError::UnsupportedFormat(ext))
  }
}

#[inline]
fn extension_of(path: &Path) -> String {
  path.extension().map(|e| e.to_string_lossy().to_string()).unwrap_or_default()
}

/// The format can't go in the direction asked for.
#[inline]
fn wrong_direction(path: &Path) -> CodecError {
  CodecError::UnsupportedFormat(extension_of(path))
}

/// Tracks diagnostics across a series of decode and encode calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
  /// Options used by every decode.
  pub options: DecodeOptions,
  /// How many warnings have been reported.
  pub warnings: usize,
  /// How many operations have failed.
  pub errors: usize,
  /// The most recent failure.
  pub last_error: Option<CodecError>,
}
impl Session {
  /// A session with default options.
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// A session with the options given.
  #[inline]
  #[must_use]
  pub fn with_options(options: DecodeOptions) -> Self {
    Self { options, ..Self::default() }
  }

  fn record<T>(&mut self, path: &Path, result: Result<T, CodecError>) -> Result<T, CodecError> {
    if let Err(e) = &result {
      error!("{}: {e}", path.display());
      self.errors += 1;
      self.last_error = Some(e.clone());
    }
    result
  }

  fn warn(&mut self, path: &Path, message: &str) {
    warn!("{}: {message}", path.display());
    self.warnings += 1;
  }

  /// Loads and decodes an image as RGBA.
  ///
  /// Works with PSD, TGA, PCX, PIC, and GFF.
  pub fn decode_rgba(&mut self, path: impl AsRef<Path>) -> Result<Bitmap, CodecError> {
    let path = path.as_ref();
    let result = FormatKind::from_path(path).and_then(|kind| {
      let options = &self.options;
      match kind {
        FormatKind::Psd => Bitmap::try_from_psd_bytes_with(&fs::read(path)?, options),
        FormatKind::Tga => Bitmap::try_from_tga_bytes_with(&fs::read(path)?, options),
        FormatKind::Pcx => Bitmap::try_from_pcx_bytes_with(&fs::read(path)?, options),
        FormatKind::Pic => Bitmap::try_from_pic_bytes_with(&fs::read(path)?, options),
        FormatKind::Gff => Bitmap::try_from_gff_bytes_with(&fs::read(path)?, options),
        FormatKind::RawRgb | FormatKind::Palette => Err(wrong_direction(path)),
      }
    });
    self.record(path, result)
  }

  /// Loads and decodes an indexed color image.
  ///
  /// Works with PCX and GFF.
  pub fn decode_paletted(&mut self, path: impl AsRef<Path>) -> Result<Palmap, CodecError> {
    let path = path.as_ref();
    let result = FormatKind::from_path(path).and_then(|kind| match kind {
      FormatKind::Pcx => Palmap::try_from_pcx_bytes_with(&fs::read(path)?, &self.options),
      FormatKind::Gff => Palmap::try_from_gff_bytes_with(&fs::read(path)?, &self.options),
      FormatKind::Psd
      | FormatKind::Tga
      | FormatKind::Pic
      | FormatKind::RawRgb
      | FormatKind::Palette => Err(wrong_direction(path)),
    });
    self.record(path, result)
  }

  /// Encodes an RGBA image and saves it.
  ///
  /// Works with TGA, GFF, and raw RGB. Saving an image that has alpha as raw
  /// RGB is a warning.
  pub fn encode_rgba(
    &mut self, path: impl AsRef<Path>, bitmap: &Bitmap,
  ) -> Result<(), CodecError> {
    let path = path.as_ref();
    let kind = FormatKind::from_path(path);
    if kind == Ok(FormatKind::RawRgb) && bitmap.has_alpha {
      self.warn(path, "raw RGB output drops the alpha channel");
    }
    let result = kind
      .and_then(|kind| match kind {
        FormatKind::Tga => bitmap.to_tga_bytes(),
        FormatKind::Gff => bitmap.to_gff_bytes(),
        FormatKind::RawRgb => bitmap.to_raw_rgb_bytes(),
        FormatKind::Psd | FormatKind::Pcx | FormatKind::Pic | FormatKind::Palette => {
          Err(wrong_direction(path))
        }
      })
      .and_then(|bytes| Ok(fs::write(path, bytes)?));
    self.record(path, result)
  }

  /// Encodes an indexed color image and saves it.
  ///
  /// Works with PCX and GFF.
  pub fn encode_paletted(
    &mut self, path: impl AsRef<Path>, palmap: &Palmap,
  ) -> Result<(), CodecError> {
    let path = path.as_ref();
    let result = FormatKind::from_path(path)
      .and_then(|kind| match kind {
        FormatKind::Pcx => palmap.to_pcx_bytes(),
        FormatKind::Gff => palmap.to_gff_bytes(),
        FormatKind::Psd
        | FormatKind::Tga
        | FormatKind::Pic
        | FormatKind::RawRgb
        | FormatKind::Palette => Err(wrong_direction(path)),
      })
      .and_then(|bytes| Ok(fs::write(path, bytes)?));
    self.record(path, result)
  }

  /// Loads just a palette, and how many of its entries are used.
  ///
  /// Works with raw and ACT palettes, PCX (the trailer), and GFF (the `PALC`
  /// chunk).
  pub fn read_palette(
    &mut self, path: impl AsRef<Path>,
  ) -> Result<(Palette, usize), CodecError> {
    let path = path.as_ref();
    let result = FormatKind::from_path(path).and_then(|kind| match kind {
      FormatKind::Palette => palette_from_raw_bytes(&fs::read(path)?),
      FormatKind::Pcx => Ok((pcx_read_palette(&fs::read(path)?)?, 256)),
      FormatKind::Gff => {
        Ok((GffContainer::try_from_bytes(&fs::read(path)?)?.palette()?.colors, 256))
      }
      FormatKind::Psd | FormatKind::Tga | FormatKind::Pic | FormatKind::RawRgb => {
        Err(wrong_direction(path))
      }
    });
    self.record(path, result)
  }

  /// Loads every chunk of a GFF file, whatever the extension.
  pub fn load_gff(&mut self, path: impl AsRef<Path>) -> Result<GffContainer, CodecError> {
    let path = path.as_ref();
    let result =
      fs::read(path).map_err(CodecError::from).and_then(|b| GffContainer::try_from_bytes(&b));
    self.record(path, result)
  }

  /// Saves every chunk of a GFF container.
  pub fn save_gff(
    &mut self, path: impl AsRef<Path>, container: &GffContainer,
  ) -> Result<(), CodecError> {
    let path = path.as_ref();
    let result = container.to_bytes().and_then(|bytes| Ok(fs::write(path, bytes)?));
    self.record(path, result)
  }
}

#[test]
fn test_format_kind_from_extension() {
  assert_eq!(FormatKind::from_extension("PSD"), Some(FormatKind::Psd));
  assert_eq!(FormatKind::from_extension("Tga"), Some(FormatKind::Tga));
  assert_eq!(FormatKind::from_extension("rgb"), Some(FormatKind::RawRgb));
  assert_eq!(FormatKind::from_extension("ACT"), Some(FormatKind::Palette));
  assert_eq!(FormatKind::from_extension("png"), None);
  assert_eq!(
    FormatKind::from_path(Path::new("dir.d/noext")),
    Err(CodecError::UnsupportedFormat(String::new()))
  );
  assert_eq!(
    FormatKind::from_path(Path::new("a.bmp")),
    Err(CodecError::UnsupportedFormat("bmp".to_string()))
  );
}
