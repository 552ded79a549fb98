//! Module for Photoshop PSD files.
//!
//! Only RGB images with 8 bits per channel are handled, and only the merged
//! (flattened) image is decoded. Layers are parsed but their pixels are
//! skipped over.
//!
//! Note: All multi-byte values in PSD are big-endian encoded.
//!
//! * The file starts with a 26 byte header ([`PsdHeader`]).
//! * Next is the color mode data block, then the image resources block. Each
//!   is a `u32` length then that many bytes. Neither matters for RGB images.
//! * Next is the layer and mask block. This is a `u32` length, then a layer
//!   info sub-block (`u32` length, `i16` layer count, the layer records, then
//!   every layer's channel data). A negative layer count means that the merged
//!   image also has a transparency plane, which comes after the channel data.
//! * Last is the merged image: a `u16` compression method, then each channel
//!   as a full plane (red, then green, then blue, then any others). With
//!   PackBits compression there's a table of `u16` packed row lengths before
//!   the planes.

use alloc::vec::Vec;
use bytemuck::{Pod, Zeroable};
use pack1::{U16BE, U32BE};

use crate::{
  image::try_vec_filled,
  logging::{trace, warn},
  r8g8b8a8_Srgb,
  rle::packbits_unpack,
  Bitmap, ByteSource, CodecError, DecodeOptions,
};

/// The signature at the start of every PSD file.
pub const PSD_SIGNATURE: [u8; 4] = *b"8BPS";
/// The signature before each layer's blend mode key.
pub const PSD_BLEND_SIGNATURE: [u8; 4] = *b"8BIM";
/// The RGB color mode.
pub const PSD_MODE_RGB: u16 = 3;

/// Layer flag bit: the layer is hidden.
pub const PSD_LAYER_HIDDEN: u8 = 0b10;

/// The fixed 26 byte header at the start of every PSD file.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct PsdHeader {
  pub signature: [u8; 4],
  pub version: U16BE,
  pub reserved: [u8; 6],
  pub channels: U16BE,
  pub height: U32BE,
  pub width: U32BE,
  pub depth: U16BE,
  pub color_mode: U16BE,
}
impl PsdHeader {
  /// Checks that this is a header this crate can decode.
  pub fn check_decodable(&self) -> Result<(), CodecError> {
    if self.signature != PSD_SIGNATURE {
      return Err(CodecError::BadHeader("PSD signature"));
    }
    if self.version.get() != 1 {
      return Err(CodecError::BadHeader("PSD version"));
    }
    if !(3..=56).contains(&self.channels.get()) {
      return Err(CodecError::Unsupported("PSD channel count"));
    }
    if self.depth.get() != 8 {
      return Err(CodecError::Unsupported("PSD bit depth other than 8"));
    }
    if self.color_mode.get() != PSD_MODE_RGB {
      return Err(CodecError::BadHeader("PSD color mode other than RGB"));
    }
    Ok(())
  }
}

/// A bounding box, in canvas pixels. Can extend past the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct PsdRect {
  pub top: i32,
  pub left: i32,
  pub bottom: i32,
  pub right: i32,
}
impl PsdRect {
  #[inline]
  fn read(src: &mut ByteSource<'_>) -> Result<Self, CodecError> {
    Ok(Self {
      top: src.read_i32_be()?,
      left: src.read_i32_be()?,
      bottom: src.read_i32_be()?,
      right: src.read_i32_be()?,
    })
  }
}

/// A layer's mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct PsdLayerMask {
  pub rect: PsdRect,
  pub default_color: u8,
  pub flags: u8,
}

/// Everything about a layer other than its pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsdLayerRecord {
  /// Where the layer's pixels go on the canvas.
  pub rect: PsdRect,
  /// `(channel id, data length)` for each channel. Id -1 is transparency,
  /// -2 is the mask, 0 and up are the color channels.
  pub channels: Vec<(i16, u32)>,
  /// Four character blend mode, such as `norm` or `mul `.
  pub blend_key: [u8; 4],
  #[allow(missing_docs)]
  pub opacity: u8,
  /// 0 is base, 1 is non-base.
  pub clipping: u8,
  #[allow(missing_docs)]
  pub flags: u8,
  #[allow(missing_docs)]
  pub mask: Option<PsdLayerMask>,
  /// Gray blending range, as `(source, destination)`.
  pub gray_blend_range: (u32, u32),
  /// Per-channel blending ranges, as `(source, destination)`.
  pub channel_blend_ranges: Vec<(u32, u32)>,
  /// The layer name, in the file's 8-bit encoding.
  pub name: Vec<u8>,
}
impl PsdLayerRecord {
  #[allow(missing_docs)]
  #[inline]
  #[must_use]
  pub const fn is_visible(&self) -> bool {
    (self.flags & PSD_LAYER_HIDDEN) == 0
  }

  fn read(src: &mut ByteSource<'_>) -> Result<Self, CodecError> {
    let rect = PsdRect::read(src)?;
    let channel_count = usize::from(src.read_u16_be()?);
    if channel_count > 56 {
      return Err(CodecError::BadHeader("PSD layer channel count"));
    }
    let mut channels = Vec::new();
    channels.try_reserve_exact(channel_count)?;
    for _ in 0..channel_count {
      channels.push((src.read_i16_be()?, src.read_u32_be()?));
    }
    if src.read_array()? != PSD_BLEND_SIGNATURE {
      return Err(CodecError::BadHeader("PSD blend mode signature"));
    }
    let blend_key = src.read_array()?;
    let [opacity, clipping, flags, _filler] = src.read_array()?;

    let extra_len = src.read_u32_be()? as usize;
    let mut extra = src.take(extra_len)?;

    let mask_len = extra.read_u32_be()? as usize;
    let mut mask_data = extra.take(mask_len)?;
    let mask = if mask_len >= 18 {
      Some(PsdLayerMask {
        rect: PsdRect::read(&mut mask_data)?,
        default_color: mask_data.read_u8()?,
        flags: mask_data.read_u8()?,
      })
    } else {
      None
    };

    let ranges_len = extra.read_u32_be()? as usize;
    let mut ranges = extra.take(ranges_len)?;
    let mut gray_blend_range = (0, 0);
    let mut channel_blend_ranges = Vec::new();
    if ranges.remaining() >= 8 {
      gray_blend_range = (ranges.read_u32_be()?, ranges.read_u32_be()?);
      channel_blend_ranges.try_reserve_exact(ranges.remaining() / 8)?;
      while ranges.remaining() >= 8 {
        channel_blend_ranges.push((ranges.read_u32_be()?, ranges.read_u32_be()?));
      }
    }

    let name_len = usize::from(extra.read_u8()?);
    let name_bytes = extra.read_slice(name_len)?;
    let mut name = Vec::new();
    name.try_reserve_exact(name_len)?;
    name.extend_from_slice(name_bytes);
    // the length byte and the name together are padded to 4 bytes, anything
    // after that is additional layer info.
    let pad = (4 - (1 + name_len) % 4) % 4;
    extra.skip(pad.min(extra.remaining()))?;

    Ok(Self {
      rect,
      channels,
      blend_key,
      opacity,
      clipping,
      flags,
      mask,
      gray_blend_range,
      channel_blend_ranges,
      name,
    })
  }
}

/// Reads the header and skips the two blocks after it.
fn read_prelude(src: &mut ByteSource<'_>) -> Result<PsdHeader, CodecError> {
  let header: PsdHeader = src.read_pod()?;
  trace!("PSD header: {header:?}");
  header.check_decodable()?;
  let color_mode_len = src.read_u32_be()? as usize;
  src.skip(color_mode_len)?;
  let resources_len = src.read_u32_be()? as usize;
  src.skip(resources_len)?;
  Ok(header)
}

/// The parsed layer and mask block.
#[derive(Default)]
struct LayerSection {
  layers: Vec<PsdLayerRecord>,
  has_merged_transparency: bool,
  merged_transparency: Option<Vec<u8>>,
}

/// Reads the layer and mask block, leaving `src` just past the block.
///
/// The merged transparency plane is only decoded if `plane_size` is given.
fn read_layer_section(
  src: &mut ByteSource<'_>, plane_size: Option<(usize, usize)>,
) -> Result<LayerSection, CodecError> {
  let mut section = LayerSection::default();
  let block_len = src.read_u32_be()? as usize;
  let mut block = src.take(block_len)?;
  if block_len == 0 {
    return Ok(section);
  }
  let info_len = block.read_u32_be()?;
  if info_len == 0 {
    return Ok(section);
  }
  let count = block.read_i16_be()?;
  section.has_merged_transparency = count < 0;
  let count = usize::from(count.unsigned_abs());
  trace!("PSD layers: {count}, merged transparency: {}", section.has_merged_transparency);

  section.layers.try_reserve_exact(count)?;
  for _ in 0..count {
    section.layers.push(PsdLayerRecord::read(&mut block)?);
  }
  let channel_data_len = section
    .layers
    .iter()
    .flat_map(|layer| layer.channels.iter())
    .try_fold(0_usize, |total, (_, len)| total.checked_add(*len as usize))
    .ok_or(CodecError::UnexpectedEof)?;
  block.skip(channel_data_len)?;

  if let (true, Some((width, height))) = (section.has_merged_transparency, plane_size) {
    let compression = block.read_u16_be()?;
    check_plane_input(&block, compression, width, height, 1, 1)?;
    let mut plane = try_vec_filled(width * height, 0xFF_u8)?;
    match compression {
      0 => block.read_exact(&mut plane)?,
      _ => {
        block.skip(height * 2)?;
        packbits_unpack(&mut block, &mut plane, 1, width, height)?;
      }
    }
    section.merged_transparency = Some(plane);
  }
  Ok(section)
}

/// Checks that `src` holds at least the smallest possible encoding of
/// `planes` planes, so that a lying header can't make us allocate an image
/// the data couldn't fill. `row_counts` is how many planes the PackBits row
/// length table covers.
fn check_plane_input(
  src: &ByteSource<'_>, compression: u16, width: usize, height: usize, planes: usize,
  row_counts: usize,
) -> Result<(), CodecError> {
  let needed = match compression {
    0 => width * height * planes,
    // a packet is at least 2 bytes and covers at most 129
    1 => height * row_counts * 2 + planes * height * 2 * ((width + 128) / 129),
    _ => return Err(CodecError::Unsupported("PSD compression other than raw or PackBits")),
  };
  if src.remaining() < needed {
    Err(CodecError::UnexpectedEof)
  } else {
    Ok(())
  }
}

/// The `c`th channel of a pixel, in file order.
#[inline]
fn channel_mut(px: &mut r8g8b8a8_Srgb, c: usize) -> &mut u8 {
  match c {
    0 => &mut px.r,
    1 => &mut px.g,
    2 => &mut px.b,
    _ => &mut px.a,
  }
}

/// Parses the layer records of a PSD file.
///
/// The records are in file order, which is bottom layer first.
pub fn psd_read_layers(bytes: &[u8]) -> Result<Vec<PsdLayerRecord>, CodecError> {
  let mut src = ByteSource::new(bytes);
  read_prelude(&mut src)?;
  Ok(read_layer_section(&mut src, None)?.layers)
}

impl Bitmap {
  /// Attempts to parse the bytes of a PSD file into a bitmap.
  ///
  /// Images with a fourth channel set `has_alpha`. Images with only three
  /// channels use the merged transparency plane as alpha, when there is one
  /// (see [`DecodeOptions::psd_merged_transparency`]).
  #[inline]
  pub fn try_from_psd_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    Self::try_from_psd_bytes_with(bytes, &DecodeOptions::default())
  }

  /// As [`try_from_psd_bytes`](Self::try_from_psd_bytes), with options.
  pub fn try_from_psd_bytes_with(
    bytes: &[u8], options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    let mut src = ByteSource::new(bytes);
    let header = read_prelude(&mut src)?;
    let width = header.width.get();
    let height = header.height.get();
    let channels = usize::from(header.channels.get());
    options.check_dimensions(width, height)?;
    let (w, h) = (width as usize, height as usize);

    let want_transparency = channels == 3 && options.psd_merged_transparency;
    let section = read_layer_section(&mut src, want_transparency.then_some((w, h)))?;
    if channels > 3 && section.has_merged_transparency {
      warn!("PSD merged transparency plane ignored, the image has an alpha channel");
    }

    let pixel_count = w * h;
    let planes = channels.min(4);
    let compression = src.read_u16_be()?;
    trace!("PSD merged image compression: {compression}");
    check_plane_input(&src, compression, w, h, planes, channels)?;

    let opaque_white = r8g8b8a8_Srgb { r: 0xFF, g: 0xFF, b: 0xFF, a: 0xFF };
    let mut bitmap = Bitmap::try_new(width, height, opaque_white, options)?;
    if compression == 0 {
      for c in 0..planes {
        let plane = src.read_slice(pixel_count)?;
        for (px, v) in bitmap.pixels.iter_mut().zip(plane.iter().copied()) {
          *channel_mut(px, c) = v;
        }
      }
    } else {
      src.skip(h * channels * 2)?;
      let mut row = try_vec_filled(w, 0_u8)?;
      for c in 0..planes {
        for y in 0..h {
          packbits_unpack(&mut src, &mut row, 1, w, 1)?;
          let line = &mut bitmap.pixels[y * w..(y + 1) * w];
          for (px, v) in line.iter_mut().zip(row.iter().copied()) {
            *channel_mut(px, c) = v;
          }
        }
      }
    }

    bitmap.has_alpha = channels > 3;
    if let Some(plane) = section.merged_transparency {
      if channels == 3 {
        for (px, a) in bitmap.pixels.iter_mut().zip(plane.iter().copied()) {
          px.a = a;
        }
        bitmap.has_alpha = true;
      }
    }
    Ok(bitmap)
  }
}

#[test]
fn test_psd_header_is_26_bytes() {
  assert_eq!(core::mem::size_of::<PsdHeader>(), 26);
}

#[test]
fn test_psd_header_checks() {
  let mut header = PsdHeader {
    signature: PSD_SIGNATURE,
    version: U16BE::from(1_u16),
    reserved: [0; 6],
    channels: U16BE::from(3_u16),
    height: U32BE::from(1_u32),
    width: U32BE::from(1_u32),
    depth: U16BE::from(8_u16),
    color_mode: U16BE::from(PSD_MODE_RGB),
  };
  assert_eq!(header.check_decodable(), Ok(()));
  header.color_mode = U16BE::from(4_u16);
  assert_eq!(
    header.check_decodable(),
    Err(CodecError::BadHeader("PSD color mode other than RGB"))
  );
  header.color_mode = U16BE::from(PSD_MODE_RGB);
  header.depth = U16BE::from(16_u16);
  assert!(matches!(header.check_decodable(), Err(CodecError::Unsupported(_))));
  header.depth = U16BE::from(8_u16);
  header.channels = U16BE::from(2_u16);
  assert!(matches!(header.check_decodable(), Err(CodecError::Unsupported(_))));
  header.channels = U16BE::from(3_u16);
  header.signature = *b"8BPX";
  assert!(matches!(header.check_decodable(), Err(CodecError::BadHeader(_))));
}
