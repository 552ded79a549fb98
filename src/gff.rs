#![forbid(unsafe_code)]

//! Module for GFF, a simple extensible chunk container.
//!
//! A GFF file is nothing but a flat list of chunks, each of which is:
//!
//! * A 4 byte tag. This is four ASCII characters packed into a word.
//! * A 4 byte payload length.
//! * The payload.
//!
//! Every word in a file (tags, lengths, and the words inside of known payloads)
//! uses the same byte order. The order is declared by the first word of the
//! `INFO` chunk's payload, which is always `0x1234ABCD` in the file's order.
//! Since `INFO` must always be the first chunk, a reader can look at bytes
//! 8..12 of a file to know how to read everything else. This crate always
//! writes big-endian files, but it reads either order.
//!
//! | Tag | Payload | Singleton |
//! |:-:|:-|:-:|
//! | `INFO` | byte order marker, width, height (three words) | yes |
//! | `RGBA` | `width * height` pixels, 4 bytes each | yes |
//! | `INDX` | `width * height` palette indexes, 1 byte each | no |
//! | `PALC` | 256 entries of `[r, g, b, flags]` | yes |
//! | `IPAL` | 32x32x32 nearest-palette-index cube | yes |
//!
//! A "singleton" chunk may appear at most once per file. Unknown tags are kept
//! as-is and written back out on save.

use alloc::vec::Vec;
use core::{cmp::Ordering, fmt};

use crate::{
  image::try_vec_filled,
  logging::{debug, trace},
  r8g8b8_Srgb, r8g8b8a8_Srgb, Bitmap, ByteSource, CodecError, DecodeOptions, Palette, Palmap,
  BLACK_PALETTE,
};

/// The marker word at the start of the `INFO` payload.
pub const GFF_BYTE_ORDER_MARKER: u32 = 0x1234_ABCD;

/// Palette flag: a color quantizer must not change this entry.
pub const GFF_PAL_LOCKED: u8 = 0x01;
/// Palette flag: the source image must not use this entry.
pub const GFF_PAL_UNUSABLE: u8 = 0x02;
/// Palette flag: this entry is fully transparent.
pub const GFF_PAL_TRANSPARENT: u8 = 0x04;

/// Bits per channel of the inverse palette map's index.
pub const GFF_INVERSE_MAP_BITS: u32 = 5;
/// Byte length of an inverse palette map payload.
pub const GFF_INVERSE_MAP_LEN: usize = 1 << (3 * GFF_INVERSE_MAP_BITS);

/// The tag of a chunk.
///
/// The characters are stored in reading order (so `INFO` is `*b"INFO"`),
/// regardless of the byte order of any file the tag came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct GffTag(pub [u8; 4]);
#[allow(missing_docs)]
impl GffTag {
  pub const INFO: Self = Self(*b"INFO");
  pub const PIXELS: Self = Self(*b"RGBA");
  pub const INDEXES: Self = Self(*b"INDX");
  pub const PALETTE: Self = Self(*b"PALC");
  pub const INVERSE_MAP: Self = Self(*b"IPAL");
}
impl GffTag {
  /// If all four bytes are printable ASCII (space included).
  #[inline]
  #[must_use]
  pub const fn is_printable(self) -> bool {
    let [a, b, c, d] = self.0;
    matches!(a, b' '..=b'~')
      && matches!(b, b' '..=b'~')
      && matches!(c, b' '..=b'~')
      && matches!(d, b' '..=b'~')
  }

  /// If a container may hold at most one chunk with this tag.
  #[inline]
  #[must_use]
  pub const fn is_singleton(self) -> bool {
    self.slot().is_some()
  }

  /// Which container slot holds this tag, if any.
  #[inline]
  #[must_use]
  const fn slot(self) -> Option<usize> {
    match self.0 {
      [b'I', b'N', b'F', b'O'] => Some(0),
      [b'R', b'G', b'B', b'A'] => Some(1),
      [b'P', b'A', b'L', b'C'] => Some(2),
      [b'I', b'P', b'A', b'L'] => Some(3),
      _ => None,
    }
  }
}
impl fmt::Debug for GffTag {
  #[inline]
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
      for b in self.0 {
        write!(f, "{}", b as char)?;
      }
      Ok(())
    } else {
      write!(f, "{:?}", self.0)
    }
  }
}

/// The byte order of the words in a GFF file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ByteOrder {
  #[default]
  Big,
  Little,
}
impl ByteOrder {
  /// Checks a marker word's bytes (as they appear in the file).
  #[inline]
  #[must_use]
  pub const fn from_marker(bytes: [u8; 4]) -> Option<Self> {
    match bytes {
      [0x12, 0x34, 0xAB, 0xCD] => Some(Self::Big),
      [0xCD, 0xAB, 0x34, 0x12] => Some(Self::Little),
      _ => None,
    }
  }
  #[inline]
  #[must_use]
  const fn word_from_bytes(self, bytes: [u8; 4]) -> u32 {
    match self {
      Self::Big => u32::from_be_bytes(bytes),
      Self::Little => u32::from_le_bytes(bytes),
    }
  }
  #[inline]
  #[must_use]
  const fn word_to_bytes(self, word: u32) -> [u8; 4] {
    match self {
      Self::Big => word.to_be_bytes(),
      Self::Little => word.to_le_bytes(),
    }
  }
  #[inline]
  #[must_use]
  fn tag_from_bytes(self, bytes: [u8; 4]) -> GffTag {
    GffTag(self.word_from_bytes(bytes).to_be_bytes())
  }
  #[inline]
  #[must_use]
  fn tag_to_bytes(self, tag: GffTag) -> [u8; 4] {
    self.word_to_bytes(u32::from_be_bytes(tag.0))
  }
}

/// One chunk within a [`GffContainer`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct GffChunk {
  pub tag: GffTag,
  pub data: Vec<u8>,
}

/// The decoded `INFO` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct GffImageInfo {
  pub width: u32,
  pub height: u32,
}
impl GffImageInfo {
  /// Length of the payload this crate writes.
  pub const PAYLOAD_LEN: usize = 12;

  /// Parses an `INFO` payload. The payload may be longer than 12 bytes, extra
  /// bytes are ignored.
  #[inline]
  pub fn from_payload(data: &[u8], order: ByteOrder) -> Result<Self, CodecError> {
    let mut src = ByteSource::new(data);
    if ByteOrder::from_marker(src.read_array()?) != Some(order) {
      return Err(CodecError::BadHeader("GFF byte order marker"));
    }
    let width = order.word_from_bytes(src.read_array()?);
    let height = order.word_from_bytes(src.read_array()?);
    Ok(Self { width, height })
  }

  /// Makes an `INFO` payload.
  #[inline]
  #[must_use]
  pub fn to_payload(self, order: ByteOrder) -> [u8; 12] {
    let mut out = [0_u8; 12];
    out[0..4].copy_from_slice(&order.word_to_bytes(GFF_BYTE_ORDER_MARKER));
    out[4..8].copy_from_slice(&order.word_to_bytes(self.width));
    out[8..12].copy_from_slice(&order.word_to_bytes(self.height));
    out
  }

  /// Checks a plane chunk's length against the image size, before anything
  /// gets allocated for the image.
  ///
  /// A chunk that's too short is [`UnexpectedEof`](CodecError::UnexpectedEof),
  /// one that's too long is `BadHeader(what)`.
  fn check_plane_len(
    self, len: usize, bytes_per_pixel: usize, options: &DecodeOptions, what: &'static str,
  ) -> Result<(), CodecError> {
    options.check_dimensions(self.width, self.height)?;
    let needed = (self.width as usize)
      .checked_mul(self.height as usize)
      .and_then(|n| n.checked_mul(bytes_per_pixel))
      .ok_or(CodecError::DimensionsTooLarge)?;
    match len.cmp(&needed) {
      Ordering::Less => Err(CodecError::UnexpectedEof),
      Ordering::Greater => Err(CodecError::BadHeader(what)),
      Ordering::Equal => Ok(()),
    }
  }
}

/// The decoded `PALC` payload.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct GffPalette {
  pub colors: Palette,
  pub flags: [u8; 256],
}
impl Default for GffPalette {
  #[inline]
  fn default() -> Self {
    Self { colors: BLACK_PALETTE, flags: [0; 256] }
  }
}
impl GffPalette {
  /// Length of a `PALC` payload.
  pub const PAYLOAD_LEN: usize = 256 * 4;

  /// Parses a `PALC` payload.
  #[inline]
  pub fn from_payload(data: &[u8]) -> Result<Self, CodecError> {
    if data.len() != Self::PAYLOAD_LEN {
      return Err(CodecError::BadHeader("GFF palette chunk length"));
    }
    let mut out = Self::default();
    let entries: &[[u8; 4]] = bytemuck::cast_slice(data);
    for ((color, flags), [r, g, b, f]) in
      out.colors.iter_mut().zip(out.flags.iter_mut()).zip(entries.iter().copied())
    {
      *color = r8g8b8_Srgb { r, g, b };
      *flags = f;
    }
    Ok(out)
  }

  /// Makes a `PALC` payload.
  #[inline]
  pub fn to_payload(&self) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    out.try_reserve_exact(Self::PAYLOAD_LEN)?;
    for (color, flags) in self.colors.iter().zip(self.flags.iter()) {
      out.extend_from_slice(&[color.r, color.g, color.b, *flags]);
    }
    Ok(out)
  }

  /// The entry as an RGBA pixel. Transparent entries have alpha 0.
  #[inline]
  #[must_use]
  pub fn rgba(&self, index: u8) -> r8g8b8a8_Srgb {
    let r8g8b8_Srgb { r, g, b } = self.colors[usize::from(index)];
    let transparent = (self.flags[usize::from(index)] & GFF_PAL_TRANSPARENT) != 0;
    r8g8b8a8_Srgb { r, g, b, a: if transparent { 0 } else { 0xFF } }
  }
}

/// An ordered list of chunks.
///
/// Chunks keep the order they were added in. The singleton tags also get a
/// slot that points into the list, so they can be found without a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GffContainer {
  /// The byte order used by [`to_bytes`](Self::to_bytes).
  pub byte_order: ByteOrder,
  chunks: Vec<GffChunk>,
  slots: [Option<usize>; 4],
}
impl GffContainer {
  /// An empty, big-endian container.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { byte_order: ByteOrder::Big, chunks: Vec::new(), slots: [None; 4] }
  }

  /// All chunks, in order.
  #[inline]
  #[must_use]
  pub fn chunks(&self) -> &[GffChunk] {
    &self.chunks
  }

  /// Adds a chunk with a zeroed payload of `len` bytes, then gives it back so
  /// that the payload can be filled in.
  ///
  /// ## Failure
  /// * [`DuplicateChunk`](CodecError::DuplicateChunk) if the tag is a
  ///   singleton that's already present.
  /// * Allocation failure.
  #[inline]
  pub fn append_chunk(&mut self, tag: GffTag, len: usize) -> Result<&mut GffChunk, CodecError> {
    let data = try_vec_filled(len, 0_u8)?;
    self.push_chunk(tag, data)
  }

  /// Adds a chunk with an existing payload.
  ///
  /// ## Failure
  /// * [`DuplicateChunk`](CodecError::DuplicateChunk) if the tag is a
  ///   singleton that's already present.
  /// * Allocation failure.
  pub fn push_chunk(&mut self, tag: GffTag, data: Vec<u8>) -> Result<&mut GffChunk, CodecError> {
    let slot = tag.slot();
    if let Some(s) = slot {
      if self.slots[s].is_some() {
        return Err(CodecError::DuplicateChunk(tag));
      }
    }
    self.chunks.try_reserve(1)?;
    let index = self.chunks.len();
    self.chunks.push(GffChunk { tag, data });
    if let Some(s) = slot {
      self.slots[s] = Some(index);
    }
    Ok(&mut self.chunks[index])
  }

  /// The first chunk with the given tag.
  #[inline]
  #[must_use]
  pub fn find_chunk(&self, tag: GffTag) -> Option<&GffChunk> {
    match tag.slot() {
      Some(s) => self.slots[s].and_then(|i| self.chunks.get(i)),
      None => self.chunks.iter().find(|c| c.tag == tag),
    }
  }

  /// The `INFO` chunk.
  #[inline]
  #[must_use]
  pub fn info_chunk(&self) -> Option<&GffChunk> {
    self.slots[0].and_then(|i| self.chunks.get(i))
  }
  /// The `RGBA` chunk.
  #[inline]
  #[must_use]
  pub fn pixels_chunk(&self) -> Option<&GffChunk> {
    self.slots[1].and_then(|i| self.chunks.get(i))
  }
  /// The `PALC` chunk.
  #[inline]
  #[must_use]
  pub fn palette_chunk(&self) -> Option<&GffChunk> {
    self.slots[2].and_then(|i| self.chunks.get(i))
  }
  /// The `IPAL` chunk.
  #[inline]
  #[must_use]
  pub fn inverse_map_chunk(&self) -> Option<&GffChunk> {
    self.slots[3].and_then(|i| self.chunks.get(i))
  }

  /// Parses the `INFO` chunk.
  #[inline]
  pub fn image_info(&self) -> Result<GffImageInfo, CodecError> {
    let chunk = self.info_chunk().ok_or(CodecError::MissingChunk(GffTag::INFO))?;
    GffImageInfo::from_payload(&chunk.data, self.byte_order)
  }

  /// Parses the `PALC` chunk.
  #[inline]
  pub fn palette(&self) -> Result<GffPalette, CodecError> {
    let chunk = self.palette_chunk().ok_or(CodecError::MissingChunk(GffTag::PALETTE))?;
    GffPalette::from_payload(&chunk.data)
  }

  /// Loads every chunk from the bytes of a GFF file.
  ///
  /// ## Failure
  /// * [`UnexpectedEof`](CodecError::UnexpectedEof) if the data ends partway
  ///   through a chunk header or payload.
  /// * [`MissingChunk`](CodecError::MissingChunk) if the first chunk isn't
  ///   `INFO`.
  /// * [`BadHeader`](CodecError::BadHeader) if the byte order marker is wrong,
  ///   or a chunk tag isn't four printable ASCII characters.
  /// * [`DuplicateChunk`](CodecError::DuplicateChunk) if a singleton tag
  ///   appears twice.
  pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    let marker: [u8; 4] = match bytes.get(8..12) {
      Some(m) => [m[0], m[1], m[2], m[3]],
      None => return Err(CodecError::UnexpectedEof),
    };
    let byte_order =
      ByteOrder::from_marker(marker).ok_or(CodecError::BadHeader("GFF byte order marker"))?;
    let mut container = Self { byte_order, ..Self::new() };
    let mut src = ByteSource::new(bytes);
    while !src.is_eof() {
      let tag = byte_order.tag_from_bytes(src.read_array()?);
      if !tag.is_printable() {
        return Err(CodecError::BadHeader("GFF chunk tag"));
      }
      if container.chunks.is_empty() && tag != GffTag::INFO {
        return Err(CodecError::MissingChunk(GffTag::INFO));
      }
      let len = byte_order.word_from_bytes(src.read_array()?) as usize;
      let payload = src.read_slice(len)?;
      trace!("GFF chunk {tag:?}, {len} bytes");
      let mut data = Vec::new();
      data.try_reserve_exact(len)?;
      data.extend_from_slice(payload);
      container.push_chunk(tag, data)?;
    }
    debug!("GFF loaded: {} chunks, {byte_order:?}", container.chunks.len());
    Ok(container)
  }

  /// Writes every chunk out, in order.
  ///
  /// ## Failure
  /// * A payload is longer than `u32::MAX`.
  /// * Allocation failure.
  pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
    let total = self.chunks.iter().map(|c| 8 + c.data.len()).sum();
    let mut out = Vec::new();
    out.try_reserve_exact(total)?;
    for chunk in &self.chunks {
      let len = u32::try_from(chunk.data.len())?;
      out.extend_from_slice(&self.byte_order.tag_to_bytes(chunk.tag));
      out.extend_from_slice(&self.byte_order.word_to_bytes(len));
      out.extend_from_slice(&chunk.data);
    }
    Ok(out)
  }

  /// Builds a container with `INFO` then `RGBA`.
  pub fn from_bitmap(bitmap: &Bitmap) -> Result<Self, CodecError> {
    let mut container = Self::new();
    let info = GffImageInfo { width: bitmap.width, height: bitmap.height };
    container.push_info(info)?;
    let pixels = container.append_chunk(GffTag::PIXELS, bitmap.pixels.len() * 4)?;
    let quads: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut pixels.data);
    for (quad, p) in quads.iter_mut().zip(bitmap.pixels.iter()) {
      *quad = [p.r, p.g, p.b, p.a];
    }
    Ok(container)
  }

  /// Builds a container with `INFO`, `PALC` (all flags clear), then `INDX`.
  pub fn from_palmap(palmap: &Palmap) -> Result<Self, CodecError> {
    let mut container = Self::new();
    let info = GffImageInfo { width: palmap.width, height: palmap.height };
    container.push_info(info)?;
    let palette = GffPalette { colors: palmap.palette, flags: [0; 256] };
    container.push_chunk(GffTag::PALETTE, palette.to_payload()?)?;
    let mut indexes = Vec::new();
    indexes.try_reserve_exact(palmap.indexes.len())?;
    indexes.extend_from_slice(&palmap.indexes);
    container.push_chunk(GffTag::INDEXES, indexes)?;
    Ok(container)
  }

  #[inline]
  fn push_info(&mut self, info: GffImageInfo) -> Result<(), CodecError> {
    let payload = info.to_payload(self.byte_order);
    self.append_chunk(GffTag::INFO, payload.len())?.data.copy_from_slice(&payload);
    Ok(())
  }

  /// Builds the inverse palette map for the `PALC` chunk and adds it as an
  /// `IPAL` chunk.
  pub fn push_inverse_map(&mut self) -> Result<(), CodecError> {
    let palette = self.palette()?;
    let cube = gff_build_inverse_map(&palette)?;
    self.push_chunk(GffTag::INVERSE_MAP, cube)?;
    Ok(())
  }

  /// Decodes the image as RGBA.
  ///
  /// Uses the `RGBA` chunk if there is one, otherwise the `INDX` and `PALC`
  /// chunks (with transparent palette entries giving alpha 0).
  pub fn to_bitmap(&self, options: &DecodeOptions) -> Result<Bitmap, CodecError> {
    let info = self.image_info()?;
    if let Some(chunk) = self.pixels_chunk() {
      info.check_plane_len(chunk.data.len(), 4, options, "GFF pixel chunk length")?;
      let mut bitmap =
        Bitmap::try_new(info.width, info.height, r8g8b8a8_Srgb::default(), options)?;
      let quads: &[[u8; 4]] = bytemuck::cast_slice(&chunk.data);
      for (p, [r, g, b, a]) in bitmap.pixels.iter_mut().zip(quads.iter().copied()) {
        *p = r8g8b8a8_Srgb { r, g, b, a };
      }
      bitmap.has_alpha = bitmap.pixels.iter().any(|p| p.a < 0xFF);
      Ok(bitmap)
    } else {
      let indexes =
        self.find_chunk(GffTag::INDEXES).ok_or(CodecError::MissingChunk(GffTag::PIXELS))?;
      info.check_plane_len(indexes.data.len(), 1, options, "GFF index chunk length")?;
      let palette = self.palette()?;
      let mut bitmap =
        Bitmap::try_new(info.width, info.height, r8g8b8a8_Srgb::default(), options)?;
      for (p, i) in bitmap.pixels.iter_mut().zip(indexes.data.iter().copied()) {
        *p = palette.rgba(i);
      }
      bitmap.has_alpha = bitmap.pixels.iter().any(|p| p.a < 0xFF);
      Ok(bitmap)
    }
  }

  /// Decodes the image as indexed color, from the `INDX` and `PALC` chunks.
  pub fn to_palmap(&self, options: &DecodeOptions) -> Result<Palmap, CodecError> {
    let info = self.image_info()?;
    let indexes =
      self.find_chunk(GffTag::INDEXES).ok_or(CodecError::MissingChunk(GffTag::INDEXES))?;
    info.check_plane_len(indexes.data.len(), 1, options, "GFF index chunk length")?;
    let palette = self.palette()?;
    let mut palmap = Palmap::try_new(info.width, info.height, options)?;
    palmap.indexes.copy_from_slice(&indexes.data);
    palmap.palette = palette.colors;
    Ok(palmap)
  }
}

/// Builds a nearest-color lookup cube for a palette.
///
/// The cube is indexed by `(r >> 3) << 10 | (g >> 3) << 5 | (b >> 3)`. Entries
/// flagged as unusable or transparent are never picked. If every entry is
/// excluded the whole cube is index 0.
pub fn gff_build_inverse_map(palette: &GffPalette) -> Result<Vec<u8>, CodecError> {
  let mut cube = try_vec_filled(GFF_INVERSE_MAP_LEN, 0_u8)?;
  let usable: Vec<(u8, r8g8b8_Srgb)> = (0..=255_u8)
    .zip(palette.colors.iter().copied())
    .filter(|(i, _)| {
      (palette.flags[usize::from(*i)] & (GFF_PAL_UNUSABLE | GFF_PAL_TRANSPARENT)) == 0
    })
    .collect();
  if usable.is_empty() {
    return Ok(cube);
  }
  let expand = |v: usize| -> i32 {
    let v = v as i32;
    (v << 3) | (v >> 2)
  };
  for (cell, out) in cube.iter_mut().enumerate() {
    let r = expand(cell >> 10);
    let g = expand((cell >> 5) & 0x1F);
    let b = expand(cell & 0x1F);
    let mut best = (u32::MAX, 0_u8);
    for (i, c) in usable.iter() {
      let dr = i32::from(c.r) - r;
      let dg = i32::from(c.g) - g;
      let db = i32::from(c.b) - b;
      let dist = (dr * dr + dg * dg + db * db) as u32;
      if dist < best.0 {
        best = (dist, *i);
      }
    }
    *out = best.1;
  }
  Ok(cube)
}

impl Bitmap {
  /// Attempts to parse the bytes of a GFF file into a bitmap.
  #[inline]
  pub fn try_from_gff_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    Self::try_from_gff_bytes_with(bytes, &DecodeOptions::default())
  }

  /// As [`try_from_gff_bytes`](Self::try_from_gff_bytes), with options.
  #[inline]
  pub fn try_from_gff_bytes_with(
    bytes: &[u8], options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    GffContainer::try_from_bytes(bytes)?.to_bitmap(options)
  }

  /// Encodes the bitmap as a GFF file with `INFO` and `RGBA` chunks.
  #[inline]
  pub fn to_gff_bytes(&self) -> Result<Vec<u8>, CodecError> {
    GffContainer::from_bitmap(self)?.to_bytes()
  }
}

impl Palmap {
  /// Attempts to parse the bytes of a GFF file into an indexed image.
  #[inline]
  pub fn try_from_gff_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    Self::try_from_gff_bytes_with(bytes, &DecodeOptions::default())
  }

  /// As [`try_from_gff_bytes`](Self::try_from_gff_bytes), with options.
  #[inline]
  pub fn try_from_gff_bytes_with(
    bytes: &[u8], options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    GffContainer::try_from_bytes(bytes)?.to_palmap(options)
  }

  /// Encodes the image as a GFF file with `INFO`, `PALC`, and `INDX` chunks.
  #[inline]
  pub fn to_gff_bytes(&self) -> Result<Vec<u8>, CodecError> {
    GffContainer::from_palmap(self)?.to_bytes()
  }
}

#[test]
fn test_gff_tag_debug_and_singletons() {
  use alloc::format;
  assert_eq!(format!("{:?}", GffTag::PALETTE), "PALC");
  assert_eq!(format!("{:?}", GffTag([0, 1, 2, 3])), "[0, 1, 2, 3]");
  assert!(GffTag::INFO.is_singleton());
  assert!(GffTag::INVERSE_MAP.is_singleton());
  assert!(!GffTag::INDEXES.is_singleton());
  assert!(!GffTag(*b"XTRA").is_singleton());
}

#[test]
fn test_gff_append_then_find() {
  let mut c = GffContainer::new();
  c.append_chunk(GffTag::INFO, 12).unwrap();
  c.append_chunk(GffTag::INDEXES, 3).unwrap().data.copy_from_slice(&[7, 8, 9]);
  c.append_chunk(GffTag::INDEXES, 1).unwrap();
  assert_eq!(c.find_chunk(GffTag::INDEXES).unwrap().data, [7, 8, 9]);
  assert_eq!(c.find_chunk(GffTag::INFO).unwrap().data, [0; 12]);
  assert!(c.find_chunk(GffTag::PIXELS).is_none());
  assert_eq!(
    c.append_chunk(GffTag::INFO, 12).map(drop),
    Err(CodecError::DuplicateChunk(GffTag::INFO))
  );
  assert_eq!(c.chunks().len(), 3);
}

#[test]
fn test_gff_reads_little_endian_files() {
  #[rustfmt::skip]
  let bytes = [
    b'O', b'F', b'N', b'I', 12, 0, 0, 0,
    0xCD, 0xAB, 0x34, 0x12, 1, 0, 0, 0, 1, 0, 0, 0,
    b'A', b'B', b'G', b'R', 4, 0, 0, 0,
    10, 20, 30, 40,
  ];
  let c = GffContainer::try_from_bytes(&bytes).unwrap();
  assert_eq!(c.byte_order, ByteOrder::Little);
  assert_eq!(c.image_info(), Ok(GffImageInfo { width: 1, height: 1 }));
  let bitmap = c.to_bitmap(&DecodeOptions::default()).unwrap();
  assert!(bitmap.has_alpha);
  assert_eq!(bitmap.pixels[0], r8g8b8a8_Srgb { r: 10, g: 20, b: 30, a: 40 });
  assert_eq!(c.to_bytes().unwrap(), bytes);
}

#[test]
fn test_gff_inverse_map_skips_unusable_entries() {
  let mut palette = GffPalette::default();
  palette.colors[0] = r8g8b8_Srgb { r: 255, g: 255, b: 255 };
  palette.flags[0] = GFF_PAL_UNUSABLE;
  palette.colors[1] = r8g8b8_Srgb { r: 250, g: 250, b: 250 };
  palette.flags[1] = GFF_PAL_TRANSPARENT;
  palette.colors[2] = r8g8b8_Srgb { r: 200, g: 200, b: 200 };
  palette.flags[3..].fill(GFF_PAL_UNUSABLE);
  let cube = gff_build_inverse_map(&palette).unwrap();
  assert_eq!(cube.len(), GFF_INVERSE_MAP_LEN);
  assert_eq!(cube[GFF_INVERSE_MAP_LEN - 1], 2);
  assert_eq!(cube[0], 2);
}
