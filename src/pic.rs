//! Module for SoftImage PIC files.
//!
//! Note: All multi-byte values in PIC are big-endian encoded.
//!
//! * The file starts with a 104 byte header ([`PicHeader`]). Only the magic
//!   and the dimensions matter, the rest is descriptive.
//! * Next is a chained list of channel packets ([`PicPacket`]). Each packet
//!   says which of the R, G, B, and A channels it carries, and how those are
//!   compressed. A packet with `chained` set is followed by another packet.
//! * Next is the pixel data, one scanline at a time. Within each scanline the
//!   packets take turns: all of the first packet's channels for the whole
//!   scanline, then all of the second packet's channels, and so on.
//!
//! Any channel that no packet carries stays at 255.

use alloc::vec::Vec;
use bytemuck::{Pod, Zeroable};
use pack1::{U16BE, U32BE};

use crate::{logging::trace, r8g8b8a8_Srgb, Bitmap, ByteSource, CodecError, DecodeOptions};

/// The magic number at the start of every PIC file.
pub const PIC_MAGIC: u32 = 0x5380_F634;

/// A file can have at most this many channel packets.
pub const PIC_MAX_PACKETS: usize = 4;

/// Channel mask bit for red.
pub const PIC_CHANNEL_R: u8 = 0x80;
/// Channel mask bit for green.
pub const PIC_CHANNEL_G: u8 = 0x40;
/// Channel mask bit for blue.
pub const PIC_CHANNEL_B: u8 = 0x20;
/// Channel mask bit for alpha.
pub const PIC_CHANNEL_A: u8 = 0x10;

/// The fixed 104 byte header at the start of every PIC file.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct PicHeader {
  pub magic: U32BE,
  /// An `f32`, but it's not used for anything.
  pub version: [u8; 4],
  pub comment: [u8; 80],
  pub id: [u8; 4],
  pub width: U16BE,
  pub height: U16BE,
  /// An `f32`, but it's not used for anything.
  pub ratio: [u8; 4],
  pub fields: U16BE,
  pub pad: U16BE,
}
impl Default for PicHeader {
  #[inline]
  fn default() -> Self {
    Self::zeroed()
  }
}

/// Describes how one group of channels is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct PicPacket {
  /// Nonzero if another packet follows this one.
  pub chained: u8,
  /// Bits per channel.
  pub size: u8,
  /// * 0: uncompressed
  /// * 1: pure run-length
  /// * 2: mixed run-length
  pub compression: u8,
  /// Some combination of the `PIC_CHANNEL_*` bits.
  pub channels: u8,
}
impl PicPacket {
  /// Indexes (0 = R, 1 = G, 2 = B, 3 = A) of the channels this packet
  /// carries, in the order they're stored.
  #[inline]
  #[must_use]
  pub fn channel_indexes(self) -> impl Iterator<Item = usize> + Clone {
    [PIC_CHANNEL_R, PIC_CHANNEL_G, PIC_CHANNEL_B, PIC_CHANNEL_A]
      .into_iter()
      .enumerate()
      .filter(move |(_, bit)| (self.channels & bit) != 0)
      .map(|(i, _)| i)
  }

  /// The fewest bytes one scanline of this packet can take up.
  #[inline]
  #[must_use]
  pub fn least_row_len(self, width: usize) -> usize {
    let value_len = self.channel_indexes().count();
    match self.compression {
      0 => width * value_len,
      1 => ((width + 254) / 255) * (1 + value_len),
      _ => 1 + value_len,
    }
  }
}

#[inline]
fn set_channel(p: &mut r8g8b8a8_Srgb, channel: usize, value: u8) {
  match channel {
    0 => p.r = value,
    1 => p.g = value,
    2 => p.b = value,
    _ => p.a = value,
  }
}

/// Reads one value per channel and writes them into `count` pixels.
#[inline]
fn fill_run(
  src: &mut ByteSource<'_>, packet: PicPacket, value_len: usize, pixels: &mut [r8g8b8a8_Srgb],
) -> Result<(), CodecError> {
  let value = src.read_slice(value_len)?;
  for p in pixels {
    for (channel, v) in packet.channel_indexes().zip(value.iter().copied()) {
      set_channel(p, channel, v);
    }
  }
  Ok(())
}

/// Reads the next `count` pixels of one packet, checking against the row end.
#[inline]
fn row_span(
  row: &mut [r8g8b8a8_Srgb], x: usize, count: usize,
) -> Result<&mut [r8g8b8a8_Srgb], CodecError> {
  x.checked_add(count).and_then(|end| row.get_mut(x..end)).ok_or(CodecError::Overrun)
}

/// Decodes one packet's channels for one scanline.
fn read_packet_row(
  src: &mut ByteSource<'_>, packet: PicPacket, row: &mut [r8g8b8a8_Srgb],
) -> Result<(), CodecError> {
  let value_len = packet.channel_indexes().count();
  let width = row.len();
  match packet.compression {
    0 => {
      for p in row.iter_mut() {
        fill_run(src, packet, value_len, core::slice::from_mut(p))?;
      }
    }
    1 => {
      let mut x = 0;
      while x < width {
        let count = usize::from(src.read_u8()?);
        fill_run(src, packet, value_len, row_span(row, x, count)?)?;
        x += count;
      }
    }
    _ => {
      let mut x = 0;
      while x < width {
        let c = src.read_u8()?;
        if c >= 128 {
          let count = if c == 128 { usize::from(src.read_u16_be()?) } else { usize::from(c) - 127 };
          fill_run(src, packet, value_len, row_span(row, x, count)?)?;
          x += count;
        } else {
          let count = usize::from(c) + 1;
          for p in row_span(row, x, count)? {
            fill_run(src, packet, value_len, core::slice::from_mut(p))?;
          }
          x += count;
        }
      }
    }
  }
  Ok(())
}

/// Reads the chained packet list that follows the header.
pub fn pic_read_packets(src: &mut ByteSource<'_>) -> Result<Vec<PicPacket>, CodecError> {
  let mut packets = Vec::new();
  packets.try_reserve(PIC_MAX_PACKETS)?;
  loop {
    if packets.len() == PIC_MAX_PACKETS {
      return Err(CodecError::BadHeader("more than 4 PIC channel packets"));
    }
    let packet: PicPacket = src.read_pod()?;
    if packet.size != 8 {
      return Err(CodecError::Unsupported("PIC channel size other than 8 bits"));
    }
    if packet.compression > 2 {
      return Err(CodecError::Unsupported("PIC compression type"));
    }
    packets.push(packet);
    if packet.chained == 0 {
      return Ok(packets);
    }
  }
}

impl Bitmap {
  /// Attempts to parse the bytes of a PIC file into a bitmap.
  ///
  /// `has_alpha` is set if any packet carries the alpha channel.
  #[inline]
  pub fn try_from_pic_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
    Self::try_from_pic_bytes_with(bytes, &DecodeOptions::default())
  }

  /// As [`try_from_pic_bytes`](Self::try_from_pic_bytes), with options.
  pub fn try_from_pic_bytes_with(
    bytes: &[u8], options: &DecodeOptions,
  ) -> Result<Self, CodecError> {
    let mut src = ByteSource::new(bytes);
    let header: PicHeader = src.read_pod()?;
    if header.magic.get() != PIC_MAGIC {
      return Err(CodecError::BadHeader("PIC magic"));
    }
    let width = u32::from(header.width.get());
    let height = u32::from(header.height.get());
    trace!("PIC: {width} x {height}");
    let packets = pic_read_packets(&mut src)?;
    trace!("PIC packets: {packets:?}");

    options.check_dimensions(width, height)?;
    let least_row: usize = packets.iter().map(|p| p.least_row_len(width as usize)).sum();
    if src.remaining() / (height as usize) < least_row {
      return Err(CodecError::UnexpectedEof);
    }

    let white = r8g8b8a8_Srgb { r: 0xFF, g: 0xFF, b: 0xFF, a: 0xFF };
    let mut bitmap = Bitmap::try_new(width, height, white, options)?;
    for row in bitmap.pixels.chunks_exact_mut(width as usize) {
      for packet in packets.iter().copied() {
        read_packet_row(&mut src, packet, row)?;
      }
    }
    bitmap.has_alpha = packets.iter().any(|p| (p.channels & PIC_CHANNEL_A) != 0);
    Ok(bitmap)
  }
}

#[test]
fn test_pic_layout_sizes() {
  assert_eq!(core::mem::size_of::<PicHeader>(), 104);
  assert_eq!(core::mem::size_of::<PicPacket>(), 4);
}

#[test]
fn test_pic_channel_indexes() {
  let p = PicPacket {
    channels: PIC_CHANNEL_R | PIC_CHANNEL_B | PIC_CHANNEL_A,
    ..PicPacket::default()
  };
  let v: Vec<usize> = p.channel_indexes().collect();
  assert_eq!(v, [0, 2, 3]);
}

#[test]
fn test_pic_packet_chain_limit() {
  let chained = [1_u8, 8, 0, PIC_CHANNEL_R];
  let bytes: Vec<u8> = chained.iter().copied().cycle().take(4 * 5).collect();
  assert_eq!(
    pic_read_packets(&mut ByteSource::new(&bytes)),
    Err(CodecError::BadHeader("more than 4 PIC channel packets"))
  );
  assert_eq!(
    pic_read_packets(&mut ByteSource::new(&[0, 16, 0, PIC_CHANNEL_R])),
    Err(CodecError::Unsupported("PIC channel size other than 8 bits"))
  );
}

#[test]
fn test_pic_mixed_rle_row() {
  let packet =
    PicPacket { size: 8, compression: 2, channels: PIC_CHANNEL_G, ..PicPacket::default() };
  // run of 3, then 2 literals, then a long-form run of 1.
  let data = [130, 7, 1, 8, 9, 128, 0, 1, 5];
  let mut row = [r8g8b8a8_Srgb::default(); 6];
  read_packet_row(&mut ByteSource::new(&data), packet, &mut row).unwrap();
  let gs: Vec<u8> = row.iter().map(|p| p.g).collect();
  assert_eq!(gs, [7, 7, 7, 8, 9, 5]);
  let mut short_row = [r8g8b8a8_Srgb::default(); 2];
  assert_eq!(
    read_packet_row(&mut ByteSource::new(&data), packet, &mut short_row),
    Err(CodecError::Overrun)
  );
}
