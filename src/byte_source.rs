#![forbid(unsafe_code)]

//! A sequential, seekable read view over the bytes of a loaded file.
//!
//! Every read either gives back the full amount asked for or fails with
//! [`CodecError::UnexpectedEof`] and leaves the position where it was. There's
//! no partial read.

use bytemuck::{pod_read_unaligned, Pod};
use core::mem::size_of;

use crate::CodecError;

/// Cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteSource<'b> {
  bytes: &'b [u8],
  pos: usize,
}
impl<'b> ByteSource<'b> {
  /// Starts reading at the beginning of `bytes`.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self { bytes, pos: 0 }
  }

  /// Current read position, from the start of the data.
  #[inline]
  #[must_use]
  pub const fn position(&self) -> usize {
    self.pos
  }

  /// Total length of the underlying data.
  #[inline]
  #[must_use]
  pub const fn len(&self) -> usize {
    self.bytes.len()
  }

  /// If the underlying data is empty.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  /// Bytes left after the current position.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> usize {
    self.bytes.len() - self.pos
  }

  /// If all the data has been read.
  #[inline]
  #[must_use]
  pub const fn is_eof(&self) -> bool {
    self.pos >= self.bytes.len()
  }

  /// Moves to an absolute position. Seeking to exactly the end is allowed.
  #[inline]
  pub fn seek(&mut self, pos: usize) -> Result<(), CodecError> {
    if pos <= self.bytes.len() {
      self.pos = pos;
      Ok(())
    } else {
      Err(CodecError::UnexpectedEof)
    }
  }

  /// Moves forward `count` bytes.
  #[inline]
  pub fn skip(&mut self, count: usize) -> Result<(), CodecError> {
    self.read_slice(count).map(drop)
  }

  /// Borrows the next `count` bytes and moves past them.
  #[inline]
  pub fn read_slice(&mut self, count: usize) -> Result<&'b [u8], CodecError> {
    let end = self.pos.checked_add(count).ok_or(CodecError::UnexpectedEof)?;
    match self.bytes.get(self.pos..end) {
      Some(s) => {
        self.pos = end;
        Ok(s)
      }
      None => Err(CodecError::UnexpectedEof),
    }
  }

  /// Fills all of `out`.
  #[inline]
  pub fn read_exact(&mut self, out: &mut [u8]) -> Result<(), CodecError> {
    out.copy_from_slice(self.read_slice(out.len())?);
    Ok(())
  }

  /// Reads one byte.
  #[inline]
  pub fn read_u8(&mut self) -> Result<u8, CodecError> {
    match self.bytes.get(self.pos) {
      Some(b) => {
        self.pos += 1;
        Ok(*b)
      }
      None => Err(CodecError::UnexpectedEof),
    }
  }

  /// Reads a fixed size byte array.
  #[inline]
  pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
    let mut a = [0_u8; N];
    self.read_exact(&mut a)?;
    Ok(a)
  }

  /// Reads any plain-old-data value, regardless of alignment.
  #[inline]
  pub fn read_pod<T: Pod>(&mut self) -> Result<T, CodecError> {
    self.read_slice(size_of::<T>()).map(pod_read_unaligned)
  }

  #[inline]
  #[allow(missing_docs)]
  pub fn read_u16_be(&mut self) -> Result<u16, CodecError> {
    self.read_array().map(u16::from_be_bytes)
  }
  #[inline]
  #[allow(missing_docs)]
  pub fn read_i16_be(&mut self) -> Result<i16, CodecError> {
    self.read_array().map(i16::from_be_bytes)
  }
  #[inline]
  #[allow(missing_docs)]
  pub fn read_u32_be(&mut self) -> Result<u32, CodecError> {
    self.read_array().map(u32::from_be_bytes)
  }
  #[inline]
  #[allow(missing_docs)]
  pub fn read_i32_be(&mut self) -> Result<i32, CodecError> {
    self.read_array().map(i32::from_be_bytes)
  }
  #[inline]
  #[allow(missing_docs)]
  pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
    self.read_array().map(u16::from_le_bytes)
  }
  #[inline]
  #[allow(missing_docs)]
  pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
    self.read_array().map(u32::from_le_bytes)
  }

  /// A new source over the next `count` bytes. This source moves past them.
  ///
  /// Useful for fencing off a length-prefixed block so that a decoder working
  /// inside of it can't read what comes after.
  #[inline]
  pub fn take(&mut self, count: usize) -> Result<ByteSource<'b>, CodecError> {
    self.read_slice(count).map(ByteSource::new)
  }
}

#[test]
fn test_byte_source_reads_are_all_or_nothing() {
  let mut src = ByteSource::new(&[1, 2, 3, 4, 5]);
  assert_eq!(src.read_u16_be(), Ok(0x0102));
  assert_eq!(src.read_u32_be(), Err(CodecError::UnexpectedEof));
  assert_eq!(src.position(), 2);
  assert_eq!(src.read_array::<3>(), Ok([3, 4, 5]));
  assert!(src.is_eof());
  assert_eq!(src.read_u8(), Err(CodecError::UnexpectedEof));
  assert_eq!(src.seek(5), Ok(()));
  assert_eq!(src.seek(6), Err(CodecError::UnexpectedEof));
  src.seek(1).unwrap();
  let mut inner = src.take(2).unwrap();
  assert_eq!(inner.read_u16_le(), Ok(0x0302));
  assert!(inner.is_eof());
  assert_eq!(src.read_u8(), Ok(4));
  assert_eq!(src.skip(usize::MAX), Err(CodecError::UnexpectedEof));
}
