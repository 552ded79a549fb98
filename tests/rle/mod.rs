use pixcodec::{
  rle::{packbits_unpack, pcx_rle_pack_row, pcx_rle_unpack, tga_rle_unpack},
  ByteSource, CodecError,
};

use crate::{packbits_pack_row, sample_rows, tga_rle_pack};

#[test]
fn test_packbits_unpacks_its_packing() {
  for len in [1, 2, 127, 128, 129, 300] {
    for row in sample_rows(len) {
      let packed = packbits_pack_row(&row);
      let mut out = vec![0; len];
      let mut src = ByteSource::new(&packed);
      packbits_unpack(&mut src, &mut out, 1, len, 1).unwrap();
      assert_eq!(out, row, "len {len}");
      assert!(src.is_eof());
    }
  }
}

#[test]
fn test_packbits_empty_and_longest_run() {
  let mut out = [0_u8; 0];
  packbits_unpack(&mut ByteSource::new(&[]), &mut out, 1, 0, 1).unwrap();
  // -128 repeats 129 times.
  let mut out = [0_u8; 129];
  let mut src = ByteSource::new(&[0x80, 7]);
  packbits_unpack(&mut src, &mut out, 1, 129, 1).unwrap();
  assert_eq!(out, [7; 129]);
  assert!(src.is_eof());
  let mut out = [0_u8; 128];
  assert_eq!(
    packbits_unpack(&mut ByteSource::new(&[0x80, 7]), &mut out, 1, 128, 1),
    Err(CodecError::Overrun)
  );
}

#[test]
fn test_packbits_truncated() {
  let packed = packbits_pack_row(&[1, 2, 3, 4]);
  let mut out = [0_u8; 4];
  assert_eq!(
    packbits_unpack(&mut ByteSource::new(&packed[..3]), &mut out, 1, 4, 1),
    Err(CodecError::UnexpectedEof)
  );
}

#[test]
fn test_packbits_destination_too_small() {
  let mut out = [0_u8; 3];
  assert_eq!(
    packbits_unpack(&mut ByteSource::new(&[0xFD, 1]), &mut out, 1, 4, 1),
    Err(CodecError::Overrun)
  );
}

#[test]
fn test_pcx_rle_unpacks_its_packing() {
  for len in [1, 62, 63, 64, 127, 200] {
    for row in sample_rows(len) {
      let mut packed = Vec::new();
      pcx_rle_pack_row(&row, &mut packed).unwrap();
      let mut out = vec![0; len];
      let mut src = ByteSource::new(&packed);
      pcx_rle_unpack(&mut src, &mut out, 1, len, 1).unwrap();
      assert_eq!(out, row, "len {len}");
      assert!(src.is_eof());
    }
  }
}

#[test]
fn test_pcx_rle_run_lengths_cap_at_63() {
  let mut packed = Vec::new();
  pcx_rle_pack_row(&[7; 64], &mut packed).unwrap();
  assert_eq!(packed, [0xFF, 7, 7]);
}

#[test]
fn test_pcx_rle_run_past_scanline_is_overrun() {
  let mut out = [0_u8; 4];
  assert_eq!(
    pcx_rle_unpack(&mut ByteSource::new(&[0xC5, 1]), &mut out, 1, 4, 1),
    Err(CodecError::Overrun)
  );
}

#[test]
fn test_tga_rle_unpacks_its_packing() {
  for bytes_per_pixel in [3, 4] {
    for pixel_count in [1, 2, 128, 129, 300] {
      let mut data = vec![0; pixel_count * bytes_per_pixel];
      // half repeated pixels, half random
      let noise = crate::rand_bytes(data.len() / 2);
      data[..noise.len()].copy_from_slice(&noise);
      let packed = tga_rle_pack(&data, bytes_per_pixel);
      let mut out = vec![0; data.len()];
      let mut src = ByteSource::new(&packed);
      tga_rle_unpack(&mut src, &mut out, bytes_per_pixel, pixel_count).unwrap();
      assert_eq!(out, data, "{bytes_per_pixel} bpp, {pixel_count} px");
      assert!(src.is_eof());
    }
  }
}

#[test]
fn test_tga_rle_truncated() {
  let mut out = [0_u8; 6];
  assert_eq!(
    tga_rle_unpack(&mut ByteSource::new(&[0x01, 1, 2, 3, 4]), &mut out, 3, 2),
    Err(CodecError::UnexpectedEof)
  );
}
