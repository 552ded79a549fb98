use pixcodec::{
  r8g8b8a8_Srgb,
  tga::{TgaHeader, TGA_DESCRIPTOR_TOP_TO_BOTTOM, TGA_TYPE_RAW, TGA_TYPE_RLE},
  Bitmap, CodecError, DecodeOptions,
};

use crate::{rand_bytes, tga_rle_pack};

fn header(
  image_type: u8, width: u16, height: u16, bits_per_pixel: u8, descriptor: u8,
) -> Vec<u8> {
  let header = TgaHeader {
    image_type,
    width: width.into(),
    height: height.into(),
    bits_per_pixel,
    descriptor,
    ..TgaHeader::default()
  };
  bytemuck::bytes_of(&header).to_vec()
}

fn rgba(r: u8, g: u8, b: u8, a: u8) -> r8g8b8a8_Srgb {
  r8g8b8a8_Srgb { r, g, b, a }
}

#[test]
fn test_tga_2x2_bottom_up() {
  let mut bytes = header(TGA_TYPE_RAW, 2, 2, 32, 8);
  // stored rows, bottom row first, BGRA
  bytes.extend_from_slice(&[3, 2, 1, 255, 6, 5, 4, 255]);
  bytes.extend_from_slice(&[9, 8, 7, 128, 12, 11, 10, 0]);
  let bitmap = Bitmap::try_from_tga_bytes(&bytes).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (2, 2));
  assert!(bitmap.has_alpha);
  assert_eq!(bitmap.get(0, 0), Some(&rgba(7, 8, 9, 128)));
  assert_eq!(bitmap.get(1, 0), Some(&rgba(10, 11, 12, 0)));
  assert_eq!(bitmap.get(0, 1), Some(&rgba(1, 2, 3, 255)));
  assert_eq!(bitmap.get(1, 1), Some(&rgba(4, 5, 6, 255)));
}

#[test]
fn test_tga_top_to_bottom_is_not_flipped() {
  let mut bytes = header(TGA_TYPE_RAW, 1, 2, 24, TGA_DESCRIPTOR_TOP_TO_BOTTOM);
  bytes.extend_from_slice(&[3, 2, 1, 6, 5, 4]);
  let bitmap = Bitmap::try_from_tga_bytes(&bytes).unwrap();
  assert!(!bitmap.has_alpha);
  assert_eq!(bitmap.pixels, [rgba(1, 2, 3, 255), rgba(4, 5, 6, 255)]);
}

#[test]
fn test_tga_id_field_is_skipped() {
  let mut bytes = header(TGA_TYPE_RAW, 1, 1, 24, 0);
  bytes[0] = 3;
  bytes.extend_from_slice(b"abc");
  bytes.extend_from_slice(&[30, 20, 10]);
  let bitmap = Bitmap::try_from_tga_bytes(&bytes).unwrap();
  assert_eq!(bitmap.pixels, [rgba(10, 20, 30, 255)]);
}

#[test]
fn test_tga_round_trip() {
  let (width, height) = (13, 7);
  let noise = rand_bytes(width * height * 4);
  let pixels: Vec<r8g8b8a8_Srgb> =
    noise.chunks_exact(4).map(|c| rgba(c[0], c[1], c[2], c[3])).collect();
  let bitmap = Bitmap { width: width as u32, height: height as u32, has_alpha: true, pixels };
  let bytes = bitmap.to_tga_bytes().unwrap();
  assert_eq!(bytes.len(), 18 + width * height * 4);
  assert_eq!(Bitmap::try_from_tga_bytes(&bytes).unwrap(), bitmap);
}

#[test]
fn test_tga_rle_decodes() {
  let (width, height) = (40_usize, 5_usize);
  let mut stored = Vec::new();
  for y in 0..height {
    for x in 0..width {
      // long runs on some rows, noise on others
      let v = if y % 2 == 0 { y as u8 } else { (x * 7 + y) as u8 };
      stored.extend_from_slice(&[v, v.wrapping_add(1), v.wrapping_add(2)]);
    }
  }
  let mut bytes =
    header(TGA_TYPE_RLE, width as u16, height as u16, 24, TGA_DESCRIPTOR_TOP_TO_BOTTOM);
  bytes.extend_from_slice(&tga_rle_pack(&stored, 3));
  let bitmap = Bitmap::try_from_tga_bytes(&bytes).unwrap();
  for (p, s) in bitmap.pixels.iter().zip(stored.chunks_exact(3)) {
    assert_eq!(*p, rgba(s[2], s[1], s[0], 255));
  }
}

#[test]
fn test_tga_rle_overrun() {
  let mut bytes = header(TGA_TYPE_RLE, 2, 1, 24, 0);
  bytes.extend_from_slice(&[0x82, 1, 2, 3]);
  assert_eq!(Bitmap::try_from_tga_bytes(&bytes), Err(CodecError::Overrun));
}

#[test]
fn test_tga_claims_more_than_it_has() {
  let mut bytes = header(TGA_TYPE_RAW, 100, 100, 32, 0);
  bytes.extend_from_slice(&rand_bytes(500));
  assert_eq!(Bitmap::try_from_tga_bytes(&bytes), Err(CodecError::UnexpectedEof));
  assert_eq!(Bitmap::try_from_tga_bytes(&bytes[..10]), Err(CodecError::UnexpectedEof));
}

#[test]
fn test_tga_dimensions_past_the_data_are_truncated() {
  let bytes = header(TGA_TYPE_RAW, 1000, 1000, 24, 0);
  assert_eq!(Bitmap::try_from_tga_bytes(&bytes), Err(CodecError::UnexpectedEof));
  // one run packet can't cover more than 128 pixels
  let mut bytes = header(TGA_TYPE_RLE, 1000, 1000, 32, 0);
  bytes.extend_from_slice(&[0xFF, 1, 2, 3, 4]);
  assert_eq!(Bitmap::try_from_tga_bytes(&bytes), Err(CodecError::UnexpectedEof));
}

#[test]
fn test_tga_rejects_bad_headers() {
  let mut bytes = header(TGA_TYPE_RAW, 1, 1, 24, 0);
  bytes.extend_from_slice(&[0, 0, 0]);
  bytes[1] = 1;
  assert!(matches!(Bitmap::try_from_tga_bytes(&bytes), Err(CodecError::Unsupported(_))));
  bytes[1] = 0;
  bytes[16] = 16;
  assert!(matches!(Bitmap::try_from_tga_bytes(&bytes), Err(CodecError::Unsupported(_))));
  bytes[16] = 24;
  bytes[12] = 0;
  assert_eq!(Bitmap::try_from_tga_bytes(&bytes), Err(CodecError::WidthOrHeightZero));
}

#[test]
fn test_tga_respects_dimension_limits() {
  let mut bytes = header(TGA_TYPE_RAW, 2, 2, 24, 0);
  bytes.extend_from_slice(&[0; 12]);
  let opts = DecodeOptions::default().with_max_dimensions(1, 1);
  assert_eq!(
    Bitmap::try_from_tga_bytes_with(&bytes, &opts),
    Err(CodecError::DimensionsTooLarge)
  );
}

#[test]
fn test_tga_encoder_rejects_huge_width() {
  let pixels = vec![rgba(0, 0, 0, 255); 70_000];
  let bitmap = Bitmap { width: 70_000, height: 1, has_alpha: false, pixels };
  assert!(matches!(bitmap.to_tga_bytes(), Err(CodecError::Unsupported(_))));
}
