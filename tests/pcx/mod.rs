use pixcodec::{
  pcx::{pcx_read_palette, PCX_PALETTE_TRAILER_LEN},
  r8g8b8_Srgb, Bitmap, CodecError, DecodeOptions, Palmap,
};

use crate::rand_bytes;

fn palmap(width: u32, height: u32, indexes: &[u8]) -> Palmap {
  let mut palmap = Palmap::try_new(width, height, &DecodeOptions::default()).unwrap();
  palmap.indexes.copy_from_slice(indexes);
  for (i, c) in palmap.palette.iter_mut().enumerate() {
    *c = r8g8b8_Srgb { r: i as u8, g: 255 - i as u8, b: (i as u8).rotate_left(3) };
  }
  palmap
}

#[test]
fn test_pcx_escapes_high_bytes() {
  let palmap = palmap(6, 1, &[0xC5, 0xC5, 0xC5, 0xC5, 0xC5, 0x10]);
  let bytes = palmap.to_pcx_bytes().unwrap();
  let body = &bytes[128..bytes.len() - PCX_PALETTE_TRAILER_LEN];
  assert_eq!(body, [0xC1, 0xC5, 0xC1, 0xC5, 0xC1, 0xC5, 0xC1, 0xC5, 0xC1, 0xC5, 0x10]);
  assert_eq!(Palmap::try_from_pcx_bytes(&bytes).unwrap(), palmap);

  let palmap = crate::pcx::palmap(3, 1, &[0xC5, 0x10, 0xC5]);
  let bytes = palmap.to_pcx_bytes().unwrap();
  let body = &bytes[128..bytes.len() - PCX_PALETTE_TRAILER_LEN];
  assert_eq!(body, [0xC1, 0xC5, 0x10, 0xC1, 0xC5, 0xC1, 0x00]);
  assert_eq!(Palmap::try_from_pcx_bytes(&bytes).unwrap(), palmap);
}

#[test]
fn test_pcx_round_trip() {
  for (width, height) in [(1, 1), (7, 5), (64, 3), (130, 2)] {
    let palmap = palmap(width, height, &rand_bytes((width * height) as usize));
    let bytes = palmap.to_pcx_bytes().unwrap();
    assert_eq!(Palmap::try_from_pcx_bytes(&bytes).unwrap(), palmap, "{width}x{height}");
  }
}

#[test]
fn test_pcx_to_bitmap_goes_through_the_palette() {
  let palmap = palmap(2, 1, &[3, 200]);
  let bitmap = Bitmap::try_from_pcx_bytes(&palmap.to_pcx_bytes().unwrap()).unwrap();
  assert!(!bitmap.has_alpha);
  let p = bitmap.pixels[1];
  assert_eq!([p.r, p.g, p.b, p.a], [200, 55, 200_u8.rotate_left(3), 255]);
}

#[test]
fn test_pcx_palette_only() {
  let palmap = palmap(2, 2, &[0, 1, 2, 3]);
  let bytes = palmap.to_pcx_bytes().unwrap();
  assert_eq!(pcx_read_palette(&bytes), Ok(palmap.palette));
  assert_eq!(pcx_read_palette(&bytes[..700]), Err(CodecError::MissingPalette));
}

#[test]
fn test_pcx_truncated_body() {
  let palmap = palmap(4, 4, &(0..16).collect::<Vec<u8>>());
  let bytes = palmap.to_pcx_bytes().unwrap();
  let trailer = &bytes[bytes.len() - PCX_PALETTE_TRAILER_LEN..];
  let mut cut = bytes[..130].to_vec();
  cut.extend_from_slice(trailer);
  assert_eq!(Palmap::try_from_pcx_bytes(&cut), Err(CodecError::UnexpectedEof));

  // the same 4 data bytes under a header that claims 16000 x 16000
  let mut huge = bytes.clone();
  huge[8..10].copy_from_slice(&15999_u16.to_le_bytes());
  huge[10..12].copy_from_slice(&15999_u16.to_le_bytes());
  huge[66..68].copy_from_slice(&16000_u16.to_le_bytes());
  assert_eq!(Palmap::try_from_pcx_bytes(&huge), Err(CodecError::UnexpectedEof));
}

#[test]
fn test_pcx_rejects_bad_headers() {
  let bytes = palmap(4, 1, &[1, 2, 3, 4]).to_pcx_bytes().unwrap();

  let mut b = bytes.clone();
  b[0] = 0x0B;
  assert!(matches!(Palmap::try_from_pcx_bytes(&b), Err(CodecError::BadHeader(_))));

  let mut b = bytes.clone();
  b[1] = 3;
  assert!(matches!(Palmap::try_from_pcx_bytes(&b), Err(CodecError::Unsupported(_))));

  let mut b = bytes.clone();
  b[3] = 1;
  assert!(matches!(Palmap::try_from_pcx_bytes(&b), Err(CodecError::Unsupported(_))));

  let mut b = bytes.clone();
  b[65] = 3;
  assert!(matches!(Palmap::try_from_pcx_bytes(&b), Err(CodecError::Unsupported(_))));

  // bytes per line smaller than the width
  let mut b = bytes;
  b[66] = 2;
  assert!(matches!(Palmap::try_from_pcx_bytes(&b), Err(CodecError::BadHeader(_))));
}
