use pixcodec::{
  gff::{
    ByteOrder, GffContainer, GffImageInfo, GffPalette, GffTag, GFF_INVERSE_MAP_LEN,
    GFF_PAL_TRANSPARENT,
  },
  r8g8b8_Srgb, r8g8b8a8_Srgb, Bitmap, CodecError, DecodeOptions, Palmap,
};

use crate::rand_bytes;

fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
  let mut v = tag.to_vec();
  v.extend_from_slice(&(payload.len() as u32).to_be_bytes());
  v.extend_from_slice(payload);
  v
}

fn info(width: u32, height: u32) -> Vec<u8> {
  chunk(b"INFO", &GffImageInfo { width, height }.to_payload(ByteOrder::Big))
}

#[test]
fn test_gff_1x1_rgba() {
  let mut bytes = info(1, 1);
  bytes.extend(chunk(b"RGBA", &[0x11, 0x22, 0x33, 0xFF]));
  let bitmap = Bitmap::try_from_gff_bytes(&bytes).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (1, 1));
  assert!(!bitmap.has_alpha);
  assert_eq!(bitmap.pixels, [r8g8b8a8_Srgb { r: 0x11, g: 0x22, b: 0x33, a: 0xFF }]);
}

#[test]
fn test_gff_bitmap_round_trip() {
  let noise = rand_bytes(5 * 3 * 4);
  let pixels = noise
    .chunks_exact(4)
    .map(|c| r8g8b8a8_Srgb { r: c[0], g: c[1], b: c[2], a: 0x80 })
    .collect();
  let bitmap = Bitmap { width: 5, height: 3, has_alpha: true, pixels };
  let bytes = bitmap.to_gff_bytes().unwrap();
  assert_eq!(&bytes[0..4], b"INFO");
  assert_eq!(&bytes[8..12], &[0x12, 0x34, 0xAB, 0xCD]);
  assert_eq!(Bitmap::try_from_gff_bytes(&bytes).unwrap(), bitmap);
}

#[test]
fn test_gff_palmap_round_trip() {
  let mut palmap = Palmap::try_new(4, 2, &DecodeOptions::default()).unwrap();
  palmap.indexes.copy_from_slice(&rand_bytes(8));
  palmap.palette[9] = r8g8b8_Srgb { r: 1, g: 2, b: 3 };
  let bytes = palmap.to_gff_bytes().unwrap();
  let container = GffContainer::try_from_bytes(&bytes).unwrap();
  let tags: Vec<GffTag> = container.chunks().iter().map(|c| c.tag).collect();
  assert_eq!(tags, [GffTag::INFO, GffTag::PALETTE, GffTag::INDEXES]);
  assert_eq!(Palmap::try_from_gff_bytes(&bytes).unwrap(), palmap);
}

#[test]
fn test_gff_paletted_decode_uses_transparency_flags() {
  let mut palette = GffPalette::default();
  palette.colors[1] = r8g8b8_Srgb { r: 9, g: 8, b: 7 };
  palette.colors[2] = r8g8b8_Srgb { r: 1, g: 1, b: 1 };
  palette.flags[2] = GFF_PAL_TRANSPARENT;
  let mut bytes = info(2, 1);
  bytes.extend(chunk(b"PALC", &palette.to_payload().unwrap()));
  bytes.extend(chunk(b"INDX", &[1, 2]));
  let bitmap = Bitmap::try_from_gff_bytes(&bytes).unwrap();
  assert!(bitmap.has_alpha);
  assert_eq!(bitmap.pixels[0], r8g8b8a8_Srgb { r: 9, g: 8, b: 7, a: 255 });
  assert_eq!(bitmap.pixels[1], r8g8b8a8_Srgb { r: 1, g: 1, b: 1, a: 0 });
}

#[test]
fn test_gff_duplicate_singleton_is_rejected() {
  let mut bytes = info(1, 1);
  bytes.extend(chunk(b"RGBA", &[0; 4]));
  bytes.extend(chunk(b"RGBA", &[0; 4]));
  assert_eq!(
    GffContainer::try_from_bytes(&bytes),
    Err(CodecError::DuplicateChunk(GffTag::PIXELS))
  );
  // index planes aren't singletons
  let mut bytes = info(1, 1);
  bytes.extend(chunk(b"INDX", &[0]));
  bytes.extend(chunk(b"INDX", &[1]));
  assert_eq!(GffContainer::try_from_bytes(&bytes).unwrap().chunks().len(), 3);
}

#[test]
fn test_gff_first_chunk_must_be_info() {
  let payload = GffImageInfo { width: 1, height: 1 }.to_payload(ByteOrder::Big);
  let mut bytes = chunk(b"XTRA", &payload);
  bytes.extend(info(1, 1));
  assert_eq!(
    GffContainer::try_from_bytes(&bytes),
    Err(CodecError::MissingChunk(GffTag::INFO))
  );
}

#[test]
fn test_gff_unprintable_tag() {
  let mut bytes = info(1, 1);
  bytes.extend(chunk(b"RGBA", &[0; 4]));
  bytes.extend(chunk(b"ok 1", &[]));
  assert!(GffContainer::try_from_bytes(&bytes).is_ok());
  bytes.extend(chunk(b"\0\x01\x7F\xFF", &[9]));
  assert_eq!(
    GffContainer::try_from_bytes(&bytes),
    Err(CodecError::BadHeader("GFF chunk tag"))
  );
  assert!(GffTag(*b"A b~").is_printable());
  assert!(!GffTag(*b"AB\tC").is_printable());
}

#[test]
fn test_gff_truncation() {
  let mut bytes = info(2, 2);
  bytes.extend(chunk(b"RGBA", &[7; 16]));
  for cut in [0, 5, 11, 22, 27, bytes.len() - 1] {
    assert_eq!(
      GffContainer::try_from_bytes(&bytes[..cut]),
      Err(CodecError::UnexpectedEof),
      "{cut}"
    );
  }
  bytes[8] = 0;
  assert!(matches!(GffContainer::try_from_bytes(&bytes), Err(CodecError::BadHeader(_))));
}

#[test]
fn test_gff_missing_pixels() {
  let bytes = info(1, 1);
  assert_eq!(
    Bitmap::try_from_gff_bytes(&bytes),
    Err(CodecError::MissingChunk(GffTag::PIXELS))
  );
  let mut bytes = info(1, 1);
  bytes.extend(chunk(b"INDX", &[0]));
  assert_eq!(
    Bitmap::try_from_gff_bytes(&bytes),
    Err(CodecError::MissingChunk(GffTag::PALETTE))
  );
  assert_eq!(
    Palmap::try_from_gff_bytes(&info(1, 1)),
    Err(CodecError::MissingChunk(GffTag::INDEXES))
  );
}

#[test]
fn test_gff_wrong_pixel_length() {
  let mut bytes = info(2, 1);
  bytes.extend(chunk(b"RGBA", &[0; 12]));
  assert!(matches!(Bitmap::try_from_gff_bytes(&bytes), Err(CodecError::BadHeader(_))));
}

#[test]
fn test_gff_dimensions_past_the_data_are_truncated() {
  // claims the largest image the default limits allow, with one pixel of data
  let mut bytes = info(17000, 17000);
  bytes.extend(chunk(b"RGBA", &[1, 2, 3, 4]));
  assert_eq!(Bitmap::try_from_gff_bytes(&bytes), Err(CodecError::UnexpectedEof));

  let mut bytes = info(17000, 17000);
  bytes.extend(chunk(b"PALC", &[0; 1024]));
  bytes.extend(chunk(b"INDX", &[0; 3]));
  assert_eq!(Bitmap::try_from_gff_bytes(&bytes), Err(CodecError::UnexpectedEof));
  assert_eq!(Palmap::try_from_gff_bytes(&bytes), Err(CodecError::UnexpectedEof));

  let mut bytes = info(2, 1);
  bytes.extend(chunk(b"RGBA", &[0; 4]));
  assert_eq!(Bitmap::try_from_gff_bytes(&bytes), Err(CodecError::UnexpectedEof));
}

#[test]
fn test_gff_builder_keeps_unknown_chunks_in_order() {
  let mut container = GffContainer::new();
  container.push_chunk(GffTag::INFO, info(3, 1)[8..].to_vec()).unwrap();
  container.append_chunk(GffTag(*b"note"), 5).unwrap().data.copy_from_slice(b"hello");
  container.push_chunk(GffTag::PALETTE, GffPalette::default().to_payload().unwrap()).unwrap();
  container.push_inverse_map().unwrap();
  assert_eq!(container.inverse_map_chunk().unwrap().data.len(), GFF_INVERSE_MAP_LEN);
  assert_eq!(
    container.push_inverse_map(),
    Err(CodecError::DuplicateChunk(GffTag::INVERSE_MAP))
  );

  let loaded = GffContainer::try_from_bytes(&container.to_bytes().unwrap()).unwrap();
  assert_eq!(loaded, container);
  assert_eq!(loaded.find_chunk(GffTag(*b"note")).unwrap().data, b"hello");
  assert_eq!(loaded.image_info(), Ok(GffImageInfo { width: 3, height: 1 }));
}
