#![cfg(feature = "std")]

use std::path::PathBuf;

use pixcodec::{
  dispatch::{FormatKind, Session},
  gff::{GffContainer, GffTag},
  r8g8b8_Srgb, r8g8b8a8_Srgb, Bitmap, CodecError, DecodeOptions, Palmap,
};

/// A path in the temp dir that no other test uses.
fn temp_path(name: &str) -> PathBuf {
  std::env::temp_dir().join(format!("pixcodec_{}_{name}", std::process::id()))
}

fn sample_bitmap(has_alpha: bool) -> Bitmap {
  let mut bitmap =
    Bitmap::try_new(3, 2, r8g8b8a8_Srgb::default(), &DecodeOptions::default()).unwrap();
  for (i, p) in bitmap.pixels.iter_mut().enumerate() {
    let i = i as u8;
    *p = r8g8b8a8_Srgb { r: i, g: i * 10, b: i * 20, a: if has_alpha { 100 + i } else { 255 } };
  }
  bitmap.has_alpha = has_alpha;
  bitmap
}

fn sample_palmap() -> Palmap {
  let mut palmap = Palmap::try_new(3, 3, &DecodeOptions::default()).unwrap();
  for (i, x) in palmap.indexes.iter_mut().enumerate() {
    *x = (i * 7) as u8;
  }
  for (i, c) in palmap.palette.iter_mut().enumerate() {
    c.r = i as u8;
    c.b = !(i as u8);
  }
  palmap
}

#[test]
fn test_session_rgba_round_trips() {
  let mut session = Session::new();
  for ext in ["tga", "gff", "TGA"] {
    let path = temp_path(&format!("rgba.{ext}"));
    let bitmap = sample_bitmap(true);
    session.encode_rgba(&path, &bitmap).unwrap();
    assert_eq!(session.decode_rgba(&path), Ok(bitmap));
    std::fs::remove_file(&path).ok();
  }
  assert_eq!((session.warnings, session.errors), (0, 0));
  assert_eq!(session.last_error, None);
}

#[test]
fn test_session_raw_output_warns_about_alpha() {
  let mut session = Session::new();
  let path = temp_path("opaque.raw");
  session.encode_rgba(&path, &sample_bitmap(false)).unwrap();
  assert_eq!(session.warnings, 0);
  let path_alpha = temp_path("alpha.rgb");
  session.encode_rgba(&path_alpha, &sample_bitmap(true)).unwrap();
  assert_eq!(session.warnings, 1);
  let bytes = std::fs::read(&path_alpha).unwrap();
  assert_eq!(bytes.len(), 3 * 2 * 3);
  assert_eq!(&bytes[3..6], &[1, 10, 20]);
  std::fs::remove_file(&path).ok();
  std::fs::remove_file(&path_alpha).ok();
}

#[test]
fn test_session_paletted_round_trips() {
  let mut session = Session::new();
  for ext in ["pcx", "gff"] {
    let path = temp_path(&format!("indexed.{ext}"));
    let palmap = sample_palmap();
    session.encode_paletted(&path, &palmap).unwrap();
    assert_eq!(session.decode_paletted(&path), Ok(palmap.clone()));
    let (palette, count) = session.read_palette(&path).unwrap();
    assert_eq!((palette, count), (palmap.palette, 256));
    std::fs::remove_file(&path).ok();
  }
  assert_eq!(session.errors, 0);
}

#[test]
fn test_session_errors_are_counted() {
  let mut session = Session::new();
  let err = session.decode_rgba(temp_path("image.bmp")).unwrap_err();
  assert_eq!(err, CodecError::UnsupportedFormat("bmp".to_string()));
  assert_eq!(session.errors, 1);
  assert_eq!(session.last_error, Some(err));

  // right extension, wrong direction
  assert_eq!(
    session.decode_paletted(temp_path("image.tga")),
    Err(CodecError::UnsupportedFormat("tga".to_string()))
  );
  assert_eq!(
    session.encode_rgba(temp_path("image.psd"), &sample_bitmap(false)),
    Err(CodecError::UnsupportedFormat("psd".to_string()))
  );
  assert!(!temp_path("image.psd").exists());
  assert_eq!(session.errors, 3);

  let missing = session.decode_rgba(temp_path("does_not_exist.pcx"));
  assert!(matches!(missing, Err(CodecError::Io(_))));
  assert_eq!(session.errors, 4);
  assert_eq!(session.last_error, missing.err());
}

#[test]
fn test_session_reads_act_palettes() {
  let mut session = Session::new();
  let path = temp_path("colors.act");
  let mut bytes: Vec<u8> = (0..=255_u8).flat_map(|i| [i, i / 2, 0]).collect();
  bytes.extend_from_slice(&[0, 5, 0xFF, 0xFF]);
  std::fs::write(&path, &bytes).unwrap();
  let (palette, count) = session.read_palette(&path).unwrap();
  assert_eq!(count, 5);
  assert_eq!(palette[200], r8g8b8_Srgb { r: 200, g: 100, b: 0 });
  std::fs::remove_file(&path).ok();

  let short = temp_path("short.pal");
  std::fs::write(&short, &bytes[..10]).unwrap();
  assert_eq!(session.read_palette(&short), Err(CodecError::UnexpectedEof));
  assert_eq!(session.errors, 1);
  std::fs::remove_file(&short).ok();
}

#[test]
fn test_session_gff_container_save_and_load() {
  let mut session = Session::new();
  let mut container = GffContainer::from_palmap(&sample_palmap()).unwrap();
  container.push_inverse_map().unwrap();
  container.push_chunk(GffTag(*b"NOTE"), b"hello".to_vec()).unwrap();
  // any extension works for the container calls
  let path = temp_path("container.bin");
  session.save_gff(&path, &container).unwrap();
  let loaded = session.load_gff(&path).unwrap();
  assert_eq!(loaded.chunks(), container.chunks());
  assert_eq!(loaded.find_chunk(GffTag(*b"NOTE")).map(|c| c.data.as_slice()), Some(&b"hello"[..]));
  assert_eq!(loaded.to_palmap(&DecodeOptions::default()), Ok(sample_palmap()));
  std::fs::remove_file(&path).ok();
}

#[test]
fn test_format_kind_from_path() {
  assert_eq!(FormatKind::from_path(&temp_path("x.Pic")), Ok(FormatKind::Pic));
  assert_eq!(FormatKind::from_path(&temp_path("x.pal")), Ok(FormatKind::Palette));
}
