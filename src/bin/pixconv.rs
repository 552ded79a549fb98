use pixcodec::dispatch::{FormatKind, Session};

use clap::Parser;
use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};
use walkdir::WalkDir;

/// Converts between raster formats, picking each format by file extension.
#[derive(Parser, Debug)]
#[command(name = "pixconv", version)]
struct Cli {
  /// Image to read (psd, tga, pcx, pic, gff).
  #[arg(required_unless_present_any = ["palette", "check"], requires = "output")]
  input: Option<PathBuf>,

  /// Image to write (tga, gff, raw/rgb, or pcx/gff from a pcx/gff input).
  output: Option<PathBuf>,

  /// Print the palette of a pal, act, pcx, or gff file.
  #[arg(long, value_name = "FILE", conflicts_with_all = ["input", "check"])]
  palette: Option<PathBuf>,

  /// Try to decode every known image under a directory.
  #[arg(long, value_name = "DIR", conflicts_with = "input")]
  check: Option<PathBuf>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  let mut session = Session::new();
  let ok = match (&cli.palette, &cli.check, &cli.input, &cli.output) {
    (Some(file), ..) => print_palette(&mut session, file),
    (None, Some(dir), ..) => check_dir(&mut session, dir),
    (None, None, Some(input), Some(output)) => convert(&mut session, input, output),
    // clap already rejects every other combination
    _ => false,
  };
  if session.warnings > 0 || session.errors > 0 {
    eprintln!("{} warning(s), {} error(s)", session.warnings, session.errors);
  }
  if ok {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}

/// Paletted formats go through a palette-to-palette path so that the indexes
/// survive, everything else goes through RGBA.
fn convert(session: &mut Session, input: &Path, output: &Path) -> bool {
  let paletted =
    |p: &Path| matches!(FormatKind::from_path(p), Ok(FormatKind::Pcx | FormatKind::Gff));
  let result = if paletted(input) && paletted(output) {
    session.decode_paletted(input).and_then(|palmap| session.encode_paletted(output, &palmap))
  } else {
    session.decode_rgba(input).and_then(|bitmap| session.encode_rgba(output, &bitmap))
  };
  match result {
    Ok(()) => true,
    Err(e) => {
      eprintln!("{} -> {}: {e}", input.display(), output.display());
      false
    }
  }
}

fn print_palette(session: &mut Session, file: &Path) -> bool {
  match session.read_palette(file) {
    Ok((palette, count)) => {
      println!("{count} entries");
      for (i, c) in palette.iter().take(count.min(16)).enumerate() {
        println!("{i:3}: #{:02X}{:02X}{:02X}", c.r, c.g, c.b);
      }
      true
    }
    Err(e) => {
      eprintln!("{}: {e}", file.display());
      false
    }
  }
}

/// Decodes every file under `dir` with a known image extension. Only fails
/// if the directory itself can't be walked.
fn check_dir(session: &mut Session, dir: &Path) -> bool {
  if !dir.is_dir() {
    eprintln!("{} is not a directory", dir.display());
    return false;
  }
  for entry in WalkDir::new(dir).follow_links(true) {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        eprintln!("{e}");
        continue;
      }
    };
    let path = entry.path();
    if entry.file_type().is_dir() || FormatKind::from_path(path).is_err() {
      continue;
    }
    match session.decode_rgba(path) {
      Ok(bitmap) => println!(
        "{}: {}x{}{}",
        path.display(),
        bitmap.width,
        bitmap.height,
        if bitmap.has_alpha { " (alpha)" } else { "" }
      ),
      Err(e) => println!("{}: {e}", path.display()),
    }
  }
  true
}

#[test]
fn test_cli_arguments() {
  use clap::CommandFactory;
  Cli::command().debug_assert();

  let cli = Cli::try_parse_from(["pixconv", "in.psd", "out.tga"]).unwrap();
  assert_eq!(cli.input, Some(PathBuf::from("in.psd")));
  assert_eq!(cli.output, Some(PathBuf::from("out.tga")));

  let cli = Cli::try_parse_from(["pixconv", "--palette", "colors.act"]).unwrap();
  assert_eq!(cli.palette, Some(PathBuf::from("colors.act")));

  let cli = Cli::try_parse_from(["pixconv", "--check", "images"]).unwrap();
  assert_eq!(cli.check, Some(PathBuf::from("images")));

  assert!(Cli::try_parse_from(["pixconv"]).is_err());
  assert!(Cli::try_parse_from(["pixconv", "in.psd"]).is_err());
  assert!(Cli::try_parse_from(["pixconv", "in.psd", "out.tga", "--check", "d"]).is_err());
}
