#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for decoding and encoding a handful of legacy raster formats.
//!
//! Every decoder takes the complete bytes of one file and produces one of two
//! in-memory shapes:
//!
//! * [`Bitmap`]: 32-bit RGBA pixels plus a flag saying if the alpha channel
//!   means anything.
//! * [`Palmap`]: a 256 entry RGB palette and one index byte per pixel.
//!
//! | Format | Decode | Encode |
//! |:-|:-:|:-:|
//! | PSD (RGB, 8 bits per channel) | [`Bitmap`] | |
//! | TGA (raw, RLE) | [`Bitmap`] | [`Bitmap`] |
//! | PCX (8-bit, RLE) | [`Bitmap`], [`Palmap`] | [`Palmap`] |
//! | SoftImage PIC | [`Bitmap`] | |
//! | GFF chunk container | [`Bitmap`], [`Palmap`] | [`Bitmap`], [`Palmap`] |
//! | raw RGB dump | | [`Bitmap`] |
//! | raw / ACT palette | palette only | |
//!
//! With the `std` feature the [`dispatch`] module picks the format from a
//! file's extension and handles the file I/O.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

pub use pixel_formats::{r8g8b8_Srgb, r8g8b8a8_Srgb};

mod logging;

pub mod error;
pub use error::*;

pub mod options;
pub use options::*;

pub mod byte_source;
pub use byte_source::*;

pub mod image;
pub use image::*;

pub mod rle;

pub mod gff;
pub mod pcx;
pub mod pic;
pub mod psd;
pub mod raw;
pub mod tga;

#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
pub mod dispatch;
