#![forbid(unsafe_code)]

//! The PNG machinery behind [`PngFrameSource`](crate::PngFrameSource).
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//! * [APNG Specification][apng-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//! [apng-spec]: https://wiki.mozilla.org/APNG_Specification
//!
//! ## How APNG Data Is Laid Out
//!
//! An APNG is a normal PNG with three extra chunk types:
//!
//! * **Animation Control** (`acTL`) - Must appear before the first `IDAT`. It
//!   gives the number of frames and how many times to loop. A PNG without
//!   this chunk is just a static image.
//! * **Frame Control** (`fcTL`) - One per frame. Gives the frame's region of
//!   the canvas, its delay, and the dispose and blend operations.
//! * **Frame Data** (`fdAT`) - Like `IDAT`, except that the first four bytes
//!   are a sequence number. All `fdAT` chunks after an `fcTL` form a single
//!   zlib stream for that frame.
//!
//! If an `fcTL` comes before the `IDAT` chunks, then the regular image data is
//! the first frame of the animation. Otherwise the regular image is only
//! there for decoders that don't know about APNG, and it's skipped.
//!
//! Each frame's data is decoded exactly like a full PNG image of the frame's
//! width and height: zlib decompression, then unfiltering (and de-interlacing
//! if the header says so), then converting each pixel to 8-bit RGBA.
//!
//! ## Parsing Errors
//!
//! Following section 13.2 of the PNG spec, spec violations that don't stop
//! us from getting the pixels are ignored. Particularly, neither the chunk
//! CRC32 values nor the zlib Adler32 values are checked, unknown filter types
//! act like "None", and chunk ordering is only checked where the animation
//! depends on it.

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod apng;
pub use apng::*;

mod interlace;
pub(crate) use interlace::*;

mod unfilter;

mod expand;
pub use expand::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

#[test]
fn test_is_png_header_correct() {
  assert!(is_png_header_correct(&PNG_SIGNATURE));
  assert!(!is_png_header_correct(&PNG_SIGNATURE[..7]));
  assert!(!is_png_header_correct(b"GIF89a\0\0\0\0"));
}
