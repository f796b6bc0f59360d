use super::*;
use crate::error::DecodeError;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = ();
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(()),
    })
  }
}

/// Image Header
///
/// In an APNG every frame is encoded like its own image, using this header's
/// pixel format with the frame's width and height. See
/// [`with_dimensions`](IHDR::with_dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// if the image data is stored interlaced.
  pub is_interlaced: bool,
}
impl IHDR {
  /// The same pixel format, but for an image of another size.
  #[inline]
  #[must_use]
  pub const fn with_dimensions(&self, width: u32, height: u32) -> Self {
    Self { width, height, ..*self }
  }

  /// Bits for one full pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// The filter step between a byte and its left neighbor, in bytes.
  ///
  /// Filtering works per byte within a pixel when pixels are more than 1
  /// byte each, and per byte when pixels are 1 byte or less.
  #[inline]
  #[must_use]
  pub const fn filter_step(&self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// One filter byte plus the packed pixel bytes of a `width` pixel line.
  ///
  /// Pixels smaller than a byte can leave a partial byte at the end of the
  /// line, so this rounds up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_filterline(&self, width: u32) -> usize {
    1 + (self.bits_per_pixel() * (width as usize) + 7) / 8
  }

  /// Gets the buffer size required to perform Zlib decompression.
  ///
  /// Interlaced images are the sum of all 7 reduced images.
  #[must_use]
  pub fn get_zlib_decompression_requirement(&self) -> usize {
    let levels = reduced_image_dimensions(self.width, self.height);
    let levels = if self.is_interlaced { &levels[1..] } else { &levels[..1] };
    levels
      .iter()
      .filter(|(w, h)| *w != 0 && *h != 0)
      .map(|(w, h)| self.bytes_per_filterline(*w).saturating_mul(*h as usize))
      .fold(0_usize, |total, bytes| total.saturating_add(bytes))
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = DecodeError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match value {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        if *compression_method != 0 || *filter_method != 0 {
          return Err(DecodeError::BadHeader);
        }
        Ok(Self {
          width: u32::from_be_bytes([*w0, *w1, *w2, *w3]),
          height: u32::from_be_bytes([*h0, *h1, *h2, *h3]),
          bit_depth: match *color_type {
            0 if [1, 2, 4, 8, 16].contains(bit_depth) => *bit_depth,
            2 if [8, 16].contains(bit_depth) => *bit_depth,
            3 if [1, 2, 4, 8].contains(bit_depth) => *bit_depth,
            4 if [8, 16].contains(bit_depth) => *bit_depth,
            6 if [8, 16].contains(bit_depth) => *bit_depth,
            _ => return Err(DecodeError::BadHeader),
          },
          color_type: PngColorType::try_from(*color_type).map_err(|_| DecodeError::BadHeader)?,
          is_interlaced: match interlace_method {
            0 => false,
            1 => true,
            _ => return Err(DecodeError::BadHeader),
          },
        })
      }
      _ => Err(DecodeError::BadHeader),
    }
  }
}

#[cfg(test)]
pub(crate) fn ihdr_bytes(w: u32, h: u32, depth: u8, color: u8, interlace: u8) -> [u8; 13] {
  let mut out = [0; 13];
  out[0..4].copy_from_slice(&w.to_be_bytes());
  out[4..8].copy_from_slice(&h.to_be_bytes());
  out[8] = depth;
  out[9] = color;
  out[12] = interlace;
  out
}

#[test]
fn test_ihdr_parse() {
  let ihdr = IHDR::try_from(&ihdr_bytes(3, 2, 8, 6, 0)[..]).unwrap();
  assert_eq!(
    ihdr,
    IHDR { width: 3, height: 2, bit_depth: 8, color_type: PngColorType::RGBA, is_interlaced: false }
  );
  assert_eq!(IHDR::try_from(&ihdr_bytes(3, 2, 4, 2, 0)[..]), Err(DecodeError::BadHeader));
  assert_eq!(IHDR::try_from(&ihdr_bytes(3, 2, 8, 5, 0)[..]), Err(DecodeError::BadHeader));
  assert_eq!(IHDR::try_from(&ihdr_bytes(3, 2, 8, 6, 2)[..]), Err(DecodeError::BadHeader));
  assert_eq!(IHDR::try_from(&ihdr_bytes(3, 2, 8, 6, 0)[..12]), Err(DecodeError::BadHeader));
  assert!(IHDR::try_from(&ihdr_bytes(3, 2, 1, 3, 1)[..]).unwrap().is_interlaced);
}

#[test]
fn test_ihdr_sizes() {
  let rgba8 = IHDR { width: 3, height: 2, bit_depth: 8, color_type: PngColorType::RGBA, is_interlaced: false };
  assert_eq!(rgba8.filter_step(), 4);
  assert_eq!(rgba8.bytes_per_filterline(3), 13);
  assert_eq!(rgba8.get_zlib_decompression_requirement(), 26);
  assert_eq!(rgba8.with_dimensions(1, 1).get_zlib_decompression_requirement(), 5);

  let y1 = IHDR { width: 9, height: 1, bit_depth: 1, color_type: PngColorType::Y, is_interlaced: false };
  assert_eq!(y1.filter_step(), 1);
  assert_eq!(y1.bytes_per_filterline(9), 3);

  let rgb16 = IHDR { bit_depth: 16, color_type: PngColorType::RGB, ..rgba8 };
  assert_eq!(rgb16.filter_step(), 6);

  // 8x8 interlaced rgba8: reduced images (1,1) (1,1) (2,1) (2,2) (4,2) (4,4) (8,4)
  let laced = IHDR { width: 8, height: 8, is_interlaced: true, ..rgba8 };
  assert_eq!(laced.get_zlib_decompression_requirement(), 5 + 5 + 9 + 18 + 34 + 68 + 132);
}
