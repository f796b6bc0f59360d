use super::*;
use bitfrob::u8_replicate_bits;
use pixel_formats::r8g8b8a8_Srgb;

/// The meaning of a `tRNS` chunk, which depends on the color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transparency<'b> {
  /// No transparency info, or info that doesn't fit the color type.
  #[default]
  None,
  /// This greyscale value is fully transparent.
  Y(u16),
  /// This RGB value is fully transparent.
  RGB([u16; 3]),
  /// Alpha for each palette index. Indexes past the end are opaque.
  Alphas(&'b [u8]),
}
impl<'b> Transparency<'b> {
  /// Interprets `tRNS` chunk data for the given color type.
  #[must_use]
  pub const fn new(color_type: PngColorType, trns: &'b [u8]) -> Self {
    match (color_type, trns) {
      (PngColorType::Y, [y0, y1]) => Self::Y(u16::from_be_bytes([*y0, *y1])),
      (PngColorType::RGB, [r0, r1, g0, g1, b0, b1]) => Self::RGB([
        u16::from_be_bytes([*r0, *r1]),
        u16::from_be_bytes([*g0, *g1]),
        u16::from_be_bytes([*b0, *b1]),
      ]),
      (PngColorType::Index, alphas) => Self::Alphas(alphas),
      _ => Self::None,
    }
  }
}

/// Turns unfiltered pixel data of any PNG format into RGBA8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelExpander<'b> {
  pub color_type: PngColorType,
  pub bit_depth: u8,
  /// Only used by indexed color. Out of range indexes are opaque black.
  pub palette: &'b [[u8; 3]],
  pub transparency: Transparency<'b>,
}
impl<'b> PixelExpander<'b> {
  #[inline]
  #[must_use]
  pub const fn new(ihdr: &IHDR, palette: &'b [[u8; 3]], transparency: Transparency<'b>) -> Self {
    Self { color_type: ihdr.color_type, bit_depth: ihdr.bit_depth, palette, transparency }
  }

  /// Expands one pixel, as given by
  /// [`unfilter_decompressed_data`](IHDR::unfilter_decompressed_data).
  ///
  /// 16-bit channels keep their high byte. Sub-byte greyscale is scaled up
  /// to the full 8-bit range.
  #[must_use]
  pub fn expand(&self, data: &[u8]) -> r8g8b8a8_Srgb {
    let wide = self.bit_depth == 16;
    let full = |i: usize| {
      if wide {
        u16::from_be_bytes([data[2 * i], data[2 * i + 1]])
      } else {
        u16::from(data[i])
      }
    };
    let high = |i: usize| if wide { data[2 * i] } else { data[i] };
    match self.color_type {
      PngColorType::RGB => {
        let a = match self.transparency {
          Transparency::RGB(key) if key == [full(0), full(1), full(2)] => 0,
          _ => 255,
        };
        r8g8b8a8_Srgb { r: high(0), g: high(1), b: high(2), a }
      }
      PngColorType::RGBA => r8g8b8a8_Srgb { r: high(0), g: high(1), b: high(2), a: high(3) },
      PngColorType::YA => {
        let y = high(0);
        r8g8b8a8_Srgb { r: y, g: y, b: y, a: high(1) }
      }
      PngColorType::Y => {
        let y = if self.bit_depth < 8 {
          u8_replicate_bits(self.bit_depth as u32, data[0])
        } else {
          high(0)
        };
        let a = match self.transparency {
          Transparency::Y(key) if key == full(0) => 0,
          _ => 255,
        };
        r8g8b8a8_Srgb { r: y, g: y, b: y, a }
      }
      PngColorType::Index => {
        let i = data[0] as usize;
        let [r, g, b] = self.palette.get(i).copied().unwrap_or_default();
        let a = match self.transparency {
          Transparency::Alphas(alphas) => alphas.get(i).copied().unwrap_or(255),
          _ => 255,
        };
        r8g8b8a8_Srgb { r, g, b, a }
      }
    }
  }
}

#[cfg(test)]
fn px(r: u8, g: u8, b: u8, a: u8) -> r8g8b8a8_Srgb {
  r8g8b8a8_Srgb { r, g, b, a }
}

#[test]
fn test_transparency_new() {
  assert_eq!(Transparency::new(PngColorType::Y, &[1, 2]), Transparency::Y(0x0102));
  assert_eq!(Transparency::new(PngColorType::Y, &[1, 2, 3]), Transparency::None);
  assert_eq!(
    Transparency::new(PngColorType::RGB, &[0, 1, 0, 2, 0, 3]),
    Transparency::RGB([1, 2, 3])
  );
  assert_eq!(Transparency::new(PngColorType::Index, &[9]), Transparency::Alphas(&[9]));
  assert_eq!(Transparency::new(PngColorType::RGBA, &[0, 0]), Transparency::None);
}

#[test]
fn test_expand_direct_color() {
  let rgba8 = IHDR { width: 1, height: 1, bit_depth: 8, color_type: PngColorType::RGBA, is_interlaced: false };
  let e = PixelExpander::new(&rgba8, &[], Transparency::None);
  assert_eq!(e.expand(&[1, 2, 3, 4]), px(1, 2, 3, 4));

  let rgba16 = IHDR { bit_depth: 16, ..rgba8 };
  let e = PixelExpander::new(&rgba16, &[], Transparency::None);
  assert_eq!(e.expand(&[1, 0xFF, 2, 0xFF, 3, 0xFF, 4, 0xFF]), px(1, 2, 3, 4));

  let ya8 = IHDR { color_type: PngColorType::YA, ..rgba8 };
  let e = PixelExpander::new(&ya8, &[], Transparency::None);
  assert_eq!(e.expand(&[50, 60]), px(50, 50, 50, 60));

  let rgb8 = IHDR { color_type: PngColorType::RGB, ..rgba8 };
  let e = PixelExpander::new(&rgb8, &[], Transparency::RGB([1, 2, 3]));
  assert_eq!(e.expand(&[1, 2, 3]), px(1, 2, 3, 0));
  assert_eq!(e.expand(&[1, 2, 4]), px(1, 2, 4, 255));

  let rgb16 = IHDR { bit_depth: 16, ..rgb8 };
  let e = PixelExpander::new(&rgb16, &[], Transparency::RGB([0x0102, 0, 0]));
  assert_eq!(e.expand(&[1, 2, 0, 0, 0, 0]), px(1, 0, 0, 0));
  assert_eq!(e.expand(&[1, 3, 0, 0, 0, 0]), px(1, 0, 0, 255));
}

#[test]
fn test_expand_greyscale_depths() {
  let y1 = IHDR { width: 1, height: 1, bit_depth: 1, color_type: PngColorType::Y, is_interlaced: false };
  let e = PixelExpander::new(&y1, &[], Transparency::None);
  assert_eq!(e.expand(&[0]), px(0, 0, 0, 255));
  assert_eq!(e.expand(&[1]), px(255, 255, 255, 255));

  let y2 = IHDR { bit_depth: 2, ..y1 };
  let e = PixelExpander::new(&y2, &[], Transparency::Y(2));
  assert_eq!(e.expand(&[1]), px(0x55, 0x55, 0x55, 255));
  assert_eq!(e.expand(&[2]), px(0xAA, 0xAA, 0xAA, 0));

  let y16 = IHDR { bit_depth: 16, ..y1 };
  let e = PixelExpander::new(&y16, &[], Transparency::None);
  assert_eq!(e.expand(&[0x80, 0x7F]), px(0x80, 0x80, 0x80, 255));
}

#[test]
fn test_expand_indexed() {
  let idx8 = IHDR { width: 1, height: 1, bit_depth: 8, color_type: PngColorType::Index, is_interlaced: false };
  let palette = [[10, 20, 30], [40, 50, 60]];
  let e = PixelExpander::new(&idx8, &palette, Transparency::Alphas(&[128]));
  assert_eq!(e.expand(&[0]), px(10, 20, 30, 128));
  assert_eq!(e.expand(&[1]), px(40, 50, 60, 255));
  assert_eq!(e.expand(&[7]), px(0, 0, 0, 255));
}
