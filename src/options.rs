//! Settings for how the PNG front end normalizes pixels.

/// The byte order that decoded pixels are written in.
///
/// The compositor only cares that alpha is the last byte, so either order
/// works end to end. Pick whatever your display wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
  /// `[r, g, b, a]`
  #[default]
  Rgba,
  /// `[b, g, r, a]`
  Bgra,
}
impl ChannelOrder {
  /// Puts the channels of an RGBA pixel into this order.
  #[inline]
  #[must_use]
  pub const fn arrange(self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
    match self {
      Self::Rgba => [r, g, b, a],
      Self::Bgra => [b, g, r, a],
    }
  }
}

/// Options for opening an animated PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// Output channel order of the canvas.
  pub channel_order: ChannelOrder,
  /// Images with a width or height above this are rejected at open.
  ///
  /// This exists to prevent accidental out-of-memory problems, since both
  /// canvases are allocated up front.
  pub max_dimension: u32,
}
impl Default for DecodeOptions {
  #[inline]
  fn default() -> Self {
    Self { channel_order: ChannelOrder::Rgba, max_dimension: 17_000 }
  }
}

#[test]
fn test_channel_order_arrange() {
  assert_eq!(ChannelOrder::Rgba.arrange([1, 2, 3, 4]), [1, 2, 3, 4]);
  assert_eq!(ChannelOrder::Bgra.arrange([1, 2, 3, 4]), [3, 2, 1, 4]);
}
