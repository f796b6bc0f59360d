//! Per-frame metadata that the compositor works from.

use crate::canvas::Rect;

/// What happens to the frame's region after it has been shown, before the
/// next frame is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisposeOp {
  /// Leave the canvas as is.
  #[default]
  None = 0,
  /// Clear the region to transparent black.
  Background = 1,
  /// Put the region back to what it was before this frame.
  Previous = 2,
}
impl TryFrom<u8> for DisposeOp {
  type Error = ();
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Background,
      2 => Self::Previous,
      _ => return Err(()),
    })
  }
}

/// How a frame's pixels combine with the canvas under them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlendOp {
  /// Replace the region, alpha included.
  #[default]
  Source = 0,
  /// Alpha composite the frame over the region.
  Over = 1,
}
impl TryFrom<u8> for BlendOp {
  type Error = ();
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::Source,
      1 => Self::Over,
      _ => return Err(()),
    })
  }
}

/// One frame's control record: where it goes, how long it stays, and how it
/// interacts with the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameDescriptor {
  /// The sub-rectangle of the canvas this frame covers.
  pub rect: Rect,
  /// Delay numerator.
  pub delay_num: u16,
  /// Delay denominator. 0 means 100.
  pub delay_den: u16,
  pub dispose_op: DisposeOp,
  pub blend_op: BlendOp,
}
impl FrameDescriptor {
  /// The frame's display time in milliseconds.
  ///
  /// A denominator of 0 is treated as 100 (so the numerator counts
  /// hundredths of a second).
  #[inline]
  #[must_use]
  pub const fn delay_ms(&self) -> u32 {
    let den = if self.delay_den == 0 { 100 } else { self.delay_den as u32 };
    (self.delay_num as u32) * 1000 / den
  }
}

/// Stream level facts, known as soon as the header has been read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AnimationInfo {
  /// Canvas width in pixels.
  pub width: u32,
  /// Canvas height in pixels.
  pub height: u32,
  /// Number of frames in the animation, not counting a hidden default image.
  pub total_frames: u32,
  /// How many times to play the animation. 0 means forever.
  pub num_plays: u32,
  /// If the PNG's default image is not part of the animation.
  pub first_frame_hidden: bool,
}

#[test]
fn test_delay_ms() {
  let mut f = FrameDescriptor {
    rect: Rect { x: 0, y: 0, width: 1, height: 1 },
    delay_num: 1,
    delay_den: 10,
    dispose_op: DisposeOp::None,
    blend_op: BlendOp::Source,
  };
  assert_eq!(f.delay_ms(), 100);
  f.delay_den = 0;
  assert_eq!(f.delay_ms(), 10);
  f.delay_num = u16::MAX;
  f.delay_den = 1;
  assert_eq!(f.delay_ms(), 65_535_000);
  f.delay_num = 0;
  assert_eq!(f.delay_ms(), 0);
}

#[test]
fn test_ops_from_u8() {
  assert_eq!(DisposeOp::try_from(2), Ok(DisposeOp::Previous));
  assert_eq!(DisposeOp::try_from(3), Err(()));
  assert_eq!(BlendOp::try_from(1), Ok(BlendOp::Over));
  assert_eq!(BlendOp::try_from(2), Err(()));
}
