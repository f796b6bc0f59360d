use crate::{
  canvas::Rect,
  error::DecodeError,
  frame::{BlendOp, DisposeOp, FrameDescriptor},
};

/// Animation Control, the chunk that makes a PNG into an APNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(nonstandard_style)]
pub struct acTL {
  /// Total number of frames in the animation.
  pub num_frames: u32,
  /// Number of times to loop. 0 means forever.
  pub num_plays: u32,
}
impl TryFrom<&[u8]> for acTL {
  type Error = DecodeError;
  #[inline]
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match value {
      [f0, f1, f2, f3, p0, p1, p2, p3] => Ok(Self {
        num_frames: u32::from_be_bytes([*f0, *f1, *f2, *f3]),
        num_plays: u32::from_be_bytes([*p0, *p1, *p2, *p3]),
      }),
      _ => Err(DecodeError::BadAnimationControl),
    }
  }
}

/// Frame Control, which comes before each frame's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(nonstandard_style)]
pub struct fcTL {
  pub sequence_number: u32,
  pub width: u32,
  pub height: u32,
  pub x_offset: u32,
  pub y_offset: u32,
  pub delay_num: u16,
  pub delay_den: u16,
  pub dispose_op: u8,
  pub blend_op: u8,
}
impl TryFrom<&[u8]> for fcTL {
  type Error = DecodeError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    if value.len() != 26 {
      return Err(DecodeError::BadFrameControl);
    }
    let u32_at = |i: usize| u32::from_be_bytes([value[i], value[i + 1], value[i + 2], value[i + 3]]);
    let u16_at = |i: usize| u16::from_be_bytes([value[i], value[i + 1]]);
    Ok(Self {
      sequence_number: u32_at(0),
      width: u32_at(4),
      height: u32_at(8),
      x_offset: u32_at(12),
      y_offset: u32_at(16),
      delay_num: u16_at(20),
      delay_den: u16_at(22),
      dispose_op: value[24],
      blend_op: value[25],
    })
  }
}
impl fcTL {
  /// Checks the record against the canvas size and converts it.
  ///
  /// ## Failure
  /// * The frame is empty or pokes outside the canvas.
  /// * The dispose or blend operation is unknown.
  pub fn to_descriptor(&self, canvas_width: u32, canvas_height: u32) -> Result<FrameDescriptor, DecodeError> {
    let rect = Rect { x: self.x_offset, y: self.y_offset, width: self.width, height: self.height };
    if rect.width == 0 || rect.height == 0 || !rect.fits_within(canvas_width, canvas_height) {
      return Err(DecodeError::FrameOutOfBounds);
    }
    Ok(FrameDescriptor {
      rect,
      delay_num: self.delay_num,
      delay_den: self.delay_den,
      dispose_op: DisposeOp::try_from(self.dispose_op).map_err(|_| DecodeError::BadFrameControl)?,
      blend_op: BlendOp::try_from(self.blend_op).map_err(|_| DecodeError::BadFrameControl)?,
    })
  }
}

#[cfg(test)]
#[allow(clippy::too_many_arguments)]
pub(crate) fn fctl_bytes(
  seq: u32, w: u32, h: u32, x: u32, y: u32, delay: (u16, u16), dispose: u8, blend: u8,
) -> [u8; 26] {
  let mut out = [0; 26];
  out[0..4].copy_from_slice(&seq.to_be_bytes());
  out[4..8].copy_from_slice(&w.to_be_bytes());
  out[8..12].copy_from_slice(&h.to_be_bytes());
  out[12..16].copy_from_slice(&x.to_be_bytes());
  out[16..20].copy_from_slice(&y.to_be_bytes());
  out[20..22].copy_from_slice(&delay.0.to_be_bytes());
  out[22..24].copy_from_slice(&delay.1.to_be_bytes());
  out[24] = dispose;
  out[25] = blend;
  out
}

#[test]
fn test_actl_parse() {
  assert_eq!(
    acTL::try_from(&[0, 0, 0, 3, 0, 0, 0, 0][..]),
    Ok(acTL { num_frames: 3, num_plays: 0 })
  );
  assert_eq!(acTL::try_from(&[0, 0, 0, 3][..]), Err(DecodeError::BadAnimationControl));
}

#[test]
fn test_fctl_parse_and_validate() {
  let raw = fctl_bytes(5, 2, 3, 1, 0, (7, 0), 2, 1);
  let fctl = fcTL::try_from(&raw[..]).unwrap();
  assert_eq!(fctl.sequence_number, 5);
  assert_eq!((fctl.width, fctl.height, fctl.x_offset, fctl.y_offset), (2, 3, 1, 0));
  let d = fctl.to_descriptor(3, 3).unwrap();
  assert_eq!(d.rect, Rect { x: 1, y: 0, width: 2, height: 3 });
  assert_eq!(d.dispose_op, DisposeOp::Previous);
  assert_eq!(d.blend_op, BlendOp::Over);
  assert_eq!(d.delay_ms(), 70);

  assert_eq!(fctl.to_descriptor(2, 3), Err(DecodeError::FrameOutOfBounds));
  let empty = fcTL { width: 0, ..fctl };
  assert_eq!(empty.to_descriptor(3, 3), Err(DecodeError::FrameOutOfBounds));
  let wrapping = fcTL { x_offset: u32::MAX, ..fctl };
  assert_eq!(wrapping.to_descriptor(3, 3), Err(DecodeError::FrameOutOfBounds));
  let bad_dispose = fcTL { dispose_op: 3, ..fctl };
  assert_eq!(bad_dispose.to_descriptor(3, 3), Err(DecodeError::BadFrameControl));
  let bad_blend = fcTL { blend_op: 2, ..fctl };
  assert_eq!(bad_blend.to_descriptor(3, 3), Err(DecodeError::BadFrameControl));

  assert_eq!(fcTL::try_from(&raw[..25]), Err(DecodeError::BadFrameControl));
}
