//! The dispose/blend state machine.
//!
//! Each frame only carries pixels for its own sub-rectangle. The compositor
//! turns that partial update into a complete canvas in the render buffer, and
//! leaves the [`CanvasBuffers`] authority set so that the *next* frame sees
//! the correct prior state once this frame's dispose operation is applied.
//!
//! Per frame, in order:
//! 1. The first frame of a play is always drawn with [`BlendOp::Source`],
//!    and a [`DisposeOp::Previous`] on it acts as [`DisposeOp::Background`].
//! 2. If the base is authoritative, the render buffer is refreshed from the
//!    base everywhere outside the frame's region.
//! 3. If the render buffer is authoritative, the pre-frame pixels are saved
//!    into the base: the whole canvas for `Previous`, or just the region for
//!    `Over` blending.
//! 4. The decoder writes the frame's rows straight into the render buffer.
//! 5. `Over` frames are blended against the base's copy of the region.
//! 6. The dispose operation picks which buffer is authoritative next.

use crate::{
  canvas::{Authority, CanvasBuffers},
  error::ApngError,
  frame::{BlendOp, DisposeOp, FrameDescriptor},
  source::PixelRowSource,
};

/// Draws one frame into the canvas.
///
/// * `ordinal` is the 1-based position of the frame within the current play.
///
/// ## Failure
/// Only the decoder can fail, and any such error is passed along. By then
/// the canvas has been prepared for this frame and the render buffer may be
/// partly drawn, so the canvas shouldn't be composited onto again until it
/// is cleared. See [`PixelRowSource::decode_rows_into`].
pub fn compose_frame<S: PixelRowSource + ?Sized>(
  canvas: &mut CanvasBuffers, source: &mut S, frame: &FrameDescriptor, ordinal: u32,
) -> Result<(), ApngError> {
  let rect = frame.rect;
  let mut dispose_op = frame.dispose_op;
  let mut blend_op = frame.blend_op;

  if ordinal == 1 {
    // there's nothing under the first frame to blend with or go back to.
    blend_op = BlendOp::Source;
    if dispose_op == DisposeOp::Previous {
      dispose_op = DisposeOp::Background;
    }
    canvas.set_authority(Authority::Render);
  }

  match canvas.authority() {
    Authority::Base => canvas.snapshot_outside_region(rect),
    Authority::Render => {
      if dispose_op == DisposeOp::Previous {
        canvas.snapshot_all_to_base();
        canvas.set_authority(Authority::Base);
      } else if blend_op == BlendOp::Over {
        canvas.copy_region_to_base(rect);
      }
    }
  }

  source.decode_rows_into(&mut canvas.frame_rows(rect))?;

  if blend_op == BlendOp::Over {
    canvas.for_each_in_region(rect, |render, base| *render = blend_over(*render, *base));
  }

  match dispose_op {
    DisposeOp::None => canvas.set_authority(Authority::Render),
    DisposeOp::Background => {
      canvas.clear_region_in_base(rect);
      canvas.set_authority(Authority::Base);
    }
    // the base already holds the pre-frame canvas.
    DisposeOp::Previous => canvas.set_authority(Authority::Base),
  }
  Ok(())
}

/// Composites a non-premultiplied `src` pixel over `dst`, alpha last.
///
/// This is integer math with truncating division:
/// * `u = a_src * 255`
/// * `v = (255 - a_src) * a_dst`
/// * each color channel is `(src * u + dst * v) / (u + v)`
/// * alpha is `(u + v) / 255`
///
/// A fully opaque source is kept, and a fully transparent source is replaced
/// by `dst`. Over a fully transparent `dst` the source is kept as is.
#[inline]
#[must_use]
pub const fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
  let a_src = src[3] as u32;
  let a_dst = dst[3] as u32;
  match a_src {
    255 => src,
    0 => dst,
    _ if a_dst == 0 => src,
    _ => {
      let u = a_src * 255;
      let v = (255 - a_src) * a_dst;
      let al = u + v;
      [
        ((src[0] as u32 * u + dst[0] as u32 * v) / al) as u8,
        ((src[1] as u32 * u + dst[1] as u32 * v) / al) as u8,
        ((src[2] as u32 * u + dst[2] as u32 * v) / al) as u8,
        (al / 255) as u8,
      ]
    }
  }
}
