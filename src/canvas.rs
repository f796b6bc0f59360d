//! The pair of full-canvas buffers that frames are composited into.
//!
//! * The **render** buffer is the finished image, and it's what gets shown.
//! * The **base** buffer holds a snapshot used for the dispose operations.
//!
//! At any moment exactly one of the two is the authoritative "previous full
//! frame", tracked as an [`Authority`]. When the base is authoritative, the
//! render buffer's pixels outside the next frame's region are stale and must
//! be refreshed from the base before the render buffer is shown again.
//!
//! All pixels are 4 bytes, with alpha as the last byte. The channel order of
//! the other three bytes doesn't matter here.

use alloc::vec::Vec;

/// Bytes per pixel in both canvases.
pub const BYTES_PER_PIXEL: usize = 4;

/// A pixel rectangle within the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}
impl Rect {
  /// If the rect lies entirely within a `width` by `height` area.
  #[inline]
  #[must_use]
  pub fn fits_within(&self, width: u32, height: u32) -> bool {
    matches!(self.x.checked_add(self.width), Some(right) if right <= width)
      && matches!(self.y.checked_add(self.height), Some(bottom) if bottom <= height)
  }

  /// Cuts the rect down to the part inside a `width` by `height` area.
  #[inline]
  #[must_use]
  pub fn clipped_to(&self, width: u32, height: u32) -> Self {
    let x = self.x.min(width);
    let y = self.y.min(height);
    Self {
      x,
      y,
      width: self.width.min(width - x),
      height: self.height.min(height - y),
    }
  }
}

/// Which buffer holds the correct prior canvas state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Authority {
  /// The render buffer is complete and correct.
  #[default]
  Render,
  /// The base buffer is correct, and the render buffer must be refreshed from
  /// it outside of whatever region gets drawn next.
  Base,
}

/// Owns the render and base canvases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasBuffers {
  width: u32,
  height: u32,
  render: Vec<u8>,
  base: Vec<u8>,
  authority: Authority,
}
impl CanvasBuffers {
  /// Allocates both canvases, zeroed (transparent black).
  ///
  /// ## Failure
  /// * [`ApngError::Alloc`](crate::ApngError::Alloc) if either buffer can't be
  ///   allocated. Anything already allocated is released.
  pub fn try_new(width: u32, height: u32) -> Result<Self, crate::ApngError> {
    let len = (width as usize)
      .checked_mul(height as usize)
      .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
      .ok_or(crate::ApngError::Alloc)?;
    let mut render: Vec<u8> = Vec::new();
    render.try_reserve_exact(len)?;
    render.resize(len, 0);
    let mut base: Vec<u8> = Vec::new();
    base.try_reserve_exact(len)?;
    base.resize(len, 0);
    Ok(Self { width, height, render, base, authority: Authority::Render })
  }

  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }
  /// The whole canvas as a rect.
  #[inline]
  #[must_use]
  pub const fn full_rect(&self) -> Rect {
    Rect { x: 0, y: 0, width: self.width, height: self.height }
  }

  #[inline]
  #[must_use]
  pub const fn authority(&self) -> Authority {
    self.authority
  }
  #[inline]
  pub fn set_authority(&mut self, authority: Authority) {
    self.authority = authority;
  }

  /// The render buffer, the one meant for display.
  #[inline]
  #[must_use]
  pub fn render(&self) -> &[u8] {
    &self.render
  }
  /// The base buffer.
  #[inline]
  #[must_use]
  pub fn base(&self) -> &[u8] {
    &self.base
  }
  /// The render buffer viewed as whole pixels.
  #[inline]
  #[must_use]
  pub fn render_pixels(&self) -> &[[u8; 4]] {
    bytemuck::cast_slice(&self.render)
  }

  #[inline]
  fn row_size(&self) -> usize {
    self.width as usize * BYTES_PER_PIXEL
  }

  #[inline]
  fn checked_rect(&self, rect: Rect) -> Rect {
    debug_assert!(
      rect.fits_within(self.width, self.height),
      "{rect:?} is outside the {}x{} canvas",
      self.width,
      self.height
    );
    rect.clipped_to(self.width, self.height)
  }

  /// Zeroes both canvases and makes the render buffer authoritative.
  pub fn clear(&mut self) {
    self.render.fill(0);
    self.base.fill(0);
    self.authority = Authority::Render;
  }

  /// Copies everything *except* `rect` from the base into the render buffer.
  ///
  /// This brings the render buffer up to date when the base was
  /// authoritative, leaving only the region the next frame draws over.
  pub fn snapshot_outside_region(&mut self, rect: Rect) {
    let rect = self.checked_rect(rect);
    let row_size = self.row_size();
    copy_outside_region(&self.base, &mut self.render, row_size, self.height, rect);
  }

  /// Copies the whole render buffer into the base.
  pub fn snapshot_all_to_base(&mut self) {
    self.base.copy_from_slice(&self.render);
  }

  /// Copies the `rect` region from the render buffer into the base.
  pub fn copy_region_to_base(&mut self, rect: Rect) {
    let rect = self.checked_rect(rect);
    let row_size = self.row_size();
    let (start, len) = span(rect);
    for y in rect.y..(rect.y + rect.height) {
      let i = y as usize * row_size + start;
      self.base[i..i + len].copy_from_slice(&self.render[i..i + len]);
    }
  }

  /// Copies all of the render buffer into the base, then zeroes `rect` in the
  /// base.
  ///
  /// Afterwards the base is "what the canvas looks like once this frame's
  /// region has been cleared".
  pub fn clear_region_in_base(&mut self, rect: Rect) {
    let rect = self.checked_rect(rect);
    self.snapshot_all_to_base();
    let row_size = self.row_size();
    let (start, len) = span(rect);
    for y in rect.y..(rect.y + rect.height) {
      let i = y as usize * row_size + start;
      self.base[i..i + len].fill(0);
    }
  }

  /// Applies `op(render_px, base_px)` to every pixel within `rect`.
  pub fn for_each_in_region<F>(&mut self, rect: Rect, mut op: F)
  where
    F: FnMut(&mut [u8; 4], &[u8; 4]),
  {
    let rect = self.checked_rect(rect);
    let row_size = self.row_size();
    let (start, len) = span(rect);
    for y in rect.y..(rect.y + rect.height) {
      let i = y as usize * row_size + start;
      let render: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut self.render[i..i + len]);
      let base: &[[u8; 4]] = bytemuck::cast_slice(&self.base[i..i + len]);
      render.iter_mut().zip(base.iter()).for_each(|(r, b)| op(r, b));
    }
  }

  /// Borrows the `rect` region of the render buffer as frame rows, for a
  /// decoder to write into.
  pub fn frame_rows(&mut self, rect: Rect) -> FrameRows<'_> {
    let rect = self.checked_rect(rect);
    let row_size = self.row_size();
    FrameRows { canvas: &mut self.render, row_size, rect }
  }
}

/// Byte offset within a row and byte length of the rect's columns.
#[inline]
fn span(rect: Rect) -> (usize, usize) {
  (rect.x as usize * BYTES_PER_PIXEL, rect.width as usize * BYTES_PER_PIXEL)
}

/// Copies all of `src` into `dst` except for the `rect` region.
fn copy_outside_region(src: &[u8], dst: &mut [u8], row_size: usize, height: u32, rect: Rect) {
  let top = rect.y as usize * row_size;
  let bottom = (rect.y + rect.height) as usize * row_size;
  let end = height as usize * row_size;
  dst[..top].copy_from_slice(&src[..top]);
  dst[bottom..end].copy_from_slice(&src[bottom..end]);
  let (start, len) = span(rect);
  for row in rect.y..(rect.y + rect.height) {
    let i = row as usize * row_size;
    dst[i..i + start].copy_from_slice(&src[i..i + start]);
    dst[i + start + len..i + row_size].copy_from_slice(&src[i + start + len..i + row_size]);
  }
}

/// The rows of one frame's region inside the render buffer.
///
/// Row `j` of the frame lives at canvas row `rect.y + j`, starting at column
/// `rect.x`.
#[derive(Debug)]
pub struct FrameRows<'a> {
  canvas: &'a mut [u8],
  row_size: usize,
  rect: Rect,
}
impl<'a> FrameRows<'a> {
  /// Frame width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.rect.width
  }
  /// Frame height in pixels (the number of rows).
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.rect.height
  }

  /// Frame row `row` as `width * 4` bytes, or `None` if out of bounds.
  #[inline]
  #[must_use]
  pub fn row_mut(&mut self, row: u32) -> Option<&mut [u8]> {
    if row < self.rect.height {
      let i = (self.rect.y + row) as usize * self.row_size + self.rect.x as usize * BYTES_PER_PIXEL;
      self.canvas.get_mut(i..i + self.rect.width as usize * BYTES_PER_PIXEL)
    } else {
      None
    }
  }

  /// The pixel at frame position `(x, y)`, or `None` if out of bounds.
  #[inline]
  #[must_use]
  pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8; 4]> {
    if x < self.rect.width {
      let row = self.row_mut(y)?;
      let i = x as usize * BYTES_PER_PIXEL;
      row.get_mut(i..i + BYTES_PER_PIXEL).and_then(|p| p.try_into().ok())
    } else {
      None
    }
  }
}

#[cfg(test)]
fn filled(width: u32, height: u32, render: u8, base: u8) -> CanvasBuffers {
  let mut c = CanvasBuffers::try_new(width, height).unwrap();
  c.render.fill(render);
  c.base.fill(base);
  c
}

#[test]
fn test_rect_bounds() {
  assert!(Rect { x: 0, y: 0, width: 4, height: 4 }.fits_within(4, 4));
  assert!(!Rect { x: 1, y: 0, width: 4, height: 4 }.fits_within(4, 4));
  assert!(!Rect { x: u32::MAX, y: 0, width: 2, height: 1 }.fits_within(4, 4));
  assert_eq!(
    Rect { x: 3, y: 1, width: 4, height: 9 }.clipped_to(4, 4),
    Rect { x: 3, y: 1, width: 1, height: 3 }
  );
  assert_eq!(Rect { x: 9, y: 9, width: 1, height: 1 }.clipped_to(4, 4).width, 0);
}

#[test]
fn test_try_new_is_zeroed() {
  let c = CanvasBuffers::try_new(3, 2).unwrap();
  assert_eq!(c.render().len(), 3 * 2 * 4);
  assert!(c.render().iter().chain(c.base()).all(|b| *b == 0));
  assert_eq!(c.authority(), Authority::Render);
  assert_eq!(CanvasBuffers::try_new(u32::MAX, u32::MAX), Err(crate::ApngError::Alloc));
}

#[test]
fn test_snapshot_outside_region() {
  let mut c = filled(4, 3, 1, 2);
  c.snapshot_outside_region(Rect { x: 1, y: 1, width: 2, height: 1 });
  for (i, px) in c.render_pixels().iter().enumerate() {
    let (x, y) = (i % 4, i / 4);
    let inside = y == 1 && (1..3).contains(&x);
    assert_eq!(*px, if inside { [1; 4] } else { [2; 4] }, "x:{x} y:{y}");
  }
}

#[test]
fn test_copy_region_to_base() {
  let mut c = filled(3, 3, 7, 0);
  c.copy_region_to_base(Rect { x: 2, y: 0, width: 1, height: 2 });
  let base: &[[u8; 4]] = bytemuck::cast_slice(c.base());
  for (i, px) in base.iter().enumerate() {
    let (x, y) = (i % 3, i / 3);
    assert_eq!(*px, if x == 2 && y < 2 { [7; 4] } else { [0; 4] }, "x:{x} y:{y}");
  }
}

#[test]
fn test_clear_region_in_base() {
  let mut c = filled(2, 2, 9, 5);
  c.clear_region_in_base(Rect { x: 0, y: 1, width: 2, height: 1 });
  assert_eq!(&c.base()[..8], &[9; 8]);
  assert_eq!(&c.base()[8..], &[0; 8]);
  // the render buffer is never touched
  assert!(c.render().iter().all(|b| *b == 9));
}

#[test]
fn test_frame_rows_offsets() {
  let mut c = filled(4, 4, 0, 0);
  let mut rows = c.frame_rows(Rect { x: 1, y: 2, width: 2, height: 2 });
  assert_eq!(rows.row_mut(0).map(|r| r.len()), Some(8));
  assert!(rows.row_mut(2).is_none());
  assert!(rows.pixel_mut(2, 0).is_none());
  *rows.pixel_mut(1, 1).unwrap() = [1, 2, 3, 4];
  rows.row_mut(0).unwrap().fill(8);
  // frame (1,1) is canvas (2,3)
  assert_eq!(c.render_pixels()[3 * 4 + 2], [1, 2, 3, 4]);
  assert_eq!(c.render_pixels()[2 * 4 + 1], [8; 4]);
  assert_eq!(c.render_pixels()[2 * 4 + 2], [8; 4]);
  assert_eq!(c.render_pixels()[2 * 4 + 3], [0; 4]);
}
