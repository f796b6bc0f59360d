//! The frame-by-frame driver that callers hold on to.

use crate::{
  canvas::CanvasBuffers,
  compositor::compose_frame,
  error::ApngError,
  frame::AnimationInfo,
  options::DecodeOptions,
  source::{PixelRowSource, PngFrameSource},
};
use alloc::vec::Vec;

/// Everything that `close` releases.
#[derive(Debug, Clone)]
struct Resources<S> {
  source: S,
  canvas: CanvasBuffers,
}

/// An open animation: a frame source plus the canvas it's composited into.
///
/// Call [`advance`](ApngStream::advance) once per frame, at whatever pace the
/// frame delays call for, and show [`render_buffer`](ApngStream::render_buffer)
/// after each call. The stream owns no clock, see
/// [`AnimationPlayer`](crate::AnimationPlayer) for simple pacing.
///
/// ```no_run
/// # fn main() -> Result<(), apng_compose::ApngError> {
/// let mut stream = apng_compose::ApngStream::open("spinner.png")?;
/// loop {
///   match stream.advance()? {
///     0 => break,
///     n => println!("frame {n} for {}ms", stream.delay_ms()),
///   }
/// }
/// stream.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApngStream<S = PngFrameSource<Vec<u8>>> {
  info: AnimationInfo,
  current_frame: u32,
  delay_ms: u32,
  /// Set once `advance` has returned 0, until the next restart.
  ended: bool,
  /// The error that stopped the stream, until the next restart.
  failed: Option<ApngError>,
  resources: Option<Resources<S>>,
}

#[cfg(feature = "std")]
impl ApngStream {
  /// Reads a file and opens it with the default options.
  ///
  /// ## Failure
  /// * [`ApngError::Io`] if the file can't be read.
  /// * Anything from [`from_bytes`](ApngStream::from_bytes).
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ApngError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| {
      tracing::debug!(%err, path = %path.display(), "couldn't read APNG file");
      err
    })?;
    Self::from_bytes(bytes)
  }
}

impl<B: AsRef<[u8]>> ApngStream<PngFrameSource<B>> {
  /// Opens APNG data with the default options.
  #[inline]
  pub fn from_bytes(bytes: B) -> Result<Self, ApngError> {
    Self::from_bytes_with_options(bytes, &DecodeOptions::default())
  }

  /// Opens APNG data.
  ///
  /// ## Failure
  /// * [`ApngError::NotAnimated`] if it's a PNG without animation.
  /// * [`ApngError::Decode`] if the PNG header is bad.
  /// * [`ApngError::Alloc`] if the canvases can't be allocated.
  pub fn from_bytes_with_options(bytes: B, options: &DecodeOptions) -> Result<Self, ApngError> {
    Self::from_source(PngFrameSource::new(bytes, options)?)
  }
}

impl<S: PixelRowSource> ApngStream<S> {
  /// Opens a stream over any frame source, allocating both canvases.
  pub fn from_source(source: S) -> Result<Self, ApngError> {
    let info = source.animation_info();
    let canvas = CanvasBuffers::try_new(info.width, info.height)?;
    tracing::debug!(
      width = info.width,
      height = info.height,
      frames = info.total_frames,
      plays = info.num_plays,
      "opened animation"
    );
    Ok(Self {
      info,
      current_frame: 0,
      delay_ms: 0,
      ended: false,
      failed: None,
      resources: Some(Resources { source, canvas }),
    })
  }

  /// Decodes and composites the next frame.
  ///
  /// Returns the 1-based number of the frame now in the render buffer, or 0
  /// once every frame has been shown. After a 0 the render buffer keeps the
  /// last frame, and further calls keep returning 0 until a
  /// [`restart`](ApngStream::restart).
  ///
  /// ## Failure
  /// * [`ApngError::Closed`] after [`close`](ApngStream::close).
  /// * Any error from the frame source. The stream stops there: every later
  ///   call returns the same error until a `restart`.
  pub fn advance(&mut self) -> Result<u32, ApngError> {
    let res = self.resources.as_mut().ok_or(ApngError::Closed)?;
    if let Some(err) = self.failed {
      return Err(err);
    }
    if self.ended {
      return Ok(0);
    }
    let next = self.current_frame + 1;
    if next > self.info.total_frames {
      tracing::trace!(frames = self.info.total_frames, "animation ended");
      self.current_frame = 0;
      self.ended = true;
      return Ok(0);
    }
    let step = res.source.read_next_frame_header().and_then(|frame| match frame {
      Some(frame) => compose_frame(&mut res.canvas, &mut res.source, &frame, next).map(|()| Some(frame)),
      None => Ok(None),
    });
    match step {
      Ok(Some(frame)) => {
        self.delay_ms = frame.delay_ms();
        self.current_frame = next;
        Ok(next)
      }
      Ok(None) => {
        tracing::warn!(
          expected = self.info.total_frames,
          found = self.current_frame,
          "animation ran out of frames early"
        );
        self.current_frame = 0;
        self.ended = true;
        Ok(0)
      }
      Err(err) => {
        tracing::warn!(%err, frame = next, "frame failed, stream stopped");
        self.failed = Some(err);
        Err(err)
      }
    }
  }

  /// Goes back to the state right after opening: the source is rewound, both
  /// canvases are transparent black, and the next `advance` gives frame 1.
  ///
  /// The canvas allocations are kept.
  pub fn restart(&mut self) -> Result<(), ApngError> {
    let res = self.resources.as_mut().ok_or(ApngError::Closed)?;
    res.source.rewind()?;
    res.canvas.clear();
    self.current_frame = 0;
    self.delay_ms = 0;
    self.ended = false;
    self.failed = None;
    tracing::debug!("restarted animation");
    Ok(())
  }
}

impl<S> ApngStream<S> {
  /// Releases the canvases and the frame source.
  ///
  /// Closing twice is fine. Dropping the stream has the same effect.
  pub fn close(&mut self) {
    if self.resources.take().is_some() {
      tracing::debug!(frame = self.current_frame, "closed animation");
    }
  }

  #[inline]
  #[must_use]
  pub const fn is_closed(&self) -> bool {
    self.resources.is_none()
  }

  /// Canvas width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.info.width
  }
  /// Canvas height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.info.height
  }
  #[inline]
  #[must_use]
  pub const fn total_frames(&self) -> u32 {
    self.info.total_frames
  }
  /// How many times the file asks to be played, 0 means forever.
  #[inline]
  #[must_use]
  pub const fn num_plays(&self) -> u32 {
    self.info.num_plays
  }
  /// The last value returned by `advance`, 0 before the first frame.
  #[inline]
  #[must_use]
  pub const fn current_frame(&self) -> u32 {
    self.current_frame
  }
  /// How long the current frame should be shown, in milliseconds.
  #[inline]
  #[must_use]
  pub const fn delay_ms(&self) -> u32 {
    self.delay_ms
  }
  /// If the PNG's default image is skipped by the animation.
  #[inline]
  #[must_use]
  pub const fn first_frame_hidden(&self) -> bool {
    self.info.first_frame_hidden
  }
  /// The error that stopped the stream, if `advance` has failed since the
  /// last restart.
  #[inline]
  #[must_use]
  pub const fn failure(&self) -> Option<ApngError> {
    self.failed
  }
  #[inline]
  #[must_use]
  pub const fn info(&self) -> &AnimationInfo {
    &self.info
  }

  /// The finished canvas, `width * height * 4` bytes, or `None` once closed.
  #[inline]
  #[must_use]
  pub fn render_buffer(&self) -> Option<&[u8]> {
    self.resources.as_ref().map(|res| res.canvas.render())
  }
  /// The finished canvas as pixels, or `None` once closed.
  #[inline]
  #[must_use]
  pub fn pixels(&self) -> Option<&[[u8; 4]]> {
    self.resources.as_ref().map(|res| res.canvas.render_pixels())
  }
  /// Both canvases, or `None` once closed.
  #[inline]
  #[must_use]
  pub fn canvas(&self) -> Option<&CanvasBuffers> {
    self.resources.as_ref().map(|res| &res.canvas)
  }
}
