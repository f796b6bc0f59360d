use core::fmt;

/// Shorthand for results with an [`ApngError`].
pub type ApngResult<T> = Result<T, ApngError>;

/// An error from opening or playing an animated PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApngError {
  /// The data is a PNG, but it has no animation control chunk.
  ///
  /// Callers will usually want to fall back to showing a static image.
  NotAnimated,

  /// Reading the file failed.
  #[cfg(feature = "std")]
  Io(std::io::ErrorKind),

  /// The allocator couldn't give us enough space.
  Alloc,

  /// The header, a frame control record, or some pixel data was malformed.
  Decode(DecodeError),

  /// The stream was already closed.
  Closed,
}

/// The specific way that APNG data was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
  /// The first eight bytes are not the PNG signature.
  NotPng,
  /// The first chunk isn't an image header.
  MissingHeader,
  /// The image header has illegal values.
  BadHeader,
  /// The declared width and/or height is 0, or larger than allowed by the
  /// decode options.
  DimensionsTooLarge,
  /// The animation control chunk has the wrong size.
  BadAnimationControl,
  /// A frame control chunk has the wrong size or an unknown dispose/blend
  /// operation.
  BadFrameControl,
  /// A frame's region doesn't fit inside the canvas.
  FrameOutOfBounds,
  /// The zlib stream of a frame couldn't be inflated.
  Inflate,
  /// A frame's zlib stream was shorter than the frame's pixels require.
  TruncatedFrameData,
  /// Rows were requested without first reading a frame header.
  NoPendingFrame,
  /// The row buffers given don't match the size of the pending frame.
  FrameRowsMismatch,
}

impl From<DecodeError> for ApngError {
  #[inline]
  fn from(e: DecodeError) -> Self {
    Self::Decode(e)
  }
}
impl From<alloc::collections::TryReserveError> for ApngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
#[cfg(feature = "std")]
impl From<std::io::Error> for ApngError {
  #[inline]
  fn from(e: std::io::Error) -> Self {
    Self::Io(e.kind())
  }
}

impl fmt::Display for ApngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NotAnimated => f.write_str("not an animated PNG"),
      #[cfg(feature = "std")]
      Self::Io(kind) => write!(f, "i/o error: {kind}"),
      Self::Alloc => f.write_str("allocation failed"),
      Self::Decode(e) => write!(f, "decode error: {e}"),
      Self::Closed => f.write_str("the stream is closed"),
    }
  }
}
impl fmt::Display for DecodeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::NotPng => "missing PNG signature",
      Self::MissingHeader => "first chunk is not IHDR",
      Self::BadHeader => "illegal IHDR values",
      Self::DimensionsTooLarge => "image dimensions are zero or too large",
      Self::BadAnimationControl => "malformed acTL chunk",
      Self::BadFrameControl => "malformed fcTL chunk",
      Self::FrameOutOfBounds => "frame region is outside the canvas",
      Self::Inflate => "zlib data could not be inflated",
      Self::TruncatedFrameData => "frame data is too short",
      Self::NoPendingFrame => "no frame header has been read",
      Self::FrameRowsMismatch => "row buffers don't match the frame size",
    })
  }
}

#[cfg(feature = "std")]
impl std::error::Error for ApngError {}
#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[test]
fn test_error_conversions() {
  fn fails() -> ApngResult<()> {
    let inflated: Result<(), DecodeError> = Err(DecodeError::Inflate);
    inflated?;
    Ok(())
  }
  assert_eq!(fails(), Err(ApngError::Decode(DecodeError::Inflate)));

  let mut v: alloc::vec::Vec<u8> = alloc::vec::Vec::new();
  let e = v.try_reserve(usize::MAX).unwrap_err();
  assert_eq!(ApngError::from(e), ApngError::Alloc);
}

#[test]
#[cfg(feature = "std")]
fn test_error_display() {
  use alloc::string::ToString;
  assert_eq!(ApngError::NotAnimated.to_string(), "not an animated PNG");
  assert_eq!(
    ApngError::Decode(DecodeError::FrameOutOfBounds).to_string(),
    "decode error: frame region is outside the canvas"
  );
  let io = std::io::Error::from(std::io::ErrorKind::NotFound);
  assert_eq!(ApngError::from(io), ApngError::Io(std::io::ErrorKind::NotFound));
}
