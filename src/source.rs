//! Where frame pixels come from.
//!
//! The compositor doesn't decode anything itself. It asks a
//! [`PixelRowSource`] for each frame's control record, then hands the source
//! a [`FrameRows`] view of the canvas to write that frame's pixels into.
//!
//! [`PngFrameSource`] is the source for APNG data held in memory.

use crate::{
  canvas::FrameRows,
  error::{ApngError, DecodeError},
  frame::{AnimationInfo, FrameDescriptor},
  options::{ChannelOrder, DecodeOptions},
  png::*,
};
use alloc::vec::Vec;
use pixel_formats::r8g8b8a8_Srgb;

/// A decoder that produces animation frames one at a time.
///
/// The expected call pattern for each frame is one
/// [`read_next_frame_header`](PixelRowSource::read_next_frame_header)
/// followed by one [`decode_rows_into`](PixelRowSource::decode_rows_into).
pub trait PixelRowSource {
  /// Canvas size and animation facts.
  fn animation_info(&self) -> AnimationInfo;

  /// Moves to the next frame and returns its control record.
  ///
  /// `Ok(None)` means there are no more frames.
  fn read_next_frame_header(&mut self) -> Result<Option<FrameDescriptor>, ApngError>;

  /// Writes the current frame's pixels, one 4 byte pixel per frame pixel with
  /// alpha last, into `rows`.
  ///
  /// `rows` points straight into the render buffer, and the compositor has
  /// already prepared the canvas for this frame when this is called. An error
  /// here leaves the render buffer partly drawn, so any work that can fail
  /// belongs in `read_next_frame_header`. [`ApngStream`](crate::ApngStream)
  /// stops after such an error and only a restart clears the canvas.
  fn decode_rows_into(&mut self, rows: &mut FrameRows<'_>) -> Result<(), ApngError>;

  /// Goes back to before the first frame.
  fn rewind(&mut self) -> Result<(), ApngError>;
}

/// A frame whose data has been inflated and is waiting to be written out.
#[derive(Debug, Clone, Copy)]
struct PendingFrame {
  /// The header with this frame's width and height.
  ihdr: IHDR,
  zlib_len: usize,
}

/// Decodes the frames of an APNG that's already in memory.
///
/// Each frame's zlib data is inflated by
/// [`read_next_frame_header`](PixelRowSource::read_next_frame_header), so
/// any problem with the frame data is reported before the canvas is touched.
#[derive(Debug, Clone)]
pub struct PngFrameSource<B> {
  bytes: B,
  ihdr: IHDR,
  palette: Vec<[u8; 3]>,
  trns: Vec<u8>,
  info: AnimationInfo,
  channel_order: ChannelOrder,
  /// Where the chunks after the header start.
  frames_start: usize,
  cursor: usize,
  zlib_buffer: Vec<u8>,
  pending: Option<PendingFrame>,
}
impl<B: AsRef<[u8]>> PngFrameSource<B> {
  /// Reads the image header and animation info.
  ///
  /// ## Failure
  /// * [`ApngError::NotAnimated`] if the data is a PNG without an `acTL`
  ///   before the image data.
  /// * [`ApngError::Decode`] if the signature or header is bad, or the
  ///   dimensions are 0 or above `options.max_dimension`.
  /// * [`ApngError::Alloc`] if the inflate buffer can't be allocated.
  pub fn new(bytes: B, options: &DecodeOptions) -> Result<Self, ApngError> {
    let data = bytes.as_ref();
    if !is_png_header_correct(data) {
      return Err(DecodeError::NotPng.into());
    }
    let mut it = RawChunkIter::new(data);
    let ihdr = match it.next() {
      Some(RawChunk { ty: ChunkType::IHDR, data, .. }) => IHDR::try_from(data)?,
      _ => return Err(DecodeError::MissingHeader.into()),
    };
    if ihdr.width == 0
      || ihdr.height == 0
      || ihdr.width > options.max_dimension
      || ihdr.height > options.max_dimension
    {
      return Err(DecodeError::DimensionsTooLarge.into());
    }
    let frames_start = it.pos();

    let mut palette: Vec<[u8; 3]> = Vec::new();
    let mut trns: Vec<u8> = Vec::new();
    let mut actl: Option<acTL> = None;
    let mut first_frame_hidden = true;
    for chunk in it {
      match chunk.ty {
        ChunkType::PLTE => {
          // a partial last entry is ignored.
          let entries: &[[u8; 3]] = bytemuck::cast_slice(&chunk.data[..chunk.data.len() / 3 * 3]);
          palette.clear();
          palette.try_reserve(entries.len())?;
          palette.extend_from_slice(entries);
        }
        ChunkType::tRNS => {
          trns.clear();
          trns.try_reserve(chunk.data.len())?;
          trns.extend_from_slice(chunk.data);
        }
        ChunkType::acTL => actl = Some(acTL::try_from(chunk.data)?),
        ChunkType::fcTL => first_frame_hidden = false,
        ChunkType::IDAT | ChunkType::IEND => break,
        _ => (),
      }
    }
    let actl = match actl {
      Some(actl) => actl,
      None => {
        tracing::warn!(width = ihdr.width, height = ihdr.height, "PNG has no animation control");
        return Err(ApngError::NotAnimated);
      }
    };

    let zlib_len = ihdr.get_zlib_decompression_requirement();
    let mut zlib_buffer: Vec<u8> = Vec::new();
    zlib_buffer.try_reserve(zlib_len)?;
    zlib_buffer.resize(zlib_len, 0);

    let info = AnimationInfo {
      width: ihdr.width,
      height: ihdr.height,
      total_frames: actl.num_frames,
      num_plays: actl.num_plays,
      first_frame_hidden,
    };
    tracing::debug!(
      width = info.width,
      height = info.height,
      frames = info.total_frames,
      plays = info.num_plays,
      hidden_default_image = info.first_frame_hidden,
      color_type = ?ihdr.color_type,
      bit_depth = ihdr.bit_depth,
      interlaced = ihdr.is_interlaced,
      "read APNG header"
    );
    Ok(Self {
      bytes,
      ihdr,
      palette,
      trns,
      info,
      channel_order: options.channel_order,
      frames_start,
      cursor: frames_start,
      zlib_buffer,
      pending: None,
    })
  }

  /// The image header.
  #[inline]
  #[must_use]
  pub const fn ihdr(&self) -> &IHDR {
    &self.ihdr
  }

  /// The PNG bytes this source reads from.
  #[inline]
  #[must_use]
  pub fn bytes(&self) -> &[u8] {
    self.bytes.as_ref()
  }

  /// Inflates the data chunks in `data_start..data_end` as one zlib stream.
  fn inflate_frame(&mut self, frame_ihdr: &IHDR, data_start: usize, data_end: usize) -> Result<usize, ApngError> {
    let zlib_len = frame_ihdr.get_zlib_decompression_requirement();
    if self.zlib_buffer.len() < zlib_len {
      self.zlib_buffer.try_reserve(zlib_len - self.zlib_buffer.len())?;
      self.zlib_buffer.resize(zlib_len, 0);
    }
    let bytes = self.bytes.as_ref();
    let slices = RawChunkIter::at(&bytes[..data_end], data_start).filter_map(|chunk| chunk.image_data());
    match miniz_oxide::inflate::decompress_slice_iter_to_slice(
      &mut self.zlib_buffer[..zlib_len],
      slices,
      true,
      true,
    ) {
      Ok(count) if count < zlib_len => Err(DecodeError::TruncatedFrameData.into()),
      Ok(_) => Ok(zlib_len),
      // more data than the frame needs, which is fine since the buffer is full.
      Err(miniz_oxide::inflate::TINFLStatus::HasMoreOutput) => Ok(zlib_len),
      Err(status) => {
        tracing::debug!(?status, "frame inflate failed");
        Err(DecodeError::Inflate.into())
      }
    }
  }
}

impl<B: AsRef<[u8]>> PixelRowSource for PngFrameSource<B> {
  #[inline]
  fn animation_info(&self) -> AnimationInfo {
    self.info
  }

  fn read_next_frame_header(&mut self) -> Result<Option<FrameDescriptor>, ApngError> {
    self.pending = None;
    let bytes = self.bytes.as_ref();

    // find the next frame control, skipping a hidden default image.
    let mut it = RawChunkIter::at(bytes, self.cursor);
    let fctl = loop {
      match it.next() {
        Some(RawChunk { ty: ChunkType::fcTL, data, .. }) => break fcTL::try_from(data)?,
        Some(RawChunk { ty: ChunkType::IEND, .. }) | None => {
          self.cursor = it.pos();
          return Ok(None);
        }
        Some(_) => (),
      }
    };
    let frame = fctl.to_descriptor(self.info.width, self.info.height)?;
    tracing::trace!(
      seq = fctl.sequence_number,
      x = frame.rect.x,
      y = frame.rect.y,
      width = frame.rect.width,
      height = frame.rect.height,
      delay_ms = frame.delay_ms(),
      dispose = ?frame.dispose_op,
      blend = ?frame.blend_op,
      "frame control"
    );

    // the frame's data runs until the next frame control or the end.
    let data_start = it.pos();
    let mut data_end = data_start;
    for chunk in RawChunkIter::at(bytes, data_start) {
      if chunk.ty == ChunkType::fcTL || chunk.ty == ChunkType::IEND {
        break;
      }
      data_end += 12 + chunk.data.len();
    }
    self.cursor = data_end;

    let frame_ihdr = self.ihdr.with_dimensions(frame.rect.width, frame.rect.height);
    let zlib_len = self.inflate_frame(&frame_ihdr, data_start, data_end)?;
    self.pending = Some(PendingFrame { ihdr: frame_ihdr, zlib_len });
    Ok(Some(frame))
  }

  fn decode_rows_into(&mut self, rows: &mut FrameRows<'_>) -> Result<(), ApngError> {
    let pending = self.pending.take().ok_or(DecodeError::NoPendingFrame)?;
    if rows.width() != pending.ihdr.width || rows.height() != pending.ihdr.height {
      return Err(DecodeError::FrameRowsMismatch.into());
    }
    let expander =
      PixelExpander::new(&self.ihdr, &self.palette, Transparency::new(self.ihdr.color_type, &self.trns));
    let channel_order = self.channel_order;
    pending.ihdr.unfilter_decompressed_data(&mut self.zlib_buffer[..pending.zlib_len], |x, y, data| {
      if let Some(p) = rows.pixel_mut(x, y) {
        let r8g8b8a8_Srgb { r, g, b, a } = expander.expand(data);
        *p = channel_order.arrange([r, g, b, a]);
      }
    })?;
    Ok(())
  }

  fn rewind(&mut self) -> Result<(), ApngError> {
    self.cursor = self.frames_start;
    self.pending = None;
    Ok(())
  }
}
