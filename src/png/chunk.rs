use core::fmt::{Debug, Write};

/// The four byte type tag of a chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const acTL: Self = Self(*b"acTL");
  pub const fcTL: Self = Self(*b"fcTL");
  pub const fdAT: Self = Self(*b"fdAT");
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for b in self.0 {
      f.write_char(b as char)?;
    }
    Ok(())
  }
}

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  pub ty: ChunkType,
  pub data: &'b [u8],
  pub declared_crc: u32,
}
impl<'b> RawChunk<'b> {
  /// The compressed image bytes, if this is an image data or frame data
  /// chunk.
  ///
  /// Frame data chunks start with a sequence number, which is skipped.
  #[inline]
  #[must_use]
  pub fn image_data(&self) -> Option<&'b [u8]> {
    match self.ty {
      ChunkType::IDAT => Some(self.data),
      ChunkType::fdAT => self.data.get(4..),
      _ => None,
    }
  }
}
impl Debug for RawChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("ty", &self.ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// The iterator remembers its byte position, so that a later scan can resume
/// from any chunk boundary it reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawChunkIter<'b> {
  bytes: &'b [u8],
  pos: usize,
}
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, the 8 signature bytes are skipped.
  ///
  /// The signature isn't checked, use
  /// [`is_png_header_correct`](super::is_png_header_correct) for that.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self::at(bytes, 8)
  }

  /// Starts at byte `pos`, which should be a chunk boundary.
  #[inline]
  #[must_use]
  pub const fn at(bytes: &'b [u8], pos: usize) -> Self {
    Self { bytes, pos }
  }

  /// The byte position of the next chunk.
  #[inline]
  #[must_use]
  pub const fn pos(&self) -> usize {
    self.pos
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = RawChunk<'b>;
  fn next(&mut self) -> Option<Self::Item> {
    let rest = self.bytes.get(self.pos..)?;
    let (len_bytes, rest) = split_array::<4>(rest)?;
    let (ty_bytes, rest) = split_array::<4>(rest)?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    let data = rest.get(..len)?;
    let (crc_bytes, _) = split_array::<4>(&rest[len..])?;
    self.pos += 12 + len;
    Some(RawChunk { ty: ChunkType(ty_bytes), data, declared_crc: u32::from_be_bytes(crc_bytes) })
  }
}

#[inline]
fn split_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    Some((head.try_into().ok()?, tail))
  } else {
    None
  }
}

#[cfg(test)]
pub(crate) fn push_chunk(out: &mut alloc::vec::Vec<u8>, ty: &[u8; 4], data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  out.extend_from_slice(&0_u32.to_be_bytes());
}

#[test]
fn test_raw_chunk_iter() {
  let mut v = alloc::vec::Vec::from(super::PNG_SIGNATURE);
  push_chunk(&mut v, b"IHDR", &[1, 2, 3]);
  let second = v.len();
  push_chunk(&mut v, b"fdAT", &[0, 0, 0, 7, 9, 9]);
  push_chunk(&mut v, b"IEND", &[]);

  let mut it = RawChunkIter::new(&v);
  let c = it.next().unwrap();
  assert_eq!(c.ty, ChunkType::IHDR);
  assert_eq!(c.data, &[1, 2, 3]);
  assert_eq!(c.image_data(), None);
  assert_eq!(it.pos(), second);

  let c = RawChunkIter::at(&v, second).next().unwrap();
  assert_eq!(c.ty, ChunkType::fdAT);
  assert_eq!(c.image_data(), Some(&[9_u8, 9][..]));

  assert_eq!(RawChunkIter::new(&v).count(), 3);
  // a truncated chunk ends the iteration
  assert_eq!(RawChunkIter::new(&v[..v.len() - 1]).count(), 2);
  assert_eq!(RawChunkIter::at(&v, usize::MAX).next(), None);
}
