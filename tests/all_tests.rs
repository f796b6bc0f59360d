#![allow(bad_style)]

mod png;
mod player;
mod stream;

fn rand_bytes(count: usize) -> Vec<u8> {
  let mut buffer = vec![0; count];
  getrandom::getrandom(&mut buffer).unwrap();
  buffer
}

/// The chunk CRC. The decoder doesn't check it, but the test files should
/// still be real PNGs.
fn crc32(ty: &[u8], data: &[u8]) -> u32 {
  let mut crc = u32::MAX;
  for byte in ty.iter().chain(data) {
    crc ^= u32::from(*byte);
    for _ in 0..8 {
      crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
    }
  }
  !crc
}

/// Builds APNG files chunk by chunk.
pub struct ApngBuilder {
  bytes: Vec<u8>,
  seq: u32,
}
impl ApngBuilder {
  /// Signature, IHDR, and acTL.
  pub fn new(width: u32, height: u32, frames: u32, plays: u32) -> Self {
    Self::with_format(width, height, 8, 6, false, frames, plays)
  }

  pub fn with_format(
    width: u32, height: u32, bit_depth: u8, color_type: u8, interlaced: bool, frames: u32, plays: u32,
  ) -> Self {
    let mut b = Self::without_animation(width, height, bit_depth, color_type, interlaced);
    let mut actl = frames.to_be_bytes().to_vec();
    actl.extend(plays.to_be_bytes());
    b.chunk(b"acTL", &actl);
    b
  }

  /// A plain PNG with no acTL (yet).
  pub fn without_animation(width: u32, height: u32, bit_depth: u8, color_type: u8, interlaced: bool) -> Self {
    let mut b = Self { bytes: vec![137, 80, 78, 71, 13, 10, 26, 10], seq: 0 };
    let mut ihdr = width.to_be_bytes().to_vec();
    ihdr.extend(height.to_be_bytes());
    ihdr.extend([bit_depth, color_type, 0, 0, u8::from(interlaced)]);
    b.chunk(b"IHDR", &ihdr);
    b
  }

  pub fn chunk(&mut self, ty: &[u8; 4], data: &[u8]) -> &mut Self {
    self.bytes.extend((data.len() as u32).to_be_bytes());
    self.bytes.extend(ty);
    self.bytes.extend(data);
    self.bytes.extend(crc32(ty, data).to_be_bytes());
    self
  }

  /// `rect` is `(x, y, width, height)`, `delay` is `(num, den)`.
  pub fn fctl(&mut self, rect: (u32, u32, u32, u32), delay: (u16, u16), dispose: u8, blend: u8) -> &mut Self {
    let (x, y, w, h) = rect;
    let mut data = self.seq.to_be_bytes().to_vec();
    self.seq += 1;
    for v in [w, h, x, y] {
      data.extend(v.to_be_bytes());
    }
    data.extend(delay.0.to_be_bytes());
    data.extend(delay.1.to_be_bytes());
    data.extend([dispose, blend]);
    self.chunk(b"fcTL", &data)
  }

  /// `raw` is filtered scanlines, which get compressed.
  pub fn idat(&mut self, raw: &[u8]) -> &mut Self {
    let z = miniz_oxide::deflate::compress_to_vec_zlib(raw, 6);
    self.chunk(b"IDAT", &z)
  }

  /// `raw` is filtered scanlines, compressed and split over `parts` chunks.
  pub fn fdat_split(&mut self, raw: &[u8], parts: usize) -> &mut Self {
    let z = miniz_oxide::deflate::compress_to_vec_zlib(raw, 6);
    let part_len = (z.len() + parts - 1) / parts;
    for part in z.chunks(part_len.max(1)) {
      let mut data = self.seq.to_be_bytes().to_vec();
      self.seq += 1;
      data.extend(part);
      self.chunk(b"fdAT", &data);
    }
    self
  }

  pub fn fdat(&mut self, raw: &[u8]) -> &mut Self {
    self.fdat_split(raw, 1)
  }

  pub fn finish(&mut self) -> Vec<u8> {
    self.chunk(b"IEND", &[]);
    core::mem::take(&mut self.bytes)
  }
}

/// Unfiltered RGBA8 scanlines, `width` pixels per line.
pub fn rgba_lines(width: usize, pixels: &[[u8; 4]]) -> Vec<u8> {
  let mut out = Vec::new();
  for line in pixels.chunks(width) {
    out.push(0);
    for p in line {
      out.extend(p);
    }
  }
  out
}
