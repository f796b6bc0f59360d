use super::*;
use crate::error::DecodeError;

#[inline]
#[must_use]
const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // Note: The PNG spec is extremely specific that you shall not, under any
  // circumstances, alter the order of evaluation of this expression's tests.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses one line's filter in place.
///
/// * `prev` is the already unfiltered previous line of the same reduced
///   image, or `None` on the first line (where it's implied to be all 0).
/// * Unknown filter types are left as is, same as filter type 0.
fn unfilter_line(filter: u8, line: &mut [u8], prev: Option<&[u8]>, step: usize) {
  let up = |i: usize| prev.map_or(0, |p| p[i]);
  match filter {
    1 => {
      for i in step..line.len() {
        line[i] = line[i].wrapping_add(line[i - step]);
      }
    }
    2 => {
      if let Some(prev) = prev {
        line.iter_mut().zip(prev).for_each(|(x, b)| *x = x.wrapping_add(*b));
      }
    }
    3 => {
      for i in 0..line.len() {
        let a = if i >= step { line[i - step] } else { 0 };
        line[i] = line[i].wrapping_add(((a as u16 + up(i) as u16) / 2) as u8);
      }
    }
    4 => {
      for i in 0..line.len() {
        let (a, c) = if i >= step { (line[i - step], up(i - step)) } else { (0, 0) };
        line[i] = line[i].wrapping_add(paeth_predict(a, up(i), c));
      }
    }
    _ => (),
  }
}

impl IHDR {
  /// Unfilters data from the zlib decompression buffer, passing each pixel
  /// to `op(x, y, data)` in the image's own coordinates.
  ///
  /// * Bit depths 1, 2, and 4 have the value in the low bits of a single byte.
  /// * Bit depth 8 has one byte per channel.
  /// * Bit depth 16 has two big-endian bytes per channel.
  ///
  /// Interlaced data is de-interlaced as it goes, so `op` sees each pixel
  /// exactly once, though not in row order.
  ///
  /// ## Failure
  /// * [`DecodeError::TruncatedFrameData`] if `decompressed` is shorter than
  ///   [`get_zlib_decompression_requirement`](IHDR::get_zlib_decompression_requirement).
  ///   This is checked before `op` is ever called.
  pub fn unfilter_decompressed_data<F>(
    &self, decompressed: &mut [u8], mut op: F,
  ) -> Result<(), DecodeError>
  where
    F: FnMut(u32, u32, &[u8]),
  {
    if decompressed.len() < self.get_zlib_decompression_requirement() {
      return Err(DecodeError::TruncatedFrameData);
    }
    let step = self.filter_step();
    let bits = self.bits_per_pixel();
    let levels = reduced_image_dimensions(self.width, self.height);
    let first_level = if self.is_interlaced { 1 } else { 0 };
    let last_level = if self.is_interlaced { 7 } else { 0 };

    let mut spare: &mut [u8] = decompressed;
    for (image_level, &(reduced_width, reduced_height)) in
      levels.iter().enumerate().take(last_level + 1).skip(first_level)
    {
      if reduced_width == 0 || reduced_height == 0 {
        continue;
      }
      let line_len = self.bytes_per_filterline(reduced_width);
      let (these_bytes, more_bytes) =
        core::mem::take(&mut spare).split_at_mut(line_len * reduced_height as usize);
      spare = more_bytes;

      let mut prev: Option<&[u8]> = None;
      for (reduced_y, filterline) in these_bytes.chunks_exact_mut(line_len).enumerate() {
        let (filter, line) = filterline.split_at_mut(1);
        unfilter_line(filter[0], line, prev, step);
        for reduced_x in 0..reduced_width {
          let (x, y) = interlaced_pos_to_full_pos(image_level, reduced_x, reduced_y as u32);
          if bits >= 8 {
            let i = reduced_x as usize * step;
            op(x, y, &line[i..i + step]);
          } else {
            // packed pixels, with the leftmost pixel in the high bits.
            let bit = reduced_x as usize * bits;
            let shift = 8 - bits - (bit % 8);
            let mask = (1_u8 << bits) - 1;
            op(x, y, &[(line[bit / 8] >> shift) & mask]);
          }
        }
        prev = Some(&*line);
      }
    }
    Ok(())
  }
}

#[cfg(test)]
fn collect_pixels(ihdr: &IHDR, data: &mut [u8]) -> alloc::vec::Vec<(u32, u32, alloc::vec::Vec<u8>)> {
  let mut out = alloc::vec::Vec::new();
  ihdr.unfilter_decompressed_data(data, |x, y, d| out.push((x, y, d.to_vec()))).unwrap();
  out.sort_by_key(|p| (p.1, p.0));
  out
}

#[test]
fn test_paeth_predict() {
  assert_eq!(paeth_predict(10, 20, 10), 20);
  assert_eq!(paeth_predict(20, 10, 10), 20);
  assert_eq!(paeth_predict(10, 10, 10), 10);
  assert_eq!(paeth_predict(0, 0, 255), 0);
}

#[test]
fn test_unfilter_each_filter_type() {
  use alloc::vec;
  // 2x2 Y8, one line per filter type pairing
  let ihdr = IHDR { width: 2, height: 2, bit_depth: 8, color_type: PngColorType::Y, is_interlaced: false };
  // Sub then Up
  let mut data = vec![1, 10, 5, 2, 1, 1];
  let px = collect_pixels(&ihdr, &mut data);
  assert_eq!(px.iter().map(|p| p.2[0]).collect::<alloc::vec::Vec<_>>(), vec![10, 15, 11, 16]);
  // Average then Paeth
  let mut data = vec![3, 10, 5, 4, 1, 1];
  let px = collect_pixels(&ihdr, &mut data);
  // line 0: 10, 5 + 10/2 = 10
  // line 1: x0 = 1 + paeth(0, 10, 0), x1 = 1 + paeth(11, 10, 10)
  assert_eq!(px.iter().map(|p| p.2[0]).collect::<alloc::vec::Vec<_>>(), vec![10, 10, 11, 12]);
  // unknown filter is the same as None
  let mut data = vec![9, 7, 8, 0, 1, 2];
  let px = collect_pixels(&ihdr, &mut data);
  assert_eq!(px.iter().map(|p| p.2[0]).collect::<alloc::vec::Vec<_>>(), vec![7, 8, 1, 2]);
}

#[test]
fn test_unfilter_multibyte_pixels() {
  use alloc::vec;
  let ihdr = IHDR { width: 2, height: 1, bit_depth: 8, color_type: PngColorType::RGBA, is_interlaced: false };
  let mut data = vec![1, 1, 2, 3, 4, 1, 1, 1, 1];
  let px = collect_pixels(&ihdr, &mut data);
  assert_eq!(px, vec![(0, 0, vec![1, 2, 3, 4]), (1, 0, vec![2, 3, 4, 5])]);
}

#[test]
fn test_unfilter_packed_pixels() {
  use alloc::vec;
  let ihdr = IHDR { width: 5, height: 1, bit_depth: 2, color_type: PngColorType::Index, is_interlaced: false };
  let mut data = vec![0, 0b00_01_10_11, 0b01_00_00_00];
  let px = collect_pixels(&ihdr, &mut data);
  let values: alloc::vec::Vec<u8> = px.iter().map(|p| p.2[0]).collect();
  assert_eq!(values, vec![0, 1, 2, 3, 1]);
}

#[test]
fn test_unfilter_interlaced_visits_everything() {
  use alloc::vec;
  let ihdr = IHDR { width: 3, height: 3, bit_depth: 8, color_type: PngColorType::Y, is_interlaced: true };
  let len = ihdr.get_zlib_decompression_requirement();
  // levels for 3x3: (1,1) (0,1) (1,0) (1,1) (2,1) (1,2) (3,1)
  assert_eq!(len, 2 + 2 + 3 + 2 * 2 + 4);
  let mut data = vec![0; len];
  let px = collect_pixels(&ihdr, &mut data);
  let positions: alloc::vec::Vec<(u32, u32)> = px.iter().map(|p| (p.0, p.1)).collect();
  let mut expected = alloc::vec::Vec::new();
  for y in 0..3 {
    for x in 0..3 {
      expected.push((x, y));
    }
  }
  assert_eq!(positions, expected);
}

#[test]
fn test_unfilter_short_data_fails_without_output() {
  use alloc::vec;
  let ihdr = IHDR { width: 2, height: 2, bit_depth: 8, color_type: PngColorType::Y, is_interlaced: false };
  let mut data = vec![0; 5];
  let mut calls = 0;
  assert_eq!(
    ihdr.unfilter_decompressed_data(&mut data, |_, _, _| calls += 1),
    Err(DecodeError::TruncatedFrameData)
  );
  assert_eq!(calls, 0);
}
