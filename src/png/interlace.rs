//! Adam7 interlacing math.
//!
//! The interlacing scheme converts a full image into 7 reduced images, each
//! taking every pixel marked with its number in this repeating 8x8 pattern:
//! ```text
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```
//! Level 0 is used for the full image itself, so a non-interlaced image is
//! just "an interlaced image with only level 0".

/// `(x_start, y_start, x_step, y_step)` for each level.
const ADAM7: [(u32, u32, u32, u32); 8] = [
  (0, 0, 1, 1),
  (0, 0, 8, 8),
  (4, 0, 8, 8),
  (0, 4, 4, 8),
  (2, 0, 4, 4),
  (0, 2, 2, 4),
  (1, 0, 2, 2),
  (0, 1, 1, 2),
];

#[inline]
#[must_use]
const fn reduced_len(full: u32, start: u32, step: u32) -> u32 {
  if full > start {
    (full - start + step - 1) / step
  } else {
    0
  }
}

/// Given the dimensions of the full image, computes the size of each reduced
/// image.
///
/// Index 0 is the full image size, and indexes 1 through 7 are the sizes of
/// reduced images 1 through 7. Reduced images can have a width or height of
/// 0, in which case they contain no data at all.
#[must_use]
pub(crate) const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  let mut out = [(0, 0); 8];
  let mut level = 0;
  while level < 8 {
    let (x0, y0, dx, dy) = ADAM7[level];
    out[level] = (reduced_len(full_width, x0, dx), reduced_len(full_height, y0, dy));
    level += 1;
  }
  out
}

/// Converts a reduced image location into the full image location.
///
/// Level 0 gives back the input position.
#[inline]
#[must_use]
pub(crate) const fn interlaced_pos_to_full_pos(
  image_level: usize, reduced_x: u32, reduced_y: u32,
) -> (u32, u32) {
  let (x0, y0, dx, dy) = ADAM7[image_level];
  (reduced_x * dx + x0, reduced_y * dy + y0)
}

#[test]
fn test_reduced_image_dimensions() {
  assert_eq!(reduced_image_dimensions(0, 0), [(0, 0); 8]);
  let widths_by_level: [[u32; 8]; 8] = [
    [1, 2, 3, 4, 5, 6, 7, 8],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 1, 1, 1, 1],
    [1, 1, 1, 1, 2, 2, 2, 2],
    [0, 0, 1, 1, 1, 1, 2, 2],
    [1, 1, 2, 2, 3, 3, 4, 4],
    [0, 1, 1, 2, 2, 3, 3, 4],
    [1, 2, 3, 4, 5, 6, 7, 8],
  ];
  let heights_by_level: [[u32; 8]; 8] = [
    [1, 2, 3, 4, 5, 6, 7, 8],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 1, 1, 1, 1],
    [1, 1, 1, 1, 2, 2, 2, 2],
    [0, 0, 1, 1, 1, 1, 2, 2],
    [1, 1, 2, 2, 3, 3, 4, 4],
    [0, 1, 1, 2, 2, 3, 3, 4],
  ];
  for level in 0..8 {
    for (n, (ex_w, ex_h)) in (1..=8).zip(widths_by_level[level].iter().zip(heights_by_level[level])) {
      assert_eq!(reduced_image_dimensions(n, 0)[level].0, *ex_w, "level:{level} w:{n}");
      assert_eq!(reduced_image_dimensions(0, n)[level].1, ex_h, "level:{level} h:{n}");
    }
  }
  assert_eq!(
    reduced_image_dimensions(8, 8),
    [(8, 8), (1, 1), (1, 1), (2, 1), (2, 2), (4, 2), (4, 4), (8, 4)]
  );
}

#[test]
fn test_interlaced_pos_to_full_pos() {
  assert_eq!(interlaced_pos_to_full_pos(0, 5, 6), (5, 6));
  assert_eq!(interlaced_pos_to_full_pos(1, 1, 1), (8, 8));
  assert_eq!(interlaced_pos_to_full_pos(2, 0, 0), (4, 0));
  assert_eq!(interlaced_pos_to_full_pos(3, 1, 0), (4, 4));
  assert_eq!(interlaced_pos_to_full_pos(6, 2, 1), (5, 2));
  assert_eq!(interlaced_pos_to_full_pos(7, 3, 1), (3, 3));
  // every pixel of an 8x8 image is visited exactly once.
  let mut seen = [[0_u8; 8]; 8];
  let dims = reduced_image_dimensions(8, 8);
  for level in 1..8 {
    for y in 0..dims[level].1 {
      for x in 0..dims[level].0 {
        let (fx, fy) = interlaced_pos_to_full_pos(level, x, y);
        seen[fy as usize][fx as usize] += 1;
      }
    }
  }
  assert_eq!(seen, [[1; 8]; 8]);
}
