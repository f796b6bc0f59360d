use apng_compose::{ApngError, ApngStream, ChannelOrder, DecodeError, DecodeOptions};

use super::{rgba_lines, ApngBuilder};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// 2x2 canvas: full red, then a green top-left corner that gets thrown away
/// by PREVIOUS, then a half transparent blue bottom-right corner.
fn three_frames(plays: u32) -> Vec<u8> {
  ApngBuilder::new(2, 2, 3, plays)
    .fctl((0, 0, 2, 2), (1, 10), 0, 0)
    .idat(&rgba_lines(2, &[RED; 4]))
    .fctl((0, 0, 1, 1), (2, 10), 2, 0)
    .fdat(&rgba_lines(1, &[GREEN]))
    .fctl((1, 1, 1, 1), (3, 10), 0, 1)
    .fdat(&rgba_lines(1, &[[0, 0, 255, 128]]))
    .finish()
}

#[test]
fn test_single_opaque_frame_is_copied_exactly() {
  let pixels = [[1, 2, 3, 255], [4, 5, 6, 255], [7, 8, 9, 255], [10, 11, 12, 255]];
  let bytes = ApngBuilder::new(2, 2, 1, 0).fctl((0, 0, 2, 2), (0, 0), 0, 0).idat(&rgba_lines(2, &pixels)).finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  assert_eq!((s.width(), s.height(), s.total_frames()), (2, 2, 1));
  assert_eq!(s.advance(), Ok(1));
  assert_eq!(s.render_buffer().unwrap(), pixels.concat());
  assert_eq!(s.delay_ms(), 0);
  assert_eq!(s.advance(), Ok(0));
}

#[test]
fn test_frame_numbers_cycle_with_restart() {
  let mut s = ApngStream::from_bytes(three_frames(0)).unwrap();
  for _ in 0..3 {
    let got: Vec<u32> = (0..4).map(|_| s.advance().unwrap()).collect();
    assert_eq!(got, [1, 2, 3, 0]);
    s.restart().unwrap();
  }
}

#[test]
fn test_dispose_and_blend_sequence() {
  let mut s = ApngStream::from_bytes(three_frames(0)).unwrap();
  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &[RED; 4]);
  assert_eq!(s.delay_ms(), 100);

  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &[GREEN, RED, RED, RED]);
  assert_eq!(s.delay_ms(), 200);

  // the green corner is gone again, and blue is blended over red.
  s.advance().unwrap();
  assert_eq!(s.delay_ms(), 300);
  // u = 128 * 255, v = 127 * 255: r = 255 * v / (u + v) = 127
  assert_eq!(s.pixels().unwrap(), &[RED, RED, RED, [127, 0, 128, 255]]);
}

#[test]
fn test_restart_reproduces_the_first_frame() {
  let mut s = ApngStream::from_bytes(three_frames(0)).unwrap();
  s.advance().unwrap();
  let first = s.render_buffer().unwrap().to_vec();
  while s.advance().unwrap() != 0 {}
  assert_ne!(s.render_buffer().unwrap(), first);
  s.restart().unwrap();
  assert_eq!(s.render_buffer().unwrap(), &[0; 16]);
  assert_eq!(s.advance(), Ok(1));
  assert_eq!(s.render_buffer().unwrap(), first);
}

#[test]
fn test_over_blend_arithmetic_is_exact() {
  let dst = [10, 20, 30, 255];
  let src = [200, 100, 50, 128];
  let bytes = ApngBuilder::new(2, 2, 2, 0)
    .fctl((0, 0, 2, 2), (1, 10), 0, 0)
    .idat(&rgba_lines(2, &[dst; 4]))
    .fctl((1, 1, 1, 1), (1, 10), 0, 1)
    .fdat(&rgba_lines(1, &[src]))
    .finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  s.advance().unwrap();
  s.advance().unwrap();
  // u = 32640, v = 32385, denom = 65025
  // r = (200 * 32640 + 10 * 32385) / 65025 = 105
  assert_eq!(s.pixels().unwrap(), &[dst, dst, dst, [105, 60, 40, 255]]);
}

#[test]
fn test_over_a_background_disposed_region_keeps_the_source() {
  let src = [200, 100, 50, 128];
  let bytes = ApngBuilder::new(2, 2, 2, 0)
    .fctl((0, 0, 2, 2), (1, 10), 1, 0)
    .idat(&rgba_lines(2, &[[10, 20, 30, 255]; 4]))
    .fctl((1, 1, 1, 1), (1, 10), 0, 1)
    .fdat(&rgba_lines(1, &[src]))
    .finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  s.advance().unwrap();
  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &[CLEAR, CLEAR, CLEAR, src]);
}

#[test]
fn test_previous_restores_the_frame_before() {
  let bytes = ApngBuilder::new(2, 1, 3, 0)
    .fctl((0, 0, 2, 1), (1, 10), 0, 0)
    .idat(&rgba_lines(2, &[RED, BLUE]))
    .fctl((0, 0, 2, 1), (1, 10), 2, 0)
    .fdat(&rgba_lines(2, &[GREEN, GREEN]))
    .fctl((0, 0, 1, 1), (1, 10), 0, 0)
    .fdat(&rgba_lines(1, &[BLUE]))
    .finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  s.advance().unwrap();
  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &[GREEN, GREEN]);
  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &[BLUE, BLUE]);
}

#[test]
fn test_hidden_default_image() {
  let bytes = ApngBuilder::new(1, 1, 1, 0)
    .idat(&rgba_lines(1, &[RED]))
    .fctl((0, 0, 1, 1), (1, 10), 0, 0)
    .fdat(&rgba_lines(1, &[GREEN]))
    .finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  assert!(s.first_frame_hidden());
  assert_eq!(s.advance(), Ok(1));
  assert_eq!(s.pixels().unwrap(), &[GREEN]);
  assert_eq!(s.advance(), Ok(0));
}

#[test]
fn test_frame_data_split_over_chunks() {
  let pixels: Vec<[u8; 4]> = (0..16).map(|i| [i, 2 * i, 3 * i, 255]).collect();
  let bytes = ApngBuilder::new(4, 4, 2, 0)
    .fctl((0, 0, 4, 4), (1, 10), 0, 0)
    .idat(&rgba_lines(4, &[CLEAR; 16]))
    .fctl((0, 0, 4, 4), (1, 10), 0, 0)
    .fdat_split(&rgba_lines(4, &pixels), 3)
    .finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  s.advance().unwrap();
  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &pixels[..]);
}

#[test]
fn test_interlaced_frames() {
  // 2x2 Adam7 has three non-empty passes: (0,0), then (1,0), then row 1.
  let mut raw = vec![0];
  raw.extend(RED);
  raw.push(0);
  raw.extend(GREEN);
  raw.push(0);
  raw.extend(BLUE);
  raw.extend(CLEAR);
  let bytes = ApngBuilder::with_format(2, 2, 8, 6, true, 1, 0).fctl((0, 0, 2, 2), (1, 10), 0, 0).idat(&raw).finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &[RED, GREEN, BLUE, CLEAR]);
}

#[test]
fn test_sixteen_bit_greyscale_alpha() {
  // filter byte, then (y, a) as big-endian u16s
  let raw = [0, 0x12, 0x34, 0xFF, 0xFF, 0x80, 0x00, 0x80, 0x00];
  let bytes = ApngBuilder::with_format(2, 1, 16, 4, false, 1, 0).fctl((0, 0, 2, 1), (1, 10), 0, 0).idat(&raw).finish();
  let mut s = ApngStream::from_bytes(bytes).unwrap();
  s.advance().unwrap();
  assert_eq!(s.pixels().unwrap(), &[[0x12, 0x12, 0x12, 0xFF], [0x80, 0x80, 0x80, 0x80]]);
}

#[test]
fn test_bgra_output() {
  let bytes = ApngBuilder::new(1, 1, 1, 0).fctl((0, 0, 1, 1), (1, 10), 0, 0).idat(&rgba_lines(1, &[[1, 2, 3, 4]])).finish();
  let options = DecodeOptions { channel_order: ChannelOrder::Bgra, ..DecodeOptions::default() };
  let mut s = ApngStream::from_bytes_with_options(bytes, &options).unwrap();
  s.advance().unwrap();
  assert_eq!(s.render_buffer().unwrap(), &[3, 2, 1, 4]);
}

#[test]
fn test_static_png_is_not_animated() {
  let bytes = ApngBuilder::without_animation(1, 1, 8, 6, false).idat(&rgba_lines(1, &[RED])).finish();
  assert_eq!(ApngStream::from_bytes(bytes).unwrap_err(), ApngError::NotAnimated);
}

#[test]
fn test_open_errors() {
  assert_eq!(
    ApngStream::open("tests/no_such_file.png").unwrap_err(),
    ApngError::Io(std::io::ErrorKind::NotFound)
  );
  assert_eq!(
    ApngStream::from_bytes(&b"GIF89a"[..]).unwrap_err(),
    ApngError::Decode(DecodeError::NotPng)
  );
}

#[test]
fn test_decode_error_keeps_the_last_frame() {
  // the second frame's data isn't zlib.
  let bytes = ApngBuilder::new(2, 1, 3, 0)
    .fctl((0, 0, 2, 1), (1, 10), 0, 0)
    .idat(&rgba_lines(2, &[RED, RED]))
    .fctl((0, 0, 2, 1), (1, 10), 0, 0)
    .chunk(b"fdAT", &[0, 0, 0, 2, 1, 2, 3])
    .fctl((1, 0, 1, 1), (1, 10), 0, 0)
    .fdat(&rgba_lines(1, &[GREEN]))
    .finish();

  let mut s = ApngStream::from_bytes(bytes).unwrap();
  assert_eq!(s.advance(), Ok(1));
  let err = s.advance().unwrap_err();
  assert!(matches!(err, ApngError::Decode(_)));
  // frame 3 must not show up as frame 2.
  assert_eq!(s.advance(), Err(err));
  assert_eq!(s.advance(), Err(err));
  assert_eq!(s.current_frame(), 1);
  assert_eq!(s.pixels().unwrap(), &[RED, RED]);

  s.restart().unwrap();
  assert_eq!(s.advance(), Ok(1));
  assert_eq!(s.pixels().unwrap(), &[RED, RED]);
  s.close();
}

#[test]
fn test_use_after_close() {
  let mut s = ApngStream::from_bytes(three_frames(0)).unwrap();
  s.advance().unwrap();
  s.close();
  assert!(s.is_closed());
  assert_eq!(s.advance(), Err(ApngError::Closed));
  assert_eq!(s.restart(), Err(ApngError::Closed));
  assert!(s.render_buffer().is_none());
  s.close();
}
