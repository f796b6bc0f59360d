use apng_compose::{png::RawChunkIter, ApngStream};
use walkdir::WalkDir;

use super::{rand_bytes, rgba_lines, ApngBuilder};

/// Opens and plays the bytes, which may well be garbage.
fn play_all(bytes: &[u8]) {
  if let Ok(mut stream) = ApngStream::from_bytes(bytes) {
    for _ in 0..64 {
      match stream.advance() {
        Ok(0) | Err(_) => break,
        Ok(_) => (),
      }
    }
    stream.close();
  }
}

#[test]
fn test_RawChunkIter_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    for _ in RawChunkIter::new(&v) {
      //
    }
    play_all(&v);
  }
  // even totally random data should never panic the iterator!
  for _ in 0..10 {
    let v = rand_bytes(1024);
    for _ in RawChunkIter::new(&v) {
      //
    }
    play_all(&v);
  }
}

#[test]
fn test_corrupted_frames_no_panics() {
  let pixels = [[9, 8, 7, 255]; 4];
  let good = ApngBuilder::new(2, 2, 2, 0)
    .fctl((0, 0, 2, 2), (1, 10), 0, 0)
    .idat(&rgba_lines(2, &pixels))
    .fctl((1, 1, 1, 1), (1, 10), 2, 1)
    .fdat(&rgba_lines(1, &pixels[..1]))
    .finish();
  play_all(&good);
  // every single byte randomized in turn, and every truncation.
  let noise = rand_bytes(good.len());
  for i in 8..good.len() {
    let mut v = good.clone();
    v[i] = noise[i];
    play_all(&v);
    play_all(&good[..i]);
  }
  // garbage after a valid header and acTL.
  let mut v = ApngBuilder::new(4, 4, 3, 0).finish();
  v.truncate(v.len() - 12);
  v.extend(rand_bytes(512));
  play_all(&v);
}
