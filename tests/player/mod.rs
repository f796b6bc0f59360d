use apng_compose::{AnimationPlayer, ApngStream, LoopPolicy, TickOutcome};

use super::{rgba_lines, ApngBuilder};

fn two_frames(plays: u32) -> AnimationPlayer {
  let bytes = ApngBuilder::new(1, 1, 2, plays)
    .fctl((0, 0, 1, 1), (1, 20), 0, 0)
    .idat(&rgba_lines(1, &[[1, 1, 1, 255]]))
    .fctl((0, 0, 1, 1), (1, 0), 0, 0)
    .fdat(&rgba_lines(1, &[[2, 2, 2, 255]]))
    .finish();
  AnimationPlayer::new(ApngStream::from_bytes(bytes).unwrap())
}

#[test]
fn test_player_follows_frame_delays() {
  let mut p = two_frames(1);
  assert_eq!(p.start(1_000), Ok(TickOutcome::Frame(1)));
  // 1/20 of a second
  assert_eq!(p.stream().delay_ms(), 50);
  assert_eq!(p.tick(1_049), Ok(TickOutcome::Idle));
  assert_eq!(p.tick(1_050), Ok(TickOutcome::Frame(2)));
  assert_eq!(p.stream().pixels().unwrap(), &[[2, 2, 2, 255]]);
  // a 0 denominator means 1/100 of a second
  assert_eq!(p.stream().delay_ms(), 10);
  assert_eq!(p.tick(1_060), Ok(TickOutcome::Ended));
  assert!(!p.is_enabled());
  assert_eq!(p.plays_completed(), 1);
}

#[test]
fn test_player_loops_from_frame_one() {
  let mut p = two_frames(0);
  p.start(0).unwrap();
  let mut shown = Vec::new();
  for now in (0..400).step_by(10) {
    if let TickOutcome::Frame(n) = p.tick(now).unwrap() {
      shown.push((n, p.stream().pixels().unwrap()[0][0]));
    }
  }
  assert!(shown.len() > 4);
  for (n, value) in shown {
    assert_eq!(u32::from(value), n);
  }
  assert!(p.plays_completed() >= 2);
  assert!(p.is_enabled());
}

#[test]
fn test_player_can_be_paused() {
  let mut p = two_frames(0).with_loop_policy(LoopPolicy::Forever);
  p.start(0).unwrap();
  p.set_enabled(false);
  assert_eq!(p.tick(10_000), Ok(TickOutcome::Idle));
  p.set_enabled(true);
  assert_eq!(p.tick(10_000), Ok(TickOutcome::Frame(2)));
  let mut stream = p.into_stream();
  stream.close();
}
