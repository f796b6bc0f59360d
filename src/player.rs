//! Frame pacing for callers that have a clock but don't want to do the
//! bookkeeping.
//!
//! The player doesn't own a timer. Call [`tick`](AnimationPlayer::tick) from
//! whatever periodic callback you have, with the current time, and it will
//! advance the stream when the current frame's delay has run out.

use crate::{
  error::ApngError,
  source::{PixelRowSource, PngFrameSource},
  stream::ApngStream,
};
use alloc::vec::Vec;

/// What to do when the last frame has been shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoopPolicy {
  /// Play once and stop.
  Once,
  /// Restart forever.
  Forever,
  /// Use the play count stored in the file, where 0 means forever.
  #[default]
  FromFile,
}

/// The result of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickOutcome {
  /// Nothing happened: the player is disabled or the frame isn't due yet.
  Idle,
  /// This frame is now in the render buffer.
  Frame(u32),
  /// All frames have been shown. The stream has either been restarted, or
  /// the player has disabled itself.
  Ended,
}

/// Drives an [`ApngStream`] by elapsed time.
#[derive(Debug, Clone)]
pub struct AnimationPlayer<S = PngFrameSource<Vec<u8>>> {
  stream: ApngStream<S>,
  policy: LoopPolicy,
  enabled: bool,
  last_ms: u32,
  plays_completed: u32,
}
impl<S: PixelRowSource> AnimationPlayer<S> {
  /// Wraps a stream. The player starts out disabled.
  #[inline]
  #[must_use]
  pub const fn new(stream: ApngStream<S>) -> Self {
    Self { stream, policy: LoopPolicy::FromFile, enabled: false, last_ms: 0, plays_completed: 0 }
  }

  #[inline]
  #[must_use]
  pub fn with_loop_policy(self, policy: LoopPolicy) -> Self {
    Self { policy, ..self }
  }

  /// Enables the player and shows the next frame right away.
  pub fn start(&mut self, now_ms: u32) -> Result<TickOutcome, ApngError> {
    self.enabled = true;
    self.last_ms = now_ms;
    self.step()
  }

  /// Advances if the player is enabled and the current frame's delay has
  /// passed since the last frame was shown.
  ///
  /// Times are milliseconds from any fixed point, and may wrap around.
  ///
  /// ## Failure
  /// Errors come from the stream. The player disables itself on error.
  pub fn tick(&mut self, now_ms: u32) -> Result<TickOutcome, ApngError> {
    if !self.enabled || now_ms.wrapping_sub(self.last_ms) < self.stream.delay_ms() {
      return Ok(TickOutcome::Idle);
    }
    self.last_ms = now_ms;
    self.step()
  }

  fn step(&mut self) -> Result<TickOutcome, ApngError> {
    let frame = self.stream.advance().map_err(|err| self.stop(err))?;
    if frame != 0 {
      return Ok(TickOutcome::Frame(frame));
    }
    self.plays_completed = self.plays_completed.saturating_add(1);
    if self.keeps_looping() {
      self.stream.restart().map_err(|err| self.stop(err))?;
    } else {
      tracing::debug!(plays = self.plays_completed, "animation finished");
      self.enabled = false;
    }
    Ok(TickOutcome::Ended)
  }

  fn stop(&mut self, err: ApngError) -> ApngError {
    self.enabled = false;
    tracing::warn!(%err, "animation stopped");
    err
  }

  fn keeps_looping(&self) -> bool {
    match self.policy {
      LoopPolicy::Once => false,
      LoopPolicy::Forever => true,
      LoopPolicy::FromFile => {
        let plays = self.stream.num_plays();
        plays == 0 || self.plays_completed < plays
      }
    }
  }
}
impl<S> AnimationPlayer<S> {
  /// Turns ticking on or off without touching the stream.
  #[inline]
  pub fn set_enabled(&mut self, enabled: bool) {
    self.enabled = enabled;
  }
  #[inline]
  #[must_use]
  pub const fn is_enabled(&self) -> bool {
    self.enabled
  }
  #[inline]
  #[must_use]
  pub const fn loop_policy(&self) -> LoopPolicy {
    self.policy
  }
  /// How many times the animation has reached its end.
  #[inline]
  #[must_use]
  pub const fn plays_completed(&self) -> u32 {
    self.plays_completed
  }
  #[inline]
  #[must_use]
  pub const fn stream(&self) -> &ApngStream<S> {
    &self.stream
  }
  #[inline]
  pub fn stream_mut(&mut self) -> &mut ApngStream<S> {
    &mut self.stream
  }
  #[inline]
  #[must_use]
  pub fn into_stream(self) -> ApngStream<S> {
    self.stream
  }
}
