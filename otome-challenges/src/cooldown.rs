//! Frame-time debouncing.

/// A countdown decremented by frame delta time.
///
/// A cooldown starts ready. Triggering it succeeds only when ready and re-arms it for a full
/// period; [`Cooldown::tick`] brings it back to ready as frames go by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cooldown {
  period: f32,
  remaining: f32,
}

impl Cooldown {
  /// A ready cooldown re-arming for `period` seconds.
  pub fn new(period: f32) -> Self {
    Cooldown {
      period: period.max(0.),
      remaining: 0.,
    }
  }

  /// Period, in seconds.
  pub fn period(&self) -> f32 {
    self.period
  }

  /// Seconds left before the cooldown is ready again.
  pub fn remaining(&self) -> f32 {
    self.remaining
  }

  /// Let `delta` seconds elapse.
  pub fn tick(&mut self, delta: f32) {
    self.remaining = (self.remaining - delta.max(0.)).max(0.);
  }

  /// Whether a trigger would succeed.
  pub fn is_ready(&self) -> bool {
    self.remaining <= 0.
  }

  /// Trigger the cooldown. Returns `false`, leaving it untouched, if it is not ready yet.
  pub fn trigger(&mut self) -> bool {
    if self.is_ready() {
      self.remaining = self.period;
      true
    } else {
      false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn starts_ready() {
    let mut cd = Cooldown::new(0.4);
    assert!(cd.is_ready());
    assert!(cd.trigger());
    assert!(!cd.is_ready());
  }

  #[test]
  fn triggers_closer_than_the_period_fire_once() {
    let mut cd = Cooldown::new(0.4);
    let mut fired = 0;

    for delta in [0., 0.1, 0.1, 0.1] {
      cd.tick(delta);
      if cd.trigger() {
        fired += 1;
      }
    }

    assert_eq!(fired, 1);
    assert!((cd.remaining() - 0.1).abs() < 1e-6);
  }

  #[test]
  fn ready_again_after_the_period() {
    let mut cd = Cooldown::new(0.4);
    assert!(cd.trigger());

    cd.tick(0.25);
    assert!(!cd.trigger());
    cd.tick(0.25);
    assert!(cd.trigger());
  }

  #[test]
  fn negative_deltas_do_not_rewind() {
    let mut cd = Cooldown::new(1.);
    cd.trigger();
    cd.tick(-5.);
    assert_eq!(cd.remaining(), 1.);
  }
}
