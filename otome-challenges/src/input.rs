//! Input state lent to scenes.
//!
//! The platform owns an [`InputState`] and mutates it from its event loop; scenes only read it.

use std::collections::HashSet;

/// Logical keys scenes react to.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
  /// `1`.
  Num1,
  /// `2`.
  Num2,
  /// `3`.
  Num3,
  /// `4`.
  Num4,
  /// `5`.
  Num5,
  /// `6`.
  Num6,
  /// `7`.
  Num7,
  /// `8`.
  Num8,
  /// `W`.
  W,
  /// `A`.
  A,
  /// `S`.
  S,
  /// `D`.
  D,
  /// Left arrow.
  Left,
  /// Right arrow.
  Right,
  /// Up arrow.
  Up,
  /// Down arrow.
  Down,
}

impl Key {
  /// Number keys, `1` to `8`.
  pub const DIGITS: [Key; 8] = [
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
  ];

  /// Number key for a 1-based index.
  pub fn digit(n: usize) -> Option<Self> {
    n.checked_sub(1).and_then(|i| Self::DIGITS.get(i)).copied()
  }
}

/// Mouse buttons.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MouseButton {
  /// Primary button.
  Left,
  /// Secondary button.
  Right,
  /// Wheel button.
  Middle,
}

/// Keyboard and mouse state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
  keys: HashSet<Key>,
  buttons: HashSet<MouseButton>,
  cursor: [f32; 2],
  scroll: [f32; 2],
}

impl InputState {
  /// Nothing pressed, cursor at the origin.
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether `key` is held down.
  pub fn is_key_pressed(&self, key: Key) -> bool {
    self.keys.contains(&key)
  }

  /// Whether `button` is held down.
  pub fn is_button_pressed(&self, button: MouseButton) -> bool {
    self.buttons.contains(&button)
  }

  /// Cursor position, in window coordinates.
  pub fn cursor(&self) -> [f32; 2] {
    self.cursor
  }

  /// Scroll offsets accumulated since the start.
  pub fn scroll(&self) -> [f32; 2] {
    self.scroll
  }

  /// Record a key press or release.
  pub fn set_key(&mut self, key: Key, pressed: bool) {
    if pressed {
      self.keys.insert(key);
    } else {
      self.keys.remove(&key);
    }
  }

  /// Record a button press or release.
  pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
    if pressed {
      self.buttons.insert(button);
    } else {
      self.buttons.remove(&button);
    }
  }

  /// Record a cursor move.
  pub fn set_cursor(&mut self, x: f32, y: f32) {
    self.cursor = [x, y];
  }

  /// Accumulate a scroll event.
  pub fn add_scroll(&mut self, dx: f32, dy: f32) {
    self.scroll[0] += dx;
    self.scroll[1] += dy;
  }

  /// Forget held keys and buttons, e.g. when the window loses focus.
  pub fn release_all(&mut self) {
    self.keys.clear();
    self.buttons.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digits() {
    assert_eq!(Key::digit(1), Some(Key::Num1));
    assert_eq!(Key::digit(8), Some(Key::Num8));
    assert_eq!(Key::digit(0), None);
    assert_eq!(Key::digit(9), None);
  }

  #[test]
  fn press_and_release() {
    let mut input = InputState::new();
    input.set_key(Key::W, true);
    input.set_button(MouseButton::Left, true);
    input.add_scroll(0., 1.);
    input.add_scroll(0., 2.);

    assert!(input.is_key_pressed(Key::W));
    assert!(!input.is_key_pressed(Key::S));
    assert!(input.is_button_pressed(MouseButton::Left));
    assert_eq!(input.scroll(), [0., 3.]);

    input.set_key(Key::W, false);
    assert!(!input.is_key_pressed(Key::W));

    input.release_all();
    assert!(!input.is_button_pressed(MouseButton::Left));
  }
}
