use tilescape_common::Direction;

/// State of the facing latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Neutral,
    Facing(Direction),
}

impl Facing {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Neutral => None,
            Self::Facing(d) => Some(d),
        }
    }
}

/// Tracks the held direction key.
///
/// Pressing a digit `1`-`6` latches its direction, overwriting whatever was
/// latched before. Releasing a key returns to `Neutral` only if that key is
/// the one currently latched.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacingLatch {
    state: Facing,
}

impl FacingLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Facing {
        self.state
    }

    pub fn current(&self) -> Option<Direction> {
        self.state.direction()
    }

    /// Handle a key press. Returns whether the latch changed.
    pub fn key_down(&mut self, key: char) -> bool {
        let Some(dir) = digit(key).and_then(Direction::from_digit) else {
            return false;
        };
        let changed = self.state != Facing::Facing(dir);
        self.state = Facing::Facing(dir);
        if changed {
            tracing::trace!(direction = %dir, "facing latched");
        }
        changed
    }

    /// Handle a key release. Returns whether the latch changed.
    pub fn key_up(&mut self, key: char) -> bool {
        let released = digit(key).and_then(Direction::from_digit);
        match (self.state, released) {
            (Facing::Facing(held), Some(dir)) if held == dir => {
                self.state = Facing::Neutral;
                tracing::trace!(direction = %dir, "facing released");
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.state = Facing::Neutral;
    }
}

fn digit(key: char) -> Option<u8> {
    key.to_digit(10).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neutral() {
        let latch = FacingLatch::new();
        assert_eq!(latch.state(), Facing::Neutral);
        assert_eq!(latch.current(), None);
    }

    #[test]
    fn press_and_release_same_key() {
        let mut latch = FacingLatch::new();
        assert!(latch.key_down('1'));
        assert_eq!(latch.current(), Some(Direction::North));
        assert!(latch.key_up('1'));
        assert_eq!(latch.state(), Facing::Neutral);
    }

    #[test]
    fn last_pressed_wins() {
        let mut latch = FacingLatch::new();
        latch.key_down('1');
        latch.key_down('3');
        assert_eq!(latch.current(), Some(Direction::East));
        // Releasing the overwritten key does not clear the latch.
        assert!(!latch.key_up('1'));
        assert_eq!(latch.current(), Some(Direction::East));
        assert!(latch.key_up('3'));
        assert_eq!(latch.current(), None);
    }

    #[test]
    fn every_digit_maps_to_a_direction() {
        let mut latch = FacingLatch::new();
        let expected = [
            ('1', Direction::North),
            ('2', Direction::South),
            ('3', Direction::East),
            ('4', Direction::West),
            ('5', Direction::Up),
            ('6', Direction::Down),
        ];
        for (key, dir) in expected {
            latch.key_down(key);
            assert_eq!(latch.current(), Some(dir));
        }
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut latch = FacingLatch::new();
        assert!(!latch.key_down('7'));
        assert!(!latch.key_down('a'));
        assert!(!latch.key_down('0'));
        assert_eq!(latch.state(), Facing::Neutral);
        latch.key_down('5');
        assert!(!latch.key_up('x'));
        assert_eq!(latch.current(), Some(Direction::Up));
    }

    #[test]
    fn repeated_press_is_not_a_change() {
        let mut latch = FacingLatch::new();
        assert!(latch.key_down('2'));
        assert!(!latch.key_down('2'));
    }
}
