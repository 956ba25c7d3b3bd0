use glam::IVec3;
use serde::{Deserialize, Serialize};

/// One of the six face-adjacent neighbour directions in data space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

/// Error parsing a direction name.
#[derive(Debug, thiserror::Error)]
#[error("unknown direction {0:?}")]
pub struct ParseDirectionError(pub String);

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Map a digit key (1-6) to its direction.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::North),
            2 => Some(Self::South),
            3 => Some(Self::East),
            4 => Some(Self::West),
            5 => Some(Self::Up),
            6 => Some(Self::Down),
            _ => None,
        }
    }

    /// The digit key that latches this direction.
    pub fn digit(self) -> u8 {
        match self {
            Self::North => 1,
            Self::South => 2,
            Self::East => 3,
            Self::West => 4,
            Self::Up => 5,
            Self::Down => 6,
        }
    }

    /// Unit offset in data space.
    pub fn offset(self) -> IVec3 {
        match self {
            Self::North => IVec3::new(0, -1, 0),
            Self::South => IVec3::new(0, 1, 0),
            Self::East => IVec3::new(1, 0, 0),
            Self::West => IVec3::new(-1, 0, 0),
            Self::Up => IVec3::new(0, 0, 1),
            Self::Down => IVec3::new(0, 0, -1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_digit(d.digit()), Some(d));
        }
        assert_eq!(Direction::from_digit(0), None);
        assert_eq!(Direction::from_digit(7), None);
    }

    #[test]
    fn opposite_offsets_cancel() {
        for d in Direction::ALL {
            assert_eq!(d.offset() + d.opposite().offset(), IVec3::ZERO);
        }
    }

    #[test]
    fn parse_by_name() {
        assert_eq!("North".parse::<Direction>().unwrap(), Direction::North);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
