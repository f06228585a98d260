//! D-pad decoding.
//!
//! The four directional lines form a 4-bit index, MSB first in the order
//! UP, RIGHT, DOWN, LEFT. The index selects one of nine directions from a
//! fixed table. Opposing pairs cancel; with three lines asserted the one
//! without an opposite wins.

/// Compass direction reported by the D-pad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Centered,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

/// The four raw D-pad lines, in index bit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DpadLine {
    Up,
    Right,
    Down,
    Left,
}

/// Full-scale value used for the axis representation.
pub const AXIS_MAX: i8 = 127;

/// A direction expressed as two signed axes. Negative Y is up, matching the
/// HID generic desktop convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axes {
    pub x: i8,
    pub y: i8,
}

impl Axes {
    /// Both axes at rest.
    pub const CENTER: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

/// How direction is handed to the HID emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DirectionMode {
    /// Single hat switch value.
    #[default]
    Hat,
    /// X/Y axis pair.
    Axes,
}

const DPAD_TABLE: [Direction; 16] = [
    Direction::Centered,  // 0000
    Direction::Left,      // 0001
    Direction::Down,      // 0010
    Direction::DownLeft,  // 0011
    Direction::Right,     // 0100
    Direction::Centered,  // 0101 left + right
    Direction::DownRight, // 0110
    Direction::Down,      // 0111 left + down + right
    Direction::Up,        // 1000
    Direction::UpLeft,    // 1001
    Direction::Centered,  // 1010 up + down
    Direction::Left,      // 1011 up + down + left
    Direction::UpRight,   // 1100
    Direction::Up,        // 1101 up + right + left
    Direction::Right,     // 1110 up + right + down
    Direction::Centered,  // 1111
];

/// Decodes the raw line states into a direction. Total over all inputs.
pub fn decode(up: bool, right: bool, down: bool, left: bool) -> Direction {
    let index = (usize::from(up) << 3)
        | (usize::from(right) << 2)
        | (usize::from(down) << 1)
        | usize::from(left);
    DPAD_TABLE[index]
}

impl Direction {
    /// True when no direction is active.
    pub const fn is_centered(self) -> bool {
        matches!(self, Direction::Centered)
    }

    /// Hat switch code: 0 is centred, 1..=8 run clockwise from UP.
    pub const fn hat_code(self) -> u8 {
        match self {
            Direction::Centered => 0,
            Direction::Up => 1,
            Direction::UpRight => 2,
            Direction::Right => 3,
            Direction::DownRight => 4,
            Direction::Down => 5,
            Direction::DownLeft => 6,
            Direction::Left => 7,
            Direction::UpLeft => 8,
        }
    }

    /// Full-scale axis pair for this direction.
    pub const fn axes(self) -> Axes {
        match self {
            Direction::Centered => Axes::new(0, 0),
            Direction::Up => Axes::new(0, -AXIS_MAX),
            Direction::UpRight => Axes::new(AXIS_MAX, -AXIS_MAX),
            Direction::Right => Axes::new(AXIS_MAX, 0),
            Direction::DownRight => Axes::new(AXIS_MAX, AXIS_MAX),
            Direction::Down => Axes::new(0, AXIS_MAX),
            Direction::DownLeft => Axes::new(-AXIS_MAX, AXIS_MAX),
            Direction::Left => Axes::new(-AXIS_MAX, 0),
            Direction::UpLeft => Axes::new(-AXIS_MAX, -AXIS_MAX),
        }
    }
}
