//! Grid vocabulary shared by the world, the planner, and the learner

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SmartcabError;

/// A move at an intersection.
///
/// The same domain describes the learner's choices, the planner's next
/// waypoint, and the intended move of other traffic reported in a percept.
/// `Stay` is rendered as `none`: no move, no waypoint, or no vehicle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
    Forward,
    #[default]
    #[serde(rename = "none", alias = "stay")]
    Stay,
}

impl Action {
    /// Every action in canonical order. Greedy tie-breaks follow this order.
    pub const ALL: [Action; 4] = [Action::Left, Action::Right, Action::Forward, Action::Stay];

    /// Number of discrete actions
    pub const COUNT: usize = 4;

    /// Index into [`Action::ALL`]
    pub fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
            Action::Forward => 2,
            Action::Stay => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Left => "left",
            Action::Right => "right",
            Action::Forward => "forward",
            Action::Stay => "none",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SmartcabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Action::Left),
            "right" => Ok(Action::Right),
            "forward" => Ok(Action::Forward),
            "none" | "stay" => Ok(Action::Stay),
            other => Err(SmartcabError::InvalidAction(other.to_string())),
        }
    }
}

/// Traffic light color as seen from the vehicle's heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Light {
    #[default]
    Red,
    Green,
}

impl Light {
    pub fn is_green(self) -> bool {
        matches!(self, Light::Green)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Light::Red => "red",
            Light::Green => "green",
        }
    }
}

impl std::fmt::Display for Light {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Light {
    type Err = SmartcabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(Light::Red),
            "green" => Ok(Light::Green),
            other => Err(SmartcabError::InvalidLight(other.to_string())),
        }
    }
}

/// Unit heading on the grid. `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Heading {
    pub dx: i32,
    pub dy: i32,
}

impl Heading {
    pub const EAST: Heading = Heading { dx: 1, dy: 0 };
    pub const NORTH: Heading = Heading { dx: 0, dy: -1 };
    pub const WEST: Heading = Heading { dx: -1, dy: 0 };
    pub const SOUTH: Heading = Heading { dx: 0, dy: 1 };

    pub const ALL: [Heading; 4] = [Heading::EAST, Heading::NORTH, Heading::WEST, Heading::SOUTH];

    /// Heading after a left turn
    pub fn left(self) -> Self {
        Self {
            dx: self.dy,
            dy: -self.dx,
        }
    }

    /// Heading after a right turn
    pub fn right(self) -> Self {
        Self {
            dx: -self.dy,
            dy: self.dx,
        }
    }

    pub fn is_opposite(self, other: Heading) -> bool {
        self.dx * other.dx + self.dy * other.dy == -1
    }

    /// Whether traffic travelling along `other` approaches from our right
    pub fn sees_from_right(self, other: Heading) -> bool {
        self.dy == other.dx && -self.dx == other.dy
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.dx, self.dy) {
            (1, 0) => write!(f, "east"),
            (0, -1) => write!(f, "north"),
            (-1, 0) => write!(f, "west"),
            (0, 1) => write!(f, "south"),
            (dx, dy) => write!(f, "({dx}, {dy})"),
        }
    }
}

/// Intersection coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Location) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Where a vehicle is and which way it faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    pub location: Location,
    pub heading: Heading,
}

/// Locally observable conditions at the vehicle's intersection.
///
/// Each traffic field carries the intended move of the vehicle approaching
/// from that side, or [`Action::Stay`] when the approach is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Percept {
    pub light: Light,
    pub oncoming: Action,
    pub left: Action,
    pub right: Action,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_canonical_order() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
        }
        assert_eq!(Action::ALL.len(), Action::COUNT);
    }

    #[test]
    fn test_action_display_and_parse() {
        assert_eq!(Action::Stay.to_string(), "none");
        assert_eq!("forward".parse::<Action>().unwrap(), Action::Forward);
        assert_eq!("None".parse::<Action>().unwrap(), Action::Stay);
        assert_eq!("stay".parse::<Action>().unwrap(), Action::Stay);
        assert!("reverse".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::Stay).unwrap();
        assert_eq!(json, "\"none\"");

        let parsed: Action = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(parsed, Action::Left);
    }

    #[test]
    fn test_light_parse() {
        assert_eq!("GREEN".parse::<Light>().unwrap(), Light::Green);
        assert!(Light::Green.is_green());
        assert!("amber".parse::<Light>().is_err());
    }

    #[test]
    fn test_heading_turns() {
        assert_eq!(Heading::EAST.left(), Heading::NORTH);
        assert_eq!(Heading::EAST.right(), Heading::SOUTH);
        assert_eq!(Heading::NORTH.left(), Heading::WEST);
        assert_eq!(Heading::SOUTH.right(), Heading::WEST);

        for heading in Heading::ALL {
            assert_eq!(heading.left().right(), heading);
            assert_eq!(heading.left().left().left().left(), heading);
        }
    }

    #[test]
    fn test_heading_relations() {
        assert!(Heading::EAST.is_opposite(Heading::WEST));
        assert!(!Heading::EAST.is_opposite(Heading::NORTH));

        // Facing east, northbound traffic comes up from the south, i.e. our right.
        assert!(Heading::EAST.sees_from_right(Heading::NORTH));
        assert!(!Heading::EAST.sees_from_right(Heading::SOUTH));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Location::new(1, 1);
        let b = Location::new(4, 6);
        assert_eq!(a.manhattan(b), 8);
        assert_eq!(b.manhattan(a), 8);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn test_default_percept_is_empty_red() {
        let percept = Percept::default();
        assert_eq!(percept.light, Light::Red);
        assert_eq!(percept.oncoming, Action::Stay);
        assert_eq!(percept.left, Action::Stay);
        assert_eq!(percept.right, Action::Stay);
    }
}
