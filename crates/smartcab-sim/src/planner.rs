//! Route planning on the grid

use smartcab_core::{Action, Location, Pose, RoutePlanner};

/// Next move from `pose` toward `destination`.
///
/// East/west offset is closed first, then north/south. Facing away from the
/// target the planner asks for a right turn and lets the loop come around.
pub fn waypoint_toward(pose: Pose, destination: Location) -> Action {
    let dx = destination.x - pose.location.x;
    let dy = destination.y - pose.location.y;
    let h = pose.heading;

    if dx == 0 && dy == 0 {
        Action::Stay
    } else if dx != 0 {
        if dx * h.dx > 0 {
            Action::Forward
        } else if dx * h.dx < 0 {
            Action::Right
        } else if dx * h.dy > 0 {
            Action::Left
        } else {
            Action::Right
        }
    } else if dy * h.dy > 0 {
        Action::Forward
    } else if dy * h.dy < 0 {
        Action::Right
    } else if dy * h.dx > 0 {
        Action::Right
    } else {
        Action::Left
    }
}

/// Planner used by the learning vehicle
#[derive(Debug, Clone, Default)]
pub struct GridRoutePlanner {
    destination: Option<Location>,
}

impl GridRoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(&self) -> Option<Location> {
        self.destination
    }
}

impl RoutePlanner for GridRoutePlanner {
    fn route_to(&mut self, destination: Location) {
        self.destination = Some(destination);
    }

    fn next_waypoint(&self, pose: Pose) -> Action {
        match self.destination {
            Some(destination) => waypoint_toward(pose, destination),
            None => Action::Stay,
        }
    }
}
