//! State encoding for the value table
//!
//! A state key is built from four discrete fields: the oncoming vehicle's
//! intended move, the intended move of traffic on the left, the light, and
//! the planner's next waypoint. Traffic on the right is not part of the key.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use smartcab_core::{Action, Light, Percept, SmartcabError};

/// Canonical discrete state.
///
/// Renders as `oncoming:<a>,left:<a>,light:<l>,waypoint:<a>`, and parses back
/// from that form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey {
    pub oncoming: Action,
    pub left: Action,
    pub light: Light,
    pub waypoint: Action,
}

impl StateKey {
    /// Encode a percept together with the routing advice for this step
    pub fn encode(percept: &Percept, waypoint: Action) -> Self {
        Self {
            oncoming: percept.oncoming,
            left: percept.left,
            light: percept.light,
            waypoint,
        }
    }

    /// Every key the encoder can produce
    pub fn all() -> impl Iterator<Item = StateKey> {
        Action::ALL.into_iter().flat_map(|oncoming| {
            Action::ALL.into_iter().flat_map(move |left| {
                [Light::Red, Light::Green].into_iter().flat_map(move |light| {
                    Action::ALL.into_iter().map(move |waypoint| StateKey {
                        oncoming,
                        left,
                        light,
                        waypoint,
                    })
                })
            })
        })
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "oncoming:{},left:{},light:{},waypoint:{}",
            self.oncoming, self.left, self.light, self.waypoint
        )
    }
}

impl FromStr for StateKey {
    type Err = SmartcabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SmartcabError::InvalidState(s.to_string());

        let mut fields = s.split(',').map(|part| part.trim().split_once(':'));
        let mut field = |name: &str| -> Result<&str, SmartcabError> {
            match fields.next().flatten() {
                Some((key, value)) if key == name => Ok(value),
                _ => Err(invalid()),
            }
        };

        let oncoming = field("oncoming")?.parse().map_err(|_| invalid())?;
        let left = field("left")?.parse().map_err(|_| invalid())?;
        let light = field("light")?.parse().map_err(|_| invalid())?;
        let waypoint = field("waypoint")?.parse().map_err(|_| invalid())?;

        if fields.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            oncoming,
            left,
            light,
            waypoint,
        })
    }
}

impl Serialize for StateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
