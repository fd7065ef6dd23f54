// THEORY:
// An `Action` is the only thing the rest of the platform ever learns from the
// vision side: one of four discrete commands. `searching` doubles as the
// "nothing seen / nothing computed yet" value.
//
// The `LastCommand` record is the single shared artifact. Its JSON shape,
// `{"direction": "<action>"}`, is both the stored format and the HTTP body.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A discrete steering command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// No marker in view (or no frame processed yet).
    #[default]
    Searching,
    /// Marker sits left of the dead-zone.
    TurnLeft,
    /// Marker sits right of the dead-zone.
    TurnRight,
    /// Marker is inside the dead-zone.
    Forward,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Searching,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Forward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Searching => "searching",
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::Forward => "forward",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

/// The record held by the last-command store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LastCommand {
    pub direction: Action,
}

impl LastCommand {
    pub fn new(direction: Action) -> Self {
        Self { direction }
    }
}

impl From<Action> for LastCommand {
    fn from(direction: Action) -> Self {
        Self { direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_searching() {
        assert_eq!(LastCommand::default().direction, Action::Searching);
    }

    #[test]
    fn record_uses_wire_names() {
        let json = serde_json::to_string(&LastCommand::new(Action::TurnLeft)).unwrap();
        assert_eq!(json, r#"{"direction":"turn_left"}"#);

        let parsed: LastCommand = serde_json::from_str(r#"{"direction": "forward"}"#).unwrap();
        assert_eq!(parsed.direction, Action::Forward);
    }

    #[test]
    fn unknown_direction_is_rejected() {
        assert!(serde_json::from_str::<LastCommand>(r#"{"direction": "reverse"}"#).is_err());
        assert!("reverse".parse::<Action>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }
}
