//! Joint commands coming from the control stack

use serde::{Deserialize, Serialize};

/// Sentinel velocity meaning "use the joint's configured velocity limit".
pub const VELOCITY_LIMIT_SENTINEL: f64 = -1.0;

/// Latest joint targets requested by the control stack.
///
/// Lists are parallel and indexed by position in `joint_names`. An empty
/// `velocities` list means every joint moves at its velocity limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointCommand {
    pub joint_names: Vec<String>,
    pub positions: Vec<f64>,
    #[serde(default)]
    pub velocities: Vec<f64>,
}

impl JointCommand {
    /// Command every named joint to a position at its velocity limit.
    pub fn positions<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (joint_names, positions) =
            targets.into_iter().map(|(name, position)| (name.into(), position)).unzip();
        Self { joint_names, positions, velocities: Vec::new() }
    }

    /// Attach explicit velocities, parallel to `joint_names`.
    pub fn with_velocities(mut self, velocities: Vec<f64>) -> Self {
        self.velocities = velocities;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.joint_names.is_empty()
    }

    /// Commanded velocity for index `i`, or `None` when the limit applies.
    pub fn velocity_override(&self, i: usize) -> Option<f64> {
        match self.velocities.get(i) {
            Some(&v) if v != VELOCITY_LIMIT_SENTINEL => Some(v),
            _ => None,
        }
    }
}
