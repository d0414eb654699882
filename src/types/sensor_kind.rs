//! Closed set of sensor categories carried by a sensor report

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a named sensor reading.
///
/// Every repeated field of the simulator's sensor report maps to exactly one
/// variant, so a reading's kind is known from where it was decoded rather
/// than by inspecting its type at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Gyro,
    Bumper,
    Camera,
    Force,
    Force3d,
    Force6d,
    PositionSensor,
}

impl SensorKind {
    /// All kinds in the order they appear in a sensor report.
    pub const ALL: [SensorKind; 8] = [
        SensorKind::Accelerometer,
        SensorKind::Bumper,
        SensorKind::Camera,
        SensorKind::Force,
        SensorKind::Force3d,
        SensorKind::Force6d,
        SensorKind::Gyro,
        SensorKind::PositionSensor,
    ];

    /// Human readable name used in log lines.
    pub const fn label(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyro => "gyro",
            SensorKind::Bumper => "bumper",
            SensorKind::Camera => "camera",
            SensorKind::Force => "force sensor",
            SensorKind::Force3d => "3D force sensor",
            SensorKind::Force6d => "6D force sensor",
            SensorKind::PositionSensor => "position sensor",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
