//! Fixtures shared by unit tests and benchmarks
//!
//! Everything here is built from the shipped Wolfgang configuration so tests
//! and benchmarks exercise the same joint and sensor tables as a real run.

#![cfg(any(test, feature = "benchmark"))]

use crate::config::BridgeConfig;
use crate::model::{FOOT_CLEATS, HEAD_IMU_ACCELEROMETER, HEAD_IMU_GYRO, IMU_ACCELEROMETER, IMU_GYRO};
use crate::schema::{BumperReading, CameraImage, NamedScalar, NamedVector, SensorReport};
use crate::session::SessionSetup;
use crate::types::{JointCommand, Vector3};

/// The configuration shipped in `config/wolfgang.yaml`.
pub const WOLFGANG_YAML: &str = include_str!("../config/wolfgang.yaml");

/// Parsed and validated Wolfgang configuration.
pub fn wolfgang_config() -> BridgeConfig {
    let config = BridgeConfig::parse(WOLFGANG_YAML, "config/wolfgang.yaml")
        .expect("shipped configuration should parse");
    config.validate("config/wolfgang.yaml").expect("shipped configuration should be valid");
    config
}

/// Session inputs for the Wolfgang robot.
pub fn test_setup() -> SessionSetup {
    SessionSetup::from_config(&wolfgang_config()).expect("shipped joint model should be valid")
}

/// A sensor report shaped like a steady-state simulator tick: both IMUs,
/// every foot cleat, one position sensor per joint and a small camera image.
pub fn full_tick_report(simulated_time_ms: u32) -> SensorReport {
    let config = wolfgang_config();
    let named =
        |name: &str, x, y, z| NamedVector { name: name.to_string(), value: Vector3::new(x, y, z) };

    SensorReport {
        simulated_time_ms,
        wall_time_ms: 1_700_000_000_000 + u64::from(simulated_time_ms),
        accelerometers: vec![
            named(IMU_ACCELEROMETER, 0.12, -0.05, 9.79),
            named(HEAD_IMU_ACCELEROMETER, 9.79, 0.12, -0.05),
        ],
        gyros: vec![named(IMU_GYRO, 0.01, 0.0, -0.02), named(HEAD_IMU_GYRO, -0.02, 0.01, 0.0)],
        bumpers: FOOT_CLEATS
            .iter()
            .enumerate()
            .map(|(i, name)| BumperReading { name: name.to_string(), pressed: i % 2 == 0 })
            .collect(),
        cameras: vec![CameraImage {
            name: "camera".to_string(),
            width: 32,
            height: 24,
            quality: -1,
            image: vec![0x7f; 32 * 24 * 3],
        }],
        position_sensors: config
            .joints
            .iter()
            .enumerate()
            .map(|(i, joint)| NamedScalar {
                name: format!("{}_sensor", joint.name),
                value: i as f64 * 0.01,
            })
            .collect(),
        ..Default::default()
    }
}

/// A command for every Wolfgang joint, with velocities left to the model.
pub fn full_body_command() -> JointCommand {
    let config = wolfgang_config();
    JointCommand::positions(
        config.joints.iter().enumerate().map(|(i, j)| (j.name.clone(), i as f64 * -0.02)),
    )
}
