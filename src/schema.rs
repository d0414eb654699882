//! Sensor report and actuator request payloads.
//!
//! Decoding goes through the protobuf structs in [`crate::types::messages`]
//! and lands in plain Rust values. Absent optional fields never fail a
//! decode: missing vectors become zero vectors and missing repeated fields
//! become empty collections, so a zero-length payload is a valid, empty
//! report. Only bytes that are not protobuf at all produce an error.

use prost::Message as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::types::messages::{self, MessageType};
use crate::types::{SensorKind, Vector3};
use crate::Result;

/// Severity of a simulator diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    /// A tag this bridge does not recognise, kept verbatim
    Unknown(i32),
}

impl Severity {
    pub fn from_wire(code: i32) -> Self {
        match MessageType::try_from(code) {
            Ok(MessageType::ErrorMessage) => Severity::Error,
            Ok(MessageType::WarningMessage) => Severity::Warning,
            Err(_) => Severity::Unknown(code),
        }
    }

    pub fn to_wire(self) -> i32 {
        match self {
            Severity::Error => MessageType::ErrorMessage as i32,
            Severity::Warning => MessageType::WarningMessage as i32,
            Severity::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
            Severity::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub text: String,
}

/// Named 3-vector sample (accelerometers, gyros, 3D force sensors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedVector {
    pub name: String,
    pub value: Vector3,
}

/// Named scalar sample (force sensors, joint position sensors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScalar {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumperReading {
    pub name: String,
    pub pressed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// -1 for raw images, JPEG quality otherwise
    pub quality: i32,
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Force6dReading {
    pub name: String,
    pub force: Vector3,
    pub torque: Vector3,
}

/// Everything the simulator reported for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    /// Simulated time [ms]
    pub simulated_time_ms: u32,
    /// Unix wall-clock time [ms], unrelated to `simulated_time_ms`
    pub wall_time_ms: u64,
    pub diagnostics: Vec<Diagnostic>,
    pub accelerometers: Vec<NamedVector>,
    pub gyros: Vec<NamedVector>,
    pub bumpers: Vec<BumperReading>,
    pub cameras: Vec<CameraImage>,
    pub forces: Vec<NamedScalar>,
    pub force3ds: Vec<NamedVector>,
    pub force6ds: Vec<Force6dReading>,
    pub position_sensors: Vec<NamedScalar>,
}

impl SensorReport {
    /// Number of named readings of a given kind.
    pub fn count(&self, kind: SensorKind) -> usize {
        match kind {
            SensorKind::Accelerometer => self.accelerometers.len(),
            SensorKind::Gyro => self.gyros.len(),
            SensorKind::Bumper => self.bumpers.len(),
            SensorKind::Camera => self.cameras.len(),
            SensorKind::Force => self.forces.len(),
            SensorKind::Force3d => self.force3ds.len(),
            SensorKind::Force6d => self.force6ds.len(),
            SensorKind::PositionSensor => self.position_sensors.len(),
        }
    }

    /// Total number of named readings across all kinds.
    pub fn reading_count(&self) -> usize {
        SensorKind::ALL.iter().map(|&kind| self.count(kind)).sum()
    }
}

/// Request to sample one sensor at a fixed period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSubscription {
    pub name: String,
    pub time_step_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorTarget {
    pub name: String,
    pub value: f64,
}

/// Everything the bridge sends back for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorRequest {
    /// Present on the first tick of a session only
    pub sensor_subscriptions: Option<Vec<SensorSubscription>>,
    pub motor_positions: Vec<MotorTarget>,
    pub motor_velocities: Vec<MotorTarget>,
}

fn vector(v: Option<messages::Vector3>) -> Vector3 {
    v.map(Vector3::from).unwrap_or_default()
}

/// Decode one sensor frame payload.
pub fn decode_sensor_report(bytes: &[u8]) -> Result<SensorReport> {
    let wire = messages::SensorMeasurements::decode(bytes)?;
    trace!("Decoded sensor measurements ({} bytes, time={}ms)", bytes.len(), wire.time);

    Ok(SensorReport {
        simulated_time_ms: wire.time,
        wall_time_ms: wire.real_time,
        diagnostics: wire
            .messages
            .into_iter()
            .map(|m| Diagnostic { severity: Severity::from_wire(m.message_type), text: m.text })
            .collect(),
        accelerometers: wire
            .accelerometers
            .into_iter()
            .map(|a| NamedVector { name: a.name, value: vector(a.value) })
            .collect(),
        gyros: wire
            .gyros
            .into_iter()
            .map(|g| NamedVector { name: g.name, value: vector(g.value) })
            .collect(),
        bumpers: wire
            .bumpers
            .into_iter()
            .map(|b| BumperReading { name: b.name, pressed: b.value })
            .collect(),
        cameras: wire
            .cameras
            .into_iter()
            .map(|c| CameraImage {
                name: c.name,
                width: c.width,
                height: c.height,
                quality: c.quality,
                image: c.image,
            })
            .collect(),
        forces: wire
            .forces
            .into_iter()
            .map(|f| NamedScalar { name: f.name, value: f.value })
            .collect(),
        force3ds: wire
            .force3ds
            .into_iter()
            .map(|f| NamedVector { name: f.name, value: vector(f.value) })
            .collect(),
        force6ds: wire
            .force6ds
            .into_iter()
            .map(|f| Force6dReading {
                name: f.name,
                force: vector(f.force),
                torque: vector(f.torque),
            })
            .collect(),
        position_sensors: wire
            .position_sensors
            .into_iter()
            .map(|p| NamedScalar { name: p.name, value: p.value })
            .collect(),
    })
}

/// Encode a sensor report the way the simulator would send it.
pub fn encode_sensor_report(report: &SensorReport) -> Vec<u8> {
    let wire = messages::SensorMeasurements {
        time: report.simulated_time_ms,
        real_time: report.wall_time_ms,
        messages: report
            .diagnostics
            .iter()
            .map(|d| messages::Message { message_type: d.severity.to_wire(), text: d.text.clone() })
            .collect(),
        accelerometers: report
            .accelerometers
            .iter()
            .map(|a| messages::AccelerometerMeasurement {
                name: a.name.clone(),
                value: Some(a.value.into()),
            })
            .collect(),
        bumpers: report
            .bumpers
            .iter()
            .map(|b| messages::BumperMeasurement { name: b.name.clone(), value: b.pressed })
            .collect(),
        cameras: report
            .cameras
            .iter()
            .map(|c| messages::CameraMeasurement {
                name: c.name.clone(),
                width: c.width,
                height: c.height,
                quality: c.quality,
                image: c.image.clone(),
            })
            .collect(),
        forces: report
            .forces
            .iter()
            .map(|f| messages::ForceMeasurement { name: f.name.clone(), value: f.value })
            .collect(),
        force3ds: report
            .force3ds
            .iter()
            .map(|f| messages::Force3DMeasurement {
                name: f.name.clone(),
                value: Some(f.value.into()),
            })
            .collect(),
        force6ds: report
            .force6ds
            .iter()
            .map(|f| messages::Force6DMeasurement {
                name: f.name.clone(),
                force: Some(f.force.into()),
                torque: Some(f.torque.into()),
            })
            .collect(),
        gyros: report
            .gyros
            .iter()
            .map(|g| messages::GyroMeasurement {
                name: g.name.clone(),
                value: Some(g.value.into()),
            })
            .collect(),
        position_sensors: report
            .position_sensors
            .iter()
            .map(|p| messages::PositionSensorMeasurement { name: p.name.clone(), value: p.value })
            .collect(),
    };
    wire.encode_to_vec()
}

/// Encode one actuator frame payload.
pub fn encode_actuator_request(request: &ActuatorRequest) -> Vec<u8> {
    let wire = messages::ActuatorRequests {
        motor_positions: request
            .motor_positions
            .iter()
            .map(|m| messages::MotorPosition { name: m.name.clone(), position: m.value })
            .collect(),
        motor_velocities: request
            .motor_velocities
            .iter()
            .map(|m| messages::MotorVelocity { name: m.name.clone(), velocity: m.value })
            .collect(),
        sensor_time_steps: request
            .sensor_subscriptions
            .iter()
            .flatten()
            .map(|s| messages::SensorTimeStep { name: s.name.clone(), time_step: s.time_step_ms })
            .collect(),
    };
    wire.encode_to_vec()
}

/// Decode an actuator frame payload the way the simulator would.
///
/// An empty `sensor_time_steps` field decodes as `None`, which matches how
/// the bridge only ever sends subscriptions on the first tick.
pub fn decode_actuator_request(bytes: &[u8]) -> Result<ActuatorRequest> {
    let wire = messages::ActuatorRequests::decode(bytes)?;
    let subscriptions: Vec<_> = wire
        .sensor_time_steps
        .into_iter()
        .map(|s| SensorSubscription { name: s.name, time_step_ms: s.time_step })
        .collect();

    Ok(ActuatorRequest {
        sensor_subscriptions: (!subscriptions.is_empty()).then_some(subscriptions),
        motor_positions: wire
            .motor_positions
            .into_iter()
            .map(|m| MotorTarget { name: m.name, value: m.position })
            .collect(),
        motor_velocities: wire
            .motor_velocities
            .into_iter()
            .map(|m| MotorTarget { name: m.name, value: m.velocity })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_vector() -> impl Strategy<Value = Vector3> {
        (-1e3..1e3f64, -1e3..1e3f64, -1e3..1e3f64).prop_map(|(x, y, z)| Vector3::new(x, y, z))
    }

    fn arb_named_vectors() -> impl Strategy<Value = Vec<NamedVector>> {
        prop::collection::vec(
            ("[a-z_ ]{1,20}", arb_vector()).prop_map(|(name, value)| NamedVector { name, value }),
            0..6,
        )
    }

    fn arb_named_scalars() -> impl Strategy<Value = Vec<NamedScalar>> {
        prop::collection::vec(
            ("[a-zA-Z_]{1,20}", -10.0..10.0f64)
                .prop_map(|(name, value)| NamedScalar { name, value }),
            0..6,
        )
    }

    fn arb_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Error),
            Just(Severity::Warning),
            (2..100i32).prop_map(Severity::Unknown),
        ]
    }

    fn arb_subscriptions() -> impl Strategy<Value = Option<Vec<SensorSubscription>>> {
        prop::option::of(prop::collection::vec(
            ("[a-z_ ]{1,20}", 1..100u32)
                .prop_map(|(name, time_step_ms)| SensorSubscription { name, time_step_ms }),
            1..10,
        ))
    }

    fn arb_targets() -> impl Strategy<Value = Vec<MotorTarget>> {
        prop::collection::vec(
            ("[A-Z][a-zA-Z]{1,12}", -3.2..3.2f64)
                .prop_map(|(name, value)| MotorTarget { name, value }),
            0..20,
        )
    }

    proptest! {
        #[test]
        fn imu_vectors_round_trip(
            accelerometers in arb_named_vectors(),
            gyros in arb_named_vectors()
        ) {
            let report = SensorReport { accelerometers, gyros, ..Default::default() };
            let decoded = decode_sensor_report(&encode_sensor_report(&report)).unwrap();
            prop_assert_eq!(decoded, report);
        }

        #[test]
        fn clocks_and_diagnostics_round_trip(
            simulated_time_ms in any::<u32>(),
            wall_time_ms in any::<u64>(),
            diagnostics in prop::collection::vec(
                (arb_severity(), ".{0,40}")
                    .prop_map(|(severity, text)| Diagnostic { severity, text }),
                0..5,
            )
        ) {
            let report =
                SensorReport { simulated_time_ms, wall_time_ms, diagnostics, ..Default::default() };
            let decoded = decode_sensor_report(&encode_sensor_report(&report)).unwrap();
            prop_assert_eq!(decoded, report);
        }

        #[test]
        fn force_and_position_readings_round_trip(
            forces in arb_named_scalars(),
            force3ds in arb_named_vectors(),
            position_sensors in arb_named_scalars(),
            bumpers in prop::collection::vec(
                ("[a-z_]{1,16}", any::<bool>())
                    .prop_map(|(name, pressed)| BumperReading { name, pressed }),
                0..8,
            )
        ) {
            let report = SensorReport {
                forces,
                force3ds,
                position_sensors,
                bumpers,
                ..Default::default()
            };
            let decoded = decode_sensor_report(&encode_sensor_report(&report)).unwrap();
            prop_assert_eq!(decoded, report);
        }

        #[test]
        fn actuator_requests_round_trip(
            sensor_subscriptions in arb_subscriptions(),
            motor_positions in arb_targets(),
            motor_velocities in arb_targets()
        ) {
            let request =
                ActuatorRequest { sensor_subscriptions, motor_positions, motor_velocities };
            let decoded = decode_actuator_request(&encode_actuator_request(&request)).unwrap();
            prop_assert_eq!(decoded, request);
        }
    }

    #[test]
    fn camera_and_six_axis_readings_round_trip() {
        let report = SensorReport {
            cameras: vec![CameraImage {
                name: "camera".into(),
                width: 2,
                height: 1,
                quality: -1,
                image: vec![0, 1, 2, 3, 4, 5],
            }],
            force6ds: vec![Force6dReading {
                name: "l_ankle".into(),
                force: Vector3::new(0.0, 0.0, 30.0),
                torque: Vector3::new(0.1, -0.2, 0.0),
            }],
            ..Default::default()
        };
        let decoded = decode_sensor_report(&encode_sensor_report(&report)).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn zero_length_payload_is_an_empty_report() {
        let report = decode_sensor_report(&[]).unwrap();
        assert_eq!(report, SensorReport::default());
        assert_eq!(report.reading_count(), 0);
    }

    #[test]
    fn missing_vector_decodes_as_zero() {
        let wire = messages::SensorMeasurements {
            accelerometers: vec![messages::AccelerometerMeasurement {
                name: "imu accelerometer".into(),
                value: None,
            }],
            ..Default::default()
        };
        let report = decode_sensor_report(&wire.encode_to_vec()).unwrap();
        assert_eq!(report.accelerometers[0].value, Vector3::default());
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        // field 1 declared as length-delimited with a length running past the end
        let err = decode_sensor_report(&[0x0a, 0xff, 0x01]).unwrap_err();
        assert!(matches!(err, crate::BridgeError::Decode { .. }));
    }

    #[test]
    fn unknown_severity_is_preserved() {
        let wire = messages::SensorMeasurements {
            messages: vec![messages::Message { message_type: 5, text: "hmm".into() }],
            ..Default::default()
        };
        let report = decode_sensor_report(&wire.encode_to_vec()).unwrap();
        assert_eq!(report.diagnostics[0].severity, Severity::Unknown(5));
        assert_eq!(report.diagnostics[0].severity.to_string(), "UNKNOWN(5)");
    }

    #[test]
    fn subscriptions_are_omitted_when_absent() {
        let request = ActuatorRequest {
            motor_positions: vec![MotorTarget { name: "LKnee".into(), value: 0.3 }],
            motor_velocities: vec![MotorTarget { name: "LKnee".into(), value: 7.0 }],
            ..Default::default()
        };
        let bytes = encode_actuator_request(&request);
        let wire = messages::ActuatorRequests::decode(bytes.as_slice()).unwrap();
        assert!(wire.sensor_time_steps.is_empty());
        assert_eq!(wire.motor_positions.len(), wire.motor_velocities.len());
    }

    #[test]
    fn kinds_count_their_readings() {
        let report = SensorReport {
            accelerometers: vec![NamedVector { name: "a".into(), value: Vector3::default() }],
            forces: vec![
                NamedScalar { name: "f1".into(), value: 1.0 },
                NamedScalar { name: "f2".into(), value: 2.0 },
            ],
            ..Default::default()
        };
        assert_eq!(report.count(SensorKind::Accelerometer), 1);
        assert_eq!(report.count(SensorKind::Force), 2);
        assert_eq!(report.count(SensorKind::Gyro), 0);
        assert_eq!(report.reading_count(), 3);
    }
}
