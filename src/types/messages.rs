//! Wire messages of the RoboCup virtual-league simulator protocol.
//!
//! Field numbers follow the simulator's `messages.proto`. Only the two
//! top-level messages ever travel on the socket: [`SensorMeasurements`]
//! from the simulator and [`ActuatorRequests`] to it.

/// Three-component vector as sent by the simulator
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Vector3 {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
}

/// Requested sampling period for one named sensor (0 disables it)
#[derive(Clone, PartialEq, prost::Message)]
pub struct SensorTimeStep {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint32, tag = "2")]
    pub time_step: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MotorPosition {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(double, tag = "2")]
    pub position: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MotorVelocity {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(double, tag = "2")]
    pub velocity: f64,
}

/// Everything the bridge asks of the simulator for one tick.
///
/// The simulator also understands forces, torques, PID gains and camera
/// settings; the bridge never sends those so they are not modelled.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ActuatorRequests {
    #[prost(message, repeated, tag = "1")]
    pub motor_positions: Vec<MotorPosition>,
    #[prost(message, repeated, tag = "2")]
    pub motor_velocities: Vec<MotorVelocity>,
    #[prost(message, repeated, tag = "6")]
    pub sensor_time_steps: Vec<SensorTimeStep>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PositionSensorMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(double, tag = "2")]
    pub value: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AccelerometerMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Vector3>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BumperMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "2")]
    pub value: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CameraMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint32, tag = "2")]
    pub width: u32,
    #[prost(uint32, tag = "3")]
    pub height: u32,
    /// -1 for raw images, JPEG quality otherwise
    #[prost(sint32, tag = "4")]
    pub quality: i32,
    #[prost(bytes = "vec", tag = "5")]
    pub image: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ForceMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(double, tag = "2")]
    pub value: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Force3DMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Vector3>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Force6DMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub force: Option<Vector3>,
    #[prost(message, optional, tag = "3")]
    pub torque: Option<Vector3>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GyroMeasurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Vector3>,
}

/// Severity tag of a simulator diagnostic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    ErrorMessage = 0,
    WarningMessage = 1,
}

/// Free-text diagnostic from the simulator
#[derive(Clone, PartialEq, prost::Message)]
pub struct Message {
    #[prost(enumeration = "MessageType", tag = "1")]
    pub message_type: i32,
    #[prost(string, tag = "2")]
    pub text: String,
}

/// Everything the simulator measured during one tick.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SensorMeasurements {
    /// Simulated time of the measurements [ms]
    #[prost(uint32, tag = "1")]
    pub time: u32,
    /// Unix wall-clock time of the measurements [ms]
    #[prost(uint64, tag = "2")]
    pub real_time: u64,
    #[prost(message, repeated, tag = "3")]
    pub messages: Vec<Message>,
    #[prost(message, repeated, tag = "4")]
    pub accelerometers: Vec<AccelerometerMeasurement>,
    #[prost(message, repeated, tag = "5")]
    pub bumpers: Vec<BumperMeasurement>,
    #[prost(message, repeated, tag = "6")]
    pub cameras: Vec<CameraMeasurement>,
    #[prost(message, repeated, tag = "7")]
    pub forces: Vec<ForceMeasurement>,
    #[prost(message, repeated, tag = "8")]
    pub force3ds: Vec<Force3DMeasurement>,
    #[prost(message, repeated, tag = "9")]
    pub force6ds: Vec<Force6DMeasurement>,
    #[prost(message, repeated, tag = "10")]
    pub gyros: Vec<GyroMeasurement>,
    #[prost(message, repeated, tag = "11")]
    pub position_sensors: Vec<PositionSensorMeasurement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    #[test]
    fn empty_payload_decodes_to_defaults() {
        let decoded = SensorMeasurements::decode(&[][..]).unwrap();
        assert_eq!(decoded.time, 0);
        assert_eq!(decoded.real_time, 0);
        assert!(decoded.accelerometers.is_empty());
        assert!(decoded.position_sensors.is_empty());
    }

    #[test]
    fn time_field_uses_tag_one_varint() {
        let measurements = SensorMeasurements { time: 8, ..Default::default() };
        assert_eq!(measurements.encode_to_vec(), vec![0x08, 0x08]);
    }

    #[test]
    fn sensor_time_steps_use_tag_six() {
        let request = ActuatorRequests {
            sensor_time_steps: vec![SensorTimeStep { name: "camera".into(), time_step: 16 }],
            ..Default::default()
        };
        let bytes = request.encode_to_vec();
        // field 6, wire type 2 (length delimited)
        assert_eq!(bytes[0], (6 << 3) | 2);
    }

    #[test]
    fn unrecognised_message_type_survives_decode() {
        let message = Message { message_type: 7, text: "odd".into() };
        let decoded = Message::decode(message.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.message_type, 7);
        assert!(MessageType::try_from(decoded.message_type).is_err());
    }
}
