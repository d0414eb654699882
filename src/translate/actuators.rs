//! Joint command → actuator request translation

use tracing::warn;

use crate::model::{JointModel, SensorCatalog};
use crate::schema::{ActuatorRequest, MotorTarget};
use crate::types::JointCommand;

/// Build the actuator request for one tick.
///
/// Emits one position and one velocity target per commanded joint, in
/// command order. The velocity is the commanded one unless the command has
/// no velocities or carries the `-1` sentinel, in which case the joint's
/// velocity limit from `joints` is used. A joint that needs its limit but has
/// none in `joints` is left out of both lists. Subscriptions are attached only
/// when a catalog is passed, which the session does on its first tick.
pub fn build(
    command: &JointCommand,
    joints: &JointModel,
    subscriptions: Option<&SensorCatalog>,
) -> ActuatorRequest {
    if command.positions.len() < command.joint_names.len() {
        warn!(
            "Joint command names {} joints but has only {} positions",
            command.joint_names.len(),
            command.positions.len()
        );
    }

    let mut request = ActuatorRequest {
        sensor_subscriptions: subscriptions.map(SensorCatalog::subscriptions),
        motor_positions: Vec::with_capacity(command.joint_names.len()),
        motor_velocities: Vec::with_capacity(command.joint_names.len()),
    };

    for (i, (name, &position)) in command.joint_names.iter().zip(&command.positions).enumerate() {
        let velocity = command.velocity_override(i).or_else(|| joints.velocity_limit(name));
        let Some(velocity) = velocity else {
            warn!("No velocity limit known for joint '{}', leaving it out", name);
            continue;
        };

        request.motor_positions.push(MotorTarget { name: name.clone(), value: position });
        request.motor_velocities.push(MotorTarget { name: name.clone(), value: velocity });
    }

    request
}
