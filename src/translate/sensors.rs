//! Sensor report → control stack translation

use tracing::{debug, error, warn};

use crate::error::{DecodeWarning, ImuSlot};
use crate::model::{HEAD_IMU_ACCELEROMETER, HEAD_IMU_GYRO, IMU_ACCELEROMETER, IMU_GYRO};
use crate::schema::{
    BumperReading, CameraImage, Force6dReading, NamedScalar, NamedVector, SensorReport, Severity,
};
use crate::types::{ClockStamp, Imu, SensorKind, Vector3};

/// A reading from one of the categories the bridge does not interpret itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement<'a> {
    Bumper(&'a BumperReading),
    Camera(&'a CameraImage),
    Force(&'a NamedScalar),
    Force3d(&'a NamedVector),
    Force6d(&'a Force6dReading),
    PositionSensor(&'a NamedScalar),
}

impl Measurement<'_> {
    pub fn kind(&self) -> SensorKind {
        match self {
            Measurement::Bumper(_) => SensorKind::Bumper,
            Measurement::Camera(_) => SensorKind::Camera,
            Measurement::Force(_) => SensorKind::Force,
            Measurement::Force3d(_) => SensorKind::Force3d,
            Measurement::Force6d(_) => SensorKind::Force6d,
            Measurement::PositionSensor(_) => SensorKind::PositionSensor,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Measurement::Bumper(m) => &m.name,
            Measurement::Camera(m) => &m.name,
            Measurement::Force(m) | Measurement::PositionSensor(m) => &m.name,
            Measurement::Force3d(m) => &m.name,
            Measurement::Force6d(m) => &m.name,
        }
    }
}

/// Extension point for bumper, camera, force and position readings.
///
/// The translator hands every such reading to the hook in report order,
/// stamped with the tick's simulated time. The default does nothing.
pub trait MeasurementHook: Send + 'static {
    fn on_measurement(&mut self, _stamp: ClockStamp, _measurement: Measurement<'_>) {}
}

/// Hook that ignores every reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreMeasurements;

impl MeasurementHook for IgnoreMeasurements {}

/// Control-stack view of one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatedSensors {
    /// Simulated time; the stamp of everything else in this tick
    pub clock: ClockStamp,
    /// Simulator wall-clock time, not synchronised with `clock`
    pub server_clock: ClockStamp,
    pub imu: Option<Imu>,
    pub head_imu: Option<Imu>,
    pub warnings: Vec<DecodeWarning>,
}

#[derive(Debug, Default)]
struct ImuSamples {
    accelerometer: Option<Vector3>,
    gyro: Option<Vector3>,
}

impl ImuSamples {
    /// Both halves, or a warning if only one arrived. Nothing if neither did.
    fn finish(
        self,
        slot: ImuSlot,
        frame_id: &str,
        stamp: ClockStamp,
    ) -> Option<Result<Imu, DecodeWarning>> {
        match (self.accelerometer, self.gyro) {
            (Some(linear_acceleration), Some(angular_velocity)) => Some(Ok(Imu {
                frame_id: frame_id.to_string(),
                stamp,
                linear_acceleration,
                angular_velocity,
            })),
            (None, None) => None,
            (accelerometer, gyro) => Some(Err(DecodeWarning::IncompleteImu {
                imu: slot,
                accelerometer: accelerometer.is_some(),
                gyro: gyro.is_some(),
            })),
        }
    }
}

/// Turns sensor reports into clocks, IMU readings and log lines.
pub struct SensorTranslator<H = IgnoreMeasurements> {
    imu_frame: String,
    head_imu_frame: String,
    hook: H,
}

impl SensorTranslator<IgnoreMeasurements> {
    pub fn new(imu_frame: impl Into<String>, head_imu_frame: impl Into<String>) -> Self {
        Self::with_hook(imu_frame, head_imu_frame, IgnoreMeasurements)
    }
}

impl<H: MeasurementHook> SensorTranslator<H> {
    pub fn with_hook(
        imu_frame: impl Into<String>,
        head_imu_frame: impl Into<String>,
        hook: H,
    ) -> Self {
        Self { imu_frame: imu_frame.into(), head_imu_frame: head_imu_frame.into(), hook }
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Body and head IMU frame ids.
    pub fn frames(&self) -> (&str, &str) {
        (&self.imu_frame, &self.head_imu_frame)
    }

    pub fn translate(&mut self, report: &SensorReport) -> TranslatedSensors {
        let clock = ClockStamp::from_millis(u64::from(report.simulated_time_ms));
        let server_clock = ClockStamp::from_millis(report.wall_time_ms);
        let mut warnings = Vec::new();

        self.log_diagnostics(report, &mut warnings);
        let (imu, head_imu) = self.collect_imus(report, clock, &mut warnings);
        self.forward_measurements(report, clock);

        TranslatedSensors { clock, server_clock, imu, head_imu, warnings }
    }

    fn log_diagnostics(&self, report: &SensorReport, warnings: &mut Vec<DecodeWarning>) {
        for diagnostic in &report.diagnostics {
            let text = &diagnostic.text;
            match diagnostic.severity {
                Severity::Error => error!("RECEIVED ERROR: '{}'", text),
                Severity::Warning => warn!("RECEIVED WARNING: '{}'", text),
                Severity::Unknown(code) => {
                    warn!("RECEIVED UNKNOWN MESSAGE (severity {}): '{}'", code, text);
                    warnings.push(DecodeWarning::UnknownSeverity { code, text: text.clone() });
                }
            }
        }
    }

    fn collect_imus(
        &self,
        report: &SensorReport,
        stamp: ClockStamp,
        warnings: &mut Vec<DecodeWarning>,
    ) -> (Option<Imu>, Option<Imu>) {
        let mut body = ImuSamples::default();
        let mut head = ImuSamples::default();

        for sample in &report.accelerometers {
            match sample.name.as_str() {
                IMU_ACCELEROMETER => body.accelerometer = Some(sample.value),
                HEAD_IMU_ACCELEROMETER => head.accelerometer = Some(sample.value.head_to_body()),
                _ => unknown_sensor(SensorKind::Accelerometer, &sample.name, warnings),
            }
        }

        for sample in &report.gyros {
            match sample.name.as_str() {
                IMU_GYRO => body.gyro = Some(sample.value),
                HEAD_IMU_GYRO => head.gyro = Some(sample.value.head_to_body()),
                _ => unknown_sensor(SensorKind::Gyro, &sample.name, warnings),
            }
        }

        let mut publishable = |slot, samples: ImuSamples, frame_id: &str| {
            match samples.finish(slot, frame_id, stamp)? {
                Ok(imu) => Some(imu),
                Err(warning) => {
                    debug!("Skipping IMU for this tick: {}", warning);
                    warnings.push(warning);
                    None
                }
            }
        };

        let imu = publishable(ImuSlot::Body, body, &self.imu_frame);
        let head_imu = publishable(ImuSlot::Head, head, &self.head_imu_frame);
        (imu, head_imu)
    }

    fn forward_measurements(&mut self, report: &SensorReport, stamp: ClockStamp) {
        let hook = &mut self.hook;
        report.bumpers.iter().for_each(|m| hook.on_measurement(stamp, Measurement::Bumper(m)));
        report.cameras.iter().for_each(|m| hook.on_measurement(stamp, Measurement::Camera(m)));
        report.forces.iter().for_each(|m| hook.on_measurement(stamp, Measurement::Force(m)));
        report.force3ds.iter().for_each(|m| hook.on_measurement(stamp, Measurement::Force3d(m)));
        report.force6ds.iter().for_each(|m| hook.on_measurement(stamp, Measurement::Force6d(m)));
        report
            .position_sensors
            .iter()
            .for_each(|m| hook.on_measurement(stamp, Measurement::PositionSensor(m)));
    }
}

fn unknown_sensor(kind: SensorKind, name: &str, warnings: &mut Vec<DecodeWarning>) {
    warn!("Unknown {}: '{}'", kind, name);
    warnings.push(DecodeWarning::UnknownSensor { kind, name: name.to_string() });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Diagnostic;

    fn sample(name: &str, x: f64, y: f64, z: f64) -> NamedVector {
        NamedVector { name: name.to_string(), value: Vector3::new(x, y, z) }
    }

    fn translator() -> SensorTranslator {
        SensorTranslator::new("imu_frame", "head_imu_frame")
    }

    #[test]
    fn clocks_are_converted_independently() {
        let report = SensorReport {
            simulated_time_ms: 2_008,
            wall_time_ms: 1_700_000_000_123,
            ..Default::default()
        };
        let out = translator().translate(&report);
        assert_eq!(out.clock, ClockStamp { secs: 2, nsecs: 8_000_000 });
        assert_eq!(out.server_clock, ClockStamp { secs: 1_700_000_000, nsecs: 123_000_000 });
    }

    #[test]
    fn body_imu_passes_through() {
        let report = SensorReport {
            simulated_time_ms: 40,
            accelerometers: vec![sample(IMU_ACCELEROMETER, 0.1, 0.2, 9.81)],
            gyros: vec![sample(IMU_GYRO, 0.01, 0.02, 0.03)],
            ..Default::default()
        };
        let out = translator().translate(&report);
        let imu = out.imu.expect("body IMU should be published");
        assert_eq!(imu.frame_id, "imu_frame");
        assert_eq!(imu.stamp, out.clock);
        assert_eq!(imu.linear_acceleration, Vector3::new(0.1, 0.2, 9.81));
        assert_eq!(imu.angular_velocity, Vector3::new(0.01, 0.02, 0.03));
        assert!(out.head_imu.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn head_imu_axes_are_remapped() {
        let report = SensorReport {
            accelerometers: vec![sample(HEAD_IMU_ACCELEROMETER, 1.0, 2.0, 3.0)],
            gyros: vec![sample(HEAD_IMU_GYRO, 4.0, 5.0, 6.0)],
            ..Default::default()
        };
        let head = translator().translate(&report).head_imu.expect("head IMU should be published");
        assert_eq!(head.frame_id, "head_imu_frame");
        assert_eq!(head.linear_acceleration, Vector3::new(3.0, 1.0, 2.0));
        assert_eq!(head.angular_velocity, Vector3::new(6.0, 4.0, 5.0));
    }

    #[test]
    fn accelerometer_alone_publishes_nothing() {
        let report = SensorReport {
            accelerometers: vec![sample(IMU_ACCELEROMETER, 0.0, 0.0, 9.81)],
            ..Default::default()
        };
        let out = translator().translate(&report);
        assert!(out.imu.is_none());
        assert_eq!(
            out.warnings,
            vec![DecodeWarning::IncompleteImu {
                imu: ImuSlot::Body,
                accelerometer: true,
                gyro: false,
            }]
        );
    }

    #[test]
    fn gyro_alone_publishes_nothing() {
        let report = SensorReport {
            gyros: vec![sample(HEAD_IMU_GYRO, 0.0, 0.0, 1.0)],
            ..Default::default()
        };
        let out = translator().translate(&report);
        assert!(out.head_imu.is_none());
        assert!(matches!(
            out.warnings.as_slice(),
            [DecodeWarning::IncompleteImu { imu: ImuSlot::Head, accelerometer: false, gyro: true }]
        ));
    }

    #[test]
    fn unknown_names_warn_and_translation_continues() {
        let report = SensorReport {
            accelerometers: vec![
                sample("tail accelerometer", 0.0, 0.0, 0.0),
                sample(IMU_ACCELEROMETER, 0.0, 0.0, 9.81),
            ],
            gyros: vec![sample("tail gyro", 0.0, 0.0, 0.0), sample(IMU_GYRO, 0.0, 0.0, 0.0)],
            ..Default::default()
        };
        let out = translator().translate(&report);
        assert!(out.imu.is_some());
        assert_eq!(
            out.warnings,
            vec![
                DecodeWarning::UnknownSensor {
                    kind: SensorKind::Accelerometer,
                    name: "tail accelerometer".into()
                },
                DecodeWarning::UnknownSensor { kind: SensorKind::Gyro, name: "tail gyro".into() },
            ]
        );
    }

    #[test]
    fn unknown_severity_is_reported_not_dropped() {
        let report = SensorReport {
            diagnostics: vec![
                Diagnostic { severity: Severity::Error, text: "joint overheated".into() },
                Diagnostic { severity: Severity::Unknown(9), text: "???".into() },
            ],
            ..Default::default()
        };
        let out = translator().translate(&report);
        assert_eq!(
            out.warnings,
            vec![DecodeWarning::UnknownSeverity { code: 9, text: "???".into() }]
        );
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(SensorKind, String)>,
    }

    impl MeasurementHook for Recorder {
        fn on_measurement(&mut self, _stamp: ClockStamp, measurement: Measurement<'_>) {
            self.seen.push((measurement.kind(), measurement.name().to_string()));
        }
    }

    #[test]
    fn extension_categories_reach_the_hook() {
        let report = SensorReport {
            bumpers: vec![BumperReading { name: "r_cleat_l_back".into(), pressed: true }],
            forces: vec![NamedScalar { name: "l_cleat_l_front".into(), value: 12.0 }],
            position_sensors: vec![NamedScalar { name: "LKnee_sensor".into(), value: 0.4 }],
            ..Default::default()
        };
        let mut translator = SensorTranslator::with_hook("imu", "head", Recorder::default());
        let out = translator.translate(&report);
        assert!(out.warnings.is_empty());
        assert_eq!(
            translator.hook().seen,
            vec![
                (SensorKind::Bumper, "r_cleat_l_back".to_string()),
                (SensorKind::Force, "l_cleat_l_front".to_string()),
                (SensorKind::PositionSensor, "LKnee_sensor".to_string()),
            ]
        );
    }
}
