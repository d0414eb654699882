//! Benchmarks for the per-tick hot path
//!
//! Everything between reading a sensor frame and writing the actuator frame
//! runs inline on the session task, so together it has to stay well inside
//! one control step (8ms for Wolfgang):
//! - Sensor payload decode and translation
//! - Actuator request construction and encode
//! - A full in-memory tick with framing

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use robocup_bridge::codec;
use robocup_bridge::schema::{decode_sensor_report, encode_actuator_request, encode_sensor_report};
use robocup_bridge::test_utils::{full_body_command, full_tick_report, test_setup};
use robocup_bridge::translate::actuators;
use std::hint::black_box;

fn bench_sensor_path(c: &mut Criterion) {
    let payload = encode_sensor_report(&full_tick_report(1_024));
    let mut setup = test_setup();

    let mut group = c.benchmark_group("sensor_path");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode_sensor_report(black_box(&payload)).unwrap()))
    });

    let report = decode_sensor_report(&payload).unwrap();
    group.bench_function("translate", |b| {
        b.iter(|| black_box(setup.sensors.translate(black_box(&report))))
    });

    group.finish();
}

fn bench_actuator_path(c: &mut Criterion) {
    let setup = test_setup();
    let command = full_body_command();

    let mut group = c.benchmark_group("actuator_path");

    group.bench_function("build_steady_state", |b| {
        b.iter(|| black_box(actuators::build(black_box(&command), &setup.joints, None)))
    });

    group.bench_function("build_first_tick", |b| {
        b.iter(|| {
            black_box(actuators::build(black_box(&command), &setup.joints, Some(&setup.catalog)))
        })
    });

    let request = actuators::build(&command, &setup.joints, None);
    group.bench_function("encode", |b| {
        b.iter(|| black_box(encode_actuator_request(black_box(&request))))
    });

    group.finish();
}

fn bench_full_tick(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let mut setup = test_setup();
    let command = full_body_command();

    let mut framed = Vec::new();
    runtime
        .block_on(codec::write_frame(&mut framed, &encode_sensor_report(&full_tick_report(1_024))))
        .unwrap();

    c.bench_function("full_tick_in_memory", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let mut inbound = framed.as_slice();
                let payload = codec::read_frame(&mut inbound).await.unwrap();
                let report = decode_sensor_report(&payload).unwrap();
                let translated = setup.sensors.translate(&report);
                let request = actuators::build(&command, &setup.joints, None);
                let mut outbound = Vec::with_capacity(1024);
                let reply = encode_actuator_request(&request);
                codec::write_frame(&mut outbound, &reply).await.unwrap();
                black_box((translated, outbound))
            })
        })
    });
}

criterion_group!(benches, bench_sensor_path, bench_actuator_path, bench_full_tick);
criterion_main!(benches);
