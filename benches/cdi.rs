//! Benchmarks for custom debug information encoding and reading.
//!
//! Tests performance of:
//! - Edit-and-Continue map serialization (local slots, lambdas, state machine states)
//! - Edit-and-Continue map deserialization
//! - Blob assembly with the record encoder
//! - Record lookup in a blob with several records

extern crate cdiscope;

use cdiscope::customdebuginfo::{
    try_get_custom_debug_info_record, CustomDebugInfoEncoder, CustomDebugInfoKind,
};
use cdiscope::editandcontinue::{
    lambdamap::deserialize_lambda_map, slotmap::deserialize_local_slots,
    statemachine::deserialize_state_machine_states, AwaitDebugId, ClosureDebugInfo, DebugId,
    EditAndContinueMethodDebugInformation, LambdaDebugInfo, LocalDebugId, LocalSlotDebugInfo,
    StateMachineState, StateMachineStateDebugInfo, SynthesizedLocalKind,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// A method shaped like a mid-sized async method with a few lambdas.
fn sample_method() -> EditAndContinueMethodDebugInformation {
    let local_slots = (0..32)
        .map(|i| match i % 4 {
            0 => LocalSlotDebugInfo::temp(),
            1 => LocalSlotDebugInfo::new(SynthesizedLocalKind::Awaiter, LocalDebugId::new(i * 12, 0)),
            _ => LocalSlotDebugInfo::new(
                SynthesizedLocalKind::UserDefined,
                LocalDebugId::new(i * 12 - 100, i % 4 - 2),
            ),
        })
        .collect();

    let closures = (0..4)
        .map(|i| ClosureDebugInfo::new(i * 40 - 60, DebugId::new(i, 0)))
        .collect();

    let lambdas = (0..8)
        .map(|i| LambdaDebugInfo::new(i * 25 - 30, DebugId::new(i, 0), i % 5 - 1))
        .collect();

    let state_machine_states = (0..16)
        .map(|i| {
            StateMachineStateDebugInfo::new(
                (i / 2) * 30,
                AwaitDebugId::new(i % 2),
                StateMachineState(i),
            )
        })
        .collect();

    EditAndContinueMethodDebugInformation {
        method_ordinal: 3,
        local_slots,
        closures,
        lambdas,
        state_machine_states,
    }
}

/// Benchmark serializing all three maps of a method.
fn bench_serialize_maps(c: &mut Criterion) {
    let info = sample_method();

    c.bench_function("enc_serialize_maps", |b| {
        b.iter(|| {
            let mut buffer = Vec::with_capacity(256);
            info.serialize_local_slots(&mut buffer).unwrap();
            info.serialize_lambda_map(&mut buffer).unwrap();
            info.serialize_state_machine_states(&mut buffer).unwrap();
            black_box(buffer)
        });
    });
}

/// Benchmark decoding the local slot map.
fn bench_deserialize_local_slots(c: &mut Criterion) {
    let mut data = Vec::new();
    sample_method().serialize_local_slots(&mut data).unwrap();

    c.bench_function("enc_deserialize_local_slots", |b| {
        b.iter(|| {
            let slots = deserialize_local_slots(black_box(&data)).unwrap();
            black_box(slots)
        });
    });
}

/// Benchmark decoding the lambda map.
fn bench_deserialize_lambda_map(c: &mut Criterion) {
    let mut data = Vec::new();
    sample_method().serialize_lambda_map(&mut data).unwrap();

    c.bench_function("enc_deserialize_lambda_map", |b| {
        b.iter(|| {
            let map = deserialize_lambda_map(black_box(&data)).unwrap();
            black_box(map)
        });
    });
}

/// Benchmark decoding the state machine state map.
fn bench_deserialize_state_machine_states(c: &mut Criterion) {
    let mut data = Vec::new();
    sample_method()
        .serialize_state_machine_states(&mut data)
        .unwrap();

    c.bench_function("enc_deserialize_state_machine_states", |b| {
        b.iter(|| {
            let states = deserialize_state_machine_states(black_box(&data)).unwrap();
            black_box(states)
        });
    });
}

/// Benchmark assembling a blob with imports, a type name and all three maps.
fn bench_encode_blob(c: &mut Criterion) {
    let info = sample_method();

    c.bench_function("cdi_encode_blob", |b| {
        b.iter(|| {
            let mut encoder = CustomDebugInfoEncoder::new();
            encoder.add_using_groups(&[2, 1, 4]).unwrap();
            encoder.add_state_machine_type_name("<RunAsync>d__12").unwrap();
            encoder
                .add_edit_and_continue_method_debug_information(black_box(&info))
                .unwrap();
            black_box(encoder.to_bytes())
        });
    });
}

/// Benchmark looking up the last record of a blob.
fn bench_record_lookup(c: &mut Criterion) {
    let mut encoder = CustomDebugInfoEncoder::new();
    encoder.add_using_groups(&[2, 1, 4]).unwrap();
    encoder.add_forward_module_info(0x0600_0001).unwrap();
    encoder.add_state_machine_type_name("<RunAsync>d__12").unwrap();
    encoder
        .add_edit_and_continue_method_debug_information(&sample_method())
        .unwrap();
    let blob = encoder.to_bytes().unwrap();

    c.bench_function("cdi_record_lookup", |b| {
        b.iter(|| {
            let data = try_get_custom_debug_info_record(
                black_box(&blob),
                CustomDebugInfoKind::EditAndContinueStateMachineStateMap,
            )
            .unwrap();
            black_box(data)
        });
    });
}

/// Benchmark reading the method information back from a blob.
fn bench_from_custom_debug_info(c: &mut Criterion) {
    let mut encoder = CustomDebugInfoEncoder::new();
    encoder
        .add_edit_and_continue_method_debug_information(&sample_method())
        .unwrap();
    let blob = encoder.to_bytes().unwrap();

    c.bench_function("enc_from_custom_debug_info", |b| {
        b.iter(|| {
            let info =
                EditAndContinueMethodDebugInformation::from_custom_debug_info(black_box(&blob))
                    .unwrap();
            black_box(info)
        });
    });
}

criterion_group!(
    benches,
    // Edit-and-Continue maps
    bench_serialize_maps,
    bench_deserialize_local_slots,
    bench_deserialize_lambda_map,
    bench_deserialize_state_machine_states,
    // Blobs
    bench_encode_blob,
    bench_record_lookup,
    bench_from_custom_debug_info,
);
criterion_main!(benches);
