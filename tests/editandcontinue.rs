//! Integration tests for Edit-and-Continue method debug information.
//!
//! Covers the byte layout of the three compressed maps against blobs produced by .NET
//! compilers, full round trips through a custom debug information blob, and rejection of
//! corrupted or unsorted maps.

use cdiscope::customdebuginfo::{
    try_get_custom_debug_info_record, CustomDebugInfoEncoder, CustomDebugInfoKind,
};
use cdiscope::editandcontinue::{
    lambdamap::{deserialize_lambda_map, serialize_lambda_map},
    slotmap::deserialize_local_slots,
    statemachine::{deserialize_state_machine_states, serialize_state_machine_states},
    AwaitDebugId, ClosureDebugInfo, DebugId, EditAndContinueMethodDebugInformation,
    LambdaDebugInfo, LocalDebugId, LocalSlotDebugInfo, StateMachineState,
    StateMachineStateDebugInfo, SynthesizedLocalKind, UNDEFINED_METHOD_ORDINAL,
};
use cdiscope::Error;
use proptest::prelude::*;

/// Syntax offsets for which every map keeps its values within the compressed range.
const OFFSETS: std::ops::RangeInclusive<i32> = -0x0FFF_FFFF..=0x0FFF_FFFF;

fn roslyn_lambda_info() -> EditAndContinueMethodDebugInformation {
    EditAndContinueMethodDebugInformation {
        method_ordinal: 0x7b,
        local_slots: Vec::new(),
        closures: vec![
            ClosureDebugInfo::new(-100, DebugId::new(0, 0)),
            ClosureDebugInfo::new(10, DebugId::new(1, 0)),
            ClosureDebugInfo::new(-200, DebugId::new(2, 0)),
        ],
        lambdas: vec![
            LambdaDebugInfo::new(20, DebugId::new(0, 0), 1),
            LambdaDebugInfo::new(-50, DebugId::new(1, 0), 0),
            LambdaDebugInfo::new(
                -180,
                DebugId::new(2, 0),
                LambdaDebugInfo::STATIC_CLOSURE_ORDINAL,
            ),
        ],
        state_machine_states: Vec::new(),
    }
}

#[test]
fn lambda_map_matches_compiler_output() {
    let info = roslyn_lambda_info();

    let mut buffer = Vec::new();
    info.serialize_lambda_map(&mut buffer).unwrap();
    assert_eq!(
        buffer,
        [0x7C, 0x80, 0xC8, 0x03, 0x64, 0x80, 0xD2, 0x00, 0x80, 0xDC, 0x03, 0x80, 0x96, 0x02, 0x14, 0x01]
    );

    let (method_ordinal, closures, lambdas) = deserialize_lambda_map(&buffer).unwrap();
    assert_eq!(method_ordinal, info.method_ordinal);
    assert_eq!(closures, info.closures);
    assert_eq!(lambdas, info.lambdas);
}

#[test]
fn truncated_slot_map_reports_offset() {
    let error = deserialize_local_slots(&[0x01, 0x68, 0xFF]).unwrap_err();
    assert!(matches!(error, Error::InvalidData { offset: 3, .. }));
    assert_eq!(error.to_string(), "Invalid data at offset 3: 01-68-FF*");
}

#[test]
fn unsorted_state_map_is_rejected() {
    // Offsets 0x20, 0x10, 0x20 with one state each
    let data = [0x03, 0x40, 0x01, 0x00, 0x1F, 0x01, 0x00, 0x20, 0x01, 0x00];
    assert!(matches!(
        deserialize_state_machine_states(&data),
        Err(Error::InvalidData { .. })
    ));

    let states = [
        StateMachineStateDebugInfo::new(0x20, AwaitDebugId::new(0), StateMachineState(0)),
        StateMachineStateDebugInfo::new(0x10, AwaitDebugId::new(0), StateMachineState(1)),
        StateMachineStateDebugInfo::new(0x20, AwaitDebugId::new(0), StateMachineState(2)),
    ];
    let mut buffer = Vec::new();
    assert!(matches!(
        serialize_state_machine_states(&states, &mut buffer),
        Err(Error::ValueOutOfRange { .. })
    ));
}

#[test]
fn grouped_states_roundtrip() {
    let states = vec![
        StateMachineStateDebugInfo::new(-4, AwaitDebugId::new(0), StateMachineState(0)),
        StateMachineStateDebugInfo::new(0x10, AwaitDebugId::new(0), StateMachineState(1)),
        StateMachineStateDebugInfo::new(0x10, AwaitDebugId::new(1), StateMachineState(2)),
        StateMachineStateDebugInfo::new(
            0x80,
            AwaitDebugId::new(0),
            StateMachineState::FIRST_ITERATOR_FINALIZE_STATE,
        ),
    ];

    let mut buffer = Vec::new();
    serialize_state_machine_states(&states, &mut buffer).unwrap();
    assert_eq!(deserialize_state_machine_states(&buffer).unwrap(), states);
}

#[test]
fn method_without_lambdas_keeps_ordinal() {
    let info = EditAndContinueMethodDebugInformation {
        method_ordinal: 5,
        local_slots: vec![
            LocalSlotDebugInfo::temp(),
            LocalSlotDebugInfo::new(SynthesizedLocalKind::Lock, LocalDebugId::new(-40, 0)),
        ],
        ..Default::default()
    };

    let mut encoder = CustomDebugInfoEncoder::new();
    encoder
        .add_edit_and_continue_method_debug_information(&info)
        .unwrap();
    assert_eq!(encoder.record_count(), 2);

    let blob = encoder.to_bytes().unwrap();
    let lambda_map =
        try_get_custom_debug_info_record(&blob, CustomDebugInfoKind::EditAndContinueLambdaMap)
            .unwrap()
            .unwrap();
    assert_eq!(lambda_map, [0x06]);

    let decoded = EditAndContinueMethodDebugInformation::from_custom_debug_info(&blob).unwrap();
    assert_eq!(decoded, info);
}

#[test]
fn undefined_ordinal_without_lambdas_writes_no_lambda_map() {
    let info = EditAndContinueMethodDebugInformation {
        local_slots: vec![LocalSlotDebugInfo::new(
            SynthesizedLocalKind::UserDefined,
            LocalDebugId::new(3, 0),
        )],
        ..Default::default()
    };

    let mut encoder = CustomDebugInfoEncoder::new();
    encoder
        .add_edit_and_continue_method_debug_information(&info)
        .unwrap();
    assert_eq!(encoder.record_count(), 1);

    let decoded =
        EditAndContinueMethodDebugInformation::from_custom_debug_info(&encoder.to_bytes().unwrap())
            .unwrap();
    assert_eq!(decoded.method_ordinal, UNDEFINED_METHOD_ORDINAL);
    assert_eq!(decoded, info);
}

#[test]
fn full_method_roundtrip() {
    let mut info = roslyn_lambda_info();
    info.local_slots = vec![
        LocalSlotDebugInfo::new(SynthesizedLocalKind::UserDefined, LocalDebugId::new(-300, 0)),
        LocalSlotDebugInfo::new(SynthesizedLocalKind::UserDefined, LocalDebugId::new(-300, 1)),
        LocalSlotDebugInfo::temp(),
        LocalSlotDebugInfo::new(SynthesizedLocalKind::Awaiter, LocalDebugId::new(12, 0)),
    ];
    info.state_machine_states = vec![
        StateMachineStateDebugInfo::new(12, AwaitDebugId::new(0), StateMachineState(0)),
        StateMachineStateDebugInfo::new(40, AwaitDebugId::new(0), StateMachineState(1)),
    ];

    let mut encoder = CustomDebugInfoEncoder::new();
    encoder.add_using_groups(&[1]).unwrap();
    encoder
        .add_edit_and_continue_method_debug_information(&info)
        .unwrap();
    assert_eq!(encoder.record_count(), 4);

    let blob = encoder.to_bytes().unwrap();
    assert_eq!(
        EditAndContinueMethodDebugInformation::from_custom_debug_info(&blob).unwrap(),
        info
    );

    let create = EditAndContinueMethodDebugInformation::create(
        &try_get_custom_debug_info_record(&blob, CustomDebugInfoKind::EditAndContinueLocalSlotMap)
            .unwrap()
            .unwrap(),
        &try_get_custom_debug_info_record(&blob, CustomDebugInfoKind::EditAndContinueLambdaMap)
            .unwrap()
            .unwrap(),
        &try_get_custom_debug_info_record(
            &blob,
            CustomDebugInfoKind::EditAndContinueStateMachineStateMap,
        )
        .unwrap()
        .unwrap(),
    )
    .unwrap();
    assert_eq!(create, info);
}

#[test]
fn corrupted_map_in_blob_is_reported() {
    let mut encoder = CustomDebugInfoEncoder::new();
    encoder
        .add_record(CustomDebugInfoKind::EditAndContinueLambdaMap, |buffer| {
            buffer.extend_from_slice(&[0x01, 0x01, 0x01]);
            Ok(())
        })
        .unwrap();

    assert!(matches!(
        EditAndContinueMethodDebugInformation::from_custom_debug_info(&encoder.to_bytes().unwrap()),
        Err(Error::InvalidData { .. })
    ));
}

#[test]
fn non_positional_ids_are_rejected() {
    let closures = [ClosureDebugInfo::new(0, DebugId::new(1, 0))];
    let mut buffer = Vec::new();
    assert!(serialize_lambda_map(0, &closures, &[], &mut buffer).is_err());

    let lambdas = [LambdaDebugInfo::new(0, DebugId::new(0, 0), 3)];
    assert!(serialize_lambda_map(0, &[], &lambdas, &mut buffer).is_err());
}

fn local_slot() -> impl Strategy<Value = LocalSlotDebugInfo> {
    prop_oneof![
        1 => Just(LocalSlotDebugInfo::temp()),
        4 => (0_u8..=61, OFFSETS, 0..=0x1FFF_FFFF_i32).prop_map(|(tag, offset, ordinal)| {
            LocalSlotDebugInfo::new(
                SynthesizedLocalKind::from_tag(tag),
                LocalDebugId::new(offset, ordinal),
            )
        }),
    ]
}

fn lambda_map() -> impl Strategy<Value = (i32, Vec<ClosureDebugInfo>, Vec<LambdaDebugInfo>)> {
    (
        UNDEFINED_METHOD_ORDINAL..=0x1FFF_FFFE,
        prop::collection::vec(OFFSETS, 0..5),
    )
        .prop_flat_map(|(method_ordinal, closure_offsets)| {
            let closure_count = closure_offsets.len() as i32;
            let lambdas = prop::collection::vec(
                (OFFSETS, LambdaDebugInfo::MIN_CLOSURE_ORDINAL..closure_count),
                0..5,
            );
            (Just(method_ordinal), Just(closure_offsets), lambdas)
        })
        .prop_map(|(method_ordinal, closure_offsets, lambdas)| {
            let closures = closure_offsets
                .into_iter()
                .enumerate()
                .map(|(ordinal, offset)| ClosureDebugInfo::new(offset, DebugId::new(ordinal as i32, 0)))
                .collect();
            let lambdas = lambdas
                .into_iter()
                .enumerate()
                .map(|(ordinal, (offset, closure_ordinal))| {
                    LambdaDebugInfo::new(offset, DebugId::new(ordinal as i32, 0), closure_ordinal)
                })
                .collect();
            (method_ordinal, closures, lambdas)
        })
}

fn state_machine_state_list() -> impl Strategy<Value = Vec<StateMachineStateDebugInfo>> {
    prop::collection::btree_map(
        -0x07FF_FFFF..=0x07FF_FFFF_i32,
        prop::collection::vec(-0x1000_0000..=0x0FFF_FFFF_i32, 1..4),
        0..6,
    )
    .prop_map(|groups| {
        groups
            .into_iter()
            .flat_map(|(offset, states)| {
                states.into_iter().enumerate().map(move |(ordinal, state)| {
                    StateMachineStateDebugInfo::new(
                        offset,
                        AwaitDebugId::new(ordinal as i32),
                        StateMachineState(state),
                    )
                })
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn method_information_roundtrips(
        local_slots in prop::collection::vec(local_slot(), 0..8),
        (method_ordinal, closures, lambdas) in lambda_map(),
        state_machine_states in state_machine_state_list(),
    ) {
        let info = EditAndContinueMethodDebugInformation {
            method_ordinal,
            local_slots,
            closures,
            lambdas,
            state_machine_states,
        };

        let mut encoder = CustomDebugInfoEncoder::new();
        encoder.add_edit_and_continue_local_slot_map(&info).unwrap();
        encoder.add_edit_and_continue_lambda_map(&info).unwrap();
        encoder.add_edit_and_continue_state_machine_state_map(&info).unwrap();

        let blob = encoder.to_bytes().unwrap();
        let decoded = EditAndContinueMethodDebugInformation::from_custom_debug_info(&blob).unwrap();
        prop_assert_eq!(decoded, info);
    }

    #[test]
    fn map_decoders_never_panic(data in prop::collection::vec(any::<u8>(), 0..32)) {
        let _ = deserialize_local_slots(&data);
        let _ = deserialize_lambda_map(&data);
        let _ = deserialize_state_machine_states(&data);
    }
}
