#![no_main]

use cdiscope::customdebuginfo::{
    custom_debug_info_records, decode_dynamic_locals, decode_forward_record,
    decode_state_machine_hoisted_local_scopes, decode_state_machine_type_name,
    decode_tuple_element_names, decode_using_groups, CustomDebugInfoKind,
};
use cdiscope::editandcontinue::EditAndContinueMethodDebugInformation;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = custom_debug_info_records(data) {
        for record in records {
            let Ok(record) = record else {
                break;
            };

            let _ = match record.kind {
                CustomDebugInfoKind::UsingGroups => decode_using_groups(&record.data).map(drop),
                CustomDebugInfoKind::ForwardMethodInfo | CustomDebugInfoKind::ForwardModuleInfo => {
                    decode_forward_record(&record.data).map(drop)
                }
                CustomDebugInfoKind::StateMachineHoistedLocalScopes => {
                    decode_state_machine_hoisted_local_scopes(&record.data).map(drop)
                }
                CustomDebugInfoKind::StateMachineTypeName => {
                    decode_state_machine_type_name(&record.data).map(drop)
                }
                CustomDebugInfoKind::DynamicLocals => decode_dynamic_locals(&record.data).map(drop),
                CustomDebugInfoKind::TupleElementNames => {
                    decode_tuple_element_names(&record.data).map(drop)
                }
                _ => Ok(()),
            };
        }
    }

    let _ = EditAndContinueMethodDebugInformation::from_custom_debug_info(data);
    let _ = EditAndContinueMethodDebugInformation::create(data, data, data);
});
