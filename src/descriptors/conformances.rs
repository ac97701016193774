//! Conformance record parsing (`spec.md` §4.5 "Conformance section").

use crate::model::{ConformanceFlags, ConformanceTypeReferenceKind, SwiftConformance};
use crate::reader::ByteReader;

/// Parses one 16-byte conformance record at file offset `record_offset`.
/// Returns `None` if both the protocol name and type name come back empty.
pub(crate) fn parse_conformance_record(reader: &ByteReader, record_offset: i64) -> Option<SwiftConformance> {
    let protocol_target = reader.rel_ptr(record_offset);
    let protocol_name = protocol_target.and_then(|t| reader.rel_string(t + 8)).unwrap_or("").to_string();

    let flags = ConformanceFlags(reader.u32(record_offset + 12));
    let type_ref_target = reader.rel_ptr(record_offset + 4);

    let (type_name, mangled_type_name) = match flags.type_reference_kind() {
        Some(ConformanceTypeReferenceKind::DirectTypeDescriptor)
        | Some(ConformanceTypeReferenceKind::IndirectTypeDescriptor) => {
            let name = type_ref_target.and_then(|t| reader.rel_string(t + 8)).unwrap_or("").to_string();
            let mangled = type_ref_target.and_then(|t| reader.rel_string(t + 16)).unwrap_or("").to_string();
            (name, mangled)
        }
        Some(ConformanceTypeReferenceKind::DirectObjCClass) | Some(ConformanceTypeReferenceKind::IndirectObjCClass) => {
            let name = type_ref_target.and_then(|t| reader.rel_string(t)).unwrap_or("").to_string();
            (name.clone(), name)
        }
        None => (String::new(), String::new()),
    };

    if protocol_name.is_empty() && type_name.is_empty() {
        return None;
    }

    Some(SwiftConformance {
        address: record_offset as u64,
        type_ref_address: type_ref_target.map(|t| t as u64),
        type_name,
        mangled_type_name,
        protocol_name,
        protocol_address: protocol_target.map(|t| t as u64),
        flags,
    })
}
