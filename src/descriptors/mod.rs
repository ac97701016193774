//! The Descriptor Walker (`spec.md` §4.5): the three section entry points
//! that the Metadata Index drives, plus the shared context-descriptor
//! plumbing (`context`) and per-kind parsers (`types`, `extensions`,
//! `conformances`, `fields`) they're built from.
//!
//! Each `walk_*` function below owns exactly one section's array-of-records
//! iteration and its tolerant-forward-progress-on-failure behaviour
//! (`spec.md` §7 regime 2); the per-record decode logic lives in the
//! sibling modules.

mod conformances;
mod context;
mod extensions;
mod fields;
mod types;

use crate::demangle::SymbolicResolver;
use crate::model::{SwiftConformance, SwiftExtension, SwiftFieldDescriptor, SwiftType};
use crate::reader::ByteReader;
use crate::ReflectionLimits;

const RELATIVE_POINTER_STRIDE: i64 = 4;
const CONFORMANCE_RECORD_STRIDE: i64 = 16;

/// Walks `__swift5_types`: an array of 32-bit relative pointers, each
/// resolved to either a type or an extension context descriptor
/// (`spec.md` §4.5 "Type and Extension section"). Records come back in
/// ascending file-offset order of their descriptor headers, per `spec.md`
/// §5's ordering guarantee.
pub(crate) fn walk_types_and_extensions(
    reader: &ByteReader,
    section_offset: i64,
    section_size: u64,
    limits: &ReflectionLimits,
) -> (Vec<SwiftType>, Vec<SwiftExtension>) {
    let mut types = Vec::new();
    let mut exts = Vec::new();

    let count = section_size as i64 / RELATIVE_POINTER_STRIDE;
    for i in 0..count {
        let entry_offset = section_offset + i * RELATIVE_POINTER_STRIDE;
        let Some(target) = reader.rel_ptr(entry_offset) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(section = "__swift5_types", offset = entry_offset, "unresolvable relative pointer");
            continue;
        };

        let flags = reader.u32(target);
        if crate::model::DescriptorKind::from_low5(flags) == Some(crate::model::DescriptorKind::Extension) {
            match extensions::parse_extension_descriptor(reader, target, limits) {
                Some(ext) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(address = target, name = %ext.extended_type_name, "extension descriptor");
                    exts.push(ext)
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(section = "__swift5_types", offset = target, "malformed extension descriptor skipped");
                }
            }
            continue;
        }

        match types::parse_type_descriptor(reader, target, limits) {
            Some(ty) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(address = target, name = %ty.name, kind = %ty.kind, "type descriptor");
                types.push(ty)
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!(section = "__swift5_types", offset = target, "non-type-kind descriptor skipped");
            }
        }
    }

    (types, exts)
}

/// Walks `__swift5_proto`: an array of fixed 16-byte conformance records
/// (`spec.md` §4.5 "Conformance section").
pub(crate) fn walk_conformances(reader: &ByteReader, section_offset: i64, section_size: u64) -> Vec<SwiftConformance> {
    let mut out = Vec::new();
    let count = section_size as i64 / CONFORMANCE_RECORD_STRIDE;
    for i in 0..count {
        let record_offset = section_offset + i * CONFORMANCE_RECORD_STRIDE;
        match conformances::parse_conformance_record(reader, record_offset) {
            Some(c) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(address = record_offset, protocol = %c.protocol_name, ty = %c.type_name, "conformance record");
                out.push(c)
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!(section = "__swift5_proto", offset = record_offset, "empty conformance record skipped");
            }
        }
    }
    out
}

/// Walks `__swift5_fieldmd`: a sequence of variable-size field descriptors,
/// each a 16-byte header followed by `numFields * fieldRecordSize` bytes
/// (`spec.md` §4.5 "Field-descriptor section"). On decode failure the
/// walker advances by the 16-byte minimum stride and continues, tolerating
/// malformed entries without losing the rest of the section.
pub(crate) fn walk_field_descriptors(
    reader: &ByteReader,
    resolver: &SymbolicResolver,
    section_offset: i64,
    section_size: u64,
) -> Vec<SwiftFieldDescriptor> {
    const MIN_STRIDE: i64 = 16;
    let mut out = Vec::new();
    let section_end = section_offset + section_size as i64;
    let mut offset = section_offset;

    while offset < section_end {
        match fields::parse_field_descriptor(reader, resolver, offset) {
            Some((descriptor, consumed)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(address = offset, ty = %descriptor.mangled_type_name.string, fields = descriptor.fields.len(), "field descriptor");
                out.push(descriptor);
                offset += consumed.max(MIN_STRIDE);
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(section = "__swift5_fieldmd", offset, "malformed field descriptor skipped");
                offset += MIN_STRIDE;
            }
        }
    }

    out
}
