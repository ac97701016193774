//! Field-descriptor section parsing (`spec.md` §4.5 "Field-descriptor
//! section"). Descriptors are variable-size: a 16-byte header followed by
//! `numFields * fieldRecordSize` bytes of field records.

use crate::demangle::SymbolicResolver;
use crate::model::{FieldDescriptorKind, MangledNameWindow, SwiftFieldDescriptor, SwiftFieldRecord};
use crate::reader::ByteReader;

const HEADER_SIZE: i64 = 16;

/// Parses one field descriptor at `descriptor_offset`, returning it plus the
/// number of bytes it (and its field records) occupy. `None` means the
/// descriptor itself is malformed; the caller advances by the minimum
/// stride and continues (`spec.md` §7 regime 2).
pub(crate) fn parse_field_descriptor(
    reader: &ByteReader,
    resolver: &SymbolicResolver,
    descriptor_offset: i64,
) -> Option<(SwiftFieldDescriptor, i64)> {
    let kind = FieldDescriptorKind::from_wire(reader.u16(descriptor_offset + 8))?;
    let field_record_size = reader.u16(descriptor_offset + 10) as i64;
    let num_fields = reader.u32(descriptor_offset + 12) as i64;

    let mangled_type_name = read_mangled_window(reader, resolver, descriptor_offset)?;
    let superclass_mangled_name = read_mangled_window(reader, resolver, descriptor_offset + 4);

    let mut fields = Vec::with_capacity(num_fields.max(0) as usize);
    if field_record_size > 0 {
        for i in 0..num_fields {
            let record_offset = descriptor_offset + HEADER_SIZE + i * field_record_size;
            if let Some(record) = parse_field_record(reader, resolver, record_offset) {
                fields.push(record);
            }
        }
    }

    let descriptor = SwiftFieldDescriptor {
        address: descriptor_offset as u64,
        kind,
        mangled_type_name,
        superclass_mangled_name,
        fields,
    };
    let consumed = HEADER_SIZE + num_fields.max(0) * field_record_size.max(0);
    Some((descriptor, consumed.max(HEADER_SIZE)))
}

fn parse_field_record(reader: &ByteReader, resolver: &SymbolicResolver, record_offset: i64) -> Option<SwiftFieldRecord> {
    let flags = reader.u32(record_offset);
    let mangled_type = read_mangled_window(reader, resolver, record_offset + 4)?;
    let name = reader.rel_string(record_offset + 8).unwrap_or("").to_string();
    Some(SwiftFieldRecord { flags, name, mangled_type })
}

/// Reads a mangled-name byte window reachable from the relative pointer at
/// `field_offset`, demangling it (symbolically, if needed) into `.string`
/// while preserving the raw bytes and file offset for later resolution
/// (`spec.md` §3 invariant v, §4.5's field-descriptor paragraph).
///
/// A relative-pointer value of exactly `0` (the optional-field superclass
/// pointer left unset being the common case) is the format's "no pointer"
/// sentinel, not a self-pointing reference — and a captured window that
/// turns out empty is the same "nothing here" case by another route. Both
/// resolve to `None` rather than `Some` of an empty/zero-ish window, so the
/// triple stays either fully populated or fully absent (`spec.md` §3
/// invariant v).
fn read_mangled_window(reader: &ByteReader, resolver: &SymbolicResolver, field_offset: i64) -> Option<MangledNameWindow> {
    let target = reader.rel_ptr(field_offset)?;
    if target == field_offset {
        return None;
    }
    let raw = reader.data_until_nul(target)?;
    if raw.is_empty() {
        return None;
    }
    let string = resolver.resolve_window(raw, target);
    Some(MangledNameWindow { string, raw_bytes: raw.to_vec(), file_offset: target as u64 })
}
