//! Type context descriptor parsing: classes, structs, enums
//! (`spec.md` §4.5 "Type descriptor header").

use super::context::{demangle_if_mangled, read_generics, read_parent};
use crate::model::{DescriptorKind, SwiftType, TypeContextDescriptorFlags};
use crate::reader::ByteReader;
use crate::ReflectionLimits;

/// Parses a type context descriptor whose header starts at file offset
/// `target`. Returns `None` if the descriptor's kind isn't a type kind or
/// its name can't be read.
pub(crate) fn parse_type_descriptor(reader: &ByteReader, target: i64, limits: &ReflectionLimits) -> Option<SwiftType> {
    let flags = reader.u32(target);
    let tcd_flags = TypeContextDescriptorFlags(flags);
    let kind = tcd_flags.kind().filter(|k| k.is_type_kind())?;
    let name = reader.rel_string(target + 8)?.to_string();
    let parent = read_parent(reader, target);

    let (superclass_name, generic_header_offset) = match kind {
        DescriptorKind::Class => {
            let superclass_name = reader.rel_string(target + 20).map(demangle_if_mangled);
            let header_offset = if tcd_flags.has_resilient_superclass() { target + 48 } else { target + 44 };
            (superclass_name, header_offset)
        }
        _ => (None, target + 20),
    };

    let generics = read_generics(reader, generic_header_offset, limits);

    Some(SwiftType {
        address: target as u64,
        kind,
        name,
        parent_name: parent.name,
        parent_kind: parent.kind,
        superclass_name,
        generic_parameters: generics.parameters,
        generic_param_count: generics.param_count,
        generic_requirements: generics.requirements,
        flags,
    })
}
