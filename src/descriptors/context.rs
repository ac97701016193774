//! Shared context-descriptor plumbing: parent reads and generic
//! header/requirement decoding (`spec.md` §4.5), used by both the type and
//! extension descriptor parsers.

use crate::model::{
    self, DescriptorKind, GenericRequirementKind, SwiftGenericRequirement,
};
use crate::reader::ByteReader;
use crate::ReflectionLimits;

/// A parent context descriptor's name and kind, read one level deep
/// (`spec.md` §9: "never follows a parent chain more than one step").
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub(crate) struct ParentInfo {
    pub name: Option<String>,
    pub kind: Option<DescriptorKind>,
}

/// Reads the parent descriptor reachable from the relative pointer at
/// `context_start + 4`.
pub(crate) fn read_parent(reader: &ByteReader, context_start: i64) -> ParentInfo {
    let Some(parent_target) = reader.rel_ptr(context_start + 4) else {
        return ParentInfo::default();
    };
    let flags = reader.u32(parent_target);
    ParentInfo {
        name: reader.rel_string(parent_target + 8).map(str::to_string),
        kind: DescriptorKind::from_low5(flags),
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub(crate) struct GenericInfo {
    pub parameters: Vec<String>,
    pub param_count: u16,
    pub requirements: Vec<SwiftGenericRequirement>,
}

/// Decodes an 8-byte generic header plus its trailing requirement array
/// (`spec.md` §4.5).
pub(crate) fn read_generics(reader: &ByteReader, header_offset: i64, limits: &ReflectionLimits) -> GenericInfo {
    let raw_num_params = reader.u16(header_offset);
    let raw_num_requirements = reader.u16(header_offset + 2);

    let param_count = if (1..=limits.max_generic_params()).contains(&raw_num_params) {
        raw_num_params
    } else {
        0
    };
    let requirement_count = if raw_num_requirements <= limits.max_generic_requirements() {
        raw_num_requirements
    } else {
        0
    };

    let parameters = model::synthesize_generic_param_names(param_count);
    let requirements = read_requirements(reader, header_offset + 8, requirement_count, &parameters);

    GenericInfo { parameters, param_count, requirements }
}

fn read_requirements(
    reader: &ByteReader,
    requirements_offset: i64,
    count: u16,
    param_names: &[String],
) -> Vec<SwiftGenericRequirement> {
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count as i64 {
        let record_offset = requirements_offset + i * 12;
        let flags = reader.u32(record_offset);
        let Some(kind) = GenericRequirementKind::from_wire(flags) else {
            continue;
        };
        let param_index = ((flags >> 16) & 0xff) as usize;

        let subject = match reader.rel_string(record_offset + 4) {
            Some(s) => crate::demangle::demangle(s),
            None => param_names.get(param_index).cloned().unwrap_or_default(),
        };

        let raw_constraint = reader.rel_string(record_offset + 8).unwrap_or("");
        let constraint = if raw_constraint.is_empty() {
            if matches!(kind, GenericRequirementKind::Layout) {
                "AnyObject".to_string()
            } else {
                String::new()
            }
        } else {
            crate::demangle::demangle(raw_constraint)
        };

        out.push(SwiftGenericRequirement { kind, subject, constraint, flags });
    }
    out
}

/// Demangles `s` via the textual demangler only when it looks mangled
/// (`_Tt…`/`$s…`/`_$s…` prefix), matching `spec.md` §4.5's superclass-name
/// handling: a plain string is left untouched rather than round-tripped
/// through a demangler that would just echo it back.
pub(crate) fn demangle_if_mangled(s: &str) -> String {
    if s.starts_with("_Tt") || s.starts_with("$s") || s.starts_with("_$s") {
        crate::demangle::demangle(s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ByteOrder;

    #[test]
    fn generics_clamp_out_of_range_param_count_to_zero() {
        let mut bytes = vec![0u8; 16];
        bytes[0..2].copy_from_slice(&20u16.to_le_bytes()); // > 16, out of range
        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        let info = read_generics(&reader, 0, &ReflectionLimits::default());
        assert_eq!(info.param_count, 0);
        assert!(info.parameters.is_empty());
    }

    #[test]
    fn generics_synthesize_param_names_within_range() {
        let mut bytes = vec![0u8; 16];
        bytes[0..2].copy_from_slice(&2u16.to_le_bytes());
        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        let info = read_generics(&reader, 0, &ReflectionLimits::default());
        assert_eq!(info.parameters, vec!["T", "U"]);
    }

    #[test]
    fn demangle_if_mangled_leaves_plain_strings_untouched() {
        assert_eq!(demangle_if_mangled("Foundation.NSObject"), "Foundation.NSObject");
        assert_eq!(demangle_if_mangled("_TtC10Foundation8NSObject"), "Foundation.NSObject");
    }
}
